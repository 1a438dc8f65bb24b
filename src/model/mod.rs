pub mod adapters;
pub mod partner;
