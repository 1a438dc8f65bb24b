pub mod engine;
pub mod partner_client;
