pub mod config_manager;
