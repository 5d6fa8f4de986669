pub mod config;
pub mod partition;
pub mod state;
