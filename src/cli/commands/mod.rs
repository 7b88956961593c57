//! CLI command implementations.

mod config;
mod ingest;
mod serve;

pub use config::run_config;
pub use ingest::run_ingest;
pub use serve::run_serve;
