//! CLI library for testing purposes

pub mod config;
pub mod exit_status;
pub mod export;
pub mod import;

pub use config::{CONFIG_FILE_NAME, Config, load_config};
pub use exit_status::ExitStatus;
pub use export::{ExportCommand, run_export};
pub use import::{ImportCommand, run_import};
