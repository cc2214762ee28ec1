#[cfg(feature = "cli")]
mod args;
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use args::CliConfig;
pub use cli::LocalStorage;
pub use toml_config::TomlConfig;

pub const DEFAULT_PIPELINE_NAME: &str = "job-market-analysis";
