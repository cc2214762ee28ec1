pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{LocalStorage, TomlConfig};

pub use crate::core::{etl::EtlEngine, pipeline::MarketPipeline};
pub use domain::report::{AnalysisReport, ChartEntry};
pub use domain::services::{MarketAnalyzer, SkillExtractor, Vocabulary};
pub use utils::error::{EtlError, Result};
