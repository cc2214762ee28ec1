use super::DEFAULT_PIPELINE_NAME;
use crate::core::{ConfigProvider, DataSource};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "job-market-etl")]
#[command(about = "Analyze job postings into a market report and chart manifest")]
pub struct CliConfig {
    #[arg(long, help = "Job postings file (.json or .csv)", conflicts_with = "api_endpoint")]
    pub input: Option<String>,

    #[arg(long, help = "HTTP endpoint returning job postings as JSON")]
    pub api_endpoint: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, help = "TOML vocabulary file with aliases and categories")]
    pub vocabulary: Option<String>,

    #[arg(long, help = "Use the vocabulary file instead of extending the built-in one")]
    pub replace_vocabulary: bool,

    #[arg(long, value_delimiter = ',', default_values = ["json", "csv"])]
    pub formats: Vec<String>,

    #[arg(long, help = "Bundle all outputs into this ZIP file")]
    pub bundle: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Report memory and CPU usage per phase")]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn pipeline_name(&self) -> &str {
        DEFAULT_PIPELINE_NAME
    }

    fn data_source(&self) -> DataSource {
        match (&self.input, &self.api_endpoint) {
            (None, Some(endpoint)) => DataSource::Api {
                endpoint: endpoint.clone(),
                timeout_seconds: None,
                headers: HashMap::new(),
            },
            (input, _) => DataSource::File {
                path: input.clone().unwrap_or_default(),
            },
        }
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn bundle_filename(&self) -> Option<&str> {
        self.bundle.as_deref()
    }

    fn vocabulary_file(&self) -> Option<&str> {
        self.vocabulary.as_deref()
    }

    fn extend_builtin_vocabulary(&self) -> bool {
        !self.replace_vocabulary
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        match (&self.input, &self.api_endpoint) {
            (Some(input), None) => {
                validation::validate_path("input", input)?;
                validation::validate_file_extension("input", input, &["json", "csv"])?;
            }
            (None, Some(endpoint)) => validation::validate_url("api_endpoint", endpoint)?,
            (Some(_), Some(_)) => {
                return Err(EtlError::ConfigValidationError {
                    field: "input".to_string(),
                    message: "--input and --api-endpoint cannot be used together".to_string(),
                })
            }
            (None, None) => {
                return Err(EtlError::MissingConfigError {
                    field: "input or api_endpoint".to_string(),
                })
            }
        }

        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_output_formats("formats", &self.formats)?;
        if let Some(vocabulary) = &self.vocabulary {
            validation::validate_file_extension("vocabulary", vocabulary, &["toml"])?;
        }
        if let Some(bundle) = &self.bundle {
            validation::validate_file_extension("bundle", bundle, &["zip"])?;
        }
        Ok(())
    }
}
