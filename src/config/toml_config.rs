use crate::core::{ConfigProvider, DataSource};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub analysis: Option<AnalysisConfig>,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// "file" 或 "api"
    pub r#type: String,
    pub path: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub vocabulary_file: Option<String>,
    pub extend_builtin: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    #[serde(default = "default_output_formats")]
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

fn default_output_formats() -> Vec<String> {
    vec!["json".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
    pub system_stats: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_KEY})，未設定的變數原樣保留
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("pipeline.name", &self.pipeline.name)?;

        match self.source.r#type.as_str() {
            "file" => {
                let path = validation::validate_required_field("source.path", &self.source.path)?;
                validation::validate_path("source.path", path)?;
                validation::validate_file_extension("source.path", path, &["json", "csv"])?;
            }
            "api" => {
                let endpoint =
                    validation::validate_required_field("source.endpoint", &self.source.endpoint)?;
                validation::validate_url("source.endpoint", endpoint)?;
            }
            other => {
                return Err(EtlError::InvalidConfigValueError {
                    field: "source.type".to_string(),
                    value: other.to_string(),
                    reason: "Source type must be \"file\" or \"api\"".to_string(),
                })
            }
        }

        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_range("source.timeout_seconds", timeout, 1, 300)?;
        }

        if let Some(vocabulary) = self.vocabulary_file() {
            validation::validate_file_extension("analysis.vocabulary_file", vocabulary, &["toml"])?;
        }

        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_output_formats("load.output_formats", &self.load.output_formats)?;

        if let Some(compression) = self.load.compression.as_ref().filter(|c| c.enabled) {
            validation::validate_file_extension(
                "load.compression.filename",
                &compression.filename,
                &["zip"],
            )?;
        }

        Ok(())
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn pipeline_name(&self) -> &str {
        &self.pipeline.name
    }

    fn data_source(&self) -> DataSource {
        if self.source.r#type == "api" {
            DataSource::Api {
                endpoint: self.source.endpoint.clone().unwrap_or_default(),
                timeout_seconds: self.source.timeout_seconds,
                headers: self.source.headers.clone().unwrap_or_default(),
            }
        } else {
            DataSource::File {
                path: self.source.path.clone().unwrap_or_default(),
            }
        }
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn bundle_filename(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_str())
    }

    fn vocabulary_file(&self) -> Option<&str> {
        self.analysis
            .as_ref()
            .and_then(|a| a.vocabulary_file.as_deref())
    }

    fn extend_builtin_vocabulary(&self) -> bool {
        self.analysis
            .as_ref()
            .and_then(|a| a.extend_builtin)
            .unwrap_or(true)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_file_source_config() {
        let toml_content = r#"
[pipeline]
name = "weekly-market"
description = "Weekly market scan"

[source]
type = "file"
path = "data/jobs.csv"

[analysis]
vocabulary_file = "vocab/analytics.toml"
extend_builtin = false

[load]
output_path = "./reports"
output_formats = ["json", "csv"]

[load.compression]
enabled = true
filename = "market.zip"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.pipeline_name(), "weekly-market");
        assert_eq!(
            config.data_source(),
            DataSource::File {
                path: "data/jobs.csv".to_string()
            }
        );
        assert_eq!(config.vocabulary_file(), Some("vocab/analytics.toml"));
        assert!(!config.extend_builtin_vocabulary());
        assert_eq!(config.bundle_filename(), Some("market.zip"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution_in_headers() {
        std::env::set_var("JOB_MARKET_TEST_TOKEN", "secret-token");

        let toml_content = r#"
[pipeline]
name = "api-scan"

[source]
type = "api"
endpoint = "https://jobs.example.com/api/postings"
timeout_seconds = 30

[source.headers]
Authorization = "Bearer ${JOB_MARKET_TEST_TOKEN}"

[load]
output_path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        match config.data_source() {
            DataSource::Api {
                headers,
                timeout_seconds,
                ..
            } => {
                assert_eq!(headers["Authorization"], "Bearer secret-token");
                assert_eq!(timeout_seconds, Some(30));
            }
            other => panic!("unexpected source: {:?}", other),
        }
        // 未指定時只輸出 json
        assert_eq!(config.output_formats(), ["json".to_string()]);
        assert!(config.extend_builtin_vocabulary());
        assert_eq!(config.bundle_filename(), None);

        std::env::remove_var("JOB_MARKET_TEST_TOKEN");
    }

    #[test]
    fn test_config_validation() {
        let bad_endpoint = r#"
[pipeline]
name = "test"

[source]
type = "api"
endpoint = "invalid-url"

[load]
output_path = "./output"
"#;
        let config = TomlConfig::from_toml_str(bad_endpoint).unwrap();
        assert!(config.validate().is_err());

        let missing_path = r#"
[pipeline]
name = "test"

[source]
type = "file"

[load]
output_path = "./output"
"#;
        let config = TomlConfig::from_toml_str(missing_path).unwrap();
        assert!(matches!(
            config.validate(),
            Err(EtlError::MissingConfigError { .. })
        ));

        let unknown_type = r#"
[pipeline]
name = "test"

[source]
type = "database"

[load]
output_path = "./output"
"#;
        let config = TomlConfig::from_toml_str(unknown_type).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[pipeline]
name = "file-test"

[source]
type = "file"
path = "jobs.json"

[load]
output_path = "./output"
output_formats = ["csv"]

[monitoring]
enabled = true
log_level = "debug"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.name, "file-test");
        assert!(config.monitoring_enabled());
        assert_eq!(config.log_level(), Some("debug"));
    }
}
