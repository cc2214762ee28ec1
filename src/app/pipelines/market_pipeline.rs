use crate::app::pipelines::input::{decode_json, decode_records, InputFormat};
use crate::core::{ConfigProvider, DataSource, JobRecord, Pipeline, Storage, TransformResult};
use crate::domain::report::{AnalysisReport, SeriesPoint};
use crate::domain::services::{MarketAnalyzer, Vocabulary};
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

pub const ANALYSIS_FILENAME: &str = "market_analysis.json";
pub const MANIFEST_FILENAME: &str = "chart_manifest.json";
pub const SUMMARY_FILENAME: &str = "run_summary.json";

#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    pipeline: &'a str,
    generated_at: DateTime<Utc>,
    records_received: usize,
    total_jobs: usize,
    has_data: bool,
    charts_generated: Vec<&'a str>,
    files: Vec<String>,
}

/// 依配置載入詞彙表：沒有詞彙檔時使用內建詞彙
pub fn load_vocabulary<C: ConfigProvider>(config: &C) -> Result<Vocabulary> {
    match config.vocabulary_file() {
        None => Ok(Vocabulary::builtin()),
        Some(path) => {
            tracing::info!("📚 Loading vocabulary from: {}", path);
            let file = Vocabulary::from_file(path)?;
            if config.extend_builtin_vocabulary() {
                Ok(Vocabulary::builtin().extend(file))
            } else {
                Ok(file)
            }
        }
    }
}

fn series_csv(series: &[SeriesPoint]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["label", "value"])?;
    for point in series {
        writer.write_record([point.label.as_str(), point.value.to_string().as_str()])?;
    }
    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}

/// 市場分析 Pipeline：讀取職缺 → 分析 → 輸出報告與圖表清單
pub struct MarketPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) client: Client,
    pub(crate) analyzer: MarketAnalyzer,
}

impl<S: Storage, C: ConfigProvider> MarketPipeline<S, C> {
    /// 使用內建詞彙表
    pub fn new(storage: S, config: C) -> Self {
        Self::with_analyzer(storage, config, MarketAnalyzer::default())
    }

    /// 依配置載入詞彙檔
    pub fn from_config(storage: S, config: C) -> Result<Self> {
        let vocabulary = load_vocabulary(&config)?;
        Ok(Self::with_analyzer(storage, config, MarketAnalyzer::new(vocabulary)))
    }

    pub fn with_analyzer(storage: S, config: C, analyzer: MarketAnalyzer) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
            analyzer,
        }
    }

    pub fn analyzer(&self) -> &MarketAnalyzer {
        &self.analyzer
    }

    async fn fetch_api(
        &self,
        endpoint: &str,
        timeout_seconds: Option<u64>,
        headers: &std::collections::HashMap<String, String>,
    ) -> Result<Vec<JobRecord>> {
        let mut request = self.client.get(endpoint);
        for (key, value) in headers {
            request = request.header(key, value);
        }
        if let Some(timeout) = timeout_seconds {
            request = request.timeout(std::time::Duration::from_secs(timeout));
        }

        tracing::debug!("Making API request to: {}", endpoint);
        let response = request.send().await?;
        tracing::debug!("API response status: {}", response.status());

        let json_data: serde_json::Value = response.error_for_status()?.json().await?;
        decode_json(json_data, endpoint)
    }

    fn output_files(&self, result: &TransformResult) -> Result<Vec<(String, Vec<u8>)>> {
        let report: &AnalysisReport = &result.report;
        let formats = self.config.output_formats();
        let mut files = Vec::new();

        if formats.iter().any(|f| f == "json") {
            files.push((
                ANALYSIS_FILENAME.to_string(),
                serde_json::to_vec_pretty(&report.document)?,
            ));
            files.push((
                MANIFEST_FILENAME.to_string(),
                serde_json::to_vec_pretty(&report.chart_manifest)?,
            ));
        }
        if formats.iter().any(|f| f == "csv") {
            for chart in report.generated_charts() {
                files.push((
                    format!("{}_series.csv", chart.chart_id),
                    series_csv(&chart.series)?,
                ));
            }
        }

        let summary = RunSummary {
            pipeline: self.config.pipeline_name(),
            generated_at: Utc::now(),
            records_received: result.records_received,
            total_jobs: report.analysis().map_or(0, |a| a.total_jobs),
            has_data: report.has_data(),
            charts_generated: report.generated_charts().map(|c| c.chart_id.as_str()).collect(),
            files: files.iter().map(|(name, _)| name.clone()).collect(),
        };
        files.push((SUMMARY_FILENAME.to_string(), serde_json::to_vec_pretty(&summary)?));

        Ok(files)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for MarketPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<JobRecord>> {
        let records = match self.config.data_source() {
            DataSource::File { path } => {
                tracing::info!("📂 Reading job records from: {}", path);
                let format = InputFormat::from_path(&path)?;
                let bytes = self.storage.read_file(&path).await?;
                decode_records(&bytes, format, &path)?
            }
            DataSource::Api {
                endpoint,
                timeout_seconds,
                headers,
            } => {
                tracing::info!("🌐 Fetching job records from: {}", endpoint);
                self.fetch_api(&endpoint, timeout_seconds, &headers).await?
            }
        };

        if records.is_empty() {
            tracing::warn!("📝 Source returned no job records");
        }
        Ok(records)
    }

    async fn transform(&self, data: Vec<JobRecord>) -> Result<TransformResult> {
        tracing::info!("🔧 Analyzing {} job records", data.len());
        let report = self.analyzer.analyze(&data);

        for chart in &report.chart_manifest {
            match &chart.reason {
                Some(reason) => tracing::debug!("{} skipped: {}", chart.chart_name, reason),
                None => tracing::debug!("{} eligible ({} points)", chart.chart_name, chart.series.len()),
            }
        }

        Ok(TransformResult {
            records_received: data.len(),
            report,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let files = self.output_files(&result)?;
        let output_dir = Path::new(self.config.output_path());

        if let Some(bundle) = self.config.bundle_filename() {
            tracing::debug!("Creating ZIP bundle with {} files", files.len());
            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for (name, data) in &files {
                    zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
                    zip.write_all(data)?;
                }
                let cursor = zip.finish()?;
                cursor.into_inner()
            };

            let bundle_path = output_dir.join(bundle).to_string_lossy().into_owned();
            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(&bundle_path, &zip_data).await?;
            return Ok(bundle_path);
        }

        for (name, data) in &files {
            let path = output_dir.join(name).to_string_lossy().into_owned();
            self.storage.write_file(&path, data).await?;
            tracing::debug!("Wrote {} ({} bytes)", path, data.len());
        }
        Ok(self.config.output_path().to_string())
    }
}
