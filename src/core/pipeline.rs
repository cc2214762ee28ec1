pub use crate::app::pipelines::market_pipeline::{
    load_vocabulary, MarketPipeline, ANALYSIS_FILENAME, MANIFEST_FILENAME, SUMMARY_FILENAME,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ConfigProvider, DataSource, JobRecord, Pipeline, Storage};
    use crate::utils::error::{EtlError, Result};
    use httpmock::prelude::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put_file(&self, path: &str, data: &[u8]) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }

        async fn file_names(&self) -> Vec<String> {
            let files = self.files.lock().await;
            let mut names: Vec<String> = files.keys().cloned().collect();
            names.sort();
            names
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        source: DataSource,
        output_path: String,
        output_formats: Vec<String>,
        bundle: Option<String>,
        vocabulary_file: Option<String>,
    }

    impl MockConfig {
        fn file(path: &str) -> Self {
            Self {
                source: DataSource::File {
                    path: path.to_string(),
                },
                output_path: "test_output".to_string(),
                output_formats: vec!["json".to_string(), "csv".to_string()],
                bundle: None,
                vocabulary_file: None,
            }
        }

        fn api(endpoint: String, headers: HashMap<String, String>) -> Self {
            Self {
                source: DataSource::Api {
                    endpoint,
                    timeout_seconds: Some(5),
                    headers,
                },
                ..Self::file("unused.json")
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn pipeline_name(&self) -> &str {
            "test-pipeline"
        }

        fn data_source(&self) -> DataSource {
            self.source.clone()
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_formats(&self) -> &[String] {
            &self.output_formats
        }

        fn bundle_filename(&self) -> Option<&str> {
            self.bundle.as_deref()
        }

        fn vocabulary_file(&self) -> Option<&str> {
            self.vocabulary_file.as_deref()
        }

        fn extend_builtin_vocabulary(&self) -> bool {
            true
        }
    }

    fn sample_records() -> Vec<JobRecord> {
        vec![
            [
                ("job_id", json!("1")),
                ("title", json!("Data Analyst")),
                ("skills", json!("python, sql, excel")),
                ("experience", json!("2-4 yrs")),
                ("description", json!("Analyze sales data")),
            ]
            .into_iter()
            .collect(),
            [
                ("job_id", json!("2")),
                ("title", json!("Data Analyst")),
                ("skills", json!("python, tableau")),
                ("experience", json!("3-5 yrs")),
            ]
            .into_iter()
            .collect(),
            [
                ("job_id", json!("3")),
                ("title", json!("BI Analyst")),
                ("skills", json!("sql, power bi")),
                ("experience", json!("1 year")),
            ]
            .into_iter()
            .collect(),
        ]
    }

    #[tokio::test]
    async fn test_extract_json_file() {
        let storage = MockStorage::new();
        storage
            .put_file(
                "jobs.json",
                br#"[{"job_id": "1", "title": "Data Analyst"}, {"job_id": "2", "title": "BI Analyst"}]"#,
            )
            .await;
        let pipeline = MarketPipeline::new(storage, MockConfig::file("jobs.json"));

        let records = pipeline.extract().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].text("title").as_deref(), Some("BI Analyst"));
    }

    #[tokio::test]
    async fn test_extract_csv_file() {
        let storage = MockStorage::new();
        storage
            .put_file("jobs.csv", b"job_id,title,skills\n1,Data Analyst,\"python, sql\"\n")
            .await;
        let pipeline = MarketPipeline::new(storage, MockConfig::file("jobs.csv"));

        let records = pipeline.extract().await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text("skills").as_deref(), Some("python, sql"));
    }

    #[tokio::test]
    async fn test_extract_missing_file_fails() {
        let pipeline = MarketPipeline::new(MockStorage::new(), MockConfig::file("missing.json"));

        let result = pipeline.extract().await;

        assert!(matches!(result, Err(EtlError::IoError(_))));
    }

    #[tokio::test]
    async fn test_extract_api_sends_headers() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/jobs")
                .header("Authorization", "Bearer test-token");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"items": [{"job_id": "1", "title": "Data Analyst"}]}));
        });

        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "Bearer test-token".to_string());
        let config = MockConfig::api(server.url("/jobs"), headers);
        let pipeline = MarketPipeline::new(MockStorage::new(), config);

        let records = pipeline.extract().await.unwrap();

        api_mock.assert();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_extract_api_failure_is_an_error() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/jobs");
            then.status(500);
        });

        let config = MockConfig::api(server.url("/jobs"), HashMap::new());
        let pipeline = MarketPipeline::new(MockStorage::new(), config);

        let result = pipeline.extract().await;

        api_mock.assert();
        assert!(matches!(result, Err(EtlError::ApiError(_))));
    }

    #[tokio::test]
    async fn test_transform_produces_report() {
        let pipeline = MarketPipeline::new(MockStorage::new(), MockConfig::file("jobs.json"));

        let result = pipeline.transform(sample_records()).await.unwrap();

        assert_eq!(result.records_received, 3);
        assert!(result.report.has_data());
        let analysis = result.report.analysis().unwrap();
        assert_eq!(analysis.total_jobs, 3);
        assert_eq!(analysis.skill_counts.get("Python"), Some(&2));
        assert_eq!(analysis.skill_counts.get("SQL"), Some(&2));
    }

    #[tokio::test]
    async fn test_load_writes_individual_files() {
        let storage = MockStorage::new();
        let pipeline = MarketPipeline::new(storage.clone(), MockConfig::file("jobs.json"));

        let result = pipeline.transform(sample_records()).await.unwrap();
        let generated: Vec<String> = result
            .report
            .generated_charts()
            .map(|c| format!("test_output/{}_series.csv", c.chart_id))
            .collect();
        let output_path = pipeline.load(result).await.unwrap();

        assert_eq!(output_path, "test_output");
        let names = storage.file_names().await;
        assert!(names.contains(&"test_output/market_analysis.json".to_string()));
        assert!(names.contains(&"test_output/chart_manifest.json".to_string()));
        assert!(names.contains(&"test_output/run_summary.json".to_string()));
        for csv_name in &generated {
            assert!(names.contains(csv_name), "missing {}", csv_name);
        }

        let document: serde_json::Value = serde_json::from_slice(
            &storage
                .get_file("test_output/market_analysis.json")
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(document["has_data"], json!(true));
        assert_eq!(document["total_jobs"], json!(3));

        let manifest: serde_json::Value = serde_json::from_slice(
            &storage
                .get_file("test_output/chart_manifest.json")
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(manifest.as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_load_csv_series_content() {
        let storage = MockStorage::new();
        let pipeline = MarketPipeline::new(storage.clone(), MockConfig::file("jobs.json"));

        let result = pipeline.transform(sample_records()).await.unwrap();
        pipeline.load(result).await.unwrap();

        let csv_data = storage
            .get_file("test_output/chart_1_series.csv")
            .await
            .unwrap();
        let content = String::from_utf8(csv_data).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("label,value"));
        assert_eq!(lines.next(), Some("Python,2"));
    }

    #[tokio::test]
    async fn test_load_bundle_zip_contents() {
        let storage = MockStorage::new();
        let mut config = MockConfig::file("jobs.json");
        config.bundle = Some("analysis.zip".to_string());
        config.output_formats = vec!["json".to_string()];
        let pipeline = MarketPipeline::new(storage.clone(), config);

        let result = pipeline.transform(sample_records()).await.unwrap();
        let output_path = pipeline.load(result).await.unwrap();

        assert_eq!(output_path, "test_output/analysis.zip");
        assert_eq!(storage.file_names().await, vec!["test_output/analysis.zip"]);

        let zip_bytes = storage.get_file("test_output/analysis.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();
        let mut file_names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        file_names.sort();

        assert_eq!(
            file_names,
            vec![MANIFEST_FILENAME, ANALYSIS_FILENAME, SUMMARY_FILENAME]
        );
    }

    #[tokio::test]
    async fn test_load_empty_batch_writes_sentinel() {
        let storage = MockStorage::new();
        let pipeline = MarketPipeline::new(storage.clone(), MockConfig::file("jobs.json"));

        let result = pipeline.transform(Vec::new()).await.unwrap();
        pipeline.load(result).await.unwrap();

        let document: serde_json::Value = serde_json::from_slice(
            &storage
                .get_file("test_output/market_analysis.json")
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(
            document,
            json!({"has_data": false, "error": "No job data received"})
        );

        // 沒有圖表被產生，因此沒有序列 CSV
        let names = storage.file_names().await;
        assert!(!names.iter().any(|n| n.ends_with("_series.csv")));

        let summary: serde_json::Value = serde_json::from_slice(
            &storage
                .get_file("test_output/run_summary.json")
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(summary["records_received"], json!(0));
        assert_eq!(summary["has_data"], json!(false));
    }

    #[tokio::test]
    async fn test_from_config_missing_vocabulary_fails() {
        let mut config = MockConfig::file("jobs.json");
        config.vocabulary_file = Some("/nonexistent/vocabulary.toml".to_string());

        let result = MarketPipeline::from_config(MockStorage::new(), config);

        assert!(result.is_err());
    }
}
