use crate::domain::model::{DataSource, JobRecord, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn pipeline_name(&self) -> &str;
    fn data_source(&self) -> DataSource;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    /// 設定時所有輸出打包成這個 ZIP 檔
    fn bundle_filename(&self) -> Option<&str>;
    fn vocabulary_file(&self) -> Option<&str>;
    /// 詞彙檔是擴充內建詞彙 (true) 還是取代 (false)
    fn extend_builtin_vocabulary(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<JobRecord>>;
    async fn transform(&self, data: Vec<JobRecord>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
