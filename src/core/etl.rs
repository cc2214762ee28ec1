use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting job market analysis");

        // Extract
        let raw_data = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} job records", raw_data.len());
        self.monitor.mark_phase("extract");

        // Transform
        let transformed = self.pipeline.transform(raw_data).await?;
        match transformed.report.analysis() {
            Some(analysis) => tracing::info!(
                "🔧 Analyzed {} unique postings for '{}' ({} charts eligible)",
                analysis.total_jobs,
                analysis.role_name,
                transformed.report.generated_charts().count()
            ),
            None => tracing::warn!("⚠️ No job data received, writing empty report"),
        }
        self.monitor.mark_phase("transform");

        // Load
        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!("💾 Output saved to: {}", output_path);
        self.monitor.mark_phase("load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
