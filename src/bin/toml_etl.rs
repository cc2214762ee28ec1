use anyhow::Context;
use clap::Parser;
use job_market_etl::core::{ConfigProvider, DataSource, Pipeline};
use job_market_etl::utils::{logger, validation::Validate};
use job_market_etl::{EtlEngine, LocalStorage, MarketPipeline, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-etl")]
#[command(about = "Job market analysis driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "etl-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the input file from config
    #[arg(long)]
    input: Option<String>,

    /// Dry run - extract and analyze without writing any output
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌，層級取自 [monitoring] log_level
    if args.json_logs {
        logger::init_json_logger(args.verbose, config.log_level());
    } else {
        logger::init_cli_logger(args.verbose, config.log_level());
    }

    tracing::info!("🚀 Starting TOML-based job market analysis");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(input) = &args.input {
        config.source.r#type = "file".to_string();
        config.source.path = Some(input.clone());
        tracing::info!("🔧 Input overridden to: {}", input);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = MarketPipeline::from_config(LocalStorage::default(), config)
        .context("failed to load the skill vocabulary")?;

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No output will be written");
        return perform_dry_run(&pipeline).await;
    }

    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Market analysis completed successfully!");
            println!("✅ Market analysis completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Market analysis failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = e.severity().exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    match &config.pipeline.version {
        Some(version) => println!("  Pipeline: {} v{}", config.pipeline.name, version),
        None => println!("  Pipeline: {}", config.pipeline.name),
    }
    match config.data_source() {
        DataSource::File { path } => println!("  Source: file {}", path),
        DataSource::Api {
            endpoint, headers, ..
        } => println!("  Source: api {} ({} custom headers)", endpoint, headers.len()),
    }
    match config.vocabulary_file() {
        Some(file) if config.extend_builtin_vocabulary() => {
            println!("  Vocabulary: built-in + {}", file)
        }
        Some(file) => println!("  Vocabulary: {}", file),
        None => println!("  Vocabulary: built-in"),
    }
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    if let Some(bundle) = config.bundle_filename() {
        println!("  Compression: {} (ZIP)", bundle);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(pipeline: &MarketPipeline<LocalStorage, TomlConfig>) -> anyhow::Result<()> {
    println!("🔍 Dry Run Analysis:");
    println!();

    let records = pipeline.extract().await.context("failed to read job records")?;
    let result = pipeline
        .transform(records)
        .await
        .context("failed to analyze job records")?;

    println!("📥 Records received: {}", result.records_received);
    if let Some(analysis) = result.report.analysis() {
        println!("  Unique postings: {}", analysis.total_jobs);
        println!("  Role: {}", analysis.role_name);
        println!("  Core skills: {}", analysis.core_skills.join(", "));
        println!("  Data quality: {} ({})", analysis.quality_grade, analysis.quality_desc);
    }

    println!();
    println!("📊 Charts:");
    for chart in &result.report.chart_manifest {
        match &chart.reason {
            None => println!("  ✅ {} ({})", chart.chart_name, chart.chart_type),
            Some(reason) => println!("  ⏭️ {}: {}", chart.chart_name, reason),
        }
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");

    Ok(())
}
