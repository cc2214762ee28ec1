use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LEVEL: &str = "info";

/// `RUST_LOG` 優先；否則 verbose 用 debug，再來才是設定檔的 log_level
fn filter_directive(verbose: bool, level: Option<&str>) -> String {
    if verbose {
        return "job_market_etl=debug,info".to_string();
    }
    let level = level
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LEVEL);
    format!("job_market_etl={}", level.to_lowercase())
}

fn env_filter(verbose: bool, level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(filter_directive(verbose, level))
            .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbose, None)))
    })
}

pub fn init_cli_logger(verbose: bool, level: Option<&str>) {
    tracing_subscriber::registry()
        .with(env_filter(verbose, level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// JSON 格式日誌，給排程器或日誌收集系統使用
pub fn init_json_logger(verbose: bool, level: Option<&str>) {
    tracing_subscriber::registry()
        .with(env_filter(verbose, level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_prefers_verbose() {
        assert_eq!(filter_directive(true, Some("warn")), "job_market_etl=debug,info");
    }

    #[test]
    fn test_filter_directive_uses_configured_level() {
        assert_eq!(filter_directive(false, Some("WARN")), "job_market_etl=warn");
        assert_eq!(filter_directive(false, Some("  ")), "job_market_etl=info");
        assert_eq!(filter_directive(false, None), "job_market_etl=info");
    }
}
