use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    pub level: String,
    pub log_to_file: bool,
    pub log_dir: String,
    pub json: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: false,
            log_dir: "./logs".to_string(),
            json: false,
        }
    }
}

/// Installs the global subscriber. Keep the returned guard alive for the
/// lifetime of the process or buffered lines are lost.
pub fn setup_tracing(logger_cfg: LoggerConfig) -> WorkerGuard {
    let (writer, guard) = if logger_cfg.log_to_file {
        tracing_appender::non_blocking(tracing_appender::rolling::daily(
            &logger_cfg.log_dir,
            "delaymap.log",
        ))
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    let filter = EnvFilter::try_new(&logger_cfg.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_writer(writer);
    let installed = if logger_cfg.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = installed {
        eprintln!("Tracing subscriber already installed: {}", e);
    }

    guard
}
