//! Logger setup.
//!
//! The viewer owns the terminal while it runs, so log output is only useful
//! when it goes somewhere other than the screen. Set a log file to keep it.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "meshview_core=debug").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub log_file: Option<PathBuf>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            log_file: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once; later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = &config.env_filter {
            builder.parse_filters(filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Warn);
        }

        let mut file_error = None;
        match config.log_file.as_deref().map(File::create) {
            Some(Ok(file)) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
                builder.write_style(env_logger::WriteStyle::Never);
            }
            Some(Err(e)) => {
                file_error = Some(e);
                builder.write_style(config.write_style);
            }
            None => {
                builder.write_style(config.write_style);
            }
        }

        builder.init();

        if let (Some(path), Some(e)) = (&config.log_file, file_error) {
            log::warn!("cannot open log file {}: {}; logging to stderr", path.display(), e);
        }
        log::debug!("logging initialized");
    });
}
