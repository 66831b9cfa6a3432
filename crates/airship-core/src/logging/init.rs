use std::io::Write;
use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "airship_engine=debug,wgpu=warn").
///
/// `write_style` controls ANSI coloring behavior. `default_level` applies when
/// neither `env_filter` nor `RUST_LOG` is set.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    pub default_level: log::LevelFilter,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            default_level: log::LevelFilter::Info,
        }
    }
}

impl LoggingConfig {
    /// Resolves the filter string to install, if any.
    ///
    /// `None` means `default_level` is used.
    fn resolve_filter(&self, rust_log: Option<String>) -> Option<String> {
        self.env_filter
            .clone()
            .or(rust_log)
            .filter(|f| !f.trim().is_empty())
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Records are written as `[level] HH:MM:SS.mmm file:line : message`.
/// Subsequent calls are ignored. Intended usage is early in `main`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match config.resolve_filter(std::env::var("RUST_LOG").ok()) {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder.filter_level(config.default_level);
            }
        }

        builder.write_style(config.write_style);
        builder.format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} {}:{} : {}",
                record.level(),
                buf.timestamp_millis(),
                record.file().unwrap_or("?"),
                record.line().unwrap_or(0),
                record.args()
            )
        });

        // A logger installed by the host (tests, embedding) wins.
        if builder.try_init().is_err() {
            return;
        }

        log::debug!("logging initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins_over_env() {
        let cfg = LoggingConfig {
            env_filter: Some("warn".into()),
            ..LoggingConfig::default()
        };
        assert_eq!(cfg.resolve_filter(Some("debug".into())).as_deref(), Some("warn"));
    }

    #[test]
    fn env_filter_used_when_not_configured() {
        let cfg = LoggingConfig::default();
        assert_eq!(cfg.resolve_filter(Some("debug".into())).as_deref(), Some("debug"));
    }

    #[test]
    fn blank_filter_falls_back_to_default_level() {
        let cfg = LoggingConfig::default();
        assert_eq!(cfg.resolve_filter(Some("  ".into())), None);
        assert_eq!(cfg.resolve_filter(None), None);
        assert_eq!(cfg.default_level, log::LevelFilter::Info);
    }

    #[test]
    fn init_is_idempotent() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig::default());
    }
}
