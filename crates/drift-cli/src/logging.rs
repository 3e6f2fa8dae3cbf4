//! Native `log` backend.

use log::LevelFilter;
use std::sync::Once;

/// Crates whose level `LoggingConfig::drift_level` controls.
const DRIFT_CRATES: [&str; 3] = ["drift_core", "drift_render", "drift_cli"];

/// How the `drift` binary logs to stderr.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level for every target without a more specific directive.
    pub level: LevelFilter,
    /// Level for the drift crates; `None` leaves them at `level`.
    pub drift_level: Option<LevelFilter>,
    /// When set, a non-empty `RUST_LOG` replaces the derived filter.
    pub honor_rust_log: bool,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            drift_level: None,
            honor_rust_log: true,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Debug output from the drift crates, dependencies stay at `info`.
    pub fn verbose() -> Self {
        Self {
            drift_level: Some(LevelFilter::Debug),
            ..Self::default()
        }
    }

    /// The `env_logger` filter this config describes.
    pub fn filter(&self) -> String {
        let mut directives = vec![level_name(self.level).to_string()];
        if let Some(level) = self.drift_level {
            directives.extend(
                DRIFT_CRATES
                    .iter()
                    .map(|krate| format!("{krate}={}", level_name(level))),
            );
        }
        directives.join(",")
    }

    fn effective_filter(&self) -> String {
        if self.honor_rust_log
            && let Ok(filter) = std::env::var("RUST_LOG")
            && !filter.trim().is_empty()
        {
            return filter;
        }
        self.filter()
    }
}

fn level_name(level: LevelFilter) -> &'static str {
    match level {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}

static INIT: Once = Once::new();

/// Install the stderr logger once; later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.effective_filter();
        let installed = env_logger::Builder::new()
            .parse_filters(&filter)
            .write_style(config.write_style)
            .format_timestamp_millis()
            .try_init();
        if installed.is_ok() {
            log::debug!("logging to stderr with filter {filter:?}");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_filter_is_a_single_level() {
        assert_eq!(LoggingConfig::default().filter(), "info");
    }

    #[test]
    fn verbose_raises_only_drift_crates() {
        assert_eq!(
            LoggingConfig::verbose().filter(),
            "info,drift_core=debug,drift_render=debug,drift_cli=debug"
        );
    }

    #[test]
    fn quiet_base_with_traced_crates() {
        let config = LoggingConfig {
            level: LevelFilter::Warn,
            drift_level: Some(LevelFilter::Trace),
            honor_rust_log: false,
            ..LoggingConfig::default()
        };
        assert_eq!(
            config.filter(),
            "warn,drift_core=trace,drift_render=trace,drift_cli=trace"
        );
        assert_eq!(config.effective_filter(), config.filter());
    }
}
