use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

/// Crates whose events follow `--log-level`.
const LIMERO_TARGETS: [&str; 3] = ["limero", "limero_value", "limero_frame"];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// `level` for the limero crates; anything else is capped at warnings.
pub fn filter_for(level: LogLevel) -> Targets {
    let level = LevelFilter::from(level);
    LIMERO_TARGETS
        .iter()
        .fold(Targets::new(), |targets, target| {
            targets.with_target(*target, level)
        })
        .with_default(level.min(LevelFilter::WARN))
}

/// Install the stderr subscriber. Stdout carries command output only.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let filter = filter_for(level);
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false);

    let _ = match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(layer.with_filter(filter))
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(layer.json().with_filter(filter))
            .try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn level_applies_to_limero_crates() {
        let filter = filter_for(LogLevel::Debug);
        assert!(filter.would_enable("limero_frame::codec", &Level::DEBUG));
        assert!(filter.would_enable("limero_value::cbor", &Level::DEBUG));
        assert!(filter.would_enable("limero::cmd::inspect", &Level::DEBUG));
        assert!(!filter.would_enable("limero_frame::codec", &Level::TRACE));
    }

    #[test]
    fn other_targets_capped_at_warn() {
        let filter = filter_for(LogLevel::Trace);
        assert!(filter.would_enable("clap_builder", &Level::WARN));
        assert!(!filter.would_enable("clap_builder", &Level::INFO));
    }

    #[test]
    fn off_silences_everything() {
        let filter = filter_for(LogLevel::Off);
        assert!(!filter.would_enable("limero_frame::codec", &Level::ERROR));
        assert!(!filter.would_enable("other", &Level::ERROR));
    }
}
