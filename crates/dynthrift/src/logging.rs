use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Prefix shared by every crate in the workspace (`dynthrift_value::container`, ...).
const CRATE_PREFIX: &str = "dynthrift";

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Only codec, client and CLI events pass; dependencies stay quiet.
fn crate_filter(level: LogLevel) -> Targets {
    Targets::new().with_target(CRATE_PREFIX, level.as_filter())
}

/// Install the stderr subscriber. Library crates only emit events; this is
/// the one place they get printed. Event targets are shown from `debug` up,
/// where skips and reply checks come from several crates.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(level >= LogLevel::Debug);
    let filter = crate_filter(level);

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
    use tracing::Level;

    use super::*;

    #[test]
    fn filter_covers_workspace_crates() {
        let filter = crate_filter(LogLevel::Info);
        assert!(filter.would_enable("dynthrift", &Level::INFO));
        assert!(filter.would_enable("dynthrift_client::client", &Level::WARN));
        assert!(!filter.would_enable("dynthrift_value::dispatch", &Level::DEBUG));
    }

    #[test]
    fn filter_drops_other_targets() {
        let filter = crate_filter(LogLevel::Trace);
        assert!(!filter.would_enable("mio::poll", &Level::ERROR));
        assert!(filter.would_enable("dynthrift_protocol::binary", &Level::TRACE));
    }
}
