//! Subscriber setup for processes that drive the estimators.
//!
//! Library crates in this workspace only emit events. A host process (a
//! benchmark, a simulation, a test) installs the subscriber with one of the
//! functions below. `RUST_LOG` overrides the caller-supplied level when set.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable read by [`LogFormat::from_env`].
pub const LOG_FORMAT_ENV: &str = "RETARGET_LOG_FORMAT";

/// Output format for structured logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One human-readable line per event.
    #[default]
    Human,
    /// Newline-delimited JSON, one object per event.
    Json,
}

impl LogFormat {
    /// `"json"` in any case selects [`LogFormat::Json`], anything else is
    /// [`LogFormat::Human`].
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Human
        }
    }

    /// The format named by `RETARGET_LOG_FORMAT`, `Human` when unset.
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .map(|s| Self::parse(&s))
            .unwrap_or_default()
    }
}

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the global subscriber with `format`, filtering at `level`
/// unless `RUST_LOG` says otherwise.
///
/// Returns `false` and leaves the existing one in place when a subscriber
/// is already installed.
pub fn init_logging(format: LogFormat, level: &str) -> bool {
    let registry = tracing_subscriber::registry().with(filter(level));
    let installed = match format {
        LogFormat::Human => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true))
            .try_init(),
    };
    installed.is_ok()
}

/// Install a subscriber writing through the test harness at `debug`.
///
/// Safe to call from every test: returns `false` when a subscriber is
/// already installed.
pub fn try_init_test_tracing() -> bool {
    tracing_subscriber::registry()
        .with(filter("debug"))
        .with(fmt::layer().with_test_writer())
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" JSON\n"), LogFormat::Json);
        assert_eq!(LogFormat::parse("human"), LogFormat::Human);
        assert_eq!(LogFormat::parse("anything"), LogFormat::Human);
        assert_eq!(LogFormat::default(), LogFormat::Human);
    }

    #[test]
    fn test_tracing_is_idempotent() {
        try_init_test_tracing();
        assert!(!try_init_test_tracing());
        assert!(!init_logging(LogFormat::Json, "info"));
    }
}
