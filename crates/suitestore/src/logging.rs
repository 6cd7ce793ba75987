//! Subscriber setup for `suitectl`.
//!
//! The library only emits `tracing` events: `info` when a collection is
//! seeded, `debug` for each collection read and write, `warn` for skipped
//! records, unreadable collections and mutations that matched nothing.
//! Nothing is printed unless the binary (or a test) installs a subscriber.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How chatty `suitectl` is, as picked by `-q` and `-v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// `-q`: errors only.
    Quiet,
    /// Seeding and warnings.
    #[default]
    Normal,
    /// `-v`: every collection read and write.
    Verbose,
    /// `-vv`
    Trace,
}

impl Verbosity {
    /// Most detailed level shown for suitestore events.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    fn directive(self) -> String {
        format!("suitestore={}", self.level())
    }
}

/// Install the stderr subscriber.
///
/// `RUST_LOG`, when set and valid, replaces the filter derived from
/// `verbosity`. Event targets are shown from `-v` up. Calling this again
/// after a subscriber is installed does nothing.
///
/// ```no_run
/// use suitestore::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity >= Verbosity::Verbose)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init();
}

/// Warnings through the test harness writer, so skipped-record and
/// corrupt-collection messages show up under `--nocapture`.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_scopes_to_crate() {
        assert_eq!(Verbosity::Quiet.directive(), "suitestore=ERROR");
        assert_eq!(Verbosity::Normal.directive(), "suitestore=INFO");
        assert_eq!(Verbosity::Verbose.directive(), "suitestore=DEBUG");
        assert_eq!(Verbosity::Trace.directive(), "suitestore=TRACE");
    }

    #[test]
    fn test_flags_order_by_detail() {
        assert_eq!(Verbosity::default(), Verbosity::Normal);
        assert!(Verbosity::Quiet < Verbosity::Normal);
        assert!(Verbosity::Verbose < Verbosity::Trace);
        assert!(Verbosity::Quiet.level() < Verbosity::Trace.level());
    }

    #[test]
    fn test_repeated_init_is_harmless() {
        for verbosity in [Verbosity::Quiet, Verbosity::Trace, Verbosity::Normal] {
            init_logging(verbosity);
        }
        init_test_logging();
        tracing::warn!("after a subscriber is already installed");
    }
}
