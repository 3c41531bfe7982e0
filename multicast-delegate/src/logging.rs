//! Subscriber setup for watching delegate dispatch
//!
//! The library only emits `tracing` events under the `multicast_delegate`
//! target: refused or skipped broadcast entries at `warn`, broadcasts and
//! single dispatch failures at `debug`, registration changes at `trace`.
//! Each [`LoggingMode`] selects how much of that to show.
//!
//! Available with the `logging` feature.

use tracing_subscriber::filter::{Directive, EnvFilter, ParseError};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Registry;

const CRATE_TARGET: &str = "multicast_delegate";

/// How much delegate activity to report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggingMode {
    /// No subscriber is installed
    #[default]
    Silent,
    /// Broadcast entries that were refused or skipped
    Failures,
    /// Every broadcast, with per-delegate failures
    Broadcasts,
    /// Everything above plus register/unregister/prune events
    Registrations,
}

impl LoggingMode {
    /// Filter directive for this crate's events, `None` when silent
    pub fn directive(&self) -> Option<String> {
        let level = match self {
            LoggingMode::Silent => return None,
            LoggingMode::Failures => "warn",
            LoggingMode::Broadcasts => "debug",
            LoggingMode::Registrations => "trace",
        };
        Some(format!("{}={}", CRATE_TARGET, level))
    }

    /// Parse a `DELEGATE_LOG_MODE` value; unknown values are silent
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("failures") => LoggingMode::Failures,
            Some("broadcasts") => LoggingMode::Broadcasts,
            Some("registrations") => LoggingMode::Registrations,
            _ => LoggingMode::Silent,
        }
    }
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid filter directive `{directive}`: {reason}")]
    InvalidDirective { directive: String, reason: String },

    #[error("failed to install tracing subscriber: {0}")]
    TracingInit(String),
}

/// Install a global subscriber for `mode`
///
/// `extra` holds comma-separated directives layered on top of the mode's
/// own, e.g. `my_app=info` to see the application's events too.
///
/// ```rust,ignore
/// use multicast_delegate::logging::{init_logging, LoggingMode};
///
/// init_logging(LoggingMode::Broadcasts, Some("my_app=info"))?;
/// ```
pub fn init_logging(mode: LoggingMode, extra: Option<&str>) -> Result<(), LoggingError> {
    let Some(filter) = build_filter(mode, extra)? else {
        return Ok(());
    };

    // Registration events are easier to follow with their call site
    let verbose = mode == LoggingMode::Registrations;
    Registry::default()
        .with(
            fmt::layer()
                .compact()
                .with_target(verbose)
                .with_file(verbose)
                .with_line_number(verbose),
        )
        .with(filter)
        .try_init()
        .map_err(|e| LoggingError::TracingInit(e.to_string()))
}

/// Install a subscriber from `DELEGATE_LOG_MODE` and `DELEGATE_LOG_FILTER`
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = LoggingMode::from_env_value(std::env::var("DELEGATE_LOG_MODE").ok().as_deref());
    let extra = std::env::var("DELEGATE_LOG_FILTER").ok();
    init_logging(mode, extra.as_deref())
}

/// Check if a global subscriber has been installed
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

fn build_filter(mode: LoggingMode, extra: Option<&str>) -> Result<Option<EnvFilter>, LoggingError> {
    let Some(base) = mode.directive() else {
        return Ok(None);
    };

    let mut filter = EnvFilter::new(base);
    for directive in extra.into_iter().flat_map(|e| e.split(',')).map(str::trim) {
        if directive.is_empty() {
            continue;
        }
        let parsed: Directive = directive.parse().map_err(|e: ParseError| LoggingError::InvalidDirective {
            directive: directive.to_string(),
            reason: e.to_string(),
        })?;
        filter = filter.add_directive(parsed);
    }
    Ok(Some(filter))
}
