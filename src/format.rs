//! Timestamp formatting and the process-wide format provider.
//!
//! Rendering a [`Timestamp`] into line markup is pluggable behind the
//! [`TimestampFormat`] trait. The active format is a process-wide singleton
//! that an administrator can swap at any time; annotators fetch it fresh via
//! [`get`] on every line, so a swap takes effect immediately for every live
//! session without restarting any of them.

use crate::markup::MarkupText;
use crate::timestamp::Timestamp;
use chrono::format::StrftimeItems;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::{Arc, OnceLock};

/// Renders a timestamp into a line's markup.
///
/// Implementations must be `Send + Sync`: one format instance serves every
/// session in the process.
pub trait TimestampFormat: Send + Sync {
    /// Insert the human-facing timestamp markup into the line.
    ///
    /// Pure side effect on the line; the raw marker is hidden separately by
    /// the annotator.
    fn markup(&self, line: &mut MarkupText, timestamp: &Timestamp);
}

/// Default format: time elapsed since the build started, as `H:MM:SS.mmm`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElapsedFormat;

impl ElapsedFormat {
    fn render(elapsed_millis: i64) -> String {
        let sign = if elapsed_millis < 0 { "-" } else { "" };
        let total = elapsed_millis.unsigned_abs();
        let millis = total % 1_000;
        let seconds = (total / 1_000) % 60;
        let minutes = (total / 60_000) % 60;
        let hours = total / 3_600_000;
        format!("{sign}{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
    }
}

impl TimestampFormat for ElapsedFormat {
    fn markup(&self, line: &mut MarkupText, timestamp: &Timestamp) {
        let rendered = Self::render(timestamp.elapsed_millis);
        line.insert_tag(0, format!("<span class=\"timestamp\">{rendered}</span> "));
    }
}

/// Wall-clock format: the marker's absolute UTC instant rendered with a
/// configurable strftime pattern.
#[derive(Debug, Clone)]
pub struct SystemClockFormat {
    pattern: String,
}

impl SystemClockFormat {
    /// Fallback pattern used when a configured pattern does not parse.
    pub const DEFAULT_PATTERN: &'static str = "%H:%M:%S";

    /// Create a format with the given strftime pattern.
    ///
    /// An invalid pattern is replaced by [`Self::DEFAULT_PATTERN`] with a
    /// warning, so a bad configuration value can never poison rendering.
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        if StrftimeItems::new(&pattern).parse().is_ok() {
            Self { pattern }
        } else {
            log::warn!(
                "invalid clock format pattern {pattern:?}, falling back to {:?}",
                Self::DEFAULT_PATTERN
            );
            Self {
                pattern: Self::DEFAULT_PATTERN.to_string(),
            }
        }
    }
}

impl Default for SystemClockFormat {
    fn default() -> Self {
        Self {
            pattern: Self::DEFAULT_PATTERN.to_string(),
        }
    }
}

impl TimestampFormat for SystemClockFormat {
    fn markup(&self, line: &mut MarkupText, timestamp: &Timestamp) {
        // Out-of-range instants cannot be rendered; leave the line to the
        // marker-hiding pass only.
        let Some(instant) = DateTime::<Utc>::from_timestamp_millis(timestamp.millis_since_epoch)
        else {
            return;
        };
        let rendered = instant.format(&self.pattern);
        line.insert_tag(0, format!("<span class=\"timestamp\">{rendered}</span> "));
    }
}

static PROVIDER: OnceLock<RwLock<Arc<dyn TimestampFormat>>> = OnceLock::new();

fn provider() -> &'static RwLock<Arc<dyn TimestampFormat>> {
    PROVIDER.get_or_init(|| RwLock::new(Arc::new(ElapsedFormat) as Arc<dyn TimestampFormat>))
}

/// The currently configured timestamp format.
///
/// Callers must fetch this fresh for every line rather than caching it, so
/// that [`set`] takes effect mid-session.
pub fn get() -> Arc<dyn TimestampFormat> {
    provider().read().clone()
}

/// Swap the process-wide timestamp format.
pub fn set(format: Arc<dyn TimestampFormat>) {
    *provider().write() = format;
}
