//! Timestamp values derived from raw log markers.
//!
//! An upstream writer stamps every console line with a compact marker of the
//! form `[2018-01-02T03:04:05.006Z]`: UTC, millisecond precision, fixed
//! width. This module owns the marker encoding (parsing only) and the
//! [`Timestamp`] value computed from it.

use chrono::NaiveDateTime;

/// Strftime pattern of the marker body (UTC, millisecond precision).
pub const MARKER_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Rendered width of a raw marker including the surrounding brackets.
///
/// The encoding is fixed-width (24 characters of timestamp text plus two
/// brackets), so the annotator hides exactly this many leading characters.
pub const MARKER_WIDTH: usize = 26;

/// A display timestamp for one console line.
///
/// Computed fresh per line from the marker's absolute instant and the
/// producing build's start time. `elapsed_millis` may be negative when the
/// marker predates the recorded start time; that is valid arithmetic, not an
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    /// Milliseconds since the build started.
    pub elapsed_millis: i64,
    /// Milliseconds since the Unix epoch.
    pub millis_since_epoch: i64,
}

impl Timestamp {
    /// Build a timestamp from a marker instant and a build start time, both
    /// in milliseconds since the epoch.
    pub fn new(millis_since_epoch: i64, build_start_millis: i64) -> Self {
        Self {
            elapsed_millis: millis_since_epoch - build_start_millis,
            millis_since_epoch,
        }
    }
}

/// Parse the body of a raw marker (the text between the brackets) into
/// milliseconds since the epoch.
///
/// The parse is strict: anything that is not exactly the fixed UTC
/// millisecond encoding yields `None`. Other annotators emit superficially
/// similar bracketed text, so a mismatch is expected and never an error.
pub fn parse_marker_instant(body: &str) -> Option<i64> {
    // The encoding is fixed-width; reject anything of the wrong width before
    // handing it to the date parser.
    if body.len() != MARKER_WIDTH - 2 {
        return None;
    }
    NaiveDateTime::parse_from_str(body, MARKER_FORMAT)
        .ok()
        .map(|dt| dt.and_utc().timestamp_millis())
}
