//! Per-line timestamp annotation of marked-up console output.
//!
//! An upstream writer stamps every line of a build log with a raw marker,
//! `[2018-01-02T03:04:05.006Z]Started stage`. When the log is replayed to a
//! viewer, a [`TimestampAnnotator`] runs once per line: it finds the marker
//! (stepping over markup other annotators already applied), parses it,
//! delegates rendering of the human-facing timestamp to the configured
//! [`TimestampFormat`](crate::format::TimestampFormat), and hides the raw
//! marker under a zero-display span.
//!
//! Sessions are independent and resumable: the annotator carries no state
//! between lines, so the host may pause a session and later replay
//! non-contiguous line ranges against the same instance.

use crate::context::{ExecutionContext, resolve_start_time};
use crate::format;
use crate::markup::MarkupText;
use crate::timestamp::{MARKER_WIDTH, Timestamp, parse_marker_instant};

/// Wrapper applied by the log storage when a new graph node starts writing.
const NEW_NODE_PREFIX: &str = "<span class=\"pipeline-new-node\" ";

/// Wrapper applied by the ANSI-to-markup renderer for foreground colors.
const FG_COLOR_PREFIX: &str = "<span style=\"color";

/// Generic wrapper any other annotator can emit to keep its own output from
/// colliding with marker detection.
const SKIP_PREFIX: &str = "<span data-logstamper";

/// Wrapper prefixes skipped before marker detection, in the order they are
/// applied to a line. At most one of each kind is expected per line.
const WRAPPER_PREFIXES: [&str; 3] = [NEW_NODE_PREFIX, FG_COLOR_PREFIX, SKIP_PREFIX];

/// Opening tag hiding the raw marker in the rendered line.
const HIDDEN_OPEN: &str = "<span style=\"display: none\">";

/// The annotator to use for the next line of a session.
#[derive(Debug)]
pub enum Continuation {
    /// Keep annotating with the given annotator.
    Continue(TimestampAnnotator),
    /// The context can no longer be annotated; stop for the rest of the
    /// session.
    Stop,
}

impl Continuation {
    /// The successor annotator, if the session continues.
    pub fn into_annotator(self) -> Option<TimestampAnnotator> {
        match self {
            Continuation::Continue(annotator) => Some(annotator),
            Continuation::Stop => None,
        }
    }

    /// Whether the session continues.
    pub fn is_continue(&self) -> bool {
        matches!(self, Continuation::Continue(_))
    }
}

/// Obtain an annotator for a log-consuming session, if annotation applies to
/// the context at all.
///
/// Every inapplicable case (a build that does not own a tracked execution, a
/// graph node whose owner is absent or whose executable cannot be fetched or
/// is not a build) yields `None` rather than an error.
pub fn create_annotator(context: ExecutionContext<'_>) -> Option<TimestampAnnotator> {
    resolve_start_time(context).map(|_| TimestampAnnotator::new())
}

/// Stateful per-session line transform that surfaces the timestamps encoded
/// in raw markers.
///
/// Stateless by construction: the build start time is re-resolved from the
/// context on every call rather than cached, so one instance stays correct
/// even if the host hands it heterogeneous contexts across calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampAnnotator;

impl TimestampAnnotator {
    /// Create an annotator. Most hosts should go through
    /// [`create_annotator`], which first checks that the context supports
    /// annotation.
    pub fn new() -> Self {
        Self
    }

    /// Annotate one line and return the annotator for the next one.
    ///
    /// Every failure mode degrades to leaving the line untouched: a line
    /// without a marker, or with a bracketed token that is not a marker,
    /// passes through byte-identical and the session continues. Only an
    /// unresolvable context ends the session.
    pub fn annotate(self, context: ExecutionContext<'_>, line: &mut MarkupText) -> Continuation {
        let Some(build_start_millis) = resolve_start_time(context) else {
            return Continuation::Stop;
        };

        let rendered = line.rendered();
        let cursor = skip_wrapper_prefixes(&rendered);

        let Some(body) = marker_body(&rendered[cursor..]) else {
            return Continuation::Continue(self);
        };
        let Some(millis_since_epoch) = parse_marker_instant(body) else {
            // A bracketed token from some other annotator; not ours to touch.
            return Continuation::Continue(self);
        };

        let timestamp = Timestamp::new(millis_since_epoch, build_start_millis);
        // Fetched fresh per line so a format swap reaches live sessions.
        format::get().markup(line, &timestamp);
        // The marker always sits at the head of the underlying text: the
        // wrappers skipped above are zero-width tags layered over it, not
        // part of the text content.
        line.add_markup(0, MARKER_WIDTH, HIDDEN_OPEN, "</span>");

        Continuation::Continue(self)
    }
}

/// Advance past the known wrapper prefixes at the head of a rendered line,
/// returning the byte offset where marker detection starts.
fn skip_wrapper_prefixes(rendered: &str) -> usize {
    let mut cursor = 0;
    for prefix in WRAPPER_PREFIXES {
        if rendered[cursor..].starts_with(prefix)
            && let Some(close) = rendered[cursor..].find('>')
        {
            cursor += close + 1;
        }
    }
    cursor
}

/// The text strictly between a leading `[` and the first `]` after it, if
/// the slice starts with a bracketed token.
fn marker_body(rendered: &str) -> Option<&str> {
    let rest = rendered.strip_prefix('[')?;
    let end = rest.find(']')?;
    Some(&rest[..end])
}
