//! Streaming timestamp annotation for build console logs.
//!
//! An upstream writer stamps every line of a build log with a compact raw
//! marker such as `[2018-01-02T03:04:05.006Z]Compiling crate` as it is
//! emitted.
//! When the log is later streamed to a viewer, this crate rewrites each line
//! so the raw marker is hidden and a human-readable timestamp (elapsed time
//! or wall clock) is shown in its place.
//!
//! The host obtains a [`TimestampAnnotator`] from [`create_annotator`] when a
//! log-consuming session begins, then invokes it once per delivered line.
//! Each call returns a [`Continuation`] naming the annotator for the next
//! line, so a session either keeps running or ends cleanly when its context
//! stops supporting annotation. Lines produced by a flat build and lines
//! produced by a node inside a staged/parallel execution graph are handled
//! through the same [`ExecutionContext`] seam.
//!
//! Malformed input never aborts a stream: a line without a marker, a
//! bracketed token written by some other annotator, or a context whose
//! backing build cannot be loaded all degrade to an un-annotated line.

pub mod annotator;
pub mod config;
pub mod context;
pub mod format;
pub mod markup;
pub mod timestamp;

pub use annotator::{Continuation, TimestampAnnotator, create_annotator};
pub use context::{
    Executable, ExecutionContext, FlatBuild, GraphNode, ResolveError, resolve_start_time,
};
pub use format::{ElapsedFormat, SystemClockFormat, TimestampFormat};
pub use markup::MarkupText;
pub use timestamp::{MARKER_WIDTH, Timestamp};
