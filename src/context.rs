//! Execution contexts and start-time resolution.
//!
//! A console line is produced either by a flat build or by a node inside a
//! staged/parallel execution graph. Annotation needs one thing from either
//! shape, the start time of the underlying build, and
//! [`resolve_start_time`] is the single dispatch point that extracts it.
//!
//! The core never owns a context; the host passes a borrow with every call.

use std::sync::Arc;
use thiserror::Error;

/// Failure while resolving a graph node's owning executable.
///
/// Resolution goes through the host's execution store, so it can fail with
/// I/O errors. Callers in this crate treat such failures as "annotation not
/// applicable" and log them at diagnostic level.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The owning executable could not be loaded from the execution store.
    #[error("failed to load owning executable: {0}")]
    Io(#[from] std::io::Error),
}

/// A flat build: the top-level unit of execution with a recorded start time.
pub trait FlatBuild: Send + Sync {
    /// Start time of this build in milliseconds since the Unix epoch.
    fn start_time_millis(&self) -> i64;

    /// Whether this build is the top-level owner of a tracked execution and
    /// therefore a valid target for annotation.
    fn is_execution_owner(&self) -> bool;
}

/// Something the execution queue ran. May or may not be a build.
pub trait Executable: Send + Sync {
    /// The flat-build view of this executable, if it is one.
    fn as_build(&self) -> Option<&dyn FlatBuild>;
}

/// A node inside a staged/parallel execution graph.
pub trait GraphNode: Send + Sync {
    /// Resolve the executable owning this node's execution.
    ///
    /// `Ok(None)` means the owner is absent (a normal outcome, e.g. for a
    /// detached or still-loading execution); `Err` means the owner exists but
    /// its executable could not be fetched.
    fn owning_executable(&self) -> Result<Option<Arc<dyn Executable>>, ResolveError>;
}

/// The producer of a console line stream.
#[derive(Clone, Copy)]
pub enum ExecutionContext<'a> {
    /// A flat build writing its own log.
    FlatBuild(&'a dyn FlatBuild),
    /// A node inside an execution graph, writing to the shared build log.
    GraphNode(&'a dyn GraphNode),
}

/// Resolve the reference start time for a context, in milliseconds since the
/// Unix epoch.
///
/// Returns `None` whenever annotation is not applicable: the build does not
/// own a tracked execution, the node's owner is absent, the owning executable
/// is not a build, or fetching it failed. The I/O failure case is logged at
/// debug level and otherwise swallowed; this function never propagates an
/// error.
pub fn resolve_start_time(context: ExecutionContext<'_>) -> Option<i64> {
    match context {
        ExecutionContext::FlatBuild(build) => build
            .is_execution_owner()
            .then(|| build.start_time_millis()),
        ExecutionContext::GraphNode(node) => match node.owning_executable() {
            Ok(Some(executable)) => executable.as_build().map(|b| b.start_time_millis()),
            Ok(None) => None,
            Err(err) => {
                log::debug!("could not resolve owning executable: {err}");
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct StubBuild {
        start: i64,
        owner: bool,
    }

    impl FlatBuild for StubBuild {
        fn start_time_millis(&self) -> i64 {
            self.start
        }
        fn is_execution_owner(&self) -> bool {
            self.owner
        }
    }

    struct BuildExecutable(StubBuild);

    impl Executable for BuildExecutable {
        fn as_build(&self) -> Option<&dyn FlatBuild> {
            Some(&self.0)
        }
    }

    struct OpaqueExecutable;

    impl Executable for OpaqueExecutable {
        fn as_build(&self) -> Option<&dyn FlatBuild> {
            None
        }
    }

    enum StubNode {
        Resolved(Arc<dyn Executable>),
        OwnerMissing,
        LoadFailure,
    }

    impl GraphNode for StubNode {
        fn owning_executable(&self) -> Result<Option<Arc<dyn Executable>>, ResolveError> {
            match self {
                StubNode::Resolved(executable) => Ok(Some(Arc::clone(executable))),
                StubNode::OwnerMissing => Ok(None),
                StubNode::LoadFailure => {
                    Err(io::Error::new(io::ErrorKind::NotFound, "build record gone").into())
                }
            }
        }
    }

    #[test]
    fn test_flat_build_resolves_to_its_start_time() {
        let build = StubBuild {
            start: 1_514_862_245_000,
            owner: true,
        };
        let start = resolve_start_time(ExecutionContext::FlatBuild(&build));
        assert_eq!(start, Some(1_514_862_245_000));
    }

    #[test]
    fn test_flat_build_without_owned_execution_is_not_applicable() {
        let build = StubBuild {
            start: 42,
            owner: false,
        };
        assert_eq!(resolve_start_time(ExecutionContext::FlatBuild(&build)), None);
    }

    #[test]
    fn test_graph_node_resolves_through_its_owner() {
        let node = StubNode::Resolved(Arc::new(BuildExecutable(StubBuild {
            start: 7_000,
            owner: true,
        })));
        let start = resolve_start_time(ExecutionContext::GraphNode(&node));
        assert_eq!(start, Some(7_000));
    }

    #[test]
    fn test_graph_node_with_missing_owner_is_not_applicable() {
        let node = StubNode::OwnerMissing;
        assert_eq!(resolve_start_time(ExecutionContext::GraphNode(&node)), None);
    }

    #[test]
    fn test_graph_node_with_non_build_executable_is_not_applicable() {
        let node = StubNode::Resolved(Arc::new(OpaqueExecutable));
        assert_eq!(resolve_start_time(ExecutionContext::GraphNode(&node)), None);
    }

    #[test]
    fn test_load_failure_is_swallowed() {
        let node = StubNode::LoadFailure;
        assert_eq!(resolve_start_time(ExecutionContext::GraphNode(&node)), None);
    }
}
