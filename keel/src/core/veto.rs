//! Status resolution for actuation vetoes.

use crate::core::types::ResourceStatus;

/// Reason fragment emitted by dependency vetoes that predate `suggested_status`.
const MISSING_DEPENDENCY_MARKER: &str = "is not found in";

/// Resolve the status a veto implies for its resource.
///
/// - An explicit `suggested_status` is used verbatim.
/// - Otherwise a reason containing "is not found in" (any case) means
///   `MISSING_DEPENDENCY`.
/// - Every other veto is `UNHAPPY`.
pub fn resolve_veto_status(
    reason: Option<&str>,
    suggested_status: Option<ResourceStatus>,
) -> ResourceStatus {
    if let Some(status) = suggested_status {
        return status;
    }
    if reason.is_some_and(mentions_missing_dependency) {
        return ResourceStatus::MissingDependency;
    }
    ResourceStatus::Unhappy
}

fn mentions_missing_dependency(reason: &str) -> bool {
    reason.to_lowercase().contains(MISSING_DEPENDENCY_MARKER)
}
