//! Deterministic classification of a resource's recent history into a status.
//!
//! Rules are evaluated top to bottom against the newest-first event window and
//! the first match wins. The order is a precedence contract: in particular the
//! `UNHAPPY` rule sits after every other veto-derived status so an explicit
//! resolution is never shadowed by the saturation heuristic.

use crate::core::types::{ResourceHistoryEvent, ResourceStatus};
use crate::core::veto::resolve_veto_status;

/// Maximum number of recent events the classifier looks at.
pub const HISTORY_WINDOW: usize = 10;

type Matcher = fn(&[ResourceHistoryEvent]) -> bool;

/// Ordered `(status, predicate)` table. Predicates receive a non-empty window.
const RULES: &[(ResourceStatus, Matcher)] = &[
    (ResourceStatus::Happy, is_happy),
    (ResourceStatus::MissingDependency, is_missing_dependency),
    (ResourceStatus::Unhappy, is_unhappy),
    (ResourceStatus::Diff, is_diff),
    (ResourceStatus::Actuating, is_actuating),
    (ResourceStatus::DiffNotActionable, is_diff_not_actionable),
    (ResourceStatus::Error, is_error),
    (ResourceStatus::Created, is_created),
    (ResourceStatus::Resumed, is_resumed),
    (ResourceStatus::CurrentlyUnresolvable, is_currently_unresolvable),
];

/// Classify a resource from its pause flag and newest-first history.
///
/// - `paused` short-circuits to `PAUSED` regardless of events.
/// - Only the first [`HISTORY_WINDOW`] events are considered.
/// - An empty history, or one matching no rule, is `UNKNOWN`.
pub fn classify_status(paused: bool, history: &[ResourceHistoryEvent]) -> ResourceStatus {
    if paused {
        return ResourceStatus::Paused;
    }

    let window = recent_window(history);
    if window.is_empty() {
        return ResourceStatus::Unknown;
    }

    RULES
        .iter()
        .find(|(_, matches)| matches(window))
        .map(|(status, _)| *status)
        .unwrap_or(ResourceStatus::Unknown)
}

/// Newest-first prefix of at most [`HISTORY_WINDOW`] events.
pub fn recent_window(history: &[ResourceHistoryEvent]) -> &[ResourceHistoryEvent] {
    &history[..history.len().min(HISTORY_WINDOW)]
}

fn newest(window: &[ResourceHistoryEvent]) -> Option<&ResourceHistoryEvent> {
    window.first()
}

fn newest_veto_resolves_to(window: &[ResourceHistoryEvent], status: ResourceStatus) -> bool {
    match newest(window) {
        Some(ResourceHistoryEvent::ActuationVetoed {
            reason,
            suggested_status,
        }) => resolve_veto_status(reason.as_deref(), *suggested_status) == status,
        _ => false,
    }
}

fn is_happy(window: &[ResourceHistoryEvent]) -> bool {
    matches!(
        newest(window),
        Some(ResourceHistoryEvent::Valid | ResourceHistoryEvent::DeltaResolved)
    )
}

fn is_missing_dependency(window: &[ResourceHistoryEvent]) -> bool {
    newest_veto_resolves_to(window, ResourceStatus::MissingDependency)
}

fn is_unhappy(window: &[ResourceHistoryEvent]) -> bool {
    newest_veto_resolves_to(window, ResourceStatus::Unhappy) || is_saturated(window)
}

/// True if every event in the window is a diff or a launch: the resource keeps
/// flapping between "delta detected" and "actuation launched" without resolving.
///
/// No minimum window size applies; a single qualifying event saturates.
fn is_saturated(window: &[ResourceHistoryEvent]) -> bool {
    !window.is_empty()
        && window.iter().all(|event| {
            matches!(
                event,
                ResourceHistoryEvent::DeltaDetected | ResourceHistoryEvent::ActuationLaunched
            )
        })
}

fn is_diff(window: &[ResourceHistoryEvent]) -> bool {
    matches!(
        newest(window),
        Some(ResourceHistoryEvent::DeltaDetected | ResourceHistoryEvent::Missing)
    )
}

fn is_actuating(window: &[ResourceHistoryEvent]) -> bool {
    matches!(
        newest(window),
        Some(
            ResourceHistoryEvent::ActuationLaunched
                | ResourceHistoryEvent::TaskSucceeded
                // may move to ERROR eventually
                | ResourceHistoryEvent::TaskFailed
        )
    )
}

fn is_diff_not_actionable(window: &[ResourceHistoryEvent]) -> bool {
    matches!(newest(window), Some(ResourceHistoryEvent::DiffNotActionable))
}

fn is_error(window: &[ResourceHistoryEvent]) -> bool {
    matches!(newest(window), Some(ResourceHistoryEvent::CheckError))
}

fn is_created(window: &[ResourceHistoryEvent]) -> bool {
    matches!(newest(window), Some(ResourceHistoryEvent::Created))
}

fn is_resumed(window: &[ResourceHistoryEvent]) -> bool {
    matches!(
        newest(window),
        Some(
            ResourceHistoryEvent::ActuationResumed
                | ResourceHistoryEvent::ApplicationActuationResumed
        )
    )
}

fn is_currently_unresolvable(window: &[ResourceHistoryEvent]) -> bool {
    matches!(newest(window), Some(ResourceHistoryEvent::CheckUnresolvable))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ResourceHistoryEvent as E;
    use crate::test_support::veto;

    /// Alternating diff/launch events, newest first, ending on `newest`.
    fn flapping(len: usize, newest: E) -> Vec<E> {
        let mut history = vec![newest];
        for i in 1..len {
            history.push(if i % 2 == 0 {
                E::DeltaDetected
            } else {
                E::ActuationLaunched
            });
        }
        history
    }

    #[test]
    fn paused_overrides_any_history() {
        assert_eq!(classify_status(true, &[]), ResourceStatus::Paused);
        assert_eq!(classify_status(true, &[E::Valid]), ResourceStatus::Paused);
        assert_eq!(
            classify_status(true, &flapping(10, E::DeltaDetected)),
            ResourceStatus::Paused
        );
    }

    #[test]
    fn empty_history_is_unknown() {
        assert_eq!(classify_status(false, &[]), ResourceStatus::Unknown);
    }

    #[test]
    fn valid_and_delta_resolved_are_happy() {
        assert_eq!(
            classify_status(false, &[E::Valid, E::DeltaDetected]),
            ResourceStatus::Happy
        );
        assert_eq!(
            classify_status(false, &[E::DeltaResolved, E::ActuationLaunched]),
            ResourceStatus::Happy
        );
    }

    /// An explicit suggested status is honored even without the legacy reason text.
    #[test]
    fn explicit_missing_dependency_veto() {
        let history = [veto(
            Some("blocked"),
            Some(ResourceStatus::MissingDependency),
        )];
        assert_eq!(
            classify_status(false, &history),
            ResourceStatus::MissingDependency
        );
    }

    #[test]
    fn legacy_reason_veto_is_missing_dependency() {
        let history = [veto(Some("sg-1234 is not found in account prod"), None)];
        assert_eq!(
            classify_status(false, &history),
            ResourceStatus::MissingDependency
        );
    }

    #[test]
    fn generic_veto_is_unhappy() {
        let history = [veto(Some("generic failure"), None), E::Valid];
        assert_eq!(classify_status(false, &history), ResourceStatus::Unhappy);
    }

    /// A veto suggesting an unrelated status matches neither veto rule.
    #[test]
    fn veto_with_other_suggested_status_falls_through() {
        let history = [veto(None, Some(ResourceStatus::DiffNotActionable))];
        assert_eq!(classify_status(false, &history), ResourceStatus::Unknown);
    }

    /// A full window of diffs and launches saturates to UNHAPPY ahead of DIFF/ACTUATING.
    #[test]
    fn saturated_window_is_unhappy() {
        assert_eq!(
            classify_status(false, &flapping(10, E::DeltaDetected)),
            ResourceStatus::Unhappy
        );
        assert_eq!(
            classify_status(false, &flapping(10, E::ActuationLaunched)),
            ResourceStatus::Unhappy
        );
    }

    #[test]
    fn saturation_only_inspects_window() {
        let mut history = flapping(10, E::DeltaDetected);
        history.push(E::Valid);
        history.push(E::CheckError);
        assert_eq!(classify_status(false, &history), ResourceStatus::Unhappy);
    }

    /// One non-qualifying event anywhere in the window disables saturation.
    #[test]
    fn check_error_in_window_prevents_saturation() {
        let mut history = flapping(9, E::DeltaDetected);
        history.insert(5, E::CheckError);
        assert_eq!(history.len(), 10);
        assert_eq!(classify_status(false, &history), ResourceStatus::Diff);

        let mut history = flapping(9, E::ActuationLaunched);
        history.push(E::CheckError);
        assert_eq!(classify_status(false, &history), ResourceStatus::Actuating);
    }

    #[test]
    fn short_qualifying_history_saturates() {
        assert_eq!(
            classify_status(false, &[E::DeltaDetected]),
            ResourceStatus::Unhappy
        );
        assert_eq!(
            classify_status(false, &[E::ActuationLaunched, E::DeltaDetected]),
            ResourceStatus::Unhappy
        );
    }

    #[test]
    fn newest_event_rules() {
        let cases = [
            (vec![E::Missing], ResourceStatus::Diff),
            (vec![E::DeltaDetected, E::Valid], ResourceStatus::Diff),
            (vec![E::ActuationLaunched, E::Created], ResourceStatus::Actuating),
            (vec![E::TaskSucceeded], ResourceStatus::Actuating),
            (vec![E::TaskFailed], ResourceStatus::Actuating),
            (vec![E::DiffNotActionable], ResourceStatus::DiffNotActionable),
            (vec![E::CheckError], ResourceStatus::Error),
            (vec![E::Created], ResourceStatus::Created),
            (vec![E::ActuationResumed], ResourceStatus::Resumed),
            (vec![E::ApplicationActuationResumed], ResourceStatus::Resumed),
            (vec![E::CheckUnresolvable], ResourceStatus::CurrentlyUnresolvable),
            (vec![E::ActuationPaused], ResourceStatus::Unknown),
            (vec![E::ApplicationActuationPaused, E::Valid], ResourceStatus::Unknown),
        ];
        for (history, expected) in cases {
            assert_eq!(
                classify_status(false, &history),
                expected,
                "history {:?}",
                history
            );
        }
    }

    #[test]
    fn recent_window_truncates_to_ten() {
        let history = flapping(15, E::Valid);
        assert_eq!(recent_window(&history).len(), HISTORY_WINDOW);
        assert_eq!(recent_window(&history[..3]).len(), 3);
    }
}
