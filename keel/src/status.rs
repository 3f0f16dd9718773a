//! Resource status lookup for `keel status`.
//!
//! Combines the durable pause flag with the most recent event history and
//! hands both to the pure classifier in [`crate::core::classifier`]. Lookups
//! never fail: collaborator errors are logged and reported as `UNKNOWN`.

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::core::classifier::{HISTORY_WINDOW, classify_status};
use crate::core::types::ResourceStatus;
use crate::io::event_store::EventHistoryStore;
use crate::io::pause_store::ActuationPauseTracker;

/// Status plus the inputs it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub resource_id: String,
    pub status: ResourceStatus,
    pub paused: bool,
    /// Number of events the classifier looked at.
    pub events_considered: usize,
    /// Kind of the newest event, if any was read.
    pub newest_event: Option<&'static str>,
}

/// Resource status service over pause and event collaborators.
#[derive(Debug)]
pub struct ResourceStatusService<E, P> {
    events: E,
    pauses: P,
}

impl<E: EventHistoryStore, P: ActuationPauseTracker> ResourceStatusService<E, P> {
    pub fn new(events: E, pauses: P) -> Self {
        Self { events, pauses }
    }

    /// Current status of `resource_id`.
    pub fn get_status(&self, resource_id: &str) -> ResourceStatus {
        self.status_report(resource_id).status
    }

    /// Current status of `resource_id` with diagnostic details.
    ///
    /// The pause flag is consulted first and wins over any history, since it
    /// outlives deleted events. If it cannot be read the result is `UNKNOWN`
    /// and events are not consulted.
    #[instrument(skip(self))]
    pub fn status_report(&self, resource_id: &str) -> StatusReport {
        let mut report = StatusReport {
            resource_id: resource_id.to_string(),
            status: ResourceStatus::Unknown,
            paused: false,
            events_considered: 0,
            newest_event: None,
        };

        match self.pauses.is_paused(resource_id) {
            Ok(true) => {
                report.paused = true;
                report.status = classify_status(true, &[]);
                return report;
            }
            Ok(false) => {}
            Err(err) => {
                warn!(error = %format!("{:#}", err), "pause flag unavailable; status unknown");
                return report;
            }
        }

        let history = match self.events.event_history(resource_id, HISTORY_WINDOW) {
            Ok(history) => history,
            Err(err) => {
                warn!(error = %format!("{:#}", err), "event history unavailable; status unknown");
                return report;
            }
        };

        report.events_considered = history.len().min(HISTORY_WINDOW);
        report.newest_event = history.first().map(|event| event.kind());
        report.status = classify_status(false, &history);
        debug!(status = %report.status, events = report.events_considered, "classified resource");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ResourceHistoryEvent as E;
    use crate::io::event_store::InMemoryEventHistory;
    use crate::io::pause_store::{InMemoryPauseTracker, PauseRecords};
    use anyhow::{Result, anyhow};

    struct FailingHistory;

    impl EventHistoryStore for FailingHistory {
        fn event_history(&self, _resource_id: &str, _limit: usize) -> Result<Vec<E>> {
            Err(anyhow!("history backend down"))
        }
    }

    struct FailingPauses;

    impl ActuationPauseTracker for FailingPauses {
        fn is_paused(&self, _resource_id: &str) -> Result<bool> {
            Err(anyhow!("pause backend down"))
        }
    }

    fn history() -> InMemoryEventHistory {
        InMemoryEventHistory::new()
            .with_history("happy", vec![E::Valid, E::ActuationLaunched])
            .with_history("owned", vec![E::Valid])
    }

    #[test]
    fn classifies_from_history() {
        let service = ResourceStatusService::new(history(), InMemoryPauseTracker::default());
        assert_eq!(service.get_status("happy"), ResourceStatus::Happy);
        let report = service.status_report("happy");
        assert_eq!(report.events_considered, 2);
        assert_eq!(report.newest_event, Some("Valid"));
    }

    #[test]
    fn missing_history_is_unknown() {
        let service = ResourceStatusService::new(history(), InMemoryPauseTracker::default());
        assert_eq!(service.get_status("nobody"), ResourceStatus::Unknown);
    }

    /// Pause flags outlive event history: a paused resource with no events is PAUSED.
    #[test]
    fn paused_resource_without_history_is_paused() {
        let pauses = InMemoryPauseTracker::new(PauseRecords::default().pause_resource("gone"));
        let service = ResourceStatusService::new(history(), pauses);
        assert_eq!(service.get_status("gone"), ResourceStatus::Paused);
    }

    #[test]
    fn paused_application_pauses_its_resources() {
        let pauses = InMemoryPauseTracker::new(
            PauseRecords::default()
                .pause_application("fnord")
                .with_owner("owned", "fnord"),
        );
        let service = ResourceStatusService::new(history(), pauses);
        assert_eq!(service.get_status("owned"), ResourceStatus::Paused);
        assert_eq!(service.get_status("happy"), ResourceStatus::Happy);
    }

    /// Pause wins without touching the event store.
    #[test]
    fn paused_skips_event_lookup() {
        let pauses = InMemoryPauseTracker::new(PauseRecords::default().pause_resource("r"));
        let service = ResourceStatusService::new(FailingHistory, pauses);
        assert_eq!(service.get_status("r"), ResourceStatus::Paused);
    }

    #[test]
    fn collaborator_failures_are_unknown() {
        let service = ResourceStatusService::new(FailingHistory, InMemoryPauseTracker::default());
        assert_eq!(service.get_status("r"), ResourceStatus::Unknown);

        let service = ResourceStatusService::new(history(), FailingPauses);
        let report = service.status_report("happy");
        assert_eq!(report.status, ResourceStatus::Unknown);
        assert_eq!(report.events_considered, 0);
    }
}
