//! Receive pipeline for one plate subscription.
//!
//! Every inbound payload flows parse -> plate check -> dedup -> alarm +
//! history. Malformed payloads are logged and skipped; nothing on this path
//! is fatal. Handlers run to completion within one event-loop turn and never
//! block.

use std::sync::Arc;

use tracing::warn;

use crate::dedup::DedupGuard;
use crate::models::Alert;
use crate::notify::Notifier;
use crate::plate::NormalizedPlate;

pub struct AlertProcessor {
    plate: NormalizedPlate,
    dedup: DedupGuard,
    notifier: Arc<dyn Notifier>,
    /// Newest first, capped at `keep`.
    history: Vec<Alert>,
    active: Option<Alert>,
    keep: usize,
}

impl AlertProcessor {
    pub fn new(plate: NormalizedPlate, notifier: Arc<dyn Notifier>, keep: usize) -> Self {
        Self {
            plate,
            dedup: DedupGuard::new(),
            notifier,
            history: Vec::new(),
            active: None,
            keep: keep.max(1),
        }
    }

    /// Handles one raw message from the transport. Returns `true` when the
    /// alert was new and presented to the user.
    pub fn handle_payload(&mut self, payload: &[u8]) -> bool {
        let alert: Alert = match serde_json::from_slice(payload) {
            Ok(alert) => alert,
            Err(e) => {
                warn!("Failed to parse alert payload: {}", e);
                return false;
            }
        };

        if alert.target_plate != self.plate {
            warn!(
                "Alert for {} arrived on the {} channel, dropping",
                alert.target_plate, self.plate
            );
            return false;
        }

        self.deliver(alert)
    }

    /// Presents an already-validated alert: dedup, then alarm and state.
    pub fn deliver(&mut self, alert: Alert) -> bool {
        if !self.dedup.observe(alert.id) {
            return false;
        }
        self.insert_history(alert.clone());
        self.active = Some(alert);
        self.notifier.start_alarm();
        true
    }

    /// Merges durable history fetched after a reconnect. Transport delivery
    /// order can differ from `created_at` order, so the batch is sorted
    /// newest first before merging. Backfilled alerts update history and the
    /// dedup set without sounding the alarm. Returns how many were new.
    pub fn merge_backfill(&mut self, mut alerts: Vec<Alert>) -> usize {
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let mut added = 0;
        for alert in alerts {
            if self.dedup.observe(alert.id) {
                self.insert_history(alert);
                added += 1;
            }
        }
        added
    }

    /// User acknowledged the active alert. Stopping the alarm never depends
    /// on channel state and is safe when nothing is active.
    pub fn acknowledge(&mut self) {
        self.notifier.stop_alarm();
        if self.active.take().is_some() {
            self.notifier.confirm();
        }
    }

    pub fn active_alert(&self) -> Option<&Alert> {
        self.active.as_ref()
    }

    pub fn history(&self) -> &[Alert] {
        &self.history
    }

    fn insert_history(&mut self, alert: Alert) {
        self.history.push(alert);
        self.history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.history.truncate(self.keep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlertIcon;
    use crate::notify::RecordingNotifier;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn plate() -> NormalizedPlate {
        NormalizedPlate::parse("ABC1D23").unwrap()
    }

    fn alert_at(message: &str, seconds_ago: i64) -> Alert {
        Alert {
            id: Uuid::new_v4(),
            target_plate: plate(),
            sender_name: "Carlos".to_string(),
            message: message.to_string(),
            icon: AlertIcon::Sun,
            created_at: Utc::now() - Duration::seconds(seconds_ago),
        }
    }

    fn processor(keep: usize) -> (AlertProcessor, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        (
            AlertProcessor::new(plate(), notifier.clone(), keep),
            notifier,
        )
    }

    #[test]
    fn delivery_raises_alarm_and_sets_active_state() {
        let (mut processor, notifier) = processor(2);
        let alert = alert_at("Farol aceso!", 0);
        let payload = serde_json::to_vec(&alert).unwrap();

        assert!(processor.handle_payload(&payload));
        assert_eq!(notifier.starts(), 1);
        assert!(notifier.is_active());
        assert_eq!(processor.active_alert().unwrap().message, "Farol aceso!");
        assert_eq!(processor.history().len(), 1);
    }

    #[test]
    fn duplicate_id_is_presented_exactly_once() {
        let (mut processor, notifier) = processor(5);
        let alert = alert_at("Farol aceso!", 0);
        let payload = serde_json::to_vec(&alert).unwrap();

        assert!(processor.handle_payload(&payload));
        processor.acknowledge();
        // At-least-once transport redelivers the same id.
        assert!(!processor.handle_payload(&payload));
        assert_eq!(notifier.starts(), 1);
        assert_eq!(processor.history().len(), 1);
    }

    #[test]
    fn malformed_payload_is_skipped() {
        let (mut processor, notifier) = processor(2);
        assert!(!processor.handle_payload(b"not json"));
        assert!(!processor.handle_payload(b"{\"id\": 42}"));
        assert_eq!(notifier.starts(), 0);
    }

    #[test]
    fn alert_for_another_plate_is_dropped() {
        let (mut processor, notifier) = processor(2);
        let mut alert = alert_at("Farol aceso!", 0);
        alert.target_plate = NormalizedPlate::parse("XYZ9Z99").unwrap();
        let payload = serde_json::to_vec(&alert).unwrap();
        assert!(!processor.handle_payload(&payload));
        assert_eq!(notifier.starts(), 0);
    }

    #[test]
    fn backfill_sorts_newest_first_and_skips_seen_ids() {
        let (mut processor, notifier) = processor(5);
        let live = alert_at("live", 5);
        processor.deliver(live.clone());
        processor.acknowledge();

        // Out-of-order batch including the already-seen live alert.
        let oldest = alert_at("oldest", 30);
        let newest = alert_at("newest", 1);
        let middle = alert_at("middle", 10);
        let added =
            processor.merge_backfill(vec![oldest.clone(), live.clone(), newest.clone(), middle]);

        assert_eq!(added, 3);
        let messages: Vec<&str> = processor.history().iter().map(|a| a.message.as_str()).collect();
        assert_eq!(messages, vec!["newest", "live", "middle", "oldest"]);
        // Backfill never sounds the alarm.
        assert_eq!(notifier.starts(), 1);
    }

    #[test]
    fn history_is_capped_at_keep() {
        let (mut processor, _) = processor(2);
        for i in 0..6i64 {
            processor.deliver(alert_at(&format!("m{i}"), 60 - i));
        }
        assert_eq!(processor.history().len(), 2);
        assert_eq!(processor.history()[0].message, "m5");
        assert_eq!(processor.history()[1].message, "m4");
    }

    #[test]
    fn acknowledge_is_safe_without_active_alert() {
        let (mut processor, notifier) = processor(2);
        processor.acknowledge();
        processor.acknowledge();
        assert_eq!(notifier.stops(), 0);
        assert_eq!(notifier.confirms(), 0);

        processor.deliver(alert_at("Farol aceso!", 0));
        processor.acknowledge();
        assert_eq!(notifier.stops(), 1);
        assert_eq!(notifier.confirms(), 1);
        processor.acknowledge();
        assert_eq!(notifier.confirms(), 1);
    }
}
