//! Notifier boundary.
//!
//! The core never reasons about audio, vibration or system notifications; it
//! only sequences `start_alarm` / `stop_alarm` around message receipt and
//! acknowledgement, plus a short confirmation cue after a successful send.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tracing::info;

pub trait Notifier: Send + Sync {
    /// Starts the repeating alarm. Idempotent: calling while already active
    /// is a no-op.
    fn start_alarm(&self);

    /// Stops the alarm. Always callable, independent of channel state, and
    /// safe when the alarm is not running.
    fn stop_alarm(&self);

    /// Short confirmation feedback (send acknowledged, spot marked).
    fn confirm(&self);
}

/// Notifier for the headless agent: tracks alarm state and logs transitions.
#[derive(Default)]
pub struct LogNotifier {
    active: AtomicBool,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Notifier for LogNotifier {
    fn start_alarm(&self) {
        if !self.active.swap(true, Ordering::SeqCst) {
            info!("alarm started");
        }
    }

    fn stop_alarm(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            info!("alarm stopped");
        }
    }

    fn confirm(&self) {
        info!("confirmation feedback");
    }
}

/// Counting notifier for tests and diagnostics. `starts` counts activations,
/// not repeated `start_alarm` calls while already active.
#[derive(Default)]
pub struct RecordingNotifier {
    active: AtomicBool,
    starts: AtomicUsize,
    stops: AtomicUsize,
    confirms: AtomicUsize,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn confirms(&self) -> usize {
        self.confirms.load(Ordering::SeqCst)
    }
}

impl Notifier for RecordingNotifier {
    fn start_alarm(&self) {
        if !self.active.swap(true, Ordering::SeqCst) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn stop_alarm(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn confirm(&self) {
        self.confirms.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_is_idempotent_while_active() {
        let notifier = RecordingNotifier::new();
        notifier.start_alarm();
        notifier.start_alarm();
        notifier.start_alarm();
        assert_eq!(notifier.starts(), 1);
        assert!(notifier.is_active());
    }

    #[test]
    fn stop_is_safe_when_already_stopped() {
        let notifier = RecordingNotifier::new();
        notifier.stop_alarm();
        assert_eq!(notifier.stops(), 0);
        notifier.start_alarm();
        notifier.stop_alarm();
        notifier.stop_alarm();
        assert_eq!(notifier.stops(), 1);
        assert!(!notifier.is_active());
    }
}
