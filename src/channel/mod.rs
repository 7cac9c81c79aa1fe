//! Per-plate publish/subscribe channels.
//!
//! One topic per normalized plate carries that vehicle's alerts. The channel
//! is best effort and at-least-once; the durable path is the alert store,
//! which a reconnecting subscriber queries to backfill missed messages.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use crate::error::TransportError;
use crate::models::Alert;
use crate::plate::NormalizedPlate;

pub mod backoff;
pub mod mqtt;
pub mod supervisor;

pub use backoff::{Backoff, BackoffStrategy, ExponentialBackoff, FixedBackoff, ReconnectConfig};
pub use mqtt::MqttChannel;
pub use supervisor::ReconnectSupervisor;

/// Connection state of one plate subscription. Mutated only by the
/// supervisor; there is no terminal state while the subscription is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Online,
    Offline,
}

/// Transport-level events the supervisor consumes. Tests feed these
/// directly; production maps them from the MQTT event loop.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// Handshake completed and the plate topic is (re)subscribed.
    Connected,
    /// Transport error or explicit close.
    Disconnected,
    /// Backoff delay elapsed, a new attempt is starting.
    Reconnecting,
    /// One published message, raw payload.
    Message(Vec<u8>),
}

/// Publish leg of a plate channel.
#[async_trait]
pub trait AlertTransport: Send + Sync {
    /// Best-effort fire to currently connected subscribers of the alert's
    /// plate topic. Failure here is not an error of record.
    async fn publish(&self, alert: &Alert) -> Result<(), TransportError>;
}

/// In-process transport for tests and offline demos: publishes serialized
/// alerts to a broadcast channel that stands in for the broker.
pub struct LoopbackTransport {
    tx: broadcast::Sender<Vec<u8>>,
}

impl LoopbackTransport {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Vec<u8>> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl AlertTransport for LoopbackTransport {
    async fn publish(&self, alert: &Alert) -> Result<(), TransportError> {
        let payload = serde_json::to_vec(alert)?;
        // No subscribers is fine: the store remains the system of record.
        let _ = self.tx.send(payload);
        Ok(())
    }
}

/// Running subscription: connection state mirror, early-wake signal and the
/// background task driving the event loop.
pub struct ChannelHandle {
    state_rx: watch::Receiver<ConnectionState>,
    wake_tx: mpsc::Sender<()>,
    local_tx: mpsc::Sender<Alert>,
    task: JoinHandle<()>,
}

impl ChannelHandle {
    pub(crate) fn new(
        state_rx: watch::Receiver<ConnectionState>,
        wake_tx: mpsc::Sender<()>,
        local_tx: mpsc::Sender<Alert>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            state_rx,
            wake_tx,
            local_tx,
            task,
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Skips any pending backoff delay (application came to foreground).
    pub fn wake(&self) {
        let _ = self.wake_tx.try_send(());
    }

    /// Hands an alert straight to this subscription's processor, bypassing
    /// the broker. Returns `false` when the loop is gone or its queue is
    /// full.
    pub fn deliver(&self, alert: Alert) -> bool {
        self.local_tx.try_send(alert).is_ok()
    }
}

/// Owns every open plate subscription. Injected into the application; never
/// global state.
#[derive(Default)]
pub struct ChannelManager {
    channels: HashMap<NormalizedPlate, ChannelHandle>,
}

impl ChannelManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, plate: NormalizedPlate, handle: ChannelHandle) {
        if let Some(previous) = self.channels.insert(plate, handle) {
            previous.task.abort();
        }
    }

    pub fn state(&self, plate: &NormalizedPlate) -> Option<ConnectionState> {
        self.channels.get(plate).map(ChannelHandle::state)
    }

    pub fn is_subscribed(&self, plate: &NormalizedPlate) -> bool {
        self.channels.contains_key(plate)
    }

    /// Local delivery to the subscription for `plate`, used after a send
    /// that targets the device's own plate: the alert shows immediately
    /// even while the broker is unreachable, and dedup drops the copy that
    /// may still arrive over the channel. Returns `false` when the plate
    /// has no subscription.
    pub fn deliver_local(&self, plate: &NormalizedPlate, alert: Alert) -> bool {
        match self.channels.get(plate) {
            Some(handle) => handle.deliver(alert),
            None => false,
        }
    }

    /// Application returned to foreground: every offline subscription
    /// retries immediately.
    pub fn wake_all(&self) {
        for handle in self.channels.values() {
            handle.wake();
        }
    }

    /// Explicit teardown of one subscription. Idempotent: returns `false`
    /// when the plate had no subscription.
    pub fn unsubscribe(&mut self, plate: &NormalizedPlate) -> bool {
        match self.channels.remove(plate) {
            Some(handle) => {
                handle.task.abort();
                true
            }
            None => false,
        }
    }
}
