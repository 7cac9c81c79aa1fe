//! Channel lifecycle supervisor.
//!
//! Owns one plate subscription end to end: drives the connection-state
//! machine, retries with the configured backoff, resubscribes after every
//! reconnect and backfills missed alerts from the durable store.

use std::sync::Arc;

use rumqttc::{Event, EventLoop, Packet};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use crate::db::AlertStore;
use crate::models::Alert;
use crate::notify::Notifier;
use crate::plate::NormalizedPlate;
use crate::processor::AlertProcessor;

use super::backoff::Backoff;
use super::{ChannelEvent, ChannelHandle, ConnectionState, MqttChannel};

pub struct ReconnectSupervisor {
    plate: NormalizedPlate,
    store: Arc<dyn AlertStore>,
    processor: AlertProcessor,
    backoff: Box<dyn Backoff>,
    keep: i64,
    state: ConnectionState,
    state_tx: watch::Sender<ConnectionState>,
    wake_tx: mpsc::Sender<()>,
    wake_rx: mpsc::Receiver<()>,
    local_tx: mpsc::Sender<Alert>,
    local_rx: Option<mpsc::Receiver<Alert>>,
}

impl ReconnectSupervisor {
    pub fn new(
        plate: NormalizedPlate,
        store: Arc<dyn AlertStore>,
        notifier: Arc<dyn Notifier>,
        keep: i64,
        backoff: Box<dyn Backoff>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Connecting);
        let (wake_tx, wake_rx) = mpsc::channel(1);
        let (local_tx, local_rx) = mpsc::channel(8);
        Self {
            processor: AlertProcessor::new(plate.clone(), notifier, keep.max(1) as usize),
            plate,
            store,
            backoff,
            keep,
            state: ConnectionState::Connecting,
            state_tx,
            wake_tx,
            wake_rx,
            local_tx,
            local_rx: Some(local_rx),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn processor(&self) -> &AlertProcessor {
        &self.processor
    }

    pub fn processor_mut(&mut self) -> &mut AlertProcessor {
        &mut self.processor
    }

    /// Applies one transport event to the state machine. Every transition
    /// into `Online` re-queries recent history so alerts inserted while the
    /// subscription was down are merged (deduplicated) into the display.
    pub async fn handle_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Connected => {
                self.set_state(ConnectionState::Online);
                self.backoff.reset();
                match self.store.recent(&self.plate, self.keep).await {
                    Ok(history) => {
                        let merged = self.processor.merge_backfill(history);
                        if merged > 0 {
                            info!("Backfilled {} alert(s) for {}", merged, self.plate);
                        }
                    }
                    Err(e) => warn!("Backfill query failed for {}: {}", self.plate, e),
                }
            }
            ChannelEvent::Disconnected => self.set_state(ConnectionState::Offline),
            ChannelEvent::Reconnecting => self.set_state(ConnectionState::Connecting),
            ChannelEvent::Message(payload) => {
                self.processor.handle_payload(&payload);
            }
        }
    }

    /// Application returned to foreground: skip the remaining backoff delay
    /// and retry now. No-op while online.
    pub fn on_foreground(&self) {
        let _ = self.wake_tx.try_send(());
    }

    /// Presents an alert without a broker round trip, regardless of the
    /// connection state. Used when the owner targets their own plate: the
    /// copy that may still arrive over the channel is absorbed by dedup.
    /// Returns `true` when the alert was new.
    pub fn deliver_local(&mut self, alert: Alert) -> bool {
        self.processor.deliver(alert)
    }

    /// Drives the MQTT event loop until the task is aborted by an explicit
    /// unsubscribe. Poll, classify, never die on a transport error.
    pub async fn run_mqtt(
        mut self,
        channel: MqttChannel,
        mut eventloop: EventLoop,
    ) -> anyhow::Result<()> {
        self.set_state(ConnectionState::Connecting);
        let mut local_rx = self
            .local_rx
            .take()
            .ok_or_else(|| anyhow::anyhow!("channel loop already started"))?;
        loop {
            tokio::select! {
                event = eventloop.poll() => match event {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        info!("MQTT connected, subscribing to {}", MqttChannel::topic(&self.plate));
                        channel.subscribe(&self.plate).await?;
                        self.handle_event(ChannelEvent::Connected).await;
                    }
                    Ok(Event::Incoming(Packet::SubAck(_))) => {
                        info!("Subscription confirmed for {}", self.plate);
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        self.handle_event(ChannelEvent::Message(publish.payload.to_vec()))
                            .await;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!("MQTT connection error: {}", e);
                        self.handle_event(ChannelEvent::Disconnected).await;
                        let delay = self.backoff.next_delay();
                        tokio::select! {
                            _ = tokio::time::sleep(delay) => {}
                            _ = self.wake_rx.recv() => {
                                info!("Foreground wake, retrying immediately");
                            }
                        }
                        self.handle_event(ChannelEvent::Reconnecting).await;
                    }
                },
                Some(alert) = local_rx.recv() => {
                    self.deliver_local(alert);
                }
            }
        }
    }

    /// Spawns the event loop and returns the handle the [`ChannelManager`]
    /// owns. Teardown is `ChannelManager::unsubscribe`, which aborts the
    /// task.
    ///
    /// [`ChannelManager`]: super::ChannelManager
    pub fn spawn_mqtt(self, channel: MqttChannel, eventloop: EventLoop) -> ChannelHandle {
        let state_rx = self.state_tx.subscribe();
        let wake_tx = self.wake_tx.clone();
        let local_tx = self.local_tx.clone();
        let task = tokio::spawn(async move {
            if let Err(e) = self.run_mqtt(channel, eventloop).await {
                error!("Channel loop ended: {}", e);
            }
        });
        ChannelHandle::new(state_rx, wake_tx, local_tx, task)
    }

    fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
        let _ = self.state_tx.send(state);
    }
}
