//! Sender path: validate, check the registry, record durably, then fire the
//! best-effort publish.
//!
//! Ordering matters: the insert is the system of record and strictly
//! precedes the publish, so a subscriber that only backfills on reconnect
//! still observes the alert. Publish and prune failures are logged, never
//! surfaced; an insert failure is surfaced and the user resends by hand.

use tracing::warn;

use crate::channel::AlertTransport;
use crate::db::{AlertStore, VehicleRegistry};
use crate::error::SendError;
use crate::models::{icon_for_message, Alert, NewAlert};
use crate::plate::NormalizedPlate;

pub async fn send_alert(
    store: &dyn AlertStore,
    registry: &dyn VehicleRegistry,
    transport: &dyn AlertTransport,
    raw_plate: &str,
    sender_name: &str,
    message: &str,
    keep: i64,
) -> Result<Alert, SendError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(SendError::EmptyMessage);
    }
    let plate = NormalizedPlate::parse(raw_plate)?;

    if !registry.exists(&plate).await.map_err(SendError::from)? {
        return Err(SendError::UnknownPlate(plate.to_string()));
    }

    let alert = store
        .insert(NewAlert {
            target_plate: plate.clone(),
            sender_name: sender_name.to_string(),
            message: message.to_string(),
            icon: icon_for_message(message),
        })
        .await?;

    if let Err(e) = transport.publish(&alert).await {
        // Silent by design at the user level: the store is durable and a
        // reconnecting subscriber backfills this alert.
        warn!("Publish failed for {}: {}", plate, e);
    }

    if let Err(e) = store.prune(&plate, keep).await {
        warn!("Retention prune failed for {}: {}", plate, e);
    }

    Ok(alert)
}
