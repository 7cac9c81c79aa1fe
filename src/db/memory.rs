//! In-memory store and registry, used by tests and offline development.
//! Same contracts as the Postgres implementations.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Alert, NewAlert};
use crate::plate::NormalizedPlate;

use super::registry::VehicleRegistry;
use super::store::AlertStore;

#[derive(Default)]
pub struct MemoryAlertStore {
    alerts: Mutex<Vec<Alert>>,
}

impl MemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AlertStore for MemoryAlertStore {
    async fn insert(&self, alert: NewAlert) -> Result<Alert, StoreError> {
        let stored = Alert {
            id: Uuid::new_v4(),
            target_plate: alert.target_plate,
            sender_name: alert.sender_name,
            message: alert.message,
            icon: alert.icon,
            created_at: Utc::now(),
        };
        self.alerts.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn recent(&self, plate: &NormalizedPlate, limit: i64) -> Result<Vec<Alert>, StoreError> {
        let alerts = self.alerts.lock().unwrap();
        let mut matched: Vec<Alert> = alerts
            .iter()
            .filter(|a| &a.target_plate == plate)
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matched.truncate(limit.max(0) as usize);
        Ok(matched)
    }

    async fn prune(&self, plate: &NormalizedPlate, keep: i64) -> Result<u64, StoreError> {
        let mut alerts = self.alerts.lock().unwrap();
        // Keep the `keep` newest ids for this plate, drop the rest.
        let mut for_plate: Vec<&Alert> = alerts.iter().filter(|a| &a.target_plate == plate).collect();
        for_plate.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let kept: Vec<Uuid> = for_plate
            .iter()
            .take(keep.max(0) as usize)
            .map(|a| a.id)
            .collect();
        let before = alerts.len();
        alerts.retain(|a| &a.target_plate != plate || kept.contains(&a.id));
        Ok((before - alerts.len()) as u64)
    }
}

#[derive(Default)]
pub struct MemoryVehicleRegistry {
    plates: Mutex<HashSet<NormalizedPlate>>,
}

impl MemoryVehicleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, plate: NormalizedPlate) {
        self.plates.lock().unwrap().insert(plate);
    }
}

#[async_trait]
impl VehicleRegistry for MemoryVehicleRegistry {
    async fn exists(&self, plate: &NormalizedPlate) -> Result<bool, StoreError> {
        Ok(self.plates.lock().unwrap().contains(plate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlertIcon;

    fn new_alert(plate: &NormalizedPlate, message: &str) -> NewAlert {
        NewAlert {
            target_plate: plate.clone(),
            sender_name: "Teste".to_string(),
            message: message.to_string(),
            icon: AlertIcon::Bell,
        }
    }

    #[tokio::test]
    async fn recent_returns_newest_first() {
        let store = MemoryAlertStore::new();
        let plate = NormalizedPlate::parse("ABC1D23").unwrap();
        for i in 0..3 {
            store.insert(new_alert(&plate, &format!("m{i}"))).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        let recent = store.recent(&plate, 10).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].message, "m2");
        assert_eq!(recent[2].message, "m0");
    }

    #[tokio::test]
    async fn prune_keeps_only_the_newest() {
        let store = MemoryAlertStore::new();
        let plate = NormalizedPlate::parse("ABC1D23").unwrap();
        let other = NormalizedPlate::parse("XYZ9Z99").unwrap();
        for i in 0..5 {
            store.insert(new_alert(&plate, &format!("m{i}"))).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        store.insert(new_alert(&other, "other")).await.unwrap();

        let removed = store.prune(&plate, 2).await.unwrap();
        assert_eq!(removed, 3);

        let recent = store.recent(&plate, 10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].message, "m4");
        assert_eq!(recent[1].message, "m3");

        // Other plates are untouched.
        assert_eq!(store.recent(&other, 10).await.unwrap().len(), 1);
    }
}
