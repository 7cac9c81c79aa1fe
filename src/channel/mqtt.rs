//! MQTT transport: one `alerts/<PLATE>` topic per vehicle.

use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::TransportError;
use crate::models::Alert;
use crate::plate::NormalizedPlate;

use super::AlertTransport;

/// Client half of the MQTT connection. The [`EventLoop`] returned alongside
/// it is handed to the supervisor, which polls it and owns reconnection.
pub struct MqttChannel {
    client: AsyncClient,
}

impl MqttChannel {
    pub fn connect(config: &AppConfig) -> (Self, EventLoop) {
        let client_id = format!("plateping-{}", Uuid::new_v4());
        let mut options = MqttOptions::new(client_id, &config.mqtt_broker, config.mqtt_port);
        options.set_keep_alive(Duration::from_secs(5));
        if !config.mqtt_username.is_empty() {
            options.set_credentials(&config.mqtt_username, &config.mqtt_password);
        }

        let (client, eventloop) = AsyncClient::new(options, 100);
        (Self { client }, eventloop)
    }

    /// Topic naming is the routing contract: both publisher and subscriber
    /// derive it from the normalized plate and nothing else.
    pub fn topic(plate: &NormalizedPlate) -> String {
        format!("alerts/{plate}")
    }

    pub async fn subscribe(&self, plate: &NormalizedPlate) -> Result<(), TransportError> {
        self.client
            .subscribe(Self::topic(plate), QoS::AtLeastOnce)
            .await
            .map_err(|e| TransportError::Mqtt(e.to_string()))
    }
}

#[async_trait]
impl AlertTransport for MqttChannel {
    async fn publish(&self, alert: &Alert) -> Result<(), TransportError> {
        let payload = serde_json::to_vec(alert)?;
        self.client
            .publish(
                Self::topic(&alert.target_plate),
                QoS::AtLeastOnce,
                false,
                payload,
            )
            .await
            .map_err(|e| TransportError::Mqtt(e.to_string()))
    }
}
