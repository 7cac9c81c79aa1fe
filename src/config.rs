use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

use crate::channel::backoff::{BackoffStrategy, ReconnectConfig};

/// Retention bounds for per-plate alert history.
const KEEP_MIN: i64 = 2;
const KEEP_MAX: i64 = 20;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub mqtt_broker: String,
    pub mqtt_port: u16,
    pub mqtt_username: String,
    pub mqtt_password: String,
    pub own_plate: String,
    pub history_keep: i64,
    pub reconnect: ReconnectConfig,
    pub database_url: String,
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let mqtt_broker = env::var("MQTT_BROKER").unwrap_or_else(|_| "localhost".to_string());
        let mqtt_port = env::var("MQTT_PORT")
            .unwrap_or_else(|_| "1883".to_string())
            .parse()
            .unwrap_or(1883);
        let mqtt_username = env::var("MQTT_USERNAME").unwrap_or_default();
        let mqtt_password = env::var("MQTT_PASSWORD").unwrap_or_default();

        let own_plate = env::var("OWN_PLATE").unwrap_or_default();

        let history_keep = env::var("HISTORY_KEEP")
            .unwrap_or_else(|_| "2".to_string())
            .parse()
            .unwrap_or(KEEP_MIN)
            .clamp(KEEP_MIN, KEEP_MAX);

        let strategy = BackoffStrategy::parse(
            &env::var("RECONNECT_STRATEGY").unwrap_or_else(|_| "exponential".to_string()),
        );
        let base_ms = env::var("RECONNECT_BASE_MS")
            .unwrap_or_else(|_| "500".to_string())
            .parse()
            .unwrap_or(500);
        let max_ms = env::var("RECONNECT_MAX_MS")
            .unwrap_or_else(|_| "30000".to_string())
            .parse()
            .unwrap_or(30_000);

        let db_host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
        let db_port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
        let db_name = env::var("DB_DATABASE").unwrap_or_else(|_| "plateping".to_string());
        let db_user = env::var("DB_USER").unwrap_or_else(|_| "plateping".to_string());
        let db_pwd = env::var("DB_PWD").unwrap_or_else(|_| "plateping".to_string());

        let database_url = format!(
            "postgres://{}:{}@{}:{}/{}",
            db_user, db_pwd, db_host, db_port, db_name
        );

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            mqtt_broker,
            mqtt_port,
            mqtt_username,
            mqtt_password,
            own_plate,
            history_keep,
            reconnect: ReconnectConfig {
                strategy,
                base_ms,
                max_ms,
            },
            database_url,
            log_level,
        })
    }
}
