use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::plate::NormalizedPlate;

/// Icon attached to an alert, fixed enumerated set. Unknown values decode as
/// [`AlertIcon::Bell`] so an older client never fails to display a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AlertIcon {
    Zap,
    DoorClosed,
    Sun,
    Package,
    Siren,
    Disc,
    Layout,
    Bell,
}

impl AlertIcon {
    pub fn as_wire(&self) -> &'static str {
        match self {
            AlertIcon::Zap => "zap",
            AlertIcon::DoorClosed => "door-closed",
            AlertIcon::Sun => "sun",
            AlertIcon::Package => "package",
            AlertIcon::Siren => "siren",
            AlertIcon::Disc => "disc",
            AlertIcon::Layout => "layout",
            AlertIcon::Bell => "bell",
        }
    }

    pub fn from_wire(value: &str) -> Self {
        match value {
            "zap" => AlertIcon::Zap,
            "door-closed" => AlertIcon::DoorClosed,
            "sun" => AlertIcon::Sun,
            "package" => AlertIcon::Package,
            "siren" => AlertIcon::Siren,
            "disc" => AlertIcon::Disc,
            "layout" => AlertIcon::Layout,
            _ => AlertIcon::Bell,
        }
    }
}

impl From<String> for AlertIcon {
    fn from(value: String) -> Self {
        AlertIcon::from_wire(&value)
    }
}

impl From<AlertIcon> for String {
    fn from(icon: AlertIcon) -> Self {
        icon.as_wire().to_string()
    }
}

/// A delivered alert. Immutable once created; removed only by retention
/// pruning. `id` is the dedup key and must stay globally unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Alert {
    pub id: Uuid,
    #[sqlx(try_from = "String")]
    pub target_plate: NormalizedPlate,
    pub sender_name: String,
    pub message: String,
    #[sqlx(try_from = "String")]
    pub icon: AlertIcon,
    pub created_at: DateTime<Utc>,
}

/// Sender-side alert before the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub target_plate: NormalizedPlate,
    pub sender_name: String,
    pub message: String,
    pub icon: AlertIcon,
}

/// Canned message with its icon, offered as a one-tap send.
pub struct CannedAlert {
    pub message: &'static str,
    pub icon: AlertIcon,
}

pub const PRECONFIGURED_ALERTS: [CannedAlert; 7] = [
    CannedAlert {
        message: "Preciso sair com urgência!",
        icon: AlertIcon::Zap,
    },
    CannedAlert {
        message: "Bloqueando a saída!",
        icon: AlertIcon::DoorClosed,
    },
    CannedAlert {
        message: "Farol aceso!",
        icon: AlertIcon::Sun,
    },
    CannedAlert {
        message: "Porta malas aberto!",
        icon: AlertIcon::Package,
    },
    CannedAlert {
        message: "Alarme acionado!",
        icon: AlertIcon::Siren,
    },
    CannedAlert {
        message: "Pneu murcho ou baixo",
        icon: AlertIcon::Disc,
    },
    CannedAlert {
        message: "Janela aberta!",
        icon: AlertIcon::Layout,
    },
];

/// Resolves the icon for a message, falling back to the bell for free-form
/// text.
pub fn icon_for_message(message: &str) -> AlertIcon {
    PRECONFIGURED_ALERTS
        .iter()
        .find(|canned| canned.message == message)
        .map(|canned| canned.icon)
        .unwrap_or(AlertIcon::Bell)
}
