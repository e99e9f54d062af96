//! Webhook Request/Response Types

use serde::{Deserialize, Serialize};

/// Form body of `POST /alert` as sent by a Zabbix media script
#[derive(Debug, Default, Deserialize)]
pub struct AlertForm {
    /// Recipient JID (user or room)
    #[serde(default)]
    pub jid: Option<String>,
    /// Alert text
    #[serde(default)]
    pub msg: Option<String>,
}

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// `GET /health` payload
#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub name: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Zabbix session established
    pub zabbix_logged_in: bool,
}
