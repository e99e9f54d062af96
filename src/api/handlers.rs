//! Webhook Request Handlers

use axum::{
    extract::{Form, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::types::*;
use crate::core::messenger::MessageType;
use crate::core::plugin::Zapi;
use crate::models::errors::{AppError, ErrorCode};
use crate::utils::constants::{APP_NAME, APP_VERSION};

/// Shared application state
pub struct AppState {
    pub plugin: Arc<Zapi>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(plugin: Arc<Zapi>) -> Self {
        Self {
            plugin,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let data = HealthData {
        status: "healthy".to_string(),
        name: APP_NAME.to_string(),
        version: APP_VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
        zabbix_logged_in: state.plugin.api().logged_in(),
    };

    Json(ApiResponse::success(data))
}

// ============================================
// Zabbix Alert
// ============================================

/// Relay a Zabbix alert to a user or the room
pub async fn alert(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AlertForm>,
) -> (StatusCode, String) {
    let Some(jid) = form.jid.filter(|jid| !jid.is_empty()) else {
        let err = AppError::bad_request("Missing JID in alert request");
        warn!(code = err.code_str(), "{}", err);
        return error_response(&err);
    };

    let messenger = state.plugin.messenger();
    let mtype = if messenger.room() == Some(jid.as_str()) {
        MessageType::Groupchat
    } else {
        MessageType::Normal
    };

    let msg = form.msg.unwrap_or_default();
    info!("Sending monitoring alert to \"{}\"", jid);
    debug!("\twith body: \"{}\"", msg);

    match messenger.msg_send(&jid, &msg, mtype) {
        Ok(()) => (StatusCode::OK, "Message sent".to_string()),
        Err(e) => {
            let err = AppError::with_source(
                ErrorCode::WebDeliveryFailed,
                format!("Cannot send message to {}", jid),
                e,
            );
            error!(code = err.code_str(), "Alert delivery failed: {}", err);
            error_response(&err)
        }
    }
}

fn error_response(err: &AppError) -> (StatusCode, String) {
    let status =
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, err.to_string())
}
