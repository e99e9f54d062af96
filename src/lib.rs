//! Ludolph Zabbix Plugin Library
//!
//! Zabbix API plugin for the Ludolph chat bot:
//! - Chat commands for alerts, acknowledges, maintenance periods, hosts and groups
//! - Cleanup job removing outdated maintenance periods
//! - Webhook relaying Zabbix media script alerts into chat
//!
//! Module Structure:
//! - `core/` - Command table, plugin commands, maintenance job, chat seam
//! - `providers/` - Zabbix JSON-RPC client
//! - `models/` - Configuration, errors, Zabbix entities
//! - `utils/` - Constants, chat markup, time helpers
//! - `api/` - Alert webhook

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{
    run_maintenance_job, spawn_maintenance_task, ConsoleMessenger, Message, MessageType,
    Messenger, Zapi,
};
pub use models::{AppError, AppResult, Config, ErrorCode, ZapiConfig};
pub use providers::ZabbixApi;
