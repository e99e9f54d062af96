//! Alert Webhook Module
//! HTTP endpoint used by Zabbix media scripts to push alerts into chat

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use routes::create_router;
pub use types::*;
