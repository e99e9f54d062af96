//! Constants Module
//!
//! Fixed values shared by the Zabbix client, the commands and the
//! maintenance job.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Plugin name as shown in logs and the health endpoint
pub const APP_NAME: &str = "ludolph-zabbix";

/// Plugin version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for Zabbix API requests
pub const USER_AGENT: &str = concat!("ludolph-zabbix/", env!("CARGO_PKG_VERSION"));

// ============================================
// ZABBIX API CONSTANTS
// ============================================

/// Default timeout for Zabbix API requests (seconds)
pub const TIMEOUT: u64 = 10;

/// JSON-RPC endpoint relative to the configured server URI
pub const API_PATH: &str = "/api_jsonrpc.php";

/// Trigger value for "problem" state (TRIGGER_VALUE_TRUE)
pub const TRIGGER_VALUE_TRUE: u8 = 1;

/// Trigger severities indexed by priority
pub const SEVERITIES: [&str; 6] = [
    "Not classified",
    "Information",
    "Warning",
    "Average",
    "High",
    "Disaster",
];

/// Maximum length of a maintenance name accepted by Zabbix
pub const MAINTENANCE_NAME_MAX_LEN: usize = 128;

/// Width the severity column is padded to in alert listings
pub const SEVERITY_COLUMN_WIDTH: usize = 12;

// ============================================
// SCHEDULER CONSTANTS
// ============================================

/// Maintenance job runs on every N-th minute of the hour
pub const MAINTENANCE_CRON_STEP_MINUTES: u32 = 5;

/// Maintenances ending within this many minutes trigger a notification
pub const MAINTENANCE_NOTICE_MINUTES: i64 = 5;

// ============================================
// WEB SERVER CONSTANTS
// ============================================

/// Default webhook listener host
pub const DEFAULT_WEB_HOST: &str = "127.0.0.1";

/// Default webhook listener port
pub const DEFAULT_WEB_PORT: u16 = 8010;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "ludolph.toml";

/// Get severity name for a trigger priority
pub fn get_severity(priority: i64) -> &'static str {
    usize::try_from(priority)
        .ok()
        .and_then(|idx| SEVERITIES.get(idx).copied())
        .unwrap_or("Unknown")
}
