//! Zabbix API entity types
//!
//! Zabbix sends most numbers as strings and empty sub-objects as `[]`, so
//! the deserializers here are lenient about both.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Parse a Zabbix integer field; anything unparsable counts as 0
pub fn zabbix_int(value: &str) -> i64 {
    value.trim().parse().unwrap_or(0)
}

/// Accept `"123"`, `123` or `null`
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(if b { "1" } else { "0" }.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!("unexpected value: {}", other))),
    }
}

/// Object → `Some`, empty object / empty array / null → `None`
fn optional_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) if !map.is_empty() => serde_json::from_value(Value::Object(map))
            .map(Some)
            .map_err(D::Error::custom),
        _ => Ok(None),
    }
}

/// List of objects; non-object entries (e.g. `[]` placeholders) are dropped
fn object_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter(|item| matches!(item, Value::Object(map) if !map.is_empty()))
            .map(|item| serde_json::from_value(item).map_err(D::Error::custom))
            .collect(),
        _ => Ok(Vec::new()),
    }
}

// ============================================
// Triggers & Events
// ============================================

/// Problem trigger as returned by `trigger.get`
#[derive(Debug, Clone, Deserialize)]
pub struct Trigger {
    #[serde(default, deserialize_with = "string_or_number")]
    pub triggerid: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub priority: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub state: String,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub comments: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub lastchange: String,
    #[serde(default, deserialize_with = "object_list")]
    pub hosts: Vec<TriggerHost>,
    #[serde(default, rename = "lastEvent", deserialize_with = "optional_object")]
    pub last_event: Option<LastEvent>,
}

impl Trigger {
    /// Trigger is in unknown state or has an expression error
    pub fn is_broken(&self) -> bool {
        !self.error.is_empty() || zabbix_int(&self.state) != 0
    }
}

/// Host reference attached to a trigger
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerHost {
    #[serde(default, deserialize_with = "string_or_number")]
    pub hostid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub maintenance_status: String,
}

impl TriggerHost {
    pub fn in_maintenance(&self) -> bool {
        zabbix_int(&self.maintenance_status) != 0
    }
}

/// `selectLastEvent` sub-object
#[derive(Debug, Clone, Deserialize)]
pub struct LastEvent {
    #[serde(default, deserialize_with = "string_or_number")]
    pub eventid: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub acknowledged: String,
}

impl LastEvent {
    pub fn is_acknowledged(&self) -> bool {
        zabbix_int(&self.acknowledged) != 0
    }
}

/// Event as returned by `event.get` with acknowledges
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    #[serde(default, deserialize_with = "string_or_number")]
    pub eventid: String,
    #[serde(default, deserialize_with = "object_list")]
    pub acknowledges: Vec<Acknowledge>,
}

/// Acknowledge note on an event
#[derive(Debug, Clone, Deserialize)]
pub struct Acknowledge {
    #[serde(default, deserialize_with = "string_or_number")]
    pub clock: String,
    #[serde(default)]
    pub message: String,
}

// ============================================
// Hosts & Groups
// ============================================

/// Host as returned by `host.get`
#[derive(Debug, Clone, Deserialize)]
pub struct Host {
    #[serde(default, deserialize_with = "string_or_number")]
    pub hostid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub available: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub maintenance_status: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub status: String,
    #[serde(default, deserialize_with = "optional_object")]
    pub inventory: Option<Map<String, Value>>,
}

impl Host {
    pub fn in_maintenance(&self) -> bool {
        zabbix_int(&self.maintenance_status) != 0
    }

    pub fn is_monitored(&self) -> bool {
        zabbix_int(&self.status) == 0
    }

    /// Zabbix agent availability: 0 unknown, 1 available, 2 unavailable
    pub fn availability(&self) -> i64 {
        zabbix_int(&self.available)
    }
}

/// Host group as returned by `hostgroup.get`
#[derive(Debug, Clone, Deserialize)]
pub struct HostGroup {
    #[serde(default, deserialize_with = "string_or_number")]
    pub groupid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "object_list")]
    pub hosts: Vec<GroupHost>,
}

/// Host reference attached to a group
#[derive(Debug, Clone, Deserialize)]
pub struct GroupHost {
    #[serde(default, deserialize_with = "string_or_number")]
    pub hostid: String,
    #[serde(default)]
    pub name: String,
}

// ============================================
// Maintenance
// ============================================

/// Maintenance period as returned by `maintenance.get`
#[derive(Debug, Clone, Deserialize)]
pub struct Maintenance {
    #[serde(default, deserialize_with = "string_or_number")]
    pub maintenanceid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub active_since: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub active_till: String,
}

impl Maintenance {
    /// JID encoded as the last word of the maintenance name
    pub fn owner_jid(&self) -> Option<&str> {
        self.name
            .split_whitespace()
            .last()
            .map(str::trim)
            .filter(|word| word.contains('@'))
    }
}
