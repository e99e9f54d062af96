//! Zabbix API plugin for the Ludolph bot
//!
//! Owns the API connection and the outgoing chat side, and implements the
//! chat commands on top of them.

use chrono::Local;
use futures_util::future::try_join_all;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{error, info};

use crate::core::command::{self, Command};
use crate::core::messenger::{Message, Messenger};
use crate::core::outage::{
    maintenance_params, parse_ack, parse_outage, resolve_window, AckTarget, MaintenanceTarget,
    OutageAction, OutageRequest,
};
use crate::core::report::{format_alerts, format_groups, format_hosts, format_maintenances};
use crate::models::config::ZapiConfig;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{Event, Host, HostGroup, Maintenance, Trigger};
use crate::providers::zapi::ZabbixApi;
use crate::utils::constants::TRIGGER_VALUE_TRUE;
use crate::utils::markup::bold;

/// Trigger fields fetched by default
const ALERT_OUTPUT: &[&str] = &["triggerid", "state", "error", "description", "priority", "lastchange"];

/// Trigger fields fetched for the `alerts` listing
const ALERT_OUTPUT_FULL: &[&str] = &[
    "triggerid",
    "state",
    "error",
    "url",
    "expression",
    "description",
    "priority",
    "type",
    "comments",
    "lastchange",
];

/// Host fields attached to triggers in the `alerts` listing
const ALERT_HOSTS_FULL: &[&str] = &[
    "hostid",
    "name",
    "maintenance_status",
    "maintenance_type",
    "maintenanceid",
];

/// `trigger.get` options on top of the defaults
#[derive(Debug, Clone)]
pub struct AlertQuery {
    pub expand_description: bool,
    pub output: &'static [&'static str],
    pub select_hosts: &'static [&'static str],
    /// Extra raw parameters merged last
    pub extra: Map<String, Value>,
}

impl Default for AlertQuery {
    fn default() -> Self {
        Self {
            expand_description: false,
            output: ALERT_OUTPUT,
            select_hosts: &["hostid"],
            extra: Map::new(),
        }
    }
}

impl AlertQuery {
    /// Full `trigger.get` parameters
    pub fn params(&self) -> Value {
        let mut params = json!({
            "monitored": true,
            "maintenance": false,
            "skipDependent": true,
            "expandDescription": self.expand_description,
            "filter": {"priority": null, "value": TRIGGER_VALUE_TRUE},
            "selectHosts": self.select_hosts,
            "selectLastEvent": "extend",
            "output": self.output,
            "sortfield": "lastchange",
            "sortorder": "DESC",
        });

        if let Value::Object(map) = &mut params {
            for (key, value) in &self.extra {
                map.insert(key.clone(), value.clone());
            }
        }

        params
    }
}

/// Wildcard name search parameters for `host.get` / `hostgroup.get`
fn search_params(id_field: &str, pattern: &str) -> Value {
    json!({
        "output": [id_field, "name"],
        "searchWildcardsEnabled": true,
        "searchByAny": true,
        "search": {"name": pattern},
    })
}

/// The Zabbix plugin
pub struct Zapi {
    api: ZabbixApi,
    messenger: Arc<dyn Messenger>,
}

impl Zapi {
    /// Create the plugin and log in. A failed login leaves the plugin
    /// running; commands then report the API as unavailable.
    pub async fn new(config: &ZapiConfig, messenger: Arc<dyn Messenger>) -> AppResult<Self> {
        let api = ZabbixApi::new(config)?;

        if let Err(e) = api.login(&config.username, &config.password, true).await {
            error!(code = e.code_str(), "Zabbix API login error ({})", e);
        }

        Ok(Self { api, messenger })
    }

    /// Zabbix API connection
    pub fn api(&self) -> &ZabbixApi {
        &self.api
    }

    /// Outgoing chat side
    pub fn messenger(&self) -> &dyn Messenger {
        self.messenger.as_ref()
    }

    /// Checked Zabbix API call
    pub async fn zapi(&self, method: &str, params: Value) -> AppResult<Value> {
        // Never logged in: fix the credentials and restart the bot
        if !self.api.logged_in() {
            return Err(AppError::zapi_unavailable());
        }

        self.api.call(method, params).await
    }

    async fn zapi_as<T: DeserializeOwned>(&self, method: &str, params: Value) -> AppResult<T> {
        let result = self.zapi(method, params).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Run the command in a chat message and return the reply
    pub async fn dispatch(&self, msg: &Message) -> AppResult<String> {
        let Some((name, args)) = command::parse(&msg.body) else {
            return command::help(None);
        };
        let spec = command::find(&name).ok_or_else(|| AppError::command_not_found(&name))?;
        spec.check_args(&args)?;

        info!(command = spec.name, from = %msg.from, "Running command");

        match spec.command {
            Command::Help => command::help(args.first().map(String::as_str)),
            Command::ZabbixVersion => self.zabbix_version().await,
            Command::Alerts => self.alerts().await,
            Command::Ack => self.ack(msg, &args).await,
            Command::Outage => self.outage(msg, &args).await,
            Command::Hosts => self.hosts(args.first().map(String::as_str)).await,
            Command::Groups => self.groups(args.first().map(String::as_str)).await,
        }
    }

    // ============================================
    // zabbix-version
    // ============================================

    /// Version of the Zabbix API
    pub async fn zabbix_version(&self) -> AppResult<String> {
        let version = self.api.api_version().await?;
        Ok(format!("Zabbix API version: {}", version))
    }

    // ============================================
    // alerts
    // ============================================

    /// Current problem triggers; triggers without hosts (broken
    /// expressions) are skipped
    pub async fn get_alerts(&self, query: &AlertQuery) -> AppResult<Vec<Trigger>> {
        let triggers: Vec<Trigger> = self.zapi_as("trigger.get", query.params()).await?;
        Ok(triggers.into_iter().filter(|t| !t.hosts.is_empty()).collect())
    }

    /// Current alerts with acknowledge notes
    pub async fn alerts(&self) -> AppResult<String> {
        let query = AlertQuery {
            expand_description: true,
            output: ALERT_OUTPUT_FULL,
            select_hosts: ALERT_HOSTS_FULL,
            ..AlertQuery::default()
        };
        let triggers = self.get_alerts(&query).await?;

        let eventids: Vec<&str> = triggers
            .iter()
            .filter_map(|t| t.last_event.as_ref())
            .map(|e| e.eventid.as_str())
            .collect();

        let events: Vec<Event> = if eventids.is_empty() {
            Vec::new()
        } else {
            self.zapi_as(
                "event.get",
                json!({
                    "eventids": eventids,
                    "output": "extend",
                    "select_acknowledges": "extend",
                    "sortfield": "eventid",
                    "sortorder": "DESC",
                }),
            )
            .await?
        };

        Ok(format_alerts(&triggers, &events, self.api.server(), &Local::now()))
    }

    // ============================================
    // ack
    // ============================================

    /// Acknowledge events with an optional note
    pub async fn ack(&self, msg: &Message, args: &[String]) -> AppResult<String> {
        let (eventids, note) = match parse_ack(args)? {
            AckTarget::All { note } => {
                let mut extra = Map::new();
                extra.insert("withLastEventUnacknowledged".to_string(), Value::Bool(true));
                let query = AlertQuery {
                    extra,
                    ..AlertQuery::default()
                };

                let eventids: Vec<Value> = self
                    .get_alerts(&query)
                    .await?
                    .into_iter()
                    .filter_map(|t| t.last_event)
                    .map(|e| Value::String(e.eventid))
                    .collect();

                if eventids.is_empty() {
                    return Err(AppError::new(
                        ErrorCode::CommandNoEvents,
                        "No unacknowledged events found",
                    ));
                }
                (eventids, note)
            }
            AckTarget::Events { ids, note } => (ids.into_iter().map(Value::from).collect(), note),
        };

        let message = format!("{}: {}", self.messenger.get_jid(msg), note);
        let res = self
            .zapi(
                "event.acknowledge",
                json!({
                    "eventids": eventids,
                    "message": message,
                }),
            )
            .await?;

        Ok(format!("Event ID(s) {} acknowledged", bold(join_ids(&res["eventids"]))))
    }

    // ============================================
    // outage
    // ============================================

    /// Show, create or delete maintenance periods
    pub async fn outage(&self, msg: &Message, args: &[String]) -> AppResult<String> {
        match parse_outage(args)? {
            OutageAction::List => self.outage_list().await,
            OutageAction::Add(request) => self.outage_add(msg, &request).await,
            OutageAction::Delete(ids) => self.outage_del(&ids).await,
        }
    }

    async fn outage_list(&self) -> AppResult<String> {
        let maintenances = self.get_maintenances().await?;
        Ok(format_maintenances(&maintenances, self.api.server()))
    }

    async fn outage_del(&self, ids: &[i64]) -> AppResult<String> {
        self.zapi("maintenance.delete", json!(ids)).await?;

        let ids: Vec<String> = ids.iter().map(i64::to_string).collect();
        Ok(format!("Maintenance ID(s) {} deleted", bold(ids.join(","))))
    }

    async fn outage_add(&self, msg: &Message, request: &OutageRequest) -> AppResult<String> {
        let (since, till) = resolve_window(request, Local::now())?;

        let target = match self.search("host.get", "hostid", &request.targets).await? {
            hosts if !hosts.is_empty() => MaintenanceTarget::Hosts(hosts),
            _ => match self.search("hostgroup.get", "groupid", &request.targets).await? {
                groups if !groups.is_empty() => MaintenanceTarget::Groups(groups),
                _ => {
                    return Err(AppError::new(
                        ErrorCode::CommandHostGroupNotFound,
                        "Host/Group not found",
                    ))
                }
            },
        };

        let jid = self.messenger.get_jid(msg);
        let params = maintenance_params(&jid, since, till, &target);
        let res = self.zapi("maintenance.create", params).await?;

        let id = res["maintenanceids"]
            .get(0)
            .map(value_text)
            .ok_or_else(|| AppError::invalid_response("No maintenance ID in Zabbix API response"))?;

        Ok(format!(
            "Added maintenance ID {} for {}",
            bold(id),
            target.description()
        ))
    }

    /// Search hosts or host groups by several wildcard patterns; returns
    /// unique (id, name) pairs in first-seen order
    async fn search(
        &self,
        method: &str,
        id_field: &str,
        patterns: &[String],
    ) -> AppResult<Vec<(String, String)>> {
        let lookups = patterns
            .iter()
            .map(|pattern| self.zapi(method, search_params(id_field, pattern)));
        let replies = try_join_all(lookups).await?;

        let mut found: Vec<(String, String)> = Vec::new();
        for item in replies.iter().filter_map(Value::as_array).flatten() {
            let id = value_text(&item[id_field]);
            if id.is_empty() || found.iter().any(|(known, _)| *known == id) {
                continue;
            }
            found.push((id, value_text(&item["name"])));
        }

        Ok(found)
    }

    /// All maintenance periods
    pub async fn get_maintenances(&self) -> AppResult<Vec<Maintenance>> {
        self.zapi_as(
            "maintenance.get",
            json!({
                "output": "extend",
                "sortfield": ["maintenanceid", "name"],
                "sortorder": "ASC",
            }),
        )
        .await
    }

    // ============================================
    // hosts / groups
    // ============================================

    /// Hosts, optionally filtered by name
    pub async fn hosts(&self, search: Option<&str>) -> AppResult<String> {
        let mut params = json!({
            "output": ["hostid", "name", "available", "maintenance_status", "status"],
            "selectInventory": 1,
            "sortfield": ["name", "hostid"],
            "sortorder": "ASC",
            "searchWildcardsEnabled": true,
            "searchByAny": true,
        });
        if let Some(pattern) = search {
            params["search"] = json!({"name": pattern});
        }

        let hosts: Vec<Host> = self.zapi_as("host.get", params).await?;
        Ok(format_hosts(&hosts, self.api.server()))
    }

    /// Host groups, optionally filtered by name
    pub async fn groups(&self, search: Option<&str>) -> AppResult<String> {
        let mut params = json!({
            "output": ["groupid", "name"],
            "selectHosts": ["hostid", "name"],
            "sortfield": ["name", "groupid"],
            "sortorder": "ASC",
            "searchWildcardsEnabled": true,
            "searchByAny": true,
        });
        if let Some(pattern) = search {
            params["search"] = json!({"name": pattern});
        }

        let groups: Vec<HostGroup> = self.zapi_as("hostgroup.get", params).await?;
        Ok(format_groups(&groups, self.api.server()))
    }
}

/// JSON scalar as plain text (strings without quotes)
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Comma separated IDs from a JSON array
fn join_ids(value: &Value) -> String {
    value
        .as_array()
        .map(|ids| ids.iter().map(value_text).collect::<Vec<_>>().join(","))
        .unwrap_or_default()
}
