//! Reply rendering for listing commands

use chrono::{DateTime, Local};
use serde_json::Value;
use std::collections::HashMap;

use crate::models::types::{zabbix_int, Event, Host, HostGroup, Maintenance, Trigger};
use crate::utils::constants::{get_severity, SEVERITY_COLUMN_WIDTH};
use crate::utils::markup::{bold, green, italic, red, small};
use crate::utils::time::{get_age, ljust, parse_timestamp, timestamp_to_datetime};

/// Marker appended to hosts in maintenance
const MAINTENANCE_MARK: &str = " **++**";

/// Marker appended to triggers in unknown state
const TRIGGER_ERROR_MARK: &str = " **??**";

/// Inventory fields never shown
const HIDDEN_INVENTORY_KEYS: [&str; 2] = ["inventory_mode", "hostid"];

/// `alerts` reply
pub fn format_alerts(
    triggers: &[Trigger],
    events: &[Event],
    server: &str,
    now: &DateTime<Local>,
) -> String {
    let events_by_id: HashMap<&str, &Event> =
        events.iter().map(|e| (e.eventid.as_str(), e)).collect();
    let mut out = Vec::with_capacity(triggers.len() + 1);

    for trigger in triggers {
        let Some(host) = trigger.hosts.first() else {
            continue;
        };

        let (eventid, ack) = match &trigger.last_event {
            Some(event) if event.is_acknowledged() => (event.eventid.as_str(), small(bold("ACK"))),
            Some(event) => (event.eventid.as_str(), String::new()),
            None => ("????", String::new()),
        };

        let mut hostname = host.name.clone();
        if host.in_maintenance() {
            hostname.push_str(MAINTENANCE_MARK);
        }

        let mut desc = trigger.description.clone();
        if trigger.is_broken() {
            desc.push_str(TRIGGER_ERROR_MARK);
        }

        let prio = ljust(get_severity(zabbix_int(&trigger.priority)), SEVERITY_COLUMN_WIDTH);

        let age = match parse_timestamp(&trigger.lastchange) {
            Some(dt) => small(get_age(&dt, now)),
            None => small("?"),
        };

        let mut comments = String::new();
        if !trigger.error.is_empty() {
            comments.push_str(&format!("\n\t\t^^**Error:** {}^^", trigger.error));
        }
        if !trigger.comments.is_empty() {
            comments.push_str(&format!("\n\t\t{}", small(trigger.comments.trim())));
        }

        // Newest note first
        let mut acknowledges = String::new();
        if let Some(event) = trigger
            .last_event
            .as_ref()
            .and_then(|last| events_by_id.get(last.eventid.as_str()))
        {
            for a in &event.acknowledges {
                acknowledges = format!(
                    "\n\t\t{}{}",
                    italic(format!("{}: {}", timestamp_to_datetime(&a.clock), a.message)),
                    acknowledges
                );
            }
        }

        out.push(format!(
            "{}\t{}\t{}\t{}\t{}\t{}{}{}\n",
            bold(eventid),
            prio,
            hostname,
            desc,
            age,
            ack,
            comments,
            acknowledges
        ));
    }

    let shown = out.len();
    out.push(format!(
        "\n{} issues are shown.\n{}/tr_status.php?groupid=0&hostid=0",
        bold(shown),
        server
    ));

    out.join("\n")
}

/// `hosts` reply
pub fn format_hosts(hosts: &[Host], server: &str) -> String {
    let mut out = Vec::with_capacity(hosts.len() + 1);

    for host in hosts {
        let mut name = host.name.clone();
        if host.in_maintenance() {
            name.push_str(MAINTENANCE_MARK);
        }

        let status = if host.is_monitored() {
            "Monitored"
        } else {
            "Not monitored"
        };

        let available = match host.availability() {
            1 => green("Z"),
            2 => red("Z"),
            _ => "Z".to_string(),
        };

        let fields: Vec<String> = host
            .inventory
            .iter()
            .flatten()
            .filter(|(key, _)| !HIDDEN_INVENTORY_KEYS.contains(&key.as_str()))
            .filter_map(|(key, value)| inventory_value(value).map(|v| format!("{}: {}", bold(key), v)))
            .collect();

        let inventory = if fields.is_empty() {
            String::new()
        } else {
            format!("\n\t\t{}", small(fields.join(", ").trim()))
        };

        out.push(format!(
            "{}\t{}\t{}\t{}{}",
            bold(&host.hostid),
            name,
            status,
            available,
            inventory
        ));
    }

    out.push(format!(
        "\n{} hosts are shown.\n{}/hosts.php?groupid=0",
        bold(hosts.len()),
        server
    ));

    out.join("\n")
}

/// Non-empty inventory value as display text
fn inventory_value(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        other => Some(other.to_string()),
    }
}

/// `groups` reply
pub fn format_groups(groups: &[HostGroup], server: &str) -> String {
    let mut out = Vec::with_capacity(groups.len() + 1);

    for group in groups {
        let hosts: Vec<String> = group
            .hosts
            .iter()
            .map(|h| format!("{}: {}", bold(&h.hostid), h.name))
            .collect();

        out.push(format!(
            "{}\t{}\n\t\t{}",
            bold(&group.groupid),
            group.name,
            small(format!("{} ", hosts.join(", ")))
        ));
    }

    out.push(format!(
        "\n{} hostgroups are shown.\n{}/hostgroups.php",
        bold(groups.len()),
        server
    ));

    out.join("\n")
}

/// `outage` listing reply
pub fn format_maintenances(maintenances: &[Maintenance], server: &str) -> String {
    let mut out = Vec::with_capacity(maintenances.len() + 1);

    for m in maintenances {
        let desc = if m.description.is_empty() {
            String::new()
        } else {
            format!("\n\t{}", small(&m.description))
        };

        out.push(format!(
            "{}\t{} - {}\t{}{}\n",
            bold(&m.maintenanceid),
            timestamp_to_datetime(&m.active_since),
            timestamp_to_datetime(&m.active_till),
            italic(&m.name),
            desc
        ));
    }

    out.push(format!(
        "\n{} maintenances are shown.\n{}/maintenance.php?groupid=0",
        bold(maintenances.len()),
        server
    ));

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    const SERVER: &str = "https://zabbix.example.com";

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).earliest().unwrap()
    }

    #[test]
    fn test_alert_line() {
        let lastchange = (now() - Duration::minutes(90)).timestamp();
        let ack_clock = now() - Duration::minutes(30);
        let triggers: Vec<Trigger> = serde_json::from_value(json!([{
            "triggerid": "1",
            "description": "Disk full",
            "priority": "4",
            "state": "0",
            "error": "",
            "comments": "  Clean /var  ",
            "lastchange": lastchange.to_string(),
            "hosts": [{"hostid": "10", "name": "web1", "maintenance_status": "1"}],
            "lastEvent": {"eventid": "555", "acknowledged": "1"}
        }]))
        .unwrap();
        let events: Vec<Event> = serde_json::from_value(json!([{
            "eventid": "555",
            "acknowledges": [
                {"clock": ack_clock.timestamp().to_string(), "message": "first"},
                {"clock": ack_clock.timestamp().to_string(), "message": "second"}
            ]
        }]))
        .unwrap();

        let text = format_alerts(&triggers, &events, SERVER, &now());
        let stamp = ack_clock.format("%Y-%m-%d %H:%M:%S");
        let expected_line = format!(
            "**555**\tHigh        \tweb1 **++**\tDisk full\t^^1h 30m 0s^^\t^^**ACK**^^\n\t\t^^Clean /var^^\n\t\t__{}: second__\n\t\t__{}: first__\n",
            stamp, stamp
        );

        assert!(text.starts_with(&expected_line), "{}", text);
        assert!(text.ends_with(
            "\n\n**1** issues are shown.\nhttps://zabbix.example.com/tr_status.php?groupid=0&hostid=0"
        ));
    }

    #[test]
    fn test_alert_without_event_and_with_error() {
        let triggers: Vec<Trigger> = serde_json::from_value(json!([{
            "triggerid": "2",
            "description": "Broken",
            "priority": "9",
            "state": "1",
            "error": "Cannot evaluate",
            "lastchange": "bogus",
            "hosts": [{"hostid": "11", "name": "db1", "maintenance_status": "0"}],
            "lastEvent": []
        }]))
        .unwrap();

        let text = format_alerts(&triggers, &[], SERVER, &now());
        assert!(text.starts_with(
            "**????**\tUnknown     \tdb1\tBroken **??**\t^^?^^\t\n\t\t^^**Error:** Cannot evaluate^^\n"
        ));
    }

    #[test]
    fn test_alerts_empty() {
        let text = format_alerts(&[], &[], SERVER, &now());
        assert_eq!(
            text,
            "\n**0** issues are shown.\nhttps://zabbix.example.com/tr_status.php?groupid=0&hostid=0"
        );
    }

    #[test]
    fn test_host_lines() {
        let hosts: Vec<Host> = serde_json::from_value(json!([
            {
                "hostid": "10084", "name": "web1", "available": "1",
                "maintenance_status": "0", "status": "0",
                "inventory": {"hostid": "10084", "inventory_mode": "0", "os": "Linux", "tag": "", "location": "DC1"}
            },
            {
                "hostid": "10085", "name": "db1", "available": "2",
                "maintenance_status": "1", "status": "1", "inventory": []
            },
            {
                "hostid": "10086", "name": "new", "available": "0",
                "maintenance_status": "0", "status": "0"
            }
        ]))
        .unwrap();

        let text = format_hosts(&hosts, SERVER);
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines[0], "**10084**\tweb1\tMonitored\t[[color:green]]Z[[/color]]");
        assert_eq!(lines[1], "\t\t^^**os**: Linux, **location**: DC1^^");
        assert_eq!(lines[2], "**10085**\tdb1 **++**\tNot monitored\t[[color:red]]Z[[/color]]");
        assert_eq!(lines[3], "**10086**\tnew\tMonitored\tZ");
        assert!(text.ends_with("\n\n**3** hosts are shown.\nhttps://zabbix.example.com/hosts.php?groupid=0"));
    }

    #[test]
    fn test_group_lines() {
        let groups: Vec<HostGroup> = serde_json::from_value(json!([
            {"groupid": "2", "name": "Linux servers", "hosts": [
                {"hostid": "10084", "name": "web1"},
                {"hostid": "10085", "name": "db1"}
            ]},
            {"groupid": "5", "name": "Empty", "hosts": []}
        ]))
        .unwrap();

        let text = format_groups(&groups, SERVER);
        assert!(text.starts_with(
            "**2**\tLinux servers\n\t\t^^**10084**: web1, **10085**: db1 ^^\n**5**\tEmpty\n\t\t^^ ^^\n"
        ));
        assert!(text.ends_with("**2** hostgroups are shown.\nhttps://zabbix.example.com/hostgroups.php"));
    }

    #[test]
    fn test_maintenance_lines() {
        let since = now();
        let till = now() + Duration::hours(1);
        let maintenances: Vec<Maintenance> = serde_json::from_value(json!([
            {
                "maintenanceid": "3", "name": "Maintenance 1 by admin@example.com",
                "description": "hosts: web1",
                "active_since": since.timestamp().to_string(),
                "active_till": till.timestamp().to_string()
            },
            {"maintenanceid": "4", "name": "Nightly", "description": "",
             "active_since": "0", "active_till": "x"}
        ]))
        .unwrap();

        let text = format_maintenances(&maintenances, SERVER);
        let expected = "**3**\t2024-03-10 12:00:00 - 2024-03-10 13:00:00\t__Maintenance 1 by admin@example.com__\n\t^^hosts: web1^^\n";
        assert!(text.starts_with(expected), "{}", text);
        assert!(text.contains(" - x\t__Nightly__\n"));
        assert!(text.ends_with("**2** maintenances are shown.\nhttps://zabbix.example.com/maintenance.php?groupid=0"));
    }
}
