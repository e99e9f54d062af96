//! Argument handling for `ack` and `outage`
//!
//! Everything here is pure so it can be checked without a Zabbix server.

use chrono::{DateTime, Duration, Local};
use serde_json::{json, Value};

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::MAINTENANCE_NAME_MAX_LEN;
use crate::utils::time::parse_outage_datetime;

/// Default acknowledge note
pub const DEFAULT_ACK_NOTE: &str = "ack";

/// What `ack` should acknowledge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckTarget {
    /// Every problem whose last event is unacknowledged
    All { note: String },
    /// Explicit event IDs
    Events { ids: Vec<i64>, note: String },
}

/// Parse `ack` arguments.
///
/// `ack all [note]` or `ack <id> [id ...] [note]`; the first argument that
/// is not an integer starts the note.
pub fn parse_ack(args: &[String]) -> AppResult<AckTarget> {
    let (first, rest) = args.split_first().ok_or_else(AppError::parameter_required)?;

    let note_from = |words: &[String]| {
        if words.is_empty() {
            DEFAULT_ACK_NOTE.to_string()
        } else {
            words.join(" ")
        }
    };

    if first == "all" {
        return Ok(AckTarget::All {
            note: note_from(rest),
        });
    }

    let mut ids = vec![first.parse::<i64>().map_err(|_| AppError::integer_required())?];
    let mut note = DEFAULT_ACK_NOTE.to_string();

    for (i, arg) in rest.iter().enumerate() {
        match arg.parse::<i64>() {
            Ok(id) => ids.push(id),
            Err(_) => {
                note = note_from(&rest[i..]);
                break;
            }
        }
    }

    Ok(AckTarget::Events { ids, note })
}

/// `outage` sub-command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutageAction {
    List,
    Add(OutageRequest),
    Delete(Vec<i64>),
}

/// Raw `outage add` arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutageRequest {
    /// `now` or `YYYY-mm-dd-HH-MM`
    pub start: String,
    /// Minutes or `YYYY-mm-dd-HH-MM`
    pub end_or_duration: String,
    /// Host or host group search strings
    pub targets: Vec<String>,
}

/// Parse `outage` arguments. Fewer than two arguments lists maintenances.
pub fn parse_outage(args: &[String]) -> AppResult<OutageAction> {
    if args.len() < 2 {
        return Ok(OutageAction::List);
    }

    match args[0].as_str() {
        "add" => {
            let n = args.len();
            let last = &args[n - 1];

            let (start, end_or_duration, targets) = match last.strip_prefix('+') {
                Some(minutes) => ("now".to_string(), minutes.to_string(), args[1..n - 1].to_vec()),
                None if n >= 3 => (args[n - 2].clone(), last.clone(), args[1..n - 2].to_vec()),
                None => (String::new(), last.clone(), Vec::new()),
            };

            if start.is_empty() || end_or_duration.is_empty() || targets.is_empty() {
                return Err(AppError::parameter_required());
            }

            Ok(OutageAction::Add(OutageRequest {
                start,
                end_or_duration,
                targets,
            }))
        }
        "del" => {
            let ids = args[1..]
                .iter()
                .map(|arg| arg.parse::<i64>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| AppError::integer_required())?;
            Ok(OutageAction::Delete(ids))
        }
        _ => Err(AppError::invalid_parameter("Invalid action")),
    }
}

/// Resolve the maintenance window of an `outage add` request
pub fn resolve_window(
    request: &OutageRequest,
    now: DateTime<Local>,
) -> AppResult<(DateTime<Local>, DateTime<Local>)> {
    let start = if request.start == "now" {
        now
    } else {
        parse_outage_datetime(&request.start).ok_or_else(|| invalid_datetime("start"))?
    };

    let end = match request.end_or_duration.parse::<i64>() {
        Ok(minutes) => Duration::try_minutes(minutes)
            .and_then(|duration| start.checked_add_signed(duration))
            .ok_or_else(|| invalid_datetime("duration or end"))?,
        Err(_) => parse_outage_datetime(&request.end_or_duration)
            .ok_or_else(|| invalid_datetime("duration or end"))?,
    };

    if end <= start {
        return Err(AppError::invalid_parameter(
            "End date-time must be after start date-time",
        ));
    }

    Ok((start, end))
}

fn invalid_datetime(name: &str) -> AppError {
    AppError::invalid_parameter(format!(
        "Invalid {} date-time (required format: YYYY-mm-dd-HH-MM)",
        name
    ))
}

/// Hosts or host groups a maintenance applies to, as (id, name) pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaintenanceTarget {
    Hosts(Vec<(String, String)>),
    Groups(Vec<(String, String)>),
}

impl MaintenanceTarget {
    /// Human readable target list (`hosts: a, b`)
    pub fn description(&self) -> String {
        let (kind, items) = match self {
            Self::Hosts(items) => ("hosts", items),
            Self::Groups(items) => ("groups", items),
        };
        let names: Vec<&str> = items.iter().map(|(_, name)| name.as_str()).collect();
        format!("{}: {}", kind, names.join(", "))
    }
}

/// Parameters for `maintenance.create`: one-time period with data collection
pub fn maintenance_params(
    jid: &str,
    since: DateTime<Local>,
    till: DateTime<Local>,
    target: &MaintenanceTarget,
) -> Value {
    let since_ts = since.timestamp().to_string();
    let till_ts = till.timestamp().to_string();
    let period = (till - since).num_seconds();

    let name: String = format!("Maintenance {} by {}", since_ts, jid)
        .chars()
        .take(MAINTENANCE_NAME_MAX_LEN)
        .collect();

    let mut options = json!({
        "name": name,
        "description": target.description(),
        "active_since": since_ts,
        "active_till": till_ts,
        "maintenance_type": 0,
        "timeperiods": [{
            "timeperiod_type": 0,
            "start_date": since_ts,
            "period": period,
        }],
    });

    match target {
        MaintenanceTarget::Hosts(items) => {
            options["hostids"] = json!(items.iter().map(|(id, _)| id).collect::<Vec<_>>());
        }
        MaintenanceTarget::Groups(items) => {
            options["groupids"] = json!(items.iter().map(|(id, _)| id).collect::<Vec<_>>());
        }
    }

    options
}
