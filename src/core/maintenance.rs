//! Maintenance cleanup job
//!
//! Every five minutes: delete outdated maintenance periods and warn the
//! owner about periods that are about to end.

use chrono::{DateTime, Duration, Local};
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::core::messenger::MessageType;
use crate::core::plugin::Zapi;
use crate::models::errors::AppResult;
use crate::models::types::Maintenance;
use crate::utils::constants::{MAINTENANCE_CRON_STEP_MINUTES, MAINTENANCE_NOTICE_MINUTES};
use crate::utils::markup::{bold, small};
use crate::utils::time::{next_cron_run, parse_timestamp};

/// What the job does with one maintenance period
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaintenanceAction {
    /// Already over
    Delete,
    /// Ends within the notice window
    NotifyEnding(DateTime<Local>),
    Keep,
}

/// Decide what to do with a maintenance period at `now`
pub fn decide(maintenance: &Maintenance, now: &DateTime<Local>) -> MaintenanceAction {
    let Some(until) = parse_timestamp(&maintenance.active_till) else {
        return MaintenanceAction::Keep;
    };

    if until < *now {
        MaintenanceAction::Delete
    } else if until < *now + Duration::minutes(MAINTENANCE_NOTICE_MINUTES) {
        MaintenanceAction::NotifyEnding(until)
    } else {
        MaintenanceAction::Keep
    }
}

/// Chat text for a deleted maintenance
pub fn deleted_message(maintenance: &Maintenance) -> String {
    format!(
        "Maintenance ID {} {} deleted",
        bold(&maintenance.maintenanceid),
        small(format!("({})", maintenance.description))
    )
}

/// Chat text for a maintenance about to end
pub fn ending_message(maintenance: &Maintenance, until: &DateTime<Local>) -> String {
    format!(
        "Maintenance ID {} {} is going to end {}",
        bold(&maintenance.maintenanceid),
        small(format!("({})", maintenance.description)),
        until.format("on %Y-%m-%d at %H:%M:%S")
    )
}

/// One pass of the job. Returns the number of messages sent.
pub async fn run_maintenance_job(plugin: &Zapi, now: DateTime<Local>) -> AppResult<usize> {
    let maintenances = plugin.get_maintenances().await?;
    let mut sent = 0;

    for maintenance in &maintenances {
        let mid = &maintenance.maintenanceid;
        let name = &maintenance.name;

        let msg = match decide(maintenance, &now) {
            MaintenanceAction::Delete => {
                info!("Deleting maintenance {} ({})", mid, name);
                if let Err(e) = plugin.zapi("maintenance.delete", json!([mid])).await {
                    error!(code = e.code_str(), "Cannot delete maintenance {} ({}): {}", mid, name, e);
                    continue;
                }
                deleted_message(maintenance)
            }
            MaintenanceAction::NotifyEnding(until) => {
                info!("Sending notification about maintenance {} ({}) end", mid, name);
                ending_message(maintenance, &until)
            }
            MaintenanceAction::Keep => continue,
        };

        let delivery = match maintenance.owner_jid() {
            Some(jid) => plugin.messenger().msg_send(jid, &msg, MessageType::Normal),
            None => {
                warn!("Missing JID in maintenance {} ({}). Broadcasting to all users...", mid, name);
                plugin.messenger().msg_broadcast(&msg)
            }
        };

        match delivery {
            Ok(()) => sent += 1,
            Err(e) => error!(code = e.code_str(), "Cannot deliver maintenance notice: {}", e),
        }
    }

    Ok(sent)
}

/// Run the job on every 5-minute boundary until the task is aborted
pub fn spawn_maintenance_task(plugin: Arc<Zapi>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let now = Local::now();
            let next = next_cron_run(&now, MAINTENANCE_CRON_STEP_MINUTES);
            let wait = (next - now).to_std().unwrap_or_default();
            debug!("Next maintenance job at {}", next.format("%H:%M:%S"));
            tokio::time::sleep(wait).await;

            match run_maintenance_job(&plugin, Local::now()).await {
                Ok(sent) if sent > 0 => info!("Maintenance job sent {} message(s)", sent),
                Ok(_) => {}
                Err(e) => warn!(code = e.code_str(), "Maintenance job failed: {}", e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).earliest().unwrap()
    }

    fn maintenance(till: DateTime<Local>) -> Maintenance {
        serde_json::from_value(json!({
            "maintenanceid": "9",
            "name": "Maintenance 1 by admin@example.com",
            "description": "hosts: web1",
            "active_since": "0",
            "active_till": till.timestamp().to_string()
        }))
        .unwrap()
    }

    #[test]
    fn test_decide() {
        assert_eq!(
            decide(&maintenance(now() - Duration::seconds(1)), &now()),
            MaintenanceAction::Delete
        );

        let soon = now() + Duration::minutes(4);
        assert_eq!(
            decide(&maintenance(soon), &now()),
            MaintenanceAction::NotifyEnding(soon)
        );

        assert_eq!(
            decide(&maintenance(now() + Duration::minutes(5)), &now()),
            MaintenanceAction::Keep
        );
    }

    #[test]
    fn test_decide_unparsable_till() {
        let mut m = maintenance(now());
        m.active_till = "never".to_string();
        assert_eq!(decide(&m, &now()), MaintenanceAction::Keep);
    }

    #[test]
    fn test_messages() {
        let until = now() + Duration::minutes(3);
        let m = maintenance(until);
        assert_eq!(deleted_message(&m), "Maintenance ID **9** ^^(hosts: web1)^^ deleted");
        assert_eq!(
            ending_message(&m, &until),
            "Maintenance ID **9** ^^(hosts: web1)^^ is going to end on 2024-03-10 at 12:03:00"
        );
    }
}
