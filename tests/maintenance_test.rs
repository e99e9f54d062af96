//! Maintenance cleanup job against a fake Zabbix frontend

mod common;

use chrono::{Duration, Local};
use common::{FakeZabbix, RecordingMessenger, Reply};
use ludolph_zabbix::{run_maintenance_job, MessageType, Zapi};
use serde_json::{json, Value};
use std::sync::Arc;

fn maintenance(id: &str, name: &str, till: i64) -> Value {
    json!({
        "maintenanceid": id,
        "name": name,
        "description": "hosts: web1",
        "active_since": "1700000000",
        "active_till": till.to_string(),
    })
}

#[tokio::test]
async fn test_job_deletes_and_notifies() {
    let fake = FakeZabbix::start().await;
    let messenger = Arc::new(RecordingMessenger::default());
    let plugin = Zapi::new(&fake.config(), messenger.clone()).await.unwrap();

    let now = Local::now();
    fake.result(
        "maintenance.get",
        json!([
            maintenance("1", "Maintenance 1700000000 by ops@example.com", (now - Duration::minutes(1)).timestamp()),
            maintenance("2", "Weekly patching", (now + Duration::minutes(3)).timestamp()),
            maintenance("3", "Maintenance 1700000000 by dev@example.com", (now + Duration::hours(2)).timestamp()),
        ]),
    );
    fake.result("maintenance.delete", json!({"maintenanceids": ["1"]}));

    let sent = run_maintenance_job(&plugin, now).await.unwrap();
    assert_eq!(sent, 2);

    let deletes = fake.calls("maintenance.delete");
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0]["params"], json!(["1"]));

    let messages = messenger.sent();
    assert_eq!(messages.len(), 2);

    let (jid, body, mtype) = &messages[0];
    assert_eq!(jid, "ops@example.com");
    assert_eq!(body, "Maintenance ID **1** ^^(hosts: web1)^^ deleted");
    assert_eq!(*mtype, MessageType::Normal);

    // No JID in the name: everybody gets it
    let (jid, body, _) = &messages[1];
    assert_eq!(jid, "*");
    assert!(body.starts_with("Maintenance ID **2** ^^(hosts: web1)^^ is going to end on "));
}

#[tokio::test]
async fn test_job_continues_after_failed_delete() {
    let fake = FakeZabbix::start().await;
    let messenger = Arc::new(RecordingMessenger::default());
    let plugin = Zapi::new(&fake.config(), messenger.clone()).await.unwrap();

    let now = Local::now();
    fake.result(
        "maintenance.get",
        json!([
            maintenance("1", "Maintenance 1 by ops@example.com", (now - Duration::hours(1)).timestamp()),
            maintenance("2", "Maintenance 2 by ops@example.com", (now + Duration::minutes(2)).timestamp()),
        ]),
    );
    fake.reply(
        "maintenance.delete",
        Reply::error(-32500, "Application error.", "No permissions to referred object or it does not exist!"),
    );

    let sent = run_maintenance_job(&plugin, now).await.unwrap();
    assert_eq!(sent, 1);

    let messages = messenger.sent();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].1.contains("**2**"));
}

#[tokio::test]
async fn test_job_fails_when_unavailable() {
    let fake = FakeZabbix::start().await;
    fake.reply(
        "user.login",
        Reply::error(-32602, "Invalid params.", "Login name or password is incorrect."),
    );
    let messenger = Arc::new(RecordingMessenger::default());
    let plugin = Zapi::new(&fake.config(), messenger.clone()).await.unwrap();

    assert!(run_maintenance_job(&plugin, Local::now()).await.is_err());
    assert!(messenger.sent().is_empty());
}
