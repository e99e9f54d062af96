//! Ludolph Zabbix - console host for the Zabbix plugin
//!
//! Reads chat commands from stdin, one per line, and prints the replies.
//! Alongside it runs the maintenance cleanup job and the alert webhook.
//!
//! Environment:
//!   LUDOLPH_CONFIG - Config file path (default: ludolph.toml)
//!   RUST_LOG       - Log filter (default: info)

use ludolph_zabbix::api::{create_router, AppState};
use ludolph_zabbix::utils::{markup, APP_NAME, APP_VERSION};
use ludolph_zabbix::{spawn_maintenance_task, Config, ConsoleMessenger, Message, Zapi};

use eyre::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Sender used for console input when no bot JID is configured
const CONSOLE_JID: &str = "console@localhost";

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(config.zapi.log_directive().parse()?);

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("{} v{} starting", APP_NAME, APP_VERSION);

    let messenger = Arc::new(ConsoleMessenger::new(config.xmpp.room.clone()));
    let plugin = Arc::new(Zapi::new(&config.zapi, messenger).await?);

    let maintenance_task = spawn_maintenance_task(plugin.clone());

    // Alert webhook
    let state = Arc::new(AppState::new(plugin.clone()));
    let app = create_router(state);
    let addr: SocketAddr = format!("{}:{}", config.webserver.host, config.webserver.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    info!("Alert webhook listening on http://{}", addr);
    info!("  POST /alert   - Relay a Zabbix alert (form fields: jid, msg)");
    info!("  GET  /health  - Health check");

    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Webhook server error: {}", e);
        }
    });

    let sender = config.xmpp.username.clone().unwrap_or_else(|| CONSOLE_JID.to_string());

    tokio::select! {
        result = console_loop(&plugin, &sender) => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutdown signal received"),
    }

    maintenance_task.abort();
    server.abort();
    info!("{} shutdown complete", APP_NAME);

    Ok(())
}

/// Feed stdin lines to the plugin as chat messages
async fn console_loop(plugin: &Zapi, sender: &str) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let msg = Message::chat(sender, line);
        match plugin.dispatch(&msg).await {
            Ok(reply) => println!("{}", markup::strip(&reply)),
            Err(e) => {
                warn!(code = e.code_str(), "Command failed");
                println!("ERROR: {}", markup::strip(&e.to_string()));
            }
        }
    }

    info!("Console input closed");
    Ok(())
}
