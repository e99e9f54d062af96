//! Core Module - Plugin Logic
//!
//! Command table, chat commands, maintenance job and the chat transport seam.

pub mod command;
pub mod maintenance;
pub mod messenger;
pub mod outage;
pub mod plugin;
pub mod report;

pub use command::{Command, CommandSpec, COMMANDS};
pub use maintenance::{run_maintenance_job, spawn_maintenance_task, MaintenanceAction};
pub use messenger::{bare_jid, ConsoleMessenger, Message, MessageType, Messenger};
pub use plugin::Zapi;
