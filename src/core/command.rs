//! Command table and argument parsing
//!
//! Chat commands are the first word of a message; the remaining words are
//! positional arguments.

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::utils::markup::bold;

/// Commands provided by the plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    ZabbixVersion,
    Alerts,
    Ack,
    Outage,
    Hosts,
    Groups,
}

/// Static command description
#[derive(Debug)]
pub struct CommandSpec {
    pub command: Command,
    pub name: &'static str,
    pub summary: &'static str,
    pub usage: &'static [&'static str],
    /// Required positional arguments
    pub min_args: usize,
    /// Accepted positional arguments (`None` = unlimited)
    pub max_args: Option<usize>,
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: Command::Help,
        name: "help",
        summary: "Show available commands or usage of one command.",
        usage: &["help [command]"],
        min_args: 0,
        max_args: Some(1),
    },
    CommandSpec {
        command: Command::ZabbixVersion,
        name: "zabbix-version",
        summary: "Show version of Zabbix API.",
        usage: &["zabbix-version"],
        min_args: 0,
        max_args: Some(0),
    },
    CommandSpec {
        command: Command::Alerts,
        name: "alerts",
        summary: "Show a list of current zabbix alerts with notes attached to each event ID.",
        usage: &["alerts"],
        min_args: 0,
        max_args: Some(0),
    },
    CommandSpec {
        command: Command::Ack,
        name: "ack",
        summary: "Acknowledge event(s) with optional note.",
        usage: &[
            "ack <event ID> [event ID2] [event ID3] ... [note]",
            "ack all [note]",
        ],
        min_args: 1,
        max_args: None,
    },
    CommandSpec {
        command: Command::Outage,
        name: "outage",
        summary: "Show, create or delete maintenance periods.",
        usage: &[
            "outage",
            "outage add <host1/group1 name> [host2/group2 name] ... +<duration in minutes>",
            "outage add <host1/group1 name> [host2/group2 name] ... now <duration in minutes>",
            "outage add <host1/group1 name> [host2/group2 name] ... <start date time Y-m-d-H-M> <duration in minutes>",
            "outage add <host1/group1 name> [host2/group2 name] ... <start date time Y-m-d-H-M> <end date time Y-m-d-H-M>",
            "outage del <maintenance ID1> [maintenance ID2] ...",
        ],
        min_args: 0,
        max_args: None,
    },
    CommandSpec {
        command: Command::Hosts,
        name: "hosts",
        summary: "Show a list of hosts.",
        usage: &["hosts [host name search string]"],
        min_args: 0,
        max_args: Some(1),
    },
    CommandSpec {
        command: Command::Groups,
        name: "groups",
        summary: "Show a list of host groups.",
        usage: &["groups [group name search string]"],
        min_args: 0,
        max_args: Some(1),
    },
];

/// Look up a command by chat name
pub fn find(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.name == name)
}

/// Split a message body into lowercase command name and arguments
pub fn parse(body: &str) -> Option<(String, Vec<String>)> {
    let mut words = body.split_whitespace();
    let name = words.next()?.to_lowercase();
    Some((name, words.map(String::from).collect()))
}

impl CommandSpec {
    /// Usage lines prefixed with `Usage: `
    pub fn usage_text(&self) -> String {
        self.usage
            .iter()
            .map(|line| format!("Usage: {}", line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Validate the argument count
    pub fn check_args(&self, args: &[String]) -> AppResult<()> {
        if args.len() < self.min_args {
            return Err(AppError::new(
                ErrorCode::CommandMissingParameter,
                format!("Missing parameter\n{}", self.usage_text()),
            ));
        }
        if self.max_args.is_some_and(|max| args.len() > max) {
            return Err(AppError::new(
                ErrorCode::CommandInvalidParameter,
                format!("Too many parameters\n{}", self.usage_text()),
            ));
        }
        Ok(())
    }
}

/// `help` reply
pub fn help(topic: Option<&str>) -> AppResult<String> {
    match topic {
        Some(name) => {
            let spec = find(&name.to_lowercase()).ok_or_else(|| AppError::command_not_found(name))?;
            Ok(format!("{}\n\n{}\n{}", bold(spec.name), spec.summary, spec.usage_text()))
        }
        None => {
            let lines: Vec<String> = COMMANDS
                .iter()
                .map(|spec| format!("{} - {}", bold(spec.name), spec.summary))
                .collect();
            Ok(format!("{}\n\n{}", bold("Available commands"), lines.join("\n")))
        }
    }
}
