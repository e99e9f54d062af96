//! Chat transport seam
//!
//! The plugin never talks XMPP itself. It receives [`Message`]s from the
//! host bot and sends replies, alerts and notifications through a
//! [`Messenger`].

use std::io::Write;
use tracing::info;

use crate::models::errors::AppResult;
use crate::utils::markup;

/// XMPP message type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Normal,
    Chat,
    Groupchat,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Chat => "chat",
            Self::Groupchat => "groupchat",
        }
    }
}

/// Incoming chat message
#[derive(Debug, Clone)]
pub struct Message {
    /// Sender JID, possibly with resource (`user@domain/resource`)
    pub from: String,
    pub body: String,
    pub mtype: MessageType,
}

impl Message {
    /// Direct chat message
    pub fn chat(from: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            body: body.into(),
            mtype: MessageType::Chat,
        }
    }
}

/// JID without resource
pub fn bare_jid(jid: &str) -> &str {
    jid.split('/').next().unwrap_or(jid)
}

/// Outgoing side of the chat connection
pub trait Messenger: Send + Sync {
    /// Multi-user chat room the bot sits in
    fn room(&self) -> Option<&str>;

    /// Sender identity used in acknowledge notes and maintenance names.
    /// Group chat messages are identified by room nick.
    fn get_jid(&self, msg: &Message) -> String {
        match msg.mtype {
            MessageType::Groupchat => msg
                .from
                .split_once('/')
                .map(|(_, nick)| nick.to_string())
                .unwrap_or_else(|| msg.from.clone()),
            _ => bare_jid(&msg.from).to_string(),
        }
    }

    /// Send a message to one JID (or the room)
    fn msg_send(&self, jid: &str, body: &str, mtype: MessageType) -> AppResult<()>;

    /// Send a message to every user of the bot
    fn msg_broadcast(&self, body: &str) -> AppResult<()>;
}

/// Messenger writing to stdout, used by the shipped console host
pub struct ConsoleMessenger {
    room: Option<String>,
}

impl ConsoleMessenger {
    pub fn new(room: Option<String>) -> Self {
        Self { room }
    }
}

impl Messenger for ConsoleMessenger {
    fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    fn msg_send(&self, jid: &str, body: &str, mtype: MessageType) -> AppResult<()> {
        info!(to = %jid, mtype = mtype.as_str(), "Sending message");
        let mut out = std::io::stdout().lock();
        writeln!(out, "[{} -> {}]\n{}", mtype.as_str(), jid, markup::strip(body))?;
        Ok(())
    }

    fn msg_broadcast(&self, body: &str) -> AppResult<()> {
        info!("Broadcasting message");
        let mut out = std::io::stdout().lock();
        writeln!(out, "[broadcast]\n{}", markup::strip(body))?;
        Ok(())
    }
}
