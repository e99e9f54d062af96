//! Shared test fixtures: an in-process fake Zabbix frontend and a
//! messenger that records what the plugin sends.

#![allow(dead_code)]

use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
use ludolph_zabbix::{AppResult, Config, MessageType, Messenger, ZapiConfig};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Canned reply of the fake API
#[derive(Debug, Clone)]
pub enum Reply {
    Result(Value),
    Error { code: i64, message: String, data: String },
}

impl Reply {
    pub fn error(code: i64, message: &str, data: &str) -> Self {
        Self::Error {
            code,
            message: message.to_string(),
            data: data.to_string(),
        }
    }

    pub fn session_expired() -> Self {
        Self::error(-32602, "Invalid params.", "Session terminated, re-login, please.")
    }
}

#[derive(Default)]
struct FakeState {
    /// Replies per method; the last one repeats
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<Value>>,
    /// `Authorization` header of every request
    authorization: Mutex<Vec<Option<String>>>,
}

/// Fake `api_jsonrpc.php` endpoint on 127.0.0.1
pub struct FakeZabbix {
    pub server: String,
    state: Arc<FakeState>,
}

impl FakeZabbix {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        let fake = Self {
            server: String::new(),
            state: state.clone(),
        };
        fake.reply("user.login", Reply::Result(json!("token-1")));
        fake.reply("apiinfo.version", Reply::Result(json!("6.0.21")));

        let app = Router::new()
            .route("/api_jsonrpc.php", post(handle))
            .with_state(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            server: format!("http://{}", addr),
            ..fake
        }
    }

    /// Replace the replies of a method
    pub fn reply(&self, method: &str, reply: Reply) {
        self.state
            .replies
            .lock()
            .unwrap()
            .insert(method.to_string(), VecDeque::from([reply]));
    }

    /// Queue another reply after the current ones
    pub fn then_reply(&self, method: &str, reply: Reply) {
        self.state
            .replies
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn result(&self, method: &str, result: Value) {
        self.reply(method, Reply::Result(result));
    }

    /// All received JSON-RPC requests
    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Received requests of one method
    pub fn calls(&self, method: &str) -> Vec<Value> {
        self.requests()
            .into_iter()
            .filter(|r| r["method"] == method)
            .collect()
    }

    /// Received `Authorization` headers, in request order
    pub fn authorization(&self) -> Vec<Option<String>> {
        self.state.authorization.lock().unwrap().clone()
    }

    pub fn config(&self) -> ZapiConfig {
        config_for(&self.server)
    }

    /// Config with extra `[ludolph_zabbix.zapi]` lines
    pub fn config_with(&self, extra: &str) -> ZapiConfig {
        config_text(&self.server, extra)
    }
}

pub fn config_for(server: &str) -> ZapiConfig {
    config_text(server, "")
}

fn config_text(server: &str, extra: &str) -> ZapiConfig {
    Config::from_toml_str(&format!(
        "[ludolph_zabbix.zapi]\nserver = \"{}\"\nusername = \"ludolph\"\npassword = \"secret\"\ntimeout = 5\n{}\n",
        server, extra
    ))
    .unwrap()
    .zapi
}

async fn handle(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    let request: Value = serde_json::from_str(&body).unwrap();
    state.requests.lock().unwrap().push(request.clone());
    state.authorization.lock().unwrap().push(
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    );

    let method = request["method"].as_str().unwrap_or_default().to_string();
    let reply = {
        let mut replies = state.replies.lock().unwrap();
        match replies.get_mut(&method) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        }
    };

    let id = request["id"].clone();
    Json(match reply {
        Some(Reply::Result(result)) => json!({"jsonrpc": "2.0", "result": result, "id": id}),
        Some(Reply::Error { code, message, data }) => json!({
            "jsonrpc": "2.0",
            "error": {"code": code, "message": message, "data": data},
            "id": id
        }),
        None => json!({
            "jsonrpc": "2.0",
            "error": {"code": -32601, "message": "Method not found.", "data": "Incorrect API \"x\"."},
            "id": id
        }),
    })
}

/// Sent message: (jid, body, type); broadcasts use jid `*`
pub type Sent = (String, String, MessageType);

/// Messenger keeping everything it is asked to send
#[derive(Default)]
pub struct RecordingMessenger {
    pub room: Option<String>,
    sent: Mutex<Vec<Sent>>,
}

impl RecordingMessenger {
    pub fn with_room(room: &str) -> Self {
        Self {
            room: Some(room.to_string()),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

impl Messenger for RecordingMessenger {
    fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    fn msg_send(&self, jid: &str, body: &str, mtype: MessageType) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((jid.to_string(), body.to_string(), mtype));
        Ok(())
    }

    fn msg_broadcast(&self, body: &str) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push(("*".to_string(), body.to_string(), MessageType::Normal));
        Ok(())
    }
}
