//! Zabbix API Client Module
//!
//! JSON-RPC 2.0 client for `<server>/api_jsonrpc.php`:
//! 1. `user.login` with saved credentials for transparent re-login
//! 2. Optional HTTP basic auth in front of the frontend
//! 3. Optional TLS verification bypass (`ssl_verify = false`)
//! 4. Exponential backoff with jitter when the connection cannot be made
//!
//! Zabbix >= 2.0.6 is required.

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::models::config::ZapiConfig;
use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{API_PATH, USER_AGENT as USER_AGENT_CONST};

/// Maximum connection attempts per request
pub const MAX_RETRIES: u32 = 3;

/// Base retry delay in milliseconds
pub const BASE_RETRY_MS: u64 = 500;

/// Maximum retry delay in milliseconds
pub const MAX_RETRY_MS: u64 = 4000;

/// Jitter percentage for retry delay
pub const RETRY_JITTER_PERCENT: u64 = 20;

/// JSON-RPC error object
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "error_data")]
    pub data: String,
}

fn error_data<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

impl RpcError {
    /// Session expired or token rejected; a fresh login fixes it
    pub fn is_session_expired(&self) -> bool {
        let data = self.data.to_lowercase();
        data.contains("re-login") || data.contains("not authori") || data.contains("session terminated")
    }

    /// Zabbix >= 5.4 renamed `user.login` parameter `user` to `username`
    fn rejects_user_param(&self) -> bool {
        self.data.contains("unexpected parameter \"user\"")
    }
}

impl From<RpcError> for AppError {
    fn from(err: RpcError) -> Self {
        AppError::zapi_application(&err.message, err.code, &err.data)
    }
}

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// Build a JSON-RPC request body
pub fn build_payload(method: &str, params: &Value, id: u64, auth: Option<&str>) -> Value {
    let mut payload = json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": id
    });

    if let Some(token) = auth {
        payload["auth"] = Value::String(token.to_string());
    }

    payload
}

/// Zabbix API connection
pub struct ZabbixApi {
    /// Frontend base URI
    server: String,
    /// JSON-RPC endpoint
    url: String,
    client: reqwest::Client,
    /// HTTP basic auth (user, password)
    http_auth: Option<(String, Option<String>)>,
    /// Session token
    auth: RwLock<Option<String>>,
    /// Saved credentials for re-login
    credentials: RwLock<Option<(String, String)>>,
    request_id: AtomicU64,
}

impl ZabbixApi {
    /// Create a client (no network traffic yet)
    pub fn new(config: &ZapiConfig) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json-rpc"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .gzip(true)
            .danger_accept_invalid_certs(!config.ssl_verify)
            .build()
            .map_err(|e| AppError::invalid_config(format!("Failed to build HTTP client: {}", e)))?;

        if !config.ssl_verify {
            warn!(server = %config.server, "TLS certificate verification disabled");
        }

        let http_auth = config
            .httpuser
            .clone()
            .map(|user| (user, config.httppasswd.clone()));

        Ok(Self {
            server: config.server.clone(),
            url: format!("{}{}", config.server, API_PATH),
            client,
            http_auth,
            auth: RwLock::new(None),
            credentials: RwLock::new(None),
            request_id: AtomicU64::new(0),
        })
    }

    /// Frontend base URI (used for links in replies)
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Has a session token
    pub fn logged_in(&self) -> bool {
        self.auth.read().map(|auth| auth.is_some()).unwrap_or(false)
    }

    /// Log in and store the session token. With `save` the credentials are
    /// kept for re-login after the session expires.
    pub async fn login(&self, user: &str, password: &str, save: bool) -> AppResult<()> {
        info!(server = %self.server, user = %user, "Zabbix API login");

        let params = json!({ "user": user, "password": password });
        let reply = match self.request("user.login", &params, false).await? {
            Err(err) if err.rejects_user_param() => {
                debug!("Retrying login with `username` parameter");
                let params = json!({ "username": user, "password": password });
                self.request("user.login", &params, false).await?
            }
            other => other,
        };

        let token = match reply.map_err(AppError::from)? {
            Value::String(token) => token,
            other => {
                return Err(AppError::invalid_response(format!(
                    "Unexpected login reply: {}",
                    other
                )))
            }
        };

        if let Ok(mut auth) = self.auth.write() {
            *auth = Some(token);
        }
        if save {
            if let Ok(mut credentials) = self.credentials.write() {
                *credentials = Some((user.to_string(), password.to_string()));
            }
        }

        Ok(())
    }

    /// Zabbix API version (no login needed)
    pub async fn api_version(&self) -> AppResult<String> {
        match self.request("apiinfo.version", &json!([]), false).await?? {
            Value::String(version) => Ok(version),
            other => Ok(other.to_string()),
        }
    }

    /// Call an API method with the session token
    pub async fn call(&self, method: &str, params: Value) -> AppResult<Value> {
        match self.request(method, &params, true).await? {
            Ok(result) => Ok(result),
            Err(err) if err.is_session_expired() => {
                let saved = self.credentials.read().ok().and_then(|c| c.clone());
                let Some((user, password)) = saved else {
                    return Err(err.into());
                };

                warn!(method = %method, "Zabbix session expired, logging in again");
                if let Ok(mut auth) = self.auth.write() {
                    *auth = None;
                }
                self.login(&user, &password, true).await?;
                self.request(method, &params, true).await?.map_err(AppError::from)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Send one JSON-RPC request. The outer result is the transport, the
    /// inner one the JSON-RPC outcome.
    async fn request(
        &self,
        method: &str,
        params: &Value,
        with_auth: bool,
    ) -> AppResult<Result<Value, RpcError>> {
        let auth = if with_auth {
            self.auth.read().ok().and_then(|a| a.clone())
        } else {
            None
        };
        let id = self.next_id();
        let payload = build_payload(method, params, id, auth.as_deref());

        debug!(method = %method, id = id, "Zabbix API request");

        let response = self.send_with_retry(&payload).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::zapi_transport(format!("HTTP error: {}", status)));
        }

        let reply: RpcResponse = response.json().await?;

        if let Some(error) = reply.error {
            debug!(method = %method, code = error.code, message = %error.message, "Zabbix API error reply");
            return Ok(Err(error));
        }

        reply
            .result
            .map(Ok)
            .ok_or_else(|| AppError::invalid_response("No result in Zabbix API response"))
    }

    /// POST with exponential backoff when the connection cannot be made
    async fn send_with_retry(&self, payload: &Value) -> AppResult<reqwest::Response> {
        let mut attempt = 0;

        loop {
            let mut request = self.client.post(&self.url).json(payload);
            if let Some((user, password)) = &self.http_auth {
                request = request.basic_auth(user, password.as_ref());
            }

            match request.send().await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_connect() && attempt + 1 < MAX_RETRIES => {
                    let delay = retry_delay(attempt);
                    debug!(
                        "Retry {}/{} after {}ms ({})",
                        attempt + 2,
                        MAX_RETRIES,
                        delay.as_millis(),
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Backoff delay before retry number `attempt + 1`
pub fn retry_delay(attempt: u32) -> Duration {
    let base_delay = BASE_RETRY_MS.saturating_mul(2_u64.saturating_pow(attempt));
    let capped_delay = base_delay.min(MAX_RETRY_MS);

    let jitter_range = (capped_delay * RETRY_JITTER_PERCENT) / 100;
    let jitter: i64 = rand::thread_rng().gen_range(-(jitter_range as i64)..=(jitter_range as i64));

    Duration::from_millis((capped_delay as i64 + jitter).max(100) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_without_auth() {
        let payload = build_payload("apiinfo.version", &json!([]), 1, None);
        assert_eq!(payload["jsonrpc"], "2.0");
        assert_eq!(payload["method"], "apiinfo.version");
        assert_eq!(payload["id"], 1);
        assert!(payload.get("auth").is_none());
    }

    #[test]
    fn test_payload_with_auth() {
        let payload = build_payload("host.get", &json!({"output": "extend"}), 7, Some("abc"));
        assert_eq!(payload["auth"], "abc");
        assert_eq!(payload["params"]["output"], "extend");
    }

    #[test]
    fn test_error_reply_decoding() {
        let reply: RpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "error": {"code": -32602, "message": "Invalid params.", "data": "Session terminated, re-login, please."},
            "id": 3
        }))
        .unwrap();
        let error = reply.error.unwrap();
        assert!(error.is_session_expired());

        let app: AppError = error.into();
        assert_eq!(
            app.to_string(),
            "Invalid params. -32602: Session terminated, re-login, please."
        );
    }

    #[test]
    fn test_error_without_data() {
        let error: RpcError =
            serde_json::from_value(json!({"code": -32600, "message": "Invalid request."})).unwrap();
        assert_eq!(error.data, "");
        assert!(!error.is_session_expired());
    }

    #[test]
    fn test_retry_delay_bounds() {
        for attempt in 0..10 {
            let delay = retry_delay(attempt).as_millis() as u64;
            assert!(delay >= 100);
            assert!(delay <= MAX_RETRY_MS + MAX_RETRY_MS * RETRY_JITTER_PERCENT / 100);
        }
    }

    #[test]
    fn test_new_client_is_logged_out() {
        let config = crate::models::config::Config::from_toml_str(
            "[ludolph_zabbix.zapi]\nserver = \"http://zbx/\"\nusername = \"u\"\npassword = \"p\"\n",
        )
        .unwrap();
        let api = ZabbixApi::new(&config.zapi).unwrap();
        assert!(!api.logged_in());
        assert_eq!(api.server(), "http://zbx");
    }
}
