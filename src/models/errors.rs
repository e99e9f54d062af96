//! Centralized Error Handling Module
//!
//! Every failure carries a unique code for the logs. The message is what
//! the chat user gets back as the command reply.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - ZAPI_xxx: Zabbix API errors
//! - CMD_xxx: Command usage errors
//! - CFG_xxx: Configuration errors
//! - WEB_xxx: Webhook errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Zabbix API Errors
    // ============================================
    /// Never logged in (bad credentials or server down at startup)
    ZapiUnavailable,
    /// Zabbix answered with a JSON-RPC error
    ZapiApplication,
    /// Connection/transport problem
    ZapiTransport,
    /// Reply could not be decoded
    ZapiInvalidResponse,

    // ============================================
    // Command Errors
    // ============================================
    /// No such command
    CommandNotFound,
    /// Required parameter missing
    CommandMissingParameter,
    /// Parameter has the wrong shape
    CommandInvalidParameter,
    /// Search matched neither a host nor a group
    CommandHostGroupNotFound,
    /// Nothing to acknowledge
    CommandNoEvents,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Config file could not be read
    ConfigUnreadable,
    /// Missing required key
    ConfigMissingValue,
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Webhook Errors
    // ============================================
    /// Invalid webhook request
    WebBadRequest,
    /// Message could not be delivered
    WebDeliveryFailed,

    // ============================================
    // Generic Errors
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZapiUnavailable => "ZAPI_UNAVAILABLE",
            Self::ZapiApplication => "ZAPI_ERROR",
            Self::ZapiTransport => "ZAPI_TRANSPORT",
            Self::ZapiInvalidResponse => "ZAPI_INVALID_RESPONSE",

            Self::CommandNotFound => "CMD_NOT_FOUND",
            Self::CommandMissingParameter => "CMD_MISSING_PARAMETER",
            Self::CommandInvalidParameter => "CMD_INVALID_PARAMETER",
            Self::CommandHostGroupNotFound => "CMD_HOST_GROUP_NOT_FOUND",
            Self::CommandNoEvents => "CMD_NO_EVENTS",

            Self::ConfigUnreadable => "CFG_UNREADABLE",
            Self::ConfigMissingValue => "CFG_MISSING_VALUE",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            Self::WebBadRequest => "WEB_BAD_REQUEST",
            Self::WebDeliveryFailed => "WEB_DELIVERY_FAILED",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for webhook responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::WebBadRequest => 400,
            _ => 500,
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ZapiTransport)
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Plugin never logged in to Zabbix
    pub fn zapi_unavailable() -> Self {
        Self::new(ErrorCode::ZapiUnavailable, "Zabbix API not available")
    }

    /// JSON-RPC error reply
    pub fn zapi_application(message: &str, code: i64, data: &str) -> Self {
        Self::new(
            ErrorCode::ZapiApplication,
            format!("{} {}: {}", message, code, data),
        )
    }

    /// Connection/transport problem
    pub fn zapi_transport(detail: impl fmt::Display) -> Self {
        Self::new(ErrorCode::ZapiTransport, format!("Zabbix API error ({})", detail))
    }

    /// Unexpected reply shape
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ZapiInvalidResponse, msg)
    }

    /// Unknown command
    pub fn command_not_found(name: &str) -> Self {
        Self::new(ErrorCode::CommandNotFound, format!("Unknown command: {}", name))
    }

    /// Required parameter missing
    pub fn parameter_required() -> Self {
        Self::new(ErrorCode::CommandMissingParameter, "Parameter required")
    }

    /// Integer parameter expected
    pub fn integer_required() -> Self {
        Self::new(ErrorCode::CommandInvalidParameter, "Integer required")
    }

    /// Invalid parameter
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::CommandInvalidParameter, msg)
    }

    /// Missing config key
    pub fn missing_config(key: &str) -> Self {
        Self::new(
            ErrorCode::ConfigMissingValue,
            format!("Missing configuration value: {}", key),
        )
    }

    /// Invalid config value
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }

    /// Webhook bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::WebBadRequest, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::zapi_transport("request timeout")
        } else if err.is_connect() {
            Self::zapi_transport("connection failed")
        } else if err.is_decode() {
            Self::with_source(ErrorCode::ZapiInvalidResponse, "Invalid Zabbix API response", err)
        } else {
            Self::zapi_transport(err)
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::ZapiInvalidResponse, "Invalid Zabbix API response", err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}
