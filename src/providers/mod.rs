//! Providers Module - External Data Sources
//!
//! Zabbix JSON-RPC API client.

pub mod zapi;

pub use zapi::*;
