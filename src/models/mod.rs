//! Models Module - Data Structures & Configuration
//!
//! Config stanza, error codes and the Zabbix entities the commands read.

pub mod config;
pub mod errors;
pub mod types;

pub use config::*;
pub use errors::*;
pub use types::*;
