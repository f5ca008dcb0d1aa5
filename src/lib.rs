//! Remote host telemetry over SSH.
//!
//! One [`manager::SessionManager`] holds at most one live session per
//! host identity. Subscribing a [`subscribe::MetricListener`] opens the
//! session on demand; removing the last listener closes it. Each open
//! session runs a set of pollers that read `/proc` style files over
//! SFTP, parse them, and fan the typed messages out to subscribers.

pub mod config;
pub mod error;
pub mod manager;
pub mod models;
pub mod parsers;
pub mod poller;
pub mod probes;
pub mod remote;
pub mod session;
pub mod state;
pub mod subscribe;

pub use config::MonitorConfig;
pub use manager::SessionManager;
pub use models::HostIdentity;
pub use subscribe::{MetricKind, MetricListener};
