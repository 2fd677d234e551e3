#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::wildcard_imports
)]

pub mod classify;
pub mod client;
pub mod config;
pub mod contracts;
pub mod error;
pub mod monitor;
pub mod scan;
pub mod start_block;
pub mod types;

pub use classify::{FailureKind, UNKNOWN_ERROR_MESSAGE};
pub use client::RegistryClient;
pub use config::{Config, ContractConfig, MonitoringConfig, NetworkConfig, SignerConfig};
pub use contracts::{ContractAddresses, ContractKey};
pub use error::{EthereumError, Result};
pub use monitor::{EventMonitor, LogEventHandler, MonitorHandle, RegistryEventHandler};
pub use scan::{chunk_ranges, fetch_logs_chunked, DEFAULT_SCAN_WINDOW};
pub use start_block::{
    resolve_start_block, DeploymentInfo, StartBlockCache, DEFAULT_FALLBACK_BLOCK,
    DEFAULT_FALLBACK_OFFSET,
};
pub use types::*;
