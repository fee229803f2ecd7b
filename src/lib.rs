//! Pre-flight validation of a managed cluster's Azure network, and a
//! certificate expiry monitor.
//!
//! - [`validate`] - permission, route table, subnet, CIDR, location and provider checks
//! - [`monitor`] - certificate expiry gauges
//! - [`sources`] - collaborator traits the checks read through
//! - [`azure`] - `az` CLI backed collaborators
//! - [`models`] - data model
//! - [`config`] - policy tables and process configuration
//! - [`error`] - error taxonomy

pub mod azure;
pub mod config;
pub mod error;
pub mod models;
pub mod monitor;
pub mod sources;
pub mod validate;

pub use config::{read_cluster_config, AppConfig, MonitorConfig, Principal, ValidationPolicy};
pub use error::{CloudError, Error, Result, SourceError, ValidationError};
pub use monitor::CertificateMonitor;
pub use validate::{Sources, Validator};
