//! Domain models for cluster network validation.
//!
//! This module contains the core data structures used throughout the crate:
//! - [`Ipv4`] - IPv4 range with CIDR notation support
//! - [`ResourceIdentifier`] - parsed Azure resource id
//! - [`VirtualNetwork`] and [`Subnet`] - vnet snapshot
//! - [`Permission`] - effective permissions on a resource
//! - [`ClusterNetworkConfig`] - network fields of the cluster document
//! - [`Secret`] and [`CertificateRecord`] - certificate monitor inputs and outputs

mod cluster;
mod ipv4;
mod permission;
mod provider;
mod resource;
mod secret;
mod vnet;

// Re-export public types
pub use cluster::{worker_subnet_path, ClusterNetworkConfig, ProvisioningState, MASTER_SUBNET_PATH};
pub use ipv4::{broadcast_addr, cidr_mask, cut_addr, Ipv4, MAX_LENGTH};
pub use permission::{can_do_action, Permission};
pub use provider::{ProviderRegistration, REGISTERED};
pub use resource::ResourceIdentifier;
pub use secret::{CertificateRecord, IngressController, Secret};
pub use vnet::{ResourceRef, ServiceEndpoint, Subnet, VirtualNetwork, PROVISIONING_SUCCEEDED};
