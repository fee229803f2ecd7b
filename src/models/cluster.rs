//! Cluster document fields the validators read.

use serde::{Deserialize, Serialize};

/// Lifecycle phase of the cluster resource.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProvisioningState {
    Creating,
    Updating,
    AdminUpdating,
    Deleting,
    Failed,
    #[default]
    Succeeded,
}

/// Network related subset of a cluster document. Owned by the caller.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClusterNetworkConfig {
    /// Azure region of the cluster.
    pub location: String,
    /// Id of the cluster-managed resource group.
    pub resource_group_id: String,
    /// Prefix for platform created resources; `aro` when empty.
    #[serde(default)]
    pub infra_id: String,
    pub pod_cidr: String,
    pub service_cidr: String,
    pub master_subnet_id: String,
    #[serde(default)]
    pub worker_subnet_ids: Vec<String>,
    #[serde(default)]
    pub architecture_version: u32,
    #[serde(default)]
    pub provisioning_state: ProvisioningState,
}

impl ClusterNetworkConfig {
    pub fn infra_id(&self) -> &str {
        if self.infra_id.is_empty() {
            "aro"
        } else {
            &self.infra_id
        }
    }

    pub fn is_master_subnet(&self, subnet_id: &str) -> bool {
        subnet_id.eq_ignore_ascii_case(&self.master_subnet_id)
    }
}

/// Path of the master subnet id in the cluster document.
pub const MASTER_SUBNET_PATH: &str = "properties.masterProfile.subnetId";

/// Path of the i-th worker subnet id in the cluster document.
pub fn worker_subnet_path(i: usize) -> String {
    format!("properties.workerProfiles[{i}].subnetId")
}
