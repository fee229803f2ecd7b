//! Azure Virtual Network (VNet) data model.
//!
//! Field names follow the flattened JSON that `az network vnet show` prints.

use serde::{Deserialize, Serialize};

/// Provisioning state reported for a healthy service endpoint.
pub const PROVISIONING_SUCCEEDED: &str = "Succeeded";

/// Reference to another resource by id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub id: String,
}

/// Service endpoint enabled on a subnet.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpoint {
    /// Service name, e.g. `Microsoft.ContainerRegistry`.
    pub service: String,
    #[serde(default)]
    pub provisioning_state: String,
}

/// Represents an Azure subnet with the properties validation looks at.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Subnet {
    pub id: String,
    #[serde(default)]
    pub address_prefix: Option<String>,
    #[serde(default)]
    pub network_security_group: Option<ResourceRef>,
    #[serde(default)]
    pub route_table: Option<ResourceRef>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub service_endpoints: Vec<ServiceEndpoint>,
    /// `Enabled` or `Disabled`.
    #[serde(default)]
    pub private_link_service_network_policies: Option<String>,
}

impl Subnet {
    /// True when the named service endpoint exists and finished provisioning.
    pub fn has_service_endpoint(&self, service: &str) -> bool {
        self.service_endpoints
            .iter()
            .any(|se| se.service == service && se.provisioning_state == PROVISIONING_SUCCEEDED)
    }

    pub fn route_table_id(&self) -> Option<&str> {
        self.route_table.as_ref().map(|rt| rt.id.as_str())
    }

    pub fn network_security_group_id(&self) -> Option<&str> {
        self.network_security_group.as_ref().map(|nsg| nsg.id.as_str())
    }
}

/// Point-in-time view of an Azure Virtual Network.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNetwork {
    pub id: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subnets: Vec<Subnet>,
}

impl VirtualNetwork {
    /// Look up a subnet by exact id.
    pub fn subnet(&self, subnet_id: &str) -> Option<&Subnet> {
        self.subnets.iter().find(|s| s.id == subnet_id)
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
