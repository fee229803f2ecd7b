//! Fixed validation policy, monitor settings and process configuration.

use crate::error::{
    Error, CODE_INVALID_RESOURCE_PROVIDER_PERMISSIONS, CODE_INVALID_SERVICE_PRINCIPAL_PERMISSIONS,
};
use crate::models::ClusterNetworkConfig;
use std::collections::BTreeMap;
use std::path::Path;

/// How network security groups are named for one architecture version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NsgNaming {
    /// Appended to the infra id for the master subnet NSG.
    pub master_suffix: String,
    /// Appended to the infra id for worker subnet NSGs.
    pub worker_suffix: String,
}

impl NsgNaming {
    fn new(master_suffix: &str, worker_suffix: &str) -> NsgNaming {
        NsgNaming {
            master_suffix: master_suffix.to_string(),
            worker_suffix: worker_suffix.to_string(),
        }
    }
}

/// Policy tables the validators enforce.
#[derive(Debug, Clone)]
pub struct ValidationPolicy {
    pub vnet_actions: Vec<String>,
    pub route_table_actions: Vec<String>,
    /// Checked in order; the first failing namespace is reported.
    pub required_providers: Vec<String>,
    pub service_endpoint: String,
    /// Largest allowed prefix length for cluster subnets.
    pub min_subnet_mask: u8,
    /// Architecture version -> NSG naming convention.
    pub nsg_naming: BTreeMap<u32, NsgNaming>,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        let actions = |list: &[&str]| list.iter().map(|a| a.to_string()).collect::<Vec<_>>();

        let mut nsg_naming = BTreeMap::new();
        nsg_naming.insert(0, NsgNaming::new("-controlplane-nsg", "-node-nsg"));
        nsg_naming.insert(1, NsgNaming::new("-nsg", "-nsg"));

        ValidationPolicy {
            vnet_actions: actions(&[
                "Microsoft.Network/virtualNetworks/join/action",
                "Microsoft.Network/virtualNetworks/read",
                "Microsoft.Network/virtualNetworks/write",
                "Microsoft.Network/virtualNetworks/subnets/join/action",
                "Microsoft.Network/virtualNetworks/subnets/read",
                "Microsoft.Network/virtualNetworks/subnets/write",
            ]),
            route_table_actions: actions(&[
                "Microsoft.Network/routeTables/join/action",
                "Microsoft.Network/routeTables/read",
                "Microsoft.Network/routeTables/write",
            ]),
            required_providers: actions(&[
                "Microsoft.Authorization",
                "Microsoft.Compute",
                "Microsoft.Network",
                "Microsoft.Storage",
            ]),
            service_endpoint: "Microsoft.ContainerRegistry".to_string(),
            min_subnet_mask: 27,
            nsg_naming,
        }
    }
}

impl ValidationPolicy {
    /// Expected NSG id for a subnet of the given cluster.
    pub fn network_security_group_id(
        &self,
        cluster: &ClusterNetworkConfig,
        is_master: bool,
    ) -> Result<String, Error> {
        let naming = self
            .nsg_naming
            .get(&cluster.architecture_version)
            .ok_or(Error::UnknownArchitectureVersion(cluster.architecture_version))?;
        let suffix = if is_master {
            &naming.master_suffix
        } else {
            &naming.worker_suffix
        };
        Ok(format!(
            "{}/providers/Microsoft.Network/networkSecurityGroups/{}{}",
            cluster.resource_group_id,
            cluster.infra_id(),
            suffix
        ))
    }
}

/// Identity whose permissions are being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Principal {
    /// The control plane's own first-party identity.
    #[default]
    ResourceProvider,
    /// The service principal the cluster runs as.
    ServicePrincipal,
}

impl Principal {
    pub fn error_code(self) -> &'static str {
        match self {
            Principal::ResourceProvider => CODE_INVALID_RESOURCE_PROVIDER_PERMISSIONS,
            Principal::ServicePrincipal => CODE_INVALID_SERVICE_PRINCIPAL_PERMISSIONS,
        }
    }

    /// Label used in user-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            Principal::ResourceProvider => "resource provider",
            Principal::ServicePrincipal => "service principal",
        }
    }
}

impl std::str::FromStr for Principal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resource-provider" => Ok(Principal::ResourceProvider),
            "service-principal" => Ok(Principal::ServicePrincipal),
            other => Err(Error::config(format!("unknown principal '{other}'"))),
        }
    }
}

/// Where the certificate monitor finds its secrets.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub namespace: String,
    pub cluster_secret_name: String,
    /// Key of the monitoring (Geneva) certificate inside the cluster secret.
    pub cluster_secret_key: String,
    pub ingress_namespace: String,
    pub ingress_controller_name: String,
    pub tls_cert_key: String,
    /// Domains under this suffix are platform managed.
    pub managed_domain_suffix: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            namespace: "openshift-azure-operator".to_string(),
            cluster_secret_name: "cluster".to_string(),
            cluster_secret_key: "gcscert.pem".to_string(),
            ingress_namespace: "openshift-ingress-operator".to_string(),
            ingress_controller_name: "default".to_string(),
            tls_cert_key: "tls.crt".to_string(),
            managed_domain_suffix: "aroapp.io".to_string(),
        }
    }
}

impl MonitorConfig {
    pub fn is_managed_domain(&self, domain: &str) -> bool {
        domain
            .to_ascii_lowercase()
            .ends_with(&format!(".{}", self.managed_domain_suffix.to_ascii_lowercase()))
    }
}

/// Process configuration read from the environment (after `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub cluster_file: String,
    pub principal: Principal,
}

impl AppConfig {
    pub fn from_env() -> Result<AppConfig, Error> {
        let cluster_file =
            std::env::var("CLUSTER_CONFIG").unwrap_or_else(|_| "cluster.json".to_string());
        let principal = match std::env::var("VALIDATION_PRINCIPAL") {
            Ok(p) => p.parse()?,
            Err(_) => Principal::default(),
        };
        Ok(AppConfig {
            cluster_file,
            principal,
        })
    }
}

/// Read the cluster document from a JSON file.
pub fn read_cluster_config(path: &str) -> Result<ClusterNetworkConfig, Error> {
    if !Path::new(path).exists() {
        return Err(Error::config(format!("Cluster file does not exist: {path}")));
    }
    log::info!("Reading cluster document: {path}");
    let json = std::fs::read_to_string(path)
        .map_err(|e| Error::config(format!("Error reading {path}: {e}")))?;

    let mut deserializer = serde_json::Deserializer::from_str(&json);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        Error::config(format!(
            "Error parsing cluster document {path}: path={} error={}",
            e.path(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nsg_id_v1() {
        let policy = ValidationPolicy::default();
        let oc = ClusterNetworkConfig {
            resource_group_id: "/subscriptions/s/resourceGroups/cluster".to_string(),
            ..Default::default()
        };
        assert_eq!(
            policy.network_security_group_id(&oc, true).unwrap(),
            "/subscriptions/s/resourceGroups/cluster/providers/Microsoft.Network/networkSecurityGroups/aro-controlplane-nsg"
        );
        assert_eq!(
            policy.network_security_group_id(&oc, false).unwrap(),
            "/subscriptions/s/resourceGroups/cluster/providers/Microsoft.Network/networkSecurityGroups/aro-node-nsg"
        );
    }

    #[test]
    fn test_nsg_id_v2_uses_infra_id() {
        let policy = ValidationPolicy::default();
        let oc = ClusterNetworkConfig {
            resource_group_id: "/subscriptions/s/resourceGroups/cluster".to_string(),
            infra_id: "foo12".to_string(),
            architecture_version: 1,
            ..Default::default()
        };
        let master = policy.network_security_group_id(&oc, true).unwrap();
        assert!(master.ends_with("/networkSecurityGroups/foo12-nsg"));
        assert_eq!(master, policy.network_security_group_id(&oc, false).unwrap());
    }

    #[test]
    fn test_nsg_id_unknown_architecture() {
        let oc = ClusterNetworkConfig {
            architecture_version: 9001,
            ..Default::default()
        };
        let err = ValidationPolicy::default()
            .network_security_group_id(&oc, true)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownArchitectureVersion(9001)));
        assert_eq!(err.to_string(), "unknown architecture version 9001");
    }

    #[test]
    fn test_principal() {
        assert_eq!(
            "service-principal".parse::<Principal>().unwrap(),
            Principal::ServicePrincipal
        );
        assert!("root".parse::<Principal>().is_err());
        assert_eq!(Principal::ResourceProvider.label(), "resource provider");
        assert_eq!(
            Principal::ServicePrincipal.error_code(),
            "InvalidServicePrincipalPermissions"
        );
    }

    #[test]
    fn test_managed_domain() {
        let config = MonitorConfig::default();
        assert!(config.is_managed_domain("contoso.aroapp.io"));
        assert!(!config.is_managed_domain("aro.contoso.com"));
        assert!(!config.is_managed_domain("aroapp.io"));
    }

    #[test]
    fn test_read_cluster_config() {
        let oc = read_cluster_config("src/tests/test_data/cluster_01.json")
            .expect("Error reading cluster document");
        assert_eq!(oc.service_cidr, "172.30.0.0/16");
        assert!(read_cluster_config("src/tests/test_data/missing.json").is_err());
    }
}
