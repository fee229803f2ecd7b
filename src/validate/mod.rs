//! Pre-flight validation of a cluster's network.
//!
//! A [`Validator`] is built for one cluster document and one acting principal.
//! Each check fetches what it needs fresh from the collaborators and stops at
//! the first failure; [`Validator::validate_all`] runs the checks in order.

mod cidr;
mod location;
mod permissions;
mod providers;
mod route_tables;
mod subnet;

pub use route_tables::{find_subnet, get_route_table_id};

use crate::config::{Principal, ValidationPolicy};
use crate::error::{Error, SourceError};
use crate::models::{
    worker_subnet_path, ClusterNetworkConfig, ResourceIdentifier, VirtualNetwork,
    MASTER_SUBNET_PATH,
};
use crate::sources::{cancellable, NetworkSource, PermissionSource, ProviderSource};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Collaborators the validator reads from.
#[derive(Clone)]
pub struct Sources {
    pub permissions: Arc<dyn PermissionSource>,
    pub networks: Arc<dyn NetworkSource>,
    pub providers: Arc<dyn ProviderSource>,
}

pub struct Validator {
    cluster: ClusterNetworkConfig,
    /// Vnet owning the master subnet.
    vnet: ResourceIdentifier,
    principal: Principal,
    policy: ValidationPolicy,
    sources: Sources,
    cancel: CancellationToken,
}

impl Validator {
    /// Create a validator for a cluster document
    ///
    /// # Arguments
    ///
    /// * `cluster` - Network fields of the cluster document
    /// * `principal` - Identity whose permissions are checked
    /// * `sources` - Azure collaborators
    ///
    /// # Returns
    ///
    /// Fails with [`Error::InvalidResourceId`] when the master subnet id does
    /// not name a subnet of a vnet.
    pub fn new(
        cluster: ClusterNetworkConfig,
        principal: Principal,
        sources: Sources,
    ) -> Result<Validator, Error> {
        let vnet = ResourceIdentifier::vnet_of_subnet(&cluster.master_subnet_id)?;
        Ok(Validator {
            cluster,
            vnet,
            principal,
            policy: ValidationPolicy::default(),
            sources,
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Abort in-flight lookups when `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn vnet(&self) -> &ResourceIdentifier {
        &self.vnet
    }

    /// Run every check, stopping at the first failure.
    pub async fn validate_all(&self) -> Result<(), Error> {
        log::info!("Validating network of cluster in {}", self.cluster.location);
        self.validate_vnet_permissions().await?;
        self.validate_route_tables_permissions().await?;
        self.validate_subnets().await?;
        self.validate_vnet_location().await?;
        self.validate_cidr_ranges().await?;
        self.validate_providers().await?;
        log::info!("Network validation passed for vnet {}", self.vnet);
        Ok(())
    }

    async fn guard<T, F>(&self, call: F) -> Result<T, SourceError>
    where
        F: Future<Output = Result<T, SourceError>>,
    {
        cancellable(&self.cancel, call).await
    }

    /// Fresh snapshot of the cluster vnet. Failures are returned verbatim.
    async fn get_vnet(&self) -> Result<VirtualNetwork, Error> {
        log::debug!("Reading vnet {}", self.vnet);
        let vnet = self
            .guard(self.sources.networks.get_virtual_network(
                &self.vnet.resource_group,
                &self.vnet.resource_name,
                "",
            ))
            .await?;
        Ok(vnet)
    }

    /// Master then worker subnet ids, with their cluster document paths.
    fn subnet_paths(&self) -> Vec<(String, &str)> {
        let mut paths = vec![(
            MASTER_SUBNET_PATH.to_string(),
            self.cluster.master_subnet_id.as_str(),
        )];
        for (i, id) in self.cluster.worker_subnet_ids.iter().enumerate() {
            paths.push((worker_subnet_path(i), id.as_str()));
        }
        paths
    }
}
