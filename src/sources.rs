//! Collaborator interfaces used by the validators and the certificate monitor.
//!
//! Each trait is a narrow capability so the validation logic depends only on
//! these contracts. Production implementations live in [`crate::azure`];
//! tests use the generated mocks or hand-written fakes.

use crate::error::SourceError;
use crate::models::{IngressController, Permission, ProviderRegistration, Secret, VirtualNetwork};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::future::Future;
use tokio_util::sync::CancellationToken;

#[cfg(test)]
use mockall::automock;

/// Effective permissions of the acting principal on a resource.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PermissionSource: Send + Sync {
    /// List permissions for a resource
    ///
    /// # Arguments
    ///
    /// * `resource_group` - Resource group holding the resource
    /// * `provider` - Provider namespace, e.g. `Microsoft.Network`
    /// * `parent_path` - Parent resource path, empty for top level resources
    /// * `resource_type` - Resource type, e.g. `virtualNetworks`
    /// * `name` - Resource name
    async fn list_for_resource(
        &self,
        resource_group: &str,
        provider: &str,
        parent_path: &str,
        resource_type: &str,
        name: &str,
    ) -> Result<Vec<Permission>, SourceError>;
}

/// Virtual network reads.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NetworkSource: Send + Sync {
    async fn get_virtual_network(
        &self,
        resource_group: &str,
        name: &str,
        expand: &str,
    ) -> Result<VirtualNetwork, SourceError>;
}

/// Resource provider registrations of the subscription.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProviderSource: Send + Sync {
    async fn list_providers(&self) -> Result<Vec<ProviderRegistration>, SourceError>;
}

/// Kubernetes secret reads. A missing secret is reported as a not-found
/// [`SourceError`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SecretSource: Send + Sync {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, SourceError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait IngressSource: Send + Sync {
    async fn get_ingress_controller(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<IngressController, SourceError>;
}

/// Sink for gauge metrics.
#[cfg_attr(test, automock)]
pub trait MetricsEmitter: Send + Sync {
    fn emit_gauge(&self, name: &str, value: i64, dimensions: &BTreeMap<String, String>);
}

/// Race a collaborator call against `cancel`. Cancellation wins ties.
pub async fn cancellable<T, F>(cancel: &CancellationToken, call: F) -> Result<T, SourceError>
where
    F: Future<Output = Result<T, SourceError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SourceError::Cancelled),
        result = call => result,
    }
}
