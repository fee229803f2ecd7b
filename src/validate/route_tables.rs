use super::Validator;
use crate::error::{Error, LinkedResource, ValidationError};
use crate::models::{ResourceIdentifier, Subnet, VirtualNetwork};
use std::collections::BTreeMap;

/// Locate a subnet of `vnet` by exact id
///
/// # Arguments
///
/// * `vnet` - Vnet snapshot
/// * `path` - Cluster document path the id came from
/// * `subnet_id` - Subnet id
///
/// # Returns
///
/// The subnet, or a not-found error citing `subnet_id` and `path`.
pub fn find_subnet<'a>(
    vnet: &'a VirtualNetwork,
    path: &str,
    subnet_id: &str,
) -> Result<&'a Subnet, Error> {
    vnet.subnet(subnet_id).ok_or_else(|| {
        ValidationError::NotFound {
            target: path.to_string(),
            kind: LinkedResource::Subnet,
            id: subnet_id.to_string(),
        }
        .into()
    })
}

/// Route table attached to a subnet, `None` when the subnet has none.
pub fn get_route_table_id<'a>(
    vnet: &'a VirtualNetwork,
    path: &str,
    subnet_id: &str,
) -> Result<Option<&'a str>, Error> {
    Ok(find_subnet(vnet, path, subnet_id)?.route_table_id())
}

impl Validator {
    /// Check permissions on one route table. A malformed id is returned as
    /// [`Error::InvalidResourceId`].
    pub async fn validate_route_table_permissions(
        &self,
        route_table_id: &str,
        path: &str,
    ) -> Result<(), Error> {
        let route_table = ResourceIdentifier::parse(route_table_id)?;
        self.check_permissions(
            &route_table,
            LinkedResource::RouteTable,
            route_table_id,
            path,
            &self.policy.route_table_actions,
        )
        .await
    }

    /// Check permissions on every route table attached to a cluster subnet.
    pub async fn validate_route_tables_permissions(&self) -> Result<(), Error> {
        log::info!("Validating route table permissions");
        let vnet = self.get_vnet().await?;

        // lowercased id -> first path referencing it
        let mut route_tables: BTreeMap<String, String> = BTreeMap::new();
        for (path, subnet_id) in self.subnet_paths() {
            if let Some(rt_id) = get_route_table_id(&vnet, &path, subnet_id)? {
                route_tables.entry(rt_id.to_lowercase()).or_insert(path);
            }
        }
        log::debug!("Found {} route tables", route_tables.len());

        for (rt_id, path) in &route_tables {
            self.validate_route_table_permissions(rt_id, path).await?;
        }
        Ok(())
    }
}
