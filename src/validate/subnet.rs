use super::Validator;
use crate::error::{Error, LinkedResource, SubnetViolation, ValidationError};
use crate::models::{Ipv4, ProvisioningState, Subnet, VirtualNetwork};

const PRIVATE_LINK_POLICIES_DISABLED: &str = "Disabled";

impl Validator {
    /// Check the structural policy of one subnet
    ///
    /// # Arguments
    ///
    /// * `vnet` - Vnet snapshot holding the subnet
    /// * `path` - Cluster document path the id came from
    /// * `subnet_id` - Subnet id
    ///
    /// # Returns
    ///
    /// The validated subnet. An unknown architecture version or a malformed
    /// address prefix is returned as a crate error, not a validation error.
    pub fn validate_subnet<'a>(
        &self,
        vnet: &'a VirtualNetwork,
        path: &str,
        subnet_id: &str,
    ) -> Result<&'a Subnet, Error> {
        let subnet = vnet.subnet(subnet_id).ok_or_else(|| ValidationError::NotFound {
            target: path.to_string(),
            kind: LinkedResource::ProvidedSubnet,
            id: subnet_id.to_string(),
        })?;

        let is_master = self.cluster.is_master_subnet(subnet_id);
        let expected_nsg = self
            .policy
            .network_security_group_id(&self.cluster, is_master)?;

        let invalid = |violation: SubnetViolation| -> Error {
            ValidationError::InvalidSubnet {
                target: path.to_string(),
                subnet_id: subnet_id.to_string(),
                violation,
            }
            .into()
        };

        let attached_nsg = subnet.network_security_group_id();
        if self.cluster.provisioning_state == ProvisioningState::Creating {
            if attached_nsg.is_some() {
                return Err(invalid(SubnetViolation::NsgAttached));
            }
        } else if attached_nsg != Some(expected_nsg.as_str()) {
            return Err(invalid(SubnetViolation::NsgMismatch {
                expected: expected_nsg,
            }));
        }

        if !subnet.has_service_endpoint(&self.policy.service_endpoint) {
            return Err(invalid(SubnetViolation::MissingServiceEndpoint {
                service: self.policy.service_endpoint.clone(),
            }));
        }

        if is_master
            && subnet.private_link_service_network_policies.as_deref()
                != Some(PRIVATE_LINK_POLICIES_DISABLED)
        {
            return Err(invalid(SubnetViolation::PrivateLinkPoliciesEnabled));
        }

        let prefix = Ipv4::new(subnet.address_prefix.as_deref().unwrap_or_default())?;
        if prefix.mask > self.policy.min_subnet_mask {
            return Err(invalid(SubnetViolation::TooSmall {
                min_mask: self.policy.min_subnet_mask,
            }));
        }

        Ok(subnet)
    }

    /// Check the master subnet then every worker subnet.
    pub async fn validate_subnets(&self) -> Result<(), Error> {
        log::info!("Validating subnets");
        let vnet = self.get_vnet().await?;
        for (path, subnet_id) in self.subnet_paths() {
            log::debug!("Validating subnet {subnet_id}");
            self.validate_subnet(&vnet, &path, subnet_id)?;
        }
        Ok(())
    }
}
