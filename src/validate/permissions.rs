use super::Validator;
use crate::error::{Error, LinkedResource, ValidationError};
use crate::models::{can_do_action, ResourceIdentifier};

impl Validator {
    /// Check the acting principal holds every action in `actions` on `resource`
    ///
    /// # Arguments
    ///
    /// * `resource` - Resource to fetch permissions for
    /// * `kind` - How the resource is named in user-facing errors
    /// * `display_id` - Resource id cited in user-facing errors
    /// * `path` - Cluster document path cited when the resource is missing
    /// * `actions` - Required actions
    pub async fn check_permissions(
        &self,
        resource: &ResourceIdentifier,
        kind: LinkedResource,
        display_id: &str,
        path: &str,
        actions: &[String],
    ) -> Result<(), Error> {
        log::debug!("Checking {} permissions on {kind} {display_id}", self.principal.label());
        let listed = self
            .guard(self.sources.permissions.list_for_resource(
                &resource.resource_group,
                &resource.provider,
                "",
                &resource.resource_type,
                &resource.resource_name,
            ))
            .await;
        let permissions = match listed {
            Ok(permissions) => permissions,
            Err(e) if e.is_not_found() => {
                return Err(ValidationError::NotFound {
                    target: path.to_string(),
                    kind,
                    id: display_id.to_string(),
                }
                .into())
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(missing) = actions.iter().find(|a| !can_do_action(&permissions, a)) {
            log::warn!("{kind} {display_id} is missing action {missing}");
            return Err(ValidationError::InsufficientPermissions {
                code: self.principal.error_code().to_string(),
                role: self.principal.label().to_string(),
                kind,
                id: display_id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// The principal must be able to join, read and write the vnet and its subnets.
    pub async fn validate_vnet_permissions(&self) -> Result<(), Error> {
        log::info!("Validating vnet permissions");
        let display_id = self.vnet.to_string();
        self.check_permissions(
            &self.vnet,
            LinkedResource::Vnet,
            &display_id,
            "",
            &self.policy.vnet_actions,
        )
        .await
    }
}
