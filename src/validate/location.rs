use super::Validator;
use crate::error::{Error, ValidationError};

impl Validator {
    /// The vnet must live in the cluster's region.
    pub async fn validate_vnet_location(&self) -> Result<(), Error> {
        log::info!("Validating vnet location");
        let vnet = self.get_vnet().await?;
        if !vnet.location.eq_ignore_ascii_case(&self.cluster.location) {
            return Err(ValidationError::LocationMismatch {
                vnet_location: vnet.location,
                cluster_location: self.cluster.location.clone(),
            }
            .into());
        }
        Ok(())
    }
}
