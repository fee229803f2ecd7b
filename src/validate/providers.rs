use super::Validator;
use crate::error::{Error, ValidationError};

impl Validator {
    /// Every required resource provider must be registered. The first one that
    /// is missing or in another state is reported.
    pub async fn validate_providers(&self) -> Result<(), Error> {
        log::info!("Validating resource provider registrations");
        let providers = self.guard(self.sources.providers.list_providers()).await?;

        for namespace in &self.policy.required_providers {
            let registered = providers
                .iter()
                .any(|p| &p.namespace == namespace && p.is_registered());
            if !registered {
                return Err(ValidationError::NotRegistered {
                    namespace: namespace.clone(),
                }
                .into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::*;
    use super::*;
    use crate::config::ValidationPolicy;
    use crate::error::SourceError;
    use crate::models::ProviderRegistration;
    use crate::sources::{MockNetworkSource, MockPermissionSource, MockProviderSource};

    fn read_providers_fixture() -> Vec<ProviderRegistration> {
        let json = std::fs::read_to_string("src/tests/test_data/provider_list_01.json")
            .expect("Error reading provider fixture");
        serde_json::from_str(&json).expect("Error parsing json")
    }

    fn providers_returning(
        result: Result<Vec<ProviderRegistration>, SourceError>,
    ) -> MockProviderSource {
        let mut providers = MockProviderSource::new();
        providers
            .expect_list_providers()
            .times(1)
            .returning(move || result.clone());
        providers
    }

    fn provider_validator(providers: MockProviderSource) -> Validator {
        validator(
            test_cluster(),
            MockPermissionSource::new(),
            MockNetworkSource::new(),
            providers,
        )
    }

    fn all_registered() -> Vec<ProviderRegistration> {
        vec![
            ProviderRegistration::new("Microsoft.Authorization", "Registered"),
            ProviderRegistration::new("Microsoft.Compute", "Registered"),
            ProviderRegistration::new("Microsoft.ContainerService", "NotRegistered"),
            ProviderRegistration::new("Microsoft.Network", "Registered"),
            ProviderRegistration::new("Microsoft.Storage", "Registered"),
        ]
    }

    #[tokio::test]
    async fn test_all_registered() {
        provider_validator(providers_returning(Ok(all_registered())))
            .validate_providers()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_fixture_storage_registering() {
        let err = provider_validator(providers_returning(Ok(read_providers_fixture())))
            .validate_providers()
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "400: ResourceProviderNotRegistered: : The resource provider 'Microsoft.Storage' is not registered."
        );
    }

    #[tokio::test]
    async fn test_first_missing_in_required_order() {
        let providers: Vec<_> = all_registered()
            .into_iter()
            .filter(|p| p.namespace != "Microsoft.Compute" && p.namespace != "Microsoft.Network")
            .collect();
        let err = provider_validator(providers_returning(Ok(providers)))
            .validate_providers()
            .await
            .unwrap_err();
        assert_eq!(
            err.as_validation(),
            Some(&ValidationError::NotRegistered {
                namespace: "Microsoft.Compute".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_injected_policy() {
        let policy = ValidationPolicy {
            required_providers: vec!["Microsoft.ContainerService".to_string()],
            ..Default::default()
        };
        let err = provider_validator(providers_returning(Ok(all_registered())))
            .with_policy(policy)
            .validate_providers()
            .await
            .unwrap_err();
        assert_eq!(
            err.as_validation(),
            Some(&ValidationError::NotRegistered {
                namespace: "Microsoft.ContainerService".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_list_error_verbatim() {
        let err = provider_validator(providers_returning(Err(SourceError::Other(
            "random error".to_string(),
        ))))
        .validate_providers()
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Source(SourceError::Other(ref m)) if m == "random error"));
    }
}
