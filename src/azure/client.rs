//! Azure collaborators backed by the `az` command line.

use super::cli;
use crate::error::SourceError;
use crate::models::{Permission, ProviderRegistration, VirtualNetwork};
use crate::sources::{NetworkSource, PermissionSource, ProviderSource};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

const MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";
const PERMISSIONS_API_VERSION: &str = "2022-04-01";

/// Runs `az` against one subscription with the logged in identity.
#[derive(Debug, Clone)]
pub struct AzCliClient {
    subscription_id: String,
}

/// Body of the permissions endpoint.
#[derive(Deserialize, Debug)]
struct PermissionList {
    #[serde(default)]
    value: Vec<Permission>,
}

impl AzCliClient {
    pub fn new(subscription_id: &str) -> AzCliClient {
        AzCliClient {
            subscription_id: subscription_id.to_string(),
        }
    }

    fn vnet_show_command(&self, resource_group: &str, name: &str, expand: &str) -> String {
        let mut cmd = format!(
            "az network vnet show --subscription {} --resource-group {resource_group} --name {name} --output json",
            self.subscription_id
        );
        if !expand.is_empty() {
            cmd.push_str(&format!(" --expand {expand}"));
        }
        cmd
    }

    fn provider_list_command(&self) -> String {
        format!(
            "az provider list --subscription {} --query \"[].{{namespace:namespace, registrationState:registrationState}}\" --output json",
            self.subscription_id
        )
    }

    fn permissions_url(
        &self,
        resource_group: &str,
        provider: &str,
        parent_path: &str,
        resource_type: &str,
        name: &str,
    ) -> String {
        let resource_path = [provider, parent_path, resource_type, name]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{MANAGEMENT_ENDPOINT}/subscriptions/{}/resourceGroups/{resource_group}/providers/{resource_path}/providers/Microsoft.Authorization/permissions?api-version={PERMISSIONS_API_VERSION}",
            self.subscription_id
        )
    }
}

/// Run `cmd` and parse its JSON output.
async fn run_json<T: DeserializeOwned>(cmd: String) -> Result<T, SourceError> {
    let json = cli::run(&cmd).await?;
    parse_json(&json)
}

fn parse_json<T: DeserializeOwned>(json: &str) -> Result<T, SourceError> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| SourceError::Parse(format!("path={} error={}", e.path(), e)))
}

#[async_trait]
impl NetworkSource for AzCliClient {
    async fn get_virtual_network(
        &self,
        resource_group: &str,
        name: &str,
        expand: &str,
    ) -> Result<VirtualNetwork, SourceError> {
        run_json(self.vnet_show_command(resource_group, name, expand)).await
    }
}

#[async_trait]
impl ProviderSource for AzCliClient {
    async fn list_providers(&self) -> Result<Vec<ProviderRegistration>, SourceError> {
        run_json(self.provider_list_command()).await
    }
}

#[async_trait]
impl PermissionSource for AzCliClient {
    async fn list_for_resource(
        &self,
        resource_group: &str,
        provider: &str,
        parent_path: &str,
        resource_type: &str,
        name: &str,
    ) -> Result<Vec<Permission>, SourceError> {
        let url = self.permissions_url(resource_group, provider, parent_path, resource_type, name);
        let list: PermissionList =
            run_json(format!("az rest --method get --url {url} --output json")).await?;
        Ok(list.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AzCliClient {
        AzCliClient::new("0000000-0000-0000-0000-000000000000")
    }

    #[test]
    fn test_vnet_show_command() {
        assert_eq!(
            client().vnet_show_command("testGroup", "testVnet", ""),
            "az network vnet show --subscription 0000000-0000-0000-0000-000000000000 --resource-group testGroup --name testVnet --output json"
        );
        assert!(client()
            .vnet_show_command("testGroup", "testVnet", "subnets")
            .ends_with("--expand subnets"));
    }

    #[test]
    fn test_permissions_url() {
        assert_eq!(
            client().permissions_url("testGroup", "Microsoft.Network", "", "virtualNetworks", "testVnet"),
            "https://management.azure.com/subscriptions/0000000-0000-0000-0000-000000000000/resourceGroups/testGroup/providers/Microsoft.Network/virtualNetworks/testVnet/providers/Microsoft.Authorization/permissions?api-version=2022-04-01"
        );
        assert!(client()
            .permissions_url("rg", "Microsoft.Network", "virtualNetworks/v", "subnets", "s")
            .contains("/providers/Microsoft.Network/virtualNetworks/v/subnets/s/providers/"));
    }

    #[test]
    fn test_provider_list_query_is_one_argument() {
        let cmd = client().provider_list_command();
        assert!(cmd.contains("\"[].{namespace:namespace, registrationState:registrationState}\""));
    }

    #[test]
    fn test_parse_vnet_fixture() {
        let json = std::fs::read_to_string("src/tests/test_data/vnet_show_01.json")
            .expect("Error reading vnet fixture");
        let vnet: VirtualNetwork = parse_json(&json).expect("Error parsing vnet");
        assert_eq!(vnet.subnets.len(), 2);
    }

    #[test]
    fn test_parse_permissions_fixture() {
        let json = std::fs::read_to_string("src/tests/test_data/permissions_01.json")
            .expect("Error reading permissions fixture");
        let list: PermissionList = parse_json(&json).expect("Error parsing permissions");
        assert_eq!(list.value.len(), 2);
        assert_eq!(list.value[1].not_actions, vec!["Microsoft.Authorization/*/read"]);
    }

    #[test]
    fn test_parse_providers_fixture() {
        let json = std::fs::read_to_string("src/tests/test_data/provider_list_01.json")
            .expect("Error reading provider fixture");
        let providers: Vec<ProviderRegistration> =
            parse_json(&json).expect("Error parsing providers");
        assert_eq!(providers.len(), 5);
        assert!(providers[0].is_registered());
    }

    #[test]
    fn test_parse_error_reports_path() {
        let err = parse_json::<VirtualNetwork>(r#"{"id": "v", "subnets": [{"id": 5}]}"#).unwrap_err();
        match err {
            SourceError::Parse(msg) => assert!(msg.contains("subnets[0].id"), "{msg}"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
