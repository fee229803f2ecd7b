//! Azure resource identifier parsing.

use crate::error::Error;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// `/subscriptions/{id}/resourceGroups/{rg}/providers/{provider}/{type}/{name...}`
static RESOURCE_ID_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_resource_id_regex() -> &'static Regex {
    RESOURCE_ID_REGEX.get_or_init(|| {
        Regex::new(r"(?i)^/subscriptions/(.+)/resourceGroups/(.+)/providers/(.+?)/(.+?)/(.+)$")
            .expect("Invalid Regex")
    })
}

/// Structured view of a cloud resource id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceIdentifier {
    pub subscription_id: String,
    pub resource_group: String,
    /// Provider namespace, e.g. `Microsoft.Network`.
    pub provider: String,
    /// Top level resource type, e.g. `virtualNetworks`.
    pub resource_type: String,
    /// Last segment of the path.
    pub resource_name: String,
}

impl ResourceIdentifier {
    /// Parse a resource id string.
    ///
    /// # Examples
    /// ```
    /// use aro_network_validate::models::ResourceIdentifier;
    /// let r = ResourceIdentifier::parse(
    ///     "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Network/routeTables/rt",
    /// )
    /// .unwrap();
    /// assert_eq!(r.resource_type, "routeTables");
    /// assert_eq!(r.resource_name, "rt");
    /// ```
    pub fn parse(id: &str) -> Result<ResourceIdentifier, Error> {
        let invalid = || Error::InvalidResourceId(id.to_string());
        let caps = get_resource_id_regex().captures(id).ok_or_else(invalid)?;

        let resource_name = caps[5].rsplit('/').next().unwrap_or_default().to_string();
        let resource = ResourceIdentifier {
            subscription_id: caps[1].to_string(),
            resource_group: caps[2].to_string(),
            provider: caps[3].to_string(),
            resource_type: caps[4].to_string(),
            resource_name,
        };
        if resource.resource_name.is_empty() {
            return Err(invalid());
        }
        Ok(resource)
    }

    /// Identifier of the vnet owning the given subnet id.
    pub fn vnet_of_subnet(subnet_id: &str) -> Result<ResourceIdentifier, Error> {
        let lower = subnet_id.to_ascii_lowercase();
        let vnet_id = match lower.rfind("/subnets/") {
            Some(idx) => &subnet_id[..idx],
            None => return Err(Error::InvalidResourceId(subnet_id.to_string())),
        };
        ResourceIdentifier::parse(vnet_id)
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/{}/{}/{}",
            self.subscription_id,
            self.resource_group,
            self.provider,
            self.resource_type,
            self.resource_name
        )
    }
}
