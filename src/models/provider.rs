//! Resource provider registration state.

use serde::{Deserialize, Serialize};

pub const REGISTERED: &str = "Registered";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRegistration {
    pub namespace: String,
    #[serde(default)]
    pub registration_state: Option<String>,
}

impl ProviderRegistration {
    pub fn new(namespace: &str, state: &str) -> ProviderRegistration {
        ProviderRegistration {
            namespace: namespace.to_string(),
            registration_state: Some(state.to_string()),
        }
    }

    pub fn is_registered(&self) -> bool {
        self.registration_state.as_deref() == Some(REGISTERED)
    }
}
