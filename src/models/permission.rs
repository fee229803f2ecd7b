//! Effective permissions of a principal on a resource.

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

/// One entry of the permissions list returned for a resource.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub not_actions: Vec<String>,
}

impl Permission {
    pub fn new<S: Into<String>>(actions: impl IntoIterator<Item = S>) -> Permission {
        Permission {
            actions: actions.into_iter().map(Into::into).collect(),
            not_actions: vec![],
        }
    }

    /// An action is allowed when an `actions` pattern matches it and no
    /// `not_actions` pattern of the same entry does.
    pub fn allows(&self, action: &str) -> bool {
        self.actions.iter().any(|p| action_matches(p, action))
            && !self.not_actions.iter().any(|p| action_matches(p, action))
    }
}

/// True when any entry of `permissions` allows `action`.
pub fn can_do_action(permissions: &[Permission], action: &str) -> bool {
    permissions.iter().any(|p| p.allows(action))
}

/// Case-insensitive match where `*` stands for any run of characters.
fn action_matches(pattern: &str, action: &str) -> bool {
    if !pattern.contains('*') {
        return pattern.eq_ignore_ascii_case(action);
    }
    let re = format!("^{}$", regex::escape(pattern).replace(r"\*", ".*"));
    RegexBuilder::new(&re)
        .case_insensitive(true)
        .build()
        .map(|re| re.is_match(action))
        .unwrap_or(false)
}
