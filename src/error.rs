//! Error types for network validation and certificate monitoring.
//!
//! [`ValidationError`] is the user-facing taxonomy returned to whoever asked for
//! the cluster operation. [`SourceError`] covers failures of the collaborators
//! (Azure, Kubernetes). [`Error`] is the crate-level error wrapping both plus
//! malformed input and configuration defects.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Cloud error code for problems with the linked vnet or its subnets.
pub const CODE_INVALID_LINKED_VNET: &str = "InvalidLinkedVNet";
/// Cloud error code for a route table that cannot be found.
pub const CODE_INVALID_LINKED_ROUTE_TABLE: &str = "InvalidLinkedRouteTable";
/// Cloud error code for a resource provider that is not registered.
pub const CODE_RESOURCE_PROVIDER_NOT_REGISTERED: &str = "ResourceProviderNotRegistered";
/// Cloud error code when the resource provider identity lacks permissions.
pub const CODE_INVALID_RESOURCE_PROVIDER_PERMISSIONS: &str = "InvalidResourceProviderPermissions";
/// Cloud error code when the cluster service principal lacks permissions.
pub const CODE_INVALID_SERVICE_PRINCIPAL_PERMISSIONS: &str = "InvalidServicePrincipalPermissions";

/// Crate result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Kind of linked resource named in a user-facing error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkedResource {
    Vnet,
    Subnet,
    /// A subnet the user supplied in the cluster document.
    ProvidedSubnet,
    RouteTable,
}

impl LinkedResource {
    fn not_found_code(self) -> &'static str {
        match self {
            LinkedResource::RouteTable => CODE_INVALID_LINKED_ROUTE_TABLE,
            _ => CODE_INVALID_LINKED_VNET,
        }
    }
}

impl fmt::Display for LinkedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkedResource::Vnet => "vnet",
            LinkedResource::Subnet => "subnet",
            LinkedResource::ProvidedSubnet => "provided subnet",
            LinkedResource::RouteTable => "route table",
        };
        f.write_str(name)
    }
}

/// Why a subnet failed the structural policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubnetViolation {
    /// Cluster is being created and the platform attaches the NSG itself.
    NsgAttached,
    /// Expected NSG (by id) is missing or a different one is attached.
    NsgMismatch { expected: String },
    MissingServiceEndpoint { service: String },
    PrivateLinkPoliciesEnabled,
    TooSmall { min_mask: u8 },
}

impl fmt::Display for SubnetViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubnetViolation::NsgAttached => {
                write!(f, "must not have a network security group attached")
            }
            SubnetViolation::NsgMismatch { expected } => {
                write!(f, "must have network security group '{expected}' attached")
            }
            SubnetViolation::MissingServiceEndpoint { service } => {
                write!(f, "must have {service} serviceEndpoint")
            }
            SubnetViolation::PrivateLinkPoliciesEnabled => {
                write!(f, "must have privateLinkServiceNetworkPolicies disabled")
            }
            SubnetViolation::TooSmall { min_mask } => write!(f, "must be /{min_mask} or larger"),
        }
    }
}

/// User-facing validation failures. All map to HTTP 400.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NotFound {
        target: String,
        kind: LinkedResource,
        id: String,
    },

    InsufficientPermissions {
        code: String,
        role: String,
        kind: LinkedResource,
        id: String,
    },

    InvalidSubnet {
        target: String,
        subnet_id: String,
        violation: SubnetViolation,
    },

    OverlappingRanges { first: String, second: String },

    LocationMismatch {
        vnet_location: String,
        cluster_location: String,
    },

    NotRegistered { namespace: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {}: {}",
            self.status_code(),
            self.code(),
            self.target(),
            self.message()
        )
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn status_code(&self) -> u16 {
        400
    }

    pub fn code(&self) -> &str {
        match self {
            ValidationError::NotFound { kind, .. } => kind.not_found_code(),
            ValidationError::InsufficientPermissions { code, .. } => code,
            ValidationError::InvalidSubnet { .. }
            | ValidationError::OverlappingRanges { .. }
            | ValidationError::LocationMismatch { .. } => CODE_INVALID_LINKED_VNET,
            ValidationError::NotRegistered { .. } => CODE_RESOURCE_PROVIDER_NOT_REGISTERED,
        }
    }

    /// Path in the cluster document the error refers to, empty when none.
    pub fn target(&self) -> &str {
        match self {
            ValidationError::NotFound { target, .. }
            | ValidationError::InvalidSubnet { target, .. } => target,
            _ => "",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ValidationError::NotFound { kind, id, .. } => {
                format!("The {kind} '{id}' could not be found.")
            }
            ValidationError::InsufficientPermissions { role, kind, id, .. } => {
                format!("The {role} does not have Network Contributor permission on {kind} '{id}'.")
            }
            ValidationError::InvalidSubnet {
                subnet_id,
                violation,
                ..
            } => format!("The provided subnet '{subnet_id}' is invalid: {violation}."),
            ValidationError::OverlappingRanges { first, second } => {
                format!("The provided CIDRs must not overlap: '{first} overlaps with {second}'.")
            }
            ValidationError::LocationMismatch {
                vnet_location,
                cluster_location,
            } => format!(
                "The vnet location '{vnet_location}' must match the cluster location '{cluster_location}'."
            ),
            ValidationError::NotRegistered { namespace } => {
                format!("The resource provider '{namespace}' is not registered.")
            }
        }
    }

    /// Wire body handed back to the API caller.
    pub fn to_cloud_error(&self) -> CloudError {
        CloudError {
            status_code: self.status_code(),
            code: self.code().to_string(),
            target: self.target().to_string(),
            message: self.message(),
        }
    }
}

/// Serialisable cloud error body.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CloudError {
    #[serde(skip)]
    pub status_code: u16,
    pub code: String,
    pub target: String,
    pub message: String,
}

/// Failure reported by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Kubernetes style not-found, e.g. `secrets "cluster" not found`.
    #[error("{resource} \"{name}\" not found")]
    NotFound { resource: String, name: String },

    /// Non-success HTTP status from a cloud API.
    #[error("status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("context canceled")]
    Cancelled,

    #[error("command failed: {0}")]
    Command(String),

    #[error("error parsing response: {0}")]
    Parse(String),

    #[error("{0}")]
    Other(String),
}

impl SourceError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SourceError::NotFound { .. } | SourceError::Http { status: 404, .. }
        )
    }
}

/// Main error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("parsing failed for {0}. Invalid resource Id format")]
    InvalidResourceId(String),

    #[error("invalid CIDR address: {0}")]
    InvalidCidr(String),

    /// No NSG naming convention exists for the cluster's architecture version.
    #[error("unknown architecture version {0}")]
    UnknownArchitectureVersion(u32),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("certificate \"{key}\" not found on secret \"{secret}\"")]
    CertificateNotFound { secret: String, key: String },

    #[error("failed to parse certificate \"{key}\" on secret \"{secret}\": {reason}")]
    CertificateParse {
        secret: String,
        key: String,
        reason: String,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns the user-facing validation failure, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Validation(v) => Some(v),
            _ => None,
        }
    }

    /// Create a configuration error with the given message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_renders_cloud_line() {
        let err = ValidationError::NotFound {
            target: "properties.masterProfile.subnetId".to_string(),
            kind: LinkedResource::Subnet,
            id: "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/v/subnets/m"
                .to_string(),
        };
        assert_eq!(
            err.to_string(),
            "400: InvalidLinkedVNet: properties.masterProfile.subnetId: The subnet '/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/v/subnets/m' could not be found."
        );
    }

    #[test]
    fn test_route_table_not_found_code() {
        let err = ValidationError::NotFound {
            target: String::new(),
            kind: LinkedResource::RouteTable,
            id: "rt".to_string(),
        };
        assert_eq!(err.code(), CODE_INVALID_LINKED_ROUTE_TABLE);
        assert_eq!(err.target(), "");
    }

    #[test]
    fn test_permissions_uses_caller_code() {
        let err = ValidationError::InsufficientPermissions {
            code: CODE_INVALID_SERVICE_PRINCIPAL_PERMISSIONS.to_string(),
            role: "service principal".to_string(),
            kind: LinkedResource::Vnet,
            id: "vnet-id".to_string(),
        };
        assert_eq!(err.code(), "InvalidServicePrincipalPermissions");
        assert_eq!(
            err.message(),
            "The service principal does not have Network Contributor permission on vnet 'vnet-id'."
        );
    }

    #[test]
    fn test_cloud_error_body_skips_status() {
        let err = ValidationError::NotRegistered {
            namespace: "Microsoft.Storage".to_string(),
        };
        let body = err.to_cloud_error();
        assert_eq!(body.status_code, 400);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], "ResourceProviderNotRegistered");
        assert_eq!(
            json["message"],
            "The resource provider 'Microsoft.Storage' is not registered."
        );
        assert!(json.get("statusCode").is_none());
    }

    #[test]
    fn test_source_error_not_found() {
        assert!(SourceError::Http {
            status: 404,
            message: "gone".to_string()
        }
        .is_not_found());
        assert!(SourceError::NotFound {
            resource: "secrets".to_string(),
            name: "cluster".to_string()
        }
        .is_not_found());
        assert!(!SourceError::Cancelled.is_not_found());
        assert_eq!(
            SourceError::NotFound {
                resource: "secrets".to_string(),
                name: "cluster".to_string()
            }
            .to_string(),
            "secrets \"cluster\" not found"
        );
    }
}
