//! Kubernetes objects read by the certificate monitor.

use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;

/// Data of a Kubernetes secret.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Secret {
    pub data: BTreeMap<String, Vec<u8>>,
}

impl Secret {
    pub fn with_entry(key: &str, value: impl Into<Vec<u8>>) -> Secret {
        let mut data = BTreeMap::new();
        data.insert(key.to_string(), value.into());
        Secret { data }
    }
}

/// The part of an ingress controller the monitor needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressController {
    pub default_certificate_secret_name: String,
}

/// Subject and expiry of a parsed certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRecord {
    /// Subject common name.
    pub subject: String,
    pub not_after: DateTime<Utc>,
}

impl CertificateRecord {
    /// Expiry as RFC3339 in UTC, e.g. `2031-03-14T00:00:00Z`.
    pub fn expiration_date(&self) -> String {
        self.not_after.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}
