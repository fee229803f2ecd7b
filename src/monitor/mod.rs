//! Per-cluster monitors.

mod certificates;

pub use certificates::{
    emit_for_clusters, CertificateMonitor, CERTIFICATE_EXPIRATION_METRIC, SECRET_MISSING_METRIC,
};
