//! Certificate expiry gauges.
//!
//! Reads the monitoring certificate from the cluster secret and, on platform
//! managed domains, the ingress and API server certificates. A missing secret
//! is reported with its own gauge; a secret without a certificate fails the pass.

use crate::config::MonitorConfig;
use crate::error::Error;
use crate::models::CertificateRecord;
use crate::sources::{cancellable, IngressSource, MetricsEmitter, SecretSource};
use chrono::DateTime;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use x509_parser::prelude::*;

pub const CERTIFICATE_EXPIRATION_METRIC: &str = "certificate.expirationdate";
pub const SECRET_MISSING_METRIC: &str = "certificate.secretnotfound";

pub struct CertificateMonitor {
    /// External domain of the cluster.
    domain: String,
    config: MonitorConfig,
    secrets: Arc<dyn SecretSource>,
    ingress: Arc<dyn IngressSource>,
    metrics: Arc<dyn MetricsEmitter>,
    cancel: CancellationToken,
}

impl CertificateMonitor {
    pub fn new(
        domain: &str,
        secrets: Arc<dyn SecretSource>,
        ingress: Arc<dyn IngressSource>,
        metrics: Arc<dyn MetricsEmitter>,
    ) -> CertificateMonitor {
        CertificateMonitor {
            domain: domain.to_string(),
            config: MonitorConfig::default(),
            secrets,
            ingress,
            metrics,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Run one pass. Expiry gauges are emitted only when every read succeeded.
    pub async fn emit_certificate_expiration_statuses(&self) -> Result<(), Error> {
        log::info!("Checking certificate expiry for {}", self.domain);
        let mut certificates = vec![];

        let cluster_secret = &self.config.cluster_secret_name;
        match self
            .get_certificate(&self.config.namespace, cluster_secret, &self.config.cluster_secret_key)
            .await?
        {
            Some(record) => certificates.push(record),
            None => self.emit_secret_missing(cluster_secret),
        }

        if self.config.is_managed_domain(&self.domain) {
            let ingress = cancellable(
                &self.cancel,
                self.ingress.get_ingress_controller(
                    &self.config.ingress_namespace,
                    &self.config.ingress_controller_name,
                ),
            )
            .await?;

            let ingress_secret = ingress.default_certificate_secret_name;
            let apiserver_secret = ingress_secret.replacen("-ingress", "-apiserver", 1);
            for secret_name in [ingress_secret, apiserver_secret] {
                match self
                    .get_certificate(&self.config.namespace, &secret_name, &self.config.tls_cert_key)
                    .await?
                {
                    Some(record) => certificates.push(record),
                    None => self.emit_secret_missing(&secret_name),
                }
            }
        }

        for record in &certificates {
            let mut dimensions = BTreeMap::new();
            dimensions.insert("subject".to_string(), record.subject.clone());
            dimensions.insert("expirationDate".to_string(), record.expiration_date());
            self.metrics.emit_gauge(CERTIFICATE_EXPIRATION_METRIC, 1, &dimensions);
        }
        Ok(())
    }

    /// Read and parse the first certificate stored under `key`
    ///
    /// # Returns
    ///
    /// `None` when the secret does not exist.
    pub async fn get_certificate(
        &self,
        namespace: &str,
        name: &str,
        key: &str,
    ) -> Result<Option<CertificateRecord>, Error> {
        log::debug!("Reading secret {namespace}/{name}");
        let secret = match cancellable(&self.cancel, self.secrets.get_secret(namespace, name)).await
        {
            Ok(secret) => secret,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let not_found = || Error::CertificateNotFound {
            secret: name.to_string(),
            key: key.to_string(),
        };
        let data = secret.data.get(key).ok_or_else(not_found)?;
        let block = ::pem::parse(data).map_err(|_| not_found())?;

        let parse_error = |reason: String| Error::CertificateParse {
            secret: name.to_string(),
            key: key.to_string(),
            reason,
        };
        let (_, cert) =
            X509Certificate::from_der(block.contents()).map_err(|e| parse_error(e.to_string()))?;

        let subject = cert
            .subject()
            .iter_common_name()
            .last()
            .and_then(|cn| cn.as_str().ok())
            .unwrap_or_default()
            .to_string();
        let not_after = DateTime::from_timestamp(cert.validity().not_after.timestamp(), 0)
            .ok_or_else(|| parse_error("expiry out of range".to_string()))?;

        Ok(Some(CertificateRecord { subject, not_after }))
    }

    fn emit_secret_missing(&self, secret_name: &str) {
        log::warn!("Secret {}/{secret_name} not found", self.config.namespace);
        let mut dimensions = BTreeMap::new();
        dimensions.insert("secretMissing".to_string(), secret_name.to_string());
        self.metrics.emit_gauge(SECRET_MISSING_METRIC, 1, &dimensions);
    }
}

/// Run one pass per cluster concurrently. Results keep the order of `monitors`.
pub async fn emit_for_clusters(monitors: &[CertificateMonitor]) -> Vec<Result<(), Error>> {
    let passes = monitors
        .iter()
        .map(|monitor| monitor.emit_certificate_expiration_statuses());
    let results = futures::future::join_all(passes).await;
    for (monitor, result) in monitors.iter().zip(&results) {
        if let Err(e) = result {
            log::error!("Certificate monitor failed for {}: {e}", monitor.domain());
        }
    }
    results
}
