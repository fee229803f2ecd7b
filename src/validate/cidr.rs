use super::{find_subnet, Validator};
use crate::error::{Error, ValidationError};
use crate::models::{worker_subnet_path, Ipv4, MASTER_SUBNET_PATH};
use itertools::Itertools;
use std::collections::HashSet;

impl Validator {
    /// Pod, service, master and worker ranges must not overlap pairwise.
    ///
    /// Workers sharing one subnet contribute its range once; two distinct
    /// subnets with the same prefix still collide.
    pub async fn validate_cidr_ranges(&self) -> Result<(), Error> {
        log::info!("Validating CIDR ranges");
        let vnet = self.get_vnet().await?;

        let master = find_subnet(&vnet, MASTER_SUBNET_PATH, &self.cluster.master_subnet_id)?;
        let mut ranges = vec![
            self.cluster.pod_cidr.clone(),
            self.cluster.service_cidr.clone(),
            master.address_prefix.clone().unwrap_or_default(),
        ];

        let mut seen = HashSet::new();
        for (i, subnet_id) in self.cluster.worker_subnet_ids.iter().enumerate() {
            if !seen.insert(subnet_id.as_str()) {
                continue;
            }
            let worker = find_subnet(&vnet, &worker_subnet_path(i), subnet_id)?;
            ranges.push(worker.address_prefix.clone().unwrap_or_default());
        }

        let parsed = ranges
            .iter()
            .map(|r| Ipv4::new(r).map(|ip| (r.as_str(), ip)))
            .collect::<Result<Vec<_>, Error>>()?;

        for ((first, a), (second, b)) in parsed.iter().tuple_combinations() {
            if a.overlaps(b) {
                return Err(ValidationError::OverlappingRanges {
                    first: first.to_string(),
                    second: second.to_string(),
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
    use crate::models::{ClusterNetworkConfig, VirtualNetwork};
    use crate::sources::{MockPermissionSource, MockProviderSource};

    fn cidr_cluster(pod: &str, service: &str, workers: usize) -> ClusterNetworkConfig {
        ClusterNetworkConfig {
            pod_cidr: pod.to_string(),
            service_cidr: service.to_string(),
            worker_subnet_ids: vec![WORKER_SUBNET.to_string(); workers],
            ..test_cluster()
        }
    }

    async fn validate(cluster: ClusterNetworkConfig, vnet: VirtualNetwork) -> Result<(), Error> {
        validator(
            cluster,
            MockPermissionSource::new(),
            networks_serving(vnet),
            MockProviderSource::new(),
        )
        .validate_cidr_ranges()
        .await
    }

    #[tokio::test]
    async fn test_disjoint_ranges() {
        // master 10.0.0.0/24, worker 10.0.1.0/24
        validate(cidr_cluster("10.0.2.0/24", "10.0.3.0/24", 1), test_vnet())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_workers_sharing_a_subnet() {
        validate(cidr_cluster("10.0.2.0/24", "10.0.3.0/24", 2), test_vnet())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_service_duplicates_master() {
        let err = validate(cidr_cluster("10.0.2.0/24", "10.0.0.0/24", 1), test_vnet())
            .await
            .unwrap_err();
        assert_eq!(
            err.as_validation(),
            Some(&ValidationError::OverlappingRanges {
                first: "10.0.0.0/24".to_string(),
                second: "10.0.0.0/24".to_string(),
            })
        );
        assert_eq!(
            err.to_string(),
            "400: InvalidLinkedVNet: : The provided CIDRs must not overlap: '10.0.0.0/24 overlaps with 10.0.0.0/24'."
        );
    }

    #[tokio::test]
    async fn test_pod_contains_worker() {
        let err = validate(cidr_cluster("10.0.0.0/16", "172.30.0.0/16", 1), test_vnet())
            .await
            .unwrap_err();
        assert_eq!(
            err.as_validation(),
            Some(&ValidationError::OverlappingRanges {
                first: "10.0.0.0/16".to_string(),
                second: "10.0.0.0/24".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_distinct_subnets_with_same_prefix() {
        let mut vnet = test_vnet();
        vnet.subnets[1].address_prefix = Some("10.0.0.0/24".to_string());
        let err = validate(cidr_cluster("10.0.2.0/24", "10.0.3.0/24", 1), vnet)
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_validation(),
            Some(ValidationError::OverlappingRanges { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_pod_cidr() {
        let err = validate(cidr_cluster("10.0.2.0", "10.0.3.0/24", 1), test_vnet())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCidr(ref s) if s == "10.0.2.0"));
    }

    #[tokio::test]
    async fn test_missing_master_subnet() {
        let mut vnet = test_vnet();
        vnet.subnets.remove(0);
        let err = validate(cidr_cluster("10.0.2.0/24", "10.0.3.0/24", 1), vnet)
            .await
            .unwrap_err();
        assert_eq!(
            err.as_validation().map(|e| e.target()),
            Some("properties.masterProfile.subnetId")
        );
    }
}
