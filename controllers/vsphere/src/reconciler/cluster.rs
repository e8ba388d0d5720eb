//! Cluster reconciliation
//!
//! A missing cluster is created empty and then reconfigured, so creation and
//! later updates share one reconfigure path.

use super::resolver::{Resolved, Resolver};
use super::translate::{self, drs, ha};
use super::{ObservedCluster, ObservedObject, Reconciler};
use crate::error::ControllerError;
use crate::reconcile_helpers::{check_existing, find_or_create};
use crds::VSphereClusterSpec;
use tracing::{debug, info};
use vsphere_client::{path, ClusterConfigSpecEx};

impl Reconciler {
    /// Find or create the cluster, then apply its declared DRS and HA sections
    pub async fn create_cluster(&self, spec: &VSphereClusterSpec) -> Result<ObservedCluster, ControllerError> {
        let config = translate::cluster_config_spec(spec)?;

        let resolver = &self.resolver();
        let datacenter = &resolver.datacenter(Some(&spec.datacenter_id)).await?;
        let name = spec.name.as_str();

        let (cluster, _) = find_or_create(
            "Cluster",
            name,
            move || resolver.cluster(datacenter, name),
            move || async move {
                let folder = self
                    .vsphere_client
                    .datacenter_host_folder(&datacenter.reference)
                    .await?;
                let reference = self
                    .vsphere_client
                    .create_cluster(&folder, name, &ClusterConfigSpecEx::default())
                    .await?;
                resolver.invalidate();
                Ok(Resolved {
                    reference,
                    inventory_path: path::join(&format!("{}/host", datacenter.inventory_path), name),
                })
            },
        )
        .await?;

        self.reconfigure(&cluster, &config).await?;
        self.observe_cluster(cluster).await
    }

    /// Push the declared DRS and HA sections to an existing cluster
    pub async fn update_cluster(&self, spec: &VSphereClusterSpec) -> Result<ObservedCluster, ControllerError> {
        let config = translate::cluster_config_spec(spec)?;
        let resolver = self.resolver();
        let cluster = resolve_cluster(&resolver, spec).await?;
        self.reconfigure(&cluster, &config).await?;
        self.observe_cluster(cluster).await
    }

    /// Current cluster configuration, or `None` when the cluster is gone
    pub async fn read_cluster(&self, spec: &VSphereClusterSpec) -> Result<Option<ObservedCluster>, ControllerError> {
        let resolver = self.resolver();
        match check_existing("Cluster", &spec.name, resolve_cluster(&resolver, spec)).await? {
            Some(cluster) => Ok(Some(self.observe_cluster(cluster).await?)),
            None => Ok(None),
        }
    }

    /// Reject an invalid DRS or HA declaration without calling vCenter
    pub fn validate_cluster(spec: &VSphereClusterSpec) -> Result<(), ControllerError> {
        translate::cluster_config_spec(spec).map(|_| ())
    }

    /// Whether any declared DRS or HA field differs from what vCenter reports
    pub fn cluster_needs_update(spec: &VSphereClusterSpec, observed: &ObservedCluster) -> bool {
        let drs_drift = spec
            .drs
            .first()
            .map(|declared| drs::drifted(declared, observed.drs.first()))
            .unwrap_or(false);
        let ha_drift = spec
            .ha
            .first()
            .map(|declared| ha::drifted(declared, observed.ha.first()))
            .unwrap_or(false);
        drs_drift || ha_drift
    }

    /// Destroy the cluster unless it is retained
    pub async fn delete_cluster(&self, spec: &VSphereClusterSpec) -> Result<(), ControllerError> {
        if spec.keep {
            info!("Cluster {} is retained (keep = true), leaving it in vCenter", spec.name);
            return Ok(());
        }

        let resolver = self.resolver();
        let cluster = resolve_cluster(&resolver, spec).await?;
        info!("Destroying cluster {} ({})", cluster.inventory_path, cluster.reference);
        let task = self.vsphere_client.destroy(&cluster.reference).await?;
        self.wait_for_task(&task).await?;
        resolver.invalidate();
        Ok(())
    }

    async fn reconfigure(&self, cluster: &Resolved, config: &ClusterConfigSpecEx) -> Result<(), ControllerError> {
        if config.is_empty() {
            debug!("No DRS or HA section declared for {}, skipping reconfigure", cluster.inventory_path);
            return Ok(());
        }
        info!("Reconfiguring cluster {}", cluster.inventory_path);
        let task = self.vsphere_client.reconfigure_cluster(&cluster.reference, config).await?;
        self.wait_for_task(&task).await?;
        Ok(())
    }

    async fn observe_cluster(&self, cluster: Resolved) -> Result<ObservedCluster, ControllerError> {
        let configuration = self.vsphere_client.cluster_configuration(&cluster.reference).await?;
        Ok(ObservedCluster {
            drs: drs::from_remote(&configuration.drs_config),
            ha: ha::from_remote(&configuration.das_config),
            object: ObservedObject::from(cluster),
        })
    }
}

async fn resolve_cluster(resolver: &Resolver<'_>, spec: &VSphereClusterSpec) -> Result<Resolved, ControllerError> {
    let datacenter = resolver.datacenter(Some(&spec.datacenter_id)).await?;
    resolver.cluster(&datacenter, &spec.name).await
}
