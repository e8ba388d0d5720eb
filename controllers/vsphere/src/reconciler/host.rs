//! ESXi host reconciliation
//!
//! A standalone host lives at `/<dc>/host/<name>/<name>`, inside a compute
//! resource vCenter names after it. A clustered host lives at
//! `/<dc>/host/<cluster>/<name>`.

use super::resolver::{Resolved, Resolver};
use super::thumbprint::ConnectTarget;
use super::{ObservedObject, Reconciler};
use crate::error::ControllerError;
use crate::reconcile_helpers::{check_existing, find_or_create};
use crds::VSphereHostSpec;
use tracing::{info, warn};
use vsphere_client::{HostConnectSpec, ManagedObjectType};

impl Reconciler {
    /// Find the host at its expected path or connect it
    ///
    /// `password` is the host account password, read from the referenced Secret.
    pub async fn create_host(&self, spec: &VSphereHostSpec, password: &str) -> Result<ObservedObject, ControllerError> {
        let resolver = &self.resolver();
        let datacenter = &resolver.datacenter(spec.datacenter_id.as_deref()).await?;
        let name = spec.host.as_str();
        let cluster_name = spec.cluster_id.as_deref();

        let (host, _) = find_or_create(
            "Host",
            name,
            move || resolver.host(datacenter, cluster_name, name),
            move || async move {
                let connect = HostConnectSpec {
                    host_name: name.to_string(),
                    user_name: spec.user.clone(),
                    password: password.to_string(),
                    ssl_thumbprint: None,
                    force: true,
                };
                let license = spec.license.as_deref();

                match cluster_name {
                    Some(cluster_name) => {
                        let cluster = resolver.cluster(datacenter, cluster_name).await?;
                        info!("Adding host {} to cluster {}", name, cluster.inventory_path);
                        self.connect_host(ConnectTarget::Cluster(&cluster.reference), &connect, license, spec.ssl_no_verify)
                            .await?;
                    }
                    None => {
                        let folder = self
                            .vsphere_client
                            .datacenter_host_folder(&datacenter.reference)
                            .await?;
                        info!("Adding standalone host {} to {}", name, datacenter.inventory_path);
                        self.connect_host(ConnectTarget::Standalone(&folder), &connect, license, spec.ssl_no_verify)
                            .await?;
                    }
                }

                resolver.invalidate();
                resolver.host(datacenter, cluster_name, name).await
            },
        )
        .await?;

        Ok(host.into())
    }

    /// Current host, or `None` when it is gone from the inventory
    ///
    /// A host found under a different anchor is an error, not a removal.
    pub async fn read_host(&self, spec: &VSphereHostSpec) -> Result<Option<ObservedObject>, ControllerError> {
        let resolver = self.resolver();
        let found = check_existing("Host", &spec.host, resolve_host(&resolver, spec)).await?;
        Ok(found.map(ObservedObject::from))
    }

    /// Remove a standalone host by destroying its compute resource
    ///
    /// Clustered hosts are left alone; they go away with their cluster.
    pub async fn delete_host(&self, spec: &VSphereHostSpec) -> Result<(), ControllerError> {
        if spec.keep {
            info!("Host {} is retained (keep = true), leaving it in vCenter", spec.host);
            return Ok(());
        }
        if let Some(cluster) = &spec.cluster_id {
            warn!(
                "Host {} belongs to cluster {}; delete the cluster to remove it from vCenter",
                spec.host, cluster
            );
            return Ok(());
        }

        let resolver = self.resolver();
        let datacenter = resolver.datacenter(spec.datacenter_id.as_deref()).await?;
        let host = resolver.host(&datacenter, None, &spec.host).await?;
        let compute_resource = self.enclosing_compute_resource(&datacenter, &host).await?;

        info!("Destroying compute resource {} of host {}", compute_resource, host.inventory_path);
        let task = self.vsphere_client.destroy(&compute_resource).await?;
        self.wait_for_task(&task).await?;
        resolver.invalidate();
        Ok(())
    }

    /// The standalone compute resource in the datacenter host folder whose first host is `host`
    async fn enclosing_compute_resource(
        &self,
        datacenter: &Resolved,
        host: &Resolved,
    ) -> Result<vsphere_client::ObjectRef, ControllerError> {
        let folder = self
            .vsphere_client
            .datacenter_host_folder(&datacenter.reference)
            .await?;

        for child in self.vsphere_client.child_entities(&folder).await? {
            if child.kind != ManagedObjectType::ComputeResource {
                continue;
            }
            let hosts = self.vsphere_client.compute_resource_hosts(&child).await?;
            if hosts.first() == Some(&host.reference) {
                return Ok(child);
            }
        }

        Err(ControllerError::NotFound(format!(
            "compute resource holding host {}",
            host.inventory_path
        )))
    }
}

async fn resolve_host(resolver: &Resolver<'_>, spec: &VSphereHostSpec) -> Result<Resolved, ControllerError> {
    let datacenter = resolver.datacenter(spec.datacenter_id.as_deref()).await?;
    resolver
        .host(&datacenter, spec.cluster_id.as_deref(), &spec.host)
        .await
}
