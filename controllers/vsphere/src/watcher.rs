//! Kubernetes resource watchers.
//!
//! This module handles watching Kubernetes resources for changes
//! and triggering reconciliation using kube_runtime::Controller.
//!
//! All four CRD kinds go through the generic `watch_resource()` helper, which
//! wires the shared lifecycle (`lifecycle::reconcile` / `lifecycle::error_policy`)
//! into a controller stream with automatic reconnection.

use crate::error::ControllerError;
use crate::lifecycle::{self, Context, VSphereResource};
use crds::{VSphereCluster, VSphereDatacenter, VSphereHost, VSphereResourcePool};
use futures::StreamExt;
use kube::Api;
use kube_runtime::{controller::Config as ControllerConfig, watcher, Controller};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Run a controller for one CRD kind until its stream ends.
///
/// Debounce waits 5 seconds after the last event before reconciling, which
/// batches status writes together. At most 3 reconciliations of one kind run
/// concurrently.
async fn watch_resource<K: VSphereResource>(api: Api<K>, ctx: Arc<Context>) -> Result<(), ControllerError> {
    info!("Starting {} watcher", K::KIND);

    let controller_config = ControllerConfig::default()
        .debounce(Duration::from_secs(5))
        .concurrency(3);

    Controller::new(api, watcher::Config::default())
        .with_config(controller_config)
        .run(lifecycle::reconcile::<K>, lifecycle::error_policy::<K>, ctx)
        .for_each(|res| async move {
            match res {
                Ok((obj, _action)) => debug!("Reconciled {} {}", K::KIND, obj.name),
                Err(e) => error!("Controller error for {}: {}", K::KIND, e),
            }
        })
        .await;

    Ok(())
}

/// Watches the vSphere CRDs in one namespace.
pub struct Watcher {
    ctx: Arc<Context>,
    datacenter_api: Api<VSphereDatacenter>,
    cluster_api: Api<VSphereCluster>,
    host_api: Api<VSphereHost>,
    resource_pool_api: Api<VSphereResourcePool>,
}

impl Watcher {
    /// Creates a new watcher instance.
    pub fn new(
        ctx: Arc<Context>,
        datacenter_api: Api<VSphereDatacenter>,
        cluster_api: Api<VSphereCluster>,
        host_api: Api<VSphereHost>,
        resource_pool_api: Api<VSphereResourcePool>,
    ) -> Self {
        Self {
            ctx,
            datacenter_api,
            cluster_api,
            host_api,
            resource_pool_api,
        }
    }

    /// Starts watching VSphereDatacenter resources.
    pub async fn watch_datacenters(&self) -> Result<(), ControllerError> {
        watch_resource(self.datacenter_api.clone(), self.ctx.clone()).await
    }

    /// Starts watching VSphereCluster resources.
    pub async fn watch_clusters(&self) -> Result<(), ControllerError> {
        watch_resource(self.cluster_api.clone(), self.ctx.clone()).await
    }

    /// Starts watching VSphereHost resources.
    pub async fn watch_hosts(&self) -> Result<(), ControllerError> {
        watch_resource(self.host_api.clone(), self.ctx.clone()).await
    }

    /// Starts watching VSphereResourcePool resources.
    pub async fn watch_resource_pools(&self) -> Result<(), ControllerError> {
        watch_resource(self.resource_pool_api.clone(), self.ctx.clone()).await
    }
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher").field("ctx", &self.ctx).finish_non_exhaustive()
    }
}
