//! Main controller implementation.
//!
//! This module contains the `Controller` struct that connects to vCenter and
//! the Kubernetes API, then runs one watcher per CRD kind:
//! - VSphereDatacenter: datacenters under the root folder
//! - VSphereCluster: clusters and their DRS/HA settings
//! - VSphereHost: standalone and clustered ESXi hosts
//! - VSphereResourcePool: resource pools and their CPU/memory allocation

use crate::config::Config;
use crate::error::ControllerError;
use crate::lifecycle::Context;
use crate::reconciler::Reconciler;
use crate::watcher::Watcher;
use crds::{VSphereCluster, VSphereDatacenter, VSphereHost, VSphereResourcePool};
use kube::{Api, Client};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};
use vsphere_client::VSphereClient;

/// Main controller for vSphere inventory management.
#[derive(Debug)]
pub struct Controller {
    datacenter_watcher: JoinHandle<Result<(), ControllerError>>,
    cluster_watcher: JoinHandle<Result<(), ControllerError>>,
    host_watcher: JoinHandle<Result<(), ControllerError>>,
    resource_pool_watcher: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates a new controller instance and starts its watchers.
    pub async fn new(config: Config) -> Result<Self, ControllerError> {
        info!("Initializing vSphere Controller");

        // Create Kubernetes client
        let kube_client = Client::try_default().await?;

        // Log in to vCenter before any watcher starts
        info!("Connecting to vCenter {}...", config.vsphere_host);
        let vsphere_client = VSphereClient::connect(
            &config.vsphere_host,
            &config.vsphere_username,
            &config.vsphere_password,
            config.insecure,
            &config.api_release,
        )
        .await
        .map_err(|e| {
            error!("Failed to connect to vCenter: {}", e);
            error!("Please ensure:");
            error!("  1. VSPHERE_USERNAME and VSPHERE_PASSWORD are set correctly");
            error!("  2. vCenter is reachable at {}", config.vsphere_host);
            error!("  3. VSPHERE_INSECURE=true is set if vCenter uses a self-signed certificate");
            ControllerError::VSphere(e)
        })?;

        let reconciler = Reconciler::new(vsphere_client, config.task_poll_interval);
        let ctx = Arc::new(Context::new(reconciler, kube_client.clone()));

        let ns = config.namespace.as_deref().unwrap_or("default");
        let datacenter_api: Api<VSphereDatacenter> = Api::namespaced(kube_client.clone(), ns);
        let cluster_api: Api<VSphereCluster> = Api::namespaced(kube_client.clone(), ns);
        let host_api: Api<VSphereHost> = Api::namespaced(kube_client.clone(), ns);
        let resource_pool_api: Api<VSphereResourcePool> = Api::namespaced(kube_client, ns);

        let watcher_instance = Arc::new(Watcher::new(
            ctx,
            datacenter_api,
            cluster_api,
            host_api,
            resource_pool_api,
        ));

        // Start all watchers in background tasks
        let datacenter_watcher = {
            let watcher = watcher_instance.clone();
            tokio::spawn(async move { watcher.watch_datacenters().await })
        };

        let cluster_watcher = {
            let watcher = watcher_instance.clone();
            tokio::spawn(async move { watcher.watch_clusters().await })
        };

        let host_watcher = {
            let watcher = watcher_instance.clone();
            tokio::spawn(async move { watcher.watch_hosts().await })
        };

        let resource_pool_watcher = {
            let watcher = watcher_instance;
            tokio::spawn(async move { watcher.watch_resource_pools().await })
        };

        Ok(Self {
            datacenter_watcher,
            cluster_watcher,
            host_watcher,
            resource_pool_watcher,
        })
    }

    /// Runs the controller until a watcher exits.
    pub async fn run(mut self) -> Result<(), ControllerError> {
        info!("vSphere Controller running");

        // Wait for any watcher to exit (they should run forever)
        tokio::select! {
            result = &mut self.datacenter_watcher => {
                result.map_err(|e| ControllerError::Watch(format!("VSphereDatacenter watcher panicked: {}", e)))?
                    .map_err(|e| ControllerError::Watch(format!("VSphereDatacenter watcher error: {}", e)))?;
            }
            result = &mut self.cluster_watcher => {
                result.map_err(|e| ControllerError::Watch(format!("VSphereCluster watcher panicked: {}", e)))?
                    .map_err(|e| ControllerError::Watch(format!("VSphereCluster watcher error: {}", e)))?;
            }
            result = &mut self.host_watcher => {
                result.map_err(|e| ControllerError::Watch(format!("VSphereHost watcher panicked: {}", e)))?
                    .map_err(|e| ControllerError::Watch(format!("VSphereHost watcher error: {}", e)))?;
            }
            result = &mut self.resource_pool_watcher => {
                result.map_err(|e| ControllerError::Watch(format!("VSphereResourcePool watcher panicked: {}", e)))?
                    .map_err(|e| ControllerError::Watch(format!("VSphereResourcePool watcher error: {}", e)))?;
            }
        }

        info!("Watcher exited, shutting down vSphere Controller");
        Ok(())
    }
}
