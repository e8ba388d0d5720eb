//! vSphere Controller
//!
//! Reconciles vSphere inventory CRDs against a vCenter server:
//! - VSphereDatacenter: creates datacenters under the root folder
//! - VSphereCluster: creates clusters and owns their DRS/HA settings
//! - VSphereHost: adds ESXi hosts standalone or into a cluster
//! - VSphereResourcePool: creates resource pools and owns their allocation
//!
//! Objects that already exist at the declared inventory path are adopted
//! instead of created.

mod backoff;
mod config;
mod controller;
mod error;
mod lifecycle;
mod reconcile_helpers;
mod reconciler;
mod watcher;

#[cfg(test)]
mod reconcile_helpers_test;
#[cfg(test)]
mod test_utils;

use crate::config::Config;
use crate::error::ControllerError;
use controller::Controller;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting vSphere Controller");

    // Load configuration from environment variables
    let config = Config::from_env()?;

    info!("Configuration:");
    info!("  vCenter: {}", config.vsphere_host);
    info!("  User: {}", config.vsphere_username);
    info!("  Insecure: {}", config.insecure);
    info!("  API release: {}", config.api_release);
    info!("  Namespace: {}", config.namespace.as_deref().unwrap_or("default"));

    // Initialize and run controller
    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}
