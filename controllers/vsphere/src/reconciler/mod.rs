//! Reconciliation engine for vSphere inventory objects.
//!
//! This module is organized by concern:
//! - `resolver`: name + anchor -> live inventory object
//! - `task`: waiting for vCenter tasks
//! - `thumbprint`: host connect with a one-shot certificate pin retry
//! - `translate`: declared sections <-> vCenter configuration
//! - `datacenter`, `cluster`, `host`, `resource_pool`: per-kind create/read/update/delete
//!
//! The engine only talks to vCenter; Kubernetes status and finalizers are
//! handled by `crate::lifecycle`.

pub mod cluster;
pub mod datacenter;
pub mod host;
pub mod resolver;
pub mod resource_pool;
pub mod task;
pub mod thumbprint;
pub mod translate;

#[cfg(test)]
mod datacenter_test;
#[cfg(test)]
mod host_test;
#[cfg(test)]
mod resolver_test;
#[cfg(test)]
mod resource_pool_test;

use crds::{AllocationSection, DrsSection, HaSection};
use resolver::{Resolved, Resolver};
use std::time::Duration;
use vsphere_client::VSphereClientTrait;

/// Identity of a live object as surfaced in status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedObject {
    pub object_id: String,
    pub inventory_path: String,
}

impl From<Resolved> for ObservedObject {
    fn from(resolved: Resolved) -> Self {
        Self {
            object_id: resolved.reference.value,
            inventory_path: resolved.inventory_path,
        }
    }
}

/// A cluster as read back from vCenter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedCluster {
    pub object: ObservedObject,
    pub drs: Vec<DrsSection>,
    pub ha: Vec<HaSection>,
}

/// A resource pool as read back from vCenter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedResourcePool {
    pub object: ObservedObject,
    pub cpu: Vec<AllocationSection>,
    pub memory: Vec<AllocationSection>,
}

/// Reconciles vSphere inventory objects against one vCenter session.
///
/// Holds no per-object state; every operation builds its own resolver.
pub struct Reconciler {
    pub(crate) vsphere_client: Box<dyn VSphereClientTrait + Send + Sync>,
    pub(crate) task_poll_interval: Duration,
}

impl Reconciler {
    /// Creates a new reconciler instance.
    pub fn new(vsphere_client: impl VSphereClientTrait + Send + Sync + 'static, task_poll_interval: Duration) -> Self {
        Self {
            vsphere_client: Box::new(vsphere_client),
            task_poll_interval,
        }
    }

    /// Resolver for one reconciliation pass
    pub(crate) fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self.vsphere_client.as_ref())
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("endpoint", &self.vsphere_client.endpoint())
            .field("task_poll_interval", &self.task_poll_interval)
            .finish()
    }
}
