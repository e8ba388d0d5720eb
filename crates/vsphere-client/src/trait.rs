//! VSphereClient trait for mocking
//!
//! This trait abstracts the VSphereClient to enable mocking in unit tests.
//! The concrete VSphereClient implements this trait, and tests can use mock implementations.

use crate::error::VSphereError;
use crate::models::*;

/// Trait for vSphere API session operations
///
/// Methods named after a `_Task` method return the task reference; the caller
/// decides whether and how to wait for it. Synchronous platform methods
/// return their result directly.
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait VSphereClientTrait: Send + Sync {
    /// vCenter endpoint this session is bound to
    fn endpoint(&self) -> &str;

    // Inventory
    async fn root_folder(&self) -> Result<ObjectRef, VSphereError>;
    /// Objects whose inventory path matches `pattern`, restricted to `kinds` when non-empty
    async fn find(&self, pattern: &str, kinds: &[ManagedObjectType]) -> Result<Vec<InventoryObject>, VSphereError>;
    async fn datacenter_host_folder(&self, datacenter: &ObjectRef) -> Result<ObjectRef, VSphereError>;
    async fn child_entities(&self, folder: &ObjectRef) -> Result<Vec<ObjectRef>, VSphereError>;
    async fn compute_resource_hosts(&self, compute_resource: &ObjectRef) -> Result<Vec<ObjectRef>, VSphereError>;
    async fn compute_resource_pool(&self, compute_resource: &ObjectRef) -> Result<ObjectRef, VSphereError>;

    // Datacenter
    async fn create_datacenter(&self, folder: &ObjectRef, name: &str) -> Result<ObjectRef, VSphereError>;

    // Cluster
    async fn create_cluster(&self, folder: &ObjectRef, name: &str, spec: &ClusterConfigSpecEx) -> Result<ObjectRef, VSphereError>;
    async fn reconfigure_cluster(&self, cluster: &ObjectRef, spec: &ClusterConfigSpecEx) -> Result<ObjectRef, VSphereError>;
    async fn cluster_configuration(&self, cluster: &ObjectRef) -> Result<ClusterConfigInfoEx, VSphereError>;

    // Host
    async fn add_standalone_host(&self, folder: &ObjectRef, spec: &HostConnectSpec, license: Option<&str>) -> Result<ObjectRef, VSphereError>;
    async fn add_cluster_host(&self, cluster: &ObjectRef, spec: &HostConnectSpec, license: Option<&str>) -> Result<ObjectRef, VSphereError>;

    // Resource pool
    async fn create_resource_pool(&self, parent: &ObjectRef, name: &str, spec: &ResourceConfigSpec) -> Result<ObjectRef, VSphereError>;
    async fn update_resource_pool(&self, pool: &ObjectRef, spec: &ResourceConfigSpec) -> Result<(), VSphereError>;
    async fn resource_pool_allocation(&self, pool: &ObjectRef, facet: AllocationFacet) -> Result<ResourceAllocationInfo, VSphereError>;

    // Common
    async fn destroy(&self, object: &ObjectRef) -> Result<ObjectRef, VSphereError>;
    async fn task_info(&self, task: &ObjectRef) -> Result<TaskInfo, VSphereError>;
}
