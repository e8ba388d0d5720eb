//! Mock VSphereClient for unit testing
//!
//! This module provides a mock implementation of VSphereClientTrait that can be used
//! in unit tests without requiring a running vCenter.
//!
//! The mock is organized into:
//! - `inventory.rs` - In-memory inventory tree (paths, lookup, removal)
//! - `tasks.rs` - Task lifecycle, scripted faults and host certificates
//! - `helpers.rs` - Helper functions for building objects and faults

mod helpers;
mod inventory;
mod tasks;

pub use helpers::{fault, ssl_verify_fault};

use crate::error::VSphereError;
use crate::models::*;
use crate::vsphere_trait::VSphereClientTrait;
use inventory::MockNode;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tasks::MockTask;

/// A mutating call recorded by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub method: String,
    pub target: ObjectRef,
    pub body: serde_json::Value,
}

/// Mock VSphereClient for testing
///
/// This mock keeps an inventory tree in memory, records every mutating call,
/// and can be scripted to fail tasks with specific faults.
#[derive(Clone)]
pub struct MockVSphereClient {
    pub(crate) endpoint: String,
    pub(crate) root: ObjectRef,
    pub(crate) nodes: Arc<Mutex<HashMap<ObjectRef, MockNode>>>,
    pub(crate) tasks: Arc<Mutex<HashMap<String, MockTask>>>,
    // Faults consumed by the next tasks of a method, in order
    pub(crate) task_faults: Arc<Mutex<HashMap<String, VecDeque<LocalizedMethodFault>>>>,
    // Certificate thumbprint each host presents
    pub(crate) host_thumbprints: Arc<Mutex<HashMap<String, String>>>,
    pub(crate) polls_before_completion: Arc<Mutex<u32>>,
    pub(crate) calls: Arc<Mutex<Vec<MockCall>>>,
    pub(crate) task_info_reads: Arc<Mutex<u32>>,
    pub(crate) next_id: Arc<Mutex<u64>>,
}

impl MockVSphereClient {
    /// Create a new mock client with an empty inventory
    pub fn new(endpoint: impl Into<String>) -> Self {
        let root = ObjectRef::new(ManagedObjectType::Folder, "group-d1");
        let mut nodes = HashMap::new();
        nodes.insert(
            root.clone(),
            MockNode {
                name: "Datacenters".to_string(),
                parent: None,
                children: Vec::new(),
                cluster_config: ClusterConfigInfoEx::default(),
                pool_config: ResourceConfigSpec::default(),
            },
        );
        Self {
            endpoint: endpoint.into(),
            root,
            nodes: Arc::new(Mutex::new(nodes)),
            tasks: Arc::new(Mutex::new(HashMap::new())),
            task_faults: Arc::new(Mutex::new(HashMap::new())),
            host_thumbprints: Arc::new(Mutex::new(HashMap::new())),
            polls_before_completion: Arc::new(Mutex::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            task_info_reads: Arc::new(Mutex::new(0)),
            next_id: Arc::new(Mutex::new(10)),
        }
    }

    /// Generate next ID
    pub(crate) fn next_id(&self) -> u64 {
        let mut id = self.next_id.lock().unwrap();
        let current = *id;
        *id += 1;
        current
    }

    pub(crate) fn record(&self, method: &str, target: &ObjectRef, body: serde_json::Value) {
        self.calls.lock().unwrap().push(MockCall {
            method: method.to_string(),
            target: target.clone(),
            body,
        });
    }

    // Test setup

    /// Add a datacenter under the root folder (for test setup)
    pub fn add_datacenter(&self, name: &str) -> ObjectRef {
        let root = self.root.clone();
        self.insert_datacenter(&root, name)
    }

    /// Add an empty cluster to a datacenter's host folder (for test setup)
    pub fn add_cluster(&self, datacenter: &ObjectRef, name: &str) -> ObjectRef {
        let folder = self.host_folder_of(datacenter);
        self.insert_compute_resource(ManagedObjectType::ClusterComputeResource, &folder, name)
    }

    /// Add a standalone host to a datacenter and return the host (for test setup)
    pub fn add_standalone_host(&self, datacenter: &ObjectRef, name: &str) -> ObjectRef {
        let folder = self.host_folder_of(datacenter);
        let compute_resource = self.insert_compute_resource(ManagedObjectType::ComputeResource, &folder, name);
        self.insert_node(ManagedObjectType::HostSystem, Some(&compute_resource), name)
    }

    /// Add a host to a cluster (for test setup)
    pub fn add_cluster_host(&self, cluster: &ObjectRef, name: &str) -> ObjectRef {
        self.insert_node(ManagedObjectType::HostSystem, Some(cluster), name)
    }

    /// Add a child resource pool (for test setup)
    pub fn add_resource_pool(&self, parent: &ObjectRef, name: &str, config: ResourceConfigSpec) -> ObjectRef {
        let pool = self.insert_node(ManagedObjectType::ResourcePool, Some(parent), name);
        if let Some(node) = self.nodes.lock().unwrap().get_mut(&pool) {
            node.pool_config = config;
        }
        pool
    }

    /// Root `Resources` pool of a compute resource
    pub fn root_pool_of(&self, compute_resource: &ObjectRef) -> ObjectRef {
        self.child_named(compute_resource, "Resources")
            .unwrap_or_else(|| panic!("{} has no root resource pool", compute_resource))
    }

    /// Host folder of a datacenter
    pub fn host_folder_of(&self, datacenter: &ObjectRef) -> ObjectRef {
        self.child_named(datacenter, "host")
            .unwrap_or_else(|| panic!("{} has no host folder", datacenter))
    }

    /// Enclosing object of a managed object
    pub fn parent_of(&self, reference: &ObjectRef) -> Option<ObjectRef> {
        self.nodes
            .lock()
            .unwrap()
            .get(reference)
            .and_then(|node| node.parent.clone())
    }

    /// Overwrite a cluster's live configuration (for test setup)
    pub fn set_cluster_config(&self, cluster: &ObjectRef, config: ClusterConfigInfoEx) {
        if let Some(node) = self.nodes.lock().unwrap().get_mut(cluster) {
            node.cluster_config = config;
        }
    }

    /// Live configuration of a cluster
    pub fn cluster_config(&self, cluster: &ObjectRef) -> Option<ClusterConfigInfoEx> {
        self.nodes
            .lock()
            .unwrap()
            .get(cluster)
            .map(|node| node.cluster_config.clone())
    }

    /// Live configuration of a resource pool
    pub fn pool_config(&self, pool: &ObjectRef) -> Option<ResourceConfigSpec> {
        self.nodes
            .lock()
            .unwrap()
            .get(pool)
            .map(|node| node.pool_config.clone())
    }

    /// Whether an object is still in the inventory
    pub fn exists(&self, reference: &ObjectRef) -> bool {
        self.nodes.lock().unwrap().contains_key(reference)
    }

    /// Inventory path of an object
    pub fn path_of(&self, reference: &ObjectRef) -> Option<String> {
        self.inventory_path(reference)
    }

    /// Every mutating call, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Mutating calls to one method, in order
    pub fn calls_to(&self, method: &str) -> Vec<MockCall> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.method == method)
            .cloned()
            .collect()
    }

    /// Number of `task_info` reads served
    pub fn task_info_reads(&self) -> u32 {
        *self.task_info_reads.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl VSphereClientTrait for MockVSphereClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn root_folder(&self) -> Result<ObjectRef, VSphereError> {
        Ok(self.root.clone())
    }

    async fn find(&self, pattern: &str, kinds: &[ManagedObjectType]) -> Result<Vec<InventoryObject>, VSphereError> {
        Ok(self.find_objects(pattern, kinds))
    }

    async fn datacenter_host_folder(&self, datacenter: &ObjectRef) -> Result<ObjectRef, VSphereError> {
        self.node(datacenter)?;
        self.child_named(datacenter, "host")
            .ok_or_else(|| VSphereError::NotFound(format!("{} has no host folder", datacenter)))
    }

    async fn child_entities(&self, folder: &ObjectRef) -> Result<Vec<ObjectRef>, VSphereError> {
        Ok(self.node(folder)?.children)
    }

    async fn compute_resource_hosts(&self, compute_resource: &ObjectRef) -> Result<Vec<ObjectRef>, VSphereError> {
        self.children_of_kind(compute_resource, &ManagedObjectType::HostSystem)
    }

    async fn compute_resource_pool(&self, compute_resource: &ObjectRef) -> Result<ObjectRef, VSphereError> {
        self.node(compute_resource)?;
        self.child_named(compute_resource, "Resources")
            .ok_or_else(|| VSphereError::NotFound(format!("{} has no root resource pool", compute_resource)))
    }

    async fn create_datacenter(&self, folder: &ObjectRef, name: &str) -> Result<ObjectRef, VSphereError> {
        self.record("CreateDatacenter", folder, serde_json::json!({ "name": name }));
        self.node(folder)?;
        if self.child_named(folder, name).is_some() {
            return Err(VSphereError::Api(format!("DuplicateName: {} already exists", name)));
        }
        Ok(self.insert_datacenter(folder, name))
    }

    async fn create_cluster(&self, folder: &ObjectRef, name: &str, spec: &ClusterConfigSpecEx) -> Result<ObjectRef, VSphereError> {
        self.record(
            "CreateClusterEx",
            folder,
            serde_json::json!({ "name": name, "spec": serde_json::to_value(spec)? }),
        );
        self.node(folder)?;
        if self.child_named(folder, name).is_some() {
            return Err(VSphereError::Api(format!("DuplicateName: {} already exists", name)));
        }
        let cluster = self.insert_compute_resource(ManagedObjectType::ClusterComputeResource, folder, name);
        if let Some(node) = self.nodes.lock().unwrap().get_mut(&cluster) {
            helpers::apply_cluster_spec(&mut node.cluster_config, spec);
        }
        Ok(cluster)
    }

    async fn reconfigure_cluster(&self, cluster: &ObjectRef, spec: &ClusterConfigSpecEx) -> Result<ObjectRef, VSphereError> {
        self.record(
            "ReconfigureComputeResource_Task",
            cluster,
            serde_json::json!({ "spec": serde_json::to_value(spec)?, "modify": true }),
        );
        tasks::reconfigure_cluster(self, cluster, spec)
    }

    async fn cluster_configuration(&self, cluster: &ObjectRef) -> Result<ClusterConfigInfoEx, VSphereError> {
        Ok(self.node(cluster)?.cluster_config)
    }

    async fn add_standalone_host(&self, folder: &ObjectRef, spec: &HostConnectSpec, license: Option<&str>) -> Result<ObjectRef, VSphereError> {
        self.record(
            "AddStandaloneHost_Task",
            folder,
            serde_json::json!({ "spec": serde_json::to_value(spec)?, "addConnected": true, "license": license }),
        );
        tasks::add_host(self, folder, spec, false)
    }

    async fn add_cluster_host(&self, cluster: &ObjectRef, spec: &HostConnectSpec, license: Option<&str>) -> Result<ObjectRef, VSphereError> {
        self.record(
            "AddHost_Task",
            cluster,
            serde_json::json!({ "spec": serde_json::to_value(spec)?, "asConnected": true, "license": license }),
        );
        tasks::add_host(self, cluster, spec, true)
    }

    async fn create_resource_pool(&self, parent: &ObjectRef, name: &str, spec: &ResourceConfigSpec) -> Result<ObjectRef, VSphereError> {
        self.record(
            "CreateResourcePool",
            parent,
            serde_json::json!({ "name": name, "spec": serde_json::to_value(spec)? }),
        );
        if parent.kind != ManagedObjectType::ResourcePool {
            return Err(VSphereError::InvalidRequest(format!("{} is not a resource pool", parent)));
        }
        self.node(parent)?;
        if self.child_named(parent, name).is_some() {
            return Err(VSphereError::Api(format!("DuplicateName: {} already exists", name)));
        }
        Ok(self.add_resource_pool(parent, name, spec.clone()))
    }

    async fn update_resource_pool(&self, pool: &ObjectRef, spec: &ResourceConfigSpec) -> Result<(), VSphereError> {
        self.record(
            "UpdateConfig",
            pool,
            serde_json::json!({ "config": serde_json::to_value(spec)? }),
        );
        let mut nodes = self.nodes.lock().unwrap();
        let node = nodes
            .get_mut(pool)
            .ok_or_else(|| VSphereError::NotFound(format!("{} not found", pool)))?;
        node.pool_config.cpu_allocation.merge(&spec.cpu_allocation);
        node.pool_config.memory_allocation.merge(&spec.memory_allocation);
        Ok(())
    }

    async fn resource_pool_allocation(&self, pool: &ObjectRef, facet: AllocationFacet) -> Result<ResourceAllocationInfo, VSphereError> {
        let config = self.node(pool)?.pool_config;
        Ok(match facet {
            AllocationFacet::Cpu => config.cpu_allocation,
            AllocationFacet::Memory => config.memory_allocation,
        })
    }

    async fn destroy(&self, object: &ObjectRef) -> Result<ObjectRef, VSphereError> {
        self.record("Destroy_Task", object, serde_json::json!({}));
        tasks::destroy(self, object)
    }

    async fn task_info(&self, task: &ObjectRef) -> Result<TaskInfo, VSphereError> {
        tasks::task_info(self, task)
    }
}
