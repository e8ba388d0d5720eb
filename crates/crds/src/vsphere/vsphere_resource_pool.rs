//! VSphereResourcePool Custom Resource Definition
//!
//! Defines a Kubernetes CRD for managing resource pools and their CPU/memory allocation.

use super::common::{AllocationSection, ResourceState};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// VSphereResourcePoolSpec defines the desired state of a resource pool
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "vsphere.microscaler.io",
    version = "v1alpha1",
    kind = "VSphereResourcePool",
    namespaced,
    status = "VSphereResourcePoolStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct VSphereResourcePoolSpec {
    /// Resource pool name
    pub name: String,

    /// Datacenter name (defaults to the only datacenter in the inventory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datacenter_id: Option<String>,

    /// Name of the cluster or standalone host whose root pool holds the pool
    pub parent_id: String,

    /// CPU allocation (at most one entry)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cpu: Vec<AllocationSection>,

    /// Memory allocation (at most one entry)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub memory: Vec<AllocationSection>,

    /// Leave the pool in vCenter when this resource is deleted
    #[serde(default)]
    pub keep: bool,
}

/// VSphereResourcePoolStatus defines the observed state of a resource pool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VSphereResourcePoolStatus {
    /// vCenter managed object id (set after creation)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,

    /// Inventory path the pool was resolved at
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_path: Option<String>,

    /// CPU allocation as read back from vCenter
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cpu: Vec<AllocationSection>,

    /// Memory allocation as read back from vCenter
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub memory: Vec<AllocationSection>,

    /// Current state of the pool
    #[serde(default)]
    pub state: ResourceState,

    /// Error message if reconciliation failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Last reconciliation timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reconciled: Option<chrono::DateTime<chrono::Utc>>,
}
