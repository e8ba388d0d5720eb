//! VSphereDatacenter Custom Resource Definition
//!
//! Defines a Kubernetes CRD for managing vCenter datacenters.

use super::common::ResourceState;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// VSphereDatacenterSpec defines the desired state of a datacenter
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "vsphere.microscaler.io",
    version = "v1alpha1",
    kind = "VSphereDatacenter",
    namespaced,
    status = "VSphereDatacenterStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct VSphereDatacenterSpec {
    /// Datacenter name (created under the root folder)
    pub name: String,

    /// Leave the datacenter in vCenter when this resource is deleted
    #[serde(default)]
    pub keep: bool,
}

/// VSphereDatacenterStatus defines the observed state of a datacenter
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VSphereDatacenterStatus {
    /// vCenter managed object id (set after creation)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,

    /// Inventory path the datacenter was resolved at
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_path: Option<String>,

    /// Current state of the datacenter
    #[serde(default)]
    pub state: ResourceState,

    /// Error message if reconciliation failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Last reconciliation timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reconciled: Option<chrono::DateTime<chrono::Utc>>,
}
