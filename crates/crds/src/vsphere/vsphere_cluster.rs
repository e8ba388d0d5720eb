//! VSphereCluster Custom Resource Definition
//!
//! Defines a Kubernetes CRD for managing vCenter clusters and their DRS/HA settings.

use super::common::{DrsSection, HaSection, ResourceState};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// VSphereClusterSpec defines the desired state of a cluster
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "vsphere.microscaler.io",
    version = "v1alpha1",
    kind = "VSphereCluster",
    namespaced,
    status = "VSphereClusterStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct VSphereClusterSpec {
    /// Cluster name
    pub name: String,

    /// Name of the datacenter holding the cluster
    pub datacenter_id: String,

    /// DRS settings (at most one entry; none leaves DRS untouched)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drs: Vec<DrsSection>,

    /// HA settings (at most one entry; none leaves HA untouched)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ha: Vec<HaSection>,

    /// Leave the cluster in vCenter when this resource is deleted
    #[serde(default)]
    pub keep: bool,
}

/// VSphereClusterStatus defines the observed state of a cluster
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VSphereClusterStatus {
    /// vCenter managed object id (set after creation)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,

    /// Inventory path the cluster was resolved at
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_path: Option<String>,

    /// DRS settings as read back from vCenter (empty when DRS is disabled)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drs: Vec<DrsSection>,

    /// HA settings as read back from vCenter (empty when HA is disabled)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ha: Vec<HaSection>,

    /// Current state of the cluster
    #[serde(default)]
    pub state: ResourceState,

    /// Error message if reconciliation failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Last reconciliation timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reconciled: Option<chrono::DateTime<chrono::Utc>>,
}
