//! VSphereHost Custom Resource Definition
//!
//! Defines a Kubernetes CRD for ESXi hosts, standalone or joined to a cluster.

use super::common::ResourceState;
use crate::references::SecretKeyReference;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// VSphereHostSpec defines the desired state of an ESXi host
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "vsphere.microscaler.io",
    version = "v1alpha1",
    kind = "VSphereHost",
    namespaced,
    status = "VSphereHostStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct VSphereHostSpec {
    /// Host name or address vCenter connects to
    pub host: String,

    /// Datacenter name (defaults to the only datacenter in the inventory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datacenter_id: Option<String>,

    /// Cluster to join; the host is added standalone when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,

    /// Administrative account on the host
    pub user: String,

    /// Secret key holding the account password
    pub password_secret_ref: SecretKeyReference,

    /// License key assigned on connect
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    /// Trust the certificate the host presents on first connect
    #[serde(default)]
    pub ssl_no_verify: bool,

    /// Leave the host in vCenter when this resource is deleted
    #[serde(default)]
    pub keep: bool,
}

/// VSphereHostStatus defines the observed state of an ESXi host
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VSphereHostStatus {
    /// vCenter managed object id of the HostSystem (set after connect)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,

    /// Inventory path the host was resolved at
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_path: Option<String>,

    /// Current state of the host
    #[serde(default)]
    pub state: ResourceState,

    /// Error message if reconciliation failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Last reconciliation timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reconciled: Option<chrono::DateTime<chrono::Utc>>,
}
