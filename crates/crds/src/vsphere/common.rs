//! Types shared by the vSphere CRDs
//!
//! Configuration sections are declared as lists so that "absent" (empty list)
//! and "owned" (one entry) are distinct. More than one entry is rejected by
//! the controller before any vCenter call.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Resource reconciliation state
///
/// Serializes as PascalCase ("Created", "Failed", etc.) and also accepts
/// lowercase values on read.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub enum ResourceState {
    #[default]
    #[serde(alias = "pending")]
    Pending,
    #[serde(alias = "created")]
    Created,
    #[serde(alias = "updated")]
    Updated,
    #[serde(alias = "failed")]
    Failed,
}

/// DRS settings of a cluster
///
/// Declaring the section enables DRS; omitted fields are left as vCenter has them.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DrsSection {
    /// Allow per-VM automation level overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_vm_automation_override: Option<bool>,

    /// manual, partiallyAutomated or fullyAutomated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_automation_level: Option<String>,

    /// vMotion migration threshold (1 most conservative, 5 most aggressive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migration_threshold: Option<i32>,
}

/// vSphere HA settings of a cluster
///
/// Declaring the section enables HA; omitted fields are left as vCenter has them.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HaSection {
    /// enabled or disabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_monitoring: Option<String>,

    /// vmMonitoringDisabled, vmMonitoringOnly or vmAndAppMonitoring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_monitoring: Option<String>,

    /// Enforce failover capacity when powering on VMs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission_control_enabled: Option<bool>,
}

/// CPU or memory allocation of a resource pool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSection {
    /// low, normal, high, or a custom share count such as "40960"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares: Option<String>,

    /// Guaranteed amount (MHz for CPU, MB for memory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation: Option<i64>,

    /// Upper bound (MHz for CPU, MB for memory); 0 means unlimited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,

    /// Allow borrowing reservation from the parent pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expandable_reservation: Option<bool>,
}
