//! vSphere API models
//!
//! These models match the vim25 data objects as exposed by the VI/JSON API.
//! Only the properties the controller reads or writes are modelled.
//! See: https://developer.broadcom.com/xapis/virtual-infrastructure-json-api/latest/

use serde::{Deserialize, Serialize};
use std::fmt;

/// Managed object type names used by the controller
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ManagedObjectType {
    Folder,
    Datacenter,
    ComputeResource,
    ClusterComputeResource,
    HostSystem,
    ResourcePool,
    Task,
    /// Any type the controller does not manage (VirtualMachine, Datastore, ...)
    Other(String),
}

impl ManagedObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ManagedObjectType::Folder => "Folder",
            ManagedObjectType::Datacenter => "Datacenter",
            ManagedObjectType::ComputeResource => "ComputeResource",
            ManagedObjectType::ClusterComputeResource => "ClusterComputeResource",
            ManagedObjectType::HostSystem => "HostSystem",
            ManagedObjectType::ResourcePool => "ResourcePool",
            ManagedObjectType::Task => "Task",
            ManagedObjectType::Other(name) => name,
        }
    }
}

impl From<String> for ManagedObjectType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Folder" => ManagedObjectType::Folder,
            "Datacenter" => ManagedObjectType::Datacenter,
            "ComputeResource" => ManagedObjectType::ComputeResource,
            "ClusterComputeResource" => ManagedObjectType::ClusterComputeResource,
            "HostSystem" => ManagedObjectType::HostSystem,
            "ResourcePool" => ManagedObjectType::ResourcePool,
            "Task" => ManagedObjectType::Task,
            _ => ManagedObjectType::Other(value),
        }
    }
}

impl From<ManagedObjectType> for String {
    fn from(value: ManagedObjectType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ManagedObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ManagedObjectReference
///
/// The `value` is the opaque moid assigned by vCenter (e.g. `domain-c7`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    #[serde(rename = "type")]
    pub kind: ManagedObjectType,
    pub value: String,
}

impl ObjectRef {
    pub fn new(kind: ManagedObjectType, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// JSON form expected by VI/JSON request bodies
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "_typeName": "ManagedObjectReference",
            "type": self.kind.as_str(),
            "value": self.value,
        })
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

/// An inventory entry returned by a pattern lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryObject {
    pub reference: ObjectRef,
    pub name: String,
    pub inventory_path: String,
}

/// ServiceContent (subset)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceContent {
    pub root_folder: ObjectRef,
    pub session_manager: ObjectRef,
}

/// TaskInfoState
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Queued,
    Running,
    Success,
    Error,
}

/// TaskInfo (subset)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    pub key: String,
    pub state: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<LocalizedMethodFault>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

/// LocalizedMethodFault
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedMethodFault {
    pub fault: MethodFault,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localized_message: Option<String>,
}

impl LocalizedMethodFault {
    pub fn new(fault: MethodFault, localized_message: impl Into<String>) -> Self {
        Self {
            fault,
            localized_message: Some(localized_message.into()),
        }
    }
}

impl fmt::Display for LocalizedMethodFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.localized_message.as_deref() {
            Some(message) if !message.is_empty() => f.write_str(message),
            _ => write!(f, "task failed with fault {}", self.fault.type_name()),
        }
    }
}

/// SSLVerifyFault payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SslVerifyFault {
    pub thumbprint: String,
    pub self_signed: bool,
    pub host: Option<String>,
}

/// Platform faults the controller distinguishes
///
/// Every other fault is carried as `Other` with its vim25 type name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawMethodFault", into = "RawMethodFault")]
pub enum MethodFault {
    SslVerify(SslVerifyFault),
    DuplicateName { name: Option<String> },
    InvalidLogin,
    NotAuthenticated,
    HostConnect,
    AlreadyConnected { name: Option<String> },
    ResourceInUse,
    Other { type_name: String, fields: serde_json::Map<String, serde_json::Value> },
}

impl MethodFault {
    pub fn type_name(&self) -> &str {
        match self {
            MethodFault::SslVerify(_) => "SSLVerifyFault",
            MethodFault::DuplicateName { .. } => "DuplicateName",
            MethodFault::InvalidLogin => "InvalidLogin",
            MethodFault::NotAuthenticated => "NotAuthenticated",
            MethodFault::HostConnect => "HostConnectFault",
            MethodFault::AlreadyConnected { .. } => "AlreadyConnected",
            MethodFault::ResourceInUse => "ResourceInUse",
            MethodFault::Other { type_name, .. } => type_name,
        }
    }
}

/// Wire form of a fault: `_typeName` plus the fault's own properties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMethodFault {
    #[serde(rename = "_typeName")]
    pub type_name: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl RawMethodFault {
    fn string_field(&self, key: &str) -> Option<String> {
        self.fields.get(key).and_then(|v| v.as_str()).map(str::to_string)
    }
}

impl From<RawMethodFault> for MethodFault {
    fn from(raw: RawMethodFault) -> Self {
        match raw.type_name.as_str() {
            "SSLVerifyFault" => MethodFault::SslVerify(SslVerifyFault {
                thumbprint: raw.string_field("thumbprint").unwrap_or_default(),
                self_signed: raw
                    .fields
                    .get("selfSigned")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false),
                host: raw.string_field("host"),
            }),
            "DuplicateName" => MethodFault::DuplicateName {
                name: raw.string_field("name"),
            },
            "InvalidLogin" => MethodFault::InvalidLogin,
            "NotAuthenticated" => MethodFault::NotAuthenticated,
            "HostConnectFault" => MethodFault::HostConnect,
            "AlreadyConnected" => MethodFault::AlreadyConnected {
                name: raw.string_field("name"),
            },
            "ResourceInUse" => MethodFault::ResourceInUse,
            _ => MethodFault::Other {
                type_name: raw.type_name,
                fields: raw.fields,
            },
        }
    }
}

impl From<MethodFault> for RawMethodFault {
    fn from(fault: MethodFault) -> Self {
        let type_name = fault.type_name().to_string();
        let mut fields = serde_json::Map::new();
        match fault {
            MethodFault::SslVerify(f) => {
                fields.insert("thumbprint".into(), f.thumbprint.into());
                fields.insert("selfSigned".into(), f.self_signed.into());
                if let Some(host) = f.host {
                    fields.insert("host".into(), host.into());
                }
            }
            MethodFault::DuplicateName { name } | MethodFault::AlreadyConnected { name } => {
                if let Some(name) = name {
                    fields.insert("name".into(), name.into());
                }
            }
            MethodFault::Other { fields: other, .. } => fields = other,
            MethodFault::InvalidLogin
            | MethodFault::NotAuthenticated
            | MethodFault::HostConnect
            | MethodFault::ResourceInUse => {}
        }
        RawMethodFault { type_name, fields }
    }
}

/// DrsBehavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DrsBehavior {
    Manual,
    PartiallyAutomated,
    FullyAutomated,
}

impl DrsBehavior {
    pub fn as_str(self) -> &'static str {
        match self {
            DrsBehavior::Manual => "manual",
            DrsBehavior::PartiallyAutomated => "partiallyAutomated",
            DrsBehavior::FullyAutomated => "fullyAutomated",
        }
    }
}

/// ClusterDasConfigInfoVmMonitoringState
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VmMonitoringState {
    VmMonitoringDisabled,
    VmMonitoringOnly,
    VmAndAppMonitoring,
}

impl VmMonitoringState {
    pub fn as_str(self) -> &'static str {
        match self {
            VmMonitoringState::VmMonitoringDisabled => "vmMonitoringDisabled",
            VmMonitoringState::VmMonitoringOnly => "vmMonitoringOnly",
            VmMonitoringState::VmAndAppMonitoring => "vmAndAppMonitoring",
        }
    }
}

/// ClusterDasConfigInfoServiceState
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostMonitoringState {
    Enabled,
    Disabled,
}

impl HostMonitoringState {
    pub fn as_str(self) -> &'static str {
        match self {
            HostMonitoringState::Enabled => "enabled",
            HostMonitoringState::Disabled => "disabled",
        }
    }
}

/// ClusterDrsConfigInfo
///
/// Unset properties are omitted from requests; with `modify = true` vCenter
/// leaves them unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDrsConfigInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_vm_behavior_overrides: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_vm_behavior: Option<DrsBehavior>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vmotion_rate: Option<i32>,
}

/// ClusterDasConfigInfo
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDasConfigInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_monitoring: Option<VmMonitoringState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_monitoring: Option<HostMonitoringState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission_control_enabled: Option<bool>,
}

/// ClusterConfigInfoEx (subset, read form)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfigInfoEx {
    #[serde(default)]
    pub drs_config: ClusterDrsConfigInfo,
    #[serde(default)]
    pub das_config: ClusterDasConfigInfo,
}

/// ClusterConfigSpecEx (subset, write form)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfigSpecEx {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drs_config: Option<ClusterDrsConfigInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub das_config: Option<ClusterDasConfigInfo>,
}

impl ClusterConfigSpecEx {
    pub fn is_empty(&self) -> bool {
        self.drs_config.is_none() && self.das_config.is_none()
    }
}

/// SharesLevel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SharesLevel {
    Low,
    Normal,
    High,
    Custom,
}

impl SharesLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            SharesLevel::Low => "low",
            SharesLevel::Normal => "normal",
            SharesLevel::High => "high",
            SharesLevel::Custom => "custom",
        }
    }
}

/// SharesInfo
///
/// `shares` is only meaningful for the custom level; vCenter computes it for
/// the named levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharesInfo {
    pub level: SharesLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares: Option<i32>,
}

/// Limit value vCenter uses for "unlimited"
pub const UNLIMITED: i64 = -1;

/// ResourceAllocationInfo
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAllocationInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expandable_reservation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares: Option<SharesInfo>,
}

impl ResourceAllocationInfo {
    /// Allocation vCenter assigns to a new resource pool when nothing is specified
    pub fn new_pool_default() -> Self {
        Self {
            reservation: Some(0),
            expandable_reservation: Some(true),
            limit: Some(UNLIMITED),
            shares: Some(SharesInfo {
                level: SharesLevel::Normal,
                shares: None,
            }),
        }
    }

    /// Fill every unset property from `defaults`
    pub fn or_defaults(mut self, defaults: &ResourceAllocationInfo) -> Self {
        if self.reservation.is_none() {
            self.reservation = defaults.reservation;
        }
        if self.expandable_reservation.is_none() {
            self.expandable_reservation = defaults.expandable_reservation;
        }
        if self.limit.is_none() {
            self.limit = defaults.limit;
        }
        if self.shares.is_none() {
            self.shares = defaults.shares.clone();
        }
        self
    }

    /// Apply the set properties of `update` on top of `self`
    pub fn merge(&mut self, update: &ResourceAllocationInfo) {
        if update.reservation.is_some() {
            self.reservation = update.reservation;
        }
        if update.expandable_reservation.is_some() {
            self.expandable_reservation = update.expandable_reservation;
        }
        if update.limit.is_some() {
            self.limit = update.limit;
        }
        if update.shares.is_some() {
            self.shares = update.shares.clone();
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == ResourceAllocationInfo::default()
    }
}

/// ResourceConfigSpec (subset)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceConfigSpec {
    pub cpu_allocation: ResourceAllocationInfo,
    pub memory_allocation: ResourceAllocationInfo,
}

/// Which allocation facet of a resource pool to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocationFacet {
    Cpu,
    Memory,
}

impl AllocationFacet {
    pub fn as_str(self) -> &'static str {
        match self {
            AllocationFacet::Cpu => "cpu",
            AllocationFacet::Memory => "memory",
        }
    }
}

/// HostConnectSpec (subset)
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConnectSpec {
    pub host_name: String,
    pub user_name: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_thumbprint: Option<String>,
    pub force: bool,
}

impl HostConnectSpec {
    /// Copy of this spec with the given certificate thumbprint pinned
    pub fn with_thumbprint(&self, thumbprint: impl Into<String>) -> Self {
        Self {
            ssl_thumbprint: Some(thumbprint.into()),
            ..self.clone()
        }
    }
}

impl fmt::Debug for HostConnectSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostConnectSpec")
            .field("host_name", &self.host_name)
            .field("user_name", &self.user_name)
            .field("password", &"<redacted>")
            .field("ssl_thumbprint", &self.ssl_thumbprint)
            .field("force", &self.force)
            .finish()
    }
}
