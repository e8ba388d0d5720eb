//! Helper functions for building mock objects and faults

use crate::models::*;

/// Moid prefix vCenter uses for each managed object type
pub(crate) fn moid_prefix(kind: &ManagedObjectType) -> &'static str {
    match kind {
        ManagedObjectType::Folder => "group-",
        ManagedObjectType::Datacenter => "datacenter-",
        ManagedObjectType::ClusterComputeResource => "domain-c",
        ManagedObjectType::ComputeResource => "domain-s",
        ManagedObjectType::HostSystem => "host-",
        ManagedObjectType::ResourcePool => "resgroup-",
        ManagedObjectType::Task => "task-",
        ManagedObjectType::Other(_) => "obj-",
    }
}

/// The `SSLVerifyFault` vCenter reports for an untrusted host certificate
pub fn ssl_verify_fault(host: &str, thumbprint: &str) -> LocalizedMethodFault {
    LocalizedMethodFault::new(
        MethodFault::SslVerify(SslVerifyFault {
            thumbprint: thumbprint.to_string(),
            self_signed: true,
            host: Some(host.to_string()),
        }),
        format!(
            "Authenticity of the host's SSL certificate is not verified. Thumbprint: {}",
            thumbprint
        ),
    )
}

/// A generic fault of the given vim25 type
pub fn fault(type_name: &str, message: &str) -> LocalizedMethodFault {
    let raw = RawMethodFault {
        type_name: type_name.to_string(),
        fields: serde_json::Map::new(),
    };
    LocalizedMethodFault::new(MethodFault::from(raw), message)
}

/// Apply the set properties of a cluster spec on top of a live configuration
pub(crate) fn apply_cluster_spec(config: &mut ClusterConfigInfoEx, spec: &ClusterConfigSpecEx) {
    if let Some(drs) = &spec.drs_config {
        let current = &mut config.drs_config;
        if drs.enabled.is_some() {
            current.enabled = drs.enabled;
        }
        if drs.enable_vm_behavior_overrides.is_some() {
            current.enable_vm_behavior_overrides = drs.enable_vm_behavior_overrides;
        }
        if drs.default_vm_behavior.is_some() {
            current.default_vm_behavior = drs.default_vm_behavior;
        }
        if drs.vmotion_rate.is_some() {
            current.vmotion_rate = drs.vmotion_rate;
        }
    }
    if let Some(das) = &spec.das_config {
        let current = &mut config.das_config;
        if das.enabled.is_some() {
            current.enabled = das.enabled;
        }
        if das.vm_monitoring.is_some() {
            current.vm_monitoring = das.vm_monitoring;
        }
        if das.host_monitoring.is_some() {
            current.host_monitoring = das.host_monitoring;
        }
        if das.admission_control_enabled.is_some() {
            current.admission_control_enabled = das.admission_control_enabled;
        }
    }
}

/// Configuration of a freshly created cluster: both services off, platform defaults otherwise
pub(crate) fn new_cluster_config() -> ClusterConfigInfoEx {
    ClusterConfigInfoEx {
        drs_config: ClusterDrsConfigInfo {
            enabled: Some(false),
            enable_vm_behavior_overrides: Some(true),
            default_vm_behavior: Some(DrsBehavior::FullyAutomated),
            vmotion_rate: Some(3),
        },
        das_config: ClusterDasConfigInfo {
            enabled: Some(false),
            vm_monitoring: Some(VmMonitoringState::VmMonitoringDisabled),
            host_monitoring: Some(HostMonitoringState::Enabled),
            admission_control_enabled: Some(true),
        },
    }
}

/// Root pool configuration of a compute resource
pub(crate) fn root_pool_config() -> ResourceConfigSpec {
    ResourceConfigSpec {
        cpu_allocation: ResourceAllocationInfo::new_pool_default(),
        memory_allocation: ResourceAllocationInfo::new_pool_default(),
    }
}
