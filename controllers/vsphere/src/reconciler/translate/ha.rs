//! Cluster HA facet

use super::section_drifted;
use crate::error::ControllerError;
use crds::HaSection;
use vsphere_client::{ClusterDasConfigInfo, HostMonitoringState, VmMonitoringState};

pub fn parse_host_monitoring(value: &str) -> Result<HostMonitoringState, ControllerError> {
    match value {
        "enabled" => Ok(HostMonitoringState::Enabled),
        "disabled" => Ok(HostMonitoringState::Disabled),
        other => Err(ControllerError::Validation(format!(
            "ha.hostMonitoring '{}' must be enabled or disabled",
            other
        ))),
    }
}

pub fn parse_vm_monitoring(value: &str) -> Result<VmMonitoringState, ControllerError> {
    match value {
        "vmMonitoringDisabled" => Ok(VmMonitoringState::VmMonitoringDisabled),
        "vmMonitoringOnly" => Ok(VmMonitoringState::VmMonitoringOnly),
        "vmAndAppMonitoring" => Ok(VmMonitoringState::VmAndAppMonitoring),
        other => Err(ControllerError::Validation(format!(
            "ha.vmMonitoring '{}' must be one of vmMonitoringDisabled, vmMonitoringOnly, vmAndAppMonitoring",
            other
        ))),
    }
}

/// Declared section -> HA config with `enabled = true`
pub fn to_remote(section: &HaSection) -> Result<ClusterDasConfigInfo, ControllerError> {
    Ok(ClusterDasConfigInfo {
        enabled: Some(true),
        vm_monitoring: section.vm_monitoring.as_deref().map(parse_vm_monitoring).transpose()?,
        host_monitoring: section.host_monitoring.as_deref().map(parse_host_monitoring).transpose()?,
        admission_control_enabled: section.admission_control_enabled,
    })
}

/// HA config -> one section when enabled, none when disabled
pub fn from_remote(config: &ClusterDasConfigInfo) -> Vec<HaSection> {
    if config.enabled != Some(true) {
        return Vec::new();
    }
    vec![HaSection {
        host_monitoring: config.host_monitoring.map(|s| s.as_str().to_string()),
        vm_monitoring: config.vm_monitoring.map(|s| s.as_str().to_string()),
        admission_control_enabled: config.admission_control_enabled,
    }]
}

pub fn drifted(declared: &HaSection, observed: Option<&HaSection>) -> bool {
    let Some(observed) = observed else {
        return true;
    };
    section_drifted(&[
        (declared.host_monitoring.clone(), observed.host_monitoring.clone()),
        (declared.vm_monitoring.clone(), observed.vm_monitoring.clone()),
    ]) || section_drifted(&[(declared.admission_control_enabled, observed.admission_control_enabled)])
}
