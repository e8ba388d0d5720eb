//! Cluster DRS facet

use super::section_drifted;
use crate::error::ControllerError;
use crds::DrsSection;
use vsphere_client::{ClusterDrsConfigInfo, DrsBehavior};

pub fn parse_automation_level(value: &str) -> Result<DrsBehavior, ControllerError> {
    match value {
        "manual" => Ok(DrsBehavior::Manual),
        "partiallyAutomated" => Ok(DrsBehavior::PartiallyAutomated),
        "fullyAutomated" => Ok(DrsBehavior::FullyAutomated),
        other => Err(ControllerError::Validation(format!(
            "drs.defaultAutomationLevel '{}' must be one of manual, partiallyAutomated, fullyAutomated",
            other
        ))),
    }
}

/// Declared section -> DRS config with `enabled = true`
pub fn to_remote(section: &DrsSection) -> Result<ClusterDrsConfigInfo, ControllerError> {
    Ok(ClusterDrsConfigInfo {
        enabled: Some(true),
        enable_vm_behavior_overrides: section.enable_vm_automation_override,
        default_vm_behavior: section
            .default_automation_level
            .as_deref()
            .map(parse_automation_level)
            .transpose()?,
        vmotion_rate: section.migration_threshold,
    })
}

/// DRS config -> one section when enabled, none when disabled
pub fn from_remote(config: &ClusterDrsConfigInfo) -> Vec<DrsSection> {
    if config.enabled != Some(true) {
        return Vec::new();
    }
    vec![DrsSection {
        enable_vm_automation_override: config.enable_vm_behavior_overrides,
        default_automation_level: config.default_vm_behavior.map(|b| b.as_str().to_string()),
        migration_threshold: config.vmotion_rate,
    }]
}

pub fn drifted(declared: &DrsSection, observed: Option<&DrsSection>) -> bool {
    let Some(observed) = observed else {
        return true;
    };
    section_drifted(&[
        (declared.enable_vm_automation_override, observed.enable_vm_automation_override),
    ]) || section_drifted(&[
        (declared.default_automation_level.clone(), observed.default_automation_level.clone()),
    ]) || section_drifted(&[(declared.migration_threshold, observed.migration_threshold)])
}
