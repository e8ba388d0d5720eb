//! Declared configuration sections <-> vCenter configuration objects
//!
//! Declared sections are sparse: a missing section leaves the facet alone,
//! a present section owns it and only carries the fields the user set.
//! Everything here is pure; validation runs before any vCenter call.

pub mod allocation;
pub mod drs;
pub mod ha;

use crate::error::ControllerError;
use crds::{VSphereClusterSpec, VSphereResourcePoolSpec};
use vsphere_client::{ClusterConfigSpecEx, ResourceAllocationInfo, ResourceConfigSpec};


/// The declared section of a facet, if any
///
/// More than one section for one facet is a validation error.
pub fn single_section<'a, T>(facet: &str, sections: &'a [T]) -> Result<Option<&'a T>, ControllerError> {
    match sections {
        [] => Ok(None),
        [section] => Ok(Some(section)),
        _ => Err(ControllerError::Validation(format!(
            "at most one {} section may be declared, found {}",
            facet,
            sections.len()
        ))),
    }
}

/// Reconfigure payload for a cluster's declared DRS and HA sections
pub fn cluster_config_spec(spec: &VSphereClusterSpec) -> Result<ClusterConfigSpecEx, ControllerError> {
    let drs = single_section("drs", &spec.drs)?;
    let ha = single_section("ha", &spec.ha)?;
    Ok(ClusterConfigSpecEx {
        drs_config: drs.map(drs::to_remote).transpose()?,
        das_config: ha.map(ha::to_remote).transpose()?,
    })
}

/// Update payload for a resource pool; undeclared facets are sent empty
pub fn pool_update_spec(spec: &VSphereResourcePoolSpec) -> Result<ResourceConfigSpec, ControllerError> {
    let cpu = single_section("cpu", &spec.cpu)?;
    let memory = single_section("memory", &spec.memory)?;
    Ok(ResourceConfigSpec {
        cpu_allocation: cpu.map(allocation::to_remote).transpose()?.unwrap_or_default(),
        memory_allocation: memory.map(allocation::to_remote).transpose()?.unwrap_or_default(),
    })
}

/// Create payload for a resource pool: declared fields over new-pool defaults
pub fn pool_create_spec(spec: &VSphereResourcePoolSpec) -> Result<ResourceConfigSpec, ControllerError> {
    let update = pool_update_spec(spec)?;
    let defaults = ResourceAllocationInfo::new_pool_default();
    Ok(ResourceConfigSpec {
        cpu_allocation: update.cpu_allocation.or_defaults(&defaults),
        memory_allocation: update.memory_allocation.or_defaults(&defaults),
    })
}

/// Whether the declared section differs from what vCenter reports
///
/// `fields` pairs each declared value with its observed counterpart; an
/// undeclared field never counts as drift.
pub(crate) fn section_drifted<T: PartialEq>(fields: &[(Option<T>, Option<T>)]) -> bool {
    fields
        .iter()
        .any(|(declared, observed)| declared.is_some() && declared != observed)
}
