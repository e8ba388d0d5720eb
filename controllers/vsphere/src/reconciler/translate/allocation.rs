//! Resource pool CPU and memory allocation facets

use super::section_drifted;
use crate::error::ControllerError;
use crds::AllocationSection;
use vsphere_client::{ResourceAllocationInfo, SharesInfo, SharesLevel, UNLIMITED};

/// `low`, `normal`, `high` or a non-negative custom share count
pub fn parse_shares(value: &str) -> Result<SharesInfo, ControllerError> {
    let level = match value {
        "low" => SharesLevel::Low,
        "normal" => SharesLevel::Normal,
        "high" => SharesLevel::High,
        custom => {
            let shares = custom.parse::<i32>().ok().filter(|n| *n >= 0).ok_or_else(|| {
                ControllerError::Validation(format!(
                    "shares '{}' must be low, normal, high or a non-negative integer",
                    custom
                ))
            })?;
            return Ok(SharesInfo {
                level: SharesLevel::Custom,
                shares: Some(shares),
            });
        }
    };
    Ok(SharesInfo { level, shares: None })
}

fn non_negative(field: &str, value: Option<i64>) -> Result<Option<i64>, ControllerError> {
    match value {
        Some(v) if v < 0 => Err(ControllerError::Validation(format!(
            "{} must be non-negative, got {}",
            field, v
        ))),
        other => Ok(other),
    }
}

/// Declared section -> allocation carrying only the declared fields
///
/// A declared limit of 0 means unlimited.
pub fn to_remote(section: &AllocationSection) -> Result<ResourceAllocationInfo, ControllerError> {
    let limit = non_negative("limit", section.limit)?.map(|l| if l == 0 { UNLIMITED } else { l });
    Ok(ResourceAllocationInfo {
        reservation: non_negative("reservation", section.reservation)?,
        expandable_reservation: section.expandable_reservation,
        limit,
        shares: section.shares.as_deref().map(parse_shares).transpose()?,
    })
}

/// Allocation -> the single section it always reads back as
pub fn from_remote(allocation: &ResourceAllocationInfo) -> Vec<AllocationSection> {
    let shares = allocation.shares.as_ref().map(|shares| match shares.level {
        SharesLevel::Custom => shares.shares.unwrap_or_default().to_string(),
        level => level.as_str().to_string(),
    });
    vec![AllocationSection {
        shares,
        reservation: allocation.reservation,
        limit: allocation.limit.map(|l| if l == UNLIMITED { 0 } else { l }),
        expandable_reservation: allocation.expandable_reservation,
    }]
}

pub fn drifted(declared: &AllocationSection, observed: Option<&AllocationSection>) -> bool {
    let Some(observed) = observed else {
        return true;
    };
    section_drifted(&[(declared.shares.clone(), observed.shares.clone())])
        || section_drifted(&[
            (declared.reservation, observed.reservation),
            (declared.limit, observed.limit),
        ])
        || section_drifted(&[(declared.expandable_reservation, observed.expandable_reservation)])
}
