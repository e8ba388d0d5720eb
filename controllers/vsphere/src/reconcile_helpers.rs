//! Helper functions for common reconciliation patterns
//!
//! Every kind goes through the same two shapes: resolve-or-create on apply,
//! and resolve-or-forget on read.

use crate::error::ControllerError;
use std::future::Future;
use tracing::{debug, error, info, warn};

/// Resolve an object, creating it only when the lookup says it does not exist
///
/// Any other resolution error (ambiguous match, path mismatch, transport)
/// is returned as is and nothing gets created.
///
/// Returns the object and whether it was created by this call.
pub async fn find_or_create<T, FResolve, FCreate, ResolveFut, CreateFut>(
    kind: &str,
    name: &str,
    resolve: FResolve,
    create: FCreate,
) -> Result<(T, bool), ControllerError>
where
    FResolve: FnOnce() -> ResolveFut,
    FCreate: FnOnce() -> CreateFut,
    ResolveFut: Future<Output = Result<T, ControllerError>>,
    CreateFut: Future<Output = Result<T, ControllerError>>,
{
    match resolve().await {
        Ok(existing) => {
            info!("{} {} already exists in vCenter, adopting it", kind, name);
            Ok((existing, false))
        }
        Err(e) if e.is_not_found() => {
            info!("{} {} not found in vCenter, creating", kind, name);
            match create().await {
                Ok(created) => {
                    info!("Created {} {} in vCenter", kind, name);
                    Ok((created, true))
                }
                Err(e) => {
                    error!("Failed to create {} {} in vCenter: {}", kind, name, e);
                    Err(e)
                }
            }
        }
        Err(e) => {
            error!("Failed to look up {} {}: {}", kind, name, e);
            Err(e)
        }
    }
}

/// Re-resolve an object recorded by an earlier pass
///
/// Returns:
/// - `Ok(Some(resource))` if the object still exists
/// - `Ok(None)` if it was removed from vCenter (drift detected)
/// - `Err(e)` for any other error, which should be retried
pub async fn check_existing<FGet, Resource>(
    kind: &str,
    name: &str,
    get_fn: FGet,
) -> Result<Option<Resource>, ControllerError>
where
    FGet: Future<Output = Result<Resource, ControllerError>>,
{
    match get_fn.await {
        Ok(existing) => {
            debug!("{} {} exists in vCenter", kind, name);
            Ok(Some(existing))
        }
        Err(e) if e.is_not_found() => {
            warn!("{} {} was removed from vCenter (drift detected), will recreate", kind, name);
            Ok(None)
        }
        Err(e) => {
            error!("Failed to verify {} {} exists: {}, will retry", kind, name, e);
            Err(e)
        }
    }
}
