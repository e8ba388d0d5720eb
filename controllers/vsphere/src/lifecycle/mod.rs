//! Kubernetes lifecycle binding
//!
//! Maps finalizer events onto the reconciliation engine:
//! - Apply without a recorded object id creates (or adopts) the object
//! - Apply with an object id reads it back, updates on drift, or resets to
//!   Pending when the object is gone from vCenter
//! - Cleanup deletes the object unless it is retained
//!
//! Status is only patched when it changed, so status writes do not feed
//! back into the watch loop.

mod resources;

#[cfg(test)]
mod lifecycle_test;

use crate::backoff::FibonacciBackoff;
use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use chrono::Utc;
use crds::ResourceState;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, Resource, ResourceExt};
use kube_runtime::controller::Action;
use kube_runtime::finalizer::{finalizer, Error as FinalizerError, Event};
use k8s_openapi::NamespaceResourceScope;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Finalizer guarding vCenter objects owned by a resource
pub const FINALIZER: &str = "vsphere.microscaler.io/finalizer";

/// Periodic re-read of live objects to pick up out-of-band drift
pub const RESYNC_INTERVAL: Duration = Duration::from_secs(300);

/// Requeue after an object was found missing, so the next pass recreates it
pub const PENDING_REQUEUE: Duration = Duration::from_secs(5);

const REMOVED_MESSAGE: &str = "Object was removed from vCenter, will recreate";

/// Backoff state for a resource
#[derive(Debug, Clone)]
struct BackoffState {
    backoff: FibonacciBackoff,
    error_count: u32,
}

impl BackoffState {
    fn new() -> Self {
        Self {
            backoff: FibonacciBackoff::new(1, 10), // 1 minute min, 10 minutes max
            error_count: 0,
        }
    }
}

/// Shared state of all watchers
pub struct Context {
    pub reconciler: Reconciler,
    pub kube_client: Client,
    /// Error count tracking per resource (namespace/name -> BackoffState)
    backoff_states: Mutex<HashMap<String, BackoffState>>,
}

impl Context {
    pub fn new(reconciler: Reconciler, kube_client: Client) -> Self {
        Self {
            reconciler,
            kube_client,
            backoff_states: Mutex::new(HashMap::new()),
        }
    }

    /// Next backoff delay for a failing resource, and its error count so far
    pub fn backoff_for_resource(&self, resource_key: &str) -> (Duration, u32) {
        match self.backoff_states.lock() {
            Ok(mut states) => {
                let state = states
                    .entry(resource_key.to_string())
                    .or_insert_with(BackoffState::new);
                (state.backoff.next_backoff(), state.error_count)
            }
            Err(e) => {
                warn!("Failed to lock backoff_states: {}, using default backoff", e);
                (Duration::from_secs(60), 0)
            }
        }
    }

    pub fn increment_error(&self, resource_key: &str) {
        if let Ok(mut states) = self.backoff_states.lock() {
            states
                .entry(resource_key.to_string())
                .or_insert_with(BackoffState::new)
                .error_count += 1;
        }
    }

    /// Forget the failure history of a resource (on successful reconciliation)
    pub fn reset_error(&self, resource_key: &str) {
        if let Ok(mut states) = self.backoff_states.lock() {
            states.remove(resource_key);
        }
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("reconciler", &self.reconciler)
            .finish_non_exhaustive()
    }
}

/// A CRD whose spec is reconciled into one vCenter object
#[async_trait::async_trait]
pub trait VSphereResource:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Status subresource type
    type Status: Serialize + Send + Sync;
    /// What one read of the vCenter object yields
    type Observed: Send + Sync;

    const KIND: &'static str;

    fn current_status(&self) -> Option<&Self::Status>;
    fn recorded_object_id(&self) -> Option<&str>;
    fn recorded_state(&self) -> Option<&ResourceState>;

    async fn create(&self, ctx: &Context) -> Result<Self::Observed, ControllerError>;
    async fn read(&self, ctx: &Context) -> Result<Option<Self::Observed>, ControllerError>;
    async fn delete(&self, ctx: &Context) -> Result<(), ControllerError>;

    /// Reject an invalid declaration before any vCenter call
    fn validate(&self) -> Result<(), ControllerError> {
        Ok(())
    }

    /// Whether a declared field differs from the object as read
    fn drifted(&self, _observed: &Self::Observed) -> bool {
        false
    }

    /// Push declared settings to an existing object
    async fn update(&self, ctx: &Context) -> Result<Self::Observed, ControllerError> {
        self.create(ctx).await
    }

    /// Status for an observed object (`None` clears the recorded identity)
    fn status_for(observed: Option<&Self::Observed>, state: ResourceState, error: Option<String>) -> Self::Status;
}

/// namespace/name key of a resource
pub fn resource_key<K: Resource>(obj: &K) -> String {
    format!("{}/{}", obj.namespace().unwrap_or_default(), obj.name_any())
}

/// Reconcile entry point handed to `kube_runtime::Controller`
pub async fn reconcile<K: VSphereResource>(obj: Arc<K>, ctx: Arc<Context>) -> Result<Action, ControllerError> {
    let namespace = obj.namespace().unwrap_or_default();
    let api: Api<K> = Api::namespaced(ctx.kube_client.clone(), &namespace);

    finalizer(&api, FINALIZER, obj, |event| async {
        match event {
            Event::Apply(obj) => apply(&api, obj, &ctx).await,
            Event::Cleanup(obj) => cleanup(obj, &ctx).await,
        }
    })
    .await
    .map_err(|e| match e {
        FinalizerError::ApplyFailed(e) | FinalizerError::CleanupFailed(e) => e,
        other => ControllerError::Finalizer(other.to_string()),
    })
}

/// Requeue policy for failed reconciliations: Fibonacci backoff per object
pub fn error_policy<K: VSphereResource>(obj: Arc<K>, error: &ControllerError, ctx: Arc<Context>) -> Action {
    let key = resource_key(&*obj);
    let (delay, error_count) = ctx.backoff_for_resource(&key);
    warn!(
        "Reconciliation of {} {} failed (error {}): {}, retrying in {}s",
        K::KIND,
        key,
        error_count,
        error,
        delay.as_secs()
    );
    Action::requeue(delay)
}

async fn apply<K: VSphereResource>(api: &Api<K>, obj: Arc<K>, ctx: &Context) -> Result<Action, ControllerError> {
    let key = resource_key(&*obj);
    info!("Reconciling {} {}", K::KIND, key);

    match reconcile_remote(&*obj, ctx).await {
        Ok((observed, state)) => {
            let error = observed.is_none().then(|| REMOVED_MESSAGE.to_string());
            let desired = K::status_for(observed.as_ref(), state, error);
            match status_patch(obj.current_status(), &desired)? {
                Some(patch) => {
                    api.patch_status(&obj.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
                        .await?;
                    debug!("Updated status of {} {}", K::KIND, key);
                }
                None => debug!("Status of {} {} unchanged", K::KIND, key),
            }
            ctx.reset_error(&key);
            Ok(match observed {
                Some(_) => Action::requeue(RESYNC_INTERVAL),
                None => Action::requeue(PENDING_REQUEUE),
            })
        }
        Err(e) => {
            error!("Failed to reconcile {} {}: {}", K::KIND, key, e);
            ctx.increment_error(&key);
            let patch = failed_status_patch(&e);
            if let Err(patch_err) = api
                .patch_status(&obj.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
                .await
            {
                error!("Failed to update error status of {} {}: {}", K::KIND, key, patch_err);
            }
            Err(e)
        }
    }
}

/// One pass against vCenter: the object as it now is and the state to record
async fn reconcile_remote<K: VSphereResource>(
    obj: &K,
    ctx: &Context,
) -> Result<(Option<K::Observed>, ResourceState), ControllerError> {
    let key = resource_key(obj);
    obj.validate()?;

    let Some(object_id) = obj.recorded_object_id() else {
        let observed = obj.create(ctx).await?;
        return Ok((Some(observed), ResourceState::Created));
    };

    match obj.read(ctx).await? {
        None => {
            warn!("{} {} ({}) is gone from vCenter, clearing recorded identity", K::KIND, key, object_id);
            Ok((None, ResourceState::Pending))
        }
        Some(observed) if obj.drifted(&observed) => {
            info!("{} {} drifted from its declared settings, updating", K::KIND, key);
            let updated = obj.update(ctx).await?;
            Ok((Some(updated), ResourceState::Updated))
        }
        Some(observed) => Ok((Some(observed), settled_state(obj.recorded_state()))),
    }
}

async fn cleanup<K: VSphereResource>(obj: Arc<K>, ctx: &Context) -> Result<Action, ControllerError> {
    let key = resource_key(&*obj);
    info!("Cleaning up {} {}", K::KIND, key);

    match obj.delete(ctx).await {
        Ok(()) => info!("Cleaned up {} {}", K::KIND, key),
        Err(e) if e.is_not_found() => {
            warn!("{} {} is already absent from vCenter: {}", K::KIND, key, e);
        }
        Err(e) => {
            error!("Failed to clean up {} {}: {}", K::KIND, key, e);
            ctx.increment_error(&key);
            return Err(e);
        }
    }
    ctx.reset_error(&key);
    Ok(Action::await_change())
}

/// State to keep for an object that exists and matches its declaration
pub(crate) fn settled_state(recorded: Option<&ResourceState>) -> ResourceState {
    match recorded {
        Some(ResourceState::Updated) => ResourceState::Updated,
        _ => ResourceState::Created,
    }
}

/// Merge patch turning `current` into `desired`, or `None` when they already match
///
/// `lastReconciled` is ignored for the comparison and stamped on every patch.
/// Fields present in `current` but absent from `desired` are cleared.
pub(crate) fn status_patch<S: Serialize>(
    current: Option<&S>,
    desired: &S,
) -> Result<Option<serde_json::Value>, ControllerError> {
    let mut desired = match serde_json::to_value(desired)? {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    desired.remove("lastReconciled");

    let mut current = match current.map(serde_json::to_value).transpose()? {
        Some(serde_json::Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };
    current.remove("lastReconciled");

    if !current.is_empty() && current == desired {
        return Ok(None);
    }

    for field in current.keys() {
        if !desired.contains_key(field) {
            desired.insert(field.clone(), serde_json::Value::Null);
        }
    }
    desired.insert("lastReconciled".to_string(), serde_json::json!(Utc::now()));
    Ok(Some(serde_json::json!({ "status": desired })))
}

/// Patch recording a failed pass; the recorded identity is kept
pub(crate) fn failed_status_patch(error: &ControllerError) -> serde_json::Value {
    serde_json::json!({
        "status": {
            "state": ResourceState::Failed,
            "error": error.to_string(),
            "lastReconciled": Utc::now(),
        }
    })
}

/// Password for a host account, read from a key of a Secret in `namespace`
pub(crate) async fn secret_value(
    client: &Client,
    namespace: &str,
    reference: &crds::SecretKeyReference,
) -> Result<String, ControllerError> {
    let secrets: Api<k8s_openapi::api::core::v1::Secret> = Api::namespaced(client.clone(), namespace);
    let secret = secrets.get(&reference.name).await?;
    let bytes = secret
        .data
        .as_ref()
        .and_then(|data| data.get(&reference.key))
        .ok_or_else(|| {
            ControllerError::Validation(format!(
                "Secret {}/{} has no key {}",
                namespace, reference.name, reference.key
            ))
        })?;
    String::from_utf8(bytes.0.clone()).map_err(|e| {
        ControllerError::Validation(format!(
            "Secret {}/{} key {} is not UTF-8: {}",
            namespace, reference.name, reference.key, e
        ))
    })
}
