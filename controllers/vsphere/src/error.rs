//! Controller-specific error types.
//!
//! This module defines error types specific to the vSphere Controller
//! that are not covered by upstream library errors.

use kube::Error as KubeError;
use thiserror::Error;
use vsphere_client::{MethodFault, VSphereError};

/// Errors that can occur in the vSphere Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// vSphere call or task failed; task faults carry vCenter's message verbatim
    #[error("vSphere error: {0}")]
    VSphere(#[from] VSphereError),

    /// Declared configuration rejected before any vCenter call
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Object not present in the inventory
    #[error("Not found: {0}")]
    NotFound(String),

    /// An object with the declared name exists, but somewhere else
    #[error("Inventory path mismatch: expected {expected}, found {found}")]
    PathMismatch { expected: String, found: String },

    /// Lookup matched more than one object
    #[error("Ambiguous match for {pattern}: {}", .matches.join(", "))]
    AmbiguousMatch { pattern: String, matches: Vec<String> },

    /// Host certificate is not trusted and sslNoVerify is not set
    #[error("Host {host} presented an untrusted certificate (thumbprint {thumbprint}); set sslNoVerify to trust it")]
    UntrustedCertificate { host: String, thumbprint: String },

    /// Status payload could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Finalizer add/remove failed
    #[error("Finalizer error: {0}")]
    Finalizer(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}

impl ControllerError {
    /// True when the object does not exist, whichever layer noticed
    pub fn is_not_found(&self) -> bool {
        match self {
            ControllerError::NotFound(_) => true,
            ControllerError::VSphere(VSphereError::NotFound(_)) => true,
            ControllerError::VSphere(VSphereError::TaskFault(fault)) => {
                matches!(&fault.fault, MethodFault::Other { type_name, .. } if type_name == "ManagedObjectNotFound")
            }
            _ => false,
        }
    }
}
