//! vSphere CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the vSphere inventory controller.

pub mod references;
pub mod vsphere;

pub use references::*;
pub use vsphere::*;
