//! vSphere inventory CRDs

pub mod common;
pub mod vsphere_cluster;
pub mod vsphere_datacenter;
pub mod vsphere_host;
pub mod vsphere_resource_pool;

pub use common::*;
pub use vsphere_cluster::*;
pub use vsphere_datacenter::*;
pub use vsphere_host::*;
pub use vsphere_resource_pool::*;
