//! vSphere VI/JSON API Client
//!
//! A Rust client library for the subset of the vCenter management API the
//! vSphere controller reconciles: inventory lookup, datacenters, clusters,
//! hosts, resource pools and tasks.
//!
//! # Example
//!
//! ```no_run
//! use vsphere_client::{ManagedObjectType, VSphereClient, VSphereClientTrait};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = VSphereClient::connect(
//!     "vcenter.lab.local",
//!     "administrator@vsphere.local",
//!     "secret",
//!     true,
//!     vsphere_client::DEFAULT_API_RELEASE,
//! )
//! .await?;
//!
//! // Every cluster in datacenter dc1
//! let clusters = client
//!     .find("/dc1/host/*", &[ManagedObjectType::ClusterComputeResource])
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Inventory**: Pattern lookup over inventory paths
//! - **Tasks**: `_Task` methods return task references, `task_info` polls them
//! - **Faults**: Task faults decoded into the `MethodFault` enum
//! - **Mocking**: `MockVSphereClient` behind the `test-util` feature

pub mod client;
pub mod common;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod vsphere_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::{VSphereClient, DEFAULT_API_RELEASE};
pub use common::{path, HttpClient};
pub use error::VSphereError;
pub use models::*;
pub use vsphere_trait::VSphereClientTrait;
#[cfg(feature = "test-util")]
pub use mock::{fault, ssl_verify_fault, MockCall, MockVSphereClient};
