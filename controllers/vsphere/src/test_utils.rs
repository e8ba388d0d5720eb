//! Test utilities for unit testing reconcilers
//!
//! This module provides helpers for creating test data and setting up test scenarios.

use crate::reconciler::Reconciler;
use crds::*;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::time::Duration;
use vsphere_client::MockVSphereClient;

/// Reconciler over a fresh mock, plus a handle on the same mock for assertions
pub fn create_test_reconciler() -> (Reconciler, MockVSphereClient) {
    let mock = MockVSphereClient::new("https://vcenter.test");
    let reconciler = Reconciler::new(mock.clone(), Duration::from_millis(1));
    (reconciler, mock)
}

pub fn create_test_datacenter_spec(name: &str, keep: bool) -> VSphereDatacenterSpec {
    VSphereDatacenterSpec {
        name: name.to_string(),
        keep,
    }
}

pub fn create_test_cluster_spec(
    name: &str,
    datacenter: &str,
    drs: Vec<DrsSection>,
    ha: Vec<HaSection>,
) -> VSphereClusterSpec {
    VSphereClusterSpec {
        name: name.to_string(),
        datacenter_id: datacenter.to_string(),
        drs,
        ha,
        keep: false,
    }
}

pub fn create_test_host_spec(
    host: &str,
    datacenter: Option<&str>,
    cluster: Option<&str>,
    ssl_no_verify: bool,
) -> VSphereHostSpec {
    VSphereHostSpec {
        host: host.to_string(),
        datacenter_id: datacenter.map(|s| s.to_string()),
        cluster_id: cluster.map(|s| s.to_string()),
        user: "root".to_string(),
        password_secret_ref: SecretKeyReference::new("esx-credentials", "password"),
        license: None,
        ssl_no_verify,
        keep: false,
    }
}

pub fn create_test_pool_spec(
    name: &str,
    datacenter: &str,
    parent: &str,
    cpu: Vec<AllocationSection>,
    memory: Vec<AllocationSection>,
) -> VSphereResourcePoolSpec {
    VSphereResourcePoolSpec {
        name: name.to_string(),
        datacenter_id: Some(datacenter.to_string()),
        parent_id: parent.to_string(),
        cpu,
        memory,
        keep: false,
    }
}

/// Helper to create a test VSphereCluster CRD with optional status
pub fn create_test_cluster(
    name: &str,
    namespace: &str,
    spec: VSphereClusterSpec,
    status: Option<VSphereClusterStatus>,
) -> VSphereCluster {
    VSphereCluster {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec,
        status,
    }
}
