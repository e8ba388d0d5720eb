//! Integration tests for the vSphere client
//!
//! These tests require a reachable vCenter.
//! Set VSPHERE_HOST, VSPHERE_USERNAME and VSPHERE_PASSWORD to run.

use vsphere_client::{ManagedObjectType, VSphereClient, VSphereClientTrait, DEFAULT_API_RELEASE};

async fn connect() -> VSphereClient {
    let host = std::env::var("VSPHERE_HOST").expect("VSPHERE_HOST environment variable must be set");
    let username = std::env::var("VSPHERE_USERNAME").expect("VSPHERE_USERNAME environment variable must be set");
    let password = std::env::var("VSPHERE_PASSWORD").expect("VSPHERE_PASSWORD environment variable must be set");
    let insecure = std::env::var("VSPHERE_INSECURE").is_ok_and(|v| v == "true");

    VSphereClient::connect(&host, &username, &password, insecure, DEFAULT_API_RELEASE)
        .await
        .expect("Failed to connect to vCenter")
}

#[tokio::test]
#[ignore] // Requires running vCenter
async fn test_login_and_root_folder() {
    let client = connect().await;

    let root = client.root_folder().await.expect("Failed to read root folder");
    assert_eq!(root.kind, ManagedObjectType::Folder);
}

#[tokio::test]
#[ignore]
async fn test_find_datacenters() {
    let client = connect().await;

    let datacenters = client
        .find("*", &[ManagedObjectType::Datacenter])
        .await
        .expect("Failed to list datacenters");

    println!("Found {} datacenters", datacenters.len());
    for dc in &datacenters {
        assert!(dc.inventory_path.starts_with('/'));
        assert_eq!(dc.reference.kind, ManagedObjectType::Datacenter);
    }
}

#[tokio::test]
#[ignore]
async fn test_find_clusters_and_hosts() {
    let client = connect().await;

    let datacenters = client
        .find("*", &[ManagedObjectType::Datacenter])
        .await
        .expect("Failed to list datacenters");
    let Some(dc) = datacenters.first() else {
        println!("No datacenter in inventory, skipping");
        return;
    };

    let clusters = client
        .find(
            &format!("{}/host/*", dc.inventory_path),
            &[ManagedObjectType::ClusterComputeResource],
        )
        .await
        .expect("Failed to list clusters");
    println!("Found {} clusters in {}", clusters.len(), dc.inventory_path);

    let hosts = client
        .find(&format!("{}/host/*/*", dc.inventory_path), &[ManagedObjectType::HostSystem])
        .await
        .expect("Failed to list hosts");
    println!("Found {} hosts in {}", hosts.len(), dc.inventory_path);
}
