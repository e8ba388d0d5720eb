//! Print the YAML of every vSphere CRD
//!
//! Usage: `cargo run -p crds --bin crdgen > config/crd/vsphere.yaml`

use crds::{VSphereCluster, VSphereDatacenter, VSphereHost, VSphereResourcePool};
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    let crds = [
        VSphereDatacenter::crd(),
        VSphereCluster::crd(),
        VSphereHost::crd(),
        VSphereResourcePool::crd(),
    ];

    for crd in &crds {
        println!("---");
        print!("{}", serde_yaml::to_string(crd)?);
    }
    Ok(())
}
