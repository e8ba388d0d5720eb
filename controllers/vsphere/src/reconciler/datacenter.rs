//! Datacenter reconciliation

use super::resolver::Resolved;
use super::{ObservedObject, Reconciler};
use crate::error::ControllerError;
use crate::reconcile_helpers::{check_existing, find_or_create};
use crds::VSphereDatacenterSpec;
use tracing::info;
use vsphere_client::path;

impl Reconciler {
    /// Find `/<name>` or create it on the root folder
    pub async fn create_datacenter(&self, spec: &VSphereDatacenterSpec) -> Result<ObservedObject, ControllerError> {
        let resolver = &self.resolver();
        let name = spec.name.as_str();

        let (datacenter, _) = find_or_create(
            "Datacenter",
            name,
            move || resolver.datacenter(Some(name)),
            move || async move {
                let root = self.vsphere_client.root_folder().await?;
                let reference = self.vsphere_client.create_datacenter(&root, name).await?;
                resolver.invalidate();
                Ok(Resolved {
                    reference,
                    inventory_path: path::join("", name),
                })
            },
        )
        .await?;

        Ok(datacenter.into())
    }

    /// Current datacenter, or `None` when it is gone from the inventory
    pub async fn read_datacenter(&self, spec: &VSphereDatacenterSpec) -> Result<Option<ObservedObject>, ControllerError> {
        let resolver = self.resolver();
        let found = check_existing("Datacenter", &spec.name, resolver.datacenter(Some(&spec.name))).await?;
        Ok(found.map(ObservedObject::from))
    }

    /// Destroy the datacenter unless it is retained
    pub async fn delete_datacenter(&self, spec: &VSphereDatacenterSpec) -> Result<(), ControllerError> {
        if spec.keep {
            info!("Datacenter {} is retained (keep = true), leaving it in vCenter", spec.name);
            return Ok(());
        }

        let resolver = self.resolver();
        let datacenter = resolver.datacenter(Some(&spec.name)).await?;
        info!("Destroying datacenter {} ({})", datacenter.inventory_path, datacenter.reference);
        let task = self.vsphere_client.destroy(&datacenter.reference).await?;
        self.wait_for_task(&task).await?;
        resolver.invalidate();
        Ok(())
    }
}
