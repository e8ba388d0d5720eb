//! Resource pool reconciliation
//!
//! Pools are created directly below the root `Resources` pool of the cluster
//! or standalone host named by `parentId`.

use super::resolver::{Resolved, Resolver};
use super::translate::{self, allocation};
use super::{ObservedObject, ObservedResourcePool, Reconciler};
use crate::error::ControllerError;
use crate::reconcile_helpers::{check_existing, find_or_create};
use crds::VSphereResourcePoolSpec;
use tracing::{debug, info};
use vsphere_client::{path, AllocationFacet, ResourceConfigSpec};

impl Reconciler {
    /// Find or create the pool with its declared allocations
    ///
    /// A pool adopted from the inventory gets the declared allocations applied.
    pub async fn create_resource_pool(&self, spec: &VSphereResourcePoolSpec) -> Result<ObservedResourcePool, ControllerError> {
        let create_spec = &translate::pool_create_spec(spec)?;
        let update_spec = translate::pool_update_spec(spec)?;

        let resolver = &self.resolver();
        let datacenter = &resolver.datacenter(spec.datacenter_id.as_deref()).await?;
        let name = spec.name.as_str();
        let parent = spec.parent_id.as_str();

        let (pool, created) = find_or_create(
            "ResourcePool",
            name,
            move || resolver.resource_pool(datacenter, parent, name),
            move || async move {
                let parent_pool = resolver.parent_pool(datacenter, parent).await?;
                let reference = self
                    .vsphere_client
                    .create_resource_pool(&parent_pool.reference, name, create_spec)
                    .await?;
                resolver.invalidate();
                Ok(Resolved {
                    reference,
                    inventory_path: path::join(&parent_pool.inventory_path, name),
                })
            },
        )
        .await?;

        if !created {
            self.apply_allocation(&pool, &update_spec).await?;
        }
        self.observe_resource_pool(pool).await
    }

    /// Push the declared allocations to an existing pool
    pub async fn update_resource_pool(&self, spec: &VSphereResourcePoolSpec) -> Result<ObservedResourcePool, ControllerError> {
        let update_spec = translate::pool_update_spec(spec)?;
        let resolver = self.resolver();
        let pool = resolve_pool(&resolver, spec).await?;
        self.apply_allocation(&pool, &update_spec).await?;
        self.observe_resource_pool(pool).await
    }

    /// Current pool allocations, or `None` when the pool is gone
    pub async fn read_resource_pool(&self, spec: &VSphereResourcePoolSpec) -> Result<Option<ObservedResourcePool>, ControllerError> {
        let resolver = self.resolver();
        match check_existing("ResourcePool", &spec.name, resolve_pool(&resolver, spec)).await? {
            Some(pool) => Ok(Some(self.observe_resource_pool(pool).await?)),
            None => Ok(None),
        }
    }

    /// Reject an invalid CPU or memory declaration without calling vCenter
    pub fn validate_resource_pool(spec: &VSphereResourcePoolSpec) -> Result<(), ControllerError> {
        translate::pool_update_spec(spec).map(|_| ())
    }

    /// Whether any declared allocation field differs from what vCenter reports
    pub fn resource_pool_needs_update(spec: &VSphereResourcePoolSpec, observed: &ObservedResourcePool) -> bool {
        let cpu_drift = spec
            .cpu
            .first()
            .map(|declared| allocation::drifted(declared, observed.cpu.first()))
            .unwrap_or(false);
        let memory_drift = spec
            .memory
            .first()
            .map(|declared| allocation::drifted(declared, observed.memory.first()))
            .unwrap_or(false);
        cpu_drift || memory_drift
    }

    /// Destroy the pool unless it is retained
    pub async fn delete_resource_pool(&self, spec: &VSphereResourcePoolSpec) -> Result<(), ControllerError> {
        if spec.keep {
            info!("Resource pool {} is retained (keep = true), leaving it in vCenter", spec.name);
            return Ok(());
        }

        let resolver = self.resolver();
        let pool = resolve_pool(&resolver, spec).await?;
        info!("Destroying resource pool {} ({})", pool.inventory_path, pool.reference);
        let task = self.vsphere_client.destroy(&pool.reference).await?;
        self.wait_for_task(&task).await?;
        resolver.invalidate();
        Ok(())
    }

    async fn apply_allocation(&self, pool: &Resolved, spec: &ResourceConfigSpec) -> Result<(), ControllerError> {
        if spec.cpu_allocation.is_empty() && spec.memory_allocation.is_empty() {
            debug!("No allocation declared for {}, skipping update", pool.inventory_path);
            return Ok(());
        }
        info!("Updating allocations of resource pool {}", pool.inventory_path);
        self.vsphere_client.update_resource_pool(&pool.reference, spec).await?;
        Ok(())
    }

    async fn observe_resource_pool(&self, pool: Resolved) -> Result<ObservedResourcePool, ControllerError> {
        let cpu = self
            .vsphere_client
            .resource_pool_allocation(&pool.reference, AllocationFacet::Cpu)
            .await?;
        let memory = self
            .vsphere_client
            .resource_pool_allocation(&pool.reference, AllocationFacet::Memory)
            .await?;
        Ok(ObservedResourcePool {
            cpu: allocation::from_remote(&cpu),
            memory: allocation::from_remote(&memory),
            object: ObservedObject::from(pool),
        })
    }
}

async fn resolve_pool(resolver: &Resolver<'_>, spec: &VSphereResourcePoolSpec) -> Result<Resolved, ControllerError> {
    let datacenter = resolver.datacenter(spec.datacenter_id.as_deref()).await?;
    resolver
        .resource_pool(&datacenter, &spec.parent_id, &spec.name)
        .await
}
