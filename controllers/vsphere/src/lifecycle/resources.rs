//! `VSphereResource` for each CRD

use super::{secret_value, Context, VSphereResource};
use crate::error::ControllerError;
use crate::reconciler::{ObservedCluster, ObservedObject, ObservedResourcePool, Reconciler};
use crds::{
    ResourceState, VSphereCluster, VSphereClusterStatus, VSphereDatacenter, VSphereDatacenterStatus,
    VSphereHost, VSphereHostStatus, VSphereResourcePool, VSphereResourcePoolStatus,
};
use kube::ResourceExt;

#[async_trait::async_trait]
impl VSphereResource for VSphereDatacenter {
    type Status = VSphereDatacenterStatus;
    type Observed = ObservedObject;

    const KIND: &'static str = "VSphereDatacenter";

    fn current_status(&self) -> Option<&Self::Status> {
        self.status.as_ref()
    }

    fn recorded_object_id(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.object_id.as_deref())
    }

    fn recorded_state(&self) -> Option<&ResourceState> {
        self.status.as_ref().map(|s| &s.state)
    }

    async fn create(&self, ctx: &Context) -> Result<ObservedObject, ControllerError> {
        ctx.reconciler.create_datacenter(&self.spec).await
    }

    async fn read(&self, ctx: &Context) -> Result<Option<ObservedObject>, ControllerError> {
        ctx.reconciler.read_datacenter(&self.spec).await
    }

    async fn delete(&self, ctx: &Context) -> Result<(), ControllerError> {
        ctx.reconciler.delete_datacenter(&self.spec).await
    }

    fn status_for(observed: Option<&ObservedObject>, state: ResourceState, error: Option<String>) -> Self::Status {
        VSphereDatacenterStatus {
            object_id: observed.map(|o| o.object_id.clone()),
            inventory_path: observed.map(|o| o.inventory_path.clone()),
            state,
            error,
            last_reconciled: None,
        }
    }
}

#[async_trait::async_trait]
impl VSphereResource for VSphereCluster {
    type Status = VSphereClusterStatus;
    type Observed = ObservedCluster;

    const KIND: &'static str = "VSphereCluster";

    fn current_status(&self) -> Option<&Self::Status> {
        self.status.as_ref()
    }

    fn recorded_object_id(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.object_id.as_deref())
    }

    fn recorded_state(&self) -> Option<&ResourceState> {
        self.status.as_ref().map(|s| &s.state)
    }

    async fn create(&self, ctx: &Context) -> Result<ObservedCluster, ControllerError> {
        ctx.reconciler.create_cluster(&self.spec).await
    }

    async fn read(&self, ctx: &Context) -> Result<Option<ObservedCluster>, ControllerError> {
        ctx.reconciler.read_cluster(&self.spec).await
    }

    async fn delete(&self, ctx: &Context) -> Result<(), ControllerError> {
        ctx.reconciler.delete_cluster(&self.spec).await
    }

    fn validate(&self) -> Result<(), ControllerError> {
        Reconciler::validate_cluster(&self.spec)
    }

    fn drifted(&self, observed: &ObservedCluster) -> bool {
        Reconciler::cluster_needs_update(&self.spec, observed)
    }

    async fn update(&self, ctx: &Context) -> Result<ObservedCluster, ControllerError> {
        ctx.reconciler.update_cluster(&self.spec).await
    }

    fn status_for(observed: Option<&ObservedCluster>, state: ResourceState, error: Option<String>) -> Self::Status {
        VSphereClusterStatus {
            object_id: observed.map(|o| o.object.object_id.clone()),
            inventory_path: observed.map(|o| o.object.inventory_path.clone()),
            drs: observed.map(|o| o.drs.clone()).unwrap_or_default(),
            ha: observed.map(|o| o.ha.clone()).unwrap_or_default(),
            state,
            error,
            last_reconciled: None,
        }
    }
}

#[async_trait::async_trait]
impl VSphereResource for VSphereHost {
    type Status = VSphereHostStatus;
    type Observed = ObservedObject;

    const KIND: &'static str = "VSphereHost";

    fn current_status(&self) -> Option<&Self::Status> {
        self.status.as_ref()
    }

    fn recorded_object_id(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.object_id.as_deref())
    }

    fn recorded_state(&self) -> Option<&ResourceState> {
        self.status.as_ref().map(|s| &s.state)
    }

    async fn create(&self, ctx: &Context) -> Result<ObservedObject, ControllerError> {
        let namespace = self.namespace().unwrap_or_default();
        let password = secret_value(&ctx.kube_client, &namespace, &self.spec.password_secret_ref).await?;
        ctx.reconciler.create_host(&self.spec, &password).await
    }

    async fn read(&self, ctx: &Context) -> Result<Option<ObservedObject>, ControllerError> {
        ctx.reconciler.read_host(&self.spec).await
    }

    async fn delete(&self, ctx: &Context) -> Result<(), ControllerError> {
        ctx.reconciler.delete_host(&self.spec).await
    }

    fn status_for(observed: Option<&ObservedObject>, state: ResourceState, error: Option<String>) -> Self::Status {
        VSphereHostStatus {
            object_id: observed.map(|o| o.object_id.clone()),
            inventory_path: observed.map(|o| o.inventory_path.clone()),
            state,
            error,
            last_reconciled: None,
        }
    }
}

#[async_trait::async_trait]
impl VSphereResource for VSphereResourcePool {
    type Status = VSphereResourcePoolStatus;
    type Observed = ObservedResourcePool;

    const KIND: &'static str = "VSphereResourcePool";

    fn current_status(&self) -> Option<&Self::Status> {
        self.status.as_ref()
    }

    fn recorded_object_id(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.object_id.as_deref())
    }

    fn recorded_state(&self) -> Option<&ResourceState> {
        self.status.as_ref().map(|s| &s.state)
    }

    async fn create(&self, ctx: &Context) -> Result<ObservedResourcePool, ControllerError> {
        ctx.reconciler.create_resource_pool(&self.spec).await
    }

    async fn read(&self, ctx: &Context) -> Result<Option<ObservedResourcePool>, ControllerError> {
        ctx.reconciler.read_resource_pool(&self.spec).await
    }

    async fn delete(&self, ctx: &Context) -> Result<(), ControllerError> {
        ctx.reconciler.delete_resource_pool(&self.spec).await
    }

    fn validate(&self) -> Result<(), ControllerError> {
        Reconciler::validate_resource_pool(&self.spec)
    }

    fn drifted(&self, observed: &ObservedResourcePool) -> bool {
        Reconciler::resource_pool_needs_update(&self.spec, observed)
    }

    async fn update(&self, ctx: &Context) -> Result<ObservedResourcePool, ControllerError> {
        ctx.reconciler.update_resource_pool(&self.spec).await
    }

    fn status_for(observed: Option<&ObservedResourcePool>, state: ResourceState, error: Option<String>) -> Self::Status {
        VSphereResourcePoolStatus {
            object_id: observed.map(|o| o.object.object_id.clone()),
            inventory_path: observed.map(|o| o.object.inventory_path.clone()),
            cpu: observed.map(|o| o.cpu.clone()).unwrap_or_default(),
            memory: observed.map(|o| o.memory.clone()).unwrap_or_default(),
            state,
            error,
            last_reconciled: None,
        }
    }
}
