//! vSphere API client
//!
//! Implements the vSphere VI/JSON API client used by the controllers.
//! Based on the VI/JSON URL structure: /sdk/vim25/{release}/{Type}/{moid}/{method|property}

use crate::common::{path, with_type_name, HttpClient, SESSION_HEADER};
use crate::error::VSphereError;
use crate::models::*;
use crate::vsphere_trait::VSphereClientTrait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

/// Default vim25 API release
pub const DEFAULT_API_RELEASE: &str = "8.0.1.0";

/// vSphere API client
///
/// Holds one authenticated session for the lifetime of the process.
pub struct VSphereClient {
    http: HttpClient,
    endpoint: String,
    root_folder: ObjectRef,
}

impl VSphereClient {
    /// Connect to vCenter and log in
    ///
    /// # Arguments
    /// * `endpoint` - vCenter host name or address (e.g., "vcenter.lab.local")
    /// * `username` / `password` - SSO credentials
    /// * `insecure` - accept a self-signed vCenter certificate
    /// * `release` - vim25 API release used in request paths
    pub async fn connect(
        endpoint: &str,
        username: &str,
        password: &str,
        insecure: bool,
        release: &str,
    ) -> Result<Self, VSphereError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .danger_accept_invalid_certs(insecure)
            .build()
            .map_err(VSphereError::Http)?;

        let endpoint = endpoint
            .trim_start_matches("https://")
            .trim_end_matches('/')
            .to_string();
        let base_url = format!("https://{}/sdk/vim25/{}", endpoint, release);
        let mut http = HttpClient::new(client, base_url);

        let service_instance = ObjectRef::new(ManagedObjectType::Other("ServiceInstance".into()), "ServiceInstance");
        let content: ServiceContent = http.get_property(&service_instance, "content").await?;

        debug!("Logging in to vCenter {} as {}", endpoint, username);
        let response = http
            .send_invoke(
                &content.session_manager,
                "Login",
                &json!({ "userName": username, "password": password }),
            )
            .await?;

        let session_id = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                VSphereError::Authentication(format!("Login response from {} carried no session id", endpoint))
            })?;
        http.set_session(session_id);

        info!("Connected to vCenter {}", endpoint);
        Ok(Self {
            http,
            endpoint,
            root_folder: content.root_folder,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    async fn name_of(&self, object: &ObjectRef) -> Result<String, VSphereError> {
        self.http.get_property(object, "name").await
    }

    /// Inventory children of a node, in the order vCenter lists them
    async fn inventory_children(&self, node: &ObjectRef) -> Result<Vec<ObjectRef>, VSphereError> {
        match node.kind {
            ManagedObjectType::Folder => self.child_entities(node).await,
            ManagedObjectType::Datacenter => {
                let mut folders = Vec::with_capacity(4);
                for property in ["vmFolder", "hostFolder", "datastoreFolder", "networkFolder"] {
                    folders.push(self.http.get_property(node, property).await?);
                }
                Ok(folders)
            }
            ManagedObjectType::ComputeResource | ManagedObjectType::ClusterComputeResource => {
                let mut children = self.compute_resource_hosts(node).await?;
                children.push(self.compute_resource_pool(node).await?);
                Ok(children)
            }
            ManagedObjectType::ResourcePool => self.http.get_property(node, "resourcePool").await,
            _ => Ok(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl VSphereClientTrait for VSphereClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn root_folder(&self) -> Result<ObjectRef, VSphereError> {
        Ok(self.root_folder.clone())
    }

    async fn find(&self, pattern: &str, kinds: &[ManagedObjectType]) -> Result<Vec<InventoryObject>, VSphereError> {
        debug!("Finding inventory objects matching {}", pattern);

        let mut found = Vec::new();
        let mut pending = vec![(self.root_folder.clone(), String::new())];

        while let Some((node, node_path)) = pending.pop() {
            for child in self.inventory_children(&node).await?.into_iter().rev() {
                let name = self.name_of(&child).await?;
                let child_path = path::join(&node_path, &name);

                if path::matches(pattern, &child_path) && (kinds.is_empty() || kinds.contains(&child.kind)) {
                    found.push(InventoryObject {
                        reference: child.clone(),
                        name,
                        inventory_path: child_path.clone(),
                    });
                }
                if path::may_contain(pattern, &child_path) {
                    pending.push((child, child_path));
                }
            }
        }

        debug!("Pattern {} matched {} objects", pattern, found.len());
        Ok(found)
    }

    async fn datacenter_host_folder(&self, datacenter: &ObjectRef) -> Result<ObjectRef, VSphereError> {
        self.http.get_property(datacenter, "hostFolder").await
    }

    async fn child_entities(&self, folder: &ObjectRef) -> Result<Vec<ObjectRef>, VSphereError> {
        self.http.get_property(folder, "childEntity").await
    }

    async fn compute_resource_hosts(&self, compute_resource: &ObjectRef) -> Result<Vec<ObjectRef>, VSphereError> {
        self.http.get_property(compute_resource, "host").await
    }

    async fn compute_resource_pool(&self, compute_resource: &ObjectRef) -> Result<ObjectRef, VSphereError> {
        self.http.get_property(compute_resource, "resourcePool").await
    }

    async fn create_datacenter(&self, folder: &ObjectRef, name: &str) -> Result<ObjectRef, VSphereError> {
        debug!("CreateDatacenter {} in {}", name, folder);
        self.http
            .invoke(folder, "CreateDatacenter", &json!({ "name": name }))
            .await
    }

    async fn create_cluster(&self, folder: &ObjectRef, name: &str, spec: &ClusterConfigSpecEx) -> Result<ObjectRef, VSphereError> {
        debug!("CreateClusterEx {} in {}", name, folder);
        let body = json!({ "name": name, "spec": cluster_spec_json(spec)? });
        self.http.invoke(folder, "CreateClusterEx", &body).await
    }

    async fn reconfigure_cluster(&self, cluster: &ObjectRef, spec: &ClusterConfigSpecEx) -> Result<ObjectRef, VSphereError> {
        debug!("ReconfigureComputeResource_Task on {}", cluster);
        let body = json!({ "spec": cluster_spec_json(spec)?, "modify": true });
        self.http
            .invoke(cluster, "ReconfigureComputeResource_Task", &body)
            .await
    }

    async fn cluster_configuration(&self, cluster: &ObjectRef) -> Result<ClusterConfigInfoEx, VSphereError> {
        self.http.get_property(cluster, "configurationEx").await
    }

    async fn add_standalone_host(&self, folder: &ObjectRef, spec: &HostConnectSpec, license: Option<&str>) -> Result<ObjectRef, VSphereError> {
        debug!("AddStandaloneHost_Task {} in {}", spec.host_name, folder);
        let mut body = json!({ "spec": host_spec_json(spec)?, "addConnected": true });
        if let Some(license) = license {
            body["license"] = json!(license);
        }
        self.http.invoke(folder, "AddStandaloneHost_Task", &body).await
    }

    async fn add_cluster_host(&self, cluster: &ObjectRef, spec: &HostConnectSpec, license: Option<&str>) -> Result<ObjectRef, VSphereError> {
        debug!("AddHost_Task {} in {}", spec.host_name, cluster);
        let mut body = json!({ "spec": host_spec_json(spec)?, "asConnected": true });
        if let Some(license) = license {
            body["license"] = json!(license);
        }
        self.http.invoke(cluster, "AddHost_Task", &body).await
    }

    async fn create_resource_pool(&self, parent: &ObjectRef, name: &str, spec: &ResourceConfigSpec) -> Result<ObjectRef, VSphereError> {
        debug!("CreateResourcePool {} in {}", name, parent);
        let body = json!({ "name": name, "spec": resource_spec_json(spec)? });
        self.http.invoke(parent, "CreateResourcePool", &body).await
    }

    async fn update_resource_pool(&self, pool: &ObjectRef, spec: &ResourceConfigSpec) -> Result<(), VSphereError> {
        debug!("UpdateConfig on {}", pool);
        let body = json!({ "config": resource_spec_json(spec)? });
        self.http.invoke_void(pool, "UpdateConfig", &body).await
    }

    async fn resource_pool_allocation(&self, pool: &ObjectRef, facet: AllocationFacet) -> Result<ResourceAllocationInfo, VSphereError> {
        let config: ResourceConfigSpec = self.http.get_property(pool, "config").await?;
        Ok(match facet {
            AllocationFacet::Cpu => config.cpu_allocation,
            AllocationFacet::Memory => config.memory_allocation,
        })
    }

    async fn destroy(&self, object: &ObjectRef) -> Result<ObjectRef, VSphereError> {
        debug!("Destroy_Task on {}", object);
        self.http.invoke(object, "Destroy_Task", &json!({})).await
    }

    async fn task_info(&self, task: &ObjectRef) -> Result<TaskInfo, VSphereError> {
        self.http.get_property(task, "info").await
    }
}

fn cluster_spec_json(spec: &ClusterConfigSpecEx) -> Result<serde_json::Value, VSphereError> {
    let mut value = with_type_name(json!({}), "ClusterConfigSpecEx");
    if let Some(drs) = &spec.drs_config {
        value["drsConfig"] = with_type_name(serde_json::to_value(drs)?, "ClusterDrsConfigInfo");
    }
    if let Some(das) = &spec.das_config {
        value["dasConfig"] = with_type_name(serde_json::to_value(das)?, "ClusterDasConfigInfo");
    }
    Ok(value)
}

fn host_spec_json(spec: &HostConnectSpec) -> Result<serde_json::Value, VSphereError> {
    Ok(with_type_name(serde_json::to_value(spec)?, "HostConnectSpec"))
}

fn allocation_json(allocation: &ResourceAllocationInfo) -> Result<serde_json::Value, VSphereError> {
    let mut value = with_type_name(serde_json::to_value(allocation)?, "ResourceAllocationInfo");
    if let Some(shares) = &allocation.shares {
        let mut shares_value = with_type_name(serde_json::to_value(shares)?, "SharesInfo");
        // `shares` is a required property on the wire; vCenter ignores it unless the level is custom
        if shares_value.get("shares").is_none() {
            shares_value["shares"] = json!(0);
        }
        value["shares"] = shares_value;
    }
    Ok(value)
}

fn resource_spec_json(spec: &ResourceConfigSpec) -> Result<serde_json::Value, VSphereError> {
    let mut value = with_type_name(json!({}), "ResourceConfigSpec");
    value["cpuAllocation"] = allocation_json(&spec.cpu_allocation)?;
    value["memoryAllocation"] = allocation_json(&spec.memory_allocation)?;
    Ok(value)
}
