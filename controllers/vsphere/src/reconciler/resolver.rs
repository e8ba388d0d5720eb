//! Inventory path resolver
//!
//! Objects are identified by kind, name and anchor (datacenter, cluster or
//! parent), never by a stored managed object id. The resolver computes the
//! canonical inventory path for that identity and looks it up live.
//!
//! Successful resolutions are memoized for the lifetime of the resolver (one
//! reconciliation pass) so one identity always maps to one object within a
//! pass. Any create or destroy clears the memo.

use crate::error::ControllerError;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;
use vsphere_client::{path, InventoryObject, ManagedObjectType, ObjectRef, VSphereClientTrait};

/// A live object and the path it was found at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub reference: ObjectRef,
    pub inventory_path: String,
}

impl From<InventoryObject> for Resolved {
    fn from(object: InventoryObject) -> Self {
        Self {
            reference: object.reference,
            inventory_path: object.inventory_path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Identity {
    DefaultDatacenter,
    Datacenter(String),
    Cluster { datacenter: String, name: String },
    Host { datacenter: String, cluster: Option<String>, name: String },
    ResourcePool { datacenter: String, parent: String, name: String },
    ParentPool { datacenter: String, parent: String },
}

/// Per-pass inventory resolver
pub struct Resolver<'a> {
    client: &'a dyn VSphereClientTrait,
    memo: Mutex<HashMap<Identity, Resolved>>,
}

impl<'a> Resolver<'a> {
    pub fn new(client: &'a dyn VSphereClientTrait) -> Self {
        Self {
            client,
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// Forget every memoized resolution (after a create or destroy)
    pub fn invalidate(&self) {
        if let Ok(mut memo) = self.memo.lock() {
            memo.clear();
        }
    }

    fn memoized(&self, identity: &Identity) -> Option<Resolved> {
        self.memo.lock().ok().and_then(|memo| memo.get(identity).cloned())
    }

    fn remember(&self, identity: Identity, resolved: &Resolved) {
        if let Ok(mut memo) = self.memo.lock() {
            memo.insert(identity, resolved.clone());
        }
    }

    async fn lookup(&self, pattern: &str, kinds: &[ManagedObjectType]) -> Result<Vec<InventoryObject>, ControllerError> {
        let found = self.client.find(pattern, kinds).await?;
        debug!("{} matched {} objects", pattern, found.len());
        Ok(found)
    }

    /// Exactly one match of `pattern`
    async fn lookup_one(&self, pattern: &str, kinds: &[ManagedObjectType]) -> Result<Resolved, ControllerError> {
        let mut found = self.lookup(pattern, kinds).await?;
        match found.len() {
            0 => Err(ControllerError::NotFound(pattern.to_string())),
            1 => Ok(found.remove(0).into()),
            _ => Err(ambiguous(pattern, &found)),
        }
    }

    /// The object at exactly `path`
    ///
    /// Object names may contain `*`, so the path is also compared literally.
    async fn lookup_path(&self, object_path: &str, kinds: &[ManagedObjectType]) -> Result<Resolved, ControllerError> {
        let mut found: Vec<InventoryObject> = self
            .lookup(object_path, kinds)
            .await?
            .into_iter()
            .filter(|object| object.inventory_path == object_path)
            .collect();
        match found.len() {
            0 => Err(ControllerError::NotFound(object_path.to_string())),
            1 => Ok(found.remove(0).into()),
            _ => Err(ambiguous(object_path, &found)),
        }
    }

    /// Datacenter by name, or the only datacenter when no name is declared
    pub async fn datacenter(&self, name: Option<&str>) -> Result<Resolved, ControllerError> {
        let identity = match name {
            Some(name) => Identity::Datacenter(name.to_string()),
            None => Identity::DefaultDatacenter,
        };
        if let Some(hit) = self.memoized(&identity) {
            return Ok(hit);
        }

        let resolved = match name {
            Some(name) => {
                self.lookup_path(&path::join("", name), &[ManagedObjectType::Datacenter])
                    .await?
            }
            None => self
                .lookup_one("*", &[ManagedObjectType::Datacenter])
                .await
                .map_err(|e| match e {
                    ControllerError::NotFound(_) => {
                        ControllerError::NotFound("no datacenter in the inventory".to_string())
                    }
                    other => other,
                })?,
        };
        self.remember(identity, &resolved);
        Ok(resolved)
    }

    /// Cluster `<dc>/host/<name>`
    pub async fn cluster(&self, datacenter: &Resolved, name: &str) -> Result<Resolved, ControllerError> {
        let identity = Identity::Cluster {
            datacenter: datacenter.inventory_path.clone(),
            name: name.to_string(),
        };
        if let Some(hit) = self.memoized(&identity) {
            return Ok(hit);
        }

        let cluster_path = path::join(&host_folder_path(datacenter), name);
        let resolved = self
            .lookup_path(&cluster_path, &[ManagedObjectType::ClusterComputeResource])
            .await?;
        self.remember(identity, &resolved);
        Ok(resolved)
    }

    /// Expected path of a host: under its cluster, or under its own compute resource
    pub fn expected_host_path(datacenter: &Resolved, cluster: Option<&str>, name: &str) -> String {
        let parent = cluster.unwrap_or(name);
        path::join(&path::join(&host_folder_path(datacenter), parent), name)
    }

    /// Host by name, checked against the path its anchor implies
    ///
    /// A host found anywhere else is a `PathMismatch`, never adopted.
    pub async fn host(&self, datacenter: &Resolved, cluster: Option<&str>, name: &str) -> Result<Resolved, ControllerError> {
        let identity = Identity::Host {
            datacenter: datacenter.inventory_path.clone(),
            cluster: cluster.map(str::to_string),
            name: name.to_string(),
        };
        if let Some(hit) = self.memoized(&identity) {
            return Ok(hit);
        }

        let pattern = format!("*/{}", path::escape_segment(name));
        let candidates = self.lookup(&pattern, &[ManagedObjectType::HostSystem]).await?;
        if candidates.is_empty() {
            return Err(ControllerError::NotFound(format!("host {}", name)));
        }

        let expected = Self::expected_host_path(datacenter, cluster, name);
        let resolved: Resolved = candidates
            .iter()
            .find(|candidate| candidate.inventory_path == expected)
            .cloned()
            .map(Resolved::from)
            .ok_or_else(|| ControllerError::PathMismatch {
                expected: expected.clone(),
                found: candidates
                    .iter()
                    .map(|c| c.inventory_path.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })?;
        self.remember(identity, &resolved);
        Ok(resolved)
    }

    /// Resource pool `<name>` directly below the root pool of compute resource `<parent>`
    pub async fn resource_pool(&self, datacenter: &Resolved, parent: &str, name: &str) -> Result<Resolved, ControllerError> {
        let identity = Identity::ResourcePool {
            datacenter: datacenter.inventory_path.clone(),
            parent: parent.to_string(),
            name: name.to_string(),
        };
        if let Some(hit) = self.memoized(&identity) {
            return Ok(hit);
        }

        let name_segment = path::escape_segment(name);
        let pattern = format!("{}/*/Resources/{}", datacenter.inventory_path, name_segment);
        let suffix = format!("/{}/Resources/{}", path::escape_segment(parent), name_segment);
        let within = format!("{}/", datacenter.inventory_path);

        let mut matching: Vec<InventoryObject> = self
            .lookup(&pattern, &[ManagedObjectType::ResourcePool])
            .await?
            .into_iter()
            .filter(|pool| pool.inventory_path.starts_with(&within) && pool.inventory_path.ends_with(&suffix))
            .collect();

        let resolved: Resolved = match matching.len() {
            0 => return Err(ControllerError::NotFound(format!("resource pool {}{}", datacenter.inventory_path, suffix))),
            1 => matching.remove(0).into(),
            _ => return Err(ambiguous(&pattern, &matching)),
        };
        self.remember(identity, &resolved);
        Ok(resolved)
    }

    /// Root `Resources` pool of compute resource `<parent>`, where new pools are created
    pub async fn parent_pool(&self, datacenter: &Resolved, parent: &str) -> Result<Resolved, ControllerError> {
        let identity = Identity::ParentPool {
            datacenter: datacenter.inventory_path.clone(),
            parent: parent.to_string(),
        };
        if let Some(hit) = self.memoized(&identity) {
            return Ok(hit);
        }

        let parent_segment = path::escape_segment(parent);
        let pattern = format!("{}/*/{}/Resources", datacenter.inventory_path, parent_segment);
        let within = format!("{}/", datacenter.inventory_path);
        let suffix = format!("/{}/Resources", parent_segment);

        let mut matching: Vec<InventoryObject> = self
            .lookup(&pattern, &[ManagedObjectType::ResourcePool])
            .await?
            .into_iter()
            .filter(|pool| pool.inventory_path.starts_with(&within) && pool.inventory_path.ends_with(&suffix))
            .collect();

        let resolved: Resolved = match matching.len() {
            0 => return Err(ControllerError::NotFound(pattern)),
            1 => matching.remove(0).into(),
            _ => return Err(ambiguous(&pattern, &matching)),
        };
        self.remember(identity, &resolved);
        Ok(resolved)
    }
}

fn host_folder_path(datacenter: &Resolved) -> String {
    format!("{}/host", datacenter.inventory_path)
}

fn ambiguous(pattern: &str, found: &[InventoryObject]) -> ControllerError {
    ControllerError::AmbiguousMatch {
        pattern: pattern.to_string(),
        matches: found.iter().map(|o| o.inventory_path.clone()).collect(),
    }
}
