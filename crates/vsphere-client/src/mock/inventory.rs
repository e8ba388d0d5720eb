//! Inventory tree operations for MockVSphereClient
//!
//! Handles object creation, path computation, pattern lookup and removal.

use super::helpers::{self, moid_prefix};
use super::MockVSphereClient;
use crate::common::path;
use crate::error::VSphereError;
use crate::models::*;

/// One managed object in the mock inventory
#[derive(Debug, Clone)]
pub(crate) struct MockNode {
    pub name: String,
    pub parent: Option<ObjectRef>,
    pub children: Vec<ObjectRef>,
    pub cluster_config: ClusterConfigInfoEx,
    pub pool_config: ResourceConfigSpec,
}

impl MockVSphereClient {
    /// Insert a new object under `parent` and return its reference
    pub(crate) fn insert_node(&self, kind: ManagedObjectType, parent: Option<&ObjectRef>, name: &str) -> ObjectRef {
        let reference = ObjectRef::new(kind.clone(), format!("{}{}", moid_prefix(&kind), self.next_id()));
        let mut nodes = self.nodes.lock().unwrap();
        if let Some(parent) = parent {
            if let Some(parent_node) = nodes.get_mut(parent) {
                parent_node.children.push(reference.clone());
            }
        }
        let cluster_config = if kind == ManagedObjectType::ClusterComputeResource {
            helpers::new_cluster_config()
        } else {
            ClusterConfigInfoEx::default()
        };
        nodes.insert(
            reference.clone(),
            MockNode {
                name: name.to_string(),
                parent: parent.cloned(),
                children: Vec::new(),
                cluster_config,
                pool_config: helpers::root_pool_config(),
            },
        );
        reference
    }

    /// Datacenter with its four system folders
    pub(crate) fn insert_datacenter(&self, folder: &ObjectRef, name: &str) -> ObjectRef {
        let datacenter = self.insert_node(ManagedObjectType::Datacenter, Some(folder), name);
        for folder_name in ["vm", "host", "datastore", "network"] {
            self.insert_node(ManagedObjectType::Folder, Some(&datacenter), folder_name);
        }
        datacenter
    }

    /// Compute resource (standalone or cluster) with its root `Resources` pool
    pub(crate) fn insert_compute_resource(&self, kind: ManagedObjectType, folder: &ObjectRef, name: &str) -> ObjectRef {
        let compute_resource = self.insert_node(kind, Some(folder), name);
        self.insert_node(ManagedObjectType::ResourcePool, Some(&compute_resource), "Resources");
        compute_resource
    }

    pub(crate) fn node(&self, reference: &ObjectRef) -> Result<MockNode, VSphereError> {
        self.nodes
            .lock()
            .unwrap()
            .get(reference)
            .cloned()
            .ok_or_else(|| VSphereError::NotFound(format!("{} not found", reference)))
    }

    /// Child of `parent` with the given name
    pub(crate) fn child_named(&self, parent: &ObjectRef, name: &str) -> Option<ObjectRef> {
        let nodes = self.nodes.lock().unwrap();
        nodes.get(parent).and_then(|node| {
            node.children
                .iter()
                .find(|child| nodes.get(*child).map(|c| c.name == name).unwrap_or(false))
                .cloned()
        })
    }

    pub(crate) fn children_of_kind(&self, parent: &ObjectRef, kind: &ManagedObjectType) -> Result<Vec<ObjectRef>, VSphereError> {
        Ok(self
            .node(parent)?
            .children
            .into_iter()
            .filter(|child| &child.kind == kind)
            .collect())
    }

    /// Full inventory path of an object
    pub(crate) fn inventory_path(&self, reference: &ObjectRef) -> Option<String> {
        let nodes = self.nodes.lock().unwrap();
        let mut segments = Vec::new();
        let mut current = reference.clone();
        loop {
            if current == self.root {
                break;
            }
            let node = nodes.get(&current)?;
            segments.push(path::escape_segment(&node.name));
            current = node.parent.clone()?;
        }
        segments.reverse();
        Some(format!("/{}", segments.join("/")))
    }

    pub(crate) fn find_objects(&self, pattern: &str, kinds: &[ManagedObjectType]) -> Vec<InventoryObject> {
        let candidates: Vec<(ObjectRef, String)> = {
            let nodes = self.nodes.lock().unwrap();
            nodes
                .iter()
                .filter(|(reference, _)| **reference != self.root)
                .filter(|(reference, _)| kinds.is_empty() || kinds.contains(&reference.kind))
                .map(|(reference, node)| (reference.clone(), node.name.clone()))
                .collect()
        };

        let mut found: Vec<InventoryObject> = candidates
            .into_iter()
            .filter_map(|(reference, name)| {
                let inventory_path = self.inventory_path(&reference)?;
                path::matches(pattern, &inventory_path).then_some(InventoryObject {
                    reference,
                    name,
                    inventory_path,
                })
            })
            .collect();
        found.sort_by(|a, b| a.inventory_path.cmp(&b.inventory_path));
        found
    }

    /// Remove an object and everything below it
    pub(crate) fn remove_subtree(&self, reference: &ObjectRef) -> Result<(), VSphereError> {
        let mut nodes = self.nodes.lock().unwrap();
        let node = nodes
            .get(reference)
            .cloned()
            .ok_or_else(|| VSphereError::NotFound(format!("{} not found", reference)))?;
        if let Some(parent) = &node.parent {
            if let Some(parent_node) = nodes.get_mut(parent) {
                parent_node.children.retain(|child| child != reference);
            }
        }

        let mut pending = vec![reference.clone()];
        while let Some(current) = pending.pop() {
            if let Some(removed) = nodes.remove(&current) {
                pending.extend(removed.children);
            }
        }
        Ok(())
    }
}
