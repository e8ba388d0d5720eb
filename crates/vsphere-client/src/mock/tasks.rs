//! Task operations for MockVSphereClient
//!
//! Task methods apply their effect immediately and hand back a task whose
//! info reports `running` for the configured number of polls before the
//! terminal state.

use super::helpers::{self, fault, ssl_verify_fault};
use super::MockVSphereClient;
use crate::error::VSphereError;
use crate::models::*;

#[derive(Debug, Clone)]
pub(crate) struct MockTask {
    pub info: TaskInfo,
    pub remaining_polls: u32,
}

impl MockVSphereClient {
    /// Make the next task of `method` fail with `fault` (for test setup)
    ///
    /// Faults queue up: scripting two faults fails the next two tasks.
    pub fn fail_next_task(&self, method: &str, fault: LocalizedMethodFault) {
        self.task_faults
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(fault);
    }

    /// Make a host present a certificate with this thumbprint (for test setup)
    ///
    /// Connecting without pinning the thumbprint then fails with `SSLVerifyFault`.
    pub fn set_host_thumbprint(&self, host_name: &str, thumbprint: &str) {
        self.host_thumbprints
            .lock()
            .unwrap()
            .insert(host_name.to_string(), thumbprint.to_string());
    }

    /// Number of `running` polls every new task reports first (for test setup)
    pub fn set_polls_before_completion(&self, polls: u32) {
        *self.polls_before_completion.lock().unwrap() = polls;
    }

    fn next_scripted_fault(&self, method: &str) -> Option<LocalizedMethodFault> {
        self.task_faults
            .lock()
            .unwrap()
            .get_mut(method)
            .and_then(|queue| queue.pop_front())
    }

    /// Create a task for `method`, running `effect` unless a fault is scripted
    fn submit<F>(&self, method: &str, effect: F) -> ObjectRef
    where
        F: FnOnce() -> Result<Option<ObjectRef>, LocalizedMethodFault>,
    {
        let outcome = match self.next_scripted_fault(method) {
            Some(scripted) => Err(scripted),
            None => effect(),
        };

        let task = ObjectRef::new(ManagedObjectType::Task, format!("task-{}", self.next_id()));
        let info = match outcome {
            Ok(result) => TaskInfo {
                key: task.value.clone(),
                state: TaskState::Success,
                error: None,
                result: result.map(|r| r.to_json()),
            },
            Err(error) => TaskInfo {
                key: task.value.clone(),
                state: TaskState::Error,
                error: Some(error),
                result: None,
            },
        };
        let remaining_polls = *self.polls_before_completion.lock().unwrap();
        self.tasks.lock().unwrap().insert(
            task.value.clone(),
            MockTask {
                info,
                remaining_polls,
            },
        );
        task
    }
}

fn not_found_fault(error: VSphereError) -> LocalizedMethodFault {
    fault("ManagedObjectNotFound", &error.to_string())
}

pub(crate) fn reconfigure_cluster(
    client: &MockVSphereClient,
    cluster: &ObjectRef,
    spec: &ClusterConfigSpecEx,
) -> Result<ObjectRef, VSphereError> {
    client.node(cluster)?;
    Ok(client.submit("ReconfigureComputeResource_Task", || {
        let mut nodes = client.nodes.lock().unwrap();
        let node = nodes
            .get_mut(cluster)
            .ok_or_else(|| fault("ManagedObjectNotFound", "cluster disappeared"))?;
        helpers::apply_cluster_spec(&mut node.cluster_config, spec);
        Ok(None)
    }))
}

pub(crate) fn add_host(
    client: &MockVSphereClient,
    parent: &ObjectRef,
    spec: &HostConnectSpec,
    clustered: bool,
) -> Result<ObjectRef, VSphereError> {
    client.node(parent)?;
    let method = if clustered { "AddHost_Task" } else { "AddStandaloneHost_Task" };

    Ok(client.submit(method, || {
        let presented = client.host_thumbprints.lock().unwrap().get(&spec.host_name).cloned();
        if let Some(thumbprint) = presented {
            if spec.ssl_thumbprint.as_deref() != Some(thumbprint.as_str()) {
                return Err(ssl_verify_fault(&spec.host_name, &thumbprint));
            }
        }

        if client.child_named(parent, &spec.host_name).is_some() {
            return Err(LocalizedMethodFault::new(
                MethodFault::DuplicateName {
                    name: Some(spec.host_name.clone()),
                },
                format!("The name '{}' already exists.", spec.host_name),
            ));
        }

        if clustered {
            let host = client.insert_node(ManagedObjectType::HostSystem, Some(parent), &spec.host_name);
            Ok(Some(host))
        } else {
            let compute_resource =
                client.insert_compute_resource(ManagedObjectType::ComputeResource, parent, &spec.host_name);
            client.insert_node(ManagedObjectType::HostSystem, Some(&compute_resource), &spec.host_name);
            Ok(Some(compute_resource))
        }
    }))
}

pub(crate) fn destroy(client: &MockVSphereClient, object: &ObjectRef) -> Result<ObjectRef, VSphereError> {
    client.node(object)?;
    Ok(client.submit("Destroy_Task", || {
        client.remove_subtree(object).map_err(not_found_fault)?;
        Ok(None)
    }))
}

pub(crate) fn task_info(client: &MockVSphereClient, task: &ObjectRef) -> Result<TaskInfo, VSphereError> {
    *client.task_info_reads.lock().unwrap() += 1;

    let mut tasks = client.tasks.lock().unwrap();
    let entry = tasks
        .get_mut(&task.value)
        .ok_or_else(|| VSphereError::NotFound(format!("{} not found", task)))?;

    if entry.remaining_polls > 0 {
        entry.remaining_polls -= 1;
        return Ok(TaskInfo {
            key: entry.info.key.clone(),
            state: TaskState::Running,
            error: None,
            result: None,
        });
    }
    Ok(entry.info.clone())
}
