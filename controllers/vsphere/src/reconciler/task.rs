//! Waiting for vCenter tasks
//!
//! There is no client-side timeout; a task is polled until vCenter reports a
//! terminal state.

use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use tracing::debug;
use vsphere_client::{LocalizedMethodFault, MethodFault, ObjectRef, TaskInfo, TaskState, VSphereError};

impl Reconciler {
    /// Poll `task` until it succeeds or fails
    ///
    /// A failed task surfaces its `LocalizedMethodFault` as
    /// `VSphereError::TaskFault` so callers can match on the fault.
    pub async fn wait_for_task(&self, task: &ObjectRef) -> Result<TaskInfo, ControllerError> {
        loop {
            let info = self.vsphere_client.task_info(task).await?;
            match info.state {
                TaskState::Success => {
                    debug!("Task {} completed", task);
                    return Ok(info);
                }
                TaskState::Error => {
                    let fault = info.error.unwrap_or_else(|| {
                        LocalizedMethodFault::new(
                            MethodFault::Other {
                                type_name: "SystemError".to_string(),
                                fields: Default::default(),
                            },
                            format!("task {} failed without a fault", task),
                        )
                    });
                    debug!("Task {} failed: {}", task, fault);
                    return Err(VSphereError::TaskFault(fault).into());
                }
                TaskState::Queued | TaskState::Running => {
                    tokio::time::sleep(self.task_poll_interval).await;
                }
            }
        }
    }
}
