//! Host connect with a one-shot certificate pin retry
//!
//! vCenter refuses to add a host whose certificate it does not trust and
//! reports the offered thumbprint in an `SSLVerifyFault`. When the object
//! opts in with `sslNoVerify`, the connect is resubmitted once with that
//! thumbprint pinned. The retried attempt is final whatever its outcome.

use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use tracing::{info, warn};
use vsphere_client::{HostConnectSpec, MethodFault, ObjectRef, TaskInfo, VSphereError};

/// Where a host gets connected
#[derive(Debug, Clone, Copy)]
pub enum ConnectTarget<'a> {
    /// Datacenter host folder; vCenter wraps the host in its own compute resource
    Standalone(&'a ObjectRef),
    /// Existing cluster
    Cluster(&'a ObjectRef),
}

/// Thumbprint offered by the host when `error` is an `SSLVerifyFault`
pub fn offered_thumbprint(error: &ControllerError) -> Option<&str> {
    match error {
        ControllerError::VSphere(VSphereError::TaskFault(fault)) => match &fault.fault {
            MethodFault::SslVerify(ssl) if !ssl.thumbprint.is_empty() => Some(ssl.thumbprint.as_str()),
            _ => None,
        },
        _ => None,
    }
}

impl Reconciler {
    /// Connect a host, pinning its certificate once when `ssl_no_verify` allows it
    pub async fn connect_host(
        &self,
        target: ConnectTarget<'_>,
        spec: &HostConnectSpec,
        license: Option<&str>,
        ssl_no_verify: bool,
    ) -> Result<TaskInfo, ControllerError> {
        let first = HostConnectSpec {
            ssl_thumbprint: None,
            force: true,
            ..spec.clone()
        };

        let error = match self.submit_connect(target, &first, license).await {
            Ok(info) => return Ok(info),
            Err(e) => e,
        };

        let thumbprint = match offered_thumbprint(&error) {
            Some(thumbprint) => thumbprint.to_string(),
            None => return Err(error),
        };

        if !ssl_no_verify {
            warn!(
                "Host {} presented untrusted certificate {}, sslNoVerify not set",
                spec.host_name, thumbprint
            );
            return Err(ControllerError::UntrustedCertificate {
                host: spec.host_name.clone(),
                thumbprint,
            });
        }

        info!(
            "Retrying connect of host {} with pinned thumbprint {}",
            spec.host_name, thumbprint
        );
        self.submit_connect(target, &first.with_thumbprint(thumbprint), license)
            .await
    }

    async fn submit_connect(
        &self,
        target: ConnectTarget<'_>,
        spec: &HostConnectSpec,
        license: Option<&str>,
    ) -> Result<TaskInfo, ControllerError> {
        let task = match target {
            ConnectTarget::Standalone(folder) => {
                self.vsphere_client
                    .add_standalone_host(folder, spec, license)
                    .await?
            }
            ConnectTarget::Cluster(cluster) => {
                self.vsphere_client
                    .add_cluster_host(cluster, spec, license)
                    .await?
            }
        };
        self.wait_for_task(&task).await
    }
}
