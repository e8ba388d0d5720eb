//! Unit tests for host reconciliation

#[cfg(test)]
mod tests {
    use crate::error::ControllerError;
    use crate::test_utils::*;
    use vsphere_client::{ssl_verify_fault, ManagedObjectType};

    #[tokio::test]
    async fn test_add_standalone_host() {
        let (reconciler, mock) = create_test_reconciler();
        let dc = mock.add_datacenter("dc1");
        let mut spec = create_test_host_spec("esx1.lab", Some("dc1"), None, false);
        spec.license = Some("AAAAA-BBBBB-CCCCC-DDDDD-EEEEE".to_string());

        let observed = reconciler.create_host(&spec, "secret").await.unwrap();

        assert_eq!(observed.inventory_path, "/dc1/host/esx1.lab/esx1.lab");
        assert!(observed.object_id.starts_with("host-"));
        let calls = mock.calls_to("AddStandaloneHost_Task");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].target, mock.host_folder_of(&dc));
        assert_eq!(calls[0].body["spec"]["userName"], "root");
        assert_eq!(calls[0].body["spec"]["password"], "secret");
        assert_eq!(calls[0].body["license"], "AAAAA-BBBBB-CCCCC-DDDDD-EEEEE");
        assert_eq!(calls[0].body["addConnected"], true);
    }

    #[tokio::test]
    async fn test_add_host_to_cluster_in_default_datacenter() {
        let (reconciler, mock) = create_test_reconciler();
        let dc = mock.add_datacenter("dc1");
        let cluster = mock.add_cluster(&dc, "c1");
        let spec = create_test_host_spec("esx2.lab", None, Some("c1"), false);

        let observed = reconciler.create_host(&spec, "secret").await.unwrap();

        assert_eq!(observed.inventory_path, "/dc1/host/c1/esx2.lab");
        let calls = mock.calls_to("AddHost_Task");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].target, cluster);
        assert_eq!(calls[0].body["asConnected"], true);
    }

    #[tokio::test]
    async fn test_existing_host_adopted() {
        let (reconciler, mock) = create_test_reconciler();
        let dc = mock.add_datacenter("dc1");
        let host = mock.add_standalone_host(&dc, "esx1.lab");

        let observed = reconciler
            .create_host(&create_test_host_spec("esx1.lab", Some("dc1"), None, false), "secret")
            .await
            .unwrap();

        assert_eq!(observed.object_id, host.value);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_host_in_wrong_cluster_not_adopted() {
        let (reconciler, mock) = create_test_reconciler();
        let dc = mock.add_datacenter("dc1");
        let x = mock.add_cluster(&dc, "X");
        mock.add_cluster(&dc, "Y");
        mock.add_cluster_host(&x, "esx1.lab");
        let spec = create_test_host_spec("esx1.lab", Some("dc1"), Some("Y"), false);

        let err = reconciler.create_host(&spec, "secret").await.unwrap_err();
        assert!(matches!(err, ControllerError::PathMismatch { .. }));
        assert!(mock.calls().is_empty());

        let read = reconciler.read_host(&spec).await;
        assert!(matches!(read, Err(ControllerError::PathMismatch { .. })), "a misplaced host is not a removed host");
    }

    #[tokio::test]
    async fn test_ssl_opt_in_connects_with_pinned_thumbprint() {
        let (reconciler, mock) = create_test_reconciler();
        mock.add_datacenter("dc1");
        mock.set_host_thumbprint("esx1.lab", "12:34:56");
        let spec = create_test_host_spec("esx1.lab", Some("dc1"), None, true);

        let observed = reconciler.create_host(&spec, "secret").await.unwrap();

        assert_eq!(observed.inventory_path, "/dc1/host/esx1.lab/esx1.lab");
        let calls = mock.calls_to("AddStandaloneHost_Task");
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].body["spec"]["sslThumbprint"], "12:34:56");
    }

    #[tokio::test]
    async fn test_two_ssl_faults_fail_after_two_submissions() {
        let (reconciler, mock) = create_test_reconciler();
        mock.add_datacenter("dc1");
        mock.fail_next_task("AddStandaloneHost_Task", ssl_verify_fault("esx1.lab", "12:34:56"));
        mock.fail_next_task("AddStandaloneHost_Task", ssl_verify_fault("esx1.lab", "12:34:56"));
        let spec = create_test_host_spec("esx1.lab", Some("dc1"), None, true);

        let err = reconciler.create_host(&spec, "secret").await.unwrap_err();

        assert!(matches!(err, ControllerError::VSphere(_)));
        assert_eq!(mock.calls_to("AddStandaloneHost_Task").len(), 2);
    }

    #[tokio::test]
    async fn test_delete_standalone_host_destroys_compute_resource() {
        let (reconciler, mock) = create_test_reconciler();
        let dc = mock.add_datacenter("dc1");
        mock.add_standalone_host(&dc, "esx0.lab");
        let host = mock.add_standalone_host(&dc, "esx1.lab");
        let compute_resource = mock.parent_of(&host).unwrap();
        mock.add_cluster(&dc, "c1");

        reconciler
            .delete_host(&create_test_host_spec("esx1.lab", Some("dc1"), None, false))
            .await
            .unwrap();

        let destroys = mock.calls_to("Destroy_Task");
        assert_eq!(destroys.len(), 1);
        assert_eq!(destroys[0].target, compute_resource);
        assert_eq!(destroys[0].target.kind, ManagedObjectType::ComputeResource);
        assert!(!mock.exists(&host));
    }

    #[tokio::test]
    async fn test_delete_clustered_host_is_noop() {
        let (reconciler, mock) = create_test_reconciler();
        let dc = mock.add_datacenter("dc1");
        let cluster = mock.add_cluster(&dc, "c1");
        let host = mock.add_cluster_host(&cluster, "esx1.lab");

        reconciler
            .delete_host(&create_test_host_spec("esx1.lab", Some("dc1"), Some("c1"), false))
            .await
            .unwrap();

        assert!(mock.calls().is_empty());
        assert!(mock.exists(&host));
    }

    #[tokio::test]
    async fn test_retained_host_delete_submits_nothing() {
        let (reconciler, mock) = create_test_reconciler();
        let dc = mock.add_datacenter("dc1");
        let host = mock.add_standalone_host(&dc, "esx1.lab");
        let mut spec = create_test_host_spec("esx1.lab", Some("dc1"), None, false);
        spec.keep = true;

        reconciler.delete_host(&spec).await.unwrap();

        assert!(mock.calls_to("Destroy_Task").is_empty());
        assert!(mock.exists(&host));
    }

    #[tokio::test]
    async fn test_read_host_after_removal() {
        let (reconciler, mock) = create_test_reconciler();
        let dc = mock.add_datacenter("dc1");
        mock.add_standalone_host(&dc, "esx1.lab");
        let spec = create_test_host_spec("esx1.lab", Some("dc1"), None, false);

        assert!(reconciler.read_host(&spec).await.unwrap().is_some());
        reconciler.delete_host(&spec).await.unwrap();
        assert!(reconciler.read_host(&spec).await.unwrap().is_none());
    }
}
