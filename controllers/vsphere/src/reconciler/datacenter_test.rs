//! Unit tests for datacenter reconciliation

#[cfg(test)]
mod tests {
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_datacenter_on_root_folder() {
        let (reconciler, mock) = create_test_reconciler();
        let spec = create_test_datacenter_spec("dc1", false);

        let observed = reconciler.create_datacenter(&spec).await.unwrap();

        assert_eq!(observed.inventory_path, "/dc1");
        assert!(observed.object_id.starts_with("datacenter-"));
        let calls = mock.calls_to("CreateDatacenter");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].body["name"], "dc1");
        assert_eq!(calls[0].target.value, "group-d1");
    }

    #[tokio::test]
    async fn test_create_adopts_existing_datacenter() {
        let (reconciler, mock) = create_test_reconciler();
        let existing = mock.add_datacenter("dc1");

        let observed = reconciler
            .create_datacenter(&create_test_datacenter_spec("dc1", false))
            .await
            .unwrap();

        assert_eq!(observed.object_id, existing.value);
        assert!(mock.calls().is_empty(), "adoption makes no mutating call");
    }

    #[tokio::test]
    async fn test_read_clears_removed_datacenter() {
        let (reconciler, mock) = create_test_reconciler();
        let spec = create_test_datacenter_spec("dc1", false);
        assert!(reconciler.read_datacenter(&spec).await.unwrap().is_none());

        let dc = mock.add_datacenter("dc1");
        let observed = reconciler.read_datacenter(&spec).await.unwrap().unwrap();
        assert_eq!(observed.object_id, dc.value);
    }

    #[tokio::test]
    async fn test_delete_destroys_datacenter() {
        let (reconciler, mock) = create_test_reconciler();
        let dc = mock.add_datacenter("dc1");

        reconciler
            .delete_datacenter(&create_test_datacenter_spec("dc1", false))
            .await
            .unwrap();

        assert_eq!(mock.calls_to("Destroy_Task").len(), 1);
        assert!(!mock.exists(&dc));
    }

    #[tokio::test]
    async fn test_retained_delete_submits_nothing() {
        let (reconciler, mock) = create_test_reconciler();
        let dc = mock.add_datacenter("dc1");

        reconciler
            .delete_datacenter(&create_test_datacenter_spec("dc1", true))
            .await
            .unwrap();

        assert!(mock.calls_to("Destroy_Task").is_empty());
        assert!(mock.exists(&dc));
    }
}
