//! Unit tests for resource pool reconciliation

#[cfg(test)]
mod tests {
    use crate::error::ControllerError;
    use crate::reconciler::Reconciler;
    use crate::test_utils::*;
    use crds::AllocationSection;
    use vsphere_client::{ResourceAllocationInfo, ResourceConfigSpec, SharesInfo, SharesLevel};

    fn cpu_section() -> AllocationSection {
        AllocationSection {
            shares: Some("high".to_string()),
            reservation: Some(1000),
            limit: Some(0),
            expandable_reservation: None,
        }
    }

    #[tokio::test]
    async fn test_create_pool_under_cluster_root_pool() {
        let (reconciler, mock) = create_test_reconciler();
        let dc = mock.add_datacenter("dc1");
        let cluster = mock.add_cluster(&dc, "c1");
        let spec = create_test_pool_spec("web", "dc1", "c1", vec![cpu_section()], vec![]);

        let observed = reconciler.create_resource_pool(&spec).await.unwrap();

        assert_eq!(observed.object.inventory_path, "/dc1/host/c1/Resources/web");
        let creates = mock.calls_to("CreateResourcePool");
        assert_eq!(creates.len(), 1);
        assert_eq!(creates[0].target, mock.root_pool_of(&cluster));
        assert!(mock.calls_to("UpdateConfig").is_empty());

        assert_eq!(
            observed.cpu,
            vec![AllocationSection {
                shares: Some("high".to_string()),
                reservation: Some(1000),
                limit: Some(0),
                expandable_reservation: Some(true),
            }]
        );
        assert_eq!(
            observed.memory,
            vec![AllocationSection {
                shares: Some("normal".to_string()),
                reservation: Some(0),
                limit: Some(0),
                expandable_reservation: Some(true),
            }]
        );
    }

    #[tokio::test]
    async fn test_create_pool_under_standalone_host() {
        let (reconciler, mock) = create_test_reconciler();
        let dc = mock.add_datacenter("dc1");
        mock.add_standalone_host(&dc, "esx1.lab");
        let spec = create_test_pool_spec("batch", "dc1", "esx1.lab", vec![], vec![]);

        let observed = reconciler.create_resource_pool(&spec).await.unwrap();
        assert_eq!(observed.object.inventory_path, "/dc1/host/esx1.lab/Resources/batch");
    }

    #[tokio::test]
    async fn test_adopted_pool_gets_declared_allocation() {
        let (reconciler, mock) = create_test_reconciler();
        let dc = mock.add_datacenter("dc1");
        let cluster = mock.add_cluster(&dc, "c1");
        let pool = mock.add_resource_pool(
            &mock.root_pool_of(&cluster),
            "web",
            ResourceConfigSpec {
                cpu_allocation: ResourceAllocationInfo::new_pool_default(),
                memory_allocation: ResourceAllocationInfo::new_pool_default(),
            },
        );
        let spec = create_test_pool_spec("web", "dc1", "c1", vec![cpu_section()], vec![]);

        let observed = reconciler.create_resource_pool(&spec).await.unwrap();

        assert_eq!(observed.object.object_id, pool.value);
        assert!(mock.calls_to("CreateResourcePool").is_empty());
        let updates = mock.calls_to("UpdateConfig");
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].target, pool);
        assert!(!Reconciler::resource_pool_needs_update(&spec, &observed));
    }

    #[tokio::test]
    async fn test_drift_on_declared_field_only() {
        let (reconciler, mock) = create_test_reconciler();
        let dc = mock.add_datacenter("dc1");
        let cluster = mock.add_cluster(&dc, "c1");
        let mut cpu = ResourceAllocationInfo::new_pool_default();
        cpu.reservation = Some(1000);
        cpu.shares = Some(SharesInfo {
            level: SharesLevel::High,
            shares: None,
        });
        mock.add_resource_pool(
            &mock.root_pool_of(&cluster),
            "web",
            ResourceConfigSpec {
                cpu_allocation: cpu,
                memory_allocation: ResourceAllocationInfo::new_pool_default(),
            },
        );

        let spec = create_test_pool_spec(
            "web",
            "dc1",
            "c1",
            vec![AllocationSection {
                reservation: Some(1000),
                ..Default::default()
            }],
            vec![],
        );
        let observed = reconciler.read_resource_pool(&spec).await.unwrap().unwrap();
        assert!(!Reconciler::resource_pool_needs_update(&spec, &observed));

        let changed = create_test_pool_spec(
            "web",
            "dc1",
            "c1",
            vec![AllocationSection {
                reservation: Some(2000),
                ..Default::default()
            }],
            vec![],
        );
        assert!(Reconciler::resource_pool_needs_update(&changed, &observed));

        let updated = reconciler.update_resource_pool(&changed).await.unwrap();
        assert_eq!(updated.cpu[0].reservation, Some(2000));
        assert_eq!(updated.cpu[0].shares.as_deref(), Some("high"), "undeclared fields are left alone");
    }

    #[tokio::test]
    async fn test_custom_shares_round_trip() {
        let (reconciler, mock) = create_test_reconciler();
        let dc = mock.add_datacenter("dc1");
        mock.add_cluster(&dc, "c1");
        let spec = create_test_pool_spec(
            "web",
            "dc1",
            "c1",
            vec![],
            vec![AllocationSection {
                shares: Some("40960".to_string()),
                ..Default::default()
            }],
        );

        let observed = reconciler.create_resource_pool(&spec).await.unwrap();
        assert_eq!(observed.memory[0].shares.as_deref(), Some("40960"));
        assert!(!Reconciler::resource_pool_needs_update(&spec, &observed));
    }

    #[tokio::test]
    async fn test_invalid_shares_rejected_before_any_call() {
        let (reconciler, mock) = create_test_reconciler();
        let dc = mock.add_datacenter("dc1");
        mock.add_cluster(&dc, "c1");
        let spec = create_test_pool_spec(
            "web",
            "dc1",
            "c1",
            vec![AllocationSection {
                shares: Some("ultra".to_string()),
                ..Default::default()
            }],
            vec![],
        );

        let err = reconciler.create_resource_pool(&spec).await.unwrap_err();
        assert!(matches!(err, ControllerError::Validation(_)));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_parent_fails_without_create() {
        let (reconciler, mock) = create_test_reconciler();
        mock.add_datacenter("dc1");
        let spec = create_test_pool_spec("web", "dc1", "c9", vec![], vec![]);

        let err = reconciler.create_resource_pool(&spec).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(mock.calls_to("CreateResourcePool").is_empty());
    }

    #[tokio::test]
    async fn test_delete_pool_and_keep() {
        let (reconciler, mock) = create_test_reconciler();
        let dc = mock.add_datacenter("dc1");
        let cluster = mock.add_cluster(&dc, "c1");
        let pool = mock.add_resource_pool(&mock.root_pool_of(&cluster), "web", ResourceConfigSpec::default());

        let mut spec = create_test_pool_spec("web", "dc1", "c1", vec![], vec![]);
        spec.keep = true;
        reconciler.delete_resource_pool(&spec).await.unwrap();
        assert!(mock.exists(&pool));
        assert!(mock.calls_to("Destroy_Task").is_empty());

        spec.keep = false;
        reconciler.delete_resource_pool(&spec).await.unwrap();
        assert!(!mock.exists(&pool));
        assert!(reconciler.read_resource_pool(&spec).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_second_memory_section_on_live_pool_rejected() {
        let (reconciler, mock) = create_test_reconciler();
        let dc = mock.add_datacenter("dc1");
        mock.add_cluster(&dc, "c1");
        let spec = create_test_pool_spec("web", "dc1", "c1", vec![cpu_section()], vec![]);
        reconciler.create_resource_pool(&spec).await.unwrap();
        let calls_after_create = mock.calls().len();

        let doubled = create_test_pool_spec(
            "web",
            "dc1",
            "c1",
            vec![cpu_section()],
            vec![AllocationSection::default(), AllocationSection::default()],
        );

        let err = Reconciler::validate_resource_pool(&doubled).unwrap_err();
        assert!(matches!(err, ControllerError::Validation(_)));
        assert!(Reconciler::validate_resource_pool(&spec).is_ok());
        assert_eq!(mock.calls().len(), calls_after_create);
    }
}
