//! Unit tests for status bookkeeping

#[cfg(test)]
mod tests {
    use crate::error::ControllerError;
    use crate::lifecycle::{failed_status_patch, resource_key, settled_state, status_patch, VSphereResource};
    use crate::reconciler::{ObservedCluster, ObservedObject};
    use crate::test_utils::*;
    use crds::{DrsSection, ResourceState, VSphereCluster, VSphereClusterStatus, VSphereDatacenter, VSphereDatacenterStatus};

    fn observed_datacenter() -> ObservedObject {
        ObservedObject {
            object_id: "datacenter-10".to_string(),
            inventory_path: "/dc1".to_string(),
        }
    }

    #[test]
    fn test_first_status_is_always_written() {
        let desired = VSphereDatacenter::status_for(Some(&observed_datacenter()), ResourceState::Created, None);

        let patch = status_patch(None, &desired).unwrap().unwrap();

        assert_eq!(patch["status"]["objectId"], "datacenter-10");
        assert_eq!(patch["status"]["inventoryPath"], "/dc1");
        assert_eq!(patch["status"]["state"], "Created");
        assert!(patch["status"]["lastReconciled"].is_string());
    }

    #[test]
    fn test_unchanged_status_is_not_patched() {
        let current = VSphereDatacenterStatus {
            object_id: Some("datacenter-10".to_string()),
            inventory_path: Some("/dc1".to_string()),
            state: ResourceState::Created,
            error: None,
            last_reconciled: Some(chrono::Utc::now()),
        };
        let desired = VSphereDatacenter::status_for(Some(&observed_datacenter()), ResourceState::Created, None);

        assert!(status_patch(Some(&current), &desired).unwrap().is_none());
    }

    #[test]
    fn test_recovered_resource_clears_error() {
        let current = VSphereDatacenterStatus {
            object_id: Some("datacenter-10".to_string()),
            inventory_path: Some("/dc1".to_string()),
            state: ResourceState::Failed,
            error: Some("vSphere error: connection refused".to_string()),
            last_reconciled: None,
        };
        let desired = VSphereDatacenter::status_for(Some(&observed_datacenter()), ResourceState::Created, None);

        let patch = status_patch(Some(&current), &desired).unwrap().unwrap();

        assert_eq!(patch["status"]["state"], "Created");
        assert!(patch["status"]["error"].is_null());
        assert!(patch["status"].as_object().unwrap().contains_key("error"));
    }

    #[test]
    fn test_removed_object_clears_identity() {
        let current = VSphereDatacenterStatus {
            object_id: Some("datacenter-10".to_string()),
            inventory_path: Some("/dc1".to_string()),
            state: ResourceState::Created,
            error: None,
            last_reconciled: None,
        };
        let desired = VSphereDatacenter::status_for(None, ResourceState::Pending, Some("gone".to_string()));

        let patch = status_patch(Some(&current), &desired).unwrap().unwrap();

        assert_eq!(patch["status"]["state"], "Pending");
        assert_eq!(patch["status"]["error"], "gone");
        assert!(patch["status"]["objectId"].is_null());
        assert!(patch["status"]["inventoryPath"].is_null());
    }

    #[test]
    fn test_cluster_status_reports_observed_sections() {
        let observed = ObservedCluster {
            object: ObservedObject {
                object_id: "domain-c11".to_string(),
                inventory_path: "/dc2/host/c1".to_string(),
            },
            drs: vec![DrsSection {
                enable_vm_automation_override: Some(true),
                default_automation_level: Some("manual".to_string()),
                migration_threshold: Some(2),
            }],
            ha: vec![],
        };

        let status: VSphereClusterStatus = VSphereCluster::status_for(Some(&observed), ResourceState::Updated, None);
        assert_eq!(status.object_id.as_deref(), Some("domain-c11"));
        assert_eq!(status.drs, observed.drs);
        assert!(status.ha.is_empty());
        assert_eq!(status.state, ResourceState::Updated);

        // drs emptied on vCenter side: the stale section must be removed from status
        let disabled = ObservedCluster {
            drs: vec![],
            ..observed
        };
        let desired = VSphereCluster::status_for(Some(&disabled), ResourceState::Created, None);
        let patch = status_patch(Some(&status), &desired).unwrap().unwrap();
        assert!(patch["status"]["drs"].is_null());
    }

    #[test]
    fn test_settled_state_keeps_updated() {
        assert_eq!(settled_state(Some(&ResourceState::Updated)), ResourceState::Updated);
        assert_eq!(settled_state(Some(&ResourceState::Created)), ResourceState::Created);
        assert_eq!(settled_state(Some(&ResourceState::Failed)), ResourceState::Created);
        assert_eq!(settled_state(Some(&ResourceState::Pending)), ResourceState::Created);
        assert_eq!(settled_state(None), ResourceState::Created);
    }

    #[test]
    fn test_failed_patch_keeps_identity() {
        let patch = failed_status_patch(&ControllerError::Validation("drs may only be declared once".to_string()));

        let status = patch["status"].as_object().unwrap();
        assert_eq!(status["state"], "Failed");
        assert_eq!(status["error"], "Validation failed: drs may only be declared once");
        assert!(!status.contains_key("objectId"));
        assert!(!status.contains_key("inventoryPath"));
    }

    #[test]
    fn test_recorded_identity_read_from_status() {
        let spec = create_test_cluster_spec("c1", "dc2", vec![], vec![]);

        let fresh = create_test_cluster("c1", "infra", spec.clone(), None);
        assert_eq!(resource_key(&fresh), "infra/c1");
        assert!(fresh.recorded_object_id().is_none(), "no status means the object must be created");
        assert!(fresh.recorded_state().is_none());

        let status = VSphereClusterStatus {
            object_id: Some("domain-c11".to_string()),
            state: ResourceState::Updated,
            ..Default::default()
        };
        let recorded = create_test_cluster("c1", "infra", spec, Some(status));
        assert_eq!(recorded.recorded_object_id(), Some("domain-c11"));
        assert_eq!(recorded.recorded_state(), Some(&ResourceState::Updated));
        assert_eq!(settled_state(recorded.recorded_state()), ResourceState::Updated);
    }

    #[test]
    fn test_recorded_cluster_with_duplicate_section_fails_validation() {
        let drs = DrsSection {
            default_automation_level: Some("manual".to_string()),
            ..Default::default()
        };
        let status = VSphereClusterStatus {
            object_id: Some("domain-c11".to_string()),
            state: ResourceState::Created,
            ..Default::default()
        };
        let cluster = create_test_cluster(
            "c1",
            "infra",
            create_test_cluster_spec("c1", "dc1", vec![drs.clone(), drs], vec![]),
            Some(status),
        );

        assert!(cluster.recorded_object_id().is_some());
        assert!(matches!(cluster.validate(), Err(ControllerError::Validation(_))));
    }

    #[test]
    fn test_kinds_without_sections_always_validate() {
        let datacenter = VSphereDatacenter::new("dc1", create_test_datacenter_spec("dc1", false));
        assert!(datacenter.validate().is_ok());
    }
}
