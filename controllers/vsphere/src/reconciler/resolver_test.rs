//! Unit tests for the inventory path resolver

#[cfg(test)]
mod tests {
    use crate::error::ControllerError;
    use crate::reconciler::resolver::Resolver;
    use vsphere_client::{MockVSphereClient, ResourceConfigSpec, VSphereClientTrait};

    #[tokio::test]
    async fn test_datacenter_by_name() {
        let mock = MockVSphereClient::new("https://vcenter.test");
        let dc1 = mock.add_datacenter("dc1");
        mock.add_datacenter("dc2");

        let resolver = Resolver::new(&mock);
        let resolved = resolver.datacenter(Some("dc1")).await.unwrap();
        assert_eq!(resolved.reference, dc1);
        assert_eq!(resolved.inventory_path, "/dc1");

        let missing = resolver.datacenter(Some("dc3")).await.unwrap_err();
        assert!(missing.is_not_found());
    }

    #[tokio::test]
    async fn test_default_datacenter_must_be_unique() {
        let mock = MockVSphereClient::new("https://vcenter.test");
        let resolver = Resolver::new(&mock);
        assert!(resolver.datacenter(None).await.unwrap_err().is_not_found());

        let dc1 = mock.add_datacenter("dc1");
        let resolver = Resolver::new(&mock);
        assert_eq!(resolver.datacenter(None).await.unwrap().reference, dc1);

        mock.add_datacenter("dc2");
        let resolver = Resolver::new(&mock);
        let err = resolver.datacenter(None).await.unwrap_err();
        match err {
            ControllerError::AmbiguousMatch { matches, .. } => {
                assert_eq!(matches, vec!["/dc1".to_string(), "/dc2".to_string()]);
            }
            other => panic!("expected AmbiguousMatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cluster_resolved_in_its_datacenter_only() {
        let mock = MockVSphereClient::new("https://vcenter.test");
        let dc1 = mock.add_datacenter("dc1");
        let dc2 = mock.add_datacenter("dc2");
        mock.add_cluster(&dc1, "c1");
        let c1_dc2 = mock.add_cluster(&dc2, "c1");

        let resolver = Resolver::new(&mock);
        let dc = resolver.datacenter(Some("dc2")).await.unwrap();
        let cluster = resolver.cluster(&dc, "c1").await.unwrap();
        assert_eq!(cluster.reference, c1_dc2);
        assert_eq!(cluster.inventory_path, "/dc2/host/c1");
    }

    #[tokio::test]
    async fn test_host_under_other_cluster_is_path_mismatch() {
        let mock = MockVSphereClient::new("https://vcenter.test");
        let dc = mock.add_datacenter("dc1");
        let x = mock.add_cluster(&dc, "X");
        mock.add_cluster(&dc, "Y");
        mock.add_cluster_host(&x, "esx1.lab");

        let resolver = Resolver::new(&mock);
        let datacenter = resolver.datacenter(Some("dc1")).await.unwrap();

        let err = resolver.host(&datacenter, Some("Y"), "esx1.lab").await.unwrap_err();
        match err {
            ControllerError::PathMismatch { expected, found } => {
                assert_eq!(expected, "/dc1/host/Y/esx1.lab");
                assert_eq!(found, "/dc1/host/X/esx1.lab");
            }
            other => panic!("expected PathMismatch, got {:?}", other),
        }
        let found = resolver.host(&datacenter, Some("X"), "esx1.lab").await.unwrap();
        assert_eq!(found.inventory_path, "/dc1/host/X/esx1.lab");
    }

    #[tokio::test]
    async fn test_standalone_host_expected_path() {
        let mock = MockVSphereClient::new("https://vcenter.test");
        let dc = mock.add_datacenter("dc1");
        let host = mock.add_standalone_host(&dc, "esx2.lab");

        let resolver = Resolver::new(&mock);
        let datacenter = resolver.datacenter(Some("dc1")).await.unwrap();
        let found = resolver.host(&datacenter, None, "esx2.lab").await.unwrap();
        assert_eq!(found.reference, host);
        assert_eq!(found.inventory_path, "/dc1/host/esx2.lab/esx2.lab");

        // declared into a cluster while it is standalone
        let err = resolver.host(&datacenter, Some("c1"), "esx2.lab").await.unwrap_err();
        assert!(matches!(err, ControllerError::PathMismatch { .. }));

        let missing = resolver.host(&datacenter, None, "esx3.lab").await.unwrap_err();
        assert!(missing.is_not_found());
    }

    #[tokio::test]
    async fn test_resource_pool_selected_by_parent() {
        let mock = MockVSphereClient::new("https://vcenter.test");
        let dc = mock.add_datacenter("dc1");
        let c1 = mock.add_cluster(&dc, "c1");
        let c2 = mock.add_cluster(&dc, "c2");
        mock.add_resource_pool(&mock.root_pool_of(&c1), "web", ResourceConfigSpec::default());
        let web_c2 = mock.add_resource_pool(&mock.root_pool_of(&c2), "web", ResourceConfigSpec::default());

        let resolver = Resolver::new(&mock);
        let datacenter = resolver.datacenter(Some("dc1")).await.unwrap();
        let pool = resolver.resource_pool(&datacenter, "c2", "web").await.unwrap();
        assert_eq!(pool.reference, web_c2);
        assert_eq!(pool.inventory_path, "/dc1/host/c2/Resources/web");

        let parent = resolver.parent_pool(&datacenter, "c2").await.unwrap();
        assert_eq!(parent.reference, mock.root_pool_of(&c2));

        let missing = resolver.resource_pool(&datacenter, "c3", "web").await.unwrap_err();
        assert!(missing.is_not_found());
    }

    #[tokio::test]
    async fn test_resource_pool_ambiguous_match() {
        let mock = MockVSphereClient::new("https://vcenter.test");
        let dc = mock.add_datacenter("dc1");
        let c1 = mock.add_cluster(&dc, "c1");
        let root = mock.root_pool_of(&c1);
        mock.add_resource_pool(&root, "web", ResourceConfigSpec::default());
        // /dc1/host/c1/Resources/c1/Resources/web ends the same way
        let nested = mock.add_resource_pool(&root, "c1", ResourceConfigSpec::default());
        let nested_root = mock.add_resource_pool(&nested, "Resources", ResourceConfigSpec::default());
        mock.add_resource_pool(&nested_root, "web", ResourceConfigSpec::default());

        let resolver = Resolver::new(&mock);
        let datacenter = resolver.datacenter(Some("dc1")).await.unwrap();
        let err = resolver.resource_pool(&datacenter, "c1", "web").await.unwrap_err();
        match err {
            ControllerError::AmbiguousMatch { matches, .. } => assert_eq!(matches.len(), 2),
            other => panic!("expected AmbiguousMatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolution_stable_within_a_pass() {
        let mock = MockVSphereClient::new("https://vcenter.test");
        let dc = mock.add_datacenter("dc1");
        let cluster = mock.add_cluster(&dc, "c1");

        let resolver = Resolver::new(&mock);
        let datacenter = resolver.datacenter(Some("dc1")).await.unwrap();
        let first = resolver.cluster(&datacenter, "c1").await.unwrap();

        mock.destroy(&cluster).await.unwrap();
        let second = resolver.cluster(&datacenter, "c1").await.unwrap();
        assert_eq!(first, second);

        resolver.invalidate();
        let after = resolver.cluster(&datacenter, "c1").await.unwrap_err();
        assert!(after.is_not_found());
    }

    #[tokio::test]
    async fn test_star_in_name_is_matched_literally() {
        let mock = MockVSphereClient::new("https://vcenter.test");
        let dc = mock.add_datacenter("dc1");
        mock.add_datacenter("dc10");
        mock.add_cluster(&dc, "prod1");

        let resolver = Resolver::new(&mock);
        assert!(resolver.datacenter(Some("dc*")).await.unwrap_err().is_not_found());

        let datacenter = resolver.datacenter(Some("dc1")).await.unwrap();
        let err = resolver.cluster(&datacenter, "prod*").await.unwrap_err();
        assert!(err.is_not_found(), "expected NotFound, got {:?}", err);

        let starred = mock.add_cluster(&dc, "prod*");
        let resolver = Resolver::new(&mock);
        let datacenter = resolver.datacenter(Some("dc1")).await.unwrap();
        let cluster = resolver.cluster(&datacenter, "prod*").await.unwrap();
        assert_eq!(cluster.reference, starred);
        assert_eq!(cluster.inventory_path, "/dc1/host/prod*");
    }
}
