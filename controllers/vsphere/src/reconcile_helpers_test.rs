//! Unit tests for reconcile_helpers module

#[cfg(test)]
mod tests {
    use crate::error::ControllerError;
    use crate::reconcile_helpers::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use vsphere_client::VSphereError;

    #[tokio::test]
    async fn test_find_or_create_adopts_existing() {
        let creates = AtomicU32::new(0);
        let (value, created) = find_or_create(
            "datacenter",
            "dc1",
            || async { Ok::<_, ControllerError>("datacenter-1") },
            || async {
                creates.fetch_add(1, Ordering::SeqCst);
                Ok("datacenter-2")
            },
        )
        .await
        .unwrap();

        assert_eq!(value, "datacenter-1");
        assert!(!created);
        assert_eq!(creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_find_or_create_creates_on_not_found() {
        let (value, created) = find_or_create(
            "datacenter",
            "dc1",
            || async { Err(ControllerError::VSphere(VSphereError::NotFound("dc1".to_string()))) },
            || async { Ok("datacenter-2") },
        )
        .await
        .unwrap();

        assert_eq!(value, "datacenter-2");
        assert!(created);
    }

    #[tokio::test]
    async fn test_find_or_create_propagates_other_errors() {
        let creates = AtomicU32::new(0);
        let result: Result<(&str, bool), _> = find_or_create(
            "resource pool",
            "p1",
            || async {
                Err(ControllerError::AmbiguousMatch {
                    pattern: "/dc1/*/Resources/p1".to_string(),
                    matches: vec!["/dc1/host/a/Resources/p1".to_string(), "/dc1/host/b/Resources/p1".to_string()],
                })
            },
            || async {
                creates.fetch_add(1, Ordering::SeqCst);
                Ok("resgroup-1")
            },
        )
        .await;

        assert!(matches!(result, Err(ControllerError::AmbiguousMatch { .. })));
        assert_eq!(creates.load(Ordering::SeqCst), 0, "ambiguous lookups must not create");
    }

    #[tokio::test]
    async fn test_find_or_create_surfaces_create_failure() {
        let result: Result<(&str, bool), _> = find_or_create(
            "cluster",
            "c1",
            || async { Err(ControllerError::NotFound("c1".to_string())) },
            || async { Err(ControllerError::VSphere(VSphereError::Api("DuplicateName".to_string()))) },
        )
        .await;

        assert!(matches!(result, Err(ControllerError::VSphere(VSphereError::Api(_)))));
    }

    #[tokio::test]
    async fn test_check_existing_clears_on_not_found() {
        let existing = check_existing("host", "esx1", async { Ok::<_, ControllerError>(7) })
            .await
            .unwrap();
        assert_eq!(existing, Some(7));

        let removed: Option<u32> = check_existing("host", "esx1", async {
            Err(ControllerError::NotFound("esx1".to_string()))
        })
        .await
        .unwrap();
        assert_eq!(removed, None);
    }

    #[tokio::test]
    async fn test_check_existing_keeps_transport_errors() {
        let result: Result<Option<u32>, _> = check_existing("host", "esx1", async {
            Err(ControllerError::VSphere(VSphereError::Authentication("session expired".to_string())))
        })
        .await;
        assert!(result.is_err(), "only not-found may clear the recorded identity");
    }
}
