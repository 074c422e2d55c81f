//! Concurrency properties: conditional writes resolve races to exactly one
//! winner, and batch creation claims members exclusively.

#[cfg(test)]
mod tests {
    use fulfillment_core::{
        DeliveryBatchApi, FulfillmentError, MaterialRequestApi, NewBatch, RequestRef,
        RequestStatus,
    };

    use crate::integration::support::world;

    /// Two concurrent batch creations referencing the same request: exactly
    /// one succeeds, the other fails with `AlreadyBatched`.
    #[tokio::test(flavor = "multi_thread")]
    async fn test_overlapping_batch_creation_single_winner() {
        let w = world();
        let shared = w.material_awaiting_pickup(2).await;
        let solo = w.material_awaiting_pickup(1).await;

        let first = {
            let coordinator = w.coordinator.clone();
            let (controller, unit, driver) = (w.controller, w.unit, w.driver);
            tokio::spawn(async move {
                coordinator
                    .create_batch(
                        controller,
                        NewBatch {
                            members: vec![RequestRef::Material(shared)],
                            target_unit_id: unit,
                            driver_id: driver,
                            notes: None,
                        },
                    )
                    .await
            })
        };
        let second = {
            let coordinator = w.coordinator.clone();
            let (controller, unit, driver) = (w.controller, w.unit, w.driver);
            tokio::spawn(async move {
                coordinator
                    .create_batch(
                        controller,
                        NewBatch {
                            members: vec![RequestRef::Material(shared), RequestRef::Material(solo)],
                            target_unit_id: unit,
                            driver_id: driver,
                            notes: None,
                        },
                    )
                    .await
            })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1, "exactly one creation may claim the request");

        let loser = results.into_iter().find(|r| r.is_err()).unwrap();
        assert!(matches!(
            loser.unwrap_err(),
            FulfillmentError::AlreadyBatched(RequestRef::Material(id)) if id == shared
        ));
    }

    /// Two racing attempts at the same transition: one lands, one observes
    /// either the stale status or the already-applied edge. Never two wins.
    #[tokio::test(flavor = "multi_thread")]
    async fn test_racing_approvals_single_winner() {
        let w = world();
        let request = w
            .coordinator
            .create_request(
                w.requester,
                fulfillment_core::NewMaterialRequest {
                    item_id: w.material_item,
                    quantity: 1,
                    urgency: fulfillment_core::Urgency::Low,
                    observations: None,
                },
            )
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..2 {
            let coordinator = w.coordinator.clone();
            let controller = w.controller;
            let id = request.id;
            handles.push(tokio::spawn(async move {
                coordinator.approve_request(id, controller).await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(
                    FulfillmentError::StaleState { .. }
                    | FulfillmentError::InvalidTransition { .. },
                ) => {}
                Err(other) => panic!("unexpected failure: {other}"),
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(
            w.coordinator.get_request(request.id).await.unwrap().status,
            RequestStatus::Approved
        );
    }

    /// Stale writers lose against the store even outside any race, because
    /// the write is conditioned on the observed status.
    #[tokio::test]
    async fn test_conditional_write_is_the_unit_of_write() {
        use fulfillment_core::RequestStore;

        let w = world();
        let rid = w.material_awaiting_pickup(1).await;

        // A reader takes a snapshot while the request awaits pickup.
        let mut stale = RequestStore::get(w.store.as_ref(), rid).await.unwrap();

        // Someone else advances the entity under the snapshot holder.
        let batch = w
            .coordinator
            .create_batch(
                w.controller,
                NewBatch {
                    members: vec![RequestRef::Material(rid)],
                    target_unit_id: w.unit,
                    driver_id: w.driver,
                    notes: None,
                },
            )
            .await
            .unwrap();
        w.coordinator.dispatch_batch(batch.id, w.driver).await.unwrap();

        // On the stale view the rejection edge is still legal, so the local
        // mutation goes through; the conditional write is what catches it.
        stale.reject("no longer needed".to_string()).unwrap();
        let err = RequestStore::replace(w.store.as_ref(), RequestStatus::AwaitingPickup, stale)
            .await
            .unwrap_err();
        assert!(matches!(err, FulfillmentError::StaleState { .. }));

        // The dispatched state is untouched.
        assert_eq!(
            w.coordinator.get_request(rid).await.unwrap().status,
            RequestStatus::OutForDelivery
        );
    }
}
