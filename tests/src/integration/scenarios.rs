//! End-to-end delivery scenarios: the scan-and-confirm path, the
//! confirm-later path, the disposal-justification guard, and the
//! individually-dispatched furniture handoff.

#[cfg(test)]
mod tests {
    use fulfillment_core::{
        daily_code, BatchStatus, Clock, ConfirmationKind, DeferredProof, DeliveryBatchApi, DeliveryProof,
        DesignDecision, FulfillmentError, FulfillmentQueries, FurnitureRequestApi,
        FurnitureStatus, MaterialRequestApi, NewBatch, NewFurnitureRequest, NewRemoval,
        ReceiptProof, RemovalApi, RemovalDecision, RemovalStatus, RequestRef, RequestStatus,
    };

    use crate::integration::support::world;

    /// Scenario A: request created, approved, processed, batched, dispatched,
    /// scan-confirmed by the driver, then receipt-confirmed by the unit
    /// controller. Both the request and the batch finish completed.
    #[tokio::test]
    async fn test_scan_and_confirm_delivery_end_to_end() {
        let w = world();
        let rid = w.material_awaiting_pickup(5).await;

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
        assert_eq!(batch.status, BatchStatus::Pending);

        let batch = w.coordinator.dispatch_batch(batch.id, w.driver).await.unwrap();
        assert_eq!(batch.status, BatchStatus::InTransit);
        assert!(batch.qr_code.is_some());
        assert_eq!(
            w.coordinator.get_request(rid).await.unwrap().status,
            RequestStatus::OutForDelivery
        );

        // Driver validates the controller's code at the door.
        let today = w.clock.now().date_naive();
        let batch = w
            .coordinator
            .confirm_delivery(
                batch.id,
                w.driver,
                DeliveryProof {
                    recipient: w.controller,
                    code: daily_code::code(w.controller, today),
                    photo_url: "https://evidence/handoff.jpg".to_string(),
                    location: None,
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(batch.status, BatchStatus::DeliveryConfirmed);
        assert_eq!(
            w.coordinator.get_request(rid).await.unwrap().status,
            RequestStatus::DeliveryConfirmed
        );

        // Controller independently proves identity with their own code.
        let batch = w
            .coordinator
            .confirm_receipt(
                batch.id,
                w.controller,
                ReceiptProof {
                    code: daily_code::format_code(&daily_code::code(w.controller, today)),
                    photo_url: "https://evidence/shelf.jpg".to_string(),
                    notes: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(batch.status, BatchStatus::Completed);
        assert!(batch.completed_at.is_some());
        let request = w.coordinator.get_request(rid).await.unwrap();
        assert_eq!(request.status, RequestStatus::Completed);
        assert!(request.completed_at.is_some());

        // Stock decremented once, ledger holds both proofs in order.
        assert_eq!(w.stock.level(w.material_item, w.unit), 95);
        let entries = w.coordinator.entries_for(batch.id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, ConfirmationKind::Delivery);
        assert_eq!(entries[1].kind, ConfirmationKind::Receipt);
        assert_eq!(entries[0].received_by, Some(w.controller));
    }

    /// Scenario B: the driver defers confirmation; the batch sits in the
    /// weaker-trust state until the controller's code closes the loop, at
    /// which point it jumps to received-confirmed directly.
    #[tokio::test]
    async fn test_confirm_later_closes_via_receipt() {
        let w = world();
        let rid = w.material_awaiting_pickup(3).await;

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

        let batch = w
            .coordinator
            .confirm_later(
                batch.id,
                w.driver,
                DeferredProof {
                    photo_url: "https://evidence/reception.jpg".to_string(),
                    location: None,
                    notes: Some("left at reception".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(batch.status, BatchStatus::PendingConfirmation);

        // The deferred attestation captured no recipient identity.
        let entries = w.coordinator.entries_for(batch.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, ConfirmationKind::Delivery);
        assert_eq!(entries[0].received_by, None);

        let today = w.clock.now().date_naive();
        let batch = w
            .coordinator
            .confirm_receipt(
                batch.id,
                w.controller,
                ReceiptProof {
                    code: daily_code::code(w.controller, today),
                    photo_url: "https://evidence/shelf.jpg".to_string(),
                    notes: None,
                },
            )
            .await
            .unwrap();

        // Receipt moved the batch straight through to completed.
        assert_eq!(batch.status, BatchStatus::Completed);
        assert!(batch.received_confirmed_at.is_some());
        assert_eq!(
            w.coordinator.get_request(rid).await.unwrap().status,
            RequestStatus::Completed
        );
    }

    /// When the confirming party is the original requester rather than a
    /// controller, the batch takes the requester side branch.
    #[tokio::test]
    async fn test_requester_confirmation_branch() {
        let w = world();
        let rid = w.material_awaiting_pickup(2).await;

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
        w.coordinator
            .confirm_later(
                batch.id,
                w.driver,
                DeferredProof {
                    photo_url: "https://evidence/reception.jpg".to_string(),
                    location: None,
                    notes: None,
                },
            )
            .await
            .unwrap();

        let today = w.clock.now().date_naive();
        let batch = w
            .coordinator
            .confirm_receipt(
                batch.id,
                w.requester,
                ReceiptProof {
                    code: daily_code::code(w.requester, today),
                    photo_url: "https://evidence/office.jpg".to_string(),
                    notes: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(batch.status, BatchStatus::Completed);
        assert!(batch.confirmed_by_requester_at.is_some());
        let entries = w.coordinator.entries_for(batch.id).await.unwrap();
        assert_eq!(entries[1].kind, ConfirmationKind::Requester);
    }

    /// Scenario C: disposal without justification is refused outright;
    /// the resubmission with a justification goes through.
    #[tokio::test]
    async fn test_disposal_requires_justification() {
        let w = world();
        let removal = w
            .coordinator
            .create_removal(
                w.requester,
                NewRemoval {
                    item_id: w.furniture_item,
                    quantity: 1,
                    reason: "water damage".to_string(),
                },
            )
            .await
            .unwrap();

        let err = w
            .coordinator
            .review_removal(
                removal.id,
                w.controller,
                RemovalDecision::Disposal,
                Some(String::new()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, FulfillmentError::MissingJustification));
        assert_eq!(
            w.coordinator.get_removal(removal.id).await.unwrap().status,
            RemovalStatus::Pending
        );

        let removal = w
            .coordinator
            .review_removal(
                removal.id,
                w.controller,
                RemovalDecision::Disposal,
                Some("unit danificado".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(removal.status, RemovalStatus::ApprovedDisposal);
        assert_eq!(removal.disposal_justification.as_deref(), Some("unit danificado"));

        // Collection runs to completion without any code check.
        w.coordinator
            .mark_removal_ready(removal.id, w.warehouse)
            .await
            .unwrap();
        w.coordinator.pickup_removal(removal.id, w.driver).await.unwrap();
        let removal = w
            .coordinator
            .complete_removal(removal.id, w.warehouse)
            .await
            .unwrap();
        assert_eq!(removal.status, RemovalStatus::Completed);
        assert_eq!(removal.received_by, Some(w.warehouse));
    }

    /// Individually-dispatched furniture: designer and storage sign-offs,
    /// QR bound at dispatch, recipient code closes the handoff.
    #[tokio::test]
    async fn test_individual_furniture_flow() {
        let w = world();
        let request = w
            .coordinator
            .create_furniture_request(
                w.requester,
                NewFurnitureRequest {
                    item_id: w.furniture_item,
                    quantity: 1,
                    location: "room 12".to_string(),
                    justification: "replacing a broken desk".to_string(),
                },
            )
            .await
            .unwrap();

        w.coordinator
            .designer_review(
                request.id,
                w.designer,
                DesignDecision::Approved {
                    observations: Some("fits the floor plan".to_string()),
                },
            )
            .await
            .unwrap();
        w.coordinator
            .approve_furniture_storage(request.id, w.warehouse)
            .await
            .unwrap();
        w.coordinator.mark_separated(request.id, w.warehouse).await.unwrap();
        w.coordinator
            .mark_awaiting_delivery(request.id, w.warehouse)
            .await
            .unwrap();

        let request = w
            .coordinator
            .dispatch_furniture(request.id, w.driver)
            .await
            .unwrap();
        assert_eq!(request.status, FurnitureStatus::InTransit);
        assert!(request.qr_code.is_some());

        let request = w
            .coordinator
            .mark_furniture_delivered(request.id, w.driver, None)
            .await
            .unwrap();
        assert_eq!(request.status, FurnitureStatus::PendingConfirmation);

        // Shows up in the requester's pending confirmations.
        let pending = w.coordinator.pending_for_user(w.requester).await.unwrap();
        assert_eq!(pending.furniture.len(), 1);

        let today = w.clock.now().date_naive();
        let request = w
            .coordinator
            .confirm_furniture_receipt(
                request.id,
                w.requester,
                ReceiptProof {
                    code: daily_code::code(w.requester, today),
                    photo_url: "https://evidence/desk.jpg".to_string(),
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(request.status, FurnitureStatus::Completed);

        let entries = w
            .coordinator
            .ledger()
            .entries_for_furniture(request.id)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, ConfirmationKind::Receipt);
    }

    /// A designer rejection without a reason never lands.
    #[tokio::test]
    async fn test_designer_rejection_needs_reason() {
        let w = world();
        let request = w
            .coordinator
            .create_furniture_request(
                w.requester,
                NewFurnitureRequest {
                    item_id: w.furniture_item,
                    quantity: 1,
                    location: "room 3".to_string(),
                    justification: "new hire".to_string(),
                },
            )
            .await
            .unwrap();

        let err = w
            .coordinator
            .designer_review(
                request.id,
                w.designer,
                DesignDecision::Rejected {
                    reason: "  ".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, FulfillmentError::MissingReason));

        let request = w
            .coordinator
            .designer_review(
                request.id,
                w.designer,
                DesignDecision::Rejected {
                    reason: "does not match the room standard".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(request.status, FurnitureStatus::Rejected);
    }

    /// A code derived for yesterday fails against today's confirmation.
    #[tokio::test]
    async fn test_stale_daily_code_is_rejected() {
        let w = world();
        let rid = w.material_awaiting_pickup(1).await;
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

        let yesterday = w.clock.now().date_naive().pred_opt().unwrap();
        let err = w
            .coordinator
            .confirm_delivery(
                batch.id,
                w.driver,
                DeliveryProof {
                    recipient: w.controller,
                    code: daily_code::code(w.controller, yesterday),
                    photo_url: "https://evidence/door.jpg".to_string(),
                    location: None,
                    notes: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, FulfillmentError::InvalidCode));

        // The failed proof left the batch in transit.
        assert_eq!(
            w.coordinator.get_batch(batch.id).await.unwrap().status,
            BatchStatus::InTransit
        );
    }

    /// Cancellation is refused once processing has started.
    #[tokio::test]
    async fn test_cancel_window_closes_at_processing() {
        let w = world();
        let request = w
            .coordinator
            .create_request(
                w.requester,
                fulfillment_core::NewMaterialRequest {
                    item_id: w.material_item,
                    quantity: 4,
                    urgency: fulfillment_core::Urgency::Low,
                    observations: None,
                },
            )
            .await
            .unwrap();
        w.coordinator
            .approve_request(request.id, w.controller)
            .await
            .unwrap();
        w.coordinator
            .start_processing(request.id, w.warehouse)
            .await
            .unwrap();

        let err = w
            .coordinator
            .cancel_request(request.id, w.requester)
            .await
            .unwrap_err();
        assert!(matches!(err, FulfillmentError::TooLateToCancel { .. }));
    }
}
