//! # Furniture Request Operations
//!
//! Designer review, storage sign-off, and the individual (non-batch)
//! dispatch path with its own handoff confirmation.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::daily_code;
use crate::domain::entities::{
    ConfirmationParams, DeliveryConfirmation, FurnitureRequest, FurnitureRequestParams,
};
use crate::domain::errors::FulfillmentError;
use crate::domain::invariants::invariant_positive_quantity;
use crate::domain::value_objects::{
    ConfirmationId, ConfirmationKind, ConfirmationSubject, FurnitureRequestId, RequestRef, Role,
    UserId,
};
use crate::ports::inbound::{DesignDecision, FurnitureRequestApi, NewFurnitureRequest, ReceiptProof};

use super::coordinator::FulfillmentCoordinator;

impl FulfillmentCoordinator {
    /// An item claimed by an open batch travels, and confirms, with the
    /// batch; the individual path is closed to it.
    async fn ensure_furniture_unbatched(
        &self,
        id: FurnitureRequestId,
    ) -> Result<(), FulfillmentError> {
        for batch in self.batches.open_batches().await? {
            if batch.furniture_request_ids.contains(&id) {
                return Err(FulfillmentError::AlreadyBatched(RequestRef::Furniture(id)));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl FurnitureRequestApi for FulfillmentCoordinator {
    async fn create_furniture_request(
        &self,
        actor: UserId,
        request: NewFurnitureRequest,
    ) -> Result<FurnitureRequest, FulfillmentError> {
        let user = self.authorize(actor, &[Role::Requester, Role::Admin]).await?;
        invariant_positive_quantity(request.quantity)?;
        let item = self.directory.resolve_item(request.item_id).await?;
        if !item.is_furniture {
            return Err(FulfillmentError::ItemKindMismatch(item.id));
        }

        let request = FurnitureRequest::new(FurnitureRequestParams {
            id: FurnitureRequestId::new(),
            item_id: item.id,
            requesting_unit_id: user.unit_id,
            requested_by: user.id,
            quantity: request.quantity,
            location: request.location,
            justification: request.justification,
            created_at: self.clock.now(),
        });
        self.furniture.insert(request.clone()).await?;
        info!(request = %request.id, unit = %request.requesting_unit_id, "furniture request created");
        Ok(request)
    }

    async fn designer_review(
        &self,
        id: FurnitureRequestId,
        actor: UserId,
        decision: DesignDecision,
    ) -> Result<FurnitureRequest, FulfillmentError> {
        let user = self.authorize(actor, &[Role::Designer, Role::Admin]).await?;
        let mut request = self.furniture.get(id).await?;
        let expected = request.status;
        match decision {
            DesignDecision::Approved { observations } => {
                request.approve_design(user.id, observations)?;
            }
            DesignDecision::Rejected { reason } => {
                request.reject_design(user.id, reason)?;
            }
        }
        self.furniture.replace(expected, request.clone()).await?;
        debug!(request = %id, status = ?request.status, "designer review recorded");
        Ok(request)
    }

    async fn approve_furniture_storage(
        &self,
        id: FurnitureRequestId,
        actor: UserId,
    ) -> Result<FurnitureRequest, FulfillmentError> {
        let user = self.authorize(actor, &[Role::Warehouse, Role::Admin]).await?;
        let mut request = self.furniture.get(id).await?;
        let expected = request.status;
        request.approve_storage(user.id)?;
        self.furniture.replace(expected, request.clone()).await?;
        debug!(request = %id, "storage sign-off recorded");
        Ok(request)
    }

    async fn mark_separated(
        &self,
        id: FurnitureRequestId,
        actor: UserId,
    ) -> Result<FurnitureRequest, FulfillmentError> {
        self.authorize(actor, &[Role::Warehouse, Role::Admin]).await?;
        let mut request = self.furniture.get(id).await?;
        let expected = request.status;
        request.mark_separated()?;
        self.furniture.replace(expected, request.clone()).await?;
        Ok(request)
    }

    async fn mark_awaiting_delivery(
        &self,
        id: FurnitureRequestId,
        actor: UserId,
    ) -> Result<FurnitureRequest, FulfillmentError> {
        self.authorize(actor, &[Role::Warehouse, Role::Admin]).await?;
        let mut request = self.furniture.get(id).await?;
        let expected = request.status;
        request.mark_awaiting_delivery()?;
        self.furniture.replace(expected, request.clone()).await?;
        Ok(request)
    }

    async fn dispatch_furniture(
        &self,
        id: FurnitureRequestId,
        actor: UserId,
    ) -> Result<FurnitureRequest, FulfillmentError> {
        self.authorize(actor, &[Role::Driver]).await?;
        self.ensure_furniture_unbatched(id).await?;

        let mut request = self.furniture.get(id).await?;
        let expected = request.status;
        if request.qr_code.is_none() {
            request.attach_qr(self.tokens.opaque_token());
        }
        request.mark_in_transit()?;
        self.furniture.replace(expected, request.clone()).await?;
        info!(request = %id, "furniture dispatched individually");
        Ok(request)
    }

    async fn mark_furniture_delivered(
        &self,
        id: FurnitureRequestId,
        actor: UserId,
        notes: Option<String>,
    ) -> Result<FurnitureRequest, FulfillmentError> {
        let user = self.authorize(actor, &[Role::Driver]).await?;
        self.ensure_furniture_unbatched(id).await?;
        let mut request = self.furniture.get(id).await?;
        let expected = request.status;
        request.mark_delivered(user.id, self.clock.now(), notes)?;
        self.furniture.replace(expected, request.clone()).await?;
        debug!(request = %id, "furniture delivered, awaiting recipient confirmation");
        Ok(request)
    }

    async fn confirm_furniture_receipt(
        &self,
        id: FurnitureRequestId,
        actor: UserId,
        proof: ReceiptProof,
    ) -> Result<FurnitureRequest, FulfillmentError> {
        let user = self.directory.resolve_user(actor).await?;
        self.ensure_furniture_unbatched(id).await?;
        let mut request = self.furniture.get(id).await?;

        let controls_unit =
            user.role == Role::Controller && user.unit_id == request.requesting_unit_id;
        if !controls_unit && request.requested_by != user.id {
            return Err(FulfillmentError::UnauthorizedRole {
                actor,
                required: vec![Role::Controller, Role::Requester],
            });
        }

        daily_code::verify(actor, &proof.code, self.today())?;

        let now = self.clock.now();
        let expected = request.status;
        request.complete()?;
        self.furniture.replace(expected, request.clone()).await?;

        self.ledger
            .record(DeliveryConfirmation::new(ConfirmationParams {
                id: ConfirmationId::new(),
                subject: ConfirmationSubject::Furniture(request.id),
                kind: ConfirmationKind::Receipt,
                confirmed_by: user.id,
                received_by: Some(user.id),
                photo_url: proof.photo_url,
                timestamp: now,
                location: None,
                notes: proof.notes,
            }))
            .await?;

        info!(request = %id, by = %user.id, "furniture receipt confirmed");
        Ok(request)
    }

    async fn get_furniture_request(
        &self,
        id: FurnitureRequestId,
    ) -> Result<FurnitureRequest, FulfillmentError> {
        self.furniture.get(id).await
    }
}
