//! # Fulfillment Coordinator
//!
//! Cross-entity consistency: batch creation claims members atomically,
//! dispatch and confirmations cascade to members, and completion fires only
//! once every member reached its own delivered sub-state. The coordinator
//! holds no state of its own beyond what the stores expose.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::domain::daily_code;
use crate::domain::entities::{
    ConfirmationParams, DeliveryBatch, DeliveryBatchParams, DeliveryConfirmation,
};
use crate::domain::errors::FulfillmentError;
use crate::domain::invariants::{
    invariant_actor_role, invariant_batchable_furniture, invariant_batchable_material,
};
use crate::domain::value_objects::{
    BatchId, ConfirmationId, ConfirmationKind, ConfirmationSubject, FurnitureStatus, RequestRef,
    RequestStatus, Role, UserId,
};
use crate::ports::inbound::{
    DeferredProof, DeliveryBatchApi, DeliveryProof, FulfillmentQueries, NewBatch,
    PendingConfirmations, ReceiptProof,
};
use crate::ports::outbound::{
    BatchStore, Clock, ConfirmationStore, Directory, FurnitureStore, RemovalStore, RequestStore,
    StockAdjuster, TokenSource, UserRecord,
};

use super::ledger::ConfirmationLedger;

/// Collaborator handles for building a coordinator.
#[derive(Clone)]
pub struct CoordinatorPorts {
    pub requests: Arc<dyn RequestStore>,
    pub furniture: Arc<dyn FurnitureStore>,
    pub removals: Arc<dyn RemovalStore>,
    pub batches: Arc<dyn BatchStore>,
    pub confirmations: Arc<dyn ConfirmationStore>,
    pub stock: Arc<dyn StockAdjuster>,
    pub directory: Arc<dyn Directory>,
    pub clock: Arc<dyn Clock>,
    pub tokens: Arc<dyn TokenSource>,
}

/// The fulfillment service. Implements every driving port.
#[derive(Clone)]
pub struct FulfillmentCoordinator {
    pub(in crate::service) requests: Arc<dyn RequestStore>,
    pub(in crate::service) furniture: Arc<dyn FurnitureStore>,
    pub(in crate::service) removals: Arc<dyn RemovalStore>,
    pub(in crate::service) batches: Arc<dyn BatchStore>,
    pub(in crate::service) ledger: ConfirmationLedger,
    pub(in crate::service) stock: Arc<dyn StockAdjuster>,
    pub(in crate::service) directory: Arc<dyn Directory>,
    pub(in crate::service) clock: Arc<dyn Clock>,
    pub(in crate::service) tokens: Arc<dyn TokenSource>,
}

impl FulfillmentCoordinator {
    /// Build a coordinator over the given collaborators.
    pub fn new(ports: CoordinatorPorts) -> Self {
        Self {
            requests: ports.requests,
            furniture: ports.furniture,
            removals: ports.removals,
            batches: ports.batches,
            ledger: ConfirmationLedger::new(ports.confirmations),
            stock: ports.stock,
            directory: ports.directory,
            clock: ports.clock,
            tokens: ports.tokens,
        }
    }

    /// The ledger, for collaborators that only read confirmations.
    pub fn ledger(&self) -> &ConfirmationLedger {
        &self.ledger
    }

    /// Resolve the actor and check the role once, at the transition boundary.
    pub(in crate::service) async fn authorize(
        &self,
        actor: UserId,
        allowed: &[Role],
    ) -> Result<UserRecord, FulfillmentError> {
        let user = self.directory.resolve_user(actor).await?;
        invariant_actor_role(user.id, user.role, allowed)?;
        Ok(user)
    }

    /// Calendar date the daily code is scoped to.
    pub(in crate::service) fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }

    /// Whether the user created any member of the batch.
    async fn is_batch_requester(
        &self,
        batch: &DeliveryBatch,
        user: UserId,
    ) -> Result<bool, FulfillmentError> {
        for rid in &batch.request_ids {
            if self.requests.get(*rid).await?.requested_by == user {
                return Ok(true);
            }
        }
        for fid in &batch.furniture_request_ids {
            if self.furniture.get(*fid).await?.requested_by == user {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// The batch's driver, and nobody else, moves it.
    fn ensure_driver(
        user: &UserRecord,
        batch: &DeliveryBatch,
    ) -> Result<(), FulfillmentError> {
        if user.id != batch.driver_id {
            return Err(FulfillmentError::DriverMismatch { actor: user.id });
        }
        Ok(())
    }

    /// Cascade a batch-level delivery attestation to every member.
    async fn cascade_delivery(&self, batch: &DeliveryBatch) -> Result<(), FulfillmentError> {
        let now = self.clock.now();
        for rid in &batch.request_ids {
            let mut request = self.requests.get(*rid).await?;
            let expected = request.status;
            request.confirm_delivery()?;
            self.requests.replace(expected, request).await?;
        }
        for fid in &batch.furniture_request_ids {
            let mut furniture = self.furniture.get(*fid).await?;
            let expected = furniture.status;
            furniture.mark_delivered(batch.driver_id, now, None)?;
            self.furniture.replace(expected, furniture).await?;
        }
        Ok(())
    }

    /// Cascade a batch-level receipt to every member, then complete the
    /// batch if everything reached its delivered sub-state.
    async fn cascade_receipt_and_complete(
        &self,
        mut batch: DeliveryBatch,
        actor: UserId,
    ) -> Result<DeliveryBatch, FulfillmentError> {
        for rid in &batch.request_ids {
            let mut request = self.requests.get(*rid).await?;
            let expected = request.status;
            request.confirm_receipt()?;
            self.requests.replace(expected, request).await?;
        }
        for fid in &batch.furniture_request_ids {
            let mut furniture = self.furniture.get(*fid).await?;
            let expected = furniture.status;
            furniture.complete()?;
            self.furniture.replace(expected, furniture).await?;
        }

        // Completion is fired here, by the coordinator, never by a single
        // entity unilaterally.
        for rid in &batch.request_ids {
            let request = self.requests.get(*rid).await?;
            if !matches!(
                request.status,
                RequestStatus::ReceivedConfirmed | RequestStatus::Completed
            ) {
                return Ok(batch);
            }
        }
        for fid in &batch.furniture_request_ids {
            if self.furniture.get(*fid).await?.status != FurnitureStatus::Completed {
                return Ok(batch);
            }
        }

        let now = self.clock.now();
        let expected = batch.status;
        batch.complete(now)?;
        self.batches.replace(expected, batch.clone()).await?;

        for rid in &batch.request_ids {
            let mut request = self.requests.get(*rid).await?;
            if request.status == RequestStatus::ReceivedConfirmed {
                let expected = request.status;
                request.complete(actor, now)?;
                self.requests.replace(expected, request).await?;
            }
        }
        info!(batch = %batch.id, "delivery batch completed");
        Ok(batch)
    }
}

#[async_trait]
impl DeliveryBatchApi for FulfillmentCoordinator {
    async fn create_batch(
        &self,
        actor: UserId,
        payload: NewBatch,
    ) -> Result<DeliveryBatch, FulfillmentError> {
        self.authorize(actor, &[Role::Controller, Role::Warehouse, Role::Admin])
            .await?;
        if payload.members.is_empty() {
            return Err(FulfillmentError::EmptyBatch);
        }
        let driver = self.directory.resolve_user(payload.driver_id).await?;
        invariant_actor_role(driver.id, driver.role, &[Role::Driver])?;

        let mut request_ids = Vec::new();
        let mut furniture_request_ids = Vec::new();
        for member in &payload.members {
            match member {
                RequestRef::Material(id) => {
                    let request = self.requests.get(*id).await?;
                    invariant_batchable_material(*member, request.status)?;
                    request_ids.push(*id);
                }
                RequestRef::Furniture(id) => {
                    let furniture = self.furniture.get(*id).await?;
                    invariant_batchable_furniture(*member, furniture.status)?;
                    furniture_request_ids.push(*id);
                }
            }
        }

        let batch = DeliveryBatch::new(DeliveryBatchParams {
            id: BatchId::new(),
            request_ids,
            furniture_request_ids,
            target_unit_id: payload.target_unit_id,
            driver_id: driver.id,
            notes: payload.notes,
            created_at: self.clock.now(),
        });

        // The membership check and the claim happen atomically inside the
        // store; a concurrent overlapping creation loses with AlreadyBatched.
        self.batches.create(batch.clone()).await?;

        // Attached furniture gets its proof-of-possession token now.
        for fid in &batch.furniture_request_ids {
            let mut furniture = self.furniture.get(*fid).await?;
            if furniture.qr_code.is_none() {
                let expected = furniture.status;
                furniture.attach_qr(self.tokens.opaque_token());
                self.furniture.replace(expected, furniture).await?;
            }
        }

        info!(
            batch = %batch.id,
            members = batch.request_ids.len() + batch.furniture_request_ids.len(),
            driver = %batch.driver_id,
            "delivery batch created"
        );
        Ok(batch)
    }

    async fn dispatch_batch(
        &self,
        id: BatchId,
        actor: UserId,
    ) -> Result<DeliveryBatch, FulfillmentError> {
        let user = self.authorize(actor, &[Role::Driver]).await?;
        let mut batch = self.batches.get(id).await?;
        Self::ensure_driver(&user, &batch)?;

        let now = self.clock.now();
        let expected = batch.status;
        batch.dispatch(self.tokens.opaque_token(), now)?;
        self.batches.replace(expected, batch.clone()).await?;

        for rid in &batch.request_ids {
            let mut request = self.requests.get(*rid).await?;
            let expected = request.status;
            request.mark_out_for_delivery(batch.driver_id, now)?;
            self.requests.replace(expected, request).await?;
        }
        for fid in &batch.furniture_request_ids {
            let mut furniture = self.furniture.get(*fid).await?;
            let expected = furniture.status;
            furniture.mark_in_transit()?;
            self.furniture.replace(expected, furniture).await?;
        }

        info!(batch = %batch.id, driver = %batch.driver_id, "batch dispatched");
        Ok(batch)
    }

    async fn confirm_delivery(
        &self,
        id: BatchId,
        actor: UserId,
        proof: DeliveryProof,
    ) -> Result<DeliveryBatch, FulfillmentError> {
        let user = self.authorize(actor, &[Role::Driver]).await?;
        let mut batch = self.batches.get(id).await?;
        Self::ensure_driver(&user, &batch)?;

        // Scan-and-confirm: the driver validates the recipient's identity
        // proof at the moment of drop-off.
        daily_code::verify(proof.recipient, &proof.code, self.today())?;

        let now = self.clock.now();
        let expected = batch.status;
        batch.confirm_delivery(now)?;
        self.batches.replace(expected, batch.clone()).await?;

        self.ledger
            .record(DeliveryConfirmation::new(ConfirmationParams {
                id: ConfirmationId::new(),
                subject: ConfirmationSubject::Batch(batch.id),
                kind: ConfirmationKind::Delivery,
                confirmed_by: user.id,
                received_by: Some(proof.recipient),
                photo_url: proof.photo_url,
                timestamp: now,
                location: proof.location,
                notes: proof.notes,
            }))
            .await?;

        self.cascade_delivery(&batch).await?;
        info!(batch = %batch.id, recipient = %proof.recipient, "delivery confirmed");
        Ok(batch)
    }

    async fn confirm_later(
        &self,
        id: BatchId,
        actor: UserId,
        proof: DeferredProof,
    ) -> Result<DeliveryBatch, FulfillmentError> {
        let user = self.authorize(actor, &[Role::Driver]).await?;
        let mut batch = self.batches.get(id).await?;
        Self::ensure_driver(&user, &batch)?;

        let now = self.clock.now();
        let expected = batch.status;
        batch.confirm_later()?;
        self.batches.replace(expected, batch.clone()).await?;

        // Weaker-trust attestation: photo evidence only, no recipient
        // identity. The receipt confirmation later closes the loop.
        self.ledger
            .record(DeliveryConfirmation::new(ConfirmationParams {
                id: ConfirmationId::new(),
                subject: ConfirmationSubject::Batch(batch.id),
                kind: ConfirmationKind::Delivery,
                confirmed_by: user.id,
                received_by: None,
                photo_url: proof.photo_url,
                timestamp: now,
                location: proof.location,
                notes: proof.notes,
            }))
            .await?;

        self.cascade_delivery(&batch).await?;
        info!(batch = %batch.id, "delivery attested, confirmation deferred");
        Ok(batch)
    }

    async fn confirm_receipt(
        &self,
        id: BatchId,
        actor: UserId,
        proof: ReceiptProof,
    ) -> Result<DeliveryBatch, FulfillmentError> {
        let user = self.directory.resolve_user(actor).await?;
        let mut batch = self.batches.get(id).await?;

        let is_controller =
            user.role == Role::Controller && user.unit_id == batch.target_unit_id;
        let is_requester = !is_controller && self.is_batch_requester(&batch, user.id).await?;
        if !is_controller && !is_requester {
            return Err(FulfillmentError::UnauthorizedRole {
                actor,
                required: vec![Role::Controller, Role::Requester],
            });
        }

        // Second, independent proof: the recipient's own daily code.
        daily_code::verify(actor, &proof.code, self.today())?;

        let now = self.clock.now();
        let expected = batch.status;
        let kind = if is_controller {
            batch.confirm_receipt(now)?;
            ConfirmationKind::Receipt
        } else {
            batch.confirm_by_requester(now)?;
            ConfirmationKind::Requester
        };
        self.batches.replace(expected, batch.clone()).await?;

        self.ledger
            .record(DeliveryConfirmation::new(ConfirmationParams {
                id: ConfirmationId::new(),
                subject: ConfirmationSubject::Batch(batch.id),
                kind,
                confirmed_by: user.id,
                received_by: Some(user.id),
                photo_url: proof.photo_url,
                timestamp: now,
                location: None,
                notes: proof.notes,
            }))
            .await?;

        debug!(batch = %batch.id, kind = %kind, by = %user.id, "receipt confirmed");
        self.cascade_receipt_and_complete(batch, user.id).await
    }

    async fn cancel_batch(
        &self,
        id: BatchId,
        actor: UserId,
    ) -> Result<DeliveryBatch, FulfillmentError> {
        self.authorize(actor, &[Role::Controller, Role::Warehouse, Role::Admin])
            .await?;
        let mut batch = self.batches.get(id).await?;
        let expected = batch.status;
        batch.cancel()?;
        self.batches.replace(expected, batch.clone()).await?;
        info!(batch = %batch.id, "batch cancelled, member claims released");
        Ok(batch)
    }

    async fn get_batch(&self, id: BatchId) -> Result<DeliveryBatch, FulfillmentError> {
        self.batches.get(id).await
    }
}

#[async_trait]
impl FulfillmentQueries for FulfillmentCoordinator {
    async fn pending_for_user(
        &self,
        user: UserId,
    ) -> Result<PendingConfirmations, FulfillmentError> {
        let user = self.directory.resolve_user(user).await?;
        let open = self.batches.open_batches().await?;

        let mut pending = PendingConfirmations::default();
        for batch in &open {
            if !batch.status.awaits_receipt() {
                continue;
            }
            let controls_unit =
                user.role == Role::Controller && user.unit_id == batch.target_unit_id;
            if controls_unit || self.is_batch_requester(batch, user.id).await? {
                pending.batches.push(batch.clone());
            }
        }

        // Individually-dispatched furniture: anything claimed by an open
        // batch is confirmed through the batch instead.
        let claimed: HashSet<_> = open
            .iter()
            .flat_map(|b| b.furniture_request_ids.iter().copied())
            .collect();
        for furniture in self
            .furniture
            .list_by_status(FurnitureStatus::PendingConfirmation)
            .await?
        {
            if claimed.contains(&furniture.id) {
                continue;
            }
            let controls_unit =
                user.role == Role::Controller && user.unit_id == furniture.requesting_unit_id;
            if controls_unit || furniture.requested_by == user.id {
                pending.furniture.push(furniture);
            }
        }
        Ok(pending)
    }

    async fn entries_for(
        &self,
        batch: BatchId,
    ) -> Result<Vec<DeliveryConfirmation>, FulfillmentError> {
        self.ledger.entries_for(batch).await
    }
}
