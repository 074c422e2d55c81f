//! # Domain Entities
//!
//! The five fulfillment entities. Transition methods validate the edge
//! against the status table, stamp the acting user and timestamp, and fail
//! with a typed error; nothing mutates status directly.
//!
//! Terminal entities are retained for audit, never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::FulfillmentError;
use super::invariants::{invariant_disposal_justified, invariant_qr_present};
use super::value_objects::{
    BatchId, BatchStatus, ConfirmationId, ConfirmationKind, ConfirmationSubject,
    FurnitureRequestId, FurnitureStatus, GeoPoint, ItemId, RemovalDecision, RemovalId,
    RemovalStatus, RequestId, RequestRef, RequestStatus, UnitId, Urgency, UserId,
};

fn invalid<F: std::fmt::Debug, T: std::fmt::Debug>(
    entity: &'static str,
    from: F,
    to: T,
) -> FulfillmentError {
    FulfillmentError::InvalidTransition {
        entity,
        from: format!("{from:?}"),
        to: format!("{to:?}"),
    }
}

// =============================================================================
// MATERIAL REQUEST
// =============================================================================

/// Parameters for creating a material request.
#[derive(Clone, Debug)]
pub struct MaterialRequestParams {
    pub id: RequestId,
    pub item_id: ItemId,
    pub requesting_unit_id: UnitId,
    pub requested_by: UserId,
    pub quantity: u32,
    pub urgency: Urgency,
    pub observations: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A material request from a unit to the warehouse.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MaterialRequest {
    pub id: RequestId,
    pub item_id: ItemId,
    pub requesting_unit_id: UnitId,
    pub requested_by: UserId,
    pub quantity: u32,
    pub urgency: Urgency,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub approved_by: Option<UserId>,
    pub approved_at: Option<DateTime<Utc>>,
    pub picked_up_by: Option<UserId>,
    pub picked_up_at: Option<DateTime<Utc>>,
    pub completed_by: Option<UserId>,
    pub completed_at: Option<DateTime<Utc>>,
    pub rejected_reason: Option<String>,
    pub observations: Option<String>,
}

impl MaterialRequest {
    /// Create a new pending request.
    pub fn new(params: MaterialRequestParams) -> Self {
        Self {
            id: params.id,
            item_id: params.item_id,
            requesting_unit_id: params.requesting_unit_id,
            requested_by: params.requested_by,
            quantity: params.quantity,
            urgency: params.urgency,
            status: RequestStatus::Pending,
            created_at: params.created_at,
            approved_by: None,
            approved_at: None,
            picked_up_by: None,
            picked_up_at: None,
            completed_by: None,
            completed_at: None,
            rejected_reason: None,
            observations: params.observations,
        }
    }

    /// Transition to new state.
    pub fn transition_to(&mut self, next: RequestStatus) -> Result<(), FulfillmentError> {
        if !self.status.can_transition_to(next) {
            return Err(invalid("material request", self.status, next));
        }
        self.status = next;
        Ok(())
    }

    /// Controller approval.
    pub fn approve(&mut self, actor: UserId, at: DateTime<Utc>) -> Result<(), FulfillmentError> {
        self.transition_to(RequestStatus::Approved)?;
        self.approved_by = Some(actor);
        self.approved_at = Some(at);
        Ok(())
    }

    /// Rejection. Legal from any pre-dispatch state.
    pub fn reject(&mut self, reason: String) -> Result<(), FulfillmentError> {
        self.transition_to(RequestStatus::Rejected)?;
        self.rejected_reason = Some(reason);
        Ok(())
    }

    /// Requester cancellation. Refused once processing has begun, because
    /// the stock side effect may already have fired.
    pub fn cancel(&mut self) -> Result<(), FulfillmentError> {
        match self.status {
            RequestStatus::Processing | RequestStatus::AwaitingPickup => {
                Err(FulfillmentError::TooLateToCancel {
                    status: format!("{:?}", self.status),
                })
            }
            _ => self.transition_to(RequestStatus::Cancelled),
        }
    }

    /// Warehouse starts separation. The stock decrement fires alongside.
    pub fn start_processing(&mut self) -> Result<(), FulfillmentError> {
        self.transition_to(RequestStatus::Processing)
    }

    /// Warehouse finished separation; goods wait for a driver.
    pub fn mark_awaiting_pickup(&mut self) -> Result<(), FulfillmentError> {
        self.transition_to(RequestStatus::AwaitingPickup)
    }

    /// Fired by batch dispatch only; a request never self-dispatches.
    pub fn mark_out_for_delivery(
        &mut self,
        driver: UserId,
        at: DateTime<Utc>,
    ) -> Result<(), FulfillmentError> {
        self.transition_to(RequestStatus::OutForDelivery)?;
        self.picked_up_by = Some(driver);
        self.picked_up_at = Some(at);
        Ok(())
    }

    /// Cascade of the owning batch's delivery confirmation.
    pub fn confirm_delivery(&mut self) -> Result<(), FulfillmentError> {
        self.transition_to(RequestStatus::DeliveryConfirmed)
    }

    /// Cascade of the owning batch's receipt confirmation.
    pub fn confirm_receipt(&mut self) -> Result<(), FulfillmentError> {
        self.transition_to(RequestStatus::ReceivedConfirmed)
    }

    /// Cascade of batch completion.
    pub fn complete(&mut self, actor: UserId, at: DateTime<Utc>) -> Result<(), FulfillmentError> {
        self.transition_to(RequestStatus::Completed)?;
        self.completed_by = Some(actor);
        self.completed_at = Some(at);
        Ok(())
    }
}

// =============================================================================
// FURNITURE REQUEST
// =============================================================================

/// Parameters for creating a furniture request.
#[derive(Clone, Debug)]
pub struct FurnitureRequestParams {
    pub id: FurnitureRequestId,
    pub item_id: ItemId,
    pub requesting_unit_id: UnitId,
    pub requested_by: UserId,
    pub quantity: u32,
    pub location: String,
    pub justification: String,
    pub created_at: DateTime<Utc>,
}

/// A furniture request routed through designer and storage sign-off.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FurnitureRequest {
    pub id: FurnitureRequestId,
    pub item_id: ItemId,
    pub requesting_unit_id: UnitId,
    pub requested_by: UserId,
    pub quantity: u32,
    pub location: String,
    pub justification: String,
    pub status: FurnitureStatus,
    /// Populated when the request joins a batch or dispatches individually.
    pub qr_code: Option<String>,
    pub reviewed_by_designer: Option<UserId>,
    pub approved_by_storage: Option<UserId>,
    pub delivered_by: Option<UserId>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub observations: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FurnitureRequest {
    /// Create a new request awaiting designer review.
    pub fn new(params: FurnitureRequestParams) -> Self {
        Self {
            id: params.id,
            item_id: params.item_id,
            requesting_unit_id: params.requesting_unit_id,
            requested_by: params.requested_by,
            quantity: params.quantity,
            location: params.location,
            justification: params.justification,
            status: FurnitureStatus::PendingDesigner,
            qr_code: None,
            reviewed_by_designer: None,
            approved_by_storage: None,
            delivered_by: None,
            delivered_at: None,
            rejection_reason: None,
            observations: None,
            created_at: params.created_at,
        }
    }

    /// Transition to new state.
    pub fn transition_to(&mut self, next: FurnitureStatus) -> Result<(), FulfillmentError> {
        if !self.status.can_transition_to(next) {
            return Err(invalid("furniture request", self.status, next));
        }
        self.status = next;
        Ok(())
    }

    /// Designer approval, optional observations.
    pub fn approve_design(
        &mut self,
        designer: UserId,
        observations: Option<String>,
    ) -> Result<(), FulfillmentError> {
        self.transition_to(FurnitureStatus::ApprovedDesigner)?;
        self.reviewed_by_designer = Some(designer);
        if observations.is_some() {
            self.observations = observations;
        }
        Ok(())
    }

    /// Designer rejection. A reason is mandatory.
    pub fn reject_design(
        &mut self,
        designer: UserId,
        reason: String,
    ) -> Result<(), FulfillmentError> {
        super::invariants::invariant_rejection_reason(&reason)?;
        self.transition_to(FurnitureStatus::Rejected)?;
        self.reviewed_by_designer = Some(designer);
        self.rejection_reason = Some(reason);
        Ok(())
    }

    /// Second sign-off by storage staff, independent of the designer.
    pub fn approve_storage(&mut self, actor: UserId) -> Result<(), FulfillmentError> {
        self.transition_to(FurnitureStatus::ApprovedStorage)?;
        self.approved_by_storage = Some(actor);
        Ok(())
    }

    /// Item physically separated in the warehouse.
    pub fn mark_separated(&mut self) -> Result<(), FulfillmentError> {
        self.transition_to(FurnitureStatus::Separated)
    }

    /// Item staged for a delivery run.
    pub fn mark_awaiting_delivery(&mut self) -> Result<(), FulfillmentError> {
        self.transition_to(FurnitureStatus::AwaitingDelivery)
    }

    /// Bind the proof-of-possession token. Happens at batch attach or at
    /// individual dispatch.
    pub fn attach_qr(&mut self, token: String) {
        self.qr_code = Some(token);
    }

    /// Leave the warehouse. Transit requires the QR token to be bound.
    pub fn mark_in_transit(&mut self) -> Result<(), FulfillmentError> {
        invariant_qr_present(self.qr_code.as_deref())?;
        self.transition_to(FurnitureStatus::InTransit)
    }

    /// Driver attests delivery; the recipient has not yet confirmed.
    pub fn mark_delivered(
        &mut self,
        driver: UserId,
        at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<(), FulfillmentError> {
        self.transition_to(FurnitureStatus::PendingConfirmation)?;
        self.delivered_by = Some(driver);
        self.delivered_at = Some(at);
        if notes.is_some() {
            self.observations = notes;
        }
        Ok(())
    }

    /// Terminal confirmation by the receiving party.
    pub fn complete(&mut self) -> Result<(), FulfillmentError> {
        self.transition_to(FurnitureStatus::Completed)
    }
}

// =============================================================================
// FURNITURE REMOVAL
// =============================================================================

/// Parameters for creating a removal request.
#[derive(Clone, Debug)]
pub struct FurnitureRemovalParams {
    pub id: RemovalId,
    pub item_id: ItemId,
    pub unit_id: UnitId,
    pub requested_by: UserId,
    pub quantity: u32,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// A request to retire furniture from a unit: storage or disposal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FurnitureRemoval {
    pub id: RemovalId,
    pub item_id: ItemId,
    pub unit_id: UnitId,
    pub requested_by: UserId,
    pub quantity: u32,
    pub reason: String,
    pub status: RemovalStatus,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Non-empty exactly when the decision was disposal.
    pub disposal_justification: Option<String>,
    pub picked_up_by: Option<UserId>,
    pub picked_up_at: Option<DateTime<Utc>>,
    pub received_by: Option<UserId>,
    pub received_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl FurnitureRemoval {
    /// Create a new pending removal.
    pub fn new(params: FurnitureRemovalParams) -> Self {
        Self {
            id: params.id,
            item_id: params.item_id,
            unit_id: params.unit_id,
            requested_by: params.requested_by,
            quantity: params.quantity,
            reason: params.reason,
            status: RemovalStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            disposal_justification: None,
            picked_up_by: None,
            picked_up_at: None,
            received_by: None,
            received_at: None,
            created_at: params.created_at,
        }
    }

    /// Transition to new state.
    pub fn transition_to(&mut self, next: RemovalStatus) -> Result<(), FulfillmentError> {
        if !self.status.can_transition_to(next) {
            return Err(invalid("furniture removal", self.status, next));
        }
        self.status = next;
        Ok(())
    }

    /// Binary reviewer decision. Disposal without justification fails
    /// before any state changes.
    pub fn review(
        &mut self,
        actor: UserId,
        decision: RemovalDecision,
        justification: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<(), FulfillmentError> {
        invariant_disposal_justified(decision, justification.as_deref())?;
        match decision {
            RemovalDecision::Storage => self.transition_to(RemovalStatus::ApprovedStorage)?,
            RemovalDecision::Disposal => {
                self.transition_to(RemovalStatus::ApprovedDisposal)?;
                self.disposal_justification = justification;
            }
        }
        self.reviewed_by = Some(actor);
        self.reviewed_at = Some(at);
        Ok(())
    }

    /// Reviewer rejection; only a pending removal can be rejected.
    pub fn reject(&mut self, actor: UserId, at: DateTime<Utc>) -> Result<(), FulfillmentError> {
        self.transition_to(RemovalStatus::Rejected)?;
        self.reviewed_by = Some(actor);
        self.reviewed_at = Some(at);
        Ok(())
    }

    /// Item staged for collection.
    pub fn mark_ready(&mut self) -> Result<(), FulfillmentError> {
        self.transition_to(RemovalStatus::AwaitingPickup)
    }

    /// Driver collects the item.
    pub fn pickup(&mut self, driver: UserId, at: DateTime<Utc>) -> Result<(), FulfillmentError> {
        self.transition_to(RemovalStatus::InTransit)?;
        self.picked_up_by = Some(driver);
        self.picked_up_at = Some(at);
        Ok(())
    }

    /// Received at destination (warehouse or disposal point). No code check:
    /// the receiving party is internal staff, a lower trust boundary.
    pub fn complete(&mut self, receiver: UserId, at: DateTime<Utc>) -> Result<(), FulfillmentError> {
        self.transition_to(RemovalStatus::Completed)?;
        self.received_by = Some(receiver);
        self.received_at = Some(at);
        Ok(())
    }
}

// =============================================================================
// DELIVERY BATCH
// =============================================================================

/// Parameters for creating a delivery batch.
#[derive(Clone, Debug)]
pub struct DeliveryBatchParams {
    pub id: BatchId,
    pub request_ids: Vec<RequestId>,
    pub furniture_request_ids: Vec<FurnitureRequestId>,
    pub target_unit_id: UnitId,
    pub driver_id: UserId,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One physical delivery run: a set of member requests, one destination
/// unit, one driver for the batch's lifetime.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeliveryBatch {
    pub id: BatchId,
    pub request_ids: Vec<RequestId>,
    pub furniture_request_ids: Vec<FurnitureRequestId>,
    pub target_unit_id: UnitId,
    pub driver_id: UserId,
    /// Opaque proof-of-possession token, generated at dispatch.
    pub qr_code: Option<String>,
    pub status: BatchStatus,
    pub created_at: DateTime<Utc>,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub delivery_confirmed_at: Option<DateTime<Utc>>,
    pub received_confirmed_at: Option<DateTime<Utc>>,
    pub confirmed_by_requester_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl DeliveryBatch {
    /// Create a pending batch.
    pub fn new(params: DeliveryBatchParams) -> Self {
        Self {
            id: params.id,
            request_ids: params.request_ids,
            furniture_request_ids: params.furniture_request_ids,
            target_unit_id: params.target_unit_id,
            driver_id: params.driver_id,
            qr_code: None,
            status: BatchStatus::Pending,
            created_at: params.created_at,
            dispatched_at: None,
            delivery_confirmed_at: None,
            received_confirmed_at: None,
            confirmed_by_requester_at: None,
            completed_at: None,
            notes: params.notes,
        }
    }

    /// Member handles, material then furniture.
    pub fn members(&self) -> Vec<RequestRef> {
        self.request_ids
            .iter()
            .copied()
            .map(RequestRef::Material)
            .chain(
                self.furniture_request_ids
                    .iter()
                    .copied()
                    .map(RequestRef::Furniture),
            )
            .collect()
    }

    /// Transition to new state.
    pub fn transition_to(&mut self, next: BatchStatus) -> Result<(), FulfillmentError> {
        if !self.status.can_transition_to(next) {
            return Err(invalid("delivery batch", self.status, next));
        }
        self.status = next;
        Ok(())
    }

    /// Leave the warehouse: binds the QR token and stamps dispatch time.
    pub fn dispatch(&mut self, token: String, at: DateTime<Utc>) -> Result<(), FulfillmentError> {
        self.transition_to(BatchStatus::InTransit)?;
        self.qr_code = Some(token);
        self.dispatched_at = Some(at);
        Ok(())
    }

    /// Scan-and-confirm path: driver validated the recipient on the spot.
    pub fn confirm_delivery(&mut self, at: DateTime<Utc>) -> Result<(), FulfillmentError> {
        self.transition_to(BatchStatus::DeliveryConfirmed)?;
        self.delivery_confirmed_at = Some(at);
        Ok(())
    }

    /// Confirm-later path: delivery attested without a recipient identity
    /// proof. The batch sits in a weaker-trust state until a later
    /// out-of-band confirmation closes the loop.
    pub fn confirm_later(&mut self) -> Result<(), FulfillmentError> {
        self.transition_to(BatchStatus::PendingConfirmation)
    }

    /// Unit controller confirmed receipt with their daily code.
    pub fn confirm_receipt(&mut self, at: DateTime<Utc>) -> Result<(), FulfillmentError> {
        self.transition_to(BatchStatus::ReceivedConfirmed)?;
        self.received_confirmed_at = Some(at);
        Ok(())
    }

    /// The original requester confirmed receipt with their daily code.
    pub fn confirm_by_requester(&mut self, at: DateTime<Utc>) -> Result<(), FulfillmentError> {
        self.transition_to(BatchStatus::ConfirmedByRequester)?;
        self.confirmed_by_requester_at = Some(at);
        Ok(())
    }

    /// Fired by the coordinator once every member reached its own terminal
    /// delivered sub-state.
    pub fn complete(&mut self, at: DateTime<Utc>) -> Result<(), FulfillmentError> {
        self.transition_to(BatchStatus::Completed)?;
        self.completed_at = Some(at);
        Ok(())
    }

    /// Abandon an undispatched batch, releasing its member claims.
    pub fn cancel(&mut self) -> Result<(), FulfillmentError> {
        self.transition_to(BatchStatus::Cancelled)
    }
}

// =============================================================================
// DELIVERY CONFIRMATION
// =============================================================================

/// Parameters for a ledger entry.
#[derive(Clone, Debug)]
pub struct ConfirmationParams {
    pub id: ConfirmationId,
    pub subject: ConfirmationSubject,
    pub kind: ConfirmationKind,
    pub confirmed_by: UserId,
    pub received_by: Option<UserId>,
    pub photo_url: String,
    pub timestamp: DateTime<Utc>,
    pub location: Option<GeoPoint>,
    pub notes: Option<String>,
}

/// One append-only ledger entry. Never mutated after creation; corrections
/// are new entries with explanatory notes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeliveryConfirmation {
    pub id: ConfirmationId,
    pub subject: ConfirmationSubject,
    pub kind: ConfirmationKind,
    /// Who produced the proof (driver for delivery, recipient for receipt).
    pub confirmed_by: UserId,
    /// Recipient identity captured at the handoff, when the path records one.
    pub received_by: Option<UserId>,
    pub photo_url: String,
    pub timestamp: DateTime<Utc>,
    pub location: Option<GeoPoint>,
    pub notes: Option<String>,
}

impl DeliveryConfirmation {
    pub fn new(params: ConfirmationParams) -> Self {
        Self {
            id: params.id,
            subject: params.subject,
            kind: params.kind,
            confirmed_by: params.confirmed_by,
            received_by: params.received_by,
            photo_url: params.photo_url,
            timestamp: params.timestamp,
            location: params.location,
            notes: params.notes,
        }
    }
}
