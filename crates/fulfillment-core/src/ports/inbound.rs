//! # Inbound Ports (Driving Ports)
//!
//! The API the fulfillment core exposes to collaborators (UI, notification
//! layer). One trait per lifecycle; [`FulfillmentApi`] is the umbrella. Every
//! operation threads an explicit `actor`; there is no ambient session.

use async_trait::async_trait;

use crate::domain::entities::{
    DeliveryBatch, DeliveryConfirmation, FurnitureRemoval, FurnitureRequest, MaterialRequest,
};
use crate::domain::errors::FulfillmentError;
use crate::domain::value_objects::{
    BatchId, FurnitureRequestId, GeoPoint, ItemId, RemovalDecision, RemovalId, RequestId,
    RequestRef, UnitId, Urgency, UserId,
};

/// Payload for creating a material request.
#[derive(Clone, Debug)]
pub struct NewMaterialRequest {
    pub item_id: ItemId,
    pub quantity: u32,
    pub urgency: Urgency,
    pub observations: Option<String>,
}

/// Payload for creating a furniture request.
#[derive(Clone, Debug)]
pub struct NewFurnitureRequest {
    pub item_id: ItemId,
    pub quantity: u32,
    /// Where in the unit the furniture goes.
    pub location: String,
    pub justification: String,
}

/// Payload for creating a removal request.
#[derive(Clone, Debug)]
pub struct NewRemoval {
    pub item_id: ItemId,
    pub quantity: u32,
    pub reason: String,
}

/// Payload for creating a delivery batch.
#[derive(Clone, Debug)]
pub struct NewBatch {
    pub members: Vec<RequestRef>,
    pub target_unit_id: UnitId,
    pub driver_id: UserId,
    pub notes: Option<String>,
}

/// Designer verdict on a furniture request.
#[derive(Clone, Debug)]
pub enum DesignDecision {
    /// Approve, optionally annotating.
    Approved { observations: Option<String> },
    /// Reject; the reason is mandatory.
    Rejected { reason: String },
}

/// Driver-side proof for the scan-and-confirm path: photo evidence plus the
/// recipient's daily code validated on the spot.
#[derive(Clone, Debug)]
pub struct DeliveryProof {
    pub recipient: UserId,
    pub code: String,
    pub photo_url: String,
    pub location: Option<GeoPoint>,
    pub notes: Option<String>,
}

/// Driver-side attestation for the confirm-later path. No recipient
/// identity is captured; the photo is the only evidence.
#[derive(Clone, Debug)]
pub struct DeferredProof {
    pub photo_url: String,
    pub location: Option<GeoPoint>,
    pub notes: Option<String>,
}

/// Recipient-side proof of identity at receipt.
#[derive(Clone, Debug)]
pub struct ReceiptProof {
    pub code: String,
    pub photo_url: String,
    pub notes: Option<String>,
}

/// Work awaiting a specific user's confirmation.
#[derive(Clone, Debug, Default)]
pub struct PendingConfirmations {
    pub batches: Vec<DeliveryBatch>,
    pub furniture: Vec<FurnitureRequest>,
}

/// Material request lifecycle (Driving Port).
#[async_trait]
pub trait MaterialRequestApi: Send + Sync {
    async fn create_request(
        &self,
        actor: UserId,
        request: NewMaterialRequest,
    ) -> Result<MaterialRequest, FulfillmentError>;

    async fn approve_request(
        &self,
        id: RequestId,
        actor: UserId,
    ) -> Result<MaterialRequest, FulfillmentError>;

    async fn reject_request(
        &self,
        id: RequestId,
        actor: UserId,
        reason: String,
    ) -> Result<MaterialRequest, FulfillmentError>;

    async fn cancel_request(
        &self,
        id: RequestId,
        actor: UserId,
    ) -> Result<MaterialRequest, FulfillmentError>;

    async fn start_processing(
        &self,
        id: RequestId,
        actor: UserId,
    ) -> Result<MaterialRequest, FulfillmentError>;

    async fn mark_awaiting_pickup(
        &self,
        id: RequestId,
        actor: UserId,
    ) -> Result<MaterialRequest, FulfillmentError>;

    async fn get_request(&self, id: RequestId) -> Result<MaterialRequest, FulfillmentError>;

    async fn requests_for_unit(
        &self,
        unit: UnitId,
    ) -> Result<Vec<MaterialRequest>, FulfillmentError>;
}

/// Furniture request lifecycle (Driving Port).
#[async_trait]
pub trait FurnitureRequestApi: Send + Sync {
    async fn create_furniture_request(
        &self,
        actor: UserId,
        request: NewFurnitureRequest,
    ) -> Result<FurnitureRequest, FulfillmentError>;

    async fn designer_review(
        &self,
        id: FurnitureRequestId,
        actor: UserId,
        decision: DesignDecision,
    ) -> Result<FurnitureRequest, FulfillmentError>;

    async fn approve_furniture_storage(
        &self,
        id: FurnitureRequestId,
        actor: UserId,
    ) -> Result<FurnitureRequest, FulfillmentError>;

    async fn mark_separated(
        &self,
        id: FurnitureRequestId,
        actor: UserId,
    ) -> Result<FurnitureRequest, FulfillmentError>;

    async fn mark_awaiting_delivery(
        &self,
        id: FurnitureRequestId,
        actor: UserId,
    ) -> Result<FurnitureRequest, FulfillmentError>;

    /// Individual (non-batch) dispatch; binds the QR token.
    async fn dispatch_furniture(
        &self,
        id: FurnitureRequestId,
        actor: UserId,
    ) -> Result<FurnitureRequest, FulfillmentError>;

    async fn mark_furniture_delivered(
        &self,
        id: FurnitureRequestId,
        actor: UserId,
        notes: Option<String>,
    ) -> Result<FurnitureRequest, FulfillmentError>;

    /// Terminal confirmation: the recipient supplies their own daily code.
    async fn confirm_furniture_receipt(
        &self,
        id: FurnitureRequestId,
        actor: UserId,
        proof: ReceiptProof,
    ) -> Result<FurnitureRequest, FulfillmentError>;

    async fn get_furniture_request(
        &self,
        id: FurnitureRequestId,
    ) -> Result<FurnitureRequest, FulfillmentError>;
}

/// Furniture removal lifecycle (Driving Port).
#[async_trait]
pub trait RemovalApi: Send + Sync {
    async fn create_removal(
        &self,
        actor: UserId,
        removal: NewRemoval,
    ) -> Result<FurnitureRemoval, FulfillmentError>;

    async fn review_removal(
        &self,
        id: RemovalId,
        actor: UserId,
        decision: RemovalDecision,
        justification: Option<String>,
    ) -> Result<FurnitureRemoval, FulfillmentError>;

    async fn reject_removal(
        &self,
        id: RemovalId,
        actor: UserId,
    ) -> Result<FurnitureRemoval, FulfillmentError>;

    async fn mark_removal_ready(
        &self,
        id: RemovalId,
        actor: UserId,
    ) -> Result<FurnitureRemoval, FulfillmentError>;

    async fn pickup_removal(
        &self,
        id: RemovalId,
        actor: UserId,
    ) -> Result<FurnitureRemoval, FulfillmentError>;

    async fn complete_removal(
        &self,
        id: RemovalId,
        actor: UserId,
    ) -> Result<FurnitureRemoval, FulfillmentError>;

    async fn get_removal(&self, id: RemovalId) -> Result<FurnitureRemoval, FulfillmentError>;
}

/// Delivery batch lifecycle (Driving Port).
#[async_trait]
pub trait DeliveryBatchApi: Send + Sync {
    async fn create_batch(
        &self,
        actor: UserId,
        batch: NewBatch,
    ) -> Result<DeliveryBatch, FulfillmentError>;

    async fn dispatch_batch(
        &self,
        id: BatchId,
        actor: UserId,
    ) -> Result<DeliveryBatch, FulfillmentError>;

    /// Scan-and-confirm: photo plus on-the-spot recipient code validation.
    async fn confirm_delivery(
        &self,
        id: BatchId,
        actor: UserId,
        proof: DeliveryProof,
    ) -> Result<DeliveryBatch, FulfillmentError>;

    /// Confirm-later: attestation without recipient identity.
    async fn confirm_later(
        &self,
        id: BatchId,
        actor: UserId,
        proof: DeferredProof,
    ) -> Result<DeliveryBatch, FulfillmentError>;

    /// Recipient-side confirmation with the recipient's own daily code.
    async fn confirm_receipt(
        &self,
        id: BatchId,
        actor: UserId,
        proof: ReceiptProof,
    ) -> Result<DeliveryBatch, FulfillmentError>;

    async fn cancel_batch(
        &self,
        id: BatchId,
        actor: UserId,
    ) -> Result<DeliveryBatch, FulfillmentError>;

    async fn get_batch(&self, id: BatchId) -> Result<DeliveryBatch, FulfillmentError>;
}

/// Read-mostly aggregation queries (Driving Port).
#[async_trait]
pub trait FulfillmentQueries: Send + Sync {
    /// Batches and furniture requests awaiting this user's confirmation.
    async fn pending_for_user(
        &self,
        user: UserId,
    ) -> Result<PendingConfirmations, FulfillmentError>;

    /// Ledger entries for a batch, in insertion order.
    async fn entries_for(
        &self,
        batch: BatchId,
    ) -> Result<Vec<DeliveryConfirmation>, FulfillmentError>;
}

/// The whole fulfillment surface.
pub trait FulfillmentApi:
    MaterialRequestApi + FurnitureRequestApi + RemovalApi + DeliveryBatchApi + FulfillmentQueries
{
}

impl<T> FulfillmentApi for T where
    T: MaterialRequestApi + FurnitureRequestApi + RemovalApi + DeliveryBatchApi + FulfillmentQueries
{
}
