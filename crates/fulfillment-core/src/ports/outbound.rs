//! # Outbound Ports (Driven Ports)
//!
//! Capabilities the fulfillment core consumes from collaborators: directory
//! lookups, stock adjustment, time, token generation, and the entity stores.
//! The core never implements persistence; it talks to these traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{
    DeliveryBatch, DeliveryConfirmation, FurnitureRemoval, FurnitureRequest, MaterialRequest,
};
use crate::domain::errors::{DirectoryError, FulfillmentError, StockError};
use crate::domain::value_objects::{
    BatchId, BatchStatus, FurnitureRequestId, FurnitureStatus, ItemId, RemovalId, RemovalStatus,
    RequestId, RequestStatus, Role, UnitId, UserId,
};

/// Resolved user record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub role: Role,
    pub unit_id: UnitId,
}

/// Resolved catalog item record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub name: String,
    pub is_furniture: bool,
}

/// Read-only user/item directory (Driven Port).
#[async_trait]
pub trait Directory: Send + Sync {
    /// Resolve a user identifier.
    async fn resolve_user(&self, id: UserId) -> Result<UserRecord, DirectoryError>;

    /// Resolve an item identifier.
    async fn resolve_item(&self, id: ItemId) -> Result<ItemRecord, DirectoryError>;
}

/// External stock-adjustment capability (Driven Port).
#[async_trait]
pub trait StockAdjuster: Send + Sync {
    /// Adjust unit stock by `delta`.
    ///
    /// MUST be idempotent when replayed with the same operation id:
    /// retries of the same logical operation apply at most once.
    async fn adjust(
        &self,
        item: ItemId,
        unit: UnitId,
        delta: i64,
        op: RequestId,
    ) -> Result<(), StockError>;
}

/// Injected time source.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Injected source of opaque proof-of-possession tokens.
pub trait TokenSource: Send + Sync {
    /// A fresh random opaque token. Distinct from the daily code: the token
    /// proves possession, not identity.
    fn opaque_token(&self) -> String;
}

/// Material request store (Driven Port).
///
/// `replace` is the unit of write: it succeeds only when the stored status
/// still equals `expected`, failing with `StaleState` otherwise. Two
/// concurrent identical transitions resolve to one success, one failure.
#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn insert(&self, request: MaterialRequest) -> Result<(), FulfillmentError>;
    async fn get(&self, id: RequestId) -> Result<MaterialRequest, FulfillmentError>;
    async fn replace(
        &self,
        expected: RequestStatus,
        request: MaterialRequest,
    ) -> Result<(), FulfillmentError>;
    async fn list_by_unit(&self, unit: UnitId) -> Result<Vec<MaterialRequest>, FulfillmentError>;
}

/// Furniture request store (Driven Port). Same conditional-write contract
/// as [`RequestStore`].
#[async_trait]
pub trait FurnitureStore: Send + Sync {
    async fn insert(&self, request: FurnitureRequest) -> Result<(), FulfillmentError>;
    async fn get(&self, id: FurnitureRequestId) -> Result<FurnitureRequest, FulfillmentError>;
    async fn replace(
        &self,
        expected: FurnitureStatus,
        request: FurnitureRequest,
    ) -> Result<(), FulfillmentError>;
    async fn list_by_status(
        &self,
        status: FurnitureStatus,
    ) -> Result<Vec<FurnitureRequest>, FulfillmentError>;
}

/// Furniture removal store (Driven Port). Same conditional-write contract
/// as [`RequestStore`].
#[async_trait]
pub trait RemovalStore: Send + Sync {
    async fn insert(&self, removal: FurnitureRemoval) -> Result<(), FulfillmentError>;
    async fn get(&self, id: RemovalId) -> Result<FurnitureRemoval, FulfillmentError>;
    async fn replace(
        &self,
        expected: RemovalStatus,
        removal: FurnitureRemoval,
    ) -> Result<(), FulfillmentError>;
}

/// Delivery batch store (Driven Port).
#[async_trait]
pub trait BatchStore: Send + Sync {
    /// Create a batch, claiming its members.
    ///
    /// Membership validation and the claim are one atomic unit: the batch is
    /// inserted only if no member belongs to another open batch; otherwise
    /// the call fails with `AlreadyBatched` and nothing is claimed. Two
    /// concurrent creations over overlapping members yield exactly one
    /// success.
    async fn create(&self, batch: DeliveryBatch) -> Result<(), FulfillmentError>;

    async fn get(&self, id: BatchId) -> Result<DeliveryBatch, FulfillmentError>;

    /// Conditional write, as [`RequestStore::replace`].
    async fn replace(
        &self,
        expected: BatchStatus,
        batch: DeliveryBatch,
    ) -> Result<(), FulfillmentError>;

    /// All non-terminal batches.
    async fn open_batches(&self) -> Result<Vec<DeliveryBatch>, FulfillmentError>;
}

/// Append-only confirmation store (Driven Port).
#[async_trait]
pub trait ConfirmationStore: Send + Sync {
    /// Atomic check-and-append: fails with `DuplicateConfirmation` when an
    /// entry of the same kind already exists for the same subject. Entries
    /// are never mutated or deleted.
    async fn append(&self, entry: DeliveryConfirmation) -> Result<(), FulfillmentError>;

    /// Entries for a batch, in insertion order.
    async fn for_batch(&self, id: BatchId) -> Result<Vec<DeliveryConfirmation>, FulfillmentError>;

    /// Entries for an individually-dispatched furniture request, in
    /// insertion order.
    async fn for_furniture(
        &self,
        id: FurnitureRequestId,
    ) -> Result<Vec<DeliveryConfirmation>, FulfillmentError>;
}
