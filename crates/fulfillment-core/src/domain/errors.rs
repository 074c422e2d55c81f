//! # Domain Errors
//!
//! Typed failure taxonomy for the fulfillment core. Every error is returned
//! to the caller; the coordinator never retries on its own.

use thiserror::Error;

use super::value_objects::{ConfirmationKind, ItemId, RequestRef, Role, UserId};

/// Fulfillment error types.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// The requested edge is not defined for the entity's current state.
    #[error("Invalid transition for {entity}: {from} -> {to}")]
    InvalidTransition {
        /// Entity kind the transition was attempted on
        entity: &'static str,
        /// Current state
        from: String,
        /// Attempted state
        to: String,
    },

    /// Optimistic-concurrency conflict: the entity changed under the caller.
    #[error("Stale state: expected {expected}, found {actual}")]
    StaleState {
        /// State the caller observed
        expected: String,
        /// State found at write time
        actual: String,
    },

    /// The request already belongs to another open batch.
    #[error("Already batched: {0}")]
    AlreadyBatched(RequestRef),

    /// Disposal decision without a written justification.
    #[error("Disposal requires a justification")]
    MissingJustification,

    /// Rejection without a stated reason.
    #[error("Rejection requires a reason")]
    MissingReason,

    /// Submitted daily code does not match the derived value for that user.
    #[error("Daily code does not match")]
    InvalidCode,

    /// A confirmation of this kind already exists for the subject.
    #[error("Duplicate {kind} confirmation")]
    DuplicateConfirmation {
        /// Kind of the rejected entry
        kind: ConfirmationKind,
    },

    /// Receipt recorded before any delivery confirmation exists.
    #[error("No delivery confirmation recorded for this subject")]
    MissingDeliveryConfirmation,

    /// Cancellation attempted after processing began.
    #[error("Too late to cancel: request is {status}")]
    TooLateToCancel {
        /// State that blocked the cancellation
        status: String,
    },

    /// Actor does not hold any of the roles the transition requires.
    #[error("User {actor} lacks a required role: {required:?}")]
    UnauthorizedRole {
        /// Acting user
        actor: UserId,
        /// Roles that may perform the transition
        required: Vec<Role>,
    },

    /// Quantity must be strictly positive.
    #[error("Quantity must be positive, got {0}")]
    InvalidQuantity(u32),

    /// Batch creation with no members.
    #[error("Batch has no members")]
    EmptyBatch,

    /// Acting driver is not the driver bound to the batch.
    #[error("User {actor} is not the driver assigned to batch")]
    DriverMismatch {
        /// Acting user
        actor: UserId,
    },

    /// Transit requires the proof-of-possession token.
    #[error("Transit requires a QR code")]
    MissingQrCode,

    /// Item kind does not match the request type (material vs. furniture).
    #[error("Item {0} kind does not match the request type")]
    ItemKindMismatch(ItemId),

    /// Entity lookup failed.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind
        entity: &'static str,
        /// Identifier that missed
        id: String,
    },

    /// Directory lookup failure.
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Stock adjustment failure.
    #[error("Stock error: {0}")]
    Stock(#[from] StockError),
}

/// Errors from the user/item directory capability.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    #[error("Unknown item: {0}")]
    UnknownItem(ItemId),

    #[error("Directory unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the stock-adjustment capability.
#[derive(Debug, Error)]
pub enum StockError {
    #[error("Insufficient stock for item {item}: requested {requested}, available {available}")]
    Insufficient {
        /// Item the adjustment targeted
        item: ItemId,
        /// Quantity requested
        requested: u32,
        /// Quantity on hand
        available: u32,
    },

    #[error("Stock backend unavailable: {0}")]
    Unavailable(String),
}
