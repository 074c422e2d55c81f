//! # Fulfillment Core
//!
//! The fulfillment and delivery-confirmation core of the inventory console:
//! the state machines that move a material or furniture request from
//! creation to physically-verified receipt, the batching of requests into a
//! single delivery run, and the rotating-code handoff protocol that
//! authenticates who delivered and who received.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure business logic, no I/O
//!   - Entities with edge-table state machines: `MaterialRequest`,
//!     `FurnitureRequest`, `FurnitureRemoval`, `DeliveryBatch`
//!   - `DeliveryConfirmation`: append-only handoff proof
//!   - `daily_code`: deterministic date-scoped identity codes
//!   - Invariants and the typed error taxonomy
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - Driving: `FulfillmentApi` and the per-lifecycle traits
//!   - Driven: `Directory`, `StockAdjuster`, `Clock`, `TokenSource`, and
//!     the entity stores with conditional-write semantics
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `FulfillmentCoordinator`: implements every driving port
//!   - `ConfirmationLedger`: idempotent-append confirmation record
//!
//! - **Adapters Layer** (`adapters/`): In-memory reference implementations
//!
//! ## The two-proof handoff
//!
//! A delivery closes with two independent proofs from two actors: the
//! driver's photo-backed delivery confirmation (optionally validating the
//! recipient's daily code on the spot), and the recipient's own daily code
//! at receipt. Possession is proven by the batch QR token, identity by the
//! daily code; neither substitutes for the other. The confirm-later path
//! intentionally skips the on-the-spot validation and carries a weaker
//! guarantee until the receipt proof arrives.
//!
//! ## Concurrency
//!
//! Every transition is a compare-and-swap: read, validate the edge, write
//! conditioned on the status being unchanged. Concurrent identical
//! transitions resolve to one success and one `StaleState`. Batch creation
//! claims its members atomically. Daily-code computation is pure and
//! lock-free.
//!
//! ## Usage Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use fulfillment_core::{
//!     CoordinatorPorts, FulfillmentCoordinator, InMemoryStockAdjuster, InMemoryStore,
//!     RandomTokenSource, StaticDirectory, SystemClock,
//! };
//!
//! let store = Arc::new(InMemoryStore::new());
//! let coordinator = FulfillmentCoordinator::new(CoordinatorPorts {
//!     requests: store.clone(),
//!     furniture: store.clone(),
//!     removals: store.clone(),
//!     batches: store.clone(),
//!     confirmations: store,
//!     stock: Arc::new(InMemoryStockAdjuster::new()),
//!     directory: Arc::new(StaticDirectory::new()),
//!     clock: Arc::new(SystemClock),
//!     tokens: Arc::new(RandomTokenSource),
//! });
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use domain::daily_code;
pub use domain::entities::{
    ConfirmationParams, DeliveryBatch, DeliveryBatchParams, DeliveryConfirmation,
    FurnitureRemoval, FurnitureRemovalParams, FurnitureRequest, FurnitureRequestParams,
    MaterialRequest, MaterialRequestParams,
};
pub use domain::errors::{DirectoryError, FulfillmentError, StockError};
pub use domain::value_objects::{
    BatchId, BatchStatus, ConfirmationId, ConfirmationKind, ConfirmationSubject,
    FurnitureRequestId, FurnitureStatus, GeoPoint, ItemId, RemovalDecision, RemovalId,
    RemovalStatus, RequestId, RequestRef, RequestStatus, Role, UnitId, Urgency, UserId,
};
pub use ports::inbound::{
    DeferredProof, DeliveryBatchApi, DeliveryProof, DesignDecision, FulfillmentApi,
    FulfillmentQueries, FurnitureRequestApi, MaterialRequestApi, NewBatch, NewFurnitureRequest,
    NewMaterialRequest, NewRemoval, PendingConfirmations, ReceiptProof, RemovalApi,
};
pub use ports::outbound::{
    BatchStore, Clock, ConfirmationStore, Directory, FurnitureStore, ItemRecord, RemovalStore,
    RequestStore, StockAdjuster, TokenSource, UserRecord,
};
pub use service::{ConfirmationLedger, CoordinatorPorts, FulfillmentCoordinator};

// Adapter exports
pub use adapters::{
    InMemoryStockAdjuster, InMemoryStore, ManualClock, RandomTokenSource, SequenceTokenSource,
    StaticDirectory, SystemClock,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
