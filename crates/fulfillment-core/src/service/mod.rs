//! # Service Module
//!
//! Orchestration over the domain state machines: the coordinator implements
//! every driving port, the ledger guards the append-only confirmation
//! record. Per-lifecycle operations live in their own files.

pub mod coordinator;
pub mod furniture;
pub mod ledger;
pub mod material;
pub mod removal;

pub use coordinator::{CoordinatorPorts, FulfillmentCoordinator};
pub use ledger::ConfirmationLedger;
