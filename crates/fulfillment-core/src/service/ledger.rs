//! # Confirmation Ledger
//!
//! Append-only record of handoff proofs. Entries are never mutated or
//! deleted; corrections are new entries with explanatory notes, so the
//! audit history stays complete.

use std::sync::Arc;

use tracing::debug;

use crate::domain::entities::DeliveryConfirmation;
use crate::domain::errors::FulfillmentError;
use crate::domain::invariants::invariant_confirmation_order;
use crate::domain::value_objects::{
    BatchId, ConfirmationKind, ConfirmationSubject, FurnitureRequestId,
};
use crate::ports::outbound::ConfirmationStore;

/// Append-only ledger over the confirmation store.
#[derive(Clone)]
pub struct ConfirmationLedger {
    store: Arc<dyn ConfirmationStore>,
}

impl ConfirmationLedger {
    /// Create a ledger over the given store.
    pub fn new(store: Arc<dyn ConfirmationStore>) -> Self {
        Self { store }
    }

    /// Record a confirmation.
    ///
    /// Idempotent-append: a second entry of the same kind for the same
    /// subject fails with `DuplicateConfirmation` and the ledger is
    /// unchanged. For batch subjects a receipt-side entry additionally
    /// requires a prior delivery entry.
    pub async fn record(
        &self,
        entry: DeliveryConfirmation,
    ) -> Result<DeliveryConfirmation, FulfillmentError> {
        if let ConfirmationSubject::Batch(batch_id) = entry.subject {
            let existing = self.store.for_batch(batch_id).await?;
            let has_delivery = existing
                .iter()
                .any(|e| e.kind == ConfirmationKind::Delivery);
            invariant_confirmation_order(entry.kind, has_delivery)?;
        }
        self.store.append(entry.clone()).await?;
        debug!(subject = ?entry.subject, kind = %entry.kind, "confirmation recorded");
        Ok(entry)
    }

    /// Entries for a batch, in insertion order.
    pub async fn entries_for(
        &self,
        batch: BatchId,
    ) -> Result<Vec<DeliveryConfirmation>, FulfillmentError> {
        self.store.for_batch(batch).await
    }

    /// Entries for an individually-dispatched furniture request.
    pub async fn entries_for_furniture(
        &self,
        id: FurnitureRequestId,
    ) -> Result<Vec<DeliveryConfirmation>, FulfillmentError> {
        self.store.for_furniture(id).await
    }
}
