//! # Domain Value Objects
//!
//! Identifier newtypes, role/urgency classifiers, and the status machines.
//! Each status enum carries its own legal-edge table; services never compare
//! raw strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a material request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

/// Identifier of a furniture request to a designer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FurnitureRequestId(pub Uuid);

/// Identifier of a furniture removal request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemovalId(pub Uuid);

/// Identifier of a delivery batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(pub Uuid);

/// Identifier of a ledger confirmation entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfirmationId(pub Uuid);

/// Identifier of a user (requester, controller, warehouse, driver, designer).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

/// Identifier of an organizational unit (destination of deliveries).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(pub Uuid);

/// Identifier of a catalog item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

macro_rules! impl_id {
    ($($id:ident),+) => {
        $(
            impl $id {
                /// Generate a fresh random identifier.
                pub fn new() -> Self {
                    Self(Uuid::new_v4())
                }
            }

            impl Default for $id {
                fn default() -> Self {
                    Self::new()
                }
            }

            impl fmt::Display for $id {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )+
    };
}

impl_id!(
    RequestId,
    FurnitureRequestId,
    RemovalId,
    BatchId,
    ConfirmationId,
    UserId,
    UnitId,
    ItemId
);

/// Role a user acts under. Checked once at every transition boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Requester,
    Controller,
    Warehouse,
    Driver,
    Designer,
    Admin,
}

/// Urgency of a material request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

/// Kind of a ledger confirmation entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfirmationKind {
    /// Driver-side proof that the goods changed hands.
    Delivery,
    /// Unit-controller proof of identity at receipt.
    Receipt,
    /// Original-requester proof of identity at receipt.
    Requester,
}

impl fmt::Display for ConfirmationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Delivery => "delivery",
            Self::Receipt => "receipt",
            Self::Requester => "requester",
        };
        write!(f, "{label}")
    }
}

/// Handle to a batch member. Batches store identifiers, never entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestRef {
    Material(RequestId),
    Furniture(FurnitureRequestId),
}

impl fmt::Display for RequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Material(id) => write!(f, "material:{id}"),
            Self::Furniture(id) => write!(f, "furniture:{id}"),
        }
    }
}

/// Subject of a ledger entry: exactly one of batch or furniture request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfirmationSubject {
    Batch(BatchId),
    Furniture(FurnitureRequestId),
}

/// Geographic point attached to a confirmation, when the device provides one.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Reviewer decision on a furniture removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalDecision {
    /// Item returns to warehouse storage.
    Storage,
    /// Item is discarded. Requires a written justification.
    Disposal,
}

/// Material request state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Processing,
    AwaitingPickup,
    OutForDelivery,
    DeliveryConfirmed,
    ReceivedConfirmed,
    Completed,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        match (self, next) {
            (Self::Pending, Self::Approved) => true,
            (Self::Approved, Self::Processing) => true,
            (Self::Processing, Self::AwaitingPickup) => true,
            (Self::AwaitingPickup, Self::OutForDelivery) => true,
            (Self::OutForDelivery, Self::DeliveryConfirmed) => true,
            (Self::DeliveryConfirmed, Self::ReceivedConfirmed) => true,
            (Self::ReceivedConfirmed, Self::Completed) => true,
            // Rejection stays open until dispatch.
            (
                Self::Pending | Self::Approved | Self::Processing | Self::AwaitingPickup,
                Self::Rejected,
            ) => true,
            // Cancellation closes once processing has begun.
            (Self::Pending | Self::Approved, Self::Cancelled) => true,
            _ => false,
        }
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected | Self::Cancelled)
    }

    /// States a request may be in before it leaves the warehouse.
    pub fn is_pre_dispatch(&self) -> bool {
        matches!(
            self,
            Self::Pending | Self::Approved | Self::Processing | Self::AwaitingPickup
        )
    }
}

/// Furniture request state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FurnitureStatus {
    #[default]
    PendingDesigner,
    ApprovedDesigner,
    ApprovedStorage,
    Separated,
    AwaitingDelivery,
    InTransit,
    PendingConfirmation,
    Completed,
    Rejected,
}

impl FurnitureStatus {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: FurnitureStatus) -> bool {
        match (self, next) {
            (Self::PendingDesigner, Self::ApprovedDesigner) => true,
            (Self::ApprovedDesigner, Self::ApprovedStorage) => true,
            (Self::ApprovedStorage, Self::Separated) => true,
            (Self::Separated, Self::AwaitingDelivery) => true,
            // Dispatch may pick the item up anywhere after storage sign-off.
            (
                Self::ApprovedStorage | Self::Separated | Self::AwaitingDelivery,
                Self::InTransit,
            ) => true,
            (Self::InTransit, Self::PendingConfirmation) => true,
            (Self::PendingConfirmation, Self::Completed) => true,
            (Self::PendingDesigner | Self::ApprovedDesigner, Self::Rejected) => true,
            _ => false,
        }
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }

    /// States from which the item can still be attached to a batch.
    pub fn is_batchable(&self) -> bool {
        matches!(
            self,
            Self::ApprovedStorage | Self::Separated | Self::AwaitingDelivery
        )
    }
}

/// Furniture removal state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalStatus {
    #[default]
    Pending,
    ApprovedStorage,
    ApprovedDisposal,
    AwaitingPickup,
    InTransit,
    Completed,
    Rejected,
}

impl RemovalStatus {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: RemovalStatus) -> bool {
        match (self, next) {
            (Self::Pending, Self::ApprovedStorage | Self::ApprovedDisposal) => true,
            (Self::ApprovedStorage | Self::ApprovedDisposal, Self::AwaitingPickup) => true,
            (Self::AwaitingPickup, Self::InTransit) => true,
            (Self::InTransit, Self::Completed) => true,
            (Self::Pending, Self::Rejected) => true,
            _ => false,
        }
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }
}

/// Delivery batch state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    #[default]
    Pending,
    InTransit,
    DeliveryConfirmed,
    PendingConfirmation,
    ReceivedConfirmed,
    ConfirmedByRequester,
    Completed,
    Cancelled,
}

impl BatchStatus {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: BatchStatus) -> bool {
        match (self, next) {
            (Self::Pending, Self::InTransit) => true,
            // Mutually exclusive successors of transit: scan-and-confirm
            // versus confirm-later.
            (Self::InTransit, Self::DeliveryConfirmed | Self::PendingConfirmation) => true,
            (
                Self::DeliveryConfirmed | Self::PendingConfirmation,
                Self::ReceivedConfirmed | Self::ConfirmedByRequester,
            ) => true,
            (Self::ReceivedConfirmed | Self::ConfirmedByRequester, Self::Completed) => true,
            (Self::Pending, Self::Cancelled) => true,
            _ => false,
        }
    }

    /// Check if terminal state. Members of a terminal batch are unclaimed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// States where the batch awaits a recipient-side identity proof.
    pub fn awaits_receipt(&self) -> bool {
        matches!(self, Self::DeliveryConfirmed | Self::PendingConfirmation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_forward_chain() {
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Approved));
        assert!(RequestStatus::Approved.can_transition_to(RequestStatus::Processing));
        assert!(RequestStatus::Processing.can_transition_to(RequestStatus::AwaitingPickup));
        assert!(RequestStatus::AwaitingPickup.can_transition_to(RequestStatus::OutForDelivery));
        assert!(RequestStatus::OutForDelivery.can_transition_to(RequestStatus::DeliveryConfirmed));
        assert!(
            RequestStatus::DeliveryConfirmed.can_transition_to(RequestStatus::ReceivedConfirmed)
        );
        assert!(RequestStatus::ReceivedConfirmed.can_transition_to(RequestStatus::Completed));
    }

    #[test]
    fn test_request_no_skipping() {
        assert!(!RequestStatus::Pending.can_transition_to(RequestStatus::Processing));
        assert!(!RequestStatus::Approved.can_transition_to(RequestStatus::OutForDelivery));
        assert!(!RequestStatus::AwaitingPickup.can_transition_to(RequestStatus::DeliveryConfirmed));
    }

    #[test]
    fn test_request_rejection_window_closes_at_dispatch() {
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Rejected));
        assert!(RequestStatus::AwaitingPickup.can_transition_to(RequestStatus::Rejected));
        assert!(!RequestStatus::OutForDelivery.can_transition_to(RequestStatus::Rejected));
        assert!(!RequestStatus::DeliveryConfirmed.can_transition_to(RequestStatus::Rejected));
    }

    #[test]
    fn test_request_cancellation_window() {
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Cancelled));
        assert!(RequestStatus::Approved.can_transition_to(RequestStatus::Cancelled));
        assert!(!RequestStatus::Processing.can_transition_to(RequestStatus::Cancelled));
        assert!(!RequestStatus::AwaitingPickup.can_transition_to(RequestStatus::Cancelled));
    }

    #[test]
    fn test_request_terminal() {
        assert!(RequestStatus::Completed.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
        assert!(RequestStatus::Cancelled.is_terminal());
        assert!(!RequestStatus::ReceivedConfirmed.is_terminal());
    }

    #[test]
    fn test_furniture_forward_chain() {
        assert!(FurnitureStatus::PendingDesigner.can_transition_to(FurnitureStatus::ApprovedDesigner));
        assert!(FurnitureStatus::ApprovedDesigner.can_transition_to(FurnitureStatus::ApprovedStorage));
        assert!(FurnitureStatus::ApprovedStorage.can_transition_to(FurnitureStatus::Separated));
        assert!(FurnitureStatus::Separated.can_transition_to(FurnitureStatus::AwaitingDelivery));
        assert!(FurnitureStatus::AwaitingDelivery.can_transition_to(FurnitureStatus::InTransit));
        assert!(FurnitureStatus::InTransit.can_transition_to(FurnitureStatus::PendingConfirmation));
        assert!(FurnitureStatus::PendingConfirmation.can_transition_to(FurnitureStatus::Completed));
    }

    #[test]
    fn test_furniture_rejection_only_during_review() {
        assert!(FurnitureStatus::PendingDesigner.can_transition_to(FurnitureStatus::Rejected));
        assert!(FurnitureStatus::ApprovedDesigner.can_transition_to(FurnitureStatus::Rejected));
        assert!(!FurnitureStatus::ApprovedStorage.can_transition_to(FurnitureStatus::Rejected));
        assert!(!FurnitureStatus::InTransit.can_transition_to(FurnitureStatus::Rejected));
    }

    #[test]
    fn test_furniture_batchable_states() {
        assert!(FurnitureStatus::ApprovedStorage.is_batchable());
        assert!(FurnitureStatus::Separated.is_batchable());
        assert!(FurnitureStatus::AwaitingDelivery.is_batchable());
        assert!(!FurnitureStatus::PendingDesigner.is_batchable());
        assert!(!FurnitureStatus::InTransit.is_batchable());
    }

    #[test]
    fn test_removal_decision_branch() {
        assert!(RemovalStatus::Pending.can_transition_to(RemovalStatus::ApprovedStorage));
        assert!(RemovalStatus::Pending.can_transition_to(RemovalStatus::ApprovedDisposal));
        assert!(RemovalStatus::ApprovedDisposal.can_transition_to(RemovalStatus::AwaitingPickup));
        assert!(RemovalStatus::AwaitingPickup.can_transition_to(RemovalStatus::InTransit));
        assert!(RemovalStatus::InTransit.can_transition_to(RemovalStatus::Completed));
    }

    #[test]
    fn test_removal_rejection_only_from_pending() {
        assert!(RemovalStatus::Pending.can_transition_to(RemovalStatus::Rejected));
        assert!(!RemovalStatus::ApprovedStorage.can_transition_to(RemovalStatus::Rejected));
        assert!(!RemovalStatus::InTransit.can_transition_to(RemovalStatus::Rejected));
    }

    #[test]
    fn test_batch_two_confirmation_paths() {
        assert!(BatchStatus::InTransit.can_transition_to(BatchStatus::DeliveryConfirmed));
        assert!(BatchStatus::InTransit.can_transition_to(BatchStatus::PendingConfirmation));
        // The two paths never chain into each other.
        assert!(!BatchStatus::DeliveryConfirmed.can_transition_to(BatchStatus::PendingConfirmation));
        assert!(!BatchStatus::PendingConfirmation.can_transition_to(BatchStatus::DeliveryConfirmed));
    }

    #[test]
    fn test_batch_receipt_from_either_path() {
        assert!(BatchStatus::DeliveryConfirmed.can_transition_to(BatchStatus::ReceivedConfirmed));
        assert!(BatchStatus::PendingConfirmation.can_transition_to(BatchStatus::ReceivedConfirmed));
        assert!(
            BatchStatus::DeliveryConfirmed.can_transition_to(BatchStatus::ConfirmedByRequester)
        );
        assert!(BatchStatus::ReceivedConfirmed.can_transition_to(BatchStatus::Completed));
        assert!(BatchStatus::ConfirmedByRequester.can_transition_to(BatchStatus::Completed));
    }

    #[test]
    fn test_batch_cancel_only_before_dispatch() {
        assert!(BatchStatus::Pending.can_transition_to(BatchStatus::Cancelled));
        assert!(!BatchStatus::InTransit.can_transition_to(BatchStatus::Cancelled));
    }

    #[test]
    fn test_request_ref_display() {
        let id = RequestId::new();
        assert_eq!(
            RequestRef::Material(id).to_string(),
            format!("material:{id}")
        );
    }
}
