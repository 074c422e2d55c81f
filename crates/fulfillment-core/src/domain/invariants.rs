//! # Domain Invariants
//!
//! Business rules shared across the lifecycles. Each rule is a free
//! function so the services apply them at the transition boundary and the
//! rules stay testable in isolation.

use super::errors::FulfillmentError;
use super::value_objects::{
    ConfirmationKind, FurnitureStatus, RemovalDecision, RequestRef, RequestStatus, Role, UserId,
};

/// Invariant: quantities are strictly positive.
pub fn invariant_positive_quantity(quantity: u32) -> Result<(), FulfillmentError> {
    if quantity == 0 {
        return Err(FulfillmentError::InvalidQuantity(quantity));
    }
    Ok(())
}

/// Invariant: the acting user holds one of the roles the edge requires.
///
/// Checked once per transition at the service boundary, never scattered
/// through presentation code.
pub fn invariant_actor_role(
    actor: UserId,
    role: Role,
    allowed: &[Role],
) -> Result<(), FulfillmentError> {
    if allowed.contains(&role) {
        return Ok(());
    }
    Err(FulfillmentError::UnauthorizedRole {
        actor,
        required: allowed.to_vec(),
    })
}

/// Invariant: a disposal decision carries a non-empty justification.
///
/// Absence of justification fails the transition; it never silently
/// defaults to storage.
pub fn invariant_disposal_justified(
    decision: RemovalDecision,
    justification: Option<&str>,
) -> Result<(), FulfillmentError> {
    if decision == RemovalDecision::Disposal
        && justification.map_or(true, |j| j.trim().is_empty())
    {
        return Err(FulfillmentError::MissingJustification);
    }
    Ok(())
}

/// Invariant: a rejection states a non-empty reason.
pub fn invariant_rejection_reason(reason: &str) -> Result<(), FulfillmentError> {
    if reason.trim().is_empty() {
        return Err(FulfillmentError::MissingReason);
    }
    Ok(())
}

/// Invariant: an item in transit carries its proof-of-possession token.
pub fn invariant_qr_present(qr_code: Option<&str>) -> Result<(), FulfillmentError> {
    match qr_code {
        Some(code) if !code.is_empty() => Ok(()),
        _ => Err(FulfillmentError::MissingQrCode),
    }
}

/// Invariant: a receipt-side entry requires a prior delivery entry for the
/// same subject.
pub fn invariant_confirmation_order(
    kind: ConfirmationKind,
    has_delivery: bool,
) -> Result<(), FulfillmentError> {
    if kind != ConfirmationKind::Delivery && !has_delivery {
        return Err(FulfillmentError::MissingDeliveryConfirmation);
    }
    Ok(())
}

/// Invariant: a material request joins a batch only while awaiting pickup.
pub fn invariant_batchable_material(
    member: RequestRef,
    status: RequestStatus,
) -> Result<(), FulfillmentError> {
    if status == RequestStatus::AwaitingPickup {
        return Ok(());
    }
    Err(FulfillmentError::InvalidTransition {
        entity: "material request",
        from: format!("{status:?}"),
        to: format!("Batched({member})"),
    })
}

/// Invariant: a furniture request joins a batch only after storage sign-off
/// and before transit.
pub fn invariant_batchable_furniture(
    member: RequestRef,
    status: FurnitureStatus,
) -> Result<(), FulfillmentError> {
    if status.is_batchable() {
        return Ok(());
    }
    Err(FulfillmentError::InvalidTransition {
        entity: "furniture request",
        from: format!("{status:?}"),
        to: format!("Batched({member})"),
    })
}
