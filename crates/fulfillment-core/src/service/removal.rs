//! # Furniture Removal Operations
//!
//! Retiring furniture from a unit: a binary storage/disposal review, then
//! collection by a driver. The receiving side is internal staff, so no code
//! check gates completion.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::entities::{FurnitureRemoval, FurnitureRemovalParams};
use crate::domain::errors::FulfillmentError;
use crate::domain::invariants::invariant_positive_quantity;
use crate::domain::value_objects::{RemovalDecision, RemovalId, Role, UserId};
use crate::ports::inbound::{NewRemoval, RemovalApi};

use super::coordinator::FulfillmentCoordinator;

#[async_trait]
impl RemovalApi for FulfillmentCoordinator {
    async fn create_removal(
        &self,
        actor: UserId,
        removal: NewRemoval,
    ) -> Result<FurnitureRemoval, FulfillmentError> {
        let user = self
            .authorize(actor, &[Role::Requester, Role::Controller, Role::Admin])
            .await?;
        invariant_positive_quantity(removal.quantity)?;
        let item = self.directory.resolve_item(removal.item_id).await?;
        if !item.is_furniture {
            return Err(FulfillmentError::ItemKindMismatch(item.id));
        }

        let removal = FurnitureRemoval::new(FurnitureRemovalParams {
            id: RemovalId::new(),
            item_id: item.id,
            unit_id: user.unit_id,
            requested_by: user.id,
            quantity: removal.quantity,
            reason: removal.reason,
            created_at: self.clock.now(),
        });
        self.removals.insert(removal.clone()).await?;
        info!(removal = %removal.id, unit = %removal.unit_id, "removal request created");
        Ok(removal)
    }

    async fn review_removal(
        &self,
        id: RemovalId,
        actor: UserId,
        decision: RemovalDecision,
        justification: Option<String>,
    ) -> Result<FurnitureRemoval, FulfillmentError> {
        let user = self.authorize(actor, &[Role::Controller, Role::Admin]).await?;
        let mut removal = self.removals.get(id).await?;
        let expected = removal.status;
        removal.review(user.id, decision, justification, self.clock.now())?;
        self.removals.replace(expected, removal.clone()).await?;
        debug!(removal = %id, decision = ?decision, "removal reviewed");
        Ok(removal)
    }

    async fn reject_removal(
        &self,
        id: RemovalId,
        actor: UserId,
    ) -> Result<FurnitureRemoval, FulfillmentError> {
        let user = self.authorize(actor, &[Role::Controller, Role::Admin]).await?;
        let mut removal = self.removals.get(id).await?;
        let expected = removal.status;
        removal.reject(user.id, self.clock.now())?;
        self.removals.replace(expected, removal.clone()).await?;
        debug!(removal = %id, "removal rejected");
        Ok(removal)
    }

    async fn mark_removal_ready(
        &self,
        id: RemovalId,
        actor: UserId,
    ) -> Result<FurnitureRemoval, FulfillmentError> {
        self.authorize(actor, &[Role::Warehouse, Role::Admin]).await?;
        let mut removal = self.removals.get(id).await?;
        let expected = removal.status;
        removal.mark_ready()?;
        self.removals.replace(expected, removal.clone()).await?;
        Ok(removal)
    }

    async fn pickup_removal(
        &self,
        id: RemovalId,
        actor: UserId,
    ) -> Result<FurnitureRemoval, FulfillmentError> {
        let user = self.authorize(actor, &[Role::Driver]).await?;
        let mut removal = self.removals.get(id).await?;
        let expected = removal.status;
        removal.pickup(user.id, self.clock.now())?;
        self.removals.replace(expected, removal.clone()).await?;
        debug!(removal = %id, driver = %user.id, "removal collected");
        Ok(removal)
    }

    async fn complete_removal(
        &self,
        id: RemovalId,
        actor: UserId,
    ) -> Result<FurnitureRemoval, FulfillmentError> {
        let user = self.authorize(actor, &[Role::Warehouse, Role::Admin]).await?;
        let mut removal = self.removals.get(id).await?;
        let expected = removal.status;
        removal.complete(user.id, self.clock.now())?;
        self.removals.replace(expected, removal.clone()).await?;
        info!(removal = %id, "removal completed");
        Ok(removal)
    }

    async fn get_removal(&self, id: RemovalId) -> Result<FurnitureRemoval, FulfillmentError> {
        self.removals.get(id).await
    }
}
