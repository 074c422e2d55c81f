//! # Material Request Operations
//!
//! Warehouse-side lifecycle of a material request up to the point a batch
//! takes over. Dispatch and the confirmation edges fire only as batch
//! cascades (see the coordinator).

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::entities::{MaterialRequest, MaterialRequestParams};
use crate::domain::errors::FulfillmentError;
use crate::domain::invariants::{invariant_positive_quantity, invariant_rejection_reason};
use crate::domain::value_objects::{RequestId, Role, UnitId, UserId};
use crate::ports::inbound::{MaterialRequestApi, NewMaterialRequest};

use super::coordinator::FulfillmentCoordinator;

#[async_trait]
impl MaterialRequestApi for FulfillmentCoordinator {
    async fn create_request(
        &self,
        actor: UserId,
        request: NewMaterialRequest,
    ) -> Result<MaterialRequest, FulfillmentError> {
        let user = self.authorize(actor, &[Role::Requester, Role::Admin]).await?;
        invariant_positive_quantity(request.quantity)?;
        let item = self.directory.resolve_item(request.item_id).await?;
        if item.is_furniture {
            return Err(FulfillmentError::ItemKindMismatch(item.id));
        }

        let request = MaterialRequest::new(MaterialRequestParams {
            id: RequestId::new(),
            item_id: item.id,
            requesting_unit_id: user.unit_id,
            requested_by: user.id,
            quantity: request.quantity,
            urgency: request.urgency,
            observations: request.observations,
            created_at: self.clock.now(),
        });
        self.requests.insert(request.clone()).await?;
        info!(request = %request.id, unit = %request.requesting_unit_id, "material request created");
        Ok(request)
    }

    async fn approve_request(
        &self,
        id: RequestId,
        actor: UserId,
    ) -> Result<MaterialRequest, FulfillmentError> {
        let user = self.authorize(actor, &[Role::Controller, Role::Admin]).await?;
        let mut request = self.requests.get(id).await?;
        let expected = request.status;
        request.approve(user.id, self.clock.now())?;
        self.requests.replace(expected, request.clone()).await?;
        debug!(request = %id, actor = %actor, "material request approved");
        Ok(request)
    }

    async fn reject_request(
        &self,
        id: RequestId,
        actor: UserId,
        reason: String,
    ) -> Result<MaterialRequest, FulfillmentError> {
        self.authorize(actor, &[Role::Controller, Role::Warehouse, Role::Admin])
            .await?;
        invariant_rejection_reason(&reason)?;
        let mut request = self.requests.get(id).await?;
        let expected = request.status;
        request.reject(reason)?;
        self.requests.replace(expected, request.clone()).await?;
        debug!(request = %id, actor = %actor, "material request rejected");
        Ok(request)
    }

    async fn cancel_request(
        &self,
        id: RequestId,
        actor: UserId,
    ) -> Result<MaterialRequest, FulfillmentError> {
        self.authorize(actor, &[Role::Requester, Role::Admin]).await?;
        let mut request = self.requests.get(id).await?;
        let expected = request.status;
        request.cancel()?;
        self.requests.replace(expected, request.clone()).await?;
        debug!(request = %id, actor = %actor, "material request cancelled");
        Ok(request)
    }

    async fn start_processing(
        &self,
        id: RequestId,
        actor: UserId,
    ) -> Result<MaterialRequest, FulfillmentError> {
        self.authorize(actor, &[Role::Warehouse, Role::Admin]).await?;
        let mut request = self.requests.get(id).await?;
        let expected = request.status;
        request.start_processing()?;

        // The edge is validated; decrement stock before the conditional
        // write. The adjustment is keyed by the request id, so a retry
        // after a lost write replays as a no-op.
        self.stock
            .adjust(
                request.item_id,
                request.requesting_unit_id,
                -i64::from(request.quantity),
                request.id,
            )
            .await?;

        self.requests.replace(expected, request.clone()).await?;
        debug!(request = %id, quantity = request.quantity, "processing started, stock adjusted");
        Ok(request)
    }

    async fn mark_awaiting_pickup(
        &self,
        id: RequestId,
        actor: UserId,
    ) -> Result<MaterialRequest, FulfillmentError> {
        self.authorize(actor, &[Role::Warehouse, Role::Admin]).await?;
        let mut request = self.requests.get(id).await?;
        let expected = request.status;
        request.mark_awaiting_pickup()?;
        self.requests.replace(expected, request.clone()).await?;
        debug!(request = %id, "material request awaiting pickup");
        Ok(request)
    }

    async fn get_request(&self, id: RequestId) -> Result<MaterialRequest, FulfillmentError> {
        self.requests.get(id).await
    }

    async fn requests_for_unit(
        &self,
        unit: UnitId,
    ) -> Result<Vec<MaterialRequest>, FulfillmentError> {
        self.requests.list_by_unit(unit).await
    }
}
