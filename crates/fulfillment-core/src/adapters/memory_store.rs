//! # In-Memory Store
//!
//! Reference implementation of every store port. In production the storage
//! collaborator supplies these; the semantics to preserve are the
//! conditional writes and the atomic batch claim, both of which this
//! implementation gets from taking one lock per operation.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::entities::{
    DeliveryBatch, DeliveryConfirmation, FurnitureRemoval, FurnitureRequest, MaterialRequest,
};
use crate::domain::errors::FulfillmentError;
use crate::domain::value_objects::{
    BatchId, BatchStatus, FurnitureRequestId, FurnitureStatus, RemovalId, RemovalStatus,
    RequestId, RequestStatus, UnitId,
};
use crate::ports::outbound::{
    BatchStore, ConfirmationStore, FurnitureStore, RemovalStore, RequestStore,
};

fn stale<S: std::fmt::Debug>(expected: S, actual: S) -> FulfillmentError {
    FulfillmentError::StaleState {
        expected: format!("{expected:?}"),
        actual: format!("{actual:?}"),
    }
}

/// In-memory backing for all fulfillment entities.
#[derive(Default)]
pub struct InMemoryStore {
    requests: RwLock<HashMap<RequestId, MaterialRequest>>,
    furniture: RwLock<HashMap<FurnitureRequestId, FurnitureRequest>>,
    removals: RwLock<HashMap<RemovalId, FurnitureRemoval>>,
    batches: RwLock<HashMap<BatchId, DeliveryBatch>>,
    confirmations: RwLock<Vec<DeliveryConfirmation>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RequestStore for InMemoryStore {
    async fn insert(&self, request: MaterialRequest) -> Result<(), FulfillmentError> {
        self.requests.write().insert(request.id, request);
        Ok(())
    }

    async fn get(&self, id: RequestId) -> Result<MaterialRequest, FulfillmentError> {
        self.requests
            .read()
            .get(&id)
            .cloned()
            .ok_or(FulfillmentError::NotFound {
                entity: "material request",
                id: id.to_string(),
            })
    }

    async fn replace(
        &self,
        expected: RequestStatus,
        request: MaterialRequest,
    ) -> Result<(), FulfillmentError> {
        let mut requests = self.requests.write();
        let current = requests.get(&request.id).ok_or(FulfillmentError::NotFound {
            entity: "material request",
            id: request.id.to_string(),
        })?;
        if current.status != expected {
            return Err(stale(expected, current.status));
        }
        requests.insert(request.id, request);
        Ok(())
    }

    async fn list_by_unit(&self, unit: UnitId) -> Result<Vec<MaterialRequest>, FulfillmentError> {
        Ok(self
            .requests
            .read()
            .values()
            .filter(|r| r.requesting_unit_id == unit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FurnitureStore for InMemoryStore {
    async fn insert(&self, request: FurnitureRequest) -> Result<(), FulfillmentError> {
        self.furniture.write().insert(request.id, request);
        Ok(())
    }

    async fn get(&self, id: FurnitureRequestId) -> Result<FurnitureRequest, FulfillmentError> {
        self.furniture
            .read()
            .get(&id)
            .cloned()
            .ok_or(FulfillmentError::NotFound {
                entity: "furniture request",
                id: id.to_string(),
            })
    }

    async fn replace(
        &self,
        expected: FurnitureStatus,
        request: FurnitureRequest,
    ) -> Result<(), FulfillmentError> {
        let mut furniture = self.furniture.write();
        let current = furniture.get(&request.id).ok_or(FulfillmentError::NotFound {
            entity: "furniture request",
            id: request.id.to_string(),
        })?;
        if current.status != expected {
            return Err(stale(expected, current.status));
        }
        furniture.insert(request.id, request);
        Ok(())
    }

    async fn list_by_status(
        &self,
        status: FurnitureStatus,
    ) -> Result<Vec<FurnitureRequest>, FulfillmentError> {
        Ok(self
            .furniture
            .read()
            .values()
            .filter(|r| r.status == status)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RemovalStore for InMemoryStore {
    async fn insert(&self, removal: FurnitureRemoval) -> Result<(), FulfillmentError> {
        self.removals.write().insert(removal.id, removal);
        Ok(())
    }

    async fn get(&self, id: RemovalId) -> Result<FurnitureRemoval, FulfillmentError> {
        self.removals
            .read()
            .get(&id)
            .cloned()
            .ok_or(FulfillmentError::NotFound {
                entity: "furniture removal",
                id: id.to_string(),
            })
    }

    async fn replace(
        &self,
        expected: RemovalStatus,
        removal: FurnitureRemoval,
    ) -> Result<(), FulfillmentError> {
        let mut removals = self.removals.write();
        let current = removals.get(&removal.id).ok_or(FulfillmentError::NotFound {
            entity: "furniture removal",
            id: removal.id.to_string(),
        })?;
        if current.status != expected {
            return Err(stale(expected, current.status));
        }
        removals.insert(removal.id, removal);
        Ok(())
    }
}

#[async_trait]
impl BatchStore for InMemoryStore {
    async fn create(&self, batch: DeliveryBatch) -> Result<(), FulfillmentError> {
        // One write lock spans the membership check and the insert, so two
        // overlapping creations cannot both claim a member.
        let mut batches = self.batches.write();
        for existing in batches.values().filter(|b| !b.status.is_terminal()) {
            for member in batch.members() {
                if existing.members().contains(&member) {
                    return Err(FulfillmentError::AlreadyBatched(member));
                }
            }
        }
        batches.insert(batch.id, batch);
        Ok(())
    }

    async fn get(&self, id: BatchId) -> Result<DeliveryBatch, FulfillmentError> {
        self.batches
            .read()
            .get(&id)
            .cloned()
            .ok_or(FulfillmentError::NotFound {
                entity: "delivery batch",
                id: id.to_string(),
            })
    }

    async fn replace(
        &self,
        expected: BatchStatus,
        batch: DeliveryBatch,
    ) -> Result<(), FulfillmentError> {
        let mut batches = self.batches.write();
        let current = batches.get(&batch.id).ok_or(FulfillmentError::NotFound {
            entity: "delivery batch",
            id: batch.id.to_string(),
        })?;
        if current.status != expected {
            return Err(stale(expected, current.status));
        }
        batches.insert(batch.id, batch);
        Ok(())
    }

    async fn open_batches(&self) -> Result<Vec<DeliveryBatch>, FulfillmentError> {
        Ok(self
            .batches
            .read()
            .values()
            .filter(|b| !b.status.is_terminal())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ConfirmationStore for InMemoryStore {
    async fn append(&self, entry: DeliveryConfirmation) -> Result<(), FulfillmentError> {
        let mut confirmations = self.confirmations.write();
        if confirmations
            .iter()
            .any(|e| e.subject == entry.subject && e.kind == entry.kind)
        {
            return Err(FulfillmentError::DuplicateConfirmation { kind: entry.kind });
        }
        confirmations.push(entry);
        Ok(())
    }

    async fn for_batch(&self, id: BatchId) -> Result<Vec<DeliveryConfirmation>, FulfillmentError> {
        use crate::domain::value_objects::ConfirmationSubject;
        Ok(self
            .confirmations
            .read()
            .iter()
            .filter(|e| e.subject == ConfirmationSubject::Batch(id))
            .cloned()
            .collect())
    }

    async fn for_furniture(
        &self,
        id: FurnitureRequestId,
    ) -> Result<Vec<DeliveryConfirmation>, FulfillmentError> {
        use crate::domain::value_objects::ConfirmationSubject;
        Ok(self
            .confirmations
            .read()
            .iter()
            .filter(|e| e.subject == ConfirmationSubject::Furniture(id))
            .cloned()
            .collect())
    }
}
