//! Shared test fixture: a coordinator wired to the in-memory adapters with
//! one unit's worth of seeded users and items.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use fulfillment_core::{
    CoordinatorPorts, FulfillmentCoordinator, InMemoryStockAdjuster, InMemoryStore, ItemId,
    ManualClock, MaterialRequestApi, NewMaterialRequest, RequestId, Role, SequenceTokenSource,
    StaticDirectory, UnitId, Urgency, UserId,
};

/// A wired coordinator plus the handles tests poke at.
pub struct World {
    pub coordinator: Arc<FulfillmentCoordinator>,
    pub store: Arc<InMemoryStore>,
    pub stock: Arc<InMemoryStockAdjuster>,
    pub directory: Arc<StaticDirectory>,
    pub clock: Arc<ManualClock>,
    pub unit: UnitId,
    pub requester: UserId,
    pub controller: UserId,
    pub warehouse: UserId,
    pub driver: UserId,
    pub designer: UserId,
    pub material_item: ItemId,
    pub furniture_item: ItemId,
}

/// Fixed start instant so daily codes are reproducible.
pub fn start_instant() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-03-14T08:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Build a world with one destination unit and a seeded stock of 100.
pub fn world() -> World {
    let store = Arc::new(InMemoryStore::new());
    let directory = Arc::new(StaticDirectory::new());
    let stock = Arc::new(InMemoryStockAdjuster::new());
    let clock = Arc::new(ManualClock::starting_at(start_instant()));

    let unit = UnitId::new();
    let requester = directory.add_user("rita", Role::Requester, unit);
    let controller = directory.add_user("carla", Role::Controller, unit);
    let warehouse = directory.add_user("wagner", Role::Warehouse, UnitId::new());
    let driver = directory.add_user("dario", Role::Driver, UnitId::new());
    let designer = directory.add_user("dina", Role::Designer, UnitId::new());

    let material_item = directory.add_item("printer paper", false);
    let furniture_item = directory.add_item("standing desk", true);
    stock.set_level(material_item, unit, 100);

    let coordinator = Arc::new(FulfillmentCoordinator::new(CoordinatorPorts {
        requests: store.clone(),
        furniture: store.clone(),
        removals: store.clone(),
        batches: store.clone(),
        confirmations: store.clone(),
        stock: stock.clone(),
        directory: directory.clone(),
        clock: clock.clone(),
        tokens: Arc::new(SequenceTokenSource::new()),
    }));

    World {
        coordinator,
        store,
        stock,
        directory,
        clock,
        unit,
        requester,
        controller,
        warehouse,
        driver,
        designer,
        material_item,
        furniture_item,
    }
}

impl World {
    /// Walk a material request up to `AwaitingPickup`.
    pub async fn material_awaiting_pickup(&self, quantity: u32) -> RequestId {
        let request = self
            .coordinator
            .create_request(
                self.requester,
                NewMaterialRequest {
                    item_id: self.material_item,
                    quantity,
                    urgency: Urgency::Medium,
                    observations: None,
                },
            )
            .await
            .unwrap();
        self.coordinator
            .approve_request(request.id, self.controller)
            .await
            .unwrap();
        self.coordinator
            .start_processing(request.id, self.warehouse)
            .await
            .unwrap();
        self.coordinator
            .mark_awaiting_pickup(request.id, self.warehouse)
            .await
            .unwrap();
        request.id
    }
}
