//! # In-Memory Stock Adjuster
//!
//! Reference implementation of the stock-adjustment capability. Tracks
//! applied operation ids so a replayed adjustment is a no-op, which is the
//! contract the real inventory backend must honor too.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::domain::errors::StockError;
use crate::domain::value_objects::{ItemId, RequestId, UnitId};
use crate::ports::outbound::StockAdjuster;

#[derive(Default)]
struct Inner {
    levels: HashMap<(ItemId, UnitId), i64>,
    applied: HashSet<RequestId>,
}

/// In-memory stock ledger with idempotent adjustments.
#[derive(Default)]
pub struct InMemoryStockAdjuster {
    inner: RwLock<Inner>,
}

impl InMemoryStockAdjuster {
    /// Create an empty adjuster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the stock level for an item at a unit.
    pub fn set_level(&self, item: ItemId, unit: UnitId, quantity: i64) {
        self.inner.write().levels.insert((item, unit), quantity);
    }

    /// Current level for an item at a unit.
    pub fn level(&self, item: ItemId, unit: UnitId) -> i64 {
        self.inner
            .read()
            .levels
            .get(&(item, unit))
            .copied()
            .unwrap_or(0)
    }

    /// How many distinct operations have been applied.
    pub fn applied_count(&self) -> usize {
        self.inner.read().applied.len()
    }
}

#[async_trait]
impl StockAdjuster for InMemoryStockAdjuster {
    async fn adjust(
        &self,
        item: ItemId,
        unit: UnitId,
        delta: i64,
        op: RequestId,
    ) -> Result<(), StockError> {
        let mut inner = self.inner.write();
        if inner.applied.contains(&op) {
            debug!(op = %op, "stock adjustment replayed, skipping");
            return Ok(());
        }

        let level = inner.levels.get(&(item, unit)).copied().unwrap_or(0);
        let next = level + delta;
        if next < 0 {
            return Err(StockError::Insufficient {
                item,
                requested: delta.unsigned_abs() as u32,
                available: level.max(0) as u32,
            });
        }

        inner.levels.insert((item, unit), next);
        inner.applied.insert(op);
        debug!(item = %item, unit = %unit, delta, "stock adjusted");
        Ok(())
    }
}
