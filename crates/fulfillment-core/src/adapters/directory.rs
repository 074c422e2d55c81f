//! # Static Directory
//!
//! Reference implementation of the user/item directory. In production this
//! fronts the identity and catalog services.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::errors::DirectoryError;
use crate::domain::value_objects::{ItemId, Role, UnitId, UserId};
use crate::ports::outbound::{Directory, ItemRecord, UserRecord};

/// Directory backed by in-memory tables.
#[derive(Default)]
pub struct StaticDirectory {
    users: RwLock<HashMap<UserId, UserRecord>>,
    items: RwLock<HashMap<ItemId, ItemRecord>>,
}

impl StaticDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user, returning its id.
    pub fn add_user(&self, name: &str, role: Role, unit_id: UnitId) -> UserId {
        let id = UserId::new();
        self.users.write().insert(
            id,
            UserRecord {
                id,
                name: name.to_string(),
                role,
                unit_id,
            },
        );
        id
    }

    /// Register an item, returning its id.
    pub fn add_item(&self, name: &str, is_furniture: bool) -> ItemId {
        let id = ItemId::new();
        self.items.write().insert(
            id,
            ItemRecord {
                id,
                name: name.to_string(),
                is_furniture,
            },
        );
        id
    }
}

#[async_trait]
impl Directory for StaticDirectory {
    async fn resolve_user(&self, id: UserId) -> Result<UserRecord, DirectoryError> {
        self.users
            .read()
            .get(&id)
            .cloned()
            .ok_or(DirectoryError::UnknownUser(id))
    }

    async fn resolve_item(&self, id: ItemId) -> Result<ItemRecord, DirectoryError> {
        self.items
            .read()
            .get(&id)
            .cloned()
            .ok_or(DirectoryError::UnknownItem(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_known_user() {
        let directory = StaticDirectory::new();
        let unit = UnitId::new();
        let id = directory.add_user("ana", Role::Controller, unit);

        let record = directory.resolve_user(id).await.unwrap();
        assert_eq!(record.role, Role::Controller);
        assert_eq!(record.unit_id, unit);
    }

    #[tokio::test]
    async fn test_unknown_lookups_fail() {
        let directory = StaticDirectory::new();
        assert!(matches!(
            directory.resolve_user(UserId::new()).await,
            Err(DirectoryError::UnknownUser(_))
        ));
        assert!(matches!(
            directory.resolve_item(ItemId::new()).await,
            Err(DirectoryError::UnknownItem(_))
        ));
    }
}
