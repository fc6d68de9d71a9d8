//! Persistence gateway: the backend the engine reads from and commits to.

use async_trait::async_trait;
use dinelog_models::{ItemId, ItemRef, List, ListId, ListItem, PositionUpdate};
use dinelog_persistence::{FileListStore, Result};

/// Backend operations consumed by the list engine.
///
/// `commit` must be atomic from the caller's point of view: either every
/// row of the batch is visible to the next `load_items` or none is.
#[async_trait]
pub trait ListGateway: Send + Sync {
    /// Loads the list aggregate.
    async fn load_list(&self, list_id: &ListId) -> Result<List>;

    /// Loads every item of a list, in any order.
    async fn load_items(&self, list_id: &ListId) -> Result<Vec<ListItem>>;

    /// Writes a batch of positions.
    async fn commit(&self, list_id: &ListId, updates: &[PositionUpdate]) -> Result<()>;

    /// Appends an item after the current last position.
    async fn add_item(&self, list_id: &ListId, target: ItemRef) -> Result<ListItem>;

    /// Removes an item without renumbering its siblings.
    async fn remove_item(&self, item_id: &ItemId) -> Result<()>;
}

#[async_trait]
impl ListGateway for FileListStore {
    async fn load_list(&self, list_id: &ListId) -> Result<List> {
        FileListStore::load_list(self, list_id)
    }

    async fn load_items(&self, list_id: &ListId) -> Result<Vec<ListItem>> {
        FileListStore::load_items(self, list_id)
    }

    async fn commit(&self, list_id: &ListId, updates: &[PositionUpdate]) -> Result<()> {
        self.commit_positions(list_id, updates)
    }

    async fn add_item(&self, list_id: &ListId, target: ItemRef) -> Result<ListItem> {
        FileListStore::add_item(self, list_id, target)
    }

    async fn remove_item(&self, item_id: &ItemId) -> Result<()> {
        FileListStore::remove_item(self, item_id).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dinelog_models::{ReviewId, VenueId};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_store_through_gateway() {
        let dir = tempdir().unwrap();
        let store = FileListStore::new(dir.path());
        let list = List::new("user-1", "Brunch");
        store.save_list(&list).unwrap();

        let gateway: &dyn ListGateway = &store;
        let venue = gateway.add_item(&list.id, VenueId::from("venue-1").into()).await.unwrap();
        let review = gateway.add_item(&list.id, ReviewId::from("review-1").into()).await.unwrap();

        gateway
            .commit(
                &list.id,
                &[
                    PositionUpdate { id: venue.id.clone(), position: 1 },
                    PositionUpdate { id: review.id.clone(), position: 0 },
                ],
            )
            .await
            .unwrap();

        gateway.remove_item(&venue.id).await.unwrap();
        let items = gateway.load_items(&list.id).await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, review.id);
        assert_eq!(items[0].position, 0);
        assert_eq!(gateway.load_list(&list.id).await.unwrap().name, "Brunch");
    }
}
