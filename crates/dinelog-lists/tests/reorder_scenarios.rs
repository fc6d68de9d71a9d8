//! Integration tests for reordering lists end to end through the file store.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dinelog_lists::projection::{partition, project};
use dinelog_lists::{ListError, ListGateway, ListService, ListsConfig, SessionState};
use dinelog_models::{
    ItemId, ItemKind, ItemRef, List, ListId, ListItem, PositionUpdate, ReviewId, UserId, VenueId,
};
use dinelog_persistence::{FileListStore, PersistenceError, Result as StoreResult};
use tempfile::TempDir;
use tokio::sync::Semaphore;

/// File store wrapper that can fail commits or hold them until released.
struct TestGateway {
    inner: FileListStore,
    fail_commits: AtomicBool,
    hold_commits: AtomicBool,
    entered: Semaphore,
    release: Semaphore,
}

impl TestGateway {
    fn new(inner: FileListStore) -> Self {
        Self {
            inner,
            fail_commits: AtomicBool::new(false),
            hold_commits: AtomicBool::new(false),
            entered: Semaphore::new(0),
            release: Semaphore::new(0),
        }
    }

    /// Waits until a held commit has reached the backend.
    async fn wait_for_commit(&self) {
        self.entered.acquire().await.unwrap().forget();
    }
}

#[async_trait]
impl ListGateway for TestGateway {
    async fn load_list(&self, list_id: &ListId) -> StoreResult<List> {
        self.inner.load_list(list_id)
    }

    async fn load_items(&self, list_id: &ListId) -> StoreResult<Vec<ListItem>> {
        self.inner.load_items(list_id)
    }

    async fn commit(&self, list_id: &ListId, updates: &[PositionUpdate]) -> StoreResult<()> {
        if self.hold_commits.load(Ordering::SeqCst) {
            self.entered.add_permits(1);
            self.release.acquire().await.unwrap().forget();
        }
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(PersistenceError::InvalidData("injected commit failure".to_string()));
        }
        self.inner.commit_positions(list_id, updates)
    }

    async fn add_item(&self, list_id: &ListId, target: ItemRef) -> StoreResult<ListItem> {
        self.inner.add_item(list_id, target)
    }

    async fn remove_item(&self, item_id: &ItemId) -> StoreResult<()> {
        self.inner.remove_item(item_id).map(|_| ())
    }
}

struct Fixture {
    _dir: TempDir,
    gateway: Arc<TestGateway>,
    service: Arc<ListService>,
    list: List,
}

fn owner() -> UserId {
    UserId::from("user-owner")
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let store = FileListStore::new(dir.path());
    let list = List::new(owner(), "Neighbourhood favourites");
    store.save_list(&list).unwrap();

    let gateway = Arc::new(TestGateway::new(store));
    let config = ListsConfig::new().with_state_dir(dir.path());
    let service = Arc::new(ListService::new(gateway.clone(), config));

    Fixture {
        _dir: dir,
        gateway,
        service,
        list,
    }
}

impl Fixture {
    async fn venue(&self, name: &str) -> ListItem {
        self.service
            .add_item(&self.list.id, VenueId::from(name).into())
            .await
            .unwrap()
    }

    async fn review(&self, name: &str) -> ListItem {
        self.service
            .add_item(&self.list.id, ReviewId::from(name).into())
            .await
            .unwrap()
    }

    async fn load(&self) -> Vec<ListItem> {
        self.service.get_list_items(&self.list.id, None).await.unwrap()
    }
}

fn ids(items: &[ListItem]) -> Vec<ItemId> {
    items.iter().map(|i| i.id.clone()).collect()
}

fn layout(items: &[ListItem]) -> Vec<(ItemId, u32)> {
    items.iter().map(|i| (i.id.clone(), i.position)).collect()
}

fn strictly_increasing(items: &[ListItem]) -> bool {
    items.windows(2).all(|w| w[0].position < w[1].position)
}

#[tokio::test]
async fn test_swap_places_around_review() {
    let f = fixture();
    let v1 = f.venue("venue-1").await;
    let r1 = f.review("review-1").await;
    let v2 = f.venue("venue-2").await;

    let handle = f.service.start_reordering(&f.list.id, &owner()).await.unwrap();
    let live = f.service.apply_drag(&handle, ItemKind::Venue, 0, 1).unwrap();

    let expected = vec![(v2.id.clone(), 0), (r1.id.clone(), 1), (v1.id.clone(), 2)];
    assert_eq!(layout(&live), expected);

    f.service.save_reordering(&handle).await.unwrap();

    assert_eq!(layout(&f.load().await), expected);
}

#[tokio::test]
async fn test_remove_leaves_gap_until_next_save() {
    let f = fixture();
    let v1 = f.venue("venue-1").await;
    let r1 = f.review("review-1").await;
    let v2 = f.venue("venue-2").await;

    f.service.remove_item(&r1.id).await.unwrap();
    assert_eq!(
        layout(&f.load().await),
        vec![(v1.id.clone(), 0), (v2.id.clone(), 2)]
    );

    // A save without any drag still densifies
    let handle = f.service.start_reordering(&f.list.id, &owner()).await.unwrap();
    f.service.save_reordering(&handle).await.unwrap();

    assert_eq!(layout(&f.load().await), vec![(v1.id, 0), (v2.id, 1)]);
}

#[tokio::test]
async fn test_positions_stay_strictly_increasing() {
    let f = fixture();
    let mut added = Vec::new();
    for i in 0..4 {
        added.push(f.venue(&format!("venue-{}", i)).await);
        added.push(f.review(&format!("review-{}", i)).await);
    }
    assert!(strictly_increasing(&f.load().await));

    f.service.remove_item(&added[2].id).await.unwrap();
    f.service.remove_item(&added[5].id).await.unwrap();
    assert!(strictly_increasing(&f.load().await));

    let handle = f.service.start_reordering(&f.list.id, &owner()).await.unwrap();
    f.service.apply_drag(&handle, ItemKind::Review, 2, 0).unwrap();
    f.service.apply_drag(&handle, ItemKind::Venue, 0, 2).unwrap();
    f.service.save_reordering(&handle).await.unwrap();
    assert!(strictly_increasing(&f.load().await));

    f.venue("venue-late").await;
    let items = f.load().await;
    assert!(strictly_increasing(&items));
    assert_eq!(items.len(), 7);
}

#[tokio::test]
async fn test_projections_partition_loaded_collection() {
    let f = fixture();
    f.venue("venue-1").await;
    f.review("review-1").await;
    f.review("review-2").await;
    f.venue("venue-2").await;

    let items = f.load().await;
    let (places, reviews) = partition(&items);

    let place_ids: HashSet<_> = ids(&places).into_iter().collect();
    let review_ids: HashSet<_> = ids(&reviews).into_iter().collect();
    let all: HashSet<_> = ids(&items).into_iter().collect();

    assert!(place_ids.is_disjoint(&review_ids));
    assert_eq!(&place_ids | &review_ids, all);
    assert!(places.iter().all(|i| i.kind() == ItemKind::Venue));
}

#[tokio::test]
async fn test_cancel_restores_loaded_sequence() {
    let f = fixture();
    f.venue("venue-1").await;
    let r1 = f.review("review-1").await;
    f.venue("venue-2").await;
    f.venue("venue-3").await;
    f.service.remove_item(&r1.id).await.unwrap();

    let before = f.load().await;
    let handle = f.service.start_reordering(&f.list.id, &owner()).await.unwrap();
    f.service.apply_drag(&handle, ItemKind::Venue, 0, 2).unwrap();
    f.service.apply_drag(&handle, ItemKind::Venue, 1, 0).unwrap();

    let restored = f.service.cancel_reordering(&handle).await.unwrap();

    assert_eq!(restored, before);
    assert_eq!(f.load().await, before);
    assert_eq!(handle.state().unwrap(), SessionState::Idle);
}

#[tokio::test]
async fn test_save_commits_dragged_places_order() {
    let f = fixture();
    let v1 = f.venue("venue-1").await;
    let r1 = f.review("review-1").await;
    let v2 = f.venue("venue-2").await;
    let r2 = f.review("review-2").await;
    let v3 = f.venue("venue-3").await;

    let handle = f.service.start_reordering(&f.list.id, &owner()).await.unwrap();
    f.service.apply_drag(&handle, ItemKind::Venue, 0, 2).unwrap();
    f.service.save_reordering(&handle).await.unwrap();

    let items = f.load().await;
    assert_eq!(
        ids(&project(&items, ItemKind::Venue)),
        vec![v2.id.clone(), v3.id.clone(), v1.id.clone()]
    );
    assert_eq!(ids(&project(&items, ItemKind::Review)), vec![r1.id.clone(), r2.id.clone()]);

    // Reviews keep their global slots
    assert_eq!(
        layout(&items),
        vec![(v2.id, 0), (r1.id, 1), (v3.id, 2), (r2.id, 3), (v1.id, 4)]
    );
}

#[tokio::test]
async fn test_failed_save_keeps_session_editing() {
    let f = fixture();
    let v1 = f.venue("venue-1").await;
    let v2 = f.venue("venue-2").await;
    let before = f.load().await;

    let handle = f.service.start_reordering(&f.list.id, &owner()).await.unwrap();
    let live = f.service.apply_drag(&handle, ItemKind::Venue, 0, 1).unwrap();

    f.gateway.fail_commits.store(true, Ordering::SeqCst);
    let result = f.service.save_reordering(&handle).await;

    assert!(matches!(result, Err(ListError::PersistenceFailure(_))));
    assert_eq!(handle.state().unwrap(), SessionState::Editing);
    assert!(!handle.is_saving().unwrap());
    assert_eq!(handle.items().unwrap(), live);
    assert_eq!(ids(&live), vec![v2.id.clone(), v1.id.clone()]);
    assert_eq!(f.load().await, before);

    // Further drags are still accepted
    let live = f.service.apply_drag(&handle, ItemKind::Venue, 1, 0).unwrap();
    assert_eq!(ids(&live), vec![v1.id, v2.id]);
}

#[tokio::test]
async fn test_retry_after_failure_persists_same_positions() {
    let f = fixture();
    f.venue("venue-1").await;
    f.review("review-1").await;
    f.venue("venue-2").await;

    let handle = f.service.start_reordering(&f.list.id, &owner()).await.unwrap();
    let live = f.service.apply_drag(&handle, ItemKind::Venue, 1, 0).unwrap();

    f.gateway.fail_commits.store(true, Ordering::SeqCst);
    assert!(f.service.save_reordering(&handle).await.is_err());

    f.gateway.fail_commits.store(false, Ordering::SeqCst);
    f.service.save_reordering(&handle).await.unwrap();

    assert_eq!(layout(&f.load().await), layout(&live));
}

#[tokio::test]
async fn test_resave_without_drag_is_stable() {
    let f = fixture();
    f.venue("venue-1").await;
    f.review("review-1").await;
    f.venue("venue-2").await;

    let first = f.service.start_reordering(&f.list.id, &owner()).await.unwrap();
    f.service.apply_drag(&first, ItemKind::Venue, 0, 1).unwrap();
    f.service.save_reordering(&first).await.unwrap();
    let after_first = f.load().await;

    let second = f.service.start_reordering(&f.list.id, &owner()).await.unwrap();
    f.service.save_reordering(&second).await.unwrap();

    assert_eq!(f.load().await, after_first);
}

#[tokio::test]
async fn test_in_flight_save_blocks_drag_and_delays_cancel() {
    let f = fixture();
    f.venue("venue-1").await;
    f.venue("venue-2").await;

    let handle = f.service.start_reordering(&f.list.id, &owner()).await.unwrap();
    f.service.apply_drag(&handle, ItemKind::Venue, 0, 1).unwrap();

    f.gateway.hold_commits.store(true, Ordering::SeqCst);
    let save = {
        let service = f.service.clone();
        let handle = handle.clone();
        tokio::spawn(async move { service.save_reordering(&handle).await })
    };
    f.gateway.wait_for_commit().await;

    assert!(handle.is_saving().unwrap());
    assert!(matches!(
        f.service.apply_drag(&handle, ItemKind::Venue, 0, 1),
        Err(ListError::InvalidState(_))
    ));
    assert!(matches!(
        f.service.save_reordering(&handle).await,
        Err(ListError::InvalidState(_))
    ));

    let cancel = {
        let service = f.service.clone();
        let handle = handle.clone();
        tokio::spawn(async move { service.cancel_reordering(&handle).await })
    };
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(!cancel.is_finished());

    f.gateway.release.add_permits(1);
    save.await.unwrap().unwrap();

    // The commit landed first, so there is nothing left to cancel
    let cancelled = cancel.await.unwrap();
    assert!(matches!(cancelled, Err(ListError::InvalidState(_))));
    assert_eq!(handle.state().unwrap(), SessionState::Idle);
}

#[tokio::test]
async fn test_cancel_after_failed_in_flight_save_restores_snapshot() {
    let f = fixture();
    f.venue("venue-1").await;
    f.venue("venue-2").await;
    let before = f.load().await;

    let handle = f.service.start_reordering(&f.list.id, &owner()).await.unwrap();
    f.service.apply_drag(&handle, ItemKind::Venue, 0, 1).unwrap();

    f.gateway.hold_commits.store(true, Ordering::SeqCst);
    f.gateway.fail_commits.store(true, Ordering::SeqCst);
    let save = {
        let service = f.service.clone();
        let handle = handle.clone();
        tokio::spawn(async move { service.save_reordering(&handle).await })
    };
    f.gateway.wait_for_commit().await;

    let cancel = {
        let service = f.service.clone();
        let handle = handle.clone();
        tokio::spawn(async move { service.cancel_reordering(&handle).await })
    };

    f.gateway.release.add_permits(1);
    assert!(save.await.unwrap().is_err());

    let restored = cancel.await.unwrap().unwrap();
    assert_eq!(restored, before);
    assert_eq!(f.load().await, before);
}

#[tokio::test]
async fn test_dropped_save_clears_saving_flag() {
    let f = fixture();
    f.venue("venue-1").await;
    f.venue("venue-2").await;

    let handle = f.service.start_reordering(&f.list.id, &owner()).await.unwrap();
    f.gateway.hold_commits.store(true, Ordering::SeqCst);

    let result =
        tokio::time::timeout(Duration::from_millis(50), f.service.save_reordering(&handle)).await;

    assert!(result.is_err());
    assert_eq!(handle.state().unwrap(), SessionState::Editing);
    assert!(!handle.is_saving().unwrap());
    assert!(f.service.apply_drag(&handle, ItemKind::Venue, 0, 1).is_ok());
}

#[tokio::test]
async fn test_sessions_on_different_lists_are_independent() {
    let f = fixture();
    f.venue("venue-1").await;
    f.venue("venue-2").await;

    let other = List::new(owner(), "Second list");
    f.gateway.inner.save_list(&other).unwrap();
    f.service.add_item(&other.id, VenueId::from("venue-x").into()).await.unwrap();
    f.service.add_item(&other.id, VenueId::from("venue-y").into()).await.unwrap();

    let first = f.service.start_reordering(&f.list.id, &owner()).await.unwrap();
    let second = f.service.start_reordering(&other.id, &owner()).await.unwrap();
    assert_ne!(first.id(), second.id());

    f.service.apply_drag(&first, ItemKind::Venue, 0, 1).unwrap();
    f.service.cancel_reordering(&second).await.unwrap();

    assert_eq!(first.state().unwrap(), SessionState::Editing);
    assert_eq!(second.state().unwrap(), SessionState::Idle);
}

#[tokio::test]
async fn test_concatenate_policy_groups_places_first() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileListStore::new(dir.path());
    let list = List::new(owner(), "Concatenated");
    store.save_list(&list).unwrap();

    let config = ListsConfig::new()
        .with_state_dir(dir.path())
        .with_merge_policy(dinelog_lists::MergePolicy::Concatenate);
    let service = ListService::new(Arc::new(store), config);

    let r1 = service.add_item(&list.id, ReviewId::from("review-1").into()).await.unwrap();
    let v1 = service.add_item(&list.id, VenueId::from("venue-1").into()).await.unwrap();
    let v2 = service.add_item(&list.id, VenueId::from("venue-2").into()).await.unwrap();

    let handle = service.start_reordering(&list.id, &owner()).await.unwrap();
    service.apply_drag(&handle, ItemKind::Venue, 1, 0).unwrap();
    service.save_reordering(&handle).await.unwrap();

    let items = service.get_list_items(&list.id, None).await.unwrap();
    assert_eq!(layout(&items), vec![(v2.id, 0), (v1.id, 1), (r1.id, 2)]);
}
