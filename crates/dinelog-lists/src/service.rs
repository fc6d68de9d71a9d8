//! ListService - the surface the UI layer calls.
//!
//! Reads go straight to the gateway. Reordering happens in an
//! `EditSession` reached through a `SessionHandle`; only
//! `save_reordering` talks to the backend, and while its commit is in
//! flight the session refuses drags and a second save, and
//! `cancel_reordering` waits for the commit to settle.

use std::sync::{Arc, Mutex};

use dinelog_models::{
    ItemId, ItemKind, ItemRef, ListId, ListItem, PositionUpdate, SessionId, UserId,
};
use dinelog_persistence::FileListStore;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::collection::sort_items;
use crate::config::ListsConfig;
use crate::error::{ListError, Result};
use crate::gateway::ListGateway;
use crate::projection::{badges, TabView};
use crate::session::{EditSession, SessionState};

struct SessionShared {
    id: SessionId,
    list_id: ListId,
    session: Mutex<EditSession>,
    /// True while a commit for this session is in flight.
    saving: watch::Sender<bool>,
}

/// Handle to one reorder session.
///
/// Cheap to clone; every clone addresses the same session. Sessions are
/// never shared between lists or looked up globally.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<SessionShared>,
}

impl SessionHandle {
    fn new(session: EditSession) -> Self {
        let (saving, _) = watch::channel(false);
        Self {
            inner: Arc::new(SessionShared {
                id: session.id().clone(),
                list_id: session.list_id().clone(),
                session: Mutex::new(session),
                saving,
            }),
        }
    }

    /// Returns the session ID.
    pub fn id(&self) -> &SessionId {
        &self.inner.id
    }

    /// Returns the ID of the list being reordered.
    pub fn list_id(&self) -> &ListId {
        &self.inner.list_id
    }

    /// Returns the session's current state.
    pub fn state(&self) -> Result<SessionState> {
        self.with_session(|s| Ok(s.state()))
    }

    /// Returns true while a save is in flight.
    pub fn is_saving(&self) -> Result<bool> {
        self.with_session(|s| Ok(s.is_saving()))
    }

    /// Returns the live sequence.
    pub fn items(&self) -> Result<Vec<ListItem>> {
        self.with_session(|s| Ok(s.items().to_vec()))
    }

    fn with_session<T>(&self, f: impl FnOnce(&mut EditSession) -> Result<T>) -> Result<T> {
        let mut session = self
            .inner
            .session
            .lock()
            .map_err(|e| ListError::LockPoisoned(e.to_string()))?;
        f(&mut *session)
    }

    /// Resolves once no commit is in flight.
    async fn settled(&self) {
        let mut rx = self.inner.saving.subscribe();
        // The sender lives as long as `self`, so this cannot report closed.
        let _ = rx.wait_for(|saving| !*saving).await;
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.inner.id)
            .field("list_id", &self.inner.list_id)
            .finish()
    }
}

/// Settles the session when a save finishes or its future is dropped.
///
/// The watch value only changes while the session lock is held, so it
/// always agrees with `EditSession::is_saving` for anyone holding the lock.
struct SaveGuard<'a> {
    handle: &'a SessionHandle,
    committed: bool,
}

impl<'a> SaveGuard<'a> {
    /// Marks the session as saving and returns the batch to commit.
    fn arm(handle: &'a SessionHandle) -> Result<(Self, Vec<PositionUpdate>)> {
        let updates = handle.with_session(|s| {
            let updates = s.begin_save()?;
            handle.inner.saving.send_replace(true);
            Ok(updates)
        })?;
        let guard = Self {
            handle,
            committed: false,
        };
        Ok((guard, updates))
    }
}

impl Drop for SaveGuard<'_> {
    fn drop(&mut self) {
        let mut session = self.handle.inner.session.lock();
        if let Ok(session) = session.as_mut() {
            session.finish_save(self.committed);
        }
        // Still under the lock
        self.handle.inner.saving.send_replace(false);
    }
}

/// Entry point for reading, reordering and editing list membership.
pub struct ListService {
    gateway: Arc<dyn ListGateway>,
    config: ListsConfig,
}

impl ListService {
    /// Creates a service over the given gateway.
    pub fn new(gateway: Arc<dyn ListGateway>, config: ListsConfig) -> Self {
        Self { gateway, config }
    }

    /// Creates a service backed by the file store under `config.state_dir`.
    pub fn open(config: ListsConfig) -> Self {
        let store = FileListStore::new(config.state_dir.clone());
        Self::new(Arc::new(store), config)
    }

    /// Returns the service configuration.
    pub fn config(&self) -> &ListsConfig {
        &self.config
    }

    /// Returns every item of a list in display order.
    ///
    /// `viewer` is recorded for tracing only; privacy filtering belongs
    /// to the caller.
    pub async fn get_list_items(
        &self,
        list_id: &ListId,
        viewer: Option<&UserId>,
    ) -> Result<Vec<ListItem>> {
        self.gateway.load_list(list_id).await?;
        let mut items = self.gateway.load_items(list_id).await?;
        sort_items(&mut items);

        debug!(
            list_id = %list_id,
            viewer = viewer.map(UserId::as_str).unwrap_or("anonymous"),
            items = items.len(),
            "loaded list items"
        );
        Ok(items)
    }

    /// Returns the places and reviews tabs of a list.
    pub async fn tab_view(&self, list_id: &ListId, viewer: Option<&UserId>) -> Result<TabView> {
        let list = self.gateway.load_list(list_id).await?;
        let mut items = self.gateway.load_items(list_id).await?;
        sort_items(&mut items);

        debug!(
            list_id = %list_id,
            viewer = viewer.map(UserId::as_str).unwrap_or("anonymous"),
            items = items.len(),
            "loaded list tabs"
        );
        Ok(TabView::for_list(&list, &items))
    }

    /// Badge numbers for the `kind` tab of `items`, per the configured numbering.
    pub fn badges(&self, items: &[ListItem], kind: ItemKind) -> Vec<(ItemId, u32)> {
        badges(items, kind, self.config.badge_numbering)
    }

    /// Opens a reorder session for the list's owner.
    pub async fn start_reordering(
        &self,
        list_id: &ListId,
        actor: &UserId,
    ) -> Result<SessionHandle> {
        let list = self.gateway.load_list(list_id).await?;
        let items = self.gateway.load_items(list_id).await?;

        let session = EditSession::start(list, actor, items, self.config.merge_policy)?;
        let handle = SessionHandle::new(session);

        info!(list_id = %list_id, session_id = %handle.id(), "started reordering");
        Ok(handle)
    }

    /// Moves one item within a tab and returns the live sequence.
    pub fn apply_drag(
        &self,
        handle: &SessionHandle,
        kind: ItemKind,
        from: usize,
        to: usize,
    ) -> Result<Vec<ListItem>> {
        let live = handle.with_session(|s| s.apply_drag(kind, from, to).map(<[ListItem]>::to_vec))?;

        debug!(
            session_id = %handle.id(),
            kind = %kind,
            from,
            to,
            "applied drag"
        );
        Ok(live)
    }

    /// Discards the edit and returns the restored sequence.
    ///
    /// If a save is in flight, waits for it to settle first. A save that
    /// committed in the meantime has closed the session, so this then
    /// fails with `InvalidState`.
    pub async fn cancel_reordering(&self, handle: &SessionHandle) -> Result<Vec<ListItem>> {
        loop {
            handle.settled().await;

            let restored = handle.with_session(|s| {
                if s.is_saving() {
                    Ok(None)
                } else {
                    s.cancel().map(Some)
                }
            })?;

            if let Some(items) = restored {
                info!(session_id = %handle.id(), "cancelled reordering");
                return Ok(items);
            }
            tokio::task::yield_now().await;
        }
    }

    /// Commits the live sequence as one batch.
    ///
    /// On failure the session stays in `Editing` with its live sequence so
    /// the owner can retry or cancel. Nothing is retried automatically.
    pub async fn save_reordering(&self, handle: &SessionHandle) -> Result<()> {
        let (mut guard, updates) = SaveGuard::arm(handle)?;

        match self.gateway.commit(handle.list_id(), &updates).await {
            Ok(()) => {
                guard.committed = true;
                drop(guard);
                info!(
                    list_id = %handle.list_id(),
                    session_id = %handle.id(),
                    rows = updates.len(),
                    "saved reordering"
                );
                Ok(())
            }
            Err(e) => {
                drop(guard);
                warn!(
                    list_id = %handle.list_id(),
                    session_id = %handle.id(),
                    error = %e,
                    "failed to save reordering"
                );
                Err(ListError::PersistenceFailure(e))
            }
        }
    }

    /// Appends an item to a list.
    pub async fn add_item(&self, list_id: &ListId, target: ItemRef) -> Result<ListItem> {
        let item = self.gateway.add_item(list_id, target).await?;
        debug!(list_id = %list_id, item_id = %item.id, position = item.position, "added item");
        Ok(item)
    }

    /// Removes an item; sibling positions are not renumbered.
    pub async fn remove_item(&self, item_id: &ItemId) -> Result<()> {
        self.gateway.remove_item(item_id).await?;
        debug!(item_id = %item_id, "removed item");
        Ok(())
    }
}
