//! EditSession - the state machine behind a manual reorder.
//!
//! ```text
//!            start (owner, ordered list)
//!   (none) ────────────────────────────▶ Editing ──┐ apply_drag
//!                                        │  ▲  ◀───┘
//!                             begin_save │  │ finish_save(failed)
//!                                        ▼  │
//!                                   Editing+saving
//!                                        │
//!                  finish_save(ok)       │        cancel
//!   Idle ◀───────────────────────────────┘  Editing ────▶ Idle
//! ```
//!
//! The session holds two sequences: the live one that drags mutate and
//! saves commit, and the snapshot taken at start that cancel restores.
//! Nothing here touches the network; the service drives the commit.

use dinelog_models::{ItemKind, List, ListId, ListItem, PositionUpdate, SessionId, UserId};

use crate::collection::{densify, position_updates, sort_items};
use crate::error::{ListError, Result};
use crate::projection::project;
use crate::reconcile::{merge_back, MergePolicy};

/// Externally visible state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Closed by cancel or a successful save.
    Idle,
    /// Accepting drags, cancel and save.
    Editing,
}

#[derive(Debug, Clone)]
enum Phase {
    Idle,
    Editing {
        snapshot: Vec<ListItem>,
        /// Set while a commit is in flight; drags and a second save are refused.
        saving: bool,
    },
}

/// An in-progress manual reorder of one list.
#[derive(Debug, Clone)]
pub struct EditSession {
    id: SessionId,
    list: List,
    live: Vec<ListItem>,
    phase: Phase,
    policy: MergePolicy,
}

impl EditSession {
    /// Opens a session over `items` on behalf of `actor`.
    ///
    /// The snapshot keeps the items exactly as loaded; the live sequence
    /// starts densified so that saving without any drag still closes gaps
    /// left by removals.
    ///
    /// # Errors
    /// - `Unauthorized` if `actor` does not own the list
    /// - `InvalidState` if the list is not ordered
    pub fn start(
        list: List,
        actor: &UserId,
        mut items: Vec<ListItem>,
        policy: MergePolicy,
    ) -> Result<Self> {
        if !list.is_owned_by(actor) {
            return Err(ListError::Unauthorized {
                list_id: list.id.clone(),
                user_id: actor.clone(),
            });
        }
        if !list.is_ordered {
            return Err(ListError::InvalidState(format!(
                "list {} is not ordered",
                list.id
            )));
        }

        sort_items(&mut items);
        let snapshot = items.clone();
        densify(&mut items);

        Ok(Self {
            id: SessionId::new(),
            list,
            live: items,
            phase: Phase::Editing {
                snapshot,
                saving: false,
            },
            policy,
        })
    }

    /// Returns the session ID.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the ID of the list being reordered.
    pub fn list_id(&self) -> &ListId {
        &self.list.id
    }

    /// Returns the current state.
    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::Idle => SessionState::Idle,
            Phase::Editing { .. } => SessionState::Editing,
        }
    }

    /// Returns true while a commit is in flight.
    pub fn is_saving(&self) -> bool {
        matches!(self.phase, Phase::Editing { saving: true, .. })
    }

    /// Returns the live sequence.
    pub fn items(&self) -> &[ListItem] {
        &self.live
    }

    /// Returns the pre-edit snapshot while editing.
    pub fn snapshot(&self) -> Option<&[ListItem]> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Editing { snapshot, .. } => Some(snapshot),
        }
    }

    fn ensure_editable(&self, op: &str) -> Result<()> {
        match self.phase {
            Phase::Idle => Err(ListError::InvalidState(format!(
                "cannot {} session {}: not editing",
                op, self.id
            ))),
            Phase::Editing { saving: true, .. } => Err(ListError::InvalidState(format!(
                "cannot {} session {}: save in flight",
                op, self.id
            ))),
            Phase::Editing { saving: false, .. } => Ok(()),
        }
    }

    /// Moves the `from`-th item of the `kind` tab to index `to`, then
    /// merges the tab back into the live sequence.
    pub fn apply_drag(&mut self, kind: ItemKind, from: usize, to: usize) -> Result<&[ListItem]> {
        self.ensure_editable("drag")?;

        if !self.list.shows(kind) {
            return Err(ListError::InvalidState(format!(
                "{} tab is hidden on list {}",
                kind, self.list.id
            )));
        }

        let mut tab = project(&self.live, kind);
        let len = tab.len();
        if len < 2 {
            return Err(ListError::InvalidState(format!(
                "{} tab has {} item(s); nothing to reorder",
                kind, len
            )));
        }
        if from >= len {
            return Err(ListError::InvalidIndex { index: from, len });
        }
        if to >= len {
            return Err(ListError::InvalidIndex { index: to, len });
        }

        let moved = tab.remove(from);
        tab.insert(to, moved);

        self.live = merge_back(&self.live, kind, tab, self.policy)?;
        Ok(&self.live)
    }

    /// Restores the snapshot and closes the session.
    pub fn cancel(&mut self) -> Result<Vec<ListItem>> {
        self.ensure_editable("cancel")?;

        if let Phase::Editing { snapshot, .. } = std::mem::replace(&mut self.phase, Phase::Idle) {
            self.live = snapshot;
        }
        Ok(self.live.clone())
    }

    /// Marks a commit as in flight and returns the batch to send.
    pub fn begin_save(&mut self) -> Result<Vec<PositionUpdate>> {
        self.ensure_editable("save")?;

        if let Phase::Editing { saving, .. } = &mut self.phase {
            *saving = true;
        }
        Ok(position_updates(&self.live))
    }

    /// Settles an in-flight commit.
    ///
    /// On success the session closes. On failure it stays in `Editing`
    /// with the live sequence intact so the owner can retry or cancel.
    pub fn finish_save(&mut self, committed: bool) {
        let close = match &mut self.phase {
            Phase::Editing { saving, .. } if *saving => {
                *saving = false;
                committed
            }
            _ => false,
        };
        if close {
            self.phase = Phase::Idle;
        }
    }
}
