//! List aggregate for Dinelog.
//!
//! A List is a user-owned named collection of venue and review items. The
//! reordering engine consumes it for the owner check and for the flags that
//! gate which tabs are shown and whether the list is ordered at all.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ListId, UserId};
use crate::item::ItemKind;

/// A user-curated list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    /// Unique identifier for the list.
    pub id: ListId,

    /// User who owns the list.
    pub owner_id: UserId,

    /// Display name of the list.
    pub name: String,

    /// Whether the places tab is shown.
    #[serde(default = "default_true")]
    pub show_places: bool,

    /// Whether the reviews tab is shown.
    #[serde(default = "default_true")]
    pub show_reviews: bool,

    /// Whether items carry numbered positions and can be reordered.
    #[serde(default)]
    pub is_ordered: bool,

    /// When the list was created.
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl List {
    /// Creates a new ordered list showing both tabs.
    pub fn new(owner_id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: ListId::new(),
            owner_id: owner_id.into(),
            name: name.into(),
            show_places: true,
            show_reviews: true,
            is_ordered: true,
            created_at: Utc::now(),
        }
    }

    /// Returns true if `user` owns this list.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.owner_id == *user
    }

    /// Returns true if the tab for `kind` is shown.
    pub fn shows(&self, kind: ItemKind) -> bool {
        match kind {
            ItemKind::Venue => self.show_places,
            ItemKind::Review => self.show_reviews,
        }
    }
}
