//! List item types for Dinelog.
//!
//! An item is one membership record linking a List to exactly one Venue or
//! one Review, carrying its position in the List's global order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{ItemId, ListId, ReviewId, VenueId};

/// Kind of thing an item references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A visited place.
    Venue,
    /// A written review.
    Review,
}

impl ItemKind {
    /// Both kinds, in canonical order.
    pub const ALL: [ItemKind; 2] = [ItemKind::Venue, ItemKind::Review];

    /// Returns the complementary kind.
    pub fn other(self) -> ItemKind {
        match self {
            ItemKind::Venue => ItemKind::Review,
            ItemKind::Review => ItemKind::Venue,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Venue => write!(f, "venue"),
            ItemKind::Review => write!(f, "review"),
        }
    }
}

/// Reference held by an item. Exactly one target, never reclassified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reference_id", rename_all = "snake_case")]
pub enum ItemRef {
    Venue(VenueId),
    Review(ReviewId),
}

impl ItemRef {
    /// Returns the kind of the referenced entity.
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemRef::Venue(_) => ItemKind::Venue,
            ItemRef::Review(_) => ItemKind::Review,
        }
    }

    /// Returns the referenced entity's id as a string.
    pub fn reference_id(&self) -> &str {
        match self {
            ItemRef::Venue(id) => id.as_str(),
            ItemRef::Review(id) => id.as_str(),
        }
    }
}

impl From<VenueId> for ItemRef {
    fn from(id: VenueId) -> Self {
        ItemRef::Venue(id)
    }
}

impl From<ReviewId> for ItemRef {
    fn from(id: ReviewId) -> Self {
        ItemRef::Review(id)
    }
}

/// A single membership record in a List.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// Unique identifier for the item.
    pub id: ItemId,

    /// ID of the list this item belongs to.
    pub list_id: ListId,

    /// The venue or review this item points at.
    pub target: ItemRef,

    /// Position in the list's global order.
    pub position: u32,

    /// When the item was added to the list.
    pub added_at: DateTime<Utc>,
}

impl ListItem {
    /// Creates a new item at the given position.
    pub fn new(list_id: impl Into<ListId>, target: impl Into<ItemRef>, position: u32) -> Self {
        Self {
            id: ItemId::new(),
            list_id: list_id.into(),
            target: target.into(),
            position,
            added_at: Utc::now(),
        }
    }

    /// Returns the kind of this item.
    pub fn kind(&self) -> ItemKind {
        self.target.kind()
    }

    /// Returns the referenced venue or review id.
    pub fn reference_id(&self) -> &str {
        self.target.reference_id()
    }

    /// Returns the `(id, position)` pair sent in a commit batch.
    pub fn position_update(&self) -> PositionUpdate {
        PositionUpdate {
            id: self.id.clone(),
            position: self.position,
        }
    }
}

/// One row of a position commit batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub id: ItemId,
    pub position: u32,
}
