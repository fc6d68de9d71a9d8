//! Core data models for Dinelog.
//!
//! This crate provides the fundamental data types shared by the list
//! engine and its persistence layer: typed ids, list items with their
//! venue/review reference, and the List aggregate.

pub mod builders;
pub mod ids;
pub mod item;
pub mod list;

// Re-export main types
pub use builders::ListBuilder;
pub use ids::{ItemId, ListId, ReviewId, SessionId, UserId, VenueId};
pub use item::{ItemKind, ItemRef, ListItem, PositionUpdate};
pub use list::List;
