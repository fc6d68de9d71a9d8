//! Builder patterns for complex types.

use chrono::{DateTime, Utc};

use crate::ids::{ListId, UserId};
use crate::list::List;

/// Builder for creating List instances with a fluent API.
#[derive(Debug, Clone)]
pub struct ListBuilder {
    id: Option<ListId>,
    owner_id: UserId,
    name: String,
    show_places: bool,
    show_reviews: bool,
    is_ordered: bool,
    created_at: Option<DateTime<Utc>>,
}

impl ListBuilder {
    /// Creates a new ListBuilder with required fields.
    pub fn new(owner_id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: None,
            owner_id: owner_id.into(),
            name: name.into(),
            show_places: true,
            show_reviews: true,
            is_ordered: true,
            created_at: None,
        }
    }

    /// Sets an explicit list id.
    pub fn id(mut self, id: impl Into<ListId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets whether the places tab is shown.
    pub fn show_places(mut self, show: bool) -> Self {
        self.show_places = show;
        self
    }

    /// Sets whether the reviews tab is shown.
    pub fn show_reviews(mut self, show: bool) -> Self {
        self.show_reviews = show;
        self
    }

    /// Sets whether the list is ordered.
    pub fn ordered(mut self, ordered: bool) -> Self {
        self.is_ordered = ordered;
        self
    }

    /// Sets the creation timestamp.
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Builds the List.
    pub fn build(self) -> List {
        let mut list = List::new(self.owner_id, self.name);
        if let Some(id) = self.id {
            list.id = id;
        }
        if let Some(at) = self.created_at {
            list.created_at = at;
        }
        list.show_places = self.show_places;
        list.show_reviews = self.show_reviews;
        list.is_ordered = self.is_ordered;
        list
    }
}
