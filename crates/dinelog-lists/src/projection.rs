//! Type projections: per-kind, order-preserving views of a collection.

use dinelog_models::{ItemId, ItemKind, List, ListItem};

/// Returns the items of `kind`, in collection order.
pub fn project(items: &[ListItem], kind: ItemKind) -> Vec<ListItem> {
    items
        .iter()
        .filter(|item| item.kind() == kind)
        .cloned()
        .collect()
}

/// Splits a collection into its venue and review projections.
pub fn partition(items: &[ListItem]) -> (Vec<ListItem>, Vec<ListItem>) {
    items
        .iter()
        .cloned()
        .partition(|item| item.kind() == ItemKind::Venue)
}

/// The two tabs shown for a list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabView {
    pub places: Vec<ListItem>,
    pub reviews: Vec<ListItem>,
}

impl TabView {
    /// Builds the tabs for `list`; a hidden tab is empty.
    pub fn for_list(list: &List, items: &[ListItem]) -> Self {
        let (places, reviews) = partition(items);
        Self {
            places: if list.show_places { places } else { Vec::new() },
            reviews: if list.show_reviews { reviews } else { Vec::new() },
        }
    }

    /// Returns the tab for `kind`.
    pub fn tab(&self, kind: ItemKind) -> &[ListItem] {
        match kind {
            ItemKind::Venue => &self.places,
            ItemKind::Review => &self.reviews,
        }
    }
}

/// How the numbered badge on an ordered list is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BadgeNumbering {
    /// Badge is the item's global position plus one.
    #[default]
    Global,
    /// Badge counts within the tab, starting at one.
    PerTab,
}

impl BadgeNumbering {
    /// Parses `global` or `per_tab` (case-insensitive).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "global" => Some(BadgeNumbering::Global),
            "per_tab" | "per-tab" | "pertab" => Some(BadgeNumbering::PerTab),
            _ => None,
        }
    }
}

/// Badge numbers for the `kind` tab of a collection.
pub fn badges(items: &[ListItem], kind: ItemKind, numbering: BadgeNumbering) -> Vec<(ItemId, u32)> {
    items
        .iter()
        .filter(|item| item.kind() == kind)
        .enumerate()
        .map(|(i, item)| {
            let badge = match numbering {
                BadgeNumbering::Global => item.position.saturating_add(1),
                BadgeNumbering::PerTab => (i as u32).saturating_add(1),
            };
            (item.id.clone(), badge)
        })
        .collect()
}
