//! The ordered collection: every item of one list in display order.

use std::cmp::Ordering;

use dinelog_models::{ListItem, PositionUpdate};

/// Display order: position, then insertion time, then id.
///
/// Colliding positions (a failed partial save, concurrent appends) still
/// produce the same sequence on every load.
pub fn display_order(a: &ListItem, b: &ListItem) -> Ordering {
    a.position
        .cmp(&b.position)
        .then_with(|| a.added_at.cmp(&b.added_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sorts items into display order in place.
pub fn sort_items(items: &mut [ListItem]) {
    items.sort_by(display_order);
}

/// Returns true if positions are exactly `0..len` in sequence order.
pub fn is_dense(items: &[ListItem]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(i, item)| item.position as usize == i)
}

/// Reassigns every position to its index in the sequence.
pub fn densify(items: &mut [ListItem]) {
    for (i, item) in items.iter_mut().enumerate() {
        item.position = i as u32;
    }
}

/// Returns the commit batch for a sequence.
pub fn position_updates(items: &[ListItem]) -> Vec<PositionUpdate> {
    items.iter().map(ListItem::position_update).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use dinelog_models::{ItemId, ReviewId, VenueId};

    fn item(id: &str, position: u32) -> ListItem {
        let mut item = ListItem::new("list-1", VenueId::from(id), position);
        item.id = ItemId::from(id);
        item
    }

    #[test]
    fn test_sort_by_position() {
        let mut items = vec![item("c", 2), item("a", 0), item("b", 1)];
        sort_items(&mut items);

        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_ties_broken_by_added_at() {
        let now = Utc::now();
        let mut older = item("z", 1);
        older.added_at = now - Duration::seconds(10);
        let mut newer = item("a", 1);
        newer.added_at = now;

        let mut items = vec![newer, older];
        sort_items(&mut items);

        assert_eq!(items[0].id.as_str(), "z");
        assert_eq!(items[1].id.as_str(), "a");
    }

    #[test]
    fn test_full_tie_broken_by_id() {
        let now = Utc::now();
        let mut a = ListItem::new("list-1", ReviewId::from("r"), 0);
        a.id = ItemId::from("item-b");
        a.added_at = now;
        let mut b = a.clone();
        b.id = ItemId::from("item-a");

        let mut items = vec![a, b];
        sort_items(&mut items);

        assert_eq!(items[0].id.as_str(), "item-a");
    }

    #[test]
    fn test_densify() {
        let mut items = vec![item("a", 0), item("b", 2), item("c", 9)];
        assert!(!is_dense(&items));

        densify(&mut items);

        assert!(is_dense(&items));
        assert_eq!(items[2].position, 2);
    }

    #[test]
    fn test_position_updates() {
        let items = vec![item("a", 0), item("b", 1)];
        let updates = position_updates(&items);

        assert_eq!(updates.len(), 2);
        assert_eq!(updates[1].id.as_str(), "b");
        assert_eq!(updates[1].position, 1);
    }
}
