//! Merge-back: recombining a reordered tab with the untouched one.
//!
//! Both tabs are views over one global sequence. After a drag reorders
//! one of them, the reconciler rebuilds the global sequence so that
//! neither tab's internal order is disturbed beyond the user's edit, then
//! renumbers every item `0..n`.

use std::collections::HashSet;

use dinelog_models::{ItemId, ItemKind, ListItem};

use crate::collection::densify;
use crate::error::{ListError, Result};
use crate::projection::project;

/// Rule for placing the reordered tab relative to the other one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Each item keeps the slot kind it held before the drag: the k-th
    /// venue slot of the global sequence receives the k-th venue of the
    /// reordered tab, and review slots are left exactly as they were.
    #[default]
    Interleave,
    /// All venues first, then all reviews, whichever tab was dragged.
    Concatenate,
}

impl MergePolicy {
    /// Parses `interleave` or `concatenate` (case-insensitive).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "interleave" => Some(MergePolicy::Interleave),
            "concatenate" | "concat" => Some(MergePolicy::Concatenate),
            _ => None,
        }
    }
}

/// Rebuilds the global sequence after the `kind` tab was reordered.
///
/// `prior` is the global sequence in display order as it was immediately
/// before the drag; `changed` is the reordered projection of `kind`. The
/// result has dense positions.
///
/// # Errors
/// `ListError::Inconsistent` if `changed` is not a permutation of the
/// `kind` projection of `prior`.
pub fn merge_back(
    prior: &[ListItem],
    kind: ItemKind,
    changed: Vec<ListItem>,
    policy: MergePolicy,
) -> Result<Vec<ListItem>> {
    let untouched = project(prior, kind.other());
    check_permutation(prior, kind, &changed)?;

    let mut merged = match policy {
        MergePolicy::Interleave => interleave(prior, kind, changed, untouched),
        MergePolicy::Concatenate => match kind {
            ItemKind::Venue => concat(changed, untouched),
            ItemKind::Review => concat(untouched, changed),
        },
    };

    densify(&mut merged);
    Ok(merged)
}

fn interleave(
    prior: &[ListItem],
    kind: ItemKind,
    changed: Vec<ListItem>,
    untouched: Vec<ListItem>,
) -> Vec<ListItem> {
    let mut changed = changed.into_iter();
    let mut untouched = untouched.into_iter();

    // Slot counts per kind match by construction, so neither iterator
    // runs dry before `prior` does.
    prior
        .iter()
        .filter_map(|slot| {
            if slot.kind() == kind {
                changed.next()
            } else {
                untouched.next()
            }
        })
        .collect()
}

fn concat(mut first: Vec<ListItem>, second: Vec<ListItem>) -> Vec<ListItem> {
    first.extend(second);
    first
}

fn check_permutation(prior: &[ListItem], kind: ItemKind, changed: &[ListItem]) -> Result<()> {
    if let Some(stray) = changed.iter().find(|item| item.kind() != kind) {
        return Err(ListError::Inconsistent(format!(
            "item {} is a {} in the {} tab",
            stray.id,
            stray.kind(),
            kind
        )));
    }

    let expected: HashSet<&ItemId> = prior
        .iter()
        .filter(|item| item.kind() == kind)
        .map(|item| &item.id)
        .collect();
    let got: HashSet<&ItemId> = changed.iter().map(|item| &item.id).collect();

    if got.len() != changed.len() {
        return Err(ListError::Inconsistent(format!(
            "reordered {} tab repeats an item",
            kind
        )));
    }
    if got != expected {
        return Err(ListError::Inconsistent(format!(
            "reordered {} tab has {} items, list has {}",
            kind,
            got.len(),
            expected.len()
        )));
    }
    Ok(())
}
