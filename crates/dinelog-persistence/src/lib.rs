//! Persistence layer for Dinelog lists.
//!
//! This crate provides crash-safe persistence for lists and their items
//! using atomic file operations (write to temp file, then rename). A list
//! and all of its rows live in one record, so a batch of position updates
//! is either fully visible to the next load or not at all.
//!
//! # Example
//!
//! ```no_run
//! use dinelog_persistence::FileListStore;
//! use dinelog_models::{List, VenueId};
//!
//! let store = FileListStore::new("/home/user/.dinelog");
//!
//! let list = List::new("user-1", "Noodle spots");
//! store.save_list(&list).unwrap();
//!
//! let item = store.add_item(&list.id, VenueId::from("venue-42").into()).unwrap();
//! assert_eq!(item.position, 0);
//! ```

pub mod atomic;
pub mod error;
pub mod list_store;

pub use error::{PersistenceError, Result};
pub use list_store::{FileListStore, ListRecord};
