//! List membership and reordering engine for Dinelog.
//!
//! A List holds venue items and review items in one position-ordered
//! sequence that the UI shows as two tabs. This crate provides:
//! - The ordered collection and its per-kind projections (`collection`, `projection`)
//! - The merge-back rule that folds a reordered tab into the global order (`reconcile`)
//! - The `EditSession` state machine with cancel/save semantics (`session`)
//! - The `ListGateway` backend trait and the `ListService` facade
//!
//! # Example
//!
//! ```no_run
//! use dinelog_lists::{ListService, ListsConfig};
//! use dinelog_models::{ItemKind, ListId, UserId};
//!
//! # async fn run() -> dinelog_lists::Result<()> {
//! let service = ListService::open(ListsConfig::from_env());
//! let list_id = ListId::from("list-123");
//! let owner = UserId::from("user-1");
//!
//! let handle = service.start_reordering(&list_id, &owner).await?;
//! let live = service.apply_drag(&handle, ItemKind::Venue, 0, 2)?;
//! println!("{} items after drag", live.len());
//!
//! if let Err(e) = service.save_reordering(&handle).await {
//!     // Still editing: retry later or throw the edit away
//!     eprintln!("save failed: {}", e);
//!     service.cancel_reordering(&handle).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod collection;
pub mod config;
pub mod error;
pub mod gateway;
pub mod projection;
pub mod reconcile;
pub mod service;
pub mod session;

pub use config::ListsConfig;
pub use error::{ListError, Result};
pub use gateway::ListGateway;
pub use projection::{BadgeNumbering, TabView};
pub use reconcile::MergePolicy;
pub use service::{ListService, SessionHandle};
pub use session::{EditSession, SessionState};
