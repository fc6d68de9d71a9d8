//! Engine configuration.
//!
//! # Environment Variables
//!
//! - `DINELOG_STATE_DIR`: Override the base state directory
//! - `DINELOG_MERGE_POLICY`: `interleave` (default) or `concatenate`
//! - `DINELOG_BADGES`: `global` (default) or `per_tab`

use std::path::PathBuf;

use tracing::warn;

use crate::projection::BadgeNumbering;
use crate::reconcile::MergePolicy;

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "DINELOG_STATE_DIR";

/// Environment variable selecting the merge-back policy.
pub const MERGE_POLICY_ENV: &str = "DINELOG_MERGE_POLICY";

/// Environment variable selecting badge numbering.
pub const BADGES_ENV: &str = "DINELOG_BADGES";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".dinelog";

/// Configuration for the list engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListsConfig {
    /// Where the file-backed store keeps its records.
    pub state_dir: PathBuf,
    /// How a reordered tab is merged back into the global order.
    pub merge_policy: MergePolicy,
    /// How item badges are numbered on ordered lists.
    pub badge_numbering: BadgeNumbering,
}

impl Default for ListsConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            merge_policy: MergePolicy::default(),
            badge_numbering: BadgeNumbering::default(),
        }
    }
}

/// `~/.dinelog`, or `.dinelog` in the current directory without a home.
fn default_state_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(DEFAULT_STATE_DIR))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
}

impl ListsConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a config from defaults overridden by environment variables.
    ///
    /// Unrecognised values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var(STATE_DIR_ENV) {
            config.state_dir = PathBuf::from(dir);
        }

        if let Ok(raw) = std::env::var(MERGE_POLICY_ENV) {
            match MergePolicy::parse(&raw) {
                Some(policy) => config.merge_policy = policy,
                None => warn!(value = %raw, "ignoring unknown {}", MERGE_POLICY_ENV),
            }
        }

        if let Ok(raw) = std::env::var(BADGES_ENV) {
            match BadgeNumbering::parse(&raw) {
                Some(numbering) => config.badge_numbering = numbering,
                None => warn!(value = %raw, "ignoring unknown {}", BADGES_ENV),
            }
        }

        config
    }

    /// Sets the state directory.
    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = dir.into();
        self
    }

    /// Sets the merge-back policy.
    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    /// Sets badge numbering.
    pub fn with_badge_numbering(mut self, numbering: BadgeNumbering) -> Self {
        self.badge_numbering = numbering;
        self
    }
}
