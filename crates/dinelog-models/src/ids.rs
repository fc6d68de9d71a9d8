//! Typed ids for lists, items and the things items point at.
//!
//! Every id is an opaque string. Freshly generated ids carry a kind prefix
//! (`list-…`, `item-…`) so they are recognisable in stored records and logs;
//! ids handed in from outside are accepted as-is.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Prefix of generated ids.
            pub const PREFIX: &'static str = $prefix;

            /// Generates a fresh random id.
            pub fn new() -> Self {
                Self(format!("{}-{}", Self::PREFIX, Uuid::new_v4()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Identifies a List.
    ListId,
    "list"
);
define_id!(
    /// Identifies one membership row of a List.
    ItemId,
    "item"
);
define_id!(
    /// Venue referenced by a places item.
    VenueId,
    "venue"
);
define_id!(
    /// Review referenced by a reviews item.
    ReviewId,
    "review"
);
define_id!(UserId, "user");
define_id!(
    /// Identifies one reorder session.
    SessionId,
    "sess"
);
