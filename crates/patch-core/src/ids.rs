//! Stable string identifiers for nodes and edges.
//!
//! Unlike a slot-indexed `NodeId(u32)`/`EdgeId(u32)` reused within a single
//! process run, patchgraph ids are author-supplied strings that round-trip
//! through project JSON and must stay stable across saves — so they are
//! newtype wrappers around `String`, not generational slot indices.

use std::fmt;

macro_rules! string_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[derive(serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(NodeId, "Stable identifier for a node, author-supplied and persisted verbatim.");
string_id!(EdgeId, "Stable identifier for an edge, author-supplied and persisted verbatim.");
