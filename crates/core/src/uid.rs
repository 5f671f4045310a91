//! Unique identifiers for documents and runs
//!
//! Every document in the stream carries string identifiers: its own `uid`
//! and, for most kinds, a reference to another entity (a run start, a
//! descriptor, a resource). [`Uid`] is the shared newtype for all of them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a document, run, descriptor, or resource.
///
/// Uids are opaque strings supplied by the document source. They are assumed
/// globally unique per entity; the router never parses them, only compares
/// and stores them as index keys.
///
/// # Examples
///
/// ```
/// use manifold_core::uid::Uid;
///
/// let id1 = Uid::random();
/// let id2 = Uid::random();
/// assert_ne!(id1, id2);
///
/// let fixed = Uid::from("run-42");
/// assert_eq!(fixed.as_str(), "run-42");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    /// Create a Uid from any string-like value
    pub fn new(value: impl Into<String>) -> Self {
        Uid(value.into())
    }

    /// Generate a fresh random Uid (UUID v4, hyphenated)
    ///
    /// Document sources conventionally mint uids this way; tests and
    /// benchmarks use it to fabricate streams.
    pub fn random() -> Self {
        Uid(Uuid::new_v4().to_string())
    }

    /// View the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the identifier is the empty string
    ///
    /// An empty uid in a required field makes a document malformed; the
    /// router rejects it before touching any index.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Uid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Uid {
    fn from(value: String) -> Self {
        Uid(value)
    }
}

impl From<&str> for Uid {
    fn from(value: &str) -> Self {
        Uid(value.to_string())
    }
}

impl AsRef<str> for Uid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
