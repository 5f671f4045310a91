//! Error types raised by the router
//!
//! Only three conditions are errors: a duplicate run start, a malformed
//! document, and a failing subscriber factory. Documents that reference
//! unknown runs, descriptors, or resources are NOT errors; the router drops
//! them silently because it cannot distinguish "not interested" from
//! "never heard of it".

use thiserror::Error;

use crate::document::DocumentKind;
use crate::uid::Uid;

/// Boxed error returned by subscriber factories
///
/// Factories are caller-supplied, so their failure modes are open-ended;
/// the router wraps whatever they return into [`RouterError::Factory`].
pub type FactoryError = Box<dyn std::error::Error + Send + Sync>;

/// All errors the router surfaces from `submit`.
///
/// Every variant is terminal for the single `submit` call that raised it.
/// None of them corrupt the indices of unrelated runs, and the router never
/// retries internally.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A start document arrived carrying a run uid that is already registered
    ///
    /// Run uids are globally unique; a repeat is a contract violation by the
    /// document source, never a silent overwrite.
    #[error("duplicate run start: {uid}")]
    DuplicateRun {
        /// Uid of the already-registered run
        uid: Uid,
    },

    /// A document is missing a required identifier or reference field,
    /// or could not be decoded into its kind's record shape
    #[error("malformed {kind} document: {reason}")]
    MalformedDocument {
        /// Kind of the offending document
        kind: DocumentKind,
        /// What was missing or undecodable
        reason: String,
    },

    /// A subscriber factory failed while a run was being registered
    ///
    /// Registration is all-or-nothing: when this error surfaces, no
    /// subscriber set exists for the run and later factories were not
    /// invoked.
    #[error("factory {index} failed for run {run}: {source}")]
    Factory {
        /// Position of the failing factory, in registration order
        index: usize,
        /// Uid of the run whose registration failed
        run: Uid,
        /// The factory's own error
        #[source]
        source: FactoryError,
    },
}

/// Result type for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;

impl RouterError {
    /// A malformed-document error for a missing or empty required field
    pub fn missing_field(kind: DocumentKind, field: &'static str) -> Self {
        RouterError::MalformedDocument {
            kind,
            reason: format!("missing required field `{}`", field),
        }
    }

    /// Check if this error is a contract violation by the document source.
    ///
    /// Duplicate starts and malformed documents mean the source broke the
    /// stream contract; factory failures come from caller-supplied code.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            RouterError::DuplicateRun { .. } | RouterError::MalformedDocument { .. }
        )
    }

    /// Check if this error wraps a subscriber factory failure.
    pub fn is_factory_failure(&self) -> bool {
        matches!(self, RouterError::Factory { .. })
    }
}
