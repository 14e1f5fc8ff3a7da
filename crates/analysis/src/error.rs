//! Analysis failure signals.
//!
//! The computation is pure and deterministic, so neither error has retry
//! semantics; the caller's only recovery is to skip the diagnostic for the
//! affected match. No partial verdict ever accompanies an error.

use std::error::Error;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchCheckError {
    /// A constructor was applied to a type shape that cannot produce it,
    /// or literal values of different kinds were compared. This is a bug
    /// in the caller's matrix construction, not a property of the matched
    /// code; the analysis aborts rather than guess.
    IncompatibleConstructor(String),
    /// Constructor enumeration for this type shape is intentionally
    /// unimplemented (fixed-size arrays, slice lengths). Distinguishable
    /// from [`MatchCheckError::IncompatibleConstructor`] so callers can
    /// silently skip the diagnostic instead of reporting an internal bug.
    UnsupportedDomain(&'static str),
}

impl MatchCheckError {
    pub(crate) fn incompatible(msg: impl Into<String>) -> Self {
        MatchCheckError::IncompatibleConstructor(msg.into())
    }
}

impl fmt::Display for MatchCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchCheckError::IncompatibleConstructor(msg) => {
                write!(f, "incompatible constructor: {msg}")
            }
            MatchCheckError::UnsupportedDomain(what) => {
                write!(f, "constructor enumeration not supported for {what}")
            }
        }
    }
}

impl Error for MatchCheckError {}
