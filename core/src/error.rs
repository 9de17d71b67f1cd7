//! Error types reported by the tree assembler.
//!
//! Structural problems found while assembling (a close tag that does not
//! match the open element, too many same-named siblings) are not returned
//! from [`TreeAssembler::process`](crate::TreeAssembler::process). They are
//! emitted as [`Event::Error`](crate::Event::Error) so the consumer decides
//! whether to keep feeding events.

use thiserror::Error;

/// Errors surfaced by the assembler, either as error events or from
/// construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A close tag did not match the innermost open element.
    ///
    /// `expected` is the name that was actually open, or `None` when the
    /// close tag arrived with no element open at all.
    #[error("unexpected end of element \"{name}\"")]
    UnexpectedEnd {
        /// Name carried by the close tag.
        name: String,
        /// Name of the element that was open.
        expected: Option<String>,
    },

    /// A parent accumulated more same-named children than allowed.
    ///
    /// The child is still attached; this is advisory.
    #[error(
        "maximum number of children reached: {count} <{name}> elements under <{parent}> (limit {limit})"
    )]
    MaxChildren {
        /// Name of the parent element.
        parent: String,
        /// Name of the repeated child element.
        name: String,
        /// Sibling count including the child that triggered the error.
        count: usize,
        /// Configured bound.
        limit: usize,
    },

    /// Error relayed unchanged from the token source.
    #[error("{0}")]
    Source(String),

    /// The assembler configuration was rejected.
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig {
        /// Offending configuration field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

impl Error {
    /// Returns true for errors that describe malformed document structure.
    pub fn is_structural(&self) -> bool {
        matches!(self, Error::UnexpectedEnd { .. } | Error::MaxChildren { .. })
    }
}
