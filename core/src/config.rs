//! Assembler configuration.
//!
//! This module provides [`AssemblerConfig`] for choosing which completed
//! subtrees are published and which structural bounds are enforced.
//!
//! # Emission Policy
//!
//! With an empty [`emit_elements`](AssemblerConfig::emit_elements) set the
//! assembler publishes every element that sits exactly one level below the
//! depth threshold. With a non-empty set it publishes every element whose
//! name is in the set, at any depth.
//!
//! # Example
//!
//! ```ignore
//! use xml_object_stream_core::config::AssemblerConfig;
//!
//! // Skip the document root, emit its direct children (the default)
//! let config = AssemblerConfig::default();
//!
//! // Emit every <item>, wherever it is nested, and cap siblings
//! let config = AssemblerConfig::new()
//!     .with_emit_elements(["item"])
//!     .with_max_children(1000);
//! ```

use std::collections::HashSet;

use crate::Error;

/// What the assembler does after a close tag that does not match the open
/// element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum MismatchPolicy {
    /// Report the error and keep processing against the popped stacks.
    #[default]
    Continue,
    /// Report the error and ignore every later element and text event.
    Halt,
}

/// Configuration for tree assembly.
///
/// # Default Values
///
/// | Setting | Default | Meaning |
/// |---------|---------|---------|
/// | `emit_elements` | empty | depth-based emission |
/// | `element_depth` | 1 | skip only the document root |
/// | `max_children` | 0 | no sibling bound |
/// | `path_separator` | `"/"` | joiner for node paths |
/// | `on_mismatch` | `Continue` | mismatches are advisory |
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct AssemblerConfig {
    /// Tag names to publish as element events.
    ///
    /// Empty selects the depth-based policy.
    pub emit_elements: HashSet<String>,

    /// Depth threshold.
    ///
    /// Elements at nesting depth `<= element_depth` are tracked by name only
    /// and never materialized. Must be at least 1.
    #[cfg_attr(feature = "serde", serde(alias = "defaultElementDepth"))]
    pub element_depth: usize,

    /// Maximum number of same-named siblings under one parent.
    ///
    /// Each child that pushes the count past this bound produces a
    /// [`Error::MaxChildren`] event. `0` disables the check.
    pub max_children: usize,

    /// Separator used to join ancestor names into [`Node::path`](crate::Node::path).
    pub path_separator: String,

    /// Behavior after a mismatched close tag.
    pub on_mismatch: MismatchPolicy,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            emit_elements: HashSet::new(),
            element_depth: Self::DEFAULT_ELEMENT_DEPTH,
            max_children: 0,
            path_separator: Self::DEFAULT_PATH_SEPARATOR.to_string(),
            on_mismatch: MismatchPolicy::Continue,
        }
    }
}

impl AssemblerConfig {
    /// Default depth threshold.
    pub const DEFAULT_ELEMENT_DEPTH: usize = 1;

    /// Default path separator.
    pub const DEFAULT_PATH_SEPARATOR: &'static str = "/";

    /// Creates a new configuration with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the names published by the explicit-name policy.
    ///
    /// An empty iterator falls back to the depth-based policy.
    pub fn with_emit_elements<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emit_elements = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the depth threshold.
    #[inline]
    pub fn with_element_depth(mut self, depth: usize) -> Self {
        self.element_depth = depth;
        self
    }

    /// Sets the same-named sibling bound. `0` disables it.
    #[inline]
    pub fn with_max_children(mut self, limit: usize) -> Self {
        self.max_children = limit;
        self
    }

    /// Sets the path separator.
    pub fn with_path_separator(mut self, separator: impl Into<String>) -> Self {
        self.path_separator = separator.into();
        self
    }

    /// Sets the mismatch policy.
    #[inline]
    pub fn with_mismatch_policy(mut self, policy: MismatchPolicy) -> Self {
        self.on_mismatch = policy;
        self
    }

    /// Returns true when the explicit-name policy is in effect.
    #[inline]
    pub fn emits_by_name(&self) -> bool {
        !self.emit_elements.is_empty()
    }

    /// Returns the sibling bound, or `None` when disabled.
    #[inline]
    pub fn children_limit(&self) -> Option<usize> {
        (self.max_children > 0).then_some(self.max_children)
    }

    /// Checks the configuration for values the assembler cannot work with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.element_depth == 0 {
            return Err(Error::InvalidConfig {
                field: "element_depth",
                reason: "must be at least 1",
            });
        }
        if self.path_separator.is_empty() {
            return Err(Error::InvalidConfig {
                field: "path_separator",
                reason: "must not be empty",
            });
        }
        Ok(())
    }
}
