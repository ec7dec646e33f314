//! Error type for node construction.
//!
//! The chain core itself performs no I/O, parsing, or resource acquisition and
//! therefore defines no error kinds of its own. The single fallible operation
//! in the crate is resolving a node type through a [`NodeFactory`], which
//! surfaces an [`InstantiationError`] to the caller of
//! [`Chain::register_node_of`]. Faults raised inside a node's transformation
//! hook are not wrapped: they unwind through the synchronous cascade
//! unmodified.
//!
//! [`NodeFactory`]: crate::factory::NodeFactory
//! [`Chain::register_node_of`]: crate::chain::Chain::register_node_of

use thiserror::Error;

/// A node type could not be constructed.
///
/// Returned by [`NodeFactory::create`](crate::factory::NodeFactory::create)
/// and propagated verbatim by
/// [`Chain::register_node_of`](crate::chain::Chain::register_node_of). The
/// chain is left exactly as it was before the failed call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not construct node `{type_name}`: {reason}")]
pub struct InstantiationError {
  type_name: String,
  reason: String,
}

impl InstantiationError {
  /// Creates a new error for the given node type name and reason.
  pub fn new(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
    Self {
      type_name: type_name.into(),
      reason: reason.into(),
    }
  }

  /// The fully qualified name of the node type that failed to construct.
  pub fn type_name(&self) -> &str {
    &self.type_name
  }

  /// Why construction failed.
  pub fn reason(&self) -> &str {
    &self.reason
  }
}
