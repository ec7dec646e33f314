//! Test suite for the node factory capability.
//!
//! Covers constructor lookup, failure reporting, and the all-or-nothing
//! contract of registration by type.

use crate::chain::Chain;
use crate::error::InstantiationError;
use crate::factory::{FactoryMap, NodeFactory};
use crate::node::{BaseNode, Node, NodeState};
use std::any::{self, TypeId};
use std::rc::Rc;

struct DoublingNode {
  state: NodeState<i32>,
}

impl DoublingNode {
  fn new() -> Self {
    Self {
      state: NodeState::new(),
    }
  }
}

impl Node<i32> for DoublingNode {
  fn state(&self) -> &NodeState<i32> {
    &self.state
  }

  fn input_received(&self, input: Option<&i32>) {
    self.set_output(input.map(|value| value * 2));
  }
}

// A node whose constructor seeds an initial output, so replaced constructors
// are observable.
struct SeededNode {
  state: NodeState<i32>,
}

impl SeededNode {
  fn with_output(value: i32) -> Self {
    let node = Self {
      state: NodeState::new(),
    };
    node.set_output(Some(value));
    node
  }
}

impl Node<i32> for SeededNode {
  fn state(&self) -> &NodeState<i32> {
    &self.state
  }
}

// ============================================================================
// FactoryMap
// ============================================================================

#[test]
fn test_create_runs_registered_constructor() {
  let factory: FactoryMap<i32> = FactoryMap::new().register::<DoublingNode>(DoublingNode::new);

  let node = factory
    .create(
      TypeId::of::<DoublingNode>(),
      any::type_name::<DoublingNode>(),
    )
    .unwrap();

  node.set_input(Some(4));
  assert_eq!(node.output(), Some(8));
}

#[test]
fn test_create_unknown_type_fails() {
  let factory: FactoryMap<i32> = FactoryMap::new();

  let error = factory
    .create(TypeId::of::<DoublingNode>(), "DoublingNode")
    .unwrap_err();

  assert_eq!(error.type_name(), "DoublingNode");
  assert_eq!(error.reason(), "type not registered with this factory");
}

#[test]
fn test_register_with_propagates_constructor_failure() {
  let factory: FactoryMap<i32> = FactoryMap::new().register_with::<DoublingNode>(|| {
    Err(InstantiationError::new(
      any::type_name::<DoublingNode>(),
      "configuration missing",
    ))
  });

  let error = factory
    .create(
      TypeId::of::<DoublingNode>(),
      any::type_name::<DoublingNode>(),
    )
    .unwrap_err();

  assert_eq!(error.reason(), "configuration missing");
}

#[test]
fn test_later_registration_replaces_earlier() {
  let factory: FactoryMap<i32> = FactoryMap::new()
    .register::<SeededNode>(|| SeededNode::with_output(1))
    .register::<SeededNode>(|| SeededNode::with_output(2));

  assert_eq!(factory.len(), 1);
  let node = factory
    .create(TypeId::of::<SeededNode>(), any::type_name::<SeededNode>())
    .unwrap();
  assert_eq!(node.output(), Some(2));
}

#[test]
fn test_len_and_is_empty() {
  let empty: FactoryMap<i32> = FactoryMap::new();
  assert!(empty.is_empty());

  let factory = empty.register::<BaseNode<i32>>(BaseNode::new);
  assert!(!factory.is_empty());
  assert_eq!(factory.len(), 1);
}

// ============================================================================
// Registration by type
// ============================================================================

#[test]
fn test_chain_registers_node_by_type() {
  let factory = FactoryMap::new().register::<DoublingNode>(DoublingNode::new);
  let chain = Chain::with_factory(Rc::new(factory));

  chain.register_node_of::<DoublingNode>().unwrap();
  chain.set_default(6);

  assert_eq!(chain.node_count(), 1);
  assert_eq!(chain.output(), Some(12));
}

#[test]
fn test_register_node_of_without_factory_fails() {
  let chain: Chain<i32> = Chain::new();
  chain.set_default(5);

  let error = chain.register_node_of::<DoublingNode>().unwrap_err();

  assert!(error.type_name().contains("DoublingNode"));
  assert_eq!(error.reason(), "chain was built without a node factory");
  // All-or-nothing: the chain is exactly as it was before the call.
  assert_eq!(chain.node_count(), 0);
  assert_eq!(chain.output(), Some(5));
}

#[test]
fn test_register_node_of_unregistered_type_fails() {
  let factory: FactoryMap<i32> = FactoryMap::new().register::<BaseNode<i32>>(BaseNode::new);
  let chain = Chain::with_factory(Rc::new(factory));
  chain.set_default(5);

  let error = chain.register_node_of::<DoublingNode>().unwrap_err();

  assert!(error.type_name().contains("DoublingNode"));
  assert_eq!(chain.node_count(), 0);
  assert_eq!(chain.output(), Some(5));

  // The same chain still accepts types the factory does know.
  chain.register_node_of::<BaseNode<i32>>().unwrap();
  assert_eq!(chain.node_count(), 1);
}
