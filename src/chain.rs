//! Ordered composition of nodes behind a single input/output surface.
//!
//! A [`Chain`] wires each registered node's output stream to the next node's
//! input, exposes the first node's input and the last node's output as its
//! own, and gates an optional output handler on top of its output stream.
//! Data flows strictly forward and fully synchronously: setting the chain's
//! input drives the entire downstream cascade to completion before the setter
//! returns.
//!
//! A chain satisfies the same [`Node`] contract as a plain node (composition
//! around an embedded [`NodeState`], not inheritance), so chains nest:
//! [`Chain::as_node`] yields the handle to register one chain inside another.
//! A chain with zero nodes behaves as an identity node, mirroring input to
//! output.
//!
//! ## Output gating
//!
//! Every time the tail node emits (or the empty chain's identity path
//! produces a value), the chain unconditionally updates its own output slot
//! and emits on its own stream, then decides whether to invoke the handler:
//! absent values never reach the handler, and with distinct-only gating
//! (the default) neither do repeats of the previous output. Stream
//! subscribers therefore always observe a value strictly before the handler
//! does.
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use signalweave::chain::Chain;
//! use signalweave::node::{BaseNode, Node};
//!
//! let chain = Chain::new();
//! chain.set_default("off".to_string());
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! chain.set_output_handler(move |value: &String| sink.borrow_mut().push(value.clone()));
//!
//! let override_node = Rc::new(BaseNode::new());
//! chain.register_node(override_node.clone());
//! override_node.set_output(Some("on".to_string()));
//!
//! assert_eq!(chain.output(), Some("on".to_string()));
//! assert_eq!(*seen.borrow(), vec!["off".to_string(), "on".to_string()]);
//! ```
//!
//! Chains are single-threaded and re-entrant; see the crate documentation for
//! the concurrency model.

use std::any::{self, TypeId};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::InstantiationError;
use crate::factory::NodeFactory;
use crate::node::{Node, NodeState};
use crate::subject::Subscription;

type Handler<T> = Rc<dyn Fn(&T)>;

struct ChainCore<T> {
  state: NodeState<T>,
  nodes: RefCell<Vec<Rc<dyn Node<T>>>>,
  // Inter-node forwarding links live as long as the chain; the tail link is
  // superseded (and released) each time a node is registered.
  links: RefCell<Vec<Subscription>>,
  tail: RefCell<Option<Subscription>>,
  handler: RefCell<Option<Handler<T>>>,
  call_on_distinct_only: Cell<bool>,
  factory: Option<Rc<dyn NodeFactory<T>>>,
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> ChainCore<T> {
  fn new(factory: Option<Rc<dyn NodeFactory<T>>>) -> Self {
    Self {
      state: NodeState::new(),
      nodes: RefCell::new(Vec::new()),
      links: RefCell::new(Vec::new()),
      tail: RefCell::new(None),
      handler: RefCell::new(None),
      call_on_distinct_only: Cell::new(true),
      factory,
    }
  }

  // The gating algorithm. Runs every time the tail node emits and every time
  // the empty chain's identity path produces a value.
  fn apply_output(&self, value: Option<T>) {
    let changed = self.output() != value;
    self.set_output(value.clone());
    debug!(output = ?value, changed, "chain output set");

    let Some(value) = value else {
      trace!("absent output, handler not invoked");
      return;
    };
    if self.call_on_distinct_only.get() && !changed {
      trace!("output unchanged, handler not invoked");
      return;
    }
    let handler = self.handler.borrow().as_ref().map(Rc::clone);
    if let Some(handler) = handler {
      // Stream subscribers have already observed this value; the handler
      // always comes second for a given emission.
      handler(&value);
      trace!(value = ?value, "output handler invoked");
    }
  }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> Node<T> for ChainCore<T> {
  fn state(&self) -> &NodeState<T> {
    &self.state
  }

  fn input_received(&self, input: Option<&T>) {
    debug!(input = ?input, "chain input set");
    let first = self.nodes.borrow().first().cloned();
    match first {
      Some(first) => {
        trace!("passing chain input to first node");
        first.set_input(input.cloned());
      }
      None => {
        trace!("no nodes registered, mirroring input to output");
        self.apply_output(input.cloned());
      }
    }
  }
}

/// An ordered, append-only sequence of nodes presenting the same external
/// contract as a single [`Node`].
///
/// `Chain` is a cheaply cloneable handle; clones share the same underlying
/// pipeline. Registration order is processing order, and there is no
/// reordering or removal.
pub struct Chain<T> {
  core: Rc<ChainCore<T>>,
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> Chain<T> {
  /// Creates an empty chain without a node factory.
  ///
  /// [`Chain::register_node_of`] will fail on such a chain; use
  /// [`Chain::with_factory`] when registration by type is wanted.
  pub fn new() -> Self {
    Self {
      core: Rc::new(ChainCore::new(None)),
    }
  }

  /// Creates an empty chain that resolves node types through `factory`.
  pub fn with_factory(factory: Rc<dyn NodeFactory<T>>) -> Self {
    Self {
      core: Rc::new(ChainCore::new(Some(factory))),
    }
  }

  /// Creates a chain and registers `nodes` in order, wiring each exactly as
  /// [`Chain::register_node`] would.
  pub fn with_nodes(nodes: impl IntoIterator<Item = Rc<dyn Node<T>>>) -> Self {
    let chain = Self::new();
    for node in nodes {
      chain.register_node(node);
    }
    chain
  }

  /// Seeds the chain's own input.
  ///
  /// Goes through the full input state machine: with no nodes registered the
  /// chain mirrors the default straight to its output, otherwise the first
  /// node receives it.
  pub fn set_default(&self, value: T) -> &Self {
    self.set_input(Some(value));
    self
  }

  /// Appends `node` and rewires the chain around it.
  ///
  /// In order: the chain's external output source is re-subscribed to the new
  /// node's output stream (superseding the previous tail link); the previous
  /// tail node, if any, is wired to forward its emissions into the new node,
  /// and its current output is copied over immediately so the new node starts
  /// consistent with already-flowing state; the first node ever registered
  /// receives the chain's current input; finally the chain's own output is
  /// re-evaluated from the new node's current output.
  pub fn register_node(&self, node: Rc<dyn Node<T>>) -> &Self {
    let core = &self.core;

    if let Some(old) = core.tail.borrow_mut().take() {
      old.unsubscribe();
    }
    let weak = Rc::downgrade(core);
    let tail = node.on_new_output().subscribe(move |value| {
      if let Some(core) = weak.upgrade() {
        core.apply_output(value.cloned());
      }
    });
    *core.tail.borrow_mut() = Some(tail);

    let previous = core.nodes.borrow().last().cloned();
    if let Some(previous) = previous {
      let downstream = Rc::clone(&node);
      let link = previous.on_new_output().subscribe(move |value| {
        trace!(value = ?value, "passing value to downstream node");
        downstream.set_input(value.cloned());
      });
      core.links.borrow_mut().push(link);
      node.set_input(previous.output());
    }

    core.nodes.borrow_mut().push(Rc::clone(&node));
    debug!(nodes = core.nodes.borrow().len(), "node registered");

    if core.nodes.borrow().len() == 1 {
      node.set_input(core.input());
    }

    core.apply_output(node.output());
    self
  }

  /// Constructs node type `N` through the chain's [`NodeFactory`] and
  /// registers it.
  ///
  /// All-or-nothing: on failure (no factory, or the factory refuses the
  /// type) the chain is left exactly as it was before the call.
  pub fn register_node_of<N>(&self) -> Result<&Self, InstantiationError>
  where
    N: Node<T> + 'static,
  {
    let type_name = any::type_name::<N>();
    let factory = self.core.factory.as_ref().ok_or_else(|| {
      InstantiationError::new(type_name, "chain was built without a node factory")
    })?;
    let node = factory.create(TypeId::of::<N>(), type_name)?;
    Ok(self.register_node(node))
  }

  /// Installs the sink for final results with distinct-only gating.
  ///
  /// Equivalent to [`Chain::set_output_handler_with`] with
  /// `call_on_distinct_only = true`.
  pub fn set_output_handler(&self, handler: impl Fn(&T) + 'static) -> &Self {
    self.set_output_handler_with(handler, true)
  }

  /// Installs the sink for final results.
  ///
  /// With `call_on_distinct_only` the handler only fires when the produced
  /// value differs from the previous output; without it, every non-absent
  /// output fires the handler, exact repeats included. If an output already
  /// exists the handler is invoked with it immediately, so a late-bound
  /// handler does not miss the current state.
  pub fn set_output_handler_with<F>(&self, handler: F, call_on_distinct_only: bool) -> &Self
  where
    F: Fn(&T) + 'static,
  {
    debug!(call_on_distinct_only, "output handler installed");
    let handler: Handler<T> = Rc::new(handler);
    self.core.call_on_distinct_only.set(call_on_distinct_only);
    *self.core.handler.borrow_mut() = Some(Rc::clone(&handler));
    if let Some(current) = self.output() {
      handler(&current);
    }
    self
  }

  /// The handle under which this chain acts as a node of another chain.
  pub fn as_node(&self) -> Rc<dyn Node<T>> {
    Rc::clone(&self.core) as Rc<dyn Node<T>>
  }

  /// Number of registered nodes.
  pub fn node_count(&self) -> usize {
    self.core.nodes.borrow().len()
  }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> Default for Chain<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> fmt::Debug for Chain<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Chain").finish_non_exhaustive()
  }
}

impl<T> Clone for Chain<T> {
  fn clone(&self) -> Self {
    Self {
      core: Rc::clone(&self.core),
    }
  }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> Node<T> for Chain<T> {
  fn state(&self) -> &NodeState<T> {
    self.core.state()
  }

  fn input_received(&self, input: Option<&T>) {
    self.core.input_received(input);
  }
}
