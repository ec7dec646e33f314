//! Node construction capability.
//!
//! Chains can append nodes by type through
//! [`Chain::register_node_of`](crate::chain::Chain::register_node_of), which
//! delegates construction to a [`NodeFactory`] handed to the chain when it was
//! built. The factory is a single fallible constructor-lookup operation; the
//! chain never cares how instances come to be. [`FactoryMap`] is the standard
//! implementation: a `TypeId`-keyed registry of constructors, configured at
//! build time.
//!
//! ```rust
//! use std::rc::Rc;
//! use signalweave::chain::Chain;
//! use signalweave::factory::FactoryMap;
//! use signalweave::node::BaseNode;
//!
//! let factory = FactoryMap::new().register::<BaseNode<u32>>(BaseNode::new);
//! let chain = Chain::with_factory(Rc::new(factory));
//! chain.register_node_of::<BaseNode<u32>>().unwrap();
//! ```

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::error::InstantiationError;
use crate::node::Node;

/// Capability to construct a node instance given its type.
///
/// Passed to [`Chain::with_factory`](crate::chain::Chain::with_factory) and
/// consumed only by the registration-by-type convenience path.
pub trait NodeFactory<T: Clone + PartialEq + fmt::Debug + 'static> {
  /// Constructs the node registered for `ty`.
  ///
  /// `type_name` is the fully qualified name of the requested type, supplied
  /// for error reporting. Fails with [`InstantiationError`] when the type
  /// cannot be constructed.
  fn create(&self, ty: TypeId, type_name: &str) -> Result<Rc<dyn Node<T>>, InstantiationError>;
}

type Constructor<T> = Box<dyn Fn() -> Result<Rc<dyn Node<T>>, InstantiationError>>;

/// `TypeId`-keyed constructor registry implementing [`NodeFactory`].
pub struct FactoryMap<T> {
  constructors: HashMap<TypeId, Constructor<T>>,
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> FactoryMap<T> {
  /// Creates an empty registry.
  pub fn new() -> Self {
    Self {
      constructors: HashMap::new(),
    }
  }

  /// Registers an infallible constructor for node type `N`.
  ///
  /// A later registration for the same type replaces the earlier one.
  pub fn register<N>(mut self, constructor: impl Fn() -> N + 'static) -> Self
  where
    N: Node<T> + 'static,
  {
    self.constructors.insert(
      TypeId::of::<N>(),
      Box::new(move || Ok(Rc::new(constructor()) as Rc<dyn Node<T>>)),
    );
    self
  }

  /// Registers a constructor for node type `N` that may refuse construction.
  pub fn register_with<N>(
    mut self,
    constructor: impl Fn() -> Result<N, InstantiationError> + 'static,
  ) -> Self
  where
    N: Node<T> + 'static,
  {
    self.constructors.insert(
      TypeId::of::<N>(),
      Box::new(move || Ok(Rc::new(constructor()?) as Rc<dyn Node<T>>)),
    );
    self
  }

  /// Number of registered node types.
  pub fn len(&self) -> usize {
    self.constructors.len()
  }

  /// Whether no node types are registered.
  pub fn is_empty(&self) -> bool {
    self.constructors.is_empty()
  }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> Default for FactoryMap<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> NodeFactory<T> for FactoryMap<T> {
  fn create(&self, ty: TypeId, type_name: &str) -> Result<Rc<dyn Node<T>>, InstantiationError> {
    match self.constructors.get(&ty) {
      Some(constructor) => {
        let node = constructor()?;
        debug!(type_name, "node constructed");
        Ok(node)
      }
      None => Err(InstantiationError::new(
        type_name,
        "type not registered with this factory",
      )),
    }
  }
}
