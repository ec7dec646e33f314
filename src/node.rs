//! Core node contract and state machine.
//!
//! A node is a single pipeline stage owning four pieces of state: an input
//! slot, an output slot, a pass-through flag, and a one-shot arming flag that
//! converts the node to pass-through on its *next* input. Every node also
//! owns a [`Subject`] that emits each time the output slot is mutated.
//!
//! ## State machine
//!
//! Setting the input evaluates one of three transitions:
//!
//! 1. **Armed** (regardless of pass-through state): the arming flag is
//!    consumed, the node enters pass-through mode, and entering pass-through
//!    immediately republishes the just-stored input as output.
//! 2. **Pass-through**: the input is mirrored directly to the output slot and
//!    emitted, bypassing transformation.
//! 3. **Normal**: the input is handed to the node's [`Node::input_received`]
//!    hook. The default hook ignores it; concrete nodes override it to
//!    transform and publish via [`Node::set_output`].
//!
//! Publishing through [`Node::set_output`] always clears both pass-through
//! and the arming flag: an explicit output wins over transient bypass state.
//!
//! ## Implementing a node
//!
//! Concrete nodes embed a [`NodeState`] and hand it back from
//! [`Node::state`]; the trait's provided methods supply the whole state
//! machine. All methods take `&self`; node-local state beyond [`NodeState`]
//! uses `Cell`/`RefCell`, matching the crate's single-threaded sharing model.
//!
//! ```rust
//! use signalweave::node::{Node, NodeState};
//!
//! /// Doubles every input it sees.
//! struct Doubler {
//!   state: NodeState<i32>,
//! }
//!
//! impl Node<i32> for Doubler {
//!   fn state(&self) -> &NodeState<i32> {
//!     &self.state
//!   }
//!
//!   fn input_received(&self, input: Option<&i32>) {
//!     self.set_output(input.map(|value| value * 2));
//!   }
//! }
//!
//! let node = Doubler { state: NodeState::new() };
//! node.set_input(Some(21));
//! assert_eq!(node.output(), Some(42));
//! ```
//!
//! None of the operations here can fail; absence of a value (`None`) is a
//! valid value and propagates like any other.

use std::cell::{Cell, RefCell};
use std::fmt;

use tracing::trace;

use crate::subject::Subject;

/// The state slots every node owns.
///
/// Embedded by concrete nodes and returned from [`Node::state`]. All slots use
/// interior mutability so the node can be driven through shared `Rc` handles.
pub struct NodeState<T> {
  input: RefCell<Option<T>>,
  output: RefCell<Option<T>>,
  pass_through: Cell<bool>,
  pass_through_next_input: Cell<bool>,
  on_new_output: Subject<T>,
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> NodeState<T> {
  /// Creates an empty state: no input, no output, pass-through off, unarmed.
  pub fn new() -> Self {
    Self {
      input: RefCell::new(None),
      output: RefCell::new(None),
      pass_through: Cell::new(false),
      pass_through_next_input: Cell::new(false),
      on_new_output: Subject::new(),
    }
  }

  fn input(&self) -> Option<T> {
    self.input.borrow().clone()
  }

  fn output(&self) -> Option<T> {
    self.output.borrow().clone()
  }

  // Writes the output slot and emits. Leaves the pass-through flags alone;
  // the slot borrow is released before subscribers run.
  fn publish(&self, value: Option<T>) {
    *self.output.borrow_mut() = value.clone();
    trace!(output = ?value, "output published");
    self.on_new_output.emit(value.as_ref());
  }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> Default for NodeState<T> {
  fn default() -> Self {
    Self::new()
  }
}

/// A single pipeline stage: input/output slots, pass-through control, and an
/// output-change stream.
///
/// Implementors provide [`Node::state`] and optionally override
/// [`Node::input_received`]; everything else is supplied. See the
/// [module documentation](self) for the transition rules.
pub trait Node<T: Clone + PartialEq + fmt::Debug + 'static> {
  /// The node's state slots.
  fn state(&self) -> &NodeState<T>;

  /// Hook invoked for a new input while the node is in normal (non-bypass)
  /// mode. The default ignores the input; transforming nodes override this
  /// and publish a result via [`Node::set_output`].
  fn input_received(&self, input: Option<&T>) {
    let _ = input;
  }

  /// Pushes a value into the node, driving the downstream cascade to
  /// completion before returning.
  fn set_input(&self, value: Option<T>) {
    let state = self.state();
    *state.input.borrow_mut() = value;
    if state.pass_through_next_input.get() {
      // One-shot: entering pass-through republishes the stored input.
      self.set_pass_through(true);
      return;
    }
    if state.pass_through.get() {
      state.publish(state.input());
      return;
    }
    let input = state.input();
    self.input_received(input.as_ref());
  }

  /// The last value pushed in, if any.
  fn input(&self) -> Option<T> {
    self.state().input()
  }

  /// The last value produced, if any.
  fn output(&self) -> Option<T> {
    self.state().output()
  }

  /// Whether the node currently mirrors its input to its output unchanged.
  fn pass_through(&self) -> bool {
    self.state().pass_through.get()
  }

  /// Toggles pass-through mode.
  ///
  /// Explicitly setting this always disarms
  /// [`Node::pass_through_on_next_input`]. Turning pass-through on
  /// immediately republishes the current input as output; turning it off (or
  /// setting the current value again) emits nothing.
  fn set_pass_through(&self, enabled: bool) {
    let state = self.state();
    state.pass_through_next_input.set(false);
    if state.pass_through.get() == enabled {
      return;
    }
    state.pass_through.set(enabled);
    trace!(enabled, "pass-through toggled");
    if enabled {
      state.publish(state.input());
    }
  }

  /// Turns on pass-through mode, mirroring the current input to the output.
  ///
  /// Shorthand for `set_pass_through(true)`.
  fn pass_input_through(&self) {
    self.set_pass_through(true);
  }

  /// Publishes a processed result.
  ///
  /// Clears pass-through mode and the arming flag, then updates the output
  /// slot and emits unconditionally: an explicit output always wins over
  /// transient bypass state.
  fn set_output(&self, value: Option<T>) {
    let state = self.state();
    state.pass_through.set(false);
    state.pass_through_next_input.set(false);
    state.publish(value);
  }

  /// Publishes `value` now, then arms pass-through for the next input.
  ///
  /// For nodes that should influence the pipeline once, like a motion sensor
  /// detection or a light switch press: the override value is visible right
  /// away, and the very next incoming input reverts the node to transparent
  /// mirroring.
  fn set_output_then_pass_through_on_next_input(&self, value: Option<T>) {
    self.set_output(value);
    self.pass_through_on_next_input();
  }

  /// Arms pass-through for the next input without touching the current
  /// output. No-op when the node is already in pass-through mode.
  fn pass_through_on_next_input(&self) {
    let state = self.state();
    if state.pass_through.get() {
      return;
    }
    state.pass_through_next_input.set(true);
  }

  /// The node's output-change stream.
  ///
  /// Emits every time the output slot is mutated, including repeated
  /// identical values. De-duplication is a chain-level policy, not a
  /// node-level one.
  fn on_new_output(&self) -> &Subject<T> {
    &self.state().on_new_output
  }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> fmt::Debug for dyn Node<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Node").finish_non_exhaustive()
  }
}

/// A node with the default-ignore hook: inputs are stored but never produce
/// output until pass-through is engaged or an output is set explicitly.
///
/// Useful directly as an inert stage and as the embedded core of composite
/// components.
pub struct BaseNode<T> {
  state: NodeState<T>,
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> BaseNode<T> {
  /// Creates an inert node.
  pub fn new() -> Self {
    Self {
      state: NodeState::new(),
    }
  }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> Default for BaseNode<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> Node<T> for BaseNode<T> {
  fn state(&self) -> &NodeState<T> {
    &self.state
  }
}
