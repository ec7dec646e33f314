//! Synchronous publish/subscribe primitive backing every node's output stream.
//!
//! A [`Subject`] holds an ordered registry of subscriber callbacks and invokes
//! them synchronously, in subscription order, on every [`Subject::emit`] call.
//! There is no de-duplication at this layer: repeated identical values are
//! delivered like any other emission. Subscribing returns a [`Subscription`]
//! handle whose release is explicit and idempotent; dropping the handle
//! without calling [`Subscription::unsubscribe`] leaves the subscriber
//! attached.
//!
//! Emission is re-entrancy safe: a callback may subscribe or unsubscribe on
//! the subject that is currently emitting. Subscribers added during an
//! emission are not invoked for that emission; subscribers removed during an
//! emission (including by their own callback) are not invoked again.
//!
//! Like the rest of the crate, subjects are single-threaded: they are neither
//! `Send` nor `Sync` and require no locking.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Callback<T> = Box<dyn FnMut(Option<&T>)>;

struct Entry<T> {
  id: u64,
  // Taken out of the slot for the duration of its own invocation, so a
  // callback can never be re-entered through a nested emit on the same
  // subject.
  callback: Option<Callback<T>>,
}

struct Registry<T> {
  next_id: u64,
  entries: Vec<Entry<T>>,
}

// Type-erased removal, so `Subscription` does not carry the value type.
trait Detach {
  fn detach(&self, id: u64);
}

impl<T> Detach for RefCell<Registry<T>> {
  fn detach(&self, id: u64) {
    self.borrow_mut().entries.retain(|entry| entry.id != id);
  }
}

/// A synchronous broadcast stream of `Option<T>` values.
///
/// Every node owns one subject and emits on it each time its output slot is
/// mutated. Values are passed to callbacks by reference; subscribers that need
/// ownership clone.
pub struct Subject<T> {
  registry: Rc<RefCell<Registry<T>>>,
}

impl<T: 'static> Subject<T> {
  /// Creates a subject with no subscribers.
  pub fn new() -> Self {
    Self {
      registry: Rc::new(RefCell::new(Registry {
        next_id: 0,
        entries: Vec::new(),
      })),
    }
  }

  /// Attaches `callback` and returns its release handle.
  ///
  /// Callbacks are invoked in subscription order. The returned
  /// [`Subscription`] holds only a weak reference to this subject, so keeping
  /// it around never extends the subject's lifetime.
  pub fn subscribe<F>(&self, callback: F) -> Subscription
  where
    F: FnMut(Option<&T>) + 'static,
  {
    let id = {
      let mut registry = self.registry.borrow_mut();
      let id = registry.next_id;
      registry.next_id += 1;
      registry.entries.push(Entry {
        id,
        callback: Some(Box::new(callback)),
      });
      id
    };
    let registry: Rc<RefCell<Registry<T>>> = Rc::clone(&self.registry);
    let erased: Rc<dyn Detach> = registry;
    Subscription {
      registry: Rc::downgrade(&erased),
      id,
    }
  }

  /// Delivers `value` to every current subscriber, in subscription order.
  ///
  /// The registry is not borrowed while a callback runs, so callbacks are free
  /// to subscribe or unsubscribe re-entrantly.
  pub fn emit(&self, value: Option<&T>) {
    let ids: Vec<u64> = self
      .registry
      .borrow()
      .entries
      .iter()
      .map(|entry| entry.id)
      .collect();
    for id in ids {
      let taken = {
        let mut registry = self.registry.borrow_mut();
        registry
          .entries
          .iter_mut()
          .find(|entry| entry.id == id)
          .and_then(|entry| entry.callback.take())
      };
      let Some(mut callback) = taken else {
        // Unsubscribed by an earlier callback of this same emission.
        continue;
      };
      callback(value);
      let mut registry = self.registry.borrow_mut();
      if let Some(entry) = registry.entries.iter_mut().find(|entry| entry.id == id) {
        entry.callback = Some(callback);
      }
    }
  }

  /// Number of currently attached subscribers.
  pub fn subscriber_count(&self) -> usize {
    self.registry.borrow().entries.len()
  }
}

impl<T: 'static> Default for Subject<T> {
  fn default() -> Self {
    Self::new()
  }
}

/// Release handle for a single subscriber.
///
/// Release is explicit: dropping the handle leaves the subscriber attached.
/// [`Subscription::unsubscribe`] is idempotent and is a no-op once the
/// originating [`Subject`] has been dropped.
pub struct Subscription {
  registry: Weak<dyn Detach>,
  id: u64,
}

impl Subscription {
  /// Detaches the subscriber from its subject.
  pub fn unsubscribe(&self) {
    if let Some(registry) = self.registry.upgrade() {
      registry.detach(self.id);
    }
  }
}
