//! Assembling a chain from node types resolved through a factory.
//!
//! Run with `cargo run --example factory_wiring`.

use std::rc::Rc;

use signalweave::chain::Chain;
use signalweave::factory::FactoryMap;
use signalweave::node::{Node, NodeState};

/// Clamps a requested heating setpoint into a safe band.
struct ClampNode {
  state: NodeState<i32>,
}

impl ClampNode {
  fn new() -> Self {
    Self {
      state: NodeState::new(),
    }
  }
}

impl Node<i32> for ClampNode {
  fn state(&self) -> &NodeState<i32> {
    &self.state
  }

  fn input_received(&self, input: Option<&i32>) {
    self.set_output(input.map(|setpoint| (*setpoint).clamp(5, 28)));
  }
}

/// Nudges the setpoint down while an energy-saving tariff is active.
struct EcoNode {
  state: NodeState<i32>,
}

impl EcoNode {
  fn new() -> Self {
    Self {
      state: NodeState::new(),
    }
  }
}

impl Node<i32> for EcoNode {
  fn state(&self) -> &NodeState<i32> {
    &self.state
  }

  fn input_received(&self, input: Option<&i32>) {
    self.set_output(input.map(|setpoint| setpoint - 2));
  }
}

fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::TRACE)
    .init();

  let factory = FactoryMap::new()
    .register::<ClampNode>(ClampNode::new)
    .register::<EcoNode>(EcoNode::new);

  let chain = Chain::with_factory(Rc::new(factory));
  chain
    .register_node_of::<ClampNode>()
    .expect("clamp node is registered")
    .register_node_of::<EcoNode>()
    .expect("eco node is registered");

  chain.set_output_handler(|setpoint| println!("setpoint -> {setpoint}"));

  chain.set_default(35); // clamped to 28, eco brings it to 26
  chain.set_default(18); // passes the clamp, eco brings it to 16
}
