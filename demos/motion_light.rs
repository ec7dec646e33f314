//! Motion-controlled lighting: a schedule sets the baseline, a motion sensor
//! overrides it once, and a manual switch can pin the result until released.
//!
//! Run with `cargo run --example motion_light`.

use std::rc::Rc;

use signalweave::chain::Chain;
use signalweave::node::{Node, NodeState};

#[derive(Debug, Clone, PartialEq)]
enum Light {
  Off,
  Dim(u8),
  Bright,
}

/// Fires a bright override on detection, then steps aside for the next
/// scheduled value.
struct MotionSensor {
  state: NodeState<Light>,
}

impl MotionSensor {
  fn new() -> Self {
    Self {
      state: NodeState::new(),
    }
  }

  fn detected(&self) {
    self.set_output_then_pass_through_on_next_input(Some(Light::Bright));
  }
}

impl Node<Light> for MotionSensor {
  fn state(&self) -> &NodeState<Light> {
    &self.state
  }
}

/// Pins the pipeline to a fixed value until released.
struct ManualSwitch {
  state: NodeState<Light>,
}

impl ManualSwitch {
  fn new() -> Self {
    Self {
      state: NodeState::new(),
    }
  }

  fn hold(&self, light: Light) {
    self.set_output(Some(light));
  }

  fn release(&self) {
    self.pass_input_through();
  }
}

impl Node<Light> for ManualSwitch {
  fn state(&self) -> &NodeState<Light> {
    &self.state
  }
}

fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::DEBUG)
    .init();

  let chain = Chain::new();
  let motion = Rc::new(MotionSensor::new());
  let manual = Rc::new(ManualSwitch::new());
  chain.register_node(motion.clone());
  chain.register_node(manual.clone());

  // Both nodes start transparent; the schedule flows straight through.
  motion.pass_input_through();
  manual.pass_input_through();

  chain.set_output_handler(|light| println!("light -> {light:?}"));

  println!("-- evening schedule");
  chain.set_default(Light::Dim(30));

  println!("-- motion detected");
  motion.detected();

  println!("-- next schedule tick (motion override expires)");
  chain.set_default(Light::Dim(20));

  println!("-- manual off, schedule keeps ticking underneath");
  manual.hold(Light::Off);
  chain.set_default(Light::Dim(40));

  println!("-- manual released, current schedule value resurfaces");
  manual.release();
}
