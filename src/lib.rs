//! # signalweave
//!
//! Composable, synchronous decision pipelines in pure Rust.
//!
//! signalweave composes a linear chain of stateful transformation nodes, each
//! consuming and producing values of one fixed type, with per-node ability to
//! temporarily or permanently bypass transformation ("pass-through"). It is
//! aimed at reactive decision pipelines: an automation rule chain where a
//! motion sensor node or a manual override node should influence the result
//! once, then get out of the way.
//!
//! ## Key Features
//!
//! - **Linear dataflow**: each node's output feeds the next node's input;
//!   the chain exposes a single external input/output surface
//! - **Pass-through control**: any node can mirror its input unchanged,
//!   permanently or for exactly one future input ("influence once")
//! - **Synchronous propagation**: setting an input drives the whole cascade
//!   to completion before the setter returns; no scheduler, no queues
//! - **Chains nest**: a chain satisfies the same contract as a node
//! - **Gated output handler**: distinct-only delivery with catch-up for
//!   late-bound handlers
//!
//! ## Quick Start
//!
//! ```rust
//! use std::rc::Rc;
//! use signalweave::chain::Chain;
//! use signalweave::node::{BaseNode, Node};
//!
//! let chain = Chain::new();
//! chain.set_default(10u32);
//!
//! let sensor = Rc::new(BaseNode::new());
//! chain.register_node(sensor.clone());
//!
//! // A detection overrides the result once; the next scheduled value
//! // flows through untouched.
//! sensor.set_output_then_pass_through_on_next_input(Some(100));
//! assert_eq!(chain.output(), Some(100));
//!
//! chain.set_default(20);
//! assert_eq!(chain.output(), Some(20));
//! ```
//!
//! ## Threading
//!
//! The entire crate is single-threaded by design: state lives in
//! `Rc`/`Cell`/`RefCell`, types are neither `Send` nor `Sync`, and no locking
//! exists or is intended. Propagation is re-entrant within one thread and
//! cannot be aborted mid-flight.

// Documentation enforcement - treat missing docs as errors
#![deny(missing_docs)]

/// Ordered node composition with output-handler gating.
pub mod chain;
/// Node construction error.
pub mod error;
/// Node factory capability and the type-keyed registry implementation.
pub mod factory;
/// Core node trait and state machine.
pub mod node;
/// Publish/subscribe primitive backing node output streams.
pub mod subject;

#[cfg(test)]
mod factory_test;
