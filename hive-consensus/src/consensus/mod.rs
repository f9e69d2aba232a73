//! Event consensus.
//!
//! Members swipe on a proposed event; once the whole roster has answered the
//! event is confirmed (acceptance rate at or above one half) or cancelled.
//! The decision itself is a pure function of the vote map and the roster,
//! see [`evaluator::ConsensusEvaluator`]. The engine adds per-event mutual
//! exclusion on top of it.

mod engine;
pub mod evaluator;
mod pool;
pub mod registry;
pub mod resolver;

pub use engine::ConsensusEngine;
pub use pool::EventPool;
