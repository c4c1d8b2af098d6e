//! devmux relay library
//!
//! The readiness-driven engine that shuttles bytes between one read-write
//! device handle and two named pipes:
//! - `endpoints`: readiness waits and non-blocking I/O over the three handles
//! - `engine`: the buffering/flow-control loop
//! - `setup`: FIFO creation and handle preparation

pub mod endpoints;
pub mod engine;
pub mod setup;
