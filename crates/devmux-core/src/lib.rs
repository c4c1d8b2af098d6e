//! devmux core library
//!
//! Runtime-independent pieces of the devmux relay:
//! - fixed-capacity buffers with the empty/draining state machine
//! - interest-set and ready-event types for the readiness loop
//! - the relay error taxonomy
//! - shared tracing initialization

pub mod buffer;
pub mod error;
pub mod state;
pub mod tracing_init;

pub use buffer::RelayBuffer;
pub use error::{RelayError, Result};
pub use state::{Direction, EndpointRole, Interest, InterestSet, ReadyEvent, RelayState};
