//! Error types for the devmux relay.

use thiserror::Error;

use crate::state::{Direction, EndpointRole};

/// Result type alias using [`RelayError`].
pub type Result<T> = std::result::Result<T, RelayError>;

/// Fatal relay failures.
///
/// Transient conditions (would-block, interrupted syscalls) are retried
/// inside the endpoint layer and never surface here.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The readiness wait itself failed for a non-interrupt reason.
    #[error("readiness wait failed: {0}")]
    Multiplex(#[source] std::io::Error),

    /// A read or write on an endpoint failed.
    #[error("{direction} on {endpoint} failed: {source}")]
    Io {
        endpoint: EndpointRole,
        direction: Direction,
        #[source]
        source: std::io::Error,
    },
}
