//! The relay engine: a readiness-driven buffering loop.
//!
//! Each iteration recomputes the interest set from the two buffer states,
//! waits until exactly one interest fires (or shutdown is requested), and
//! services that single event with at most one read or one write. Partial
//! writes resume on a later writable notification; nothing here loops to
//! force a transfer to completion.

use tokio::sync::watch;
use tracing::{debug, info, trace};

use devmux_core::error::RelayError;
use devmux_core::state::{EndpointRole, ReadyEvent, RelayState};

use crate::endpoints::Endpoints;

/// Why the relay loop ended, other than a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A peer closed its side: zero-length read on this endpoint.
    EndOfStream(EndpointRole),
    /// The shutdown handle fired (or its sender went away).
    ShutdownRequested,
}

/// Single-owner relay loop over an [`Endpoints`] implementation.
///
/// The engine is the sole mutator of the buffer state; everything between
/// two waits is synchronous and sequential.
pub struct RelayEngine<E> {
    endpoints: E,
    state: RelayState,
    shutdown: watch::Receiver<bool>,
}

impl<E: Endpoints> RelayEngine<E> {
    pub fn new(endpoints: E, buffer_capacity: usize, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            endpoints,
            state: RelayState::new(buffer_capacity),
            shutdown,
        }
    }

    pub fn endpoints(&self) -> &E {
        &self.endpoints
    }

    pub fn state(&self) -> &RelayState {
        &self.state
    }

    /// Drive the relay until a peer closes its stream, shutdown is
    /// requested, or a fatal error occurs.
    pub async fn run(&mut self) -> Result<StopReason, RelayError> {
        loop {
            let interest = self.state.interest();
            trace!(?interest, "waiting for readiness");
            let event = tokio::select! {
                _ = self.shutdown.changed() => {
                    debug!("shutdown observed while waiting");
                    return Ok(StopReason::ShutdownRequested);
                }
                event = self.endpoints.wait(interest) => event?,
            };
            if let Some(stop) = self.service(event).await? {
                return Ok(stop);
            }
        }
    }

    /// Service exactly one ready event.
    async fn service(&mut self, event: ReadyEvent) -> Result<Option<StopReason>, RelayError> {
        match event {
            ReadyEvent::InputReadable => {
                let n = self
                    .endpoints
                    .read(EndpointRole::InputSource, self.state.inbound.fill_space())
                    .await?;
                if n == 0 {
                    info!(endpoint = %EndpointRole::InputSource, "End of stream");
                    return Ok(Some(StopReason::EndOfStream(EndpointRole::InputSource)));
                }
                self.state.inbound.filled(n);
                trace!(bytes = n, "input source -> inbound buffer");
            }
            ReadyEvent::DeviceWritable => {
                let n = self
                    .endpoints
                    .write(EndpointRole::Device, self.state.inbound.pending())
                    .await?;
                self.state.inbound.drained(n);
                trace!(bytes = n, drained = self.state.inbound.is_empty(), "inbound buffer -> device");
            }
            ReadyEvent::DeviceReadable => {
                let n = self
                    .endpoints
                    .read(EndpointRole::Device, self.state.outbound.fill_space())
                    .await?;
                if n == 0 {
                    info!(endpoint = %EndpointRole::Device, "End of stream");
                    return Ok(Some(StopReason::EndOfStream(EndpointRole::Device)));
                }
                self.state.outbound.filled(n);
                trace!(bytes = n, "device -> outbound buffer");
            }
            ReadyEvent::OutputWritable => {
                let n = self
                    .endpoints
                    .write(EndpointRole::OutputSink, self.state.outbound.pending())
                    .await?;
                self.state.outbound.drained(n);
                trace!(bytes = n, drained = self.state.outbound.is_empty(), "outbound buffer -> output sink");
            }
        }
        Ok(None)
    }
}
