//! Relay state machine: buffers, interests, and ready events.
//!
//! The relay owns two buffers. Each loop iteration derives one interest per
//! buffer from its empty/draining state, waits until exactly one interest
//! fires, and services that event. Intent (`InterestSet`) and outcome
//! (`ReadyEvent`) are deliberately separate types so the two roles can never
//! share storage.

use std::fmt;

use crate::buffer::RelayBuffer;

/// The three endpoints the relay moves bytes between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRole {
    /// Read-only pipe users write into.
    InputSource,
    /// Read-write device handle.
    Device,
    /// Write-only pipe users read from.
    OutputSink,
}

impl fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputSource => write!(f, "input source"),
            Self::Device => write!(f, "device"),
            Self::OutputSink => write!(f, "output sink"),
        }
    }
}

/// Direction of an I/O operation on an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// A single (endpoint, direction) pair the relay wants readiness for.
///
/// Only the four combinations the loop can actually use exist, so an
/// interest for e.g. writing the input source is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interest {
    /// Input source has bytes for the inbound buffer.
    InputRead,
    /// Device can accept bytes from the inbound buffer.
    DeviceWrite,
    /// Device has bytes for the outbound buffer.
    DeviceRead,
    /// Output sink can accept bytes from the outbound buffer.
    OutputWrite,
}

impl Interest {
    pub fn role(self) -> EndpointRole {
        match self {
            Self::InputRead => EndpointRole::InputSource,
            Self::DeviceWrite | Self::DeviceRead => EndpointRole::Device,
            Self::OutputWrite => EndpointRole::OutputSink,
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Self::InputRead | Self::DeviceRead => Direction::Read,
            Self::DeviceWrite | Self::OutputWrite => Direction::Write,
        }
    }

    /// The event reported when this interest fires.
    pub fn fired(self) -> ReadyEvent {
        match self {
            Self::InputRead => ReadyEvent::InputReadable,
            Self::DeviceWrite => ReadyEvent::DeviceWritable,
            Self::DeviceRead => ReadyEvent::DeviceReadable,
            Self::OutputWrite => ReadyEvent::OutputWritable,
        }
    }
}

/// The readiness the relay asks for on one iteration: exactly one interest
/// per buffer.
///
/// The device may appear twice -- once for read on behalf of the outbound
/// buffer and once for write on behalf of the inbound buffer. Those are
/// independent entries; the set never holds two entries for the same
/// (endpoint, direction) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterestSet {
    /// What the inbound (input source -> device) buffer needs next.
    pub inbound: Interest,
    /// What the outbound (device -> output sink) buffer needs next.
    pub outbound: Interest,
}

impl InterestSet {
    pub fn entries(self) -> [Interest; 2] {
        [self.inbound, self.outbound]
    }
}

/// Exactly one readiness notification, reported by the multiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyEvent {
    InputReadable,
    DeviceWritable,
    DeviceReadable,
    OutputWritable,
}

/// Buffer state owned exclusively by the relay engine.
#[derive(Debug)]
pub struct RelayState {
    /// Bytes read from the input source, pending write to the device.
    pub inbound: RelayBuffer,
    /// Bytes read from the device, pending write to the output sink.
    pub outbound: RelayBuffer,
}

impl RelayState {
    /// Two empty buffers of `capacity` bytes each.
    pub fn new(capacity: usize) -> Self {
        Self {
            inbound: RelayBuffer::new(capacity),
            outbound: RelayBuffer::new(capacity),
        }
    }

    /// Recompute the interest set from the current buffer states.
    ///
    /// An empty buffer wants its source readable; a draining buffer wants
    /// its destination writable.
    pub fn interest(&self) -> InterestSet {
        InterestSet {
            inbound: if self.inbound.is_empty() {
                Interest::InputRead
            } else {
                Interest::DeviceWrite
            },
            outbound: if self.outbound.is_empty() {
                Interest::DeviceRead
            } else {
                Interest::OutputWrite
            },
        }
    }
}
