//! Endpoint set: readiness waits and non-blocking I/O over three handles.
//!
//! The production implementation registers the handles with tokio's reactor
//! through [`AsyncFd`]; the engine is written against the [`Endpoints`]
//! trait so tests can drive it with scripted endpoints instead.

use std::fs::File;
use std::io::{self, Read, Write};

use tokio::io::Interest as IoInterest;
use tokio::io::unix::AsyncFd;

use devmux_core::error::RelayError;
use devmux_core::state::{Direction, EndpointRole, Interest, InterestSet, ReadyEvent};

/// Readiness and I/O operations the relay engine needs from its handles.
///
/// `wait` blocks until exactly one entry of the interest set is ready and
/// reports which. `read`/`write` perform a single operation on the named
/// endpoint; transient failures (would-block, interrupted) are retried
/// internally and never surface.
#[allow(async_fn_in_trait)] // single-threaded engine, futures never cross tasks
pub trait Endpoints {
    /// Block until one entry of `interest` is ready.
    async fn wait(&mut self, interest: InterestSet) -> Result<ReadyEvent, RelayError>;

    /// One read into `buf`. Returns 0 at end-of-stream.
    async fn read(&mut self, role: EndpointRole, buf: &mut [u8]) -> Result<usize, RelayError>;

    /// One write from `buf`; may consume fewer bytes than offered.
    async fn write(&mut self, role: EndpointRole, buf: &[u8]) -> Result<usize, RelayError>;
}

/// The three relay handles, registered with the tokio reactor.
pub struct FdEndpoints {
    input: AsyncFd<File>,
    device: AsyncFd<File>,
    output: AsyncFd<File>,
}

impl FdEndpoints {
    /// Register the handles with the reactor. All three must already be in
    /// non-blocking mode (see [`crate::setup::set_nonblocking`]).
    pub fn new(input: File, device: File, output: File) -> io::Result<Self> {
        Ok(Self {
            input: AsyncFd::with_interest(input, IoInterest::READABLE)?,
            device: AsyncFd::new(device)?,
            output: AsyncFd::with_interest(output, IoInterest::WRITABLE)?,
        })
    }

    fn fd(&self, role: EndpointRole) -> &AsyncFd<File> {
        match role {
            EndpointRole::InputSource => &self.input,
            EndpointRole::Device => &self.device,
            EndpointRole::OutputSink => &self.output,
        }
    }

    /// Resolve once `want` is ready. The readiness guard is dropped without
    /// clearing, so the kernel state stays cached for the I/O call that
    /// follows; a stale notification is cleared there on would-block.
    async fn ready(&self, want: Interest) -> Result<ReadyEvent, RelayError> {
        let fd = self.fd(want.role());
        let _ = match want.direction() {
            Direction::Read => fd.readable().await.map_err(RelayError::Multiplex)?,
            Direction::Write => fd.writable().await.map_err(RelayError::Multiplex)?,
        };
        Ok(want.fired())
    }
}

impl Endpoints for FdEndpoints {
    async fn wait(&mut self, interest: InterestSet) -> Result<ReadyEvent, RelayError> {
        let [first, second] = interest.entries();
        tokio::select! {
            event = self.ready(first) => event,
            event = self.ready(second) => event,
        }
    }

    async fn read(&mut self, role: EndpointRole, buf: &mut [u8]) -> Result<usize, RelayError> {
        self.fd(role)
            .async_io(IoInterest::READABLE, |file| {
                let mut file = file; // Read is implemented for &File
                loop {
                    match file.read(buf) {
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                        result => return result,
                    }
                }
            })
            .await
            .map_err(|source| RelayError::Io {
                endpoint: role,
                direction: Direction::Read,
                source,
            })
    }

    async fn write(&mut self, role: EndpointRole, buf: &[u8]) -> Result<usize, RelayError> {
        self.fd(role)
            .async_io(IoInterest::WRITABLE, |file| {
                let mut file = file; // Write is implemented for &File
                loop {
                    match file.write(buf) {
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                        result => return result,
                    }
                }
            })
            .await
            .map_err(|source| RelayError::Io {
                endpoint: role,
                direction: Direction::Write,
                source,
            })
    }
}
