//! Endpoint setup: FIFO creation and handle preparation.
//!
//! Everything here runs before the relay loop starts. The engine never
//! creates or paths handles itself; it only sees the three opened,
//! non-blocking files this module hands over.

use std::fs::{File, OpenOptions};
use std::path::Path;

use anyhow::{Context, bail};
use nix::errno::Errno;
use nix::fcntl::{FcntlArg, OFlag, fcntl};
use nix::sys::stat::{Mode, SFlag, stat};
use nix::unistd::mkfifo;
use tracing::info;

/// Create the FIFO at `path` with mode 0600 unless one is already there.
///
/// An existing path must already be a FIFO; anything else is refused rather
/// than clobbered.
pub fn ensure_fifo(path: &Path) -> anyhow::Result<()> {
    match stat(path) {
        Ok(st) => {
            let kind = SFlag::from_bits_truncate(st.st_mode) & SFlag::S_IFMT;
            if kind != SFlag::S_IFIFO {
                bail!("{} exists but is not a FIFO", path.display());
            }
            Ok(())
        }
        Err(Errno::ENOENT) => {
            mkfifo(path, Mode::S_IRUSR | Mode::S_IWUSR)
                .with_context(|| format!("mkfifo {}", path.display()))?;
            info!(path = %path.display(), "Created FIFO");
            Ok(())
        }
        Err(err) => Err(err).with_context(|| format!("stat {}", path.display())),
    }
}

/// Open the device read-write.
pub fn open_device(path: &Path) -> anyhow::Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .with_context(|| format!("open device {}", path.display()))
}

/// Open the input FIFO for reading. Blocks until a writer shows up.
pub fn open_input(path: &Path) -> anyhow::Result<File> {
    info!(path = %path.display(), "Waiting for a writer on the input pipe");
    File::open(path).with_context(|| format!("open input pipe {}", path.display()))
}

/// Open the output FIFO for writing. Blocks until a reader shows up.
pub fn open_output(path: &Path) -> anyhow::Result<File> {
    info!(path = %path.display(), "Waiting for a reader on the output pipe");
    OpenOptions::new()
        .write(true)
        .open(path)
        .with_context(|| format!("open output pipe {}", path.display()))
}

/// Switch an already-open handle to non-blocking mode so the readiness loop
/// can issue reads and writes without stalling.
pub fn set_nonblocking(file: &File) -> anyhow::Result<()> {
    let flags = fcntl(file, FcntlArg::F_GETFL).context("F_GETFL")?;
    let flags = OFlag::from_bits_truncate(flags) | OFlag::O_NONBLOCK;
    fcntl(file, FcntlArg::F_SETFL(flags)).context("F_SETFL")?;
    Ok(())
}
