//! Fixed-capacity relay buffer.
//!
//! Each relay direction owns one `RelayBuffer`. A buffer is either *empty*
//! (ready to be filled by a single read) or *draining* (holding bytes that
//! still have to be written out, possibly across several partial writes).
//! The distinction is derived from `occupied`/`offset`, never stored
//! separately.

/// Byte buffer with a fixed capacity and a drain cursor.
///
/// Invariant: `0 <= offset <= occupied <= capacity` after every transition.
#[derive(Debug)]
pub struct RelayBuffer {
    data: Box<[u8]>,
    /// Bytes currently held, counted from the start of `data`.
    occupied: usize,
    /// Bytes already drained out of `occupied`.
    offset: usize,
}

impl RelayBuffer {
    /// Create an empty buffer holding at most `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "relay buffer needs a non-zero capacity");
        Self {
            data: vec![0; capacity].into_boxed_slice(),
            occupied: 0,
            offset: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// An empty buffer has nothing left to drain.
    pub fn is_empty(&self) -> bool {
        self.offset == self.occupied
    }

    /// Writable view for a fill. Only valid while empty; a fill always
    /// starts from the beginning of the buffer.
    pub fn fill_space(&mut self) -> &mut [u8] {
        debug_assert!(self.is_empty(), "fill while draining would clobber pending bytes");
        &mut self.data[..]
    }

    /// Record that a read deposited `n` bytes into [`Self::fill_space`].
    pub fn filled(&mut self, n: usize) {
        debug_assert!(self.is_empty());
        debug_assert!(n <= self.capacity());
        self.occupied = n;
        self.offset = 0;
    }

    /// Bytes still waiting to be written out.
    pub fn pending(&self) -> &[u8] {
        &self.data[self.offset..self.occupied]
    }

    /// Record that a write consumed `n` bytes of [`Self::pending`].
    ///
    /// Reaching empty resets both counters to zero so the storage can be
    /// reused for the next fill.
    pub fn drained(&mut self, n: usize) {
        debug_assert!(n <= self.occupied - self.offset);
        self.offset += n;
        if self.offset == self.occupied {
            self.occupied = 0;
            self.offset = 0;
        }
    }
}
