//! Fixed-capacity ring buffer with an adjustable sliding window.
//!
//! Stores squared samples in a circular fashion for the block RMS
//! estimator. The capacity is fixed when the buffer is created; the
//! *active size* selects how many of the most recent values form the
//! window and may change at runtime, as long as it stays within capacity.

use crate::error::{Error, Result};

/// A fixed-capacity ring buffer of squared samples.
///
/// Implements a circular buffer that:
/// * Allocates its storage once, at construction
/// * Retains at most `active_size` of the most recently pushed values
/// * Evicts the oldest values once the window is full
/// * Can be resized within its capacity without reallocating
///
/// Indices wrap modulo the capacity, not the active size, so resizing never
/// strands or aliases stored values.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    /// The underlying storage, `capacity` slots long
    buffer: Box<[u32]>,

    /// Position of the oldest stored value
    head: usize,

    /// Number of values currently stored
    len: usize,

    /// Number of values that make up a full window
    active_size: usize,
}

impl RingBuffer {
    /// Creates an empty ring buffer with room for `capacity` values.
    ///
    /// The active size starts out equal to the capacity.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::invalid_argument(
                "ring buffer capacity must be at least one",
            ));
        }

        Ok(Self {
            buffer: vec![0; capacity].into_boxed_slice(),
            head: 0,
            len: 0,
            active_size: capacity,
        })
    }

    /// Returns the fixed number of slots in the buffer.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Returns the current window length.
    #[must_use]
    #[inline]
    pub fn active_size(&self) -> usize {
        self.active_size
    }

    /// Returns the number of values currently stored.
    ///
    /// May briefly exceed the active size after the window has been shrunk,
    /// until the next [`push_pop`](Self::push_pop).
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sets the window length.
    ///
    /// Stored values are left in place: shrinking defers eviction of the
    /// surplus to the next [`push_pop`](Self::push_pop), and growing lets the
    /// window refill with new values.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` if `size` is zero or exceeds the capacity.
    pub fn set_active_size(&mut self, size: usize) -> Result<()> {
        if size == 0 || size > self.capacity() {
            return Err(Error::out_of_range(format!(
                "window of {size} samples does not fit ring buffer capacity of {}",
                self.capacity()
            )));
        }

        self.active_size = size;
        Ok(())
    }

    /// Appends a value after the most recent one.
    ///
    /// Does not evict: when the buffer is completely full, the oldest value
    /// is overwritten and lost.
    pub fn push(&mut self, value: u32) {
        let capacity = self.capacity();
        if self.len == capacity {
            self.head = (self.head + 1) % capacity;
            self.len -= 1;
        }

        self.buffer[(self.head + self.len) % capacity] = value;
        self.len += 1;
    }

    /// Removes and returns the oldest value.
    ///
    /// # Returns
    ///
    /// The oldest stored value, or `None` if the buffer is empty
    pub fn pop(&mut self) -> Option<u32> {
        if self.len == 0 {
            return None;
        }

        let value = self.buffer[self.head];
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;
        Some(value)
    }

    /// Pushes a value and evicts whatever no longer fits the window.
    ///
    /// Normally evicts exactly one value once the window is full. Right after
    /// the window was shrunk, evicts the whole surplus at once.
    ///
    /// # Returns
    ///
    /// The sum of the evicted values, or 0 while the window is still filling
    pub fn push_pop(&mut self, value: u32) -> u64 {
        let mut evicted = 0;
        while self.len >= self.active_size {
            // len >= active_size >= 1, so there is always something to pop
            evicted += self.pop().map_or(0, u64::from);
        }

        self.push(value);
        evicted
    }

    /// Returns the sum of the stored values.
    ///
    /// Walks the whole window; meant for diagnostics and verification, not
    /// for the per-sample path.
    #[must_use]
    pub fn sum(&self) -> u64 {
        self.iter().map(u64::from).sum()
    }

    /// Iterates over the stored values from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        let capacity = self.capacity();
        (0..self.len).map(move |i| self.buffer[(self.head + i) % capacity])
    }

    /// Resets the buffer to its initial state.
    ///
    /// Sets all values to zero and empties the window. The active size is
    /// kept.
    pub fn reset(&mut self) {
        self.buffer.fill(0);
        self.head = 0;
        self.len = 0;
    }
}
