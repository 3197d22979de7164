//! Growable accumulation buffer for the header line being parsed.
//!
//! The buffer holds the lowercased header name immediately followed by its
//! value. Storage comes from a [`ScratchAllocator`] so callers can account for
//! or redirect the allocations; [`SystemAllocator`] uses the global allocator.
//!
//! Capacity grows geometrically (`max(requested, 64, capacity * 3 / 2)`) and is
//! never given back while a response is being parsed. [`ScratchBuffer::release`]
//! returns the storage to the allocator; it also runs on drop.

use std::mem;

use tracing::trace;

/// Smallest capacity ever requested from the allocator.
pub const MIN_SCRATCH_CAPACITY: usize = 64;

/// Allocation hooks used by [`ScratchBuffer`].
pub trait ScratchAllocator {
    /// Returns an empty vector with a capacity of at least `capacity` bytes.
    ///
    /// A shorter vector would later be regrown by the global allocator behind
    /// these hooks, so it is treated as a bug in the allocator.
    fn allocate(&mut self, capacity: usize) -> Vec<u8>;

    /// Takes back storage previously returned by [`allocate`](Self::allocate).
    fn release(&mut self, buf: Vec<u8>);
}

/// Allocates scratch storage from the global allocator.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

impl ScratchAllocator for SystemAllocator {
    fn allocate(&mut self, capacity: usize) -> Vec<u8> {
        Vec::with_capacity(capacity)
    }

    fn release(&mut self, buf: Vec<u8>) {
        drop(buf);
    }
}

impl<A: ScratchAllocator + ?Sized> ScratchAllocator for &mut A {
    fn allocate(&mut self, capacity: usize) -> Vec<u8> {
        (**self).allocate(capacity)
    }

    fn release(&mut self, buf: Vec<u8>) {
        (**self).release(buf);
    }
}

#[derive(Debug)]
pub struct ScratchBuffer<A: ScratchAllocator = SystemAllocator> {
    buf: Vec<u8>,
    /// Capacity requested from the allocator, 0 while unallocated
    capacity: usize,
    allocator: A,
}

impl Default for ScratchBuffer {
    fn default() -> Self {
        Self::new(SystemAllocator)
    }
}

impl<A: ScratchAllocator> ScratchBuffer<A> {
    /// Creates an unallocated buffer.
    pub fn new(allocator: A) -> Self {
        Self { buf: Vec::new(), capacity: 0, allocator }
    }

    /// Grows the buffer so it can hold at least `minimum` bytes.
    ///
    /// Existing bytes are copied into the new storage and the old storage is
    /// handed back to the allocator.
    pub fn ensure_capacity(&mut self, minimum: usize) {
        if self.capacity >= minimum {
            return;
        }

        let target = minimum.max(MIN_SCRATCH_CAPACITY).max(self.capacity.saturating_mul(3) / 2);
        trace!(from = self.capacity, to = target, "grow scratch buffer");

        let mut grown = self.allocator.allocate(target);
        debug_assert!(
            grown.capacity() >= target,
            "scratch allocator returned {} bytes, {target} requested",
            grown.capacity()
        );
        grown.extend_from_slice(&self.buf);
        let old = mem::replace(&mut self.buf, grown);
        if self.capacity > 0 {
            self.allocator.release(old);
        }
        self.capacity = target;
    }

    pub fn push(&mut self, byte: u8) {
        self.ensure_capacity(self.buf.len() + 1);
        self.buf.push(byte);
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Capacity currently held, 0 when the buffer is unallocated.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forgets the content but keeps the storage.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Hands the storage back to the allocator.
    pub fn release(&mut self) {
        if self.capacity == 0 {
            return;
        }

        trace!(capacity = self.capacity, "release scratch buffer");
        let buf = mem::take(&mut self.buf);
        self.allocator.release(buf);
        self.capacity = 0;
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }
}

impl<A: ScratchAllocator> Drop for ScratchBuffer<A> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Counts allocations and releases.
    #[derive(Debug, Default)]
    pub(crate) struct CountingAllocator {
        pub(crate) allocations: usize,
        pub(crate) releases: usize,
    }

    impl CountingAllocator {
        /// Number of buffers handed out and not yet released.
        pub(crate) fn outstanding(&self) -> usize {
            self.allocations - self.releases
        }
    }

    impl ScratchAllocator for CountingAllocator {
        fn allocate(&mut self, capacity: usize) -> Vec<u8> {
            self.allocations += 1;
            Vec::with_capacity(capacity)
        }

        fn release(&mut self, buf: Vec<u8>) {
            self.releases += 1;
            drop(buf);
        }
    }

    /// Hands out vectors without any capacity.
    #[derive(Debug, Default)]
    struct ShortAllocator;

    impl ScratchAllocator for ShortAllocator {
        fn allocate(&mut self, _capacity: usize) -> Vec<u8> {
            Vec::new()
        }

        fn release(&mut self, buf: Vec<u8>) {
            drop(buf);
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "scratch allocator returned 0 bytes, 64 requested")]
    fn test_short_allocation_is_rejected() {
        let mut scratch = ScratchBuffer::new(ShortAllocator);
        scratch.push(b'a');
    }

    #[test]
    fn test_unallocated_until_used() {
        let scratch = ScratchBuffer::default();
        assert_eq!(scratch.capacity(), 0);
        assert!(scratch.is_empty());
    }

    #[test]
    fn test_growth_policy() {
        let mut scratch = ScratchBuffer::new(CountingAllocator::default());

        scratch.ensure_capacity(1);
        assert_eq!(scratch.capacity(), 64);

        scratch.ensure_capacity(65);
        assert_eq!(scratch.capacity(), 96);

        scratch.ensure_capacity(97);
        assert_eq!(scratch.capacity(), 144);

        scratch.ensure_capacity(1000);
        assert_eq!(scratch.capacity(), 1000);

        // no shrinking
        scratch.ensure_capacity(10);
        assert_eq!(scratch.capacity(), 1000);
        assert_eq!(scratch.allocator().allocations, 4);
        assert_eq!(scratch.allocator().releases, 3);
    }

    #[test]
    fn test_growth_preserves_bytes() {
        let mut scratch = ScratchBuffer::default();
        for b in (0..=255u8).cycle().take(1000) {
            scratch.push(b);
        }

        assert_eq!(scratch.len(), 1000);
        assert!(scratch.as_slice().iter().zip((0..=255u8).cycle()).all(|(a, b)| *a == b));
    }

    #[test]
    fn test_logarithmic_allocations() {
        let mut scratch = ScratchBuffer::new(CountingAllocator::default());
        for _ in 0..100_000 {
            scratch.push(b'x');
        }

        // 64 grown by 1.5 passes 100_000 after 19 steps
        assert!(scratch.allocator().allocations <= 20);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut scratch = ScratchBuffer::default();
        scratch.push(b'a');
        scratch.clear();

        assert!(scratch.is_empty());
        assert_eq!(scratch.capacity(), 64);
    }

    #[test]
    fn test_release() {
        let mut allocator = CountingAllocator::default();
        {
            let mut scratch = ScratchBuffer::new(&mut allocator);
            scratch.push(b'a');
            scratch.release();
            assert_eq!(scratch.capacity(), 0);
            assert!(scratch.is_empty());

            // release twice is a no-op
            scratch.release();
        }
        assert_eq!(allocator.allocations, 1);
        assert_eq!(allocator.releases, 1);
    }

    #[test]
    fn test_release_on_drop() {
        let mut allocator = CountingAllocator::default();
        {
            let mut scratch = ScratchBuffer::new(&mut allocator);
            scratch.ensure_capacity(200);
        }
        assert_eq!(allocator.allocations, 1);
        assert_eq!(allocator.outstanding(), 0);
    }
}
