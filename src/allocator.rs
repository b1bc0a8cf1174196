//! Slot allocation facility consumed by the containers.
//!
//! Stable Rust does not expose the `Allocator` trait, so containers are generic
//! over [`SlotAllocator`], a fallible `allocate` / `release` pair. Two
//! implementations ship with the crate:
//!
//! * [`Heap`]: pass-through to the global allocator.
//! * [`CountingAllocator`]: wraps [`Heap`], records every call and can be armed
//!   to refuse requests. Clones share their counters, so a handle kept outside
//!   a container keeps observing it.

use std::alloc::{Layout, alloc, dealloc};
use std::ptr::NonNull;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::AllocError;

/// A source of raw memory regions.
///
/// Containers never pass a zero-sized layout; zero-sized requests are served
/// with a dangling pointer without consulting the allocator.
pub trait SlotAllocator {
    /// Returns a region fitting `layout`, or [`AllocError`] if none is available.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Returns a region to the allocator.
    ///
    /// # Safety
    /// `ptr` must come from a previous `allocate` on this allocator (or a clone
    /// sharing its backing) with the same `layout`, and must not be used again.
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The process-wide global allocator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Heap;

impl SlotAllocator for Heap {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(layout.size() != 0);
        NonNull::new(unsafe { alloc(layout) }).ok_or(AllocError)
    }

    #[inline]
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { dealloc(ptr.as_ptr(), layout) }
    }
}

const UNLIMITED: usize = usize::MAX;

#[derive(Debug)]
struct Counters {
    allocations: AtomicUsize,
    releases: AtomicUsize,
    live_bytes: AtomicUsize,
    /// Allocations still allowed to succeed; `UNLIMITED` disables the limit.
    remaining: AtomicUsize,
}

/// Instrumented allocator that counts calls and can inject failures.
///
/// ```
/// use scratch_collections::{CountingAllocator, GrowableBuffer};
///
/// let alloc = CountingAllocator::new();
/// let mut buf = GrowableBuffer::new_in(alloc.clone()).unwrap();
/// assert_eq!(alloc.allocations(), 1);
///
/// alloc.deny();
/// for i in 0..10 {
///     buf.push_back(i).unwrap();
/// }
/// assert!(buf.push_back(10).is_err());
/// assert_eq!(buf.len(), 10);
/// ```
#[derive(Debug, Clone)]
pub struct CountingAllocator {
    counters: Arc<Counters>,
}

impl CountingAllocator {
    pub fn new() -> Self {
        Self {
            counters: Arc::new(Counters {
                allocations: AtomicUsize::new(0),
                releases: AtomicUsize::new(0),
                live_bytes: AtomicUsize::new(0),
                remaining: AtomicUsize::new(UNLIMITED),
            }),
        }
    }

    /// Lets the next `n` allocations succeed and refuses every one after.
    pub fn fail_after(&self, n: usize) {
        self.counters.remaining.store(n, Ordering::SeqCst);
    }

    /// Refuses every allocation until [`allow`](Self::allow) is called.
    pub fn deny(&self) {
        self.fail_after(0);
    }

    /// Lifts any failure injection.
    pub fn allow(&self) {
        self.counters.remaining.store(UNLIMITED, Ordering::SeqCst);
    }

    /// Number of successful allocations.
    pub fn allocations(&self) -> usize {
        self.counters.allocations.load(Ordering::SeqCst)
    }

    /// Number of regions handed back.
    pub fn releases(&self) -> usize {
        self.counters.releases.load(Ordering::SeqCst)
    }

    /// Bytes currently allocated and not yet released.
    pub fn live_bytes(&self) -> usize {
        self.counters.live_bytes.load(Ordering::SeqCst)
    }

    fn consume_permit(&self) -> bool {
        self.counters
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                UNLIMITED => Some(UNLIMITED),
                0 => None,
                n => Some(n - 1),
            })
            .is_ok()
    }
}

impl Default for CountingAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotAllocator for CountingAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if !self.consume_permit() {
            return Err(AllocError);
        }
        let ptr = Heap.allocate(layout)?;
        self.counters.allocations.fetch_add(1, Ordering::SeqCst);
        self.counters
            .live_bytes
            .fetch_add(layout.size(), Ordering::SeqCst);
        Ok(ptr)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        self.counters.releases.fetch_add(1, Ordering::SeqCst);
        self.counters
            .live_bytes
            .fetch_sub(layout.size(), Ordering::SeqCst);
        unsafe { Heap.release(ptr, layout) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_heap_round_trip() {
        let layout = Layout::array::<u64>(4).unwrap();
        let ptr = Heap.allocate(layout).unwrap();
        unsafe {
            let slots = ptr.cast::<u64>().as_ptr();
            for i in 0..4 {
                slots.add(i).write(i as u64 * 3);
            }
            assert_eq!(*slots.add(3), 9);
            Heap.release(ptr, layout);
        }
    }

    #[test]
    fn test_alloc_counting_tracks_calls() {
        let alloc = CountingAllocator::new();
        let layout = Layout::array::<u32>(8).unwrap();
        let a = alloc.allocate(layout).unwrap();
        let b = alloc.allocate(layout).unwrap();
        assert_eq!(alloc.allocations(), 2);
        assert_eq!(alloc.live_bytes(), 64);
        unsafe {
            alloc.release(a, layout);
            alloc.release(b, layout);
        }
        assert_eq!(alloc.releases(), 2);
        assert_eq!(alloc.live_bytes(), 0);
    }

    #[test]
    fn test_alloc_counting_fail_after() {
        let alloc = CountingAllocator::new();
        let layout = Layout::new::<u64>();
        alloc.fail_after(1);
        let ok = alloc.allocate(layout).unwrap();
        assert_eq!(alloc.allocate(layout), Err(AllocError));
        assert_eq!(alloc.allocations(), 1);

        alloc.allow();
        let again = alloc.allocate(layout).unwrap();
        unsafe {
            alloc.release(ok, layout);
            alloc.release(again, layout);
        }
    }

    #[test]
    fn test_alloc_counting_clones_share_state() {
        let alloc = CountingAllocator::new();
        let handle = alloc.clone();
        handle.deny();
        assert!(alloc.allocate(Layout::new::<u8>()).is_err());
        alloc.allow();
        let layout = Layout::new::<u8>();
        let ptr = alloc.allocate(layout).unwrap();
        assert_eq!(handle.allocations(), 1);
        unsafe { alloc.release(ptr, layout) };
    }
}
