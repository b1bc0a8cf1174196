//! Mutex-guarded wrapper around [`GrowableBuffer`].
//!
//! The core buffer stays lock-free; [`SynchronizedBuffer`] adds one
//! `parking_lot::Mutex` per instance and holds it for the whole of each call.
//! The guard releases the lock on every exit path, including error returns and
//! unwinding (parking_lot locks do not poison).

use std::mem;

use parking_lot::{Mutex, MutexGuard};

use crate::allocator::{Heap, SlotAllocator};
use crate::error::Result;
use crate::vecs::growable_buffer::GrowableBuffer;

/// A [`GrowableBuffer`] shareable between threads.
///
/// Accessors return clones because references cannot outlive the lock. For
/// compound operations, or to iterate, hold the guard from
/// [`lock`](Self::lock); iterators borrowed from that guard are protected only
/// while it lives.
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
/// use scratch_collections::SynchronizedBuffer;
///
/// let shared = Arc::new(SynchronizedBuffer::new()?);
/// let handles: Vec<_> = (0..4)
///     .map(|t| {
///         let shared = Arc::clone(&shared);
///         thread::spawn(move || shared.push_back(t))
///     })
///     .collect();
/// for h in handles {
///     h.join().unwrap()?;
/// }
/// assert_eq!(shared.len(), 4);
/// # Ok::<(), scratch_collections::CollectionError>(())
/// ```
pub struct SynchronizedBuffer<T, A: SlotAllocator = Heap> {
    inner: Mutex<GrowableBuffer<T, A>>,
}

impl<T> SynchronizedBuffer<T> {
    pub fn new() -> Result<Self> {
        Ok(Self::from_buffer(GrowableBuffer::new()?))
    }

    pub fn with_fill(value: T, n: usize) -> Result<Self>
    where
        T: Clone,
    {
        Ok(Self::from_buffer(GrowableBuffer::with_fill(value, n)?))
    }
}

impl<T, A: SlotAllocator> SynchronizedBuffer<T, A> {
    pub fn from_buffer(buffer: GrowableBuffer<T, A>) -> Self {
        Self {
            inner: Mutex::new(buffer),
        }
    }

    /// Locks the buffer for a compound operation.
    pub fn lock(&self) -> MutexGuard<'_, GrowableBuffer<T, A>> {
        self.inner.lock()
    }

    pub fn into_inner(self) -> GrowableBuffer<T, A> {
        self.inner.into_inner()
    }

    pub fn push_back(&self, value: T) -> Result<()> {
        self.inner.lock().push_back(value)
    }

    pub fn pop_back(&self) -> Result<T> {
        self.inner.lock().pop_back()
    }

    pub fn clear(&self) -> Result<()> {
        self.inner.lock().clear()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn at(&self, index: usize) -> Result<T>
    where
        T: Clone,
    {
        self.inner.lock().at(index).cloned()
    }

    pub fn front(&self) -> Result<T>
    where
        T: Clone,
    {
        self.inner.lock().front().cloned()
    }

    pub fn back(&self) -> Result<T>
    where
        T: Clone,
    {
        self.inner.lock().back().cloned()
    }

    /// Deep copy of the current contents.
    pub fn snapshot(&self) -> Result<GrowableBuffer<T, A>>
    where
        T: Clone,
        A: Clone,
    {
        self.inner.lock().try_clone()
    }

    /// Copy-assignment with the strong guarantee.
    ///
    /// The copy is built once, in a region from this buffer's allocator, while
    /// only the source is locked. It then replaces the old contents under this
    /// buffer's lock, so the two locks are never held together and buffers
    /// assigned to each other from different threads cannot deadlock.
    /// Assigning a buffer to itself does nothing.
    pub fn assign_from(&self, source: &Self) -> Result<()>
    where
        T: Clone,
        A: Clone,
    {
        if std::ptr::eq(self, source) {
            return Ok(());
        }
        let alloc = self.inner.lock().allocator().clone();
        let mut staged = GrowableBuffer::empty_in(alloc);
        staged.clone_from_buffer(&*source.inner.lock())?;
        drop(mem::replace(&mut *self.inner.lock(), staged));
        Ok(())
    }
}

impl<T: PartialEq, A: SlotAllocator> PartialEq for SynchronizedBuffer<T, A> {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        // Address order keeps concurrent `a == b` and `b == a` from deadlocking.
        let (first, second) = if (self as *const Self) < (other as *const Self) {
            (self, other)
        } else {
            (other, self)
        };
        let first = first.inner.lock();
        let second = second.inner.lock();
        *first == *second
    }
}

impl<T: std::fmt::Debug, A: SlotAllocator> std::fmt::Debug for SynchronizedBuffer<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SynchronizedBuffer")
            .field(&*self.inner.lock())
            .finish()
    }
}
