//! Mutex-guarded wrappers around the linked lists.
//!
//! Each wrapper owns one `parking_lot::Mutex` and holds it for the whole of a
//! call, in the same shape as
//! [`SynchronizedBuffer`](crate::SynchronizedBuffer). Accessors hand out
//! clones; hold the guard from `lock` to iterate or to chain operations.

use parking_lot::{Mutex, MutexGuard};

use crate::error::Result;
use crate::lists::doubly::DoublyLinkedList;
use crate::lists::singly::SinglyLinkedList;

/// A [`SinglyLinkedList`] shareable between threads.
///
/// ```
/// use std::thread;
/// use scratch_collections::SynchronizedSinglyList;
///
/// let shared = SynchronizedSinglyList::new();
/// thread::scope(|s| {
///     for t in 0..4 {
///         let shared = &shared;
///         s.spawn(move || shared.push_front(t));
///     }
/// });
/// assert_eq!(shared.len(), 4);
/// assert!(shared.contains(&3));
/// ```
pub struct SynchronizedSinglyList<T> {
    inner: Mutex<SinglyLinkedList<T>>,
}

impl<T> SynchronizedSinglyList<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SinglyLinkedList::new()),
        }
    }

    pub fn from_list(list: SinglyLinkedList<T>) -> Self {
        Self {
            inner: Mutex::new(list),
        }
    }

    /// Locks the list for a compound operation.
    pub fn lock(&self) -> MutexGuard<'_, SinglyLinkedList<T>> {
        self.inner.lock()
    }

    pub fn into_inner(self) -> SinglyLinkedList<T> {
        self.inner.into_inner()
    }

    pub fn push_back(&self, value: T) {
        self.inner.lock().push_back(value);
    }

    pub fn push_front(&self, value: T) {
        self.inner.lock().push_front(value);
    }

    pub fn pop_front(&self) -> Option<T> {
        self.inner.lock().pop_front()
    }

    pub fn pop_back(&self) -> Option<T> {
        self.inner.lock().pop_back()
    }

    pub fn front(&self) -> Option<T>
    where
        T: Clone,
    {
        self.inner.lock().front().cloned()
    }

    pub fn back(&self) -> Option<T>
    where
        T: Clone,
    {
        self.inner.lock().back().cloned()
    }

    /// Whether an element equal to `value` is present.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.inner.lock().search(value).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Deep copy of the current contents.
    pub fn snapshot(&self) -> SinglyLinkedList<T>
    where
        T: Clone,
    {
        self.inner.lock().clone()
    }
}

impl<T> Default for SynchronizedSinglyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for SynchronizedSinglyList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SynchronizedSinglyList")
            .field(&*self.inner.lock())
            .finish()
    }
}

/// A [`DoublyLinkedList`] shareable between threads.
///
/// Pushes stay fallible because the arena may have to grow; the lock is
/// released on the error path like on any other.
pub struct SynchronizedDoublyList<T> {
    inner: Mutex<DoublyLinkedList<T>>,
}

impl<T> SynchronizedDoublyList<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(DoublyLinkedList::new()),
        }
    }

    pub fn with_fill(value: T, n: usize) -> Result<Self>
    where
        T: Clone,
    {
        Ok(Self::from_list(DoublyLinkedList::with_fill(value, n)?))
    }

    pub fn from_list(list: DoublyLinkedList<T>) -> Self {
        Self {
            inner: Mutex::new(list),
        }
    }

    /// Locks the list for a compound operation.
    pub fn lock(&self) -> MutexGuard<'_, DoublyLinkedList<T>> {
        self.inner.lock()
    }

    pub fn into_inner(self) -> DoublyLinkedList<T> {
        self.inner.into_inner()
    }

    pub fn push_back(&self, value: T) -> Result<()> {
        self.inner.lock().push_back(value)
    }

    pub fn push_front(&self, value: T) -> Result<()> {
        self.inner.lock().push_front(value)
    }

    pub fn pop_back(&self) -> Option<T> {
        self.inner.lock().pop_back()
    }

    pub fn pop_front(&self) -> Option<T> {
        self.inner.lock().pop_front()
    }

    pub fn front(&self) -> Option<T>
    where
        T: Clone,
    {
        self.inner.lock().front().cloned()
    }

    pub fn back(&self) -> Option<T>
    where
        T: Clone,
    {
        self.inner.lock().back().cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Deep copy of the current contents.
    pub fn snapshot(&self) -> Result<DoublyLinkedList<T>>
    where
        T: Clone,
    {
        self.inner.lock().try_clone()
    }
}

impl<T> Default for SynchronizedDoublyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for SynchronizedDoublyList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SynchronizedDoublyList")
            .field(&*self.inner.lock())
            .finish()
    }
}
