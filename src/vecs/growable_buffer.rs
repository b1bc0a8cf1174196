//! Contiguous, owning, growable sequence with fallible allocation.
//!
//! [`GrowableBuffer`] stores `len` live elements at the front of a region of
//! `capacity` slots obtained from a [`SlotAllocator`]. Slots past `len` are
//! allocated but uninitialized. Every operation that needs memory reports
//! failure through [`CollectionError::Allocation`] and leaves the buffer exactly
//! as it was (strong guarantee).
//!
//! # Iterator invalidation
//! Any call that reallocates (`push_back` past capacity, `reserve`, `clear`,
//! `shrink_to_fit`, `clone_from_buffer`, `assign_from`) or changes the length
//! (`pop_back`, `truncate`) invalidates outstanding iterators and references.
//! The borrow checker rejects such programs: iterators borrow the buffer, and
//! all of those calls need `&mut self`.

use core::borrow::{Borrow, BorrowMut};
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::mem::{self, ManuallyDrop};
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};
use core::slice;
use std::alloc::{Layout, handle_alloc_error};

use tracing::{debug, trace};

use crate::allocator::{Heap, SlotAllocator};
use crate::error::{CollectionError, Result};

/// Capacity of a freshly constructed or cleared buffer.
pub const DEFAULT_CAPACITY: usize = 10;

/// A growable contiguous buffer that owns its storage.
///
/// Growth doubles the capacity (`0 -> 1 -> 2 -> 4 ...`), so `n` pushes cost
/// `O(log n)` reallocations. Existing elements are moved bitwise into the new
/// region before the old one is released.
///
/// ```
/// use scratch_collections::GrowableBuffer;
///
/// let mut buf = GrowableBuffer::new()?;
/// buf.push_back(1)?;
/// buf.push_back(2)?;
/// buf.push_back(3)?;
/// assert_eq!(buf.len(), 3);
/// assert_eq!(*buf.at(2)?, 3);
/// assert!(buf.at(3).is_err());
/// # Ok::<(), scratch_collections::CollectionError>(())
/// ```
pub struct GrowableBuffer<T, A: SlotAllocator = Heap> {
    ptr: NonNull<T>,
    len: usize,
    capacity: usize,
    alloc: A,
    _marker: PhantomData<T>,
}

unsafe impl<T: Send, A: SlotAllocator + Send> Send for GrowableBuffer<T, A> {}
unsafe impl<T: Sync, A: SlotAllocator + Sync> Sync for GrowableBuffer<T, A> {}

// ─── Raw slot management ──────────────────────────────────────────────────────

#[inline]
fn needs_memory<T>(capacity: usize) -> bool {
    capacity != 0 && mem::size_of::<T>() != 0
}

fn allocate_slots<T, A: SlotAllocator>(alloc: &A, capacity: usize) -> Result<NonNull<T>> {
    if !needs_memory::<T>(capacity) {
        return Ok(NonNull::dangling());
    }
    let layout =
        Layout::array::<T>(capacity).map_err(|_| CollectionError::Allocation { capacity })?;
    match alloc.allocate(layout) {
        Ok(ptr) => Ok(ptr.cast()),
        Err(_) => {
            debug!(capacity, bytes = layout.size(), "slot allocation refused");
            Err(CollectionError::Allocation { capacity })
        }
    }
}

/// Layout of a region that was successfully allocated for `capacity` slots.
#[inline]
unsafe fn region_layout<T>(capacity: usize) -> Layout {
    unsafe { Layout::from_size_align_unchecked(mem::size_of::<T>() * capacity, mem::align_of::<T>()) }
}

unsafe fn release_slots<T, A: SlotAllocator>(alloc: &A, ptr: NonNull<T>, capacity: usize) {
    if needs_memory::<T>(capacity) {
        unsafe { alloc.release(ptr.cast(), region_layout::<T>(capacity)) }
    }
}

fn doubled(capacity: usize) -> Result<usize> {
    if capacity == 0 {
        return Ok(1);
    }
    capacity
        .checked_mul(2)
        .ok_or(CollectionError::Allocation { capacity: usize::MAX })
}

/// A region being filled element by element.
///
/// Until [`finish`](Staging::finish) is called, dropping the staging area
/// (including during a panic in `T::clone`) drops the elements written so far
/// and releases the region.
struct Staging<'a, T, A: SlotAllocator> {
    alloc: &'a A,
    ptr: NonNull<T>,
    capacity: usize,
    written: usize,
}

impl<'a, T, A: SlotAllocator> Staging<'a, T, A> {
    fn new(alloc: &'a A, capacity: usize) -> Result<Self> {
        Ok(Self {
            alloc,
            ptr: allocate_slots(alloc, capacity)?,
            capacity,
            written: 0,
        })
    }

    #[inline]
    fn push(&mut self, value: T) {
        debug_assert!(self.written < self.capacity);
        unsafe { self.ptr.as_ptr().add(self.written).write(value) };
        self.written += 1;
    }

    fn finish(self) -> NonNull<T> {
        let this = ManuallyDrop::new(self);
        this.ptr
    }
}

impl<T, A: SlotAllocator> Drop for Staging<'_, T, A> {
    fn drop(&mut self) {
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), self.written));
            release_slots(self.alloc, self.ptr, self.capacity);
        }
    }
}

fn clone_into_region<T: Clone, A: SlotAllocator>(
    alloc: &A,
    src: &[T],
    capacity: usize,
) -> Result<NonNull<T>> {
    debug_assert!(src.len() <= capacity);
    let mut staging = Staging::new(alloc, capacity)?;
    for item in src {
        staging.push(item.clone());
    }
    Ok(staging.finish())
}

// ─── Construction ─────────────────────────────────────────────────────────────

impl<T> GrowableBuffer<T> {
    /// Creates an empty buffer with [`DEFAULT_CAPACITY`] slots on the heap.
    pub fn new() -> Result<Self> {
        Self::new_in(Heap)
    }

    /// Creates an empty buffer without allocating. This is the state a buffer
    /// is left in after [`take`](Self::take).
    pub const fn empty() -> Self {
        Self::empty_in(Heap)
    }

    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_capacity_in(capacity, Heap)
    }

    /// Creates a buffer holding `n` clones of `value`, with room for `n` more.
    pub fn with_fill(value: T, n: usize) -> Result<Self>
    where
        T: Clone,
    {
        Self::with_fill_in(value, n, Heap)
    }

    pub fn from_slice(items: &[T]) -> Result<Self>
    where
        T: Clone,
    {
        Self::from_slice_in(items, Heap)
    }
}

impl<T, A: SlotAllocator> GrowableBuffer<T, A> {
    pub const fn empty_in(alloc: A) -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            capacity: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    pub fn new_in(alloc: A) -> Result<Self> {
        Self::with_capacity_in(DEFAULT_CAPACITY, alloc)
    }

    pub fn with_capacity_in(capacity: usize, alloc: A) -> Result<Self> {
        let ptr = allocate_slots(&alloc, capacity)?;
        Ok(Self {
            ptr,
            len: 0,
            capacity,
            alloc,
            _marker: PhantomData,
        })
    }

    /// Creates a buffer of `n` clones of `value` with capacity `max(2n, 1)`.
    ///
    /// The extra headroom lets the next `n` pushes proceed without
    /// reallocating.
    pub fn with_fill_in(value: T, n: usize, alloc: A) -> Result<Self>
    where
        T: Clone,
    {
        let capacity = n
            .checked_mul(2)
            .ok_or(CollectionError::Allocation { capacity: usize::MAX })?
            .max(1);
        let ptr = {
            let mut staging = Staging::new(&alloc, capacity)?;
            if n > 0 {
                for _ in 1..n {
                    staging.push(value.clone());
                }
                staging.push(value);
            }
            staging.finish()
        };
        Ok(Self {
            ptr,
            len: n,
            capacity,
            alloc,
            _marker: PhantomData,
        })
    }

    /// Creates a buffer holding clones of `items`, with the same headroom
    /// policy as [`with_fill_in`](Self::with_fill_in).
    pub fn from_slice_in(items: &[T], alloc: A) -> Result<Self>
    where
        T: Clone,
    {
        let capacity = items
            .len()
            .checked_mul(2)
            .ok_or(CollectionError::Allocation { capacity: usize::MAX })?
            .max(1);
        let ptr = clone_into_region(&alloc, items, capacity)?;
        Ok(Self {
            ptr,
            len: items.len(),
            capacity,
            alloc,
            _marker: PhantomData,
        })
    }

    /// Deep copy with the same capacity as `self`.
    ///
    /// On failure nothing is allocated and `self` is untouched. A panic in
    /// `T::clone` drops the clones made so far and releases the new region.
    pub fn try_clone(&self) -> Result<Self>
    where
        T: Clone,
        A: Clone,
    {
        let alloc = self.alloc.clone();
        let ptr = clone_into_region(&alloc, self.as_slice(), self.capacity)?;
        Ok(Self {
            ptr,
            len: self.len,
            capacity: self.capacity,
            alloc,
            _marker: PhantomData,
        })
    }

    /// Moves the contents out, leaving `self` empty with zero capacity.
    ///
    /// Never allocates; the returned buffer owns the original region.
    pub fn take(&mut self) -> Self
    where
        A: Clone,
    {
        let emptied = Self::empty_in(self.alloc.clone());
        mem::replace(self, emptied)
    }

    // ─── Inspection ──────────────────────────────────────────────────────────

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    // ─── Checked access ──────────────────────────────────────────────────────

    /// Bounds-checked access.
    pub fn at(&self, index: usize) -> Result<&T> {
        self.as_slice()
            .get(index)
            .ok_or(CollectionError::IndexOutOfRange { index, len: self.len })
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(CollectionError::IndexOutOfRange { index, len })
    }

    pub fn front(&self) -> Result<&T> {
        self.as_slice().first().ok_or(CollectionError::EmptyContainer)
    }

    pub fn front_mut(&mut self) -> Result<&mut T> {
        self.as_mut_slice()
            .first_mut()
            .ok_or(CollectionError::EmptyContainer)
    }

    pub fn back(&self) -> Result<&T> {
        self.as_slice().last().ok_or(CollectionError::EmptyContainer)
    }

    pub fn back_mut(&mut self) -> Result<&mut T> {
        self.as_mut_slice()
            .last_mut()
            .ok_or(CollectionError::EmptyContainer)
    }

    // ─── Mutation ────────────────────────────────────────────────────────────

    /// Appends `value`, doubling the capacity first when the buffer is full.
    ///
    /// If growth fails the buffer is unchanged and `value` is dropped.
    #[inline]
    pub fn push_back(&mut self, value: T) -> Result<()> {
        if self.len == self.capacity {
            self.reallocate(doubled(self.capacity)?)?;
        }
        unsafe { self.ptr.as_ptr().add(self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the last element.
    ///
    /// An empty buffer yields [`CollectionError::EmptyContainer`]. Capacity is
    /// kept.
    pub fn pop_back(&mut self) -> Result<T> {
        if self.len == 0 {
            return Err(CollectionError::EmptyContainer);
        }
        self.len -= 1;
        Ok(unsafe { self.ptr.as_ptr().add(self.len).read() })
    }

    /// Drops every element past `len`. Capacity is kept.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            let tail = ptr::slice_from_raw_parts_mut(
                unsafe { self.ptr.as_ptr().add(len) },
                self.len - len,
            );
            self.len = len;
            unsafe { ptr::drop_in_place(tail) };
        }
    }

    /// Drops every element and resets the capacity to [`DEFAULT_CAPACITY`].
    ///
    /// The replacement region is obtained before anything is dropped; if that
    /// fails the buffer keeps its elements. A buffer already at the default
    /// capacity keeps its region.
    pub fn clear(&mut self) -> Result<()> {
        if self.capacity == DEFAULT_CAPACITY {
            self.truncate(0);
            return Ok(());
        }
        let fresh = allocate_slots::<T, A>(&self.alloc, DEFAULT_CAPACITY)?;
        self.truncate(0);
        unsafe { release_slots(&self.alloc, self.ptr, self.capacity) };
        trace!(from = self.capacity, to = DEFAULT_CAPACITY, "buffer cleared and re-provisioned");
        self.ptr = fresh;
        self.capacity = DEFAULT_CAPACITY;
        Ok(())
    }

    /// Ensures room for `additional` more elements.
    ///
    /// Grows to at least double the current capacity so repeated small
    /// reservations stay amortized.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(CollectionError::Allocation { capacity: usize::MAX })?;
        if required <= self.capacity {
            return Ok(());
        }
        let target = self.capacity.saturating_mul(2).max(required);
        self.reallocate(target)
    }

    /// Shrinks the capacity to the current length, releasing the region
    /// entirely when the buffer is empty.
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        if self.capacity == self.len {
            return Ok(());
        }
        self.reallocate(self.len)
    }

    /// Appends every item of `iter`. Items pushed before a failure stay in the
    /// buffer.
    pub fn try_extend<I: IntoIterator<Item = T>>(&mut self, iter: I) -> Result<()> {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.reserve(lower)?;
        for item in iter {
            self.push_back(item)?;
        }
        Ok(())
    }

    /// Copy-assignment with the strong guarantee.
    ///
    /// A region of `source.capacity()` slots is allocated from this buffer's
    /// allocator and fully populated before the current contents are dropped.
    /// On failure `self` is left untouched.
    pub fn clone_from_buffer<B: SlotAllocator>(&mut self, source: &GrowableBuffer<T, B>) -> Result<()>
    where
        T: Clone,
    {
        if ptr::addr_eq(&*self, source) {
            return Ok(());
        }
        let fresh = clone_into_region(&self.alloc, source.as_slice(), source.capacity)?;
        self.truncate(0);
        unsafe { release_slots(&self.alloc, self.ptr, self.capacity) };
        self.ptr = fresh;
        self.len = source.len;
        self.capacity = source.capacity;
        Ok(())
    }

    /// Move-assignment: drops the current contents, adopts `source`'s region
    /// and leaves `source` empty with zero capacity. Never fails.
    pub fn assign_from(&mut self, source: &mut Self)
    where
        A: Clone,
    {
        if ptr::eq(&*self, &*source) {
            return;
        }
        *self = source.take();
    }

    /// Moves the live elements into a fresh region of `new_capacity` slots.
    ///
    /// The old region is released only once the new one exists.
    #[cold]
    #[inline(never)]
    fn reallocate(&mut self, new_capacity: usize) -> Result<()> {
        debug_assert!(new_capacity >= self.len);
        let fresh = allocate_slots::<T, A>(&self.alloc, new_capacity)?;
        unsafe {
            ptr::copy_nonoverlapping(self.ptr.as_ptr(), fresh.as_ptr(), self.len);
            release_slots(&self.alloc, self.ptr, self.capacity);
        }
        trace!(from = self.capacity, to = new_capacity, len = self.len, "buffer reallocated");
        self.ptr = fresh;
        self.capacity = new_capacity;
        Ok(())
    }
}

impl<T, A: SlotAllocator> Drop for GrowableBuffer<T, A> {
    fn drop(&mut self) {
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), self.len));
            release_slots(&self.alloc, self.ptr, self.capacity);
        }
    }
}

// ─── Trait impls ──────────────────────────────────────────────────────────────

impl<T: Clone, A: SlotAllocator + Clone> Clone for GrowableBuffer<T, A> {
    /// Deep copy. Allocation failure aborts through [`handle_alloc_error`], as
    /// std collections do; use [`try_clone`](GrowableBuffer::try_clone) to
    /// handle it instead.
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(_) => handle_alloc_error(unsafe { region_layout::<T>(self.capacity) }),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        if self.clone_from_buffer(source).is_err() {
            handle_alloc_error(unsafe { region_layout::<T>(source.capacity) });
        }
    }
}

impl<T, A: SlotAllocator> Deref for GrowableBuffer<T, A> {
    type Target = [T];
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T, A: SlotAllocator> DerefMut for GrowableBuffer<T, A> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug, A: SlotAllocator> fmt::Debug for GrowableBuffer<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_slice(), f)
    }
}

impl<T, A, B> PartialEq<GrowableBuffer<T, B>> for GrowableBuffer<T, A>
where
    T: PartialEq,
    A: SlotAllocator,
    B: SlotAllocator,
{
    fn eq(&self, other: &GrowableBuffer<T, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, A: SlotAllocator> Eq for GrowableBuffer<T, A> {}

impl<T: PartialEq, A: SlotAllocator> PartialEq<[T]> for GrowableBuffer<T, A> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq, A: SlotAllocator, const N: usize> PartialEq<[T; N]> for GrowableBuffer<T, A> {
    fn eq(&self, other: &[T; N]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: PartialOrd, A: SlotAllocator> PartialOrd for GrowableBuffer<T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: Ord, A: SlotAllocator> Ord for GrowableBuffer<T, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T: Hash, A: SlotAllocator> Hash for GrowableBuffer<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T, A: SlotAllocator> AsRef<[T]> for GrowableBuffer<T, A> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: SlotAllocator> AsMut<[T]> for GrowableBuffer<T, A> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A: SlotAllocator> Borrow<[T]> for GrowableBuffer<T, A> {
    fn borrow(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: SlotAllocator> BorrowMut<[T]> for GrowableBuffer<T, A> {
    fn borrow_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<'a, T, A: SlotAllocator> IntoIterator for &'a GrowableBuffer<T, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: SlotAllocator> IntoIterator for &'a mut GrowableBuffer<T, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

// ─── Owning iterator ──────────────────────────────────────────────────────────

/// Owning iterator returned by [`GrowableBuffer::into_iter`].
///
/// Elements not yet yielded are dropped, and the region released, when the
/// iterator is dropped.
pub struct IntoIter<T, A: SlotAllocator = Heap> {
    ptr: NonNull<T>,
    capacity: usize,
    start: usize,
    end: usize,
    alloc: A,
    _marker: PhantomData<T>,
}

unsafe impl<T: Send, A: SlotAllocator + Send> Send for IntoIter<T, A> {}
unsafe impl<T: Sync, A: SlotAllocator + Sync> Sync for IntoIter<T, A> {}

impl<T, A: SlotAllocator> IntoIter<T, A> {
    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.ptr.as_ptr().add(self.start), self.end - self.start) }
    }
}

impl<T, A: SlotAllocator> IntoIterator for GrowableBuffer<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        let this = ManuallyDrop::new(self);
        IntoIter {
            ptr: this.ptr,
            capacity: this.capacity,
            start: 0,
            end: this.len,
            alloc: unsafe { ptr::read(&this.alloc) },
            _marker: PhantomData,
        }
    }
}

impl<T, A: SlotAllocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        let item = unsafe { self.ptr.as_ptr().add(self.start).read() };
        self.start += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.start;
        (remaining, Some(remaining))
    }
}

impl<T, A: SlotAllocator> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        Some(unsafe { self.ptr.as_ptr().add(self.end).read() })
    }
}

impl<T, A: SlotAllocator> ExactSizeIterator for IntoIter<T, A> {}
impl<T, A: SlotAllocator> FusedIterator for IntoIter<T, A> {}

impl<T, A: SlotAllocator> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        unsafe {
            let rest = ptr::slice_from_raw_parts_mut(
                self.ptr.as_ptr().add(self.start),
                self.end - self.start,
            );
            ptr::drop_in_place(rest);
            release_slots(&self.alloc, self.ptr, self.capacity);
        }
    }
}

impl<T: fmt::Debug, A: SlotAllocator> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}
