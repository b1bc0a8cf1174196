//! Doubly linked list stored in an index-linked arena.
//!
//! Nodes live in a [`GrowableBuffer`] of slots and refer to each other by
//! index instead of by pointer. A freed slot is threaded onto a free list
//! through its `next` field and reused by the next insertion, so the arena
//! only grows when every slot is occupied.
//!
//! ```text
//!  slots:  [0]        [1]        [2]        [3]
//!          B          (free)     A          C
//!  head = 2 ──next──▶ 0 ──next──▶ 3 = tail
//!  free = 1
//! ```

use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use std::alloc::{Layout, handle_alloc_error};

use crate::error::Result;
use crate::vecs::growable_buffer::GrowableBuffer;

/// Sentinel meaning "no slot".
const NIL: usize = usize::MAX;

struct Slot<T> {
    value: Option<T>,
    prev: usize,
    next: usize,
}

/// A doubly linked list supporting O(1) insertion and removal at both ends and
/// traversal in both directions.
///
/// Insertions may need to grow the arena and are therefore fallible; removals
/// from an empty list return `None`.
///
/// ```
/// use scratch_collections::DoublyLinkedList;
///
/// let mut list = DoublyLinkedList::new();
/// list.push_back(2)?;
/// list.push_front(1)?;
/// list.push_back(3)?;
/// assert_eq!(list.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
/// assert_eq!(list.iter().rev().copied().collect::<Vec<_>>(), [3, 2, 1]);
/// # Ok::<(), scratch_collections::CollectionError>(())
/// ```
pub struct DoublyLinkedList<T> {
    slots: GrowableBuffer<Slot<T>>,
    head: usize,
    tail: usize,
    free: usize,
    len: usize,
}

impl<T> DoublyLinkedList<T> {
    /// Creates an empty list. The arena is allocated on first insertion.
    pub const fn new() -> Self {
        Self {
            slots: GrowableBuffer::empty(),
            head: NIL,
            tail: NIL,
            free: NIL,
            len: 0,
        }
    }

    /// Creates a list of `n` clones of `value`.
    pub fn with_fill(value: T, n: usize) -> Result<Self>
    where
        T: Clone,
    {
        let mut list = Self {
            slots: GrowableBuffer::with_capacity(n)?,
            ..Self::new()
        };
        if n > 0 {
            for _ in 1..n {
                list.push_back(value.clone())?;
            }
            list.push_back(value)?;
        }
        Ok(list)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Places `value` in a free slot, growing the arena if none is left.
    fn acquire(&mut self, value: T, prev: usize, next: usize) -> Result<usize> {
        let slot = Slot {
            value: Some(value),
            prev,
            next,
        };
        if self.free == NIL {
            let idx = self.slots.len();
            self.slots.push_back(slot)?;
            return Ok(idx);
        }
        let idx = self.free;
        self.free = self.slots[idx].next;
        self.slots[idx] = slot;
        Ok(idx)
    }

    fn release(&mut self, idx: usize) -> Option<T> {
        let slot = &mut self.slots[idx];
        let value = slot.value.take();
        slot.prev = NIL;
        slot.next = self.free;
        self.free = idx;
        self.len -= 1;
        value
    }

    pub fn push_back(&mut self, value: T) -> Result<()> {
        let idx = self.acquire(value, self.tail, NIL)?;
        match self.tail {
            NIL => self.head = idx,
            tail => self.slots[tail].next = idx,
        }
        self.tail = idx;
        self.len += 1;
        Ok(())
    }

    pub fn push_front(&mut self, value: T) -> Result<()> {
        let idx = self.acquire(value, NIL, self.head)?;
        match self.head {
            NIL => self.tail = idx,
            head => self.slots[head].prev = idx,
        }
        self.head = idx;
        self.len += 1;
        Ok(())
    }

    pub fn pop_back(&mut self) -> Option<T> {
        let idx = self.tail;
        if idx == NIL {
            return None;
        }
        let prev = self.slots[idx].prev;
        match prev {
            NIL => self.head = NIL,
            prev => self.slots[prev].next = NIL,
        }
        self.tail = prev;
        self.release(idx)
    }

    pub fn pop_front(&mut self) -> Option<T> {
        let idx = self.head;
        if idx == NIL {
            return None;
        }
        let next = self.slots[idx].next;
        match next {
            NIL => self.tail = NIL,
            next => self.slots[next].prev = NIL,
        }
        self.head = next;
        self.release(idx)
    }

    fn value_at(&self, idx: usize) -> Option<&T> {
        self.slots.get(idx).and_then(|slot| slot.value.as_ref())
    }

    fn value_at_mut(&mut self, idx: usize) -> Option<&mut T> {
        self.slots.get_mut(idx).and_then(|slot| slot.value.as_mut())
    }

    pub fn front(&self) -> Option<&T> {
        self.value_at(self.head)
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.value_at_mut(self.head)
    }

    pub fn back(&self) -> Option<&T> {
        self.value_at(self.tail)
    }

    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.value_at_mut(self.tail)
    }

    /// Drops every element. The arena keeps its capacity.
    pub fn clear(&mut self) {
        self.slots.truncate(0);
        self.head = NIL;
        self.tail = NIL;
        self.free = NIL;
        self.len = 0;
    }

    /// Number of slots the arena can hold before it has to grow.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub fn try_extend<I: IntoIterator<Item = T>>(&mut self, iter: I) -> Result<()> {
        for item in iter {
            self.push_back(item)?;
        }
        Ok(())
    }

    /// Deep copy laid out compactly in list order.
    pub fn try_clone(&self) -> Result<Self>
    where
        T: Clone,
    {
        let mut copy = Self {
            slots: GrowableBuffer::with_capacity(self.len)?,
            ..Self::new()
        };
        for item in self.iter() {
            copy.push_back(item.clone())?;
        }
        Ok(copy)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            slots: self.slots.as_slice(),
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            slots: self.slots.as_mut_slice().as_mut_ptr(),
            front: self.head,
            back: self.tail,
            remaining: self.len,
            _marker: PhantomData,
        }
    }
}

impl<T> Default for DoublyLinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for DoublyLinkedList<T> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(_) => handle_alloc_error(
                Layout::array::<Slot<T>>(self.len).unwrap_or_else(|_| Layout::new::<Slot<T>>()),
            ),
        }
    }
}

impl<T: PartialEq> PartialEq for DoublyLinkedList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for DoublyLinkedList<T> {}

impl<T: fmt::Debug> fmt::Debug for DoublyLinkedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Borrowing iterator; walks `next` links from the front and `prev` links from
/// the back.
pub struct Iter<'a, T> {
    slots: &'a [Slot<T>],
    front: usize,
    back: usize,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let slot = &self.slots[self.front];
        self.front = slot.next;
        self.remaining -= 1;
        slot.value.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let slot = &self.slots[self.back];
        self.back = slot.prev;
        self.remaining -= 1;
        slot.value.as_ref()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

/// Mutable iterator. Each live slot is yielded at most once, so the
/// exclusive references handed out never alias.
pub struct IterMut<'a, T> {
    slots: *mut Slot<T>,
    front: usize,
    back: usize,
    remaining: usize,
    _marker: PhantomData<&'a mut Slot<T>>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        if self.remaining == 0 {
            return None;
        }
        let slot = unsafe { &mut *self.slots.add(self.front) };
        self.front = slot.next;
        self.remaining -= 1;
        slot.value.as_mut()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
    fn next_back(&mut self) -> Option<&'a mut T> {
        if self.remaining == 0 {
            return None;
        }
        let slot = unsafe { &mut *self.slots.add(self.back) };
        self.back = slot.prev;
        self.remaining -= 1;
        slot.value.as_mut()
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

pub struct IntoIter<T>(DoublyLinkedList<T>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.0.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len, Some(self.0.len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.0.pop_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> IntoIterator for DoublyLinkedList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter(self)
    }
}

impl<'a, T> IntoIterator for &'a DoublyLinkedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DoublyLinkedList<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(items: &[i32]) -> DoublyLinkedList<i32> {
        let mut list = DoublyLinkedList::new();
        list.try_extend(items.iter().copied()).unwrap();
        list
    }

    fn forward(list: &DoublyLinkedList<i32>) -> Vec<i32> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_doubly_push_both_ends() {
        let mut list = DoublyLinkedList::new();
        list.push_back(2).unwrap();
        list.push_front(1).unwrap();
        list.push_back(3).unwrap();
        list.push_front(0).unwrap();
        assert_eq!(forward(&list), [0, 1, 2, 3]);
        assert_eq!(list.front(), Some(&0));
        assert_eq!(list.back(), Some(&3));
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_doubly_reverse_iteration() {
        let list = list_of(&[1, 2, 3, 4]);
        let reversed: Vec<i32> = list.iter().rev().copied().collect();
        assert_eq!(reversed, [4, 3, 2, 1]);

        let mut iter = list.iter();
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&4));
        assert_eq!(iter.next(), Some(&2));
        assert_eq!(iter.next_back(), Some(&3));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn test_doubly_pops_and_empty_noop() {
        let mut list = list_of(&[1, 2, 3]);
        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.pop_back(), Some(3));
        assert_eq!(list.pop_back(), Some(2));
        assert!(list.is_empty());
        assert_eq!(list.pop_back(), None);
        assert_eq!(list.pop_front(), None);
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
    }

    #[test]
    fn test_doubly_reuses_freed_slots() {
        let mut list = list_of(&[1, 2, 3, 4]);
        let capacity = list.capacity();
        list.pop_front();
        list.pop_back();
        list.push_back(5).unwrap();
        list.push_front(0).unwrap();
        assert_eq!(list.capacity(), capacity);
        assert_eq!(list.slots.len(), 4);
        assert_eq!(forward(&list), [0, 2, 3, 5]);
        let reversed: Vec<i32> = list.iter().rev().copied().collect();
        assert_eq!(reversed, [5, 3, 2, 0]);
    }

    #[test]
    fn test_doubly_fill_and_equality() {
        let filled = DoublyLinkedList::with_fill(7, 3).unwrap();
        assert_eq!(forward(&filled), [7, 7, 7]);
        assert_eq!(filled, list_of(&[7, 7, 7]));
        assert_ne!(filled, list_of(&[7, 7]));
        assert_ne!(filled, list_of(&[7, 7, 8]));

        let empty: DoublyLinkedList<i32> = DoublyLinkedList::with_fill(1, 0).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_doubly_equality_ignores_slot_layout() {
        let mut scattered = list_of(&[9, 1, 2]);
        scattered.pop_front();
        scattered.push_back(3).unwrap();
        assert_eq!(scattered, list_of(&[1, 2, 3]));
    }

    #[test]
    fn test_doubly_clone_is_deep() {
        let mut original = DoublyLinkedList::new();
        original.push_back(String::from("a")).unwrap();
        original.push_back(String::from("b")).unwrap();
        let mut copy = original.clone();
        assert_eq!(copy, original);
        copy.front_mut().unwrap().push('!');
        copy.push_front(String::from("z")).unwrap();
        assert_eq!(original.front().map(String::as_str), Some("a"));
        assert_eq!(original.len(), 2);
        assert_eq!(copy.len(), 3);
    }

    #[test]
    fn test_doubly_iter_mut_both_directions() {
        let mut list = list_of(&[1, 2, 3, 4]);
        {
            let mut iter = list.iter_mut();
            *iter.next().unwrap() *= 10;
            *iter.next_back().unwrap() *= 100;
        }
        for x in &mut list {
            *x += 1;
        }
        *list.back_mut().unwrap() -= 1;
        assert_eq!(forward(&list), [11, 3, 4, 400]);
    }

    #[test]
    fn test_doubly_into_iter_and_clear() {
        let list = list_of(&[1, 2, 3]);
        let drained: Vec<i32> = list.into_iter().rev().collect();
        assert_eq!(drained, [3, 2, 1]);

        let mut list = list_of(&[4, 5]);
        let capacity = list.capacity();
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.capacity(), capacity);
        list.push_back(6).unwrap();
        assert_eq!(forward(&list), [6]);
        assert_eq!(format!("{:?}", list), "[6]");
    }
}
