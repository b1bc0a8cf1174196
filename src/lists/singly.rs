//! Singly linked list with O(1) push at both ends.

use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ptr::NonNull;

type Link<T> = Option<NonNull<Node<T>>>;

struct Node<T> {
    value: T,
    next: Link<T>,
}

/// A forward-linked chain of individually boxed nodes.
///
/// Each node is owned by its predecessor (the head by the list); `tail` is a
/// non-owning cursor kept so `push_back` is O(1). `pop_back` has to walk to
/// the second-to-last node and is O(n). Popping an empty list is a no-op that
/// returns `None`.
///
/// ```
/// use scratch_collections::SinglyLinkedList;
///
/// let mut list = SinglyLinkedList::new();
/// list.push_back(2);
/// list.push_back(3);
/// list.push_front(1);
/// assert_eq!(list.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
/// assert_eq!(list.search(&2), Some(&2));
/// assert_eq!(list.pop_back(), Some(3));
/// ```
pub struct SinglyLinkedList<T> {
    head: Link<T>,
    tail: Link<T>,
    len: usize,
    _owns: PhantomData<Box<Node<T>>>,
}

unsafe impl<T: Send> Send for SinglyLinkedList<T> {}
unsafe impl<T: Sync> Sync for SinglyLinkedList<T> {}

impl<T> SinglyLinkedList<T> {
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
            _owns: PhantomData,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn allocate(value: T, next: Link<T>) -> NonNull<Node<T>> {
        NonNull::from(Box::leak(Box::new(Node { value, next })))
    }

    pub fn push_back(&mut self, value: T) {
        let node = Self::allocate(value, None);
        match self.tail {
            None => self.head = Some(node),
            Some(tail) => unsafe { (*tail.as_ptr()).next = Some(node) },
        }
        self.tail = Some(node);
        self.len += 1;
    }

    pub fn push_front(&mut self, value: T) {
        let node = Self::allocate(value, self.head);
        if self.tail.is_none() {
            self.tail = Some(node);
        }
        self.head = Some(node);
        self.len += 1;
    }

    pub fn pop_front(&mut self) -> Option<T> {
        self.head.map(|head| {
            let node = unsafe { Box::from_raw(head.as_ptr()) };
            self.head = node.next;
            if self.head.is_none() {
                self.tail = None;
            }
            self.len -= 1;
            node.value
        })
    }

    /// Removes the last element. O(n).
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len <= 1 {
            return self.pop_front();
        }
        let tail = self.tail?;
        let mut cursor = self.head?;
        unsafe {
            for _ in 0..self.len - 2 {
                cursor = (*cursor.as_ptr()).next?;
            }
            (*cursor.as_ptr()).next = None;
            self.tail = Some(cursor);
            self.len -= 1;
            Some(Box::from_raw(tail.as_ptr()).value)
        }
    }

    pub fn front(&self) -> Option<&T> {
        self.head.map(|n| unsafe { &(*n.as_ptr()).value })
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.head.map(|n| unsafe { &mut (*n.as_ptr()).value })
    }

    pub fn back(&self) -> Option<&T> {
        self.tail.map(|n| unsafe { &(*n.as_ptr()).value })
    }

    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.tail.map(|n| unsafe { &mut (*n.as_ptr()).value })
    }

    /// Returns the first element equal to `value`.
    pub fn search(&self, value: &T) -> Option<&T>
    where
        T: PartialEq,
    {
        self.iter().find(|item| *item == value)
    }

    pub fn clear(&mut self) {
        while self.pop_front().is_some() {}
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head,
            remaining: self.len,
            _marker: PhantomData,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            next: self.head,
            remaining: self.len,
            _marker: PhantomData,
        }
    }
}

impl<T> Drop for SinglyLinkedList<T> {
    fn drop(&mut self) {
        // Iterative, so long chains cannot overflow the stack.
        self.clear();
    }
}

impl<T> Default for SinglyLinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for SinglyLinkedList<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: PartialEq> PartialEq for SinglyLinkedList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for SinglyLinkedList<T> {}

impl<T: fmt::Debug> fmt::Debug for SinglyLinkedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Extend<T> for SinglyLinkedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push_back(item);
        }
    }
}

impl<T> FromIterator<T> for SinglyLinkedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

pub struct Iter<'a, T> {
    next: Link<T>,
    remaining: usize,
    _marker: PhantomData<&'a Node<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.next.map(|node| unsafe {
            let node = &*node.as_ptr();
            self.next = node.next;
            self.remaining -= 1;
            &node.value
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            next: self.next,
            remaining: self.remaining,
            _marker: PhantomData,
        }
    }
}

pub struct IterMut<'a, T> {
    next: Link<T>,
    remaining: usize,
    _marker: PhantomData<&'a mut Node<T>>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        self.next.map(|node| unsafe {
            let node = &mut *node.as_ptr();
            self.next = node.next;
            self.remaining -= 1;
            &mut node.value
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

pub struct IntoIter<T>(SinglyLinkedList<T>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.0.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len, Some(self.0.len))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> IntoIterator for SinglyLinkedList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter(self)
    }
}

impl<'a, T> IntoIterator for &'a SinglyLinkedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut SinglyLinkedList<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_singly_push_both_ends() {
        let mut list = SinglyLinkedList::new();
        list.push_back(2);
        list.push_front(1);
        list.push_back(3);
        assert_eq!(list.len(), 3);
        assert_eq!(list.front(), Some(&1));
        assert_eq!(list.back(), Some(&3));
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
    }

    #[test]
    fn test_singly_push_front_on_empty_sets_tail() {
        let mut list = SinglyLinkedList::new();
        list.push_front('a');
        assert_eq!(list.back(), Some(&'a'));
        list.push_back('b');
        assert_eq!(list.iter().collect::<String>(), "ab");
    }

    #[test]
    fn test_singly_pops() {
        let mut list: SinglyLinkedList<i32> = (1..=4).collect();
        assert_eq!(list.pop_back(), Some(4));
        assert_eq!(list.back(), Some(&3));
        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.pop_back(), Some(3));
        assert_eq!(list.pop_back(), Some(2));
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);

        // Empty pops are no-ops.
        assert_eq!(list.pop_back(), None);
        assert_eq!(list.pop_front(), None);

        list.push_back(7);
        assert_eq!(list.front(), Some(&7));
        assert_eq!(list.back(), Some(&7));
    }

    #[test]
    fn test_singly_search() {
        let list: SinglyLinkedList<String> = ["x", "y", "z"].iter().map(|s| s.to_string()).collect();
        assert_eq!(list.search(&"y".to_string()).map(String::as_str), Some("y"));
        assert_eq!(list.search(&"w".to_string()), None);
    }

    #[test]
    fn test_singly_clone_is_deep() {
        let original: SinglyLinkedList<Vec<i32>> = vec![vec![1], vec![2]].into_iter().collect();
        let mut copy = original.clone();
        assert_eq!(copy, original);
        copy.front_mut().unwrap().push(10);
        copy.push_back(vec![3]);
        assert_eq!(original.front(), Some(&vec![1]));
        assert_eq!(original.len(), 2);
        assert_ne!(copy, original);
    }

    #[test]
    fn test_singly_iter_mut_and_into_iter() {
        let mut list: SinglyLinkedList<i32> = (0..5).collect();
        for x in &mut list {
            *x *= 2;
        }
        *list.back_mut().unwrap() += 1;
        let collected: Vec<i32> = list.into_iter().collect();
        assert_eq!(collected, [0, 2, 4, 6, 9]);
    }

    #[test]
    fn test_singly_drop_counts_and_long_chain() {
        let counter = Rc::new(Cell::new(0));
        struct Dropper(Rc<Cell<usize>>);
        impl Drop for Dropper {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }
        {
            let mut list = SinglyLinkedList::new();
            for _ in 0..10 {
                list.push_back(Dropper(counter.clone()));
            }
            drop(list.pop_back());
            assert_eq!(counter.get(), 1);
        }
        assert_eq!(counter.get(), 10);

        let long: SinglyLinkedList<u32> = (0..200_000).collect();
        assert_eq!(long.len(), 200_000);
        drop(long);
    }

    #[test]
    fn test_singly_debug_and_clear() {
        let mut list: SinglyLinkedList<i32> = (1..=3).collect();
        assert_eq!(format!("{:?}", list), "[1, 2, 3]");
        list.clear();
        assert!(list.is_empty());
        assert_eq!(format!("{:?}", list), "[]");
    }
}
