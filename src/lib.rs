//! # Scratch Collections
//!
//! Container primitives written from scratch on top of raw allocation: a
//! growable contiguous buffer, a singly linked list and a doubly linked list.
//!
//! The centrepiece is [`GrowableBuffer`], an owning dynamic array whose
//! allocation is fallible and whose mutating operations give the strong
//! guarantee: when memory cannot be obtained the call returns
//! [`CollectionError::Allocation`] and the buffer is exactly as it was.
//!
//! ## Key Features
//!
//! * **Amortized growth:** capacity doubles (`0 -> 1 -> 2 -> 4 ...`), so `n`
//!   appends cost `O(log n)` reallocations.
//! * **Strong guarantee:** growth, copy, copy-assignment and `clear` obtain new
//!   storage before touching the old one.
//! * **Pluggable memory:** every buffer draws from a [`SlotAllocator`].
//!   [`Heap`] forwards to the global allocator, and [`CountingAllocator`]
//!   records calls and can be told to fail.
//! * **Explicit moves:** [`GrowableBuffer::take`] and
//!   [`GrowableBuffer::assign_from`] hand storage over and leave the source
//!   empty with zero capacity.
//! * **Optional locking:** with the `sync` feature (on by default),
//!   [`SynchronizedBuffer`], [`SynchronizedSinglyList`] and
//!   [`SynchronizedDoublyList`] serialize every operation behind one lock per
//!   instance.
//!
//! ## Capacity Policy
//!
//! | Operation | Resulting capacity |
//! |-----------|--------------------|
//! | `new()` / `clear()` | [`DEFAULT_CAPACITY`] (10) |
//! | `with_fill(v, n)` / `from_slice` | `max(2n, 1)` |
//! | `push_back` when full | `max(2 * capacity, 1)` |
//! | `try_clone` / `clone_from_buffer` | capacity of the source |
//! | `take` (source side) | 0 |
//!
//! ## Examples
//!
//! ### GrowableBuffer
//!
//! ```rust
//! use scratch_collections::{CollectionError, GrowableBuffer};
//!
//! let mut buf = GrowableBuffer::new()?;
//! for i in 0..11 {
//!     buf.push_back(i)?;
//! }
//! assert_eq!(buf.capacity(), 20);
//! assert_eq!(buf.pop_back()?, 10);
//!
//! let copy = buf.try_clone()?;
//! assert_eq!(copy, buf);
//!
//! buf.clear()?;
//! assert_eq!(buf.pop_back(), Err(CollectionError::EmptyContainer));
//! # Ok::<(), CollectionError>(())
//! ```
//!
//! ### Failure injection
//!
//! ```rust
//! use scratch_collections::{CountingAllocator, GrowableBuffer};
//!
//! let alloc = CountingAllocator::new();
//! let mut target = GrowableBuffer::new_in(alloc.clone()).unwrap();
//! target.push_back(1).unwrap();
//!
//! let source = GrowableBuffer::with_fill(9, 3).unwrap();
//! alloc.deny();
//! assert!(target.clone_from_buffer(&source).is_err());
//! assert_eq!(target, [1]);
//! ```
//!
//! ### Linked lists
//!
//! ```rust
//! use scratch_collections::{DoublyLinkedList, SinglyLinkedList};
//!
//! let singly: SinglyLinkedList<_> = (1..=3).collect();
//! assert_eq!(singly.search(&2), Some(&2));
//!
//! let mut doubly = DoublyLinkedList::new();
//! doubly.try_extend(1..=3).unwrap();
//! assert_eq!(doubly.iter().rev().copied().collect::<Vec<_>>(), [3, 2, 1]);
//! ```

// --- Module Declarations ---

pub mod allocator;
pub mod error;
pub mod lists;
pub mod vecs;

// --- Re-exports ---

pub use allocator::{CountingAllocator, Heap, SlotAllocator};
pub use error::{AllocError, CollectionError, Result};
pub use lists::{DoublyLinkedList, SinglyLinkedList};
pub use vecs::{DEFAULT_CAPACITY, GrowableBuffer};
#[cfg(feature = "sync")]
pub use lists::{SynchronizedDoublyList, SynchronizedSinglyList};
#[cfg(feature = "sync")]
pub use vecs::SynchronizedBuffer;
