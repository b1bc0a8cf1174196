//! Node-based sequences.
//!
//! - [`singly`]: [`SinglyLinkedList`], a heap node chain with a tail cursor.
//! - [`doubly`]: [`DoublyLinkedList`], index links inside a
//!   [`GrowableBuffer`](crate::GrowableBuffer) arena.
//! - `synchronized`: per-instance locks over either list (feature `sync`).

pub mod doubly;
pub mod singly;
#[cfg(feature = "sync")]
pub mod synchronized;

pub use doubly::DoublyLinkedList;
pub use singly::SinglyLinkedList;
#[cfg(feature = "sync")]
pub use synchronized::{SynchronizedDoublyList, SynchronizedSinglyList};
