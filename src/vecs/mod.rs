//! Contiguous containers.
//!
//! - [`growable_buffer`]: the owning, doubling [`GrowableBuffer`].
//! - [`synchronized`]: [`SynchronizedBuffer`], a per-instance lock over it
//!   (feature `sync`).

pub mod growable_buffer;
#[cfg(feature = "sync")]
pub mod synchronized;

pub use growable_buffer::{DEFAULT_CAPACITY, GrowableBuffer, IntoIter};
#[cfg(feature = "sync")]
pub use synchronized::SynchronizedBuffer;
