//! Error taxonomy shared by every container in the crate.

use thiserror::Error;

/// Failure reported by a [`SlotAllocator`](crate::allocator::SlotAllocator) when it
/// cannot hand out the requested region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("memory allocation failed")]
pub struct AllocError;

/// Errors surfaced by container operations.
///
/// Every fallible operation leaves the container in the state it had before
/// the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CollectionError {
    /// Storage for `capacity` slots could not be obtained, either because the
    /// allocator refused or because the byte size overflowed.
    #[error("could not allocate storage for {capacity} slots")]
    Allocation { capacity: usize },

    /// Bounds-checked access outside `[0, len)`.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Access or removal on a container holding no elements.
    #[error("container is empty")]
    EmptyContainer,
}

pub type Result<T> = core::result::Result<T, CollectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        assert_eq!(
            CollectionError::Allocation { capacity: 20 }.to_string(),
            "could not allocate storage for 20 slots"
        );
        assert_eq!(
            CollectionError::IndexOutOfRange { index: 3, len: 3 }.to_string(),
            "index 3 out of range for length 3"
        );
        assert_eq!(CollectionError::EmptyContainer.to_string(), "container is empty");
        assert_eq!(AllocError.to_string(), "memory allocation failed");
    }

    #[test]
    fn test_error_alloc_error_comes_from_slot_allocator() {
        use crate::allocator::{CountingAllocator, SlotAllocator};
        use std::alloc::Layout;

        let alloc = CountingAllocator::new();
        alloc.deny();
        let layout = Layout::array::<u64>(2).unwrap();
        assert_eq!(alloc.allocate(layout), Err(AllocError));
    }
}
