use thiserror::Error;

/// The pool had no free slot left to satisfy an allocation.
///
/// This is a normal, recoverable condition: the pool itself is unchanged and
/// capacity becomes available again as soon as an existing allocation is
/// released.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("slot pool of capacity {capacity} is exhausted")]
pub struct PoolExhausted {
    /// The fixed capacity of the pool that rejected the allocation.
    capacity: usize,
}

impl PoolExhausted {
    pub(crate) fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// The fixed capacity of the pool that rejected the allocation.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// A specialized `Result` type for slot pool operations, returning the crate's
/// [`PoolExhausted`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, PoolExhausted>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(PoolExhausted: Send, Sync, Debug);

    #[test]
    fn reports_capacity() {
        let error = PoolExhausted::new(4);

        assert_eq!(error.capacity(), 4);
        assert_eq!(
            error.to_string(),
            "slot pool of capacity 4 is exhausted"
        );
    }
}
