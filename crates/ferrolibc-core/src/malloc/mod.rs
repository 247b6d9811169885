//! Buffer acquisition.
//!
//! The string, escape, and path modules never grow a buffer implicitly: they
//! ask for the exact capacity up front through [`allocate`], so an allocator
//! failure surfaces as [`Error::AllocationFailure`] instead of an abort.

use crate::errno::Error;

/// Returns an empty buffer with room for at least `capacity` units.
pub fn allocate<T>(capacity: usize) -> Result<Vec<T>, Error> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(capacity)
        .map_err(|_| Error::AllocationFailure {
            requested: capacity.saturating_mul(core::mem::size_of::<T>()),
        })?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_reserves_capacity() {
        let buf: Vec<u8> = allocate(64).unwrap();
        assert!(buf.capacity() >= 64);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_allocate_reports_impossible_request() {
        let err = allocate::<u64>(usize::MAX).unwrap_err();
        assert!(matches!(err, Error::AllocationFailure { .. }));
    }
}
