//! Slot layout: payload plus an 8-bit seqlock version, cache-line aligned.

use std::cell::UnsafeCell;
use std::sync::atomic::AtomicU8;

/// Initial version of a freshly constructed slot.
///
/// A slot that was never written must look "already seen" to the consumer:
/// its version sits exactly at the staleness threshold, so the first
/// `try_read` against it is rejected instead of delivering zeroed payload
/// bytes. This sentinel is load-bearing - the first producer write takes the
/// counter through 255 (odd, in progress) to 0 (even, stable), which is where
/// the consumer's lap arithmetic starts.
pub const INITIAL_VERSION: u8 = u8::MAX - 1;

/// Staleness threshold for the consumer's wrap check.
///
/// With `diff = version - read_version` in 8-bit wrapping arithmetic, values
/// of 254 and 255 mean the slot's even version is one or two steps *behind*
/// the consumer's lap watermark: either the unwritten sentinel, or a value
/// left over from before the version counter wrapped past the consumer.
pub const STALE_VERSION_DIFF: u8 = u8::MAX - 1;

/// One ring entry: payload and version counter on the same cache line.
///
/// Even version ⇒ payload stable and readable. Odd version ⇒ a write is in
/// progress and the payload bytes may be a mixture. The payload itself is
/// never accessed atomically; the version gate is what makes reads coherent.
///
/// 64-byte alignment keeps neighboring slots out of each other's cache line.
#[repr(C, align(64))]
pub struct Slot<T> {
    value: UnsafeCell<T>,
    version: AtomicU8,
}

impl<T: Copy + Default> Slot<T> {
    pub(crate) fn new() -> Self {
        Self {
            value: UnsafeCell::new(T::default()),
            version: AtomicU8::new(INITIAL_VERSION),
        }
    }

    /// The slot's seqlock version counter.
    #[inline(always)]
    pub(crate) fn version(&self) -> &AtomicU8 {
        &self.version
    }

    /// Raw pointer to the payload. Callers uphold the seqlock protocol:
    /// only the producer writes through it, and only between the odd and
    /// even version bumps; the consumer copies through it and validates the
    /// version afterwards.
    #[inline(always)]
    pub(crate) fn value_ptr(&self) -> *mut T {
        self.value.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CACHE_LINE_SIZE;
    use crate::payload::{TelemetryFrame, Tick};
    use std::sync::atomic::Ordering;

    #[test]
    fn test_slot_alignment() {
        assert_eq!(std::mem::align_of::<Slot<u64>>(), CACHE_LINE_SIZE);
        assert_eq!(std::mem::align_of::<Slot<Tick>>(), CACHE_LINE_SIZE);
        assert_eq!(std::mem::align_of::<Slot<TelemetryFrame>>(), CACHE_LINE_SIZE);
    }

    #[test]
    fn test_slot_size_is_cache_line_multiple() {
        assert_eq!(std::mem::size_of::<Slot<u64>>() % CACHE_LINE_SIZE, 0);
        assert_eq!(std::mem::size_of::<Slot<TelemetryFrame>>() % CACHE_LINE_SIZE, 0);
    }

    #[test]
    fn test_fresh_slot_carries_sentinel_version() {
        let slot = Slot::<u64>::new();
        assert_eq!(slot.version().load(Ordering::Acquire), INITIAL_VERSION);
        assert_eq!(INITIAL_VERSION, 254);
    }

    #[test]
    fn test_sentinel_sits_at_staleness_threshold() {
        // diff between a fresh slot and a fresh consumer watermark of 0
        // must land in the rejected range
        assert!(INITIAL_VERSION.wrapping_sub(0) >= STALE_VERSION_DIFF);
    }
}
