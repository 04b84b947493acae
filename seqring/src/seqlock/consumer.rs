//! Consumer endpoint - non-blocking reader side of the channel

use std::cell::Cell;
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::atomic::{compiler_fence, Ordering};
use std::sync::Arc;

use crate::error::{Result, SeqringError};
use crate::seqlock::slot::STALE_VERSION_DIFF;
use crate::seqlock::SeqlockRing;

/// Reader endpoint of the channel.
///
/// [`try_read`](Self::try_read) performs an optimistic copy: load the slot
/// version, copy the payload, load the version again. The copy only counts
/// if both loads agree on an even value - otherwise a write was in flight
/// and the snapshot is discarded.
///
/// A second check guards against the 8-bit version counter wrapping: the
/// consumer tracks the even version it expects for the current lap around
/// the ring (`read_version`), and rejects slots whose version lags that
/// watermark. That is what keeps a slot written 128 laps ago - whose counter
/// has come all the way back around - from being delivered twice, and what
/// keeps a freshly constructed ring looking empty.
///
/// Like the producer, the consumer is single-threaded: `Send` but neither
/// `Clone` nor `Sync`. It visits slots strictly in index order and does not
/// necessarily see every value the producer wrote - only whatever occupies
/// each slot when it arrives.
pub struct Consumer<T: Copy + Default> {
    ring: Arc<SeqlockRing<T>>,
    /// Cached `capacity - 1`; doubles as the last slot index of a lap.
    mask: u64,
    /// Monotonic read position.
    read_pos: u64,
    /// Even version expected at the slot about to be read, for this lap.
    read_version: u8,
    _not_sync: PhantomData<Cell<()>>,
}

impl<T: Copy + Default> Consumer<T> {
    pub fn new(ring: Arc<SeqlockRing<T>>) -> Self {
        let mask = ring.mask();
        Self {
            ring,
            mask,
            read_pos: 0,
            read_version: 0,
            _not_sync: PhantomData,
        }
    }

    /// Try to copy the next unread value into `out`.
    ///
    /// Returns `true` when a fresh, coherent value was delivered. Returns
    /// `false` - leaving `out` and the consumer's position untouched - when
    /// no new value is available yet, a write is in progress on the target
    /// slot, or the slot still holds a value from a previous lap.
    ///
    /// `false` is the caller's cue to spin, yield, or do other work; the
    /// consumer never blocks.
    #[inline(always)]
    pub fn try_read(&mut self, out: &mut T) -> bool {
        let read_index = self.read_pos & self.mask;
        let slot = self.ring.slot(self.read_pos);

        let version_1 = slot.version().load(Ordering::Acquire);
        compiler_fence(Ordering::AcqRel);

        // Non-atomic payload copy into a staging buffer; only promoted to
        // `out` once the version gate proves no write overlapped it.
        let mut staging = MaybeUninit::<T>::uninit();
        unsafe { ptr::copy_nonoverlapping(slot.value_ptr(), staging.as_mut_ptr(), 1) };

        compiler_fence(Ordering::AcqRel);
        let version_2 = slot.version().load(Ordering::Acquire);

        if version_1 != version_2 || (version_1 & 1) != 0 {
            // The producer caught up and is overwriting this slot; the
            // staged bytes may be a mixture and are dropped.
            return false;
        }

        let version_diff = version_1.wrapping_sub(self.read_version);
        if version_diff >= STALE_VERSION_DIFF {
            // Either the unwritten sentinel, or a value from a previous
            // version epoch: e.g. for capacity 4 the slots can settle at
            // versions 0 0 254 254 after the counter wraps - the 254s were
            // consumed an epoch ago and must not be delivered again.
            return false;
        }

        *out = unsafe { staging.assume_init() };

        // Latch the watermark at the lap boundaries: slot 0 records the
        // version of the new lap, the last slot pre-arms the expectation
        // for the next one.
        if read_index == 0 {
            self.read_version = version_2;
        } else if read_index == self.mask {
            self.read_version = version_2.wrapping_add(2);
        }

        self.read_pos += 1;
        true
    }

    /// Number of values delivered so far.
    #[inline(always)]
    pub fn read_pos(&self) -> u64 {
        self.read_pos
    }

    /// The ring this consumer reads from.
    #[inline(always)]
    pub fn ring(&self) -> &Arc<SeqlockRing<T>> {
        &self.ring
    }
}

/// Builder for [`Consumer`]
pub struct ConsumerBuilder<T: Copy + Default> {
    ring: Option<Arc<SeqlockRing<T>>>,
}

impl<T: Copy + Default> ConsumerBuilder<T> {
    pub fn new() -> Self {
        Self { ring: None }
    }

    pub fn with_ring(mut self, ring: Arc<SeqlockRing<T>>) -> Self {
        self.ring = Some(ring);
        self
    }

    pub fn build(self) -> Result<Consumer<T>> {
        let ring = self.ring.ok_or_else(|| SeqringError::config("ring not set"))?;
        Ok(Consumer::new(ring))
    }
}

impl<T: Copy + Default> Default for ConsumerBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seqlock::{channel, Producer};

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    struct Sample {
        x: u64,
        y: u64,
        z: u32,
    }

    fn pair(capacity: u64) -> (Producer<Sample>, Consumer<Sample>) {
        channel::<Sample>(capacity).unwrap()
    }

    #[test]
    fn test_fresh_ring_reads_empty() {
        let (_producer, mut consumer) = pair(4);
        let mut out = Sample::default();

        // The sentinel version must never be mistaken for data, and failed
        // reads must not move the consumer.
        for _ in 0..1000 {
            assert!(!consumer.try_read(&mut out));
        }
        assert_eq!(consumer.read_pos(), 0);
    }

    #[test]
    fn test_lockstep_write_read() {
        let (mut producer, mut consumer) = pair(4);
        let mut out = Sample::default();

        assert!(!consumer.try_read(&mut out));

        for i in 0..20_000u64 {
            producer.write(Sample {
                x: i,
                y: i * 100,
                z: (i + 200) as u32,
            });

            assert!(consumer.try_read(&mut out));
            assert_eq!(out.x, i);
            assert_eq!(out.y, i * 100);
            assert_eq!(out.z, (i + 200) as u32);

            // Queue is empty again
            assert!(!consumer.try_read(&mut out));
        }

        assert!(!consumer.try_read(&mut out));
    }

    #[test]
    fn test_full_queue_batches() {
        let capacity = 4u64;
        let (mut producer, mut consumer) = pair(capacity);
        let mut out = Sample::default();

        assert!(!consumer.try_read(&mut out));

        for iteration in 0..2000u64 {
            for i in 0..capacity {
                producer.write_with(|value| {
                    value.x = i + iteration;
                    value.y = i + iteration + 100;
                    value.z = (i + iteration + 200) as u32;
                });
            }

            let mut total_reads = 0u64;
            while consumer.try_read(&mut out) {
                assert_eq!(out.x, total_reads + iteration);
                assert_eq!(out.y, total_reads + iteration + 100);
                assert_eq!(out.z, (total_reads + iteration + 200) as u32);
                total_reads += 1;
            }
            assert_eq!(total_reads, capacity);

            // Queue is empty again
            assert!(!consumer.try_read(&mut out));
        }
    }

    #[test]
    fn test_version_wrap_without_reads() {
        let capacity = 4u64;
        let (mut producer, mut consumer) = pair(capacity);
        let mut out = Sample::default();

        assert!(!consumer.try_read(&mut out));

        // 128 full laps bring every slot's version back to the sentinel
        for lap in 0..128u64 {
            for i in 0..capacity {
                producer.write(Sample {
                    x: i + lap,
                    y: i + lap + 100,
                    z: (i + lap + 200) as u32,
                });
            }
        }

        // Two more writes wrap slots 0 and 1 to version 0; the ring now
        // holds versions 0 0 254 254
        for _ in 0..2 {
            producer.write(Sample {
                x: 1337,
                y: 1127,
                z: 11271,
            });
        }

        // Only the two post-wrap values are deliverable; the 254s were
        // written an epoch ago relative to where slots 0 and 1 now stand
        let mut total_reads = 0u64;
        while consumer.try_read(&mut out) {
            assert_eq!(out.x, 1337);
            assert_eq!(out.y, 1127);
            assert_eq!(out.z, 11271);
            total_reads += 1;
        }
        assert_eq!(total_reads, 2);

        assert!(!consumer.try_read(&mut out));
    }

    #[test]
    fn test_consume_then_version_wrap() {
        let capacity = 4u64;
        let (mut producer, mut consumer) = pair(capacity);
        let mut out = Sample::default();

        assert!(!consumer.try_read(&mut out));

        // Consume two full laps so the watermark has advanced off its
        // initial value before the producer runs away
        for _ in 0..2 {
            for i in 0..capacity {
                producer.write(Sample {
                    x: i,
                    y: i,
                    z: i as u32,
                });
            }

            let mut total_reads = 0u64;
            while consumer.try_read(&mut out) {
                total_reads += 1;
            }
            assert_eq!(total_reads, capacity);
        }

        // 126 unread laps, completing the wrap relative to the consumer
        for lap in 0..126u64 {
            for i in 0..capacity {
                producer.write(Sample {
                    x: i + lap,
                    y: i + lap + 100,
                    z: (i + lap + 200) as u32,
                });
            }
        }

        for _ in 0..2 {
            producer.write(Sample {
                x: 1337,
                y: 1127,
                z: 11271,
            });
        }

        let mut total_reads = 0u64;
        while consumer.try_read(&mut out) {
            assert_eq!(out.x, 1337);
            assert_eq!(out.y, 1127);
            assert_eq!(out.z, 11271);
            total_reads += 1;
        }
        assert_eq!(total_reads, 2);

        assert!(!consumer.try_read(&mut out));
    }

    #[test]
    fn test_drained_values_never_redeliver() {
        let (mut producer, mut consumer) = pair(4);
        let mut out = Sample::default();

        producer.write(Sample { x: 1, y: 2, z: 3 });
        assert!(consumer.try_read(&mut out));

        // The accepted slot must not satisfy another read until the
        // producer writes again
        for _ in 0..100 {
            assert!(!consumer.try_read(&mut out));
        }

        producer.write(Sample { x: 4, y: 5, z: 6 });
        assert!(consumer.try_read(&mut out));
        assert_eq!(out, Sample { x: 4, y: 5, z: 6 });
    }

    #[test]
    fn test_failed_read_leaves_out_untouched() {
        let (mut producer, mut consumer) = pair(4);

        producer.write(Sample { x: 9, y: 9, z: 9 });
        let mut out = Sample::default();
        assert!(consumer.try_read(&mut out));

        let before = out;
        assert!(!consumer.try_read(&mut out));
        assert_eq!(out, before);
    }

    #[test]
    fn test_overwrite_drops_older_values() {
        let capacity = 4u64;
        let (mut producer, mut consumer) = pair(capacity);
        let mut out = Sample::default();

        // Producer laps the idle consumer twice; only the values currently
        // occupying the slots are deliverable, in slot order
        for i in 0..(capacity * 2) {
            producer.write(Sample {
                x: i,
                y: 0,
                z: 0,
            });
        }

        let mut delivered = Vec::new();
        while consumer.try_read(&mut out) {
            delivered.push(out.x);
        }
        assert_eq!(delivered, vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_builder() {
        let ring = Arc::new(SeqlockRing::<u64>::new(8).unwrap());
        let consumer = ConsumerBuilder::new().with_ring(ring).build().unwrap();
        assert_eq!(consumer.read_pos(), 0);

        let missing: Result<Consumer<u64>> = ConsumerBuilder::new().build();
        assert!(missing.is_err());
    }
}
