//! Ready-made payload types for the seqlock channel.
//!
//! Any `Copy + Default` plain-data type works as a payload; these are the
//! shapes the benchmarks, example and stress tests use.
//!
//! - [`Tick`] (24 bytes): a minimal market-data update
//! - [`TelemetryFrame`] (64 bytes): a cache-line-sized frame carrying its own
//!   CRC32, so a reader can prove it never observed a byte mixture the
//!   producer did not write

use crc32fast::Hasher;

/// A minimal market-data tick: price, quantity, venue.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tick {
    pub price: u64,
    pub qty: u64,
    pub venue: u32,
}

/// Self-verifying telemetry frame.
///
/// `samples` is derived from `seq`, and `checksum` covers both. A frame that
/// was copied out of a slot mid-overwrite fails [`verify`](Self::verify)
/// with overwhelming probability.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TelemetryFrame {
    pub seq: u64,
    pub samples: [u64; 6],
    pub checksum: u32,
}

impl TelemetryFrame {
    /// Build a sealed frame for the given sequence number.
    pub fn new(seq: u64) -> Self {
        let mut frame = Self {
            seq,
            samples: [0; 6],
            checksum: 0,
        };
        for (i, sample) in frame.samples.iter_mut().enumerate() {
            *sample = seq.wrapping_mul(0x9e37_79b9_7f4a_7c15).wrapping_add(i as u64);
        }
        frame.seal();
        frame
    }

    /// Recompute and store the checksum over `seq` and `samples`.
    pub fn seal(&mut self) {
        self.checksum = self.digest();
    }

    /// Check the stored checksum against the frame contents.
    pub fn verify(&self) -> bool {
        self.checksum == self.digest()
    }

    fn digest(&self) -> u32 {
        let mut hasher = Hasher::new();
        hasher.update(&self.seq.to_le_bytes());
        for sample in &self.samples {
            hasher.update(&sample.to_le_bytes());
        }
        hasher.finalize()
    }
}
