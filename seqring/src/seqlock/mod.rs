//! Bounded SPSC queue built on a per-slot seqlock.
//!
//! ## Protocol
//!
//! Every slot pairs its payload with an 8-bit atomic version counter:
//!
//! | Version | Meaning |
//! |---------|---------|
//! | even    | payload stable, readable |
//! | odd     | write in progress, payload may be a byte mixture |
//! | 254 (initial) | never written, rejected as "already seen" |
//!
//! The producer brackets each payload store with two `fetch_add(1, Release)`
//! bumps (even -> odd -> even). The consumer brackets each payload copy with
//! two `Acquire` loads and accepts only when both agree on an even value; a
//! per-lap watermark additionally rejects values left over from before the
//! counter wrapped. Payloads are never accessed atomically - the version
//! gate plus the acquire/release pairing is the whole synchronization story.
//! There are no locks and no CAS anywhere.
//!
//! ## Module organization
//!
//! - `slot` - slot layout and version constants
//! - `ring` - storage: capacity rounding, heap / mmap allocation
//! - `producer` - wait-free writer endpoint
//! - `consumer` - non-blocking reader endpoint

pub mod consumer;
pub mod producer;
pub mod ring;
pub mod slot;

pub use consumer::{Consumer, ConsumerBuilder};
pub use producer::{Producer, ProducerBuilder};
pub use ring::SeqlockRing;
pub use slot::INITIAL_VERSION;

use crate::error::Result;

/// Create a heap-backed channel, returning its endpoint pair.
///
/// `capacity` is rounded up to the next power of two (minimum 2). Move the
/// [`Producer`] to the writing thread and the [`Consumer`] to the reading
/// thread; each endpoint is single-threaded within itself.
pub fn channel<T: Copy + Default>(capacity: u64) -> Result<(Producer<T>, Consumer<T>)> {
    Ok(SeqlockRing::new(capacity)?.into_endpoints())
}

/// Create an mmap-backed channel, optionally requesting huge pages.
///
/// The huge-page flag is a hint; see [`SeqlockRing::new_mapped`].
pub fn channel_mapped<T: Copy + Default>(
    capacity: u64,
    huge_pages: bool,
) -> Result<(Producer<T>, Consumer<T>)> {
    Ok(SeqlockRing::new_mapped(capacity, huge_pages)?.into_endpoints())
}
