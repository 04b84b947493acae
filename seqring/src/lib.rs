//! # seqring
//!
//! A bounded **single-producer / single-consumer** queue built on a per-slot
//! seqlock, for fixed-size, trivially copyable payloads.
//!
//! The queue is a lock-free channel between two cooperating threads. The
//! producer is wait-free: it never blocks and never fails. The consumer is a
//! non-blocking poller: [`Consumer::try_read`] either delivers the next
//! coherent value or returns `false`. If the producer outruns the consumer,
//! older entries are overwritten silently - this is a "newest coherent value
//! or skip" channel, not a reliable FIFO.
//!
//! ## Features
//!
//! * **Wait-free producer** - two atomic version bumps per publish, no CAS
//! * **Torn-read immunity** - the consumer re-checks the slot version around
//!   every payload copy and discards inconsistent snapshots
//! * **No double delivery** - an 8-bit lap watermark rejects slots left over
//!   from a previous trip around the ring, even across version wrap
//! * **Cache-aligned slots** - payload and version share a cache line, slots
//!   never share one with each other
//! * **Heap or mmap storage** - optional `mlock`ed mapping with a huge-page
//!   hint on Linux
//! * Zero allocations after construction
//!
//! ## Intended workloads
//!
//! Market-data fan-out, telemetry relays, audio buffers - pipelines where the
//! producer must never stall and the consumer tolerates skipping to the
//! newest value.
//!
//! ## Quick example
//!
//! ```
//! let (mut tx, mut rx) = seqring::channel::<u64>(8)?;
//!
//! tx.write(42);
//!
//! let mut out = 0u64;
//! assert!(rx.try_read(&mut out));
//! assert_eq!(out, 42);
//! assert!(!rx.try_read(&mut out));
//! # Ok::<(), seqring::SeqringError>(())
//! ```
//!
//! ## Design overview
//!
//! Each slot carries an 8-bit atomic version counter. Even means stable, odd
//! means a write is in progress. The producer brackets every payload store
//! with two `fetch_add(1, Release)` bumps; the consumer brackets every
//! payload copy with two `Acquire` loads and accepts only when both loads
//! agree on an even value. A per-consumer watermark tracks the even version
//! expected for the current lap, so values written 128 laps ago (when the
//! counter has wrapped back to the same parity) are rejected rather than
//! re-delivered. See the [`seqlock`] module for the full protocol.

#[cfg(not(unix))]
compile_error!("This crate only supports Unix-like operating systems.");

pub mod constants;
pub mod cpu;
pub mod error;
pub mod payload;
pub mod seqlock;

pub use error::{Result, SeqringError};
pub use seqlock::{
    channel,
    channel_mapped,
    Consumer,
    ConsumerBuilder,
    Producer,
    ProducerBuilder,
    SeqlockRing,
};
