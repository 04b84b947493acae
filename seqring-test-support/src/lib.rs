//! # seqring-test-support
//!
//! Testing infrastructure for the seqring channel.
//!
//! ## Components
//!
//! - **StressCounters** - shared counters for two-thread stress runs
//! - **FrameVerifier** - checksum pass/fail tally for delivered frames
//! - **MonotonicChecker** - strictly-increasing-with-gaps sequence check
//!
//! The channel is overwriting by design, so skipped values are reported as a
//! skip rate, never as an error. Errors are torn payloads (checksum failure)
//! and deliveries that go backwards or repeat (ordering violation).

pub mod stress;
pub mod verify;

pub use stress::{StressCounters, StressMetrics};
pub use verify::{FrameVerifier, MonotonicChecker};
