//! Core constants for slot layout and capacity handling.

/// Cache line size for slot alignment (64 bytes on most CPUs)
pub const CACHE_LINE_SIZE: usize = 64;

/// Huge page size used to round mapped allocations (2MB on Linux)
pub const HUGE_PAGE_SIZE: usize = 2 * 1024 * 1024;

/// Smallest effective ring capacity.
///
/// A single-slot ring cannot tell "new lap" from "same write" - the lap
/// watermark needs a distinct first and last slot - so requested capacities
/// below 2 are rounded up to 2.
pub const MIN_CAPACITY: u64 = 2;

/// Largest effective ring capacity. Requests above this clamp to it.
pub const MAX_CAPACITY: u64 = 1 << 63;
