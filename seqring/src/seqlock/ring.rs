//! SeqlockRing - slot storage for the SPSC seqlock channel
//!
//! Owns a power-of-two array of cache-line-aligned slots. The requested
//! capacity is rounded up, never down.
//!
//! ## Allocation strategies
//!
//! - `new()` - standard heap allocation
//! - `new_mapped()` - anonymous mmap with mlock, optionally backed by huge
//!   pages (Linux, hint only)
//!
//! Endpoints share the ring through an `Arc` and index it with `pos & mask`;
//! the ring itself holds no cursors and no protocol state.

use std::ptr;
use std::sync::Arc;

use crate::constants::{HUGE_PAGE_SIZE, MAX_CAPACITY, MIN_CAPACITY};
use crate::error::{Result, SeqringError};
use crate::seqlock::slot::Slot;
use crate::seqlock::{Consumer, Producer};

/// Round a requested capacity to the effective slot count.
///
/// Smallest power of two >= the request, floored at [`MIN_CAPACITY`] and
/// clamped at [`MAX_CAPACITY`].
pub(crate) fn effective_capacity(requested: u64) -> u64 {
    if requested >= MAX_CAPACITY {
        return MAX_CAPACITY;
    }
    requested.max(MIN_CAPACITY).next_power_of_two()
}

/// Slot storage shared by one [`Producer`] and one [`Consumer`].
pub struct SeqlockRing<T: Copy + Default> {
    /// Direct pointer to the slot array (no enum dispatch in the hot path)
    slots: *mut Slot<T>,
    /// Effective capacity, always a power of two >= 2
    capacity: u64,
    /// Mask for fast index calculation
    mask: u64,
    /// Keep heap allocation alive (None for mmap)
    _heap: Option<Box<[Slot<T>]>>,
    /// Byte length of the mapping, 0 for heap storage (used by Drop)
    mapped_len: usize,
}

impl<T: Copy + Default> SeqlockRing<T> {
    /// Create a ring with heap-allocated storage.
    ///
    /// `capacity` is rounded up to the next power of two (minimum 2).
    /// Requests above 2^63 clamp to 2^63 rather than failing.
    pub fn new(capacity: u64) -> Result<Self> {
        let capacity = effective_capacity(capacity);

        let buffer: Box<[Slot<T>]> = (0..capacity)
            .map(|_| Slot::new())
            .collect::<Vec<_>>()
            .into_boxed_slice();

        let slots = buffer.as_ptr() as *mut Slot<T>;

        Ok(Self {
            slots,
            capacity,
            mask: capacity - 1,
            _heap: Some(buffer),
            mapped_len: 0,
        })
    }

    /// Create a ring backed by an anonymous memory mapping.
    ///
    /// The mapping is `mlock`ed to keep slots resident. With `huge_pages`
    /// set, Linux is asked for 2MB pages to cut TLB pressure on large rings;
    /// the flag is a hint - if the huge-page pool is empty or the platform
    /// has no such thing, the ring silently falls back to normal pages.
    pub fn new_mapped(capacity: u64, huge_pages: bool) -> Result<Self> {
        let capacity = effective_capacity(capacity);

        let exact_len = (capacity as usize)
            .checked_mul(std::mem::size_of::<Slot<T>>())
            .ok_or_else(|| SeqringError::allocation("slot array size overflows usize"))?;

        let (ptr, mapped_len) = Self::map_slots(exact_len, huge_pages)?;
        let slots = ptr as *mut Slot<T>;

        // The mapping is zeroed, but a zero version byte would read as
        // "stable, current lap". Every slot gets the sentinel.
        for i in 0..capacity as usize {
            unsafe { ptr::write(slots.add(i), Slot::new()) };
        }

        Ok(Self {
            slots,
            capacity,
            mask: capacity - 1,
            _heap: None,
            mapped_len,
        })
    }

    fn map_slots(exact_len: usize, huge_pages: bool) -> Result<(*mut u8, usize)> {
        // MAP_HUGETLB requires the length to be a multiple of the page size
        let huge_len = exact_len.div_ceil(HUGE_PAGE_SIZE) * HUGE_PAGE_SIZE;

        if huge_pages {
            if let Ok(ptr) = Self::mmap_anon(huge_len, true) {
                return Ok((ptr, huge_len));
            }
        }

        let ptr = Self::mmap_anon(exact_len, false)?;
        Ok((ptr, exact_len))
    }

    fn mmap_anon(len: usize, huge_pages: bool) -> Result<*mut u8> {
        let mut flags = libc::MAP_PRIVATE | libc::MAP_ANONYMOUS;

        #[cfg(target_os = "linux")]
        if huge_pages {
            flags |= libc::MAP_HUGETLB;
        }
        #[cfg(not(target_os = "linux"))]
        let _ = huge_pages;

        let ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                flags,
                -1,
                0,
            )
        };

        if ptr == libc::MAP_FAILED {
            return Err(SeqringError::allocation(format!(
                "mmap failed: {}",
                std::io::Error::last_os_error()
            )));
        }

        // Lock memory to prevent swapping; failure is not fatal
        unsafe {
            let _ = libc::mlock(ptr, len);
        }

        Ok(ptr as *mut u8)
    }

    /// Effective capacity (power of two, >= the requested capacity).
    #[inline(always)]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    #[inline(always)]
    pub(crate) fn mask(&self) -> u64 {
        self.mask
    }

    /// Slot for a monotonic position; wraps via the capacity mask.
    #[inline(always)]
    pub(crate) fn slot(&self, pos: u64) -> &Slot<T> {
        unsafe { &*self.slots.add((pos & self.mask) as usize) }
    }

    /// Split a freshly built ring into its endpoint pair.
    pub fn into_endpoints(self) -> (Producer<T>, Consumer<T>) {
        let ring = Arc::new(self);
        (Producer::new(ring.clone()), Consumer::new(ring))
    }
}

impl<T: Copy + Default> Drop for SeqlockRing<T> {
    fn drop(&mut self) {
        if self.mapped_len > 0 && !self.slots.is_null() {
            unsafe {
                libc::munmap(self.slots as *mut libc::c_void, self.mapped_len);
            }
        }
        // Heap storage (_heap) is dropped automatically; payloads are Copy
        // and need no teardown.
    }
}

unsafe impl<T: Copy + Default + Send> Send for SeqlockRing<T> {}
unsafe impl<T: Copy + Default + Send> Sync for SeqlockRing<T> {}
