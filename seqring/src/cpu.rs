//! CPU affinity helpers for benchmarks and stress tests.
//!
//! Pinning the producer and consumer to distinct cores keeps two-thread
//! timing runs repeatable. Platforms without an affinity API treat the call
//! as a no-op.

use crate::error::{Result, SeqringError};

/// Pin the calling thread to one logical CPU.
///
/// On macOS the kernel treats the request as a placement hint rather than a
/// hard binding.
pub fn pin_to_cpu(cpu_id: usize) -> Result<()> {
    match platform::set_thread_affinity(cpu_id) {
        0 => Ok(()),
        rc => Err(SeqringError::system_resource(format!(
            "failed to pin thread to CPU {} (rc {})",
            cpu_id, rc
        ))),
    }
}

#[cfg(target_os = "linux")]
mod platform {
    pub(super) fn set_thread_affinity(cpu_id: usize) -> i32 {
        unsafe {
            let mut cpu_set = std::mem::zeroed::<libc::cpu_set_t>();
            libc::CPU_SET(cpu_id, &mut cpu_set);
            libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &cpu_set)
        }
    }
}

#[cfg(target_os = "macos")]
mod platform {
    pub(super) fn set_thread_affinity(cpu_id: usize) -> i32 {
        // Affinity tag 0 means "no affinity"; shift so CPU 0 gets a real tag.
        let mut policy = libc::thread_affinity_policy_data_t {
            affinity_tag: cpu_id as i32 + 1,
        };

        unsafe {
            let thread = libc::pthread_mach_thread_np(libc::pthread_self());
            libc::thread_policy_set(
                thread,
                libc::THREAD_AFFINITY_POLICY as u32,
                &mut policy as *mut _ as *mut i32,
                libc::THREAD_AFFINITY_POLICY_COUNT,
            )
        }
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
mod platform {
    pub(super) fn set_thread_affinity(_cpu_id: usize) -> i32 {
        0
    }
}
