// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! SimulatedWorkingSet - inflates the parent's resident set.
//!
//! Maps a private anonymous region and touches every byte so the pages are
//! physically backed while the strategies run. A full duplicate has to copy
//! page tables for all of it; the other two strategies should not care.

use std::ptr::NonNull;

use nix::errno::Errno;

use crate::error::ResourceError;
use crate::types::ResidentSetSize;

/// Byte written across the region. Non-zero so the kernel cannot keep
/// the pages on the shared zero page.
pub const FILL_PATTERN: u8 = 0x55;

/// A mapped, fully touched anonymous memory region.
///
/// Owned by one timing run. `release` unmaps it; if the value is dropped
/// without being released, the region is unmapped on drop instead.
pub struct SimulatedWorkingSet {
    /// Start of the mapping, `None` when the configured size is zero.
    ptr: Option<NonNull<u8>>,
    /// Size of the mapping in bytes.
    size: usize,
}

impl SimulatedWorkingSet {
    /// Map and fill a region of `size` bytes.
    ///
    /// # Errors
    /// Returns ResourceError::MapFailed if the kernel refuses the mapping.
    pub fn acquire(size: ResidentSetSize) -> Result<Self, ResourceError> {
        let size = size.bytes() as usize;
        if size == 0 {
            tracing::debug!("Simulated working set disabled (size 0)");
            return Ok(Self { ptr: None, size });
        }

        // SAFETY: anonymous private mapping, no fd, kernel picks the address
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };

        if ptr == libc::MAP_FAILED {
            return Err(ResourceError::MapFailed {
                size,
                source: Errno::last(),
            });
        }

        let ptr = NonNull::new(ptr as *mut u8).ok_or(ResourceError::MapFailed {
            size,
            source: Errno::EFAULT,
        })?;

        // SAFETY: ptr is a fresh writable mapping of exactly `size` bytes
        unsafe {
            std::ptr::write_bytes(ptr.as_ptr(), FILL_PATTERN, size);
        }

        tracing::debug!(size = size, "Mapped simulated working set");

        Ok(Self {
            ptr: Some(ptr),
            size,
        })
    }

    /// Size of the region in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether a region is actually mapped.
    pub fn is_mapped(&self) -> bool {
        self.ptr.is_some()
    }

    /// Read-only view of the region (empty when nothing is mapped).
    pub fn as_slice(&self) -> &[u8] {
        match self.ptr {
            // SAFETY: the mapping lives as long as self and is only written at acquire
            Some(ptr) => unsafe { std::slice::from_raw_parts(ptr.as_ptr(), self.size) },
            None => &[],
        }
    }

    /// Unmap the region.
    pub fn release(mut self) -> Result<(), ResourceError> {
        self.unmap()
    }

    fn unmap(&mut self) -> Result<(), ResourceError> {
        let Some(ptr) = self.ptr.take() else {
            return Ok(());
        };

        // SAFETY: ptr and size come from the successful mmap in acquire
        let result = unsafe { libc::munmap(ptr.as_ptr() as *mut libc::c_void, self.size) };
        if result < 0 {
            return Err(ResourceError::UnmapFailed {
                size: self.size,
                source: Errno::last(),
            });
        }

        tracing::debug!(size = self.size, "Unmapped simulated working set");
        Ok(())
    }
}

impl Drop for SimulatedWorkingSet {
    fn drop(&mut self) {
        if let Err(e) = self.unmap() {
            tracing::error!(error = %e, "Failed to unmap simulated working set");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_fills_pattern() {
        let set = SimulatedWorkingSet::acquire(ResidentSetSize::new(4096 * 3)).unwrap();
        assert!(set.is_mapped());
        assert_eq!(set.size(), 4096 * 3);
        assert!(set.as_slice().iter().all(|&b| b == FILL_PATTERN));
        set.release().unwrap();
    }

    #[test]
    fn test_unaligned_size() {
        let set = SimulatedWorkingSet::acquire(ResidentSetSize::new(1000)).unwrap();
        assert_eq!(set.as_slice().len(), 1000);
        set.release().unwrap();
    }

    #[test]
    fn test_zero_size_maps_nothing() {
        let set = SimulatedWorkingSet::acquire(ResidentSetSize::new(0)).unwrap();
        assert!(!set.is_mapped());
        assert!(set.as_slice().is_empty());
        set.release().unwrap();
    }

    #[test]
    fn test_drop_without_release() {
        let set = SimulatedWorkingSet::acquire(ResidentSetSize::new(8192)).unwrap();
        drop(set);
    }
}
