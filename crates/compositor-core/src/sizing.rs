//! Sizing heuristic for the compositor's internal frame cache.
//!
//! The compositor keeps recently rendered frames in memory to serve repeat
//! requests cheaply. The cache capacity is derived from host free memory so
//! that low-memory hosts do not get swapped to death, while high-memory hosts
//! do not over-commit.

use crate::constants::{BYTES_PER_FRAME, MAX_FRAME_CACHE_CAPACITY, MIN_FRAME_CACHE_CAPACITY};
use sysinfo::System;

/// Derives a frame-cache capacity from a free-memory reading, in bytes.
///
/// `⌊free_memory_bytes / BYTES_PER_FRAME⌋`, clamped to
/// `[MIN_FRAME_CACHE_CAPACITY, MAX_FRAME_CACHE_CAPACITY]`.
pub fn frame_cache_capacity_from_free_bytes(free_memory_bytes: u64) -> u32 {
    let estimate = free_memory_bytes / BYTES_PER_FRAME;
    let estimate = u32::try_from(estimate).unwrap_or(u32::MAX);
    estimate.clamp(MIN_FRAME_CACHE_CAPACITY, MAX_FRAME_CACHE_CAPACITY)
}

/// Reads host free memory and derives the frame-cache capacity to pass to the
/// compositor's start command.
pub fn frame_cache_capacity() -> u32 {
    let mut system = System::new();
    system.refresh_memory();
    frame_cache_capacity_from_free_bytes(system.free_memory())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, MIN_FRAME_CACHE_CAPACITY)]
    #[case(1024, MIN_FRAME_CACHE_CAPACITY)]
    #[case(1024 * 1024 * 1024, MIN_FRAME_CACHE_CAPACITY)] // 1 GiB -> floor(170) -> clamped up
    #[case(100 * 1024 * 1024 * 1024, MAX_FRAME_CACHE_CAPACITY)] // 100 GiB -> clamped down
    fn clamps_to_bounds(#[case] free_bytes: u64, #[case] expected: u32) {
        assert_eq!(frame_cache_capacity_from_free_bytes(free_bytes), expected);
    }

    #[test]
    fn mid_range_value_is_exact_floor_division() {
        // 6000 MiB free / 6 MiB per frame = exactly 1000 frames, within bounds.
        let free_bytes = 6000 * 1024 * 1024;
        assert_eq!(frame_cache_capacity_from_free_bytes(free_bytes), 1000);
    }

    #[test]
    fn never_exceeds_upper_bound_even_near_u64_max() {
        assert_eq!(
            frame_cache_capacity_from_free_bytes(u64::MAX),
            MAX_FRAME_CACHE_CAPACITY
        );
    }
}
