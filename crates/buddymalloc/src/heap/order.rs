//! Buddy orders for the arena.
//!
//! Order `k` covers a granule of `128 << k` bytes, header included:
//! 128 B at order 0 up to 128 KiB at order 10. The arena is carved into
//! 32 maximum-order blocks, so its footprint and alignment are both 4 MiB,
//! which keeps every address-XOR buddy inside the arena.

/// Smallest granule (order 0), bytes, header included.
pub const MIN_GRANULE: usize = 128;

/// Largest buddy order.
pub const MAX_ORDER: usize = 10;

/// Number of order lists, 0..=10.
pub const NUM_ORDERS: usize = MAX_ORDER + 1;

/// Granule of the largest order (128 KiB). Anything with a larger gross
/// size goes to a standalone page mapping.
pub const MAX_GRANULE: usize = MIN_GRANULE << MAX_ORDER;

/// Maximum-order blocks carved at init.
pub const ARENA_BLOCKS: usize = 32;

/// Arena footprint: 32 * 128 KiB = 4 MiB.
pub const ARENA_SIZE: usize = ARENA_BLOCKS * MAX_GRANULE;

/// Required arena base alignment. Equal to the footprint so the XOR buddy
/// of any interior block stays inside the arena.
pub const ARENA_ALIGN: usize = ARENA_SIZE;

/// Granule of order `k` in bytes.
#[inline(always)]
pub const fn granule(order: usize) -> usize {
    MIN_GRANULE << order
}

/// Smallest order whose granule holds `gross` bytes (header included).
/// `gross` must not exceed `MAX_GRANULE`.
#[inline]
pub fn order_for(gross: usize) -> usize {
    debug_assert!(0 < gross && gross <= MAX_GRANULE);
    let granules = gross.div_ceil(MIN_GRANULE);
    granules.next_power_of_two().trailing_zeros() as usize
}

/// Order of an exact power-of-two granule.
#[inline(always)]
pub fn of_granule(size: usize) -> usize {
    debug_assert!(size.is_power_of_two() && size >= MIN_GRANULE && size <= MAX_GRANULE);
    (size / MIN_GRANULE).trailing_zeros() as usize
}
