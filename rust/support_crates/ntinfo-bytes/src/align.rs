/// Returns the smallest power of two that is greater than or equal to `n`.
///
/// If `n` is already a power of two, it is returned unchanged. Otherwise the result is
/// `2^bit_length(n)`.
///
/// # Examples
///
/// ```
/// use ntinfo_bytes::align::round_up_pow2;
///
/// assert_eq!(round_up_pow2(1), 1);
/// assert_eq!(round_up_pow2(3), 4);
/// assert_eq!(round_up_pow2(24), 32);
/// assert_eq!(round_up_pow2(32), 32);
/// assert_eq!(round_up_pow2(33), 64);
/// ```
///
/// # Panics
///
/// Panics if `n` is zero, or if the result does not fit in `usize`.
#[inline]
pub fn round_up_pow2(n: usize) -> usize {
    assert!(n > 0, "round_up_pow2 requires a positive size");
    if n.is_power_of_two() {
        return n;
    }
    1usize
        .checked_shl(bit_length(n))
        .expect("round_up_pow2 overflow")
}

/// Returns the number of bits required to represent `n`, i.e. the position of the
/// highest set bit plus one. `bit_length(0)` is zero.
///
/// # Examples
///
/// ```
/// use ntinfo_bytes::align::bit_length;
///
/// assert_eq!(bit_length(0), 0);
/// assert_eq!(bit_length(1), 1);
/// assert_eq!(bit_length(24), 5);
/// assert_eq!(bit_length(255), 8);
/// ```
#[inline]
pub fn bit_length(n: usize) -> u32 {
    usize::BITS - n.leading_zeros()
}

/// Aligns a number up to the next multiple of the specified alignment.
///
/// # Panics
///
/// This function will panic in debug builds if `alignment` is 0 or is not a power of 2,
/// and in all builds if the result overflows.
#[inline]
pub fn align_up(n: usize, alignment: usize) -> usize {
    debug_assert_ne!(alignment, 0);
    debug_assert!(alignment.is_power_of_two());
    n.checked_add(alignment - 1).expect("add") & !(alignment - 1)
}

/// Aligns a number down to the previous multiple of the specified alignment.
#[inline]
pub fn align_down(n: usize, alignment: usize) -> usize {
    debug_assert_ne!(alignment, 0);
    debug_assert!(alignment.is_power_of_two());
    n & !(alignment - 1)
}

/// Checks if a pointer is aligned to the specified alignment boundary.
#[inline]
pub fn is_aligned_ptr(ptr: *const u8, alignment: usize) -> bool {
    alignment.is_power_of_two() && ((ptr as usize) & (alignment - 1)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_up_pow2_is_smallest_power_above() {
        for n in 1..=5000usize {
            let p = round_up_pow2(n);
            assert!(p.is_power_of_two());
            assert!(p >= n);
            assert!(p / 2 < n, "n={n} p={p}");
            assert_eq!(p == n, n.is_power_of_two());
        }
    }

    #[test]
    fn test_round_up_pow2_large_values() {
        let top = 1usize << (usize::BITS - 1);
        assert_eq!(round_up_pow2(top), top);
        assert_eq!(round_up_pow2(top - 1), top);
        assert_eq!(round_up_pow2((1 << 20) + 1), 1 << 21);
    }

    #[test]
    #[should_panic(expected = "positive size")]
    fn test_round_up_pow2_zero() {
        round_up_pow2(0);
    }

    #[test]
    #[should_panic(expected = "overflow")]
    fn test_round_up_pow2_overflow() {
        round_up_pow2((1usize << (usize::BITS - 1)) + 1);
    }

    #[test]
    fn test_align() {
        assert_eq!(align_up(0, 64), 0);
        assert_eq!(align_up(1, 64), 64);
        assert_eq!(align_up(64, 64), 64);
        assert_eq!(align_up(65, 64), 128);
        assert_eq!(align_down(127, 64), 64);
        assert_eq!(align_down(128, 64), 128);
        assert!(is_aligned_ptr(128 as *const u8, 64));
        assert!(!is_aligned_ptr(129 as *const u8, 2));
    }
}
