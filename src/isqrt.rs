//! Integer square roots for fixed-point RMS computation.
//!
//! Two independent algorithms compute `floor(sqrt(x))`:
//! * [`isqrt_wide`]: bitwise binary search over a 64-bit input
//! * [`isqrt_narrow`]: digit-by-digit recurrence over a 32-bit input,
//!   producing a 16-bit root without any 64-bit multiplications
//!
//! Both agree exactly on every `u32` input. The narrow variant is the one
//! to use on cores without a fast 64-bit multiplier.

/// Computes the integer square root of a 64-bit value.
///
/// Tests candidate bits from the most significant to the least significant,
/// keeping a bit whenever the square of the candidate does not exceed `x`.
/// Always takes 32 iterations.
///
/// # Returns
///
/// `floor(sqrt(x))`, which for any `u64` fits in a `u32`
#[must_use]
pub const fn isqrt_wide(x: u64) -> u32 {
    let mut bit: u64 = 1 << 31;
    let mut root: u64 = 0;

    while bit != 0 {
        // at most (2^32 - 1)^2, so this cannot overflow
        let candidate = root | bit;
        if candidate * candidate <= x {
            root = candidate;
        }
        bit >>= 1;
    }

    root as u32
}

/// Computes the integer square root of a 32-bit value.
///
/// Digit-by-digit (restoring) recurrence: for each result bit `b` from the
/// top, the cost of setting it is `(root + b)^2 - root^2 = (2 * root + b) * b`,
/// which is taken from the remainder when it fits. All intermediates stay
/// below `2^31`.
///
/// # Returns
///
/// `floor(sqrt(x))`
#[must_use]
pub const fn isqrt_narrow(x: u32) -> u16 {
    let mut remainder = x;
    let mut root: u32 = 0;
    let mut shift = 16;

    while shift > 0 {
        shift -= 1;
        let bit = 1 << shift;
        let trial = ((root << 1) + bit) << shift;
        if remainder >= trial {
            root += bit;
            remainder -= trial;
        }
    }

    root as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_floor_sqrt(x: u64) {
        let root = u128::from(isqrt_wide(x));
        let x = u128::from(x);
        assert!(root * root <= x, "{root}^2 > {x}");
        assert!((root + 1) * (root + 1) > x, "({root} + 1)^2 <= {x}");
    }

    #[test]
    fn wide_edges() {
        assert_eq!(isqrt_wide(0), 0);
        assert_eq!(isqrt_wide(1), 1);
        assert_eq!(isqrt_wide(3), 1);
        assert_eq!(isqrt_wide(4), 2);
        assert_eq!(isqrt_wide(u64::MAX), u32::MAX);
        assert_eq!(isqrt_wide(1 << 62), 1 << 31);
        assert_eq!(isqrt_wide((1 << 62) - 1), (1 << 31) - 1);
    }

    #[test]
    fn wide_brackets_the_root() {
        let mut rng = fastrand::Rng::with_seed(0x5157_0001);
        for _ in 0..20_000 {
            assert_floor_sqrt(rng.u64(..));
            // exercise short inputs as well, which uniform sampling rarely hits
            assert_floor_sqrt(rng.u64(..) >> rng.u32(0..64));
        }

        for root in [1u64, 2, 255, 256, 65_535, 65_536, 3_037_000_499, 4_294_967_295] {
            let square = root * root;
            assert_floor_sqrt(square - 1);
            assert_floor_sqrt(square);
            assert_floor_sqrt(square.saturating_add(1));
        }
    }

    #[test]
    fn narrow_edges() {
        assert_eq!(isqrt_narrow(0), 0);
        assert_eq!(isqrt_narrow(1), 1);
        assert_eq!(isqrt_narrow(2), 1);
        assert_eq!(isqrt_narrow(1 << 30), 32_768);
        assert_eq!(isqrt_narrow(u32::MAX), u16::MAX);
    }

    #[test]
    fn narrow_matches_wide() {
        for x in 0..=70_000u32 {
            assert_eq!(u32::from(isqrt_narrow(x)), isqrt_wide(u64::from(x)), "x = {x}");
        }

        let mut rng = fastrand::Rng::with_seed(0x5157_0002);
        for _ in 0..200_000 {
            let x = rng.u32(..);
            assert_eq!(u32::from(isqrt_narrow(x)), isqrt_wide(u64::from(x)), "x = {x}");
        }

        // perfect squares and their neighbours, where an off-by-one would show
        for root in 1..=u32::from(u16::MAX) {
            let square = root * root;
            for x in [square - 1, square, square.saturating_add(1)] {
                assert_eq!(u32::from(isqrt_narrow(x)), isqrt_wide(u64::from(x)), "x = {x}");
            }
        }
    }

    #[test]
    fn usable_in_const_context() {
        const ROOT: u16 = isqrt_narrow(1_000_000);
        const WIDE: u32 = isqrt_wide(1_000_000_000_000);
        assert_eq!(ROOT, 1000);
        assert_eq!(WIDE, 1_000_000);
    }
}
