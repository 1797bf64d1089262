/// Power-of-two sizing helpers
///
/// Older or constrained devices only accept power-of-two texture dimensions.
/// These helpers pick the power of two a given dimension should be remapped
/// to, under one of three rounding modes.

// ============================================================================
// Rounding mode
// ============================================================================

/// How a non-power-of-two dimension is remapped to a power of two
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PotRounding {
    /// Round down to the previous power of two
    Floor,
    /// Round to the closest power of two (ceiling wins ties)
    Nearest,
    /// Round up to the next power of two
    Ceiling,
}

impl Default for PotRounding {
    fn default() -> Self {
        PotRounding::Nearest
    }
}

// ============================================================================
// Rounding functions
// ============================================================================

/// Smallest power of two >= `x` (0 maps to 0)
///
/// Saturates at 2^31, the largest power of two a `u32` can hold.
pub fn ceiling_pot(x: u32) -> u32 {
    if x == 0 {
        return 0;
    }
    if x > 1 << 31 {
        return 1 << 31;
    }
    let mut x = x - 1;
    x |= x >> 1;
    x |= x >> 2;
    x |= x >> 4;
    x |= x >> 8;
    x |= x >> 16;
    x + 1
}

/// Largest power of two <= `x` (0 maps to 0)
pub fn floor_pot(x: u32) -> u32 {
    let mut x = x;
    x |= x >> 1;
    x |= x >> 2;
    x |= x >> 4;
    x |= x >> 8;
    x |= x >> 16;
    x - (x >> 1)
}

/// Closest power of two to `x`
///
/// When `x` sits exactly between two powers of two the larger one wins.
pub fn nearest_pot(x: u32) -> u32 {
    let c = ceiling_pot(x);
    let f = floor_pot(x);
    if c == f {
        // Already a power of two, or ceiling saturated at 2^31
        return c;
    }
    if (c - x) > (x - f) {
        f
    } else {
        c
    }
}

/// Remap a dimension to a power of two, clamped to `max`
///
/// Already-power-of-two values pass through unchanged (still clamped).
///
/// # Example
///
/// ```
/// use stellar_3d_engine::stellar3d::utils::{required_pot_size, PotRounding};
///
/// assert_eq!(required_pot_size(257, 1024, PotRounding::Ceiling), 512);
/// assert_eq!(required_pot_size(3000, 1024, PotRounding::Ceiling), 1024);
/// ```
pub fn required_pot_size(value: u32, max: u32, rounding: PotRounding) -> u32 {
    let pot = match rounding {
        PotRounding::Floor => floor_pot(value),
        PotRounding::Nearest => nearest_pot(value),
        PotRounding::Ceiling => ceiling_pot(value),
    };
    pot.min(max)
}

/// Whether `value` is a power of two (0 and 1 both count as valid sizes)
pub fn is_pot(value: u32) -> bool {
    value != 0 && (value & (value - 1)) == 0
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "pot_tests.rs"]
mod tests;
