//! Unit tests for pot.rs

use crate::utils::pot::{
    ceiling_pot, floor_pot, is_pot, nearest_pot, required_pot_size, PotRounding,
};

// ============================================================================
// CEILING / FLOOR TESTS
// ============================================================================

#[test]
fn test_ceiling_pot() {
    assert_eq!(ceiling_pot(0), 0);
    assert_eq!(ceiling_pot(1), 1);
    assert_eq!(ceiling_pot(2), 2);
    assert_eq!(ceiling_pot(3), 4);
    assert_eq!(ceiling_pot(255), 256);
    assert_eq!(ceiling_pot(256), 256);
    assert_eq!(ceiling_pot(257), 512);
    assert_eq!(ceiling_pot(1000), 1024);
}

#[test]
fn test_ceiling_pot_saturates_at_largest_pot() {
    assert_eq!(ceiling_pot(1 << 31), 1 << 31);
    assert_eq!(ceiling_pot((1 << 31) + 1), 1 << 31);
    assert_eq!(ceiling_pot(u32::MAX), 1 << 31);
    assert_eq!(nearest_pot(u32::MAX), 1 << 31);
    assert_eq!(required_pot_size(u32::MAX, 1024, PotRounding::Ceiling), 1024);
}

#[test]
fn test_floor_pot() {
    assert_eq!(floor_pot(0), 0);
    assert_eq!(floor_pot(1), 1);
    assert_eq!(floor_pot(2), 2);
    assert_eq!(floor_pot(3), 2);
    assert_eq!(floor_pot(255), 128);
    assert_eq!(floor_pot(256), 256);
    assert_eq!(floor_pot(257), 256);
    assert_eq!(floor_pot(1000), 512);
}

#[test]
fn test_nearest_pot() {
    assert_eq!(nearest_pot(1), 1);
    assert_eq!(nearest_pot(2), 2);
    assert_eq!(nearest_pot(5), 4);
    assert_eq!(nearest_pot(7), 8);
    assert_eq!(nearest_pot(300), 256);
    assert_eq!(nearest_pot(400), 512);
}

#[test]
fn test_nearest_pot_tie_rounds_up() {
    // 3 is equidistant from 2 and 4
    assert_eq!(nearest_pot(3), 4);
    // 6 is equidistant from 4 and 8
    assert_eq!(nearest_pot(6), 8);
    // 384 is equidistant from 256 and 512
    assert_eq!(nearest_pot(384), 512);
}

// ============================================================================
// REQUIRED SIZE TESTS
// ============================================================================

#[test]
fn test_required_pot_size_modes() {
    assert_eq!(required_pot_size(300, 4096, PotRounding::Floor), 256);
    assert_eq!(required_pot_size(300, 4096, PotRounding::Nearest), 256);
    assert_eq!(required_pot_size(300, 4096, PotRounding::Ceiling), 512);
}

#[test]
fn test_required_pot_size_clamps_to_max() {
    assert_eq!(required_pot_size(3000, 1024, PotRounding::Ceiling), 1024);
    assert_eq!(required_pot_size(5000, 2048, PotRounding::Nearest), 2048);
}

#[test]
fn test_required_pot_size_passthrough_when_already_pot() {
    assert_eq!(required_pot_size(512, 4096, PotRounding::Floor), 512);
    assert_eq!(required_pot_size(512, 4096, PotRounding::Nearest), 512);
    assert_eq!(required_pot_size(512, 4096, PotRounding::Ceiling), 512);
}

#[test]
fn test_default_rounding_is_nearest() {
    assert_eq!(PotRounding::default(), PotRounding::Nearest);
}

// ============================================================================
// IS POT TESTS
// ============================================================================

#[test]
fn test_is_pot() {
    assert!(is_pot(1));
    assert!(is_pot(2));
    assert!(is_pot(256));
    assert!(is_pot(4096));

    assert!(!is_pot(0));
    assert!(!is_pot(3));
    assert!(!is_pot(257));
    assert!(!is_pot(1000));
}
