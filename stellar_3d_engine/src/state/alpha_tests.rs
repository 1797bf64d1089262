//! Unit tests for alpha.rs

use crate::device::mock_device::MockDevice;
use crate::device::{BlendEquation, BlendFactor};
use crate::state::alpha::AlphaState;

#[test]
fn test_defaults() {
    let state = AlphaState::new();
    assert!(!state.blend());
    assert_eq!(
        state.blend_func(),
        (
            BlendFactor::One,
            BlendFactor::Zero,
            BlendFactor::One,
            BlendFactor::Zero
        )
    );
    assert_eq!(
        state.blend_equation(),
        (BlendEquation::Add, BlendEquation::Add)
    );
}

#[test]
fn test_first_apply_commits_enable_only() {
    let mut state = AlphaState::new();
    let mut device = MockDevice::new();
    let handle = device.handle();

    state.apply(&mut device);

    // Func and equation were never requested, so only the enable bit lands
    assert_eq!(handle.count("set_blend "), 1);
    assert_eq!(handle.count("set_blend_func"), 0);
    assert_eq!(handle.count("set_blend_equation"), 0);
}

#[test]
fn test_func_commits_on_change_only() {
    let mut state = AlphaState::new();
    let mut device = MockDevice::new();
    let handle = device.handle();

    state.apply(&mut device);
    handle.clear();

    state.set_blend_func(
        BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha,
        BlendFactor::One,
        BlendFactor::Zero,
    );
    state.apply(&mut device);
    assert_eq!(handle.count("set_blend_func"), 1);

    // Identical request: no new command
    state.set_blend_func(
        BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha,
        BlendFactor::One,
        BlendFactor::Zero,
    );
    state.apply(&mut device);
    assert_eq!(handle.count("set_blend_func"), 1);
}

#[test]
fn test_equation_commits_on_change_only() {
    let mut state = AlphaState::new();
    let mut device = MockDevice::new();
    let handle = device.handle();

    state.apply(&mut device);
    handle.clear();

    state.set_blend_equation(BlendEquation::Max, BlendEquation::Add);
    state.apply(&mut device);
    assert_eq!(handle.count("set_blend_equation"), 1);

    state.set_blend_equation(BlendEquation::Max, BlendEquation::Add);
    state.apply(&mut device);
    assert_eq!(handle.count("set_blend_equation"), 1);
}

#[test]
fn test_toggle_blend() {
    let mut state = AlphaState::new();
    let mut device = MockDevice::new();
    let handle = device.handle();

    state.apply(&mut device);
    handle.clear();

    state.set_blend(true);
    state.apply(&mut device);
    state.set_blend(false);
    state.apply(&mut device);

    let commands = handle.commands();
    assert_eq!(commands, vec!["set_blend true", "set_blend false"]);
}

#[test]
fn test_reset_marks_dirty() {
    let mut state = AlphaState::new();
    let mut device = MockDevice::new();

    state.apply(&mut device);
    assert!(!state.is_dirty());

    state.reset();
    assert!(state.is_dirty());
}
