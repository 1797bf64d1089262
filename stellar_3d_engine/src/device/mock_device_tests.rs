//! Unit tests for mock_device.rs

use crate::device::mock_device::MockDevice;
use crate::device::{
    BufferTarget, BufferUsage, DeviceFeature, DeviceLimit, GraphicsDevice, TextureTarget,
};

#[test]
fn test_journal_records_commands_in_order() {
    let mut device = MockDevice::new();
    let handle = device.handle();

    device.active_texture(2);
    device.bind_texture(TextureTarget::Texture2D, None);

    let commands = handle.commands();
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0], "active_texture 2");
    assert!(commands[1].starts_with("bind_texture"));
}

#[test]
fn test_count_by_prefix() {
    let mut device = MockDevice::new();
    let handle = device.handle();

    device.set_depth_test(true);
    device.set_depth_test(false);
    device.set_cull(true);

    assert_eq!(handle.count("set_depth_test"), 2);
    assert_eq!(handle.count("set_cull"), 1);
    assert_eq!(handle.count("set_blend"), 0);
}

#[test]
fn test_clear_forgets_journal() {
    let mut device = MockDevice::new();
    let handle = device.handle();

    device.set_viewport(0, 0, 800, 600);
    assert_eq!(handle.commands().len(), 1);

    handle.clear();
    assert!(handle.commands().is_empty());
}

#[test]
fn test_created_ids_are_unique() {
    let mut device = MockDevice::new();

    let b1 = device.create_buffer().unwrap();
    let b2 = device.create_buffer().unwrap();
    let t1 = device.create_texture().unwrap();

    assert_ne!(b1.0, b2.0);
    assert_ne!(b2.0, t1.0);
}

#[test]
fn test_limit_overrides() {
    let mut device = MockDevice::new();
    assert_eq!(device.query_limit(DeviceLimit::MaxTextureSize), Some(4096));

    device.set_limit(DeviceLimit::MaxTextureSize, Some(1024));
    assert_eq!(device.query_limit(DeviceLimit::MaxTextureSize), Some(1024));

    device.set_limit(DeviceLimit::MaxVaryingVectors, None);
    assert_eq!(device.query_limit(DeviceLimit::MaxVaryingVectors), None);
}

#[test]
fn test_feature_overrides() {
    let mut device = MockDevice::new();
    // POT restriction defaults off, everything else on
    assert!(!device.query_feature(DeviceFeature::RequiresPotTextures));
    assert!(device.query_feature(DeviceFeature::TextureFloat));

    device.set_feature(DeviceFeature::RequiresPotTextures, true);
    device.set_feature(DeviceFeature::TextureFloat, false);
    assert!(device.query_feature(DeviceFeature::RequiresPotTextures));
    assert!(!device.query_feature(DeviceFeature::TextureFloat));
}

#[test]
fn test_context_lost_flag() {
    let device = MockDevice::new();
    let handle = device.handle();

    assert!(!device.is_context_lost());
    handle.set_context_lost(true);
    assert!(device.is_context_lost());
    handle.set_context_lost(false);
    assert!(!device.is_context_lost());
}

#[test]
fn test_read_pixels_returns_rgba_sized_buffer() {
    let mut device = MockDevice::new();
    let pixels = device.read_pixels(0, 0, 4, 2).unwrap();
    assert_eq!(pixels.len(), 4 * 2 * 4);
}

#[test]
fn test_buffer_upload_journal() {
    let mut device = MockDevice::new();
    let handle = device.handle();

    let buffer = device.create_buffer().unwrap();
    device.bind_buffer(BufferTarget::Array, Some(buffer));
    device.buffer_data(BufferTarget::Array, &[0u8; 64], BufferUsage::Static);

    assert_eq!(handle.count("create_buffer"), 1);
    assert_eq!(handle.count("bind_buffer"), 1);
    assert_eq!(handle.commands()[2], "buffer_data Array 64 Static");
}
