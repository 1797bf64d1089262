use super::*;

fn rgba(size: u32, value: u8) -> Vec<u8> {
    vec![value; (size * size * 4) as usize]
}

// ============================================================================
// Storage round-trips
// ============================================================================

#[test]
fn texture_upload_round_trips_through_read_pixels() {
    let mut device = NullDevice::new();

    let texture = device.create_texture().unwrap();
    device.bind_texture(TextureTarget::Texture2D, Some(texture));
    device.tex_image_2d(
        2,
        2,
        PixelFormat::Rgba,
        PixelType::UnsignedByte,
        Some(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16]),
    );

    let framebuffer = device.create_framebuffer().unwrap();
    device.bind_framebuffer(Some(framebuffer));
    device.framebuffer_texture_2d(Attachment::Color(0), None, texture, 0);

    let pixels = device.read_pixels(0, 0, 2, 2).unwrap();
    assert_eq!(pixels[0..4], [1, 2, 3, 4]);
    assert_eq!(pixels[12..16], [13, 14, 15, 16]);

    // A sub-rectangle reads the matching texel
    let corner = device.read_pixels(1, 1, 1, 1).unwrap();
    assert_eq!(corner, vec![13, 14, 15, 16]);
}

#[test]
fn read_pixels_outside_storage_answers_zeroes() {
    let mut device = NullDevice::new();
    let pixels = device.read_pixels(0, 0, 2, 2).unwrap();
    assert_eq!(pixels, vec![0; 16]);
}

#[test]
fn clear_fills_the_bound_color_attachment() {
    let mut device = NullDevice::new();

    let texture = device.create_texture().unwrap();
    device.bind_texture(TextureTarget::Texture2D, Some(texture));
    device.tex_image_2d(2, 2, PixelFormat::Rgba, PixelType::UnsignedByte, Some(&rgba(2, 0)));

    let framebuffer = device.create_framebuffer().unwrap();
    device.bind_framebuffer(Some(framebuffer));
    device.framebuffer_texture_2d(Attachment::Color(0), None, texture, 0);
    device.clear([1.0, 0.0, 0.0, 1.0], ClearFlags::COLOR);

    let pixels = device.read_pixels(0, 0, 1, 1).unwrap();
    assert_eq!(pixels, vec![255, 0, 0, 255]);
}

#[test]
fn rescale_resamples_into_the_destination() {
    let mut device = NullDevice::new();

    let source = device.create_texture().unwrap();
    device.bind_texture(TextureTarget::Texture2D, Some(source));
    device.tex_image_2d(1, 1, PixelFormat::Rgba, PixelType::UnsignedByte, Some(&[9, 8, 7, 6]));

    let destination = device.create_texture().unwrap();
    device.rescale_texture(source, destination, 2, 2).unwrap();

    let framebuffer = device.create_framebuffer().unwrap();
    device.bind_framebuffer(Some(framebuffer));
    device.framebuffer_texture_2d(Attachment::Color(0), None, destination, 0);
    let pixels = device.read_pixels(0, 0, 2, 2).unwrap();
    assert_eq!(pixels, [9, 8, 7, 6].repeat(4));
}

#[test]
fn blit_copies_between_color_attachments() {
    let mut device = NullDevice::new();

    let source_texture = device.create_texture().unwrap();
    device.bind_texture(TextureTarget::Texture2D, Some(source_texture));
    device.tex_image_2d(1, 1, PixelFormat::Rgba, PixelType::UnsignedByte, Some(&[4, 3, 2, 1]));
    let read = device.create_framebuffer().unwrap();
    device.bind_framebuffer(Some(read));
    device.framebuffer_texture_2d(Attachment::Color(0), None, source_texture, 0);

    let target_texture = device.create_texture().unwrap();
    device.bind_texture(TextureTarget::Texture2D, Some(target_texture));
    device.tex_image_2d(1, 1, PixelFormat::Rgba, PixelType::UnsignedByte, None);
    let draw = device.create_framebuffer().unwrap();
    device.bind_framebuffer(Some(draw));
    device.framebuffer_texture_2d(Attachment::Color(0), None, target_texture, 0);

    device.blit_framebuffer(read, draw, 1, 1);
    let pixels = device.read_pixels(0, 0, 1, 1).unwrap();
    assert_eq!(pixels, vec![4, 3, 2, 1]);
}

// ============================================================================
// Stats and context state
// ============================================================================

#[test]
fn stats_count_draws_and_uploads() {
    let mut device = NullDevice::new();
    let handle = device.handle();

    device.buffer_data(BufferTarget::Array, &[0u8; 8], BufferUsage::Static);
    device.draw_arrays(PrimitiveTopology::Triangles, 0, 3);
    device.draw_elements_instanced(PrimitiveTopology::Triangles, 0, 3, false, 5);

    let stats = handle.stats();
    assert_eq!(stats.buffer_uploads, 1);
    assert_eq!(stats.draw_calls, 2);
    assert_eq!(stats.instanced_draw_calls, 1);

    handle.reset_stats();
    assert_eq!(handle.stats(), NullDeviceStats::default());
}

#[test]
fn context_loss_is_observable_through_the_trait() {
    let device = NullDevice::new();
    let handle = device.handle();

    assert!(!device.is_context_lost());
    handle.simulate_context_loss();
    assert!(device.is_context_lost());
    handle.restore_context();
    assert!(!device.is_context_lost());
}

#[test]
fn limit_and_feature_overrides_take_effect() {
    let mut device = NullDevice::new();
    device.set_limit(DeviceLimit::MaxTextureSize, Some(1024));
    device.set_limit(DeviceLimit::MaxVaryingVectors, None);
    device.set_feature(DeviceFeature::UintIndices, false);
    device.set_feature(DeviceFeature::RequiresPotTextures, true);

    assert_eq!(device.query_limit(DeviceLimit::MaxTextureSize), Some(1024));
    assert_eq!(device.query_limit(DeviceLimit::MaxVaryingVectors), None);
    assert!(!device.query_feature(DeviceFeature::UintIndices));
    assert!(device.query_feature(DeviceFeature::RequiresPotTextures));
    // Unset features answer their defaults
    assert!(device.query_feature(DeviceFeature::Texture3D));
}
