//! End-to-end engine behavior over the in-memory null backend

use stellar_3d_engine::stellar3d::device::{
    ClearFlags, DeviceFeature, DeviceLimit, SamplingMode,
};
use stellar_3d_engine::stellar3d::resource::{DecodedImage, MemoryRasterDecoder};
use stellar_3d_engine::stellar3d::utils::PotRounding;
use stellar_3d_engine::stellar3d::{Engine, EngineOptions, RenderTargetOptions};
use stellar_3d_engine_device_null::{NullDevice, NullDeviceHandle};

fn make_engine(
    options: EngineOptions,
    configure: impl FnOnce(&mut NullDevice),
) -> (Engine, NullDeviceHandle) {
    let mut device = NullDevice::new();
    configure(&mut device);
    let handle = device.handle();
    let engine = Engine::new(Box::new(device), 640, 480, options, None).unwrap();
    handle.reset_stats();
    (engine, handle)
}

// ============================================================================
// Read-back
// ============================================================================

#[test]
fn render_target_clear_round_trips_through_read_pixels() {
    let (mut engine, _handle) = make_engine(EngineOptions::default(), |_| {});

    let target = engine
        .create_render_target_texture(4, 4, &RenderTargetOptions::default())
        .unwrap();
    engine.bind_render_target(target, None, None, None, true, None).unwrap();
    engine.clear([0.0, 0.0, 1.0, 1.0], ClearFlags::COLOR | ClearFlags::DEPTH);

    let pixels = engine.read_pixels(0, 0, 4, 4).unwrap();
    assert_eq!(pixels.len(), 4 * 4 * 4);
    assert_eq!(&pixels[0..4], &[0, 0, 255, 255]);
    assert_eq!(&pixels[60..64], &[0, 0, 255, 255]);

    engine.unbind_render_target(target, true, None).unwrap();
}

#[test]
fn raw_texture_round_trips_through_scratch_read_back() {
    let (mut engine, _handle) = make_engine(EngineOptions::default(), |_| {});

    let data: Vec<u8> = (0..4 * 4 * 4).map(|i| i as u8).collect();
    let texture = engine
        .create_raw_texture(
            &data,
            4,
            4,
            stellar_3d_engine::stellar3d::device::PixelFormat::Rgba,
            stellar_3d_engine::stellar3d::device::PixelType::UnsignedByte,
            false,
            false,
            SamplingMode::Bilinear,
        )
        .unwrap();

    assert_eq!(engine.read_texture_pixels(texture).unwrap(), data);
}

// ============================================================================
// Power-of-two remediation
// ============================================================================

#[test]
fn oversized_npot_render_target_snaps_to_pot_ceiling() {
    let options = EngineOptions {
        pot_rounding: PotRounding::Ceiling,
        ..EngineOptions::default()
    };
    let (mut engine, _handle) = make_engine(options, |device| {
        device.set_feature(DeviceFeature::RequiresPotTextures, true);
        device.set_limit(DeviceLimit::MaxRenderTextureSize, Some(1024));
    });

    let target = engine
        .create_render_target_texture(257, 257, &RenderTargetOptions::default())
        .unwrap();
    assert_eq!(engine.texture_size(target), Some((512, 512)));

    // The clamp wins over the rounding policy
    let huge = engine
        .create_render_target_texture(3000, 3000, &RenderTargetOptions::default())
        .unwrap();
    assert_eq!(engine.texture_size(huge), Some((1024, 1024)));
}

// ============================================================================
// Bound-state cache
// ============================================================================

#[test]
fn redundant_state_changes_reach_the_device_once() {
    let (mut engine, handle) = make_engine(EngineOptions::default(), |_| {});

    let before = handle.stats().state_changes;
    engine.set_depth_test(false);
    engine.apply_states();
    engine.set_depth_test(false);
    engine.apply_states();
    assert_eq!(handle.stats().state_changes, before + 1);

    engine.set_depth_test(true);
    engine.apply_states();
    assert_eq!(handle.stats().state_changes, before + 2);
}

// ============================================================================
// Shared ownership
// ============================================================================

#[test]
fn buffer_with_two_owners_survives_the_first_release() {
    let (mut engine, _handle) = make_engine(EngineOptions::default(), |_| {});

    let buffer = engine.create_vertex_buffer(&[0u8; 128]).unwrap();
    engine.acquire_buffer(buffer);

    assert!(!engine.release_buffer(buffer));
    assert_eq!(engine.buffer_count(), 1);
    assert!(engine.update_buffer(buffer, 0, &[1u8; 4]).is_ok());

    assert!(engine.release_buffer(buffer));
    assert_eq!(engine.buffer_count(), 0);
    assert!(engine.update_buffer(buffer, 0, &[1u8; 4]).is_err());
}

// ============================================================================
// Program cache
// ============================================================================

#[test]
fn identical_program_requests_share_one_compile() {
    let (mut engine, handle) = make_engine(EngineOptions::default(), |_| {});

    let first = engine.get_or_create_program(
        "standard",
        "vertex source",
        "fragment source",
        "#define LIGHTS 4",
        &["position", "normal"],
        &["world"],
        &["uAlbedo"],
        None,
    );
    let second = engine.get_or_create_program(
        "standard",
        "vertex source",
        "fragment source",
        "#define LIGHTS 4",
        &["position", "normal"],
        &["world"],
        &["uAlbedo"],
        None,
    );
    assert_eq!(first, second);
    assert_eq!(handle.stats().program_compiles, 1);
    assert!(engine.program_is_ready(first));
    assert!(engine.program_attribute_location(first, "position").is_some());
}

// ============================================================================
// Multisampling
// ============================================================================

#[test]
fn msaa_target_resolves_with_one_blit_on_unbind() {
    let (mut engine, handle) = make_engine(EngineOptions::default(), |_| {});

    let options = RenderTargetOptions {
        samples: 4,
        ..RenderTargetOptions::default()
    };
    let target = engine.create_render_target_texture(64, 64, &options).unwrap();

    engine.bind_render_target(target, None, None, None, true, None).unwrap();
    engine.unbind_render_target(target, true, None).unwrap();
    assert_eq!(handle.stats().blits, 1);

    // Non-multisampled targets never blit
    let plain = engine
        .create_render_target_texture(64, 64, &RenderTargetOptions::default())
        .unwrap();
    engine.bind_render_target(plain, None, None, None, true, None).unwrap();
    engine.unbind_render_target(plain, true, None).unwrap();
    assert_eq!(handle.stats().blits, 1);
}

// ============================================================================
// URL loading
// ============================================================================

#[test]
fn url_texture_becomes_ready_through_the_frame_loop() {
    let (mut engine, _handle) = make_engine(EngineOptions::default(), |_| {});

    let mut decoder = MemoryRasterDecoder::new();
    decoder.insert_image(
        "assets/grass.png",
        DecodedImage {
            width: 8,
            height: 8,
            pixels: vec![200; 8 * 8 * 4],
        },
    );
    engine.set_raster_decoder(Box::new(decoder));

    let texture = engine.create_texture(
        "assets/grass.png",
        false,
        false,
        SamplingMode::Trilinear,
        None,
        None,
    );
    assert!(!engine.texture_is_ready(texture));

    engine.run_render_loop(Box::new(|_| {}));
    engine.render_frame(0.0);
    assert!(engine.texture_is_ready(texture));
    assert_eq!(engine.texture_size(texture), Some((8, 8)));
}

// ============================================================================
// Device loss
// ============================================================================

#[test]
fn device_loss_rebuilds_from_retained_data_alone() {
    let (mut engine, handle) = make_engine(EngineOptions::default(), |_| {});

    let buffer = engine.create_index_buffer(&[0, 1, 2], false).unwrap();
    let texture = engine
        .create_raw_texture(
            &[42u8; 64],
            4,
            4,
            stellar_3d_engine::stellar3d::device::PixelFormat::Rgba,
            stellar_3d_engine::stellar3d::device::PixelType::UnsignedByte,
            true,
            false,
            SamplingMode::Trilinear,
        )
        .unwrap();
    let program =
        engine.get_or_create_program("standard", "vs", "fs", "", &[], &[], &[], None);
    assert_eq!(handle.stats().program_compiles, 1);

    handle.simulate_context_loss();
    engine.run_render_loop(Box::new(|_| {}));
    engine.render_frame(0.0);
    // The pump pauses while the device stays lost
    assert_eq!(handle.stats().program_compiles, 1);

    handle.restore_context();
    engine.render_frame(16.0);

    assert!(engine.texture_is_ready(texture));
    assert!(engine.program_is_ready(program));
    assert_eq!(engine.buffer_references(buffer), Some(1));
    assert_eq!(handle.stats().program_compiles, 2);

    // Later frames do not rebuild again
    engine.render_frame(33.0);
    assert_eq!(handle.stats().program_compiles, 2);
}
