use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use super::*;
use crate::device::mock_device::{MockDevice, MockDeviceHandle};
use crate::device::{DeviceFeature, DeviceLimit, FillMode, SamplingMode};
use crate::resource::{DecodedImage, MemoryRasterDecoder};

fn make_engine() -> (Engine, MockDeviceHandle) {
    make_engine_with(EngineOptions::default(), |_| {})
}

fn make_engine_with(
    options: EngineOptions,
    configure: impl FnOnce(&mut MockDevice),
) -> (Engine, MockDeviceHandle) {
    let mut device = MockDevice::new();
    configure(&mut device);
    let handle = device.handle();
    let engine = Engine::new(Box::new(device), 640, 480, options, None).unwrap();
    handle.clear();
    (engine, handle)
}

fn checker_image(size: u32) -> DecodedImage {
    DecodedImage {
        width: size,
        height: size,
        pixels: vec![128; (size * size * 4) as usize],
    }
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn new_rejects_zero_sized_surface() {
    let device = MockDevice::new();
    assert!(Engine::new(Box::new(device), 0, 480, EngineOptions::default(), None).is_err());
}

#[test]
fn new_seeds_less_or_equal_depth_func() {
    let device = MockDevice::new();
    let handle = device.handle();
    let _engine =
        Engine::new(Box::new(device), 640, 480, EngineOptions::default(), None).unwrap();
    assert_eq!(handle.count("set_depth_func LessOrEqual"), 1);
    assert_eq!(handle.count("set_viewport"), 1);
}

#[test]
fn new_registers_with_registry() {
    let registry = Arc::new(crate::registry::EngineRegistry::new());
    let device = MockDevice::new();
    let mut engine = Engine::new(
        Box::new(device),
        640,
        480,
        EngineOptions::default(),
        Some(Arc::clone(&registry)),
    )
    .unwrap();
    assert_eq!(registry.len(), 1);
    engine.dispose();
    assert_eq!(registry.len(), 0);
}

// ============================================================================
// State cache
// ============================================================================

#[test]
fn redundant_state_sets_emit_no_commands() {
    let (mut engine, handle) = make_engine();

    engine.set_depth_test(true); // already true
    engine.set_depth_write(true);
    engine.apply_states();
    assert_eq!(handle.count("set_depth_test"), 0);
    assert_eq!(handle.count("set_depth_write"), 0);

    engine.set_depth_test(false);
    engine.apply_states();
    engine.set_depth_test(false);
    engine.apply_states();
    assert_eq!(handle.count("set_depth_test"), 1);
}

#[test]
fn command_count_matches_mismatching_sets() {
    let (mut engine, handle) = make_engine();

    // Five sets, three of which actually change the value
    for enabled in [false, false, true, true, false] {
        engine.set_culling(enabled);
        engine.apply_states();
    }
    assert_eq!(handle.count("set_cull"), 3);
}

#[test]
fn viewport_is_cached_and_scaled_to_pixels() {
    let (mut engine, handle) = make_engine();

    let half = crate::device::Viewport::new(0.0, 0.0, 0.5, 0.5);
    engine.set_viewport(half);
    engine.set_viewport(half);
    assert_eq!(handle.commands(), vec!["set_viewport 0 0 320 240"]);
}

#[test]
fn brute_force_wipe_reseeds_depth_func() {
    let (mut engine, handle) = make_engine();

    engine.wipe_caches(true);
    engine.apply_states();
    assert_eq!(handle.count("set_depth_func LessOrEqual"), 1);
}

#[test]
fn light_wipe_is_skipped_when_prevented() {
    let options = EngineOptions {
        prevent_cache_wipe_between_frames: true,
        ..EngineOptions::default()
    };
    let (mut engine, handle) = make_engine_with(options, |_| {});

    let buffer = engine.create_vertex_buffer(&[0u8; 16]).unwrap();
    handle.clear();
    engine.wipe_caches(false);
    engine.bind_buffer(buffer);
    // Still cached from creation, so no rebind
    assert_eq!(handle.count("bind_buffer"), 0);
}

// ============================================================================
// Buffers
// ============================================================================

#[test]
fn index_buffer_narrows_to_u16_by_default() {
    let (mut engine, handle) = make_engine();

    let buffer = engine.create_index_buffer(&[0, 1, 2, 2, 1, 3], false).unwrap();
    assert_eq!(engine.buffer_uses_wide_indices(buffer), Some(false));
    // Six u16 indices = 12 bytes
    assert_eq!(handle.count("buffer_data ElementArray 12 Static"), 1);
}

#[test]
fn index_buffer_stays_wide_for_large_indices() {
    let (mut engine, handle) = make_engine();

    let buffer = engine.create_index_buffer(&[0, 70_000, 2], false).unwrap();
    assert_eq!(engine.buffer_uses_wide_indices(buffer), Some(true));
    assert_eq!(handle.count("buffer_data ElementArray 12 Static"), 1);
}

#[test]
fn index_buffer_truncates_without_wide_support() {
    let (mut engine, _handle) = make_engine_with(EngineOptions::default(), |device| {
        device.set_feature(DeviceFeature::UintIndices, false);
    });

    let buffer = engine.create_index_buffer(&[0, 70_000, 2], false).unwrap();
    assert_eq!(engine.buffer_uses_wide_indices(buffer), Some(false));
}

#[test]
fn double_owner_buffer_frees_on_second_release() {
    let (mut engine, handle) = make_engine();

    let buffer = engine.create_vertex_buffer(&[0u8; 64]).unwrap();
    engine.acquire_buffer(buffer);
    assert_eq!(engine.buffer_references(buffer), Some(2));

    assert!(!engine.release_buffer(buffer));
    assert_eq!(handle.count("delete_buffer"), 0);
    assert_eq!(engine.buffer_count(), 1);

    assert!(engine.release_buffer(buffer));
    assert_eq!(handle.count("delete_buffer"), 1);
    assert_eq!(engine.buffer_count(), 0);

    // Stale id: no double free
    assert!(!engine.release_buffer(buffer));
    assert_eq!(handle.count("delete_buffer"), 1);
}

#[test]
fn rebinding_same_buffer_is_elided() {
    let (mut engine, handle) = make_engine();

    let buffer = engine.create_vertex_buffer(&[0u8; 16]).unwrap();
    handle.clear();
    engine.bind_buffer(buffer);
    engine.bind_buffer(buffer);
    assert_eq!(handle.count("bind_buffer"), 0); // cached since creation
}

#[test]
fn update_buffer_rejects_out_of_range_writes() {
    let (mut engine, _handle) = make_engine();

    let buffer = engine.create_dynamic_vertex_buffer(&[0u8; 16]).unwrap();
    assert!(engine.update_buffer(buffer, 8, &[1u8; 8]).is_ok());
    assert!(engine.update_buffer(buffer, 12, &[1u8; 8]).is_err());
}

// ============================================================================
// Textures and binding
// ============================================================================

#[test]
fn raw_texture_is_ready_immediately() {
    let (mut engine, handle) = make_engine();

    let texture = engine
        .create_raw_texture(
            &[255u8; 16],
            2,
            2,
            crate::device::PixelFormat::Rgba,
            crate::device::PixelType::UnsignedByte,
            false,
            false,
            SamplingMode::Bilinear,
        )
        .unwrap();
    assert!(engine.texture_is_ready(texture));
    assert_eq!(engine.texture_size(texture), Some((2, 2)));
    assert_eq!(handle.count("tex_image_2d 2x2"), 1);
}

#[test]
fn not_ready_texture_binds_the_empty_fallback() {
    let (mut engine, _handle) = make_engine();

    let pending = engine.create_texture("missing.png", true, false, SamplingMode::Nearest, None, None);
    assert!(!engine.texture_is_ready(pending));

    engine.bind_texture_to_channel(0, Some(pending)).unwrap();
    let bound = engine.bound_texture(0).unwrap();
    assert_ne!(bound, pending);
    assert_eq!(engine.texture_size(bound), Some((1, 1)));
    assert!(engine.texture_is_ready(bound));
}

#[test]
fn channel_rebind_of_same_texture_is_elided() {
    let (mut engine, handle) = make_engine();

    let texture = engine
        .create_raw_texture(
            &[255u8; 4],
            1,
            1,
            crate::device::PixelFormat::Rgba,
            crate::device::PixelType::UnsignedByte,
            false,
            false,
            SamplingMode::Nearest,
        )
        .unwrap();
    handle.clear();

    engine.bind_texture_to_channel(2, Some(texture)).unwrap();
    assert_eq!(handle.count("bind_texture"), 1);
    engine.bind_texture_to_channel(2, Some(texture)).unwrap();
    assert_eq!(handle.count("bind_texture"), 1);
}

#[test]
fn binding_chain_tracks_recency() {
    let (mut engine, _handle) = make_engine();

    let make = |engine: &mut Engine| {
        engine
            .create_raw_texture(
                &[255u8; 4],
                1,
                1,
                crate::device::PixelFormat::Rgba,
                crate::device::PixelType::UnsignedByte,
                false,
                false,
                SamplingMode::Nearest,
            )
            .unwrap()
    };
    let a = make(&mut engine);
    let b = make(&mut engine);
    let c = make(&mut engine);
    let d = make(&mut engine);

    // Creation uploads bind on the last channel; clear that artifact
    let upload_channel = engine.caps().max_combined_texture_image_units - 1;
    engine.bind_texture_to_channel(upload_channel, None).unwrap();
    assert!(engine.bound_chain_order().is_empty());

    engine.bind_texture_to_channel(0, Some(a)).unwrap();
    engine.bind_texture_to_channel(1, Some(b)).unwrap();
    engine.bind_texture_to_channel(2, Some(c)).unwrap();
    assert_eq!(engine.bound_chain_order(), vec![a, b, c]);

    // Rebinding A refreshes its recency without a device command
    engine.bind_texture_to_channel(0, Some(a)).unwrap();
    assert_eq!(engine.bound_chain_order(), vec![b, c, a]);

    // Evicting A from its channel unlinks it
    engine.bind_texture_to_channel(0, Some(d)).unwrap();
    assert_eq!(engine.bound_chain_order(), vec![b, c, d]);
}

#[test]
fn released_texture_leaves_the_chain_and_channels() {
    let (mut engine, handle) = make_engine();

    let texture = engine
        .create_raw_texture(
            &[255u8; 4],
            1,
            1,
            crate::device::PixelFormat::Rgba,
            crate::device::PixelType::UnsignedByte,
            false,
            false,
            SamplingMode::Nearest,
        )
        .unwrap();
    engine.bind_texture_to_channel(0, Some(texture)).unwrap();

    engine.release_texture(texture);
    assert!(engine.bound_chain_order().is_empty());
    assert_eq!(engine.bound_texture(0), None);
    assert_eq!(handle.count("delete_texture"), 1);

    // Releasing a stale id is a no-op
    engine.release_texture(texture);
    assert_eq!(handle.count("delete_texture"), 1);
}

#[test]
fn unbind_all_clears_every_bindable_target() {
    let (mut engine, handle) = make_engine();

    let cube = engine
        .create_raw_cube_texture(
            &vec![vec![255u8; 4]; 6],
            1,
            crate::device::PixelFormat::Rgba,
            crate::device::PixelType::UnsignedByte,
            false,
            false,
            SamplingMode::Nearest,
        )
        .unwrap();
    engine.bind_texture_to_channel(3, Some(cube)).unwrap();
    handle.clear();

    engine.unbind_all_textures();
    // A cube texture must not stay bound device-side on any target
    assert!(handle.count("bind_texture TextureCube None") >= 1);
    assert!(handle.count("bind_texture Texture3D None") >= 1);
    assert!(handle.count("bind_texture Texture2D None") >= 1);
    assert_eq!(engine.bound_texture(3), None);
    assert!(engine.bound_chain_order().is_empty());
}

#[test]
fn dynamic_texture_is_pot_sized_on_pot_hardware() {
    let (mut engine, _handle) = make_engine_with(EngineOptions::default(), |device| {
        device.set_feature(DeviceFeature::RequiresPotTextures, true);
    });

    let texture = engine
        .create_dynamic_texture(100, 300, false, SamplingMode::Bilinear)
        .unwrap();
    assert_eq!(engine.texture_size(texture), Some((128, 256)));
    assert!(!engine.texture_is_ready(texture));

    engine
        .update_dynamic_texture(texture, &vec![0u8; 128 * 256 * 4], false)
        .unwrap();
    assert!(engine.texture_is_ready(texture));
}

#[test]
fn sampler_uniform_channel_is_cached() {
    let (mut engine, handle) = make_engine();

    let program = engine.get_or_create_program(
        "basic",
        "vs",
        "fs",
        "",
        &["position"],
        &[],
        &["uTexture"],
        None,
    );
    handle.clear();

    engine.bind_sampler_uniform_to_channel(program, "uTexture", 3).unwrap();
    engine.bind_sampler_uniform_to_channel(program, "uTexture", 3).unwrap();
    assert_eq!(handle.count("set_uniform_int"), 1);

    engine.bind_sampler_uniform_to_channel(program, "uTexture", 4).unwrap();
    assert_eq!(handle.count("set_uniform_int"), 2);
}

// ============================================================================
// Programs
// ============================================================================

#[test]
fn program_cache_compiles_once() {
    let (mut engine, handle) = make_engine();

    let first = engine.get_or_create_program("basic", "vs", "fs", "#define A", &[], &[], &[], None);
    let second = engine.get_or_create_program("basic", "vs", "fs", "#define A", &[], &[], &[], None);
    assert_eq!(first, second);
    assert_eq!(handle.count("compile_program"), 1);

    // Different defines are a different cache entry
    let third = engine.get_or_create_program("basic", "vs", "fs", "#define B", &[], &[], &[], None);
    assert_ne!(first, third);
    assert_eq!(handle.count("compile_program"), 2);
}

#[test]
fn cache_hit_fires_on_compiled_immediately() {
    let (mut engine, _handle) = make_engine();

    let fired = Rc::new(Cell::new(false));
    let first = engine.get_or_create_program("basic", "vs", "fs", "", &[], &[], &[], None);

    let flag = Rc::clone(&fired);
    let second = engine.get_or_create_program(
        "basic",
        "vs",
        "fs",
        "",
        &[],
        &[],
        &[],
        Some(Box::new(move |_| flag.set(true))),
    );
    assert_eq!(first, second);
    assert!(fired.get());
}

#[test]
fn bind_program_is_cached() {
    let (mut engine, handle) = make_engine();

    let program = engine.get_or_create_program("basic", "vs", "fs", "", &[], &[], &[], None);
    handle.clear();

    assert!(engine.bind_program(program));
    assert!(engine.bind_program(program));
    assert_eq!(handle.count("use_program"), 1);
}

// ============================================================================
// Draws and frame stats
// ============================================================================

#[test]
fn draw_indexed_takes_width_from_bound_index_buffer() {
    let (mut engine, handle) = make_engine();

    let wide = engine.create_index_buffer(&[0, 70_000, 2], false).unwrap();
    engine.bind_buffer(wide);
    handle.clear();

    engine.draw_indexed(FillMode::Triangle, 0, 3, 0);
    assert_eq!(handle.count("draw_elements Triangles 0 3 wide=true"), 1);

    engine.draw_indexed(FillMode::Wireframe, 0, 3, 2);
    assert_eq!(handle.count("draw_elements_instanced Lines 0 3 wide=true x2"), 1);
}

#[test]
fn draw_call_stats_roll_per_frame() {
    let (mut engine, _handle) = make_engine();

    engine.begin_frame(0.0);
    engine.draw_unindexed(FillMode::Triangle, 0, 3, 0);
    engine.draw_unindexed(FillMode::Triangle, 0, 3, 0);
    engine.end_frame();
    engine.begin_frame(16.0);
    assert_eq!(engine.draw_calls(), 2);
}

#[test]
fn render_loop_skips_background_frames() {
    let options = EngineOptions {
        render_even_in_background: false,
        ..EngineOptions::default()
    };
    let (mut engine, _handle) = make_engine_with(options, |_| {});

    let frames = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&frames);
    engine.run_render_loop(Box::new(move |_| counter.set(counter.get() + 1)));

    engine.render_frame(0.0);
    engine.set_background(true);
    engine.render_frame(16.0);
    engine.render_frame(33.0);
    engine.set_background(false);
    engine.render_frame(50.0);
    assert_eq!(frames.get(), 2);

    engine.stop_render_loop();
    engine.render_frame(66.0);
    assert_eq!(frames.get(), 2);
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn pump_completes_queued_loads() {
    let (mut engine, _handle) = make_engine();

    let mut decoder = MemoryRasterDecoder::new();
    decoder.insert_image("grass.png", checker_image(4));
    engine.set_raster_decoder(Box::new(decoder));

    let loaded = Rc::new(Cell::new(false));
    let flag = Rc::clone(&loaded);
    let texture = engine.create_texture(
        "grass.png",
        true,
        false,
        SamplingMode::Bilinear,
        Some(Box::new(move |_| flag.set(true))),
        None,
    );
    assert_eq!(engine.pending_load_state(texture), Some(PendingLoadState::Pending));

    engine.pump_pending_loads();
    assert!(engine.texture_is_ready(texture));
    assert_eq!(engine.texture_size(texture), Some((4, 4)));
    assert!(loaded.get());
    assert_eq!(engine.pending_load_state(texture), Some(PendingLoadState::Completed));
}

#[test]
fn failed_load_retries_global_fallback_then_errors() {
    let options = EngineOptions {
        fallback_texture_url: Some("fallback.png".to_string()),
        ..EngineOptions::default()
    };
    let (mut engine, _handle) = make_engine_with(options, |_| {});

    let mut decoder = MemoryRasterDecoder::new();
    decoder.insert_image("fallback.png", checker_image(2));
    engine.set_raster_decoder(Box::new(decoder));

    let texture = engine.create_texture("missing.png", true, false, SamplingMode::Nearest, None, None);
    engine.pump_pending_loads();
    assert_eq!(engine.pending_load_state(texture), Some(PendingLoadState::Retrying));

    engine.pump_pending_loads();
    assert!(engine.texture_is_ready(texture));
    assert_eq!(engine.texture_size(texture), Some((2, 2)));
}

#[test]
fn failed_load_without_fallback_reports_error() {
    let (mut engine, _handle) = make_engine();

    let failed = Rc::new(Cell::new(false));
    let flag = Rc::clone(&failed);
    let texture = engine.create_texture(
        "missing.png",
        true,
        false,
        SamplingMode::Nearest,
        None,
        Some(Box::new(move |_, _| flag.set(true))),
    );

    engine.pump_pending_loads();
    assert!(failed.get());
    assert!(!engine.texture_is_ready(texture));
    assert_eq!(engine.pending_load_state(texture), Some(PendingLoadState::Failed));
}

#[test]
fn releasing_a_texture_cancels_its_load() {
    let (mut engine, _handle) = make_engine();

    let loaded = Rc::new(Cell::new(false));
    let flag = Rc::clone(&loaded);
    let texture = engine.create_texture(
        "missing.png",
        true,
        false,
        SamplingMode::Nearest,
        Some(Box::new(move |_| flag.set(true))),
        None,
    );
    engine.release_texture(texture);
    engine.pump_pending_loads();
    assert!(!loaded.get());
    assert_eq!(engine.pending_load_count(), 0);
}

// ============================================================================
// Render targets
// ============================================================================

#[test]
fn render_target_is_pot_remediated_with_ceiling() {
    let options = EngineOptions {
        pot_rounding: crate::utils::PotRounding::Ceiling,
        ..EngineOptions::default()
    };
    let (mut engine, _handle) = make_engine_with(options, |device| {
        device.set_feature(DeviceFeature::RequiresPotTextures, true);
        device.set_limit(DeviceLimit::MaxRenderTextureSize, Some(1024));
    });

    let target = engine
        .create_render_target_texture(257, 257, &RenderTargetOptions::default())
        .unwrap();
    assert_eq!(engine.texture_size(target), Some((512, 512)));
}

#[test]
fn msaa_target_resolves_on_unbind() {
    let (mut engine, handle) = make_engine();

    let options = RenderTargetOptions {
        samples: 4,
        ..RenderTargetOptions::default()
    };
    let target = engine.create_render_target_texture(128, 128, &options).unwrap();
    handle.clear();

    engine.bind_render_target(target, None, None, None, true, None).unwrap();
    assert_eq!(engine.current_render_target(), Some(target));

    engine.unbind_render_target(target, false, None).unwrap();
    assert_eq!(handle.count("blit_framebuffer"), 1);
    assert_eq!(engine.current_render_target(), None);
}

#[test]
fn float_target_downgrades_linear_filtering() {
    let (mut engine, handle) = make_engine_with(EngineOptions::default(), |device| {
        device.set_feature(DeviceFeature::TextureFloatLinearFiltering, false);
    });

    let options = RenderTargetOptions {
        pixel_type: crate::device::PixelType::Float,
        sampling_mode: SamplingMode::Trilinear,
        ..RenderTargetOptions::default()
    };
    let _target = engine.create_render_target_texture(64, 64, &options).unwrap();
    assert_eq!(
        handle.count("set_texture_filtering Texture2D Nearest"),
        1
    );
}

#[test]
fn cube_depth_texture_is_square_from_width() {
    let (mut engine, _handle) = make_engine();

    let options = DepthStencilOptions {
        is_cube: true,
        ..DepthStencilOptions::default()
    };
    let texture = engine.create_depth_stencil_texture(32, 64, &options).unwrap();
    assert_eq!(engine.texture_size(texture), Some((32, 32)));
    assert!(engine.texture_is_ready(texture));
}

// ============================================================================
// Device loss
// ============================================================================

#[test]
fn lost_context_rebuild_restores_ready_resources() {
    let (mut engine, handle) = make_engine();

    let buffer = engine.create_vertex_buffer(&[7u8; 32]).unwrap();
    let texture = engine
        .create_raw_texture(
            &[255u8; 16],
            2,
            2,
            crate::device::PixelFormat::Rgba,
            crate::device::PixelType::UnsignedByte,
            false,
            false,
            SamplingMode::Nearest,
        )
        .unwrap();
    let program = engine.get_or_create_program("basic", "vs", "fs", "", &[], &[], &[], None);

    handle.set_context_lost(true);
    handle.clear();
    engine.run_render_loop(Box::new(|_| {}));
    engine.render_frame(0.0);
    // Still lost: the pump pauses without touching the device
    assert_eq!(handle.count("create_buffer"), 0);

    handle.set_context_lost(false);
    engine.render_frame(16.0);

    assert!(engine.texture_is_ready(texture));
    assert!(engine.program_is_ready(program));
    assert_eq!(engine.buffer_references(buffer), Some(1));
    // All three resource kinds were recreated from retained data
    assert_eq!(handle.count("create_buffer"), 1);
    assert_eq!(handle.count("buffer_data Array 32"), 1);
    assert_eq!(handle.count("tex_image_2d 2x2"), 1);
    assert_eq!(handle.count("compile_program"), 1);
}

#[test]
fn rebuild_fires_once_on_the_restored_transition() {
    let (mut engine, handle) = make_engine();

    let _program = engine.get_or_create_program("basic", "vs", "fs", "", &[], &[], &[], None);
    engine.run_render_loop(Box::new(|_| {}));
    handle.set_context_lost(true);
    handle.clear();

    // Frames while lost never attempt a rebuild
    engine.render_frame(0.0);
    engine.render_frame(16.0);
    engine.render_frame(33.0);
    assert_eq!(handle.count("compile_program"), 0);

    handle.set_context_lost(false);
    engine.render_frame(50.0);
    engine.render_frame(66.0);
    // Exactly one rebuild, on the lost-to-restored transition
    assert_eq!(handle.count("compile_program"), 1);
}

#[test]
fn rebuild_is_skipped_when_loss_handling_disabled() {
    let options = EngineOptions {
        do_not_handle_context_lost: true,
        ..EngineOptions::default()
    };
    let (mut engine, handle) = make_engine_with(options, |_| {});

    let _buffer = engine.create_vertex_buffer(&[7u8; 32]).unwrap();
    handle.set_context_lost(true);
    handle.clear();
    engine.run_render_loop(Box::new(|_| {}));
    engine.render_frame(0.0);
    assert_eq!(handle.count("create_buffer"), 0);
}

// ============================================================================
// Disposal
// ============================================================================

#[test]
fn dispose_releases_everything() {
    let (mut engine, handle) = make_engine();

    let buffer = engine.create_vertex_buffer(&[0u8; 16]).unwrap();
    engine.acquire_buffer(buffer); // second owner does not survive dispose
    engine
        .create_raw_texture(
            &[255u8; 4],
            1,
            1,
            crate::device::PixelFormat::Rgba,
            crate::device::PixelType::UnsignedByte,
            false,
            false,
            SamplingMode::Nearest,
        )
        .unwrap();
    engine.get_or_create_program("basic", "vs", "fs", "", &[], &[], &[], None);

    engine.dispose();
    assert_eq!(engine.buffer_count(), 0);
    assert_eq!(engine.texture_count(), 0);
    assert_eq!(engine.program_count(), 0);
    assert!(!engine.is_looping());
    assert_eq!(handle.count("delete_buffer"), 1);
    assert_eq!(handle.count("delete_texture"), 1);
    assert_eq!(handle.count("delete_program"), 1);
}
