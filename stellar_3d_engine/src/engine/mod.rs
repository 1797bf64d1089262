/// Engine module - the hardware-abstraction and resource-lifecycle core
///
/// `Engine` owns the device, the capability snapshot, every resource record
/// and the bound-state cache. All device commands are issued from one
/// logical thread through this type; external components only ever hold
/// copyable resource ids.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::capabilities::{self, Capabilities};
use crate::device::{
    BufferTarget, ComparisonFunction, DeviceBuffer, DeviceFramebuffer, DeviceProgram,
    GraphicsDevice, Viewport,
};
use crate::error::Result;
use crate::registry::{EngineInstanceId, EngineRegistry};
use crate::resource::{
    BufferId, BufferRecord, LoaderRegistry, MemoryRasterDecoder, ProgramId, ProgramRecord,
    RasterDecoder, TextureId, TextureRecord,
};
use crate::state::{AlphaState, DepthCullingState, StencilState};
use crate::utils::{PerformanceMonitor, PotRounding};
use crate::{engine_debug, engine_info};

// Module declarations
pub mod buffers;
pub mod textures;
pub mod loading;
pub mod render_targets;
pub mod programs;
pub mod binding;
pub mod draw;
pub mod frame;
pub mod rebuild;

pub use loading::PendingLoadState;
pub use render_targets::{DepthStencilOptions, RenderTargetOptions};

const SOURCE: &str = "stellar3d::Engine";

// ============================================================================
// Options
// ============================================================================

/// Engine construction options
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Label used for registry lookups and logging
    pub label: String,
    /// Skip the light per-frame cache wipe (assume state stable across frames)
    pub prevent_cache_wipe_between_frames: bool,
    /// Keep pumping render-loop callbacks while backgrounded
    pub render_even_in_background: bool,
    /// Make every texture bind unconditional, bypassing the recency chain
    pub disable_texture_binding_optimization: bool,
    /// Do not retain CPU copies or rebuild resources on device loss
    pub do_not_handle_context_lost: bool,
    /// Rounding policy for power-of-two remediation
    pub pot_rounding: PotRounding,
    /// Global fallback texture substituted when a load fails
    pub fallback_texture_url: Option<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            label: "engine".to_string(),
            prevent_cache_wipe_between_frames: false,
            render_even_in_background: true,
            disable_texture_binding_optimization: false,
            do_not_handle_context_lost: false,
            pot_rounding: PotRounding::Nearest,
            fallback_texture_url: None,
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Render-loop callback; receives the engine so it can issue commands
pub type RenderLoopFn = Box<dyn FnMut(&mut Engine)>;

/// Frame hook fired at begin/end of every pumped frame
pub type FrameHookFn = Box<dyn FnMut(&mut Engine)>;

/// The engine core
pub struct Engine {
    pub(crate) device: Box<dyn GraphicsDevice>,
    pub(crate) caps: Capabilities,
    pub(crate) options: EngineOptions,

    registry: Option<Arc<EngineRegistry>>,
    instance_id: Option<EngineInstanceId>,

    // ===== RESOURCE RECORDS =====
    pub(crate) textures: SlotMap<TextureId, TextureRecord>,
    pub(crate) buffers: SlotMap<BufferId, BufferRecord>,
    pub(crate) programs: SlotMap<ProgramId, ProgramRecord>,
    pub(crate) program_cache: FxHashMap<String, ProgramId>,

    // ===== BOUND-STATE CACHE =====
    pub(crate) depth_culling: DepthCullingState,
    pub(crate) stencil: StencilState,
    pub(crate) alpha: AlphaState,
    pub(crate) cached_viewport: Option<Viewport>,
    pub(crate) render_width: u32,
    pub(crate) render_height: u32,
    pub(crate) cached_unpack_flip_y: Option<bool>,
    pub(crate) bound_buffers: FxHashMap<BufferTarget, Option<DeviceBuffer>>,
    pub(crate) bound_index_buffer: Option<BufferId>,
    pub(crate) enabled_attribs: Vec<bool>,
    pub(crate) bound_textures: Vec<Option<TextureId>>,
    pub(crate) active_channel: Option<u32>,
    pub(crate) current_program: Option<DeviceProgram>,
    pub(crate) current_framebuffer: Option<DeviceFramebuffer>,
    pub(crate) bound_render_target: Option<TextureId>,

    // ===== BINDING CHAIN =====
    pub(crate) chain_head: TextureId,
    pub(crate) chain_tail: TextureId,

    // ===== FALLBACK TEXTURES =====
    pub(crate) empty_texture: Option<TextureId>,
    pub(crate) empty_cube_texture: Option<TextureId>,
    pub(crate) empty_texture_3d: Option<TextureId>,

    // ===== LOADING =====
    pub(crate) loaders: LoaderRegistry,
    pub(crate) raster_decoder: Box<dyn RasterDecoder>,
    pub(crate) pending_loads: Vec<loading::PendingLoad>,

    // ===== FRAME =====
    pub(crate) render_loop_callbacks: Vec<RenderLoopFn>,
    pub(crate) begin_frame_hooks: Vec<FrameHookFn>,
    pub(crate) end_frame_hooks: Vec<FrameHookFn>,
    pub(crate) looping: bool,
    pub(crate) background: bool,
    pub(crate) context_lost_observed: bool,
    pub(crate) frame_id: u64,
    pub(crate) draw_calls_this_frame: u32,
    pub(crate) draw_calls_last_frame: u32,
    pub(crate) performance: PerformanceMonitor,
}

impl Engine {
    /// Construct an engine over a device backend
    ///
    /// Probes capabilities once, seeds the bound-state cache with the
    /// engine defaults (depth test on, depth write on, `LessOrEqual`), and
    /// registers with `registry` when one is provided.
    ///
    /// # Errors
    ///
    /// Fails only if the initial surface size is unusable; the capability
    /// probe itself never fails.
    pub fn new(
        device: Box<dyn GraphicsDevice>,
        width: u32,
        height: u32,
        options: EngineOptions,
        registry: Option<Arc<EngineRegistry>>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            crate::engine_bail!(SOURCE, "Invalid render surface size {}x{}", width, height);
        }

        let caps = capabilities::probe(device.as_ref());

        let mut textures = SlotMap::with_key();
        let chain_head = textures.insert(TextureRecord::sentinel());
        let chain_tail = textures.insert(TextureRecord::sentinel());
        // Empty chain: the two sentinels point at each other
        textures[chain_head].chain_next = Some(chain_tail);
        textures[chain_tail].chain_prev = Some(chain_head);

        let channel_count = caps.max_combined_texture_image_units as usize;
        let attrib_count = caps.max_vertex_attribs as usize;

        let instance_id = registry.as_ref().map(|r| r.register(&options.label));

        let mut depth_culling = DepthCullingState::new();
        depth_culling.set_depth_func(ComparisonFunction::LessOrEqual);

        let mut engine = Self {
            device,
            caps,
            options,
            registry,
            instance_id,
            textures,
            buffers: SlotMap::with_key(),
            programs: SlotMap::with_key(),
            program_cache: FxHashMap::default(),
            depth_culling,
            stencil: StencilState::new(),
            alpha: AlphaState::new(),
            cached_viewport: None,
            render_width: width,
            render_height: height,
            cached_unpack_flip_y: None,
            bound_buffers: FxHashMap::default(),
            bound_index_buffer: None,
            enabled_attribs: vec![false; attrib_count],
            bound_textures: vec![None; channel_count],
            active_channel: None,
            current_program: None,
            current_framebuffer: None,
            bound_render_target: None,
            chain_head,
            chain_tail,
            empty_texture: None,
            empty_cube_texture: None,
            empty_texture_3d: None,
            loaders: LoaderRegistry::new(),
            raster_decoder: Box::new(MemoryRasterDecoder::new()),
            pending_loads: Vec::new(),
            render_loop_callbacks: Vec::new(),
            begin_frame_hooks: Vec::new(),
            end_frame_hooks: Vec::new(),
            looping: false,
            background: false,
            context_lost_observed: false,
            frame_id: 0,
            draw_calls_this_frame: 0,
            draw_calls_last_frame: 0,
            performance: PerformanceMonitor::new(),
        };

        engine.set_viewport(Viewport::full());
        engine.apply_states();

        engine_info!(
            SOURCE,
            "Engine '{}' initialized ({}x{}, {} texture channels)",
            engine.options.label,
            width,
            height,
            channel_count
        );

        Ok(engine)
    }

    // ===== ACCESSORS =====

    /// Immutable capability snapshot
    pub fn caps(&self) -> &Capabilities {
        &self.caps
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Render surface size in pixels
    pub fn render_size(&self) -> (u32, u32) {
        (self.render_width, self.render_height)
    }

    pub fn instance_id(&self) -> Option<EngineInstanceId> {
        self.instance_id
    }

    // ===== STATE =====

    /// Request a normalized viewport; committed on the next state apply
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if self.cached_viewport != Some(viewport) {
            self.cached_viewport = Some(viewport);
            let x = (viewport.x * self.render_width as f32) as i32;
            let y = (viewport.y * self.render_height as f32) as i32;
            let w = (viewport.width * self.render_width as f32) as i32;
            let h = (viewport.height * self.render_height as f32) as i32;
            self.device.set_viewport(x, y, w, h);
        }
    }

    pub fn set_depth_test(&mut self, enabled: bool) {
        self.depth_culling.set_depth_test(enabled);
    }

    pub fn set_depth_write(&mut self, enabled: bool) {
        self.depth_culling.set_depth_write(enabled);
    }

    pub fn set_depth_function(&mut self, func: ComparisonFunction) {
        self.depth_culling.set_depth_func(func);
    }

    pub fn set_culling(&mut self, enabled: bool) {
        self.depth_culling.set_cull(enabled);
    }

    pub fn depth_culling_state(&mut self) -> &mut DepthCullingState {
        &mut self.depth_culling
    }

    pub fn stencil_state(&mut self) -> &mut StencilState {
        &mut self.stencil
    }

    pub fn alpha_state(&mut self) -> &mut AlphaState {
        &mut self.alpha
    }

    /// Commit all dirty pipeline state to the device
    ///
    /// Called before every draw; a no-op when nothing changed.
    pub fn apply_states(&mut self) {
        self.depth_culling.apply(self.device.as_mut());
        self.stencil.apply(self.device.as_mut());
        self.alpha.apply(self.device.as_mut());
    }

    /// Cached vertical-flip-on-upload flag
    pub(crate) fn set_unpack_flip_y(&mut self, value: bool) {
        if self.cached_unpack_flip_y != Some(value) {
            self.device.set_unpack_flip_y(value);
            self.cached_unpack_flip_y = Some(value);
        }
    }

    // ===== CACHE WIPES =====

    /// Clear cached state so the next set of each field always commits
    ///
    /// The light wipe (`brute_force == false`) runs once per frame and only
    /// resets buffer/attribute caches; it is skipped entirely under
    /// `prevent_cache_wipe_between_frames`. The brute-force wipe
    /// additionally clears the texture cache, the active program, and all
    /// pipeline state objects (used on device loss and explicit requests).
    pub fn wipe_caches(&mut self, brute_force: bool) {
        if self.options.prevent_cache_wipe_between_frames && !brute_force {
            return;
        }

        self.bound_buffers.clear();
        for slot in self.enabled_attribs.iter_mut() {
            *slot = false;
        }

        if brute_force {
            engine_debug!(SOURCE, "Brute-force cache wipe");
            self.current_program = None;
            self.reset_texture_cache();
            self.cached_unpack_flip_y = None;
            self.cached_viewport = None;

            self.depth_culling.reset();
            self.depth_culling.set_depth_func(ComparisonFunction::LessOrEqual);
            self.stencil.reset();
            self.alpha.reset();
        }
    }

    /// Forget all channel bindings and the active channel
    pub(crate) fn reset_texture_cache(&mut self) {
        for channel in 0..self.bound_textures.len() {
            if let Some(id) = self.bound_textures[channel].take() {
                if let Some(record) = self.textures.get_mut(id) {
                    record.associated_channel = None;
                }
            }
        }
        self.active_channel = None;
    }

    // ===== DISPOSAL =====

    /// Tear the engine down: stop the loop, release every live resource,
    /// and unregister from the instance registry
    pub fn dispose(&mut self) {
        self.stop_render_loop();
        self.pending_loads.clear();

        self.release_all_programs();

        let buffer_ids: Vec<BufferId> = self.buffers.keys().collect();
        for id in buffer_ids {
            // Force the count to one so disposal frees unconditionally
            if let Some(record) = self.buffers.get_mut(id) {
                record.references = 1;
            }
            self.release_buffer(id);
        }

        self.empty_texture = None;
        self.empty_cube_texture = None;
        self.empty_texture_3d = None;

        let texture_ids: Vec<TextureId> = self
            .textures
            .iter()
            .filter(|(_, record)| !record.is_chain_sentinel)
            .map(|(id, _)| id)
            .collect();
        for id in texture_ids {
            self.release_texture(id);
        }

        if let (Some(registry), Some(id)) = (self.registry.as_ref(), self.instance_id.take()) {
            registry.unregister(id);
        }

        engine_info!(SOURCE, "Engine '{}' disposed", self.options.label);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
