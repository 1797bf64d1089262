/// Null GraphicsDevice
///
/// Executes the full device command surface against in-memory storage.
/// Texture contents are retained per texture object so read-back and
/// framebuffer blits behave like a real backend; everything else is
/// counters. Limits and features are configurable before the device is
/// handed to the engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;

use stellar_3d_engine::device::{
    Attachment, BlendEquation, BlendFactor, BufferTarget, BufferUsage, ClearFlags,
    ComparisonFunction, CubeFace, DeviceBuffer, DeviceFeature, DeviceFramebuffer, DeviceLimit,
    DeviceProgram, DeviceRenderbuffer, DeviceTexture, GraphicsDevice, MagFilter, MinFilter,
    PixelFormat, PixelType, PrimitiveTopology, RenderbufferFormat, StencilOperation,
    TextureTarget, UniformLocation,
};
use stellar_3d_engine::stellar3d::Result;

// ============================================================================
// Stats and shared handle
// ============================================================================

/// Command counters accumulated by a [`NullDevice`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NullDeviceStats {
    pub draw_calls: u64,
    pub instanced_draw_calls: u64,
    pub clears: u64,
    pub buffer_uploads: u64,
    pub texture_uploads: u64,
    pub program_compiles: u64,
    pub state_changes: u64,
    pub framebuffer_binds: u64,
    pub blits: u64,
}

/// Handle into a [`NullDevice`]'s stats and simulated context state, kept
/// by the host after the device itself has been moved into the engine
#[derive(Debug, Clone)]
pub struct NullDeviceHandle {
    stats: Arc<Mutex<NullDeviceStats>>,
    context_lost: Arc<AtomicBool>,
}

impl NullDeviceHandle {
    /// Snapshot of the accumulated counters
    pub fn stats(&self) -> NullDeviceStats {
        self.stats.lock().unwrap().clone()
    }

    /// Zero all counters
    pub fn reset_stats(&self) {
        *self.stats.lock().unwrap() = NullDeviceStats::default();
    }

    /// Simulate losing the device context
    pub fn simulate_context_loss(&self) {
        self.context_lost.store(true, Ordering::SeqCst);
    }

    /// Simulate the context coming back
    pub fn restore_context(&self) {
        self.context_lost.store(false, Ordering::SeqCst);
    }

    pub fn is_context_lost(&self) -> bool {
        self.context_lost.load(Ordering::SeqCst)
    }
}

// ============================================================================
// In-memory objects
// ============================================================================

#[derive(Debug, Default)]
struct NullTexture {
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
    /// Last uploaded level-0 contents; `None` for unpopulated storage
    pixels: Option<Vec<u8>>,
}

#[derive(Debug, Default)]
struct NullFramebuffer {
    /// Texture object attached at color 0, if any
    color0: Option<u64>,
}

// ============================================================================
// Null Device
// ============================================================================

/// Headless GraphicsDevice backed by in-memory storage
#[derive(Debug)]
pub struct NullDevice {
    stats: Arc<Mutex<NullDeviceStats>>,
    context_lost: Arc<AtomicBool>,
    next_id: u64,

    /// Limit overrides (unset limits answer the default below)
    pub limits: FxHashMap<DeviceLimit, Option<u32>>,
    /// Feature overrides (unset features answer `true`)
    pub features: FxHashMap<DeviceFeature, bool>,

    textures: FxHashMap<u64, NullTexture>,
    framebuffers: FxHashMap<u64, NullFramebuffer>,

    bound_texture_2d: Option<u64>,
    bound_texture_cube: Option<u64>,
    bound_texture_3d: Option<u64>,
    bound_framebuffer: Option<u64>,
}

impl Default for NullDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl NullDevice {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(Mutex::new(NullDeviceStats::default())),
            context_lost: Arc::new(AtomicBool::new(false)),
            next_id: 1,
            limits: FxHashMap::default(),
            features: FxHashMap::default(),
            textures: FxHashMap::default(),
            framebuffers: FxHashMap::default(),
            bound_texture_2d: None,
            bound_texture_cube: None,
            bound_texture_3d: None,
            bound_framebuffer: None,
        }
    }

    /// Handle for inspecting stats after the device is moved into the engine
    pub fn handle(&self) -> NullDeviceHandle {
        NullDeviceHandle {
            stats: Arc::clone(&self.stats),
            context_lost: Arc::clone(&self.context_lost),
        }
    }

    /// Override a limit before handing the device to the engine
    pub fn set_limit(&mut self, limit: DeviceLimit, value: Option<u32>) {
        self.limits.insert(limit, value);
    }

    /// Override a feature before handing the device to the engine
    pub fn set_feature(&mut self, feature: DeviceFeature, enabled: bool) {
        self.features.insert(feature, enabled);
    }

    fn fresh_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn bump(&self, apply: impl FnOnce(&mut NullDeviceStats)) {
        apply(&mut self.stats.lock().unwrap());
    }

    fn state_change(&self) {
        self.bump(|s| s.state_changes += 1);
    }

    fn bound_texture_mut(&mut self, target: TextureTarget) -> Option<&mut NullTexture> {
        let id = match target {
            TextureTarget::Texture2D => self.bound_texture_2d,
            TextureTarget::TextureCube => self.bound_texture_cube,
            TextureTarget::Texture3D => self.bound_texture_3d,
        }?;
        self.textures.get_mut(&id)
    }

    fn default_limit(limit: DeviceLimit) -> u32 {
        match limit {
            DeviceLimit::MaxTextureImageUnits => 16,
            DeviceLimit::MaxCombinedTextureImageUnits => 32,
            DeviceLimit::MaxVertexTextureImageUnits => 16,
            DeviceLimit::MaxTextureSize => 16_384,
            DeviceLimit::MaxCubemapTextureSize => 16_384,
            DeviceLimit::MaxRenderTextureSize => 16_384,
            DeviceLimit::MaxVertexAttribs => 16,
            DeviceLimit::MaxVaryingVectors => 31,
            DeviceLimit::MaxFragmentUniformVectors => 1024,
            DeviceLimit::MaxVertexUniformVectors => 1024,
            DeviceLimit::MaxAnisotropy => 16,
            DeviceLimit::MaxMsaaSamples => 8,
            DeviceLimit::MaxDrawBuffers => 8,
        }
    }

    /// Nearest-neighbor resample used by the rescale and blit paths
    fn resample(
        pixels: &[u8],
        width: u32,
        height: u32,
        bytes_per_pixel: usize,
        new_width: u32,
        new_height: u32,
    ) -> Vec<u8> {
        let mut out = vec![0u8; new_width as usize * new_height as usize * bytes_per_pixel];
        if width == 0 || height == 0 {
            return out;
        }
        for y in 0..new_height {
            let src_y = (y as u64 * height as u64 / new_height as u64) as u32;
            for x in 0..new_width {
                let src_x = (x as u64 * width as u64 / new_width as u64) as u32;
                let src = (src_y * width + src_x) as usize * bytes_per_pixel;
                let dst = (y * new_width + x) as usize * bytes_per_pixel;
                if src + bytes_per_pixel <= pixels.len() {
                    out[dst..dst + bytes_per_pixel]
                        .copy_from_slice(&pixels[src..src + bytes_per_pixel]);
                }
            }
        }
        out
    }
}

impl GraphicsDevice for NullDevice {
    // ===== QUERIES =====

    fn query_limit(&self, limit: DeviceLimit) -> Option<u32> {
        match self.limits.get(&limit) {
            Some(value) => *value,
            None => Some(Self::default_limit(limit)),
        }
    }

    fn query_feature(&self, feature: DeviceFeature) -> bool {
        match feature {
            // Headless storage has no POT restriction
            DeviceFeature::RequiresPotTextures => {
                *self.features.get(&feature).unwrap_or(&false)
            }
            _ => *self.features.get(&feature).unwrap_or(&true),
        }
    }

    fn is_context_lost(&self) -> bool {
        self.context_lost.load(Ordering::SeqCst)
    }

    // ===== GLOBAL STATE =====

    fn set_viewport(&mut self, _x: i32, _y: i32, _width: i32, _height: i32) {
        self.state_change();
    }

    fn set_unpack_flip_y(&mut self, _value: bool) {
        self.state_change();
    }

    fn set_depth_test(&mut self, _enabled: bool) {
        self.state_change();
    }

    fn set_depth_write(&mut self, _enabled: bool) {
        self.state_change();
    }

    fn set_depth_func(&mut self, _func: ComparisonFunction) {
        self.state_change();
    }

    fn set_cull(&mut self, _enabled: bool) {
        self.state_change();
    }

    fn set_z_offset(&mut self, _offset: f32) {
        self.state_change();
    }

    fn set_stencil_test(&mut self, _enabled: bool) {
        self.state_change();
    }

    fn set_stencil_mask(&mut self, _mask: u32) {
        self.state_change();
    }

    fn set_stencil_func(&mut self, _func: ComparisonFunction, _reference: i32, _mask: u32) {
        self.state_change();
    }

    fn set_stencil_ops(
        &mut self,
        _fail: StencilOperation,
        _depth_fail: StencilOperation,
        _pass: StencilOperation,
    ) {
        self.state_change();
    }

    fn set_blend(&mut self, _enabled: bool) {
        self.state_change();
    }

    fn set_blend_func(
        &mut self,
        _src: BlendFactor,
        _dst: BlendFactor,
        _src_alpha: BlendFactor,
        _dst_alpha: BlendFactor,
    ) {
        self.state_change();
    }

    fn set_blend_equation(&mut self, _color: BlendEquation, _alpha: BlendEquation) {
        self.state_change();
    }

    // ===== BUFFERS =====

    fn create_buffer(&mut self) -> Result<DeviceBuffer> {
        Ok(DeviceBuffer(self.fresh_id()))
    }

    fn bind_buffer(&mut self, _target: BufferTarget, _buffer: Option<DeviceBuffer>) {}

    fn buffer_data(&mut self, _target: BufferTarget, _data: &[u8], _usage: BufferUsage) {
        self.bump(|s| s.buffer_uploads += 1);
    }

    fn buffer_allocate(&mut self, _target: BufferTarget, _size: usize, _usage: BufferUsage) {
        self.bump(|s| s.buffer_uploads += 1);
    }

    fn buffer_sub_data(&mut self, _target: BufferTarget, _offset: usize, _data: &[u8]) {
        self.bump(|s| s.buffer_uploads += 1);
    }

    fn delete_buffer(&mut self, _buffer: DeviceBuffer) {}

    fn enable_vertex_attrib(&mut self, _slot: u32) {
        self.state_change();
    }

    fn disable_vertex_attrib(&mut self, _slot: u32) {
        self.state_change();
    }

    // ===== TEXTURES =====

    fn create_texture(&mut self) -> Result<DeviceTexture> {
        let id = self.fresh_id();
        self.textures.insert(id, NullTexture::default());
        Ok(DeviceTexture(id))
    }

    fn active_texture(&mut self, _channel: u32) {}

    fn bind_texture(&mut self, target: TextureTarget, texture: Option<DeviceTexture>) {
        let id = texture.map(|t| t.0);
        match target {
            TextureTarget::Texture2D => self.bound_texture_2d = id,
            TextureTarget::TextureCube => self.bound_texture_cube = id,
            TextureTarget::Texture3D => self.bound_texture_3d = id,
        }
    }

    fn tex_image_2d(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
        pixel_type: PixelType,
        data: Option<&[u8]>,
    ) {
        let bytes_per_pixel = format.component_count() * pixel_type.component_size();
        if let Some(texture) = self.bound_texture_mut(TextureTarget::Texture2D) {
            texture.width = width;
            texture.height = height;
            texture.bytes_per_pixel = bytes_per_pixel;
            texture.pixels = data.map(|d| d.to_vec());
        }
        self.bump(|s| s.texture_uploads += 1);
    }

    fn tex_image_cube_face(
        &mut self,
        _face: CubeFace,
        size: u32,
        format: PixelFormat,
        pixel_type: PixelType,
        data: Option<&[u8]>,
    ) {
        // Faces share the object record; the last uploaded face wins
        let bytes_per_pixel = format.component_count() * pixel_type.component_size();
        if let Some(texture) = self.bound_texture_mut(TextureTarget::TextureCube) {
            texture.width = size;
            texture.height = size;
            texture.bytes_per_pixel = bytes_per_pixel;
            texture.pixels = data.map(|d| d.to_vec());
        }
        self.bump(|s| s.texture_uploads += 1);
    }

    fn tex_image_3d(
        &mut self,
        width: u32,
        height: u32,
        _depth: u32,
        format: PixelFormat,
        pixel_type: PixelType,
        data: Option<&[u8]>,
    ) {
        let bytes_per_pixel = format.component_count() * pixel_type.component_size();
        if let Some(texture) = self.bound_texture_mut(TextureTarget::Texture3D) {
            texture.width = width;
            texture.height = height;
            texture.bytes_per_pixel = bytes_per_pixel;
            texture.pixels = data.map(|d| d.to_vec());
        }
        self.bump(|s| s.texture_uploads += 1);
    }

    fn set_texture_filtering(&mut self, _target: TextureTarget, _mag: MagFilter, _min: MinFilter) {
        self.state_change();
    }

    fn set_texture_comparison(
        &mut self,
        _target: TextureTarget,
        _func: Option<ComparisonFunction>,
    ) {
        self.state_change();
    }

    fn generate_mipmaps(&mut self, _target: TextureTarget) {}

    fn rescale_texture(
        &mut self,
        source: DeviceTexture,
        destination: DeviceTexture,
        width: u32,
        height: u32,
    ) -> Result<()> {
        let resampled = match self.textures.get(&source.0) {
            Some(texture) => texture.pixels.as_ref().map(|pixels| {
                (
                    texture.bytes_per_pixel,
                    Self::resample(
                        pixels,
                        texture.width,
                        texture.height,
                        texture.bytes_per_pixel.max(1),
                        width,
                        height,
                    ),
                )
            }),
            None => None,
        };
        if let Some(texture) = self.textures.get_mut(&destination.0) {
            texture.width = width;
            texture.height = height;
            if let Some((bytes_per_pixel, pixels)) = resampled {
                texture.bytes_per_pixel = bytes_per_pixel;
                texture.pixels = Some(pixels);
            }
        }
        Ok(())
    }

    fn delete_texture(&mut self, texture: DeviceTexture) {
        self.textures.remove(&texture.0);
    }

    // ===== FRAMEBUFFERS =====

    fn create_framebuffer(&mut self) -> Result<DeviceFramebuffer> {
        let id = self.fresh_id();
        self.framebuffers.insert(id, NullFramebuffer::default());
        Ok(DeviceFramebuffer(id))
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<DeviceFramebuffer>) {
        self.bound_framebuffer = framebuffer.map(|f| f.0);
        self.bump(|s| s.framebuffer_binds += 1);
    }

    fn framebuffer_texture_2d(
        &mut self,
        attachment: Attachment,
        _face: Option<CubeFace>,
        texture: DeviceTexture,
        _level: u32,
    ) {
        if attachment != Attachment::Color(0) {
            return;
        }
        if let Some(id) = self.bound_framebuffer {
            if let Some(framebuffer) = self.framebuffers.get_mut(&id) {
                framebuffer.color0 = Some(texture.0);
            }
        }
    }

    fn create_renderbuffer(
        &mut self,
        _width: u32,
        _height: u32,
        _format: RenderbufferFormat,
        _samples: u32,
    ) -> Result<DeviceRenderbuffer> {
        Ok(DeviceRenderbuffer(self.fresh_id()))
    }

    fn framebuffer_renderbuffer(&mut self, _attachment: Attachment, _buffer: DeviceRenderbuffer) {}

    fn set_draw_buffers(&mut self, _count: u32) {
        self.state_change();
    }

    fn blit_framebuffer(
        &mut self,
        read: DeviceFramebuffer,
        draw: DeviceFramebuffer,
        width: u32,
        height: u32,
    ) {
        let source = self
            .framebuffers
            .get(&read.0)
            .and_then(|f| f.color0)
            .and_then(|id| self.textures.get(&id))
            .and_then(|texture| {
                texture.pixels.as_ref().map(|pixels| {
                    (
                        texture.bytes_per_pixel,
                        Self::resample(
                            pixels,
                            texture.width,
                            texture.height,
                            texture.bytes_per_pixel.max(1),
                            width,
                            height,
                        ),
                    )
                })
            });
        let target = self.framebuffers.get(&draw.0).and_then(|f| f.color0);
        if let (Some((bytes_per_pixel, pixels)), Some(id)) = (source, target) {
            if let Some(texture) = self.textures.get_mut(&id) {
                texture.width = width;
                texture.height = height;
                texture.bytes_per_pixel = bytes_per_pixel;
                texture.pixels = Some(pixels);
            }
        }
        self.bump(|s| s.blits += 1);
    }

    fn read_pixels(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<Vec<u8>> {
        let mut out = vec![0u8; (width * height * 4) as usize];
        let source = self
            .bound_framebuffer
            .and_then(|id| self.framebuffers.get(&id))
            .and_then(|f| f.color0)
            .and_then(|id| self.textures.get(&id));
        if let Some(texture) = source {
            if let Some(pixels) = &texture.pixels {
                let bpp = texture.bytes_per_pixel.max(1).min(4);
                for row in 0..height {
                    for col in 0..width {
                        let src_x = x + col as i32;
                        let src_y = y + row as i32;
                        if src_x < 0
                            || src_y < 0
                            || src_x as u32 >= texture.width
                            || src_y as u32 >= texture.height
                        {
                            continue;
                        }
                        let src = (src_y as u32 * texture.width + src_x as u32) as usize
                            * texture.bytes_per_pixel;
                        let dst = (row * width + col) as usize * 4;
                        if src + bpp <= pixels.len() {
                            out[dst..dst + bpp].copy_from_slice(&pixels[src..src + bpp]);
                        }
                    }
                }
            }
        }
        Ok(out)
    }

    fn delete_framebuffer(&mut self, framebuffer: DeviceFramebuffer) {
        self.framebuffers.remove(&framebuffer.0);
        if self.bound_framebuffer == Some(framebuffer.0) {
            self.bound_framebuffer = None;
        }
    }

    fn delete_renderbuffer(&mut self, _buffer: DeviceRenderbuffer) {}

    // ===== PROGRAMS =====

    fn compile_program(
        &mut self,
        _vertex_source: &str,
        _fragment_source: &str,
        _defines: &str,
    ) -> Result<DeviceProgram> {
        self.bump(|s| s.program_compiles += 1);
        Ok(DeviceProgram(self.fresh_id()))
    }

    fn attrib_location(&mut self, _program: DeviceProgram, name: &str) -> Option<u32> {
        // Deterministic slot derived from the name
        Some(name.len() as u32 % 16)
    }

    fn uniform_location(&mut self, _program: DeviceProgram, name: &str) -> Option<UniformLocation> {
        Some(UniformLocation(name.len() as u32 % 64))
    }

    fn use_program(&mut self, _program: Option<DeviceProgram>) {
        self.state_change();
    }

    fn set_uniform_int(&mut self, _location: UniformLocation, _value: i32) {
        self.state_change();
    }

    fn delete_program(&mut self, _program: DeviceProgram) {}

    // ===== DRAWS =====

    fn draw_elements(
        &mut self,
        _topology: PrimitiveTopology,
        _index_start: usize,
        _index_count: usize,
        _wide_indices: bool,
    ) {
        self.bump(|s| s.draw_calls += 1);
    }

    fn draw_elements_instanced(
        &mut self,
        _topology: PrimitiveTopology,
        _index_start: usize,
        _index_count: usize,
        _wide_indices: bool,
        _instances: usize,
    ) {
        self.bump(|s| {
            s.draw_calls += 1;
            s.instanced_draw_calls += 1;
        });
    }

    fn draw_arrays(&mut self, _topology: PrimitiveTopology, _first: usize, _count: usize) {
        self.bump(|s| s.draw_calls += 1);
    }

    fn draw_arrays_instanced(
        &mut self,
        _topology: PrimitiveTopology,
        _first: usize,
        _count: usize,
        _instances: usize,
    ) {
        self.bump(|s| {
            s.draw_calls += 1;
            s.instanced_draw_calls += 1;
        });
    }

    fn clear(&mut self, color: [f32; 4], _flags: ClearFlags) {
        // Fill the bound color attachment so read-back sees the clear
        let target = self
            .bound_framebuffer
            .and_then(|id| self.framebuffers.get(&id))
            .and_then(|f| f.color0);
        if let Some(id) = target {
            if let Some(texture) = self.textures.get_mut(&id) {
                if texture.bytes_per_pixel == 4 {
                    let pixel = [
                        (color[0].clamp(0.0, 1.0) * 255.0) as u8,
                        (color[1].clamp(0.0, 1.0) * 255.0) as u8,
                        (color[2].clamp(0.0, 1.0) * 255.0) as u8,
                        (color[3].clamp(0.0, 1.0) * 255.0) as u8,
                    ];
                    let count = (texture.width * texture.height) as usize;
                    texture.pixels = Some(pixel.repeat(count));
                }
            }
        }
        self.bump(|s| s.clears += 1);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "null_device_tests.rs"]
mod tests;
