/// Mock GraphicsDevice for unit tests (no GPU required)
///
/// Records every command it receives into a journal so tests can assert on
/// exactly which commands the engine emitted (and, just as important, which
/// redundant commands the bound-state cache elided). Limits and features are
/// configurable per test.

#[cfg(test)]
use std::sync::{Arc, Mutex};
#[cfg(test)]
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[cfg(test)]
use rustc_hash::FxHashMap;

#[cfg(test)]
use crate::device::{
    Attachment, BlendEquation, BlendFactor, BufferTarget, BufferUsage, ClearFlags,
    ComparisonFunction, CubeFace, DeviceBuffer, DeviceFeature, DeviceFramebuffer, DeviceLimit,
    DeviceProgram, DeviceRenderbuffer, DeviceTexture, GraphicsDevice, MagFilter, MinFilter,
    PixelFormat, PixelType, PrimitiveTopology, RenderbufferFormat, StencilOperation,
    TextureTarget, UniformLocation,
};
#[cfg(test)]
use crate::error::Result;

// ============================================================================
// Shared journal handle
// ============================================================================

/// Handle into a [`MockDevice`]'s recorded state, kept by tests after the
/// device itself has been moved into the engine
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct MockDeviceHandle {
    commands: Arc<Mutex<Vec<String>>>,
    context_lost: Arc<AtomicBool>,
}

#[cfg(test)]
impl MockDeviceHandle {
    /// All recorded commands, in order
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    /// Number of recorded commands whose name starts with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Forget all recorded commands
    pub fn clear(&self) {
        self.commands.lock().unwrap().clear();
    }

    /// Simulate losing (or restoring) the device context
    pub fn set_context_lost(&self, lost: bool) {
        self.context_lost.store(lost, Ordering::SeqCst);
    }
}

// ============================================================================
// Mock Device
// ============================================================================

/// Mock GraphicsDevice that journals commands without a GPU
#[cfg(test)]
#[derive(Debug)]
pub struct MockDevice {
    commands: Arc<Mutex<Vec<String>>>,
    context_lost: Arc<AtomicBool>,
    next_id: AtomicU64,

    /// Limit overrides (unset limits answer the default below)
    pub limits: FxHashMap<DeviceLimit, Option<u32>>,
    /// Feature overrides (unset features answer `true`)
    pub features: FxHashMap<DeviceFeature, bool>,
}

#[cfg(test)]
impl MockDevice {
    /// Create a mock device with generous default limits
    pub fn new() -> Self {
        Self {
            commands: Arc::new(Mutex::new(Vec::new())),
            context_lost: Arc::new(AtomicBool::new(false)),
            next_id: AtomicU64::new(1),
            limits: FxHashMap::default(),
            features: FxHashMap::default(),
        }
    }

    /// Handle for inspecting the journal after the device is moved
    pub fn handle(&self) -> MockDeviceHandle {
        MockDeviceHandle {
            commands: Arc::clone(&self.commands),
            context_lost: Arc::clone(&self.context_lost),
        }
    }

    /// Override a limit for this test
    pub fn set_limit(&mut self, limit: DeviceLimit, value: Option<u32>) {
        self.limits.insert(limit, value);
    }

    /// Override a feature for this test
    pub fn set_feature(&mut self, feature: DeviceFeature, enabled: bool) {
        self.features.insert(feature, enabled);
    }

    fn record(&self, command: String) {
        self.commands.lock().unwrap().push(command);
    }

    fn fresh_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn default_limit(limit: DeviceLimit) -> u32 {
        match limit {
            DeviceLimit::MaxTextureImageUnits => 16,
            DeviceLimit::MaxCombinedTextureImageUnits => 32,
            DeviceLimit::MaxVertexTextureImageUnits => 16,
            DeviceLimit::MaxTextureSize => 4096,
            DeviceLimit::MaxCubemapTextureSize => 4096,
            DeviceLimit::MaxRenderTextureSize => 4096,
            DeviceLimit::MaxVertexAttribs => 16,
            DeviceLimit::MaxVaryingVectors => 16,
            DeviceLimit::MaxFragmentUniformVectors => 1024,
            DeviceLimit::MaxVertexUniformVectors => 1024,
            DeviceLimit::MaxAnisotropy => 16,
            DeviceLimit::MaxMsaaSamples => 4,
            DeviceLimit::MaxDrawBuffers => 8,
        }
    }
}

#[cfg(test)]
impl GraphicsDevice for MockDevice {
    fn query_limit(&self, limit: DeviceLimit) -> Option<u32> {
        match self.limits.get(&limit) {
            Some(value) => *value,
            None => Some(Self::default_limit(limit)),
        }
    }

    fn query_feature(&self, feature: DeviceFeature) -> bool {
        match feature {
            // POT-only hardware is opt-in for tests
            DeviceFeature::RequiresPotTextures => {
                *self.features.get(&feature).unwrap_or(&false)
            }
            _ => *self.features.get(&feature).unwrap_or(&true),
        }
    }

    fn is_context_lost(&self) -> bool {
        self.context_lost.load(Ordering::SeqCst)
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.record(format!("set_viewport {} {} {} {}", x, y, width, height));
    }

    fn set_unpack_flip_y(&mut self, value: bool) {
        self.record(format!("set_unpack_flip_y {}", value));
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.record(format!("set_depth_test {}", enabled));
    }

    fn set_depth_write(&mut self, enabled: bool) {
        self.record(format!("set_depth_write {}", enabled));
    }

    fn set_depth_func(&mut self, func: ComparisonFunction) {
        self.record(format!("set_depth_func {:?}", func));
    }

    fn set_cull(&mut self, enabled: bool) {
        self.record(format!("set_cull {}", enabled));
    }

    fn set_z_offset(&mut self, offset: f32) {
        self.record(format!("set_z_offset {}", offset));
    }

    fn set_stencil_test(&mut self, enabled: bool) {
        self.record(format!("set_stencil_test {}", enabled));
    }

    fn set_stencil_mask(&mut self, mask: u32) {
        self.record(format!("set_stencil_mask {}", mask));
    }

    fn set_stencil_func(&mut self, func: ComparisonFunction, reference: i32, mask: u32) {
        self.record(format!("set_stencil_func {:?} {} {}", func, reference, mask));
    }

    fn set_stencil_ops(
        &mut self,
        fail: StencilOperation,
        depth_fail: StencilOperation,
        pass: StencilOperation,
    ) {
        self.record(format!("set_stencil_ops {:?} {:?} {:?}", fail, depth_fail, pass));
    }

    fn set_blend(&mut self, enabled: bool) {
        self.record(format!("set_blend {}", enabled));
    }

    fn set_blend_func(
        &mut self,
        src: BlendFactor,
        dst: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) {
        self.record(format!(
            "set_blend_func {:?} {:?} {:?} {:?}",
            src, dst, src_alpha, dst_alpha
        ));
    }

    fn set_blend_equation(&mut self, color: BlendEquation, alpha: BlendEquation) {
        self.record(format!("set_blend_equation {:?} {:?}", color, alpha));
    }

    fn create_buffer(&mut self) -> Result<DeviceBuffer> {
        let id = self.fresh_id();
        self.record(format!("create_buffer -> {}", id));
        Ok(DeviceBuffer(id))
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<DeviceBuffer>) {
        self.record(format!("bind_buffer {:?} {:?}", target, buffer.map(|b| b.0)));
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        self.record(format!("buffer_data {:?} {} {:?}", target, data.len(), usage));
    }

    fn buffer_allocate(&mut self, target: BufferTarget, size: usize, usage: BufferUsage) {
        self.record(format!("buffer_allocate {:?} {} {:?}", target, size, usage));
    }

    fn buffer_sub_data(&mut self, target: BufferTarget, offset: usize, data: &[u8]) {
        self.record(format!("buffer_sub_data {:?} {} {}", target, offset, data.len()));
    }

    fn delete_buffer(&mut self, buffer: DeviceBuffer) {
        self.record(format!("delete_buffer {}", buffer.0));
    }

    fn enable_vertex_attrib(&mut self, slot: u32) {
        self.record(format!("enable_vertex_attrib {}", slot));
    }

    fn disable_vertex_attrib(&mut self, slot: u32) {
        self.record(format!("disable_vertex_attrib {}", slot));
    }

    fn create_texture(&mut self) -> Result<DeviceTexture> {
        let id = self.fresh_id();
        self.record(format!("create_texture -> {}", id));
        Ok(DeviceTexture(id))
    }

    fn active_texture(&mut self, channel: u32) {
        self.record(format!("active_texture {}", channel));
    }

    fn bind_texture(&mut self, target: TextureTarget, texture: Option<DeviceTexture>) {
        self.record(format!("bind_texture {:?} {:?}", target, texture.map(|t| t.0)));
    }

    fn tex_image_2d(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
        pixel_type: PixelType,
        data: Option<&[u8]>,
    ) {
        self.record(format!(
            "tex_image_2d {}x{} {:?} {:?} {:?}",
            width,
            height,
            format,
            pixel_type,
            data.map(|d| d.len())
        ));
    }

    fn tex_image_cube_face(
        &mut self,
        face: CubeFace,
        size: u32,
        format: PixelFormat,
        pixel_type: PixelType,
        data: Option<&[u8]>,
    ) {
        self.record(format!(
            "tex_image_cube_face {:?} {} {:?} {:?} {:?}",
            face,
            size,
            format,
            pixel_type,
            data.map(|d| d.len())
        ));
    }

    fn tex_image_3d(
        &mut self,
        width: u32,
        height: u32,
        depth: u32,
        format: PixelFormat,
        pixel_type: PixelType,
        data: Option<&[u8]>,
    ) {
        self.record(format!(
            "tex_image_3d {}x{}x{} {:?} {:?} {:?}",
            width,
            height,
            depth,
            format,
            pixel_type,
            data.map(|d| d.len())
        ));
    }

    fn set_texture_filtering(&mut self, target: TextureTarget, mag: MagFilter, min: MinFilter) {
        self.record(format!("set_texture_filtering {:?} {:?} {:?}", target, mag, min));
    }

    fn set_texture_comparison(&mut self, target: TextureTarget, func: Option<ComparisonFunction>) {
        self.record(format!("set_texture_comparison {:?} {:?}", target, func));
    }

    fn generate_mipmaps(&mut self, target: TextureTarget) {
        self.record(format!("generate_mipmaps {:?}", target));
    }

    fn rescale_texture(
        &mut self,
        source: DeviceTexture,
        destination: DeviceTexture,
        width: u32,
        height: u32,
    ) -> Result<()> {
        self.record(format!(
            "rescale_texture {} -> {} {}x{}",
            source.0, destination.0, width, height
        ));
        Ok(())
    }

    fn delete_texture(&mut self, texture: DeviceTexture) {
        self.record(format!("delete_texture {}", texture.0));
    }

    fn create_framebuffer(&mut self) -> Result<DeviceFramebuffer> {
        let id = self.fresh_id();
        self.record(format!("create_framebuffer -> {}", id));
        Ok(DeviceFramebuffer(id))
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<DeviceFramebuffer>) {
        self.record(format!("bind_framebuffer {:?}", framebuffer.map(|f| f.0)));
    }

    fn framebuffer_texture_2d(
        &mut self,
        attachment: Attachment,
        face: Option<CubeFace>,
        texture: DeviceTexture,
        level: u32,
    ) {
        self.record(format!(
            "framebuffer_texture_2d {:?} {:?} {} {}",
            attachment, face, texture.0, level
        ));
    }

    fn create_renderbuffer(
        &mut self,
        width: u32,
        height: u32,
        format: RenderbufferFormat,
        samples: u32,
    ) -> Result<DeviceRenderbuffer> {
        let id = self.fresh_id();
        self.record(format!(
            "create_renderbuffer {}x{} {:?} {} -> {}",
            width, height, format, samples, id
        ));
        Ok(DeviceRenderbuffer(id))
    }

    fn framebuffer_renderbuffer(&mut self, attachment: Attachment, buffer: DeviceRenderbuffer) {
        self.record(format!("framebuffer_renderbuffer {:?} {}", attachment, buffer.0));
    }

    fn set_draw_buffers(&mut self, count: u32) {
        self.record(format!("set_draw_buffers {}", count));
    }

    fn blit_framebuffer(
        &mut self,
        read: DeviceFramebuffer,
        draw: DeviceFramebuffer,
        width: u32,
        height: u32,
    ) {
        self.record(format!(
            "blit_framebuffer {} -> {} {}x{}",
            read.0, draw.0, width, height
        ));
    }

    fn read_pixels(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<Vec<u8>> {
        self.record(format!("read_pixels {} {} {}x{}", x, y, width, height));
        Ok(vec![0; (width * height * 4) as usize])
    }

    fn delete_framebuffer(&mut self, framebuffer: DeviceFramebuffer) {
        self.record(format!("delete_framebuffer {}", framebuffer.0));
    }

    fn delete_renderbuffer(&mut self, buffer: DeviceRenderbuffer) {
        self.record(format!("delete_renderbuffer {}", buffer.0));
    }

    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
        defines: &str,
    ) -> Result<DeviceProgram> {
        let id = self.fresh_id();
        self.record(format!(
            "compile_program vs={} fs={} defines={:?} -> {}",
            vertex_source.len(),
            fragment_source.len(),
            defines,
            id
        ));
        Ok(DeviceProgram(id))
    }

    fn attrib_location(&mut self, program: DeviceProgram, name: &str) -> Option<u32> {
        self.record(format!("attrib_location {} {}", program.0, name));
        // Stable per-name slot derived from the name length
        Some((name.len() % 16) as u32)
    }

    fn uniform_location(&mut self, program: DeviceProgram, name: &str) -> Option<UniformLocation> {
        self.record(format!("uniform_location {} {}", program.0, name));
        Some(UniformLocation((name.len() % 64) as u32))
    }

    fn use_program(&mut self, program: Option<DeviceProgram>) {
        self.record(format!("use_program {:?}", program.map(|p| p.0)));
    }

    fn set_uniform_int(&mut self, location: UniformLocation, value: i32) {
        self.record(format!("set_uniform_int {} {}", location.0, value));
    }

    fn delete_program(&mut self, program: DeviceProgram) {
        self.record(format!("delete_program {}", program.0));
    }

    fn draw_elements(
        &mut self,
        topology: PrimitiveTopology,
        index_start: usize,
        index_count: usize,
        wide_indices: bool,
    ) {
        self.record(format!(
            "draw_elements {:?} {} {} wide={}",
            topology, index_start, index_count, wide_indices
        ));
    }

    fn draw_elements_instanced(
        &mut self,
        topology: PrimitiveTopology,
        index_start: usize,
        index_count: usize,
        wide_indices: bool,
        instances: usize,
    ) {
        self.record(format!(
            "draw_elements_instanced {:?} {} {} wide={} x{}",
            topology, index_start, index_count, wide_indices, instances
        ));
    }

    fn draw_arrays(&mut self, topology: PrimitiveTopology, first: usize, count: usize) {
        self.record(format!("draw_arrays {:?} {} {}", topology, first, count));
    }

    fn draw_arrays_instanced(
        &mut self,
        topology: PrimitiveTopology,
        first: usize,
        count: usize,
        instances: usize,
    ) {
        self.record(format!(
            "draw_arrays_instanced {:?} {} {} x{}",
            topology, first, count, instances
        ));
    }

    fn clear(&mut self, color: [f32; 4], flags: ClearFlags) {
        self.record(format!("clear {:?} {:?}", color, flags));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mock_device_tests.rs"]
mod tests;
