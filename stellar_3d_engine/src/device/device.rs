/// GraphicsDevice trait - raw command surface of a graphics backend
///
/// This is the single seam between the engine core and an underlying
/// graphics API. The engine core never talks to a graphics API directly:
/// every state change, upload and draw goes through this trait, which lets
/// the bound-state cache guarantee that redundant commands are elided and
/// lets a headless backend stand in for a real device.
///
/// Implementations are stateful in the same way a GL context is: binding
/// commands affect subsequent upload/draw commands. The engine core is the
/// only caller and serializes all commands on one logical thread.

use crate::error::Result;
use crate::device::types::{
    Attachment, BlendEquation, BlendFactor, BufferTarget, BufferUsage, ComparisonFunction,
    CubeFace, DeviceBuffer, DeviceFeature, DeviceFramebuffer, DeviceLimit, DeviceProgram,
    DeviceRenderbuffer, DeviceTexture, MagFilter, MinFilter, PixelFormat, PixelType,
    PrimitiveTopology, RenderbufferFormat, StencilOperation, TextureTarget, UniformLocation,
};

/// Raw command surface implemented by device backends
pub trait GraphicsDevice: Send {
    // ===== QUERIES =====

    /// Query a numeric limit
    ///
    /// Returns `None` (or `Some(0)`, which the probe treats identically)
    /// when the query is unreliable on this device.
    fn query_limit(&self, limit: DeviceLimit) -> Option<u32>;

    /// Query an optional feature flag
    fn query_feature(&self, feature: DeviceFeature) -> bool;

    /// Whether the underlying context has been lost
    fn is_context_lost(&self) -> bool;

    // ===== GLOBAL STATE =====

    /// Set the pixel viewport rectangle
    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32);

    /// Set the vertical-flip-on-upload flag
    fn set_unpack_flip_y(&mut self, value: bool);

    // ===== DEPTH / CULL =====

    fn set_depth_test(&mut self, enabled: bool);
    fn set_depth_write(&mut self, enabled: bool);
    fn set_depth_func(&mut self, func: ComparisonFunction);
    fn set_cull(&mut self, enabled: bool);
    fn set_z_offset(&mut self, offset: f32);

    // ===== STENCIL =====

    fn set_stencil_test(&mut self, enabled: bool);
    fn set_stencil_mask(&mut self, mask: u32);
    fn set_stencil_func(&mut self, func: ComparisonFunction, reference: i32, mask: u32);
    fn set_stencil_ops(
        &mut self,
        fail: StencilOperation,
        depth_fail: StencilOperation,
        pass: StencilOperation,
    );

    // ===== BLEND =====

    fn set_blend(&mut self, enabled: bool);
    fn set_blend_func(
        &mut self,
        src: BlendFactor,
        dst: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    );
    fn set_blend_equation(&mut self, color: BlendEquation, alpha: BlendEquation);

    // ===== BUFFERS =====

    /// Create an empty buffer object
    fn create_buffer(&mut self) -> Result<DeviceBuffer>;

    /// Bind a buffer (or unbind with `None`) to a target
    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<DeviceBuffer>);

    /// Allocate and fill the buffer currently bound to `target`
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage);

    /// Allocate the buffer currently bound to `target` without filling it
    fn buffer_allocate(&mut self, target: BufferTarget, size: usize, usage: BufferUsage);

    /// Update a sub-range of the buffer currently bound to `target`
    fn buffer_sub_data(&mut self, target: BufferTarget, offset: usize, data: &[u8]);

    /// Free a buffer object
    fn delete_buffer(&mut self, buffer: DeviceBuffer);

    // ===== VERTEX ATTRIBUTES =====

    fn enable_vertex_attrib(&mut self, slot: u32);
    fn disable_vertex_attrib(&mut self, slot: u32);

    // ===== TEXTURES =====

    /// Create an empty texture object
    fn create_texture(&mut self) -> Result<DeviceTexture>;

    /// Select the active texture channel for subsequent bind commands
    fn active_texture(&mut self, channel: u32);

    /// Bind a texture (or unbind with `None`) to a target on the active channel
    fn bind_texture(&mut self, target: TextureTarget, texture: Option<DeviceTexture>);

    /// Upload 2D storage for the texture bound to `Texture2D` on the active channel
    ///
    /// `data` is `None` to allocate storage without filling it (render targets,
    /// depth textures).
    fn tex_image_2d(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
        pixel_type: PixelType,
        data: Option<&[u8]>,
    );

    /// Upload one face of the cube texture bound on the active channel
    fn tex_image_cube_face(
        &mut self,
        face: CubeFace,
        size: u32,
        format: PixelFormat,
        pixel_type: PixelType,
        data: Option<&[u8]>,
    );

    /// Upload 3D storage for the texture bound to `Texture3D` on the active channel
    fn tex_image_3d(
        &mut self,
        width: u32,
        height: u32,
        depth: u32,
        format: PixelFormat,
        pixel_type: PixelType,
        data: Option<&[u8]>,
    );

    /// Set mag/min filters of the texture bound to `target` on the active channel
    fn set_texture_filtering(&mut self, target: TextureTarget, mag: MagFilter, min: MinFilter);

    /// Set or clear the comparison function of the bound depth texture
    fn set_texture_comparison(&mut self, target: TextureTarget, func: Option<ComparisonFunction>);

    /// Generate the mip chain of the texture bound to `target`
    fn generate_mipmaps(&mut self, target: TextureTarget);

    /// Backend blit of one texture into another at a new size
    ///
    /// Used by power-of-two remediation when an image exceeds the device's
    /// maximum texture size; implemented as a rescale render pass by real
    /// backends.
    fn rescale_texture(
        &mut self,
        source: DeviceTexture,
        destination: DeviceTexture,
        width: u32,
        height: u32,
    ) -> Result<()>;

    /// Free a texture object
    fn delete_texture(&mut self, texture: DeviceTexture);

    // ===== FRAMEBUFFERS =====

    /// Create an empty framebuffer object
    fn create_framebuffer(&mut self) -> Result<DeviceFramebuffer>;

    /// Bind a framebuffer, or restore the default surface with `None`
    fn bind_framebuffer(&mut self, framebuffer: Option<DeviceFramebuffer>);

    /// Attach a texture level to the currently bound framebuffer
    fn framebuffer_texture_2d(
        &mut self,
        attachment: Attachment,
        face: Option<CubeFace>,
        texture: DeviceTexture,
        level: u32,
    );

    /// Create a renderbuffer with the given storage
    fn create_renderbuffer(
        &mut self,
        width: u32,
        height: u32,
        format: RenderbufferFormat,
        samples: u32,
    ) -> Result<DeviceRenderbuffer>;

    /// Attach a renderbuffer to the currently bound framebuffer
    fn framebuffer_renderbuffer(&mut self, attachment: Attachment, buffer: DeviceRenderbuffer);

    /// Select the count of active color draw buffers on the bound framebuffer
    fn set_draw_buffers(&mut self, count: u32);

    /// Resolve/copy the color contents of `read` into `draw`
    fn blit_framebuffer(
        &mut self,
        read: DeviceFramebuffer,
        draw: DeviceFramebuffer,
        width: u32,
        height: u32,
    );

    /// Read back an RGBA8 rectangle from the currently bound framebuffer
    /// (or the default surface when none is bound)
    fn read_pixels(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<Vec<u8>>;

    /// Free a framebuffer object
    fn delete_framebuffer(&mut self, framebuffer: DeviceFramebuffer);

    /// Free a renderbuffer object
    fn delete_renderbuffer(&mut self, buffer: DeviceRenderbuffer);

    // ===== PROGRAMS =====

    /// Compile and link a program from preprocessed sources
    ///
    /// # Errors
    ///
    /// Returns a backend error carrying the compile/link log on failure.
    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
        defines: &str,
    ) -> Result<DeviceProgram>;

    /// Resolve an attribute location, `None` when the attribute is not active
    fn attrib_location(&mut self, program: DeviceProgram, name: &str) -> Option<u32>;

    /// Resolve a uniform location, `None` when the uniform is not active
    fn uniform_location(&mut self, program: DeviceProgram, name: &str) -> Option<UniformLocation>;

    /// Make a program current (or clear with `None`)
    fn use_program(&mut self, program: Option<DeviceProgram>);

    /// Set an integer uniform (sampler channel assignment)
    fn set_uniform_int(&mut self, location: UniformLocation, value: i32);

    /// Free a program object
    fn delete_program(&mut self, program: DeviceProgram);

    // ===== DRAWS =====

    fn draw_elements(
        &mut self,
        topology: PrimitiveTopology,
        index_start: usize,
        index_count: usize,
        wide_indices: bool,
    );

    fn draw_elements_instanced(
        &mut self,
        topology: PrimitiveTopology,
        index_start: usize,
        index_count: usize,
        wide_indices: bool,
        instances: usize,
    );

    fn draw_arrays(&mut self, topology: PrimitiveTopology, first: usize, count: usize);

    fn draw_arrays_instanced(
        &mut self,
        topology: PrimitiveTopology,
        first: usize,
        count: usize,
        instances: usize,
    );

    /// Clear the buffers selected by `flags` on the bound framebuffer
    fn clear(&mut self, color: [f32; 4], flags: crate::device::types::ClearFlags);
}
