/// Render-target creation and the framebuffer binder
///
/// Render targets are textures with an attached framebuffer and optional
/// depth/stencil storage. Multisampled targets draw into a side framebuffer
/// backed by a multisample renderbuffer and resolve into the color texture
/// on unbind. Only one render target is bound at a time; binding a new one
/// implicitly unbinds the previous one.

use crate::device::{
    Attachment, CubeFace, DeviceFramebuffer, PixelFormat, PixelType, RenderbufferFormat,
    SamplingMode, TextureTarget, Viewport,
};
use crate::engine::Engine;
use crate::error::Result;
use crate::resource::{TextureId, TextureRecord, TextureSource};
use crate::utils::required_pot_size;
use crate::{engine_error, engine_warn};

const SOURCE: &str = "stellar3d::RenderTargetBinder";

// ============================================================================
// Option structs
// ============================================================================

/// Render-target creation options; every field has a documented default
#[derive(Debug, Clone)]
pub struct RenderTargetOptions {
    /// Generate a mip chain on unbind (default false)
    pub generate_mipmaps: bool,
    /// Attach a depth renderbuffer (default true)
    pub generate_depth_buffer: bool,
    /// Attach a combined depth/stencil renderbuffer (default false)
    pub generate_stencil_buffer: bool,
    /// Color pixel type (default unsigned byte)
    pub pixel_type: PixelType,
    /// Color pixel format (default RGBA)
    pub pixel_format: PixelFormat,
    /// Sampling mode (default trilinear; downgraded when unfilterable)
    pub sampling_mode: SamplingMode,
    /// Multisample count (default 1, no multisampling)
    pub samples: u32,
}

impl Default for RenderTargetOptions {
    fn default() -> Self {
        Self {
            generate_mipmaps: false,
            generate_depth_buffer: true,
            generate_stencil_buffer: false,
            pixel_type: PixelType::UnsignedByte,
            pixel_format: PixelFormat::Rgba,
            sampling_mode: SamplingMode::Trilinear,
            samples: 1,
        }
    }
}

/// Depth/stencil texture creation options
#[derive(Debug, Clone)]
pub struct DepthStencilOptions {
    /// Create a cube depth texture (default false)
    pub is_cube: bool,
    /// Linear filtering instead of nearest (default false)
    pub bilinear_filtering: bool,
    /// Comparison function for shadow sampling (default none)
    pub comparison_function: Option<crate::device::ComparisonFunction>,
    /// Use combined depth/stencil storage (default false)
    pub generate_stencil: bool,
}

impl Default for DepthStencilOptions {
    fn default() -> Self {
        Self {
            is_cube: false,
            bilinear_filtering: false,
            comparison_function: None,
            generate_stencil: false,
        }
    }
}

/// Hook fired while a render target is still bound, just before restore
pub type OnBeforeUnbindFn = Box<dyn FnOnce(&mut Engine)>;

// ============================================================================
// Implementation
// ============================================================================

impl Engine {
    // ===== CREATION =====

    /// Downgrade linear filtering when the pixel type is not linear-filterable
    fn effective_rt_sampling(&self, options: &RenderTargetOptions) -> SamplingMode {
        let filterable = match options.pixel_type {
            PixelType::Float => self.caps.texture_float_linear_filtering,
            PixelType::HalfFloat => self.caps.texture_half_float_linear_filtering,
            _ => true,
        };
        if filterable || options.sampling_mode == SamplingMode::Nearest {
            options.sampling_mode
        } else {
            engine_warn!(
                SOURCE,
                "{:?} textures are not linear-filterable on this device, \
                 forcing nearest sampling",
                options.pixel_type
            );
            SamplingMode::Nearest
        }
    }

    fn rt_size(&self, dimension: u32) -> u32 {
        let max = self.caps.max_render_texture_size;
        if self.caps.needs_pot_textures {
            required_pot_size(dimension, max, self.options.pot_rounding)
        } else {
            dimension.min(max)
        }
    }

    fn depth_stencil_format(generate_stencil: bool) -> RenderbufferFormat {
        if generate_stencil {
            RenderbufferFormat::Depth24Stencil8
        } else {
            RenderbufferFormat::Depth24
        }
    }

    /// Create a 2D render-target texture
    pub fn create_render_target_texture(
        &mut self,
        width: u32,
        height: u32,
        options: &RenderTargetOptions,
    ) -> Result<TextureId> {
        let width = self.rt_size(width);
        let height = self.rt_size(height);
        let sampling_mode = self.effective_rt_sampling(options);

        let device_texture = self.device.create_texture()?;

        let mut record = TextureRecord::new(TextureSource::RenderTarget);
        record.width = width;
        record.height = height;
        record.format = options.pixel_format;
        record.pixel_type = options.pixel_type;
        record.generate_mipmaps = options.generate_mipmaps;
        record.sampling_mode = sampling_mode;
        record.device_texture = Some(device_texture);
        let id = self.textures.insert(record);

        // Allocate empty color storage
        self.bind_texture_directly(TextureTarget::Texture2D, self.upload_channel(), Some(id));
        self.device.tex_image_2d(
            width,
            height,
            options.pixel_format,
            options.pixel_type,
            None,
        );
        self.commit_sampling(id, TextureTarget::Texture2D)?;

        let previous = self.current_framebuffer;
        let framebuffer = self.device.create_framebuffer()?;
        self.bind_unbound_framebuffer(Some(framebuffer));
        self.device
            .framebuffer_texture_2d(Attachment::Color(0), None, device_texture, 0);

        let mut depth_stencil_buffer = None;
        let mut depth_stencil_storage = None;
        if options.generate_depth_buffer || options.generate_stencil_buffer {
            let format = Self::depth_stencil_format(options.generate_stencil_buffer);
            let attachment = if options.generate_stencil_buffer {
                Attachment::DepthStencil
            } else {
                Attachment::Depth
            };
            let buffer = self.device.create_renderbuffer(width, height, format, 1)?;
            self.device.framebuffer_renderbuffer(attachment, buffer);
            depth_stencil_buffer = Some(buffer);
            depth_stencil_storage = Some(format);
        }

        // Multisample side buffer + side framebuffer for resolve-on-unbind
        let mut msaa_framebuffer = None;
        let mut msaa_color_buffer = None;
        let samples = options.samples.min(self.caps.max_msaa_samples);
        if samples > 1 && self.caps.multisample_render_targets {
            let side_framebuffer = self.device.create_framebuffer()?;
            self.bind_unbound_framebuffer(Some(side_framebuffer));
            let color = self
                .device
                .create_renderbuffer(width, height, RenderbufferFormat::Rgba8, samples)?;
            self.device
                .framebuffer_renderbuffer(Attachment::Color(0), color);
            if options.generate_depth_buffer || options.generate_stencil_buffer {
                let format = Self::depth_stencil_format(options.generate_stencil_buffer);
                let attachment = if options.generate_stencil_buffer {
                    Attachment::DepthStencil
                } else {
                    Attachment::Depth
                };
                let depth = self
                    .device
                    .create_renderbuffer(width, height, format, samples)?;
                self.device.framebuffer_renderbuffer(attachment, depth);
            }
            msaa_framebuffer = Some(side_framebuffer);
            msaa_color_buffer = Some(color);
        }

        self.bind_unbound_framebuffer(previous);

        let record = &mut self.textures[id];
        record.framebuffer = Some(framebuffer);
        record.depth_stencil_buffer = depth_stencil_buffer;
        record.depth_stencil_format = depth_stencil_storage;
        record.msaa_framebuffer = msaa_framebuffer;
        record.msaa_color_buffer = msaa_color_buffer;
        record.samples = if msaa_framebuffer.is_some() { samples } else { 1 };
        record.is_ready = true;
        Ok(id)
    }

    /// Create a cube render-target texture; faces are selected at bind time
    pub fn create_render_target_cube_texture(
        &mut self,
        size: u32,
        options: &RenderTargetOptions,
    ) -> Result<TextureId> {
        let size = {
            let max = self.caps.max_cubemap_texture_size;
            if self.caps.needs_pot_textures {
                required_pot_size(size, max, self.options.pot_rounding)
            } else {
                size.min(max)
            }
        };
        let sampling_mode = self.effective_rt_sampling(options);

        let device_texture = self.device.create_texture()?;

        let mut record = TextureRecord::new(TextureSource::RenderTarget);
        record.width = size;
        record.height = size;
        record.format = options.pixel_format;
        record.pixel_type = options.pixel_type;
        record.generate_mipmaps = options.generate_mipmaps;
        record.sampling_mode = sampling_mode;
        record.is_cube = true;
        record.device_texture = Some(device_texture);
        let id = self.textures.insert(record);

        self.bind_texture_directly(TextureTarget::TextureCube, self.upload_channel(), Some(id));
        for face in CubeFace::ALL {
            self.device.tex_image_cube_face(
                face,
                size,
                options.pixel_format,
                options.pixel_type,
                None,
            );
        }
        self.commit_sampling(id, TextureTarget::TextureCube)?;

        let previous = self.current_framebuffer;
        let framebuffer = self.device.create_framebuffer()?;
        self.bind_unbound_framebuffer(Some(framebuffer));

        let mut depth_stencil_buffer = None;
        let mut depth_stencil_storage = None;
        if options.generate_depth_buffer || options.generate_stencil_buffer {
            let format = Self::depth_stencil_format(options.generate_stencil_buffer);
            let attachment = if options.generate_stencil_buffer {
                Attachment::DepthStencil
            } else {
                Attachment::Depth
            };
            let buffer = self.device.create_renderbuffer(size, size, format, 1)?;
            self.device.framebuffer_renderbuffer(attachment, buffer);
            depth_stencil_buffer = Some(buffer);
            depth_stencil_storage = Some(format);
        }

        self.bind_unbound_framebuffer(previous);

        let record = &mut self.textures[id];
        record.framebuffer = Some(framebuffer);
        record.depth_stencil_buffer = depth_stencil_buffer;
        record.depth_stencil_format = depth_stencil_storage;
        record.is_ready = true;
        Ok(id)
    }

    /// Create `count` color attachments sharing one framebuffer
    ///
    /// The shared framebuffer and depth storage live on the first returned
    /// texture; releasing it releases them.
    pub fn create_multiple_render_targets(
        &mut self,
        width: u32,
        height: u32,
        count: u32,
        options: &RenderTargetOptions,
    ) -> Result<Vec<TextureId>> {
        if count == 0 {
            crate::engine_bail!(SOURCE, "create_multiple_render_targets: count must be > 0");
        }
        if count > self.caps.max_draw_buffers {
            crate::engine_bail!(
                SOURCE,
                "create_multiple_render_targets: {} attachments requested, device supports {}",
                count,
                self.caps.max_draw_buffers
            );
        }

        let width = self.rt_size(width);
        let height = self.rt_size(height);
        let sampling_mode = self.effective_rt_sampling(options);

        let previous = self.current_framebuffer;
        let framebuffer = self.device.create_framebuffer()?;
        self.bind_unbound_framebuffer(Some(framebuffer));

        let mut ids = Vec::with_capacity(count as usize);
        for index in 0..count {
            let device_texture = self.device.create_texture()?;

            let mut record = TextureRecord::new(TextureSource::MultiRenderTarget);
            record.width = width;
            record.height = height;
            record.format = options.pixel_format;
            record.pixel_type = options.pixel_type;
            record.generate_mipmaps = options.generate_mipmaps;
            record.sampling_mode = sampling_mode;
            record.device_texture = Some(device_texture);
            let id = self.textures.insert(record);

            self.bind_texture_directly(TextureTarget::Texture2D, self.upload_channel(), Some(id));
            self.device.tex_image_2d(
                width,
                height,
                options.pixel_format,
                options.pixel_type,
                None,
            );
            self.commit_sampling(id, TextureTarget::Texture2D)?;

            // Texture upload binds re-target the framebuffer binding cache
            self.bind_unbound_framebuffer(Some(framebuffer));
            self.device
                .framebuffer_texture_2d(Attachment::Color(index), None, device_texture, 0);
            ids.push(id);
        }

        if options.generate_depth_buffer || options.generate_stencil_buffer {
            let format = Self::depth_stencil_format(options.generate_stencil_buffer);
            let attachment = if options.generate_stencil_buffer {
                Attachment::DepthStencil
            } else {
                Attachment::Depth
            };
            let buffer = self.device.create_renderbuffer(width, height, format, 1)?;
            self.device.framebuffer_renderbuffer(attachment, buffer);
            self.textures[ids[0]].depth_stencil_buffer = Some(buffer);
            self.textures[ids[0]].depth_stencil_format = Some(format);
        }

        self.device.set_draw_buffers(count);
        self.bind_unbound_framebuffer(previous);

        self.textures[ids[0]].framebuffer = Some(framebuffer);
        self.textures[ids[0]].mrt_attachments = ids.clone();
        for &id in &ids {
            self.textures[id].is_ready = true;
        }
        Ok(ids)
    }

    /// Create a depth/stencil texture for sampling in shaders
    ///
    /// Fails gracefully when the device lacks depth-texture support: the
    /// returned handle is never ready and an error is logged.
    pub fn create_depth_stencil_texture(
        &mut self,
        width: u32,
        height: u32,
        options: &DepthStencilOptions,
    ) -> Result<TextureId> {
        if options.is_cube && height != width {
            engine_warn!(
                SOURCE,
                "Cube depth textures are square; using {0}x{0} and ignoring height {1}",
                width,
                height
            );
        }
        let height = if options.is_cube { width } else { height };

        let mut record = TextureRecord::new(TextureSource::DepthStencil);
        record.width = width;
        record.height = height;
        record.format = if options.generate_stencil {
            PixelFormat::DepthStencil
        } else {
            PixelFormat::DepthComponent
        };
        record.pixel_type = PixelType::UnsignedInt;
        record.is_cube = options.is_cube;
        record.sampling_mode = if options.bilinear_filtering {
            SamplingMode::LinearLinear
        } else {
            SamplingMode::NearestNearest
        };
        record.comparison_function = options.comparison_function;

        if !self.caps.depth_texture {
            engine_error!(
                SOURCE,
                "Depth textures are not supported on this device; returning a \
                 non-ready handle"
            );
            return Ok(self.textures.insert(record));
        }

        let device_texture = self.device.create_texture()?;
        record.device_texture = Some(device_texture);
        let (format, pixel_type) = (record.format, record.pixel_type);
        let is_cube = record.is_cube;
        let comparison = record.comparison_function;
        let id = self.textures.insert(record);

        let target = if is_cube {
            TextureTarget::TextureCube
        } else {
            TextureTarget::Texture2D
        };
        self.bind_texture_directly(target, self.upload_channel(), Some(id));
        if is_cube {
            for face in CubeFace::ALL {
                self.device
                    .tex_image_cube_face(face, width, format, pixel_type, None);
            }
        } else {
            self.device.tex_image_2d(width, height, format, pixel_type, None);
        }
        self.commit_sampling(id, target)?;
        self.device.set_texture_comparison(target, comparison);

        self.textures[id].is_ready = true;
        Ok(id)
    }

    // ===== BINDING =====

    /// Route draws to a render target
    ///
    /// `face` selects the cube face for cube targets. `required_width` and
    /// `required_height` override the forced viewport size (the target's own
    /// size otherwise). `depth_stencil` attaches a depth/stencil texture in
    /// place of the target's own depth storage. Binding while another target
    /// is bound unbinds the previous one first.
    pub fn bind_render_target(
        &mut self,
        id: TextureId,
        face: Option<CubeFace>,
        required_width: Option<u32>,
        required_height: Option<u32>,
        force_fullscreen_viewport: bool,
        depth_stencil: Option<TextureId>,
    ) -> Result<()> {
        if let Some(previous) = self.bound_render_target {
            if previous != id {
                self.unbind_render_target(previous, false, None)?;
            }
        }

        let (framebuffer, device_texture, is_cube, width, height) = match self.textures.get(id) {
            Some(record) => (
                // Multisampled targets draw into the side framebuffer
                record.msaa_framebuffer.or(record.framebuffer),
                record.device_texture,
                record.is_cube,
                record.width,
                record.height,
            ),
            None => crate::engine_bail!(SOURCE, "bind_render_target: unknown texture id"),
        };
        let Some(framebuffer) = framebuffer else {
            crate::engine_bail!(SOURCE, "bind_render_target: texture is not a render target");
        };

        self.bind_unbound_framebuffer(Some(framebuffer));

        if is_cube {
            let face = face.unwrap_or(CubeFace::PositiveX);
            if let Some(device_texture) = device_texture {
                self.device
                    .framebuffer_texture_2d(Attachment::Color(0), Some(face), device_texture, 0);
            }
        }

        if let Some(ds) = depth_stencil {
            let (ds_texture, ds_format) = match self.textures.get(ds) {
                Some(record) => (record.device_texture, record.format),
                None => crate::engine_bail!(SOURCE, "bind_render_target: unknown depth texture"),
            };
            let Some(ds_texture) = ds_texture else {
                crate::engine_bail!(SOURCE, "bind_render_target: depth texture has no storage");
            };
            let attachment = if ds_format == PixelFormat::DepthStencil {
                Attachment::DepthStencil
            } else {
                Attachment::Depth
            };
            self.device
                .framebuffer_texture_2d(attachment, None, ds_texture, 0);
        }

        if force_fullscreen_viewport {
            let w = required_width.unwrap_or(width);
            let h = required_height.unwrap_or(height);
            self.device.set_viewport(0, 0, w as i32, h as i32);
            self.cached_viewport = None;
        }

        self.bound_render_target = Some(id);
        Ok(())
    }

    /// Resolve and restore after drawing into a render target
    ///
    /// Multisampled targets are resolved into the color texture via a blit
    /// before the framebuffer is restored; `on_before_unbind` runs while
    /// the target is still bound.
    pub fn unbind_render_target(
        &mut self,
        id: TextureId,
        disable_mipmap_generation: bool,
        on_before_unbind: Option<OnBeforeUnbindFn>,
    ) -> Result<()> {
        let (msaa_framebuffer, framebuffer, width, height, generate_mipmaps, is_cube) =
            match self.textures.get(id) {
                Some(record) => (
                    record.msaa_framebuffer,
                    record.framebuffer,
                    record.width,
                    record.height,
                    record.generate_mipmaps,
                    record.is_cube,
                ),
                None => crate::engine_bail!(SOURCE, "unbind_render_target: unknown texture id"),
            };

        if let (Some(read), Some(draw)) = (msaa_framebuffer, framebuffer) {
            self.device.blit_framebuffer(read, draw, width, height);
        }

        if let Some(callback) = on_before_unbind {
            callback(self);
        }

        if generate_mipmaps && !disable_mipmap_generation {
            let target = if is_cube {
                TextureTarget::TextureCube
            } else {
                TextureTarget::Texture2D
            };
            self.bind_texture_directly(target, self.upload_channel(), Some(id));
            self.device.generate_mipmaps(target);
        }

        self.bind_unbound_framebuffer(None);
        self.bound_render_target = None;
        Ok(())
    }

    /// Bind a raw framebuffer object, bypassing render-target bookkeeping
    pub fn bind_raw_framebuffer(&mut self, framebuffer: Option<DeviceFramebuffer>) {
        self.bind_unbound_framebuffer(framebuffer);
    }

    /// Restore the default surface and clear render-target state
    pub fn restore_default_framebuffer(&mut self) {
        self.bind_unbound_framebuffer(None);
        self.bound_render_target = None;
        self.set_viewport(Viewport::full());
    }

    /// Currently bound render target, if any
    pub fn current_render_target(&self) -> Option<TextureId> {
        self.bound_render_target
    }

    /// Cached framebuffer bind
    pub(crate) fn bind_unbound_framebuffer(&mut self, framebuffer: Option<DeviceFramebuffer>) {
        if self.current_framebuffer != framebuffer {
            self.device.bind_framebuffer(framebuffer);
            self.current_framebuffer = framebuffer;
        }
    }
}
