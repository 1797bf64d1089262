/// Texture manager operations: raw uploads, dynamic textures, in-place
/// updates, read-back and release
///
/// URL-driven creation lives in `loading.rs`; render targets in
/// `render_targets.rs`. Everything here is synchronous.

use crate::device::{
    Attachment, ComparisonFunction, CubeFace, PixelFormat, PixelType, SamplingMode, TextureTarget,
};
use crate::engine::Engine;
use crate::engine_trace;
use crate::error::Result;
use crate::resource::{
    sampling_parameters, RetainedPixels, TextureId, TextureRecord, TextureSource,
};
use crate::utils::required_pot_size;

const SOURCE: &str = "stellar3d::TextureManager";

impl Engine {
    // ===== RAW 2D =====

    /// Upload caller-decoded 2D pixels synchronously
    ///
    /// Retains a CPU copy of `data` for device-loss rebuild unless the
    /// engine was configured with `do_not_handle_context_lost`.
    pub fn create_raw_texture(
        &mut self,
        data: &[u8],
        width: u32,
        height: u32,
        format: PixelFormat,
        pixel_type: PixelType,
        generate_mipmaps: bool,
        invert_y: bool,
        sampling_mode: SamplingMode,
    ) -> Result<TextureId> {
        let device_texture = self.device.create_texture()?;

        let mut record = TextureRecord::new(TextureSource::Raw);
        record.width = width;
        record.height = height;
        record.format = format;
        record.pixel_type = pixel_type;
        record.generate_mipmaps = generate_mipmaps;
        record.invert_y = invert_y;
        record.sampling_mode = sampling_mode;
        record.device_texture = Some(device_texture);
        if !self.options.do_not_handle_context_lost {
            record.retained = RetainedPixels::Pixels(data.to_vec());
        }
        let id = self.textures.insert(record);

        self.upload_2d(id, data, width, height, format, pixel_type, invert_y)?;
        self.commit_sampling(id, TextureTarget::Texture2D)?;
        if generate_mipmaps {
            self.device.generate_mipmaps(TextureTarget::Texture2D);
        }
        self.textures[id].is_ready = true;

        engine_trace!(SOURCE, "Created raw texture {}x{}", width, height);
        Ok(id)
    }

    /// Replace the contents of a raw or dynamic 2D texture
    pub fn update_raw_texture(
        &mut self,
        id: TextureId,
        data: &[u8],
        format: PixelFormat,
        pixel_type: PixelType,
        invert_y: bool,
    ) -> Result<()> {
        let (width, height, generate_mipmaps) = match self.textures.get(id) {
            Some(record) if !record.is_cube && !record.is_3d => {
                (record.width, record.height, record.generate_mipmaps)
            }
            Some(_) => crate::engine_bail!(SOURCE, "update_raw_texture: not a 2D texture"),
            None => crate::engine_bail!(SOURCE, "update_raw_texture: unknown texture id"),
        };

        self.upload_2d(id, data, width, height, format, pixel_type, invert_y)?;
        if generate_mipmaps {
            self.device.generate_mipmaps(TextureTarget::Texture2D);
        }

        if let Some(record) = self.textures.get_mut(id) {
            record.format = format;
            record.pixel_type = pixel_type;
            record.invert_y = invert_y;
            record.is_ready = true;
            if !self.options.do_not_handle_context_lost {
                record.retained = RetainedPixels::Pixels(data.to_vec());
            }
        }
        Ok(())
    }

    // ===== RAW 3D =====

    /// Upload caller-decoded 3D pixels synchronously
    ///
    /// # Errors
    ///
    /// Fails when the device lacks 3D texture support.
    pub fn create_raw_texture_3d(
        &mut self,
        data: &[u8],
        width: u32,
        height: u32,
        depth: u32,
        format: PixelFormat,
        pixel_type: PixelType,
        generate_mipmaps: bool,
        sampling_mode: SamplingMode,
    ) -> Result<TextureId> {
        if !self.caps.texture_3d {
            crate::engine_bail!(SOURCE, "create_raw_texture_3d: device lacks 3D textures");
        }

        let device_texture = self.device.create_texture()?;

        let mut record = TextureRecord::new(TextureSource::Raw3D);
        record.width = width;
        record.height = height;
        record.depth = depth;
        record.format = format;
        record.pixel_type = pixel_type;
        record.generate_mipmaps = generate_mipmaps;
        record.sampling_mode = sampling_mode;
        record.is_3d = true;
        record.device_texture = Some(device_texture);
        if !self.options.do_not_handle_context_lost {
            record.retained = RetainedPixels::Pixels(data.to_vec());
        }
        let id = self.textures.insert(record);

        self.bind_texture_directly(TextureTarget::Texture3D, self.upload_channel(), Some(id));
        self.device
            .tex_image_3d(width, height, depth, format, pixel_type, Some(data));
        self.commit_sampling(id, TextureTarget::Texture3D)?;
        if generate_mipmaps {
            self.device.generate_mipmaps(TextureTarget::Texture3D);
        }
        self.textures[id].is_ready = true;
        Ok(id)
    }

    // ===== RAW CUBE =====

    /// Upload six caller-decoded faces synchronously
    ///
    /// `faces` holds exactly six equally sized face images in upload order.
    pub fn create_raw_cube_texture(
        &mut self,
        faces: &[Vec<u8>],
        size: u32,
        format: PixelFormat,
        pixel_type: PixelType,
        generate_mipmaps: bool,
        invert_y: bool,
        sampling_mode: SamplingMode,
    ) -> Result<TextureId> {
        if faces.len() != 6 {
            crate::engine_bail!(
                SOURCE,
                "create_raw_cube_texture: expected 6 faces, got {}",
                faces.len()
            );
        }

        let device_texture = self.device.create_texture()?;

        let mut record = TextureRecord::new(TextureSource::RawCube);
        record.width = size;
        record.height = size;
        record.format = format;
        record.pixel_type = pixel_type;
        record.generate_mipmaps = generate_mipmaps;
        record.invert_y = invert_y;
        record.sampling_mode = sampling_mode;
        record.is_cube = true;
        record.device_texture = Some(device_texture);
        if !self.options.do_not_handle_context_lost {
            record.retained = RetainedPixels::CubeFaces(faces.to_vec());
        }
        let id = self.textures.insert(record);

        self.bind_texture_directly(TextureTarget::TextureCube, self.upload_channel(), Some(id));
        self.set_unpack_flip_y(invert_y);
        for (index, face) in CubeFace::ALL.iter().enumerate() {
            self.device
                .tex_image_cube_face(*face, size, format, pixel_type, Some(&faces[index]));
        }
        self.commit_sampling(id, TextureTarget::TextureCube)?;
        if generate_mipmaps {
            self.device.generate_mipmaps(TextureTarget::TextureCube);
        }
        self.textures[id].is_ready = true;
        Ok(id)
    }

    // ===== DYNAMIC =====

    /// Allocate engine-writable 2D storage, sized through POT remediation
    ///
    /// The texture is not ready until the first `update_dynamic_texture`.
    pub fn create_dynamic_texture(
        &mut self,
        width: u32,
        height: u32,
        generate_mipmaps: bool,
        sampling_mode: SamplingMode,
    ) -> Result<TextureId> {
        let (width, height) = if self.caps.needs_pot_textures {
            (
                required_pot_size(width, self.caps.max_texture_size, self.options.pot_rounding),
                required_pot_size(height, self.caps.max_texture_size, self.options.pot_rounding),
            )
        } else {
            (width, height)
        };

        let device_texture = self.device.create_texture()?;

        let mut record = TextureRecord::new(TextureSource::Dynamic);
        record.width = width;
        record.height = height;
        record.generate_mipmaps = generate_mipmaps;
        record.sampling_mode = sampling_mode;
        record.device_texture = Some(device_texture);
        let id = self.textures.insert(record);

        self.bind_texture_directly(TextureTarget::Texture2D, self.upload_channel(), Some(id));
        self.device.tex_image_2d(
            width,
            height,
            PixelFormat::Rgba,
            PixelType::UnsignedByte,
            None,
        );
        self.commit_sampling(id, TextureTarget::Texture2D)?;
        Ok(id)
    }

    /// Write fresh pixels into a dynamic texture and mark it ready
    pub fn update_dynamic_texture(
        &mut self,
        id: TextureId,
        data: &[u8],
        invert_y: bool,
    ) -> Result<()> {
        match self.textures.get(id) {
            Some(record) if record.source == TextureSource::Dynamic => {}
            Some(_) => crate::engine_bail!(SOURCE, "update_dynamic_texture: not a dynamic texture"),
            None => crate::engine_bail!(SOURCE, "update_dynamic_texture: unknown texture id"),
        }
        let (width, height, format, pixel_type, generate_mipmaps) = {
            let record = &self.textures[id];
            (
                record.width,
                record.height,
                record.format,
                record.pixel_type,
                record.generate_mipmaps,
            )
        };

        self.upload_2d(id, data, width, height, format, pixel_type, invert_y)?;
        if generate_mipmaps {
            self.device.generate_mipmaps(TextureTarget::Texture2D);
        }
        if let Some(record) = self.textures.get_mut(id) {
            record.is_ready = true;
            if !self.options.do_not_handle_context_lost {
                record.retained = RetainedPixels::Pixels(data.to_vec());
            }
        }
        Ok(())
    }

    // ===== IN-PLACE UPDATES =====

    /// Change a texture's sampling mode
    pub fn update_texture_sampling_mode(
        &mut self,
        id: TextureId,
        sampling_mode: SamplingMode,
    ) -> Result<()> {
        let target = match self.textures.get_mut(id) {
            Some(record) => {
                record.sampling_mode = sampling_mode;
                Self::target_of(record)
            }
            None => crate::engine_bail!(SOURCE, "update_texture_sampling_mode: unknown texture id"),
        };
        self.commit_sampling_on_target(id, target)
    }

    /// Set or clear a depth texture's comparison function
    pub fn update_texture_comparison_function(
        &mut self,
        id: TextureId,
        func: Option<ComparisonFunction>,
    ) -> Result<()> {
        let target = match self.textures.get_mut(id) {
            Some(record) => {
                record.comparison_function = func;
                Self::target_of(record)
            }
            None => {
                crate::engine_bail!(SOURCE, "update_texture_comparison_function: unknown texture id")
            }
        };
        self.bind_texture_directly(target, self.upload_channel(), Some(id));
        self.device.set_texture_comparison(target, func);
        Ok(())
    }

    /// Regenerate a texture's mip chain
    pub fn generate_texture_mipmaps(&mut self, id: TextureId) -> Result<()> {
        let target = match self.textures.get(id) {
            Some(record) => Self::target_of(record),
            None => crate::engine_bail!(SOURCE, "generate_texture_mipmaps: unknown texture id"),
        };
        self.bind_texture_directly(target, self.upload_channel(), Some(id));
        self.device.generate_mipmaps(target);
        Ok(())
    }

    // ===== READ-BACK =====

    /// Synchronous RGBA8 read-back from the currently bound surface
    pub fn read_pixels(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<Vec<u8>> {
        self.device.read_pixels(x, y, width, height)
    }

    /// Read a texture's level-0 contents back through a scratch framebuffer
    ///
    /// The previous framebuffer binding is restored before returning.
    pub fn read_texture_pixels(&mut self, id: TextureId) -> Result<Vec<u8>> {
        let (device_texture, width, height) = match self.textures.get(id) {
            Some(record) => (record.device_texture, record.width, record.height),
            None => crate::engine_bail!(SOURCE, "read_texture_pixels: unknown texture id"),
        };
        let Some(device_texture) = device_texture else {
            crate::engine_bail!(SOURCE, "read_texture_pixels: texture has no storage");
        };

        let previous = self.current_framebuffer;
        let scratch = self.device.create_framebuffer()?;
        self.bind_unbound_framebuffer(Some(scratch));
        self.device
            .framebuffer_texture_2d(Attachment::Color(0), None, device_texture, 0);
        let pixels = self.device.read_pixels(0, 0, width, height);
        self.bind_unbound_framebuffer(previous);
        self.device.delete_framebuffer(scratch);
        pixels
    }

    // ===== RELEASE =====

    /// Release a texture: detaches framebuffer sub-resources, frees the
    /// device texture, unlinks it from the binding chain, and invalidates
    /// the id. Safe to call with an already-released id.
    pub fn release_texture(&mut self, id: TextureId) {
        let Some(record) = self.textures.get(id) else {
            return;
        };
        if record.is_chain_sentinel {
            return;
        }

        self.unlink_from_chain(id);

        let record = self.textures.remove(id).expect("record checked above");

        if let Some(framebuffer) = record.framebuffer {
            if self.current_framebuffer == Some(framebuffer) {
                self.restore_default_framebuffer();
            }
            self.device.delete_framebuffer(framebuffer);
        }
        if let Some(buffer) = record.depth_stencil_buffer {
            self.device.delete_renderbuffer(buffer);
        }
        if let Some(framebuffer) = record.msaa_framebuffer {
            self.device.delete_framebuffer(framebuffer);
        }
        if let Some(buffer) = record.msaa_color_buffer {
            self.device.delete_renderbuffer(buffer);
        }
        if let Some(device_texture) = record.device_texture {
            self.device.delete_texture(device_texture);
        }

        for slot in self.bound_textures.iter_mut() {
            if *slot == Some(id) {
                *slot = None;
            }
        }
        if self.bound_render_target == Some(id) {
            self.bound_render_target = None;
        }
        if self.empty_texture == Some(id) {
            self.empty_texture = None;
        }
        if self.empty_cube_texture == Some(id) {
            self.empty_cube_texture = None;
        }
        if self.empty_texture_3d == Some(id) {
            self.empty_texture_3d = None;
        }
    }

    // ===== FALLBACK TEXTURES =====

    /// Lazily created 1x1 black 2D texture bound in place of not-ready ones
    pub fn empty_texture(&mut self) -> Result<TextureId> {
        if let Some(id) = self.empty_texture {
            return Ok(id);
        }
        let id = self.create_raw_texture(
            &[0, 0, 0, 255],
            1,
            1,
            PixelFormat::Rgba,
            PixelType::UnsignedByte,
            false,
            false,
            SamplingMode::Nearest,
        )?;
        self.empty_texture = Some(id);
        Ok(id)
    }

    /// Lazily created 1x1 black cube texture
    pub fn empty_cube_texture(&mut self) -> Result<TextureId> {
        if let Some(id) = self.empty_cube_texture {
            return Ok(id);
        }
        let face = vec![0, 0, 0, 255];
        let faces: Vec<Vec<u8>> = (0..6).map(|_| face.clone()).collect();
        let id = self.create_raw_cube_texture(
            &faces,
            1,
            PixelFormat::Rgba,
            PixelType::UnsignedByte,
            false,
            false,
            SamplingMode::Nearest,
        )?;
        self.empty_cube_texture = Some(id);
        Ok(id)
    }

    /// Lazily created 1x1x1 black 3D texture
    pub fn empty_texture_3d(&mut self) -> Result<TextureId> {
        if let Some(id) = self.empty_texture_3d {
            return Ok(id);
        }
        let id = self.create_raw_texture_3d(
            &[0, 0, 0, 255],
            1,
            1,
            1,
            PixelFormat::Rgba,
            PixelType::UnsignedByte,
            false,
            SamplingMode::Nearest,
        )?;
        self.empty_texture_3d = Some(id);
        Ok(id)
    }

    // ===== QUERIES =====

    /// Whether a texture is populated and usable
    pub fn texture_is_ready(&self, id: TextureId) -> bool {
        self.textures.get(id).map(|r| r.is_ready).unwrap_or(false)
    }

    /// Size of a texture, `None` for released ids
    pub fn texture_size(&self, id: TextureId) -> Option<(u32, u32)> {
        self.textures.get(id).map(|r| (r.width, r.height))
    }

    /// Live texture count, sentinels excluded
    pub fn texture_count(&self) -> usize {
        self.textures
            .iter()
            .filter(|(_, r)| !r.is_chain_sentinel)
            .count()
    }

    // ===== INTERNAL =====

    /// Channel used for upload binds (the last one, away from material slots)
    pub(crate) fn upload_channel(&self) -> u32 {
        self.caps.max_combined_texture_image_units - 1
    }

    pub(crate) fn target_of(record: &TextureRecord) -> TextureTarget {
        if record.is_cube {
            TextureTarget::TextureCube
        } else if record.is_3d {
            TextureTarget::Texture3D
        } else {
            TextureTarget::Texture2D
        }
    }

    /// Bind on the upload channel and push 2D pixel data
    fn upload_2d(
        &mut self,
        id: TextureId,
        data: &[u8],
        width: u32,
        height: u32,
        format: PixelFormat,
        pixel_type: PixelType,
        invert_y: bool,
    ) -> Result<()> {
        let expected = (width as usize)
            * (height as usize)
            * format.component_count()
            * pixel_type.component_size();
        if data.len() < expected {
            crate::engine_bail!(
                SOURCE,
                "texture upload: {} bytes supplied, {} required for {}x{} {:?}/{:?}",
                data.len(),
                expected,
                width,
                height,
                format,
                pixel_type
            );
        }

        self.bind_texture_directly(TextureTarget::Texture2D, self.upload_channel(), Some(id));
        self.set_unpack_flip_y(invert_y);
        self.device
            .tex_image_2d(width, height, format, pixel_type, Some(data));
        Ok(())
    }

    /// Commit a record's sampling mode to the device on `target`
    pub(crate) fn commit_sampling(&mut self, id: TextureId, target: TextureTarget) -> Result<()> {
        self.bind_texture_directly(target, self.upload_channel(), Some(id));
        self.commit_sampling_on_target(id, target)
    }

    fn commit_sampling_on_target(&mut self, id: TextureId, target: TextureTarget) -> Result<()> {
        let (mode, mips) = match self.textures.get(id) {
            Some(record) => (record.sampling_mode, record.generate_mipmaps),
            None => crate::engine_bail!(SOURCE, "commit_sampling: unknown texture id"),
        };
        self.bind_texture_directly(target, self.upload_channel(), Some(id));
        let params = sampling_parameters(mode, mips);
        self.device.set_texture_filtering(target, params.mag, params.min);
        Ok(())
    }
}
