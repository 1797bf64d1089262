/// URL-driven texture loading
///
/// `create_texture` returns a non-ready handle immediately and queues a
/// pending load; the queue is pumped from the frame loop. Decoding is
/// dispatched by extension against the registered loader descriptors, with
/// the generic raster decoder as the fallback path. Each pending load keeps
/// an explicit completion slot so a load is always either pending, resolved,
/// or cancelled; releasing the texture cancels the load on the next pump.
///
/// On decode failure the load is retried once against the loader's fallback
/// URL (or the engine-wide fallback texture), then reported through
/// `on_error` and left non-ready. Load failures never panic and never fail
/// the pump.

use crate::device::{PixelFormat, PixelType, SamplingMode, TextureTarget};
use crate::engine::Engine;
use crate::error::Result;
use crate::resource::{
    resize_rgba_nearest, DecodedCube, DecodedImage, LoadResult, RasterDecoder, RetainedPixels,
    TextureId, TextureLoaderDescriptor, TextureRecord, TextureSource,
};
use crate::utils::{is_pot, required_pot_size};
use crate::{engine_error, engine_trace, engine_warn};

const SOURCE: &str = "stellar3d::TextureLoading";

// ============================================================================
// Pending loads
// ============================================================================

/// Load completion callback
pub type OnLoadFn = Box<dyn FnOnce(TextureId)>;

/// Load failure callback; receives the final error after fallbacks
pub type OnLoadErrorFn = Box<dyn FnOnce(TextureId, String)>;

/// Externally observable state of a URL-driven load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingLoadState {
    /// Queued, not yet resolved by a pump
    Pending,
    /// First attempt failed; queued against a fallback URL
    Retrying,
    /// Decoded and uploaded; the texture is ready
    Completed,
    /// All attempts failed; the texture stays non-ready
    Failed,
    /// The texture was released before the load resolved
    Cancelled,
}

enum DecodedPayload {
    Image(DecodedImage),
    Cube(DecodedCube),
}

/// One queued load with its explicit completion slot
pub struct PendingLoad {
    texture: TextureId,
    url: String,
    is_cube: bool,
    no_mipmap: bool,
    invert_y: bool,
    completion: Option<LoadResult<DecodedPayload>>,
    attempted_fallback: bool,
    on_load: Option<OnLoadFn>,
    on_error: Option<OnLoadErrorFn>,
}

// ============================================================================
// Implementation
// ============================================================================

impl Engine {
    // ===== CREATION =====

    /// Create a texture from a URL; returns a usable non-ready handle
    ///
    /// Binding the handle before the load resolves substitutes the empty
    /// fallback texture. Releasing the handle cancels the load.
    pub fn create_texture(
        &mut self,
        url: &str,
        no_mipmap: bool,
        invert_y: bool,
        sampling_mode: SamplingMode,
        on_load: Option<OnLoadFn>,
        on_error: Option<OnLoadErrorFn>,
    ) -> TextureId {
        let mut record = TextureRecord::new(TextureSource::Url(url.to_string()));
        record.generate_mipmaps = !no_mipmap;
        record.invert_y = invert_y;
        record.sampling_mode = sampling_mode;
        let id = self.textures.insert(record);

        self.pending_loads.push(PendingLoad {
            texture: id,
            url: url.to_string(),
            is_cube: false,
            no_mipmap,
            invert_y,
            completion: None,
            attempted_fallback: false,
            on_load,
            on_error,
        });

        engine_trace!(SOURCE, "Queued texture load '{}'", url);
        id
    }

    /// Create a cube texture from a URL
    pub fn create_cube_texture(
        &mut self,
        url: &str,
        no_mipmap: bool,
        sampling_mode: SamplingMode,
        on_load: Option<OnLoadFn>,
        on_error: Option<OnLoadErrorFn>,
    ) -> TextureId {
        let mut record = TextureRecord::new(TextureSource::Url(url.to_string()));
        record.generate_mipmaps = !no_mipmap;
        record.sampling_mode = sampling_mode;
        record.is_cube = true;
        let id = self.textures.insert(record);

        self.pending_loads.push(PendingLoad {
            texture: id,
            url: url.to_string(),
            is_cube: true,
            no_mipmap,
            invert_y: false,
            completion: None,
            attempted_fallback: false,
            on_load,
            on_error,
        });

        engine_trace!(SOURCE, "Queued cube texture load '{}'", url);
        id
    }

    // ===== CONFIGURATION =====

    /// Register a container-format loader; earlier registrations win
    pub fn register_texture_loader(&mut self, loader: TextureLoaderDescriptor) {
        self.loaders.register(loader);
    }

    /// Replace the generic raster decode path
    pub fn set_raster_decoder(&mut self, decoder: Box<dyn RasterDecoder>) {
        self.raster_decoder = decoder;
    }

    // ===== QUERIES =====

    /// State of a URL-driven load, `None` for non-URL or released handles
    pub fn pending_load_state(&self, id: TextureId) -> Option<PendingLoadState> {
        for load in &self.pending_loads {
            if load.texture == id {
                return Some(if load.attempted_fallback {
                    PendingLoadState::Retrying
                } else {
                    PendingLoadState::Pending
                });
            }
        }
        match self.textures.get(id) {
            Some(record) => match record.source {
                TextureSource::Url(_) if record.is_ready => Some(PendingLoadState::Completed),
                TextureSource::Url(_) => Some(PendingLoadState::Failed),
                _ => None,
            },
            None => None,
        }
    }

    /// Number of queued loads
    pub fn pending_load_count(&self) -> usize {
        self.pending_loads.len()
    }

    // ===== PUMP =====

    /// Resolve and apply queued loads; called once per frame
    ///
    /// Two phases: first every queued load is resolved into its completion
    /// slot (cancelled loads are dropped), then resolved payloads are
    /// uploaded and callbacks fire. A failed first attempt re-queues against
    /// the fallback URL and resolves on the next pump.
    pub fn pump_pending_loads(&mut self) {
        if self.pending_loads.is_empty() {
            return;
        }
        let mut loads = std::mem::take(&mut self.pending_loads);

        for load in loads.iter_mut() {
            if load.completion.is_none() {
                load.completion = Some(self.resolve_load(load));
            }
        }

        for mut load in loads {
            // Released before the pump: cancelled, callbacks dropped
            if self.textures.get(load.texture).is_none() {
                engine_trace!(SOURCE, "Load of '{}' cancelled", load.url);
                continue;
            }

            match load.completion.take() {
                Some(Ok(payload)) => {
                    let applied = match payload {
                        DecodedPayload::Image(image) => self.apply_image_load(&load, image),
                        DecodedPayload::Cube(cube) => self.apply_cube_load(&load, cube),
                    };
                    match applied {
                        Ok(()) => {
                            if let Some(callback) = load.on_load.take() {
                                callback(load.texture);
                            }
                        }
                        Err(error) => self.fail_load(load, error.to_string()),
                    }
                }
                Some(Err(error)) => {
                    if let Some(fallback) = self.fallback_url_for(&load) {
                        engine_warn!(
                            SOURCE,
                            "Load of '{}' failed ({}), retrying with '{}'",
                            load.url,
                            error,
                            fallback
                        );
                        load.url = fallback;
                        load.attempted_fallback = true;
                        self.pending_loads.push(load);
                    } else {
                        self.fail_load(load, error);
                    }
                }
                None => unreachable!("completion slot filled in the resolve phase"),
            }
        }
    }

    // ===== INTERNAL =====

    fn resolve_load(&self, load: &PendingLoad) -> LoadResult<DecodedPayload> {
        if let Some(loader) = self.loaders.find(&load.url) {
            let url = match loader.rewrite_url {
                Some(rewrite) => rewrite(&load.url),
                None => load.url.clone(),
            };
            if load.is_cube {
                if let Some(decode) = &loader.decode_cube {
                    return decode(&url).map(DecodedPayload::Cube);
                }
            } else if let Some(decode) = &loader.decode_2d {
                return decode(&url).map(DecodedPayload::Image);
            }
            // Loader matched but lacks the needed shape; fall through
        }
        if load.is_cube {
            self.raster_decoder
                .decode_cube(&load.url)
                .map(DecodedPayload::Cube)
        } else {
            self.raster_decoder
                .decode_2d(&load.url)
                .map(DecodedPayload::Image)
        }
    }

    /// Fallback chain: matched loader's fallback URL, then the engine-wide
    /// fallback texture; at most one retry per load
    fn fallback_url_for(&self, load: &PendingLoad) -> Option<String> {
        if load.attempted_fallback {
            return None;
        }
        if let Some(loader) = self.loaders.find(&load.url) {
            if let Some(fallback) = loader.fallback_url {
                return Some(fallback(&load.url));
            }
        }
        self.options.fallback_texture_url.clone()
    }

    fn fail_load(&mut self, mut load: PendingLoad, error: String) {
        engine_error!(SOURCE, "Load of '{}' failed: {}", load.url, error);
        if let Some(callback) = load.on_error.take() {
            callback(load.texture, error);
        }
    }

    /// Upload a decoded 2D image, remediating size on the way
    ///
    /// Three paths: direct upload when the size is acceptable as-is; a GPU
    /// rescale through a temporary texture when the image exceeds the
    /// device maximum; a CPU nearest resample when only power-of-two
    /// remediation is needed.
    fn apply_image_load(&mut self, load: &PendingLoad, image: DecodedImage) -> Result<()> {
        let max = self.caps.max_texture_size;
        let pot_ok = !self.caps.needs_pot_textures
            || (is_pot(image.width) && is_pot(image.height));

        if image.width <= max && image.height <= max && pot_ok {
            return self.finish_image_upload(load, image);
        }

        let target_width = if self.caps.needs_pot_textures {
            required_pot_size(image.width, max, self.options.pot_rounding)
        } else {
            image.width.min(max)
        };
        let target_height = if self.caps.needs_pot_textures {
            required_pot_size(image.height, max, self.options.pot_rounding)
        } else {
            image.height.min(max)
        };

        if image.width > max || image.height > max {
            return self.rescale_image_upload(load, image, target_width, target_height);
        }

        engine_trace!(
            SOURCE,
            "Resampling '{}' from {}x{} to {}x{}",
            load.url,
            image.width,
            image.height,
            target_width,
            target_height
        );
        let pixels = resize_rgba_nearest(
            &image.pixels,
            image.width,
            image.height,
            target_width,
            target_height,
        );
        self.finish_image_upload(
            load,
            DecodedImage {
                width: target_width,
                height: target_height,
                pixels,
            },
        )
    }

    /// Direct upload of a size-acceptable image into the load's record
    fn finish_image_upload(&mut self, load: &PendingLoad, image: DecodedImage) -> Result<()> {
        let id = load.texture;
        let device_texture = self.device.create_texture()?;
        {
            let record = &mut self.textures[id];
            record.width = image.width;
            record.height = image.height;
            record.format = PixelFormat::Rgba;
            record.pixel_type = PixelType::UnsignedByte;
            record.device_texture = Some(device_texture);
        }

        self.bind_texture_directly(TextureTarget::Texture2D, self.upload_channel(), Some(id));
        self.set_unpack_flip_y(load.invert_y);
        self.device.tex_image_2d(
            image.width,
            image.height,
            PixelFormat::Rgba,
            PixelType::UnsignedByte,
            Some(&image.pixels),
        );
        self.commit_sampling(id, TextureTarget::Texture2D)?;
        if !load.no_mipmap {
            self.device.generate_mipmaps(TextureTarget::Texture2D);
        }

        let record = &mut self.textures[id];
        record.is_ready = true;
        if !self.options.do_not_handle_context_lost {
            record.retained = RetainedPixels::Pixels(image.pixels);
        }
        engine_trace!(
            SOURCE,
            "Loaded '{}' ({}x{})",
            load.url,
            image.width,
            image.height
        );
        Ok(())
    }

    /// Oversized image: upload to a temporary texture and rescale on the GPU
    fn rescale_image_upload(
        &mut self,
        load: &PendingLoad,
        image: DecodedImage,
        target_width: u32,
        target_height: u32,
    ) -> Result<()> {
        engine_warn!(
            SOURCE,
            "'{}' is {}x{}, above the device maximum; rescaling to {}x{}",
            load.url,
            image.width,
            image.height,
            target_width,
            target_height
        );

        let temp_device = self.device.create_texture()?;
        let mut temp_record = TextureRecord::new(TextureSource::Temporary);
        temp_record.width = image.width;
        temp_record.height = image.height;
        temp_record.device_texture = Some(temp_device);
        let temp = self.textures.insert(temp_record);

        self.bind_texture_directly(TextureTarget::Texture2D, self.upload_channel(), Some(temp));
        self.set_unpack_flip_y(load.invert_y);
        self.device.tex_image_2d(
            image.width,
            image.height,
            PixelFormat::Rgba,
            PixelType::UnsignedByte,
            Some(&image.pixels),
        );

        let id = load.texture;
        let device_texture = self.device.create_texture()?;
        {
            let record = &mut self.textures[id];
            record.width = target_width;
            record.height = target_height;
            record.format = PixelFormat::Rgba;
            record.pixel_type = PixelType::UnsignedByte;
            record.device_texture = Some(device_texture);
        }
        self.bind_texture_directly(TextureTarget::Texture2D, self.upload_channel(), Some(id));
        self.device.tex_image_2d(
            target_width,
            target_height,
            PixelFormat::Rgba,
            PixelType::UnsignedByte,
            None,
        );

        let result = self
            .device
            .rescale_texture(temp_device, device_texture, target_width, target_height);
        self.release_texture(temp);
        result?;

        self.commit_sampling(id, TextureTarget::Texture2D)?;
        if !load.no_mipmap {
            self.bind_texture_directly(TextureTarget::Texture2D, self.upload_channel(), Some(id));
            self.device.generate_mipmaps(TextureTarget::Texture2D);
        }

        let record = &mut self.textures[id];
        record.is_ready = true;
        if !self.options.do_not_handle_context_lost {
            // Retain a CPU resample so device-loss rebuild needs no GPU pass
            record.retained = RetainedPixels::Pixels(resize_rgba_nearest(
                &image.pixels,
                image.width,
                image.height,
                target_width,
                target_height,
            ));
        }
        Ok(())
    }

    /// Upload a decoded cube, resampling faces for size remediation
    fn apply_cube_load(&mut self, load: &PendingLoad, cube: DecodedCube) -> Result<()> {
        if cube.faces.len() != 6 {
            crate::engine_bail!(
                SOURCE,
                "cube load '{}': expected 6 faces, got {}",
                load.url,
                cube.faces.len()
            );
        }

        let max = self.caps.max_cubemap_texture_size;
        let mut size = cube.size;
        let mut faces = cube.faces;
        let pot_ok = !self.caps.needs_pot_textures || is_pot(size);
        if size > max || !pot_ok {
            let target = if self.caps.needs_pot_textures {
                required_pot_size(size, max, self.options.pot_rounding)
            } else {
                size.min(max)
            };
            engine_trace!(
                SOURCE,
                "Resampling cube '{}' faces from {} to {}",
                load.url,
                size,
                target
            );
            faces = faces
                .iter()
                .map(|face| resize_rgba_nearest(face, size, size, target, target))
                .collect();
            size = target;
        }

        let id = load.texture;
        let device_texture = self.device.create_texture()?;
        {
            let record = &mut self.textures[id];
            record.width = size;
            record.height = size;
            record.format = PixelFormat::Rgba;
            record.pixel_type = PixelType::UnsignedByte;
            record.device_texture = Some(device_texture);
        }

        self.bind_texture_directly(TextureTarget::TextureCube, self.upload_channel(), Some(id));
        self.set_unpack_flip_y(load.invert_y);
        for (index, face) in crate::device::CubeFace::ALL.iter().enumerate() {
            self.device.tex_image_cube_face(
                *face,
                size,
                PixelFormat::Rgba,
                PixelType::UnsignedByte,
                Some(&faces[index]),
            );
        }
        self.commit_sampling(id, TextureTarget::TextureCube)?;
        if !load.no_mipmap {
            self.device.generate_mipmaps(TextureTarget::TextureCube);
        }

        let record = &mut self.textures[id];
        record.is_ready = true;
        if !self.options.do_not_handle_context_lost {
            record.retained = RetainedPixels::CubeFaces(faces);
        }
        engine_trace!(SOURCE, "Loaded cube '{}' ({}x{})", load.url, size, size);
        Ok(())
    }
}
