/// Device-loss recovery
///
/// A lost context invalidates every device object while the engine-side
/// records survive. `rebuild_context` re-probes capabilities, wipes every
/// cache, then recreates buffers, textures and programs from the retained
/// CPU data alone; handles that were ready before the loss come back ready
/// with no external involvement.
///
/// Texture recovery runs in two passes: first every texture object and its
/// storage, then the framebuffers, so multi-render-target sets can re-attach
/// siblings that were rebuilt in the first pass.

use crate::capabilities;
use crate::device::{Attachment, CubeFace, RenderbufferFormat, TextureTarget};
use crate::engine::Engine;
use crate::error::Result;
use crate::resource::{BufferId, ProgramId, RetainedPixels, TextureId, TextureSource};
use crate::{engine_error, engine_info};

const SOURCE: &str = "stellar3d::Rebuild";

impl Engine {
    /// Recreate every device resource after a context loss
    pub fn rebuild_context(&mut self) {
        engine_info!(
            SOURCE,
            "Rebuilding engine '{}': {} textures, {} buffers, {} programs",
            self.options.label,
            self.texture_count(),
            self.buffer_count(),
            self.program_count()
        );

        self.caps = capabilities::probe(self.device.as_ref());
        self.wipe_caches(true);
        self.current_framebuffer = None;
        self.bound_render_target = None;
        self.bound_index_buffer = None;

        self.rebuild_buffers();
        self.rebuild_textures();
        self.rebuild_programs();
        self.apply_states();

        engine_info!(SOURCE, "Rebuild of engine '{}' complete", self.options.label);
    }

    // ===== BUFFERS =====

    fn rebuild_buffers(&mut self) {
        let ids: Vec<BufferId> = self.buffers.keys().collect();
        for id in ids {
            let (target, usage, capacity, retained) = {
                let record = &self.buffers[id];
                (record.target, record.usage, record.capacity, record.retained.clone())
            };

            let device_buffer = match self.device.create_buffer() {
                Ok(buffer) => buffer,
                Err(error) => {
                    engine_error!(SOURCE, "Buffer rebuild failed: {}", error);
                    self.buffers[id].device_buffer = None;
                    continue;
                }
            };
            self.bind_buffer_cached(target, Some(device_buffer));
            match &retained {
                Some(bytes) => self.device.buffer_data(target, bytes, usage),
                // No CPU copy; restore the allocation, contents are lost
                None => self.device.buffer_allocate(target, capacity, usage),
            }
            self.buffers[id].device_buffer = Some(device_buffer);
        }
    }

    // ===== TEXTURES =====

    fn rebuild_textures(&mut self) {
        let ids: Vec<TextureId> = self
            .textures
            .iter()
            .filter(|(_, record)| !record.is_chain_sentinel)
            .map(|(id, _)| id)
            .collect();

        // Old device handles are all stale after a loss
        for &id in &ids {
            let record = &mut self.textures[id];
            record.device_texture = None;
            record.framebuffer = None;
            record.depth_stencil_buffer = None;
            record.msaa_framebuffer = None;
            record.msaa_color_buffer = None;
        }

        for &id in &ids {
            if let Err(error) = self.rebuild_texture_storage(id) {
                engine_error!(SOURCE, "Texture rebuild failed: {}", error);
                self.textures[id].is_ready = false;
            }
        }
        for &id in &ids {
            if let Err(error) = self.rebuild_texture_framebuffer(id) {
                engine_error!(SOURCE, "Framebuffer rebuild failed: {}", error);
                self.textures[id].is_ready = false;
            }
        }
    }

    /// Recreate one texture object and refill its storage from retained data
    fn rebuild_texture_storage(&mut self, id: TextureId) -> Result<()> {
        let (source, width, height, depth, format, pixel_type, invert_y, is_cube, is_3d, mipmaps, comparison, retained) = {
            let record = &self.textures[id];
            (
                record.source.clone(),
                record.width,
                record.height,
                record.depth,
                record.format,
                record.pixel_type,
                record.invert_y,
                record.is_cube,
                record.is_3d,
                record.generate_mipmaps,
                record.comparison_function,
                record.retained.clone(),
            )
        };

        // Scratch textures are never rebuilt
        if source == TextureSource::Temporary {
            self.textures[id].is_ready = false;
            return Ok(());
        }

        let device_texture = self.device.create_texture()?;
        self.textures[id].device_texture = Some(device_texture);

        let target = if is_cube {
            TextureTarget::TextureCube
        } else if is_3d {
            TextureTarget::Texture3D
        } else {
            TextureTarget::Texture2D
        };
        self.bind_texture_directly(target, self.upload_channel(), Some(id));

        let mut populated = false;
        match &retained {
            RetainedPixels::Pixels(pixels) if is_3d => {
                self.device
                    .tex_image_3d(width, height, depth, format, pixel_type, Some(pixels));
                populated = true;
            }
            RetainedPixels::Pixels(pixels) => {
                self.set_unpack_flip_y(invert_y);
                self.device
                    .tex_image_2d(width, height, format, pixel_type, Some(pixels));
                populated = true;
            }
            RetainedPixels::CubeFaces(faces) if faces.len() == 6 => {
                self.set_unpack_flip_y(invert_y);
                for (index, face) in CubeFace::ALL.iter().enumerate() {
                    self.device
                        .tex_image_cube_face(*face, width, format, pixel_type, Some(&faces[index]));
                }
                populated = true;
            }
            _ => {
                // Empty storage (render targets, never-updated dynamics)
                if is_cube {
                    for face in CubeFace::ALL {
                        self.device
                            .tex_image_cube_face(face, width, format, pixel_type, None);
                    }
                } else if is_3d {
                    self.device
                        .tex_image_3d(width, height, depth, format, pixel_type, None);
                } else {
                    self.device.tex_image_2d(width, height, format, pixel_type, None);
                }
            }
        }

        self.commit_sampling(id, target)?;
        if comparison.is_some() {
            self.device.set_texture_comparison(target, comparison);
        }
        if populated && mipmaps {
            self.device.generate_mipmaps(target);
        }

        let record = &mut self.textures[id];
        record.is_ready = populated
            || matches!(
                record.source,
                TextureSource::RenderTarget
                    | TextureSource::MultiRenderTarget
                    | TextureSource::DepthStencil
            );
        Ok(())
    }

    /// Recreate a render target's framebuffer and renderbuffers
    fn rebuild_texture_framebuffer(&mut self, id: TextureId) -> Result<()> {
        let needs_framebuffer = matches!(
            self.textures[id].source,
            TextureSource::RenderTarget | TextureSource::MultiRenderTarget
        );
        // MRT siblings without the shared framebuffer have nothing to rebuild
        if !needs_framebuffer
            || (self.textures[id].source == TextureSource::MultiRenderTarget
                && self.textures[id].mrt_attachments.is_empty())
        {
            return Ok(());
        }

        let (width, height, is_cube, samples, ds_format, attachments) = {
            let record = &self.textures[id];
            (
                record.width,
                record.height,
                record.is_cube,
                record.samples,
                record.depth_stencil_format,
                record.mrt_attachments.clone(),
            )
        };

        let framebuffer = self.device.create_framebuffer()?;
        self.bind_unbound_framebuffer(Some(framebuffer));

        if attachments.is_empty() {
            if let Some(device_texture) = self.textures[id].device_texture {
                let face = if is_cube { Some(CubeFace::PositiveX) } else { None };
                self.device
                    .framebuffer_texture_2d(Attachment::Color(0), face, device_texture, 0);
            }
        } else {
            for (index, &sibling) in attachments.iter().enumerate() {
                if let Some(device_texture) =
                    self.textures.get(sibling).and_then(|r| r.device_texture)
                {
                    self.device.framebuffer_texture_2d(
                        Attachment::Color(index as u32),
                        None,
                        device_texture,
                        0,
                    );
                }
            }
            self.device.set_draw_buffers(attachments.len() as u32);
        }

        if let Some(format) = ds_format {
            let attachment = if format == RenderbufferFormat::Depth24Stencil8 {
                Attachment::DepthStencil
            } else {
                Attachment::Depth
            };
            let buffer = self.device.create_renderbuffer(width, height, format, 1)?;
            self.device.framebuffer_renderbuffer(attachment, buffer);
            self.textures[id].depth_stencil_buffer = Some(buffer);
        }

        let mut msaa_framebuffer = None;
        let mut msaa_color_buffer = None;
        if samples > 1 && self.caps.multisample_render_targets {
            let side_framebuffer = self.device.create_framebuffer()?;
            self.bind_unbound_framebuffer(Some(side_framebuffer));
            let color = self
                .device
                .create_renderbuffer(width, height, RenderbufferFormat::Rgba8, samples)?;
            self.device
                .framebuffer_renderbuffer(Attachment::Color(0), color);
            if let Some(format) = ds_format {
                let attachment = if format == RenderbufferFormat::Depth24Stencil8 {
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

        self.bind_unbound_framebuffer(None);

        let record = &mut self.textures[id];
        record.framebuffer = Some(framebuffer);
        record.msaa_framebuffer = msaa_framebuffer;
        record.msaa_color_buffer = msaa_color_buffer;
        Ok(())
    }

    // ===== PROGRAMS =====

    fn rebuild_programs(&mut self) {
        let ids: Vec<ProgramId> = self.programs.keys().collect();
        for id in ids {
            let (key, vertex_source, fragment_source, defines, attribute_names, uniform_names, samplers) = {
                let record = &self.programs[id];
                (
                    record.key.clone(),
                    record.vertex_source.clone(),
                    record.fragment_source.clone(),
                    record.defines.clone(),
                    record
                        .attributes
                        .iter()
                        .map(|(name, _)| name.clone())
                        .collect::<Vec<_>>(),
                    record.uniforms.keys().cloned().collect::<Vec<_>>(),
                    record.samplers.clone(),
                )
            };

            match self
                .device
                .compile_program(&vertex_source, &fragment_source, &defines)
            {
                Ok(device_program) => {
                    let record = &mut self.programs[id];
                    record.device_program = Some(device_program);
                    record.attributes.clear();
                    record.uniforms.clear();
                    record.sampler_channels.clear();
                    record.compile_error = None;
                    for name in &attribute_names {
                        let location = self.device.attrib_location(device_program, name);
                        self.programs[id].attributes.push((name.clone(), location));
                    }
                    for name in uniform_names.iter().chain(samplers.iter()) {
                        if let Some(location) = self.device.uniform_location(device_program, name) {
                            self.programs[id].uniforms.insert(name.clone(), location);
                        }
                    }
                    self.programs[id].is_ready = true;
                }
                Err(error) => {
                    engine_error!(SOURCE, "Recompilation of '{}' failed: {}", key, error);
                    let record = &mut self.programs[id];
                    record.device_program = None;
                    record.is_ready = false;
                    record.compile_error = Some(error.to_string());
                }
            }
        }
    }
}
