/// Texture-binding slot allocator and recency chain
///
/// Channel bindings are cached per channel so rebinding the same
/// texture is free. Currently-bound textures are threaded on a doubly-linked
/// chain between two sentinel records; every bind moves the texture next to
/// the tail sentinel, so chain order is recency order. The whole chain
/// bookkeeping is skipped under `disable_texture_binding_optimization`.

use crate::device::TextureTarget;
use crate::engine::Engine;
use crate::error::Result;
use crate::resource::{ProgramId, TextureId};

const SOURCE: &str = "stellar3d::TextureBinder";

impl Engine {
    // ===== PUBLIC BINDING SURFACE =====

    /// Bind a texture to a logical channel for sampling
    ///
    /// A not-yet-ready texture is silently substituted with the matching
    /// empty fallback texture; `None` unbinds the channel.
    pub fn bind_texture_to_channel(
        &mut self,
        channel: u32,
        id: Option<TextureId>,
    ) -> Result<()> {
        if channel >= self.bound_textures.len() as u32 {
            crate::engine_bail!(
                SOURCE,
                "bind_texture_to_channel: channel {} out of range ({} available)",
                channel,
                self.bound_textures.len()
            );
        }

        let effective = match id {
            None => None,
            Some(id) => match self.textures.get(id) {
                None => None,
                Some(record) if record.is_ready => Some(id),
                Some(record) => {
                    // Substitute the fallback matching the texture's shape
                    let fallback = if record.is_cube {
                        self.empty_cube_texture()?
                    } else if record.is_3d {
                        self.empty_texture_3d()?
                    } else {
                        self.empty_texture()?
                    };
                    Some(fallback)
                }
            },
        };

        let target = match effective {
            Some(id) => Self::target_of(&self.textures[id]),
            None => TextureTarget::Texture2D,
        };
        self.bind_texture_directly(target, channel, effective);
        Ok(())
    }

    /// Commit a sampler uniform's channel assignment, cached per sampler
    pub fn bind_sampler_uniform_to_channel(
        &mut self,
        program: ProgramId,
        sampler: &str,
        channel: u32,
    ) -> Result<()> {
        let location = match self.programs.get(program) {
            Some(record) => match record.uniforms.get(sampler) {
                Some(location) => *location,
                None => crate::engine_bail!(
                    SOURCE,
                    "bind_sampler_uniform_to_channel: no sampler uniform '{}'",
                    sampler
                ),
            },
            None => {
                crate::engine_bail!(SOURCE, "bind_sampler_uniform_to_channel: unknown program id")
            }
        };

        let cached = self
            .programs
            .get(program)
            .and_then(|record| record.sampler_channels.get(sampler).copied());
        if cached != Some(channel as i32) {
            self.device.set_uniform_int(location, channel as i32);
            if let Some(record) = self.programs.get_mut(program) {
                record
                    .sampler_channels
                    .insert(sampler.to_string(), channel as i32);
            }
        }
        Ok(())
    }

    /// Unbind every channel
    ///
    /// Clears all three bindable targets on each occupied channel, so a
    /// cube or 3D texture cannot stay bound device-side (a render target
    /// left bound while sampled produces feedback artifacts).
    pub fn unbind_all_textures(&mut self) {
        for channel in 0..self.bound_textures.len() as u32 {
            let slot = channel as usize;
            let Some(old) = self.bound_textures[slot] else {
                continue;
            };
            self.activate_channel(channel);
            if let Some(record) = self.textures.get_mut(old) {
                record.associated_channel = None;
            }
            if !self.options.disable_texture_binding_optimization {
                self.unlink_from_chain(old);
            }
            for target in [
                TextureTarget::Texture2D,
                TextureTarget::TextureCube,
                TextureTarget::Texture3D,
            ] {
                self.device.bind_texture(target, None);
            }
            self.bound_textures[slot] = None;
        }
    }

    /// Texture currently bound to a channel
    pub fn bound_texture(&self, channel: u32) -> Option<TextureId> {
        self.bound_textures
            .get(channel as usize)
            .copied()
            .flatten()
    }

    /// Bound textures in recency order, oldest first, sentinels excluded
    pub fn bound_chain_order(&self) -> Vec<TextureId> {
        let mut order = Vec::new();
        let mut cursor = self.textures[self.chain_head].chain_next;
        while let Some(id) = cursor {
            if id == self.chain_tail {
                break;
            }
            order.push(id);
            cursor = self.textures[id].chain_next;
        }
        order
    }

    // ===== DIRECT BIND (cache compare) =====

    /// Bind a texture on a channel, comparing against the channel cache
    ///
    /// Returns whether a device bind was issued.
    pub(crate) fn bind_texture_directly(
        &mut self,
        target: TextureTarget,
        channel: u32,
        id: Option<TextureId>,
    ) -> bool {
        let slot = channel as usize;
        let currently = self.bound_textures[slot];

        if currently == id {
            // Already bound; refresh recency only
            if let Some(id) = id {
                if !self.options.disable_texture_binding_optimization {
                    self.move_to_chain_top(id);
                }
            }
            return false;
        }

        self.activate_channel(channel);

        if let Some(old) = currently {
            if let Some(record) = self.textures.get_mut(old) {
                record.associated_channel = None;
            }
            if !self.options.disable_texture_binding_optimization {
                self.unlink_from_chain(old);
            }
        }

        let device_texture = id.and_then(|id| self.textures.get(id)).and_then(|r| r.device_texture);
        self.device.bind_texture(target, device_texture);
        self.bound_textures[slot] = id;

        if let Some(id) = id {
            if let Some(record) = self.textures.get_mut(id) {
                record.associated_channel = Some(channel);
            }
            if !self.options.disable_texture_binding_optimization {
                self.move_to_chain_top(id);
            }
        }
        true
    }

    /// Select the active channel, cached
    pub(crate) fn activate_channel(&mut self, channel: u32) {
        if self.active_channel != Some(channel) {
            self.device.active_texture(channel);
            self.active_channel = Some(channel);
        }
    }

    // ===== RECENCY CHAIN =====

    /// Remove a record from the chain, stitching its neighbours together
    pub(crate) fn unlink_from_chain(&mut self, id: TextureId) {
        let (prev, next) = match self.textures.get(id) {
            Some(record) if !record.is_chain_sentinel => (record.chain_prev, record.chain_next),
            _ => return,
        };
        let (Some(prev), Some(next)) = (prev, next) else {
            return; // not linked
        };
        self.textures[prev].chain_next = Some(next);
        self.textures[next].chain_prev = Some(prev);
        let record = &mut self.textures[id];
        record.chain_prev = None;
        record.chain_next = None;
    }

    /// Link a record immediately before the tail sentinel (most recent)
    pub(crate) fn move_to_chain_top(&mut self, id: TextureId) {
        if self
            .textures
            .get(id)
            .map(|r| r.is_chain_sentinel)
            .unwrap_or(true)
        {
            return;
        }
        // Already on top?
        if self.textures[self.chain_tail].chain_prev == Some(id) {
            return;
        }

        self.unlink_from_chain(id);

        let last = self.textures[self.chain_tail]
            .chain_prev
            .expect("tail sentinel always has a predecessor");
        self.textures[last].chain_next = Some(id);
        self.textures[id].chain_prev = Some(last);
        self.textures[id].chain_next = Some(self.chain_tail);
        self.textures[self.chain_tail].chain_prev = Some(id);
    }
}
