/// Draw submission
///
/// Every draw commits dirty pipeline state first, maps the logical fill
/// mode onto a device topology, and bumps the per-frame draw-call counter.
/// Indexed draws take the element width from the currently bound index
/// buffer.

use crate::device::{FillMode, PrimitiveTopology};
use crate::engine::Engine;

impl Engine {
    // ===== ATTRIBUTES =====

    /// Enable or disable a vertex attribute slot, cached
    pub fn set_vertex_attrib_enabled(&mut self, index: u32, enabled: bool) {
        let slot = index as usize;
        if slot >= self.enabled_attribs.len() {
            return;
        }
        if self.enabled_attribs[slot] != enabled {
            if enabled {
                self.device.enable_vertex_attrib(index);
            } else {
                self.device.disable_vertex_attrib(index);
            }
            self.enabled_attribs[slot] = enabled;
        }
    }

    // ===== DRAWS =====

    fn topology_of(fill_mode: FillMode) -> PrimitiveTopology {
        match fill_mode {
            FillMode::Triangle => PrimitiveTopology::Triangles,
            FillMode::Wireframe => PrimitiveTopology::Lines,
            FillMode::Point => PrimitiveTopology::Points,
            FillMode::PointList => PrimitiveTopology::Points,
            FillMode::LineList => PrimitiveTopology::Lines,
            FillMode::LineLoop => PrimitiveTopology::LineLoop,
            FillMode::LineStrip => PrimitiveTopology::LineStrip,
            FillMode::TriangleStrip => PrimitiveTopology::TriangleStrip,
            FillMode::TriangleFan => PrimitiveTopology::TriangleFan,
        }
    }

    /// Draw from the bound index buffer
    ///
    /// `instance_count` zero means a plain (non-instanced) draw.
    pub fn draw_indexed(
        &mut self,
        fill_mode: FillMode,
        index_start: u32,
        index_count: u32,
        instance_count: u32,
    ) {
        self.apply_states();

        let topology = Self::topology_of(fill_mode);
        let wide_indices = self
            .bound_index_buffer
            .and_then(|id| self.buffers.get(id))
            .map(|record| record.wide_indices)
            .unwrap_or(false);

        if instance_count > 0 {
            self.device.draw_elements_instanced(
                topology,
                index_start as usize,
                index_count as usize,
                wide_indices,
                instance_count as usize,
            );
        } else {
            self.device.draw_elements(
                topology,
                index_start as usize,
                index_count as usize,
                wide_indices,
            );
        }
        self.draw_calls_this_frame += 1;
    }

    /// Draw unindexed vertices
    pub fn draw_unindexed(
        &mut self,
        fill_mode: FillMode,
        vertex_start: u32,
        vertex_count: u32,
        instance_count: u32,
    ) {
        self.apply_states();

        let topology = Self::topology_of(fill_mode);
        if instance_count > 0 {
            self.device.draw_arrays_instanced(
                topology,
                vertex_start as usize,
                vertex_count as usize,
                instance_count as usize,
            );
        } else {
            self.device
                .draw_arrays(topology, vertex_start as usize, vertex_count as usize);
        }
        self.draw_calls_this_frame += 1;
    }

    /// Clear the bound surface
    pub fn clear(&mut self, color: [f32; 4], flags: crate::device::ClearFlags) {
        self.device.clear(color, flags);
    }
}
