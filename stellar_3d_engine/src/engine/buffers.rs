/// Buffer manager operations
///
/// Vertex, index, uniform and instance buffers with shared reference counts.
/// All binds for upload go through the cached buffer-binding map so repeated
/// binds of the same buffer are free.

use crate::device::{BufferTarget, BufferUsage, DeviceBuffer};
use crate::engine::Engine;
use crate::engine_warn;
use crate::error::Result;
use crate::resource::{BufferId, BufferRecord};

const SOURCE: &str = "stellar3d::BufferManager";

impl Engine {
    // ===== BINDING (cached) =====

    /// Bind a device buffer through the bound-state cache
    pub(crate) fn bind_buffer_cached(&mut self, target: BufferTarget, buffer: Option<DeviceBuffer>) {
        let cached = self.bound_buffers.get(&target).copied();
        if cached != Some(buffer) {
            self.device.bind_buffer(target, buffer);
            self.bound_buffers.insert(target, buffer);
        }
    }

    /// Bind a managed buffer for drawing; no-op for unknown ids
    pub fn bind_buffer(&mut self, id: BufferId) {
        if let Some(record) = self.buffers.get(id) {
            let target = record.target;
            let device_buffer = record.device_buffer;
            self.bind_buffer_cached(target, device_buffer);
            if target == BufferTarget::ElementArray {
                self.bound_index_buffer = Some(id);
            }
        }
    }

    // ===== CREATION =====

    fn create_buffer_record(
        &mut self,
        target: BufferTarget,
        usage: BufferUsage,
        data: Option<&[u8]>,
        capacity: usize,
        wide_indices: bool,
    ) -> Result<BufferId> {
        let device_buffer = self.device.create_buffer()?;
        self.bind_buffer_cached(target, Some(device_buffer));
        match data {
            Some(bytes) => self.device.buffer_data(target, bytes, usage),
            None => self.device.buffer_allocate(target, capacity, usage),
        }

        let mut record = BufferRecord::new(target, usage, capacity);
        record.device_buffer = Some(device_buffer);
        record.wide_indices = wide_indices;
        if !self.options.do_not_handle_context_lost {
            record.retained = data.map(|bytes| bytes.to_vec());
        }

        Ok(self.buffers.insert(record))
    }

    /// Create a vertex buffer from raw bytes
    pub fn create_vertex_buffer(&mut self, data: &[u8]) -> Result<BufferId> {
        self.create_buffer_record(BufferTarget::Array, BufferUsage::Static, Some(data), data.len(), false)
    }

    /// Create an updatable vertex buffer from raw bytes
    pub fn create_dynamic_vertex_buffer(&mut self, data: &[u8]) -> Result<BufferId> {
        self.create_buffer_record(BufferTarget::Array, BufferUsage::Dynamic, Some(data), data.len(), false)
    }

    /// Create an index buffer, narrowing to 16-bit storage when possible
    ///
    /// 32-bit storage is used only when an index exceeds 65535 AND the
    /// device supports wide indices. When an index exceeds 65535 on a device
    /// without wide-index support the values are truncated; this is a silent
    /// correctness hazard, so it is logged as a warning.
    pub fn create_index_buffer(&mut self, indices: &[u32], updatable: bool) -> Result<BufferId> {
        let usage = if updatable { BufferUsage::Dynamic } else { BufferUsage::Static };
        let needs_wide = indices.iter().any(|&i| i > 65_535);
        let wide = needs_wide && self.caps.uint_indices;

        if needs_wide && !wide {
            engine_warn!(
                SOURCE,
                "Index buffer holds indices above 65535 but the device lacks 32-bit \
                 index support; values will be truncated"
            );
        }

        if wide {
            let bytes: &[u8] = bytemuck::cast_slice(indices);
            self.create_buffer_record(BufferTarget::ElementArray, usage, Some(bytes), bytes.len(), true)
        } else {
            let narrowed: Vec<u16> = indices.iter().map(|&i| i as u16).collect();
            let bytes: &[u8] = bytemuck::cast_slice(&narrowed);
            self.create_buffer_record(BufferTarget::ElementArray, usage, Some(bytes), bytes.len(), false)
        }
    }

    /// Create a uniform buffer from raw bytes
    pub fn create_uniform_buffer(&mut self, data: &[u8]) -> Result<BufferId> {
        self.create_buffer_record(BufferTarget::Uniform, BufferUsage::Dynamic, Some(data), data.len(), false)
    }

    /// Create an instance-data buffer with `capacity` bytes of storage
    pub fn create_instance_buffer(&mut self, capacity: usize) -> Result<BufferId> {
        self.create_buffer_record(BufferTarget::Array, BufferUsage::Dynamic, None, capacity, false)
    }

    // ===== UPDATES =====

    /// Update a sub-range of a buffer
    ///
    /// # Errors
    ///
    /// Fails for unknown ids and out-of-range writes.
    pub fn update_buffer(&mut self, id: BufferId, offset: usize, data: &[u8]) -> Result<()> {
        let (target, device_buffer, capacity) = match self.buffers.get(id) {
            Some(record) => (record.target, record.device_buffer, record.capacity),
            None => crate::engine_bail!(SOURCE, "update_buffer: unknown buffer id"),
        };
        if offset + data.len() > capacity {
            crate::engine_bail!(
                SOURCE,
                "update_buffer: write of {} bytes at offset {} exceeds capacity {}",
                data.len(),
                offset,
                capacity
            );
        }

        self.bind_buffer_cached(target, device_buffer);
        self.device.buffer_sub_data(target, offset, data);

        if !self.options.do_not_handle_context_lost {
            if let Some(record) = self.buffers.get_mut(id) {
                let retained = record.retained.get_or_insert_with(|| vec![0; capacity]);
                if retained.len() < offset + data.len() {
                    retained.resize(offset + data.len(), 0);
                }
                retained[offset..offset + data.len()].copy_from_slice(data);
            }
        }
        Ok(())
    }

    /// Upload fresh instance data and leave the buffer bound for drawing
    pub fn update_and_bind_instance_buffer(&mut self, id: BufferId, data: &[u8]) -> Result<()> {
        self.update_buffer(id, 0, data)?;
        self.bind_buffer(id);
        Ok(())
    }

    // ===== REFERENCE COUNTING =====

    /// Add a logical owner to a buffer
    pub fn acquire_buffer(&mut self, id: BufferId) {
        if let Some(record) = self.buffers.get_mut(id) {
            record.references += 1;
        }
    }

    /// Drop a logical owner; frees the device resource when the count
    /// reaches zero. Returns `true` when the resource was actually freed.
    pub fn release_buffer(&mut self, id: BufferId) -> bool {
        let Some(record) = self.buffers.get_mut(id) else {
            return false;
        };

        record.references -= 1;
        if record.references > 0 {
            return false;
        }

        let record = self.buffers.remove(id).expect("record checked above");
        if self.bound_index_buffer == Some(id) {
            self.bound_index_buffer = None;
        }
        if let Some(device_buffer) = record.device_buffer {
            // Drop any cached binding of this buffer before deletion
            for (_, bound) in self.bound_buffers.iter_mut() {
                if *bound == Some(device_buffer) {
                    *bound = None;
                }
            }
            self.device.delete_buffer(device_buffer);
        }
        true
    }

    /// Live buffer count (excludes released records)
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Reference count of a buffer, `None` for released ids
    pub fn buffer_references(&self, id: BufferId) -> Option<u32> {
        self.buffers.get(id).map(|record| record.references)
    }

    /// Whether an index buffer uses 32-bit storage
    pub fn buffer_uses_wide_indices(&self, id: BufferId) -> Option<bool> {
        self.buffers.get(id).map(|record| record.wide_indices)
    }
}
