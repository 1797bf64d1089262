/// Buffer records

use crate::device::{BufferTarget, BufferUsage, DeviceBuffer};

/// Core-owned state of one GPU buffer
///
/// The reference count is shared across logical owners (several meshes may
/// share one vertex buffer); the device resource is freed exactly once, on
/// the release that drops the count to zero.
#[derive(Debug)]
pub struct BufferRecord {
    pub target: BufferTarget,
    pub usage: BufferUsage,
    /// Capacity in bytes
    pub capacity: usize,
    /// Logical owner count, starts at 1
    pub references: u32,
    /// Index buffers: whether 32-bit indices are in use
    pub wide_indices: bool,

    /// Device-side object, absent after device loss until rebuild
    pub device_buffer: Option<DeviceBuffer>,
    /// Retained CPU copy for rebuild
    pub retained: Option<Vec<u8>>,
}

impl BufferRecord {
    pub fn new(target: BufferTarget, usage: BufferUsage, capacity: usize) -> Self {
        Self {
            target,
            usage,
            capacity,
            references: 1,
            wide_indices: false,
            device_buffer: None,
            retained: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
