/// Depth test / depth write / face culling state

use crate::device::{ComparisonFunction, GraphicsDevice};

/// Dirty-flag value object for the depth and culling pipeline state
#[derive(Debug)]
pub struct DepthCullingState {
    depth_test: bool,
    depth_write: bool,
    depth_func: Option<ComparisonFunction>,
    cull: bool,
    z_offset: f32,

    depth_test_dirty: bool,
    depth_write_dirty: bool,
    depth_func_dirty: bool,
    cull_dirty: bool,
    z_offset_dirty: bool,
}

impl DepthCullingState {
    /// State with engine defaults, all fields dirty so the first apply
    /// commits everything
    pub fn new() -> Self {
        Self {
            depth_test: true,
            depth_write: true,
            depth_func: None,
            cull: true,
            z_offset: 0.0,
            depth_test_dirty: true,
            depth_write_dirty: true,
            depth_func_dirty: false, // committed only once a function is set
            cull_dirty: true,
            z_offset_dirty: true,
        }
    }

    // ===== SETTERS =====

    pub fn set_depth_test(&mut self, enabled: bool) {
        if self.depth_test != enabled {
            self.depth_test = enabled;
            self.depth_test_dirty = true;
        }
    }

    pub fn set_depth_write(&mut self, enabled: bool) {
        if self.depth_write != enabled {
            self.depth_write = enabled;
            self.depth_write_dirty = true;
        }
    }

    pub fn set_depth_func(&mut self, func: ComparisonFunction) {
        if self.depth_func != Some(func) {
            self.depth_func = Some(func);
            self.depth_func_dirty = true;
        }
    }

    pub fn set_cull(&mut self, enabled: bool) {
        if self.cull != enabled {
            self.cull = enabled;
            self.cull_dirty = true;
        }
    }

    pub fn set_z_offset(&mut self, offset: f32) {
        if self.z_offset != offset {
            self.z_offset = offset;
            self.z_offset_dirty = true;
        }
    }

    // ===== GETTERS =====

    pub fn depth_test(&self) -> bool {
        self.depth_test
    }

    pub fn depth_write(&self) -> bool {
        self.depth_write
    }

    pub fn depth_func(&self) -> Option<ComparisonFunction> {
        self.depth_func
    }

    pub fn cull(&self) -> bool {
        self.cull
    }

    pub fn z_offset(&self) -> f32 {
        self.z_offset
    }

    // ===== COMMIT =====

    pub fn is_dirty(&self) -> bool {
        self.depth_test_dirty
            || self.depth_write_dirty
            || self.depth_func_dirty
            || self.cull_dirty
            || self.z_offset_dirty
    }

    /// Commit dirty fields to the device and clear their flags
    pub fn apply(&mut self, device: &mut dyn GraphicsDevice) {
        if self.depth_test_dirty {
            device.set_depth_test(self.depth_test);
            self.depth_test_dirty = false;
        }
        if self.depth_write_dirty {
            device.set_depth_write(self.depth_write);
            self.depth_write_dirty = false;
        }
        if self.depth_func_dirty {
            if let Some(func) = self.depth_func {
                device.set_depth_func(func);
            }
            self.depth_func_dirty = false;
        }
        if self.cull_dirty {
            device.set_cull(self.cull);
            self.cull_dirty = false;
        }
        if self.z_offset_dirty {
            device.set_z_offset(self.z_offset);
            self.z_offset_dirty = false;
        }
    }

    /// Restore defaults and mark everything dirty
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for DepthCullingState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "depth_culling_tests.rs"]
mod tests;
