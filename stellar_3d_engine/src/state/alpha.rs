/// Alpha blending state

use crate::device::{BlendEquation, BlendFactor, GraphicsDevice};

/// Dirty-flag value object for the blend pipeline state
#[derive(Debug)]
pub struct AlphaState {
    blend: bool,
    blend_func: (BlendFactor, BlendFactor, BlendFactor, BlendFactor),
    blend_equation: (BlendEquation, BlendEquation),

    blend_dirty: bool,
    func_dirty: bool,
    equation_dirty: bool,
}

impl AlphaState {
    pub fn new() -> Self {
        Self {
            blend: false,
            blend_func: (
                BlendFactor::One,
                BlendFactor::Zero,
                BlendFactor::One,
                BlendFactor::Zero,
            ),
            blend_equation: (BlendEquation::Add, BlendEquation::Add),
            blend_dirty: true,
            func_dirty: false,
            equation_dirty: false,
        }
    }

    // ===== SETTERS =====

    pub fn set_blend(&mut self, enabled: bool) {
        if self.blend != enabled {
            self.blend = enabled;
            self.blend_dirty = true;
        }
    }

    pub fn set_blend_func(
        &mut self,
        src: BlendFactor,
        dst: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) {
        let requested = (src, dst, src_alpha, dst_alpha);
        if self.blend_func != requested {
            self.blend_func = requested;
            self.func_dirty = true;
        }
    }

    pub fn set_blend_equation(&mut self, color: BlendEquation, alpha: BlendEquation) {
        let requested = (color, alpha);
        if self.blend_equation != requested {
            self.blend_equation = requested;
            self.equation_dirty = true;
        }
    }

    // ===== GETTERS =====

    pub fn blend(&self) -> bool {
        self.blend
    }

    pub fn blend_func(&self) -> (BlendFactor, BlendFactor, BlendFactor, BlendFactor) {
        self.blend_func
    }

    pub fn blend_equation(&self) -> (BlendEquation, BlendEquation) {
        self.blend_equation
    }

    // ===== COMMIT =====

    pub fn is_dirty(&self) -> bool {
        self.blend_dirty || self.func_dirty || self.equation_dirty
    }

    /// Commit dirty fields to the device and clear their flags
    pub fn apply(&mut self, device: &mut dyn GraphicsDevice) {
        if self.blend_dirty {
            device.set_blend(self.blend);
            self.blend_dirty = false;
        }
        if self.func_dirty {
            let (src, dst, src_alpha, dst_alpha) = self.blend_func;
            device.set_blend_func(src, dst, src_alpha, dst_alpha);
            self.func_dirty = false;
        }
        if self.equation_dirty {
            let (color, alpha) = self.blend_equation;
            device.set_blend_equation(color, alpha);
            self.equation_dirty = false;
        }
    }

    /// Restore defaults and mark everything dirty
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for AlphaState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "alpha_tests.rs"]
mod tests;
