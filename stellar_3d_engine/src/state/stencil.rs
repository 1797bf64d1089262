/// Stencil test state

use crate::device::{ComparisonFunction, GraphicsDevice, StencilOperation};

/// Dirty-flag value object for the stencil pipeline state
#[derive(Debug)]
pub struct StencilState {
    test: bool,
    mask: u32,
    func: ComparisonFunction,
    func_ref: i32,
    func_mask: u32,
    op_fail: StencilOperation,
    op_depth_fail: StencilOperation,
    op_pass: StencilOperation,

    test_dirty: bool,
    mask_dirty: bool,
    func_dirty: bool,
    ops_dirty: bool,
}

impl StencilState {
    pub fn new() -> Self {
        Self {
            test: false,
            mask: 0xFF,
            func: ComparisonFunction::Always,
            func_ref: 1,
            func_mask: 0xFF,
            op_fail: StencilOperation::Keep,
            op_depth_fail: StencilOperation::Keep,
            op_pass: StencilOperation::Replace,
            test_dirty: true,
            mask_dirty: true,
            func_dirty: true,
            ops_dirty: true,
        }
    }

    // ===== SETTERS =====

    pub fn set_test(&mut self, enabled: bool) {
        if self.test != enabled {
            self.test = enabled;
            self.test_dirty = true;
        }
    }

    pub fn set_mask(&mut self, mask: u32) {
        if self.mask != mask {
            self.mask = mask;
            self.mask_dirty = true;
        }
    }

    pub fn set_func(&mut self, func: ComparisonFunction) {
        if self.func != func {
            self.func = func;
            self.func_dirty = true;
        }
    }

    pub fn set_func_ref(&mut self, reference: i32) {
        if self.func_ref != reference {
            self.func_ref = reference;
            self.func_dirty = true;
        }
    }

    pub fn set_func_mask(&mut self, mask: u32) {
        if self.func_mask != mask {
            self.func_mask = mask;
            self.func_dirty = true;
        }
    }

    pub fn set_op_fail(&mut self, op: StencilOperation) {
        if self.op_fail != op {
            self.op_fail = op;
            self.ops_dirty = true;
        }
    }

    pub fn set_op_depth_fail(&mut self, op: StencilOperation) {
        if self.op_depth_fail != op {
            self.op_depth_fail = op;
            self.ops_dirty = true;
        }
    }

    pub fn set_op_pass(&mut self, op: StencilOperation) {
        if self.op_pass != op {
            self.op_pass = op;
            self.ops_dirty = true;
        }
    }

    // ===== GETTERS =====

    pub fn test(&self) -> bool {
        self.test
    }

    pub fn mask(&self) -> u32 {
        self.mask
    }

    pub fn func(&self) -> ComparisonFunction {
        self.func
    }

    pub fn func_ref(&self) -> i32 {
        self.func_ref
    }

    pub fn func_mask(&self) -> u32 {
        self.func_mask
    }

    pub fn op_fail(&self) -> StencilOperation {
        self.op_fail
    }

    pub fn op_depth_fail(&self) -> StencilOperation {
        self.op_depth_fail
    }

    pub fn op_pass(&self) -> StencilOperation {
        self.op_pass
    }

    // ===== COMMIT =====

    pub fn is_dirty(&self) -> bool {
        self.test_dirty || self.mask_dirty || self.func_dirty || self.ops_dirty
    }

    /// Commit dirty fields to the device and clear their flags
    pub fn apply(&mut self, device: &mut dyn GraphicsDevice) {
        if self.test_dirty {
            device.set_stencil_test(self.test);
            self.test_dirty = false;
        }
        if self.mask_dirty {
            device.set_stencil_mask(self.mask);
            self.mask_dirty = false;
        }
        if self.func_dirty {
            device.set_stencil_func(self.func, self.func_ref, self.func_mask);
            self.func_dirty = false;
        }
        if self.ops_dirty {
            device.set_stencil_ops(self.op_fail, self.op_depth_fail, self.op_pass);
            self.ops_dirty = false;
        }
    }

    /// Restore defaults and mark everything dirty
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for StencilState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "stencil_tests.rs"]
mod tests;
