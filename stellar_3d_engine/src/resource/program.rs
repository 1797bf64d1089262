/// Compiled program records

use rustc_hash::FxHashMap;

use crate::device::{DeviceProgram, UniformLocation};

/// Cache key for a compiled program
///
/// Exact-match: the same logical shader identity with different preprocessor
/// defines is a different program.
pub fn program_key(name: &str, defines: &str) -> String {
    format!("{}@{}", name, defines)
}

/// Core-owned state of one compiled program
#[derive(Debug)]
pub struct ProgramRecord {
    pub key: String,

    // Sources retained for rebuild after device loss
    pub vertex_source: String,
    pub fragment_source: String,
    pub defines: String,

    /// Device-side object, absent on compile failure or after device loss
    pub device_program: Option<DeviceProgram>,
    /// Callers must check this before binding; compile failures leave it false
    pub is_ready: bool,
    /// Compile/link log of the last failed compilation
    pub compile_error: Option<String>,

    /// Requested attribute names with their resolved locations, in
    /// declaration order (`None` for attributes the compiler removed)
    pub attributes: Vec<(String, Option<u32>)>,
    /// Resolved uniform locations
    pub uniforms: FxHashMap<String, UniformLocation>,
    /// Sampler uniform names in declaration order
    pub samplers: Vec<String>,
    /// Last channel committed for each sampler uniform
    pub sampler_channels: FxHashMap<String, i32>,
}

impl ProgramRecord {
    pub fn new(key: String, vertex_source: String, fragment_source: String, defines: String) -> Self {
        Self {
            key,
            vertex_source,
            fragment_source,
            defines,
            device_program: None,
            is_ready: false,
            compile_error: None,
            attributes: Vec::new(),
            uniforms: FxHashMap::default(),
            samplers: Vec::new(),
            sampler_channels: FxHashMap::default(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "program_tests.rs"]
mod tests;
