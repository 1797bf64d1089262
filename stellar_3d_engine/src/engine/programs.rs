/// Program/effect cache
///
/// Compiled programs are cached by (logical name, preprocessor defines);
/// a hit never recompiles. Compilation failure is logged with the offending
/// source and leaves the record non-ready rather than failing the call, so
/// callers must check readiness before binding.

use crate::engine::Engine;
use crate::engine_error;
use crate::resource::{program_key, ProgramId, ProgramRecord};

const SOURCE: &str = "stellar3d::ProgramCache";

/// Callback fired when a program finishes compiling (immediately on cache
/// hits that are already ready)
pub type OnCompiledFn = Box<dyn FnOnce(ProgramId)>;

impl Engine {
    /// Look up or compile a program
    ///
    /// The cache key is exact-match over `name` and `defines`. At most one
    /// record ever exists per key.
    pub fn get_or_create_program(
        &mut self,
        name: &str,
        vertex_source: &str,
        fragment_source: &str,
        defines: &str,
        attributes: &[&str],
        uniforms: &[&str],
        samplers: &[&str],
        on_compiled: Option<OnCompiledFn>,
    ) -> ProgramId {
        let key = program_key(name, defines);

        if let Some(&id) = self.program_cache.get(&key) {
            if self.programs.get(id).map(|r| r.is_ready).unwrap_or(false) {
                if let Some(callback) = on_compiled {
                    callback(id);
                }
            }
            return id;
        }

        let mut record = ProgramRecord::new(
            key.clone(),
            vertex_source.to_string(),
            fragment_source.to_string(),
            defines.to_string(),
        );

        match self.device.compile_program(vertex_source, fragment_source, defines) {
            Ok(device_program) => {
                record.device_program = Some(device_program);
                for name in attributes {
                    let location = self.device.attrib_location(device_program, name);
                    record.attributes.push((name.to_string(), location));
                }
                for name in uniforms.iter().chain(samplers.iter()) {
                    if let Some(location) = self.device.uniform_location(device_program, name) {
                        record.uniforms.insert(name.to_string(), location);
                    }
                }
                record.samplers = samplers.iter().map(|s| s.to_string()).collect();
                record.is_ready = true;
            }
            Err(error) => {
                engine_error!(
                    SOURCE,
                    "Compilation of '{}' failed: {}\n--- vertex ---\n{}\n--- fragment ---\n{}",
                    key,
                    error,
                    vertex_source,
                    fragment_source
                );
                record.compile_error = Some(error.to_string());
            }
        }

        let ready = record.is_ready;
        let id = self.programs.insert(record);
        self.program_cache.insert(key, id);

        if ready {
            if let Some(callback) = on_compiled {
                callback(id);
            }
        }
        id
    }

    /// Make a program current for subsequent draws, cached
    pub fn bind_program(&mut self, id: ProgramId) -> bool {
        let device_program = self
            .programs
            .get(id)
            .filter(|record| record.is_ready)
            .and_then(|record| record.device_program);
        let Some(device_program) = device_program else {
            return false;
        };
        if self.current_program != Some(device_program) {
            self.device.use_program(Some(device_program));
            self.current_program = Some(device_program);
        }
        true
    }

    /// Whether a program compiled successfully
    pub fn program_is_ready(&self, id: ProgramId) -> bool {
        self.programs.get(id).map(|r| r.is_ready).unwrap_or(false)
    }

    /// Compile/link log of a failed program
    pub fn program_compile_error(&self, id: ProgramId) -> Option<&str> {
        self.programs.get(id).and_then(|r| r.compile_error.as_deref())
    }

    /// Resolved location of an attribute, `None` if absent or compiled out
    pub fn program_attribute_location(&self, id: ProgramId, name: &str) -> Option<u32> {
        self.programs.get(id).and_then(|record| {
            record
                .attributes
                .iter()
                .find(|(n, _)| n == name)
                .and_then(|(_, location)| *location)
        })
    }

    /// Number of cached programs
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    /// Drop every cached program; used during disposal
    pub fn release_all_programs(&mut self) {
        let ids: Vec<ProgramId> = self.programs.keys().collect();
        for id in ids {
            if let Some(record) = self.programs.remove(id) {
                if let Some(device_program) = record.device_program {
                    if self.current_program == Some(device_program) {
                        self.device.use_program(None);
                        self.current_program = None;
                    }
                    self.device.delete_program(device_program);
                }
            }
        }
        self.program_cache.clear();
    }
}
