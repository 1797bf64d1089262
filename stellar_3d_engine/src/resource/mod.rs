/// Resource module - core-owned records for GPU resources
///
/// Records live in slotmaps owned by the engine; consumers hold copyable
/// generational keys that become invalid when the record is released.

use slotmap::new_key_type;

// Module declarations
pub mod texture;
pub mod buffer;
pub mod program;
pub mod loader;

// Re-exports
pub use texture::*;
pub use buffer::*;
pub use program::*;
pub use loader::*;

new_key_type! {
    /// Non-owning handle to a texture record
    pub struct TextureId;

    /// Non-owning handle to a buffer record
    pub struct BufferId;

    /// Non-owning handle to a compiled program record
    pub struct ProgramId;
}
