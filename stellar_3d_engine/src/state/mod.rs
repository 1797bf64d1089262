/// State module - dirty-flag value objects for device pipeline state
///
/// Each state object stores the requested configuration, marks fields dirty
/// when a setter actually changes a value, and commits only the dirty fields
/// to the device in `apply`. This is what makes redundant state sets free.

// Module declarations
pub mod depth_culling;
pub mod stencil;
pub mod alpha;

// Re-exports
pub use depth_culling::*;
pub use stencil::*;
pub use alpha::*;
