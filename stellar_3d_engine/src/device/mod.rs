/// Device module - the raw backend command surface and its shared types

// Module declarations
pub mod device;
pub mod types;
pub mod mock_device;

// Re-export everything from device.rs
pub use device::*;

// Re-export from other modules
pub use types::*;
