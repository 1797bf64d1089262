/// Utility module - small self-contained helpers

// Module declarations
pub mod pot;
pub mod performance_monitor;

// Re-exports
pub use pot::*;
pub use performance_monitor::*;
