//! Error types for the Stellar3D engine
//!
//! This module defines the error types used throughout the engine,
//! including device command failures, resource creation and loading.

use std::fmt;

/// Result type for Stellar3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Stellar3D engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (GL, Vulkan, null device, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, buffer, program, etc.)
    InvalidResource(String),

    /// Initialization failed (engine, device, subsystems)
    InitializationFailed(String),

    /// The underlying device context has been lost
    DeviceLost,

    /// The device does not support the requested feature
    UnsupportedFeature(String),

    /// Resource load or decode failed (url, message)
    LoadFailed(String, String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::DeviceLost => write!(f, "Device context lost"),
            Error::UnsupportedFeature(msg) => write!(f, "Unsupported feature: {}", msg),
            Error::LoadFailed(url, msg) => write!(f, "Failed to load '{}': {}", url, msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Build an [`Error::InvalidResource`] and log it through the engine logger
///
/// # Example
///
/// ```no_run
/// # use stellar_3d_engine::engine_err;
/// let err = engine_err!("stellar3d::Buffer", "capacity {} too small", 12);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::stellar3d::Error::InvalidResource(message)
    }};
}

/// Log an error and return early with `Err(...)` from the enclosing function
///
/// # Example
///
/// ```no_run
/// # use stellar_3d_engine::engine_bail;
/// # use stellar_3d_engine::stellar3d::Result;
/// # fn check(index: usize, count: usize) -> Result<()> {
/// if index >= count {
///     engine_bail!("stellar3d::Buffer", "index {} out of bounds", index);
/// }
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
