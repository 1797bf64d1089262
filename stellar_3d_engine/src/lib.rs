/*!
# Stellar 3D Engine

Hardware-abstraction and resource-lifecycle core for the Stellar real-time
3D rendering engine.

This crate owns the device-facing half of the engine: the [`stellar3d::device::GraphicsDevice`]
command surface, the capability probe, the bound-state cache that elides
redundant device commands, and the lifecycle of every GPU resource (buffers,
textures, render targets, programs). Consumers hold copyable resource ids;
the engine owns the records behind them and can rebuild every device object
after a context loss from retained CPU data.

## Architecture

- **Engine**: owns the device, the capability snapshot, all resource records
  and the bound-state cache; all device commands flow through it
- **GraphicsDevice**: the raw backend command trait (a null backend lives in
  `stellar_3d_engine_device_null`)
- **Capabilities**: immutable per-context limit/feature snapshot
- **Resource records**: slotmap-backed texture/buffer/program state with
  generational ids handed to consumers
*/

// Internal modules
mod capabilities;
mod error;
mod registry;
pub mod device;
pub mod engine;
pub mod log;
pub mod resource;
pub mod state;
pub mod utils;

// Main stellar3d namespace module
pub mod stellar3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine core
    pub use crate::engine::{
        Engine, EngineOptions, FrameHookFn, RenderLoopFn,
    };
    pub use crate::engine::loading::{OnLoadErrorFn, OnLoadFn, PendingLoadState};
    pub use crate::engine::programs::OnCompiledFn;
    pub use crate::engine::render_targets::{
        DepthStencilOptions, OnBeforeUnbindFn, RenderTargetOptions,
    };

    // Capability snapshot
    pub use crate::capabilities::Capabilities;

    // Engine instance registry
    pub use crate::registry::{EngineInstanceId, EngineRegistry};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Device sub-module with the backend command surface
    pub mod device {
        pub use crate::device::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Pipeline-state sub-module
    pub mod state {
        pub use crate::state::*;
    }

    // Utility sub-module (POT math, performance monitor)
    pub mod utils {
        pub use crate::utils::*;
    }
}
