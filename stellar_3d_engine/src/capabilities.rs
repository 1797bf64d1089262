/// Device capability probe
///
/// Queries every numeric limit and optional feature flag from the device
/// once, producing an immutable [`Capabilities`] snapshot consumed by every
/// other engine component. Individual queries never fail the probe: a query
/// that answers `None` or zero is replaced by a documented conservative
/// default and a warning.

use crate::device::{DeviceFeature, DeviceLimit, GraphicsDevice};
use crate::{engine_debug, engine_warn};

const SOURCE: &str = "stellar3d::Capabilities";

// ============================================================================
// Capabilities snapshot
// ============================================================================

/// Immutable per-context device capability record
///
/// Created once per device context (and re-probed once per rebuild after
/// device loss); read-only thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    // Numeric limits
    pub max_texture_image_units: u32,
    pub max_combined_texture_image_units: u32,
    pub max_vertex_texture_image_units: u32,
    pub max_texture_size: u32,
    pub max_cubemap_texture_size: u32,
    pub max_render_texture_size: u32,
    pub max_vertex_attribs: u32,
    pub max_varying_vectors: u32,
    pub max_fragment_uniform_vectors: u32,
    pub max_vertex_uniform_vectors: u32,
    pub max_anisotropy: u32,
    pub max_msaa_samples: u32,
    pub max_draw_buffers: u32,

    // Optional features
    pub standard_derivatives: bool,
    pub uint_indices: bool,
    pub fragment_depth: bool,
    pub high_precision_shader: bool,
    pub texture_float: bool,
    pub texture_float_linear_filtering: bool,
    pub texture_float_render: bool,
    pub texture_half_float: bool,
    pub texture_half_float_linear_filtering: bool,
    pub texture_half_float_render: bool,
    pub texture_lod: bool,
    pub draw_buffers: bool,
    pub depth_texture: bool,
    pub instanced_arrays: bool,
    pub multisample_render_targets: bool,
    pub anisotropic_filtering: bool,
    pub needs_pot_textures: bool,
    pub texture_3d: bool,
}

// ============================================================================
// Probe
// ============================================================================

/// Conservative fallback used when a limit query is unreliable
fn fallback_limit(limit: DeviceLimit) -> u32 {
    match limit {
        DeviceLimit::MaxTextureImageUnits => 16,
        DeviceLimit::MaxCombinedTextureImageUnits => 16,
        DeviceLimit::MaxVertexTextureImageUnits => 4,
        DeviceLimit::MaxTextureSize => 2048,
        DeviceLimit::MaxCubemapTextureSize => 1024,
        DeviceLimit::MaxRenderTextureSize => 2048,
        DeviceLimit::MaxVertexAttribs => 16,
        DeviceLimit::MaxVaryingVectors => 16,
        DeviceLimit::MaxFragmentUniformVectors => 256,
        DeviceLimit::MaxVertexUniformVectors => 256,
        DeviceLimit::MaxAnisotropy => 1,
        DeviceLimit::MaxMsaaSamples => 1,
        DeviceLimit::MaxDrawBuffers => 1,
    }
}

fn probe_limit(device: &dyn GraphicsDevice, limit: DeviceLimit) -> u32 {
    match device.query_limit(limit) {
        Some(value) if value > 0 => value,
        _ => {
            let fallback = fallback_limit(limit);
            engine_warn!(
                SOURCE,
                "Query for {:?} failed, assuming {}",
                limit,
                fallback
            );
            fallback
        }
    }
}

/// Probe the device once and build the capability snapshot
///
/// Never fails: unreliable limit queries fall back to conservative defaults
/// with a warning, and feature queries answer plain booleans.
pub fn probe(device: &dyn GraphicsDevice) -> Capabilities {
    let caps = Capabilities {
        max_texture_image_units: probe_limit(device, DeviceLimit::MaxTextureImageUnits),
        max_combined_texture_image_units: probe_limit(
            device,
            DeviceLimit::MaxCombinedTextureImageUnits,
        ),
        max_vertex_texture_image_units: probe_limit(
            device,
            DeviceLimit::MaxVertexTextureImageUnits,
        ),
        max_texture_size: probe_limit(device, DeviceLimit::MaxTextureSize),
        max_cubemap_texture_size: probe_limit(device, DeviceLimit::MaxCubemapTextureSize),
        max_render_texture_size: probe_limit(device, DeviceLimit::MaxRenderTextureSize),
        max_vertex_attribs: probe_limit(device, DeviceLimit::MaxVertexAttribs),
        max_varying_vectors: probe_limit(device, DeviceLimit::MaxVaryingVectors),
        max_fragment_uniform_vectors: probe_limit(device, DeviceLimit::MaxFragmentUniformVectors),
        max_vertex_uniform_vectors: probe_limit(device, DeviceLimit::MaxVertexUniformVectors),
        max_anisotropy: if device.query_feature(DeviceFeature::AnisotropicFiltering) {
            probe_limit(device, DeviceLimit::MaxAnisotropy)
        } else {
            1
        },
        max_msaa_samples: if device.query_feature(DeviceFeature::MultisampleRenderTargets) {
            probe_limit(device, DeviceLimit::MaxMsaaSamples)
        } else {
            1
        },
        max_draw_buffers: if device.query_feature(DeviceFeature::DrawBuffers) {
            probe_limit(device, DeviceLimit::MaxDrawBuffers)
        } else {
            1
        },

        standard_derivatives: device.query_feature(DeviceFeature::StandardDerivatives),
        uint_indices: device.query_feature(DeviceFeature::UintIndices),
        fragment_depth: device.query_feature(DeviceFeature::FragmentDepth),
        high_precision_shader: device.query_feature(DeviceFeature::HighPrecisionShader),
        texture_float: device.query_feature(DeviceFeature::TextureFloat),
        texture_float_linear_filtering: device
            .query_feature(DeviceFeature::TextureFloatLinearFiltering),
        texture_float_render: device.query_feature(DeviceFeature::TextureFloatRender),
        texture_half_float: device.query_feature(DeviceFeature::TextureHalfFloat),
        texture_half_float_linear_filtering: device
            .query_feature(DeviceFeature::TextureHalfFloatLinearFiltering),
        texture_half_float_render: device.query_feature(DeviceFeature::TextureHalfFloatRender),
        texture_lod: device.query_feature(DeviceFeature::TextureLod),
        draw_buffers: device.query_feature(DeviceFeature::DrawBuffers),
        depth_texture: device.query_feature(DeviceFeature::DepthTexture),
        instanced_arrays: device.query_feature(DeviceFeature::InstancedArrays),
        multisample_render_targets: device
            .query_feature(DeviceFeature::MultisampleRenderTargets),
        anisotropic_filtering: device.query_feature(DeviceFeature::AnisotropicFiltering),
        needs_pot_textures: device.query_feature(DeviceFeature::RequiresPotTextures),
        texture_3d: device.query_feature(DeviceFeature::Texture3D),
    };

    engine_debug!(
        SOURCE,
        "Probed device: {} texture units, max texture size {}, POT-only: {}",
        caps.max_texture_image_units,
        caps.max_texture_size,
        caps.needs_pot_textures
    );

    caps
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "capabilities_tests.rs"]
mod tests;
