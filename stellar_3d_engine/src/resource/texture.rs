/// Texture records and sampling-parameter derivation

use crate::device::{
    ComparisonFunction, DeviceFramebuffer, DeviceRenderbuffer, DeviceTexture, MagFilter,
    MinFilter, PixelFormat, PixelType, RenderbufferFormat, SamplingMode, SamplingParameters,
};
use crate::resource::TextureId;

// ============================================================================
// Source kinds and retained data
// ============================================================================

/// Where a texture's contents came from
///
/// Determines the rebuild path taken after device loss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureSource {
    /// Decoded from a URL through the loader pipeline
    Url(String),
    /// Caller-supplied raw 2D pixels
    Raw,
    /// Caller-supplied raw 3D pixels
    Raw3D,
    /// Caller-supplied raw cube faces
    RawCube,
    /// Engine-allocated dynamic 2D storage
    Dynamic,
    /// Color attachment of a render target
    RenderTarget,
    /// One color attachment of a multi-render-target set
    MultiRenderTarget,
    /// Dedicated depth/stencil texture
    DepthStencil,
    /// Internal scratch texture (rescale passes)
    Temporary,
}

/// CPU-side copy of texture contents kept for device-loss rebuild
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetainedPixels {
    /// Nothing retained (render targets re-allocate empty storage)
    None,
    /// One 2D or 3D level
    Pixels(Vec<u8>),
    /// Six cube faces in upload order
    CubeFaces(Vec<Vec<u8>>),
}

// ============================================================================
// Texture record
// ============================================================================

/// Core-owned state of one GPU texture
#[derive(Debug)]
pub struct TextureRecord {
    pub source: TextureSource,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub format: PixelFormat,
    pub pixel_type: PixelType,
    pub sampling_mode: SamplingMode,
    pub generate_mipmaps: bool,
    pub invert_y: bool,
    pub is_cube: bool,
    pub is_3d: bool,
    pub is_ready: bool,
    pub samples: u32,
    pub comparison_function: Option<ComparisonFunction>,

    /// Device-side object, absent until population (or after device loss)
    pub device_texture: Option<DeviceTexture>,
    /// Primary framebuffer for render targets
    pub framebuffer: Option<DeviceFramebuffer>,
    /// Depth/stencil renderbuffer for render targets
    pub depth_stencil_buffer: Option<DeviceRenderbuffer>,
    /// Multisample side framebuffer (resolve source)
    pub msaa_framebuffer: Option<DeviceFramebuffer>,
    /// Multisample color renderbuffer
    pub msaa_color_buffer: Option<DeviceRenderbuffer>,
    /// Depth/stencil storage format of a render target, kept for rebuild
    pub depth_stencil_format: Option<RenderbufferFormat>,
    /// Sibling attachments of a multi-render-target set, on the record that
    /// owns the shared framebuffer
    pub mrt_attachments: Vec<TextureId>,

    /// Logical channel this texture currently occupies, if any
    pub associated_channel: Option<u32>,
    /// Retained CPU copy for rebuild
    pub retained: RetainedPixels,

    // Binding-order chain links (sentinel nodes included)
    pub chain_prev: Option<TextureId>,
    pub chain_next: Option<TextureId>,
    /// Chain sentinels are never bound or released
    pub is_chain_sentinel: bool,
}

impl TextureRecord {
    /// Blank not-ready 2D record; managers fill in the rest
    pub fn new(source: TextureSource) -> Self {
        Self {
            source,
            width: 0,
            height: 0,
            depth: 0,
            format: PixelFormat::Rgba,
            pixel_type: PixelType::UnsignedByte,
            sampling_mode: SamplingMode::Trilinear,
            generate_mipmaps: false,
            invert_y: false,
            is_cube: false,
            is_3d: false,
            is_ready: false,
            samples: 1,
            comparison_function: None,
            device_texture: None,
            framebuffer: None,
            depth_stencil_buffer: None,
            msaa_framebuffer: None,
            msaa_color_buffer: None,
            depth_stencil_format: None,
            mrt_attachments: Vec::new(),
            associated_channel: None,
            retained: RetainedPixels::None,
            chain_prev: None,
            chain_next: None,
            is_chain_sentinel: false,
        }
    }

    /// Record acting as a binding-chain sentinel
    pub fn sentinel() -> Self {
        let mut record = Self::new(TextureSource::Temporary);
        record.is_chain_sentinel = true;
        record
    }
}

// ============================================================================
// Sampling-parameter derivation
// ============================================================================

/// Map a logical sampling mode to device mag/min filters
///
/// `has_mipmaps` selects whether minification interpolates across mip levels;
/// textures without a mip chain must never request a mip-interpolating
/// filter.
pub fn sampling_parameters(mode: SamplingMode, has_mipmaps: bool) -> SamplingParameters {
    use MagFilter as Mag;
    use MinFilter as Min;

    let (mag, min) = match mode {
        SamplingMode::Trilinear => (
            Mag::Linear,
            if has_mipmaps { Min::LinearMipLinear } else { Min::Linear },
        ),
        SamplingMode::Bilinear => (
            Mag::Linear,
            if has_mipmaps { Min::LinearMipNearest } else { Min::Linear },
        ),
        SamplingMode::Nearest => (
            Mag::Nearest,
            if has_mipmaps { Min::NearestMipLinear } else { Min::Nearest },
        ),
        SamplingMode::NearestNearestMipNearest => (
            Mag::Nearest,
            if has_mipmaps { Min::NearestMipNearest } else { Min::Nearest },
        ),
        SamplingMode::NearestLinearMipNearest => (
            Mag::Nearest,
            if has_mipmaps { Min::LinearMipNearest } else { Min::Linear },
        ),
        SamplingMode::NearestLinearMipLinear => (
            Mag::Nearest,
            if has_mipmaps { Min::LinearMipLinear } else { Min::Linear },
        ),
        SamplingMode::NearestLinear => (Mag::Nearest, Min::Linear),
        SamplingMode::NearestNearest => (Mag::Nearest, Min::Nearest),
        SamplingMode::LinearNearestMipNearest => (
            Mag::Linear,
            if has_mipmaps { Min::NearestMipNearest } else { Min::Nearest },
        ),
        SamplingMode::LinearNearestMipLinear => (
            Mag::Linear,
            if has_mipmaps { Min::NearestMipLinear } else { Min::Nearest },
        ),
        SamplingMode::LinearLinear => (Mag::Linear, Min::Linear),
        SamplingMode::LinearNearest => (Mag::Linear, Min::Nearest),
    };

    SamplingParameters { mag, min }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
