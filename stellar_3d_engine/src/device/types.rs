/// Value types shared between the engine core and device backends.
///
/// These enums describe the raw command surface of a [`GraphicsDevice`]:
/// pixel formats, binding targets, primitive topologies, depth/stencil/blend
/// configuration and the opaque ids a backend hands out for its resources.
///
/// [`GraphicsDevice`]: crate::device::GraphicsDevice

use bitflags::bitflags;

// ============================================================================
// Opaque device resource ids
// ============================================================================

/// Opaque id of a backend texture object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceTexture(pub u64);

/// Opaque id of a backend buffer object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceBuffer(pub u64);

/// Opaque id of a backend compiled program object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceProgram(pub u64);

/// Opaque id of a backend framebuffer object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceFramebuffer(pub u64);

/// Opaque id of a backend renderbuffer object (depth/stencil or multisample)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceRenderbuffer(pub u64);

/// Backend-resolved uniform location within a compiled program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

// ============================================================================
// Pixel formats and sampling
// ============================================================================

/// Logical pixel component layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Alpha,
    Luminance,
    LuminanceAlpha,
    Rgb,
    Rgba,
    Red,
    Rg,
    DepthComponent,
    DepthStencil,
}

impl PixelFormat {
    /// Number of components per pixel
    pub fn component_count(&self) -> usize {
        match self {
            PixelFormat::Alpha | PixelFormat::Luminance | PixelFormat::Red => 1,
            PixelFormat::LuminanceAlpha | PixelFormat::Rg => 2,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
            PixelFormat::DepthComponent => 1,
            PixelFormat::DepthStencil => 2,
        }
    }
}

/// Per-component data type of uploaded pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelType {
    UnsignedByte,
    HalfFloat,
    Float,
    UnsignedInt,
}

impl PixelType {
    /// Size of one component in bytes
    pub fn component_size(&self) -> usize {
        match self {
            PixelType::UnsignedByte => 1,
            PixelType::HalfFloat => 2,
            PixelType::Float | PixelType::UnsignedInt => 4,
        }
    }
}

/// Logical sampling mode requested by callers
///
/// The first three are the common shorthand modes; the remaining variants
/// spell out the (mag, min, mip) combination explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplingMode {
    Nearest,
    Bilinear,
    Trilinear,
    NearestNearestMipNearest,
    NearestLinearMipNearest,
    NearestLinearMipLinear,
    NearestLinear,
    NearestNearest,
    LinearNearestMipNearest,
    LinearNearestMipLinear,
    LinearLinear,
    LinearNearest,
}

/// Magnification filter committed to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MagFilter {
    Nearest,
    Linear,
}

/// Minification filter committed to the device (including mip interpolation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MinFilter {
    Nearest,
    Linear,
    NearestMipNearest,
    NearestMipLinear,
    LinearMipNearest,
    LinearMipLinear,
}

/// Resolved (mag, min) filter pair for a sampling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingParameters {
    pub mag: MagFilter,
    pub min: MinFilter,
}

/// Binding target for texture commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    Texture2D,
    TextureCube,
    Texture3D,
}

/// One face of a cube texture, in attachment order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    /// All six faces in upload order
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// Face index (0..6)
    pub fn index(&self) -> usize {
        *self as usize
    }
}

// ============================================================================
// Buffers and draws
// ============================================================================

/// Binding target for buffer commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Array,
    ElementArray,
    Uniform,
}

/// Upload usage hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    Static,
    Dynamic,
}

/// Device primitive topology for draw commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

/// Logical fill mode requested by materials
///
/// `Triangle`, `Wireframe` and `Point` are the classic material views; the
/// explicit variants request a precise device topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillMode {
    Triangle,
    Wireframe,
    Point,
    PointList,
    LineList,
    LineLoop,
    LineStrip,
    TriangleStrip,
    TriangleFan,
}

// ============================================================================
// Depth / stencil / blend configuration
// ============================================================================

/// Comparison function for depth tests, stencil tests and shadow samplers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonFunction {
    Never,
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

/// Stencil operation applied on test outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilOperation {
    Keep,
    Zero,
    Replace,
    Increment,
    Decrement,
    IncrementWrap,
    DecrementWrap,
    Invert,
}

/// Blend factor for source/destination color and alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
    OneMinusDstColor,
    DstAlpha,
    OneMinusDstAlpha,
}

/// Blend equation for color and alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendEquation {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

bitflags! {
    /// Buffers affected by a clear command
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u8 {
        const COLOR = 0b001;
        const DEPTH = 0b010;
        const STENCIL = 0b100;
    }
}

// ============================================================================
// Queries
// ============================================================================

/// Numeric device limit queried by the capability probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceLimit {
    MaxTextureImageUnits,
    MaxCombinedTextureImageUnits,
    MaxVertexTextureImageUnits,
    MaxTextureSize,
    MaxCubemapTextureSize,
    MaxRenderTextureSize,
    MaxVertexAttribs,
    MaxVaryingVectors,
    MaxFragmentUniformVectors,
    MaxVertexUniformVectors,
    MaxAnisotropy,
    MaxMsaaSamples,
    MaxDrawBuffers,
}

/// Optional device feature queried by the capability probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceFeature {
    StandardDerivatives,
    UintIndices,
    FragmentDepth,
    HighPrecisionShader,
    TextureFloat,
    TextureFloatLinearFiltering,
    TextureFloatRender,
    TextureHalfFloat,
    TextureHalfFloatLinearFiltering,
    TextureHalfFloatRender,
    TextureLod,
    DrawBuffers,
    DepthTexture,
    InstancedArrays,
    MultisampleRenderTargets,
    AnisotropicFiltering,
    RequiresPotTextures,
    Texture3D,
}

/// Framebuffer attachment point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attachment {
    /// Color attachment at the given index (0 for single render targets)
    Color(u32),
    Depth,
    DepthStencil,
}

/// Storage format of a renderbuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderbufferFormat {
    Depth24,
    Depth24Stencil8,
    Rgba8,
}

// ============================================================================
// Viewport
// ============================================================================

/// Normalized viewport rectangle (each component in 0.0..1.0)
///
/// Converted to a pixel rectangle against the current render size when
/// committed to the device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Full-surface viewport
    pub fn full() -> Self {
        Self { x: 0.0, y: 0.0, width: 1.0, height: 1.0 }
    }
}
