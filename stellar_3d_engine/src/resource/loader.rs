/// Texture loader descriptors and the generic raster decode fallback
///
/// Resource identifiers are dispatched by file extension against an ordered
/// list of loader descriptors (container-format decoders live outside the
/// core and plug in here). When no descriptor matches, the generic raster
/// decoder takes the URL. Descriptors carry pure predicates and plain
/// closures so dispatch is testable in isolation.

use rustc_hash::FxHashMap;

// ============================================================================
// Decoded payloads
// ============================================================================

/// Decoded 2D image, tightly packed RGBA8
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Decoded cube, six square RGBA8 faces in upload order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCube {
    pub size: u32,
    pub faces: Vec<Vec<u8>>,
}

/// Decode outcome; the error string feeds the `on_error` callback
pub type LoadResult<T> = std::result::Result<T, String>;

// ============================================================================
// Loader descriptors
// ============================================================================

pub type Decode2dFn = Box<dyn Fn(&str) -> LoadResult<DecodedImage>>;
pub type DecodeCubeFn = Box<dyn Fn(&str) -> LoadResult<DecodedCube>>;

/// One registered container-format loader
pub struct TextureLoaderDescriptor {
    /// Loader name for logging
    pub name: &'static str,
    /// Pure extension predicate; receives the lowercased extension
    pub matches: fn(extension: &str) -> bool,
    /// Optional URL rewrite applied before decode (quality variants etc.)
    pub rewrite_url: Option<fn(url: &str) -> String>,
    /// Loader-specific fallback URL tried when decode fails
    pub fallback_url: Option<fn(url: &str) -> String>,
    pub decode_2d: Option<Decode2dFn>,
    pub decode_cube: Option<DecodeCubeFn>,
}

impl std::fmt::Debug for TextureLoaderDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureLoaderDescriptor")
            .field("name", &self.name)
            .field("has_decode_2d", &self.decode_2d.is_some())
            .field("has_decode_cube", &self.decode_cube.is_some())
            .finish()
    }
}

/// Lowercased extension of a URL, query string stripped ("" when absent)
pub fn url_extension(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit_once('.') {
        Some((_, ext)) if !ext.contains('/') => ext.to_ascii_lowercase(),
        _ => String::new(),
    }
}

/// Ordered loader list with first-match-wins dispatch
#[derive(Debug, Default)]
pub struct LoaderRegistry {
    loaders: Vec<TextureLoaderDescriptor>,
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self { loaders: Vec::new() }
    }

    /// Append a loader; earlier registrations win on overlap
    pub fn register(&mut self, loader: TextureLoaderDescriptor) {
        self.loaders.push(loader);
    }

    /// First loader whose predicate accepts the URL's extension
    pub fn find(&self, url: &str) -> Option<&TextureLoaderDescriptor> {
        let extension = url_extension(url);
        self.loaders.iter().find(|l| (l.matches)(&extension))
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

// ============================================================================
// Generic raster fallback
// ============================================================================

/// Generic image decode path used when no loader descriptor matches
pub trait RasterDecoder {
    fn decode_2d(&self, url: &str) -> LoadResult<DecodedImage>;

    fn decode_cube(&self, _url: &str) -> LoadResult<DecodedCube> {
        Err("decoder does not support cube sources".to_string())
    }
}

/// In-memory raster decoder backed by preloaded images
///
/// Serves embedded assets and tests; hosts with real image decoding install
/// their own [`RasterDecoder`] instead.
#[derive(Debug, Default)]
pub struct MemoryRasterDecoder {
    images: FxHashMap<String, DecodedImage>,
    cubes: FxHashMap<String, DecodedCube>,
}

impl MemoryRasterDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_image(&mut self, url: impl Into<String>, image: DecodedImage) {
        self.images.insert(url.into(), image);
    }

    pub fn insert_cube(&mut self, url: impl Into<String>, cube: DecodedCube) {
        self.cubes.insert(url.into(), cube);
    }
}

impl RasterDecoder for MemoryRasterDecoder {
    fn decode_2d(&self, url: &str) -> LoadResult<DecodedImage> {
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| format!("no image registered for '{}'", url))
    }

    fn decode_cube(&self, url: &str) -> LoadResult<DecodedCube> {
        self.cubes
            .get(url)
            .cloned()
            .ok_or_else(|| format!("no cube registered for '{}'", url))
    }
}

// ============================================================================
// Pixel resampling
// ============================================================================

/// Nearest-neighbor resample of a tightly packed RGBA8 image
///
/// Used by power-of-two remediation when the decoded size can be remapped
/// on the CPU before upload.
pub fn resize_rgba_nearest(
    pixels: &[u8],
    width: u32,
    height: u32,
    new_width: u32,
    new_height: u32,
) -> Vec<u8> {
    if width == new_width && height == new_height {
        return pixels.to_vec();
    }

    let mut out = vec![0u8; (new_width * new_height * 4) as usize];
    for y in 0..new_height {
        let src_y = (y as u64 * height as u64 / new_height as u64) as u32;
        for x in 0..new_width {
            let src_x = (x as u64 * width as u64 / new_width as u64) as u32;
            let src = ((src_y * width + src_x) * 4) as usize;
            let dst = ((y * new_width + x) * 4) as usize;
            out[dst..dst + 4].copy_from_slice(&pixels[src..src + 4]);
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
