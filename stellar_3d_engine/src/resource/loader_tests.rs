//! Unit tests for loader.rs

use crate::resource::loader::{
    resize_rgba_nearest, url_extension, DecodedImage, LoaderRegistry, MemoryRasterDecoder,
    RasterDecoder, TextureLoaderDescriptor,
};

// ============================================================================
// EXTENSION TESTS
// ============================================================================

#[test]
fn test_url_extension() {
    assert_eq!(url_extension("scene/wood.png"), "png");
    assert_eq!(url_extension("SKY.ENV"), "env");
    assert_eq!(url_extension("texture.basis?v=3"), "basis");
    assert_eq!(url_extension("texture.ktx#frag"), "ktx");
    assert_eq!(url_extension("no_extension"), "");
    assert_eq!(url_extension("dir.with.dot/file"), "");
}

// ============================================================================
// REGISTRY DISPATCH TESTS
// ============================================================================

fn env_loader() -> TextureLoaderDescriptor {
    TextureLoaderDescriptor {
        name: "env",
        matches: |ext| ext == "env",
        rewrite_url: None,
        fallback_url: Some(|_| "fallback.env".to_string()),
        decode_2d: None,
        decode_cube: Some(Box::new(|_| Err("not wired in this test".to_string()))),
    }
}

fn dds_loader() -> TextureLoaderDescriptor {
    TextureLoaderDescriptor {
        name: "dds",
        matches: |ext| ext == "dds",
        rewrite_url: Some(|url| format!("{}.lowq", url)),
        fallback_url: None,
        decode_2d: Some(Box::new(|_| {
            Ok(DecodedImage {
                width: 1,
                height: 1,
                pixels: vec![0, 0, 0, 255],
            })
        })),
        decode_cube: None,
    }
}

#[test]
fn test_find_matches_by_extension() {
    let mut registry = LoaderRegistry::new();
    registry.register(env_loader());
    registry.register(dds_loader());

    assert_eq!(registry.find("sky.env").unwrap().name, "env");
    assert_eq!(registry.find("rock.dds").unwrap().name, "dds");
    assert!(registry.find("photo.png").is_none());
}

#[test]
fn test_first_match_wins() {
    let mut registry = LoaderRegistry::new();
    registry.register(TextureLoaderDescriptor {
        name: "first",
        matches: |ext| ext == "env",
        rewrite_url: None,
        fallback_url: None,
        decode_2d: None,
        decode_cube: None,
    });
    registry.register(env_loader());

    assert_eq!(registry.find("sky.env").unwrap().name, "first");
}

#[test]
fn test_rewrite_url_hook() {
    let loader = dds_loader();
    let rewritten = (loader.rewrite_url.unwrap())("rock.dds");
    assert_eq!(rewritten, "rock.dds.lowq");
}

// ============================================================================
// MEMORY DECODER TESTS
// ============================================================================

#[test]
fn test_memory_decoder_round_trip() {
    let mut decoder = MemoryRasterDecoder::new();
    let image = DecodedImage {
        width: 2,
        height: 1,
        pixels: vec![255, 0, 0, 255, 0, 255, 0, 255],
    };
    decoder.insert_image("red_green.png", image.clone());

    assert_eq!(decoder.decode_2d("red_green.png").unwrap(), image);
    assert!(decoder.decode_2d("missing.png").is_err());
}

#[test]
fn test_memory_decoder_cube_default_errs() {
    let decoder = MemoryRasterDecoder::new();
    assert!(decoder.decode_cube("sky.png").is_err());
}

// ============================================================================
// RESAMPLE TESTS
// ============================================================================

#[test]
fn test_resize_identity() {
    let pixels = vec![1, 2, 3, 4, 5, 6, 7, 8];
    let out = resize_rgba_nearest(&pixels, 2, 1, 2, 1);
    assert_eq!(out, pixels);
}

#[test]
fn test_resize_upscale_doubles_pixels() {
    // 1x1 red -> 2x2 all red
    let pixels = vec![255, 0, 0, 255];
    let out = resize_rgba_nearest(&pixels, 1, 1, 2, 2);
    assert_eq!(out.len(), 16);
    for chunk in out.chunks(4) {
        assert_eq!(chunk, &[255, 0, 0, 255]);
    }
}

#[test]
fn test_resize_downscale_samples_grid() {
    // 2x2 checker -> 1x1 takes the top-left sample
    let pixels = vec![
        10, 10, 10, 255, 20, 20, 20, 255, //
        30, 30, 30, 255, 40, 40, 40, 255,
    ];
    let out = resize_rgba_nearest(&pixels, 2, 2, 1, 1);
    assert_eq!(out, vec![10, 10, 10, 255]);
}
