//! Unit tests for texture.rs

use crate::device::{MagFilter, MinFilter, SamplingMode};
use crate::resource::texture::{
    sampling_parameters, RetainedPixels, TextureRecord, TextureSource,
};

// ============================================================================
// RECORD TESTS
// ============================================================================

#[test]
fn test_new_record_is_not_ready() {
    let record = TextureRecord::new(TextureSource::Raw);
    assert!(!record.is_ready);
    assert!(record.device_texture.is_none());
    assert!(record.associated_channel.is_none());
    assert_eq!(record.retained, RetainedPixels::None);
    assert!(!record.is_chain_sentinel);
}

#[test]
fn test_sentinel_record() {
    let record = TextureRecord::sentinel();
    assert!(record.is_chain_sentinel);
    assert!(record.chain_prev.is_none());
    assert!(record.chain_next.is_none());
}

#[test]
fn test_source_kinds_compare() {
    assert_eq!(
        TextureSource::Url("a.png".to_string()),
        TextureSource::Url("a.png".to_string())
    );
    assert_ne!(TextureSource::Raw, TextureSource::RawCube);
}

// ============================================================================
// SAMPLING TABLE TESTS
// ============================================================================

#[test]
fn test_trilinear_with_mipmaps() {
    let params = sampling_parameters(SamplingMode::Trilinear, true);
    assert_eq!(params.mag, MagFilter::Linear);
    assert_eq!(params.min, MinFilter::LinearMipLinear);
}

#[test]
fn test_trilinear_without_mipmaps() {
    let params = sampling_parameters(SamplingMode::Trilinear, false);
    assert_eq!(params.mag, MagFilter::Linear);
    assert_eq!(params.min, MinFilter::Linear);
}

#[test]
fn test_bilinear() {
    let params = sampling_parameters(SamplingMode::Bilinear, true);
    assert_eq!(params.mag, MagFilter::Linear);
    assert_eq!(params.min, MinFilter::LinearMipNearest);

    let params = sampling_parameters(SamplingMode::Bilinear, false);
    assert_eq!(params.min, MinFilter::Linear);
}

#[test]
fn test_nearest() {
    let params = sampling_parameters(SamplingMode::Nearest, true);
    assert_eq!(params.mag, MagFilter::Nearest);
    assert_eq!(params.min, MinFilter::NearestMipLinear);

    let params = sampling_parameters(SamplingMode::Nearest, false);
    assert_eq!(params.min, MinFilter::Nearest);
}

#[test]
fn test_explicit_combinations() {
    let params = sampling_parameters(SamplingMode::NearestLinear, true);
    assert_eq!(params.mag, MagFilter::Nearest);
    assert_eq!(params.min, MinFilter::Linear);

    let params = sampling_parameters(SamplingMode::LinearNearest, true);
    assert_eq!(params.mag, MagFilter::Linear);
    assert_eq!(params.min, MinFilter::Nearest);

    let params = sampling_parameters(SamplingMode::LinearNearestMipLinear, true);
    assert_eq!(params.mag, MagFilter::Linear);
    assert_eq!(params.min, MinFilter::NearestMipLinear);

    let params = sampling_parameters(SamplingMode::NearestNearestMipNearest, true);
    assert_eq!(params.mag, MagFilter::Nearest);
    assert_eq!(params.min, MinFilter::NearestMipNearest);
}

#[test]
fn test_no_mip_filter_without_mipmaps() {
    // Every mode must avoid mip-interpolating filters when mips are absent
    for mode in [
        SamplingMode::Nearest,
        SamplingMode::Bilinear,
        SamplingMode::Trilinear,
        SamplingMode::NearestNearestMipNearest,
        SamplingMode::NearestLinearMipNearest,
        SamplingMode::NearestLinearMipLinear,
        SamplingMode::NearestLinear,
        SamplingMode::NearestNearest,
        SamplingMode::LinearNearestMipNearest,
        SamplingMode::LinearNearestMipLinear,
        SamplingMode::LinearLinear,
        SamplingMode::LinearNearest,
    ] {
        let params = sampling_parameters(mode, false);
        assert!(
            matches!(params.min, MinFilter::Nearest | MinFilter::Linear),
            "mode {:?} requested mip filter {:?} without mipmaps",
            mode,
            params.min
        );
    }
}
