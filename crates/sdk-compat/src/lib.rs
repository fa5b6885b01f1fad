//! Compile-only compatibility crate.
//!
//! This crate exists to ensure the public SDK surface remains usable by third-party
//! consumers. It is not shipped or run; it must only build.

use std::sync::Arc;

use pixconv_core::{ConvertError, ErrorKind, PixconvConfig};
use pixconv_format::{
    Caps, CapsStructure, GlApi, GlCapabilities, TargetMask, TextureTarget, VideoFormat,
    VideoInfo,
};
use pixconv_glow::{ColorConvert, GlContext, HeadlessContext};
use pixconv_shader::{fixate, fixate_caps, negotiate_caps, transform_caps, Candidate, ConversionPlan};

#[allow(dead_code)]
pub fn _compile_witness() {
    // Capability snapshots are plain data and constructible without a context.
    let caps = GlCapabilities::new(GlApi::Gl3, 3, 3, Vec::new());

    // Negotiation entry points stay callable with and without a context.
    let _formats = negotiate_caps(&[VideoFormat::Nv12], Some(&caps), true);
    let _open = negotiate_caps(&[VideoFormat::Rgba], None, false);

    let input = Caps::from_structure(CapsStructure::gl([VideoFormat::Nv12]));
    let transformed = transform_caps(Some(&caps), false, &input, None);
    let fixed = CapsStructure::gl([VideoFormat::Nv12]).with_targets(TargetMask::TEXTURE_2D);
    let _fixated = fixate_caps(&fixed, &transformed);

    let _best = fixate(
        VideoFormat::Rgba,
        TextureTarget::Texture2D,
        &[Candidate::new(VideoFormat::Bgra, TargetMask::all())],
    );

    // Planning is backend-agnostic.
    let in_info = VideoInfo::new(VideoFormat::I420, 640, 480);
    let out_info = VideoInfo::new(VideoFormat::Rgba, 640, 480);
    let _plan: Result<ConversionPlan, ConvertError> =
        ConversionPlan::build(&in_info, TextureTarget::Texture2D, &out_info, &[], &caps);

    // Sessions accept any context implementation.
    let session = ColorConvert::new(Arc::new(HeadlessContext::new(caps)));
    let _caps = session.context().capabilities();
    if let Err(e) = session.set_formats(
        &in_info,
        TextureTarget::Texture2D,
        &out_info,
        TextureTarget::Texture2D,
    ) {
        let _kind: ErrorKind = e.kind();
    }

    // Config stays constructible with explicit defaults.
    let _cfg = PixconvConfig::default();
}
