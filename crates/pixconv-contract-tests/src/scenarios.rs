//! End-to-end conversions checked at the plan level.

use std::sync::Arc;

use pixconv_core::ErrorKind;
use pixconv_format::{
    Colorimetry, GlApi, GlCapabilities, TargetMask, TexFormat, TextureTarget, VideoFormat,
    VideoInfo,
};
use pixconv_glow::{ColorConvert, HeadlessContext};
use pixconv_shader::swizzle::compose_gray16;
use pixconv_shader::{fixate, Candidate, ConversionPlan, UniformValue};

const T2D: TextureTarget = TextureTarget::Texture2D;

fn gl3() -> GlCapabilities {
    GlCapabilities::new(GlApi::Gl3, 3, 3, vec![])
}

fn plan(input: &VideoInfo, output: &VideoInfo) -> ConversionPlan {
    ConversionPlan::build(input, T2D, output, &[], &gl3())
        .unwrap_or_else(|e| panic!("{} -> {}: {e}", input.format, output.format))
}

fn uniform(plan: &ConversionPlan, info: &VideoInfo, name: &str) -> UniformValue {
    plan.uniforms(info, T2D)
        .into_iter()
        .find(|u| u.name == name)
        .map(|u| u.value)
        .unwrap_or_else(|| panic!("uniform {name} missing"))
}

#[test]
fn rgba_to_bgra_is_a_cheap_reorder() {
    let fx = fixate(
        VideoFormat::Rgba,
        TargetMask::TEXTURE_2D,
        &[Candidate::new(VideoFormat::Bgra, TargetMask::TEXTURE_2D)],
    )
    .expect("fixates");
    assert_eq!((fx.format, fx.target, fx.loss), (VideoFormat::Bgra, T2D, 1));

    let input = VideoInfo::new(VideoFormat::Rgba, 64, 64);
    let p = plan(&input, &VideoInfo::new(VideoFormat::Bgra, 64, 64));
    assert_eq!(p.selection().template.name, "reorder");
    assert_eq!(p.selection().output_swizzle, [2, 1, 0, 3]);
    assert!(p.selection().matrix.is_none());
    assert_eq!(p.out_planes(), 1);
    assert!(p.shaders().fragment.contains("texture(tex, texcoord * tex_scale0)"));
}

#[test]
fn i420_to_rgba_samples_three_planes_with_bt601() {
    let input = VideoInfo::new(VideoFormat::I420, 640, 480);
    assert_eq!(input.colorimetry, Colorimetry::Bt601);
    let p = plan(&input, &VideoInfo::new(VideoFormat::Rgba, 640, 480));

    assert_eq!(p.texture_names(), ["Ytex", "Utex", "Vtex"]);
    for (unit, name) in p.texture_names().iter().enumerate() {
        assert_eq!(uniform(&p, &input, name), UniformValue::Int(unit as i32));
    }
    assert!(p.selection().body.contains("yuva.a = 1.0;"));
    assert_eq!(
        uniform(&p, &input, "coeff1"),
        UniformValue::Vec3([1.164, 0.000, 1.596])
    );
    assert_eq!(
        uniform(&p, &input, "offset"),
        UniformValue::Vec3([-0.0625, -0.5, -0.5])
    );
}

#[test]
fn rgba_prefers_444_over_420() {
    for candidates in [
        [VideoFormat::I420, VideoFormat::Y444],
        [VideoFormat::Y444, VideoFormat::I420],
    ] {
        let candidates: Vec<_> = candidates
            .iter()
            .map(|f| Candidate::new(*f, TargetMask::TEXTURE_2D))
            .collect();
        let fx = fixate(VideoFormat::Rgba, TargetMask::TEXTURE_2D, &candidates).expect("fixates");
        assert_eq!(fx.format, VideoFormat::Y444);
    }
}

#[test]
fn hd_nv12_uses_two_component_chroma_and_bt709() {
    let input = VideoInfo::new(VideoFormat::Nv12, 1920, 1080);
    assert_eq!(input.colorimetry, Colorimetry::Bt709);
    let p = plan(&input, &VideoInfo::new(VideoFormat::Rgba, 1920, 1080));

    assert_eq!(p.in_tex_formats(), [TexFormat::R8, TexFormat::Rg8]);
    assert!(p
        .shaders()
        .fragment
        .contains("texture(UVtex, texcoord * tex_scale1).rg;"));
    assert_eq!(
        uniform(&p, &input, "coeff1"),
        UniformValue::Vec3([1.164, 0.000, 1.787])
    );
    assert_eq!(
        uniform(&p, &input, "coeff2"),
        UniformValue::Vec3([1.164, -0.213, -0.531])
    );
}

#[test]
fn planar_output_without_draw_buffers_fails_set_formats() {
    let caps = GlCapabilities::new(GlApi::Gles2, 2, 0, vec![]);
    assert!(!caps.draw_buffers);
    let session = ColorConvert::new(Arc::new(HeadlessContext::new(caps)));

    let err = session
        .set_formats(
            &VideoInfo::new(VideoFormat::Rgba, 320, 240),
            T2D,
            &VideoInfo::new(VideoFormat::I420, 320, 240),
            T2D,
        )
        .expect_err("I420 output needs three draw buffers");
    assert_eq!(err.kind(), ErrorKind::IncompatibleCapability);
    assert!(
        err.to_string().to_lowercase().contains("draw buffers"),
        "unexpected err: {err}"
    );
    assert!(session.plan().is_none());
    assert!(!session.is_passthrough());
}

#[test]
fn gray16_endianness_swaps_the_compose_swizzle() {
    let le_in = VideoInfo::new(VideoFormat::Gray16Le, 32, 32);
    let be_in = VideoInfo::new(VideoFormat::Gray16Be, 32, 32);
    let out = VideoInfo::new(VideoFormat::Rgba, 32, 32);
    let le = plan(&le_in, &out);
    let be = plan(&be_in, &out);

    for p in [&le, &be] {
        assert_eq!(p.selection().template.name, "compose");
        assert!(p
            .shaders()
            .fragment
            .contains("const vec2 compose_weight = vec2(0.996109, 0.003891);"));
    }

    let le_swizzle = le.selection().input_swizzle;
    let be_swizzle = be.selection().input_swizzle;
    assert_eq!(le_swizzle[..2], [1, 0]);
    assert_eq!(be_swizzle[..2], [0, 1]);

    // 0x1234 stored little endian as (0x34, 0x12).
    let texel = [0x34 as f32 / 255.0, 0x12 as f32 / 255.0, 0.0, 1.0];
    let v = compose_gray16(texel, le_swizzle) * 65535.0;
    assert!((v - 0x1234 as f32).abs() < 1.0, "got {v}");
}
