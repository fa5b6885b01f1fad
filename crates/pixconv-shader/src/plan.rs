//! A fully resolved conversion: body, shader sources and uniform values.

use pixconv_core::ConvertError;
use pixconv_format::{GlCapabilities, TexFormat, TextureTarget, VideoFormat, VideoInfo};
use tracing::{debug, warn};

use crate::assemble::{assemble, ShaderSources};
use crate::body::{self, BodyRequest, BodySelection};
use crate::mangle::GlslVersion;
use crate::uniform::{Uniform, UniformValue};

/// Texture formats of every plane of `format` on a context.
pub fn plane_tex_formats(caps: &GlCapabilities, format: VideoFormat) -> Vec<TexFormat> {
    (0..format.info().n_planes())
        .filter_map(|plane| caps.plane_tex_format(format, plane))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionPlan {
    input: VideoFormat,
    output: VideoFormat,
    in_target: TextureTarget,
    in_tex_formats: Vec<TexFormat>,
    out_tex_formats: Vec<TexFormat>,
    selection: BodySelection,
    sources: ShaderSources,
}

impl ConversionPlan {
    /// Selects a body for `in_info -> out_info` and checks it against `caps`.
    ///
    /// `in_tex_formats` describes the planes actually handed in; when empty the context's
    /// default mapping is assumed.
    pub fn build(
        in_info: &VideoInfo,
        in_target: TextureTarget,
        out_info: &VideoInfo,
        in_tex_formats: &[TexFormat],
        caps: &GlCapabilities,
    ) -> Result<ConversionPlan, ConvertError> {
        let input = in_info.format;
        let output = out_info.format;

        let in_tex_formats = if in_tex_formats.is_empty() {
            plane_tex_formats(caps, input)
        } else {
            in_tex_formats.to_vec()
        };
        let out_tex_formats = plane_tex_formats(caps, output);

        let selection = body::select(&BodyRequest {
            input,
            output,
            in_tex_formats: &in_tex_formats,
            out_tex_formats: &out_tex_formats,
            in_colorimetry: in_info.colorimetry,
            out_colorimetry: out_info.colorimetry,
        })?;

        let incompatible = |reason: &str| {
            warn!("cannot convert {input} to {output}: {reason}");
            ConvertError::incompatible(input, output, reason)
        };

        if selection.out_planes > 1 && !caps.draw_buffers {
            return Err(incompatible(
                "conversion requires output to multiple draw buffers",
            ));
        }
        if caps.is_gles2_only() && matches!(output, VideoFormat::Yuy2 | VideoFormat::Uyvy) {
            return Err(incompatible(
                "conversion requires reading with an unsupported format",
            ));
        }
        if input.info().is_tiled()
            && !(caps.has_texel_fetch() && GlslVersion::select(caps, in_target).has_texel_fetch())
        {
            return Err(incompatible(
                "conversion requires texelFetch() function available since GLSL 1.30",
            ));
        }

        let sources = assemble(&selection, in_target, caps);
        debug!(
            "planned {input} ({in_target}) -> {output} with '{}' body, GLSL {}",
            selection.template.name, sources.glsl
        );

        Ok(ConversionPlan {
            input,
            output,
            in_target,
            in_tex_formats,
            out_tex_formats,
            selection,
            sources,
        })
    }

    pub fn input(&self) -> VideoFormat {
        self.input
    }

    pub fn output(&self) -> VideoFormat {
        self.output
    }

    pub fn in_target(&self) -> TextureTarget {
        self.in_target
    }

    pub fn selection(&self) -> &BodySelection {
        &self.selection
    }

    pub fn shaders(&self) -> &ShaderSources {
        &self.sources
    }

    pub fn out_planes(&self) -> usize {
        self.selection.out_planes
    }

    pub fn texture_names(&self) -> &[&'static str] {
        &self.selection.texture_names
    }

    pub fn in_tex_formats(&self) -> &[TexFormat] {
        &self.in_tex_formats
    }

    pub fn out_tex_formats(&self) -> &[TexFormat] {
        &self.out_tex_formats
    }

    /// Every uniform the program reads, except the per-plane `tex_scaleN`.
    pub fn uniforms(&self, in_info: &VideoInfo, in_target: TextureTarget) -> Vec<Uniform> {
        let sel = &self.selection;
        let mut out = Vec::new();

        if let Some(m) = sel.matrix {
            out.push(Uniform::new("offset", UniformValue::Vec3(m.offset)));
            out.push(Uniform::new("coeff1", UniformValue::Vec3(m.coeff1)));
            out.push(Uniform::new("coeff2", UniformValue::Vec3(m.coeff2)));
            out.push(Uniform::new("coeff3", UniformValue::Vec3(m.coeff3)));
        }

        for (unit, name) in sel.texture_names.iter().enumerate() {
            out.push(Uniform::new(*name, UniformValue::Int(unit as i32)));
        }

        let (width, height) = match (in_info.tiles(), in_info.format.info().tile) {
            (Some((tx, ty)), Some(tile)) => {
                ((tx * tile.luma.0) as f32, (ty * tile.luma.1) as f32)
            }
            _ => (in_info.width as f32, in_info.height as f32),
        };
        out.push(Uniform::new("width", UniformValue::Float(width)));
        out.push(Uniform::new("height", UniformValue::Float(height)));

        let (poffset_x, poffset_y) = if in_target == TextureTarget::Rectangle {
            (1.0, 1.0)
        } else {
            (1.0 / width.max(1.0), 1.0 / height.max(1.0))
        };
        out.push(Uniform::new("poffset_x", UniformValue::Float(poffset_x)));
        out.push(Uniform::new("poffset_y", UniformValue::Float(poffset_y)));

        if let Some(cs) = sel.chroma_sampling {
            out.push(Uniform::new("chroma_sampling", UniformValue::Vec2(cs)));
        }

        out.push(Uniform::new(
            "input_swizzle",
            UniformValue::IntArray(sel.input_swizzle.to_vec()),
        ));
        out.push(Uniform::new(
            "output_swizzle",
            UniformValue::IntArray(sel.output_swizzle.to_vec()),
        ));

        let declared = sel.template.uniforms;
        if declared.contains("in_bitdepth_factor") {
            out.push(Uniform::new(
                "in_bitdepth_factor",
                UniformValue::Float(sel.in_bitdepth_factor),
            ));
        }
        if declared.contains("out_bitdepth_factor") {
            out.push(Uniform::new(
                "out_bitdepth_factor",
                UniformValue::Float(sel.out_bitdepth_factor),
            ));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixconv_core::ErrorKind;
    use pixconv_format::GlApi;

    fn gl3() -> GlCapabilities {
        GlCapabilities::new(GlApi::Gl3, 3, 3, vec![])
    }

    fn value<'a>(uniforms: &'a [Uniform], name: &str) -> Option<&'a UniformValue> {
        uniforms.iter().find(|u| u.name == name).map(|u| &u.value)
    }

    #[test]
    fn planar_output_needs_draw_buffers() {
        let mut caps = gl3();
        caps.draw_buffers = false;
        let err = ConversionPlan::build(
            &VideoInfo::new(VideoFormat::Rgba, 4, 4),
            TextureTarget::Texture2D,
            &VideoInfo::new(VideoFormat::I420, 4, 4),
            &[],
            &caps,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleCapability);
        assert!(err.to_string().contains("multiple draw buffers"));
    }

    #[test]
    fn gles2_cannot_write_packed_422() {
        let caps = GlCapabilities::new(GlApi::Gles2, 2, 0, vec![]);
        let err = ConversionPlan::build(
            &VideoInfo::new(VideoFormat::Rgba, 4, 4),
            TextureTarget::Texture2D,
            &VideoInfo::new(VideoFormat::Yuy2, 4, 4),
            &[],
            &caps,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleCapability);
    }

    #[test]
    fn tiled_input_needs_texel_fetch() {
        let caps = GlCapabilities::new(GlApi::Gl, 2, 1, vec![]);
        let err = ConversionPlan::build(
            &VideoInfo::new(VideoFormat::Nv12_4L4, 8, 8),
            TextureTarget::Texture2D,
            &VideoInfo::new(VideoFormat::Rgba, 8, 8),
            &[],
            &caps,
        )
        .unwrap_err();
        assert!(err.to_string().contains("texelFetch"));
    }

    #[test]
    fn tiled_input_is_refused_on_compatibility_contexts() {
        let nv12_tiled = VideoInfo::new(VideoFormat::Nv12_16L32s, 64, 64);
        let rgba = VideoInfo::new(VideoFormat::Rgba, 64, 64);
        let t2d = TextureTarget::Texture2D;

        let compat = GlCapabilities::new(GlApi::Gl, 3, 0, vec![]);
        let err = ConversionPlan::build(&nv12_tiled, t2d, &rgba, &[], &compat).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleCapability);

        let plan = ConversionPlan::build(&nv12_tiled, t2d, &rgba, &[], &gl3()).unwrap();
        assert!(plan.shaders().fragment.contains("texelFetch"));
    }

    #[test]
    fn yuv_uniforms_carry_matrix_and_samplers() {
        let in_info = VideoInfo::new(VideoFormat::I420, 320, 240);
        let plan = ConversionPlan::build(
            &in_info,
            TextureTarget::Texture2D,
            &VideoInfo::new(VideoFormat::Rgba, 320, 240),
            &[],
            &gl3(),
        )
        .unwrap();
        assert_eq!(plan.in_tex_formats(), &[TexFormat::R8; 3]);
        let u = plan.uniforms(&in_info, TextureTarget::Texture2D);
        assert_eq!(
            value(&u, "coeff1"),
            Some(&UniformValue::Vec3([1.164, 0.000, 1.596]))
        );
        assert_eq!(value(&u, "Ytex"), Some(&UniformValue::Int(0)));
        assert_eq!(value(&u, "Vtex"), Some(&UniformValue::Int(2)));
        assert_eq!(value(&u, "poffset_x"), Some(&UniformValue::Float(1.0 / 320.0)));
        assert_eq!(value(&u, "in_bitdepth_factor"), Some(&UniformValue::Float(1.0)));
        assert_eq!(value(&u, "chroma_sampling"), None);
        assert_eq!(value(&u, "out_bitdepth_factor"), None);
    }

    #[test]
    fn rectangle_and_tiled_dimensions() {
        let rgba = VideoInfo::new(VideoFormat::Bgra, 16, 8);
        let plan = ConversionPlan::build(
            &rgba,
            TextureTarget::Rectangle,
            &VideoInfo::new(VideoFormat::Rgba, 16, 8),
            &[],
            &gl3(),
        )
        .unwrap();
        let u = plan.uniforms(&rgba, TextureTarget::Rectangle);
        assert_eq!(value(&u, "poffset_x"), Some(&UniformValue::Float(1.0)));
        assert_eq!(
            value(&u, "input_swizzle"),
            Some(&UniformValue::IntArray(vec![2, 1, 0, 3]))
        );

        let tiled = VideoInfo::new(VideoFormat::Nv12_16L32s, 20, 40);
        let plan = ConversionPlan::build(
            &tiled,
            TextureTarget::Texture2D,
            &VideoInfo::new(VideoFormat::Rgba, 20, 40),
            &[],
            &gl3(),
        )
        .unwrap();
        let u = plan.uniforms(&tiled, TextureTarget::Texture2D);
        assert_eq!(value(&u, "width"), Some(&UniformValue::Float(32.0)));
        assert_eq!(value(&u, "height"), Some(&UniformValue::Float(64.0)));
    }

    #[test]
    fn planar_yuv_output_uniforms() {
        let in_info = VideoInfo::new(VideoFormat::Rgba, 8, 8);
        let plan = ConversionPlan::build(
            &in_info,
            TextureTarget::Texture2D,
            &VideoInfo::new(VideoFormat::I420_10Le, 8, 8),
            &[],
            &gl3(),
        )
        .unwrap();
        assert_eq!(plan.out_planes(), 3);
        assert_eq!(plan.out_tex_formats(), &[TexFormat::R16; 3]);
        let u = plan.uniforms(&in_info, TextureTarget::Texture2D);
        assert_eq!(value(&u, "chroma_sampling"), Some(&UniformValue::Vec2([2.0, 2.0])));
        match value(&u, "out_bitdepth_factor") {
            Some(UniformValue::Float(f)) => assert!((f - 1023.0 / 65535.0).abs() < 1e-6),
            other => panic!("unexpected {other:?}"),
        }
    }
}
