//! Fragment body selection.
//!
//! A flat table keyed by (input class, input layout, output class, output layout). Each row
//! points at a builder that binds swizzles, sampler names, chroma sampling and alpha handling
//! for the concrete formats.

use pixconv_core::ConvertError;
use pixconv_format::{
    Colorimetry, FormatClass, FormatFlags, PlaneLayout, TexFormat, VideoFormat,
};

use crate::color_matrix::{self, ColorMatrix, MatrixDirection};
use crate::swizzle::{self, Swizzle};
use crate::templates::{self as t, fill, two_channel_store, ShaderTemplate};

use VideoFormat as V;

/// Everything body selection looks at.
#[derive(Debug, Clone, Copy)]
pub struct BodyRequest<'a> {
    pub input: VideoFormat,
    pub output: VideoFormat,
    /// Texture formats the input planes are stored in.
    pub in_tex_formats: &'a [TexFormat],
    /// Texture formats the output planes will be rendered into.
    pub out_tex_formats: &'a [TexFormat],
    pub in_colorimetry: Colorimetry,
    pub out_colorimetry: Colorimetry,
}

impl BodyRequest<'_> {
    fn in_tex(&self, plane: usize) -> Option<TexFormat> {
        self.in_tex_formats.get(plane).copied()
    }

    fn out_tex(&self, plane: usize) -> Option<TexFormat> {
        self.out_tex_formats.get(plane).copied()
    }
}

/// A selected and bound fragment body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodySelection {
    pub template: &'static ShaderTemplate,
    pub body: String,
    /// Sampler names, in texture-unit order.
    pub texture_names: Vec<&'static str>,
    pub input_swizzle: Swizzle,
    pub output_swizzle: Swizzle,
    pub out_planes: usize,
    pub chroma_sampling: Option<[f32; 2]>,
    pub in_bitdepth_factor: f32,
    pub out_bitdepth_factor: f32,
    pub matrix: Option<&'static ColorMatrix>,
}

impl BodySelection {
    fn new(template: &'static ShaderTemplate, body: String, req: &BodyRequest<'_>) -> Self {
        let (input_swizzle, output_swizzle) = swizzle::calculate(req.input, req.output);
        Self {
            template,
            body,
            texture_names: vec!["tex"],
            input_swizzle,
            output_swizzle,
            out_planes: req.output.info().n_planes(),
            chroma_sampling: None,
            in_bitdepth_factor: 1.0,
            out_bitdepth_factor: 1.0,
            matrix: None,
        }
    }

    fn textures(mut self, names: &[&'static str]) -> Self {
        self.texture_names = names.to_vec();
        self
    }
}

type Builder = fn(&BodyRequest<'_>) -> Option<BodySelection>;

#[derive(Debug)]
struct BodyRow {
    input: (FormatClass, &'static [PlaneLayout]),
    output: (FormatClass, &'static [PlaneLayout]),
    build: Builder,
}

use FormatClass::{Gray, Rgb, Yuv};
use PlaneLayout::{Packed, PackedSubsampled, Planar, SemiPlanar, Tiled};

const PACKED: &[PlaneLayout] = &[Packed];
const PLANAR: &[PlaneLayout] = &[Planar];
const ANY_RGB: &[PlaneLayout] = &[Packed, Planar];

static ROWS: &[BodyRow] = &[
    BodyRow { input: (Rgb, PACKED), output: (Rgb, PACKED), build: packed_rgb_to_packed_rgb },
    BodyRow { input: (Rgb, PACKED), output: (Rgb, PLANAR), build: packed_rgb_to_planar_rgb },
    BodyRow { input: (Rgb, PLANAR), output: (Rgb, ANY_RGB), build: planar_rgb_to_rgb },
    BodyRow { input: (Yuv, PACKED), output: (Rgb, ANY_RGB), build: ayuv_to_rgb },
    BodyRow { input: (Yuv, PLANAR), output: (Rgb, ANY_RGB), build: planar_yuv_to_rgb },
    BodyRow { input: (Yuv, &[SemiPlanar]), output: (Rgb, ANY_RGB), build: semi_planar_to_rgb },
    BodyRow { input: (Yuv, &[PackedSubsampled]), output: (Rgb, ANY_RGB), build: yuy2_uyvy_to_rgb },
    BodyRow { input: (Yuv, &[Tiled]), output: (Rgb, ANY_RGB), build: tiled_to_rgb },
    BodyRow { input: (Rgb, PACKED), output: (Yuv, PACKED), build: rgb_to_ayuv },
    BodyRow { input: (Rgb, PACKED), output: (Yuv, PLANAR), build: rgb_to_planar_yuv },
    BodyRow { input: (Rgb, PACKED), output: (Yuv, &[SemiPlanar]), build: rgb_to_semi_planar },
    BodyRow { input: (Rgb, PACKED), output: (Yuv, &[PackedSubsampled]), build: rgb_to_yuy2_uyvy },
    BodyRow { input: (Rgb, PACKED), output: (Gray, PACKED), build: rgb_to_gray },
    BodyRow { input: (Gray, PACKED), output: (Rgb, ANY_RGB), build: gray_to_rgb },
];

/// Selects and binds the body converting `req.input` into `req.output`.
pub fn select(req: &BodyRequest<'_>) -> Result<BodySelection, ConvertError> {
    let unsupported = || ConvertError::unsupported(req.input.name(), req.output.name());
    let in_info = req.input.info();
    let out_info = req.output.info();

    if in_info.flags.contains(FormatFlags::PALETTE) || out_info.flags.contains(FormatFlags::PALETTE)
    {
        return Err(unsupported());
    }

    let row = ROWS
        .iter()
        .find(|row| {
            row.input.0 == in_info.class()
                && row.input.1.contains(&in_info.layout)
                && row.output.0 == out_info.class()
                && row.output.1.contains(&out_info.layout)
        })
        .ok_or_else(unsupported)?;

    (row.build)(req).ok_or_else(unsupported)
}

// -------------------------------------------------------------------------------------------------
// Shared pieces
// -------------------------------------------------------------------------------------------------

/// Formats whose fourth byte is padding.
pub fn is_rgbx(format: VideoFormat) -> bool {
    matches!(format, V::Rgbx | V::Bgrx | V::Xrgb | V::Xbgr)
}

fn luminance_alpha(tex: Option<TexFormat>) -> bool {
    tex == Some(TexFormat::LuminanceAlpha)
}

/// Second channel of a two-component texture.
fn second_channel(tex: Option<TexFormat>) -> char {
    if luminance_alpha(tex) {
        'a'
    } else {
        'g'
    }
}

/// Store of canonical `rgba` into an RGB output, packed or planar.
fn rgb_tail(output: VideoFormat) -> String {
    let info = output.info();
    if info.layout == Planar {
        let alpha = if info.has_alpha() {
            "gl_FragData[3] = vec4(rgba.a, 0, 0, 1.0);"
        } else {
            ""
        };
        fill(t::PLANAR_RGB_TAIL, &[("alpha", alpha)])
    } else {
        t::PACKED_RGB_TAIL.to_string()
    }
}

fn from_yuv(mut sel: BodySelection, req: &BodyRequest<'_>) -> BodySelection {
    sel.matrix = Some(color_matrix::select(req.in_colorimetry, MatrixDirection::YuvToRgb));
    sel
}

fn to_yuv(mut sel: BodySelection, req: &BodyRequest<'_>) -> BodySelection {
    sel.matrix = Some(color_matrix::select(req.out_colorimetry, MatrixDirection::RgbToYuv));
    sel
}

fn round_up_8(bits: u32) -> u32 {
    (bits + 7) & !7
}

/// Scale from a `bits`-in-container sample to the full container range.
pub fn bitdepth_factor(bits: u32) -> f32 {
    let container = round_up_8(bits);
    (((1u64 << container) - 1) as f64 / ((1u64 << bits) - 1) as f64) as f32
}

fn source_alpha(input: VideoFormat) -> &'static str {
    if is_rgbx(input) {
        "1.0"
    } else {
        "texel.a"
    }
}

// -------------------------------------------------------------------------------------------------
// RGB -> RGB
// -------------------------------------------------------------------------------------------------

fn packed_rgb_to_packed_rgb(req: &BodyRequest<'_>) -> Option<BodySelection> {
    let body = if is_rgbx(req.input) {
        t::REORDER_OVERWRITE_ALPHA_BODY
    } else {
        t::REORDER_BODY
    };
    Some(BodySelection::new(&t::REORDER, body.to_string(), req))
}

fn packed_rgb_to_planar_rgb(req: &BodyRequest<'_>) -> Option<BodySelection> {
    let fetch = if is_rgbx(req.input) {
        t::PACKED_RGB_FETCH_OVERWRITE_ALPHA
    } else {
        t::PACKED_RGB_FETCH
    };
    let body = format!("{fetch}{}", rgb_tail(req.output));
    Some(BodySelection::new(&t::REORDER, body, req))
}

fn planar_rgb_to_rgb(req: &BodyRequest<'_>) -> Option<BodySelection> {
    let has_alpha = req.input.info().has_alpha();
    let alpha = if has_alpha {
        "rgba.a = texture2D(Atex, texcoord * tex_scale3).r;"
    } else {
        "rgba.a = 1.0;"
    };
    let body = format!(
        "{}{}",
        fill(t::PLANAR_RGB_FETCH, &[("alpha", alpha)]),
        rgb_tail(req.output)
    );
    let names: &[&'static str] = if has_alpha {
        &["Rtex", "Gtex", "Btex", "Atex"]
    } else {
        &["Rtex", "Gtex", "Btex"]
    };
    Some(BodySelection::new(&t::PLANAR_RGB_TO_RGB, body, req).textures(names))
}

// -------------------------------------------------------------------------------------------------
// YUV -> RGB
// -------------------------------------------------------------------------------------------------

fn ayuv_to_rgb(req: &BodyRequest<'_>) -> Option<BodySelection> {
    let body = format!("{}{}", t::AYUV_FETCH, rgb_tail(req.output));
    Some(from_yuv(BodySelection::new(&t::AYUV_TO_RGB, body, req), req))
}

fn planar_yuv_to_rgb(req: &BodyRequest<'_>) -> Option<BodySelection> {
    let info = req.input.info();
    let (template, alpha, names): (_, _, &[&'static str]) = if info.has_alpha() {
        (
            &t::A420_TO_RGB,
            "yuva.a = texture2D(Atex, texcoord * tex_scale3).r;",
            &["Ytex", "Utex", "Vtex", "Atex"],
        )
    } else {
        (&t::PLANAR_YUV_TO_RGB, "yuva.a = 1.0;", &["Ytex", "Utex", "Vtex"])
    };
    let body = format!(
        "{}{}",
        fill(t::PLANAR_YUV_FETCH, &[("alpha", alpha)]),
        rgb_tail(req.output)
    );
    let mut sel = BodySelection::new(template, body, req).textures(names);
    sel.in_bitdepth_factor = bitdepth_factor(info.bits);
    Some(from_yuv(sel, req))
}

fn semi_planar_to_rgb(req: &BodyRequest<'_>) -> Option<BodySelection> {
    let info = req.input.info();
    let uv = second_channel(req.in_tex(1)).to_string();
    let (template, alpha, names): (_, _, &[&'static str]) = if info.has_alpha() {
        (
            &t::AV12_TO_RGB,
            "yuva.a = texture2D(Atex, texcoord * tex_scale2).r;",
            &["Ytex", "UVtex", "Atex"],
        )
    } else {
        (&t::SEMI_PLANAR_TO_RGB, "yuva.a = 1.0;", &["Ytex", "UVtex"])
    };
    let body = format!(
        "{}{}",
        fill(t::SEMI_PLANAR_FETCH, &[("uv", uv.as_str()), ("alpha", alpha)]),
        rgb_tail(req.output)
    );
    Some(from_yuv(BodySelection::new(template, body, req).textures(names), req))
}

fn yuy2_uyvy_to_rgb(req: &BodyRequest<'_>) -> Option<BodySelection> {
    let second = second_channel(req.in_tex(0));
    // (luma, first uv, second uv, u, v)
    let chars = match req.input {
        V::Yuy2 => ('r', second, second, 'g', 'a'),
        V::Uyvy => (second, 'g', 'g', 'r', 'b'),
        V::Y210 | V::Y212Le => ('r', 'g', 'g', 'g', 'a'),
        _ => return None,
    };
    let (y, uv1, uv2, u, v) = (
        chars.0.to_string(),
        chars.1.to_string(),
        chars.2.to_string(),
        chars.3.to_string(),
        chars.4.to_string(),
    );
    let fetch = fill(
        t::YUY2_UYVY_FETCH,
        &[
            ("y", y.as_str()),
            ("uv1", uv1.as_str()),
            ("uv2", uv2.as_str()),
            ("u", u.as_str()),
            ("v", v.as_str()),
        ],
    );
    let body = format!("{fetch}{}", rgb_tail(req.output));
    Some(from_yuv(
        BodySelection::new(&t::YUY2_UYVY_TO_RGB, body, req).textures(&["Ytex"]),
        req,
    ))
}

fn tiled_to_rgb(req: &BodyRequest<'_>) -> Option<BodySelection> {
    let tile = req.input.info().tile?;
    let v = second_channel(req.in_tex(1)).to_string();
    let dims = [
        tile.luma.0.to_string(),
        tile.luma.1.to_string(),
        tile.chroma.0.to_string(),
        tile.chroma.1.to_string(),
    ];
    let fetch = fill(
        t::TILED_SEMI_PLANAR_FETCH,
        &[
            ("luma_w", dims[0].as_str()),
            ("luma_h", dims[1].as_str()),
            ("chroma_w", dims[2].as_str()),
            ("chroma_h", dims[3].as_str()),
            ("u", "r"),
            ("v", v.as_str()),
        ],
    );
    let body = format!("{fetch}{}", rgb_tail(req.output));
    Some(from_yuv(
        BodySelection::new(&t::TILED_SEMI_PLANAR_TO_RGB, body, req).textures(&["Ytex", "UVtex"]),
        req,
    ))
}

// -------------------------------------------------------------------------------------------------
// RGB -> YUV
// -------------------------------------------------------------------------------------------------

fn rgb_to_ayuv(req: &BodyRequest<'_>) -> Option<BodySelection> {
    let body = fill(t::RGB_TO_AYUV_BODY, &[("alpha", source_alpha(req.input))]);
    Some(to_yuv(BodySelection::new(&t::RGB_TO_AYUV, body, req), req))
}

fn rgb_to_planar_yuv(req: &BodyRequest<'_>) -> Option<BodySelection> {
    let info = req.output.info();
    let alpha = if info.has_alpha() {
        "gl_FragData[3] = vec4(yuva.a, 0.0, 0.0, 1.0);"
    } else {
        ""
    };
    let body = fill(
        t::RGB_TO_PLANAR_YUV_BODY,
        &[("alpha", alpha), ("alpha_value", source_alpha(req.input))],
    );
    let mut sel = BodySelection::new(&t::RGB_TO_PLANAR_YUV, body, req);
    sel.chroma_sampling = Some([info.chroma_factor_w() as f32, info.chroma_factor_h() as f32]);
    sel.out_bitdepth_factor = 1.0 / bitdepth_factor(info.bits);
    Some(to_yuv(sel, req))
}

fn rgb_to_semi_planar(req: &BodyRequest<'_>) -> Option<BodySelection> {
    let info = req.output.info();
    let la = luminance_alpha(req.out_tex(1));
    let luma = "vec4(yuva.x, 0.0, 0.0, 1.0)";
    let chroma = two_channel_store("yuva.y", "yuva.z", la);
    let alpha = if info.has_alpha() {
        "gl_FragData[2] = vec4(yuva.a, 0.0, 0.0, 1.0);"
    } else {
        ""
    };
    let body = fill(
        t::RGB_TO_SEMI_PLANAR_YUV_BODY,
        &[
            ("luma", luma),
            ("chroma", chroma.as_str()),
            ("alpha", alpha),
            ("alpha_value", source_alpha(req.input)),
        ],
    );
    let mut sel = BodySelection::new(&t::RGB_TO_SEMI_PLANAR_YUV, body, req);
    sel.chroma_sampling = Some([info.chroma_factor_w() as f32, info.chroma_factor_h() as f32]);
    Some(to_yuv(sel, req))
}

fn rgb_to_yuy2_uyvy(req: &BodyRequest<'_>) -> Option<BodySelection> {
    let la = luminance_alpha(req.out_tex(0));
    // components written on even and odd pixels
    let (even, odd) = match req.output {
        V::Yuy2 | V::Y210 | V::Y212Le => (("yuv.x", "yuv.y"), ("yuv.x", "yuv.z")),
        V::Uyvy => (("yuv.y", "yuv.x"), ("yuv.z", "yuv.x")),
        _ => return None,
    };
    let even = two_channel_store(even.0, even.1, la);
    let odd = two_channel_store(odd.0, odd.1, la);
    let body = fill(t::RGB_TO_YUY2_UYVY_BODY, &[("even", even.as_str()), ("odd", odd.as_str())]);
    Some(to_yuv(BodySelection::new(&t::RGB_TO_YUY2_UYVY, body, req), req))
}

// -------------------------------------------------------------------------------------------------
// GRAY
// -------------------------------------------------------------------------------------------------

fn rgb_to_gray(req: &BodyRequest<'_>) -> Option<BodySelection> {
    let out_tex = req.out_tex(0).unwrap_or(TexFormat::R8);
    let (input_swizzle, _) = swizzle::calculate(req.input, V::Rgba);
    let body = match req.output {
        V::Gray8 if is_rgbx(req.input) => t::REORDER_OVERWRITE_ALPHA_BODY.to_string(),
        V::Gray8 => t::REORDER_BODY.to_string(),
        V::Gray16Le | V::Gray16Be => t::RGB_TO_GRAY16_BODY.to_string(),
        _ => return None,
    };
    let mut sel = BodySelection::new(&t::REORDER, body, req);
    sel.input_swizzle = input_swizzle;
    sel.output_swizzle = swizzle::gray_output_swizzle(req.output, out_tex);
    Some(sel)
}

fn gray_to_rgb(req: &BodyRequest<'_>) -> Option<BodySelection> {
    let in_tex = req.in_tex(0).unwrap_or(TexFormat::R8);
    let (_, output_swizzle) = swizzle::calculate(V::Rgba, req.output);
    let (template, fetch) = match req.input {
        V::Gray8 => (&t::REORDER, t::GRAY_FETCH),
        V::Gray16Le | V::Gray16Be => (&t::COMPOSE, t::COMPOSE_FETCH),
        _ => return None,
    };
    let body = format!("{fetch}{}", rgb_tail(req.output));
    let mut sel = BodySelection::new(template, body, req);
    sel.input_swizzle = swizzle::gray_input_swizzle(req.input, in_tex);
    sel.output_swizzle = output_swizzle;
    Some(sel)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(input: VideoFormat, output: VideoFormat) -> BodyRequest<'static> {
        BodyRequest {
            input,
            output,
            in_tex_formats: &[],
            out_tex_formats: &[],
            in_colorimetry: Colorimetry::Bt601,
            out_colorimetry: Colorimetry::Bt601,
        }
    }

    #[test]
    fn rgbx_input_overwrites_alpha() {
        let sel = select(&request(V::Xrgb, V::Rgba)).unwrap();
        assert!(sel.body.contains("t.a = 1.0;"));
        let sel = select(&request(V::Argb, V::Rgba)).unwrap();
        assert!(!sel.body.contains("t.a = 1.0;"));
        assert_eq!(sel.template.name, "reorder");
    }

    #[test]
    fn planar_rgb_output_writes_each_plane() {
        let sel = select(&request(V::Rgba, V::Gbra)).unwrap();
        assert_eq!(sel.out_planes, 4);
        assert!(sel.body.contains("gl_FragData[2]"));
        assert!(sel.body.contains("gl_FragData[3] = vec4(rgba.a, 0, 0, 1.0);"));

        let sel = select(&request(V::Rgbp, V::Bgr)).unwrap();
        assert_eq!(sel.texture_names, vec!["Rtex", "Gtex", "Btex"]);
        assert!(sel.body.contains("rgba.a = 1.0;"));
        assert!(sel.body.contains("gl_FragColor = swizzle(rgba, output_swizzle);"));
    }

    #[test]
    fn i420_samples_three_planes_with_forced_alpha() {
        let sel = select(&request(V::I420, V::Rgba)).unwrap();
        assert_eq!(sel.texture_names, vec!["Ytex", "Utex", "Vtex"]);
        assert!(sel.body.contains("yuva.a = 1.0;"));
        assert!(sel.body.contains("yuv_to_rgb"));
        assert_eq!(sel.matrix.unwrap().name, "bt601");
        assert_eq!(sel.out_planes, 1);
        assert_eq!(sel.in_bitdepth_factor, 1.0);
    }

    #[test]
    fn high_depth_planar_scales_input() {
        let sel = select(&request(V::I420_10Le, V::Rgba)).unwrap();
        assert!((sel.in_bitdepth_factor - 65535.0 / 1023.0).abs() < 1e-3);

        let sel = select(&request(V::Rgba, V::A420_12Le)).unwrap();
        assert!((sel.out_bitdepth_factor - 4095.0 / 65535.0).abs() < 1e-6);
        assert_eq!(sel.out_planes, 4);
    }

    #[test]
    fn nv12_uses_two_component_chroma_and_input_colorimetry() {
        let mut req = request(V::Nv12, V::Rgba);
        req.in_colorimetry = Colorimetry::Bt709;
        let sel = select(&req).unwrap();
        assert!(sel.body.contains("texture2D(UVtex, texcoord * tex_scale1).rg;"));
        assert_eq!(sel.matrix.unwrap().name, "bt709");

        let la = [TexFormat::Luminance, TexFormat::LuminanceAlpha];
        req.in_tex_formats = &la;
        let sel = select(&req).unwrap();
        assert!(sel.body.contains(".ra;"));
    }

    #[test]
    fn yuv_to_yuv_has_no_body() {
        let err = select(&request(V::Nv12, V::I420)).unwrap_err();
        assert_eq!(err.kind(), pixconv_core::ErrorKind::UnsupportedFormatPair);
        assert!(select(&request(V::Gray8, V::Gray16Le)).is_err());
        assert!(select(&request(V::Rgb8p, V::Rgba)).is_err());
        // planar RGB input has no direct YUV body
        assert!(select(&request(V::Gbr, V::I420)).is_err());
    }

    #[test]
    fn chroma_sampling_follows_output_subsampling() {
        let cs = |out| select(&request(V::Rgba, out)).unwrap().chroma_sampling;
        assert_eq!(cs(V::I420), Some([2.0, 2.0]));
        assert_eq!(cs(V::Y41b), Some([4.0, 1.0]));
        assert_eq!(cs(V::Y444), Some([1.0, 1.0]));
        assert_eq!(cs(V::Nv16), Some([2.0, 1.0]));
        assert_eq!(cs(V::Nv61), Some([2.0, 1.0]));
        assert_eq!(cs(V::Ayuv), None);
    }

    #[test]
    fn rgb_to_yuv_uses_output_colorimetry() {
        let mut req = request(V::Rgba, V::Nv12);
        req.in_colorimetry = Colorimetry::Bt709;
        req.out_colorimetry = Colorimetry::Bt601;
        assert_eq!(select(&req).unwrap().matrix.unwrap().name, "bt601");
    }

    #[test]
    fn yuy2_and_uyvy_pick_interleave_channels() {
        let yuy2 = select(&request(V::Yuy2, V::Rgba)).unwrap();
        assert!(yuy2.body.contains("yuv.x = texture2D(Ytex, texcoord * tex_scale0).r;"));
        assert!(yuy2.body.contains("yuv.yz = uv_texel.ga;"));

        let uyvy = select(&request(V::Uyvy, V::Rgba)).unwrap();
        assert!(uyvy.body.contains("yuv.x = texture2D(Ytex, texcoord * tex_scale0).g;"));
        assert!(uyvy.body.contains("yuv.yz = uv_texel.rb;"));

        let out = select(&request(V::Rgba, V::Uyvy)).unwrap();
        assert!(out.body.contains("gl_FragColor = vec4(yuv.y, yuv.x, 0.0, 1.0);"));
    }

    #[test]
    fn tiled_bodies_embed_tile_geometry() {
        let sel = select(&request(V::Nv12_16L32s, V::Rgba)).unwrap();
        assert!(sel.body.contains("const ivec2 luma_dim = ivec2(16, 32);"));
        assert!(sel.body.contains("const ivec2 chroma_dim = ivec2(8, 16);"));
        assert!(sel.body.contains("texelFetch(UVtex, texel, 0).rg;"));
        assert!(sel.template.functions.contains(&t::FUNC_FRAG_TO_TILE));

        let sel = select(&request(V::Nv12_4L4, V::Rgba)).unwrap();
        assert!(sel.body.contains("ivec2(4, 4)"));
        assert!(sel.body.contains("ivec2(2, 4)"));
    }

    #[test]
    fn gray_swizzles_are_special_cased() {
        let sel = select(&request(V::Rgba, V::Gray8)).unwrap();
        assert_eq!(sel.output_swizzle, [0, 0, 0, 0]);

        let sel = select(&request(V::Gray8, V::Bgra)).unwrap();
        assert_eq!(sel.input_swizzle, [0, 0, 0, 3]);
        assert_eq!(sel.output_swizzle, [2, 1, 0, 3]);

        let rg = [TexFormat::Rg8];
        let mut req = request(V::Gray16Le, V::Rgba);
        req.in_tex_formats = &rg;
        let le = select(&req).unwrap();
        assert_eq!(le.template.name, "compose");
        assert_eq!(le.input_swizzle[..2], [1, 0]);
        req.input = V::Gray16Be;
        assert_eq!(select(&req).unwrap().input_swizzle[..2], [0, 1]);
    }

    #[test]
    fn bitdepth_factor_is_identity_for_whole_bytes() {
        assert_eq!(bitdepth_factor(8), 1.0);
        assert_eq!(bitdepth_factor(16), 1.0);
        assert!(bitdepth_factor(10) > 64.0);
    }
}
