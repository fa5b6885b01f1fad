//! GLSL fragments the converter assembles shaders from.
//!
//! Everything here is written against the legacy 2D dialect (`texture2D`, `sampler2D`,
//! `varying`, `gl_FragColor`); the mangler retargets it afterwards. Bodies carry `{name}`
//! placeholders that [`fill`] substitutes.

use pixconv_format::TextureTarget;

macro_rules! default_uniforms {
    () => {
        "uniform vec2 tex_scale0;\n\
         uniform vec2 tex_scale1;\n\
         uniform vec2 tex_scale2;\n\
         uniform vec2 tex_scale3;\n\
         uniform float width;\n\
         uniform float height;\n\
         uniform float poffset_x;\n\
         uniform float poffset_y;\n\
         uniform int input_swizzle[4];\n\
         uniform int output_swizzle[4];\n"
    };
}

macro_rules! color_coefficients {
    () => {
        "uniform vec3 offset;\n\
         uniform vec3 coeff1;\n\
         uniform vec3 coeff2;\n\
         uniform vec3 coeff3;\n"
    };
}

// 255*256/65535 and 255/65535
macro_rules! compose_weight {
    () => {
        "const vec2 compose_weight = vec2(0.996109, 0.003891);\n"
    };
}

pub const OES_EXTENSION: &str = "#extension GL_OES_EGL_image_external : require \n";

pub const FUNC_YUV_TO_RGB: &str = "\
vec3 yuv_to_rgb (vec3 yuv, vec3 offset, vec3 ycoeff, vec3 ucoeff, vec3 vcoeff) {
  vec3 rgb;
  yuv += offset;
  rgb.r = dot(yuv, ycoeff);
  rgb.g = dot(yuv, ucoeff);
  rgb.b = dot(yuv, vcoeff);
  return rgb;
}
";

pub const FUNC_RGB_TO_YUV: &str = "\
vec3 rgb_to_yuv (vec3 rgb, vec3 offset, vec3 rcoeff, vec3 gcoeff, vec3 bcoeff) {
  vec3 yuv;
  yuv.r = dot(rgb.rgb, rcoeff);
  yuv.g = dot(rgb.rgb, gcoeff);
  yuv.b = dot(rgb.rgb, bcoeff);
  yuv += offset;
  return yuv;
}
";

pub const FUNC_SWIZZLE: &str = "\
vec4 swizzle(vec4 texel, int components[4]) {
  return vec4(texel[components[0]], texel[components[1]], texel[components[2]], texel[components[3]]);
}
vec3 swizzle(vec3 texel, int components[3]) {
  return vec3(texel[components[0]], texel[components[1]], texel[components[2]]);
}
vec2 swizzle(vec2 texel, int components[2]) {
  return vec2(texel[components[0]], texel[components[1]]);
}
vec2 swizzle2(vec3 texel, int components[3]) {
  return vec2(texel[components[0]], texel[components[1]]);
}
vec2 swizzle2(vec4 texel, int components[4]) {
  return vec2(texel[components[0]], texel[components[1]]);
}
vec3 swizzle3(vec4 texel, int components[4]) {
  return vec3(texel[components[0]], texel[components[1]], texel[components[2]]);
}
";

pub const FUNC_FRAG_TO_TILE: &str = "\
ivec2 frag_to_tile(ivec2 tile_coord, ivec2 delta_coord, ivec2 dim, int width, int tiles_per_row, int need_offset) {
  int tile_size = (dim.x * dim.y);
  int tile_index = tile_coord.y * tiles_per_row + tile_coord.x;
  int linear_index = tile_index * tile_size + delta_coord.y * dim.x + delta_coord.x;
  linear_index += need_offset * tile_size / 2;
  return ivec2(linear_index % width, linear_index / width);
}
";

/// Declarations and helpers shared by one family of bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderTemplate {
    pub name: &'static str,
    pub extensions: Option<&'static str>,
    pub uniforms: &'static str,
    pub functions: &'static [&'static str],
    /// Target the body's sampling calls are written for.
    pub target: TextureTarget,
}

const fn templ(
    name: &'static str,
    uniforms: &'static str,
    functions: &'static [&'static str],
) -> ShaderTemplate {
    ShaderTemplate {
        name,
        extensions: None,
        uniforms,
        functions,
        target: TextureTarget::Texture2D,
    }
}

const SWIZZLE_ONLY: &[&str] = &[FUNC_SWIZZLE];
const FROM_YUV: &[&str] = &[FUNC_SWIZZLE, FUNC_YUV_TO_RGB];
const TO_YUV: &[&str] = &[FUNC_SWIZZLE, FUNC_RGB_TO_YUV];

pub const REORDER: ShaderTemplate = templ(
    "reorder",
    concat!(default_uniforms!(), "uniform sampler2D tex;\n"),
    SWIZZLE_ONLY,
);

pub const COMPOSE: ShaderTemplate = templ(
    "compose",
    concat!(default_uniforms!(), compose_weight!(), "uniform sampler2D tex;\n"),
    SWIZZLE_ONLY,
);

pub const AYUV_TO_RGB: ShaderTemplate = templ(
    "ayuv-to-rgb",
    concat!(default_uniforms!(), color_coefficients!(), "uniform sampler2D tex;\n"),
    FROM_YUV,
);

pub const RGB_TO_AYUV: ShaderTemplate = templ(
    "rgb-to-ayuv",
    concat!(default_uniforms!(), color_coefficients!(), "uniform sampler2D tex;\n"),
    TO_YUV,
);

pub const PLANAR_YUV_TO_RGB: ShaderTemplate = templ(
    "planar-yuv-to-rgb",
    concat!(
        default_uniforms!(),
        color_coefficients!(),
        "uniform sampler2D Ytex, Utex, Vtex;\n",
        "uniform float in_bitdepth_factor;\n"
    ),
    FROM_YUV,
);

pub const A420_TO_RGB: ShaderTemplate = templ(
    "a420-to-rgb",
    concat!(
        default_uniforms!(),
        color_coefficients!(),
        "uniform sampler2D Ytex, Utex, Vtex, Atex;\n",
        "uniform float in_bitdepth_factor;\n"
    ),
    FROM_YUV,
);

pub const RGB_TO_PLANAR_YUV: ShaderTemplate = templ(
    "rgb-to-planar-yuv",
    concat!(
        default_uniforms!(),
        color_coefficients!(),
        "uniform sampler2D tex;\n",
        "uniform vec2 chroma_sampling;\n",
        "uniform float out_bitdepth_factor;\n"
    ),
    TO_YUV,
);

pub const SEMI_PLANAR_TO_RGB: ShaderTemplate = templ(
    "semi-planar-to-rgb",
    concat!(default_uniforms!(), color_coefficients!(), "uniform sampler2D Ytex, UVtex;\n"),
    FROM_YUV,
);

pub const AV12_TO_RGB: ShaderTemplate = templ(
    "av12-to-rgb",
    concat!(
        default_uniforms!(),
        color_coefficients!(),
        "uniform sampler2D Ytex, UVtex, Atex;\n"
    ),
    FROM_YUV,
);

pub const TILED_SEMI_PLANAR_TO_RGB: ShaderTemplate = templ(
    "tiled-semi-planar-to-rgb",
    concat!(default_uniforms!(), color_coefficients!(), "uniform sampler2D Ytex, UVtex;\n"),
    &[FUNC_SWIZZLE, FUNC_YUV_TO_RGB, FUNC_FRAG_TO_TILE],
);

pub const RGB_TO_SEMI_PLANAR_YUV: ShaderTemplate = templ(
    "rgb-to-semi-planar-yuv",
    concat!(
        default_uniforms!(),
        color_coefficients!(),
        "uniform sampler2D tex;\n",
        "uniform vec2 chroma_sampling;\n"
    ),
    TO_YUV,
);

pub const YUY2_UYVY_TO_RGB: ShaderTemplate = templ(
    "yuy2-uyvy-to-rgb",
    concat!(default_uniforms!(), color_coefficients!(), "uniform sampler2D Ytex;\n"),
    FROM_YUV,
);

pub const RGB_TO_YUY2_UYVY: ShaderTemplate = templ(
    "rgb-to-yuy2-uyvy",
    concat!(default_uniforms!(), color_coefficients!(), "uniform sampler2D tex;\n"),
    TO_YUV,
);

pub const PLANAR_RGB_TO_RGB: ShaderTemplate = templ(
    "planar-rgb-to-rgb",
    concat!(default_uniforms!(), "uniform sampler2D Rtex, Gtex, Btex, Atex;\n"),
    SWIZZLE_ONLY,
);

// -------------------------------------------------------------------------------------------------
// Bodies
// -------------------------------------------------------------------------------------------------

pub const REORDER_BODY: &str = "\
vec4 t = swizzle(texture2D(tex, texcoord * tex_scale0), input_swizzle);
gl_FragColor = vec4(swizzle(t, output_swizzle));
";

pub const REORDER_OVERWRITE_ALPHA_BODY: &str = "\
vec4 t = swizzle(texture2D(tex, texcoord * tex_scale0), input_swizzle);
t.a = 1.0;
gl_FragColor = vec4(swizzle(t, output_swizzle));
";

/// Bodies below produce `rgba` in canonical order and leave the store to an RGB tail.
pub const PACKED_RGB_FETCH: &str = "\
vec4 rgba;
rgba = swizzle(texture2D(tex, texcoord), input_swizzle);
";

pub const PACKED_RGB_FETCH_OVERWRITE_ALPHA: &str = "\
vec4 rgba;
rgba = swizzle(texture2D(tex, texcoord), input_swizzle);
rgba.a = 1.0;
";

pub const PLANAR_RGB_FETCH: &str = "\
vec4 rgba;
rgba.r = texture2D(Rtex, texcoord * tex_scale0).r;
rgba.g = texture2D(Gtex, texcoord * tex_scale1).r;
rgba.b = texture2D(Btex, texcoord * tex_scale2).r;
{alpha}
rgba = swizzle(rgba, input_swizzle);
";

pub const GRAY_FETCH: &str = "\
vec4 rgba = swizzle(texture2D(tex, texcoord * tex_scale0), input_swizzle);
";

pub const COMPOSE_FETCH: &str = "\
vec4 rgba;
vec4 t = texture2D(tex, texcoord * tex_scale0);
rgba.rgb = vec3 (dot(swizzle2(t, input_swizzle), compose_weight));
rgba.a = 1.0;
";

pub const AYUV_FETCH: &str = "\
vec4 texel, rgba;
texel = swizzle(texture2D(tex, texcoord * tex_scale0), input_swizzle);
rgba.rgb = yuv_to_rgb (texel.rgb, offset, coeff1, coeff2, coeff3);
rgba.a = texel.a;
";

pub const PLANAR_YUV_FETCH: &str = "\
vec4 yuva, rgba;
yuva.x = texture2D(Ytex, texcoord * tex_scale0).r;
yuva.y = texture2D(Utex, texcoord * tex_scale1).r;
yuva.z = texture2D(Vtex, texcoord * tex_scale2).r;
{alpha}
yuva = yuva * in_bitdepth_factor;
yuva = swizzle(yuva, input_swizzle);
rgba.rgb = yuv_to_rgb (yuva.xyz, offset, coeff1, coeff2, coeff3);
rgba.a = yuva.a;
";

pub const SEMI_PLANAR_FETCH: &str = "\
vec4 rgba;
vec4 yuva;
yuva.x=texture2D(Ytex, texcoord * tex_scale0).r;
yuva.yz=texture2D(UVtex, texcoord * tex_scale1).r{uv};
{alpha}
yuva = swizzle(yuva, input_swizzle);
rgba.rgb = yuv_to_rgb (yuva.xyz, offset, coeff1, coeff2, coeff3);
rgba.a = yuva.a;
";

pub const TILED_SEMI_PLANAR_FETCH: &str = "\
vec4 rgba;
vec3 yuv;
ivec2 texel;

const ivec2 luma_dim = ivec2({luma_w}, {luma_h});
const ivec2 chroma_dim = ivec2({chroma_w}, {chroma_h});
const int fy = chroma_dim.y * 2 / luma_dim.y;

int iwidth = int(width);
int tiles_per_row = iwidth / luma_dim.x;

ivec2 coord = ivec2(gl_FragCoord.xy);
ivec2 tile_coord = coord / luma_dim;
ivec2 delta_coord = coord % luma_dim;
texel = frag_to_tile(tile_coord, delta_coord, luma_dim, iwidth, tiles_per_row, 0);
yuv.x = texelFetch(Ytex, texel, 0).r;

ivec2 chroma_tcoord = ivec2(tile_coord.x, tile_coord.y / fy);
texel = frag_to_tile(chroma_tcoord, delta_coord / 2, chroma_dim, iwidth / 2, tiles_per_row, tile_coord.y % fy);
yuv.yz = texelFetch(UVtex, texel, 0).{u}{v};

rgba.rgb = yuv_to_rgb (yuv, offset, coeff1, coeff2, coeff3);
rgba.a = 1.0;
";

pub const YUY2_UYVY_FETCH: &str = "\
vec4 rgba, uv_texel;
vec3 yuv;
float dx1 = -poffset_x;
float dx2 = 0.0;
yuv.x = texture2D(Ytex, texcoord * tex_scale0).{y};
float inorder = mod (v_texcoord.x * width, 2.0);
if (inorder < 1.0) {
  dx2 = -dx1;
  dx1 = 0.0;
}
uv_texel.rg = texture2D(Ytex, texcoord * tex_scale0 + vec2(dx1, 0.0)).r{uv1};
uv_texel.ba = texture2D(Ytex, texcoord * tex_scale0 + vec2(dx2, 0.0)).r{uv2};
yuv.yz = uv_texel.{u}{v};
rgba.rgb = yuv_to_rgb (yuv, offset, coeff1, coeff2, coeff3);
rgba.a = 1.0;
";

pub const PACKED_RGB_TAIL: &str = "\
gl_FragColor = swizzle(rgba, output_swizzle);
";

pub const PLANAR_RGB_TAIL: &str = "\
rgba = swizzle(rgba, output_swizzle);
gl_FragData[0] = vec4(rgba.r, 0, 0, 1.0);
gl_FragData[1] = vec4(rgba.g, 0, 0, 1.0);
gl_FragData[2] = vec4(rgba.b, 0, 0, 1.0);
{alpha}
";

pub const RGB_TO_AYUV_BODY: &str = "\
vec4 texel, yuva;
texel = swizzle(texture2D(tex, texcoord), input_swizzle);
yuva.xyz = rgb_to_yuv (texel.rgb, offset, coeff1, coeff2, coeff3);
yuva.a = {alpha};
gl_FragColor = swizzle(yuva, output_swizzle);
";

/// One chroma sample is the running mean of a `chroma_sampling` sized block of input texels,
/// starting at the centre of the block's first texel.
pub const RGB_TO_PLANAR_YUV_BODY: &str = "\
vec4 texel;
vec4 yuva;
texel = swizzle(texture2D(tex, texcoord), input_swizzle);
vec4 uv_texel = vec4(0.0);
vec2 unnormalization;
if (texcoord.x == v_texcoord.x) {
  unnormalization = vec2(width, height);
} else {
  unnormalization = vec2 (1.0);
}
vec2 chroma_pos = texcoord * chroma_sampling * unnormalization;
chroma_pos -= clamp(chroma_sampling * 0.5 - 0.5, vec2(0.0), chroma_sampling);
if (chroma_pos.x < width && chroma_pos.y < height) {
  for (int i = 0; i < int(chroma_sampling.x); i++) {
    vec2 delta = vec2 (float(i), 0.0);
    for (int j = 0; j < int(chroma_sampling.y); j++) {
      int n = i * int(chroma_sampling.y) + j + 1;
      delta.y = float(j);
      vec4 s = swizzle(texture2D(tex, (chroma_pos + delta) / unnormalization), input_swizzle);
      uv_texel = (float(n-1) * uv_texel + s) / float(n);
    }
  }
}
yuva.x = rgb_to_yuv (texel.rgb, offset, coeff1, coeff2, coeff3).x;
yuva.yz = rgb_to_yuv (uv_texel.rgb, offset, coeff1, coeff2, coeff3).yz;
yuva.a = {alpha_value};
yuva = swizzle(yuva, output_swizzle);
yuva = yuva * out_bitdepth_factor;
gl_FragData[0] = vec4(yuva.x, 0.0, 0.0, 1.0);
gl_FragData[1] = vec4(yuva.y, 0.0, 0.0, 1.0);
gl_FragData[2] = vec4(yuva.z, 0.0, 0.0, 1.0);
{alpha}
";

pub const RGB_TO_SEMI_PLANAR_YUV_BODY: &str = "\
vec4 texel, uv_texel;
vec4 yuva;
texel = swizzle(texture2D(tex, texcoord), input_swizzle);
uv_texel = swizzle(texture2D(tex, texcoord * tex_scale0 * chroma_sampling), input_swizzle);
yuva.x = rgb_to_yuv (texel.rgb, offset, coeff1, coeff2, coeff3).x;
yuva.yz = rgb_to_yuv (uv_texel.rgb, offset, coeff1, coeff2, coeff3).yz;
yuva.a = {alpha_value};
yuva = swizzle(yuva, output_swizzle);
gl_FragData[0] = {luma};
gl_FragData[1] = {chroma};
{alpha}
";

pub const RGB_TO_YUY2_UYVY_BODY: &str = "\
vec4 texel1, texel2;
vec3 yuv, yuv1, yuv2;
float fx, dx, fy;
float inorder = mod (v_texcoord.x * width, 2.0);
fx = texcoord.x;
dx = poffset_x;
if (inorder > 1.0) {
  dx = -dx;
}
fy = texcoord.y;
texel1 = swizzle(texture2D(tex, vec2(fx, fy)), input_swizzle);
texel2 = swizzle(texture2D(tex, vec2(fx + dx, fy)), input_swizzle);
yuv1 = rgb_to_yuv (texel1.rgb, offset, coeff1, coeff2, coeff3);
yuv2 = rgb_to_yuv (texel2.rgb, offset, coeff1, coeff2, coeff3);
yuv.x = yuv1.x;
yuv.yz = (yuv1.yz + yuv2.yz) * 0.5;
if (inorder < 1.0) {
  gl_FragColor = {even};
} else {
  gl_FragColor = {odd};
}
";

/// Splits luminance into its high and low bytes, then scatters them into storage order.
pub const RGB_TO_GRAY16_BODY: &str = "\
vec4 t = swizzle(texture2D(tex, texcoord * tex_scale0), input_swizzle);
float value = floor(clamp(t.r, 0.0, 1.0) * 65535.0 + 0.5);
float hi = floor(value / 256.0);
float lo = value - hi * 256.0;
vec4 bytes = vec4(hi / 255.0, lo / 255.0, 0.0, 1.0);
gl_FragColor = swizzle(bytes, output_swizzle);
";

pub const VERTEX_SHADER: &str = "\
attribute vec4 a_position;
attribute vec2 a_texcoord;
varying vec2 v_texcoord;
void main()
{
  gl_Position = a_position;
  v_texcoord = a_texcoord;
}
";

/// Substitutes `{key}` placeholders.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in values {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

/// Writes two values into a plane. Luminance-alpha planes keep the second value in alpha.
pub fn two_channel_store(first: &str, second: &str, luminance_alpha: bool) -> String {
    if luminance_alpha {
        format!("vec4({first}, 0.0, 0.0, {second})")
    } else {
        format!("vec4({first}, {second}, 0.0, 1.0)")
    }
}
