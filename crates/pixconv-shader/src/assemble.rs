//! Shader source assembly.
//!
//! Concatenates the pieces of a [`BodySelection`] into complete vertex and fragment sources
//! in the legacy dialect, then runs the mangler over them.

use pixconv_format::{GlCapabilities, TextureTarget};

use crate::body::BodySelection;
use crate::mangle::{mangle_shader, GlslVersion, ShaderStage};
use crate::templates::{OES_EXTENSION, VERTEX_SHADER};

/// Attribute locations bound before linking.
pub const ATTRIBUTE_BINDINGS: [(u32, &str); 2] = [(0, "a_position"), (1, "a_texcoord")];

/// Four corners, each `x, y, z, u, v`.
pub const VERTICES: [f32; 20] = [
    1.0, -1.0, 0.0, 1.0, 0.0, //
    -1.0, -1.0, 0.0, 0.0, 0.0, //
    -1.0, 1.0, 0.0, 0.0, 1.0, //
    1.0, 1.0, 0.0, 1.0, 1.0,
];

pub const INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

const ES2_PRECISION: &str = "\
#ifdef GL_FRAGMENT_PRECISION_HIGH
precision highp float;
#else
precision mediump float;
#endif
";

const DRAW_BUFFERS_EXTENSION: &str = "#extension GL_EXT_draw_buffers : require\n";

/// Final program sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub glsl: GlslVersion,
    pub vertex: String,
    pub fragment: String,
    /// Fragment outputs that need `bind_frag_data_location` before linking.
    pub frag_data_bindings: Vec<(u32, String)>,
}

impl ShaderSources {
    pub fn version_line(&self) -> String {
        self.glsl.version_line()
    }
}

fn output_name(plane: usize, n_planes: usize) -> String {
    if n_planes > 1 {
        format!("fragColor_{plane}")
    } else {
        "fragColor".to_string()
    }
}

/// Output declarations and, where locations cannot be written in the source, the bindings
/// the linker needs instead.
fn output_declarations(glsl: GlslVersion, n_planes: usize) -> (String, Vec<(u32, String)>) {
    let mut decl = String::new();
    let mut bindings = Vec::new();
    if !glsl.uses_modern_io() {
        return (decl, bindings);
    }
    for plane in 0..n_planes {
        let name = output_name(plane, n_planes);
        if glsl.has_explicit_locations() {
            if n_planes > 1 {
                decl.push_str(&format!("layout(location = {plane}) out vec4 {name};\n"));
            } else {
                decl.push_str(&format!("layout (location = 0) out vec4 {name};\n"));
            }
        } else {
            decl.push_str(&format!("out vec4 {name};\n"));
            bindings.push((plane as u32, name));
        }
    }
    (decl, bindings)
}

/// Builds both shader stages for `sel`, sampling an input on `in_target`.
pub fn assemble(
    sel: &BodySelection,
    in_target: TextureTarget,
    caps: &GlCapabilities,
) -> ShaderSources {
    let glsl = GlslVersion::select(caps, in_target);
    let version_line = glsl.version_line();
    let n_planes = sel.out_planes.max(1);

    let mut frag = version_line.clone();
    if let Some(ext) = sel.template.extensions {
        frag.push_str(ext);
    }
    if in_target == TextureTarget::ExternalOes {
        frag.push_str(OES_EXTENSION);
    }
    if glsl.is_es() && !glsl.uses_modern_io() && n_planes > 1 {
        frag.push_str(DRAW_BUFFERS_EXTENSION);
    }

    if glsl.is_es() {
        if glsl.version >= 300 {
            frag.push_str("precision highp float;\n");
        } else {
            frag.push_str(ES2_PRECISION);
        }
    }

    frag.push_str(sel.template.uniforms);
    frag.push('\n');

    let (outputs, frag_data_bindings) = output_declarations(glsl, n_planes);
    frag.push_str(&outputs);

    for func in sel.template.functions {
        frag.push('\n');
        frag.push_str(func);
        frag.push('\n');
    }

    frag.push_str("\nvarying vec2 v_texcoord;\nvoid main (void) {\n");
    frag.push_str("vec2 texcoord;\n");
    if in_target == TextureTarget::Rectangle {
        frag.push_str("texcoord = v_texcoord * vec2 (width, height);\n");
    } else {
        frag.push_str("texcoord = v_texcoord;\n");
    }
    frag.push_str(&sel.body);
    frag.push_str("\n}");

    let fragment = mangle_shader(
        &frag,
        ShaderStage::Fragment,
        sel.template.target,
        in_target,
        glsl,
        caps,
    );

    let vert = format!("{version_line}{VERTEX_SHADER}");
    let vertex = mangle_shader(
        &vert,
        ShaderStage::Vertex,
        TextureTarget::Texture2D,
        TextureTarget::Texture2D,
        glsl,
        caps,
    );

    ShaderSources {
        glsl,
        vertex,
        fragment,
        frag_data_bindings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{select, BodyRequest};
    use crate::mangle::OES_ESSL3_EXTENSION;
    use pixconv_format::{Colorimetry, GlApi, TexFormat, VideoFormat};

    fn selection(input: VideoFormat, output: VideoFormat) -> BodySelection {
        select(&BodyRequest {
            input,
            output,
            in_tex_formats: &[TexFormat::R8, TexFormat::Rg8],
            out_tex_formats: &[],
            in_colorimetry: Colorimetry::Bt601,
            out_colorimetry: Colorimetry::Bt601,
        })
        .unwrap()
    }

    #[test]
    fn core_profile_uses_modern_io() {
        let caps = GlCapabilities::new(GlApi::Gl3, 3, 3, vec![]);
        let src = assemble(
            &selection(VideoFormat::Nv12, VideoFormat::Rgba),
            TextureTarget::Texture2D,
            &caps,
        );
        assert!(src.fragment.starts_with("#version 330 core\n"));
        assert!(src.fragment.contains("layout (location = 0) out vec4 fragColor;"));
        assert!(src.fragment.contains("in vec2 v_texcoord;"));
        assert!(src.fragment.contains("texture(Ytex, texcoord * tex_scale0)"));
        assert!(src.fragment.contains("fragColor = swizzle(rgba, output_swizzle);"));
        assert!(!src.fragment.contains("gl_FragColor"));
        assert!(!src.fragment.contains("precision"));
        assert!(src.frag_data_bindings.is_empty());

        assert!(src.vertex.starts_with("#version 330 core\n"));
        assert!(src.vertex.contains("in vec4 a_position;"));
        assert!(src.vertex.contains("out vec2 v_texcoord;"));
    }

    #[test]
    fn gles2_keeps_builtins_and_declares_draw_buffers() {
        let caps = GlCapabilities::new(GlApi::Gles2, 2, 0, vec!["GL_EXT_draw_buffers".into()]);
        let src = assemble(
            &selection(VideoFormat::Rgba, VideoFormat::I420),
            TextureTarget::Texture2D,
            &caps,
        );
        assert!(src.fragment.starts_with("#version 100\n"));
        assert!(src.fragment.contains("#extension GL_EXT_draw_buffers : require"));
        assert!(src.fragment.contains("#ifdef GL_FRAGMENT_PRECISION_HIGH"));
        assert!(src.fragment.contains("gl_FragData[2] = vec4(yuva.z, 0.0, 0.0, 1.0);"));
        assert!(src.fragment.contains("varying vec2 v_texcoord;"));
        assert!(src.vertex.contains("attribute vec4 a_position;"));
    }

    #[test]
    fn glsl150_binds_outputs_at_link_time() {
        let caps = GlCapabilities::new(GlApi::Gl3, 3, 2, vec![]);
        let src = assemble(
            &selection(VideoFormat::Rgba, VideoFormat::Y444),
            TextureTarget::Texture2D,
            &caps,
        );
        assert!(src.fragment.starts_with("#version 150\n"));
        assert!(src.fragment.contains("out vec4 fragColor_1;"));
        assert!(!src.fragment.contains("layout("));
        assert!(src.fragment.contains("fragColor_2 = vec4(yuva.z, 0.0, 0.0, 1.0);"));
        assert_eq!(
            src.frag_data_bindings,
            vec![
                (0, "fragColor_0".to_string()),
                (1, "fragColor_1".to_string()),
                (2, "fragColor_2".to_string())
            ]
        );
    }

    #[test]
    fn rectangle_input_unnormalizes_coordinates() {
        let legacy = GlCapabilities::new(GlApi::Gl, 2, 1, vec![]);
        let src = assemble(
            &selection(VideoFormat::Bgra, VideoFormat::Rgba),
            TextureTarget::Rectangle,
            &legacy,
        );
        assert!(src.fragment.contains("uniform sampler2DRect tex;"));
        assert!(src.fragment.contains("texture2DRect(tex, texcoord * tex_scale0)"));
        assert!(src.fragment.contains("texcoord = v_texcoord * vec2 (width, height);"));
        assert!(src.fragment.contains("gl_FragColor"));
    }

    #[test]
    fn external_input_on_essl3_upgrades_extension() {
        let caps = GlCapabilities::new(GlApi::Gles2, 3, 0, vec![OES_ESSL3_EXTENSION.into()]);
        let src = assemble(
            &selection(VideoFormat::Rgba, VideoFormat::Bgra),
            TextureTarget::ExternalOes,
            &caps,
        );
        assert!(src.fragment.starts_with("#version 300 es\n"));
        assert!(src
            .fragment
            .contains("#extension GL_OES_EGL_image_external_essl3 : require"));
        assert!(src.fragment.contains("precision highp float;"));
        assert!(src.fragment.contains("uniform samplerExternalOES tex;"));
        assert!(src.fragment.contains("texture(tex, texcoord * tex_scale0)"));
    }

    #[test]
    fn quad_covers_clip_space() {
        assert_eq!(VERTICES.len(), 4 * 5);
        assert_eq!(INDICES, [0, 1, 2, 0, 2, 3]);
        for corner in VERTICES.chunks(5) {
            assert_eq!(corner[0].abs(), 1.0);
            assert_eq!(corner[1].abs(), 1.0);
            assert_eq!(corner[3], (corner[0] + 1.0) / 2.0);
            assert_eq!(corner[4], (corner[1] + 1.0) / 2.0);
        }
    }
}
