//! Texture-backed frames and the pool that hands out output planes.

use glow::HasContext;
use pixconv_core::ConvertError;
use pixconv_format::{TexFormat, TextureTarget, VideoInfo};

// Not exported by glow's core tables.
const GL_LUMINANCE: u32 = 0x1909;
const GL_LUMINANCE_ALPHA: u32 = 0x190A;
const GL_TEXTURE_EXTERNAL_OES: u32 = 0x8D65;

/// GL enum for a texture target.
pub fn gl_target(target: TextureTarget) -> u32 {
    match target {
        TextureTarget::Texture2D => glow::TEXTURE_2D,
        TextureTarget::Rectangle => glow::TEXTURE_RECTANGLE,
        TextureTarget::ExternalOes => GL_TEXTURE_EXTERNAL_OES,
    }
}

/// `(internal format, format, type)` for allocating a texture.
pub fn gl_formats(tex: TexFormat) -> (i32, u32, u32) {
    let (internal, format, ty) = match tex {
        TexFormat::Rgba8 => (glow::RGBA8, glow::RGBA, glow::UNSIGNED_BYTE),
        TexFormat::Rgb8 => (glow::RGB8, glow::RGB, glow::UNSIGNED_BYTE),
        TexFormat::Rgb565 => (glow::RGB565, glow::RGB, glow::UNSIGNED_SHORT_5_6_5),
        TexFormat::Rgb10A2 => (glow::RGB10_A2, glow::RGBA, glow::UNSIGNED_INT_2_10_10_10_REV),
        TexFormat::Rgba16 => (glow::RGBA16, glow::RGBA, glow::UNSIGNED_SHORT),
        TexFormat::Rg8 => (glow::RG8, glow::RG, glow::UNSIGNED_BYTE),
        TexFormat::R8 => (glow::R8, glow::RED, glow::UNSIGNED_BYTE),
        TexFormat::Rg16 => (glow::RG16, glow::RG, glow::UNSIGNED_SHORT),
        TexFormat::R16 => (glow::R16, glow::RED, glow::UNSIGNED_SHORT),
        TexFormat::Luminance => (GL_LUMINANCE, GL_LUMINANCE, glow::UNSIGNED_BYTE),
        TexFormat::LuminanceAlpha => (GL_LUMINANCE_ALPHA, GL_LUMINANCE_ALPHA, glow::UNSIGNED_BYTE),
    };
    (internal as i32, format, ty)
}

/// One plane of a frame, living in a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneTexture {
    pub texture: glow::NativeTexture,
    pub target: TextureTarget,
    pub tex_format: TexFormat,
    /// Texture size; may exceed the plane's valid area.
    pub width: u32,
    pub height: u32,
}

/// A frame whose planes are textures.
///
/// `planes` holds `views * n_planes` entries, view-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlFrame {
    pub info: VideoInfo,
    pub target: TextureTarget,
    pub planes: Vec<PlaneTexture>,
}

impl GlFrame {
    /// The planes of one view.
    pub fn view(&self, view: usize) -> Option<&[PlaneTexture]> {
        let n = self.info.n_planes();
        self.planes.get(view * n..(view + 1) * n)
    }

    pub fn tex_formats(&self) -> Vec<TexFormat> {
        self.view(0)
            .map(|planes| planes.iter().map(|p| p.tex_format).collect())
            .unwrap_or_default()
    }
}

/// "Need a `width`x`height` texture of `tex_format`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaneRequest {
    pub tex_format: TexFormat,
    pub target: TextureTarget,
    pub width: u32,
    pub height: u32,
}

/// Plane requests for every view of a frame described by `info`.
pub fn plane_requests(
    info: &VideoInfo,
    target: TextureTarget,
    tex_formats: &[TexFormat],
) -> Vec<PlaneRequest> {
    let mut out = Vec::with_capacity(info.views as usize * tex_formats.len());
    for _ in 0..info.views.max(1) {
        for (plane, tex_format) in tex_formats.iter().enumerate() {
            out.push(PlaneRequest {
                tex_format: *tex_format,
                target,
                width: info.plane_width(plane),
                height: info.plane_height(plane),
            });
        }
    }
    out
}

/// Source of output planes. Runs on the context thread.
pub trait PlaneAllocator: Send + Sync + std::fmt::Debug {
    fn allocate(
        &self,
        gl: &glow::Context,
        requests: &[PlaneRequest],
    ) -> Result<Vec<PlaneTexture>, ConvertError>;
}

/// Creates a fresh texture per request. The caller owns and deletes them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextureAllocator;

impl PlaneAllocator for TextureAllocator {
    fn allocate(
        &self,
        gl: &glow::Context,
        requests: &[PlaneRequest],
    ) -> Result<Vec<PlaneTexture>, ConvertError> {
        let mut out = Vec::with_capacity(requests.len());
        for req in requests {
            match unsafe { create_texture(gl, req) } {
                Ok(plane) => out.push(plane),
                Err(e) => {
                    for plane in out {
                        unsafe { gl.delete_texture(plane.texture) };
                    }
                    return Err(e);
                }
            }
        }
        Ok(out)
    }
}

/// Allocates one texture with linear filtering and edge clamping.
pub unsafe fn create_texture(
    gl: &glow::Context,
    req: &PlaneRequest,
) -> Result<PlaneTexture, ConvertError> {
    let target = gl_target(req.target);
    let tex = gl
        .create_texture()
        .map_err(|e| ConvertError::ResourceAcquisition(format!("create_texture failed: {e:?}")))?;

    gl.bind_texture(target, Some(tex));
    gl.tex_parameter_i32(target, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
    gl.tex_parameter_i32(target, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
    gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
    gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);

    let (internal, format, ty) = gl_formats(req.tex_format);
    let w = req.width.max(1);
    let h = req.height.max(1);
    gl.tex_image_2d(target, 0, internal, w as i32, h as i32, 0, format, ty, None);
    gl.bind_texture(target, None);

    Ok(PlaneTexture {
        texture: tex,
        target: req.target,
        tex_format: req.tex_format,
        width: w,
        height: h,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixconv_format::VideoFormat;

    #[test]
    fn sized_formats_map_to_matching_client_formats() {
        assert_eq!(
            gl_formats(TexFormat::Rg8),
            (glow::RG8 as i32, glow::RG, glow::UNSIGNED_BYTE)
        );
        assert_eq!(
            gl_formats(TexFormat::R16),
            (glow::R16 as i32, glow::RED, glow::UNSIGNED_SHORT)
        );
        assert_eq!(gl_formats(TexFormat::LuminanceAlpha).1, 0x190A);
        assert_eq!(gl_target(TextureTarget::ExternalOes), 0x8D65);
    }

    #[test]
    fn requests_cover_every_view_and_plane() {
        let info = VideoInfo::new(VideoFormat::I420, 64, 32).with_views(2);
        let reqs = plane_requests(
            &info,
            TextureTarget::Texture2D,
            &[TexFormat::R8, TexFormat::R8, TexFormat::R8],
        );
        assert_eq!(reqs.len(), 6);
        assert_eq!((reqs[0].width, reqs[0].height), (64, 32));
        assert_eq!((reqs[1].width, reqs[1].height), (32, 16));
        assert_eq!((reqs[3].width, reqs[3].height), (64, 32));
    }
}
