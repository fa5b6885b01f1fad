//! Capability snapshot of a GL context.
//!
//! The snapshot is plain data: version, profile, extensions and the derived feature set.
//! Backends fill it once per context; everything else only reads it.

use bitflags::bitflags;
use pixconv_core::ContextProfile;

use crate::format::{PlaneStorage, VideoFormat};
use crate::ConvertError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlApi {
    /// Legacy/compatibility desktop GL.
    Gl,
    /// Desktop GL core profile (3.x+).
    Gl3,
    /// OpenGL ES (2.0 or newer).
    Gles2,
}

/// Internal storage format of a texture plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TexFormat {
    Rgba8,
    Rgb8,
    Rgb565,
    Rgb10A2,
    Rgba16,
    Rg8,
    R8,
    Rg16,
    R16,
    Luminance,
    LuminanceAlpha,
}

impl TexFormat {
    pub fn components(self) -> u32 {
        match self {
            TexFormat::Rgba8 | TexFormat::Rgb10A2 | TexFormat::Rgba16 => 4,
            TexFormat::Rgb8 | TexFormat::Rgb565 => 3,
            TexFormat::Rg8 | TexFormat::Rg16 | TexFormat::LuminanceAlpha => 2,
            TexFormat::R8 | TexFormat::R16 | TexFormat::Luminance => 1,
        }
    }

    /// Luminance formats cannot be framebuffer attachments.
    pub fn is_color_renderable(self) -> bool {
        !matches!(self, TexFormat::Luminance | TexFormat::LuminanceAlpha)
    }

    pub fn is_16bit(self) -> bool {
        matches!(self, TexFormat::Rgba16 | TexFormat::Rg16 | TexFormat::R16)
    }

    pub fn name(self) -> &'static str {
        match self {
            TexFormat::Rgba8 => "RGBA8",
            TexFormat::Rgb8 => "RGB8",
            TexFormat::Rgb565 => "RGB565",
            TexFormat::Rgb10A2 => "RGB10_A2",
            TexFormat::Rgba16 => "RGBA16",
            TexFormat::Rg8 => "RG8",
            TexFormat::R8 => "R8",
            TexFormat::Rg16 => "RG16",
            TexFormat::R16 => "R16",
            TexFormat::Luminance => "LUMINANCE",
            TexFormat::LuminanceAlpha => "LUMINANCE_ALPHA",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        ALL_TEX_FORMATS.iter().copied().find(|f| f.name() == s)
    }

    fn flag(self) -> TexFormats {
        match self {
            TexFormat::Rgba8 | TexFormat::Rgb8 => TexFormats::RGBA8,
            TexFormat::Rgb565 => TexFormats::RGB565,
            TexFormat::Rgb10A2 => TexFormats::RGB10_A2,
            TexFormat::Rgba16 => TexFormats::RGBA16,
            TexFormat::Rg8 | TexFormat::R8 => TexFormats::RG8,
            TexFormat::Rg16 => TexFormats::RG16,
            TexFormat::R16 => TexFormats::R16,
            TexFormat::Luminance | TexFormat::LuminanceAlpha => TexFormats::LUMINANCE,
        }
    }
}

const ALL_TEX_FORMATS: &[TexFormat] = &[
    TexFormat::Rgba8,
    TexFormat::Rgb8,
    TexFormat::Rgb565,
    TexFormat::Rgb10A2,
    TexFormat::Rgba16,
    TexFormat::Rg8,
    TexFormat::R8,
    TexFormat::Rg16,
    TexFormat::R16,
    TexFormat::Luminance,
    TexFormat::LuminanceAlpha,
];

bitflags! {
    /// Texture storage families a context can allocate.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TexFormats: u32 {
        const RGBA8 = 1 << 0;
        const LUMINANCE = 1 << 1;
        /// R8 and RG8.
        const RG8 = 1 << 2;
        const R16 = 1 << 3;
        const RG16 = 1 << 4;
        const RGBA16 = 1 << 5;
        const RGB565 = 1 << 6;
        const RGB10_A2 = 1 << 7;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlCapabilities {
    pub api: GlApi,
    pub major: u32,
    pub minor: u32,
    pub extensions: Vec<String>,
    pub draw_buffers: bool,
    pub vertex_arrays: bool,
    pub texture_formats: TexFormats,
}

impl GlCapabilities {
    /// Derives the feature set from the version and extension list.
    pub fn new(api: GlApi, major: u32, minor: u32, extensions: Vec<String>) -> Self {
        let has = |name: &str| extensions.iter().any(|e| e == name);
        let gles = api == GlApi::Gles2;
        let desktop = !gles;
        let v3 = major >= 3;

        let mut texture_formats = TexFormats::RGBA8 | TexFormats::LUMINANCE;
        if v3 || has("GL_ARB_texture_rg") || has("GL_EXT_texture_rg") {
            texture_formats |= TexFormats::RG8;
        }
        if (desktop && v3) || has("GL_EXT_texture_norm16") {
            texture_formats |= TexFormats::R16 | TexFormats::RG16 | TexFormats::RGBA16;
        }
        if gles || (major, minor) >= (4, 1) || has("GL_ARB_ES2_compatibility") {
            texture_formats |= TexFormats::RGB565;
        }
        if desktop || v3 {
            texture_formats |= TexFormats::RGB10_A2;
        }

        let draw_buffers = (desktop && major >= 2) || (gles && v3) || has("GL_EXT_draw_buffers");
        let vertex_arrays = v3
            || has("GL_OES_vertex_array_object")
            || has("GL_ARB_vertex_array_object")
            || has("GL_APPLE_vertex_array_object");

        Self {
            api,
            major,
            minor,
            extensions,
            draw_buffers,
            vertex_arrays,
            texture_formats,
        }
    }

    pub fn from_profile(profile: &ContextProfile) -> Result<Self, ConvertError> {
        let api = match profile.api.as_str() {
            "gl" => GlApi::Gl,
            "gl3" => GlApi::Gl3,
            "gles2" => GlApi::Gles2,
            other => {
                return Err(ConvertError::other(format!("unknown context api '{other}'")));
            }
        };
        let mut caps = Self::new(api, profile.major, profile.minor, profile.extensions.clone());
        if let Some(db) = profile.draw_buffers {
            caps.draw_buffers = db;
        }
        if let Some(names) = &profile.texture_formats {
            let mut formats = TexFormats::RGBA8 | TexFormats::LUMINANCE;
            for name in names {
                let f = TexFormat::from_name(name).ok_or_else(|| {
                    ConvertError::other(format!("unknown texture format '{name}'"))
                })?;
                formats |= f.flag();
            }
            caps.texture_formats = formats;
        }
        Ok(caps)
    }

    pub fn is_gles(&self) -> bool {
        self.api == GlApi::Gles2
    }

    /// GLES 2.x without any 3.x features.
    pub fn is_gles2_only(&self) -> bool {
        self.is_gles() && self.major < 3
    }

    pub fn at_least(&self, major: u32, minor: u32) -> bool {
        (self.major, self.minor) >= (major, minor)
    }

    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|e| e == name)
    }

    /// `texelFetch` is available (GLSL 1.30 / ESSL 3.00) in the dialect shaders are written
    /// in. Compatibility contexts always get GLSL 1.10, whatever their version.
    pub fn has_texel_fetch(&self) -> bool {
        match self.api {
            GlApi::Gl => false,
            GlApi::Gl3 | GlApi::Gles2 => self.major >= 3,
        }
    }

    pub fn supports_rg(&self) -> bool {
        self.texture_formats.contains(TexFormats::RG8)
    }

    pub fn supports(&self, format: TexFormat) -> bool {
        self.texture_formats.contains(format.flag())
    }

    /// Texture format holding `plane` of `format` on this context.
    pub fn plane_tex_format(&self, format: VideoFormat, plane: usize) -> Option<TexFormat> {
        let storage = format.info().planes.get(plane)?.storage;
        Some(storage_tex_format(storage, self.supports_rg()))
    }
}

/// Maps plane storage to a texture format. Without RG support one- and two-component
/// 8-bit planes fall back to luminance formats.
pub fn storage_tex_format(storage: PlaneStorage, rg: bool) -> TexFormat {
    match storage {
        PlaneStorage::Unorm8(1) if rg => TexFormat::R8,
        PlaneStorage::Unorm8(1) => TexFormat::Luminance,
        PlaneStorage::Unorm8(2) if rg => TexFormat::Rg8,
        PlaneStorage::Unorm8(2) => TexFormat::LuminanceAlpha,
        PlaneStorage::Unorm8(3) => TexFormat::Rgb8,
        PlaneStorage::Unorm8(_) => TexFormat::Rgba8,
        PlaneStorage::Unorm16(1) => TexFormat::R16,
        PlaneStorage::Unorm16(2) => TexFormat::Rg16,
        PlaneStorage::Unorm16(_) => TexFormat::Rgba16,
        PlaneStorage::Rgb565 => TexFormat::Rgb565,
        PlaneStorage::Rgb10A2 => TexFormat::Rgb10A2,
    }
}
