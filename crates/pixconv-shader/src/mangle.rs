//! GLSL dialect retargeting.
//!
//! Shader text is written once against the legacy 2D dialect. These passes rewrite it for
//! the chosen GLSL version and input texture target. Every pass is a whole-word rewrite, so
//! identifiers that merely contain a keyword survive untouched.

use lazy_static::lazy_static;
use pixconv_format::{GlApi, GlCapabilities, TextureTarget};
use regex::{Captures, Regex};
use std::fmt;
use tracing::warn;

pub const OES_ESSL3_EXTENSION: &str = "GL_OES_EGL_image_external_essl3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlslProfile {
    None,
    Core,
    Compatibility,
    Es,
}

/// A GLSL `#version` choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlslVersion {
    pub version: u32,
    pub profile: GlslProfile,
}

impl GlslVersion {
    pub const fn new(version: u32, profile: GlslProfile) -> Self {
        Self { version, profile }
    }

    pub fn is_es(self) -> bool {
        self.profile == GlslProfile::Es
    }

    /// `in`/`out` qualifiers, `texture()` and user-declared fragment outputs.
    pub fn uses_modern_io(self) -> bool {
        if self.is_es() {
            self.version >= 300
        } else {
            self.version >= 150
        }
    }

    /// Outputs can carry `layout(location = n)`.
    pub fn has_explicit_locations(self) -> bool {
        (self.is_es() && self.version >= 300) || (!self.is_es() && self.version >= 330)
    }

    /// `texelFetch` and integer `%` exist in this dialect.
    pub fn has_texel_fetch(self) -> bool {
        if self.is_es() {
            self.version >= 300
        } else {
            self.version >= 130
        }
    }

    pub fn version_line(self) -> String {
        format!("#version {self}\n")
    }

    /// Picks the version for a context and the target the input is sampled from.
    pub fn select(caps: &GlCapabilities, input: TextureTarget) -> Self {
        match caps.api {
            GlApi::Gl3 if caps.at_least(3, 3) => Self::new(330, GlslProfile::Core),
            GlApi::Gl3 => Self::new(150, GlslProfile::None),
            GlApi::Gles2
                if caps.major >= 3
                    && (input != TextureTarget::ExternalOes
                        || caps.has_extension(OES_ESSL3_EXTENSION)) =>
            {
                Self::new(300, GlslProfile::Es)
            }
            GlApi::Gles2 => Self::new(100, GlslProfile::Es),
            GlApi::Gl => Self::new(110, GlslProfile::Compatibility),
        }
    }
}

impl fmt::Display for GlslVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.profile {
            GlslProfile::Core => write!(f, "{} core", self.version),
            GlslProfile::Es if self.version >= 300 => write!(f, "{} es", self.version),
            _ => write!(f, "{}", self.version),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

lazy_static! {
    static ref EXTERNAL_EXTENSION: Regex = Regex::new(
        r"(#[ \t]*extension[ \t]+)GL_OES_EGL_image_external([ \t]*:[ \t]*[a-z]+[ \t]*)"
    )
    .unwrap();
    static ref TEXTURE_2D_CALL: Regex = Regex::new(r"\btexture2D(\s*\()").unwrap();
    static ref SAMPLER_2D: Regex = Regex::new(r"(\s)sampler2D(\s)").unwrap();
    static ref ATTRIBUTE: Regex = Regex::new(r"\battribute\b").unwrap();
    static ref VARYING: Regex = Regex::new(r"\bvarying\b").unwrap();
    static ref FRAG_COLOR: Regex = Regex::new(r"\bgl_FragColor\b").unwrap();
    static ref FRAG_DATA: Regex = Regex::new(r"\bgl_FragData\[(\d+)\]").unwrap();
}

/// Upgrades the external-image extension to its ESSL3 flavour.
///
/// Applies only when the shader targets ESSL 3.00 and samples an external texture. Without
/// the ESSL3 extension the text is left alone and a warning logged.
pub fn mangle_external_extension(
    src: &str,
    version: GlslVersion,
    target: TextureTarget,
    caps: &GlCapabilities,
) -> String {
    if !(version.is_es() && version.version >= 300 && target == TextureTarget::ExternalOes) {
        return src.to_string();
    }
    if !caps.has_extension(OES_ESSL3_EXTENSION) {
        warn!(
            "external texture sampled from ESSL {} without {OES_ESSL3_EXTENSION}",
            version.version
        );
        return src.to_string();
    }
    EXTERNAL_EXTENSION
        .replace_all(src, "${1}GL_OES_EGL_image_external_essl3${2}")
        .into_owned()
}

/// Rewrites `texture2D(` for the version and target.
pub fn mangle_texture_access(src: &str, version: GlslVersion, target: TextureTarget) -> String {
    let call = if version.uses_modern_io() {
        "texture"
    } else {
        target.legacy_texture_call()
    };
    TEXTURE_2D_CALL
        .replace_all(src, |caps: &Captures<'_>| format!("{call}{}", &caps[1]))
        .into_owned()
}

/// Rewrites `sampler2D` declarations to the target's sampler type.
pub fn mangle_sampler_type(src: &str, target: TextureTarget) -> String {
    let sampler = target.sampler_type();
    SAMPLER_2D
        .replace_all(src, |caps: &Captures<'_>| {
            format!("{}{sampler}{}", &caps[1], &caps[2])
        })
        .into_owned()
}

/// `attribute`/`varying` to `in`/`out`.
pub fn mangle_varying_attribute(src: &str, stage: ShaderStage, version: GlslVersion) -> String {
    if !version.uses_modern_io() {
        return src.to_string();
    }
    match stage {
        ShaderStage::Vertex => {
            let s = ATTRIBUTE.replace_all(src, "in");
            VARYING.replace_all(&s, "out").into_owned()
        }
        ShaderStage::Fragment => VARYING.replace_all(src, "in").into_owned(),
    }
}

/// Built-in fragment outputs to user-declared ones.
pub fn mangle_frag_output(src: &str, version: GlslVersion) -> String {
    if !version.uses_modern_io() {
        return src.to_string();
    }
    let s = FRAG_COLOR.replace_all(src, "fragColor");
    FRAG_DATA.replace_all(&s, "fragColor_${1}").into_owned()
}

/// Runs every pass for one shader stage.
///
/// `from` is the target the text was written against, `to` the one it will sample.
pub fn mangle_shader(
    src: &str,
    stage: ShaderStage,
    from: TextureTarget,
    to: TextureTarget,
    version: GlslVersion,
    caps: &GlCapabilities,
) -> String {
    let mut out = mangle_external_extension(src, version, to, caps);
    out = mangle_texture_access(&out, version, to);
    if from != to {
        out = mangle_sampler_type(&out, to);
    }
    out = mangle_varying_attribute(&out, stage, version);
    mangle_frag_output(&out, version)
}
