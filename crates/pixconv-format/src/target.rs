use std::fmt;

use bitflags::bitflags;

/// Texture target a plane lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    Texture2D,
    Rectangle,
    /// Can be sampled, never rendered into (except by passthrough).
    ExternalOes,
}

impl TextureTarget {
    pub fn name(self) -> &'static str {
        match self {
            TextureTarget::Texture2D => "2D",
            TextureTarget::Rectangle => "rectangle",
            TextureTarget::ExternalOes => "external-oes",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "2D" | "2d" => Some(TextureTarget::Texture2D),
            "rectangle" | "rect" => Some(TextureTarget::Rectangle),
            "external-oes" | "oes" => Some(TextureTarget::ExternalOes),
            _ => None,
        }
    }

    pub fn mask(self) -> TargetMask {
        match self {
            TextureTarget::Texture2D => TargetMask::TEXTURE_2D,
            TextureTarget::Rectangle => TargetMask::RECTANGLE,
            TextureTarget::ExternalOes => TargetMask::EXTERNAL_OES,
        }
    }

    /// Sampler type used in GLSL declarations.
    pub fn sampler_type(self) -> &'static str {
        match self {
            TextureTarget::Texture2D => "sampler2D",
            TextureTarget::Rectangle => "sampler2DRect",
            TextureTarget::ExternalOes => "samplerExternalOES",
        }
    }

    /// Legacy (pre-`texture()`) sampling call.
    pub fn legacy_texture_call(self) -> &'static str {
        match self {
            TextureTarget::Texture2D | TextureTarget::ExternalOes => "texture2D",
            TextureTarget::Rectangle => "texture2DRect",
        }
    }
}

impl fmt::Display for TextureTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Set of texture targets.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TargetMask: u8 {
        const TEXTURE_2D = 1 << 0;
        const RECTANGLE = 1 << 1;
        const EXTERNAL_OES = 1 << 2;
    }
}

impl TargetMask {
    /// Picks one target, preferring 2D, then rectangle, then external.
    pub fn demask(self) -> Option<TextureTarget> {
        if self.contains(TargetMask::TEXTURE_2D) {
            Some(TextureTarget::Texture2D)
        } else if self.contains(TargetMask::RECTANGLE) {
            Some(TextureTarget::Rectangle)
        } else if self.contains(TargetMask::EXTERNAL_OES) {
            Some(TextureTarget::ExternalOes)
        } else {
            None
        }
    }

    pub fn targets(self) -> impl Iterator<Item = TextureTarget> {
        [
            TextureTarget::Texture2D,
            TextureTarget::Rectangle,
            TextureTarget::ExternalOes,
        ]
        .into_iter()
        .filter(move |t| self.contains(t.mask()))
    }
}

impl From<TextureTarget> for TargetMask {
    fn from(t: TextureTarget) -> Self {
        t.mask()
    }
}
