//! Capability descriptions exchanged during negotiation.
//!
//! A [`Caps`] is an ordered list of alternatives ([`CapsStructure`]); earlier structures are
//! preferred. Absent fields (`None`) leave that property unconstrained.

use crate::format::VideoFormat;
use crate::info::{ChromaSite, Colorimetry};
use crate::target::{TargetMask, TextureTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryKind {
    /// Texture-backed GL memory; the only memory this engine converts.
    Gl,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapsStructure {
    pub memory: MemoryKind,
    pub formats: Option<Vec<VideoFormat>>,
    pub targets: Option<TargetMask>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub colorimetry: Option<Colorimetry>,
    pub chroma_site: Option<ChromaSite>,
}

fn intersect_field<T: PartialEq + Copy>(a: Option<T>, b: Option<T>) -> Result<Option<T>, ()> {
    match (a, b) {
        (Some(x), Some(y)) if x == y => Ok(Some(x)),
        (Some(_), Some(_)) => Err(()),
        (x, None) => Ok(x),
        (None, y) => Ok(y),
    }
}

fn subset_field<T: PartialEq>(a: &Option<T>, b: &Option<T>) -> bool {
    match (a, b) {
        (_, None) => true,
        (Some(x), Some(y)) => x == y,
        (None, Some(_)) => false,
    }
}

impl CapsStructure {
    /// GL memory with the given formats and every other field open.
    pub fn gl(formats: impl IntoIterator<Item = VideoFormat>) -> Self {
        Self {
            memory: MemoryKind::Gl,
            formats: Some(formats.into_iter().collect()),
            targets: None,
            width: None,
            height: None,
            colorimetry: None,
            chroma_site: None,
        }
    }

    pub fn with_targets(mut self, targets: TargetMask) -> Self {
        self.targets = Some(targets);
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Targets allowed by this structure; an absent field allows all of them.
    pub fn target_mask(&self) -> TargetMask {
        self.targets.unwrap_or(TargetMask::all())
    }

    pub fn intersect(&self, other: &CapsStructure) -> Option<CapsStructure> {
        if self.memory != other.memory {
            return None;
        }

        let formats = match (&self.formats, &other.formats) {
            (Some(a), Some(b)) => {
                let common: Vec<VideoFormat> = a.iter().copied().filter(|f| b.contains(f)).collect();
                if common.is_empty() {
                    return None;
                }
                Some(common)
            }
            (Some(a), None) => Some(a.clone()),
            (None, b) => b.clone(),
        };

        let targets = match (self.targets, other.targets) {
            (Some(a), Some(b)) => {
                let common = a & b;
                if common.is_empty() {
                    return None;
                }
                Some(common)
            }
            (a, None) => a,
            (None, b) => b,
        };

        Some(CapsStructure {
            memory: self.memory,
            formats,
            targets,
            width: intersect_field(self.width, other.width).ok()?,
            height: intersect_field(self.height, other.height).ok()?,
            colorimetry: intersect_field(self.colorimetry, other.colorimetry).ok()?,
            chroma_site: intersect_field(self.chroma_site, other.chroma_site).ok()?,
        })
    }

    /// True when every value allowed by `self` is also allowed by `other`.
    pub fn is_subset(&self, other: &CapsStructure) -> bool {
        if self.memory != other.memory {
            return false;
        }
        let formats_ok = match (&self.formats, &other.formats) {
            (_, None) => true,
            (Some(a), Some(b)) => a.iter().all(|f| b.contains(f)),
            (None, Some(_)) => false,
        };
        let targets_ok = other.target_mask().contains(self.target_mask());
        formats_ok
            && targets_ok
            && subset_field(&self.width, &other.width)
            && subset_field(&self.height, &other.height)
            && subset_field(&self.colorimetry, &other.colorimetry)
            && subset_field(&self.chroma_site, &other.chroma_site)
    }

    /// Collapses list fields to their first (preferred) value.
    pub fn fixate(&mut self) {
        if let Some(formats) = &mut self.formats {
            formats.truncate(1);
        }
        if let Some(target) = self.targets.and_then(TargetMask::demask) {
            self.targets = Some(target.mask());
        }
    }

    /// The single format, once fixated.
    pub fn format(&self) -> Option<VideoFormat> {
        match self.formats.as_deref() {
            Some([f]) => Some(*f),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<TextureTarget> {
        match self.targets {
            Some(mask) if mask.bits().count_ones() == 1 => mask.demask(),
            _ => None,
        }
    }
}

/// Ordered list of alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Caps {
    pub structures: Vec<CapsStructure>,
}

impl Caps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_structure(s: CapsStructure) -> Self {
        Self {
            structures: vec![s],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    /// Appends `s` unless an existing structure already covers it.
    pub fn merge_structure(&mut self, s: CapsStructure) {
        if !self.structures.iter().any(|existing| s.is_subset(existing)) {
            self.structures.push(s);
        }
    }

    /// Pairwise intersection, ordered by `self` first.
    pub fn intersect(&self, other: &Caps) -> Caps {
        let mut out = Caps::new();
        for a in &self.structures {
            for b in &other.structures {
                if let Some(s) = a.intersect(b) {
                    out.merge_structure(s);
                }
            }
        }
        out
    }

    /// Every format mentioned, first-seen order, duplicates removed.
    pub fn formats(&self) -> Vec<VideoFormat> {
        let mut out = Vec::new();
        for s in &self.structures {
            for f in s.formats.iter().flatten() {
                if !out.contains(f) {
                    out.push(*f);
                }
            }
        }
        out
    }
}
