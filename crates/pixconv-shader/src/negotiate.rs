//! Format negotiation: which formats are reachable from a set of inputs, and which single
//! output (format, target) loses the least information for a fixed input.

use pixconv_format::{
    Caps, CapsStructure, FormatClass, FormatFlags, FormatInfo, GlCapabilities, MemoryKind,
    TargetMask, TexFormat, TextureTarget, VideoFormat,
};
use tracing::{debug, trace};

use VideoFormat as V;

// -------------------------------------------------------------------------------------------------
// Supported format lists
// -------------------------------------------------------------------------------------------------

const ALWAYS: &[VideoFormat] = &[
    V::Rgba,
    V::Rgb,
    V::Rgbx,
    V::Bgr,
    V::Bgrx,
    V::Bgra,
    V::Xrgb,
    V::Xbgr,
    V::Argb,
    V::Abgr,
    V::Gray8,
    V::Gray16Le,
    V::Gray16Be,
    V::Ayuv,
    V::Vuya,
    V::Rbga,
];

/// Formats with more than one plane. Always readable; writable only with draw buffers.
const MULTI_PLANE: &[VideoFormat] = &[
    V::Gbra,
    V::Gbr,
    V::Rgbp,
    V::Bgrp,
    V::Y444,
    V::I420,
    V::Yv12,
    V::Y42b,
    V::Y41b,
    V::Nv12,
    V::Nv21,
    V::Nv16,
    V::Nv61,
    V::A420,
    V::Av12,
    V::A444,
    V::A422,
];

const PACKED_422: &[VideoFormat] = &[V::Yuy2, V::Uyvy];
const NEEDS_RGBA16: &[VideoFormat] = &[V::Argb64, V::Rgba64Le];
const NEEDS_RGB565: &[VideoFormat] = &[V::Rgb16, V::Bgr16];
const NEEDS_RGB10_A2: &[VideoFormat] = &[V::Bgr10a2Le, V::Rgb10a2Le, V::Y410];
const NEEDS_R16_RG16: &[VideoFormat] = &[V::P010_10Le, V::P012Le, V::P016Le];
const NEEDS_RG16: &[VideoFormat] = &[V::Y210, V::Y212Le];
const NEEDS_RGBA16_YUV: &[VideoFormat] = &[V::Y412Le];
const NEEDS_R16: &[VideoFormat] = &[
    V::A420_10Le,
    V::A422_10Le,
    V::A444_10Le,
    V::A444_12Le,
    V::A422_12Le,
    V::A420_12Le,
    V::A444_16Le,
    V::A422_16Le,
    V::A420_16Le,
    V::I420_12Le,
    V::I420_10Le,
];
const TILED: &[VideoFormat] = &[V::Nv12_16L32s, V::Nv12_4L4];

/// RGB formats in preference order.
const RGB_FORMATS: &[VideoFormat] = &[
    V::Rgba,
    V::Argb,
    V::Bgra,
    V::Abgr,
    V::Rgbx,
    V::Xrgb,
    V::Bgrx,
    V::Xbgr,
    V::Rgb,
    V::Bgr,
    V::Argb64,
    V::Bgr10a2Le,
    V::Rgb10a2Le,
    V::Rgba64Le,
    V::Rbga,
    V::Gbra,
    V::Gbr,
    V::Rgbp,
    V::Bgrp,
    V::Rgb16,
    V::Bgr16,
];

/// Formats the converter can read (`output == false`) or write on a context.
///
/// `None` means no context is known yet; everything is offered.
pub fn supported_formats(caps: Option<&GlCapabilities>, output: bool) -> Vec<VideoFormat> {
    let gate = |ok: fn(&GlCapabilities) -> bool| caps.map_or(true, ok);

    let mut out = ALWAYS.to_vec();
    if !output || gate(|c| c.draw_buffers) {
        out.extend_from_slice(MULTI_PLANE);
    }
    // Writing these needs RG/LA framebuffer reads.
    if gate(|c| !c.is_gles2_only()) {
        out.extend_from_slice(PACKED_422);
    }
    if gate(|c| c.supports(TexFormat::Rgba16)) {
        out.extend_from_slice(NEEDS_RGBA16);
    }
    if gate(|c| c.supports(TexFormat::Rgb565)) {
        out.extend_from_slice(NEEDS_RGB565);
    }
    if gate(|c| c.supports(TexFormat::Rgb10A2)) {
        out.extend_from_slice(NEEDS_RGB10_A2);
    }
    if gate(|c| c.supports(TexFormat::R16) && c.supports(TexFormat::Rg16)) {
        out.extend_from_slice(NEEDS_R16_RG16);
    }
    if gate(|c| c.supports(TexFormat::Rg16)) {
        out.extend_from_slice(NEEDS_RG16);
    }
    if gate(|c| c.supports(TexFormat::Rgba16)) {
        out.extend_from_slice(NEEDS_RGBA16_YUV);
    }
    if gate(|c| c.supports(TexFormat::R16)) {
        out.extend_from_slice(NEEDS_R16);
    }
    if gate(|c| c.has_texel_fetch()) {
        out.extend_from_slice(TILED);
    }
    out
}

/// The RGB subset of [`supported_formats`], in RGB preference order.
pub fn supported_rgb_formats(caps: Option<&GlCapabilities>, output: bool) -> Vec<VideoFormat> {
    let supported = supported_formats(caps, output);
    RGB_FORMATS
        .iter()
        .copied()
        .filter(|f| supported.contains(f))
        .collect()
}

fn push_unique(out: &mut Vec<VideoFormat>, formats: impl IntoIterator<Item = VideoFormat>) {
    for f in formats {
        if !out.contains(&f) {
            out.push(f);
        }
    }
}

fn is_yuv_or_gray(format: VideoFormat) -> bool {
    format.info().class() != FormatClass::Rgb
}

/// Formats reachable by converting any of `formats`.
///
/// YUV and GRAY inputs reach themselves (passthrough) and every RGB format; RGB inputs reach
/// everything supported. YUV/GRAY never reach another YUV/GRAY format directly.
pub fn negotiate_caps(
    formats: &[VideoFormat],
    caps: Option<&GlCapabilities>,
    output: bool,
) -> Vec<VideoFormat> {
    let supported = supported_formats(caps, output);
    let rgb = supported_rgb_formats(caps, output);

    let mut out = Vec::new();
    for &format in formats {
        if is_yuv_or_gray(format) {
            push_unique(&mut out, [format]);
            push_unique(&mut out, rgb.iter().copied());
        } else {
            push_unique(&mut out, supported.iter().copied());
        }
    }
    out
}

/// Structure-level caps transform used during capability exchange.
///
/// Only GL-memory structures are rewritten. The result is intersected with `filter` last,
/// keeping the filter's order.
pub fn transform_caps(
    caps: Option<&GlCapabilities>,
    output: bool,
    input: &Caps,
    filter: Option<&Caps>,
) -> Caps {
    let supported = supported_formats(caps, output);
    let rgb = supported_rgb_formats(caps, output);

    let mut res = Caps::new();
    for (i, st) in input.structures.iter().enumerate() {
        if i > 0 && res.structures.iter().any(|existing| st.is_subset(existing)) {
            continue;
        }

        let mut st = st.clone();
        if st.memory == MemoryKind::Gl {
            if let Some(formats) = st.formats.clone() {
                let mut passthrough = Vec::new();
                let mut have_rgb = false;
                for f in formats {
                    if is_yuv_or_gray(f) {
                        passthrough.push(f);
                    } else {
                        have_rgb = true;
                        break;
                    }
                }

                if have_rgb {
                    st.formats = Some(supported.clone());
                } else {
                    let mut pass = st.clone();
                    pass.formats = Some(passthrough);
                    res.structures.push(pass);
                    st.formats = Some(rgb.clone());
                }
            }
            st.colorimetry = None;
            st.chroma_site = None;
            st.targets = None;
        }
        res.structures.push(st);
    }

    match filter {
        Some(filter) => filter.intersect(&res),
        None => res,
    }
}

// -------------------------------------------------------------------------------------------------
// Fixation
// -------------------------------------------------------------------------------------------------

pub const SCORE_FORMAT_CHANGE: u32 = 1;
pub const SCORE_DEPTH_CHANGE: u32 = 1;
pub const SCORE_ALPHA_CHANGE: u32 = 1;
pub const SCORE_CHROMA_W_CHANGE: u32 = 1;
pub const SCORE_CHROMA_H_CHANGE: u32 = 1;
pub const SCORE_PALETTE_CHANGE: u32 = 1;

pub const SCORE_COLORSPACE_LOSS: u32 = 2;
pub const SCORE_DEPTH_LOSS: u32 = 4;
pub const SCORE_ALPHA_LOSS: u32 = 8;
pub const SCORE_CHROMA_W_LOSS: u32 = 16;
pub const SCORE_CHROMA_H_LOSS: u32 = 32;
pub const SCORE_PALETTE_LOSS: u32 = 64;
pub const SCORE_COLOR_LOSS: u32 = 128;

/// One output alternative: a format and the targets it may live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub format: VideoFormat,
    pub targets: TargetMask,
}

impl Candidate {
    pub fn new(format: VideoFormat, targets: impl Into<TargetMask>) -> Self {
        Self {
            format,
            targets: targets.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixation {
    pub format: VideoFormat,
    pub target: TextureTarget,
    pub loss: u32,
}

/// Loss of converting `input` into `candidate`, ignoring targets.
///
/// `None` when the pair is never allowed (YUV/GRAY into YUV/GRAY). Identical formats are
/// not special-cased here; see [`fixate`].
pub fn format_loss(input: &FormatInfo, candidate: &FormatInfo) -> Option<u32> {
    let in_flags = input.flags.scored();
    let t_flags = candidate.flags.scored();
    let non_rgb = FormatFlags::YUV | FormatFlags::GRAY;

    if in_flags.intersects(non_rgb) && t_flags.intersects(non_rgb) {
        return None;
    }

    let mut loss = SCORE_FORMAT_CHANGE;

    let palette = FormatFlags::PALETTE;
    if (t_flags & palette) != (in_flags & palette) {
        loss += SCORE_PALETTE_CHANGE;
        if t_flags.contains(palette) {
            loss += SCORE_PALETTE_LOSS;
        }
    }

    let colorspace = FormatFlags::COLORSPACE;
    if (t_flags & colorspace) != (in_flags & colorspace) {
        loss += SCORE_COLORSPACE_LOSS;
        if t_flags.contains(FormatFlags::GRAY) {
            loss += SCORE_COLOR_LOSS;
        }
    }

    let alpha = FormatFlags::ALPHA;
    if (t_flags & alpha) != (in_flags & alpha) {
        loss += SCORE_ALPHA_CHANGE;
        if in_flags.contains(alpha) {
            loss += SCORE_ALPHA_LOSS;
        }
    }

    if input.h_sub != candidate.h_sub {
        loss += SCORE_CHROMA_H_CHANGE;
        if input.h_sub < candidate.h_sub {
            loss += SCORE_CHROMA_H_LOSS;
        }
    }
    if input.w_sub != candidate.w_sub {
        loss += SCORE_CHROMA_W_CHANGE;
        if input.w_sub < candidate.w_sub {
            loss += SCORE_CHROMA_W_LOSS;
        }
    }

    if input.bits != candidate.bits {
        loss += SCORE_DEPTH_CHANGE;
        if input.bits > candidate.bits {
            loss += SCORE_DEPTH_LOSS;
        }
    }

    Some(loss)
}

fn score(input: VideoFormat, input_mask: TargetMask, candidate: &Candidate) -> Option<Fixation> {
    // exact match short-circuit
    let shared = input_mask & candidate.targets;
    if candidate.format == input && !shared.is_empty() {
        return Some(Fixation {
            format: input,
            target: shared.demask()?,
            loss: 0,
        });
    }

    // external-oes can only be passed through
    let mut targets = candidate.targets - TargetMask::EXTERNAL_OES;
    if targets.is_empty() {
        return None;
    }
    if targets.intersects(input_mask) {
        targets &= input_mask;
    }

    let loss = format_loss(input.info(), candidate.format.info())?;
    Some(Fixation {
        format: candidate.format,
        target: targets.demask()?,
        loss,
    })
}

/// Picks the candidate with the least loss. Ties keep the earlier candidate.
pub fn fixate(
    input: VideoFormat,
    input_target: impl Into<TargetMask>,
    candidates: &[Candidate],
) -> Option<Fixation> {
    let input_mask = input_target.into();
    let mut best: Option<Fixation> = None;

    for candidate in candidates {
        let Some(scored) = score(input, input_mask, candidate) else {
            trace!(format = %candidate.format, "candidate rejected");
            continue;
        };
        trace!(format = %scored.format, loss = scored.loss, "scored candidate");
        if best.map_or(true, |b| scored.loss < b.loss) {
            best = Some(scored);
            if scored.loss == 0 {
                break;
            }
        }
    }

    if let Some(b) = &best {
        debug!(input = %input, output = %b.format, target = %b.target, loss = b.loss, "fixated");
    }
    best
}

/// Fixates `other` against the fixed `input` structure.
///
/// Returns the first structure of the (possibly intersected) alternatives, with the winning
/// format and target written in and every list collapsed to a single value.
pub fn fixate_caps(input: &CapsStructure, other: &Caps) -> Option<CapsStructure> {
    let intersected = other.intersect(&Caps::from_structure(input.clone()));
    let result = if intersected.is_empty() {
        other.clone()
    } else {
        intersected
    };

    let mut out = result.structures.first()?.clone();

    if let Some(in_format) = input.format() {
        let candidates: Vec<Candidate> = result
            .structures
            .iter()
            .flat_map(|s| {
                let targets = s.target_mask();
                s.formats
                    .iter()
                    .flatten()
                    .map(move |&format| Candidate { format, targets })
            })
            .collect();

        if let Some(winner) = fixate(in_format, input.target_mask(), &candidates) {
            out.formats = Some(vec![winner.format]);
            out.targets = Some(winner.target.mask());
        }
    }

    out.fixate();
    Some(out)
}
