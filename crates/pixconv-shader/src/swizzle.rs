//! Component swizzles between a format's natural layout and canonical RGBA order.
//!
//! A swizzle `s` is applied in GLSL as `vec4(t[s[0]], t[s[1]], t[s[2]], t[s[3]])`.
//! Canonical order is R/Y, G/U, B/V, A.

use pixconv_format::{TexFormat, VideoFormat};

pub type Swizzle = [i32; 4];

pub const IDENTITY: Swizzle = [0, 1, 2, 3];

/// GRAY16 stored as two 8-bit channels is recombined with these (high, low) byte weights:
/// 255·256/65535 and 255/65535.
pub const COMPOSE_WEIGHT: [f32; 2] = [0.996109, 0.003891];

/// Natural component order of `format`.
///
/// Packed 4:2:2 formats carry two pixels per texel pair, so their order depends on
/// direction and is not a permutation.
pub fn format_reorder(format: VideoFormat, input: bool) -> Swizzle {
    match format {
        VideoFormat::Uyvy => [1, 0, if input { 3 } else { 2 }, 0],
        VideoFormat::Yuy2 | VideoFormat::Y210 | VideoFormat::Y212Le => {
            [0, 1, 0, if input { 3 } else { 2 }]
        }
        other => other.info().swizzle.map(i32::from),
    }
}

/// Inverse permutation: `invert(s)[s[i]] == i`.
pub fn invert(s: Swizzle) -> Swizzle {
    let mut out = IDENTITY;
    for (i, &idx) in s.iter().enumerate() {
        if let Some(slot) = usize::try_from(idx).ok().filter(|&v| v < 4) {
            out[slot] = i as i32;
        }
    }
    out
}

/// Applies `s` to a CPU-side vector the way the GLSL `swizzle()` helper does.
pub fn apply<T: Copy>(v: [T; 4], s: Swizzle) -> [T; 4] {
    s.map(|i| v[i.clamp(0, 3) as usize])
}

/// Input and output swizzles for converting `input` into `output` through canonical order.
pub fn calculate(input: VideoFormat, output: VideoFormat) -> (Swizzle, Swizzle) {
    let in_reorder = format_reorder(input, true);
    let out_reorder = format_reorder(output, false);
    let out = match output {
        VideoFormat::Yuy2 | VideoFormat::Uyvy => out_reorder,
        _ => invert(out_reorder),
    };
    (in_reorder, out)
}

fn second_channel(tex: TexFormat) -> i32 {
    if tex == TexFormat::LuminanceAlpha {
        3
    } else {
        1
    }
}

/// Input swizzle for a GRAY source. GRAY8 broadcasts its single channel; GRAY16 puts the
/// (high, low) byte positions in the first two slots for the compose step.
pub fn gray_input_swizzle(format: VideoFormat, tex: TexFormat) -> Swizzle {
    match format {
        VideoFormat::Gray16Le => [second_channel(tex), 0, 2, 3],
        VideoFormat::Gray16Be => [0, second_channel(tex), 2, 3],
        _ => [0, 0, 0, 3],
    }
}

/// Output swizzle for a GRAY destination. GRAY8 writes the luminance-bearing channel
/// everywhere; GRAY16 scatters the packed (high, low) pair into byte order.
pub fn gray_output_swizzle(format: VideoFormat, tex: TexFormat) -> Swizzle {
    let la = tex == TexFormat::LuminanceAlpha;
    let (first, second) = match format {
        VideoFormat::Gray16Le => (1, 0),
        VideoFormat::Gray16Be => (0, 1),
        _ => return [0, 0, 0, 0],
    };
    if la {
        [first, first, first, second]
    } else {
        [first, second, 2, 3]
    }
}

/// Recombines a GRAY16 sample from its two normalized byte channels.
pub fn compose_gray16(texel: [f32; 4], input_swizzle: Swizzle) -> f32 {
    let hi = texel[input_swizzle[0] as usize];
    let lo = texel[input_swizzle[1] as usize];
    hi * COMPOSE_WEIGHT[0] + lo * COMPOSE_WEIGHT[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    // Formats whose layout is an ordinary permutation.
    const ORDINARY: &[VideoFormat] = &[
        VideoFormat::Rgba,
        VideoFormat::Bgra,
        VideoFormat::Argb,
        VideoFormat::Abgr,
        VideoFormat::Rgbx,
        VideoFormat::Xrgb,
        VideoFormat::Rbga,
        VideoFormat::Gbr,
        VideoFormat::Gbra,
        VideoFormat::Bgrp,
        VideoFormat::Ayuv,
        VideoFormat::Vuya,
        VideoFormat::Y410,
        VideoFormat::Yv12,
        VideoFormat::Nv21,
        VideoFormat::Nv12,
    ];

    #[test]
    fn rgba_to_bgra_swaps_r_and_b() {
        let (inp, out) = calculate(VideoFormat::Rgba, VideoFormat::Bgra);
        assert_eq!(inp, IDENTITY);
        assert_eq!(out, [2, 1, 0, 3]);
        let stored = apply(apply([10, 20, 30, 40], inp), out);
        assert_eq!(stored, [30, 20, 10, 40]);
    }

    #[test]
    fn argb_output_puts_alpha_first() {
        let (_, out) = calculate(VideoFormat::Rgba, VideoFormat::Argb);
        assert_eq!(apply(['r', 'g', 'b', 'a'], out), ['a', 'r', 'g', 'b']);
    }

    #[test]
    fn round_trip_restores_component_order() {
        let original = [1, 2, 3, 4];
        for &a in ORDINARY {
            for &b in ORDINARY {
                let (a_in, a_out) = calculate(a, b);
                let (b_in, b_out) = calculate(b, a);
                let stored_b = apply(apply(original, a_in), a_out);
                let back = apply(apply(stored_b, b_in), b_out);
                assert_eq!(back, original, "{a} -> {b} -> {a}");
            }
        }
    }

    #[test]
    fn invert_is_an_involution_on_permutations() {
        for &f in ORDINARY {
            let s = format_reorder(f, true);
            assert_eq!(invert(invert(s)), s, "{f}");
        }
    }

    #[test]
    fn packed_422_uses_raw_output_order() {
        let (inp, out) = calculate(VideoFormat::Rgba, VideoFormat::Uyvy);
        assert_eq!(inp, IDENTITY);
        assert_eq!(out, [1, 0, 2, 0]);
        assert_eq!(format_reorder(VideoFormat::Yuy2, true), [0, 1, 0, 3]);
    }

    #[test]
    fn gray16_byte_order_depends_on_endianness() {
        let le = gray_input_swizzle(VideoFormat::Gray16Le, TexFormat::Rg8);
        let be = gray_input_swizzle(VideoFormat::Gray16Be, TexFormat::Rg8);
        assert_eq!(le[..2], [1, 0]);
        assert_eq!(be[..2], [0, 1]);

        let la = gray_input_swizzle(VideoFormat::Gray16Le, TexFormat::LuminanceAlpha);
        assert_eq!(la[..2], [3, 0]);
    }

    #[test]
    fn gray16_compose_recovers_value() {
        // 0xABCD little endian: first byte 0xCD, second 0xAB.
        let texel = [0xCD as f32 / 255.0, 0xAB as f32 / 255.0, 0.0, 1.0];
        let le = gray_input_swizzle(VideoFormat::Gray16Le, TexFormat::Rg8);
        let v = compose_gray16(texel, le);
        assert!((v * 65535.0 - 0xABCD as f32).abs() < 1.0, "got {}", v * 65535.0);

        let be = gray_input_swizzle(VideoFormat::Gray16Be, TexFormat::Rg8);
        let swapped = compose_gray16(texel, be);
        assert!((swapped * 65535.0 - 0xCDAB as f32).abs() < 1.0);
    }

    #[test]
    fn gray8_output_collapses_to_first_channel() {
        assert_eq!(gray_output_swizzle(VideoFormat::Gray8, TexFormat::R8), [0; 4]);
        assert_eq!(
            gray_output_swizzle(VideoFormat::Gray16Le, TexFormat::Rg8)[..2],
            [1, 0]
        );
    }
}
