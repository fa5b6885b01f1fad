//! Static pixel-format catalog.
//!
//! Every format is described once, in [`CATALOG`] order, which matches the declaration order
//! of [`VideoFormat`] so lookups are a plain index.

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Component flags of a format.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FormatFlags: u32 {
        const YUV = 1 << 0;
        const RGB = 1 << 1;
        const GRAY = 1 << 2;
        const ALPHA = 1 << 3;
        const LE = 1 << 4;
        const PALETTE = 1 << 5;
        const COMPLEX = 1 << 6;
        const UNPACK = 1 << 7;
        const TILED = 1 << 8;
    }
}

impl FormatFlags {
    pub const COLORSPACE: FormatFlags = FormatFlags::YUV
        .union(FormatFlags::RGB)
        .union(FormatFlags::GRAY);

    /// Flags that take part in loss scoring (endianness and packing details removed).
    pub fn scored(self) -> FormatFlags {
        self.difference(FormatFlags::LE | FormatFlags::COMPLEX | FormatFlags::UNPACK)
    }
}

/// Colorspace class used by negotiation and body dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatClass {
    Rgb,
    Yuv,
    Gray,
}

/// How a format spreads its components over planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneLayout {
    /// One plane, one pixel per texel.
    Packed,
    /// One plane per component.
    Planar,
    /// Luma plane plus an interleaved two-component chroma plane (plus optional alpha).
    SemiPlanar,
    /// Two horizontally adjacent pixels share chroma inside one plane (YUY2-like).
    PackedSubsampled,
    /// Semi-planar stored in fixed-size tiles.
    Tiled,
}

/// Storage of one plane, expressed as what a texture holding it must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneStorage {
    /// `n` 8-bit normalized components.
    Unorm8(u8),
    /// `n` 16-bit normalized components.
    Unorm16(u8),
    Rgb565,
    Rgb10A2,
}

impl PlaneStorage {
    pub fn components(self) -> u32 {
        match self {
            PlaneStorage::Unorm8(n) | PlaneStorage::Unorm16(n) => n as u32,
            PlaneStorage::Rgb565 => 3,
            PlaneStorage::Rgb10A2 => 4,
        }
    }

    pub fn bytes_per_texel(self) -> u32 {
        match self {
            PlaneStorage::Unorm8(n) => n as u32,
            PlaneStorage::Unorm16(n) => 2 * n as u32,
            PlaneStorage::Rgb565 => 2,
            PlaneStorage::Rgb10A2 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaneDesc {
    pub storage: PlaneStorage,
    /// Plane dimensions are divided by the chroma subsampling factors.
    pub subsampled: bool,
}

/// Tile geometry of a tiled format, in texels of the luma and chroma planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileDims {
    pub luma: (u32, u32),
    pub chroma: (u32, u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoFormat {
    // packed RGB
    Rgba,
    Rgb,
    Rgbx,
    Bgr,
    Bgrx,
    Bgra,
    Xrgb,
    Xbgr,
    Argb,
    Abgr,
    Rbga,
    Argb64,
    Rgba64Le,
    Rgb16,
    Bgr16,
    Bgr10a2Le,
    Rgb10a2Le,
    Rgb8p,
    // planar RGB
    Gbr,
    Gbra,
    Rgbp,
    Bgrp,
    // gray
    Gray8,
    Gray16Le,
    Gray16Be,
    // packed YUV
    Ayuv,
    Vuya,
    Y410,
    Y412Le,
    Yuy2,
    Uyvy,
    Y210,
    Y212Le,
    // planar YUV
    I420,
    Yv12,
    Y42b,
    Y41b,
    Y444,
    I420_10Le,
    I420_12Le,
    A420,
    A422,
    A444,
    A420_10Le,
    A422_10Le,
    A444_10Le,
    A420_12Le,
    A422_12Le,
    A444_12Le,
    A420_16Le,
    A422_16Le,
    A444_16Le,
    // semi-planar YUV
    Nv12,
    Nv21,
    Nv16,
    Nv61,
    Av12,
    P010_10Le,
    P012Le,
    P016Le,
    // tiled
    Nv12_16L32s,
    Nv12_4L4,
}

/// Immutable descriptor of one pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    pub format: VideoFormat,
    pub name: &'static str,
    pub flags: FormatFlags,
    /// Bits per component (the smallest component for mixed depths such as RGB565).
    pub bits: u32,
    pub n_components: u32,
    /// log2 of the horizontal chroma subsampling factor.
    pub w_sub: u32,
    /// log2 of the vertical chroma subsampling factor.
    pub h_sub: u32,
    pub big_endian: bool,
    pub layout: PlaneLayout,
    pub planes: &'static [PlaneDesc],
    /// Position of canonical component i (R/Y, G/U, B/V, A) in the natural layout.
    /// For planar formats the position is the plane index.
    pub swizzle: [u8; 4],
    pub tile: Option<TileDims>,
}

impl FormatInfo {
    pub fn class(&self) -> FormatClass {
        if self.flags.contains(FormatFlags::YUV) {
            FormatClass::Yuv
        } else if self.flags.contains(FormatFlags::GRAY) {
            FormatClass::Gray
        } else {
            FormatClass::Rgb
        }
    }

    pub fn is_rgb(&self) -> bool {
        self.flags.contains(FormatFlags::RGB)
    }
    pub fn is_yuv(&self) -> bool {
        self.flags.contains(FormatFlags::YUV)
    }
    pub fn is_gray(&self) -> bool {
        self.flags.contains(FormatFlags::GRAY)
    }
    pub fn has_alpha(&self) -> bool {
        self.flags.contains(FormatFlags::ALPHA)
    }
    pub fn is_tiled(&self) -> bool {
        self.flags.contains(FormatFlags::TILED)
    }

    pub fn n_planes(&self) -> usize {
        self.planes.len()
    }

    /// Horizontal chroma subsampling factor (1, 2 or 4).
    pub fn chroma_factor_w(&self) -> u32 {
        1 << self.w_sub
    }
    /// Vertical chroma subsampling factor (1 or 2).
    pub fn chroma_factor_h(&self) -> u32 {
        1 << self.h_sub
    }

    /// Width of `plane` for a frame `width` pixels wide, rounding up.
    pub fn plane_width(&self, plane: usize, width: u32) -> u32 {
        match self.planes.get(plane) {
            Some(p) if p.subsampled => (width + (1 << self.w_sub) - 1) >> self.w_sub,
            _ => width,
        }
    }

    pub fn plane_height(&self, plane: usize, height: u32) -> u32 {
        match self.planes.get(plane) {
            Some(p) if p.subsampled => (height + (1 << self.h_sub) - 1) >> self.h_sub,
            _ => height,
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Catalog
// -------------------------------------------------------------------------------------------------

const fn plane(storage: PlaneStorage, subsampled: bool) -> PlaneDesc {
    PlaneDesc {
        storage,
        subsampled,
    }
}

const R8: PlaneDesc = plane(PlaneStorage::Unorm8(1), false);
const R8_SUB: PlaneDesc = plane(PlaneStorage::Unorm8(1), true);
const RG8: PlaneDesc = plane(PlaneStorage::Unorm8(2), false);
const RG8_SUB: PlaneDesc = plane(PlaneStorage::Unorm8(2), true);
const RGB8: PlaneDesc = plane(PlaneStorage::Unorm8(3), false);
const RGBA8: PlaneDesc = plane(PlaneStorage::Unorm8(4), false);
const R16: PlaneDesc = plane(PlaneStorage::Unorm16(1), false);
const R16_SUB: PlaneDesc = plane(PlaneStorage::Unorm16(1), true);
const RG16: PlaneDesc = plane(PlaneStorage::Unorm16(2), false);
const RG16_SUB: PlaneDesc = plane(PlaneStorage::Unorm16(2), true);
const RGBA16: PlaneDesc = plane(PlaneStorage::Unorm16(4), false);
const RGB565: PlaneDesc = plane(PlaneStorage::Rgb565, false);
const RGB10A2: PlaneDesc = plane(PlaneStorage::Rgb10A2, false);

const IDENTITY: [u8; 4] = [0, 1, 2, 3];

#[allow(clippy::too_many_arguments)]
const fn entry(
    format: VideoFormat,
    name: &'static str,
    flags: FormatFlags,
    bits: u32,
    n_components: u32,
    (w_sub, h_sub): (u32, u32),
    layout: PlaneLayout,
    planes: &'static [PlaneDesc],
    swizzle: [u8; 4],
) -> FormatInfo {
    FormatInfo {
        format,
        name,
        flags,
        bits,
        n_components,
        w_sub,
        h_sub,
        big_endian: false,
        layout,
        planes,
        swizzle,
        tile: None,
    }
}

const fn big_endian(mut info: FormatInfo) -> FormatInfo {
    info.big_endian = true;
    info
}

const fn tiled(mut info: FormatInfo, tile: TileDims) -> FormatInfo {
    info.tile = Some(tile);
    info
}

const fn f(bits: u32) -> FormatFlags {
    FormatFlags::from_bits_truncate(bits)
}

const RGB: u32 = FormatFlags::RGB.bits();
const YUV: u32 = FormatFlags::YUV.bits();
const GRAY: u32 = FormatFlags::GRAY.bits();
const A: u32 = FormatFlags::ALPHA.bits();
const LE: u32 = FormatFlags::LE.bits();
const PAL: u32 = FormatFlags::PALETTE.bits();
const CPLX: u32 = FormatFlags::COMPLEX.bits();
const TILE: u32 = FormatFlags::TILED.bits();

use PlaneLayout::{Packed, PackedSubsampled, Planar, SemiPlanar, Tiled};
use VideoFormat as V;

/// All formats, in [`VideoFormat`] declaration order.
pub static CATALOG: &[FormatInfo] = &[
    entry(V::Rgba, "RGBA", f(RGB | A), 8, 4, (0, 0), Packed, &[RGBA8], IDENTITY),
    entry(V::Rgb, "RGB", f(RGB), 8, 3, (0, 0), Packed, &[RGB8], IDENTITY),
    entry(V::Rgbx, "RGBx", f(RGB), 8, 3, (0, 0), Packed, &[RGBA8], IDENTITY),
    entry(V::Bgr, "BGR", f(RGB), 8, 3, (0, 0), Packed, &[RGB8], [2, 1, 0, 3]),
    entry(V::Bgrx, "BGRx", f(RGB), 8, 3, (0, 0), Packed, &[RGBA8], [2, 1, 0, 3]),
    entry(V::Bgra, "BGRA", f(RGB | A), 8, 4, (0, 0), Packed, &[RGBA8], [2, 1, 0, 3]),
    entry(V::Xrgb, "xRGB", f(RGB), 8, 3, (0, 0), Packed, &[RGBA8], [1, 2, 3, 0]),
    entry(V::Xbgr, "xBGR", f(RGB), 8, 3, (0, 0), Packed, &[RGBA8], [3, 2, 1, 0]),
    entry(V::Argb, "ARGB", f(RGB | A), 8, 4, (0, 0), Packed, &[RGBA8], [1, 2, 3, 0]),
    entry(V::Abgr, "ABGR", f(RGB | A), 8, 4, (0, 0), Packed, &[RGBA8], [3, 2, 1, 0]),
    entry(V::Rbga, "RBGA", f(RGB | A), 8, 4, (0, 0), Packed, &[RGBA8], [0, 2, 1, 3]),
    entry(V::Argb64, "ARGB64", f(RGB | A), 16, 4, (0, 0), Packed, &[RGBA16], [1, 2, 3, 0]),
    entry(V::Rgba64Le, "RGBA64_LE", f(RGB | A | LE), 16, 4, (0, 0), Packed, &[RGBA16], IDENTITY),
    entry(V::Rgb16, "RGB16", f(RGB | LE), 5, 3, (0, 0), Packed, &[RGB565], IDENTITY),
    entry(V::Bgr16, "BGR16", f(RGB | LE), 5, 3, (0, 0), Packed, &[RGB565], [2, 1, 0, 3]),
    entry(V::Bgr10a2Le, "BGR10A2_LE", f(RGB | A | LE), 10, 4, (0, 0), Packed, &[RGB10A2], [2, 1, 0, 3]),
    entry(V::Rgb10a2Le, "RGB10A2_LE", f(RGB | A | LE), 10, 4, (0, 0), Packed, &[RGB10A2], IDENTITY),
    entry(V::Rgb8p, "RGB8P", f(RGB | PAL), 8, 3, (0, 0), Packed, &[R8], IDENTITY),
    entry(V::Gbr, "GBR", f(RGB), 8, 3, (0, 0), Planar, &[R8, R8, R8], [2, 0, 1, 3]),
    entry(V::Gbra, "GBRA", f(RGB | A), 8, 4, (0, 0), Planar, &[R8, R8, R8, R8], [2, 0, 1, 3]),
    entry(V::Rgbp, "RGBP", f(RGB), 8, 3, (0, 0), Planar, &[R8, R8, R8], IDENTITY),
    entry(V::Bgrp, "BGRP", f(RGB), 8, 3, (0, 0), Planar, &[R8, R8, R8], [2, 1, 0, 3]),
    entry(V::Gray8, "GRAY8", f(GRAY), 8, 1, (0, 0), Packed, &[R8], [0, 0, 0, 3]),
    entry(V::Gray16Le, "GRAY16_LE", f(GRAY | LE), 16, 1, (0, 0), Packed, &[RG8], [0, 0, 0, 3]),
    big_endian(entry(V::Gray16Be, "GRAY16_BE", f(GRAY), 16, 1, (0, 0), Packed, &[RG8], [0, 0, 0, 3])),
    entry(V::Ayuv, "AYUV", f(YUV | A), 8, 4, (0, 0), Packed, &[RGBA8], [1, 2, 3, 0]),
    entry(V::Vuya, "VUYA", f(YUV | A), 8, 4, (0, 0), Packed, &[RGBA8], [2, 1, 0, 3]),
    entry(V::Y410, "Y410", f(YUV | A | LE), 10, 4, (0, 0), Packed, &[RGB10A2], [1, 0, 2, 3]),
    entry(V::Y412Le, "Y412_LE", f(YUV | A | LE), 12, 4, (0, 0), Packed, &[RGBA16], [1, 0, 2, 3]),
    entry(V::Yuy2, "YUY2", f(YUV), 8, 3, (1, 0), PackedSubsampled, &[RG8], IDENTITY),
    entry(V::Uyvy, "UYVY", f(YUV), 8, 3, (1, 0), PackedSubsampled, &[RG8], IDENTITY),
    entry(V::Y210, "Y210", f(YUV | LE), 10, 3, (1, 0), PackedSubsampled, &[RG16], IDENTITY),
    entry(V::Y212Le, "Y212_LE", f(YUV | LE), 12, 3, (1, 0), PackedSubsampled, &[RG16], IDENTITY),
    entry(V::I420, "I420", f(YUV), 8, 3, (1, 1), Planar, &[R8, R8_SUB, R8_SUB], IDENTITY),
    entry(V::Yv12, "YV12", f(YUV), 8, 3, (1, 1), Planar, &[R8, R8_SUB, R8_SUB], [0, 2, 1, 3]),
    entry(V::Y42b, "Y42B", f(YUV), 8, 3, (1, 0), Planar, &[R8, R8_SUB, R8_SUB], IDENTITY),
    entry(V::Y41b, "Y41B", f(YUV), 8, 3, (2, 0), Planar, &[R8, R8_SUB, R8_SUB], IDENTITY),
    entry(V::Y444, "Y444", f(YUV), 8, 3, (0, 0), Planar, &[R8, R8, R8], IDENTITY),
    entry(V::I420_10Le, "I420_10LE", f(YUV | LE), 10, 3, (1, 1), Planar, &[R16, R16_SUB, R16_SUB], IDENTITY),
    entry(V::I420_12Le, "I420_12LE", f(YUV | LE), 12, 3, (1, 1), Planar, &[R16, R16_SUB, R16_SUB], IDENTITY),
    entry(V::A420, "A420", f(YUV | A), 8, 4, (1, 1), Planar, &[R8, R8_SUB, R8_SUB, R8], IDENTITY),
    entry(V::A422, "A422", f(YUV | A), 8, 4, (1, 0), Planar, &[R8, R8_SUB, R8_SUB, R8], IDENTITY),
    entry(V::A444, "A444", f(YUV | A), 8, 4, (0, 0), Planar, &[R8, R8, R8, R8], IDENTITY),
    entry(V::A420_10Le, "A420_10LE", f(YUV | A | LE), 10, 4, (1, 1), Planar, &[R16, R16_SUB, R16_SUB, R16], IDENTITY),
    entry(V::A422_10Le, "A422_10LE", f(YUV | A | LE), 10, 4, (1, 0), Planar, &[R16, R16_SUB, R16_SUB, R16], IDENTITY),
    entry(V::A444_10Le, "A444_10LE", f(YUV | A | LE), 10, 4, (0, 0), Planar, &[R16, R16, R16, R16], IDENTITY),
    entry(V::A420_12Le, "A420_12LE", f(YUV | A | LE), 12, 4, (1, 1), Planar, &[R16, R16_SUB, R16_SUB, R16], IDENTITY),
    entry(V::A422_12Le, "A422_12LE", f(YUV | A | LE), 12, 4, (1, 0), Planar, &[R16, R16_SUB, R16_SUB, R16], IDENTITY),
    entry(V::A444_12Le, "A444_12LE", f(YUV | A | LE), 12, 4, (0, 0), Planar, &[R16, R16, R16, R16], IDENTITY),
    entry(V::A420_16Le, "A420_16LE", f(YUV | A | LE), 16, 4, (1, 1), Planar, &[R16, R16_SUB, R16_SUB, R16], IDENTITY),
    entry(V::A422_16Le, "A422_16LE", f(YUV | A | LE), 16, 4, (1, 0), Planar, &[R16, R16_SUB, R16_SUB, R16], IDENTITY),
    entry(V::A444_16Le, "A444_16LE", f(YUV | A | LE), 16, 4, (0, 0), Planar, &[R16, R16, R16, R16], IDENTITY),
    entry(V::Nv12, "NV12", f(YUV), 8, 3, (1, 1), SemiPlanar, &[R8, RG8_SUB], IDENTITY),
    entry(V::Nv21, "NV21", f(YUV), 8, 3, (1, 1), SemiPlanar, &[R8, RG8_SUB], [0, 2, 1, 3]),
    entry(V::Nv16, "NV16", f(YUV), 8, 3, (1, 0), SemiPlanar, &[R8, RG8_SUB], IDENTITY),
    entry(V::Nv61, "NV61", f(YUV), 8, 3, (1, 0), SemiPlanar, &[R8, RG8_SUB], [0, 2, 1, 3]),
    entry(V::Av12, "AV12", f(YUV | A), 8, 4, (1, 1), SemiPlanar, &[R8, RG8_SUB, R8], IDENTITY),
    entry(V::P010_10Le, "P010_10LE", f(YUV | LE), 10, 3, (1, 1), SemiPlanar, &[R16, RG16_SUB], IDENTITY),
    entry(V::P012Le, "P012_LE", f(YUV | LE), 12, 3, (1, 1), SemiPlanar, &[R16, RG16_SUB], IDENTITY),
    entry(V::P016Le, "P016_LE", f(YUV | LE), 16, 3, (1, 1), SemiPlanar, &[R16, RG16_SUB], IDENTITY),
    tiled(
        entry(V::Nv12_16L32s, "NV12_16L32S", f(YUV | TILE | CPLX), 8, 3, (1, 1), Tiled, &[R8, RG8_SUB], IDENTITY),
        TileDims {
            luma: (16, 32),
            chroma: (8, 16),
        },
    ),
    tiled(
        entry(V::Nv12_4L4, "NV12_4L4", f(YUV | TILE), 8, 3, (1, 1), Tiled, &[R8, RG8_SUB], IDENTITY),
        TileDims {
            luma: (4, 4),
            chroma: (2, 4),
        },
    ),
];

impl VideoFormat {
    pub fn info(self) -> &'static FormatInfo {
        &CATALOG[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Case-sensitive lookup by canonical name (`"NV12"`, `"GRAY16_LE"`, ...).
    pub fn from_name(name: &str) -> Option<VideoFormat> {
        CATALOG.iter().find(|i| i.name == name).map(|i| i.format)
    }

    pub fn all() -> impl Iterator<Item = VideoFormat> {
        CATALOG.iter().map(|i| i.format)
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for VideoFormat {
    type Err = pixconv_core::ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VideoFormat::from_name(s).ok_or_else(|| pixconv_core::ConvertError::UnknownFormat(s.into()))
    }
}
