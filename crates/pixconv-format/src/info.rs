use std::fmt;

use crate::format::VideoFormat;

/// Color description carried by a frame. Only the matrix matters for conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Colorimetry {
    Bt601,
    Bt709,
    Bt2020,
    Srgb,
    Unknown,
}

impl Colorimetry {
    /// What a frame without explicit colorimetry is assumed to use.
    pub fn default_for(format: VideoFormat, height: u32) -> Self {
        let info = format.info();
        if info.is_yuv() {
            if height > 576 {
                Colorimetry::Bt709
            } else {
                Colorimetry::Bt601
            }
        } else if info.is_rgb() {
            Colorimetry::Srgb
        } else {
            Colorimetry::Unknown
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Colorimetry::Bt601 => "bt601",
            Colorimetry::Bt709 => "bt709",
            Colorimetry::Bt2020 => "bt2020",
            Colorimetry::Srgb => "srgb",
            Colorimetry::Unknown => "unknown",
        }
    }

    /// Parses a config name; `"auto"` yields `None`.
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "bt601" => Some(Colorimetry::Bt601),
            "bt709" => Some(Colorimetry::Bt709),
            "bt2020" => Some(Colorimetry::Bt2020),
            "srgb" => Some(Colorimetry::Srgb),
            _ => None,
        }
    }
}

impl fmt::Display for Colorimetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChromaSite {
    #[default]
    Unknown,
    Jpeg,
    Mpeg2,
    Dv,
}

const MAX_PLANES: usize = 4;

/// Description of one frame layout: format, size, colorimetry and memory layout.
///
/// Two infos compare equal exactly when their memory layouts are bit-identical, which is
/// what passthrough detection relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoInfo {
    pub format: VideoFormat,
    pub width: u32,
    pub height: u32,
    /// Number of views in a multiview frame (1 for mono).
    pub views: u32,
    pub colorimetry: Colorimetry,
    pub chroma_site: ChromaSite,
    pub strides: [u32; MAX_PLANES],
    pub offsets: [usize; MAX_PLANES],
    /// Bytes for one view.
    pub size: usize,
}

fn round_up_4(v: u32) -> u32 {
    (v + 3) & !3
}

impl VideoInfo {
    pub fn new(format: VideoFormat, width: u32, height: u32) -> Self {
        let finfo = format.info();
        let mut strides = [0u32; MAX_PLANES];
        let mut offsets = [0usize; MAX_PLANES];
        let mut offset = 0usize;

        for (i, plane) in finfo.planes.iter().enumerate() {
            let (w, h) = match finfo.tile {
                Some(tile) => {
                    // Tiled planes are padded to whole tiles.
                    let x_tiles = width.div_ceil(tile.luma.0);
                    let y_tiles = height.div_ceil(tile.luma.1);
                    let w = x_tiles * tile.luma.0;
                    let h = y_tiles * tile.luma.1;
                    (
                        finfo.plane_width(i, w),
                        finfo.plane_height(i, h),
                    )
                }
                None => (finfo.plane_width(i, width), finfo.plane_height(i, height)),
            };
            let stride = round_up_4(w * plane.storage.bytes_per_texel());
            strides[i] = stride;
            offsets[i] = offset;
            offset += stride as usize * h as usize;
        }

        Self {
            format,
            width,
            height,
            views: 1,
            colorimetry: Colorimetry::default_for(format, height),
            chroma_site: if finfo.is_yuv() && finfo.h_sub > 0 {
                ChromaSite::Mpeg2
            } else {
                ChromaSite::Unknown
            },
            strides,
            offsets,
            size: offset,
        }
    }

    pub fn with_colorimetry(mut self, colorimetry: Colorimetry) -> Self {
        self.colorimetry = colorimetry;
        self
    }

    pub fn with_views(mut self, views: u32) -> Self {
        self.views = views.max(1);
        self
    }

    pub fn n_planes(&self) -> usize {
        self.format.info().n_planes()
    }

    pub fn plane_width(&self, plane: usize) -> u32 {
        self.format.info().plane_width(plane, self.width)
    }

    pub fn plane_height(&self, plane: usize) -> u32 {
        self.format.info().plane_height(plane, self.height)
    }

    /// Number of (horizontal, vertical) tiles for tiled formats.
    pub fn tiles(&self) -> Option<(u32, u32)> {
        self.format.info().tile.map(|tile| {
            (
                self.width.div_ceil(tile.luma.0),
                self.height.div_ceil(tile.luma.1),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i420_layout() {
        let info = VideoInfo::new(VideoFormat::I420, 320, 240);
        assert_eq!(info.strides[..3], [320, 160, 160]);
        assert_eq!(info.offsets[1], 320 * 240);
        assert_eq!(info.size, 320 * 240 * 3 / 2);
        assert_eq!(info.colorimetry, Colorimetry::Bt601);
    }

    #[test]
    fn hd_yuv_defaults_to_bt709() {
        let info = VideoInfo::new(VideoFormat::Nv12, 1920, 1080);
        assert_eq!(info.colorimetry, Colorimetry::Bt709);
        let rgb = VideoInfo::new(VideoFormat::Rgba, 1920, 1080);
        assert_eq!(rgb.colorimetry, Colorimetry::Srgb);
    }

    #[test]
    fn tiled_sizes_pad_to_whole_tiles() {
        let info = VideoInfo::new(VideoFormat::Nv12_16L32s, 20, 40);
        assert_eq!(info.tiles(), Some((2, 2)));
        assert_eq!(info.strides[0], 32);
        assert_eq!(VideoInfo::new(VideoFormat::Rgba, 2, 2).tiles(), None);
    }

    #[test]
    fn equality_tracks_layout() {
        let a = VideoInfo::new(VideoFormat::Rgba, 16, 16);
        let b = VideoInfo::new(VideoFormat::Rgba, 16, 16);
        assert_eq!(a, b);
        assert_ne!(a, b.clone().with_colorimetry(Colorimetry::Bt709));
        assert_ne!(a, VideoInfo::new(VideoFormat::Bgra, 16, 16));
    }
}
