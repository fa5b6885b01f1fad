//! Limited-range YUV <-> RGB matrices.

use pixconv_format::Colorimetry;

/// Offset plus three coefficient rows.
///
/// YUV→RGB adds the offset before the dot products; RGB→YUV adds it after.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix {
    pub name: &'static str,
    pub offset: [f32; 3],
    pub coeff1: [f32; 3],
    pub coeff2: [f32; 3],
    pub coeff3: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixDirection {
    YuvToRgb,
    RgbToYuv,
}

// Y = [16..235], Cb/Cr = [16..240] (of 255)
pub const YUV_TO_RGB_BT601: ColorMatrix = ColorMatrix {
    name: "bt601",
    offset: [-0.0625, -0.5, -0.5],
    coeff1: [1.164, 0.000, 1.596],
    coeff2: [1.164, -0.391, -0.813],
    coeff3: [1.164, 2.018, 0.000],
};

pub const YUV_TO_RGB_BT709: ColorMatrix = ColorMatrix {
    name: "bt709",
    offset: [-0.0625, -0.5, -0.5],
    coeff1: [1.164, 0.000, 1.787],
    coeff2: [1.164, -0.213, -0.531],
    coeff3: [1.164, 2.112, 0.000],
};

pub const RGB_TO_YUV_BT601: ColorMatrix = ColorMatrix {
    name: "bt601",
    offset: [0.0625, 0.5, 0.5],
    coeff1: [0.256816, 0.504154, 0.0979137],
    coeff2: [-0.148246, -0.29102, 0.439266],
    coeff3: [0.439271, -0.367833, -0.071438],
};

pub const RGB_TO_YUV_BT709: ColorMatrix = ColorMatrix {
    name: "bt709",
    offset: [0.0625, 0.5, 0.5],
    coeff1: [0.182604, 0.614526, 0.061976],
    coeff2: [-0.100640, -0.338688, 0.439327],
    coeff3: [0.440654, -0.400285, -0.040370],
};

/// BT.709 colorimetry selects the 709 matrices; everything else uses BT.601.
pub fn select(colorimetry: Colorimetry, direction: MatrixDirection) -> &'static ColorMatrix {
    match (colorimetry, direction) {
        (Colorimetry::Bt709, MatrixDirection::YuvToRgb) => &YUV_TO_RGB_BT709,
        (Colorimetry::Bt709, MatrixDirection::RgbToYuv) => &RGB_TO_YUV_BT709,
        (_, MatrixDirection::YuvToRgb) => &YUV_TO_RGB_BT601,
        (_, MatrixDirection::RgbToYuv) => &RGB_TO_YUV_BT601,
    }
}

fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

impl ColorMatrix {
    /// CPU mirror of the GLSL `yuv_to_rgb` helper.
    pub fn yuv_to_rgb(&self, yuv: [f32; 3]) -> [f32; 3] {
        let v = [
            yuv[0] + self.offset[0],
            yuv[1] + self.offset[1],
            yuv[2] + self.offset[2],
        ];
        [dot(v, self.coeff1), dot(v, self.coeff2), dot(v, self.coeff3)]
    }

    /// CPU mirror of the GLSL `rgb_to_yuv` helper.
    pub fn rgb_to_yuv(&self, rgb: [f32; 3]) -> [f32; 3] {
        [
            dot(rgb, self.coeff1) + self.offset[0],
            dot(rgb, self.coeff2) + self.offset[1],
            dot(rgb, self.coeff3) + self.offset[2],
        ]
    }
}
