//! CPU evaluation of the chroma box filter used when writing subsampled planar YUV.
//!
//! Mirrors the fragment body line by line, with nearest sampling and clamp-to-edge
//! addressing, so the averaging rules can be checked without a GL context.

use pixconv_format::{GlApi, GlCapabilities, TextureTarget, VideoFormat, VideoInfo};
use pixconv_shader::ConversionPlan;

struct Image {
    width: u32,
    height: u32,
    texels: Vec<[f32; 4]>,
}

impl Image {
    fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> [f32; 4]) -> Self {
        let texels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self {
            width,
            height,
            texels,
        }
    }

    fn texel(&self, x: u32, y: u32) -> [f32; 4] {
        self.texels[(y * self.width + x) as usize]
    }

    /// `texture2D` on a normalized coordinate.
    fn sample(&self, coord: [f32; 2]) -> [f32; 4] {
        let x = (coord[0] * self.width as f32).floor() as i64;
        let y = (coord[1] * self.height as f32).floor() as i64;
        let x = x.clamp(0, self.width as i64 - 1) as u32;
        let y = y.clamp(0, self.height as i64 - 1) as u32;
        self.texel(x, y)
    }
}

/// Chroma input for the fragment at `(x, y)` of a full-size viewport, or `None` when the
/// fragment lies outside the area the body averages.
fn chroma_sample(img: &Image, chroma_sampling: [f32; 2], x: u32, y: u32) -> Option<[f32; 4]> {
    let unnorm = [img.width as f32, img.height as f32];
    let texcoord = [(x as f32 + 0.5) / unnorm[0], (y as f32 + 0.5) / unnorm[1]];

    let mut pos = [
        texcoord[0] * chroma_sampling[0] * unnorm[0],
        texcoord[1] * chroma_sampling[1] * unnorm[1],
    ];
    for k in 0..2 {
        pos[k] -= (chroma_sampling[k] * 0.5 - 0.5).clamp(0.0, chroma_sampling[k]);
    }
    if !(pos[0] < unnorm[0] && pos[1] < unnorm[1]) {
        return None;
    }

    let mut uv = [0.0f32; 4];
    for i in 0..chroma_sampling[0] as i32 {
        for j in 0..chroma_sampling[1] as i32 {
            let n = (i * chroma_sampling[1] as i32 + j + 1) as f32;
            let coord = [
                (pos[0] + i as f32) / unnorm[0],
                (pos[1] + j as f32) / unnorm[1],
            ];
            let s = img.sample(coord);
            for c in 0..4 {
                uv[c] = ((n - 1.0) * uv[c] + s[c]) / n;
            }
        }
    }
    Some(uv)
}

fn mean(values: &[[f32; 4]]) -> [f32; 4] {
    let mut out = [0.0; 4];
    for v in values {
        for c in 0..4 {
            out[c] += v[c];
        }
    }
    out.map(|c| c / values.len() as f32)
}

fn assert_close(a: [f32; 4], b: [f32; 4], what: &str) {
    for c in 0..4 {
        assert!((a[c] - b[c]).abs() < 1e-4, "{what}: {a:?} vs {b:?}");
    }
}

fn gradient(x: u32, y: u32) -> [f32; 4] {
    [x as f32, y as f32, (x + 10 * y) as f32, 1.0]
}

fn chroma_sampling_for(format: VideoFormat) -> [f32; 2] {
    let caps = GlCapabilities::new(GlApi::Gl3, 3, 3, vec![]);
    let plan = ConversionPlan::build(
        &VideoInfo::new(VideoFormat::Rgba, 16, 16),
        TextureTarget::Texture2D,
        &VideoInfo::new(format, 16, 16),
        &[],
        &caps,
    )
    .unwrap_or_else(|e| panic!("RGBA -> {format}: {e}"));
    plan.selection()
        .chroma_sampling
        .unwrap_or_else(|| panic!("{format} carries chroma sampling"))
}

#[test]
fn evaluator_mirrors_the_shader_body() {
    let caps = GlCapabilities::new(GlApi::Gl3, 3, 3, vec![]);
    let plan = ConversionPlan::build(
        &VideoInfo::new(VideoFormat::Rgba, 16, 16),
        TextureTarget::Texture2D,
        &VideoInfo::new(VideoFormat::I420, 16, 16),
        &[],
        &caps,
    )
    .expect("RGBA -> I420");
    let body = &plan.selection().body;
    assert!(body.contains(
        "chroma_pos -= clamp(chroma_sampling * 0.5 - 0.5, vec2(0.0), chroma_sampling);"
    ));
    assert!(body.contains("if (chroma_pos.x < width && chroma_pos.y < height) {"));
    assert!(body.contains("int n = i * int(chroma_sampling.y) + j + 1;"));
    assert!(body.contains("uv_texel = (float(n-1) * uv_texel + s) / float(n);"));
}

#[test]
fn chroma_sampling_follows_subsampling() {
    assert_eq!(chroma_sampling_for(VideoFormat::I420), [2.0, 2.0]);
    assert_eq!(chroma_sampling_for(VideoFormat::Y42b), [2.0, 1.0]);
    assert_eq!(chroma_sampling_for(VideoFormat::Y41b), [4.0, 1.0]);
    assert_eq!(chroma_sampling_for(VideoFormat::Y444), [1.0, 1.0]);
}

#[test]
fn constant_input_keeps_its_chroma_exactly() {
    let constant = [0.25, 0.5, 0.75, 1.0];
    let img = Image::from_fn(9, 7, |_, _| constant);
    for cs in [[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [4.0, 1.0]] {
        let cw = (img.width as f32 / cs[0]).ceil() as u32;
        let ch = (img.height as f32 / cs[1]).ceil() as u32;
        for y in 0..ch {
            for x in 0..cw {
                let uv = chroma_sample(&img, cs, x, y).expect("inside the chroma plane");
                assert_eq!(uv, constant, "cs {cs:?} at ({x}, {y})");
            }
        }
    }
}

#[test]
fn subsampled_chroma_is_the_block_mean() {
    let img = Image::from_fn(8, 8, gradient);

    // 4:2:0
    for (x, y) in [(0, 0), (1, 2), (3, 3)] {
        let expected = mean(&[
            img.texel(2 * x, 2 * y),
            img.texel(2 * x + 1, 2 * y),
            img.texel(2 * x, 2 * y + 1),
            img.texel(2 * x + 1, 2 * y + 1),
        ]);
        let got = chroma_sample(&img, [2.0, 2.0], x, y).expect("inside");
        assert_close(got, expected, "4:2:0");
    }

    // 4:1:1
    for (x, y) in [(0, 0), (1, 5)] {
        let block: Vec<_> = (0..4).map(|i| img.texel(4 * x + i, y)).collect();
        let got = chroma_sample(&img, [4.0, 1.0], x, y).expect("inside");
        assert_close(got, mean(&block), "4:1:1");
    }

    // 4:4:4 is a straight copy.
    let got = chroma_sample(&img, [1.0, 1.0], 5, 6).expect("inside");
    assert_close(got, img.texel(5, 6), "4:4:4");
}

#[test]
fn odd_edges_repeat_the_last_texel() {
    let img = Image::from_fn(5, 3, gradient);

    // Last chroma column covers texel 4 and the clamped (missing) texel 5.
    let got = chroma_sample(&img, [2.0, 2.0], 2, 0).expect("inside");
    let expected = mean(&[
        img.texel(4, 0),
        img.texel(4, 0),
        img.texel(4, 1),
        img.texel(4, 1),
    ]);
    assert_close(got, expected, "right edge");

    // Last chroma row covers texel row 2 twice.
    let got = chroma_sample(&img, [2.0, 2.0], 0, 1).expect("inside");
    let expected = mean(&[
        img.texel(0, 2),
        img.texel(1, 2),
        img.texel(0, 2),
        img.texel(1, 2),
    ]);
    assert_close(got, expected, "bottom edge");
}

#[test]
fn fragments_past_the_chroma_plane_are_skipped() {
    let img = Image::from_fn(5, 4, gradient);
    // The chroma plane of a 5x4 4:2:0 frame is 3x2.
    assert!(chroma_sample(&img, [2.0, 2.0], 2, 1).is_some());
    assert!(chroma_sample(&img, [2.0, 2.0], 3, 0).is_none());
    assert!(chroma_sample(&img, [2.0, 2.0], 0, 2).is_none());
}
