//! Properties that hold across the whole format catalog.

use pixconv_core::ErrorKind;
use pixconv_format::{Colorimetry, FormatClass, GlApi, GlCapabilities, TargetMask, VideoFormat};
use pixconv_shader::negotiate::format_loss;
use pixconv_shader::swizzle::{format_reorder, invert};
use pixconv_shader::{body, fixate, negotiate_caps, BodyRequest, Candidate};

fn is_permutation(s: [i32; 4]) -> bool {
    let mut sorted = s;
    sorted.sort_unstable();
    sorted == [0, 1, 2, 3]
}

fn non_rgb(format: VideoFormat) -> bool {
    format.info().class() != FormatClass::Rgb
}

#[test]
fn identical_candidate_always_passes_through() {
    for format in VideoFormat::all() {
        let fx = fixate(format, TargetMask::TEXTURE_2D, &[Candidate::new(format, TargetMask::all())])
            .unwrap_or_else(|| panic!("{format} must fixate to itself"));
        assert_eq!(fx.format, format);
        assert_eq!(fx.loss, 0, "{format}");

        // Still wins when listed after other alternatives.
        let mixed = [
            Candidate::new(VideoFormat::Rgba, TargetMask::TEXTURE_2D),
            Candidate::new(VideoFormat::Bgrx, TargetMask::TEXTURE_2D),
            Candidate::new(format, TargetMask::TEXTURE_2D),
        ];
        let fx = fixate(format, TargetMask::TEXTURE_2D, &mixed).expect("fixates");
        assert_eq!((fx.format, fx.loss), (format, 0), "{format}");
    }
}

#[test]
fn permutation_swizzles_invert_cleanly() {
    for format in VideoFormat::all() {
        let s = format_reorder(format, true);
        if !is_permutation(s) {
            continue;
        }
        let inv = invert(s);
        for i in 0..4 {
            assert_eq!(inv[s[i] as usize], i as i32, "{format}: {s:?} / {inv:?}");
        }
        assert_eq!(invert(inv), s, "{format}");
    }
}

#[test]
fn each_extra_loss_costs_more() {
    let loss = |a: VideoFormat, b: VideoFormat| {
        format_loss(a.info(), b.info()).unwrap_or_else(|| panic!("{a} -> {b} is allowed"))
    };

    let reorder = loss(VideoFormat::Rgba, VideoFormat::Bgra);
    let drop_alpha = loss(VideoFormat::Rgba, VideoFormat::Bgrx);
    let to_444 = loss(VideoFormat::Rgba, VideoFormat::Y444);
    let to_422 = loss(VideoFormat::Rgba, VideoFormat::Y42b);
    let to_420 = loss(VideoFormat::Rgba, VideoFormat::I420);
    let to_gray = loss(VideoFormat::Rgba, VideoFormat::Gray8);

    assert_eq!(reorder, 1);
    assert!(reorder < drop_alpha, "{reorder} < {drop_alpha}");
    assert!(drop_alpha < to_444, "{drop_alpha} < {to_444}");
    assert!(to_444 < to_422, "{to_444} < {to_422}");
    assert!(to_422 < to_420, "{to_422} < {to_420}");
    assert!(to_444 < to_gray, "{to_444} < {to_gray}");

    // Gaining a property is cheaper than losing it.
    let gain_alpha = loss(VideoFormat::Bgrx, VideoFormat::Rgba);
    assert!(gain_alpha < drop_alpha, "{gain_alpha} < {drop_alpha}");
    let gain_depth = loss(VideoFormat::Rgba, VideoFormat::Rgba64Le);
    let drop_depth = loss(VideoFormat::Rgba64Le, VideoFormat::Rgba);
    assert!(gain_depth < drop_depth, "{gain_depth} < {drop_depth}");
}

#[test]
fn yuv_and_gray_never_convert_into_each_other() {
    let caps = GlCapabilities::new(GlApi::Gl3, 3, 3, vec![]);
    for input in VideoFormat::all().filter(|f| non_rgb(*f)) {
        for output in VideoFormat::all().filter(|f| non_rgb(*f)) {
            assert!(
                format_loss(input.info(), output.info()).is_none(),
                "{input} -> {output} must not be scored"
            );
            if input == output {
                continue;
            }
            let err = body::select(&BodyRequest {
                input,
                output,
                in_tex_formats: &[],
                out_tex_formats: &[],
                in_colorimetry: Colorimetry::Bt601,
                out_colorimetry: Colorimetry::Bt601,
            })
            .expect_err("no body for non-RGB pairs");
            assert_eq!(err.kind(), ErrorKind::UnsupportedFormatPair, "{input} -> {output}");
        }

        let reachable = negotiate_caps(&[input], Some(&caps), true);
        assert!(reachable.contains(&input), "{input} passes through");
        for f in reachable.iter().filter(|f| non_rgb(**f)) {
            assert_eq!(*f, input, "{input} reaches {f}");
        }
    }
}

#[test]
fn rgb_inputs_reach_every_supported_format() {
    let caps = GlCapabilities::new(GlApi::Gl3, 3, 3, vec![]);
    let all = pixconv_shader::supported_formats(Some(&caps), true);
    let reachable = negotiate_caps(&[VideoFormat::Rgba], Some(&caps), true);
    for f in &all {
        assert!(reachable.contains(f), "RGBA should reach {f}");
    }
    assert!(reachable.iter().all(|f| all.contains(f)));
}
