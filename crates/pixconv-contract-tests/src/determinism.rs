#![forbid(unsafe_code)]

#[cfg(test)]
mod tests {
    use pixconv_format::{
        Caps, CapsStructure, GlApi, GlCapabilities, TargetMask, TextureTarget, VideoFormat,
        VideoInfo,
    };
    use pixconv_shader::{fixate_caps, negotiate_caps, transform_caps, ConversionPlan};

    fn gl3() -> GlCapabilities {
        GlCapabilities::new(GlApi::Gl3, 3, 3, vec![])
    }

    /// Determinism contract:
    /// planning the same conversion twice yields byte-identical shader text and uniforms.
    #[test]
    fn plan_is_deterministic_for_same_inputs() {
        let caps = gl3();
        let in_info = VideoInfo::new(VideoFormat::Nv12, 1280, 720);
        let out_info = VideoInfo::new(VideoFormat::Bgra, 1280, 720);

        let p1 = ConversionPlan::build(&in_info, TextureTarget::Texture2D, &out_info, &[], &caps)
            .expect("plan 1");
        let p2 = ConversionPlan::build(&in_info, TextureTarget::Texture2D, &out_info, &[], &caps)
            .expect("plan 2");

        assert_eq!(p1.shaders(), p2.shaders(), "shader sources must be stable");
        assert_eq!(
            p1.uniforms(&in_info, TextureTarget::Texture2D),
            p2.uniforms(&in_info, TextureTarget::Texture2D),
            "uniform values must be stable"
        );
    }

    /// Determinism contract:
    /// negotiation and fixation depend only on their inputs, including ordering.
    #[test]
    fn negotiation_is_deterministic_for_same_inputs() {
        let caps = gl3();
        let formats = [VideoFormat::I420, VideoFormat::Rgba];
        assert_eq!(
            negotiate_caps(&formats, Some(&caps), true),
            negotiate_caps(&formats, Some(&caps), true),
            "reachable format order must be stable"
        );

        let input = Caps::from_structure(CapsStructure::gl([VideoFormat::Nv12]));
        let t1 = transform_caps(Some(&caps), false, &input, None);
        let t2 = transform_caps(Some(&caps), false, &input, None);
        assert_eq!(t1, t2, "transform must be stable");

        let fixed = CapsStructure::gl([VideoFormat::Nv12]).with_targets(TargetMask::TEXTURE_2D);
        let f1 = fixate_caps(&fixed, &t1).expect("fixate 1");
        let f2 = fixate_caps(&fixed, &t2).expect("fixate 2");
        assert_eq!(f1, f2, "fixation must be stable");
        assert_eq!(f1.format(), Some(VideoFormat::Nv12), "passthrough wins");
    }
}
