//! Subcommand implementations.

use anyhow::{anyhow, bail, Context, Result};
use pixconv_core::PixconvConfig;
use pixconv_format::{
    Caps, CapsStructure, Colorimetry, GlApi, GlCapabilities, TargetMask, TextureTarget,
    VideoFormat, VideoInfo,
};
use pixconv_shader::{fixate as fixate_candidates, supported_formats, transform_caps};
use pixconv_shader::{Candidate, ConversionPlan};
use serde_json::json;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    fn print_json(self, value: serde_json::Value) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(&value)?);
        Ok(())
    }
}

pub struct ShaderArgs<'a> {
    pub input: &'a str,
    pub output: &'a str,
    pub width: u32,
    pub height: u32,
    pub colorimetry: &'a str,
    pub target: &'a str,
}

/// Capability snapshot from the config's context profile, if any.
pub fn context_caps(config: &PixconvConfig) -> Result<Option<GlCapabilities>> {
    let Some(profile) = &config.context else {
        debug!("no context profile, negotiating without capabilities");
        return Ok(None);
    };
    let caps = GlCapabilities::from_profile(profile).context("invalid context profile")?;
    debug!(
        "simulating {:?} {}.{} ({} extensions)",
        caps.api,
        caps.major,
        caps.minor,
        caps.extensions.len()
    );
    Ok(Some(caps))
}

pub fn parse_format(name: &str) -> Result<VideoFormat> {
    name.parse::<VideoFormat>()
        .with_context(|| format!("'{name}' is not a known format"))
}

pub fn parse_target(name: &str) -> Result<TextureTarget> {
    TextureTarget::from_name(name).ok_or_else(|| anyhow!("unknown texture target '{name}'"))
}

/// `2d,rect` style target lists.
pub fn parse_targets(list: &str) -> Result<TargetMask> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .try_fold(TargetMask::empty(), |mask, name| {
            Ok(mask | parse_target(name)?.mask())
        })
}

/// `FORMAT` or `FORMAT:targets`. A bare format may live on any target.
pub fn parse_candidate(arg: &str) -> Result<Candidate> {
    let (format, targets) = match arg.split_once(':') {
        Some((format, targets)) => (format, parse_targets(targets)?),
        None => (arg, TargetMask::all()),
    };
    Ok(Candidate::new(parse_format(format)?, targets))
}

fn parse_colorimetry(name: &str) -> Result<Option<Colorimetry>> {
    if name == "auto" {
        return Ok(None);
    }
    Colorimetry::from_name(name)
        .map(Some)
        .ok_or_else(|| anyhow!("unknown colorimetry '{name}'"))
}

fn names(formats: &[VideoFormat]) -> Vec<&'static str> {
    formats.iter().map(|f| f.name()).collect()
}

pub fn list_formats(out: Output, caps: Option<&GlCapabilities>, output: bool) -> Result<()> {
    let formats = supported_formats(caps, output);
    if out.json {
        return out.print_json(json!({
            "direction": if output { "output" } else { "input" },
            "formats": names(&formats),
        }));
    }
    for f in &formats {
        let info = f.info();
        println!(
            "{:<14} {:?} {:?} {} bit, {} plane(s)",
            f.name(),
            info.class(),
            info.layout,
            info.bits,
            info.n_planes()
        );
    }
    Ok(())
}

pub fn transform(
    out: Output,
    caps: Option<&GlCapabilities>,
    formats: &[String],
    from_output: bool,
) -> Result<()> {
    let formats = formats
        .iter()
        .map(|s| parse_format(s))
        .collect::<Result<Vec<_>>>()?;
    let input = Caps::from_structure(CapsStructure::gl(formats));
    let result = transform_caps(caps, !from_output, &input, None);

    if out.json {
        let structures: Vec<_> = result
            .structures
            .iter()
            .map(|s| names(s.formats.as_deref().unwrap_or_default()))
            .collect();
        return out.print_json(json!({ "structures": structures }));
    }
    for (i, s) in result.structures.iter().enumerate() {
        let formats = s.formats.as_deref().unwrap_or_default();
        println!("[{i}] {}", names(formats).join(", "));
    }
    Ok(())
}

pub fn fixate(out: Output, input: &str, target: &str, candidates: &[String]) -> Result<()> {
    let input = parse_format(input)?;
    let target = parse_target(target)?;
    let candidates = candidates
        .iter()
        .map(|s| parse_candidate(s))
        .collect::<Result<Vec<_>>>()?;

    let Some(fx) = fixate_candidates(input, target, &candidates) else {
        bail!("no candidate is reachable from {input} on {target}");
    };

    if out.json {
        return out.print_json(json!({
            "format": fx.format.name(),
            "target": fx.target.name(),
            "loss": fx.loss,
        }));
    }
    println!("{} ({}) loss {}", fx.format, fx.target, fx.loss);
    Ok(())
}

/// Without a profile the shader is generated for a desktop GL 3.3 core context.
fn shader_caps(caps: Option<&GlCapabilities>) -> GlCapabilities {
    caps.cloned()
        .unwrap_or_else(|| GlCapabilities::new(GlApi::Gl3, 3, 3, Vec::new()))
}

pub fn shader(out: Output, caps: Option<&GlCapabilities>, args: ShaderArgs<'_>) -> Result<()> {
    let input = parse_format(args.input)?;
    let output = parse_format(args.output)?;
    let target = parse_target(args.target)?;
    if args.width == 0 || args.height == 0 {
        bail!("width and height must be > 0");
    }

    let mut in_info = VideoInfo::new(input, args.width, args.height);
    if let Some(c) = parse_colorimetry(args.colorimetry)? {
        in_info = in_info.with_colorimetry(c);
    }
    let out_info = VideoInfo::new(output, args.width, args.height);

    let caps = shader_caps(caps);
    let plan = ConversionPlan::build(&in_info, target, &out_info, &[], &caps)?;
    let sources = plan.shaders();
    let uniforms: Vec<String> = plan
        .uniforms(&in_info, target)
        .iter()
        .map(|u| u.to_string())
        .collect();

    if out.json {
        return out.print_json(json!({
            "template": plan.selection().template.name,
            "glsl": sources.glsl.to_string(),
            "textures": plan.texture_names(),
            "out_planes": plan.out_planes(),
            "vertex": sources.vertex,
            "fragment": sources.fragment,
            "uniforms": uniforms,
        }));
    }

    println!(
        "// {input} ({target}) -> {output}, '{}' body, GLSL {}",
        plan.selection().template.name,
        sources.glsl
    );
    println!("// ---- vertex ----");
    println!("{}", sources.vertex);
    println!("// ---- fragment ----");
    println!("{}", sources.fragment);
    println!("// ---- uniforms ----");
    for u in &uniforms {
        println!("{u};");
    }
    Ok(())
}
