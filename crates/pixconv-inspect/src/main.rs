use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pixconv_core::PixconvConfig;

mod cli;

#[derive(Parser)]
#[command(name = "pixconv-inspect")]
#[command(about = "Inspect pixel-format negotiation and the generated conversion shaders")]
#[command(version)]
struct Cli {
    /// JSON config (log filter, default colorimetry, simulated context profile)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of plain text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the formats the converter accepts
    Formats {
        /// List writable formats instead of readable ones
        #[arg(long)]
        output: bool,
    },

    /// Show the caps transform for a set of formats
    Transform {
        /// Formats on the known side (e.g. NV12 RGBA)
        #[arg(required = true)]
        formats: Vec<String>,

        /// The formats describe the output side; list the inputs that reach them
        #[arg(long)]
        from_output: bool,
    },

    /// Pick the cheapest output for an input
    Fixate {
        /// Input format
        #[arg(short, long)]
        input: String,

        /// Input texture target (2d, rect, oes)
        #[arg(short, long, default_value = "2d")]
        target: String,

        /// Candidates as FORMAT or FORMAT:target[,target...]
        #[arg(required = true)]
        candidates: Vec<String>,
    },

    /// Print the shaders and uniforms for one conversion
    Shader {
        /// Input format
        #[arg(short, long)]
        input: String,

        /// Output format
        #[arg(short, long)]
        output: String,

        #[arg(long, default_value = "1920")]
        width: u32,

        #[arg(long, default_value = "1080")]
        height: u32,

        /// Input colorimetry (bt601, bt709, bt2020, srgb); defaults from the config
        #[arg(long)]
        colorimetry: Option<String>,

        /// Input texture target (2d, rect, oes)
        #[arg(short, long, default_value = "2d")]
        target: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PixconvConfig::from_json_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PixconvConfig::default(),
    };

    // RUST_LOG wins over the config's filter.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let caps = cli::context_caps(&config)?;
    let out = cli::Output { json: cli.json };

    match cli.command {
        Commands::Formats { output } => cli::list_formats(out, caps.as_ref(), output),
        Commands::Transform {
            formats,
            from_output,
        } => cli::transform(out, caps.as_ref(), &formats, from_output),
        Commands::Fixate {
            input,
            target,
            candidates,
        } => cli::fixate(out, &input, &target, &candidates),
        Commands::Shader {
            input,
            output,
            width,
            height,
            colorimetry,
            target,
        } => {
            let colorimetry = colorimetry.unwrap_or_else(|| config.default_colorimetry.clone());
            cli::shader(
                out,
                caps.as_ref(),
                cli::ShaderArgs {
                    input: &input,
                    output: &output,
                    width,
                    height,
                    colorimetry: &colorimetry,
                    target: &target,
                },
            )
        }
    }
}
