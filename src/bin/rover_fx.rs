use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rover_effects::catalog::{Camera, CatalogQuery, Rover};
use rover_effects::io::{FileSource, PngFileSink};
use rover_effects::render::PreviewRenderer;
use rover_effects::session::{EffectSession, ExportOutcome, ImageRequest};
use rover_effects::{EffectKind, EffectParameters};

#[derive(Parser, Debug)]
#[command(name = "rover-fx", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply an effect to an image file and write a PNG.
    Apply(ApplyArgs),
    /// Print the approximate preview filter graph for an effect.
    Preview(EffectArgs),
    /// Print the photo catalog URL for a rover/sol/camera selection.
    CatalogUrl(CatalogArgs),
}

#[derive(Parser, Debug)]
struct EffectArgs {
    /// Effect to run.
    #[arg(long, value_enum, default_value_t = EffectKind::None)]
    effect: EffectKind,

    /// Knob overrides as a JSON object, e.g. '{"strength": 2.4}'.
    #[arg(long)]
    params: Option<String>,
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// Input image (PNG or JPEG).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Relay prefix to use if the source refuses direct access.
    #[arg(long)]
    relay: Option<String>,

    #[command(flatten)]
    effect: EffectArgs,
}

#[derive(Parser, Debug)]
struct CatalogArgs {
    #[arg(long, value_enum, default_value_t = Rover::Curiosity)]
    rover: Rover,

    #[arg(long, default_value_t = CatalogQuery::DEFAULT_SOL)]
    sol: u32,

    #[arg(long, value_enum)]
    camera: Option<Camera>,

    #[arg(long, env = "NASA_API_KEY", default_value = "DEMO_KEY")]
    api_key: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Apply(args) => cmd_apply(args),
        Command::Preview(args) => cmd_preview(args),
        Command::CatalogUrl(args) => cmd_catalog_url(args),
    }
}

fn effect_params(args: &EffectArgs) -> anyhow::Result<EffectParameters> {
    let Some(json) = &args.params else {
        return Ok(EffectParameters::defaults(args.effect));
    };

    let mut value: serde_json::Value =
        serde_json::from_str(json).with_context(|| "parse --params JSON")?;
    let object = value
        .as_object_mut()
        .with_context(|| "--params must be a JSON object")?;
    object.insert("effect".into(), args.effect.as_str().into());

    serde_json::from_value(value).with_context(|| format!("knobs for effect '{}'", args.effect))
}

fn cmd_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let params = effect_params(&args.effect)?;

    let out_dir = match args.out.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("create output dir '{}'", out_dir.display()))?;
    let name = args
        .out
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("output path '{}' has no file name", args.out.display()))?;

    let session = EffectSession::new(FileSource::new(), PngFileSink::new(&out_dir));
    let request = ImageRequest::direct(path_str(&args.in_path)?);
    let outcome = match &args.relay {
        Some(relay) => session.export_with_relay(&request, relay, &params, name),
        None => session.export(&request, &params, name),
    }
    .with_context(|| format!("apply {} to '{}'", params.kind(), args.in_path.display()))?;

    match outcome {
        ExportOutcome::Saved { width, height, .. } => {
            eprintln!("wrote {} ({width}x{height})", args.out.display());
        }
        ExportOutcome::Superseded { .. } => anyhow::bail!("export superseded (bug)"),
    }
    Ok(())
}

fn cmd_preview(args: EffectArgs) -> anyhow::Result<()> {
    let params = effect_params(&args)?;
    let graph = PreviewRenderer.graph(&params);

    println!("css: {}", graph.to_css());
    if graph.needs_svg() {
        println!("note: some stages need an SVG filter");
    }
    println!("{}", serde_json::to_string_pretty(&graph)?);
    Ok(())
}

fn cmd_catalog_url(args: CatalogArgs) -> anyhow::Result<()> {
    let query = CatalogQuery {
        rover: args.rover,
        sol: args.sol,
        camera: args.camera,
        api_key: args.api_key,
    };
    println!("{}", query.url());
    Ok(())
}

fn path_str(path: &Path) -> anyhow::Result<&str> {
    path.to_str()
        .with_context(|| format!("path '{}' is not valid UTF-8", path.display()))
}
