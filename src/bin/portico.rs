use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use portico::{
    ConfiguratorSession, DirectoryTarget, ExportOutcome, FsImageLoader, JsonStepSource,
    PixelSurface, SessionConfig, StepSource, encode_png, resolve_navigation,
};

#[derive(Parser, Debug)]
#[command(name = "portico", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite the selected layers into a preview PNG and a watermark-free export.
    Render(RenderArgs),
    /// Print navigation state and derived layers as JSON.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Step definitions JSON (array of steps).
    #[arg(long)]
    steps: PathBuf,

    /// Session configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory layer URLs resolve against. Defaults to the steps file's directory.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Output directory for the preview and the export.
    #[arg(long)]
    out_dir: PathBuf,

    /// File name of the on-screen preview (with watermark).
    #[arg(long, default_value = "preview.png")]
    preview: String,

    /// File name of the export. Defaults to `product-visualization.png`.
    #[arg(long)]
    export_name: Option<String>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Step definitions JSON (array of steps).
    #[arg(long)]
    steps: PathBuf,

    /// Session configuration JSON, for template expansion.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Option<SessionConfig>> {
    Ok(path.map(SessionConfig::from_json_file).transpose()?)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let assets_root = match &args.assets {
        Some(dir) => dir.clone(),
        None => args
            .steps
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf(),
    };

    let mut session = ConfiguratorSession::new(FsImageLoader::new(assets_root));
    session.start(config, &JsonStepSource::new(&args.steps))?;

    let state = pollster::block_on(session.refresh_visualizer());
    for e in session.visualizer().errors() {
        eprintln!("layer '{}': {}", e.layer_id, e.error);
    }

    let mut surface = PixelSurface::new(session.visualizer().config().surface)?;
    let report = pollster::block_on(session.visualizer_mut().render(&mut surface));

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    let preview_path = args.out_dir.join(&args.preview);
    let preview = encode_png(&surface)?;
    std::fs::write(&preview_path, &preview.bytes)
        .with_context(|| format!("write png '{}'", preview_path.display()))?;
    eprintln!(
        "wrote {} ({} layers, watermark: {})",
        preview_path.display(),
        report.layers_drawn,
        report.watermark_drawn
    );

    let mut target = DirectoryTarget::new(&args.out_dir);
    match session
        .visualizer()
        .export(&surface, args.export_name.as_deref(), &mut target)?
    {
        ExportOutcome::Skipped => eprintln!("nothing to export"),
        ExportOutcome::Delivered { filename, .. } => {
            eprintln!("wrote {}", args.out_dir.join(filename).display());
        }
    }

    if state.has_errors {
        eprintln!(
            "{} of {} layers failed to load",
            session.visualizer().errors().len(),
            session.visualizer().layers().len()
        );
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?.unwrap_or_default();
    let steps = JsonStepSource::new(&args.steps).fetch_steps()?;

    let nav = resolve_navigation(&steps);
    let info = portico::debug_info(&steps, &config.visualizer);
    let out = serde_json::json!({
        "navigation": {
            "activeIndex": nav.active_index,
            "currentStep": nav.current_step.map(|s| s.id.as_str()),
            "previousStep": nav.previous_step,
            "nextStep": nav.next_step,
            "allStepsCompleted": nav.all_steps_completed,
            "currentStepValidity": nav.current_step_validity,
            "completedCount": nav.completed_count,
            "progressPercent": nav.progress_percent,
            "canFinalize": nav.can_finalize,
        },
        "visualizer": info,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
