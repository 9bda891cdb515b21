use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use inkmark::{
    Config, Session, ViewportConfig,
    export::{DirectorySink, ExportOutcome, SkipReason},
    placement::{Dimensions, compute_placement},
    registry::SourceFile,
    settings::{AutoPosition, Color, Position, SettingsPatch},
    startup_checks,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Global options that apply to all commands
    #[arg(short, long, default_value = "inkmark.toml", global = true)]
    config: PathBuf,

    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Watermark images and save the results
    Apply {
        /// Image files, in the order they should be loaded
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Directory the watermarked files are written to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Preview container as WIDTHxHEIGHT (defaults to each image's natural size)
        #[arg(long, value_parser = parse_dimensions)]
        viewport: Option<Dimensions>,

        /// TrueType/OpenType font used for the watermark text
        #[arg(long)]
        font: Option<PathBuf>,

        /// Replay a drag gesture on the first image, as FROM_X,FROM_Y:TO_X,TO_Y
        #[arg(long, value_parser = parse_drag)]
        drag: Option<(Position, Position)>,

        #[command(flatten)]
        watermark: WatermarkArgs,
    },

    /// Print where the watermark would be drawn, as JSON
    Place {
        /// Canvas size as WIDTHxHEIGHT
        #[arg(long, value_parser = parse_dimensions)]
        canvas: Dimensions,

        /// Natural image size as WIDTHxHEIGHT
        #[arg(long, value_parser = parse_dimensions)]
        image: Dimensions,

        #[command(flatten)]
        watermark: WatermarkArgs,
    },
}

#[derive(Args, Debug, Default)]
struct WatermarkArgs {
    /// Watermark text
    #[arg(long)]
    text: Option<String>,

    /// Text color, e.g. "#ffffff"
    #[arg(long)]
    color: Option<Color>,

    /// Font size relative to the image's natural width (10-200)
    #[arg(long)]
    font_size: Option<f32>,

    /// Opacity between 0 and 1
    #[arg(long)]
    opacity: Option<f32>,

    /// One of the nine presets (top-left ... bottom-right) or "free"
    #[arg(long)]
    anchor: Option<AutoPosition>,

    /// Explicit position as X,Y in canvas space; implies --anchor free
    #[arg(long)]
    position: Option<Position>,
}

impl WatermarkArgs {
    fn into_patch(self) -> SettingsPatch {
        let anchor = match (self.anchor, self.position) {
            (Some(anchor), _) => Some(anchor),
            (None, Some(_)) => Some(AutoPosition::Free),
            (None, None) => None,
        };
        SettingsPatch {
            text: self.text,
            color: self.color,
            font_size: self.font_size,
            opacity: self.opacity,
            position: self.position,
            anchor,
        }
    }
}

fn parse_dimensions(s: &str) -> Result<Dimensions, String> {
    let (width, height) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let width = width
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid width '{}': {}", width, e))?;
    let height = height
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid height '{}': {}", height, e))?;
    Ok(Dimensions::new(width, height))
}

fn parse_drag(s: &str) -> Result<(Position, Position), String> {
    let (from, to) = s
        .split_once(':')
        .ok_or_else(|| format!("expected FROM_X,FROM_Y:TO_X,TO_Y, got '{}'", s))?;
    let from = from.parse::<Position>().map_err(|e| e.to_string())?;
    let to = to.parse::<Position>().map_err(|e| e.to_string())?;
    Ok((from, to))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set up logging first
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Apply {
            files,
            output,
            viewport,
            font,
            drag,
            watermark,
        } => {
            let mut config = config;
            if let Some(output) = output {
                config.export.output_directory = output;
            }
            if let Some(font) = font {
                config.render.font_path = font;
            }
            if let Some(viewport) = viewport {
                config.render.viewport = Some(ViewportConfig {
                    width: viewport.width,
                    height: viewport.height,
                });
            }
            run_apply(config, files, drag, watermark.into_patch()).await
        }
        Commands::Place {
            canvas,
            image,
            watermark,
        } => {
            let settings = config.watermark.apply(watermark.into_patch());
            match compute_placement(canvas, image, &settings) {
                Some(placement) => {
                    println!("{}", serde_json::to_string_pretty(&placement)?);
                    Ok(())
                }
                None => Err("Image has no pixels, nothing would be drawn".into()),
            }
        }
    }
}

async fn run_apply(
    config: Config,
    paths: Vec<PathBuf>,
    drag: Option<(Position, Position)>,
    patch: SettingsPatch,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting {}", config.app.name);

    match startup_checks::perform_startup_checks(&config).await {
        Ok(()) => info!("All startup checks passed"),
        Err(errors) => {
            for error in &errors {
                error!("Startup check failed: {}", error);
            }
            if errors.iter().any(|e| e.is_critical()) {
                error!("Critical startup check failed, exiting");
                return Err("Critical startup check failed".into());
            }
            warn!("Non-critical startup checks failed, continuing");
        }
    }

    let mut session = Session::from_config(&config);
    session.update_settings(patch);

    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        match SourceFile::from_path(path).await {
            Ok(file) => files.push(file),
            Err(e) => error!("Failed to read {:?}: {}", path, e),
        }
    }

    let report = session.upload(files).await;
    info!(
        "Loaded {} image(s): {} skipped (not images), {} over the limit, {} failed to decode",
        report.added.len(),
        report.skipped_non_image,
        report.dropped_over_capacity,
        report.failed
    );

    let fixed_viewport = config.render.viewport.is_some();
    let sink = DirectorySink::new(&config.export.output_directory);
    let mut saved = 0;

    for (index, id) in report.added.iter().enumerate() {
        session.select(*id)?;

        if !fixed_viewport
            && let Some(natural) = session.registry().active().and_then(|e| e.dimensions())
        {
            session.resize_viewport(natural);
        }

        if index == 0
            && let Some((from, to)) = drag
        {
            session.pointer_down(from);
            session.pointer_move(to);
            session.pointer_up();
        }

        let name = session
            .registry()
            .active()
            .map(|entry| entry.name().to_string())
            .unwrap_or_default();

        match session.download(&sink).await? {
            ExportOutcome::Saved {
                filename, location, ..
            } => {
                saved += 1;
                match location {
                    Some(path) => println!("{} -> {}", name, path.display()),
                    None => println!("{} -> {}", name, filename),
                }
            }
            ExportOutcome::Skipped(SkipReason::NotDecoded) => {
                let reason = session
                    .registry()
                    .active()
                    .and_then(|entry| entry.failure())
                    .unwrap_or("unknown error")
                    .to_string();
                eprintln!("{}: could not be decoded ({})", name, reason);
            }
            ExportOutcome::Skipped(reason) => {
                eprintln!("{}: skipped ({:?})", name, reason);
            }
        }
    }

    info!("Saved {} of {} image(s)", saved, paths.len());
    Ok(())
}
