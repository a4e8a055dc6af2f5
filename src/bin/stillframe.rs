use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    time::Duration,
};

use clap::{Args, Parser, Subcommand};
use stillframe::{
    ComposerConfig, CompositionRequest, DEFAULT_TITLE, Resolution,
    placeholder::{self, BLUE, PLACEHOLDER_HEIGHT, PLACEHOLDER_WIDTH, RED},
};

#[derive(Parser, Debug)]
#[command(name = "stillframe", version)]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset (e.g. "info", "stillframe=debug").
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit structured JSON logs.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Overlay two images, draw a title, and write a one-second video (requires `ffmpeg`).
    Compose(ComposeArgs),
    /// Write solid red and blue 640x480 placeholder images.
    Placeholders(PlaceholderArgs),
    /// Create placeholders if missing, then compose them into a video.
    Demo(DemoArgs),
}

#[derive(Args, Debug)]
struct ToolArgs {
    /// JSON config file (ffmpegBin, fontPath, timeoutMs).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Font used for the title; overrides the config file.
    #[arg(long)]
    font_path: Option<PathBuf>,

    /// ffmpeg executable; overrides the config file.
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Kill ffmpeg after this many milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[derive(Args, Debug)]
struct ComposeArgs {
    /// Background image.
    #[arg(long)]
    image1: PathBuf,

    /// Overlay image.
    #[arg(long)]
    image2: PathBuf,

    /// Output video path; the container follows the extension.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value = DEFAULT_TITLE)]
    title: String,

    /// Output size as <width>x<height>.
    #[arg(long, default_value = "1280x720")]
    resolution: Resolution,

    #[command(flatten)]
    tool: ToolArgs,
}

#[derive(Args, Debug)]
struct PlaceholderArgs {
    /// Directory to write image1.png and image2.png into.
    #[arg(long, default_value = ".")]
    dir: PathBuf,
}

#[derive(Args, Debug)]
struct DemoArgs {
    #[arg(long, default_value = "image1.png")]
    image1: PathBuf,

    #[arg(long, default_value = "image2.png")]
    image2: PathBuf,

    #[arg(long, default_value = "output.mp4")]
    out: PathBuf,

    #[command(flatten)]
    tool: ToolArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.json_logs);

    let ok = match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Placeholders(args) => cmd_placeholders(args),
        Command::Demo(args) => cmd_demo(args),
    };

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn init_logging(level: &str, json: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    if json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}

fn load_config(args: &ToolArgs) -> stillframe::ComposeResult<ComposerConfig> {
    let mut cfg = match &args.config {
        Some(path) => ComposerConfig::load(path)?,
        None => ComposerConfig::default(),
    };
    if let Some(font) = &args.font_path {
        cfg = cfg.with_font_path(font);
    }
    if let Some(bin) = &args.ffmpeg {
        cfg = cfg.with_ffmpeg_bin(bin);
    }
    if let Some(ms) = args.timeout_ms {
        cfg = cfg.with_timeout(Some(Duration::from_millis(ms)));
    }
    Ok(cfg)
}

fn run_compose(tool: &ToolArgs, request: &CompositionRequest) -> bool {
    match load_config(tool) {
        Ok(cfg) => stillframe::compose_with(cfg, request),
        Err(err) => {
            tracing::error!("{err:#}");
            false
        }
    }
}

fn cmd_compose(args: ComposeArgs) -> bool {
    let request = CompositionRequest::new(args.image1, args.image2, args.out)
        .with_title(args.title)
        .with_resolution(args.resolution);
    run_compose(&args.tool, &request)
}

fn cmd_placeholders(args: PlaceholderArgs) -> bool {
    let write = |name: &str, rgb: [u8; 3]| -> bool {
        let path = args.dir.join(name);
        match placeholder::write_solid_image(&path, PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT, rgb) {
            Ok(()) => {
                eprintln!("wrote {}", path.display());
                true
            }
            Err(err) => {
                tracing::error!("{err:#}");
                false
            }
        }
    };
    write("image1.png", RED) && write("image2.png", BLUE)
}

fn cmd_demo(args: DemoArgs) -> bool {
    let ensure = |path: &Path, rgb: [u8; 3]| match placeholder::ensure_placeholder(path, rgb) {
        Ok(_) => true,
        Err(err) => {
            tracing::error!("{err:#}");
            false
        }
    };
    if !ensure(&args.image1, RED) || !ensure(&args.image2, BLUE) {
        return false;
    }

    let request = CompositionRequest::new(args.image1, args.image2, args.out);
    let ok = run_compose(&args.tool, &request);
    if ok {
        eprintln!("demo completed successfully");
    } else {
        eprintln!("demo encountered an error");
    }
    ok
}
