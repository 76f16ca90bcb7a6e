use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use shapeviz_io::CropMargins;
use shapeviz_scene::{BatchRunner, InputKind, JsonSceneExporter, RenderConfig, RenderJob};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "shapeviz", version, about = "Turn voxel grids, point clouds and meshes into renderable scenes")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Describe one `.npz` occupancy grid as a scene of cubes
    Voxel(SingleArgs),
    /// Describe one `.ply` point cloud as a scene of spheres
    Points(SingleArgs),
    /// Describe one `.ply` triangle mesh as a scene
    Mesh(SingleArgs),
    /// Describe every matching file under a directory
    Batch(BatchArgs),
    /// Crop a rendered image around its center
    Crop(CropArgs),
}

#[derive(Args)]
struct SingleArgs {
    input: PathBuf,

    #[arg(short, long, default_value = "renders")]
    out_dir: PathBuf,

    /// TOML render config; defaults depend on the input kind
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Voxel,
    Points,
    Mesh,
}

impl From<KindArg> for InputKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Voxel => InputKind::Voxel,
            KindArg::Points => InputKind::Points,
            KindArg::Mesh => InputKind::Mesh,
        }
    }
}

#[derive(Args)]
struct BatchArgs {
    dir: PathBuf,

    #[arg(long, value_enum)]
    kind: KindArg,

    #[arg(short, long, default_value = "renders")]
    out_dir: PathBuf,

    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Worker threads (0 = one per core)
    #[arg(short = 'j', long, default_value_t = 0)]
    threads: usize,
}

#[derive(Args)]
struct CropArgs {
    image: PathBuf,

    #[arg(long)]
    left: u32,

    #[arg(long)]
    right: u32,

    #[arg(long)]
    top: u32,

    #[arg(long)]
    bottom: u32,

    /// Defaults to `<stem>_cropped.<ext>` beside the input
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match cli.command {
        Commands::Voxel(args) => run_single(args, InputKind::Voxel),
        Commands::Points(args) => run_single(args, InputKind::Points),
        Commands::Mesh(args) => run_single(args, InputKind::Mesh),
        Commands::Batch(args) => run_batch(args),
        Commands::Crop(args) => run_crop(args),
    }
}

fn load_config(path: Option<&Path>, kind: InputKind) -> Result<RenderConfig> {
    match path {
        Some(path) => RenderConfig::load(path).with_context(|| format!("loading config {}", path.display())),
        None => Ok(match kind {
            InputKind::Voxel => RenderConfig::voxel(),
            InputKind::Points => RenderConfig::point_cloud(),
            InputKind::Mesh => RenderConfig::mesh(),
        }),
    }
}

fn run_single(args: SingleArgs, kind: InputKind) -> Result<()> {
    let config = load_config(args.config.as_deref(), kind)?;
    let job = RenderJob::new(&args.input, &args.out_dir, kind, &config.render.format)?;
    let outcome = job
        .run(&config, &JsonSceneExporter::new())
        .with_context(|| format!("processing {}", args.input.display()))?;
    println!(
        "{} elements -> {}",
        outcome.elements,
        JsonSceneExporter::scene_path(&outcome.output).display()
    );
    Ok(())
}

fn run_batch(args: BatchArgs) -> Result<()> {
    let kind = InputKind::from(args.kind);
    let config = load_config(args.config.as_deref(), kind)?;

    let mut runner = BatchRunner::new(config);
    if args.threads > 0 {
        runner = runner.with_threads(args.threads);
    }

    let jobs = runner
        .discover(&args.dir, kind, &args.out_dir)
        .with_context(|| format!("scanning {}", args.dir.display()))?;
    if jobs.is_empty() {
        return Err(anyhow!("no .{} files under {}", kind.extension(), args.dir.display()));
    }

    let report = runner.run(&jobs, &JsonSceneExporter::new())?;
    println!("{} of {} inputs described", report.succeeded.len(), report.total());
    for failure in &report.failed {
        println!("  failed: {}: {}", failure.input.display(), failure.error);
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(anyhow!("{} inputs failed", report.failed.len()))
    }
}

fn run_crop(args: CropArgs) -> Result<()> {
    let margins = CropMargins {
        left: args.left,
        right: args.right,
        top: args.top,
        bottom: args.bottom,
    };
    let out = match args.out {
        Some(out) => out,
        None => cropped_path(&args.image)?,
    };
    shapeviz_io::crop_center_to(&args.image, &out, margins)
        .with_context(|| format!("cropping {}", args.image.display()))?;
    println!("{}", out.display());
    Ok(())
}

fn cropped_path(image: &Path) -> Result<PathBuf> {
    let stem = image
        .file_stem()
        .ok_or_else(|| anyhow!("{} has no file name", image.display()))?;
    let ext = image.extension().and_then(|e| e.to_str()).unwrap_or("png");
    Ok(image.with_file_name(format!("{}_cropped.{}", stem.to_string_lossy(), ext)))
}
