use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "mappaint", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Paint a scene file into a PNG.
    Render(RenderArgs),
    /// Print the tile grid used for parallel painting.
    Tiles(TilesArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene JSON.
    #[arg(long)]
    scene: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Paint threads; overrides the scene configuration.
    #[arg(long)]
    threads: Option<usize>,

    /// Paint with hard edges.
    #[arg(long)]
    no_antialiasing: bool,
}

#[derive(Parser, Debug)]
struct TilesArgs {
    /// Frame width in pixels.
    #[arg(long)]
    width: u32,

    /// Frame height in pixels.
    #[arg(long)]
    height: u32,

    /// Requested number of tiles.
    #[arg(long)]
    count: usize,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Tiles(args) => cmd_tiles(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let scene = mappaint::SceneFile::load(&args.scene)
        .with_context(|| format!("load scene '{}'", args.scene.display()))?;
    let base_dir = args.scene.parent().unwrap_or_else(|| Path::new("."));
    let built = scene.build(base_dir).with_context(|| "build scene")?;

    let mut config = built.config;
    if let Some(threads) = args.threads {
        config.render_threads = threads;
    }
    if args.no_antialiasing {
        config.antialiasing = false;
    }

    let mut renderer = mappaint::MapRenderer::new(config, Arc::new(built.source))
        .with_context(|| "create renderer")?;
    let mut frame = mappaint::FrameBuffer::new(built.viewport.width(), built.viewport.height());
    let report = renderer
        .render(&built.data, &built.viewport, &mut frame)
        .with_context(|| "render frame")?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.to_unpremultiplied(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!(
        "{:?}: {} primitives, {} records published, {} painted on {} tile(s), {} failed",
        report.outcome,
        report.primitives_resolved,
        report.records_published,
        report.records_painted,
        report.tiles,
        report.failed_primitives
    );
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_tiles(args: TilesArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.width > 0 && args.height > 0,
        "frame size must be non-zero"
    );
    let screen = mappaint::ScreenRect::from_size(args.width, args.height);
    let (columns, rows) = mappaint::tile_grid(args.count);
    println!("{columns}x{rows}");
    for tile in mappaint::split_tiles(screen, args.count) {
        println!("{} {} {} {}", tile.x, tile.y, tile.width, tile.height);
    }
    Ok(())
}
