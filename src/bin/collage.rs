use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "collage", version, about = "Frame, shadow and rasterize an SVG photo collage")]
struct Cli {
    /// Input SVG collage.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory the PNG is written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// JSON options file; flags below override its values.
    #[arg(long)]
    opts: Option<PathBuf>,

    /// Photo frame thickness.
    #[arg(long)]
    photo_thickness: Option<f64>,

    /// Note frame thickness.
    #[arg(long)]
    note_thickness: Option<f64>,

    /// Worker threads used to fetch images.
    #[arg(long)]
    threads: Option<usize>,

    /// Base URL for relative image references (defaults to the input's directory).
    #[arg(long)]
    base_url: Option<String>,

    /// Extra directory of .ttf/.otf/.ttc fonts.
    #[arg(long)]
    fonts_dir: Option<PathBuf>,

    /// Also write the processed SVG here.
    #[arg(long)]
    dump_svg: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut opts = match &cli.opts {
        Some(path) => collage::CollageOpts::from_path(path)?,
        None => collage::CollageOpts::default(),
    };
    if let Some(v) = cli.photo_thickness {
        opts.photo_frame_thickness = v;
    }
    if let Some(v) = cli.note_thickness {
        opts.note_frame_thickness = v;
    }
    if let Some(v) = cli.threads {
        opts.threads = Some(v);
    }
    if let Some(v) = cli.base_url {
        opts.base_url = Some(v);
    }
    if let Some(v) = cli.fonts_dir {
        opts.fonts_dir = Some(v);
    }
    if opts.base_url.is_none() {
        opts.base_url = input_dir_url(&cli.in_path);
    }

    let text = std::fs::read_to_string(&cli.in_path)
        .with_context(|| format!("read collage '{}'", cli.in_path.display()))?;
    let mut doc = collage::Document::parse(&text)?;

    let fetcher = collage::HttpFetcher::new();
    let measure = collage::UsvgTextMeasure::new(opts.fonts_dir.as_deref());
    let mut sink = collage::FileSink::new(&cli.out_dir);

    let report = collage::process_collage(&mut doc, &opts, &fetcher, &measure, &mut sink)?;

    if let Some(path) = &cli.dump_svg {
        std::fs::write(path, doc.to_svg_string())
            .with_context(|| format!("write svg '{}'", path.display()))?;
    }

    println!(
        "wrote {} ({}x{}, {} photo frames, {} note frames, {} images embedded)",
        cli.out_dir.join(&report.file_name).display(),
        report.width,
        report.height,
        report.photo_frames,
        report.note_frames,
        report.embed.embedded,
    );
    Ok(())
}

/// `file://` URL of the directory holding `path`, so relative image references resolve next to it.
fn input_dir_url(path: &std::path::Path) -> Option<String> {
    let abs = std::fs::canonicalize(path).ok()?;
    let dir = abs.parent()?;
    url::Url::from_directory_path(dir).ok().map(String::from)
}
