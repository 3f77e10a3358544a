use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use scenemask_rs::types::WHOLE_OBJECT_KEY;
use scenemask_rs::{extract_scene, mask, viz, IdentityTable};

#[derive(Parser)]
#[command(name = "scenemask-extract")]
#[command(
    about = "Recover per-object and per-part segmentation masks and bounding boxes from a flat-shaded ID render"
)]
struct Cli {
    /// Path to the rendered ID image
    #[arg(long)]
    image: PathBuf,

    /// Path to the pass-index identity table JSON
    #[arg(long)]
    table: PathBuf,

    /// Where to write the per-object mask/box record JSON
    #[arg(long)]
    out: PathBuf,

    /// Optionally write a verification overlay image here
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Pretty-print the output JSON
    #[arg(long)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    eprintln!("Loading identity table from {:?}...", cli.table);
    let table = IdentityTable::from_path(&cli.table)
        .with_context(|| format!("invalid identity table {:?}", cli.table))?;

    eprintln!("Loading render from {:?}...", cli.image);
    let img = image::open(&cli.image)
        .with_context(|| format!("cannot read image {:?}", cli.image))?
        .to_rgb8();
    let (width, height) = img.dimensions();

    eprintln!(
        "Decoding {} table entries over {}x{} pixels...",
        table.len(),
        width,
        height
    );
    let masks = extract_scene(&img, &table);

    let file = File::create(&cli.out)
        .with_context(|| format!("cannot create output file {:?}", cli.out))?;
    let writer = BufWriter::new(file);
    if cli.pretty {
        serde_json::to_writer_pretty(writer, &masks)?;
    } else {
        serde_json::to_writer(writer, &masks)?;
    }

    if let Some(ref overlay_path) = cli.overlay {
        viz::overlay(&img, &masks)
            .save(overlay_path)
            .with_context(|| format!("cannot write overlay image {:?}", overlay_path))?;
        eprintln!("Wrote overlay to {:?}", overlay_path);
    }

    for (object_index, record) in &masks.0 {
        let visible = record
            .parts
            .get(WHOLE_OBJECT_KEY)
            .map(|part| mask::area(&mask::rle_from_string(part.rle(), height, width)))
            .unwrap_or(0);
        eprintln!(
            "object {} ({}): {} parts, {} px visible",
            object_index,
            record.info,
            record.parts.len().saturating_sub(1),
            visible
        );
    }

    let foreground = mask::area(&viz::scene_foreground(&masks, height, width));
    println!(
        "objects: {}, entries: {}, foreground_px: {}",
        masks.len(),
        table.len(),
        foreground
    );

    Ok(())
}
