use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

use webtools_core::ico::{
    pack_ico, read_directory, IcoEntry, IcoImage, DEFAULT_SIZES, MAX_ICON_SIZE,
};

#[derive(Debug, clap::Parser)]
#[command(name = "favicon")]
#[command(about = "Generate or inspect favicon.ico files")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Rasterize an image to several sizes and pack them into an .ico file
    #[clap(name = "generate")]
    Generate(GenerateOptions),

    /// Print the directory of an existing .ico file
    #[clap(name = "inspect")]
    Inspect(InspectOptions),
}

#[derive(Debug, clap::Args, Clone)]
pub struct GenerateOptions {
    /// Source image (PNG or JPEG)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output .ico path
    #[arg(short, long, default_value = "favicon.ico")]
    pub output: PathBuf,

    /// Icon sizes in pixels, comma separated (max 256)
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_SIZES.to_vec())]
    pub sizes: Vec<u32>,

    /// Also write each size as favicon-<N>x<N>.png into this directory
    #[arg(long, value_name = "DIR")]
    pub png_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct InspectOptions {
    /// .ico file to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct GenerateOutput {
    pub output: String,
    pub bytes: usize,
    pub entries: Vec<IcoEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub png_files: Vec<String>,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    match app.command {
        Commands::Generate(options) => generate(options, global),
        Commands::Inspect(options) => inspect(options),
    }
}

fn generate(options: GenerateOptions, global: crate::Global) -> Result<()> {
    if global.verbose {
        eprintln!(
            "Rasterizing {} at sizes {:?}",
            options.input.display(),
            options.sizes
        );
    }

    let source = std::fs::read(&options.input)
        .with_context(|| f!("Failed to read {}", options.input.display()))?;

    let output = generate_data(&source, &options.sizes, &options.output, options.png_dir.as_deref())?;

    if options.json {
        output_json(&output)?;
    } else {
        println!(
            "{} {} ({} bytes)",
            "Wrote".green().bold(),
            output.output.cyan(),
            output.bytes
        );
        print_entries(&output.entries);
        for png in &output.png_files {
            println!("{} {}", "Wrote".green(), png.cyan());
        }
    }

    Ok(())
}

/// Rasterize `source`, write the .ico (and optional PNGs), and describe the result
pub fn generate_data(
    source: &[u8],
    sizes: &[u32],
    output: &Path,
    png_dir: Option<&Path>,
) -> Result<GenerateOutput> {
    let images = rasterize(source, sizes)?;
    let icon = pack_ico(&images).map_err(|e| Error::Image(e.to_string()))?;

    std::fs::write(output, &icon).with_context(|| f!("Failed to write {}", output.display()))?;
    log::info!("wrote {} ({} bytes)", output.display(), icon.len());

    let mut png_files = Vec::new();
    if let Some(dir) = png_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| f!("Failed to create {}", dir.display()))?;

        for image in &images {
            let path = dir.join(f!("favicon-{0}x{0}.png", image.size));
            std::fs::write(&path, &image.data)
                .with_context(|| f!("Failed to write {}", path.display()))?;
            png_files.push(path.display().to_string());
        }
    }

    let entries = read_directory(&icon).map_err(|e| Error::Image(e.to_string()))?;

    Ok(GenerateOutput {
        output: output.display().to_string(),
        bytes: icon.len(),
        entries,
        png_files,
    })
}

/// Decode `source` and render a square PNG for every requested size.
///
/// The image is scaled to fit and centered on a transparent canvas, so
/// non-square sources keep their aspect ratio.
pub fn rasterize(source: &[u8], sizes: &[u32]) -> Result<Vec<IcoImage>> {
    if sizes.is_empty() {
        return Err(Error::InvalidInput("at least one size is required".to_string()).into());
    }
    if let Some(size) = sizes.iter().find(|s| **s == 0 || **s > MAX_ICON_SIZE) {
        return Err(Error::InvalidInput(f!(
            "size {size} is out of range (1-{MAX_ICON_SIZE})"
        ))
        .into());
    }

    let decoded = image::load_from_memory(source)
        .map_err(|e| Error::Image(f!("Failed to decode source image: {e}")))?;

    sizes
        .iter()
        .map(|&size| {
            let data = render_png(&decoded, size)?;
            log::debug!("rendered {size}x{size} ({} bytes)", data.len());
            Ok(IcoImage::new(size, data))
        })
        .collect()
}

fn render_png(source: &DynamicImage, size: u32) -> Result<Vec<u8>> {
    let scaled = source.resize(size, size, FilterType::Lanczos3).to_rgba8();

    let mut canvas = RgbaImage::new(size, size);
    let x = i64::from((size - scaled.width()) / 2);
    let y = i64::from((size - scaled.height()) / 2);
    imageops::overlay(&mut canvas, &scaled, x, y);

    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(canvas)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| Error::Image(f!("Failed to encode {size}x{size} PNG: {e}")))?;

    Ok(buf)
}

fn inspect(options: InspectOptions) -> Result<()> {
    let bytes = std::fs::read(&options.file)
        .with_context(|| f!("Failed to read {}", options.file.display()))?;
    let entries = read_directory(&bytes).map_err(|e| Error::InvalidInput(e.to_string()))?;

    if options.json {
        output_json(&entries)
    } else {
        print_entries(&entries);
        Ok(())
    }
}

fn print_entries(entries: &[IcoEntry]) {
    let mut table = new_table();
    table.add_row(prettytable::row![b => "#", "SIZE", "BPP", "BYTES", "OFFSET"]);

    for (index, entry) in entries.iter().enumerate() {
        table.add_row(prettytable::row![
            index,
            f!("{}x{}", entry.width, entry.height),
            entry.bits_per_pixel,
            entry.length,
            entry.offset
        ]);
    }

    table.printstd();
}
