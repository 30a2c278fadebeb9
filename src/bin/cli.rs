use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;

use sat_collage::catalog::list_images;
use sat_collage::collage::{CollageOptions, CollageRequest, generate_collage};
use sat_collage::test_image_gen::generate_demo_set;

#[derive(Parser, Debug)]
#[command(
    name = "collage",
    about = "Combine one quadrant from each of four satellite images into a labelled collage",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the images of a folder with the timestamps found in their names
    List {
        /// Directory containing input images
        dir: PathBuf,
    },

    /// Build a collage from exactly four images (top-left, top-right, bottom-left, bottom-right)
    Build {
        /// Output image; the format follows the extension
        #[arg(short = 'o', long = "out")]
        out: PathBuf,

        #[arg(long = "sat-model", default_value = "")]
        sat_model: String,

        #[arg(long = "orbit", default_value = "")]
        orbit: String,

        /// Leave the timestamps out
        #[arg(long = "no-labels")]
        no_labels: bool,

        /// Label font file name or path; empty uses the embedded face
        #[arg(long = "font")]
        font: Option<String>,

        #[arg(long = "font-size")]
        font_size: Option<f32>,

        images: Vec<PathBuf>,
    },

    /// Write four synthetic, timestamp-named images for trying the tools
    Demo {
        dir: PathBuf,

        #[arg(long = "width", default_value_t = 640)]
        width: u32,

        #[arg(long = "height", default_value_t = 480)]
        height: u32,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    sat_collage::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::List { dir } => {
            if !dir.is_dir() {
                return Err(format!("Not a directory: {}", dir.display()).into());
            }
            let entries = list_images(&dir)?;
            if entries.is_empty() {
                eprintln!("No images found in {}", dir.display());
            }
            for entry in entries {
                println!("{}", entry.display_line());
            }
        }
        Command::Build {
            out,
            sat_model,
            orbit,
            no_labels,
            font,
            font_size,
            images,
        } => {
            let mut options = CollageOptions {
                labels: !no_labels,
                ..CollageOptions::default()
            };
            if let Some(font) = font {
                options.font_name = font;
            }
            if let Some(px) = font_size {
                options.font_px = px;
            }

            let request = CollageRequest::new(images, sat_model, orbit);
            let written = generate_collage(&request, &options, &out)?;
            println!("{} -> {}", request.title(), written.display());
        }
        Command::Demo { dir, width, height } => {
            for path in generate_demo_set(&dir, width, height)? {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}
