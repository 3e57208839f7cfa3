// exif-cleaner/src/cli.rs
use crate::core::CleanConfig;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "exif-cleaner",
    author,
    version,
    about = "Remove EXIF metadata from a folder of images, optionally keeping a JSON record of it"
)]
pub struct Cli {
    /// Folder containing the images (searched recursively). JPEG and PNG
    /// files are cleaned; HEIC files are listed in the JSON report but not
    /// rewritten
    #[arg(short, long)]
    pub input_folder: PathBuf,

    /// Folder where images without EXIF data will be saved
    #[arg(short, long)]
    pub output_folder: PathBuf,

    /// Create a JSON file with the extracted EXIF data
    #[arg(short = 'j', long, default_value_t = true, action = ArgAction::Set)]
    pub create_json: bool,

    /// Write stripped copies to the output folder
    #[arg(short = 'c', long, default_value_t = true, action = ArgAction::Set)]
    pub clean_exif: bool,

    /// Number of worker threads (0 = all cores)
    #[arg(short, long, default_value_t = 0)]
    pub threads: usize,

    /// JPEG re-encode quality (1-100)
    #[arg(short, long, default_value_t = 95, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    /// Losslessly recompress stripped PNG copies
    #[arg(long)]
    pub optimize_png: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn into_config(self) -> CleanConfig {
        CleanConfig {
            input_dir: self.input_folder,
            output_dir: self.output_folder,
            create_json: self.create_json,
            clean_exif: self.clean_exif,
            threads: self.threads,
            jpeg_quality: self.quality,
            optimize_png: self.optimize_png,
            ..Default::default()
        }
    }
}
