use anyhow::Context;
use clap::Parser;
use exif_cleaner::{Cli, ExifCleaner};
use log::LevelFilter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logger
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = cli.into_config();
    config.default_report_dir = std::env::current_dir().context("Cannot resolve working directory")?;

    log::debug!("Start");
    let cleaner = ExifCleaner::new(config).context("Invalid configuration")?;
    let summary = cleaner.run().context("EXIF cleaning failed")?;
    log::debug!("Done!");

    if let Some(output_dir) = &summary.output_dir {
        println!(
            "Cleaned {} of {} images into: {}",
            summary.succeeded,
            summary.discovered,
            output_dir.display()
        );
    }

    if let Some(path) = &summary.report_path {
        println!("EXIF report saved to: {}", path.display());
    }

    if summary.failed > 0 {
        println!("{} image(s) could not be processed, see log for details", summary.failed);
    }

    Ok(())
}
