use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use zonal_stats::{Args, RunConfig};

fn main() -> Result<()> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            eprintln!("[ ERROR ] you must supply two arguments: input-value-raster input-zone-vector");
            std::process::exit(1);
        }
    };

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install log subscriber")?;

    let config = RunConfig::from_args(&args)?;

    let records = zonal_stats::run(&config).with_context(|| {
        format!(
            "Zonal statistics failed for {} / {}",
            config.raster_path.display(),
            config.vector_path.display()
        )
    })?;
    println!(
        "Saved {} rows to {}",
        records.len(),
        config.output_path.display()
    );

    Ok(())
}
