use crate::types::*;
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Clone)]
#[command(name = "zonal-stats")]
#[command(author, version, about = "Min/median/max of raster values per vector feature", long_about = None)]
pub struct Args {
    /// Value raster (any GDAL raster format, e.g. GeoTIFF)
    pub raster: PathBuf,

    /// Zone polygons (any OGR vector format, e.g. shapefile or GeoPackage)
    pub vector: PathBuf,

    /// Raster band to read (1-based)
    #[arg(long, default_value_t = 1)]
    pub band: isize,

    /// Vector layer index (0-based)
    #[arg(long, default_value_t = 0)]
    pub layer: isize,

    /// Output CSV; defaults to <raster stem><vector stem>.csv in the working directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Settings for one batch run, resolved from [`Args`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub raster_path: PathBuf,
    pub vector_path: PathBuf,
    pub band: isize,
    pub layer: isize,
    pub output_path: PathBuf,
    pub show_progress: bool,
}

impl RunConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        if args.band < 1 {
            return Err(ZonalError::Config(format!(
                "Band must be 1 or greater, got {}",
                args.band
            )));
        }
        if args.layer < 0 {
            return Err(ZonalError::Config(format!(
                "Layer index must not be negative, got {}",
                args.layer
            )));
        }

        let output_path = match &args.output {
            Some(path) => path.clone(),
            None => default_output_name(&args.raster, &args.vector)?,
        };

        Ok(Self {
            raster_path: args.raster.clone(),
            vector_path: args.vector.clone(),
            band: args.band,
            layer: args.layer,
            output_path,
            show_progress: !args.no_progress,
        })
    }
}

/// `<raster stem><vector stem>.csv`, relative to the working directory.
pub fn default_output_name(raster: &Path, vector: &Path) -> Result<PathBuf> {
    let stem = |path: &Path| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| ZonalError::Config(format!("No file name in {}", path.display())))
    };

    Ok(PathBuf::from(format!("{}{}.csv", stem(raster)?, stem(vector)?)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> std::result::Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("zonal-stats").chain(argv.iter().copied()))
    }

    #[test]
    fn test_default_output_name_joins_stems() {
        let name = default_output_name(
            Path::new("/data/rasters/grid.tif"),
            Path::new("../zones/liechtenstein.sqlite"),
        )
        .unwrap();
        assert_eq!(name, PathBuf::from("gridliechtenstein.csv"));
    }

    #[test]
    fn test_default_output_name_rejects_bare_root() {
        assert!(default_output_name(Path::new("/"), Path::new("zones.shp")).is_err());
    }

    #[test]
    fn test_two_positionals_required() {
        assert!(parse(&["grid.tif"]).is_err());
        assert!(parse(&["grid.tif", "zones.shp", "extra"]).is_err());
        assert!(parse(&["grid.tif", "zones.shp"]).is_ok());
    }

    #[test]
    fn test_run_config_defaults() {
        let args = parse(&["grid.tif", "zones.shp"]).unwrap();
        let config = RunConfig::from_args(&args).unwrap();

        assert_eq!(config.band, 1);
        assert_eq!(config.layer, 0);
        assert_eq!(config.output_path, PathBuf::from("gridzones.csv"));
        assert!(config.show_progress);
    }

    #[test]
    fn test_run_config_overrides() {
        let args = parse(&[
            "grid.tif",
            "zones.shp",
            "--band",
            "2",
            "--layer",
            "1",
            "-o",
            "out/stats.csv",
            "--no-progress",
        ])
        .unwrap();
        let config = RunConfig::from_args(&args).unwrap();

        assert_eq!(config.band, 2);
        assert_eq!(config.layer, 1);
        assert_eq!(config.output_path, PathBuf::from("out/stats.csv"));
        assert!(!config.show_progress);
    }

    #[test]
    fn test_run_config_rejects_band_zero() {
        let args = parse(&["grid.tif", "zones.shp", "--band", "0"]).unwrap();
        assert!(matches!(
            RunConfig::from_args(&args),
            Err(ZonalError::Config(_))
        ));
    }
}
