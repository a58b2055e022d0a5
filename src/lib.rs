//! Zonal statistics of raster values over vector polygon features.
//!
//! For every feature of a zone layer the raster window covering the
//! feature's bounding envelope is read and reduced to min / median / max.
//! The window is the envelope, not the polygon: pixels outside the polygon
//! but inside its bounding box are included, and nodata values are not
//! masked.
//!
//! Raster and vector inputs must share a CRS. Nothing is reprojected.

pub mod config;
pub mod raster_io;
pub mod types;
pub mod zonal_engine;

pub use config::{default_output_name, Args, RunConfig};
pub use raster_io::{write_csv, RasterSource, ValueRaster, ZoneLayer, ZoneSource};
pub use types::{PixelWindow, Result, ZonalError, ZoneStats};
pub use zonal_engine::{pixel_window, summarize, ZonalEngine};

use tracing::info;

/// Opens both inputs, computes every feature and writes the CSV.
pub fn run(config: &RunConfig) -> Result<Vec<ZoneStats>> {
    let zones = ZoneLayer::open(&config.vector_path, config.layer)?;
    let raster = ValueRaster::open(&config.raster_path, config.band)?;

    let records = ZonalEngine::new(&raster, &zones)
        .with_progress(config.show_progress)
        .run();

    write_csv(&config.output_path, &records)?;
    info!(
        "Wrote {} rows to {}",
        records.len(),
        config.output_path.display()
    );

    Ok(records)
}
