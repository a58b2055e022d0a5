use crate::raster_io::{RasterSource, ZoneSource};
use crate::types::*;
use geo_types::Rect;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

/// Maps a geographic envelope to the raster window covering it.
///
/// Only the origin and `transform[1]` are used: pixels are taken to be
/// square and north-up, and the envelope must already be in the raster's
/// CRS.
pub fn pixel_window(transform: &[f64; 6], envelope: &Rect<f64>) -> PixelWindow {
    let origin_x = transform[0];
    let origin_y = transform[3];
    let pixel_width = transform[1];

    let (min, max) = (envelope.min(), envelope.max());

    PixelWindow {
        x_offset: ((min.x - origin_x) / pixel_width).floor() as isize,
        y_offset: ((origin_y - max.y) / pixel_width).floor() as isize,
        x_count: (((max.x - min.x) / pixel_width).floor() as usize).saturating_add(1),
        y_count: (((max.y - min.y) / pixel_width).floor() as usize).saturating_add(1),
    }
}

/// Reduces window pixels to min / median / max.
///
/// The median of an even-sized window is the mean of the two middle
/// values, truncated toward zero. A window holding any NaN pixel has no
/// defined statistics and gives an all-absent record.
pub fn summarize(id: u64, values: &[f64]) -> ZoneStats {
    if values.is_empty() || values.iter().any(|v| v.is_nan()) {
        return ZoneStats::absent(id);
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let median = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    };

    ZoneStats {
        id,
        min: Some(sorted[0]),
        median: median.is_finite().then(|| median.trunc() as i64),
        max: Some(sorted[n - 1]),
    }
}

/// Zonal statistics over a raster for every feature of a zone layer.
///
/// Statistics cover the whole bounding window of each feature, so pixels
/// inside the envelope but outside the polygon are counted too. No nodata
/// masking is applied.
pub struct ZonalEngine<'a, R: RasterSource, Z: ZoneSource> {
    raster: &'a R,
    zones: &'a Z,
    transform: [f64; 6],
    show_progress: bool,
}

impl<'a, R: RasterSource, Z: ZoneSource> ZonalEngine<'a, R, Z> {
    pub fn new(raster: &'a R, zones: &'a Z) -> Self {
        let transform = raster.geo_transform();

        if transform[2] != 0.0 || transform[4] != 0.0 {
            warn!("Raster transform is rotated; rotation terms are ignored");
        }
        if (transform[1].abs() - transform[5].abs()).abs() > f64::EPSILON * transform[1].abs() {
            warn!(
                "Pixels are not square ({} x {}); using {} for both axes",
                transform[1],
                transform[5].abs(),
                transform[1]
            );
        }

        Self {
            raster,
            zones,
            transform,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Statistics for one feature. Lookup or read failures give an
    /// all-absent record instead of an error.
    pub fn zone_stats(&self, fid: u64) -> ZoneStats {
        let envelope = match self.zones.envelope(fid) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Skipping feature {}: {}", fid, e);
                return ZoneStats::absent(fid);
            }
        };

        let window = pixel_window(&self.transform, &envelope);

        match self.raster.read_window(&window) {
            Ok(data) => {
                let values: Vec<f64> = data.iter().copied().collect();
                summarize(fid, &values)
            }
            Err(e) => {
                debug!("No data for feature {} at {}: {}", fid, window, e);
                ZoneStats::absent(fid)
            }
        }
    }

    /// Runs features `1..=feature_count` in order, one at a time.
    pub fn run(&self) -> Vec<ZoneStats> {
        let n_features = self.zones.feature_count();
        info!("Processing {} features", n_features);

        let pb = if self.show_progress {
            ProgressBar::new(n_features)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            pb.set_style(style);
        }

        let mut records = Vec::with_capacity(n_features as usize);
        for fid in 1..=n_features {
            records.push(self.zone_stats(fid));
            pb.inc(1);
        }
        pb.finish_and_clear();

        let absent = records.iter().filter(|r| r.is_absent()).count();
        if absent > 0 {
            info!("{} of {} features produced no data", absent, n_features);
        }

        records
    }
}
