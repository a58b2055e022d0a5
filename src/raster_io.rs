use crate::types::*;
use gdal::raster::ResampleAlg;
use gdal::vector::LayerAccess;
use gdal::Dataset;
use geo_types::{coord, Rect};
use ndarray::Array2;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Read access to a georeferenced grid of pixel values.
pub trait RasterSource {
    /// GDAL-ordered affine coefficients
    /// `[origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]`.
    fn geo_transform(&self) -> [f64; 6];

    /// Reads `window` as a `(rows, cols)` array. The read is all-or-nothing:
    /// a window reaching past any raster edge is an error.
    fn read_window(&self, window: &PixelWindow) -> Result<Array2<f64>>;
}

/// Polygon zones addressed by 1-based feature id.
pub trait ZoneSource {
    fn feature_count(&self) -> u64;

    /// Axis-aligned bounding envelope of feature `fid`, in the layer's own CRS.
    fn envelope(&self, fid: u64) -> Result<Rect<f64>>;
}

/// Single band of a GDAL raster dataset.
pub struct ValueRaster {
    dataset: Dataset,
    band: isize,
    transform: [f64; 6],
    size: (usize, usize),
}

impl ValueRaster {
    pub fn open(path: &Path, band: isize) -> Result<Self> {
        let dataset = Dataset::open(path)?;
        let transform = dataset.geo_transform()?;

        let n_bands = dataset.raster_count();
        if n_bands == 0 {
            return Err(ZonalError::EmptyDataset("raster bands".to_string()));
        }
        if band < 1 || band > n_bands {
            return Err(ZonalError::Config(format!(
                "Band {} requested but raster has {} band(s)",
                band, n_bands
            )));
        }

        let size = dataset.rasterband(band)?.size();
        debug!(
            "Opened raster {} ({}x{}, band {}/{})",
            path.display(),
            size.0,
            size.1,
            band,
            n_bands
        );

        Ok(Self {
            dataset,
            band,
            transform,
            size,
        })
    }

    /// (width, height) in pixels
    pub fn size(&self) -> (usize, usize) {
        self.size
    }
}

impl RasterSource for ValueRaster {
    fn geo_transform(&self) -> [f64; 6] {
        self.transform
    }

    fn read_window(&self, window: &PixelWindow) -> Result<Array2<f64>> {
        let (width, height) = self.size;
        // Checked here so GDAL does not print its own CPLError for every miss
        let out_of_bounds = || ZonalError::OutOfBounds {
            window: *window,
            width,
            height,
        };
        if !window.fits_within(width, height) {
            return Err(out_of_bounds());
        }
        let n_pixels = window.pixel_count().ok_or_else(out_of_bounds)?;

        let band = self.dataset.rasterband(self.band)?;
        let mut data = vec![0f64; n_pixels];
        band.read_into_slice(
            (window.x_offset, window.y_offset),
            (window.x_count, window.y_count),
            (window.x_count, window.y_count),
            &mut data,
            Some(ResampleAlg::NearestNeighbour),
        )?;

        Array2::from_shape_vec((window.y_count, window.x_count), data)
            .map_err(|e| ZonalError::Config(format!("Failed to create array: {}", e)))
    }
}

/// One layer of a GDAL vector dataset.
pub struct ZoneLayer {
    dataset: Dataset,
    layer_index: isize,
    feature_count: u64,
}

impl ZoneLayer {
    pub fn open(path: &Path, layer_index: isize) -> Result<Self> {
        let dataset = Dataset::open(path)?;

        let n_layers = dataset.layer_count();
        if n_layers == 0 {
            return Err(ZonalError::EmptyDataset("vector layers".to_string()));
        }
        if layer_index < 0 || layer_index >= n_layers {
            return Err(ZonalError::Config(format!(
                "Layer {} requested but vector source has {} layer(s)",
                layer_index, n_layers
            )));
        }

        let feature_count = dataset.layer(layer_index)?.feature_count();
        debug!(
            "Opened vector {} (layer {}, {} features)",
            path.display(),
            layer_index,
            feature_count
        );

        Ok(Self {
            dataset,
            layer_index,
            feature_count,
        })
    }
}

impl ZoneSource for ZoneLayer {
    fn feature_count(&self) -> u64 {
        self.feature_count
    }

    fn envelope(&self, fid: u64) -> Result<Rect<f64>> {
        let layer = self.dataset.layer(self.layer_index)?;
        let feature = layer.feature(fid).ok_or(ZonalError::FeatureNotFound(fid))?;
        let geometry = feature.geometry_by_index(0)?;
        if geometry.is_empty() {
            return Err(ZonalError::EmptyGeometry(fid));
        }

        // OGR envelope covers Z/M and curved types alike
        let envelope = geometry.envelope();
        Ok(Rect::new(
            coord! { x: envelope.MinX, y: envelope.MinY },
            coord! { x: envelope.MaxX, y: envelope.MaxY },
        ))
    }
}

/// Writes `id,min,median,max` rows in record order. Missing values are
/// left as empty fields.
pub fn write_csv(path: &Path, records: &[ZoneStats]) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);

    writeln!(file, "id,min,median,max")?;
    for record in records {
        writeln!(file, "{}", csv_row(record))?;
    }
    file.flush()?;

    Ok(())
}

fn csv_row(record: &ZoneStats) -> String {
    fn field<T: ToString>(value: Option<T>) -> String {
        value.map(|v| v.to_string()).unwrap_or_default()
    }

    format!(
        "{},{},{},{}",
        record.id,
        field(record.min),
        field(record.median),
        field(record.max)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_csv_row_formats_values() {
        let record = ZoneStats {
            id: 3,
            min: Some(1.0),
            median: Some(5),
            max: Some(9.5),
        };
        assert_eq!(csv_row(&record), "3,1,5,9.5");
    }

    #[test]
    fn test_csv_row_leaves_absent_values_blank() {
        assert_eq!(csv_row(&ZoneStats::absent(7)), "7,,,");
    }

    #[test]
    fn test_write_csv_header_and_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let records = vec![
            ZoneStats {
                id: 1,
                min: Some(-2.25),
                median: Some(0),
                max: Some(4.0),
            },
            ZoneStats::absent(2),
        ];

        write_csv(&path, &records).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "id,min,median,max\n1,-2.25,0,4\n2,,,\n");
    }

    #[test]
    fn test_write_csv_empty_table_keeps_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");

        write_csv(&path, &[]).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "id,min,median,max\n"
        );
    }

    #[test]
    fn test_open_missing_raster_fails() {
        let dir = TempDir::new().unwrap();
        let result = ValueRaster::open(&dir.path().join("missing.tif"), 1);
        assert!(matches!(result, Err(ZonalError::Gdal(_))));
    }
}
