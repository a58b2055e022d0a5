use std::fmt;

/// Pixel-space rectangle addressed on a raster band.
///
/// Offsets are signed because an envelope left of or above the raster
/// origin maps to negative pixel positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub x_offset: isize,
    pub y_offset: isize,
    pub x_count: usize,
    pub y_count: usize,
}

impl PixelWindow {
    /// `None` when the pixel count does not fit in `usize`.
    pub fn pixel_count(&self) -> Option<usize> {
        self.x_count.checked_mul(self.y_count)
    }

    /// True when the whole window lies on a raster of `width` x `height` pixels.
    pub fn fits_within(&self, width: usize, height: usize) -> bool {
        let end = |offset: isize, count: usize| {
            usize::try_from(offset)
                .ok()
                .and_then(|o| o.checked_add(count))
        };
        matches!(end(self.x_offset, self.x_count), Some(x) if x <= width)
            && matches!(end(self.y_offset, self.y_count), Some(y) if y <= height)
    }
}

impl fmt::Display for PixelWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) {}x{}",
            self.x_offset, self.y_offset, self.x_count, self.y_count
        )
    }
}

/// One output row: statistics for a single feature.
///
/// `None` means the window read produced no data for that feature.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneStats {
    pub id: u64,
    pub min: Option<f64>,
    pub median: Option<i64>,
    pub max: Option<f64>,
}

impl ZoneStats {
    pub fn absent(id: u64) -> Self {
        Self {
            id,
            min: None,
            median: None,
            max: None,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.min.is_none() && self.median.is_none() && self.max.is_none()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ZonalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Dataset has no {0}")]
    EmptyDataset(String),
    #[error("Window {window} is outside the {width}x{height} raster")]
    OutOfBounds {
        window: PixelWindow,
        width: usize,
        height: usize,
    },
    #[error("Feature {0} not found")]
    FeatureNotFound(u64),
    #[error("Feature {0} has an empty geometry")]
    EmptyGeometry(u64),
}

pub type Result<T> = std::result::Result<T, ZonalError>;
