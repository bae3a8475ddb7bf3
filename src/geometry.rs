//! Conversions between normalized image coordinates and pixels.
//!
//! Stored geometry is resolution independent: a [`Point`] is a fraction of
//! the image width and height. Pixel positions only exist for a given
//! measured image size, which callers pass on every conversion.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::PointRecord;

/// Decimal digits kept on normalized coordinates.
pub const PRECISION_DIGITS: i32 = 4;

const SCALE: f64 = 10_000.0;

/// A position on the site image as a fraction of its width and height.
///
/// Both components are clamped to `[0, 1]` and rounded to
/// [`PRECISION_DIGITS`] decimals on construction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "PointRecord", into = "PointRecord")]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: normalize_component(x),
            y: normalize_component(y),
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }
}

/// A position in rendered image pixels, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Measured pixel size of a rendered image. Only exists once both sides are
/// known and non-zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSize {
    width: f64,
    height: f64,
}

impl ImageSize {
    /// Returns `None` while the image has no usable measurement.
    pub fn measured(width: f64, height: f64) -> Option<Self> {
        let usable = |v: f64| v.is_finite() && v > 0.0;
        if usable(width) && usable(height) {
            Some(Self { width, height })
        } else {
            None
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn to_pixel(&self, point: Point) -> PixelPoint {
        PixelPoint {
            x: point.x * self.width,
            y: point.y * self.height,
        }
    }

    pub fn to_normalized(&self, px: f64, py: f64) -> Point {
        Point::new(px / self.width, py / self.height)
    }
}

pub fn to_pixel(point: Point, width: f64, height: f64) -> PixelPoint {
    PixelPoint {
        x: point.x * width,
        y: point.y * height,
    }
}

/// Inverse of [`to_pixel`]. Fails with [`Error::MeasurementUnavailable`]
/// when the image has not been measured yet.
pub fn to_normalized(px: f64, py: f64, width: f64, height: f64) -> Result<Point> {
    let size = ImageSize::measured(width, height).ok_or(Error::MeasurementUnavailable)?;
    Ok(size.to_normalized(px, py))
}

fn normalize_component(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    (value.clamp(0.0, 1.0) * SCALE).round() / SCALE
}
