use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Builds a color from 8-bit channels, e.g. `0x10, 0xB9, 0x81`.
    #[must_use]
    pub const fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
        Self::rgb(
            red as f64 / 255.0,
            green as f64 / 255.0,
            blue as f64 / 255.0,
        )
    }

    #[must_use]
    pub const fn with_alpha(self, alpha: f64) -> Self {
        Self::rgba(self.red, self.green, self.blue, alpha)
    }

    pub fn validate(self) -> ChartResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

fn ensure_finite(values: &[f64], what: &str) -> ChartResult<()> {
    if values.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(ChartError::InvalidData(format!("{what} must be finite")))
    }
}

/// Draw command for one line segment in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePrimitive {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke_width: f64,
    pub color: Color,
}

impl LinePrimitive {
    #[must_use]
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64, stroke_width: f64, color: Color) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            stroke_width,
            color,
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        ensure_finite(&[self.x1, self.y1, self.x2, self.y2], "line coordinates")?;
        if !self.stroke_width.is_finite() || self.stroke_width <= 0.0 {
            return Err(ChartError::InvalidData(
                "line stroke width must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}

/// Filled rectangle, used for edge-zone shading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectPrimitive {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Color,
}

impl RectPrimitive {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64, fill: Color) -> Self {
        Self {
            x,
            y,
            width,
            height,
            fill,
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        ensure_finite(&[self.x, self.y, self.width, self.height], "rect geometry")?;
        if self.width < 0.0 || self.height < 0.0 {
            return Err(ChartError::InvalidData(
                "rect size must be >= 0".to_owned(),
            ));
        }
        self.fill.validate()
    }
}

/// Point marker drawn over a selected sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CirclePrimitive {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f64,
}

impl CirclePrimitive {
    #[must_use]
    pub const fn marker(cx: f64, cy: f64, radius: f64, stroke: Color) -> Self {
        Self {
            cx,
            cy,
            radius,
            fill: Color::WHITE,
            stroke,
            stroke_width: 2.0,
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        ensure_finite(&[self.cx, self.cy], "circle center")?;
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(ChartError::InvalidData(
                "circle radius must be finite and > 0".to_owned(),
            ));
        }
        self.fill.validate()?;
        self.stroke.validate()
    }
}
