//! Aspect ratio constraints for crop selections.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Aspect ratio specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    /// Square (1:1)
    pub const SQUARE: AspectRatio = AspectRatio {
        width: 1,
        height: 1,
    };

    /// Widescreen (16:9)
    pub const WIDESCREEN: AspectRatio = AspectRatio {
        width: 16,
        height: 9,
    };

    /// Standard (4:3)
    pub const STANDARD: AspectRatio = AspectRatio {
        width: 4,
        height: 3,
    };

    /// Create a new aspect ratio.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the aspect ratio as a decimal.
    pub fn as_f64(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl FromStr for AspectRatio {
    type Err = AspectRatioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 2 {
            return Err(AspectRatioParseError::InvalidFormat(s.to_string()));
        }

        let width = parts[0]
            .trim()
            .parse()
            .map_err(|_| AspectRatioParseError::InvalidNumber(parts[0].to_string()))?;
        let height = parts[1]
            .trim()
            .parse()
            .map_err(|_| AspectRatioParseError::InvalidNumber(parts[1].to_string()))?;

        if width == 0 || height == 0 {
            return Err(AspectRatioParseError::ZeroValue);
        }

        Ok(AspectRatio { width, height })
    }
}

#[derive(Debug, Error)]
pub enum AspectRatioParseError {
    #[error("Invalid aspect ratio format: {0}, expected 'W:H' or 'free'")]
    InvalidFormat(String),
    #[error("Invalid number in aspect ratio: {0}")]
    InvalidNumber(String),
    #[error("Aspect ratio cannot have zero values")]
    ZeroValue,
}

/// Aspect constraint applied to the interactive cropper.
///
/// `Free` leaves the selection unconstrained; `Fixed` requires the selection
/// to match the ratio within a one-pixel rounding tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case", tag = "mode", content = "ratio")]
pub enum AspectConstraint {
    #[default]
    Free,
    Fixed(AspectRatio),
}

impl AspectConstraint {
    /// The constraint options offered by the UI selector.
    pub const PRESETS: &'static [AspectConstraint] = &[
        AspectConstraint::Free,
        AspectConstraint::Fixed(AspectRatio::SQUARE),
        AspectConstraint::Fixed(AspectRatio::WIDESCREEN),
        AspectConstraint::Fixed(AspectRatio::STANDARD),
    ];

    /// Check whether a `width x height` selection conforms to this constraint.
    ///
    /// Fixed ratios tolerate up to one pixel of rounding slack on the width:
    /// |w * rh - h * rw| <= rh.
    pub fn conforms(&self, width: u32, height: u32) -> bool {
        match self {
            AspectConstraint::Free => true,
            AspectConstraint::Fixed(ratio) => {
                if width == 0 || height == 0 {
                    return false;
                }
                let lhs = width as u64 * ratio.height as u64;
                let rhs = height as u64 * ratio.width as u64;
                lhs.abs_diff(rhs) <= ratio.height as u64
            }
        }
    }
}

impl fmt::Display for AspectConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AspectConstraint::Free => write!(f, "free"),
            AspectConstraint::Fixed(ratio) => write!(f, "{}", ratio),
        }
    }
}

impl FromStr for AspectConstraint {
    type Err = AspectRatioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("free") {
            return Ok(AspectConstraint::Free);
        }
        s.parse::<AspectRatio>().map(AspectConstraint::Fixed)
    }
}
