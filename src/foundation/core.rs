use std::str::FromStr;

use crate::foundation::error::{CollageError, CollageResult};

pub use kurbo::{Affine, Point, Rect, Size};

/// Font size assumed when resolving `em`/`ex` lengths outside of a text layout.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// A geometry attribute value, resolved at the document boundary.
///
/// Text positioning attributes (`x`, `y`, `dx`, `dy` on `text`/`tspan`) are lists; everything
/// else is a single length. All components are already converted to user units.
#[derive(Clone, Debug, PartialEq)]
pub enum Length {
    /// A single length.
    Scalar(f64),
    /// An ordered list of lengths; the first component is authoritative for single-value reads.
    List(Vec<f64>),
}

impl Length {
    /// Effective numeric magnitude of this value.
    ///
    /// Lists read as their first component. An empty list reads as `0`.
    pub fn value(&self) -> f64 {
        match self {
            Self::Scalar(v) => *v,
            Self::List(items) => items.first().copied().unwrap_or(0.0),
        }
    }

    /// Parse a single length such as `12`, `4.5mm` or `1e2px`.
    pub fn parse_scalar(raw: &str) -> CollageResult<Self> {
        let len = svgtypes::Length::from_str(raw.trim())
            .map_err(|e| CollageError::validation(format!("invalid length \"{raw}\": {e}")))?;
        Ok(Self::Scalar(to_user_units(len, raw)?))
    }

    /// Parse a whitespace/comma separated length list such as `10 20,30`.
    pub fn parse_list(raw: &str) -> CollageResult<Self> {
        let mut out = Vec::new();
        for item in svgtypes::LengthListParser::from(raw) {
            let len = item.map_err(|e| {
                CollageError::validation(format!("invalid length list \"{raw}\": {e}"))
            })?;
            out.push(to_user_units(len, raw)?);
        }
        Ok(Self::List(out))
    }
}

impl From<f64> for Length {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

fn to_user_units(len: svgtypes::Length, raw: &str) -> CollageResult<f64> {
    use svgtypes::LengthUnit;

    let n = len.number;
    let v = match len.unit {
        LengthUnit::None | LengthUnit::Px => n,
        LengthUnit::In => n * 96.0,
        LengthUnit::Cm => n * 96.0 / 2.54,
        LengthUnit::Mm => n * 96.0 / 25.4,
        LengthUnit::Pt => n * 96.0 / 72.0,
        LengthUnit::Pc => n * 16.0,
        LengthUnit::Em => n * DEFAULT_FONT_SIZE,
        LengthUnit::Ex => n * DEFAULT_FONT_SIZE / 2.0,
        LengthUnit::Percent => {
            return Err(CollageError::validation(format!(
                "percentage lengths are not supported: \"{raw}\""
            )));
        }
    };
    if !v.is_finite() {
        return Err(CollageError::validation(format!(
            "length must be finite: \"{raw}\""
        )));
    }
    Ok(v)
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };

    /// Return `true` when the color fully covers what is beneath it.
    pub fn is_opaque(self) -> bool {
        self.a == 255
    }
}

impl Default for Rgba8 {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
