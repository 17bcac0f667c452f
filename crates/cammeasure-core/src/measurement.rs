use std::fmt;

use serde::{Deserialize, Serialize};

/// Unit of the linear fields of a [`Measurement`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Mm,
    Px,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Mm => write!(f, "mm"),
            Unit::Px => write!(f, "px"),
        }
    }
}

/// Calibrated measurement of one detected object.
///
/// Linear fields are in `unit`, areas in `unit^2`, volume in `unit^3`.
/// Created fresh each frame by the measurement converter and then mutated
/// in place by the precision filter before being returned to the caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Measurement {
    pub width: f64,
    pub height: f64,
    pub area: f64,
    /// Rectangular perimeter `2*(width + height)`.
    pub perimeter: f64,
    /// Monocular depth estimate; see the depth estimator for caveats.
    pub depth: f64,
    /// Rectangular-prism volume `width * height * depth`.
    pub volume: f64,
    /// Rectangular-prism surface `2*(wh + wd + hd)`.
    pub surface_area: f64,
    pub circularity: f64,
    pub solidity: f64,
    pub compactness: f64,
    pub unit: Unit,
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Unit::Mm).unwrap(), "\"mm\"");
        assert_eq!(serde_json::to_string(&Unit::Px).unwrap(), "\"px\"");
        assert_eq!(Unit::Mm.to_string(), "mm");
    }
}
