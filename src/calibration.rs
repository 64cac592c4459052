//! Physical calibration constants for the fin under test.
//!
//! These are measured once per rig and are read-only for
//! the lifetime of the process. They can be loaded from a
//! JSON file kept next to the experiment folders; missing
//! fields fall back to the built-in rig constants.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use core::fmt;
use serde_derive::*;

/// Physical measurements of the fin and its thermocouples,
/// plus the edge-search window used by the detector.
///
/// All lengths are millimeters. Length fields accept either
/// a JSON number or a string with a trailing unit
/// (`"34.02 mm"`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Calibration {
    /// Width of the fin.
    #[serde(deserialize_with = "serde_helpers::millimeters")]
    pub fin_width: f64,
    /// Height of the fin.
    #[serde(deserialize_with = "serde_helpers::millimeters")]
    pub fin_height: f64,

    /// Horizontal mounting offset of the chamfered-edge
    /// thermocouple. The heat map views the fin mirrored
    /// left-to-right, so the pixel mapping measures this
    /// from the right edge of the detected box.
    #[serde(deserialize_with = "serde_helpers::millimeters")]
    pub tc_chamfered_h_offset: f64,
    /// Vertical mounting offset of the chamfered-edge
    /// thermocouple, measured down from the top edge.
    #[serde(deserialize_with = "serde_helpers::millimeters")]
    pub tc_chamfered_v_offset: f64,
    /// Horizontal mounting offset of the filleted-edge
    /// thermocouple, mirrored like the chamfered one.
    #[serde(deserialize_with = "serde_helpers::millimeters")]
    pub tc_filleted_h_offset: f64,
    /// Vertical mounting offset of the filleted-edge
    /// thermocouple, measured up from the bottom edge.
    #[serde(deserialize_with = "serde_helpers::millimeters")]
    pub tc_filleted_v_offset: f64,

    /// Rows searched for the horizontal plate edges, from
    /// each of the top and bottom of the grid.
    pub edge_sensitivity: usize,
}

impl Default for Calibration {
    fn default() -> Self {
        Calibration {
            fin_width: 34.02,
            fin_height: 90.28,
            tc_chamfered_h_offset: 16.71,
            tc_chamfered_v_offset: 28.47,
            tc_filleted_h_offset: 16.77,
            tc_filleted_v_offset: 27.65,
            edge_sensitivity: 80,
        }
    }
}

impl Calibration {
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("opening calibration file `{}`", path.display()))?;
        let calib = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing calibration file `{}`", path.display()))?;
        Ok(calib)
    }

    /// Check the constants the detector divides by or sizes
    /// windows with. Run once at startup; a failure here is
    /// fatal, never a per-experiment condition.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fin_width > 0.) {
            return Err(ConfigError::NonPositiveDimension {
                name: "fin_width",
                value: self.fin_width,
            });
        }
        if !(self.fin_height > 0.) {
            return Err(ConfigError::NonPositiveDimension {
                name: "fin_height",
                value: self.fin_height,
            });
        }
        if self.edge_sensitivity < 2 {
            return Err(ConfigError::DegenerateSensitivity {
                value: self.edge_sensitivity,
            });
        }
        Ok(())
    }
}

/// Unusable calibration constants.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NonPositiveDimension { name: &'static str, value: f64 },
    DegenerateSensitivity { value: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveDimension { name, value } => {
                write!(f, "fin dimension `{}` must be positive, got {}", name, value)
            }
            Self::DegenerateSensitivity { value } => {
                write!(
                    f,
                    "edge sensitivity must span at least 2 rows, got {}",
                    value
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

mod serde_helpers {
    use lazy_static::lazy_static;
    use regex::Regex;
    use serde::*;
    use serde_derive::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn millimeters<'de, D>(de: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        lazy_static! {
            static ref RE: Regex = Regex::new(r"^-?\d+(\.\d*)?").unwrap();
        }

        use serde::de::Error;
        match Raw::deserialize(de)? {
            Raw::Number(val) => Ok(val),
            Raw::Text(str_rep) => RE
                .find(str_rep.trim())
                .ok_or(Error::custom("unexpected format: must begin with float"))?
                .as_str()
                .parse()
                .map_err(Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_constants_validate() {
        Calibration::default().validate().unwrap();
    }

    #[test]
    fn zero_dimension_is_fatal() {
        let calib = Calibration {
            fin_width: 0.,
            ..Calibration::default()
        };
        assert_eq!(
            calib.validate(),
            Err(ConfigError::NonPositiveDimension {
                name: "fin_width",
                value: 0.,
            })
        );
    }

    #[test]
    fn narrow_sensitivity_is_fatal() {
        let calib = Calibration {
            edge_sensitivity: 1,
            ..Calibration::default()
        };
        assert_eq!(
            calib.validate(),
            Err(ConfigError::DegenerateSensitivity { value: 1 })
        );
    }

    #[test]
    fn parses_numbers_and_unit_suffixes() {
        let calib: Calibration = serde_json::from_str(
            r#"{
                "fin_width": "34.02 mm",
                "fin_height": 90.28,
                "edge_sensitivity": 15
            }"#,
        )
        .unwrap();
        assert_eq!(calib.fin_width, 34.02);
        assert_eq!(calib.fin_height, 90.28);
        assert_eq!(calib.edge_sensitivity, 15);
        // untouched fields keep the rig defaults
        assert_eq!(calib.tc_chamfered_v_offset, 28.47);
    }

    #[test]
    fn rejects_a_bare_unit() {
        let parsed: Result<Calibration, _> = serde_json::from_str(r#"{"fin_width": "mm"}"#);
        assert!(parsed.is_err());
    }
}
