//! Library to inspect thermal-imaging data from fin-cooling
//! experiments.
//!
//! An experiment folder holds the final frame of a thermal
//! recording as a headerless CSV grid of pixel temperatures.
//! This crate provides three functionalities:
//!
//! 1. [Detect](detect) the four pixel edges of the fin
//! inside the grid from its temperature gradient, and map
//! the physical thermocouple mounting offsets into pixel
//! coordinates within the detected box.
//!
//! 2. [Decode](grid::HeatMap) the heat-map grid from an
//! experiment folder, trying the file names the acquisition
//! scripts use.
//!
//! 3. Manage a [workspace](experiment::Workspace) of
//! imported [experiments](experiment::Experiment), each
//! owning its grid, its detection outcome and the derived
//! midline temperature profile.
//!
//! # Usage
//!
//! Importing an experiment locates the heat map, decodes it
//! and runs detection once; the outcome records either the
//! result or the reason it is absent.
//!
//! ```rust
//! # fn test_compile() -> anyhow::Result<()> {
//! use std::path::Path;
//! use iris::{Calibration, Experiment};
//!
//! let calib = Calibration::default();
//! let experiment = Experiment::import(Path::new("experiments/run_01"), &calib)?;
//! match experiment.detection() {
//!     Ok(d) => println!("chamfered TC at ({}, {})", d.chamfered_tc.x, d.chamfered_tc.y),
//!     Err(reason) => println!("detection unavailable: {}", reason),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The detector itself is a pure function of the grid and
//! the [calibration constants](calibration::Calibration);
//! see [`detect::detect`] to run it against a grid built
//! elsewhere.

pub mod calibration;
pub mod detect;
pub mod experiment;
pub mod grid;

pub mod cli;

pub use crate::calibration::Calibration;
pub use crate::detect::{Detection, PlateEdges};
pub use crate::experiment::{Experiment, Workspace};
pub use crate::grid::HeatMap;
