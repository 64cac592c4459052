//! The heat-map grid decoded from an experiment folder.
//!
//! The acquisition scripts export the final frame of the
//! recording as headerless CSV: one row per scan line, one
//! comma-separated temperature sample per pixel. The grid
//! is never mutated once decoded; the detector only reads
//! row and column views of it.

use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

use anyhow::{bail, Context, Result};
use ndarray::{Array2, ArrayView1};

/// File names the acquisition scripts use for the final
/// heat-map frame, in order of preference.
pub const HEAT_MAP_CANDIDATES: [&str; 2] = ["Heat_Map_Final_Frame.csv", "Ti_Fin_Flir.csv"];

/// An immutable grid of pixel temperatures. Row index
/// increases downward, column index rightward.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatMap {
    values: Array2<f64>,
}

impl HeatMap {
    pub fn new(values: Array2<f64>) -> Self {
        HeatMap { values }
    }

    /// Decode a headerless CSV grid. Fails on the first
    /// unparseable sample and on rows of uneven width;
    /// blank lines are skipped.
    pub fn from_csv<R: Read>(rdr: R) -> Result<Self> {
        let mut values = Vec::new();
        let mut cols = None;
        let mut rows = 0;

        for (idx, line) in BufReader::new(rdr).lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let start = values.len();
            for field in line.split(',') {
                let sample: f64 = field.trim().parse().with_context(|| {
                    format!("row {}: invalid temperature sample `{}`", idx + 1, field.trim())
                })?;
                values.push(sample);
            }

            let width = values.len() - start;
            match cols {
                None => cols = Some(width),
                Some(c) if c != width => {
                    bail!("row {}: expected {} columns, found {}", idx + 1, c, width)
                }
                Some(_) => (),
            }
            rows += 1;
        }

        let cols = match cols {
            Some(c) => c,
            None => bail!("heat map is empty"),
        };
        Ok(HeatMap {
            values: Array2::from_shape_vec((rows, cols), values)?,
        })
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("opening heat map `{}`", path.display()))?;
        Self::from_csv(file).with_context(|| format!("decoding heat map `{}`", path.display()))
    }

    /// Locate and decode a heat map inside an experiment
    /// folder, trying [`HEAT_MAP_CANDIDATES`] in order.
    /// Returns the grid and the file name that matched. A
    /// corrupt candidate falls through to the next name.
    pub fn find_in_dir(dir: &Path) -> Result<(Self, String)> {
        for name in HEAT_MAP_CANDIDATES.iter() {
            let path = dir.join(name);
            if !path.is_file() {
                continue;
            }
            if let Ok(map) = Self::from_csv_path(&path) {
                return Ok((map, (*name).to_string()));
            }
        }
        bail!(
            "no heat map found in `{}` (expected one of: {})",
            dir.display(),
            HEAT_MAP_CANDIDATES.join(", ")
        );
    }

    /// `(rows, cols)` of the grid.
    pub fn dim(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn cols(&self) -> usize {
        self.values.ncols()
    }

    pub fn row(&self, y: usize) -> ArrayView1<f64> {
        self.values.row(y)
    }

    pub fn column(&self, x: usize) -> ArrayView1<f64> {
        self.values.column(x)
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }
}
