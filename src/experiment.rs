//! Per-experiment aggregate and the workspace that owns it.
//!
//! Each [`Experiment`] owns its grid, its detection outcome
//! and everything derived from them; the [`Workspace`] maps
//! experiment names to aggregates with explicit add/remove
//! lifecycle, so removing an experiment cannot leave stale
//! derived data behind.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Result};
use ndarray::{s, Array1};
use serde_derive::*;

use crate::calibration::Calibration;
use crate::detect::{detect, DetectError, Detection};
use crate::grid::HeatMap;

/// One imported experiment. The detection outcome is
/// computed once at import and is either the result or the
/// reason it is absent; it is never partially populated.
#[derive(Debug, Clone)]
pub struct Experiment {
    name: String,
    heat_map_file: String,
    heat_map: HeatMap,
    detection: Result<Detection, DetectError>,
}

impl Experiment {
    /// Import an experiment folder: locate its heat map and
    /// run detection. A failed detection still yields an
    /// experiment; only a missing or undecodable heat map is
    /// an import error.
    pub fn import(dir: &Path, calib: &Calibration) -> Result<Self> {
        let name = match dir.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => bail!("experiment path `{}` has no folder name", dir.display()),
        };
        let (heat_map, heat_map_file) = HeatMap::find_in_dir(dir)?;
        Ok(Self::from_heat_map(name, heat_map_file, heat_map, calib))
    }

    pub fn from_heat_map(
        name: String,
        heat_map_file: String,
        heat_map: HeatMap,
        calib: &Calibration,
    ) -> Self {
        let detection = detect(&heat_map, calib);
        Experiment {
            name,
            heat_map_file,
            heat_map,
            detection,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// File name the heat map was decoded from.
    pub fn heat_map_file(&self) -> &str {
        &self.heat_map_file
    }

    pub fn heat_map(&self) -> &HeatMap {
        &self.heat_map
    }

    /// The detection outcome, or why it is absent.
    pub fn detection(&self) -> Result<&Detection, &DetectError> {
        self.detection.as_ref()
    }

    /// Temperatures along the detected midline column
    /// between the top and bottom edges, with positions
    /// mapped onto the physical fin height. `None` whenever
    /// the detection itself is absent.
    pub fn midline_profile(&self, calib: &Calibration) -> Option<MidlineProfile> {
        let detection = self.detection.as_ref().ok()?;
        let edges = &detection.edges;

        let mid_x = detection.midline as usize;
        let temperature_c: Vec<f64> = self
            .heat_map
            .column(mid_x)
            .slice(s![edges.top..edges.bottom])
            .to_vec();
        if temperature_c.is_empty() {
            return None;
        }

        let position_mm =
            Array1::linspace(0., calib.fin_height, temperature_c.len()).to_vec();
        Some(MidlineProfile {
            position_mm,
            temperature_c,
        })
    }
}

/// Midline temperature series of one experiment. The
/// chamfered side is at position zero, the filleted side at
/// the fin height.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MidlineProfile {
    pub position_mm: Vec<f64>,
    pub temperature_c: Vec<f64>,
}

/// All experiments currently loaded, keyed by name.
#[derive(Debug, Default)]
pub struct Workspace {
    experiments: BTreeMap<String, Experiment>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an experiment, replacing any previous one with
    /// the same name.
    pub fn add(&mut self, experiment: Experiment) -> &Experiment {
        let name = experiment.name().to_owned();
        self.experiments.insert(name.clone(), experiment);
        &self.experiments[&name]
    }

    /// Import a folder and add the resulting experiment.
    pub fn import(&mut self, dir: &Path, calib: &Calibration) -> Result<&Experiment> {
        let experiment = Experiment::import(dir, calib)?;
        Ok(self.add(experiment))
    }

    pub fn remove(&mut self, name: &str) -> Option<Experiment> {
        self.experiments.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Experiment> {
        self.experiments.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.experiments.keys().map(|name| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Experiment> {
        self.experiments.values()
    }

    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    pub fn clear(&mut self) {
        self.experiments.clear();
    }
}
