mod args;

use anyhow::Result;
use args::Args;
use rayon::iter::ParallelIterator;
use serde_derive::*;

use iris::cli::{calibration_from_args, import_dirs_par};
use iris::detect::Detection;
use iris::experiment::Experiment;

fn main() -> Result<()> {
    let Args {
        paths,
        calibration,
        sensitivity,
    } = Args::from_cmd_line()?;

    let calib = calibration_from_args(calibration.as_deref(), sensitivity)?;

    let mut reports: Vec<ExperimentReport> = import_dirs_par(paths, calib)
        .map(|try_experiment| -> Result<_> {
            let experiment = try_experiment?;
            Ok(ExperimentReport::from_experiment(&experiment))
        })
        .collect::<Result<_>>()?;
    reports.sort_by(|a, b| a.name.cmp(&b.name));

    serde_json::to_writer(std::io::stdout().lock(), &reports)?;

    Ok(())
}

#[derive(Serialize, Debug)]
struct ExperimentReport {
    name: String,
    heat_map_file: String,
    width: usize,
    height: usize,
    #[serde(flatten)]
    outcome: Outcome,
}

#[derive(Serialize, Debug)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Outcome {
    Detected { detection: Detection },
    Absent { reason: String },
}

impl ExperimentReport {
    fn from_experiment(experiment: &Experiment) -> Self {
        let (height, width) = experiment.heat_map().dim();
        let outcome = match experiment.detection() {
            Ok(detection) => Outcome::Detected {
                detection: *detection,
            },
            Err(reason) => Outcome::Absent {
                reason: reason.to_string(),
            },
        };
        ExperimentReport {
            name: experiment.name().to_string(),
            heat_map_file: experiment.heat_map_file().to_string(),
            width,
            height,
            outcome,
        }
    }
}
