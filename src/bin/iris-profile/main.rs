mod args;

use std::path::Path;

use anyhow::{bail, Result};
use args::Args;

use iris::cli::calibration_from_args;
use iris::experiment::Experiment;

fn main() -> Result<()> {
    let args = Args::from_cmd_line()?;
    let calib = calibration_from_args(args.calibration.as_deref(), args.sensitivity)?;

    let experiment = Experiment::import(Path::new(&args.path), &calib)?;
    let detection = match experiment.detection() {
        Ok(detection) => detection,
        Err(reason) => bail!(
            "detection unavailable for `{}`: {}",
            experiment.name(),
            reason
        ),
    };
    eprintln!(
        "plate: x = {}..{}, y = {}..{}, midline = {}",
        detection.edges.left,
        detection.edges.right,
        detection.edges.top,
        detection.edges.bottom,
        detection.midline
    );
    eprintln!(
        "thermocouples: chamfered {}, filleted {}",
        detection.chamfered_tc, detection.filleted_tc
    );

    let profile = match experiment.midline_profile(&calib) {
        Some(profile) => profile,
        None => bail!("midline profile is empty for `{}`", experiment.name()),
    };

    println!("position_mm,temperature_c");
    for (position, temperature) in profile.position_mm.iter().zip(&profile.temperature_c) {
        println!("{},{}", position, temperature);
    }

    Ok(())
}
