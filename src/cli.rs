//! Helpers to parse CLI arguments in the accompanying
//! binaries.
//!
//! APIs here shouldn't be considered stable / used as a
//! library.

use std::path::Path;

use anyhow::{Context, Result};
pub use clap::{App, Arg};
use indicatif::{ProgressBar, ProgressStyle};
pub use inflector::Inflector;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{calibration::Calibration, experiment::Experiment};

#[macro_export]
macro_rules! args_parser {
    ($name:expr) => {{
        $crate::cli::App::new($name)
            .version(clap::crate_version!())
            .author(clap::crate_authors!())
    }};
}

#[macro_export]
macro_rules! arg {
    ($name:expr) => {{
        use $crate::cli::Inflector;
        $crate::cli::Arg::with_name($name).value_name(&$name.to_screaming_snake_case())
    }};
}

#[macro_export]
macro_rules! opt {
    ($name:expr) => {{
        use $crate::cli::Inflector;
        $crate::cli::Arg::with_name($name)
            .long(&$name.to_kebab_case())
            .value_name(&$name.to_screaming_snake_case())
    }};
}

/// Load calibration from the given path, or the built-in rig
/// constants when no file is given, optionally overriding
/// the edge sensitivity. Validation failures are fatal here,
/// before any experiment is touched.
pub fn calibration_from_args(path: Option<&str>, sensitivity: Option<usize>) -> Result<Calibration> {
    let mut calib = match path {
        Some(p) => Calibration::from_json_path(Path::new(p))?,
        None => Calibration::default(),
    };
    if let Some(sensitivity) = sensitivity {
        calib.edge_sensitivity = sensitivity;
    }
    calib.validate()?;
    Ok(calib)
}

/// Import experiment folders in parallel with a progress
/// bar. Each folder yields an independent [`Experiment`]
/// with its own grid and calibration snapshot.
pub fn import_dirs_par(
    paths: Vec<String>,
    calib: Calibration,
) -> impl ParallelIterator<Item = Result<Experiment>> {
    let bar = ProgressBar::new(paths.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {wide_bar:cyan/blue} {pos:>7}/{len:7}"),
    );

    paths
        .into_par_iter()
        .map(move |p| {
            Experiment::import(Path::new(&p), &calib)
                .with_context(|| format!("importing experiment folder `{}`", p))
        })
        .inspect(move |_| bar.inc(1))
}
