use anyhow::Result;
use clap::value_t_or_exit;
use iris::{arg, args_parser, opt};

pub struct Args {
    pub paths: Vec<String>,
    pub calibration: Option<String>,
    pub sensitivity: Option<usize>,
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = args_parser!("iris-detect")
            .about("Detect plate edges and thermocouple locations in experiment heat maps.")
            .arg(
                opt!("calibration")
                    .short("c")
                    .help("Path to a calibration json (default: built-in rig constants)"),
            )
            .arg(
                opt!("sensitivity")
                    .short("s")
                    .help("Override the edge sensitivity window, in rows"),
            )
            .arg(
                arg!("paths")
                    .required(true)
                    .multiple(true)
                    .help("Experiment folder paths"),
            )
            .get_matches();

        let paths = matches
            .values_of("paths")
            .unwrap()
            .map(|f| f.into())
            .collect();
        let calibration = matches.value_of("calibration").map(|p| p.to_string());
        let sensitivity = matches
            .is_present("sensitivity")
            .then(|| value_t_or_exit!(matches.value_of("sensitivity"), usize));

        Ok(Args {
            paths,
            calibration,
            sensitivity,
        })
    }
}
