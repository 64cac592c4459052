use anyhow::Result;
use clap::value_t_or_exit;
use iris::{arg, args_parser, opt};

pub struct Args {
    pub path: String,
    pub calibration: Option<String>,
    pub sensitivity: Option<usize>,
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = args_parser!("iris-profile")
            .about("Print the midline temperature profile of one experiment as CSV.")
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
            .arg(arg!("path").required(true).help("Experiment folder path"))
            .get_matches();

        let path = matches.value_of("path").unwrap().to_string();
        let calibration = matches.value_of("calibration").map(|p| p.to_string());
        let sensitivity = matches
            .is_present("sensitivity")
            .then(|| value_t_or_exit!(matches.value_of("sensitivity"), usize));

        Ok(Args {
            path,
            calibration,
            sensitivity,
        })
    }
}
