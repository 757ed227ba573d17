use anyhow::Result;
use atm_aux::{arg, args_parser, opt};
use std::path::PathBuf;

pub struct Args {
    pub paths: Vec<String>,
    pub options: Option<PathBuf>,
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = args_parser!("atm-header")
            .about("Print calibration header and track size of ATM AUX files.")
            .arg(
                opt!("options")
                    .short("o")
                    .help("JSON file with read options (max_header_lines, sentinel_threshold)"),
            )
            .arg(
                arg!("paths")
                    .required(true)
                    .multiple(true)
                    .help("AUX file paths"),
            )
            .get_matches();

        let paths = matches
            .values_of("paths")
            .map(|v| v.map(String::from).collect())
            .unwrap_or_default();
        let options = matches.value_of("options").map(PathBuf::from);

        Ok(Args { paths, options })
    }
}
