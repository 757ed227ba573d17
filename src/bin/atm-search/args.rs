use anyhow::{bail, Result};
use atm_aux::{arg, args_parser, opt};
use std::path::PathBuf;

use crate::query::Query;

pub struct Args {
    pub paths: Vec<String>,
    pub query: Query,
    pub output: Option<PathBuf>,
    pub options: Option<PathBuf>,
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = args_parser!("atm-search")
            .about("Find ATM AUX samples inside a UTC time window or a search polygon.")
            .arg(
                opt!("start")
                    .short("s")
                    .requires("end")
                    .conflicts_with("polygon")
                    .help("Start of time window, e.g. 2019-05-04T20:00:05.0 (UTC)"),
            )
            .arg(
                opt!("end")
                    .short("e")
                    .requires("start")
                    .help("End of time window, inclusive (UTC)"),
            )
            .arg(
                opt!("polygon")
                    .short("p")
                    .required_unless("start")
                    .help("Search polygon: WKT file, or CSV of lon,lat vertices (.csv)"),
            )
            .arg(
                opt!("summary")
                    .takes_value(false)
                    .requires("polygon")
                    .help("Report UTC time tags of the first and last sample inside the polygon"),
            )
            .arg(
                opt!("output")
                    .short("d")
                    .help("Directory for CSV subsets of the matching samples"),
            )
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

        let query = match (
            matches.value_of("start"),
            matches.value_of("end"),
            matches.value_of("polygon"),
        ) {
            (Some(start), Some(end), _) => Query::Temporal {
                start: start.into(),
                end: end.into(),
            },
            (_, _, Some(polygon)) => Query::Spatial {
                polygon: polygon.into(),
                summary: matches.is_present("summary"),
            },
            _ => bail!("either --start/--end or --polygon is required"),
        };

        Ok(Args {
            paths,
            query,
            output: matches.value_of("output").map(PathBuf::from),
            options: matches.value_of("options").map(PathBuf::from),
        })
    }
}
