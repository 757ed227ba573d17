mod args;

use anyhow::Result;
use rayon::iter::ParallelIterator;
use serde_derive::*;

use args::Args;
use atm_aux::{
    cli::{init_logging, load_options, process_paths_par, AuxInput},
    header::HeaderRecord,
};

fn main() -> Result<()> {
    init_logging();
    let Args { paths, options } = Args::from_cmd_line()?;
    let options = load_options(options.as_deref())?;

    let summaries = process_paths_par(paths, options)
        .map(|input| -> Result<_> { Ok(HeaderSummary::from_input(input?)) })
        .collect::<Result<Vec<_>>>()?;

    serde_json::to_writer_pretty(std::io::stdout().lock(), &summaries)?;
    println!();

    let samples: usize = summaries.iter().map(|s| s.samples).sum();
    eprintln!("Read {} files, {} samples", summaries.len(), samples);
    Ok(())
}

#[derive(Serialize, Debug)]
struct HeaderSummary {
    path: String,
    lever_arm_sensor: [f64; 3],
    header: HeaderRecord,
    columns: Vec<String>,
    samples: usize,
}

impl HeaderSummary {
    fn from_input(input: AuxInput) -> Self {
        let AuxInput { filename, aux } = input;
        HeaderSummary {
            path: filename,
            lever_arm_sensor: aux.lever_arm_sensor(),
            columns: aux.table.columns().into_iter().map(String::from).collect(),
            samples: aux.table.len(),
            header: aux.header,
        }
    }
}
