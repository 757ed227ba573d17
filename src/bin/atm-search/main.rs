mod args;
mod query;

use std::fs;

use anyhow::{Context, Result};
use rayon::iter::ParallelIterator;

use args::Args;
use atm_aux::cli::{init_logging, load_options, process_paths_par, AuxInput};
use query::{output_path_for, write_subset, FileReport};

fn main() -> Result<()> {
    init_logging();
    let Args {
        paths,
        query,
        output,
        options,
    } = Args::from_cmd_line()?;
    let options = load_options(options.as_deref())?;
    let search = query.prepare()?;

    if let Some(dir) = &output {
        fs::create_dir_all(dir)
            .with_context(|| format!("could not create output directory {}", dir.display()))?;
    }

    let reports = process_paths_par(paths, options)
        .map(|input| -> Result<FileReport> {
            let AuxInput { filename, aux } = input?;
            let result = search
                .run(&aux.table)
                .with_context(|| format!("search failed for {}", filename))?;

            let subset = match &output {
                Some(dir) => {
                    let out = output_path_for(dir, &filename);
                    write_subset(&aux.table, &result, &out)?;
                    Some(out)
                }
                None => None,
            };
            Ok(FileReport::new(filename, aux.table.len(), result, subset))
        })
        .collect::<Result<Vec<_>>>()?;

    serde_json::to_writer_pretty(std::io::stdout().lock(), &reports)?;
    println!();

    let hits = reports.iter().filter(|r| r.matches > 0).count();
    eprintln!("Searched {} files, {} with matching samples", reports.len(), hits);
    Ok(())
}
