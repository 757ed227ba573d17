//! Helpers to parse CLI arguments in the accompanying
//! binaries.
//!
//! APIs here shouldn't be considered stable / used as a
//! library.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
pub use clap::{App, Arg};
use indicatif::{ProgressBar, ProgressStyle};
pub use inflector::Inflector;
use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};

use crate::reader::{AuxFile, ReadOptions};

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

/// Log to stderr, filtered by `RUST_LOG` (default: `warn`).
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}

/// Read options from a JSON file, or the defaults when no
/// file is given.
pub fn load_options(path: Option<&Path>) -> Result<ReadOptions> {
    let path = match path {
        Some(path) => path,
        None => return Ok(ReadOptions::default()),
    };
    let file =
        File::open(path).with_context(|| format!("could not open options {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("could not parse options {}", path.display()))
}

pub struct AuxInput {
    pub filename: String,
    pub aux: AuxFile,
}

impl AuxInput {
    fn try_from_path(filename: String, options: &ReadOptions) -> Result<Self> {
        let aux = AuxFile::open(&filename, options)
            .with_context(|| format!("could not read AUX file {}", filename))?;
        Ok(AuxInput { filename, aux })
    }
}

/// Read AUX files in parallel, each into its own header and
/// track, with a progress bar on stderr.
pub fn process_paths_par(
    paths: Vec<String>,
    options: ReadOptions,
) -> impl IndexedParallelIterator<Item = Result<AuxInput>> {
    let bar = ProgressBar::new(paths.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {wide_bar:cyan/blue} {pos:>7}/{len:7}"),
    );

    paths
        .into_par_iter()
        .map(move |p| AuxInput::try_from_path(p, &options))
        .inspect(move |_| bar.inc(1))
}
