use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use atm_aux::{
    geometry::SearchPolygon,
    search::{search_polygon, temporal_search, SearchResult, Span, TimeWindow},
    table::TrackTable,
};
use serde_derive::*;

pub enum Query {
    Temporal { start: String, end: String },
    Spatial { polygon: PathBuf, summary: bool },
}

/// A query with its inputs validated, ready to run on any
/// number of tracks.
pub enum Search {
    Temporal { start: String, end: String },
    Spatial { area: SearchPolygon, summary: bool },
}

impl Query {
    pub fn prepare(self) -> Result<Search> {
        Ok(match self {
            Query::Temporal { start, end } => Search::Temporal { start, end },
            Query::Spatial { polygon, summary } => Search::Spatial {
                area: read_polygon(&polygon)
                    .with_context(|| format!("could not read polygon {}", polygon.display()))?,
                summary,
            },
        })
    }
}

impl Search {
    pub fn run(&self, table: &TrackTable) -> Result<SearchResult> {
        Ok(match self {
            Search::Temporal { start, end } => temporal_search(table, start, end)?,
            Search::Spatial { area, summary } => search_polygon(table, area, *summary)?,
        })
    }
}

fn read_polygon(path: &Path) -> Result<SearchPolygon> {
    let is_csv = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));
    Ok(if is_csv {
        SearchPolygon::from_vertices_reader(File::open(path)?)?
    } else {
        SearchPolygon::from_wkt(&fs::read_to_string(path)?)?
    })
}

#[derive(Serialize, Debug)]
pub struct FileReport {
    pub path: String,
    pub samples: usize,
    pub matches: usize,
    pub span: Option<Span>,
    pub window: Option<TimeWindow>,
    pub subset: Option<PathBuf>,
}

impl FileReport {
    pub fn new(path: String, samples: usize, result: SearchResult, subset: Option<PathBuf>) -> Self {
        FileReport {
            path,
            samples,
            matches: result.len(),
            span: result.span,
            window: result.window,
            subset,
        }
    }
}

pub fn output_path_for(dir: &Path, path: &str) -> PathBuf {
    let stem = Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "aux".into());
    dir.join(format!("{}_subset.csv", stem))
}

pub fn write_subset(table: &TrackTable, result: &SearchResult, out: &Path) -> Result<()> {
    let writer = BufWriter::new(
        File::create(out).with_context(|| format!("could not create {}", out.display()))?,
    );
    table.write_csv(writer, result.indices.iter().copied())?;
    Ok(())
}
