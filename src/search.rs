//! Temporal and spatial subsetting of a [`TrackTable`].
//!
//! Both searches are inclusive: samples exactly on a window
//! bound or on the polygon boundary match. Neither touches
//! the table, so one table may serve any number of
//! concurrent searches.

use std::convert::TryFrom;

use geo::Geometry;
use itertools::Itertools;
use log::{info, trace};
use serde_derive::*;

use crate::{
    error::Result,
    geometry::{normalize_longitude, SearchPolygon},
    table::{Field, TrackSample, TrackTable},
    time::{display_timestamp, iso2epoch},
};

/// First and last matching row.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub first: usize,
    pub last: usize,
}

/// UTC time tags bounding a search.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// One entry per sample, `true` inside the window or
    /// polygon.
    pub mask: Vec<bool>,
    /// Matching rows in ascending order.
    pub indices: Vec<usize>,
    /// `None` when nothing matched.
    pub span: Option<Span>,
    /// Temporal: the requested bounds. Spatial: time tags of
    /// the first and last match, when a summary was
    /// requested and something matched.
    pub window: Option<TimeWindow>,
}

impl SearchResult {
    fn from_mask(mask: Vec<bool>) -> Self {
        let indices: Vec<usize> = mask.iter().positions(|&inside| inside).collect();
        let span = match (indices.first(), indices.last()) {
            (Some(&first), Some(&last)) => Some(Span { first, last }),
            _ => None,
        };
        SearchResult {
            mask,
            indices,
            span,
            window: None,
        }
    }

    /// Whether the search came up empty. An empty result is
    /// a normal outcome, not an error.
    pub fn is_empty(&self) -> bool {
        self.span.is_none()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn samples<'a>(&'a self, table: &'a TrackTable) -> impl Iterator<Item = TrackSample> + 'a {
        self.indices.iter().filter_map(move |&i| table.sample(i))
    }
}

/// Select samples with `start <= PosixTime_UTC <= end`.
///
/// Bounds are UTC time tags as accepted by [`iso2epoch`].
/// `start == end` selects the samples at exactly that
/// instant; `start > end` yields an empty result.
///
/// Fails if a bound is not a valid time tag or the table's
/// time tags decrease anywhere.
pub fn temporal_search(table: &TrackTable, start: &str, end: &str) -> Result<SearchResult> {
    let t_s = iso2epoch(start)?;
    let t_e = iso2epoch(end)?;
    table.ensure_monotonic()?;

    let mask = table
        .posix_times()
        .iter()
        .map(|&t| t_s <= t && t <= t_e)
        .collect();

    let mut result = SearchResult::from_mask(mask);
    result.window = Some(TimeWindow {
        start: start.trim().to_owned(),
        end: end.trim().to_owned(),
    });
    if result.is_empty() {
        info!("no samples between {} and {}", start.trim(), end.trim());
    }
    Ok(result)
}

/// Select samples whose position lies inside `area` or on
/// its boundary.
///
/// `area` must expose an exterior ring (a polygon,
/// rectangle or triangle). Anything else fails before any
/// sample is tested. See [`search_polygon`].
pub fn spatial_search(
    table: &TrackTable,
    area: &Geometry<f64>,
    want_time_summary: bool,
) -> Result<SearchResult> {
    let polygon = SearchPolygon::try_from(area)?;
    search_polygon(table, &polygon, want_time_summary)
}

/// Spatial search over an already validated polygon.
///
/// Sample longitudes are wrapped to `[-180, 180)` before
/// testing; the polygon is expected in that convention. With
/// `want_time_summary`, the time tags of the first and last
/// match are reported, which requires a monotonic timeline.
pub fn search_polygon(
    table: &TrackTable,
    polygon: &SearchPolygon,
    want_time_summary: bool,
) -> Result<SearchResult> {
    if want_time_summary {
        table.ensure_monotonic()?;
    }

    let lats = table.column(Field::GpsLatDeg);
    let lons = table.column(Field::GpsLonDeg);
    let mask = lons
        .iter()
        .zip(lats.iter())
        .enumerate()
        .map(|(i, (&lon, &lat))| {
            let inside = polygon.contains_or_touches(normalize_longitude(lon), lat);
            if inside {
                trace!("sample {} inside search area", i);
            }
            inside
        })
        .collect();

    let mut result = SearchResult::from_mask(mask);
    if want_time_summary {
        if let Some(span) = result.span {
            let stamps = table.timestamps();
            let window = TimeWindow {
                start: stamps[span.first].clone(),
                end: stamps[span.last].clone(),
            };
            info!("Start: {}", display_timestamp(&window.start));
            info!("End  : {}", display_timestamp(&window.end));
            result.window = Some(window);
        }
    }
    if result.is_empty() {
        info!("no samples inside search area");
    }
    Ok(result)
}
