//! Track table: the body of an AUX file as ordered,
//! read-only navigation samples.
//!
//! Whatever the source labels are, the first ten columns
//! are renamed positionally to [`SEMANTIC_COLUMNS`]. Data
//! providers label the same columns differently, and
//! downstream products depend on these fixed names.
//! Columns past the tenth are kept verbatim.

use std::io::{Read, Write};

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use log::{debug, info};
use ndarray::{Array2, ArrayView1};
use serde_derive::*;

use crate::{
    error::{AuxError, Result},
    geometry::normalize_longitude,
    header::HeaderRecord,
};

pub const SEMANTIC_COLUMNS: [&str; 10] = [
    "ID",
    "Timestamp_UTC",
    "PosixTime_UTC",
    "gps_lat_deg",
    "gps_lon_deg",
    "gps_ele_m",
    "gps_agl_m",
    "roll_deg",
    "pitch_deg",
    "yaw_deg",
];

/// Rows whose latitude column is within this distance of
/// zero are placeholders emitted before a position fix.
pub const DEFAULT_SENTINEL_THRESHOLD: f64 = 0.5;

/// Numeric semantic columns, in file order. The
/// discriminant indexes the table's value array; the file
/// column is two further right.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    PosixTimeUtc = 0,
    GpsLatDeg,
    GpsLonDeg,
    GpsEleM,
    GpsAglM,
    RollDeg,
    PitchDeg,
    YawDeg,
}

const NUMERIC: usize = 8;
const FIRST_NUMERIC: usize = 2;

/// One navigation fix.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrackSample {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Timestamp_UTC")]
    pub timestamp_utc: String,
    #[serde(rename = "PosixTime_UTC")]
    pub posix_time_utc: f64,
    pub gps_lat_deg: f64,
    pub gps_lon_deg: f64,
    pub gps_ele_m: f64,
    pub gps_agl_m: f64,
    pub roll_deg: f64,
    pub pitch_deg: f64,
    pub yaw_deg: f64,
}

#[derive(Debug, Clone)]
pub struct TrackTable {
    ids: Vec<String>,
    timestamps: Vec<String>,
    /// `(samples, 8)` array of the numeric semantic columns.
    values: Array2<f64>,
    extra_columns: Vec<String>,
    extras: Vec<StringRecord>,
}

impl TrackTable {
    /// Build a table from the body rows that follow the
    /// header row.
    pub fn build<I, S>(header: &HeaderRecord, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut body = String::new();
        for row in rows {
            body.push_str(row.as_ref());
            body.push('\n');
        }
        Self::from_reader(header, body.as_bytes())
    }

    pub fn from_reader<R: Read>(header: &HeaderRecord, rdr: R) -> Result<Self> {
        Self::from_reader_with(header, rdr, DEFAULT_SENTINEL_THRESHOLD)
    }

    /// Read the CSV body from `rdr`, dropping rows whose
    /// latitude column satisfies `|lat| <= sentinel_threshold`.
    pub fn from_reader_with<R: Read>(
        header: &HeaderRecord,
        rdr: R,
        sentinel_threshold: f64,
    ) -> Result<Self> {
        let row = header.require_header_row()?;
        let num_columns = row.headers.len();
        if num_columns < SEMANTIC_COLUMNS.len() {
            return Err(AuxError::SchemaMismatch {
                line: row.index + 1,
                detail: format!(
                    "header row has {} columns, at least {} required",
                    num_columns,
                    SEMANTIC_COLUMNS.len()
                ),
            });
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(rdr);

        let mut ids = vec![];
        let mut timestamps = vec![];
        let mut numeric_rows: Vec<[f64; NUMERIC]> = vec![];
        let mut extras: Vec<StringRecord> = vec![];
        let mut dropped = 0usize;

        let mut record = StringRecord::new();
        while reader.read_record(&mut record)? {
            let line = row.data_start_row + record.position().map_or(0, |p| p.line() as usize);
            if record.len() != num_columns {
                return Err(AuxError::SchemaMismatch {
                    line,
                    detail: format!("expected {} fields, found {}", num_columns, record.len()),
                });
            }

            let mut numeric = [0f64; NUMERIC];
            for (k, slot) in numeric.iter_mut().enumerate() {
                let col = FIRST_NUMERIC + k;
                *slot = record[col].parse().map_err(|_| AuxError::SchemaMismatch {
                    line,
                    detail: format!(
                        "column {} (`{}`): `{}` is not a number",
                        col, SEMANTIC_COLUMNS[col], &record[col]
                    ),
                })?;
            }

            if numeric[Field::GpsLatDeg as usize].abs() <= sentinel_threshold {
                dropped += 1;
                continue;
            }
            numeric[Field::GpsLonDeg as usize] =
                normalize_longitude(numeric[Field::GpsLonDeg as usize]);

            ids.push(record[0].to_owned());
            timestamps.push(record[1].to_owned());
            numeric_rows.push(numeric);
            extras.push(record.iter().skip(SEMANTIC_COLUMNS.len()).collect());
        }

        if dropped > 0 {
            info!("dropped {} placeholder rows with near-zero position", dropped);
        }
        debug!("track table: {} samples, {} columns", ids.len(), num_columns);

        Ok(TrackTable {
            ids,
            timestamps,
            values: Array2::from(numeric_rows),
            extra_columns: row.headers[SEMANTIC_COLUMNS.len()..].to_vec(),
            extras,
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// All column names: the semantic names followed by the
    /// source names of any further columns.
    pub fn columns(&self) -> Vec<&str> {
        SEMANTIC_COLUMNS
            .iter()
            .copied()
            .chain(self.extra_columns.iter().map(String::as_str))
            .collect()
    }

    pub fn column(&self, field: Field) -> ArrayView1<'_, f64> {
        self.values.column(field as usize)
    }

    pub fn posix_times(&self) -> ArrayView1<'_, f64> {
        self.column(Field::PosixTimeUtc)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn timestamps(&self) -> &[String] {
        &self.timestamps
    }

    /// Raw values of the columns past the tenth for sample
    /// `idx`.
    pub fn extra(&self, idx: usize) -> Option<&StringRecord> {
        self.extras.get(idx)
    }

    pub fn sample(&self, idx: usize) -> Option<TrackSample> {
        if idx >= self.len() {
            return None;
        }
        let v = self.values.row(idx);
        Some(TrackSample {
            id: self.ids[idx].clone(),
            timestamp_utc: self.timestamps[idx].clone(),
            posix_time_utc: v[Field::PosixTimeUtc as usize],
            gps_lat_deg: v[Field::GpsLatDeg as usize],
            gps_lon_deg: v[Field::GpsLonDeg as usize],
            gps_ele_m: v[Field::GpsEleM as usize],
            gps_agl_m: v[Field::GpsAglM as usize],
            roll_deg: v[Field::RollDeg as usize],
            pitch_deg: v[Field::PitchDeg as usize],
            yaw_deg: v[Field::YawDeg as usize],
        })
    }

    pub fn samples(&self) -> impl Iterator<Item = TrackSample> + '_ {
        (0..self.len()).filter_map(move |i| self.sample(i))
    }

    /// Check that POSIX time tags never decrease. A NaN time
    /// tag fails the check.
    pub fn ensure_monotonic(&self) -> Result<()> {
        let t = self.posix_times();
        let violation = t
            .iter()
            .zip(t.iter().skip(1))
            .position(|(prev, cur)| !(cur >= prev));

        match violation {
            None => Ok(()),
            Some(i) => Err(AuxError::NonMonotonicTimeline {
                index: i + 1,
                previous: t[i],
                current: t[i + 1],
            }),
        }
    }

    /// Write the selected samples as CSV with the semantic
    /// column names. The header line is written even when
    /// nothing is selected.
    pub fn write_csv<W, I>(&self, wtr: W, indices: I) -> Result<()>
    where
        W: Write,
        I: IntoIterator<Item = usize>,
    {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(wtr);
        writer.write_record(SEMANTIC_COLUMNS)?;
        for sample in indices.into_iter().filter_map(|i| self.sample(i)) {
            writer.serialize(sample)?;
        }
        writer.flush()?;
        Ok(())
    }
}
