//! Read a complete AUX file: header first, then the body.
//!
//! The header is parsed from a bounded prefix. The body is
//! only read once the header has been accepted, so a file
//! without calibration geometry fails before any data row
//! is looked at.

use std::{
    fs::File,
    io::{BufRead, BufReader, Cursor, Read},
    path::Path,
};

use log::debug;
use serde_derive::*;

use crate::{
    error::Result,
    header::{parse_header, HeaderRecord, DEFAULT_MAX_HEADER_LINES},
    table::{TrackTable, DEFAULT_SENTINEL_THRESHOLD},
};

/// Tunables for reading AUX files. Deserializable so the
/// binaries can take them from a JSON file; missing keys
/// fall back to the defaults.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReadOptions {
    /// Lines scanned for header fields.
    pub max_header_lines: usize,
    /// Rows with `|latitude| <=` this value are dropped.
    pub sentinel_threshold: f64,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            max_header_lines: DEFAULT_MAX_HEADER_LINES,
            sentinel_threshold: DEFAULT_SENTINEL_THRESHOLD,
        }
    }
}

/// Parsed header and track of one AUX file.
#[derive(Debug, Clone)]
pub struct AuxFile {
    pub header: HeaderRecord,
    pub table: TrackTable,
}

impl AuxFile {
    pub fn open<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<Self> {
        debug!("reading {}", path.as_ref().display());
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), options)
    }

    pub fn from_reader<R: BufRead>(mut rdr: R, options: &ReadOptions) -> Result<Self> {
        let mut prefix = Vec::with_capacity(options.max_header_lines.min(1024));
        for _ in 0..options.max_header_lines {
            let mut line = String::new();
            if rdr.read_line(&mut line)? == 0 {
                break;
            }
            prefix.push(line);
        }

        let header = parse_header(&prefix, options.max_header_lines)?;
        let start = header.require_header_row()?.data_start_row;

        // Body rows already pulled into the prefix come first.
        let body = Cursor::new(prefix[start..].concat()).chain(rdr);
        let table = TrackTable::from_reader_with(&header, body, options.sentinel_threshold)?;

        Ok(AuxFile { header, table })
    }

    /// Lever arm from the GPS antenna phase center to the
    /// camera focal plane, as `[forward, starboard, down]`.
    pub fn lever_arm_sensor(&self) -> [f64; 3] {
        self.header.lever_arm.as_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AuxError, header::tests::SAMPLE_HEADER, table::tests::body_row};

    fn file_text(rows: usize) -> String {
        let mut text = SAMPLE_HEADER.to_owned();
        for i in 0..rows {
            text.push_str(&body_row(i, 1557000000. + i as f64, 69. + 0.01 * i as f64, -50.));
            text.push('\n');
        }
        text
    }

    #[test]
    fn body_spans_prefix_and_rest() {
        let text = file_text(20);
        // the prefix swallows 3 body rows
        let options = ReadOptions {
            max_header_lines: 10,
            ..Default::default()
        };
        let aux = AuxFile::from_reader(text.as_bytes(), &options).unwrap();
        assert_eq!(aux.table.len(), 20);
        assert_eq!(aux.lever_arm_sensor(), [0.10, 0.02, -0.15]);
        assert_eq!(aux.table.posix_times()[19], 1557000019.);

        let aux = AuxFile::from_reader(text.as_bytes(), &ReadOptions::default()).unwrap();
        assert_eq!(aux.table.len(), 20);
    }

    #[test]
    fn header_only_file() {
        let aux = AuxFile::from_reader(file_text(0).as_bytes(), &ReadOptions::default()).unwrap();
        assert!(aux.table.is_empty());
    }

    #[test]
    fn options_from_json() {
        let options: ReadOptions = serde_json::from_str(r#"{"sentinel_threshold": 1.5}"#).unwrap();
        assert_eq!(options.max_header_lines, DEFAULT_MAX_HEADER_LINES);
        assert_eq!(options.sentinel_threshold, 1.5);
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            AuxFile::open("/nonexistent/aux.csv", &ReadOptions::default()),
            Err(AuxError::Io(_))
        ));
    }
}
