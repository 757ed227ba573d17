//! Parse the header of ATM auxiliary navigation files.
//!
//! The AUX files distributed with the CAMBOTv2 L0 data
//! (NSIDC data set IOCAM0) start with a block of comment
//! lines carrying the camera calibration geometry, followed
//! by a comment-prefixed column-header row and the CSV body.
//! Only a bounded prefix of the file is scanned.
//!
//! Each line is matched against every rule in [`RULES`];
//! a later match overwrites an earlier one.

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::{Captures, Regex};
use serde_derive::*;

use crate::error::{AuxError, Result};

/// Number of header lines scanned unless configured
/// otherwise.
pub const DEFAULT_MAX_HEADER_LINES: usize = 200;

/// Offset from the GPS antenna phase center to the sensor
/// reference point, in meters, in the aircraft body frame.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LeverArm {
    pub forward: f64,
    pub starboard: f64,
    pub down: f64,
}

impl LeverArm {
    /// `[forward, starboard, down]`
    pub fn as_array(&self) -> [f64; 3] {
        [self.forward, self.starboard, self.down]
    }
}

/// Sensor mounting angles in degrees.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MountingAngles {
    pub pitch: f64,
    pub roll: f64,
    pub heading: f64,
}

/// Location and contents of the column-header row.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HeaderRow {
    /// Zero-based line index of the header row.
    pub index: usize,
    /// Zero-based line index of the first body row.
    pub data_start_row: usize,
    /// Cleaned column names, in file order.
    pub headers: Vec<String>,
}

/// Parameters extracted from an AUX header.
///
/// A record always carries a lever arm; a header without
/// one does not parse. `time_offset` and `range_bias` are
/// kept for reference only.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HeaderRecord {
    pub lever_arm: LeverArm,
    pub mounting: Option<MountingAngles>,
    pub time_offset: Option<f64>,
    pub range_bias: Option<f64>,
    pub ancillary_file: Option<String>,
    pub header_row: Option<HeaderRow>,
}

impl HeaderRecord {
    /// The header row, or an error if the file has none.
    pub fn require_header_row(&self) -> Result<&HeaderRow> {
        self.header_row.as_ref().ok_or_else(|| {
            AuxError::MalformedHeader("column header row (`# ImageFilename,...`) not found".into())
        })
    }
}

/// Fields collected while walking the header lines.
#[derive(Default, Debug)]
struct Draft {
    lever_arm: Option<LeverArm>,
    mounting: Option<MountingAngles>,
    time_offset: Option<f64>,
    range_bias: Option<f64>,
    ancillary_file: Option<String>,
    header_row: Option<HeaderRow>,
}

impl Draft {
    fn finish(self) -> Result<HeaderRecord> {
        let lever_arm = self.lever_arm.ok_or_else(|| {
            AuxError::MalformedHeader(
                "missing calibration geometry: no `[x-forward, y-starboard, z-down]` lever arm".into(),
            )
        })?;
        if self.header_row.is_none() {
            warn!("AUX header has no `# ImageFilename` row");
        }

        Ok(HeaderRecord {
            lever_arm,
            mounting: self.mounting,
            time_offset: self.time_offset,
            range_bias: self.range_bias,
            ancillary_file: self.ancillary_file,
            header_row: self.header_row,
        })
    }
}

struct Line<'a> {
    index: usize,
    text: &'a str,
}

type Setter = fn(&mut Draft, &Captures, &Line) -> Result<()>;

/// A labeled-field pattern and where its captures go.
struct Rule {
    field: &'static str,
    pattern: Regex,
    apply: Setter,
}

/// Signed decimal capture group: `3`, `-3.`, `.5`, `0.25`.
fn num(name: &str) -> String {
    format!(r"(?P<{}>-?(?:\d+\.?\d*|\.\d+))", name)
}

fn rule(field: &'static str, pattern: &str, apply: Setter) -> Rule {
    Rule {
        field,
        pattern: Regex::new(pattern).unwrap(),
        apply,
    }
}

lazy_static! {
    static ref RULES: Vec<Rule> = vec![
        rule(
            "lever arm",
            &format!(
                r"\[x-forward, y-starboard, z-down\]: *{}, *{}, *{}",
                num("fwd"),
                num("right"),
                num("down")
            ),
            |draft, caps, line| {
                draft.lever_arm = Some(LeverArm {
                    forward: capture_f64(caps, "fwd", line)?,
                    starboard: capture_f64(caps, "right", line)?,
                    down: capture_f64(caps, "down", line)?,
                });
                Ok(())
            },
        ),
        rule(
            "mounting angles",
            &format!(
                r"\[pitch, roll, heading\]: *{}, *{}, *{}",
                num("pitch"),
                num("roll"),
                num("heading")
            ),
            |draft, caps, line| {
                draft.mounting = Some(MountingAngles {
                    pitch: capture_f64(caps, "pitch", line)?,
                    roll: capture_f64(caps, "roll", line)?,
                    heading: capture_f64(caps, "heading", line)?,
                });
                Ok(())
            },
        ),
        rule(
            "time offset",
            &format!(r"Time offset .*: *{}", num("time_offset")),
            |draft, caps, line| {
                draft.time_offset = Some(capture_f64(caps, "time_offset", line)?);
                Ok(())
            },
        ),
        rule(
            "range bias",
            &format!(r"Range bias.*: *{}", num("range_bias")),
            |draft, caps, line| {
                draft.range_bias = Some(capture_f64(caps, "range_bias", line)?);
                Ok(())
            },
        ),
        rule(
            "ancillary file",
            r"Input ancillary file: *(?P<name>.*),",
            |draft, caps, _| {
                draft.ancillary_file = caps.name("name").map(|m| m.as_str().to_owned());
                Ok(())
            },
        ),
        rule("header row", r"# *ImageFilename", |draft, _, line| {
            let headers = clean_header_row(line.text);
            draft.header_row = Some(HeaderRow {
                index: line.index,
                data_start_row: line.index + 1,
                headers,
            });
            Ok(())
        }),
    ];
}

fn capture_f64(caps: &Captures, name: &str, line: &Line) -> Result<f64> {
    let text = caps.name(name).map(|m| m.as_str()).unwrap_or_default();
    text.parse().map_err(|_| {
        AuxError::MalformedHeader(format!(
            "line {}: cannot read `{}` from `{}`",
            line.index + 1,
            name,
            text
        ))
    })
}

/// Turn the column-header row into identifier-safe names:
/// `# ImageFilename, Timestamp(UTC)` gives
/// `["ImageFilename", "Timestamp_UTC"]`.
pub fn clean_header_row(line: &str) -> Vec<String> {
    line.trim()
        .replace('(', "_")
        .replace([')', ' ', '#', '>'], "")
        .split(',')
        .map(String::from)
        .collect()
}

/// Scan at most `max_lines` lines and extract the header
/// fields.
///
/// Fails with [`AuxError::MalformedHeader`] when no lever
/// arm is present. A missing column-header row is not an
/// error here; it leaves [`HeaderRecord::header_row`] unset.
pub fn parse_header<I, S>(lines: I, max_lines: usize) -> Result<HeaderRecord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut draft = Draft::default();

    for (index, text) in lines.into_iter().take(max_lines).enumerate() {
        let line = Line {
            index,
            text: text.as_ref(),
        };
        for rule in RULES.iter() {
            if let Some(caps) = rule.pattern.captures(line.text) {
                (rule.apply)(&mut draft, &caps, &line)?;
                debug!("{:3}: matched {}", line.index, rule.field);
            }
        }
    }

    draft.finish()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE_HEADER: &str = "\
# CAMBOTv2 auxiliary navigation file
# Input ancillary file: IOCAM0_2019_GR_NASA_20190506.nav, created 2019-05-07
# Lever arm, GPS antenna to camera [x-forward, y-starboard, z-down]: 0.10, 0.02, -0.15
# Camera mounting angles [pitch, roll, heading]: 0.25, -0.13, 180.50
# Time offset (camera - GPS) in seconds: 0.0123
# Range bias (m): 1.25
# ImageFilename, Timestamp(UTC), PosixTime(UTC), Latitude(deg), Longitude(deg), Ellipsoid_Height(m), AGL(m), Roll(deg), Pitch(deg), Heading(deg), Range(m)
";

    #[test]
    fn parses_all_fields() {
        let rec = parse_header(SAMPLE_HEADER.lines(), DEFAULT_MAX_HEADER_LINES).unwrap();

        assert_eq!(rec.lever_arm.as_array(), [0.10, 0.02, -0.15]);
        assert_eq!(
            rec.mounting,
            Some(MountingAngles {
                pitch: 0.25,
                roll: -0.13,
                heading: 180.50
            })
        );
        assert_eq!(rec.time_offset, Some(0.0123));
        assert_eq!(rec.range_bias, Some(1.25));
        assert_eq!(
            rec.ancillary_file.as_deref(),
            Some("IOCAM0_2019_GR_NASA_20190506.nav")
        );

        let row = rec.header_row.unwrap();
        assert_eq!(row.index, 6);
        assert_eq!(row.data_start_row, row.index + 1);
        assert_eq!(row.headers.len(), 11);
        assert_eq!(row.headers[0], "ImageFilename");
        assert_eq!(row.headers[1], "Timestamp_UTC");
        assert_eq!(row.headers[5], "Ellipsoid_Height_m");
        assert_eq!(row.headers[10], "Range_m");
    }

    #[test]
    fn missing_lever_arm_is_fatal() {
        let text: String = SAMPLE_HEADER
            .lines()
            .filter(|l| !l.contains("x-forward"))
            .map(|l| format!("{}\n", l))
            .collect();

        match parse_header(text.lines(), DEFAULT_MAX_HEADER_LINES) {
            Err(AuxError::MalformedHeader(msg)) => {
                assert!(msg.contains("missing calibration geometry"))
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn header_row_beyond_limit() {
        let rec = parse_header(SAMPLE_HEADER.lines(), 6).unwrap();
        assert!(rec.header_row.is_none());
        assert!(matches!(
            rec.require_header_row(),
            Err(AuxError::MalformedHeader(_))
        ));
    }

    #[test]
    fn later_match_wins() {
        let lines = [
            "[x-forward, y-starboard, z-down]: 1.0, 2.0, 3.0",
            "[x-forward, y-starboard, z-down]: 4.0, 5.0, 6.0",
        ];
        let rec = parse_header(lines.iter(), 10).unwrap();
        assert_eq!(rec.lever_arm.as_array(), [4.0, 5.0, 6.0]);
        assert_eq!(rec.mounting, None);
        assert_eq!(rec.time_offset, None);
    }

    #[test]
    fn trailing_dot_decimals() {
        let lines = [
            "# [x-forward, y-starboard, z-down]: 1., 2., -3.",
            "# [pitch, roll, heading]: .5, -0., 90",
            "# Range bias (m): -1.",
        ];
        let rec = parse_header(lines.iter(), 10).unwrap();
        assert_eq!(rec.lever_arm.as_array(), [1., 2., -3.]);
        assert_eq!(
            rec.mounting,
            Some(MountingAngles {
                pitch: 0.5,
                roll: 0.,
                heading: 90.
            })
        );
        assert_eq!(rec.range_bias, Some(-1.));
    }

    #[test]
    fn header_tokens() {
        let line = "#> ImageFilename,Timestamp (UTC),Roll(deg)\n";
        let headers = clean_header_row(line);
        assert_eq!(headers, vec!["ImageFilename", "Timestamp_UTC", "Roll_deg"]);
        assert_eq!(headers.len(), line.split(',').count());
    }
}
