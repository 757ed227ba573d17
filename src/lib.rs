//! Library to read and subset NASA Airborne Topographic
//! Mapper (ATM) auxiliary navigation files.
//!
//! The AUX files ship with the ATM CAMBOTv2 L0 camera data
//! (NSIDC data set [IOCAM0]): a commented header with the
//! camera calibration geometry, followed by one CSV row per
//! image with time tag, GPS position and attitude.
//!
//! This crate provides:
//!
//! 1. [Header parsing](header::parse_header): lever arm,
//! mounting angles, time offset, range bias, and the
//! column-header row.
//!
//! 2. A read-only [track table](table::TrackTable) with
//! fixed column names, placeholder rows removed, and
//! longitudes wrapped to ±180°.
//!
//! 3. [Temporal](search::temporal_search) and
//! [spatial](search::spatial_search) searches over the
//! track, both boundary-inclusive.
//!
//! 4. UTC [time tag conversions](time).
//!
//! # Usage
//!
//! ```rust
//! # fn test_compile() -> anyhow::Result<()> {
//! use atm_aux::{search::temporal_search, AuxFile, ReadOptions};
//!
//! let aux = AuxFile::open("IOCAM0_aux.csv", &ReadOptions::default())?;
//! let result = temporal_search(
//!     &aux.table,
//!     "2019-05-06T13:16:00.0",
//!     "2019-05-06T13:17:00.0",
//! )?;
//! match result.span {
//!     Some(span) => println!("samples {}..={}", span.first, span.last),
//!     None => println!("no data in window"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [IOCAM0]: https://nsidc.org/data/iocam0/versions/1

pub mod error;
pub mod geometry;
pub mod header;
pub mod reader;
pub mod search;
pub mod table;
pub mod time;

pub mod cli;

pub use crate::error::AuxError;
pub use crate::header::HeaderRecord;
pub use crate::reader::{AuxFile, ReadOptions};
pub use crate::search::SearchResult;
pub use crate::table::{TrackSample, TrackTable};
