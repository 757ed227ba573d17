//! Search polygons and longitude conventions.
//!
//! Containment is planar: coordinates are treated as
//! `(lon, lat)` on a flat plane, which is adequate at the
//! scale of survey search areas. The polygon must already
//! use the ±180° longitude convention; it is not rewrapped.

use std::{convert::TryFrom, io::Read};

use csv::{ReaderBuilder, Trim};
use geo::{Coord, Geometry, Intersects, LineString, Polygon};
use wkt::TryFromWkt;

use crate::error::{AuxError, Result};

/// Wrap a longitude into `[-180, 180)`. Values already in
/// range are returned bit for bit.
pub fn normalize_longitude(lon: f64) -> f64 {
    if (-180. ..180.).contains(&lon) {
        return lon;
    }
    let wrapped = (lon - 180.).rem_euclid(360.);
    // rem_euclid may round up to the divisor itself
    if wrapped >= 360. {
        -180.
    } else {
        wrapped - 180.
    }
}

/// Wrap a longitude into `[0, 360)`. Values already in
/// range are returned bit for bit.
pub fn wrap_longitude_360(lon: f64) -> f64 {
    if (0. ..360.).contains(&lon) {
        return lon;
    }
    let wrapped = lon.rem_euclid(360.);
    if wrapped >= 360. {
        0.
    } else {
        wrapped
    }
}

/// A polygon usable as a spatial search area: it has an
/// exterior ring with at least three distinct vertices and
/// supports boundary-inclusive point tests.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPolygon(Polygon<f64>);

impl SearchPolygon {
    pub fn new(polygon: Polygon<f64>) -> Result<Self> {
        let ring = polygon.exterior();
        if ring.0.len() < 4 {
            return Err(AuxError::InvalidGeometry(format!(
                "exterior ring needs at least 3 vertices, found {}",
                ring.0.len().saturating_sub(1)
            )));
        }
        if ring.coords().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(AuxError::InvalidGeometry(
                "exterior ring has non-finite coordinates".into(),
            ));
        }
        Ok(SearchPolygon(polygon))
    }

    /// Parse a `POLYGON`, or any other WKT geometry with an
    /// exterior ring.
    pub fn from_wkt(text: &str) -> Result<Self> {
        let geometry = Geometry::<f64>::try_from_wkt_str(text.trim())
            .map_err(|e| AuxError::InvalidGeometry(format!("cannot read WKT: {}", e)))?;
        Self::try_from(geometry)
    }

    /// Read polygon vertices from CSV: a header line, then
    /// one `lon,lat` pair per line. The ring is closed
    /// automatically.
    pub fn from_vertices_reader<R: Read>(rdr: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(rdr);
        let vertices = reader
            .deserialize::<(f64, f64)>()
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(Polygon::new(LineString::from(vertices), vec![]))
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.0
    }

    pub fn exterior(&self) -> &LineString<f64> {
        self.0.exterior()
    }

    /// True when `(lon, lat)` lies inside the polygon or on
    /// its boundary. Points inside a hole do not match.
    pub fn contains_or_touches(&self, lon: f64, lat: f64) -> bool {
        self.0.intersects(&Coord { x: lon, y: lat })
    }
}

impl TryFrom<Geometry<f64>> for SearchPolygon {
    type Error = AuxError;

    fn try_from(geometry: Geometry<f64>) -> Result<Self> {
        match geometry {
            Geometry::Polygon(p) => Self::new(p),
            Geometry::Rect(r) => Self::new(r.to_polygon()),
            Geometry::Triangle(t) => Self::new(t.to_polygon()),
            Geometry::MultiPolygon(_) => Err(AuxError::InvalidGeometry(
                "not a polygon: multi-polygons have no single exterior ring".into(),
            )),
            _ => Err(AuxError::InvalidGeometry(
                "not a polygon: geometry has no exterior ring".into(),
            )),
        }
    }
}

impl TryFrom<&Geometry<f64>> for SearchPolygon {
    type Error = AuxError;

    fn try_from(geometry: &Geometry<f64>) -> Result<Self> {
        Self::try_from(geometry.clone())
    }
}
