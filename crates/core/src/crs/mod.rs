//! Coordinate Reference System handling
//!
//! The spatial reference is carried as opaque well-known text. It is read
//! from a `.prj` sidecar and handed unchanged to the raster sink; nothing in
//! the interpolation path looks inside it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Coordinate Reference System as well-known text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CRS {
    wkt: String,
}

impl CRS {
    /// Create a CRS from a WKT string, kept verbatim
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self { wkt: wkt.into() }
    }

    /// Read the spatial reference from a `.prj` file.
    ///
    /// Only the first line is used; ESRI `.prj` files hold the whole WKT on
    /// one line. A file with no text is rejected.
    pub fn read_prj<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        Self::from_prj_reader(reader).ok_or_else(|| Error::InvalidParameter {
            name: "prj",
            value: path.display().to_string(),
            reason: "projection file is empty".to_string(),
        })
    }

    fn from_prj_reader<R: BufRead>(reader: R) -> Option<Self> {
        let first = reader.lines().next()?.ok()?;
        let wkt = first.trim_end_matches(['\r', '\n']);
        if wkt.trim().is_empty() {
            return None;
        }
        Some(Self::from_wkt(wkt))
    }

    /// Get WKT representation
    pub fn wkt(&self) -> &str {
        &self.wkt
    }

    /// Whether the WKT describes a geographic (lat/lon) system.
    ///
    /// Only the root keyword is inspected; GeoTIFF writers need this to pick
    /// the model type key.
    pub fn is_geographic(&self) -> bool {
        let root = self.wkt.trim_start();
        root.starts_with("GEOGCS") || root.starts_with("GEOGCRS") || root.starts_with("GEODCRS")
    }

    /// Short identifier for logging
    pub fn identifier(&self) -> String {
        let name = self
            .wkt
            .split('"')
            .nth(1)
            .filter(|n| !n.is_empty());
        match name {
            Some(n) => n.to_string(),
            None => format!("WKT:{}", self.wkt.chars().take(50).collect::<String>()),
        }
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const NAD83: &str = r#"GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137.0,298.257222101]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

    #[test]
    fn test_first_line_only() {
        let text = format!("{}\r\nsecond line\n", NAD83);
        let crs = CRS::from_prj_reader(Cursor::new(text)).unwrap();
        assert_eq!(crs.wkt(), NAD83);
    }

    #[test]
    fn test_empty_prj() {
        assert!(CRS::from_prj_reader(Cursor::new("")).is_none());
        assert!(CRS::from_prj_reader(Cursor::new("   \n")).is_none());
    }

    #[test]
    fn test_identifier_and_kind() {
        let crs = CRS::from_wkt(NAD83);
        assert_eq!(crs.identifier(), "GCS_North_American_1983");
        assert!(crs.is_geographic());

        let projected = CRS::from_wkt(r#"PROJCS["NAD83 / UTM zone 15N",GEOGCS["NAD83"]]"#);
        assert!(!projected.is_geographic());
    }

    #[test]
    fn test_read_prj_missing_file() {
        let result = CRS::read_prj("/nonexistent/points.prj");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
