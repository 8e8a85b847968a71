//! Column layout of the GeoNames `geoname` table.
//!
//! A [`Schema`] is built once and passed by reference to everything that
//! maps column names to row positions.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// One column of the source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub index: usize,
    pub name: &'static str,
    pub description: &'static str,
}

const GEONAMES_COLUMNS: [(&str, &str); 19] = [
    ("id", "integer id of record in geonames database"),
    ("name", "name of geographical point (utf8)"),
    ("asciiName", "name of geographical point in plain ascii characters"),
    ("alternateNames", "alternate names, comma separated"),
    ("latitude", "latitude in decimal degrees (wgs84)"),
    ("longitude", "longitude in decimal degrees (wgs84)"),
    ("featureClass", "feature class, char(1)"),
    ("featureCode", "feature code, varchar(10)"),
    ("countryCode", "ISO-3166 2-letter country code"),
    ("cc2", "alternate country codes, comma separated"),
    ("admin1Code", "first-level administrative division code"),
    ("admin2Code", "second-level administrative division code"),
    ("admin3Code", "third-level administrative division code"),
    ("admin4Code", "fourth-level administrative division code"),
    ("population", "population, bigint"),
    ("elevation", "elevation in meters, integer"),
    ("dem", "digital elevation model (srtm3 or gtopo30), meters"),
    ("timezone", "iana timezone id"),
    ("modificationDate", "date of last modification, yyyy-MM-dd"),
];

/// Immutable bidirectional name ↔ index mapping.
#[derive(Debug, Clone)]
pub struct Schema {
    columns: Vec<Column>,
    by_name: HashMap<&'static str, usize>,
}

impl Schema {
    /// The 19-column `geoname` table layout.
    pub fn geonames() -> Self {
        let columns: Vec<Column> = GEONAMES_COLUMNS
            .iter()
            .enumerate()
            .map(|(index, &(name, description))| Column {
                index,
                name,
                description,
            })
            .collect();
        let by_name = columns.iter().map(|c| (c.name, c.index)).collect();
        Self { columns, by_name }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))
    }

    pub fn name_of(&self, index: usize) -> Option<&'static str> {
        self.columns.get(index).map(|c| c.name)
    }

    /// Resolve a requested column list to source positions, in request order.
    ///
    /// Fails on the first unknown name or on an empty request.
    pub fn resolve(&self, names: &[String]) -> Result<Projection> {
        if names.is_empty() {
            return Err(Error::Config("no columns requested".into()));
        }
        let indices = names
            .iter()
            .map(|name| self.index_of(name))
            .collect::<Result<Vec<_>>>()?;
        Ok(Projection {
            names: names.to_vec(),
            indices,
        })
    }
}

/// Requested output columns and the source positions they read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    names: Vec<String>,
    indices: Vec<usize>,
}

impl Projection {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}
