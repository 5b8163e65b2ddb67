//! Country Code Table Fixtures

use std::{fs, path::Path};

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{countries::CountryResolver, fixtures::FixtureError};

/// Wrapper for a country code table in YAML
#[derive(Debug, Deserialize)]
pub struct CountryTableFixture {
    /// Map of country code -> country name
    pub codes: FxHashMap<String, String>,
}

impl From<CountryTableFixture> for CountryResolver {
    fn from(fixture: CountryTableFixture) -> Self {
        CountryResolver::new(fixture.codes)
    }
}

/// Read a country code table from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_country_table(path: impl AsRef<Path>) -> Result<CountryResolver, FixtureError> {
    let contents = fs::read_to_string(path)?;
    let fixture: CountryTableFixture = serde_norway::from_str(&contents)?;

    Ok(fixture.into())
}
