//! Countries dataset.

use crate::{load_csv, DataError, ReferenceDataset};
use serde::Deserialize;

const COUNTRIES_CSV: &str = include_str!("../data/countries.csv");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Country {
    pub name: String,
    pub iso2: String,
    pub iso3: String,
}

impl Country {
    /// Whether `value` names this country by name, ISO-2 or ISO-3 code.
    pub fn matches(&self, value: &str) -> bool {
        self.name.eq_ignore_ascii_case(value)
            || self.iso2.eq_ignore_ascii_case(value)
            || self.iso3.eq_ignore_ascii_case(value)
    }
}

#[derive(Debug)]
pub struct Countries {
    records: Vec<Country>,
}

impl Countries {
    pub fn load() -> Result<Self, DataError> {
        Ok(Self {
            records: load_csv("countries", COUNTRIES_CSV)?,
        })
    }

    /// Find a country by name, ISO-2 or ISO-3 code (case-insensitive).
    pub fn find(&self, value: &str) -> Option<&Country> {
        self.records.iter().find(|country| country.matches(value))
    }
}

impl ReferenceDataset for Countries {
    type Record = Country;

    fn lookup_all(&self) -> &[Country] {
        &self.records
    }

    /// Countries are keyed by ISO-3 code.
    fn lookup_one_by_key(&self, key: &str) -> Option<&Country> {
        self.records.iter().find(|country| country.iso3 == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_any_identifier() {
        let countries = Countries::load().unwrap();
        let by_name = countries.find("germany").unwrap();
        let by_iso2 = countries.find("DE").unwrap();
        let by_iso3 = countries.find("deu").unwrap();
        assert_eq!(by_name, by_iso2);
        assert_eq!(by_iso2, by_iso3);
        assert_eq!(by_name.iso3, "DEU");
    }

    #[test]
    fn test_lookup_by_key() {
        let countries = Countries::load().unwrap();
        assert_eq!(countries.lookup_one_by_key("GBR").unwrap().name, "United Kingdom");
        assert!(countries.lookup_one_by_key("gbr").is_none());
        assert!(countries.find("ZZZ").is_none());
    }
}
