//! Cities dataset.

use crate::{load_csv, DataError, ReferenceDataset};
use serde::Deserialize;

const CITIES_CSV: &str = include_str!("../data/cities.csv");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct City {
    pub id: u32,
    pub city: String,
    pub city_ascii: String,
    /// Country name, as in the countries dataset
    pub country: String,
}

#[derive(Debug)]
pub struct Cities {
    records: Vec<City>,
}

impl Cities {
    pub fn load() -> Result<Self, DataError> {
        Ok(Self {
            records: load_csv("cities", CITIES_CSV)?,
        })
    }

    /// Cities of the country with the given name.
    pub fn in_country(&self, country: &str) -> Vec<&City> {
        self.lookup_by(|city| city.country == country)
    }
}

impl ReferenceDataset for Cities {
    type Record = City;

    fn lookup_all(&self) -> &[City] {
        &self.records
    }

    /// Cities are keyed by numeric id.
    fn lookup_one_by_key(&self, key: &str) -> Option<&City> {
        let id: u32 = key.parse().ok()?;
        self.records.iter().find(|city| city.id == id)
    }
}
