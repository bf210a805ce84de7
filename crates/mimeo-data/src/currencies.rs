//! Currencies dataset, one row per country.

use crate::{load_csv, DataError, ReferenceDataset};
use serde::Deserialize;

const CURRENCIES_CSV: &str = include_str!("../data/currencies.csv");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Currency {
    /// ISO-3 code of the country using the currency
    pub country: String,
    pub code: String,
    pub name: String,
}

#[derive(Debug)]
pub struct Currencies {
    records: Vec<Currency>,
}

impl Currencies {
    pub fn load() -> Result<Self, DataError> {
        Ok(Self {
            records: load_csv("currencies", CURRENCIES_CSV)?,
        })
    }

    /// Currencies used by the country with the given ISO-3 code.
    pub fn of_country(&self, iso3: &str) -> Vec<&Currency> {
        self.lookup_by(|currency| currency.country == iso3)
    }
}

impl ReferenceDataset for Currencies {
    type Record = Currency;

    fn lookup_all(&self) -> &[Currency] {
        &self.records
    }

    /// Currencies are keyed by ISO-4217 code.
    fn lookup_one_by_key(&self, key: &str) -> Option<&Currency> {
        self.records.iter().find(|currency| currency.code == key)
    }
}
