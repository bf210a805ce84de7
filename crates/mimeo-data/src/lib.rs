//! Reference datasets for the mimeo data generator.
//!
//! Static lookup tables (countries, cities, currencies, first names and last
//! names) are embedded as CSV at compile time, parsed once per process and
//! shared as an immutable [`Datasets`] bundle.
//!
//! # Example
//!
//! ```rust
//! use mimeo_data::{datasets, ReferenceDataset};
//!
//! let data = datasets().unwrap();
//! let poland = data.countries.find("POL").unwrap();
//! let cities = data.cities.in_country(&poland.name);
//! assert!(!cities.is_empty());
//! ```

pub mod cities;
pub mod countries;
pub mod currencies;
pub mod names;

use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;

pub use cities::{Cities, City};
pub use countries::{Countries, Country};
pub use currencies::{Currencies, Currency};
pub use names::{Forename, Forenames, Sex, Surname, Surnames};

/// Error type for dataset loading.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Embedded CSV resource could not be parsed
    #[error("Failed to parse the {dataset} dataset: {source}")]
    Csv {
        dataset: &'static str,
        #[source]
        source: csv::Error,
    },
}

/// Lookup capability shared by all datasets.
pub trait ReferenceDataset {
    type Record;

    /// All records, in resource order.
    fn lookup_all(&self) -> &[Self::Record];

    /// Records matching `predicate`, in resource order.
    fn lookup_by<P>(&self, predicate: P) -> Vec<&Self::Record>
    where
        P: Fn(&Self::Record) -> bool,
    {
        self.lookup_all()
            .iter()
            .filter(|record| predicate(*record))
            .collect()
    }

    /// The record identified by `key`.
    fn lookup_one_by_key(&self, key: &str) -> Option<&Self::Record>;
}

/// All reference datasets.
#[derive(Debug)]
pub struct Datasets {
    pub countries: Countries,
    pub cities: Cities,
    pub currencies: Currencies,
    pub forenames: Forenames,
    pub surnames: Surnames,
}

impl Datasets {
    /// Parse every embedded resource.
    pub fn load() -> Result<Self, DataError> {
        Ok(Self {
            countries: Countries::load()?,
            cities: Cities::load()?,
            currencies: Currencies::load()?,
            forenames: Forenames::load()?,
            surnames: Surnames::load()?,
        })
    }
}

static DATASETS: OnceCell<Datasets> = OnceCell::new();

/// Process-wide datasets, parsed on first use.
pub fn datasets() -> Result<&'static Datasets, DataError> {
    DATASETS.get_or_try_init(Datasets::load)
}

fn load_csv<T: DeserializeOwned>(dataset: &'static str, content: &str) -> Result<Vec<T>, DataError> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes())
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| DataError::Csv { dataset, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_datasets_load() {
        let data = datasets().unwrap();
        assert!(!data.countries.lookup_all().is_empty());
        assert!(!data.cities.lookup_all().is_empty());
        assert!(!data.currencies.lookup_all().is_empty());
        assert!(!data.forenames.lookup_all().is_empty());
        assert!(!data.surnames.lookup_all().is_empty());
    }

    #[test]
    fn test_dataset_sizes() {
        let data = datasets().unwrap();
        assert_eq!(data.countries.lookup_all().len(), 249);
        assert_eq!(data.currencies.lookup_all().len(), 249);
        assert!(data.cities.lookup_all().len() > 10_000);
        assert!(data.forenames.lookup_all().len() > 1_000);
        assert!(data.surnames.lookup_all().len() > 2_000);
    }

    #[test]
    fn test_datasets_are_loaded_once() {
        let first = datasets().unwrap();
        let second = datasets().unwrap();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_every_city_country_is_known() {
        let data = datasets().unwrap();
        for city in data.cities.lookup_all() {
            assert!(
                data.countries.find(&city.country).is_some(),
                "Unknown country for {}: {}",
                city.city,
                city.country
            );
        }
    }

    #[test]
    fn test_every_country_has_a_currency() {
        let data = datasets().unwrap();
        for country in data.countries.lookup_all() {
            assert!(
                !data.currencies.of_country(&country.iso3).is_empty(),
                "No currency for {}",
                country.name
            );
        }
    }

    #[test]
    fn test_csv_error_names_dataset() {
        let result = load_csv::<Country>("countries", "name,iso2\nPoland");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("countries"));
    }
}
