//! Functions drawing from the reference datasets.

use crate::error::RenderError;
use crate::manager::ContextManager;
use mimeo_core::Atom;
use mimeo_data::{Country, Currency, Datasets, ReferenceDataset, Sex};
use rand::Rng;
use serde::Deserialize;

/// Country column returned by `country`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountryValue {
    #[default]
    Name,
    Iso2,
    Iso3,
}

/// Currency column returned by `currency`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyValue {
    #[default]
    Code,
    Name,
}

/// Pick an index in `0..pool_size`, without replacement when `unique`.
fn pick(
    manager: &mut ContextManager,
    class: &str,
    pool_size: usize,
    unique: bool,
) -> Result<usize, RenderError> {
    if !unique {
        return Ok(manager.rng().random_range(0..pool_size));
    }
    manager
        .draw_unique(class, pool_size)?
        .ok_or_else(|| RenderError::OutOfStock(class.to_string()))
}

fn find_country<'a>(datasets: &'a Datasets, util: &str, value: &str) -> Result<&'a Country, RenderError> {
    datasets
        .countries
        .find(value)
        .ok_or_else(|| RenderError::DataNotFound(format!("[{util}] no country [{value}]")))
}

pub fn city(
    manager: &mut ContextManager,
    datasets: &Datasets,
    country: Option<&str>,
    unique: bool,
) -> Result<Atom, RenderError> {
    let (cities, class) = match country {
        Some(value) => {
            let country = find_country(datasets, "city", value)?;
            (
                datasets.cities.in_country(&country.name),
                format!("city:{}", country.iso3),
            )
        }
        None => (datasets.cities.lookup_all().iter().collect(), "city".to_string()),
    };
    if cities.is_empty() {
        return Err(RenderError::DataNotFound(format!(
            "[city] no cities for country [{}]",
            country.unwrap_or_default()
        )));
    }

    let index = pick(manager, &class, cities.len(), unique)?;
    Ok(Atom::from(cities[index].city.as_str()))
}

pub fn country(
    manager: &mut ContextManager,
    datasets: &Datasets,
    value: CountryValue,
    country: Option<&str>,
    unique: bool,
) -> Result<Atom, RenderError> {
    let country = match country {
        Some(filter) => find_country(datasets, "country", filter)?,
        None => {
            let countries = datasets.countries.lookup_all();
            if countries.is_empty() {
                return Err(RenderError::DataNotFound("[country] empty dataset".into()));
            }
            &countries[pick(manager, "country", countries.len(), unique)?]
        }
    };

    let column = match value {
        CountryValue::Name => &country.name,
        CountryValue::Iso2 => &country.iso2,
        CountryValue::Iso3 => &country.iso3,
    };
    Ok(Atom::from(column.as_str()))
}

pub fn currency(
    manager: &mut ContextManager,
    datasets: &Datasets,
    value: CurrencyValue,
    country: Option<&str>,
) -> Result<Atom, RenderError> {
    let currency = match country {
        Some(filter) => {
            let country = find_country(datasets, "currency", filter)?;
            datasets
                .currencies
                .of_country(&country.iso3)
                .into_iter()
                .next()
                .ok_or_else(|| {
                    RenderError::DataNotFound(format!("[currency] no currency for [{filter}]"))
                })?
        }
        None => {
            let mut distinct = Vec::new();
            for currency in datasets.currencies.lookup_all() {
                if !distinct.iter().any(|seen: &&Currency| seen.code == currency.code) {
                    distinct.push(currency);
                }
            }
            if distinct.is_empty() {
                return Err(RenderError::DataNotFound("[currency] empty dataset".into()));
            }
            distinct[manager.rng().random_range(0..distinct.len())]
        }
    };

    let column = match value {
        CurrencyValue::Code => &currency.code,
        CurrencyValue::Name => &currency.name,
    };
    Ok(Atom::from(column.as_str()))
}

pub fn first_name(
    manager: &mut ContextManager,
    datasets: &Datasets,
    sex: Option<&str>,
    unique: bool,
) -> Result<Atom, RenderError> {
    let sex = sex
        .map(|value| Sex::parse(value).ok_or_else(|| RenderError::InvalidSex(value.to_string())))
        .transpose()?;

    let (names, class) = match sex {
        Some(sex) => (
            datasets.forenames.lookup_by(|forename| forename.sex == sex),
            format!("first_name:{sex:?}"),
        ),
        None => (
            datasets.forenames.lookup_all().iter().collect(),
            "first_name".to_string(),
        ),
    };
    if names.is_empty() {
        return Err(RenderError::DataNotFound("[first_name] no matching names".into()));
    }

    let index = pick(manager, &class, names.len(), unique)?;
    Ok(Atom::from(names[index].name.as_str()))
}

pub fn last_name(
    manager: &mut ContextManager,
    datasets: &Datasets,
    unique: bool,
) -> Result<Atom, RenderError> {
    let names = datasets.surnames.lookup_all();
    if names.is_empty() {
        return Err(RenderError::DataNotFound("[last_name] empty dataset".into()));
    }

    let index = pick(manager, "last_name", names.len(), unique)?;
    Ok(Atom::from(names[index].name.as_str()))
}
