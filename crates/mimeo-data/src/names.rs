//! First name and last name datasets.

use crate::{load_csv, DataError, ReferenceDataset};
use serde::Deserialize;

const FORENAMES_CSV: &str = include_str!("../data/forenames.csv");
const SURNAMES_CSV: &str = include_str!("../data/surnames.csv");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    /// Parse `M`, `F`, `Male` or `Female` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "m" | "male" => Some(Sex::Male),
            "f" | "female" => Some(Sex::Female),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Forename {
    pub name: String,
    pub sex: Sex,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Surname {
    pub name: String,
}

#[derive(Debug)]
pub struct Forenames {
    records: Vec<Forename>,
}

impl Forenames {
    pub fn load() -> Result<Self, DataError> {
        Ok(Self {
            records: load_csv("forenames", FORENAMES_CSV)?,
        })
    }
}

impl ReferenceDataset for Forenames {
    type Record = Forename;

    fn lookup_all(&self) -> &[Forename] {
        &self.records
    }

    fn lookup_one_by_key(&self, key: &str) -> Option<&Forename> {
        self.records.iter().find(|forename| forename.name == key)
    }
}

#[derive(Debug)]
pub struct Surnames {
    records: Vec<Surname>,
}

impl Surnames {
    pub fn load() -> Result<Self, DataError> {
        Ok(Self {
            records: load_csv("surnames", SURNAMES_CSV)?,
        })
    }
}

impl ReferenceDataset for Surnames {
    type Record = Surname;

    fn lookup_all(&self) -> &[Surname] {
        &self.records
    }

    fn lookup_one_by_key(&self, key: &str) -> Option<&Surname> {
        self.records.iter().find(|surname| surname.name == key)
    }
}
