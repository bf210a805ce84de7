//! The closed library of value-generation functions.
//!
//! A function is invoked either raw (`"{random_str}"`) with its default
//! arguments, or parametrized through a `_mimeo_util` object whose `_name`
//! selects the variant and whose remaining keys are keyword arguments.

pub mod auto_increment;
pub mod date;
pub mod iteration;
pub mod key;
pub mod phone;
pub mod random;
pub mod reference;

use crate::error::RenderError;
use crate::manager::ContextManager;
use mimeo_core::Atom;
use mimeo_data::Datasets;
use serde::Deserialize;
use serde_json::{Map, Value};

pub use reference::{CountryValue, CurrencyValue};

/// Names of every supported function.
pub const UTIL_NAMES: &[&str] = &[
    "random_str",
    "random_int",
    "random_item",
    "date",
    "date_time",
    "auto_increment",
    "curr_iter",
    "key",
    "city",
    "country",
    "currency",
    "first_name",
    "last_name",
    "phone",
];

pub fn is_util(name: &str) -> bool {
    UTIL_NAMES.contains(&name)
}

fn default_length() -> usize {
    20
}

fn default_start() -> i64 {
    1
}

fn default_limit() -> i64 {
    100
}

fn default_pattern() -> String {
    auto_increment::DEFAULT_PATTERN.to_string()
}

fn default_phone_format() -> String {
    phone::DEFAULT_FORMAT.to_string()
}

fn default_unique() -> bool {
    true
}

/// A function call with its keyword arguments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "_name", rename_all = "snake_case")]
pub enum MimeoUtil {
    RandomStr {
        #[serde(default = "default_length")]
        length: usize,
    },
    RandomInt {
        #[serde(default = "default_start")]
        start: i64,
        #[serde(default = "default_limit")]
        limit: i64,
    },
    RandomItem {
        #[serde(default)]
        items: Vec<Value>,
    },
    Date {
        #[serde(default)]
        days_delta: i64,
    },
    DateTime {
        #[serde(default)]
        days_delta: i64,
        #[serde(default)]
        hours_delta: i64,
        #[serde(default)]
        minutes_delta: i64,
        #[serde(default)]
        seconds_delta: i64,
    },
    AutoIncrement {
        #[serde(default = "default_pattern")]
        pattern: String,
    },
    CurrIter {
        #[serde(default)]
        context: Option<String>,
    },
    Key {
        #[serde(default)]
        context: Option<String>,
        #[serde(default)]
        iteration: Option<u64>,
    },
    City {
        #[serde(default)]
        country: Option<String>,
        #[serde(default = "default_unique")]
        unique: bool,
    },
    Country {
        #[serde(default)]
        value: CountryValue,
        #[serde(default)]
        country: Option<String>,
        #[serde(default = "default_unique")]
        unique: bool,
    },
    Currency {
        #[serde(default)]
        value: CurrencyValue,
        #[serde(default)]
        country: Option<String>,
    },
    FirstName {
        #[serde(default)]
        sex: Option<String>,
        #[serde(default = "default_unique")]
        unique: bool,
    },
    LastName {
        #[serde(default = "default_unique")]
        unique: bool,
    },
    Phone {
        #[serde(default = "default_phone_format")]
        format: String,
    },
}

impl MimeoUtil {
    /// Build a call from a function name and already rendered arguments.
    pub fn from_args(name: &str, args: Map<String, Value>) -> Result<Self, RenderError> {
        if !is_util(name) {
            return Err(RenderError::InvalidMimeoUtil(name.to_string()));
        }

        let mut call = args;
        call.insert("_name".into(), Value::String(name.to_string()));
        serde_json::from_value(Value::Object(call)).map_err(|e| RenderError::InvalidValue {
            util: name.to_string(),
            reason: e.to_string(),
        })
    }

    /// Run the function against the current session state.
    pub fn call(&self, manager: &mut ContextManager, datasets: &Datasets) -> Result<Atom, RenderError> {
        match self {
            MimeoUtil::RandomStr { length } => Ok(random::random_str(manager.rng(), *length)),
            MimeoUtil::RandomInt { start, limit } => random::random_int(manager.rng(), *start, *limit),
            MimeoUtil::RandomItem { items } => random::random_item(manager.rng(), items),
            MimeoUtil::Date { days_delta } => Ok(Atom::String(date::date(*days_delta)?)),
            MimeoUtil::DateTime {
                days_delta,
                hours_delta,
                minutes_delta,
                seconds_delta,
            } => Ok(Atom::String(date::date_time(
                *days_delta,
                *hours_delta,
                *minutes_delta,
                *seconds_delta,
            )?)),
            MimeoUtil::AutoIncrement { pattern } => auto_increment::auto_increment(manager, pattern),
            MimeoUtil::CurrIter { context } => iteration::curr_iter(manager, context.as_deref()),
            MimeoUtil::Key { context, iteration } => {
                iteration::key(manager, context.as_deref(), *iteration)
            }
            MimeoUtil::City { country, unique } => {
                reference::city(manager, datasets, country.as_deref(), *unique)
            }
            MimeoUtil::Country {
                value,
                country,
                unique,
            } => reference::country(manager, datasets, *value, country.as_deref(), *unique),
            MimeoUtil::Currency { value, country } => {
                reference::currency(manager, datasets, *value, country.as_deref())
            }
            MimeoUtil::FirstName { sex, unique } => {
                reference::first_name(manager, datasets, sex.as_deref(), *unique)
            }
            MimeoUtil::LastName { unique } => reference::last_name(manager, datasets, *unique),
            MimeoUtil::Phone { format } => Ok(phone::phone(manager.rng(), format)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_defaults() {
        assert_eq!(
            MimeoUtil::from_args("random_str", Map::new()).unwrap(),
            MimeoUtil::RandomStr { length: 20 }
        );
        assert_eq!(
            MimeoUtil::from_args("random_int", Map::new()).unwrap(),
            MimeoUtil::RandomInt { start: 1, limit: 100 }
        );
        assert_eq!(
            MimeoUtil::from_args("auto_increment", Map::new()).unwrap(),
            MimeoUtil::AutoIncrement {
                pattern: "{:05d}".into()
            }
        );
        assert_eq!(
            MimeoUtil::from_args("city", Map::new()).unwrap(),
            MimeoUtil::City {
                country: None,
                unique: true
            }
        );
        assert_eq!(
            MimeoUtil::from_args("country", Map::new()).unwrap(),
            MimeoUtil::Country {
                value: CountryValue::Name,
                country: None,
                unique: true
            }
        );
    }

    #[test]
    fn test_keyword_arguments() {
        let util = MimeoUtil::from_args(
            "date_time",
            args(json!({"days_delta": -1, "seconds_delta": 30})),
        )
        .unwrap();
        assert_eq!(
            util,
            MimeoUtil::DateTime {
                days_delta: -1,
                hours_delta: 0,
                minutes_delta: 0,
                seconds_delta: 30
            }
        );

        let util = MimeoUtil::from_args("country", args(json!({"value": "iso2"}))).unwrap();
        assert!(matches!(util, MimeoUtil::Country { value: CountryValue::Iso2, .. }));
    }

    #[test]
    fn test_unknown_function() {
        assert!(matches!(
            MimeoUtil::from_args("nope", Map::new()),
            Err(RenderError::InvalidMimeoUtil(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_invalid_arguments() {
        for (name, value) in [
            ("auto_increment", json!({"pattern": 5})),
            ("random_int", json!({"start": "a"})),
            ("country", json!({"value": "capital"})),
            ("random_str", json!({"length": -3})),
        ] {
            assert!(
                matches!(
                    MimeoUtil::from_args(name, args(value)),
                    Err(RenderError::InvalidValue { .. })
                ),
                "{name} should reject its arguments"
            );
        }
    }

    #[test]
    fn test_util_names_parse() {
        for name in UTIL_NAMES {
            assert!(MimeoUtil::from_args(name, Map::new()).is_ok(), "{name}");
        }
    }
}
