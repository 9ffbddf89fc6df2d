use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::{invalid_input_error, Error};

pub const DEFAULT_API_BASE: &str = "https://maps.googleapis.com";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Units {
    Imperial,
    Metric,
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Units::Imperial => "imperial",
                Units::Metric => "metric",
            }
        )
    }
}

impl FromStr for Units {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "imperial" => Ok(Units::Imperial),
            "metric" => Ok(Units::Metric),
            _ => Err(invalid_input_error()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base: String,
    pub api_key: String,
    pub origin: String,
    pub destination: String,
    pub units: Units,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        let api_base =
            env::var("GOOGLE_MAPS_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into());
        let api_key = env::var("GOOGLE_MAPS_API_KEY")?;
        let origin = env::var("COMMUTE_ORIGIN")?;
        let destination = env::var("COMMUTE_DESTINATION")?;

        let units = match env::var("COMMUTE_UNITS") {
            Ok(value) => value.parse()?,
            Err(env::VarError::NotPresent) => Units::Imperial,
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            api_base,
            api_key,
            origin,
            destination,
            units,
        })
    }
}

#[test]
fn units_round_trip_test() {
    assert_eq!("imperial".parse::<Units>().unwrap(), Units::Imperial);
    assert_eq!("metric".parse::<Units>().unwrap(), Units::Metric);
    assert_eq!(Units::Imperial.to_string(), "imperial");
    assert_eq!(Units::Metric.to_string(), "metric");
}

#[test]
fn units_unknown_test() {
    let result = "nautical".parse::<Units>();
    assert_eq!(result.unwrap_err().code, 101);
}

#[test]
fn config_from_env_test() {
    env::set_var("GOOGLE_MAPS_API_KEY", "test-key");
    env::set_var("COMMUTE_ORIGIN", "1 Origin St");
    env::set_var("COMMUTE_DESTINATION", "2 Destination Ave");

    let config = Config::from_env().unwrap();

    assert_eq!(config.api_base, DEFAULT_API_BASE);
    assert_eq!(config.api_key, "test-key");
    assert_eq!(config.origin, "1 Origin St");
    assert_eq!(config.destination, "2 Destination Ave");
    assert_eq!(config.units, Units::Imperial);
}
