use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use eyre::{eyre, Result, WrapErr};
use validator::{Validate, ValidationError};

use crate::domain::amount::{Amount, Multiplier};

/// Simulated round-trip times for the operations that would talk to a server.
#[derive(Debug, Clone, PartialEq)]
pub struct Latency {
    pub restore: Duration,
    pub login: Duration,
    pub register: Duration,
    pub load_game: Duration,
    pub settle: Duration,
}

impl Latency {
    pub fn none() -> Self {
        Latency {
            restore: Duration::ZERO,
            login: Duration::ZERO,
            register: Duration::ZERO,
            load_game: Duration::ZERO,
            settle: Duration::ZERO,
        }
    }
}

impl Default for Latency {
    fn default() -> Self {
        Latency {
            restore: Duration::from_millis(500),
            login: Duration::from_millis(1500),
            register: Duration::from_millis(1500),
            load_game: Duration::from_millis(2000),
            settle: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Validate)]
pub struct Config {
    pub store_path: Option<PathBuf>,
    #[validate(range(min = 0.0), custom(function = validate_finite))]
    pub starting_balance: f64,
    #[validate(range(min = 0.0), custom(function = validate_finite))]
    pub signup_bonus: f64,
    #[validate(range(min = 1.0), custom(function = validate_finite))]
    pub crash_cash_out: f64,
    pub rng_seed: Option<u64>,
    pub latency: Latency,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store_path: None,
            starting_balance: 100.0,
            signup_bonus: 100.0,
            crash_cash_out: 2.0,
            rng_seed: None,
            latency: Latency::default(),
        }
    }
}

impl Config {
    /// Defaults overridden by `CASINO_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::default();
        if let Some(path) = lookup("CASINO_STORE_PATH").filter(|path| !path.is_empty()) {
            config.store_path = Some(PathBuf::from(path));
        }
        if let Some(value) = parse(&lookup, "CASINO_STARTING_BALANCE")? {
            config.starting_balance = value;
        }
        if let Some(value) = parse(&lookup, "CASINO_SIGNUP_BONUS")? {
            config.signup_bonus = value;
        }
        if let Some(value) = parse(&lookup, "CASINO_CRASH_CASH_OUT")? {
            config.crash_cash_out = value;
        }
        config.rng_seed = parse(&lookup, "CASINO_RNG_SEED")?;
        if let Some(false) = parse::<bool>(&lookup, "CASINO_SIMULATE_LATENCY")? {
            config.latency = Latency::none();
        }
        config
            .validate()
            .map_err(|e| eyre!("invalid configuration: {}", e))?;
        Ok(config)
    }

    /// For tests and embedding: no delays, in-memory store.
    pub fn instant() -> Self {
        Config {
            latency: Latency::none(),
            ..Config::default()
        }
    }

    pub fn starting_balance(&self) -> Amount {
        Amount::from_f64(self.starting_balance)
    }

    pub fn signup_bonus(&self) -> Amount {
        Amount::from_f64(self.signup_bonus)
    }

    pub fn crash_cash_out(&self) -> Multiplier {
        Multiplier::from_f64(self.crash_cash_out)
    }
}

// range checks let NaN and infinities through
fn validate_finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("finite"))
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .wrap_err_with(|| format!("{key} has an invalid value: {raw}"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let config = Config::from_lookup(lookup(&[]))?;
        assert_eq!(None, config.store_path);
        assert_eq!(Amount::from_units(100), config.starting_balance());
        assert_eq!(Amount::from_units(100), config.signup_bonus());
        assert_eq!(Multiplier::whole(2), config.crash_cash_out());
        assert_eq!(Duration::from_millis(1500), config.latency.login);
        Ok(())
    }

    #[test]
    fn test_overrides() -> Result<()> {
        let config = Config::from_lookup(lookup(&[
            ("CASINO_STORE_PATH", "/tmp/casino.json"),
            ("CASINO_SIGNUP_BONUS", "250.5"),
            ("CASINO_RNG_SEED", "99"),
            ("CASINO_SIMULATE_LATENCY", "false"),
        ]))?;
        assert_eq!(Some(PathBuf::from("/tmp/casino.json")), config.store_path);
        assert_eq!(Amount::from_cents(25050), config.signup_bonus());
        assert_eq!(Some(99), config.rng_seed);
        assert_eq!(Latency::none(), config.latency);
        Ok(())
    }

    #[rstest]
    #[case("CASINO_SIGNUP_BONUS", "lots")]
    #[case("CASINO_SIGNUP_BONUS", "-1")]
    #[case("CASINO_SIGNUP_BONUS", "inf")]
    #[case("CASINO_STARTING_BALANCE", "inf")]
    #[case("CASINO_STARTING_BALANCE", "NaN")]
    #[case("CASINO_CRASH_CASH_OUT", "0.5")]
    #[case("CASINO_CRASH_CASH_OUT", "NaN")]
    #[case("CASINO_CRASH_CASH_OUT", "inf")]
    #[case("CASINO_RNG_SEED", "-3")]
    fn test_rejects_bad_values(#[case] key: &str, #[case] value: &str) {
        assert!(Config::from_lookup(lookup(&[(key, value)])).is_err());
    }
}
