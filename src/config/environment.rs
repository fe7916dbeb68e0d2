// ABOUTME: Environment variable helpers for configuration loading
// ABOUTME: Falls back to defaults with a log line instead of failing startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use tracing::warn;

/// Read a string variable, falling back to `default` when unset.
#[must_use]
pub fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Read an optional variable; empty values count as unset.
#[must_use]
pub fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Read and parse a variable, falling back to `default` on absence or
/// parse failure. A bad value is logged, never fatal.
#[must_use]
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(err) => {
                warn!(%key, %raw, %err, "invalid environment value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn parse_falls_back_on_garbage() {
        env::set_var("NUTRISCAN_TEST_PARSE", "not-a-number");
        assert_eq!(env_parse("NUTRISCAN_TEST_PARSE", 7_u64), 7);
        env::remove_var("NUTRISCAN_TEST_PARSE");
    }

    #[test]
    #[serial]
    fn empty_opt_counts_as_unset() {
        env::set_var("NUTRISCAN_TEST_OPT", "  ");
        assert_eq!(env_opt("NUTRISCAN_TEST_OPT"), None);
        env::set_var("NUTRISCAN_TEST_OPT", "value");
        assert_eq!(env_opt("NUTRISCAN_TEST_OPT").as_deref(), Some("value"));
        env::remove_var("NUTRISCAN_TEST_OPT");
    }
}
