//! Query parameter parsing for `/v1/password`
//!
//! `length` and `count` are optional. An absent key or an empty value falls
//! back to the default; when a key repeats, its first occurrence wins.

use std::num::ParseIntError;

use crate::config::{LimitsConfig, DEFAULT_COUNT, DEFAULT_LENGTH};
use crate::generator::PasswordParams;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("Query parameter `{name}` is invalid: parsing \"{raw}\": {source}")]
    Invalid {
        name: &'static str,
        raw: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Query parameter `{name}` is out of range: {value} (must be between {min} and {max})")]
    OutOfRange {
        name: &'static str,
        value: i64,
        min: u32,
        max: u32,
    },
}

/// Parse and range-check the generation parameters of a query string
pub fn parse_password_params(
    query: Option<&str>,
    limits: &LimitsConfig,
) -> Result<PasswordParams, ParamError> {
    let query = query.unwrap_or_default();
    let length = parse_param(
        query,
        "length",
        DEFAULT_LENGTH,
        limits.min_length,
        limits.max_length,
    )?;
    let count = parse_param(
        query,
        "count",
        DEFAULT_COUNT,
        limits.min_count,
        limits.max_count,
    )?;
    Ok(PasswordParams { length, count })
}

fn parse_param(
    query: &str,
    name: &'static str,
    default: u32,
    min: u32,
    max: u32,
) -> Result<u32, ParamError> {
    let raw = match first_value(query, name) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(default),
    };

    let value = raw
        .parse::<i64>()
        .map_err(|source| ParamError::Invalid {
            name,
            raw: raw.clone(),
            source,
        })?;

    u32::try_from(value)
        .ok()
        .filter(|v| (min..=max).contains(v))
        .ok_or(ParamError::OutOfRange {
            name,
            value,
            min,
            max,
        })
}

fn first_value(query: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(query: &str) -> Result<PasswordParams, ParamError> {
        parse_password_params(Some(query), &LimitsConfig::default())
    }

    #[test]
    fn test_defaults_when_absent() {
        let expected = PasswordParams { length: 8, count: 1 };
        assert_eq!(parse_password_params(None, &LimitsConfig::default()), Ok(expected));
        assert_eq!(parse(""), Ok(expected));
        assert_eq!(parse("other=3"), Ok(expected));
    }

    #[test]
    fn test_empty_value_means_default() {
        assert_eq!(parse("length=&count="), Ok(PasswordParams { length: 8, count: 1 }));
    }

    #[test]
    fn test_explicit_values() {
        assert_eq!(
            parse("length=32&count=5"),
            Ok(PasswordParams { length: 32, count: 5 })
        );
        assert_eq!(parse("count=3"), Ok(PasswordParams { length: 8, count: 3 }));
        assert_eq!(parse("length=%2B12"), Ok(PasswordParams { length: 12, count: 1 }));
    }

    #[test]
    fn test_plus_decodes_to_space() {
        assert!(matches!(
            parse("length=+12"),
            Err(ParamError::Invalid { name: "length", ref raw, .. }) if raw == " 12"
        ));
    }

    #[test]
    fn test_first_occurrence_wins() {
        assert_eq!(
            parse("length=10&length=abc&count=2&count=9"),
            Ok(PasswordParams { length: 10, count: 2 })
        );
    }

    #[test]
    fn test_percent_encoded_values() {
        assert_eq!(parse("length=%31%36"), Ok(PasswordParams { length: 16, count: 1 }));
    }

    #[test]
    fn test_invalid_length_message() {
        let err = parse("length=abc").unwrap_err();
        assert!(matches!(err, ParamError::Invalid { name: "length", .. }));
        let message = err.to_string();
        assert!(message.contains("\"abc\""), "{message}");
        assert!(message.contains("invalid"), "{message}");
        assert!(message.starts_with("Query parameter `length`"), "{message}");
    }

    #[test]
    fn test_invalid_count_checked_after_valid_length() {
        let err = parse("length=12&count=1.5").unwrap_err();
        assert!(matches!(err, ParamError::Invalid { name: "count", .. }));
        assert!(err.to_string().contains("\"1.5\""));
    }

    #[test]
    fn test_range_checks() {
        assert_eq!(
            parse("length=-1"),
            Err(ParamError::OutOfRange {
                name: "length",
                value: -1,
                min: 4,
                max: 1024,
            })
        );
        assert!(matches!(
            parse("length=3"),
            Err(ParamError::OutOfRange { name: "length", value: 3, .. })
        ));
        assert!(matches!(
            parse("count=0"),
            Err(ParamError::OutOfRange { name: "count", value: 0, .. })
        ));
        assert!(matches!(
            parse("count=101"),
            Err(ParamError::OutOfRange { name: "count", value: 101, .. })
        ));
        assert!(matches!(
            parse("length=99999999999"),
            Err(ParamError::OutOfRange { name: "length", .. })
        ));
        assert_eq!(parse("length=4&count=100").map(|p| p.count), Ok(100));
    }

    #[test]
    fn test_out_of_range_message() {
        let err = parse("count=0").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Query parameter `count` is out of range: 0 (must be between 1 and 100)"
        );
    }

    #[test]
    fn test_custom_limits() {
        let limits = LimitsConfig {
            min_length: 8,
            max_length: 8,
            min_count: 1,
            max_count: 1,
        };
        assert!(parse_password_params(Some("length=8"), &limits).is_ok());
        assert!(parse_password_params(Some("length=9"), &limits).is_err());
    }
}
