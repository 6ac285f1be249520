//! Errors raised when a value falls outside a closed enumeration.

use std::str::FromStr;

use strum::VariantNames;
use thiserror::Error;

/// A string that names no member of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported {kind} '{value}', expected one of: {}", .expected.join(", "))]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static [&'static str],
}

/// Parse `value` into a closed enum, ignoring surrounding whitespace and ASCII case.
pub(crate) fn parse_closed<T>(kind: &'static str, value: &str) -> Result<T, ParseEnumError>
where
    T: FromStr + VariantNames,
{
    value.trim().parse::<T>().map_err(|_| ParseEnumError {
        kind,
        value: value.to_string(),
        expected: T::VARIANTS,
    })
}
