//! Textual key filters: `operator[:arg[:arg...]]`.
//!
//! Single argument operators take everything after the first `:` verbatim,
//! so `matches:^a:b$` keeps its colon. Arguments for comparisons are typed
//! with [`Operand::infer`]. Logical filters have no textual form.

use super::filter::{KeyFilter, Operand};
use crate::error::{Error, Result};
use std::str::FromStr;

impl FromStr for KeyFilter {
    type Err = Error;

    fn from_str(spec: &str) -> Result<Self> {
        let (operator, rest) = match spec.split_once(':') {
            Some((operator, rest)) => (operator.trim(), Some(rest)),
            None => (spec.trim(), None),
        };

        let filter = match operator {
            "greater_than" => KeyFilter::GreaterThan(operand(operator, rest)?),
            "less_than" => KeyFilter::LessThan(operand(operator, rest)?),
            "greater_than_eq" => KeyFilter::GreaterThanEq(operand(operator, rest)?),
            "less_than_eq" => KeyFilter::LessThanEq(operand(operator, rest)?),
            "neq" => KeyFilter::NotEqual(operand(operator, rest)?),
            "eq" => KeyFilter::Equal(operand(operator, rest)?),
            "matches" => KeyFilter::Matches(text(operator, rest)?),
            "starts_with" => KeyFilter::StartsWith(text(operator, rest)?),
            "ends_with" => KeyFilter::EndsWith(text(operator, rest)?),
            "between" => {
                let args = split_args(operator, rest)?;
                match args.as_slice() {
                    [low, high] => KeyFilter::between(Operand::infer(low), Operand::infer(high)),
                    [low, high, inclusive] => KeyFilter::between_with(
                        Operand::infer(low),
                        Operand::infer(high),
                        parse_bool(operator, inclusive)?,
                    ),
                    _ => return Err(arity(operator, "2 or 3", args.len())),
                }
            }
            "set_member" => KeyFilter::SetMember(
                split_args(operator, rest)?
                    .into_iter()
                    .map(Operand::infer)
                    .collect(),
            ),
            "similar_to" => {
                let (value, distance) = last_split(operator, rest)?;
                KeyFilter::similar_to(value, parse_u32(operator, distance)?)
            }
            "tokenize" => {
                let (separator, index) = last_split(operator, rest)?;
                KeyFilter::tokenize(separator, parse_u32(operator, index)?)
            }
            "int_to_string" => no_args(operator, rest, KeyFilter::IntToString)?,
            "string_to_int" => no_args(operator, rest, KeyFilter::StringToInt)?,
            "float_to_string" => no_args(operator, rest, KeyFilter::FloatToString)?,
            "string_to_float" => no_args(operator, rest, KeyFilter::StringToFloat)?,
            "to_upper" => no_args(operator, rest, KeyFilter::ToUpper)?,
            "to_lower" => no_args(operator, rest, KeyFilter::ToLower)?,
            "urldecode" => no_args(operator, rest, KeyFilter::UrlDecode)?,
            "and" | "or" | "not" => {
                return Err(Error::InvalidFilter(format!(
                    "{operator} combines filter lists and has no inline form"
                )))
            }
            "" => return Err(Error::InvalidFilter("empty filter".to_string())),
            other => return Err(Error::InvalidFilter(format!("unknown operator {other:?}"))),
        };

        Ok(filter)
    }
}

fn no_args(operator: &str, rest: Option<&str>, filter: KeyFilter) -> Result<KeyFilter> {
    match rest {
        Some(rest) => Err(Error::InvalidFilter(format!(
            "{operator} takes no arguments, got {rest:?}"
        ))),
        None => Ok(filter),
    }
}

fn text(operator: &str, rest: Option<&str>) -> Result<String> {
    rest.map(str::to_string).ok_or_else(|| arity(operator, "1", 0))
}

fn operand(operator: &str, rest: Option<&str>) -> Result<Operand> {
    rest.map(Operand::infer).ok_or_else(|| arity(operator, "1", 0))
}

fn split_args<'a>(operator: &str, rest: Option<&'a str>) -> Result<Vec<&'a str>> {
    rest.map(|r| r.split(':').collect())
        .ok_or_else(|| arity(operator, "at least 1", 0))
}

fn last_split<'a>(operator: &str, rest: Option<&'a str>) -> Result<(&'a str, &'a str)> {
    rest.and_then(|r| r.rsplit_once(':'))
        .ok_or_else(|| arity(operator, "2", rest.map_or(0, |_| 1)))
}

fn parse_u32(operator: &str, raw: &str) -> Result<u32> {
    raw.trim().parse().map_err(|e| {
        Error::InvalidFilter(format!("{operator}: {raw:?} is not a whole number: {e}"))
    })
}

fn parse_bool(operator: &str, raw: &str) -> Result<bool> {
    match raw.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(Error::InvalidFilter(format!(
            "{operator}: expected true or false, got {other:?}"
        ))),
    }
}

fn arity(operator: &str, expected: &str, got: usize) -> Error {
    Error::InvalidFilter(format!(
        "{operator} expects {expected} argument(s), got {got}"
    ))
}
