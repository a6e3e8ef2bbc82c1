//! Lenient field coercion for form values and stored records.
//!
//! Browser forms hand over strings and stored JSON may hold `null` where a
//! number failed to parse. None of that is rejected: numbers fall back to 0
//! and strings to empty.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};

/// Parses the leading integer of a form value the way a browser's `parseInt` does.
pub fn parse_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn clamp_u32(n: i64) -> u32 {
    n.clamp(0, u32::MAX as i64) as u32
}

struct LenientNumber;

impl<'de> Visitor<'de> for LenientNumber {
    type Value = u32;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number, a numeric string or null")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u32, E> {
        Ok(v.min(u32::MAX as u64) as u32)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u32, E> {
        Ok(clamp_u32(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<u32, E> {
        if v.is_finite() {
            Ok(clamp_u32(v.trunc() as i64))
        } else {
            Ok(0)
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u32, E> {
        Ok(parse_int(v).map(clamp_u32).unwrap_or(0))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<u32, E> {
        Ok(0)
    }

    fn visit_unit<E: de::Error>(self) -> Result<u32, E> {
        Ok(0)
    }

    fn visit_none<E: de::Error>(self) -> Result<u32, E> {
        Ok(0)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<u32, D::Error> {
        d.deserialize_any(LenientNumber)
    }
}

/// `deserialize_with` target for integer fields.
pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    d.deserialize_any(LenientNumber)
}

struct LenientText;

impl<'de> Visitor<'de> for LenientText {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string, a number or null")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_unit<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<String, D::Error> {
        d.deserialize_any(LenientText)
    }
}

/// `deserialize_with` target for required string fields.
pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    d.deserialize_any(LenientText)
}

/// Like [`text`], but `null` and blank strings become `None`.
pub fn optional_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = d.deserialize_any(LenientText)?;
    Ok(if value.trim().is_empty() { None } else { Some(value) })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "number")]
        n: u32,
        #[serde(default, deserialize_with = "text")]
        s: String,
        #[serde(default, deserialize_with = "optional_text")]
        o: Option<String>,
    }

    fn probe(json: &str) -> Probe {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parse_int_reads_the_leading_digits() {
        assert_eq!(parse_int("72"), Some(72));
        assert_eq!(parse_int(" 5 min"), Some(5));
        assert_eq!(parse_int("-3"), Some(-3));
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("abc"), None);
    }

    #[test]
    fn numbers_coerce_instead_of_failing() {
        assert_eq!(probe(r#"{"n": 7}"#).n, 7);
        assert_eq!(probe(r#"{"n": null}"#).n, 0);
        assert_eq!(probe(r#"{"n": "8"}"#).n, 8);
        assert_eq!(probe(r#"{"n": ""}"#).n, 0);
        assert_eq!(probe(r#"{"n": 6.9}"#).n, 6);
        assert_eq!(probe(r#"{"n": -4}"#).n, 0);
    }

    #[test]
    fn missing_number_key_is_still_an_error() {
        assert!(serde_json::from_str::<Probe>(r#"{}"#).is_err());
    }

    #[test]
    fn text_fields_accept_null_and_numbers() {
        let p = probe(r#"{"n": 1, "s": null, "o": "  "}"#);
        assert_eq!(p.s, "");
        assert_eq!(p.o, None);
        assert_eq!(probe(r#"{"n": 1, "s": 120}"#).s, "120");
        assert_eq!(probe(r#"{"n": 1, "o": "calm"}"#).o.as_deref(), Some("calm"));
    }
}
