//! Scalar field values and their decoding from XML text

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());
static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d.]+$").unwrap());

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

/// A scalar value of an entity field
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent or empty element
    #[default]
    Null,
    /// Text that is not numeric and not a recognised timestamp
    String(String),
    /// Digits only
    Int(i64),
    /// Digits with a decimal point
    Float(f64),
    /// Timestamp of a `*datetime*` field
    DateTime(DateTime<Utc>),
}

impl Value {
    /// Decode the text of a leaf element
    ///
    /// Integers are tried before decimals, so `"0"` stays an integer even for
    /// amounts. Timestamps are only attempted when the field name mentions
    /// "datetime"; text that does not parse is kept as is.
    pub fn decode(field_name: &str, text: Option<&str>) -> Self {
        let text = match text {
            Some(text) if !text.is_empty() => text,
            _ => return Value::Null,
        };

        if INTEGER.is_match(text) {
            if let Ok(i) = text.parse() {
                return Value::Int(i);
            }
        } else if DECIMAL.is_match(text) {
            if let Ok(f) = text.parse() {
                return Value::Float(f);
            }
        } else if field_name.to_lowercase().contains("datetime") {
            if let Some(dt) = parse_datetime(text) {
                return Value::DateTime(dt);
            }
        }

        Value::String(text.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Float value, widening integers
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Text sent in a form field
    pub fn to_wire_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::DateTime(dt) => dt.to_rfc3339(),
            other => other.to_string(),
        }
    }
}

/// RFC 3339, or a naive ISO-8601 timestamp taken as UTC
pub fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "(null)"),
            Value::String(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_numeric_inference() {
        assert_eq!(Value::decode("trial_days", Some("0")), Value::Int(0));
        assert_eq!(Value::decode("recurring_charge_amount", Some("20.0")), Value::Float(20.0));
        assert_eq!(Value::decode("recurring_charge_amount", Some("0.00")), Value::Float(0.0));
        assert_eq!(Value::decode("cc_zip", Some("1234a")), Value::String("1234a".to_string()));
        assert_eq!(Value::decode("balance", Some("-5")), Value::String("-5".to_string()));
        assert_eq!(Value::decode("version", Some("1.2.3")), Value::String("1.2.3".to_string()));
    }

    #[test]
    fn test_empty_text_is_null() {
        assert_eq!(Value::decode("notes", None), Value::Null);
        assert_eq!(Value::decode("notes", Some("")), Value::Null);
    }

    #[test]
    fn test_datetime_only_for_datetime_fields() {
        let expected = Utc.with_ymd_and_hms(2011, 1, 7, 20, 46, 43).unwrap();
        assert_eq!(
            Value::decode("created_datetime", Some("2011-01-07T20:46:43+00:00")),
            Value::DateTime(expected)
        );
        assert_eq!(
            Value::decode("createdDatetime", Some("2011-01-07T20:46:43")),
            Value::DateTime(expected)
        );
        assert_eq!(
            Value::decode("description", Some("2011-01-07T20:46:43+00:00")),
            Value::String("2011-01-07T20:46:43+00:00".to_string())
        );
        assert_eq!(
            Value::decode("canceled_datetime", Some("not a date")),
            Value::String("not a date".to_string())
        );
    }

    #[test]
    fn test_wire_strings() {
        assert_eq!(Value::Null.to_wire_string(), "");
        assert_eq!(Value::from(42).to_wire_string(), "42");
        assert_eq!(Value::from("Test").to_wire_string(), "Test");
        let dt = Utc.with_ymd_and_hms(2011, 2, 10, 5, 45, 51).unwrap();
        assert_eq!(Value::from(dt).to_wire_string(), "2011-02-10T05:45:51+00:00");
    }

    #[test]
    fn test_float_widening() {
        assert_eq!(Value::Int(3).as_float(), Some(3.0));
        assert_eq!(Value::String("3".to_string()).as_float(), None);
        assert_eq!(Value::from(None::<String>), Value::Null);
    }
}
