use serde::Serialize;

use crate::error::Result;
use crate::pbf_reader::PbfReader;

/// A decoded property value.
///
/// Numbers keep their canonical decimal text instead of a float so they
/// re-serialize byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Null,
    String(String),
    Numeric(String),
    Boolean(bool),
}

impl Value {
    /// Serialized text of the value.
    pub fn as_str(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::String(s) | Value::Numeric(s) => s,
            Value::Boolean(true) => "true",
            Value::Boolean(false) => "false",
        }
    }

    /// JSON rendering. Numbers that no JSON number reproduces exactly, such
    /// as integers beyond 64 bits or non-finite doubles, stay strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Numeric(s) => exact_number(s)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(s.clone())),
            Value::Boolean(b) => serde_json::Value::Bool(*b),
        }
    }
}

fn exact_number(s: &str) -> Option<serde_json::Number> {
    if let Ok(n) = s.parse::<i64>() {
        return Some(n.into());
    }
    if let Ok(n) = s.parse::<u64>() {
        return Some(n.into());
    }
    let n = s.parse::<f64>().ok()?;
    if format_double(n) != s {
        return None;
    }
    serde_json::Number::from_f64(n)
}

/// Decode one property value message. The last recognized field wins.
pub fn read_value(pbf: &mut PbfReader) -> Result<Value> {
    let mut value = Value::Null;

    while pbf.next_field()? {
        match pbf.tag() {
            1 => value = Value::String(pbf.get_string()?),
            2 => value = Value::Numeric(format_double(pbf.get_double()?)),
            3 => value = Value::Numeric(pbf.get_uint64()?.to_string()),
            4 => value = Value::Numeric((-i128::from(pbf.get_uint64()?)).to_string()),
            5 => value = Value::Boolean(pbf.get_bool()?),
            // stringified JSON, passed through untouched
            6 => value = Value::String(pbf.get_string()?),
            _ => pbf.skip()?,
        }
    }

    Ok(value)
}

/// Shortest round-trip decimal text for a double.
///
/// Positional notation while the decimal exponent stays within `(-6, 21]`,
/// otherwise `d.ddde±x` without a `+` sign. Integers print without `.0`.
pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let mut out = String::new();
    if value < 0.0 {
        out.push('-');
    }

    // `{:e}` yields the shortest digits that round-trip, e.g. "1.234e-3"
    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);

    let length = digits.len() as i32;
    // 10^(kk-1) <= value < 10^kk
    let kk = exponent + 1;

    if length <= kk && kk <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat('0').take((kk - length) as usize));
    } else if 0 < kk && kk <= 21 {
        let (int_part, frac_part) = digits.split_at(kk as usize);
        out.push_str(int_part);
        out.push('.');
        out.push_str(frac_part);
    } else if -6 < kk && kk <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-kk) as usize));
        out.push_str(&digits);
    } else if length == 1 {
        out.push_str(&digits);
        out.push('e');
        out.push_str(&(kk - 1).to_string());
    } else {
        out.push_str(&digits[..1]);
        out.push('.');
        out.push_str(&digits[1..]);
        out.push('e');
        out.push_str(&(kk - 1).to_string());
    }

    out
}
