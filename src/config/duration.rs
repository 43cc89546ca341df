//! Serde helper for human duration strings ("500ms", "2s", "1m").

use serde::{Deserialize, Deserializer};
use std::time::Duration;

const UNITS: &[(&str, f64)] = &[
    ("ms", 1e-3),
    ("s", 1.0),
    ("m", 60.0),
    ("h", 3600.0),
];

/// Deserializes a duration string; a bare number is read as seconds.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Seconds(f64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Text(s) => parse_duration(&s).map_err(serde::de::Error::custom),
        Raw::Seconds(n) if n >= 0.0 => Ok(Duration::from_secs_f64(n)),
        Raw::Seconds(n) => Err(serde::de::Error::custom(format!(
            "duration must not be negative: {}",
            n
        ))),
    }
}

pub(crate) fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let split = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);

    if number.is_empty() {
        return Err(format!("missing duration value: {:?}", s));
    }
    let value: f64 = number
        .parse()
        .map_err(|_| format!("invalid duration value: {}", number))?;

    let unit = unit.trim();
    let scale = if unit.is_empty() {
        1.0
    } else {
        UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| format!("unknown duration unit: {}", unit))?
    };

    Ok(Duration::from_secs_f64(value * scale))
}
