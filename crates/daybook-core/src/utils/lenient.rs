//! Deserializers for server fields whose JSON type drifts between endpoints.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

/// Accept `12.5`, `"12.5"`, `null` or a missing field.
///
/// Decimal columns come back as strings from some endpoints and as numbers
/// from others. Unparseable strings become `None`.
pub fn option_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<NumberOrString> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(NumberOrString::Number(n)) => Some(n),
        Some(NumberOrString::Text(s)) => s.trim().replace(',', "").parse().ok(),
        None => None,
    })
}
