pub mod observation;
pub mod quantity;

use serde::{Deserialize, Deserializer};

/// Reads a JSON `null` back as `NaN`, the inverse of how serde_json writes a
/// non-finite float.
pub(crate) fn nan_if_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}
