//! Defines the physical quantities that lag features are built from, and the naming
//! scheme the training pipeline used for those features.

use crate::types::observation::Observation;
use std::fmt;

/// A tracked physical quantity of an [`Observation`].
///
/// Each quantity owns the prefix the training pipeline used when it named the
/// lagged columns (`Temp_lag_1`, `Umi_lag_24`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// Air temperature.
    Temperature,
    /// Relative humidity.
    Humidity,
    /// Wind speed.
    WindSpeed,
    /// Solar radiation.
    Radiation,
}

impl Quantity {
    /// All quantities, in the order features are enumerated for each lag.
    pub const ALL: [Quantity; 4] = [
        Quantity::Temperature,
        Quantity::Humidity,
        Quantity::WindSpeed,
        Quantity::Radiation,
    ];

    pub fn feature_prefix(&self) -> &'static str {
        match self {
            Quantity::Temperature => "Temp",
            Quantity::Humidity => "Umi",
            Quantity::WindSpeed => "Vento",
            Quantity::Radiation => "Rad",
        }
    }

    /// Name of the feature holding this quantity `lag` sampling intervals back.
    pub fn lag_feature_name(&self, lag: u32) -> String {
        format!("{}_lag_{}", self.feature_prefix(), lag)
    }

    /// Reads this quantity from an observation.
    pub fn value(&self, observation: &Observation) -> f64 {
        match self {
            Quantity::Temperature => observation.temperature,
            Quantity::Humidity => observation.humidity,
            Quantity::WindSpeed => observation.wind_speed,
            Quantity::Radiation => observation.radiation,
        }
    }
}

/// Formats a `Quantity` using its feature prefix.
///
/// # Examples
///
/// ```
/// use station_forecast::Quantity;
///
/// assert_eq!(Quantity::Humidity.to_string(), "Umi");
/// assert_eq!(Quantity::Temperature.lag_feature_name(24), "Temp_lag_24");
/// ```
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.feature_prefix())
    }
}
