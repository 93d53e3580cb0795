//! Rebuilds the lagged feature vector a trained model expects from the most recent
//! persisted observations.
//!
//! The layout (which quantity at which lag lands in which slot) is resolved once per
//! artifact. Per request the reconstructor only indexes into the window, so a feature
//! name the model expects but the reconstructor cannot produce is caught when the
//! artifact is loaded, not halfway through a forecast.

use crate::forecast::error::ReconstructError;
use crate::forecast::features::FeatureVector;
use crate::types::observation::Observation;
use crate::types::quantity::Quantity;
use std::collections::HashMap;
use std::f64::consts::PI;

pub const HOUR_SIN: &str = "hour_sin";
pub const HOUR_COS: &str = "hour_cos";

#[derive(Debug, Clone, Copy, PartialEq)]
enum FeatureSource {
    /// `quantity` observed `lag` sampling intervals before the newest observation.
    Lag { quantity: Quantity, lag: u32 },
    HourSin,
    HourCos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureReconstructor {
    layout: Vec<(String, FeatureSource)>,
    max_lag: u32,
}

impl FeatureReconstructor {
    /// Resolves `feature_order` against every `(quantity, lag)` pair of `lags` plus the
    /// two cyclic hour features.
    ///
    /// Repeated lags produce the same names; the later one wins, which is harmless
    /// because equal lags read the same observation.
    pub fn new(lags: &[u32], feature_order: &[String]) -> Result<Self, ReconstructError> {
        let max_lag = lags
            .iter()
            .copied()
            .max()
            .ok_or(ReconstructError::EmptyLagSet)?;

        let mut known: HashMap<String, FeatureSource> = HashMap::new();
        for &lag in lags {
            for quantity in Quantity::ALL {
                known.insert(
                    quantity.lag_feature_name(lag),
                    FeatureSource::Lag { quantity, lag },
                );
            }
        }
        known.insert(HOUR_SIN.to_string(), FeatureSource::HourSin);
        known.insert(HOUR_COS.to_string(), FeatureSource::HourCos);

        let layout = feature_order
            .iter()
            .map(|name| match known.get(name) {
                Some(source) => Ok((name.clone(), *source)),
                None => Err(ReconstructError::FeatureMismatch {
                    feature: name.clone(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { layout, max_lag })
    }

    /// Minimum window length: `max(lags) + 1`.
    pub fn required_history(&self) -> usize {
        self.max_lag as usize + 1
    }

    /// Builds the feature vector for `window` (oldest first) at wall-clock `hour`.
    ///
    /// Lag `L` reads the observation at index `len - 1 - L`, i.e. `L` sampling
    /// intervals before the newest one. Missing values are NaN and stay NaN.
    pub fn reconstruct(
        &self,
        window: &[Observation],
        hour: u32,
    ) -> Result<FeatureVector, ReconstructError> {
        if hour > 23 {
            return Err(ReconstructError::InvalidHour(hour));
        }
        let required = self.required_history();
        if window.len() < required {
            return Err(ReconstructError::InsufficientHistory {
                required,
                available: window.len(),
            });
        }

        let newest = window.len() - 1;
        let (hour_sin, hour_cos) = cyclic_hour(hour);
        let entries = self
            .layout
            .iter()
            .map(|(name, source)| {
                let value = match source {
                    FeatureSource::Lag { quantity, lag } => {
                        quantity.value(&window[newest - *lag as usize])
                    }
                    FeatureSource::HourSin => hour_sin,
                    FeatureSource::HourCos => hour_cos,
                };
                (name.clone(), value)
            })
            .collect();

        Ok(FeatureVector::from_entries(entries))
    }
}

/// `(sin, cos)` of the hour on the 24-hour circle.
pub fn cyclic_hour(hour: u32) -> (f64, f64) {
    let angle = 2.0 * PI * f64::from(hour) / 24.0;
    (angle.sin(), angle.cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{hourly_window, standard_feature_order, STANDARD_LAGS};

    fn reconstructor(lags: &[u32]) -> FeatureReconstructor {
        FeatureReconstructor::new(lags, &standard_feature_order(lags)).unwrap()
    }

    fn temperatures(count: usize) -> Vec<f64> {
        (0..count).map(|i| 20.0 + i as f64 * 0.1).collect()
    }

    #[test]
    fn test_end_to_end_window() -> Result<(), ReconstructError> {
        let window = hourly_window(&temperatures(25));
        let features = reconstructor(&STANDARD_LAGS).reconstruct(&window, 14)?;

        assert_eq!(features.len(), 26);
        assert_eq!(features.get("Temp_lag_1"), Some(window[23].temperature));
        assert!((features.get("Temp_lag_1").unwrap() - 22.3).abs() < 1e-9);
        assert_eq!(features.get("Temp_lag_24"), Some(20.0));
        assert!((features.get("hour_sin").unwrap() - -0.5).abs() < 1e-9);
        assert!((features.get("hour_cos").unwrap() - -0.8660254037844386).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_names_match_feature_order() -> Result<(), ReconstructError> {
        for lags in [vec![1], vec![2, 5], STANDARD_LAGS.to_vec()] {
            let mut order = standard_feature_order(&lags);
            order.reverse();
            let reconstructor = FeatureReconstructor::new(&lags, &order)?;
            let max_lag = *lags.iter().max().unwrap() as usize;
            for extra in [0, 3] {
                let window = hourly_window(&temperatures(max_lag + 1 + extra));
                let features = reconstructor.reconstruct(&window, 7)?;
                assert_eq!(
                    features.names().collect::<Vec<_>>(),
                    order.iter().map(String::as_str).collect::<Vec<_>>()
                );
            }
        }
        Ok(())
    }

    #[test]
    fn test_minimum_window_boundary() {
        let reconstructor = reconstructor(&STANDARD_LAGS);
        assert_eq!(reconstructor.required_history(), 25);
        assert!(reconstructor
            .reconstruct(&hourly_window(&temperatures(25)), 0)
            .is_ok());
        assert_eq!(
            reconstructor.reconstruct(&hourly_window(&temperatures(24)), 0),
            Err(ReconstructError::InsufficientHistory {
                required: 25,
                available: 24
            })
        );
    }

    #[test]
    fn test_longer_window_reads_from_newest() -> Result<(), ReconstructError> {
        let window = hourly_window(&temperatures(30));
        let features = reconstructor(&STANDARD_LAGS).reconstruct(&window, 3)?;
        assert_eq!(features.get("Temp_lag_24"), Some(window[5].temperature));
        assert_eq!(features.get("Umi_lag_6"), Some(window[23].humidity));
        Ok(())
    }

    #[test]
    fn test_cyclic_hour_on_unit_circle() {
        for hour in 0..24 {
            let (s, c) = cyclic_hour(hour);
            assert!((s * s + c * c - 1.0).abs() < 1e-12, "hour {hour}");
        }
        assert_eq!(cyclic_hour(0), (0.0, 1.0));
    }

    #[test]
    fn test_is_deterministic() -> Result<(), ReconstructError> {
        let mut window = hourly_window(&temperatures(25));
        window[18].radiation = f64::NAN;
        let reconstructor = reconstructor(&STANDARD_LAGS);
        let first = reconstructor.reconstruct(&window, 22)?;
        let second = reconstructor.reconstruct(&window, 22)?;
        let bits = |v: &FeatureVector| v.values().iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first), bits(&second));
        assert!(first.get("Rad_lag_6").is_some_and(f64::is_nan));
        Ok(())
    }

    #[test]
    fn test_nan_propagates() -> Result<(), ReconstructError> {
        let mut window = hourly_window(&temperatures(25));
        window[23].humidity = f64::NAN;
        let features = reconstructor(&STANDARD_LAGS).reconstruct(&window, 5)?;
        assert!(features.get("Umi_lag_1").is_some_and(f64::is_nan));
        assert!(features.get("Umi_lag_2").is_some_and(f64::is_finite));
        Ok(())
    }

    #[test]
    fn test_duplicate_lags_collapse() -> Result<(), ReconstructError> {
        let order = standard_feature_order(&[1, 3]);
        let reconstructor = FeatureReconstructor::new(&[1, 3, 3, 1], &order)?;
        assert_eq!(reconstructor.required_history(), 4);
        let features = reconstructor.reconstruct(&hourly_window(&temperatures(4)), 9)?;
        assert_eq!(features.len(), order.len());
        Ok(())
    }

    #[test]
    fn test_unknown_feature_is_a_mismatch() {
        let mut order = standard_feature_order(&[1, 2]);
        order.push("Temp_lag_48".to_string());
        assert_eq!(
            FeatureReconstructor::new(&[1, 2], &order),
            Err(ReconstructError::FeatureMismatch {
                feature: "Temp_lag_48".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_hour() {
        let window = hourly_window(&temperatures(25));
        assert_eq!(
            reconstructor(&STANDARD_LAGS).reconstruct(&window, 24),
            Err(ReconstructError::InvalidHour(24))
        );
    }
}
