use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn half_width(&self) -> f64 {
        (self.upper - self.lower) / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    pub fn is_degenerate(&self) -> bool {
        self.lower == self.upper
    }
}

/// Two-sided critical value, e.g. ~1.96 for 0.95.
pub fn z_for_confidence(confidence: f64) -> Result<f64> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(SimError::InvalidConfidence(confidence));
    }
    Ok(Normal::standard().inverse_cdf(0.5 + confidence / 2.0))
}

/// Symmetric normal-approximation interval `loc ± z * scale`. A zero scale
/// collapses to the point `[loc, loc]`.
pub fn normal_interval(confidence: f64, loc: f64, scale: f64) -> Result<ConfidenceInterval> {
    let z = z_for_confidence(confidence)?;
    if scale == 0.0 {
        return Ok(ConfidenceInterval { lower: loc, upper: loc });
    }
    let half = z * scale;
    Ok(ConfidenceInterval {
        lower: loc - half,
        upper: loc + half,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn z_for_95_percent() {
        let z = z_for_confidence(0.95).unwrap();
        assert!((z - 1.959_963_984_540_054).abs() < 1e-6);
    }

    #[test]
    fn interval_is_symmetric() {
        let ci = normal_interval(0.95, 10.0, 0.5).unwrap();
        assert!(((10.0 - ci.lower) - (ci.upper - 10.0)).abs() < 1e-12);
        assert!((ci.half_width() - 0.5 * 1.959_963_984_540_054).abs() < 1e-6);
        assert!(ci.contains(10.0));
    }

    #[test]
    fn zero_scale_is_a_point() {
        let ci = normal_interval(0.95, 0.75, 0.0).unwrap();
        assert_eq!(ci.lower, 0.75);
        assert_eq!(ci.upper, 0.75);
        assert!(ci.is_degenerate());
        assert!(ci.contains(0.75));
    }

    #[test]
    fn wider_confidence_widens_interval() {
        let narrow = normal_interval(0.90, 0.0, 1.0).unwrap();
        let wide = normal_interval(0.99, 0.0, 1.0).unwrap();
        assert!(wide.half_width() > narrow.half_width());
    }

    #[test]
    fn rejects_out_of_range_confidence() {
        assert_eq!(normal_interval(1.0, 0.0, 1.0), Err(SimError::InvalidConfidence(1.0)));
    }
}
