//! Calibration configuration for the resolution pipeline.
//!
//! All numeric thresholds, spatial windows and strategy weights live in one
//! explicit immutable value passed into each resolver, so a document type
//! can be recalibrated without touching resolver code and tests can pin
//! exact constants. Nothing reads ambient or global state.

use serde::{Deserialize, Serialize};

use crate::error::{ResolveError, Result};
use crate::schema::StrategyKind;

/// Precedence weights applied to a winning candidate's confidence when
/// deriving the resolved field's confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyWeights {
    /// Weight for primary extractor wins.
    pub primary: f32,
    /// Weight for checkbox fallback wins.
    pub checkbox_fallback: f32,
    /// Weight for text fallback wins.
    pub text_fallback: f32,
    /// Weight for assisted override wins.
    pub assisted_override: f32,
}

impl StrategyWeights {
    /// The weight for the given strategy.
    #[inline]
    #[must_use = "strategy weight is returned but not used"]
    pub const fn weight(&self, strategy: StrategyKind) -> f32 {
        match strategy {
            StrategyKind::Primary => self.primary,
            StrategyKind::CheckboxFallback => self.checkbox_fallback,
            StrategyKind::TextFallback => self.text_fallback,
            StrategyKind::AssistedOverride => self.assisted_override,
        }
    }
}

impl Default for StrategyWeights {
    #[inline]
    fn default() -> Self {
        Self {
            primary: 1.0,
            checkbox_fallback: 0.95,
            text_fallback: 0.90,
            assisted_override: 0.75,
        }
    }
}

/// Immutable calibration values shared by every resolver in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Default primary acceptance threshold; a `FieldSpec` may override it.
    pub acceptance_threshold: f32,
    /// Ink fraction at or above which a checkbox reads checked.
    pub checked_min: f32,
    /// Ink fraction at or below which a checkbox reads unchecked.
    pub unchecked_max: f32,
    /// Grayscale cutoff for binarization; luma below this counts as ink.
    pub ink_luma_cutoff: u8,
    /// Maximum horizontal gap (pixels) between an anchor label and a
    /// same-line value element.
    pub right_gap_limit: f32,
    /// Maximum vertical gap (pixels) between an anchor label and a value
    /// element on the following lines.
    pub below_gap_limit: f32,
    /// Candidates below this confidence are dropped by the text fallback.
    pub text_confidence_floor: f32,
    /// Confidence ceiling for document-wide scan hits; always below a
    /// direct anchored hit.
    pub scan_confidence_cap: f32,
    /// Whether the Part 5 checkbox assist participates at all.
    pub assist_enabled: bool,
    /// Fixed confidence of an assisted override candidate.
    pub assist_confidence: f32,
    /// Strategy precedence weights.
    pub weights: StrategyWeights,
}

impl CalibrationConfig {
    /// Start building a configuration from the defaults.
    #[inline]
    #[must_use = "returns a new builder with default settings"]
    pub fn builder() -> CalibrationConfigBuilder {
        CalibrationConfigBuilder::new()
    }
}

impl Default for CalibrationConfig {
    #[inline]
    fn default() -> Self {
        CalibrationConfigBuilder::new()
            .build()
            .expect("default calibration is valid")
    }
}

/// Builder for [`CalibrationConfig`].
///
/// Defaults are calibrated against the standard 200-dpi Form 32 rasters:
/// a pen mark in a 22 px checkbox covers roughly 20-45% of the region,
/// an empty box outline roughly 8-10%.
// Boolean field is an on/off configuration option
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationConfigBuilder {
    acceptance_threshold: f32,
    checked_min: f32,
    unchecked_max: f32,
    ink_luma_cutoff: u8,
    right_gap_limit: f32,
    below_gap_limit: f32,
    text_confidence_floor: f32,
    scan_confidence_cap: f32,
    assist_enabled: bool,
    assist_confidence: f32,
    weights: StrategyWeights,
}

impl Default for CalibrationConfigBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl CalibrationConfigBuilder {
    /// Create a builder with the production defaults.
    #[inline]
    #[must_use = "returns a new builder with default settings"]
    pub fn new() -> Self {
        Self {
            acceptance_threshold: 0.75,
            checked_min: 0.30,
            unchecked_max: 0.12,
            ink_luma_cutoff: 128,
            right_gap_limit: 240.0,
            below_gap_limit: 48.0,
            text_confidence_floor: 0.35,
            scan_confidence_cap: 0.60,
            assist_enabled: true,
            assist_confidence: 0.50,
            weights: StrategyWeights::default(),
        }
    }

    /// Default primary acceptance threshold.
    #[inline]
    #[must_use = "builder is returned but not used"]
    pub const fn acceptance_threshold(mut self, value: f32) -> Self {
        self.acceptance_threshold = value;
        self
    }

    /// Checkbox ink thresholds: checked at/above `checked_min`, unchecked
    /// at/below `unchecked_max`.
    #[inline]
    #[must_use = "builder is returned but not used"]
    pub const fn checkbox_thresholds(mut self, checked_min: f32, unchecked_max: f32) -> Self {
        self.checked_min = checked_min;
        self.unchecked_max = unchecked_max;
        self
    }

    /// Grayscale binarization cutoff.
    #[inline]
    #[must_use = "builder is returned but not used"]
    pub const fn ink_luma_cutoff(mut self, value: u8) -> Self {
        self.ink_luma_cutoff = value;
        self
    }

    /// Spatial window limits for the anchored text search, in pixels.
    #[inline]
    #[must_use = "builder is returned but not used"]
    pub const fn window_limits(mut self, right_gap: f32, below_gap: f32) -> Self {
        self.right_gap_limit = right_gap;
        self.below_gap_limit = below_gap;
        self
    }

    /// Minimum confidence for text fallback candidates.
    #[inline]
    #[must_use = "builder is returned but not used"]
    pub const fn text_confidence_floor(mut self, value: f32) -> Self {
        self.text_confidence_floor = value;
        self
    }

    /// Confidence ceiling for document-wide scan hits.
    #[inline]
    #[must_use = "builder is returned but not used"]
    pub const fn scan_confidence_cap(mut self, value: f32) -> Self {
        self.scan_confidence_cap = value;
        self
    }

    /// Enable or disable the Part 5 checkbox assist end-to-end.
    #[inline]
    #[must_use = "builder is returned but not used"]
    pub const fn assist_enabled(mut self, value: bool) -> Self {
        self.assist_enabled = value;
        self
    }

    /// Fixed confidence of assisted override candidates.
    #[inline]
    #[must_use = "builder is returned but not used"]
    pub const fn assist_confidence(mut self, value: f32) -> Self {
        self.assist_confidence = value;
        self
    }

    /// Strategy precedence weights.
    #[inline]
    #[must_use = "builder is returned but not used"]
    pub const fn weights(mut self, weights: StrategyWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidCalibration`] when a fraction is
    /// outside `[0, 1]` or the checkbox thresholds do not leave an
    /// ambiguous band (`checked_min` must exceed `unchecked_max`).
    pub fn build(self) -> Result<CalibrationConfig> {
        let fractions = [
            ("acceptance_threshold", self.acceptance_threshold),
            ("checked_min", self.checked_min),
            ("unchecked_max", self.unchecked_max),
            ("text_confidence_floor", self.text_confidence_floor),
            ("scan_confidence_cap", self.scan_confidence_cap),
            ("assist_confidence", self.assist_confidence),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ResolveError::InvalidCalibration(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.checked_min <= self.unchecked_max {
            return Err(ResolveError::InvalidCalibration(format!(
                "checked_min ({}) must exceed unchecked_max ({})",
                self.checked_min, self.unchecked_max
            )));
        }
        if self.right_gap_limit <= 0.0 || self.below_gap_limit <= 0.0 {
            return Err(ResolveError::InvalidCalibration(
                "window gap limits must be positive".to_string(),
            ));
        }

        Ok(CalibrationConfig {
            acceptance_threshold: self.acceptance_threshold,
            checked_min: self.checked_min,
            unchecked_max: self.unchecked_max,
            ink_luma_cutoff: self.ink_luma_cutoff,
            right_gap_limit: self.right_gap_limit,
            below_gap_limit: self.below_gap_limit,
            text_confidence_floor: self.text_confidence_floor,
            scan_confidence_cap: self.scan_confidence_cap,
            assist_enabled: self.assist_enabled,
            assist_confidence: self.assist_confidence,
            weights: self.weights,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CalibrationConfig::default();
        assert!(config.checked_min > config.unchecked_max);
        assert!(config.assist_enabled);
        assert_eq!(config.weights.weight(StrategyKind::Primary), 1.0);
    }

    #[test]
    fn test_builder_overrides() {
        let config = CalibrationConfig::builder()
            .checkbox_thresholds(0.60, 0.15)
            .assist_enabled(false)
            .acceptance_threshold(0.9)
            .build()
            .expect("valid config");
        assert_eq!(config.checked_min, 0.60);
        assert_eq!(config.unchecked_max, 0.15);
        assert!(!config.assist_enabled);
        assert_eq!(config.acceptance_threshold, 0.9);
    }

    #[test]
    fn test_builder_rejects_inverted_thresholds() {
        let err = CalibrationConfig::builder()
            .checkbox_thresholds(0.10, 0.50)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("checked_min"));
    }

    #[test]
    fn test_builder_rejects_out_of_range_fractions() {
        let err = CalibrationConfig::builder()
            .acceptance_threshold(1.5)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("acceptance_threshold"));
    }

    #[test]
    fn test_tie_break_weights_follow_strategy_order() {
        let weights = StrategyWeights::default();
        assert!(weights.weight(StrategyKind::Primary) >= weights.weight(StrategyKind::CheckboxFallback));
        assert!(
            weights.weight(StrategyKind::CheckboxFallback)
                >= weights.weight(StrategyKind::TextFallback)
        );
        assert!(
            weights.weight(StrategyKind::TextFallback)
                >= weights.weight(StrategyKind::AssistedOverride)
        );
    }
}
