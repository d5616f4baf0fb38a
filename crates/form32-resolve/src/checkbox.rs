//! Checkbox resolver.
//!
//! Reads a calibrated box region out of a rendered page raster and decides
//! checked / unchecked / ambiguous from the fraction of ink pixels inside
//! it. The page carrying the region is located by section classification;
//! the region geometry itself is fixed template calibration.
//!
//! A region that does not fit inside the page raster is a template/geometry
//! mismatch: fatal for that field only, logged with the offending
//! coordinates so the template can be repaired.

use image::{DynamicImage, GenericImageView};
use imageproc::contrast::{threshold, ThresholdType};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use form32_core::config::CalibrationConfig;
use form32_core::geometry::BoundingBox;
use form32_core::page::{PageInput, PageMap};
use form32_core::schema::{CalibratedRegion, FieldSpec, StrategyKind};
use form32_core::value::{Candidate, CheckboxState, FieldValue, UnresolvedReason};

/// One visual read of a checkbox region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckboxRead {
    /// Decided state.
    pub state: CheckboxState,
    /// Measured ink fraction in `[0, 1]`.
    pub ink_fraction: f32,
    /// Normalized distance from the nearest threshold; closer to a
    /// threshold means lower confidence.
    pub confidence: f32,
}

/// Outcome of checkbox resolution for one field.
///
/// `visual` is kept separately from the candidate list so the assist
/// post-pass can tell an ambiguous read from a missing one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckboxResolution {
    /// Candidates to feed into fusion (at most the one visual read).
    pub candidates: Vec<Candidate>,
    /// The direct visual read, when one was possible.
    pub visual: Option<CheckboxRead>,
    /// A calibration failure that prevented any read.
    pub calibration_failure: Option<UnresolvedReason>,
}

/// Resolver reading checkbox state from calibrated page regions.
#[derive(Debug, Clone, Copy)]
pub struct CheckboxResolver<'a> {
    config: &'a CalibrationConfig,
}

impl<'a> CheckboxResolver<'a> {
    /// Create a resolver borrowing the run's calibration.
    #[inline]
    #[must_use = "resolver is created but not used"]
    pub const fn new(config: &'a CalibrationConfig) -> Self {
        Self { config }
    }

    /// Read one calibrated region out of a page raster.
    ///
    /// # Errors
    ///
    /// Returns [`UnresolvedReason::CalibrationError`] when the region does
    /// not fit inside the raster.
    pub fn read_region(
        &self,
        image: &DynamicImage,
        region: &CalibratedRegion,
    ) -> Result<CheckboxRead, UnresolvedReason> {
        let (width, height) = image.dimensions();
        if region.x.saturating_add(region.w) > width || region.y.saturating_add(region.h) > height {
            error!(
                "checkbox region outside page raster: [{region}] vs {width}x{height} \
                 (template/geometry mismatch)"
            );
            return Err(UnresolvedReason::CalibrationError {
                region: *region,
                image_width: width,
                image_height: height,
            });
        }

        let crop = image
            .crop_imm(region.x, region.y, region.w, region.h)
            .to_luma8();
        let binary = threshold(&crop, self.config.ink_luma_cutoff, ThresholdType::BinaryInverted);

        let total = binary.len() as f32;
        let ink = binary.iter().filter(|&&px| px == u8::MAX).count() as f32;
        let ink_fraction = if total > 0.0 { ink / total } else { 0.0 };

        Ok(self.classify(ink_fraction))
    }

    /// Map an ink fraction to a tri-state read with threshold-distance
    /// confidence.
    #[must_use = "checkbox read is computed but not used"]
    pub fn classify(&self, ink_fraction: f32) -> CheckboxRead {
        let checked_min = self.config.checked_min;
        let unchecked_max = self.config.unchecked_max;

        let (state, confidence) = if ink_fraction >= checked_min {
            let headroom = 1.0 - checked_min;
            let conf = if headroom > 0.0 {
                (ink_fraction - checked_min) / headroom
            } else {
                1.0
            };
            (CheckboxState::Checked, conf)
        } else if ink_fraction <= unchecked_max {
            (
                CheckboxState::Unchecked,
                (unchecked_max - ink_fraction) / unchecked_max,
            )
        } else {
            let half_band = (checked_min - unchecked_max) / 2.0;
            let nearest = (ink_fraction - unchecked_max).min(checked_min - ink_fraction);
            (CheckboxState::Ambiguous, nearest / half_band)
        };

        CheckboxRead {
            state,
            ink_fraction,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Resolve one checkbox field against the document's pages.
    ///
    /// Produces no candidate (rather than a guessed `false`) when the
    /// field's section page is absent from the document.
    #[must_use = "checkbox resolution is produced but not used"]
    pub fn resolve(
        &self,
        spec: &FieldSpec,
        pages: &[PageInput],
        page_map: &PageMap,
    ) -> CheckboxResolution {
        let mut resolution = CheckboxResolution::default();

        if !spec.allows(StrategyKind::CheckboxFallback) {
            return resolution;
        }
        let Some(region) = &spec.region else {
            return resolution;
        };
        let Some(pos) = page_map.page_for(region.page) else {
            warn!("{}: no {} page in document, no visual read", spec.id, region.page);
            return resolution;
        };
        let page = &pages[pos];

        match self.read_region(&page.image, region) {
            Ok(read) => {
                debug!(
                    "{}: ink {:.3} -> {} (conf {:.2})",
                    spec.id, read.ink_fraction, read.state, read.confidence
                );
                let bbox = BoundingBox::new(
                    region.x as f32,
                    region.y as f32,
                    (region.x + region.w) as f32,
                    (region.y + region.h) as f32,
                );
                resolution.candidates.push(
                    Candidate::new(
                        FieldValue::Checkbox(read.state),
                        StrategyKind::CheckboxFallback,
                        read.confidence,
                    )
                    .with_source(page.index, bbox),
                );
                resolution.visual = Some(read);
            }
            Err(reason) => {
                resolution.calibration_failure = Some(reason);
            }
        }
        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use form32_core::page::{PageKind, TextElement};
    use form32_core::schema::{FieldId, FieldKind};
    use image::GrayImage;

    fn config_with(checked_min: f32, unchecked_max: f32) -> CalibrationConfig {
        CalibrationConfig::builder()
            .checkbox_thresholds(checked_min, unchecked_max)
            .build()
            .expect("valid config")
    }

    /// A 100x100 white page whose top-left 20x20 region has `ink` black
    /// pixels.
    fn page_image(ink: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(100, 100, |x, y| {
            if y * 20 + x < ink && x < 20 && y < 20 {
                image::Luma([0u8])
            } else {
                image::Luma([255u8])
            }
        }))
    }

    fn region() -> CalibratedRegion {
        CalibratedRegion {
            page: PageKind::Part5Purpose,
            x: 0,
            y: 0,
            w: 20,
            h: 20,
        }
    }

    fn checkbox_spec() -> FieldSpec {
        FieldSpec {
            id: FieldId::from("purpose_box_c_checked"),
            kind: FieldKind::Checkbox,
            required: true,
            strategies: vec![StrategyKind::Primary, StrategyKind::CheckboxFallback],
            anchor: None,
            scan_patterns: vec![],
            section: PageKind::Part5Purpose,
            region: Some(region()),
            acceptance_threshold: None,
        }
    }

    #[test]
    fn test_fully_inked_region_reads_checked() {
        let config = config_with(0.30, 0.12);
        let resolver = CheckboxResolver::new(&config);
        let read = resolver
            .read_region(&page_image(400), &region())
            .expect("in bounds");
        assert_eq!(read.state, CheckboxState::Checked);
        assert!((read.ink_fraction - 1.0).abs() < 1e-6);
        assert!((read.confidence - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_blank_region_reads_unchecked() {
        let config = config_with(0.30, 0.12);
        let resolver = CheckboxResolver::new(&config);
        let read = resolver
            .read_region(&page_image(0), &region())
            .expect("in bounds");
        assert_eq!(read.state, CheckboxState::Unchecked);
        assert_eq!(read.ink_fraction, 0.0);
        assert!((read.confidence - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_two_percent_ink_against_wide_thresholds() {
        // 2% coverage against {checked >= 60%, unchecked <= 15%} resolves
        // unchecked with confidence from the distance to 15%.
        let config = config_with(0.60, 0.15);
        let resolver = CheckboxResolver::new(&config);
        let read = resolver
            .read_region(&page_image(8), &region())
            .expect("in bounds");
        assert_eq!(read.state, CheckboxState::Unchecked);
        assert!((read.ink_fraction - 0.02).abs() < 1e-6);
        let expected = (0.15 - 0.02) / 0.15;
        assert!((read.confidence - expected).abs() < 1e-4);
    }

    #[test]
    fn test_mid_band_reads_ambiguous() {
        let config = config_with(0.30, 0.12);
        let resolver = CheckboxResolver::new(&config);
        // 21% of 400 pixels = 84 ink pixels, the exact middle of the band.
        let read = resolver
            .read_region(&page_image(84), &region())
            .expect("in bounds");
        assert_eq!(read.state, CheckboxState::Ambiguous);
        assert!((read.confidence - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_near_threshold_ambiguity_has_low_confidence() {
        let config = config_with(0.30, 0.12);
        let resolver = CheckboxResolver::new(&config);
        // 13% sits just inside the band, close to the unchecked threshold.
        let read = resolver.classify(0.13);
        assert_eq!(read.state, CheckboxState::Ambiguous);
        assert!(read.confidence < 0.2);
    }

    #[test]
    fn test_out_of_bounds_region_is_calibration_error() {
        let config = config_with(0.30, 0.12);
        let resolver = CheckboxResolver::new(&config);
        let bad = CalibratedRegion {
            page: PageKind::Part5Purpose,
            x: 95,
            y: 95,
            w: 22,
            h: 22,
        };
        let err = resolver
            .read_region(&page_image(0), &bad)
            .expect_err("region exceeds raster");
        match err {
            UnresolvedReason::CalibrationError {
                region,
                image_width,
                image_height,
            } => {
                assert_eq!(region.x, 95);
                assert_eq!(image_width, 100);
                assert_eq!(image_height, 100);
            }
            other => panic!("unexpected reason: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_produces_sourced_candidate() {
        let config = config_with(0.30, 0.12);
        let resolver = CheckboxResolver::new(&config);
        let pages = vec![PageInput {
            index: 0,
            image: page_image(400),
            text: vec![TextElement::new(
                "DWC032\n31. Purpose of examination",
                BoundingBox::new(0.0, 0.0, 90.0, 12.0),
            )],
        }];
        let map = PageMap::classify(&pages);

        let resolution = resolver.resolve(&checkbox_spec(), &pages, &map);
        assert_eq!(resolution.candidates.len(), 1);
        let candidate = &resolution.candidates[0];
        assert_eq!(
            candidate.value,
            FieldValue::Checkbox(CheckboxState::Checked)
        );
        assert_eq!(candidate.strategy, StrategyKind::CheckboxFallback);
        assert!(candidate.source.is_some());
        assert!(resolution.visual.is_some());
        assert!(resolution.calibration_failure.is_none());
    }

    #[test]
    fn test_resolve_without_section_page_yields_no_candidate() {
        let config = config_with(0.30, 0.12);
        let resolver = CheckboxResolver::new(&config);
        let pages = vec![PageInput {
            index: 0,
            image: page_image(0),
            text: vec![TextElement::new(
                "unrelated page",
                BoundingBox::new(0.0, 0.0, 90.0, 12.0),
            )],
        }];
        let map = PageMap::classify(&pages);

        let resolution = resolver.resolve(&checkbox_spec(), &pages, &map);
        assert!(resolution.candidates.is_empty());
        assert!(resolution.visual.is_none());
        assert!(resolution.calibration_failure.is_none());
    }
}
