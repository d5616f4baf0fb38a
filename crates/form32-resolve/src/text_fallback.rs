//! Text fallback resolver.
//!
//! Recovers field values the primary extractor omitted or flagged low
//! confidence, from the page's text elements. The search is anchored: the
//! field's label is located first, then a bounded spatial window around it
//! is searched for content matching the field's expected shape. When the
//! anchored search produces nothing, the field's document-wide scan
//! patterns run as a last resort, ranked by page proximity to the field's
//! section.
//!
//! The resolver never guesses: anything below the configured confidence
//! floor yields no candidate, and "no candidate" means "unresolved by this
//! strategy", not an empty value.

use log::{debug, trace};
use regex::Regex;

use form32_core::config::CalibrationConfig;
use form32_core::normalize::normalize_field_value;
use form32_core::page::{PageInput, PageMap, TextElement};
use form32_core::schema::{FieldKind, FieldSpec, StrategyKind, WindowPolicy};
use form32_core::value::{Candidate, FieldValue};

/// Confidence of a value found inside the anchor element itself.
const INLINE_BASE: f32 = 0.95;
/// Base confidence of a same-line hit, scaled down by horizontal gap.
const SAME_LINE_BASE: f32 = 0.90;
/// Base confidence of a below-the-label hit, scaled down by vertical gap.
const BELOW_BASE: f32 = 0.80;
/// Each later scan pattern ranks this much below the one before it.
const PATTERN_RANK_STEP: f32 = 0.10;

/// Resolver recovering text-valued fields from page text geometry.
#[derive(Debug, Clone, Copy)]
pub struct TextFallbackResolver<'a> {
    config: &'a CalibrationConfig,
}

impl<'a> TextFallbackResolver<'a> {
    /// Create a resolver borrowing the run's calibration.
    #[inline]
    #[must_use = "resolver is created but not used"]
    pub const fn new(config: &'a CalibrationConfig) -> Self {
        Self { config }
    }

    /// Produce ranked candidates for one field.
    ///
    /// Returns an empty vector when the field does not allow the text
    /// fallback strategy or nothing clears the confidence floor.
    #[must_use = "candidates are produced but not used"]
    pub fn resolve(
        &self,
        spec: &FieldSpec,
        pages: &[PageInput],
        page_map: &PageMap,
    ) -> Vec<Candidate> {
        if !spec.allows(StrategyKind::TextFallback) {
            return Vec::new();
        }

        let floor = self.config.text_confidence_floor;
        let mut candidates = self.anchored_search(spec, pages);
        candidates.retain(|c| c.confidence >= floor);
        if candidates.is_empty() {
            candidates = self.document_scan(spec, pages, page_map);
            candidates.retain(|c| c.confidence >= floor);
        }

        // Stable sort: equal confidences keep collection order for the
        // fusion engine's candidate-order tie break.
        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        debug!(
            "text fallback for {}: {} candidate(s)",
            spec.id,
            candidates.len()
        );
        candidates
    }

    /// Locate the anchor label and search its spatial window.
    fn anchored_search(&self, spec: &FieldSpec, pages: &[PageInput]) -> Vec<Candidate> {
        let Some(anchor) = &spec.anchor else {
            return Vec::new();
        };
        let Some(label_re) = label_regex(&anchor.label) else {
            return Vec::new();
        };

        let mut candidates = Vec::new();
        for page in pages {
            for element in &page.text {
                let Some(label_end) = label_re
                    .find(&element.content)
                    .map(|m| m.end())
                else {
                    continue;
                };

                // The label element often carries the value itself
                // ("Date: | 02/15/2024").
                let remainder = &element.content[label_end..];
                if let Some(value) = self.extract_value(spec, remainder) {
                    candidates.push(
                        Candidate::new(value, StrategyKind::TextFallback, INLINE_BASE)
                            .with_source(page.index, element.bbox),
                    );
                }

                self.search_window(spec, anchor.policy, element, page, &mut candidates);
            }
        }
        candidates
    }

    /// Search elements near a located anchor element.
    fn search_window(
        &self,
        spec: &FieldSpec,
        policy: WindowPolicy,
        anchor_el: &TextElement,
        page: &PageInput,
        candidates: &mut Vec<Candidate>,
    ) {
        for element in &page.text {
            if std::ptr::eq(element, anchor_el) {
                continue;
            }
            let bbox = element.bbox;

            let confidence = if bbox.overlaps_vertically(&anchor_el.bbox)
                && bbox.l >= anchor_el.bbox.l
            {
                let gap = anchor_el.bbox.gap_right_to(&bbox);
                if gap > self.config.right_gap_limit {
                    continue;
                }
                SAME_LINE_BASE * (1.0 - gap / self.config.right_gap_limit)
            } else if policy == WindowPolicy::RightOrBelow
                && bbox.t >= anchor_el.bbox.t
                && bbox.overlaps_horizontally(&anchor_el.bbox)
            {
                let gap = anchor_el.bbox.gap_below_to(&bbox);
                if gap > self.config.below_gap_limit {
                    continue;
                }
                BELOW_BASE * (1.0 - gap / self.config.below_gap_limit)
            } else {
                continue;
            };

            if looks_like_label(&element.content) {
                // A following numbered box terminates the window.
                continue;
            }
            if let Some(value) = self.extract_value(spec, &element.content) {
                trace!(
                    "window hit for {} on page {}: conf {confidence:.2}",
                    spec.id,
                    page.index
                );
                candidates.push(
                    Candidate::new(value, StrategyKind::TextFallback, confidence)
                        .with_source(page.index, bbox),
                );
            }
        }
    }

    /// Document-wide scan with the field's fallback patterns, ranked by
    /// distance from the field's section page.
    fn document_scan(
        &self,
        spec: &FieldSpec,
        pages: &[PageInput],
        page_map: &PageMap,
    ) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for (pos, page) in pages.iter().enumerate() {
            let text = page.page_text();
            let distance = page_map.distance_to(pos, spec.section) as f32;

            for (rank, pattern) in spec.scan_patterns.iter().enumerate() {
                let rank_factor = 1.0 - PATTERN_RANK_STEP * rank as f32;
                let confidence = self.config.scan_confidence_cap * rank_factor.max(0.0)
                    / (1.0 + 0.5 * distance);

                if spec.kind == FieldKind::RepeatedGroup {
                    let items: Vec<String> = pattern
                        .captures_iter(&text)
                        .map(|caps| caps[1].to_string())
                        .collect();
                    if !items.is_empty() {
                        candidates.push(Candidate::new(
                            FieldValue::Group(items),
                            StrategyKind::TextFallback,
                            confidence,
                        ));
                    }
                    continue;
                }

                let Some(caps) = pattern.captures(&text) else {
                    continue;
                };
                if let Some(value) = self.extract_value(spec, &caps[1]) {
                    candidates.push(Candidate::new(
                        value,
                        StrategyKind::TextFallback,
                        confidence,
                    ));
                }
            }
        }
        candidates
    }

    /// Normalize raw content into a typed value for this field, rejecting
    /// artifacts and shape mismatches.
    fn extract_value(&self, spec: &FieldSpec, raw: &str) -> Option<FieldValue> {
        let trimmed = raw.trim_start_matches(['|', ':', ' ', '\t']).trim();
        if trimmed.is_empty() {
            return None;
        }
        normalize_field_value(spec, trimmed)
    }
}

/// Case-insensitive matcher for an anchor label with flexible whitespace.
fn label_regex(label: &str) -> Option<Regex> {
    let tokens: Vec<String> = label.split_whitespace().map(regex::escape).collect();
    if tokens.is_empty() {
        return None;
    }
    Regex::new(&format!("(?i){}", tokens.join(r"\s+"))).ok()
}

/// Whether content looks like the start of another numbered form box, which
/// terminates a search window.
fn looks_like_label(content: &str) -> bool {
    let trimmed = content.trim_start();
    let mut chars = trimmed.chars();
    let leading_digits: String = chars.by_ref().take_while(char::is_ascii_digit).collect();
    !leading_digits.is_empty()
        && leading_digits.len() <= 2
        && trimmed[leading_digits.len()..].starts_with('.')
        && trimmed[leading_digits.len()..].len() > 1
        && !trimmed.as_bytes()[leading_digits.len() + 1].is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use form32_core::geometry::BoundingBox;
    use form32_core::schema::{FieldId, SchemaRegistry};
    use image::DynamicImage;

    fn page_with(index: usize, elements: Vec<TextElement>) -> PageInput {
        PageInput {
            index,
            image: DynamicImage::new_luma8(400, 400),
            text: elements,
        }
    }

    fn element(content: &str, l: f32, t: f32, r: f32, b: f32) -> TextElement {
        TextElement::new(content, BoundingBox::new(l, t, r, b))
    }

    fn spec(id: &str) -> FieldSpec {
        SchemaRegistry::form32()
            .get(&FieldId::from(id))
            .expect("spec exists")
            .clone()
    }

    #[test]
    fn test_inline_anchor_value() {
        let config = CalibrationConfig::default();
        let resolver = TextFallbackResolver::new(&config);
        let pages = vec![page_with(
            0,
            vec![element("Date: | 02/15/2024", 10.0, 10.0, 200.0, 30.0)],
        )];
        let map = PageMap::classify(&pages);

        let candidates = resolver.resolve(&spec("exam_date"), &pages, &map);
        assert!(!candidates.is_empty());
        assert_eq!(
            candidates[0].value,
            FieldValue::Text("02/15/2024".to_string())
        );
        assert_eq!(candidates[0].confidence, INLINE_BASE);
        assert_eq!(candidates[0].strategy, StrategyKind::TextFallback);
        assert!(candidates[0].source.is_some());
    }

    #[test]
    fn test_same_line_hit_ranks_by_gap() {
        let config = CalibrationConfig::default();
        let resolver = TextFallbackResolver::new(&config);
        let pages = vec![page_with(
            0,
            vec![
                element("Date:", 10.0, 10.0, 60.0, 30.0),
                element("02/15/2024", 80.0, 12.0, 180.0, 28.0),
            ],
        )];
        let map = PageMap::classify(&pages);

        let candidates = resolver.resolve(&spec("exam_date"), &pages, &map);
        assert_eq!(candidates.len(), 1);
        let expected = SAME_LINE_BASE * (1.0 - 20.0 / config.right_gap_limit);
        assert!((candidates[0].confidence - expected).abs() < 1e-6);
    }

    #[test]
    fn test_below_window_for_numbered_labels() {
        let config = CalibrationConfig::default();
        let resolver = TextFallbackResolver::new(&config);
        let pages = vec![page_with(
            0,
            vec![
                element("1. Employee's name", 10.0, 100.0, 200.0, 118.0),
                element("JOHN DOE", 12.0, 126.0, 120.0, 142.0),
            ],
        )];
        let map = PageMap::classify(&pages);

        let candidates = resolver.resolve(&spec("patient_name"), &pages, &map);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].value, FieldValue::Text("JOHN DOE".to_string()));
        let expected = BELOW_BASE * (1.0 - 8.0 / config.below_gap_limit);
        assert!((candidates[0].confidence - expected).abs() < 1e-6);
    }

    #[test]
    fn test_following_label_terminates_window() {
        let config = CalibrationConfig::default();
        let resolver = TextFallbackResolver::new(&config);
        let pages = vec![page_with(
            0,
            vec![
                element("1. Employee's name", 10.0, 100.0, 200.0, 118.0),
                element("2. Social Security number", 10.0, 126.0, 220.0, 142.0),
            ],
        )];
        let map = PageMap::classify(&pages);

        let candidates = resolver.resolve(&spec("patient_name"), &pages, &map);
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_document_scan_when_anchor_missing() {
        let config = CalibrationConfig::default();
        let resolver = TextFallbackResolver::new(&config);
        // No anchor label anywhere; the scan pattern still finds the
        // cover-letter phrasing.
        let pages = vec![page_with(
            0,
            vec![element(
                "Injured employee: JANE ROE\nYour exam is on: 02/15/2024",
                10.0,
                10.0,
                400.0,
                60.0,
            )],
        )];
        let map = PageMap::classify(&pages);

        let candidates = resolver.resolve(&spec("patient_name"), &pages, &map);
        assert!(!candidates.is_empty());
        assert_eq!(candidates[0].value, FieldValue::Text("JANE ROE".to_string()));
        assert!(candidates[0].confidence <= config.scan_confidence_cap);
    }

    #[test]
    fn test_no_candidate_below_floor() {
        let config = CalibrationConfig::builder()
            .text_confidence_floor(0.99)
            .build()
            .expect("valid config");
        let resolver = TextFallbackResolver::new(&config);
        let pages = vec![page_with(
            0,
            vec![
                element("Date:", 10.0, 10.0, 60.0, 30.0),
                element("02/15/2024", 200.0, 12.0, 300.0, 28.0),
            ],
        )];
        let map = PageMap::classify(&pages);

        let candidates = resolver.resolve(&spec("exam_date"), &pages, &map);
        assert!(
            candidates.is_empty(),
            "nothing may clear an impossible floor"
        );
    }

    #[test]
    fn test_repeated_group_collects_all_scan_matches() {
        let config = CalibrationConfig::default();
        let resolver = TextFallbackResolver::new(&config);
        let pages = vec![page_with(
            0,
            vec![element(
                "DWC032\n30. Check all body areas and diagnoses\nM54.5 S33.5 G89.29",
                10.0,
                10.0,
                400.0,
                80.0,
            )],
        )];
        let map = PageMap::classify(&pages);

        let candidates = resolver.resolve(&spec("diagnosis_codes"), &pages, &map);
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].value,
            FieldValue::Group(vec![
                "M54.5".to_string(),
                "S33.5".to_string(),
                "G89.29".to_string()
            ])
        );
    }

    #[test]
    fn test_checkbox_fields_yield_nothing() {
        let config = CalibrationConfig::default();
        let resolver = TextFallbackResolver::new(&config);
        let pages = vec![page_with(0, vec![element("x", 0.0, 0.0, 5.0, 5.0)])];
        let map = PageMap::classify(&pages);

        let candidates = resolver.resolve(&spec("purpose_box_c_checked"), &pages, &map);
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_looks_like_label() {
        assert!(looks_like_label("2. Social Security number"));
        assert!(looks_like_label("13. Employer's name"));
        assert!(!looks_like_label("JOHN DOE"));
        assert!(!looks_like_label("02/15/2024"));
        assert!(!looks_like_label("123. not a form box"));
    }
}
