//! Candidate values, resolved fields and the generation plan.
//!
//! A [`Candidate`] is one proposed value for one field from one strategy; it
//! lives only within a resolution pass. The fusion engine selects exactly
//! one winner per field and emits a [`ResolvedField`] carrying the full
//! provenance trail. The per-document [`FieldMap`] and the derived
//! [`GenerationPlan`] are the pipeline's immutable outputs.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;
use crate::schema::{CalibratedRegion, FieldId, StrategyKind};

// ============================================================================
// Values
// ============================================================================

/// Tri-state outcome of a checkbox read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckboxState {
    /// Ink coverage at or above the checked threshold.
    Checked,
    /// Ink coverage at or below the unchecked threshold.
    Unchecked,
    /// Coverage in the band between the thresholds; not usable as a value.
    Ambiguous,
}

impl CheckboxState {
    /// The boolean value of a non-ambiguous state.
    #[inline]
    #[must_use = "checkbox boolean is computed but not used"]
    pub const fn as_bool(self) -> Option<bool> {
        match self {
            Self::Checked => Some(true),
            Self::Unchecked => Some(false),
            Self::Ambiguous => None,
        }
    }
}

impl fmt::Display for CheckboxState {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Checked => "checked",
            Self::Unchecked => "unchecked",
            Self::Ambiguous => "ambiguous",
        };
        write!(f, "{s}")
    }
}

/// A field value of any semantic kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Text, date or time content (normalized).
    Text(String),
    /// Tri-state checkbox content.
    Checkbox(CheckboxState),
    /// Repeated group of short values.
    Group(Vec<String>),
}

impl FieldValue {
    /// The text content, for text-valued fields.
    #[inline]
    #[must_use = "text content is returned but not used"]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The checkbox state, for checkbox-valued fields.
    #[inline]
    #[must_use = "checkbox state is returned but not used"]
    pub const fn as_checkbox(&self) -> Option<CheckboxState> {
        match self {
            Self::Checkbox(state) => Some(*state),
            _ => None,
        }
    }

    /// Whether the value carries no usable content (empty text or group).
    #[inline]
    #[must_use = "emptiness check result is returned but not used"]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Group(items) => items.is_empty(),
            Self::Checkbox(_) => false,
        }
    }
}

// ============================================================================
// Candidates
// ============================================================================

/// Location a candidate value was read from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Zero-based page index.
    pub page: usize,
    /// Bounding box of the source element or region.
    pub bbox: BoundingBox,
}

/// One proposed value for one field from one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Proposed value.
    pub value: FieldValue,
    /// Strategy that produced it.
    pub strategy: StrategyKind,
    /// Confidence in `[0, 1]`.
    pub confidence: f32,
    /// Source coordinates, when the value was read from the page.
    pub source: Option<SourceRef>,
}

impl Candidate {
    /// Create a candidate without source coordinates.
    #[inline]
    #[must_use = "candidate is created but not used"]
    pub const fn new(value: FieldValue, strategy: StrategyKind, confidence: f32) -> Self {
        Self {
            value,
            strategy,
            confidence,
            source: None,
        }
    }

    /// Attach source coordinates.
    #[inline]
    #[must_use = "candidate with source is returned but not used"]
    pub fn with_source(mut self, page: usize, bbox: BoundingBox) -> Self {
        self.source = Some(SourceRef { page, bbox });
        self
    }
}

// ============================================================================
// Resolved fields
// ============================================================================

/// Why a field ended up without a resolved value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// No strategy produced a usable candidate.
    NoCandidate,
    /// The checkbox read landed in the ambiguous band and no assist
    /// resolved it.
    AmbiguousCheckbox {
        /// Measured ink fraction of the ambiguous read.
        ink_fraction: f32,
    },
    /// The calibrated region lies outside the page raster; template and
    /// document geometry disagree.
    CalibrationError {
        /// The offending region, for template repair.
        region: CalibratedRegion,
        /// Dimensions of the raster the region missed.
        image_width: u32,
        /// Raster height.
        image_height: u32,
    },
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCandidate => write!(f, "no candidate produced"),
            Self::AmbiguousCheckbox { ink_fraction } => {
                write!(f, "ambiguous checkbox read (ink fraction {ink_fraction:.3})")
            }
            Self::CalibrationError {
                region,
                image_width,
                image_height,
            } => write!(
                f,
                "calibrated region [{region}] outside page raster {image_width}x{image_height}"
            ),
        }
    }
}

/// Final outcome for one field: the selected value (if any), the winning
/// strategy, the derived confidence, and the full provenance trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedField {
    /// Selected value; `None` when unresolved.
    pub value: Option<FieldValue>,
    /// Strategy of the winning candidate.
    pub strategy: Option<StrategyKind>,
    /// Winning candidate confidence scaled by the strategy's precedence
    /// weight; `0.0` when unresolved.
    pub confidence: f32,
    /// The value was accepted below its acceptance threshold.
    pub low_confidence: bool,
    /// Set when the field is unresolved.
    pub unresolved: Option<UnresolvedReason>,
    /// Every candidate considered, in collection order.
    pub candidates: Vec<Candidate>,
}

impl ResolvedField {
    /// An unresolved field carrying its reason and provenance.
    #[inline]
    #[must_use = "resolved field is created but not used"]
    pub const fn unresolved(reason: UnresolvedReason, candidates: Vec<Candidate>) -> Self {
        Self {
            value: None,
            strategy: None,
            confidence: 0.0,
            low_confidence: false,
            unresolved: Some(reason),
            candidates,
        }
    }

    /// Whether a value was selected.
    #[inline]
    #[must_use = "resolution check result is returned but not used"]
    pub const fn is_resolved(&self) -> bool {
        self.value.is_some()
    }

    /// The resolved boolean of a checkbox field.
    ///
    /// `None` when the field is unresolved or not checkbox-valued; routing
    /// predicates treat that as "apply the documented default".
    #[inline]
    #[must_use = "checkbox boolean is computed but not used"]
    pub fn checked(&self) -> Option<bool> {
        self.value
            .as_ref()
            .and_then(FieldValue::as_checkbox)
            .and_then(CheckboxState::as_bool)
    }
}

/// Resolved fields of one document, keyed by field id.
///
/// Every required field of the schema appears here, resolved or explicitly
/// unresolved. `BTreeMap` keeps iteration deterministic.
pub type FieldMap = BTreeMap<FieldId, ResolvedField>;

// ============================================================================
// Generation plan
// ============================================================================

/// Output document kinds the routing engine can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// DWC-068: designated doctor examination data report.
    Dwc068,
    /// DWC-069: report of medical evaluation.
    Dwc069,
    /// DWC-073: work status report.
    Dwc073,
}

impl fmt::Display for DocumentKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Dwc068 => "DWC068",
            Self::Dwc069 => "DWC069",
            Self::Dwc073 => "DWC073",
        };
        write!(f, "{s}")
    }
}

/// One evaluated routing predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    /// Document kind the predicate governs.
    pub kind: DocumentKind,
    /// Predicate result: whether the document is to be generated.
    pub generate: bool,
    /// Resolved checkbox fields that triggered a positive result.
    pub triggered_by: Vec<FieldId>,
    /// The predicate's documented default was applied because a trigger
    /// field was unresolved.
    pub default_applied: bool,
}

/// The set of output documents to produce, with trigger provenance.
///
/// Entries are ordered by the fixed rule table and deduplicated by kind;
/// recomputing the plan from the same [`FieldMap`] yields an identical plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationPlan {
    /// Every evaluated predicate, in rule order.
    pub entries: Vec<PlanEntry>,
}

impl GenerationPlan {
    /// Document kinds with a positive predicate result, in rule order.
    #[must_use = "kinds to generate are computed but not used"]
    pub fn kinds_to_generate(&self) -> Vec<DocumentKind> {
        self.entries
            .iter()
            .filter(|e| e.generate)
            .map(|e| e.kind)
            .collect()
    }

    /// Whether the plan includes the given document kind.
    #[inline]
    #[must_use = "inclusion check result is returned but not used"]
    pub fn includes(&self, kind: DocumentKind) -> bool {
        self.entries.iter().any(|e| e.kind == kind && e.generate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkbox_state_as_bool() {
        assert_eq!(CheckboxState::Checked.as_bool(), Some(true));
        assert_eq!(CheckboxState::Unchecked.as_bool(), Some(false));
        assert_eq!(CheckboxState::Ambiguous.as_bool(), None);
    }

    #[test]
    fn test_field_value_emptiness() {
        assert!(FieldValue::Text("   ".to_string()).is_empty());
        assert!(!FieldValue::Text("JOHN DOE".to_string()).is_empty());
        assert!(FieldValue::Group(vec![]).is_empty());
        assert!(!FieldValue::Checkbox(CheckboxState::Unchecked).is_empty());
    }

    #[test]
    fn test_resolved_field_checked() {
        let resolved = ResolvedField {
            value: Some(FieldValue::Checkbox(CheckboxState::Checked)),
            strategy: Some(StrategyKind::CheckboxFallback),
            confidence: 0.8,
            low_confidence: false,
            unresolved: None,
            candidates: vec![],
        };
        assert_eq!(resolved.checked(), Some(true));

        let unresolved = ResolvedField::unresolved(UnresolvedReason::NoCandidate, vec![]);
        assert_eq!(unresolved.checked(), None);
        assert!(!unresolved.is_resolved());
        assert_eq!(unresolved.confidence, 0.0);
    }

    #[test]
    fn test_unresolved_reason_display() {
        let reason = UnresolvedReason::AmbiguousCheckbox { ink_fraction: 0.25 };
        assert_eq!(
            reason.to_string(),
            "ambiguous checkbox read (ink fraction 0.250)"
        );
        assert_eq!(
            UnresolvedReason::NoCandidate.to_string(),
            "no candidate produced"
        );
    }

    #[test]
    fn test_plan_queries() {
        let plan = GenerationPlan {
            entries: vec![
                PlanEntry {
                    kind: DocumentKind::Dwc068,
                    generate: true,
                    triggered_by: vec![FieldId::from("purpose_box_c_checked")],
                    default_applied: false,
                },
                PlanEntry {
                    kind: DocumentKind::Dwc069,
                    generate: true,
                    triggered_by: vec![],
                    default_applied: false,
                },
                PlanEntry {
                    kind: DocumentKind::Dwc073,
                    generate: false,
                    triggered_by: vec![],
                    default_applied: false,
                },
            ],
        };
        assert_eq!(
            plan.kinds_to_generate(),
            vec![DocumentKind::Dwc068, DocumentKind::Dwc069]
        );
        assert!(plan.includes(DocumentKind::Dwc068));
        assert!(!plan.includes(DocumentKind::Dwc073));
    }

    #[test]
    fn test_field_value_serde_round_trip() {
        let value = FieldValue::Checkbox(CheckboxState::Ambiguous);
        let json = serde_json::to_string(&value).expect("serialize");
        assert!(json.contains("checkbox"));
        let back: FieldValue = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, value);
    }
}
