//! Resolution report: the pipeline's serializable output.
//!
//! Carries the resolved field map with full provenance and the derived
//! generation plan. Downstream collaborators consume it for template
//! population and form writing; reviewers read the serialized form to see
//! why each value was chosen and which fields need attention.

use serde::{Deserialize, Serialize};

use form32_core::error::Result;
use form32_core::schema::{FieldId, SchemaRegistry};
use form32_core::value::{FieldMap, GenerationPlan, ResolvedField};

/// Output of one document resolution pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionReport {
    /// Resolved fields with provenance, keyed by field id.
    pub field_map: FieldMap,
    /// Output documents to produce, with trigger provenance.
    pub plan: GenerationPlan,
}

impl ResolutionReport {
    /// Look up one resolved field.
    #[inline]
    #[must_use = "field lookup result is returned but not used"]
    pub fn field(&self, id: &FieldId) -> Option<&ResolvedField> {
        self.field_map.get(id)
    }

    /// Required fields that ended up unresolved, in field-id order.
    ///
    /// These are the fields a reviewer must fill before the output forms
    /// are trustworthy.
    #[must_use = "unresolved field list is returned but not used"]
    pub fn unresolved_required<'a>(&'a self, registry: &SchemaRegistry) -> Vec<&'a FieldId> {
        self.field_map
            .iter()
            .filter(|(id, field)| {
                !field.is_resolved()
                    && registry.get(id).is_some_and(|spec| spec.required)
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Fields whose value was accepted below its acceptance threshold, in
    /// field-id order. Recorded so review can be directed at them.
    #[must_use = "low-confidence field list is returned but not used"]
    pub fn low_confidence_fields(&self) -> Vec<&FieldId> {
        self.field_map
            .iter()
            .filter(|(_, field)| field.low_confidence)
            .map(|(id, _)| id)
            .collect()
    }

    /// Serialize the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the underlying serialization error, wrapped.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use form32_core::schema::StrategyKind;
    use form32_core::value::{FieldValue, UnresolvedReason};

    fn sample_report() -> ResolutionReport {
        let mut field_map = FieldMap::new();
        field_map.insert(
            FieldId::from("patient_name"),
            ResolvedField {
                value: Some(FieldValue::Text("JOHN DOE".to_string())),
                strategy: Some(StrategyKind::Primary),
                confidence: 0.95,
                low_confidence: false,
                unresolved: None,
                candidates: vec![],
            },
        );
        field_map.insert(
            FieldId::from("exam_date"),
            ResolvedField {
                value: Some(FieldValue::Text("02/15/2024".to_string())),
                strategy: Some(StrategyKind::Primary),
                confidence: 0.40,
                low_confidence: true,
                unresolved: None,
                candidates: vec![],
            },
        );
        field_map.insert(
            FieldId::from("exam_location"),
            ResolvedField::unresolved(UnresolvedReason::NoCandidate, vec![]),
        );
        ResolutionReport {
            field_map,
            plan: GenerationPlan::default(),
        }
    }

    #[test]
    fn test_unresolved_required_lists_only_required_gaps() {
        let registry = SchemaRegistry::form32();
        let report = sample_report();
        let unresolved = report.unresolved_required(&registry);
        assert_eq!(unresolved, vec![&FieldId::from("exam_location")]);
    }

    #[test]
    fn test_low_confidence_fields() {
        let report = sample_report();
        assert_eq!(
            report.low_confidence_fields(),
            vec![&FieldId::from("exam_date")]
        );
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let report = sample_report();
        let json = report.to_json().expect("serializes");
        assert!(json.contains("patient_name"));
        assert!(json.contains("no_candidate"));
        let back: ResolutionReport = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, report);
    }
}
