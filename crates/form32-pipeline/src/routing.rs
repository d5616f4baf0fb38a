//! Routing / business rule engine.
//!
//! Evaluates a fixed predicate table over resolved checkbox fields and
//! produces the generation plan: which output forms to produce, with the
//! trigger fields recorded for audit.
//!
//! Predicates read only resolved values. An unresolved trigger field makes
//! the predicate fall back to its documented conservative default — the
//! entry records that the default was applied, and the evaluation never
//! errors. Evaluation is a pure function: identical field maps always
//! yield identical plans.

use std::collections::HashSet;

use form32_core::schema::FieldId;
use form32_core::value::{DocumentKind, FieldMap, GenerationPlan, PlanEntry, ResolvedField};

/// Condition governing one output document.
#[derive(Debug, Clone, Copy)]
enum Trigger {
    /// Generated for every processed document.
    Always,
    /// Generated when any of the listed checkbox fields resolved checked.
    AnyChecked(&'static [&'static str]),
}

/// One row of the routing table.
#[derive(Debug, Clone, Copy)]
struct Rule {
    kind: DocumentKind,
    trigger: Trigger,
    /// Result when a trigger field is unresolved and no resolved trigger
    /// fired. Documented per rule below; never silently true.
    unresolved_default: bool,
}

/// The production routing table.
///
/// - DWC-068 (designated doctor data report): purpose box C, D or G.
///   Unresolved default: not generated — a reviewer adds the report
///   manually rather than producing one on a guess.
/// - DWC-069 (report of medical evaluation): every document.
/// - DWC-073 (work status report): purpose box E. Unresolved default:
///   generated — the work status report accompanies every DWC-069 in
///   practice, and an unneeded copy is cheaper than a missing one.
const RULES: &[Rule] = &[
    Rule {
        kind: DocumentKind::Dwc068,
        trigger: Trigger::AnyChecked(&[
            "purpose_box_c_checked",
            "purpose_box_d_checked",
            "purpose_box_g_checked",
        ]),
        unresolved_default: false,
    },
    Rule {
        kind: DocumentKind::Dwc069,
        trigger: Trigger::Always,
        unresolved_default: false,
    },
    Rule {
        kind: DocumentKind::Dwc073,
        trigger: Trigger::AnyChecked(&["purpose_box_e_checked"]),
        unresolved_default: true,
    },
];

/// Evaluate the routing table against a resolved field map.
#[must_use = "generation plan is produced but not used"]
pub fn evaluate(field_map: &FieldMap) -> GenerationPlan {
    let mut seen = HashSet::new();
    let entries = RULES
        .iter()
        .filter(|rule| seen.insert(rule.kind))
        .map(|rule| evaluate_rule(rule, field_map))
        .collect();
    GenerationPlan { entries }
}

fn evaluate_rule(rule: &Rule, field_map: &FieldMap) -> PlanEntry {
    match rule.trigger {
        Trigger::Always => PlanEntry {
            kind: rule.kind,
            generate: true,
            triggered_by: Vec::new(),
            default_applied: false,
        },
        Trigger::AnyChecked(fields) => {
            let mut triggered_by = Vec::new();
            let mut any_unresolved = false;
            for name in fields {
                let id = FieldId::from(*name);
                match field_map.get(&id).and_then(ResolvedField::checked) {
                    Some(true) => triggered_by.push(id),
                    Some(false) => {}
                    // Unresolved, ambiguous, or absent from the map.
                    None => any_unresolved = true,
                }
            }
            if !triggered_by.is_empty() {
                PlanEntry {
                    kind: rule.kind,
                    generate: true,
                    triggered_by,
                    default_applied: false,
                }
            } else if any_unresolved {
                PlanEntry {
                    kind: rule.kind,
                    generate: rule.unresolved_default,
                    triggered_by: Vec::new(),
                    default_applied: true,
                }
            } else {
                PlanEntry {
                    kind: rule.kind,
                    generate: false,
                    triggered_by: Vec::new(),
                    default_applied: false,
                }
            }
        }
    }
}
