//! Field fusion engine.
//!
//! Selects exactly one [`ResolvedField`] from the candidates collected for
//! a field. The precedence policy, evaluated in order with the first
//! satisfied rule winning:
//!
//! 1. A primary candidate at or above the field's acceptance threshold
//!    wins outright.
//! 2. Otherwise the highest-confidence usable non-primary candidate wins;
//!    exact ties break by fixed strategy priority (checkbox fallback >
//!    text fallback > assisted override), then by candidate order.
//! 3. A below-threshold primary with no usable fallback is accepted anyway
//!    and flagged low confidence — degrade visibly, never drop silently.
//! 4. No candidate at all leaves the field unresolved with its reason.
//!
//! An ambiguous checkbox read is provenance, not a value: it never wins,
//! and when nothing else does the field resolves to "unresolved" with the
//! ambiguity recorded.
//!
//! The function is pure and side-effect-free; identical candidate sets
//! always produce bit-identical results, which regression tests against
//! prior document runs rely on.

use log::debug;

use form32_core::config::CalibrationConfig;
use form32_core::schema::{FieldSpec, StrategyKind};
use form32_core::value::{Candidate, CheckboxState, FieldValue, ResolvedField, UnresolvedReason};

/// Fuse the collected candidates for one field into its resolved form.
///
/// `unresolved_context` carries collection-time context (an ambiguous
/// visual read, a calibration failure) and is reported as the reason when
/// no candidate wins; without it an empty outcome reads "no candidate
/// produced".
#[must_use = "fusion result is produced but not used"]
pub fn fuse(
    spec: &FieldSpec,
    config: &CalibrationConfig,
    candidates: Vec<Candidate>,
    unresolved_context: Option<UnresolvedReason>,
) -> ResolvedField {
    let threshold = spec
        .acceptance_threshold
        .unwrap_or(config.acceptance_threshold);

    // Rule 1: accepted primary.
    if let Some(winner) = candidates
        .iter()
        .find(|c| c.strategy == StrategyKind::Primary && c.confidence >= threshold && is_usable(c))
    {
        return resolved(winner.clone(), config, false, candidates);
    }

    // Rule 2: best usable fallback.
    let mut best: Option<&Candidate> = None;
    for candidate in &candidates {
        if candidate.strategy == StrategyKind::Primary || !is_usable(candidate) {
            continue;
        }
        let replaces = match best {
            None => true,
            Some(current) => {
                candidate.confidence > current.confidence
                    || (candidate.confidence == current.confidence
                        && candidate.strategy.tie_break_priority()
                            > current.strategy.tie_break_priority())
            }
        };
        if replaces {
            best = Some(candidate);
        }
    }
    if let Some(winner) = best {
        return resolved(winner.clone(), config, false, candidates);
    }

    // Rule 3: below-threshold primary, nothing better available.
    if let Some(winner) = candidates
        .iter()
        .find(|c| c.strategy == StrategyKind::Primary && is_usable(c))
    {
        debug!(
            "{}: accepting primary below threshold ({:.2} < {threshold:.2})",
            spec.id, winner.confidence
        );
        return resolved(winner.clone(), config, true, candidates);
    }

    // Rule 4: unresolved, with the most specific reason available.
    let reason = unresolved_context.unwrap_or(UnresolvedReason::NoCandidate);
    debug!("{}: unresolved ({reason})", spec.id);
    ResolvedField::unresolved(reason, candidates)
}

/// Whether a candidate carries a value fusion may select.
fn is_usable(candidate: &Candidate) -> bool {
    !matches!(
        candidate.value,
        FieldValue::Checkbox(CheckboxState::Ambiguous)
    ) && !candidate.value.is_empty()
}

fn resolved(
    winner: Candidate,
    config: &CalibrationConfig,
    low_confidence: bool,
    candidates: Vec<Candidate>,
) -> ResolvedField {
    let weight = config.weights.weight(winner.strategy);
    ResolvedField {
        value: Some(winner.value),
        strategy: Some(winner.strategy),
        confidence: (winner.confidence * weight).clamp(0.0, 1.0),
        low_confidence,
        unresolved: None,
        candidates,
    }
}
