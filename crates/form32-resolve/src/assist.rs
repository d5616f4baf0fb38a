//! Part 5 checkbox assist.
//!
//! The purpose-of-examination section couples four checkboxes to date
//! fields that are only ever filled when their box is checked (MMI date,
//! disability period, return-to-work period, SIB period). When the visual
//! read of one of those boxes lands in the ambiguous band but its paired
//! date field resolved to a non-empty value, the pairing is strong enough
//! evidence to propose "checked" at a fixed moderate confidence.
//!
//! The assist never accompanies a non-ambiguous visual read, and the whole
//! mechanism is disabled by a single calibration toggle without touching
//! any other field's resolution.

use log::debug;

use form32_core::config::CalibrationConfig;
use form32_core::schema::{FieldId, SchemaRegistry, StrategyKind};
use form32_core::value::{Candidate, CheckboxState, FieldMap, FieldValue};

use crate::checkbox::CheckboxRead;

/// Propose an assisted "checked" candidate for an ambiguous checkbox read.
///
/// Returns `None` unless all of the following hold: assist is enabled, the
/// checkbox participates in a declared pairing, the direct visual read
/// exists and is ambiguous, and the paired text field resolved non-empty.
#[must_use = "assist candidate is produced but not used"]
pub fn assist_candidate(
    config: &CalibrationConfig,
    registry: &SchemaRegistry,
    checkbox_id: &FieldId,
    visual: Option<&CheckboxRead>,
    resolved_text: &FieldMap,
) -> Option<Candidate> {
    if !config.assist_enabled {
        return None;
    }
    let pair = registry.assist_pair_for(checkbox_id)?;
    let read = visual?;
    if read.state != CheckboxState::Ambiguous {
        return None;
    }
    let paired = resolved_text.get(&pair.text)?;
    let value = paired.value.as_ref()?;
    if value.is_empty() {
        return None;
    }

    debug!(
        "assist for {checkbox_id}: ambiguous read (ink {:.3}) with {} resolved",
        read.ink_fraction, pair.text
    );
    Some(Candidate::new(
        FieldValue::Checkbox(CheckboxState::Checked),
        StrategyKind::AssistedOverride,
        config.assist_confidence,
    ))
}
