//! Document resolution orchestration.
//!
//! Runs one document through the full pipeline: structural validation,
//! section classification, per-field candidate collection, fusion, and
//! routing. Candidate collection is parallel per field; fusion is the
//! synchronization barrier per field, not per document.
//!
//! Text-valued fields resolve in a first phase. Checkbox fields resolve in
//! a second phase because the Part 5 assist reads the resolved text map —
//! the one place fields are not independent.

use std::collections::HashMap;

use log::{debug, info, warn};
use rayon::prelude::*;

use form32_core::config::CalibrationConfig;
use form32_core::error::{ResolveError, Result};
use form32_core::normalize::normalize_field_value;
use form32_core::page::{
    missing_form_markers, validate_structure, DocumentInput, PageInput, PageMap, PrimaryField,
};
use form32_core::schema::{FieldId, FieldKind, FieldSpec, SchemaRegistry, StrategyKind};
use form32_core::value::{Candidate, CheckboxState, FieldMap, ResolvedField, UnresolvedReason};
use form32_resolve::{assist_candidate, fuse, CheckboxResolver, TextFallbackResolver};

use crate::report::ResolutionReport;
use crate::routing;

/// Resolves documents against one schema and one calibration.
///
/// The registry and calibration are read-only after construction; one
/// resolver can serve any number of documents, concurrently.
#[derive(Debug, Clone)]
pub struct DocumentResolver {
    registry: SchemaRegistry,
    config: CalibrationConfig,
}

impl DocumentResolver {
    /// Create a resolver from a schema registry and calibration.
    #[inline]
    #[must_use = "resolver is created but not used"]
    pub const fn new(registry: SchemaRegistry, config: CalibrationConfig) -> Self {
        Self { registry, config }
    }

    /// Resolver for DWC Form 32 with the production calibration.
    #[inline]
    #[must_use = "resolver is created but not used"]
    pub fn form32() -> Self {
        Self::new(SchemaRegistry::form32(), CalibrationConfig::default())
    }

    /// The calibration this resolver runs with.
    #[inline]
    #[must_use = "configuration reference is returned but not used"]
    pub const fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// The schema registry this resolver runs with.
    #[inline]
    #[must_use = "registry reference is returned but not used"]
    pub const fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Resolve one document into its field map and generation plan.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] only for structurally invalid input (no
    /// pages, empty rasters, duplicate indices) or a document that does not
    /// carry the form's required markers. Field-level problems degrade into
    /// the provenance trail instead.
    pub fn resolve(&self, doc: &DocumentInput) -> Result<ResolutionReport> {
        validate_structure(doc)?;

        let full_text = doc
            .pages
            .iter()
            .map(PageInput::page_text)
            .collect::<Vec<_>>()
            .join("\n");
        let missing = missing_form_markers(&full_text);
        if !missing.is_empty() {
            return Err(ResolveError::MissingMarkers(missing.join(", ")));
        }

        let page_map = PageMap::classify(&doc.pages);
        let primary_by_field = self.index_primary(&doc.primary);

        // Phase 1: text-valued fields, parallel per field.
        let text_resolver = TextFallbackResolver::new(&self.config);
        let mut field_map: FieldMap = self
            .registry
            .specs()
            .par_iter()
            .filter(|spec| spec.kind != FieldKind::Checkbox)
            .map(|spec| {
                let mut candidates = self.primary_candidates(spec, &primary_by_field);
                candidates.extend(text_resolver.resolve(spec, &doc.pages, &page_map));
                (
                    spec.id.clone(),
                    fuse(spec, &self.config, candidates, None),
                )
            })
            .collect::<Vec<_>>()
            .into_iter()
            .collect();

        // Phase 2: checkbox fields; the assist post-pass reads the
        // resolved text map.
        let checkbox_resolver = CheckboxResolver::new(&self.config);
        let checkbox_results: Vec<(FieldId, ResolvedField)> = self
            .registry
            .specs()
            .par_iter()
            .filter(|spec| spec.kind == FieldKind::Checkbox)
            .map(|spec| {
                let mut candidates = self.primary_candidates(spec, &primary_by_field);
                let resolution = checkbox_resolver.resolve(spec, &doc.pages, &page_map);

                let context = match (&resolution.calibration_failure, &resolution.visual) {
                    (Some(reason), _) => Some(reason.clone()),
                    (None, Some(read)) if read.state == CheckboxState::Ambiguous => {
                        Some(UnresolvedReason::AmbiguousCheckbox {
                            ink_fraction: read.ink_fraction,
                        })
                    }
                    _ => None,
                };

                candidates.extend(resolution.candidates);
                if let Some(assist) = assist_candidate(
                    &self.config,
                    &self.registry,
                    &spec.id,
                    resolution.visual.as_ref(),
                    &field_map,
                ) {
                    candidates.push(assist);
                }

                (
                    spec.id.clone(),
                    fuse(spec, &self.config, candidates, context),
                )
            })
            .collect();
        field_map.extend(checkbox_results);

        let unresolved = field_map.values().filter(|f| !f.is_resolved()).count();
        info!(
            "resolved {} fields ({unresolved} unresolved) across {} pages",
            field_map.len(),
            doc.pages.len()
        );

        let plan = routing::evaluate(&field_map);
        Ok(ResolutionReport { field_map, plan })
    }

    /// Group primary candidates by field, dropping ids the schema does not
    /// declare.
    fn index_primary<'a>(
        &self,
        primary: &'a [PrimaryField],
    ) -> HashMap<&'a FieldId, Vec<&'a PrimaryField>> {
        let mut by_field: HashMap<&FieldId, Vec<&PrimaryField>> = HashMap::new();
        for pf in primary {
            if self.registry.get(&pf.field).is_none() {
                warn!("primary extractor returned unknown field: {}", pf.field);
                continue;
            }
            by_field.entry(&pf.field).or_default().push(pf);
        }
        by_field
    }

    /// Normalize the primary extractor's raw values into typed candidates.
    fn primary_candidates(
        &self,
        spec: &FieldSpec,
        by_field: &HashMap<&FieldId, Vec<&PrimaryField>>,
    ) -> Vec<Candidate> {
        if !spec.allows(StrategyKind::Primary) {
            return Vec::new();
        }
        let Some(entries) = by_field.get(&spec.id) else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|pf| {
                let Some(value) = normalize_field_value(spec, &pf.value) else {
                    debug!(
                        "primary value for {} rejected by normalization: {:?}",
                        spec.id, pf.value
                    );
                    return None;
                };
                Some(Candidate::new(
                    value,
                    StrategyKind::Primary,
                    pf.confidence.clamp(0.0, 1.0),
                ))
            })
            .collect()
    }
}
