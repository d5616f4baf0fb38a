//! # form32-pipeline - Document Resolution Pipeline
//!
//! End-to-end resolution of one scanned DWC Form 32 packet: raw per-page
//! extraction candidates plus page imagery in, a resolved field map with
//! provenance and a generation plan out.
//!
//! ## Pipeline Stages
//!
//! 1. **Structural validation** - pages present, rasters non-empty,
//!    required form markers found; anything else aborts the document.
//! 2. **Section classification** - each page mapped to its form section,
//!    driving checkbox region lookup and scan ranking.
//! 3. **Candidate collection** - parallel per field: primary extractor
//!    values (normalized), anchored text fallback, calibrated checkbox
//!    reads, and the Part 5 assist post-pass.
//! 4. **Fusion** - the per-field barrier: one deterministic winner per
//!    field, full provenance retained.
//! 5. **Routing** - the fixed business rule table derives which output
//!    forms to produce.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use form32_pipeline::DocumentResolver;
//!
//! let resolver = DocumentResolver::form32();
//! let report = resolver.resolve(&document)?;
//!
//! for id in report.unresolved_required(resolver.registry()) {
//!     eprintln!("needs review: {id}");
//! }
//! println!("{}", report.to_json()?);
//! ```

pub mod report;
pub mod resolver;
pub mod routing;

pub use report::ResolutionReport;
pub use resolver::DocumentResolver;
