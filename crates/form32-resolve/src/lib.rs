//! # form32-resolve - Field Resolvers and Fusion
//!
//! The three candidate producers and the fusion engine of the Form 32
//! resolution pipeline:
//!
//! - [`text_fallback`] - anchored spatial search over page text elements,
//!   with a document-wide pattern scan as last resort
//! - [`checkbox`] - tri-state ink-density reads of calibrated box regions
//! - [`assist`] - the Part 5 cross-field assist for ambiguous checkbox reads
//! - [`fusion`] - the pure precedence function selecting one resolved value
//!   per field
//!
//! Resolvers borrow a shared immutable [`form32_core::CalibrationConfig`];
//! none of them hold mutable state, so distinct fields resolve safely in
//! parallel. Fusion is the per-field synchronization point: it runs once
//! all of a field's candidates are collected.

pub mod assist;
pub mod checkbox;
pub mod fusion;
pub mod text_fallback;

pub use assist::assist_candidate;
pub use checkbox::{CheckboxRead, CheckboxResolution, CheckboxResolver};
pub use fusion::fuse;
pub use text_fallback::TextFallbackResolver;
