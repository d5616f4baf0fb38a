//! Page model and section classification.
//!
//! The upstream conversion step hands the pipeline, per page, a rendered
//! raster image and the page's text elements with bounding geometry. This
//! module wraps those inputs and classifies each page into the form section
//! it belongs to; the classification drives calibrated-region lookup for
//! checkbox reads and proximity ranking for document-wide text scans.

use std::fmt;

use image::{DynamicImage, GenericImageView};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;
use crate::schema::FieldId;

// ============================================================================
// Input types
// ============================================================================

/// One text element of a page: content plus bounding geometry in
/// rendered-pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    /// Text content of the element.
    pub content: String,
    /// Bounding box in the page's pixel space, top-left origin.
    pub bbox: BoundingBox,
}

impl TextElement {
    /// Create a new text element.
    #[inline]
    #[must_use = "text element is created but not used"]
    pub fn new(content: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            content: content.into(),
            bbox,
        }
    }
}

/// One page of the document: index, rendered raster, text elements.
#[derive(Debug, Clone)]
pub struct PageInput {
    /// Zero-based page index.
    pub index: usize,
    /// Rendered raster of the page at the standard resolution.
    pub image: DynamicImage,
    /// Text elements in reading order.
    pub text: Vec<TextElement>,
}

impl PageInput {
    /// The page's text content, one element per line.
    #[must_use = "page text is built but not used"]
    pub fn page_text(&self) -> String {
        self.text
            .iter()
            .map(|e| e.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A candidate value proposed by the upstream structured extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryField {
    /// Registry identifier of the field.
    pub field: FieldId,
    /// Raw extracted value; normalized before fusion.
    pub value: String,
    /// Extractor confidence in `[0, 1]`.
    pub confidence: f32,
}

/// Complete input for one document resolution pass.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    /// Pages with rasters and text elements.
    pub pages: Vec<PageInput>,
    /// Primary extractor candidates, keyed by registry field ids.
    pub primary: Vec<PrimaryField>,
}

// ============================================================================
// Page classification
// ============================================================================

/// Form section a page belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    /// Commissioner's order cover letter with the exam schedule.
    FrontPage,
    /// Part 1: injured employee information.
    Part1Employee,
    /// Part 3: treating doctor information.
    Part3TreatingDoctor,
    /// Part 4: designated doctor selection (body areas and diagnoses).
    Part4BodyAreas,
    /// Part 5: purpose of examination (boxes A-G).
    Part5Purpose,
    /// Part 6: requester information.
    Part6Requester,
    /// Claim/network questions page (Q22/Q23, Part 2).
    NetworkQuestions,
    /// Second page of the exam order (billing contact).
    ExamOrderPageTwo,
    /// No section markers matched.
    #[default]
    Unclassified,
}

impl fmt::Display for PageKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::FrontPage => "front_page",
            Self::Part1Employee => "part1_employee",
            Self::Part3TreatingDoctor => "part3_treating_doctor",
            Self::Part4BodyAreas => "part4_body_areas",
            Self::Part5Purpose => "part5_purpose",
            Self::Part6Requester => "part6_requester",
            Self::NetworkQuestions => "network_questions",
            Self::ExamOrderPageTwo => "exam_order_page_two",
            Self::Unclassified => "unclassified",
        };
        write!(f, "{s}")
    }
}

/// Markers every valid Form 32 packet must contain somewhere in its text,
/// paired with the description reported when absent.
const REQUIRED_FORM_MARKERS: &[(&[&str], &str)] = &[
    (&["dwc032", "dwc 032"], "DWC-032 form number"),
    (&["designated doctor"], "designated doctor examination title"),
];

/// Check the whole-document text for the required form markers.
///
/// Returns the descriptions of every missing marker; an empty result means
/// the document looks like a Form 32 packet.
#[must_use = "missing marker list is returned but not used"]
pub fn missing_form_markers(full_text: &str) -> Vec<String> {
    let lower = full_text.to_lowercase();
    REQUIRED_FORM_MARKERS
        .iter()
        .filter(|(variants, _)| !variants.iter().any(|m| lower.contains(m)))
        .map(|(_, description)| (*description).to_string())
        .collect()
}

/// Classify one page by its marker phrases.
///
/// DWC-032 part markers take priority over the order pages; the exam order's
/// second page is checked before the front page because its text is a
/// superset of several cover-letter phrases.
#[must_use = "page classification is computed but not used"]
pub fn classify_page(page_text: &str) -> PageKind {
    let lower = page_text.to_lowercase();
    let upper = page_text.to_uppercase();

    if upper.contains("DWC032") || upper.contains("DWC 032") {
        if lower.contains("part 1. injured employee information") {
            return PageKind::Part1Employee;
        }
        if lower.contains("part 3. treating doctor information") {
            return PageKind::Part3TreatingDoctor;
        }
        if lower.contains("22. does the claim have medical benefits") {
            return PageKind::NetworkQuestions;
        }
        if lower.contains("30. check all body areas")
            || lower.contains("part 4. designated doctor selection")
            || lower.contains("body areas and diagnoses")
        {
            return PageKind::Part4BodyAreas;
        }
        if lower.contains("purpose of examination") || lower.contains("check boxes a through g") {
            return PageKind::Part5Purpose;
        }
        if lower.contains("part 6. requester information") {
            return PageKind::Part6Requester;
        }
        return PageKind::Unclassified;
    }

    if lower.contains("dd assignment number") {
        return PageKind::ExamOrderPageTwo;
    }
    if lower.contains("injured employee:") && lower.contains("your exam is on") {
        return PageKind::FrontPage;
    }

    PageKind::Unclassified
}

/// Section classification of a whole document's pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMap {
    kinds: Vec<PageKind>,
}

impl PageMap {
    /// Classify every page of the document.
    #[must_use = "page map is built but not used"]
    pub fn classify(pages: &[PageInput]) -> Self {
        let kinds = pages
            .iter()
            .map(|page| {
                let kind = classify_page(&page.page_text());
                debug!("page {} classified as {kind}", page.index);
                kind
            })
            .collect();
        Self { kinds }
    }

    /// Position (into the page slice) of the first page of the given kind.
    #[inline]
    #[must_use = "page lookup result is returned but not used"]
    pub fn page_for(&self, kind: PageKind) -> Option<usize> {
        self.kinds.iter().position(|&k| k == kind)
    }

    /// Classification of the page at `pos`.
    #[inline]
    #[must_use = "page kind is returned but not used"]
    pub fn kind_of(&self, pos: usize) -> PageKind {
        self.kinds.get(pos).copied().unwrap_or_default()
    }

    /// Distance in pages between `pos` and the first page of `kind`.
    ///
    /// Falls back to 1 when the section was not found, so unranked hits sit
    /// below same-page hits but above far-page hits.
    #[inline]
    #[must_use = "page distance is computed but not used"]
    pub fn distance_to(&self, pos: usize, kind: PageKind) -> usize {
        self.page_for(kind)
            .map_or(1, |section| pos.abs_diff(section))
    }
}

/// Validate the structural shape of a document input.
///
/// A document with no pages, a duplicate page index, or an empty raster
/// cannot be resolved at all; these abort the run rather than degrade it.
pub fn validate_structure(doc: &DocumentInput) -> crate::error::Result<()> {
    use crate::error::ResolveError;

    if doc.pages.is_empty() {
        return Err(ResolveError::EmptyDocument);
    }
    let mut seen = std::collections::HashSet::new();
    for page in &doc.pages {
        if !seen.insert(page.index) {
            return Err(ResolveError::DuplicatePageIndex(page.index));
        }
        let (w, h) = page.image.dimensions();
        if w == 0 || h == 0 {
            return Err(ResolveError::EmptyPageImage(page.index));
        }
    }
    Ok(())
}
