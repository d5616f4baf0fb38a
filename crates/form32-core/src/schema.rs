//! Field schema registry for DWC Form 32.
//!
//! The registry declares, per document type, the set of fields to resolve:
//! their semantic kind, whether they are required, which extraction
//! strategies may produce them (in preference order), the anchor label and
//! document-wide scan patterns used by the text fallback, the page section
//! the field lives in, and (for checkboxes) the calibrated region geometry.
//!
//! A registry is built once per document type and shared read-only across
//! concurrent resolutions; nothing in it is mutated after construction.

use std::collections::HashMap;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::page::PageKind;

// ============================================================================
// Identifiers and enums
// ============================================================================

/// Identifier of a form field, e.g. `patient_name` or `purpose_box_c_checked`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    /// Create a field identifier.
    #[inline]
    #[must_use = "field id is created but not used"]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[inline]
    #[must_use = "field id string is returned but not used"]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FieldId {
    #[inline]
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Semantic kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Single-line text (names, phone numbers, identifiers).
    ShortText,
    /// Multi-line free text (injury descriptions).
    LongText,
    /// Calendar date, normalized to `MM/DD/YYYY`.
    Date,
    /// Tri-state checkbox.
    Checkbox,
    /// Repeated group of short values (diagnosis codes).
    RepeatedGroup,
}

impl fmt::Display for FieldKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ShortText => "short_text",
            Self::LongText => "long_text",
            Self::Date => "date",
            Self::Checkbox => "checkbox",
            Self::RepeatedGroup => "repeated_group",
        };
        write!(f, "{s}")
    }
}

/// Extraction strategy that produced a candidate value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// The upstream structured extractor (model-based).
    Primary,
    /// Anchored text-pattern search over page text elements.
    TextFallback,
    /// Ink-density analysis of a calibrated checkbox region.
    CheckboxFallback,
    /// Cross-field assist: a confident sibling text signal standing in for
    /// an ambiguous visual checkbox read.
    AssistedOverride,
}

impl StrategyKind {
    /// Fixed priority used to break exact confidence ties between
    /// non-primary candidates: checkbox fallback > text fallback >
    /// assisted override.
    #[inline]
    #[must_use = "tie-break priority is computed but not used"]
    pub const fn tie_break_priority(self) -> u8 {
        match self {
            Self::Primary => 3,
            Self::CheckboxFallback => 2,
            Self::TextFallback => 1,
            Self::AssistedOverride => 0,
        }
    }
}

impl fmt::Display for StrategyKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Primary => "primary",
            Self::TextFallback => "text_fallback",
            Self::CheckboxFallback => "checkbox_fallback",
            Self::AssistedOverride => "assisted_override",
        };
        write!(f, "{s}")
    }
}

// ============================================================================
// Anchors and calibrated regions
// ============================================================================

/// Where to look for a field value relative to its located anchor label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowPolicy {
    /// Value sits on the same printed line, to the right of the label
    /// (colon-style labels such as `Date:`).
    SameLine,
    /// Value sits to the right or on the following lines within the
    /// configured gap limits (numbered box labels such as
    /// `1. Employee's name`).
    RightOrBelow,
}

/// Anchor specification for the text fallback resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorSpec {
    /// Label text to locate, matched case-insensitively with collapsed
    /// whitespace.
    pub label: String,
    /// Spatial window policy relative to the located label.
    pub policy: WindowPolicy,
}

/// Calibrated checkbox region in rendered-pixel coordinates.
///
/// The page is located at runtime by section classification; `x`/`y`/`w`/`h`
/// are fixed template geometry for that page kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibratedRegion {
    /// Page section the region belongs to.
    pub page: PageKind,
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Region width in pixels.
    pub w: u32,
    /// Region height in pixels.
    pub h: u32,
}

impl fmt::Display for CalibratedRegion {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x={} y={} w={} h={}",
            self.page, self.x, self.y, self.w, self.h
        )
    }
}

// ============================================================================
// FieldSpec
// ============================================================================

/// Immutable declaration of one resolvable field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Field identifier.
    pub id: FieldId,
    /// Semantic kind.
    pub kind: FieldKind,
    /// Whether the field must appear in the resolved map.
    pub required: bool,
    /// Allowed extraction strategies, ordered by preference.
    pub strategies: Vec<StrategyKind>,
    /// Anchor for the text fallback's spatial search.
    pub anchor: Option<AnchorSpec>,
    /// Document-wide scan patterns; first capture group is the value.
    pub scan_patterns: Vec<Regex>,
    /// Page section the field is expected on; ranks document-wide scan hits.
    pub section: PageKind,
    /// Calibrated checkbox region, for checkbox fields.
    pub region: Option<CalibratedRegion>,
    /// Per-field primary acceptance threshold; the calibration default
    /// applies when absent.
    pub acceptance_threshold: Option<f32>,
}

impl FieldSpec {
    /// Whether the given strategy may produce candidates for this field.
    #[inline]
    #[must_use = "strategy check result is returned but not used"]
    pub fn allows(&self, strategy: StrategyKind) -> bool {
        self.strategies.contains(&strategy)
    }
}

/// One fixed cross-field assist relationship: the paired text field is only
/// ever filled on the form when its checkbox is checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistPair {
    /// The checkbox field the assist may resolve.
    pub checkbox: FieldId,
    /// The paired date/description field whose presence implies a check.
    pub text: FieldId,
}

// ============================================================================
// SchemaRegistry
// ============================================================================

/// Registry of all field specs for one document type.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    specs: Vec<FieldSpec>,
    index: HashMap<FieldId, usize>,
    assist_pairs: Vec<AssistPair>,
}

impl SchemaRegistry {
    fn from_parts(specs: Vec<FieldSpec>, assist_pairs: Vec<AssistPair>) -> Self {
        let index = specs
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        Self {
            specs,
            index,
            assist_pairs,
        }
    }

    /// Look up a spec by field identifier.
    #[inline]
    #[must_use = "field spec lookup result is returned but not used"]
    pub fn get(&self, id: &FieldId) -> Option<&FieldSpec> {
        self.index.get(id).map(|&i| &self.specs[i])
    }

    /// All field specs, in declaration order.
    #[inline]
    #[must_use = "spec slice is returned but not used"]
    pub fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    /// Number of declared fields.
    #[inline]
    #[must_use = "field count is returned but not used"]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the registry declares no fields.
    #[inline]
    #[must_use = "emptiness check result is returned but not used"]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// The fixed assist relationships.
    #[inline]
    #[must_use = "assist pair slice is returned but not used"]
    pub fn assist_pairs(&self) -> &[AssistPair] {
        &self.assist_pairs
    }

    /// The assist relationship whose checkbox is `id`, if any.
    #[inline]
    #[must_use = "assist pair lookup result is returned but not used"]
    pub fn assist_pair_for(&self, id: &FieldId) -> Option<&AssistPair> {
        self.assist_pairs.iter().find(|p| &p.checkbox == id)
    }

    /// Build the production DWC Form 32 schema.
    ///
    /// Field inventory, anchors, scan patterns and checkbox geometry follow
    /// the deployed form templates. Checkbox region coordinates are in the
    /// 200-dpi rendered-pixel space of the standard page rasters.
    #[must_use = "registry is built but not used"]
    pub fn form32() -> Self {
        let mut specs = Vec::new();

        // --- Exam scheduling (commissioner's order cover letter) ---
        specs.push(date_field(
            "exam_date",
            PageKind::FrontPage,
            anchor("Date:", WindowPolicy::SameLine),
            &[
                r"(?i)Date:\s*\|?\s*(\d{2}/\d{2}/\d{4})",
                r"(?is)Your\s*exam\s*is\s*on:.*?(\d{2}/\d{2}/\d{4})",
                r"(?i)exam\s*is\s*on:\s*(\d{2}/\d{2}/\d{4})",
            ],
            true,
        ));
        specs.push(text_field(
            "exam_time",
            PageKind::FrontPage,
            anchor("Time:", WindowPolicy::SameLine),
            &[r"(?i)Time:\s*\|?\s*((?:1[0-2]|0?[1-9]):[0-5][0-9]\s*(?:AM|PM))"],
            false,
        ));
        specs.push(text_field(
            "exam_location",
            PageKind::FrontPage,
            anchor("Location:", WindowPolicy::SameLine),
            &[r"(?im)Location:\s*\|?\s*([^,\n|]+?)\s*(?:,|\d{3}[-.]|$)"],
            true,
        ));
        specs.push(text_field(
            "exam_location_city",
            PageKind::FrontPage,
            None,
            &[r"(?i)\b([A-Za-z]+)\s*,\s*TX\s+\d{5}"],
            false,
        ));
        specs.push(text_field(
            "doctor_name",
            PageKind::FrontPage,
            anchor("Name:", WindowPolicy::SameLine),
            &[r"(?i)Name:\s*\|?\s*([^\n|]+)"],
            false,
        ));
        specs.push(text_field(
            "doctor_phone",
            PageKind::FrontPage,
            anchor("Phone:", WindowPolicy::SameLine),
            &[r"(?i)Phone:\s*\|?\s*(\d{3}[.-]\d{3}[.-]\d{4})"],
            false,
        ));

        // --- Part 1: injured employee ---
        specs.push(text_field(
            "patient_name",
            PageKind::Part1Employee,
            anchor("1. Employee's name", WindowPolicy::RightOrBelow),
            &[
                r"(?i)Injured\s*employee:\s*([^\n]+)",
                r"(?is)1\.\s*Employee'?s\s*name[^\n]*\n\s*([^\n]+?)\s*2\.",
                r"(?i)Employee'?s\s*name\s*:\s*([^\n]+)",
            ],
            true,
        ));
        specs.push(text_field(
            "employee_ssn",
            PageKind::Part1Employee,
            anchor("2. Social Security number", WindowPolicy::RightOrBelow),
            &[
                r"(?is)Social\s*Security\s*number.*?XXX\D*XX\D*(\d{4})",
                r"(?is)SSN.*?XXX\D*XX\D*(\d{4})",
            ],
            false,
        ));
        specs.push(date_field(
            "employee_date_of_birth",
            PageKind::Part1Employee,
            anchor("2. Date of birth", WindowPolicy::RightOrBelow),
            &[r"(?is)Date\s*of\s*birth[^\n]*\n?\s*(\d{1,2}[./]\d{1,2}[./]\d{4})"],
            false,
        ));
        specs.push(text_field(
            "employee_address",
            PageKind::Part1Employee,
            anchor("3. Employee's address", WindowPolicy::RightOrBelow),
            &[r"(?is)3\.\s*Employee'?s\s*address[^\n]*\n(\d+[^,\n]+,\s*[^,\n]+,\s*(?:Texas|TX)\s+\d{5})"],
            false,
        ));
        specs.push(text_field(
            "employee_county",
            PageKind::Part1Employee,
            anchor("4. Employee's county", WindowPolicy::RightOrBelow),
            &[r"(?is)4\.\s*Employee(?:'?s)?\s*county[^\n]*\n.*?([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\s+County)"],
            false,
        ));
        specs.push(text_field(
            "employee_primary_phone",
            PageKind::Part1Employee,
            anchor("5. Employee's primary phone", WindowPolicy::RightOrBelow),
            &[r"(?is)5\.\s*Employee(?:'?s)?\s*primary\s*phone[^\n]*\n\s*(\(?\d{3}\)?[\s.-]*\d{3}[\s.-]*\d{4})"],
            false,
        ));
        specs.push(date_field(
            "date_of_injury",
            PageKind::Part1Employee,
            anchor("8. Date of injury", WindowPolicy::RightOrBelow),
            &[r"(?is)8\.\s*Date\s*of\s*injury.*?\n\s*(\d{1,2}[./]\d{1,2}[./]\d{4})"],
            false,
        ));
        specs.push(text_field(
            "employer_name",
            PageKind::Part1Employee,
            anchor("13. Employer's name", WindowPolicy::RightOrBelow),
            &[
                r"(?is)13\.\s*Employer(?:'?s)?\s*name.*?14\.\s*Employer(?:'?s)?\s*phone[^\n]*\n\s*([^\d\n]+)",
                r"(?i)Employer:\s*([^\n]+?)\s+Insurance",
            ],
            false,
        ));

        // --- Part 2: insurance carrier ---
        specs.push(text_field(
            "insurance_carrier",
            PageKind::NetworkQuestions,
            anchor("16. Insurance carrier's name", WindowPolicy::RightOrBelow),
            &[r"(?is)16\.\s*Insurance\s*carrier(?:'?s)?\s*name[^\n]*\n(.+?)\s*17\."],
            false,
        ));
        specs.push(text_field(
            "carrier_address",
            PageKind::NetworkQuestions,
            anchor("17. Insurance carrier's address", WindowPolicy::RightOrBelow),
            &[r"(?is)17\.\s*Insurance\s*carrier(?:'?s)?\s*address[^\n]*\n(\d+[^,\n]+,\s*[^,\n]+,\s*(?:Texas|TX|[A-Z]{2})\s+\d{5})"],
            false,
        ));
        specs.push(text_field(
            "adjuster_name",
            PageKind::NetworkQuestions,
            anchor("18. Adjuster's name", WindowPolicy::RightOrBelow),
            &[r"(?is)18\.\s*Adjuster(?:'?s)?\s*name[^\n]*\n\s*(.+?)\s*19\."],
            false,
        ));
        specs.push(text_field(
            "adjuster_email",
            PageKind::NetworkQuestions,
            anchor("20. Adjuster's email", WindowPolicy::RightOrBelow),
            &[r"(?is)Adjuster(?:'?s)?\s*email[^\n]*\n\s*([a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})"],
            false,
        ));
        specs.push(text_field(
            "claim_number",
            PageKind::NetworkQuestions,
            anchor("Insurance carrier claim #", WindowPolicy::SameLine),
            &[
                r"(?i)Insurance\s+carrier\s+claim\s+#[\s:]*([A-Z0-9]+)",
                r"(?i)claim\s+#\s*([A-Z0-9]+)",
            ],
            false,
        ));
        specs.push(text_field(
            "dwc_number",
            PageKind::NetworkQuestions,
            anchor("DWC #:", WindowPolicy::SameLine),
            &[
                r"(?i)DWC\s*#:\s*(\d+(?:-[A-Z]+)?)",
                r"(?is)DWC\s*claim\s*number.*?:\s*(\d+(?:-[A-Z]+)?)",
            ],
            false,
        ));

        // --- Part 3: treating doctor ---
        specs.push(text_field(
            "treating_doctor_name",
            PageKind::Part3TreatingDoctor,
            anchor("24. Treating doctor's name", WindowPolicy::RightOrBelow),
            &[r"(?is)24\.\s*Treating\s*doctor(?:'?s)?\s*name[^\n]*\n\s*([A-Za-z.\-\s]+?),\s*(?:MD|DO|DC)\b"],
            false,
        ));
        specs.push(text_field(
            "treating_doctor_phone",
            PageKind::Part3TreatingDoctor,
            anchor("25. Phone number", WindowPolicy::RightOrBelow),
            &[r"(?is)25\.\s*Phone\s*number[^\n]*\n\s*(\(?\d{3}\)?[\s.-]*\d{3}[\s.-]*\d{4})"],
            false,
        ));
        specs.push(text_field(
            "treating_doctor_license_number",
            PageKind::Part3TreatingDoctor,
            anchor("28. License number", WindowPolicy::SameLine),
            &[r"(?i)28\.\s*License\s*number\s*([A-Z0-9]+)"],
            false,
        ));

        // --- Part 4: body areas and diagnoses ---
        specs.push(FieldSpec {
            id: FieldId::from("extent_of_injury"),
            kind: FieldKind::LongText,
            required: false,
            strategies: vec![StrategyKind::Primary, StrategyKind::TextFallback],
            anchor: Some(AnchorSpec {
                label: "30. Extent of injury".to_string(),
                policy: WindowPolicy::RightOrBelow,
            }),
            scan_patterns: compile(&[r"(?is)extent\s+of\s+injury[^\n]*\n(.+?)\s*(?:31\.|Part\s*5)"]),
            section: PageKind::Part4BodyAreas,
            region: None,
            acceptance_threshold: None,
        });
        specs.push(FieldSpec {
            id: FieldId::from("diagnosis_codes"),
            kind: FieldKind::RepeatedGroup,
            required: false,
            strategies: vec![StrategyKind::Primary, StrategyKind::TextFallback],
            anchor: anchor("Diagnosis codes", WindowPolicy::RightOrBelow),
            scan_patterns: compile(&[r"\b([A-TV-Z]\d{2}(?:\.\d{1,4})?)\b"]),
            section: PageKind::Part4BodyAreas,
            region: None,
            acceptance_threshold: None,
        });

        for (name, y) in BODY_AREA_ROWS {
            specs.push(checkbox_field(
                &format!("body_area_{name}"),
                CalibratedRegion {
                    page: PageKind::Part4BodyAreas,
                    x: 83,
                    y: *y,
                    w: 30,
                    h: 30,
                },
                false,
                false,
            ));
        }

        // --- Part 2 network questions (Q22/Q23) ---
        specs.push(checkbox_field(
            "has_certified_network",
            CalibratedRegion {
                page: PageKind::NetworkQuestions,
                x: 377,
                y: 1778,
                w: 22,
                h: 22,
            },
            false,
            false,
        ));
        specs.push(checkbox_field(
            "has_political_subdivision",
            CalibratedRegion {
                page: PageKind::NetworkQuestions,
                x: 377,
                y: 1908,
                w: 22,
                h: 22,
            },
            false,
            false,
        ));

        // --- Part 5: purpose of examination (boxes A-G, DWC-024) ---
        for (name, y, assisted) in PURPOSE_ROWS {
            specs.push(checkbox_field(
                &format!("purpose_box_{name}_checked"),
                CalibratedRegion {
                    page: PageKind::Part5Purpose,
                    x: 87,
                    y: *y,
                    w: 22,
                    h: 22,
                },
                true,
                *assisted,
            ));
        }
        specs.push(checkbox_field(
            "dwc024_yes_checked",
            CalibratedRegion {
                page: PageKind::Part5Purpose,
                x: 87,
                y: 1914,
                w: 22,
                h: 22,
            },
            false,
            false,
        ));
        specs.push(checkbox_field(
            "dwc024_no_checked",
            CalibratedRegion {
                page: PageKind::Part5Purpose,
                x: 87,
                y: 1958,
                w: 22,
                h: 22,
            },
            false,
            false,
        ));

        // Paired date fields backing the Part 5 assist relationships.
        specs.push(date_field(
            "purpose_mmi_date",
            PageKind::Part5Purpose,
            anchor("A. Maximum Medical Improvement", WindowPolicy::RightOrBelow),
            &[r"(?is)maximum\s+medical\s+improvement.*?(\d{1,2}/\d{1,2}/\d{4})"],
            false,
        ));
        specs.push(date_field(
            "purpose_disability_from_date",
            PageKind::Part5Purpose,
            anchor("D. Ability to work", WindowPolicy::RightOrBelow),
            &[r"(?is)ability\s+to\s+work.*?from\s*:?\s*(\d{1,2}/\d{1,2}/\d{4})"],
            false,
        ));
        specs.push(date_field(
            "purpose_rtw_from_date",
            PageKind::Part5Purpose,
            anchor("E. Return to work", WindowPolicy::RightOrBelow),
            &[r"(?is)return\s+to\s+work.*?from\s*:?\s*(\d{1,2}/\d{1,2}/\d{4})"],
            false,
        ));
        specs.push(date_field(
            "purpose_sib_from_date",
            PageKind::Part5Purpose,
            anchor("F. Supplemental income benefits", WindowPolicy::RightOrBelow),
            &[r"(?is)supplemental\s+income\s+benefits.*?from\s*:?\s*(\d{1,2}/\d{1,2}/\d{4})"],
            false,
        ));

        let assist_pairs = vec![
            AssistPair {
                checkbox: FieldId::from("purpose_box_a_checked"),
                text: FieldId::from("purpose_mmi_date"),
            },
            AssistPair {
                checkbox: FieldId::from("purpose_box_d_checked"),
                text: FieldId::from("purpose_disability_from_date"),
            },
            AssistPair {
                checkbox: FieldId::from("purpose_box_e_checked"),
                text: FieldId::from("purpose_rtw_from_date"),
            },
            AssistPair {
                checkbox: FieldId::from("purpose_box_f_checked"),
                text: FieldId::from("purpose_sib_from_date"),
            },
        ];

        Self::from_parts(specs, assist_pairs)
    }
}

/// Body area checkbox rows on the Part 4 page: (field suffix, top edge y).
const BODY_AREA_ROWS: &[(&str, u32)] = &[
    ("spine", 704),
    ("upper_extremities", 790),
    ("lower_extremities", 877),
    ("feet", 964),
    ("teeth_jaw", 1055),
    ("eyes", 1116),
    ("other_systems", 1170),
    ("brain_injury", 1342),
    ("spinal_cord", 1390),
    ("burns", 1481),
    ("fractures", 1530),
    ("infectious", 1580),
    ("regional_pain", 1630),
    ("chemical_exposure", 1680),
    ("cardiovascular", 1730),
    ("mental_disorders", 1780),
];

/// Purpose checkbox rows on the Part 5 page:
/// (box letter, top edge y, has assist pairing).
const PURPOSE_ROWS: &[(&str, u32, bool)] = &[
    ("a", 361, true),
    ("b", 501, false),
    ("c", 712, false),
    ("d", 1144, true),
    ("e", 1370, true),
    ("f", 1555, true),
    ("g", 1782, false),
];

// ============================================================================
// Construction helpers
// ============================================================================

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("hard-coded schema pattern compiles"))
        .collect()
}

fn anchor(label: &str, policy: WindowPolicy) -> Option<AnchorSpec> {
    Some(AnchorSpec {
        label: label.to_string(),
        policy,
    })
}

fn text_field(
    id: &str,
    section: PageKind,
    anchor: Option<AnchorSpec>,
    patterns: &[&str],
    required: bool,
) -> FieldSpec {
    FieldSpec {
        id: FieldId::from(id),
        kind: FieldKind::ShortText,
        required,
        strategies: vec![StrategyKind::Primary, StrategyKind::TextFallback],
        anchor,
        scan_patterns: compile(patterns),
        section,
        region: None,
        acceptance_threshold: None,
    }
}

fn date_field(
    id: &str,
    section: PageKind,
    anchor: Option<AnchorSpec>,
    patterns: &[&str],
    required: bool,
) -> FieldSpec {
    FieldSpec {
        kind: FieldKind::Date,
        ..text_field(id, section, anchor, patterns, required)
    }
}

fn checkbox_field(id: &str, region: CalibratedRegion, required: bool, assisted: bool) -> FieldSpec {
    let mut strategies = vec![StrategyKind::Primary, StrategyKind::CheckboxFallback];
    if assisted {
        strategies.push(StrategyKind::AssistedOverride);
    }
    FieldSpec {
        id: FieldId::from(id),
        kind: FieldKind::Checkbox,
        required,
        strategies,
        anchor: None,
        scan_patterns: Vec::new(),
        section: region.page,
        region: Some(region),
        acceptance_threshold: None,
    }
}
