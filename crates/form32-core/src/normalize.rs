//! Value normalization for extracted field content.
//!
//! Raw strings from the primary extractor and the text fallback pass through
//! here before they become candidate values, so every strategy competes on
//! the same normalized representation: dates as `MM/DD/YYYY`, phones as
//! `XXX.XXX.XXXX`, SSNs reduced to their last four digits, checkbox enums
//! folded to tri-state.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::{FieldId, FieldKind, FieldSpec};
use crate::value::{CheckboxState, FieldValue};

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}[./-]\d{1,2}[./-]\d{4}|\d{4}-\d{1,2}-\d{1,2})").expect("date pattern"));
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2}):(\d{2})\s*(AM|PM)").expect("time pattern"));
static TEXAS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bTexas\b").expect("state pattern"));
static TRAILING_ENUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.\s*$").expect("enumeration pattern"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));
static CITY_STATE_ZIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z\s]+),\s*[A-Z]{2}\s*\d{5}").expect("city pattern"));

const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d"];

/// VLM checkbox enum spellings that mean "checked".
const CHECKED_WORDS: &[&str] = &["selected", "checked", "yes", "true", "filled", "checkbox filled"];
/// Spellings that mean "unchecked".
const UNCHECKED_WORDS: &[&str] = &[
    "unselected",
    "unchecked",
    "no",
    "false",
    "empty",
    "not checked",
    "checkbox empty",
];

/// Whether a raw value is effectively absent: empty, or one of the table
/// rendering artifacts the conversion step leaks (`|`, `||`, ...).
#[must_use = "missing-value check result is returned but not used"]
pub fn is_missing_or_invalid(value: &str) -> bool {
    let stripped = value.trim();
    stripped.is_empty() || stripped.chars().all(|c| c == '|' || c.is_whitespace())
}

/// Normalize a date to `MM/DD/YYYY`.
///
/// The date may be embedded in surrounding text; the first recognizable
/// date substring is used. Returns `None` when nothing parses as a real
/// calendar date.
#[must_use = "normalized date is returned but not used"]
pub fn normalize_date(raw: &str) -> Option<String> {
    let captured = DATE_RE.find(raw)?.as_str().replace('.', "/");
    for format in DATE_FORMATS {
        let candidate = if format.starts_with("%Y") {
            captured.replace('/', "-")
        } else {
            captured.replace('-', "/")
        };
        if let Ok(date) = NaiveDate::parse_from_str(&candidate, format) {
            return Some(date.format("%m/%d/%Y").to_string());
        }
    }
    None
}

/// Normalize a clock time to `H:MM AM|PM`.
#[must_use = "normalized time is returned but not used"]
pub fn normalize_time(raw: &str) -> Option<String> {
    let caps = TIME_RE.captures(raw)?;
    let hour: u8 = caps[1].parse().ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    let minute: u8 = caps[2].parse().ok()?;
    if minute > 59 {
        return None;
    }
    Some(format!("{hour}:{:02} {}", minute, caps[3].to_uppercase()))
}

/// Normalize a US phone or fax number to `XXX.XXX.XXXX`.
///
/// Unrecognized shapes pass through trimmed rather than being dropped; a
/// reviewer can still act on a partial number.
#[must_use = "normalized phone is returned but not used"]
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let formatted = match digits.len() {
        10 => format!("{}.{}.{}", &digits[..3], &digits[3..6], &digits[6..]),
        11 if digits.starts_with('1') => {
            format!("{}.{}.{}", &digits[1..4], &digits[4..7], &digits[7..])
        }
        _ => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.to_string()
        }
    };
    Some(formatted)
}

/// Reduce an SSN to its last four digits.
#[must_use = "SSN suffix is returned but not used"]
pub fn ssn_last_four(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() >= 4 {
        Some(digits[digits.len() - 4..].to_string())
    } else {
        None
    }
}

/// Abbreviate the spelled-out state in an address.
#[must_use = "cleaned address is returned but not used"]
pub fn clean_address(raw: &str) -> String {
    let replaced = TEXAS_RE.replace_all(raw.trim(), "TX");
    WHITESPACE_RE.replace_all(&replaced, " ").into_owned()
}

/// Strip trailing field-number artifacts from a person or business name and
/// collapse whitespace.
#[must_use = "cleaned name is returned but not used"]
pub fn clean_name(raw: &str) -> String {
    let stripped = TRAILING_ENUM_RE.replace(raw.trim(), "");
    WHITESPACE_RE.replace_all(stripped.trim(), " ").into_owned()
}

/// Normalize a claim/DWC number: drop embedded whitespace and the `-HW`
/// routing suffix.
#[must_use = "cleaned claim number is returned but not used"]
pub fn clean_claim_number(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    compact.strip_suffix("-HW").unwrap_or(&compact).to_string()
}

/// Extract the city from a `City, ST 12345` style location string.
#[must_use = "extracted city is returned but not used"]
pub fn extract_city(raw: &str) -> Option<String> {
    if let Some(caps) = CITY_STATE_ZIP_RE.captures(raw) {
        let city = caps[1].trim();
        if !city.is_empty() {
            return Some(city.to_uppercase());
        }
    }
    let before_comma = raw.split(',').next()?.trim();
    if before_comma.is_empty() || before_comma == raw.trim() {
        None
    } else {
        Some(before_comma.to_uppercase())
    }
}

/// Fold a structured-extractor checkbox enum string to tri-state.
#[must_use = "checkbox state is returned but not used"]
pub fn checkbox_state_from_str(raw: &str) -> Option<CheckboxState> {
    let lower = raw.trim().to_lowercase();
    if CHECKED_WORDS.contains(&lower.as_str()) {
        Some(CheckboxState::Checked)
    } else if UNCHECKED_WORDS.contains(&lower.as_str()) {
        Some(CheckboxState::Unchecked)
    } else {
        None
    }
}

/// Normalize a raw extracted string into a typed field value, per the
/// field's spec.
///
/// Returns `None` when the value is missing, an artifact, or fails the
/// kind's shape requirements — callers must treat that as "no candidate",
/// never as an empty value.
#[must_use = "normalized field value is returned but not used"]
pub fn normalize_field_value(spec: &FieldSpec, raw: &str) -> Option<FieldValue> {
    if is_missing_or_invalid(raw) {
        return None;
    }
    match spec.kind {
        FieldKind::Checkbox => checkbox_state_from_str(raw).map(FieldValue::Checkbox),
        FieldKind::Date => normalize_date(raw).map(FieldValue::Text),
        FieldKind::RepeatedGroup => {
            let items: Vec<String> = raw
                .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if items.is_empty() {
                None
            } else {
                Some(FieldValue::Group(items))
            }
        }
        FieldKind::ShortText | FieldKind::LongText => {
            normalize_text_by_id(&spec.id, raw).map(FieldValue::Text)
        }
    }
}

/// Per-field text cleanup, keyed by identifier conventions.
fn normalize_text_by_id(id: &FieldId, raw: &str) -> Option<String> {
    let name = id.as_str();
    let cleaned = if name == "employee_ssn" {
        ssn_last_four(raw)?
    } else if name == "exam_time" {
        normalize_time(raw)?
    } else if name == "exam_location_city" {
        extract_city(raw).unwrap_or_else(|| raw.trim().to_uppercase())
    } else if name == "dwc_number" || name == "claim_number" {
        clean_claim_number(raw)
    } else if name.contains("phone") || name.contains("fax") {
        normalize_phone(raw)?
    } else if name.contains("address") || name.contains("location") {
        clean_address(raw)
    } else if name.contains("name") {
        clean_name(raw)
    } else {
        WHITESPACE_RE.replace_all(raw.trim(), " ").into_owned()
    };

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageKind;
    use crate::schema::StrategyKind;

    fn spec(id: &str, kind: FieldKind) -> FieldSpec {
        FieldSpec {
            id: FieldId::from(id),
            kind,
            required: false,
            strategies: vec![StrategyKind::Primary],
            anchor: None,
            scan_patterns: vec![],
            section: PageKind::Unclassified,
            region: None,
            acceptance_threshold: None,
        }
    }

    #[test]
    fn test_normalize_date_variants() {
        assert_eq!(normalize_date("02/15/2024"), Some("02/15/2024".to_string()));
        assert_eq!(normalize_date("2.5.2024"), Some("02/05/2024".to_string()));
        assert_eq!(
            normalize_date("scheduled for 3-22-2024 at the clinic"),
            Some("03/22/2024".to_string())
        );
        assert_eq!(normalize_date("2024-03-22"), Some("03/22/2024".to_string()));
        assert_eq!(normalize_date("13/45/2024"), None);
        assert_eq!(normalize_date("no date here"), None);
    }

    #[test]
    fn test_normalize_time() {
        assert_eq!(normalize_time("10:00 am"), Some("10:00 AM".to_string()));
        assert_eq!(normalize_time("2:30PM"), Some("2:30 PM".to_string()));
        assert_eq!(normalize_time("14:30"), None);
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(
            normalize_phone("(214) 555-1234"),
            Some("214.555.1234".to_string())
        );
        assert_eq!(
            normalize_phone("1-512-555-6789"),
            Some("512.555.6789".to_string())
        );
        assert_eq!(normalize_phone("555-1234"), Some("555-1234".to_string()));
        assert_eq!(normalize_phone("   "), None);
    }

    #[test]
    fn test_ssn_last_four() {
        assert_eq!(ssn_last_four("XXX-XX-1234"), Some("1234".to_string()));
        assert_eq!(ssn_last_four("123-45-6789"), Some("6789".to_string()));
        assert_eq!(ssn_last_four("12"), None);
    }

    #[test]
    fn test_clean_address_and_name() {
        assert_eq!(
            clean_address("123 Main St, Dallas,  Texas 75201"),
            "123 Main St, Dallas, TX 75201"
        );
        assert_eq!(clean_name("JOHN  DOE 2."), "JOHN DOE");
    }

    #[test]
    fn test_clean_claim_number() {
        assert_eq!(clean_claim_number("123 456 789-HW"), "123456789");
        assert_eq!(clean_claim_number("WC123456"), "WC123456");
    }

    #[test]
    fn test_extract_city() {
        assert_eq!(
            extract_city("Dallas Medical Center, Dallas, TX 75201"),
            Some("DALLAS".to_string())
        );
        assert_eq!(extract_city("Austin, TX 78701"), Some("AUSTIN".to_string()));
        assert_eq!(extract_city("nowhere"), None);
    }

    #[test]
    fn test_checkbox_state_from_str() {
        assert_eq!(
            checkbox_state_from_str("Selected"),
            Some(CheckboxState::Checked)
        );
        assert_eq!(
            checkbox_state_from_str("checkbox filled"),
            Some(CheckboxState::Checked)
        );
        assert_eq!(
            checkbox_state_from_str("unchecked"),
            Some(CheckboxState::Unchecked)
        );
        assert_eq!(checkbox_state_from_str("maybe"), None);
    }

    #[test]
    fn test_is_missing_or_invalid() {
        assert!(is_missing_or_invalid(""));
        assert!(is_missing_or_invalid("  "));
        assert!(is_missing_or_invalid("||"));
        assert!(is_missing_or_invalid("| |"));
        assert!(!is_missing_or_invalid("JOHN"));
    }

    #[test]
    fn test_normalize_field_value_dispatch() {
        let date_spec = spec("exam_date", FieldKind::Date);
        assert_eq!(
            normalize_field_value(&date_spec, "02/15/2024"),
            Some(FieldValue::Text("02/15/2024".to_string()))
        );

        let checkbox_spec = spec("purpose_box_c_checked", FieldKind::Checkbox);
        assert_eq!(
            normalize_field_value(&checkbox_spec, "selected"),
            Some(FieldValue::Checkbox(CheckboxState::Checked))
        );
        assert_eq!(normalize_field_value(&checkbox_spec, "garbled"), None);

        let group_spec = spec("diagnosis_codes", FieldKind::RepeatedGroup);
        assert_eq!(
            normalize_field_value(&group_spec, "M54.5, S33.5"),
            Some(FieldValue::Group(vec![
                "M54.5".to_string(),
                "S33.5".to_string()
            ]))
        );

        let phone_spec = spec("employee_primary_phone", FieldKind::ShortText);
        assert_eq!(
            normalize_field_value(&phone_spec, "(214) 555-1234"),
            Some(FieldValue::Text("214.555.1234".to_string()))
        );

        let name_spec = spec("patient_name", FieldKind::ShortText);
        assert_eq!(normalize_field_value(&name_spec, "||"), None);
    }
}
