use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::COLUMN_MAPPING;

/// `"1001.0"` → `"1001"`. Numeric ids that passed through a float column
/// pick up this suffix; stripping it keeps the id joinable across files.
static TRAILING_FLOAT_ZERO: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.0$").unwrap());

/// Trim whitespace + lowercase. Applied to every descriptive field and
/// header so that formatting variance cannot split one client into two
/// group keys.
pub fn clean_field(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// `clean_field` plus removal of a trailing `.0` float artifact.
pub fn clean_client_id(raw: &str) -> String {
    let cleaned = clean_field(raw);
    TRAILING_FLOAT_ZERO.replace(&cleaned, "").into_owned()
}

/// Canonical column name for a raw export header, if it is one of the
/// descriptive columns.
pub fn canonical_column(header: &str) -> Option<&'static str> {
    let cleaned = clean_field(header);
    COLUMN_MAPPING
        .iter()
        .find(|(raw, _)| *raw == cleaned)
        .map(|(_, canonical)| *canonical)
}

/// Shortest decimal form of a sales value: integers lose the `.0`.
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_field_trims_and_lowercases() {
        assert_eq!(clean_field("  North ZONE  "), "north zone");
        assert_eq!(clean_field("abc"), "abc");
        assert_eq!(clean_field(""), "");
    }

    #[test]
    fn clean_client_id_strips_float_artifact() {
        assert_eq!(clean_client_id("1001.0"), "1001");
        assert_eq!(clean_client_id(" 1001.0 "), "1001");
        assert_eq!(clean_client_id("1001"), "1001");
        // only an exact trailing ".0" is an artifact
        assert_eq!(clean_client_id("1001.05"), "1001.05");
        assert_eq!(clean_client_id("C-77.0"), "c-77");
    }

    #[test]
    fn canonical_column_maps_raw_spellings() {
        assert_eq!(canonical_column("Source ID"), Some("source_id"));
        assert_eq!(canonical_column(" distributor type "), Some("distributor_type"));
        assert_eq!(canonical_column("sourcezone"), Some("sourcezone"));
        assert_eq!(canonical_column("orderdate"), None);
    }

    #[test]
    fn format_number_drops_trailing_zero() {
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(-3.0), "-3");
    }
}
