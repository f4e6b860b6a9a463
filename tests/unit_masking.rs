use elstat_etl::masking::{self, Dimension};
use proptest::prelude::*;

#[test]
fn greek_and_english_spellings_share_codes() {
    assert_eq!(masking::code_for(Dimension::Sex, "Άνδρες"), Some("M"));
    assert_eq!(masking::code_for(Dimension::Sex, "Males"), Some("M"));
    assert_eq!(masking::code_for(Dimension::Region, "Κρήτη"), Some("EL43"));
    assert_eq!(masking::code_for(Dimension::Region, "Crete"), Some("EL43"));
    assert_eq!(
        masking::code_for(Dimension::Status, "Μισθωτοί"),
        Some("SAL")
    );
    assert_eq!(
        masking::code_for(Dimension::Status, "Employees"),
        Some("SAL")
    );
}

#[test]
fn lookup_survives_case_accents_and_final_sigma() {
    assert_eq!(masking::code_for(Dimension::Sex, "ΓΥΝΑΙΚΕΣ"), Some("F"));
    assert_eq!(masking::code_for(Dimension::Sex, "σύνολο"), Some("T"));
    assert_eq!(masking::code_for(Dimension::Region, "ΗΠΕΙΡΟΣ"), Some("EL54"));
}

#[test]
fn footnote_markers_and_whitespace_stripped() {
    assert_eq!(masking::code_for(Dimension::Sex, "  Άνδρες 1)"), Some("M"));
    assert_eq!(masking::code_for(Dimension::Sex, "Γυναίκες (2)"), Some("F"));
    assert_eq!(masking::code_for(Dimension::Sex, "Σύνολο *"), Some("T"));
    assert_eq!(
        masking::code_for(Dimension::AgeBand, "15 - 24"),
        Some("Y15-24")
    );
}

#[test]
fn unknown_labels_are_none_and_require_code_errors() {
    assert_eq!(masking::code_for(Dimension::Sex, "Αγόρια"), None);
    assert_eq!(masking::code_for(Dimension::Sex, ""), None);
    assert!(masking::require_code(Dimension::Occupation, "Μάγοι").is_err());
}

#[test]
fn time_codes_cover_annual_and_quarterly_labels() {
    assert_eq!(masking::time_code("2019"), Some("2019".to_string()));
    assert_eq!(masking::time_code("Έτος 2019"), Some("2019".to_string()));
    assert_eq!(masking::time_code("Q3 2019"), Some("2019-Q3".to_string()));
    assert_eq!(
        masking::time_code("Α' τρίμηνο 2019"),
        Some("2019-Q1".to_string())
    );
    assert_eq!(
        masking::time_code("Δ' τρίμηνο 2020"),
        Some("2020-Q4".to_string())
    );
    assert_eq!(
        masking::time_code("1ο τρίμηνο 2018"),
        Some("2018-Q1".to_string())
    );
    assert_eq!(masking::time_code("Πηγή: ΕΛΣΤΑΤ"), None);
}

#[test]
fn stub_code_dispatches_by_dimension() {
    assert_eq!(
        masking::stub_code(Dimension::Time, "Β' τρίμηνο 2019"),
        Some("2019-Q2".to_string())
    );
    assert_eq!(
        masking::stub_code(Dimension::Region, "Αττική"),
        Some("EL30".to_string())
    );
    assert_eq!(masking::stub_code(Dimension::Region, "Atlantis"), None);
}

proptest! {
    #[test]
    fn normalization_output_is_canonical(raw in "\\PC{0,64}") {
        let normalized = masking::normalize_label(&raw);
        prop_assert_eq!(normalized.trim(), normalized.as_str());
        prop_assert!(!normalized.contains("  "));
        prop_assert!(!normalized.chars().any(|c| c.is_ascii_uppercase()));
        prop_assert!(!normalized.contains('ς'));
    }

    #[test]
    fn normalization_ignores_letter_case(raw in "[a-zA-Zα-ωΑ-Ω ]{0,32}") {
        prop_assert_eq!(
            masking::normalize_label(&raw.to_uppercase()),
            masking::normalize_label(&raw)
        );
    }
}
