use studlife_core::date::{parse_date, to_iso};
use studlife_core::{normalize_to_canonical, sort_key};

#[test]
fn both_encodings_normalize_to_same_canonical_date() {
    assert_eq!(normalize_to_canonical("2025-11-23"), "23.11.2025");
    assert_eq!(normalize_to_canonical("23.11.2025"), "23.11.2025");
    assert_eq!(normalize_to_canonical(" 3.1.2025 "), "03.01.2025");
    assert_eq!(normalize_to_canonical("2025-1-3"), "03.01.2025");
}

#[test]
fn normalized_dates_keep_calendar_order() {
    let inputs = ["2025-11-30", "01.12.2025", "2025-11-02", "15.11.2025"];
    let mut canonical: Vec<String> = inputs.iter().map(|d| normalize_to_canonical(d)).collect();
    canonical.sort_by_key(|value| sort_key(value));

    let iso: Vec<String> = canonical
        .iter()
        .map(|value| to_iso(parse_date(value).unwrap()))
        .collect();
    assert_eq!(
        iso,
        vec!["2025-11-02", "2025-11-15", "2025-11-30", "2025-12-01"]
    );
}

#[test]
fn dotted_strings_compare_by_date_not_text() {
    // Lexically "02.12" < "30.11", chronologically the opposite.
    assert!(sort_key("30.11.2025") < sort_key("02.12.2025"));
}

#[test]
fn unparsable_values_pass_through_and_sort_first() {
    assert_eq!(normalize_to_canonical("  someday "), "someday");
    assert_eq!(normalize_to_canonical(""), "");
    assert!(parse_date("31.02.2025").is_none());
    assert!(sort_key("garbage") < sort_key("01.01.1971"));
}
