// tests/status_properties.rs

use proptest::prelude::*;
use sesame::status::{ExecutionStatus, StatusClass, classify, is_terminal};

fn known_status() -> impl Strategy<Value = &'static str> {
    let known: Vec<&'static str> = ExecutionStatus::known_values().collect();
    proptest::sample::select(known)
}

// Respell a known value the way other tooling might: random case per
// character, with separators sprinkled between characters.
fn respelled(raw: &str, upper: &[bool], seps: &[u8]) -> String {
    let mut out = String::new();
    for (i, c) in raw.chars().enumerate() {
        if upper.get(i).copied().unwrap_or(false) {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        match seps.get(i).copied().unwrap_or(0) {
            1 => out.push('-'),
            2 => out.push('_'),
            _ => {}
        }
    }
    out
}

proptest! {
    #[test]
    fn unknown_values_fail_closed(raw in "[A-Za-z ]{0,24}") {
        let known = ExecutionStatus::known_values()
            .any(|k| k.eq_ignore_ascii_case(raw.trim()));
        prop_assume!(!known);
        prop_assert_eq!(classify(&raw), StatusClass::Failed);
        prop_assert!(is_terminal(&raw));
    }

    #[test]
    fn classification_is_stable_across_calls(raw in ".{0,32}") {
        let first = classify(&raw);
        prop_assert_eq!(classify(&raw), first);
        prop_assert_eq!(ExecutionStatus::parse(&raw).class(), first);
    }

    #[test]
    fn canonical_spelling_survives_a_parse(name in known_status()) {
        let parsed = ExecutionStatus::parse(name);
        prop_assert_eq!(parsed.as_str(), name);
        prop_assert!(!matches!(parsed, ExecutionStatus::Unrecognized(_)));
    }

    #[test]
    fn spelling_variants_classify_like_the_canonical_value(
        name in known_status(),
        upper in proptest::collection::vec(any::<bool>(), 40),
        seps in proptest::collection::vec(0u8..3, 40),
    ) {
        let variant = respelled(name, &upper, &seps);
        prop_assert_eq!(classify(&variant), classify(name));
        prop_assert_eq!(ExecutionStatus::parse(&variant), ExecutionStatus::parse(name));
    }
}

#[test]
fn every_known_value_has_exactly_one_class() {
    let mut counts = [0usize; 3];
    for name in ExecutionStatus::known_values() {
        match classify(name) {
            StatusClass::Pending => counts[0] += 1,
            StatusClass::Succeeded => counts[1] += 1,
            StatusClass::Failed => counts[2] += 1,
        }
    }
    assert_eq!(counts, [11, 2, 5]);
}
