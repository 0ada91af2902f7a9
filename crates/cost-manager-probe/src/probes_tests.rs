// crates/cost-manager-probe/src/probes_tests.rs
// ============================================================================
// Module: Probe Catalog Unit Tests
// Description: Unit coverage for probe names and ordering.
// Purpose: Ensure CLI-facing names stay stable and parse back.
// Dependencies: serde_json
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::collections::BTreeSet;

use crate::ProbeId;
use crate::UnknownProbe;

#[test]
fn names_are_unique_and_parse_back() {
    let names: BTreeSet<&str> = ProbeId::ALL.iter().map(|probe| probe.as_str()).collect();
    assert_eq!(names.len(), ProbeId::ALL.len());
    for probe in ProbeId::ALL {
        assert_eq!(probe.as_str().parse::<ProbeId>(), Ok(probe));
        assert!(!probe.description().is_empty());
    }
}

#[test]
fn serde_name_matches_display() {
    for probe in ProbeId::ALL {
        let encoded = serde_json::to_value(probe).unwrap();
        assert_eq!(encoded, serde_json::Value::from(probe.to_string()));
    }
}

#[test]
fn unknown_names_are_rejected() {
    assert_eq!("Users-Listed".parse::<ProbeId>(), Err(UnknownProbe("Users-Listed".to_string())));
    assert_eq!(
        "".parse::<ProbeId>().unwrap_err().to_string(),
        "unknown probe ``"
    );
}

#[test]
fn catalog_starts_with_reads_and_ends_with_rejections() {
    assert_eq!(ProbeId::ALL.first(), Some(&ProbeId::UsersListed));
    assert_eq!(ProbeId::ALL.last(), Some(&ProbeId::RejectsReportWithoutParams));
}
