//! Invariant 8 + the codec-equivalence literal scenario: the same scenario
//! serialized as JSON vs. binary shares one semantic key, independent of
//! which codec it carries; capture provenance, by contrast, is part of the
//! key.

use asx::fixture::{semantic_key, CodecKind, Provenance, ScenarioFixture};
use asx::profile::Profile;
use serde_json::json;

fn fixture(codec_kind: CodecKind, capture_run_id: &'static str) -> ScenarioFixture {
    ScenarioFixture {
        scenario_id: "region-lifecycle-ok".to_string(),
        fixture_schema_version: 1,
        scenario_dsl_version: 1,
        profile: Profile::Core,
        codec_kind,
        seed: 7,
        input: json!({ "task_count": 3 }),
        expected_events: json!([{ "kind": "region_opened" }]),
        expected_final_snapshot: json!({ "region_state": "closed" }),
        expected_error_codes: Vec::new(),
        semantic_digest: "sha256:placeholder".to_string(),
        provenance: Provenance {
            baseline_commit: "abc123".to_string(),
            toolchain_identity: "rustc-1.80".to_string(),
            capture_run_id: capture_run_id.to_string(),
        },
    }
}

#[test]
fn json_and_bin_codec_variants_share_a_semantic_key() {
    let json_fixture = fixture(CodecKind::Json, "run-1");
    let bin_fixture = fixture(CodecKind::Bin, "run-1");
    assert_eq!(semantic_key(&json_fixture), semantic_key(&bin_fixture));
}

#[test]
fn differing_capture_provenance_changes_the_semantic_key() {
    let run_a = fixture(CodecKind::Json, "run-1");
    let run_b = fixture(CodecKind::Json, "run-2");
    assert_ne!(semantic_key(&run_a), semantic_key(&run_b));
}

#[test]
fn a_changed_seed_changes_the_semantic_key() {
    let mut changed = fixture(CodecKind::Json, "run-1");
    changed.seed = 8;
    assert_ne!(semantic_key(&fixture(CodecKind::Json, "run-1")), semantic_key(&changed));
}

#[test]
fn a_changed_profile_changes_the_semantic_key() {
    let mut changed = fixture(CodecKind::Json, "run-1");
    changed.profile = Profile::Hft;
    assert_ne!(semantic_key(&fixture(CodecKind::Json, "run-1")), semantic_key(&changed));
}
