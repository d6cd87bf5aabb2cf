//! Scenario fixture: the semantic-key contract surface.
//!
//! This module defines the fixture record and its canonical semantic-key
//! serialization only. Codec *implementations* (JSON/BIN encode/decode
//! beyond what the tests need to prove the contract) are an explicit
//! non-goal and live outside this crate.

use serde::{Deserialize, Serialize};

use crate::profile::Profile;

/// The codec a fixture was captured with. Excluded from the semantic key:
/// two fixtures that differ only in `codec_kind` must serialize to the
/// same key and digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodecKind {
    /// JSON framing.
    Json,
    /// Big-endian length-prefixed binary framing with a trailing checksum.
    Bin,
}

/// Capture provenance for a fixture, carried for audit but not hashed into
/// the event digest itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// The baseline commit the fixture was captured against.
    pub baseline_commit: String,
    /// The toolchain identity used to capture the fixture.
    pub toolchain_identity: String,
    /// The capture run id.
    pub capture_run_id: String,
}

/// A canonical scenario fixture: scenario input plus expected outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFixture {
    /// The scenario's identifier.
    pub scenario_id: String,
    /// The fixture schema's version.
    pub fixture_schema_version: u32,
    /// The scenario DSL's version.
    pub scenario_dsl_version: u32,
    /// The profile this fixture was captured under.
    pub profile: Profile,
    /// The codec this fixture was captured with. Excluded from the
    /// semantic key.
    pub codec_kind: CodecKind,
    /// The scenario's deterministic seed.
    pub seed: u64,
    /// Opaque scenario input payload.
    pub input: serde_json::Value,
    /// Opaque expected-events payload.
    pub expected_events: serde_json::Value,
    /// Opaque expected-final-snapshot payload.
    pub expected_final_snapshot: serde_json::Value,
    /// Expected error codes, if the scenario is expected to fail.
    pub expected_error_codes: Vec<String>,
    /// The `sha256:<64 hex>` digest this fixture's expected event stream
    /// should fold to.
    pub semantic_digest: String,
    /// Capture provenance. Part of the semantic key: two fixtures captured
    /// from different baselines/toolchains/runs are not considered the
    /// same scenario even if every other field matches.
    pub provenance: Provenance,
}

impl serde::Serialize for Profile {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Profile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "core" => Ok(Self::Core),
            "posix" => Ok(Self::Posix),
            "win32" => Ok(Self::Win32),
            "freestanding" => Ok(Self::Freestanding),
            "embedded-router" => Ok(Self::EmbeddedRouter),
            "hft" => Ok(Self::Hft),
            "automotive" => Ok(Self::Automotive),
            "parallel" => Ok(Self::Parallel),
            other => Err(serde::de::Error::custom(format!("unknown profile: {other}"))),
        }
    }
}

/// A fixture with `codec_kind` projected out, for canonical key comparison.
#[derive(Serialize)]
struct SemanticKeyView<'a> {
    scenario_id: &'a str,
    fixture_schema_version: u32,
    scenario_dsl_version: u32,
    profile: Profile,
    seed: u64,
    input: &'a serde_json::Value,
    expected_events: &'a serde_json::Value,
    expected_final_snapshot: &'a serde_json::Value,
    expected_error_codes: &'a [String],
    semantic_digest: &'a str,
    provenance: &'a Provenance,
}

/// Computes the canonical semantic key of `fixture`: every field except
/// `codec_kind`, serialized with `serde_json`'s stable field order. Two
/// fixtures differing only in `codec_kind` must produce identical keys;
/// fixtures differing in `provenance` must not.
///
/// # Panics
/// Panics if `fixture`'s fields fail to serialize, which only happens if
/// `input`/`expected_events`/`expected_final_snapshot` contain a non-finite
/// float — `serde_json::Value` cannot otherwise fail to serialize.
#[must_use]
pub fn semantic_key(fixture: &ScenarioFixture) -> String {
    let view = SemanticKeyView {
        scenario_id: &fixture.scenario_id,
        fixture_schema_version: fixture.fixture_schema_version,
        scenario_dsl_version: fixture.scenario_dsl_version,
        profile: fixture.profile,
        seed: fixture.seed,
        input: &fixture.input,
        expected_events: &fixture.expected_events,
        expected_final_snapshot: &fixture.expected_final_snapshot,
        expected_error_codes: &fixture.expected_error_codes,
        semantic_digest: &fixture.semantic_digest,
        provenance: &fixture.provenance,
    };
    serde_json::to_string(&view).expect("Value fields always serialize")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(codec_kind: CodecKind) -> ScenarioFixture {
        ScenarioFixture {
            scenario_id: "region-lifecycle-ok".to_string(),
            fixture_schema_version: 1,
            scenario_dsl_version: 1,
            profile: Profile::Core,
            codec_kind,
            seed: 42,
            input: serde_json::json!({"polls": 100}),
            expected_events: serde_json::json!([]),
            expected_final_snapshot: serde_json::json!({"closed": true}),
            expected_error_codes: vec![],
            semantic_digest: "sha256:0000000000000000000000000000000000000000000000000000000000000000"
                .to_string(),
            provenance: Provenance {
                baseline_commit: "deadbeef".to_string(),
                toolchain_identity: "rustc-test".to_string(),
                capture_run_id: "run-1".to_string(),
            },
        }
    }

    #[test]
    fn semantic_key_ignores_codec_kind() {
        let json_fixture = sample(CodecKind::Json);
        let bin_fixture = sample(CodecKind::Bin);
        assert_eq!(semantic_key(&json_fixture), semantic_key(&bin_fixture));
    }

    #[test]
    fn semantic_key_changes_with_seed() {
        let mut other = sample(CodecKind::Json);
        other.seed = 43;
        assert_ne!(semantic_key(&sample(CodecKind::Json)), semantic_key(&other));
    }

    #[test]
    fn semantic_key_changes_with_provenance() {
        let mut other = sample(CodecKind::Json);
        other.provenance.capture_run_id = "run-2".to_string();
        assert_ne!(semantic_key(&sample(CodecKind::Json)), semantic_key(&other));
    }

    #[test]
    fn profile_round_trips_through_json() {
        let encoded = serde_json::to_string(&Profile::Hft).unwrap();
        assert_eq!(encoded, "\"hft\"");
        let decoded: Profile = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, Profile::Hft);
    }
}
