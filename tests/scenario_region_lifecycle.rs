//! Region-lifecycle-OK literal scenario: open a region, spawn a task that
//! completes immediately, run, close, and confirm digest stability across
//! repeated identical runs.

use asx::authority::RegionState;
use asx::profile::Profile;
use asx::record::TaskPoll;
use asx::region::{deterministic_platform, Runtime};
use asx::trace::CanonicalEvent;
use asx::types::{Budget, Outcome, Time};
use asx::RuntimeConfig;

fn run_once(seed: u64) -> asx::trace::Digest {
    let config = RuntimeConfig::builder(Profile::Core).build().unwrap();
    let mut rt = Runtime::new(config, deterministic_platform(seed));

    let region = rt.open_region(None).unwrap();
    rt.record_event(CanonicalEvent::RegionTransition { at: Time::ZERO, region, state: RegionState::Open });

    rt.spawn(region, Budget::new().with_poll_quota(8), Box::new(|| TaskPoll::Complete(Outcome::Ok)))
        .unwrap();
    rt.run(region, Budget::new().with_poll_quota(8)).unwrap();
    rt.close_region(region).unwrap();
    rt.record_event(CanonicalEvent::RegionTransition { at: Time::ZERO, region, state: RegionState::Closed });

    rt.export_trace().digest
}

#[test]
fn region_opens_runs_one_task_to_completion_and_closes() {
    let config = RuntimeConfig::builder(Profile::Core).build().unwrap();
    let mut rt = Runtime::new(config, deterministic_platform(11));

    let region = rt.open_region(None).unwrap();
    assert!(rt.check_quiescence(region).is_ok());

    let task = rt
        .spawn(region, Budget::new().with_poll_quota(8), Box::new(|| TaskPoll::Complete(Outcome::Ok)))
        .unwrap();
    assert!(rt.check_quiescence(region).is_err());

    rt.run(region, Budget::new().with_poll_quota(8)).unwrap();
    assert!(rt.check_quiescence(region).is_ok());

    rt.close_region(region).unwrap();
    let _ = task;
}

#[test]
fn repeated_runs_under_the_same_seed_produce_the_same_digest() {
    let first = run_once(11);
    let second = run_once(11);
    assert_eq!(first, second);
}
