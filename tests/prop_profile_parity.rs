//! Invariant 9: profiles sharing a parity gate produce identical overload
//! decisions across the full load range.

use asx::profile::catalog::{evaluate, policy_for};
use asx::profile::Profile;

#[test]
fn core_and_parallel_agree_at_every_load_point() {
    let core = policy_for(Profile::Core);
    let parallel = policy_for(Profile::Parallel);
    assert!(core.parity_gate);
    assert!(parallel.parity_gate);
    for capacity in [1u32, 4, 16, 100] {
        for used in 0..=capacity {
            assert_eq!(
                evaluate(&core, used, capacity),
                evaluate(&parallel, used, capacity),
                "mismatch at used={used} capacity={capacity}"
            );
        }
    }
}

#[test]
fn posix_and_win32_agree_at_every_load_point() {
    let posix = policy_for(Profile::Posix);
    let win32 = policy_for(Profile::Win32);
    assert!(posix.parity_gate);
    assert!(win32.parity_gate);
    for capacity in [1u32, 4, 16, 100] {
        for used in 0..=capacity {
            assert_eq!(evaluate(&posix, used, capacity), evaluate(&win32, used, capacity));
        }
    }
}

#[test]
fn non_parity_profiles_are_not_asserted_equal() {
    // Freestanding and EmbeddedRouter are not parity-gated against each
    // other or against Core; confirms the gate flag is meaningful rather
    // than all profiles coincidentally agreeing.
    let freestanding = policy_for(Profile::Freestanding);
    assert!(!freestanding.parity_gate);
    let core = policy_for(Profile::Core);
    assert_ne!(evaluate(&freestanding, 85, 100), evaluate(&core, 85, 100));
}
