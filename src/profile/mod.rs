//! Profile table and overload-policy catalog.

pub mod catalog;

pub use catalog::{evaluate, policy_for, DegradeClass, OverloadDecision, OverloadMode, OverloadPolicy, Profile};
