// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! Action factories
//!
//! Each factory turns declarative inputs (profiles, templates, source
//! descriptors) into a fully wired [`Action`](crate::pipeline::Action).
//! Factories are pure: no side effects beyond object construction. The
//! same build/deploy factories serve both environments, which is what
//! keeps pre-production and production structurally identical.

mod approval;
mod build;
mod deploy;
mod source;
mod synth;

pub use approval::approval_action;
pub use build::{build_action, APP_ENV_VAR};
pub use deploy::{deploy_action, location_placeholder, PACKAGE_LOCATION_PARAM};
pub use source::source_action;
pub use synth::synth_action;
