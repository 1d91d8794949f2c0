// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! Pipeline execution
//!
//! The executor walks stages in order and delegates real work to an
//! [`ActionRunner`]; approval actions park on the promotion gate instead.

mod executor;
mod runner;

pub use executor::{PipelineRunner, RunOptions, RunReport};
pub use runner::{ActionContext, ActionOutcome, ActionRunner, SimulatedRunner};
