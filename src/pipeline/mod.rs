// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! Pipeline definitions and types
//!
//! This module defines the core data structures for promotion pipelines
//! (stages, actions, artifacts) plus the fixed-topology builder, the
//! dependency graph, and the pre-execution validator.

mod builder;
mod graph;
mod model;
mod validation;

pub use builder::{PipelineBuilder, APPROVAL_PROMPT};
pub use graph::ActionGraph;
pub use model::*;
pub use validation::{PipelineValidator, ValidationResult};
