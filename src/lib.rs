// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! # shipway - Deployment Promotion Pipeline Orchestrator
//!
//! `shipway` models an approval-gated promotion pipeline across two
//! environments: source checkout, infrastructure synthesis, a
//! pre-production build and deploy, a manual promotion gate, then the
//! production build and deploy.
//!
//! ## Features
//!
//! - **Fixed promotion topology** - six stages wired from one manifest
//! - **Environment symmetry** - one factory parameterized by profile builds
//!   both environments, so they cannot drift apart
//! - **Artifact contracts** - named, write-once artifacts with single
//!   producers and stage-barrier visibility
//! - **Promotion gate** - the approval is an explicit state machine, not a
//!   callback, so resumption logic is testable offline
//!
//! ## Quick Start
//!
//! ```bash
//! # Validate the manifest and pipeline
//! shipway validate
//!
//! # Show the promotion plan
//! shipway plan
//!
//! # Render the dependency graph
//! shipway graph --format mermaid
//!
//! # Simulate a full promotion
//! shipway run --decision approve
//! ```

pub mod actions;
pub mod cli;
pub mod errors;
pub mod exec;
pub mod gate;
pub mod manifest;
pub mod pipeline;
pub mod profile;

// Re-export commonly used types
pub use errors::{ShipwayError, ShipwayResult};
pub use gate::{GateDecision, GateState, PromotionGate};
pub use manifest::Manifest;
pub use pipeline::{Pipeline, PipelineBuilder, Stage};
pub use profile::{template_file_name, EnvironmentProfile, EnvironmentTag};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
