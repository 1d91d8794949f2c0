// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! Error types for pipeline construction and execution
//!
//! Every error names the stage, action, or artifact involved so a failed
//! run can be diagnosed from the message alone.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for shipway operations
pub type ShipwayResult<T> = Result<T, ShipwayError>;

/// Main error type for shipway
#[derive(Error, Debug, Diagnostic)]
pub enum ShipwayError {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors (graph-build time, fatal)
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Environment '{tag}' is missing required field '{field}'")]
    #[diagnostic(
        code(shipway::missing_profile_field),
        help("Set '{field}' for the '{tag}' environment in your manifest")
    )]
    MissingProfileField { tag: String, field: String },

    #[error("Both environment profiles use the tag '{tag}'")]
    #[diagnostic(
        code(shipway::duplicate_environment_tag),
        help("One profile must be preproduction and the other production")
    )]
    DuplicateEnvironmentTag { tag: String },

    #[error("Artifact '{artifact}' is produced by both '{first}' and '{second}'")]
    #[diagnostic(
        code(shipway::artifact_collision),
        help("Artifact names must be unique across the whole pipeline")
    )]
    ArtifactCollision {
        artifact: String,
        first: String,
        second: String,
    },

    #[error("Invalid pipeline configuration: {reason}")]
    #[diagnostic(code(shipway::invalid_pipeline))]
    InvalidPipeline {
        reason: String,
        #[help]
        help: Option<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Specification Errors (invalid action parameters, fatal)
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Build action '{action}' declares an empty output file name")]
    #[diagnostic(code(shipway::empty_output_file))]
    EmptyOutputFile { action: String },

    #[error("Build action '{action}' base directory must be relative: {path}")]
    #[diagnostic(
        code(shipway::non_relative_base_directory),
        help("Base directories are resolved inside the source artifact, so absolute paths cannot work")
    )]
    NonRelativeBaseDirectory { action: String, path: PathBuf },

    // ─────────────────────────────────────────────────────────────────────────
    // Binding Errors (synthesis ↔ deploy naming contract)
    // ─────────────────────────────────────────────────────────────────────────
    #[error("No synthesized template for environment '{environment}': expected '{expected}'")]
    #[diagnostic(
        code(shipway::template_not_declared),
        help("The synthesis action declares: {available:?}. The template name is derived from the stack prefix and environment tag; check both sides use the same prefix.")
    )]
    TemplateNotDeclared {
        environment: String,
        expected: String,
        available: Vec<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Graph Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Action '{action}' consumes unknown artifact '{artifact}'")]
    #[diagnostic(
        code(shipway::unknown_artifact),
        help("Every consumed artifact must be declared as the output of exactly one action")
    )]
    UnknownArtifact { action: String, artifact: String },

    #[error(
        "Action '{action}' in stage '{consumer_stage}' consumes artifact '{artifact}' \
         which is not available until stage '{producer_stage}' completes"
    )]
    #[diagnostic(
        code(shipway::forward_reference),
        help("An artifact is visible only after its producing stage (or, within a stage, a lower run-order group) has completed")
    )]
    ForwardReference {
        action: String,
        artifact: String,
        producer_stage: String,
        consumer_stage: String,
    },

    #[error("Circular artifact dependency detected")]
    #[diagnostic(
        code(shipway::circular_dependency),
        help("Review the input/output artifact wiring to remove the cycle")
    )]
    CircularDependency { actions: Vec<String> },

    // ─────────────────────────────────────────────────────────────────────────
    // Execution Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Action '{action}' in stage '{stage}' failed: {message}")]
    #[diagnostic(code(shipway::action_failed))]
    ActionFailed {
        stage: String,
        action: String,
        message: String,
    },

    #[error("Stage '{stage}' halted; no later stage will run")]
    #[diagnostic(code(shipway::stage_halted))]
    StageHalted { stage: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Promotion Gate Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Promotion rejected at gate '{action}' in stage '{stage}'")]
    #[diagnostic(
        code(shipway::gate_rejected),
        help("Rejection is terminal. Re-run the pipeline from the beginning to promote again.")
    )]
    GateRejected { stage: String, action: String },

    #[error("Gate already settled as {current}; cannot transition to {requested}")]
    #[diagnostic(
        code(shipway::gate_already_decided),
        help("A gate is decided exactly once per run; only repeating the same decision is a no-op")
    )]
    GateAlreadyDecided { current: String, requested: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Manifest/File Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Manifest file not found: {path}")]
    #[diagnostic(
        code(shipway::manifest_not_found),
        help("Create a shipway.yaml manifest describing your service, sources, and environments")
    )]
    ManifestNotFound { path: PathBuf },

    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(shipway::file_read_error))]
    FileRead { path: PathBuf, error: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(shipway::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(shipway::yaml_error))]
    Yaml { message: String },

    #[error("JSON parsing error: {message}")]
    #[diagnostic(code(shipway::json_error))]
    Json { message: String },
}

impl From<std::io::Error> for ShipwayError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for ShipwayError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for ShipwayError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl ShipwayError {
    /// Create an invalid-pipeline error without help text
    pub fn invalid_pipeline(reason: impl Into<String>) -> Self {
        Self::InvalidPipeline {
            reason: reason.into(),
            help: None,
        }
    }

    /// Create an action failure scoped to a stage
    pub fn action_failed(stage: &str, action: &str, message: impl Into<String>) -> Self {
        Self::ActionFailed {
            stage: stage.to_string(),
            action: action.to_string(),
            message: message.into(),
        }
    }
}
