// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! Core pipeline data model
//!
//! A pipeline is an ordered list of stages; a stage is an ordered group of
//! actions sharing barrier semantics; actions hand data to each other only
//! through named, write-once artifacts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::profile::{BuildSpecification, EnvironmentTag};

/// Name of an artifact, unique within a pipeline
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactName(pub String);

impl ArtifactName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ArtifactName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque storage handle for a produced artifact
///
/// Assigned by the execution environment when the producing action
/// completes; the orchestrator never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactLocation(pub String);

impl std::fmt::Display for ArtifactLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of work an action performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Source,
    Build,
    Deploy,
    Approval,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Build => write!(f, "build"),
            Self::Deploy => write!(f, "deploy"),
            Self::Approval => write!(f, "approval"),
        }
    }
}

/// Kind-specific action configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActionConfig {
    /// Check out a source tree and emit it as one artifact
    Source {
        owner: String,
        repo: String,
        branch: String,
    },

    /// Compile the application for one environment
    Build { spec: BuildSpecification },

    /// Synthesize deployment templates from the infra definition
    ///
    /// `declared_templates` is the file list the synthesis emits inside
    /// its base directory; deploy actions bind against these names.
    Synth {
        spec: BuildSpecification,
        declared_templates: Vec<String>,
    },

    /// Create or update a stack from a synthesized template
    Deploy {
        stack_name: String,
        template_file: String,
        parameter_overrides: BTreeMap<String, String>,
        environment: EnvironmentTag,
    },

    /// Park the pipeline until an operator decides the promotion gate
    Approval {
        prompt: String,
        #[serde(default)]
        external_link: Option<String>,
    },
}

impl ActionConfig {
    /// The action kind this configuration belongs to
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Source { .. } => ActionKind::Source,
            Self::Build { .. } | Self::Synth { .. } => ActionKind::Build,
            Self::Deploy { .. } => ActionKind::Deploy,
            Self::Approval { .. } => ActionKind::Approval,
        }
    }
}

/// A unit of work within a stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Action name (unique within its stage)
    pub name: String,

    /// Run-order group: equal values run concurrently, otherwise
    /// ascending sequential
    #[serde(default = "default_run_order")]
    pub run_order: u32,

    /// Artifacts this action consumes (produced by earlier stages, or the
    /// same stage at a strictly lower run-order)
    #[serde(default)]
    pub inputs: Vec<ArtifactName>,

    /// Artifacts this action is the sole producer of
    #[serde(default)]
    pub outputs: Vec<ArtifactName>,

    /// Kind-specific configuration
    pub config: ActionConfig,
}

fn default_run_order() -> u32 {
    1
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        self.config.kind()
    }
}

/// An ordered, barrier-synchronized group of actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    /// Stage name (unique within pipeline)
    pub name: String,

    /// Actions in declaration order
    pub actions: Vec<Action>,
}

impl Stage {
    /// Actions grouped by ascending run-order
    pub fn run_order_groups(&self) -> Vec<(u32, Vec<&Action>)> {
        let mut groups: BTreeMap<u32, Vec<&Action>> = BTreeMap::new();
        for action in &self.actions {
            groups.entry(action.run_order).or_default().push(action);
        }
        groups.into_iter().collect()
    }
}

/// The full promotion path: an ordered sequence of stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    /// Pipeline name
    pub name: String,

    /// Stages in execution order; stage order is the only inter-stage
    /// dependency
    pub stages: Vec<Stage>,
}

impl Pipeline {
    /// Get a stage by name
    pub fn get_stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Get all stage names
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }

    /// Iterate every action with its stage index and stage name
    pub fn actions(&self) -> impl Iterator<Item = (usize, &Stage, &Action)> {
        self.stages
            .iter()
            .enumerate()
            .flat_map(|(idx, stage)| stage.actions.iter().map(move |a| (idx, stage, a)))
    }

    /// Find the action producing an artifact, with its stage index
    pub fn find_producer(&self, artifact: &ArtifactName) -> Option<(usize, &Stage, &Action)> {
        self.actions()
            .find(|(_, _, action)| action.outputs.contains(artifact))
    }
}
