// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! Deployment manifest structures
//!
//! Defines the schema for shipway.yaml files: the service being promoted,
//! its two source trees, the build command templates, and the two
//! environment profiles.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::ShipwayError;
use crate::profile::{EnvironmentProfile, EnvironmentTag};

/// Deployment manifest from shipway.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest version (for future compatibility)
    #[serde(default = "default_version")]
    pub version: String,

    /// Service name; also the pipeline name
    pub service: String,

    /// Stack name prefix; combined with the environment tag it names
    /// both the deployed stacks and the synthesized template files
    pub stack_prefix: String,

    /// The two checked-out source trees
    pub sources: Sources,

    /// Application build template (shared by both environments)
    pub build: BuildTemplate,

    /// Infra-synthesis build template
    #[serde(default)]
    pub synthesis: SynthesisTemplate,

    /// Per-environment profiles
    pub environments: Environments,
}

fn default_version() -> String {
    "1".to_string()
}

impl Manifest {
    /// Load a manifest from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, ShipwayError> {
        let content = std::fs::read_to_string(path).map_err(|e| ShipwayError::FileRead {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_yaml(&content)
    }

    /// Parse a manifest from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ShipwayError> {
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    /// Serialize the manifest to YAML
    pub fn to_yaml(&self) -> Result<String, ShipwayError> {
        serde_yaml::to_string(self).map_err(Into::into)
    }

    /// The two environment profiles, tags attached by position
    pub fn profiles(&self) -> (EnvironmentProfile, EnvironmentProfile) {
        (
            self.environments
                .preproduction
                .to_profile(EnvironmentTag::Preproduction),
            self.environments
                .production
                .to_profile(EnvironmentTag::Production),
        )
    }

    /// A fully populated example manifest (used by tests and docs)
    pub fn example() -> Self {
        Self {
            version: default_version(),
            service: "polina-service".into(),
            stack_prefix: "PolinaServiceStack".into(),
            sources: Sources {
                application: SourceDescriptor {
                    owner: "TestLambdaProjectOrg".into(),
                    repo: "polina-service".into(),
                    branch: default_branch(),
                    connection: None,
                },
                infrastructure: SourceDescriptor {
                    owner: "TestLambdaProjectOrg".into(),
                    repo: "polina-service-devops".into(),
                    branch: default_branch(),
                    connection: None,
                },
            },
            build: BuildTemplate {
                base_directory: default_base_directory(),
                output_file: "handler".into(),
                install: vec!["go get ./...".into()],
                build: vec!["go build -o handler".into()],
            },
            synthesis: SynthesisTemplate::default(),
            environments: Environments {
                preproduction: ManifestProfile {
                    stack_name: "PolinaServiceStackPPD".into(),
                    endpoint: Some("https://ppd.example.com".into()),
                    variables: BTreeMap::new(),
                },
                production: ManifestProfile {
                    stack_name: "PolinaServiceStackPRD".into(),
                    endpoint: Some("https://prd.example.com".into()),
                    variables: BTreeMap::new(),
                },
            },
        }
    }
}

/// The two source trees feeding the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sources {
    /// Application source (consumed by the per-environment builds)
    pub application: SourceDescriptor,

    /// Infrastructure-definition source (consumed by synthesis)
    pub infrastructure: SourceDescriptor,
}

/// Where a source tree is checked out from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub owner: String,
    pub repo: String,

    #[serde(default = "default_branch")]
    pub branch: String,

    /// Opaque handle to the source-control connection, if the execution
    /// environment needs one
    #[serde(default)]
    pub connection: Option<String>,
}

fn default_branch() -> String {
    "main".to_string()
}

/// Application build commands, shared by both environments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildTemplate {
    /// Directory the build runs in, relative to the source root
    #[serde(default = "default_base_directory")]
    pub base_directory: String,

    /// The single compiled output file the build must emit
    pub output_file: String,

    /// Install-phase commands
    #[serde(default)]
    pub install: Vec<String>,

    /// Build-phase commands
    pub build: Vec<String>,
}

fn default_base_directory() -> String {
    ".".to_string()
}

/// Infra-synthesis commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisTemplate {
    /// Directory the synthesized templates land in
    #[serde(default = "default_synth_directory")]
    pub base_directory: String,

    #[serde(default = "default_synth_install")]
    pub install: Vec<String>,

    #[serde(default = "default_synth_build")]
    pub build: Vec<String>,
}

impl Default for SynthesisTemplate {
    fn default() -> Self {
        Self {
            base_directory: default_synth_directory(),
            install: default_synth_install(),
            build: default_synth_build(),
        }
    }
}

fn default_synth_directory() -> String {
    "dist".to_string()
}

fn default_synth_install() -> Vec<String> {
    vec!["npm install".to_string()]
}

fn default_synth_build() -> Vec<String> {
    vec![
        "npm run build".to_string(),
        "npm run synth -- -o dist".to_string(),
    ]
}

/// The two environment entries; tags come from position, not configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environments {
    pub preproduction: ManifestProfile,
    pub production: ManifestProfile,
}

/// One environment as written in the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestProfile {
    pub stack_name: String,

    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

impl ManifestProfile {
    fn to_profile(&self, tag: EnvironmentTag) -> EnvironmentProfile {
        EnvironmentProfile {
            tag,
            stack_name: self.stack_name.clone(),
            endpoint: self.endpoint.clone(),
            variables: self.variables.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_manifest() {
        let yaml = r#"
service: "widget-api"
stack_prefix: "WidgetStack"
sources:
  application:
    owner: acme
    repo: widget-api
  infrastructure:
    owner: acme
    repo: widget-api-infra
build:
  output_file: widget
  build:
    - "go build -o widget"
environments:
  preproduction:
    stack_name: "WidgetStackPPD"
  production:
    stack_name: "WidgetStackPRD"
"#;

        let manifest = Manifest::from_yaml(yaml).unwrap();
        assert_eq!(manifest.service, "widget-api");
        assert_eq!(manifest.sources.application.branch, "main");
        assert_eq!(manifest.build.base_directory, ".");
        assert_eq!(manifest.synthesis.base_directory, "dist");

        let (ppd, prd) = manifest.profiles();
        assert_eq!(ppd.tag, EnvironmentTag::Preproduction);
        assert_eq!(ppd.stack_name, "WidgetStackPPD");
        assert_eq!(prd.tag, EnvironmentTag::Production);
    }

    #[test]
    fn test_round_trip_yaml() {
        let manifest = Manifest::example();
        let yaml = manifest.to_yaml().unwrap();
        let parsed = Manifest::from_yaml(&yaml).unwrap();

        assert_eq!(parsed.service, manifest.service);
        assert_eq!(parsed.stack_prefix, manifest.stack_prefix);
        assert_eq!(
            parsed.environments.production.stack_name,
            manifest.environments.production.stack_name
        );
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shipway.yaml");
        std::fs::write(&path, Manifest::example().to_yaml().unwrap()).unwrap();

        let manifest = Manifest::from_file(&path).unwrap();
        assert_eq!(manifest.service, "polina-service");
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = Manifest::from_file(Path::new("/nonexistent/shipway.yaml"));
        assert!(matches!(result, Err(ShipwayError::FileRead { .. })));
    }
}
