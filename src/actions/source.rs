// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! Source-checkout action factory

use crate::manifest::SourceDescriptor;
use crate::pipeline::{Action, ActionConfig, ArtifactName};

/// Create a source-checkout action emitting one full-tree artifact
pub fn source_action(name: &str, descriptor: &SourceDescriptor, output: ArtifactName) -> Action {
    Action {
        name: name.to_string(),
        run_order: 1,
        inputs: vec![],
        outputs: vec![output],
        config: ActionConfig::Source {
            owner: descriptor.owner.clone(),
            repo: descriptor.repo.clone(),
            branch: descriptor.branch.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ActionKind;

    #[test]
    fn test_source_action_emits_single_artifact() {
        let descriptor = SourceDescriptor {
            owner: "acme".into(),
            repo: "widget".into(),
            branch: "main".into(),
            connection: None,
        };

        let action = source_action("Checkout-Application", &descriptor, "AppSource".into());
        assert_eq!(action.kind(), ActionKind::Source);
        assert!(action.inputs.is_empty());
        assert_eq!(action.outputs, vec![ArtifactName::from("AppSource")]);
        assert_eq!(action.run_order, 1);
    }
}
