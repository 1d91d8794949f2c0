// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! Manual-approval action factory

use crate::pipeline::{Action, ActionConfig};

/// Create a manual-approval action
///
/// The action carries no artifacts; it exists to park stage progression on
/// the promotion gate. `external_link` points reviewers at the deployed
/// pre-production endpoint when one is known.
pub fn approval_action(prompt: &str, external_link: Option<String>, run_order: u32) -> Action {
    Action {
        name: "Promotion-Approval".into(),
        run_order,
        inputs: vec![],
        outputs: vec![],
        config: ActionConfig::Approval {
            prompt: prompt.to_string(),
            external_link,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ActionKind;

    #[test]
    fn test_approval_action_carries_no_artifacts() {
        let action = approval_action(
            "Ready to deploy to production?",
            Some("https://ppd.example.com".into()),
            2,
        );

        assert_eq!(action.kind(), ActionKind::Approval);
        assert_eq!(action.run_order, 2);
        assert!(action.inputs.is_empty());
        assert!(action.outputs.is_empty());
    }
}
