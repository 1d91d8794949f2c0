// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! Action dependency graph
//!
//! Builds a directed graph over all actions, with an edge from producer to
//! consumer for every artifact hand-off, and validates the data-dependency
//! invariants: one producer per artifact, no forward or same-run-order
//! references, no cycles.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use crate::errors::ShipwayError;
use crate::pipeline::{ArtifactName, Pipeline};

/// Position of an action in the pipeline: (stage index, run-order)
type Coord = (usize, u32);

/// Dependency graph over pipeline actions
#[derive(Debug)]
pub struct ActionGraph {
    graph: DiGraph<String, ArtifactName>,
    name_to_index: HashMap<String, NodeIndex>,
}

impl ActionGraph {
    /// Build and validate the graph for a pipeline
    pub fn build(pipeline: &Pipeline) -> Result<Self, ShipwayError> {
        let mut graph = DiGraph::new();
        let mut name_to_index = HashMap::new();

        // One node per action, qualified by stage for uniqueness
        for (_, stage, action) in pipeline.actions() {
            let id = qualified(&stage.name, &action.name);
            let node = graph.add_node(id.clone());
            name_to_index.insert(id, node);
        }

        // Artifact name → producing action, enforcing the single-producer
        // invariant as we go
        let mut producers: HashMap<&ArtifactName, (String, Coord)> = HashMap::new();
        for (stage_idx, stage, action) in pipeline.actions() {
            let id = qualified(&stage.name, &action.name);
            for artifact in &action.outputs {
                if let Some((first, _)) =
                    producers.insert(artifact, (id.clone(), (stage_idx, action.run_order)))
                {
                    return Err(ShipwayError::ArtifactCollision {
                        artifact: artifact.to_string(),
                        first,
                        second: id,
                    });
                }
            }
        }

        // Producer → consumer edges, with ordering checks
        for (stage_idx, stage, action) in pipeline.actions() {
            let id = qualified(&stage.name, &action.name);
            let consumer_node = name_to_index[&id];

            for artifact in &action.inputs {
                let Some((producer_id, (producer_stage, producer_order))) = producers.get(artifact)
                else {
                    return Err(ShipwayError::UnknownArtifact {
                        action: id.clone(),
                        artifact: artifact.to_string(),
                    });
                };

                let visible = *producer_stage < stage_idx
                    || (*producer_stage == stage_idx && *producer_order < action.run_order);
                if !visible {
                    return Err(ShipwayError::ForwardReference {
                        action: id.clone(),
                        artifact: artifact.to_string(),
                        producer_stage: pipeline.stages[*producer_stage].name.clone(),
                        consumer_stage: stage.name.clone(),
                    });
                }

                let producer_node = name_to_index[producer_id];
                graph.add_edge(producer_node, consumer_node, artifact.clone());
            }
        }

        let built = Self {
            graph,
            name_to_index,
        };
        built.validate_acyclic()?;

        Ok(built)
    }

    fn validate_acyclic(&self) -> Result<(), ShipwayError> {
        toposort(&self.graph, None).map(|_| ()).map_err(|cycle| {
            ShipwayError::CircularDependency {
                actions: vec![self.graph[cycle.node_id()].clone()],
            }
        })
    }

    /// Actions whose artifacts this action consumes
    pub fn dependencies(&self, qualified_name: &str) -> Option<Vec<String>> {
        let node = self.name_to_index.get(qualified_name)?;
        Some(
            self.graph
                .neighbors_directed(*node, petgraph::Direction::Incoming)
                .map(|n| self.graph[n].clone())
                .collect(),
        )
    }

    /// Actions consuming this action's artifacts
    pub fn dependents(&self, qualified_name: &str) -> Option<Vec<String>> {
        let node = self.name_to_index.get(qualified_name)?;
        Some(
            self.graph
                .neighbors_directed(*node, petgraph::Direction::Outgoing)
                .map(|n| self.graph[n].clone())
                .collect(),
        )
    }

    /// Generate Mermaid diagram of the action graph
    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("graph TD\n");

        for node in self.graph.node_indices() {
            let name = &self.graph[node];
            out.push_str(&format!("    {}[\"{}\"]\n", mermaid_id(name), name));
        }

        for edge in self.graph.edge_indices() {
            let (from, to) = self.graph.edge_endpoints(edge).unwrap();
            out.push_str(&format!(
                "    {} -->|{}| {}\n",
                mermaid_id(&self.graph[from]),
                self.graph[edge],
                mermaid_id(&self.graph[to]),
            ));
        }

        out
    }

    /// Generate DOT diagram of the action graph
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph pipeline {\n");
        out.push_str("    rankdir=TB;\n");
        out.push_str("    node [shape=box, style=rounded];\n\n");

        for edge in self.graph.edge_indices() {
            let (from, to) = self.graph.edge_endpoints(edge).unwrap();
            out.push_str(&format!(
                "    \"{}\" -> \"{}\" [label=\"{}\"];\n",
                self.graph[from], self.graph[to], self.graph[edge],
            ));
        }

        for node in self.graph.node_indices() {
            if self.graph.neighbors_undirected(node).count() == 0 {
                out.push_str(&format!("    \"{}\";\n", self.graph[node]));
            }
        }

        out.push_str("}\n");
        out
    }

    /// Generate a stage-by-stage text rendering with artifact flow
    pub fn to_text(&self, pipeline: &Pipeline) -> String {
        let mut out = String::new();

        for (i, stage) in pipeline.stages.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, stage.name));

            for (run_order, actions) in stage.run_order_groups() {
                for action in actions {
                    out.push_str(&format!(
                        "   [{}] {} ({})",
                        run_order,
                        action.name,
                        action.kind()
                    ));

                    if !action.inputs.is_empty() {
                        let inputs: Vec<_> =
                            action.inputs.iter().map(ArtifactName::as_str).collect();
                        out.push_str(&format!(" consumes: {}", inputs.join(", ")));
                    }
                    if !action.outputs.is_empty() {
                        let outputs: Vec<_> =
                            action.outputs.iter().map(ArtifactName::as_str).collect();
                        out.push_str(&format!(" produces: {}", outputs.join(", ")));
                    }

                    out.push('\n');
                }
            }
        }

        out
    }
}

fn qualified(stage: &str, action: &str) -> String {
    format!("{}/{}", stage, action)
}

fn mermaid_id(name: &str) -> String {
    name.replace(['/', '-', ' '], "_")
}
