// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! Promotion gate state machine
//!
//! The gate is an explicit state value, not a callback: `Pending` until an
//! operator decides it, then terminally `Approved` or `Rejected`. Waiters
//! park on a [`Notify`], with no busy-wait and no timeout. A gate is decided
//! exactly once per run; repeating the settled decision is a no-op and a
//! conflicting decision is refused. Recovery from rejection is a fresh run
//! with a fresh gate.

use tokio::sync::{Mutex, Notify};
use tracing::info;

use crate::errors::{ShipwayError, ShipwayResult};

/// Gate status over the life of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Waiting for an operator decision; stage progression is parked
    Pending,
    /// Promotion may proceed to the next stage
    Approved,
    /// Terminal: the run halts at the gate
    Rejected,
}

impl std::fmt::Display for GateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Operator decision applied to a pending gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Approve,
    Reject,
}

impl GateDecision {
    fn target(self) -> GateState {
        match self {
            Self::Approve => GateState::Approved,
            Self::Reject => GateState::Rejected,
        }
    }
}

/// Manual-approval checkpoint between pre-production and production
pub struct PromotionGate {
    state: Mutex<GateState>,
    settled: Notify,
}

impl PromotionGate {
    /// Create a gate in the `Pending` state
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Pending),
            settled: Notify::new(),
        }
    }

    /// Current state snapshot
    pub async fn state(&self) -> GateState {
        *self.state.lock().await
    }

    /// Approve the gate; idempotent once approved
    pub async fn approve(&self) -> ShipwayResult<bool> {
        self.decide(GateDecision::Approve).await
    }

    /// Reject the gate; idempotent once rejected
    pub async fn reject(&self) -> ShipwayResult<bool> {
        self.decide(GateDecision::Reject).await
    }

    /// Apply a decision atomically
    ///
    /// Returns `Ok(true)` when this call settled the gate, `Ok(false)` when
    /// the gate was already settled with the same decision, and
    /// `GateAlreadyDecided` when the decision conflicts with the settled
    /// state. The state never changes after the first decision.
    pub async fn decide(&self, decision: GateDecision) -> ShipwayResult<bool> {
        let mut state = self.state.lock().await;
        let target = decision.target();

        match *state {
            GateState::Pending => {
                *state = target;
                info!(state = %target, "promotion gate settled");
                self.settled.notify_waiters();
                Ok(true)
            }
            current if current == target => Ok(false),
            current => Err(ShipwayError::GateAlreadyDecided {
                current: current.to_string(),
                requested: target.to_string(),
            }),
        }
    }

    /// Park until the gate settles; returns the terminal state
    pub async fn wait(&self) -> GateState {
        loop {
            let notified = self.settled.notified();
            {
                let state = self.state.lock().await;
                if *state != GateState::Pending {
                    return *state;
                }
            }
            notified.await;
        }
    }
}

impl Default for PromotionGate {
    fn default() -> Self {
        Self::new()
    }
}
