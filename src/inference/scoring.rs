//! Per-file evidence accumulator and its resolution into a single verdict.

use std::collections::HashMap;

use crate::model::{Role, Signal, TestKind};

/// Confidence reported for a file no rule had anything to say about.
pub const DEFAULT_CONFIDENCE: f32 = 0.30;

/// Top two candidates closer than this are considered ambiguous.
pub const AMBIGUITY_MARGIN: f32 = 0.15;

/// Multiplier applied to ambiguous verdicts.
pub const AMBIGUITY_PENALTY: f32 = 0.8;

/// Confidence share earned per corroborating signal, saturating at 1.0.
pub const AGREEMENT_STEP: f32 = 0.25;

/// Resolved classification for one file.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub role: Role,
    pub sub_role: Option<TestKind>,
    pub confidence: f32,
    pub signals: Vec<Signal>,
}

/// Weighted evidence collected for a single file.
///
/// Weights only ever grow while scoring; `resolve` does not mutate.
#[derive(Debug, Clone, Default)]
pub struct RoleScore {
    weights: HashMap<Role, f32>,
    signals: HashMap<Role, Vec<Signal>>,
    sub_roles: HashMap<Role, TestKind>,
}

impl RoleScore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one piece of evidence for `role`.
    pub fn add(&mut self, role: Role, weight: f32, signal: Signal) {
        *self.weights.entry(role).or_insert(0.0) += weight;
        self.signals.entry(role).or_default().push(signal);
    }

    /// Like `add`, also remembering a sub-role. The first sub-role recorded
    /// for a role sticks.
    pub fn add_with_sub_role(
        &mut self,
        role: Role,
        sub_role: Option<TestKind>,
        weight: f32,
        signal: Signal,
    ) {
        self.add(role, weight, signal);
        if let Some(kind) = sub_role {
            self.sub_roles.entry(role).or_insert(kind);
        }
    }

    pub fn weight(&self, role: Role) -> f32 {
        self.weights.get(&role).copied().unwrap_or(0.0)
    }

    pub fn signals(&self, role: Role) -> &[Signal] {
        self.signals.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn sub_role(&self, role: Role) -> Option<TestKind> {
        self.sub_roles.get(&role).copied()
    }

    /// Largest accumulated weight across all candidates, 0 when empty.
    pub fn max_weight(&self) -> f32 {
        self.weights.values().copied().fold(0.0, f32::max)
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Candidates ordered by weight descending, ties by role priority.
    fn ranked(&self) -> Vec<(Role, f32)> {
        let mut ranked: Vec<(Role, f32)> = self.weights.iter().map(|(r, w)| (*r, *w)).collect();
        ranked.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then_with(|| a.0.priority().cmp(&b.0.priority()))
        });
        ranked
    }

    /// Collapse the evidence into one role with a calibrated confidence.
    ///
    /// confidence = top weight, times 0.8 if the runner-up is within 0.15,
    /// times min(1, 0.25 * signals backing the winner), clamped to [0, 1].
    pub fn resolve(&self) -> Verdict {
        let ranked = self.ranked();
        let Some(&(top_role, top_weight)) = ranked.first() else {
            return Verdict {
                role: Role::Core,
                sub_role: None,
                confidence: DEFAULT_CONFIDENCE,
                signals: Vec::new(),
            };
        };

        let mut confidence = top_weight;

        if let Some(&(_, second_weight)) = ranked.get(1) {
            if top_weight - second_weight < AMBIGUITY_MARGIN {
                confidence *= AMBIGUITY_PENALTY;
            }
        }

        let signals = self.signals(top_role).to_vec();
        let agreement = (signals.len() as f32 * AGREEMENT_STEP).min(1.0);
        confidence = (confidence * agreement).clamp(0.0, 1.0);

        let sub_role = if top_role == Role::Test {
            Some(self.sub_role(Role::Test).unwrap_or(TestKind::Unit))
        } else {
            None
        };

        Verdict {
            role: top_role,
            sub_role,
            confidence,
            signals,
        }
    }
}
