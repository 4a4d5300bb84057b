//! Placeholder access policies.
//!
//! None of these look at real roles or claims. They exist so the filters
//! have something to ask, and so tests can pin the outcome.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{PolicyConfig, PolicyMode};
use crate::filters::context::FilterContext;

/// Answer of an [`AccessPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny,
}

/// Decides whether a request may reach its handler.
pub trait AccessPolicy: Send + Sync {
    fn evaluate(&self, ctx: &FilterContext) -> Verdict;
}

/// Draws `n` from `0..3` and denies when `n` is even.
#[derive(Debug, Default)]
pub struct RandomPolicy {
    rng: Option<Mutex<StdRng>>,
}

impl RandomPolicy {
    /// Unseeded: draws from the thread RNG.
    pub fn new() -> Self {
        Self { rng: None }
    }

    /// Reproducible sequence of verdicts.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Some(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    /// Map a draw from `0..3` to a verdict.
    pub fn verdict_for(draw: u32) -> Verdict {
        if draw % 2 == 0 {
            Verdict::Deny
        } else {
            Verdict::Allow
        }
    }

    fn draw(&self) -> u32 {
        match &self.rng {
            Some(rng) => rng
                .lock()
                .expect("random policy mutex poisoned")
                .gen_range(0..3),
            None => rand::thread_rng().gen_range(0..3),
        }
    }
}

impl AccessPolicy for RandomPolicy {
    fn evaluate(&self, _ctx: &FilterContext) -> Verdict {
        Self::verdict_for(self.draw())
    }
}

/// Always returns the same verdict.
#[derive(Debug, Clone, Copy)]
pub struct StaticPolicy(pub Verdict);

impl StaticPolicy {
    pub fn allow() -> Self {
        Self(Verdict::Allow)
    }

    pub fn deny() -> Self {
        Self(Verdict::Deny)
    }
}

impl AccessPolicy for StaticPolicy {
    fn evaluate(&self, _ctx: &FilterContext) -> Verdict {
        self.0
    }
}

/// Build the policy selected in configuration.
pub fn policy_from_config(config: &PolicyConfig) -> Arc<dyn AccessPolicy> {
    match config.mode {
        PolicyMode::Random => match config.seed {
            Some(seed) => Arc::new(RandomPolicy::seeded(seed)),
            None => Arc::new(RandomPolicy::new()),
        },
        PolicyMode::Allow => Arc::new(StaticPolicy::allow()),
        PolicyMode::Deny => Arc::new(StaticPolicy::deny()),
    }
}
