//! # Policy Evaluator
//!
//! Runs policies to a fixed point.
//!
//! ## Algorithm
//!
//! 1. Every slot starts `Pending(empty state)`, generation 0
//! 2. Each pass evaluates every pending policy; one that reports done is
//!    never evaluated again in this run
//! 3. Passes repeat while the last pass advanced the generation
//!
//! A policy error aborts the run and is returned unchanged. There is no
//! pass limit unless one is configured.

use crate::domain::context::AuthorizationContext;
use crate::domain::evaluation::{EvaluationContext, PolicyState};
use crate::ports::outbound::AuthorizationPolicy;
use shared_types::SecurityError;
use std::mem;
use std::sync::Arc;
use tracing::{debug, info, warn};

enum Slot {
    Pending(PolicyState),
    Done,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEvaluator {
    max_passes: Option<usize>,
}

impl PolicyEvaluator {
    /// Evaluator without a pass limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with `EvaluationDidNotConverge` after `max_passes` passes that
    /// all advanced the generation.
    pub fn with_max_passes(max_passes: usize) -> Self {
        Self {
            max_passes: Some(max_passes.max(1)),
        }
    }

    pub fn max_passes(&self) -> Option<usize> {
        self.max_passes
    }

    pub fn evaluate(
        &self,
        policies: &[Arc<dyn AuthorizationPolicy>],
    ) -> Result<AuthorizationContext, SecurityError> {
        match policies {
            [] => Ok(AuthorizationContext::empty()),
            [only] => match only.as_unconditional() {
                Some(unconditional) => {
                    debug!(policy = only.id(), "unconditional fast path");
                    Ok(AuthorizationContext::simple(
                        unconditional.issuance().clone(),
                        unconditional.expiration_time(),
                    ))
                }
                None => self.run_fixed_point(policies),
            },
            _ => self.run_fixed_point(policies),
        }
    }

    /// The general loop, without the fast paths.
    pub fn run_fixed_point(
        &self,
        policies: &[Arc<dyn AuthorizationPolicy>],
    ) -> Result<AuthorizationContext, SecurityError> {
        let mut slots: Vec<Slot> = policies
            .iter()
            .map(|_| Slot::Pending(PolicyState::empty()))
            .collect();
        let mut context = EvaluationContext::new();
        let mut passes = 0usize;

        loop {
            let generation = context.generation();
            passes += 1;

            for (policy, slot) in policies.iter().zip(slots.iter_mut()) {
                let Slot::Pending(state) = mem::replace(slot, Slot::Done) else {
                    continue;
                };
                let (state, done) = policy.evaluate(&mut context, state)?;
                if !done {
                    *slot = Slot::Pending(state);
                }
            }

            debug!(pass = passes, generation = context.generation(), "evaluation pass");
            if context.generation() == generation {
                break;
            }
            if self.max_passes.is_some_and(|max| passes >= max) {
                warn!(passes, "policy evaluation did not converge");
                return Err(SecurityError::EvaluationDidNotConverge { passes });
            }
        }

        info!(
            policies = policies.len(),
            passes,
            claim_sets = context.claim_sets().len(),
            "authorization evaluated"
        );
        Ok(AuthorizationContext::from_evaluation(context))
    }
}
