//! Pluggable decision providers.
//!
//! The engine is agent-agnostic: anything that can map an observation and
//! a legal-action list to one index can drive it. This module provides
//! the built-in providers:
//!
//! - `RandomPolicy`: uniform over the legal set; the stand-in wherever a
//!   learned policy would plug in.
//! - `FixedPolicy`: a priority-ordered scripted player.
//! - `HybridPolicy`: wraps another provider but resolves the buy-property
//!   and trade-acceptance decisions with fixed rules.

pub mod hybrid;
pub mod scripted;

use crate::core::{GameRng, PlayerId};
use crate::engine::MonopolyEnv;

pub use hybrid::HybridPolicy;
pub use scripted::FixedPolicy;

/// Chooses one action index from the legal set.
pub trait DecisionProvider {
    /// Pick an action for `player` from `legal`. Implementations should
    /// return a member of `legal`; anything else is absorbed by the
    /// engine as a no-op.
    fn choose(&mut self, env: &MonopolyEnv, player: PlayerId, legal: &[usize]) -> usize;
}

/// Uniform random provider with its own seedable RNG.
#[derive(Clone, Debug)]
pub struct RandomPolicy {
    rng: GameRng,
}

impl RandomPolicy {
    /// Create a seeded random provider.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
        }
    }
}

impl DecisionProvider for RandomPolicy {
    fn choose(&mut self, _env: &MonopolyEnv, _player: PlayerId, legal: &[usize]) -> usize {
        if legal.is_empty() {
            return 0;
        }
        legal[self.rng.gen_range_usize(0..legal.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_policy_picks_from_legal() {
        let env = MonopolyEnv::new(3);
        let mut policy = RandomPolicy::new(9);
        let legal = env.legal_actions(None);
        for _ in 0..50 {
            let choice = policy.choose(&env, env.whose_turn(), &legal);
            assert!(legal.contains(&choice));
        }
    }

    #[test]
    fn test_random_policy_is_deterministic() {
        let env = MonopolyEnv::new(3);
        let legal = env.legal_actions(None);
        let mut a = RandomPolicy::new(11);
        let mut b = RandomPolicy::new(11);
        for _ in 0..20 {
            assert_eq!(
                a.choose(&env, env.whose_turn(), &legal),
                b.choose(&env, env.whose_turn(), &legal)
            );
        }
    }
}
