//! Hybrid provider: fixed rules for the buy and trade-acceptance
//! decisions, a wrapped provider for everything else.
//!
//! This is the pluggable form of "hybrid mode": the intercepted action
//! categories never reach the wrapped provider, which sees a masked legal
//! set instead.

use crate::actions::Action;
use crate::core::PlayerId;
use crate::engine::MonopolyEnv;

use super::scripted::FixedPolicy;
use super::DecisionProvider;

/// Routes buy-property and accept/decline-trade decisions to fixed rules.
pub struct HybridPolicy<P> {
    inner: P,
    rules: FixedPolicy,
}

impl<P: DecisionProvider> HybridPolicy<P> {
    /// Wrap `inner`, resolving intercepted categories with `rules`.
    pub fn new(inner: P, rules: FixedPolicy) -> Self {
        Self { inner, rules }
    }
}

impl<P: DecisionProvider> DecisionProvider for HybridPolicy<P> {
    fn choose(&mut self, env: &MonopolyEnv, player: PlayerId, legal: &[usize]) -> usize {
        let codec = env.codec();
        let buy = codec.encode(Action::BuyProperty);
        let accept = codec.encode(Action::AcceptTrade);
        let decline = codec.encode(Action::DeclineTrade);

        if legal.contains(&accept) {
            return if self.rules.should_accept(env, player) {
                accept
            } else {
                decline
            };
        }
        if legal.contains(&buy) && self.rules.should_buy(env, player) {
            return buy;
        }

        let masked: Vec<usize> = legal
            .iter()
            .copied()
            .filter(|&a| a != buy && a != accept && a != decline)
            .collect();
        if masked.is_empty() {
            legal.first().copied().unwrap_or(0)
        } else {
            self.inner.choose(env, player, &masked)
        }
    }
}
