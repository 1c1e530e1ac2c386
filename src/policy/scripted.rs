//! Priority-ordered scripted player.
//!
//! The three stock priority orderings mirror the classic fixed baselines:
//! flat, railroads-and-top-streets, and railroads-plus-early-groups. All
//! variants chase monopolies, respond to trades on valuation, build with
//! a cash buffer, and mortgage low-priority squares when cash runs low.

use crate::actions::Action;
use crate::board::{BoardCatalog, ColorGroup};
use crate::core::PlayerId;
use crate::engine::MonopolyEnv;

use super::DecisionProvider;

/// Scripted decision provider with a property priority order.
#[derive(Clone, Debug)]
pub struct FixedPolicy {
    /// Property ordinals, highest priority first.
    priority: Vec<usize>,
    /// Cash the policy tries to keep in reserve.
    cash_buffer: i64,
}

impl FixedPolicy {
    /// Equal priority to every property.
    #[must_use]
    pub fn balanced(catalog: &BoardCatalog) -> Self {
        Self::with_priority_bands(catalog, Vec::new(), Vec::new())
    }

    /// Railroads and the dark-blue streets first, utilities last.
    #[must_use]
    pub fn stations_first(catalog: &BoardCatalog) -> Self {
        let mut high = catalog.group_members(ColorGroup::Railroad).to_vec();
        high.extend_from_slice(catalog.group_members(ColorGroup::DarkBlue));
        let low = catalog.group_members(ColorGroup::Utility).to_vec();
        Self::with_priority_bands(catalog, high, low)
    }

    /// Railroads plus the orange and light-blue groups first, utilities
    /// last.
    #[must_use]
    pub fn early_development(catalog: &BoardCatalog) -> Self {
        let mut high = catalog.group_members(ColorGroup::Railroad).to_vec();
        high.extend_from_slice(catalog.group_members(ColorGroup::Orange));
        high.extend_from_slice(catalog.group_members(ColorGroup::LightBlue));
        let low = catalog.group_members(ColorGroup::Utility).to_vec();
        Self::with_priority_bands(catalog, high, low)
    }

    fn with_priority_bands(catalog: &BoardCatalog, high: Vec<usize>, low: Vec<usize>) -> Self {
        let mut priority = high.clone();
        priority.extend(
            (0..catalog.property_count()).filter(|o| !high.contains(o) && !low.contains(o)),
        );
        priority.extend(low);
        Self {
            priority,
            cash_buffer: 200,
        }
    }

    /// Buy rule: buy if it completes a monopoly affordably, or if cash
    /// stays above the buffer afterwards.
    #[must_use]
    pub fn should_buy(&self, env: &MonopolyEnv, pid: PlayerId) -> bool {
        let player = env.player(pid);
        let Some(ordinal) = env.catalog().property_at(player.position) else {
            return false;
        };
        let st = env.property(ordinal);
        let def = env.catalog().property(ordinal);
        if st.owner.is_some() || !player.can_afford(def.price) {
            return false;
        }
        let members = env.catalog().group_members(def.group);
        let owned = members
            .iter()
            .filter(|&&m| env.property(m).owner == Some(pid))
            .count();
        if owned + 1 == members.len() {
            return true;
        }
        player.cash >= def.price + self.cash_buffer
    }

    /// Accept rule: accept if the incoming property completes a monopoly,
    /// or if the offer's valuation gap favors the recipient.
    #[must_use]
    pub fn should_accept(&self, env: &MonopolyEnv, pid: PlayerId) -> bool {
        let Some(offer) = env.incoming_trade(pid) else {
            return false;
        };
        if let Some(gained) = offer.offered {
            let group = env.catalog().property(gained).group;
            let members = env.catalog().group_members(group);
            let owned = members
                .iter()
                .filter(|&&m| env.property(m).owner == Some(pid))
                .count();
            if owned + 1 == members.len() {
                return true;
            }
        }
        offer.valuation_gap(env.catalog()) > 0
    }

    /// Highest-priority legal improvement that leaves the cash buffer
    /// intact.
    fn best_build(&self, env: &MonopolyEnv, pid: PlayerId, legal: &[usize]) -> Option<usize> {
        let codec = env.codec();
        let player = env.player(pid);
        for street in 0..env.catalog().street_count() {
            let ordinal = env.catalog().street(street);
            let price = env.catalog().property(ordinal).house_price.unwrap_or(0);
            if !player.can_afford(price + self.cash_buffer) {
                continue;
            }
            let house = codec.encode(Action::BuildHouse { street });
            if legal.contains(&house) {
                return Some(house);
            }
            let hotel = codec.encode(Action::BuildHotel { street });
            if legal.contains(&hotel) {
                return Some(hotel);
            }
        }
        None
    }

    /// A market-price buy offer for a property that would complete one of
    /// this player's color groups.
    fn completing_offer(&self, env: &MonopolyEnv, pid: PlayerId, legal: &[usize]) -> Option<usize> {
        let catalog = env.catalog();
        let codec = env.codec();
        let tier = catalog
            .rules()
            .trade_cash_tiers
            .iter()
            .position(|&t| (t - 1.0).abs() < f64::EPSILON)
            .unwrap_or(0);

        for (_, members) in catalog.groups() {
            let owned = members
                .iter()
                .filter(|&&m| env.property(m).owner == Some(pid))
                .count();
            if owned == 0 {
                continue;
            }
            let needed: Vec<usize> = members
                .iter()
                .copied()
                .filter(|&m| matches!(env.property(m).owner, Some(o) if o != pid))
                .collect();
            if owned + needed.len() < members.len() {
                // An unowned square blocks completion by trade alone.
                continue;
            }
            for &wanted in &needed {
                let Some(target) = env.property(wanted).owner else {
                    continue;
                };
                let slot = PlayerId::all(env.players().len())
                    .filter(|&p| p != pid)
                    .position(|p| p == target);
                let Some(slot) = slot else { continue };
                let index = codec.encode(Action::OfferBuy {
                    counterpart: slot,
                    property: wanted,
                    tier,
                });
                if legal.contains(&index) {
                    return Some(index);
                }
            }
        }
        None
    }

    /// Mortgage the lowest-priority non-monopoly holding when cash runs
    /// below the buffer.
    fn mortgage_for_cash(&self, env: &MonopolyEnv, pid: PlayerId, legal: &[usize]) -> Option<usize> {
        if env.player(pid).cash >= self.cash_buffer {
            return None;
        }
        for &ordinal in self.priority.iter().rev() {
            if env.property(ordinal).monopoly {
                continue;
            }
            let index = env.codec().encode(Action::Mortgage { property: ordinal });
            if legal.contains(&index) {
                return Some(index);
            }
        }
        None
    }
}

impl DecisionProvider for FixedPolicy {
    fn choose(&mut self, env: &MonopolyEnv, player: PlayerId, legal: &[usize]) -> usize {
        let codec = env.codec();

        let accept = codec.encode(Action::AcceptTrade);
        if legal.contains(&accept) {
            let decline = codec.encode(Action::DeclineTrade);
            return if self.should_accept(env, player) {
                accept
            } else {
                decline
            };
        }

        if env.player(player).in_jail {
            let card = codec.encode(Action::UseJailCard);
            if legal.contains(&card) {
                return card;
            }
            let bail = codec.encode(Action::PayBail);
            if legal.contains(&bail) {
                return bail;
            }
        }

        let buy = codec.encode(Action::BuyProperty);
        if legal.contains(&buy) && self.should_buy(env, player) {
            return buy;
        }

        if let Some(action) = self.best_build(env, player, legal) {
            return action;
        }
        if let Some(action) = self.completing_offer(env, player, legal) {
            return action;
        }
        if let Some(action) = self.mortgage_for_cash(env, player, legal) {
            return action;
        }

        let roll = codec.encode(Action::RollDice);
        if legal.contains(&roll) {
            return roll;
        }
        let end = codec.encode(Action::EndTurn);
        if legal.contains(&end) {
            return end;
        }
        codec.encode(Action::DoNothing)
    }
}
