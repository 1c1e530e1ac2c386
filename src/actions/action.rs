//! Structured action descriptors.

use serde::{Deserialize, Serialize};

/// One structurally distinct move.
///
/// Parameters are ordinals, not board squares: `property` indexes the
/// catalog's canonical property order, `street` the improvable-street
/// order, and `counterpart` the acting player's view of the other players
/// in ascending id order. `tier` indexes the trade cash tiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Explicit no-op; always available as a fallback.
    DoNothing,
    /// End the current phase (pre-roll, post-roll, or an out-of-turn slot).
    EndTurn,
    /// Roll the dice and resolve the landing.
    RollDice,
    /// Buy the property just landed on.
    BuyProperty,
    /// Spend the get-out-of-jail-free card.
    UseJailCard,
    /// Pay bail to leave jail.
    PayBail,
    /// Declare bankruptcy.
    DeclareBankrupt,
    /// Accept the trade offer addressed to the acting player.
    AcceptTrade,
    /// Decline the trade offer addressed to the acting player.
    DeclineTrade,
    /// Mortgage an owned property.
    Mortgage {
        /// Canonical property ordinal.
        property: usize,
    },
    /// Lift the mortgage on an owned property.
    Unmortgage {
        /// Canonical property ordinal.
        property: usize,
    },
    /// Build one house on a monopolized street.
    BuildHouse {
        /// Street ordinal.
        street: usize,
    },
    /// Replace four houses with a hotel.
    BuildHotel {
        /// Street ordinal.
        street: usize,
    },
    /// Sell one house back to the bank at half price.
    SellHouse {
        /// Street ordinal.
        street: usize,
    },
    /// Replace a hotel with four houses, refunding half its price.
    SellHotel {
        /// Street ordinal.
        street: usize,
    },
    /// Sell an unimproved property back to the bank at mortgage value.
    SellToBank {
        /// Canonical property ordinal.
        property: usize,
    },
    /// Offer cash for a counterpart's property.
    OfferBuy {
        /// Counterpart slot (other players, ascending id).
        counterpart: usize,
        /// Canonical property ordinal.
        property: usize,
        /// Cash tier index.
        tier: usize,
    },
    /// Offer one of the sender's properties for cash.
    OfferSell {
        /// Counterpart slot (other players, ascending id).
        counterpart: usize,
        /// Canonical property ordinal.
        property: usize,
        /// Cash tier index.
        tier: usize,
    },
    /// Offer a property-for-property exchange.
    OfferExchange {
        /// Counterpart slot (other players, ascending id).
        counterpart: usize,
        /// Ordinal of the property the sender gives.
        offered: usize,
        /// Ordinal of the property the sender wants (never equal to
        /// `offered`).
        requested: usize,
    },
}

impl Action {
    /// Ordinal of a binary (parameter-free) action within the binary
    /// section, `None` for parameterized actions.
    #[must_use]
    pub fn binary_ordinal(&self) -> Option<usize> {
        match self {
            Action::DoNothing => Some(0),
            Action::EndTurn => Some(1),
            Action::RollDice => Some(2),
            Action::BuyProperty => Some(3),
            Action::UseJailCard => Some(4),
            Action::PayBail => Some(5),
            Action::DeclareBankrupt => Some(6),
            Action::AcceptTrade => Some(7),
            Action::DeclineTrade => Some(8),
            _ => None,
        }
    }

    /// Does this action open a trade offer?
    #[must_use]
    pub fn opens_trade(&self) -> bool {
        matches!(
            self,
            Action::OfferBuy { .. } | Action::OfferSell { .. } | Action::OfferExchange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_ordinals_are_dense() {
        let binaries = [
            Action::DoNothing,
            Action::EndTurn,
            Action::RollDice,
            Action::BuyProperty,
            Action::UseJailCard,
            Action::PayBail,
            Action::DeclareBankrupt,
            Action::AcceptTrade,
            Action::DeclineTrade,
        ];
        for (i, action) in binaries.iter().enumerate() {
            assert_eq!(action.binary_ordinal(), Some(i));
        }
        assert_eq!(Action::Mortgage { property: 0 }.binary_ordinal(), None);
    }

    #[test]
    fn test_opens_trade() {
        assert!(Action::OfferBuy {
            counterpart: 0,
            property: 1,
            tier: 2
        }
        .opens_trade());
        assert!(!Action::AcceptTrade.opens_trade());
    }

    #[test]
    fn test_action_serialization() {
        let action = Action::OfferExchange {
            counterpart: 2,
            offered: 5,
            requested: 11,
        };
        let json = serde_json::to_string(&action).unwrap();
        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(action, back);
    }
}
