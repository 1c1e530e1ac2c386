//! Trade offers between players.

use serde::{Deserialize, Serialize};

use crate::board::BoardCatalog;

use super::player::PlayerId;

/// A pending trade offer.
///
/// Properties are addressed by canonical ordinal. `offered` is a property
/// the sender would give up, `requested` one the sender wants from the
/// recipient; each side may also attach cash. An offer is ephemeral: each
/// sender has at most one outstanding, and all offers are destroyed when
/// the next player's pre-roll phase begins.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeOffer {
    /// Player who opened the offer.
    pub sender: PlayerId,

    /// Player who may accept or decline it.
    pub recipient: PlayerId,

    /// Property the sender would hand over.
    pub offered: Option<usize>,

    /// Property the sender wants from the recipient.
    pub requested: Option<usize>,

    /// Cash the sender would pay.
    pub cash_offered: i64,

    /// Cash the sender wants from the recipient.
    pub cash_requested: i64,
}

impl TradeOffer {
    /// Price-level valuation gap, from the recipient's point of view:
    /// what the sender gives (property price plus cash) minus what the
    /// sender asks for. Positive means the deal favors the recipient.
    #[must_use]
    pub fn valuation_gap(&self, catalog: &BoardCatalog) -> i64 {
        let offered_price = self.offered.map_or(0, |p| catalog.property(p).price);
        let requested_price = self.requested.map_or(0, |p| catalog.property(p).price);
        (offered_price + self.cash_offered) - (requested_price + self.cash_requested)
    }
}
