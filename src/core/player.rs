//! Player identification and per-player state.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::board::{BoardCatalog, ColorGroup, SquareId};

use super::property::PropertyState;

/// Player identifier, 0-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all player IDs for a game with `player_count` players.
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// One Monopoly player.
///
/// The owned-property list holds canonical property ordinals and mirrors
/// the `owner` fields of the [`PropertyState`] table; the engine maintains
/// both at every ownership transfer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// This player's ID.
    pub id: PlayerId,

    /// Cash on hand.
    pub cash: i64,

    /// Current board square.
    pub position: SquareId,

    /// Sitting in jail (as opposed to just visiting).
    pub in_jail: bool,

    /// Consecutive turns spent in jail.
    pub jail_turns: u8,

    /// Holds a get-out-of-jail-free card.
    pub jail_card: bool,

    /// Eliminated from the game.
    pub bankrupt: bool,

    /// Canonical ordinals of owned properties.
    pub owned: SmallVec<[usize; 8]>,
}

impl Player {
    /// Create a fresh player at Go with the given starting cash.
    #[must_use]
    pub fn new(id: PlayerId, starting_cash: i64) -> Self {
        Self {
            id,
            cash: starting_cash,
            position: SquareId::new(0),
            in_jail: false,
            jail_turns: 0,
            jail_card: false,
            bankrupt: false,
            owned: SmallVec::new(),
        }
    }

    /// Can this player pay `amount` outright?
    #[must_use]
    pub fn can_afford(&self, amount: i64) -> bool {
        self.cash >= amount
    }

    /// Does this player own the property with the given ordinal?
    #[must_use]
    pub fn owns(&self, ordinal: usize) -> bool {
        self.owned.contains(&ordinal)
    }

    /// Record ownership of a property ordinal.
    pub(crate) fn acquire(&mut self, ordinal: usize) {
        if !self.owned.contains(&ordinal) {
            self.owned.push(ordinal);
        }
    }

    /// Drop ownership of a property ordinal.
    pub(crate) fn release(&mut self, ordinal: usize) {
        self.owned.retain(|&mut p| p != ordinal);
    }

    /// Number of railroads this player owns.
    #[must_use]
    pub fn railroads_owned(&self, catalog: &BoardCatalog) -> usize {
        self.count_group(catalog, ColorGroup::Railroad)
    }

    /// Number of utilities this player owns.
    #[must_use]
    pub fn utilities_owned(&self, catalog: &BoardCatalog) -> usize {
        self.count_group(catalog, ColorGroup::Utility)
    }

    fn count_group(&self, catalog: &BoardCatalog, group: ColorGroup) -> usize {
        self.owned
            .iter()
            .filter(|&&p| catalog.property(p).group == group)
            .count()
    }

    /// Total net worth: cash plus the contribution of every owned property.
    #[must_use]
    pub fn net_worth(&self, catalog: &BoardCatalog, properties: &[PropertyState]) -> f64 {
        self.cash as f64
            + self
                .owned
                .iter()
                .map(|&p| properties[p].net_worth(catalog.property(p)))
                .sum::<f64>()
    }
}
