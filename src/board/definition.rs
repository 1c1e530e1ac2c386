//! Square and property definition types.
//!
//! Definitions are static data: they never change during a game. Runtime
//! state (owner, mortgage flag, improvements) lives in
//! [`crate::core::PropertyState`], keyed by the property's ordinal in the
//! catalog's canonical order.

use serde::{Deserialize, Serialize};

/// Identifier for one of the board squares (0-39 on the standard board).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SquareId(pub u8);

impl SquareId {
    /// Create a new square ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw square index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for SquareId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Square {}", self.0)
    }
}

/// What kind of square sits at a board index.
///
/// Only `Property` squares carry a [`PropertyDef`]. Chance and Community
/// Chest squares are pass-throughs: the card texts exist as data
/// (see [`crate::board::cards`]) but drawing one never mutates game state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SquareKind {
    /// The Go square; wrapping past it pays the salary.
    Go,
    /// A purchasable property (street, railroad, or utility).
    Property,
    /// Community Chest square (pass-through).
    CommunityChest,
    /// Chance square (pass-through).
    Chance,
    /// Income tax square.
    IncomeTax,
    /// Jail / just visiting.
    Jail,
    /// Teleports the lander to jail.
    GoToJail,
    /// Free parking (pass-through).
    FreeParking,
    /// Luxury tax square.
    LuxuryTax,
}

/// Color group a property belongs to.
///
/// Railroads and utilities form groups too: owning every member counts as
/// a monopoly for net-worth purposes, even though their rent formulas
/// never consult the monopoly flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorGroup {
    Brown,
    LightBlue,
    Pink,
    Orange,
    Red,
    Yellow,
    Green,
    DarkBlue,
    Railroad,
    Utility,
}

impl ColorGroup {
    /// Every group, in board order.
    pub const ALL: [ColorGroup; 10] = [
        ColorGroup::Brown,
        ColorGroup::LightBlue,
        ColorGroup::Pink,
        ColorGroup::Orange,
        ColorGroup::Red,
        ColorGroup::Yellow,
        ColorGroup::Green,
        ColorGroup::DarkBlue,
        ColorGroup::Railroad,
        ColorGroup::Utility,
    ];

    /// Is this a street group (improvable with houses/hotels)?
    #[must_use]
    pub fn is_street(self) -> bool {
        !matches!(self, ColorGroup::Railroad | ColorGroup::Utility)
    }
}

/// Rent lookup table, shaped by property kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RentSchedule {
    /// Streets: `[base, 1 house, 2 houses, 3 houses, 4 houses, hotel]`.
    Street([i64; 6]),
    /// Railroads: rent by number of railroads the owner holds (1-4).
    Railroad([i64; 4]),
    /// Utilities: dice-total multipliers for one / both utilities owned.
    Utility([i64; 2]),
}

/// Static definition of one purchasable property.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDef {
    /// The board square this property occupies.
    pub square: SquareId,

    /// Display name.
    pub name: String,

    /// Purchase price.
    pub price: i64,

    /// Cash received when mortgaging (and deducted from net worth while
    /// mortgaged).
    pub mortgage: i64,

    /// Color group membership.
    pub group: ColorGroup,

    /// Cost of one house (or the hotel upgrade). `None` for railroads and
    /// utilities.
    pub house_price: Option<i64>,

    /// Rent table.
    pub rent: RentSchedule,
}

impl PropertyDef {
    /// Is this an improvable street?
    #[must_use]
    pub fn is_street(&self) -> bool {
        self.group.is_street()
    }
}
