//! Runtime property state and its derived computations.

use serde::{Deserialize, Serialize};

use crate::board::{PropertyDef, RentSchedule};

use super::player::PlayerId;

/// Improvement level representing a hotel. Levels 1-4 are houses; the
/// hotel replaces all four houses as one atomic upgrade.
pub const HOTEL_LEVEL: u8 = 5;

/// Mutable state of one purchasable property.
///
/// Static data (price, rent table, color group) lives in the catalog's
/// [`PropertyDef`]; the two are joined by canonical ordinal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyState {
    /// Current owner; `None` means the bank holds it.
    pub owner: Option<PlayerId>,

    /// Mortgaged to the bank.
    pub mortgaged: bool,

    /// Improvement level: 0-4 houses, [`HOTEL_LEVEL`] for a hotel.
    pub houses: u8,

    /// Derived: the owner holds the full color group. Recomputed by the
    /// engine after every ownership change.
    pub monopoly: bool,
}

impl PropertyState {
    /// Does a hotel stand here?
    #[must_use]
    pub fn has_hotel(&self) -> bool {
        self.houses == HOTEL_LEVEL
    }

    /// Rent owed by a non-owner landing here.
    ///
    /// Mortgaged or bank-held properties charge nothing. Street base rent
    /// doubles under a monopoly; improved streets read the rent table
    /// directly. Railroad rent scales with the owner's railroad count,
    /// utility rent multiplies the dice total.
    #[must_use]
    pub fn rent(
        &self,
        def: &PropertyDef,
        dice_total: u8,
        owner_railroads: usize,
        owner_utilities: usize,
    ) -> i64 {
        if self.mortgaged || self.owner.is_none() {
            return 0;
        }
        match def.rent {
            RentSchedule::Railroad(by_count) => {
                by_count[owner_railroads.saturating_sub(1).min(3)]
            }
            RentSchedule::Utility(multipliers) => {
                let idx = if owner_utilities <= 1 { 0 } else { 1 };
                multipliers[idx] * i64::from(dice_total)
            }
            RentSchedule::Street(levels) => {
                if self.houses == 0 {
                    if self.monopoly {
                        levels[0] * 2
                    } else {
                        levels[0]
                    }
                } else {
                    levels[self.houses.min(HOTEL_LEVEL) as usize]
                }
            }
        }
    }

    /// Net-worth contribution of this property for its owner.
    ///
    /// `(price - mortgage deduction) * (2.0 under monopoly, else 1.5)`,
    /// plus the accumulated improvement value for streets: each house at
    /// face value, a hotel counting as the four houses beneath it plus its
    /// own price.
    #[must_use]
    pub fn net_worth(&self, def: &PropertyDef) -> f64 {
        let deduction = if self.mortgaged { def.mortgage } else { 0 };
        let multiplier = if self.monopoly { 2.0 } else { 1.5 };
        let base = (def.price - deduction) as f64 * multiplier;

        match def.house_price {
            Some(house_price) if self.houses > 0 => {
                if self.has_hotel() {
                    base + (5 * house_price) as f64
                } else {
                    base + (i64::from(self.houses) * house_price) as f64
                }
            }
            _ => base,
        }
    }
}
