//! Phase and step-outcome types.

use serde::{Deserialize, Serialize};

use crate::board::SquareId;
use crate::core::PlayerId;
use crate::encoder::Observation;

/// Sub-state within the turn cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Active player acts before rolling.
    PreRoll,
    /// Active player rolls, resolves the landing, and wraps up.
    PostRoll,
    /// Other players respond to or open trades, one slot each.
    OutOfTurn,
}

/// Diagnostic record for one `step` call.
///
/// `phase` is the phase at the moment the action was taken; `applied` is
/// false when the index was structurally valid but not legal for the
/// acting player, in which case the state was left untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Player the action was applied for.
    pub player: PlayerId,

    /// Phase when the action was taken.
    pub phase: Phase,

    /// Whether the action was in the legal set and therefore applied.
    pub applied: bool,

    /// Dice rolled during this step, if any.
    pub dice: Option<(u8, u8)>,

    /// Square landed on during this step, if any.
    pub landed_on: Option<SquareId>,

    /// Rent paid during this step, if any.
    pub rent_paid: Option<i64>,

    /// The landing square is an unowned property the player could buy.
    pub can_buy: bool,
}

impl StepInfo {
    pub(crate) fn new(player: PlayerId, phase: Phase) -> Self {
        Self {
            player,
            phase,
            applied: false,
            dice: None,
            landed_on: None,
            rent_paid: None,
            can_buy: false,
        }
    }
}

/// Result of one `step` call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Observation after the action, from the designated player's
    /// perspective.
    pub observation: Observation,

    /// Scalar reward for the designated player.
    pub reward: f64,

    /// The game is over.
    pub done: bool,

    /// Diagnostics.
    pub info: StepInfo,
}
