//! State encoding for learning consumers.
//!
//! Transforms the entity model into a fixed-length numeric vector. For
//! the standard 4-player board the layout is 240 features:
//!
//! - 4 players x 4 features, the requesting player first and the rest in
//!   ascending id order: position fraction, cash fraction (capped at 1),
//!   in-jail indicator, has-card indicator.
//! - 28 properties x 8 features in canonical order: a 5-slot ownership
//!   one-hot (slot 0 = bank, slots 1-4 = players), mortgaged indicator,
//!   monopoly indicator, improvement fraction (0 for railroads and
//!   utilities).
//!
//! The length is fixed for a given board; a mismatch while encoding is a
//! fatal internal consistency error, not a recoverable condition.

use serde::{Deserialize, Serialize};

use crate::board::BoardCatalog;
use crate::core::{Player, PlayerId, PropertyState, HOTEL_LEVEL};

/// Features per player in the observation.
pub const PLAYER_FEATURES: usize = 4;

/// Features per property in the observation.
pub const PROPERTY_FEATURES: usize = 8;

/// A fixed-length encoded observation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Flat feature vector.
    pub tensor: Vec<f32>,

    /// Tensor shape (a single dimension for this encoder).
    pub shape: Vec<usize>,
}

impl Observation {
    /// Wrap a flat tensor.
    #[must_use]
    pub fn new(tensor: Vec<f32>) -> Self {
        let shape = vec![tensor.len()];
        Self { tensor, shape }
    }

    /// Total number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tensor.len()
    }

    /// Is the tensor empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tensor.is_empty()
    }
}

/// Encodes players and properties into an [`Observation`].
#[derive(Clone, Debug)]
pub struct ObservationEncoder {
    position_scale: f32,
    cash_scale: f32,
}

impl Default for ObservationEncoder {
    fn default() -> Self {
        Self {
            position_scale: 39.0,
            cash_scale: 5000.0,
        }
    }
}

impl ObservationEncoder {
    /// Create an encoder with the standard normalization constants.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the cash normalization scale.
    #[must_use]
    pub fn with_cash_scale(mut self, cash_scale: f32) -> Self {
        self.cash_scale = cash_scale;
        self
    }

    /// Observation length for a given board.
    #[must_use]
    pub fn output_len(&self, catalog: &BoardCatalog, player_count: usize) -> usize {
        player_count * PLAYER_FEATURES + catalog.property_count() * PROPERTY_FEATURES
    }

    /// Encode the state from `perspective`'s point of view.
    ///
    /// Panics if the written feature count diverges from
    /// [`output_len`](Self::output_len); that would be an internal
    /// consistency bug, never an input error.
    #[must_use]
    pub fn encode(
        &self,
        catalog: &BoardCatalog,
        players: &[Player],
        properties: &[PropertyState],
        perspective: PlayerId,
    ) -> Observation {
        let total = self.output_len(catalog, players.len());
        let mut tensor = vec![0.0f32; total];
        let mut idx = 0;

        let rest = PlayerId::all(players.len()).filter(|&p| p != perspective);
        for pid in std::iter::once(perspective).chain(rest) {
            let p = &players[pid.index()];
            tensor[idx] = p.position.index() as f32 / self.position_scale;
            tensor[idx + 1] = (p.cash as f32 / self.cash_scale).min(1.0);
            tensor[idx + 2] = if p.in_jail { 1.0 } else { 0.0 };
            tensor[idx + 3] = if p.jail_card { 1.0 } else { 0.0 };
            idx += PLAYER_FEATURES;
        }

        for (ordinal, st) in properties.iter().enumerate() {
            match st.owner {
                Some(owner) => tensor[idx + 1 + owner.index()] = 1.0,
                None => tensor[idx] = 1.0,
            }
            idx += 1 + players.len();
            tensor[idx] = if st.mortgaged { 1.0 } else { 0.0 };
            tensor[idx + 1] = if st.monopoly { 1.0 } else { 0.0 };
            if catalog.property(ordinal).is_street() {
                tensor[idx + 2] = f32::from(st.houses) / f32::from(HOTEL_LEVEL);
            }
            idx += 3;
        }

        assert_eq!(idx, total, "observation length mismatch");
        Observation::new(tensor)
    }
}
