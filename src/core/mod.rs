//! Entity model: players, property state, trade offers, RNG.
//!
//! Static board data lives in [`crate::board`]; this module holds the
//! mutable per-game state and its derived computations (rent, net worth,
//! affordability).

pub mod player;
pub mod property;
pub mod rng;
pub mod trade;

pub use player::{Player, PlayerId};
pub use property::{PropertyState, HOTEL_LEVEL};
pub use rng::{GameRng, GameRngState};
pub use trade::TradeOffer;
