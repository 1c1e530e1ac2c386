//! # monopoly-rl
//!
//! A deterministic 4-player Monopoly simulation engine for RL training.
//!
//! ## Design Principles
//!
//! 1. **Fixed action space**: every structurally distinct move maps to
//!    one dense integer index (2953 for the standard board) through a
//!    bijective codec, so policies can emit logits over a constant range.
//!
//! 2. **Legal set first**: consumers fetch the legal-action set before
//!    choosing. A structurally valid index outside that set is a defined
//!    no-op; only out-of-range indices and stepping a finished game fail
//!    loudly.
//!
//! 3. **Configuration over globals**: the board catalog is an immutable
//!    value passed by reference, never ambient module state. Tests can
//!    run alternate boards.
//!
//! 4. **Seeded determinism**: all randomness (dice, turn-order shuffle)
//!    flows through one ChaCha8 RNG; the same seed and action sequence
//!    replay an identical game.
//!
//! ## Modules
//!
//! - `board`: Immutable square/property catalog and scalar rules
//! - `core`: Players, property state, trade offers, RNG
//! - `actions`: Structured actions and the dense integer codec
//! - `engine`: Turn/phase state machine, rule application, trades,
//!   bankruptcy, game-over detection
//! - `encoder`: Fixed-length observation vectors
//! - `policy`: Pluggable decision providers (random, scripted, hybrid)

pub mod actions;
pub mod board;
pub mod core;
pub mod encoder;
pub mod engine;
pub mod policy;

/// Number of players in a game.
pub const NUM_PLAYERS: usize = 4;

// Re-export commonly used types
pub use crate::actions::{Action, ActionCodec, DecodeError};
pub use crate::board::{BoardCatalog, BoardRules, ColorGroup, PropertyDef, RentSchedule, SquareId, SquareKind};
pub use crate::core::{GameRng, GameRngState, Player, PlayerId, PropertyState, TradeOffer, HOTEL_LEVEL};
pub use crate::encoder::{Observation, ObservationEncoder};
pub use crate::engine::{EngineError, MonopolyEnv, MonopolyEnvBuilder, Phase, StepInfo, StepOutcome};
pub use crate::policy::{DecisionProvider, FixedPolicy, HybridPolicy, RandomPolicy};
