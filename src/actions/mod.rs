//! Action space: structured descriptors and the dense integer codec.
//!
//! ## Key Types
//!
//! - `Action`: A structured move descriptor (category plus parameters)
//! - `ActionCodec`: Bijective mapping between `Action` and a dense index
//! - `DecodeError`: Loud failure for indices outside the declared range
//!
//! Every structurally distinct move has exactly one index; the standard
//! configuration (4 players, 28 properties, 22 streets, 3 cash tiers)
//! spans 2953 indices. Encode and decode are pure functions usable
//! without a live engine.

pub mod action;
pub mod codec;

pub use action::Action;
pub use codec::{ActionCodec, DecodeError, BINARY_ACTIONS};
