//! Static board catalog: squares, property definitions, color groups, rules.
//!
//! ## Key Types
//!
//! - `SquareId`: Identifier for one of the 40 board squares
//! - `SquareKind`: What kind of square sits at an index
//! - `PropertyDef`: Static data for one purchasable property
//! - `RentSchedule`: Per-kind rent tables (street / railroad / utility)
//! - `BoardRules`: Scalar game constants (starting cash, taxes, bail, ...)
//! - `BoardCatalog`: The immutable catalog handed to the engine by reference
//!
//! The catalog is built once (`BoardCatalog::us_standard()` for the classic
//! board) and never mutated. Engines and encoders borrow it rather than
//! reaching into global tables, so tests can run alternate boards.

pub mod cards;
pub mod catalog;
pub mod definition;

pub use catalog::{BoardCatalog, BoardRules};
pub use definition::{ColorGroup, PropertyDef, RentSchedule, SquareId, SquareKind};
