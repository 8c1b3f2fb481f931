//! Safe Rust interface to the MACsec hardware lookup tables.
//!
//! The MAC controller implements MACsec with a small set of fixed-capacity,
//! indirectly-addressed lookup tables (LUTs) and a key table, one set per
//! traffic direction. This crate provides the type-safe boundary in front of
//! that hardware, preventing common errors like mixing table indices of
//! different kinds or committing a row of the wrong shape.
//!
//! # Architecture
//!
//! ```text
//! [macsec-orch] ──> [MacsecOps] ──> row codec / indirect registers ──> MAC
//!                        │
//!                        └──> [MockMacsec] (tests, pre-silicon bring-up)
//! ```
//!
//! The crate is organized into several modules:
//!
//! - [`types`]: controller direction, LUT kinds and table geometry
//! - [`rows`]: opaque row payloads for each table kind
//! - [`error`]: error types carrying the failing (direction, kind, index)
//! - [`ops`]: the [`MacsecOps`] row-committer trait and hardware variants
//! - [`mock`]: in-memory backend with failure injection
//!
//! Bit-level row layouts and the indirect read/write/poll register protocol
//! live behind [`MacsecOps`] implementations in the register layer; nothing
//! in this crate interprets row contents.

pub mod error;
pub mod mock;
pub mod ops;
pub mod rows;
pub mod types;

pub use error::{HalError, HalResult};
pub use mock::MockMacsec;
pub use ops::{HwLimits, MacsecOps, Variant};
#[cfg(feature = "key-program")]
pub use rows::KeyTableRow;
pub use rows::{BypassRow, LutRow, SaStateRow, ScParamRow, ScStateRow, SciRow};
pub use types::{
    Direction, LutKind, BROADCAST_ADDR, BYPASS_LUT_DEPTH, KEY_TABLE_DEPTH, MAX_SA_PER_SC, MAX_SC,
    MKA_GROUP_ADDR, SA_STATE_LUT_DEPTH, SC_LUT_DEPTH,
};
