//! MACsec secure-channel/secure-association configuration core.
//!
//! Manages the lifecycle of MACsec (IEEE 802.1AE) secure channels (SC) and
//! secure associations (SA) on a MAC controller exposing fixed-capacity,
//! indirectly-addressed lookup tables. The control plane asks to enable or
//! disable an SA named by (SCI, AN); this crate decides whether the SCI
//! already has hardware state, allocates or reuses one of the 16 SC slots
//! per direction, programs the five hardware tables in the required order,
//! and rolls back every row already written if any step fails partway.
//!
//! # Architecture
//!
//! ```text
//! driver control plane
//!      │ configure / clear_all / install_default_bypass
//!      ▼
//!  MacsecOrch ──> ScDirectory (per-direction in-memory mirror)
//!      │
//!      └──> MacsecOps (row codec, indirect registers) ──> MAC hardware
//! ```
//!
//! # Consistency model
//!
//! Hardware rows are the source of truth; the directory mirror is kept in
//! lock-step. Adds and updates are transactional: directory state is only
//! committed after every hardware write succeeded, and a mid-sequence
//! fault unwinds the rows already written. Deletes clear state row by row
//! and abort on the first fault without rollback, since a partially
//! cleared SC is a safe degraded state rather than an inconsistent one.
//!
//! # Concurrency
//!
//! Single-threaded, synchronous, call-and-return. There is no internal
//! locking; callers serialize all MACsec configuration calls and reject
//! frame preemption before invoking this subsystem, since the hardware
//! cannot run both.

pub mod audit;
mod bulk;
mod directory;
mod orch;
mod txn;
mod types;

pub use directory::ScDirectory;
pub use orch::{MacsecError, MacsecOrch, MacsecOrchConfig, MacsecOrchStats};
pub use types::{KeyIndex, ScCandidate, ScRecord, Sci, PN_THRESHOLD};
