//! Opaque row payloads for each hardware table kind.
//!
//! These structs mirror the logical content of a row; the register layer
//! owns the bit-level serialization. A default-constructed row is the
//! cleared/invalid form the hardware treats as "no entry", which is what
//! rollback and bulk teardown write.

use crate::types::LutKind;

/// Destination-address bypass rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BypassRow {
    pub dst_addr: [u8; 6],
    pub valid: bool,
}

/// SCI match row. Carries Rx SA validity in `an_valid`; the Rx SA-State
/// rows have no valid bit of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SciRow {
    pub sci: [u8; 8],
    /// Bit per AN with a programmed, enabled SA.
    pub an_valid: u8,
    pub sc_index: u8,
    /// Match double-tagged frames.
    pub dvlan: bool,
    pub valid: bool,
}

/// Per-SC parameter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScParamRow {
    /// First key-table index of this SC (`sc_index * MAX_SA_PER_SC`).
    pub key_index_start: u8,
    pub pn_window: u32,
    pub pn_threshold: u32,
    /// TCI octet placed in the SecTAG.
    pub tci: u8,
    /// SCI in hardware byte order (low byte first).
    pub sci: [u8; 8],
    /// Leave the outer VLAN tag unencrypted.
    pub vlan_in_clear: bool,
}

/// Per-SC state row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScStateRow {
    pub curr_an: u8,
}

/// Per-SA packet-number state row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaStateRow {
    pub next_pn: u32,
    pub lowest_pn: u32,
    /// Tx only; Rx SA validity lives in the SCI row's `an_valid`.
    pub valid: bool,
}

/// Key-table entry: session key and hash subkey for one (SC, AN).
#[cfg(feature = "key-program")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyTableRow {
    pub sak: [u8; 16],
    pub hkey: [u8; 16],
    pub valid: bool,
}

/// A row payload tagged with its table kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LutRow {
    Bypass(BypassRow),
    Sci(SciRow),
    ScParam(ScParamRow),
    ScState(ScStateRow),
    SaState(SaStateRow),
}

impl LutRow {
    /// The table this row belongs to.
    pub fn kind(&self) -> LutKind {
        match self {
            LutRow::Bypass(_) => LutKind::Bypass,
            LutRow::Sci(_) => LutKind::Sci,
            LutRow::ScParam(_) => LutKind::ScParam,
            LutRow::ScState(_) => LutKind::ScState,
            LutRow::SaState(_) => LutKind::SaState,
        }
    }

    /// The cleared/invalid row for a table kind, with all valid and entry
    /// bits unset. Committing this row retires the entry.
    pub fn cleared(kind: LutKind) -> Self {
        match kind {
            LutKind::Bypass => LutRow::Bypass(BypassRow::default()),
            LutKind::Sci => LutRow::Sci(SciRow::default()),
            LutKind::ScParam => LutRow::ScParam(ScParamRow::default()),
            LutKind::ScState => LutRow::ScState(ScStateRow::default()),
            LutKind::SaState => LutRow::SaState(SaStateRow::default()),
        }
    }

    /// Returns true if this row is the cleared form of its kind.
    pub fn is_cleared(&self) -> bool {
        *self == LutRow::cleared(self.kind())
    }
}
