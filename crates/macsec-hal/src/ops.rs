//! The row-committer capability and hardware variant identification.

use crate::error::HalResult;
#[cfg(feature = "key-program")]
use crate::rows::KeyTableRow;
use crate::rows::LutRow;
use crate::types::{
    Direction, LutKind, BYPASS_LUT_DEPTH, KEY_TABLE_DEPTH, SA_STATE_LUT_DEPTH, SC_LUT_DEPTH,
};

/// Row commit/readback capability of a MACsec controller.
///
/// Implementations serialize the row payload into the controller's
/// indirect-access registers, set the trigger bit and poll busy/ready with
/// a bounded retry count and fixed inter-poll delay, returning
/// [`HalError::RetryExhausted`](crate::HalError) when the bound is hit.
/// Calls are blocking; the configuration manager above serializes them.
///
/// One implementation exists per silicon [`Variant`] in the register layer,
/// plus [`MockMacsec`](crate::mock::MockMacsec) for tests.
pub trait MacsecOps {
    /// Commits a row, replacing whatever the table holds at `index`.
    fn commit_row(&mut self, dir: Direction, index: u16, row: &LutRow) -> HalResult<()>;

    /// Reads back the row at `index`.
    fn read_row(&mut self, dir: Direction, kind: LutKind, index: u16) -> HalResult<LutRow>;

    /// Commits a key-table entry. Key material is write-only; there is no
    /// readback path.
    #[cfg(feature = "key-program")]
    fn commit_key(&mut self, dir: Direction, index: u16, row: &KeyTableRow) -> HalResult<()>;
}

/// The silicon variants that expose the MACsec table set.
///
/// `Ivc` is the virtualized backend: commits are forwarded over the
/// inter-VM channel to the owning guest, which drives one of the other two.
/// All three implement [`MacsecOps`] in the register layer; the
/// configuration manager depends only on the trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    #[default]
    Eqos,
    Mgbe,
    Ivc,
}

impl Variant {
    /// Table geometry for this part.
    pub fn limits(self) -> HwLimits {
        // The EQOS and MGBE MACsec blocks share one table geometry; the
        // IVC proxy reports whatever the owning controller has.
        match self {
            Variant::Eqos | Variant::Mgbe | Variant::Ivc => HwLimits {
                sc_lut_depth: SC_LUT_DEPTH as u16,
                sa_state_depth: SA_STATE_LUT_DEPTH as u16,
                bypass_depth: BYPASS_LUT_DEPTH as u16,
                key_table_depth: KEY_TABLE_DEPTH as u16,
            },
        }
    }
}

/// Per-variant table depths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HwLimits {
    pub sc_lut_depth: u16,
    pub sa_state_depth: u16,
    pub bypass_depth: u16,
    pub key_table_depth: u16,
}

impl HwLimits {
    /// Depth of the given lookup table.
    pub fn lut_depth(&self, kind: LutKind) -> u16 {
        match kind {
            LutKind::Bypass => self.bypass_depth,
            LutKind::Sci | LutKind::ScParam | LutKind::ScState => self.sc_lut_depth,
            LutKind::SaState => self.sa_state_depth,
        }
    }
}
