//! Transactional SC/SA programming.
//!
//! Realizing one add/update spans five hardware tables that are not
//! atomically committed. Rows are written in a fixed order: key table
//! (create only), SA-State, SC-Parameter, SCI, then SC-State (enable
//! only). Each successful write pushes an undo action. On the first failure
//! the stack unwinds in reverse, re-committing every row already written
//! with its valid/entry bits cleared. Unwind is best-effort: a failure
//! while unwinding is logged and skipped, since aborting mid-unwind would
//! leave even more rows live.

use log::{debug, error};

#[cfg(feature = "key-program")]
use macsec_hal::KeyTableRow;
use macsec_hal::{
    Direction, LutKind, LutRow, MacsecOps, SaStateRow, ScParamRow, ScStateRow, SciRow,
};

use crate::orch::MacsecError;
use crate::types::{KeyIndex, ScRecord, PN_THRESHOLD};

enum UndoOp {
    Row { kind: LutKind, index: u16 },
    #[cfg(feature = "key-program")]
    Key { index: u16 },
}

/// Ordered record of the rows committed so far in one operation.
struct UndoStack {
    dir: Direction,
    ops: Vec<UndoOp>,
}

impl UndoStack {
    fn new(dir: Direction) -> Self {
        Self {
            dir,
            ops: Vec::with_capacity(4),
        }
    }

    fn push_row(&mut self, kind: LutKind, index: u16) {
        self.ops.push(UndoOp::Row { kind, index });
    }

    #[cfg(feature = "key-program")]
    fn push_key(&mut self, index: u16) {
        self.ops.push(UndoOp::Key { index });
    }

    /// Clears every committed row, most recent first.
    fn unwind(self, hw: &mut dyn MacsecOps) {
        let UndoStack { dir, ops } = self;
        for op in ops.into_iter().rev() {
            let res = match op {
                UndoOp::Row { kind, index } => {
                    debug!("rollback: clearing {} {} LUT index {}", dir, kind, index);
                    hw.commit_row(dir, index, &LutRow::cleared(kind))
                }
                #[cfg(feature = "key-program")]
                UndoOp::Key { index } => {
                    debug!("rollback: clearing {} key table index {}", dir, index);
                    hw.commit_key(dir, index, &KeyTableRow::default())
                }
            };
            if let Err(e) = res {
                // Nothing more can be done for this row without diverging
                // further from hardware; move on to the next one.
                error!("rollback write failed, continuing: {}", e);
            }
        }
    }
}

/// Programs all hardware rows for one SA of `sc`, which must already carry
/// the target AN in `an_valid`. Returns the key index backing the AN.
///
/// On failure every row this call wrote has been cleared again and the
/// caller's directory is untouched.
pub(crate) fn program_sc(
    hw: &mut dyn MacsecOps,
    dir: Direction,
    sc: &ScRecord,
    an: u8,
    create_sa: bool,
    enable_sa: bool,
) -> Result<KeyIndex, MacsecError> {
    let mut undo = UndoStack::new(dir);
    match program_rows(hw, dir, sc, an, create_sa, enable_sa, &mut undo) {
        Ok(key_index) => Ok(key_index),
        Err(e) => {
            undo.unwind(hw);
            Err(e)
        }
    }
}

fn program_rows(
    hw: &mut dyn MacsecOps,
    dir: Direction,
    sc: &ScRecord,
    an: u8,
    create_sa: bool,
    enable_sa: bool,
    undo: &mut UndoStack,
) -> Result<KeyIndex, MacsecError> {
    let sc_idx = sc.sc_idx_start;
    let key_index = sc.key_index(an);

    #[cfg(feature = "key-program")]
    if create_sa {
        let row = KeyTableRow {
            sak: sc.sak,
            hkey: sc.hkey,
            valid: true,
        };
        hw.commit_key(dir, key_index, &row)?;
        undo.push_key(key_index);
    }
    #[cfg(not(feature = "key-program"))]
    let _ = create_sa;

    // Tx SA validity lives here; Rx validity is carried by the SCI row's
    // AN-valid bits instead.
    let sa_state = LutRow::SaState(SaStateRow {
        next_pn: sc.next_pn,
        lowest_pn: sc.lowest_pn,
        valid: dir == Direction::Tx,
    });
    hw.commit_row(dir, key_index, &sa_state)?;
    undo.push_row(LutKind::SaState, key_index);

    let sc_param = LutRow::ScParam(ScParamRow {
        key_index_start: sc.key_index(0) as u8,
        pn_window: sc.pn_window,
        pn_threshold: PN_THRESHOLD,
        tci: sc.tci,
        sci: sc.sci.reversed(),
        vlan_in_clear: sc.vlan_in_clear,
    });
    hw.commit_row(dir, sc_idx, &sc_param)?;
    undo.push_row(LutKind::ScParam, sc_idx);

    let sci_row = LutRow::Sci(SciRow {
        sci: sc.sci.bytes(),
        an_valid: sc.an_valid,
        sc_index: sc_idx as u8,
        dvlan: sc.dvlan,
        valid: true,
    });
    hw.commit_row(dir, sc_idx, &sci_row)?;
    undo.push_row(LutKind::Sci, sc_idx);

    if enable_sa {
        let sc_state = LutRow::ScState(ScStateRow { curr_an: an });
        hw.commit_row(dir, sc_idx, &sc_state)?;
    }

    debug!(
        "{}: programmed SC {} slot {} AN {} (key index {})",
        dir, sc.sci, sc_idx, an, key_index
    );
    Ok(key_index)
}
