//! In-memory mock backend.
//!
//! Simulates the table set of a real controller without hardware: rows are
//! stored as committed, bounds are checked against the variant's limits,
//! and a one-shot fault can be armed to exercise mid-sequence failure
//! handling. Also useful for pre-silicon bring-up of the control plane.

use std::collections::HashMap;

use log::debug;

use crate::error::{HalError, HalResult};
use crate::ops::{HwLimits, MacsecOps, Variant};
#[cfg(feature = "key-program")]
use crate::rows::KeyTableRow;
use crate::rows::LutRow;
use crate::types::{Direction, LutKind};

/// Mock MACsec controller backend.
pub struct MockMacsec {
    limits: HwLimits,
    rows: HashMap<(Direction, LutKind, u16), LutRow>,
    #[cfg(feature = "key-program")]
    keys: HashMap<(Direction, u16), KeyTableRow>,
    /// Successful commits so far (rows and keys).
    commits: usize,
    /// Commit count at which the next commit fails, once.
    fail_at: Option<usize>,
}

impl MockMacsec {
    pub fn new(variant: Variant) -> Self {
        Self {
            limits: variant.limits(),
            rows: HashMap::new(),
            #[cfg(feature = "key-program")]
            keys: HashMap::new(),
            commits: 0,
            fail_at: None,
        }
    }

    /// Arms a one-shot fault on the n-th subsequent commit (0 = the very
    /// next one). The failing commit does not modify the table, and later
    /// commits succeed again, so rollback writes go through.
    pub fn fail_after(&mut self, n: usize) {
        self.fail_at = Some(self.commits + n);
    }

    /// Number of successful commits since construction.
    pub fn commit_count(&self) -> usize {
        self.commits
    }

    /// The committed row at `index`, if any commit ever reached it.
    pub fn row(&self, dir: Direction, kind: LutKind, index: u16) -> Option<&LutRow> {
        self.rows.get(&(dir, kind, index))
    }

    /// The committed key entry at `index`, if any commit ever reached it.
    #[cfg(feature = "key-program")]
    pub fn key(&self, dir: Direction, index: u16) -> Option<&KeyTableRow> {
        self.keys.get(&(dir, index))
    }

    /// Counts rows in `dir` holding anything other than their cleared form.
    pub fn active_rows(&self, dir: Direction) -> usize {
        self.rows
            .iter()
            .filter(|((d, _, _), row)| *d == dir && !row.is_cleared())
            .count()
    }

    /// Counts key entries in `dir` with the valid bit set.
    #[cfg(feature = "key-program")]
    pub fn active_keys(&self, dir: Direction) -> usize {
        self.keys
            .iter()
            .filter(|((d, _), key)| *d == dir && key.valid)
            .count()
    }

    fn take_fault(&mut self) -> bool {
        if self.fail_at == Some(self.commits) {
            self.fail_at = None;
            return true;
        }
        false
    }
}

impl MacsecOps for MockMacsec {
    fn commit_row(&mut self, dir: Direction, index: u16, row: &LutRow) -> HalResult<()> {
        let kind = row.kind();
        let depth = self.limits.lut_depth(kind);
        if index >= depth {
            return Err(HalError::IndexOutOfRange { kind, index, depth });
        }
        if self.take_fault() {
            return Err(HalError::RetryExhausted { dir, kind, index });
        }
        debug!("mock: commit {} {} LUT index {}", dir, kind, index);
        self.rows.insert((dir, kind, index), *row);
        self.commits += 1;
        Ok(())
    }

    fn read_row(&mut self, dir: Direction, kind: LutKind, index: u16) -> HalResult<LutRow> {
        let depth = self.limits.lut_depth(kind);
        if index >= depth {
            return Err(HalError::IndexOutOfRange { kind, index, depth });
        }
        if self.take_fault() {
            return Err(HalError::RetryExhausted { dir, kind, index });
        }
        Ok(self
            .rows
            .get(&(dir, kind, index))
            .copied()
            .unwrap_or_else(|| LutRow::cleared(kind)))
    }

    #[cfg(feature = "key-program")]
    fn commit_key(&mut self, dir: Direction, index: u16, row: &KeyTableRow) -> HalResult<()> {
        let depth = self.limits.key_table_depth;
        if index >= depth {
            return Err(HalError::KeyIndexOutOfRange { index, depth });
        }
        if self.take_fault() {
            return Err(HalError::KeyRetryExhausted { dir, index });
        }
        debug!("mock: commit {} key table index {}", dir, index);
        self.keys.insert((dir, index), *row);
        self.commits += 1;
        Ok(())
    }
}
