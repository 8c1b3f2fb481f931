//! Per-direction mirror of the hardware SC slots.

use macsec_hal::MAX_SC;

use crate::types::{ScRecord, Sci};

/// In-memory mirror of which hardware SC slots are in use and what each
/// holds. One instance per controller direction, exclusively owned by the
/// configuration manager; every mutation is paired with a hardware commit.
///
/// Invariant: `num_used` equals the number of slots with `an_valid != 0`
/// and never exceeds [`MAX_SC`].
#[derive(Debug, Clone)]
pub struct ScDirectory {
    slots: [ScRecord; MAX_SC],
    num_used: usize,
}

impl Default for ScDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl ScDirectory {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| ScRecord::default()),
            num_used: 0,
        }
    }

    pub fn num_used(&self) -> usize {
        self.num_used
    }

    pub fn is_full(&self) -> bool {
        self.num_used >= MAX_SC
    }

    /// Finds the in-use record carrying `sci`. Read-only; no ordering
    /// guarantee among duplicates (callers keep SCIs unique).
    pub fn find_existing(&self, sci: Sci) -> Option<&ScRecord> {
        self.slots.iter().find(|rec| rec.is_in_use() && rec.sci == sci)
    }

    /// Slot index of the in-use record carrying `sci`.
    pub fn find_slot(&self, sci: Sci) -> Option<u16> {
        self.slots
            .iter()
            .position(|rec| rec.is_in_use() && rec.sci == sci)
            .map(|i| i as u16)
    }

    /// First free slot, or none when the directory is full. Read-only.
    pub fn get_free_slot(&self) -> Option<u16> {
        if self.is_full() {
            return None;
        }
        self.slots
            .iter()
            .position(|rec| !rec.is_in_use())
            .map(|i| i as u16)
    }

    /// Record in `slot`. Callers pass slots obtained from this directory,
    /// so an out-of-range index is a logic error.
    pub(crate) fn get(&self, slot: u16) -> &ScRecord {
        &self.slots[slot as usize]
    }

    /// Places a new record into a free slot.
    pub(crate) fn install(&mut self, slot: u16, rec: ScRecord) {
        debug_assert!(!self.slots[slot as usize].is_in_use());
        debug_assert!(rec.is_in_use());
        self.slots[slot as usize] = rec;
        self.num_used += 1;
        self.check_invariant();
    }

    /// Overwrites an in-use record with its committed working copy.
    pub(crate) fn replace(&mut self, slot: u16, rec: ScRecord) {
        debug_assert!(self.slots[slot as usize].is_in_use());
        debug_assert!(rec.is_in_use());
        self.slots[slot as usize] = rec;
        self.check_invariant();
    }

    /// Clears one AN bit, returning the remaining `an_valid` bitmap.
    pub(crate) fn clear_an(&mut self, slot: u16, an: u8) -> u8 {
        let rec = &mut self.slots[slot as usize];
        rec.an_valid &= !(1 << an);
        rec.an_valid
    }

    /// Zeroes a fully-disabled record and reclaims its slot. Wipes the key
    /// material the record held.
    pub(crate) fn retire(&mut self, slot: u16) {
        debug_assert!(!self.slots[slot as usize].is_in_use());
        self.slots[slot as usize] = ScRecord::default();
        self.num_used = self.num_used.saturating_sub(1);
        self.check_invariant();
    }

    fn check_invariant(&self) {
        debug_assert_eq!(
            self.num_used,
            self.slots.iter().filter(|r| r.is_in_use()).count()
        );
    }
}
