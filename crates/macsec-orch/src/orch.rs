//! MACsec configuration orchestration.

use log::{info, warn};
use thiserror::Error;

use macsec_hal::{Direction, HalError, HwLimits, LutKind, LutRow, MacsecOps};
#[cfg(feature = "key-program")]
use macsec_hal::KeyTableRow;

use crate::audit::{AuditCategory, AuditRecord};
use crate::audit_log;
use crate::directory::ScDirectory;
use crate::txn;
use crate::types::{KeyIndex, ScCandidate, ScRecord, Sci};

/// MACsec configuration error type.
#[derive(Debug, Clone, Error)]
pub enum MacsecError {
    /// Malformed request, rejected before any hardware write.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A fixed-capacity hardware table has no free entry.
    #[error("hardware table exhausted ({0} entries in use)")]
    ResourceExhausted(usize),
    /// Disable requested for an SCI (or AN) with no existing state.
    #[error("SC not found: {0}")]
    NotFound(Sci),
    /// A row commit or readback exceeded its retry bound.
    #[error("hardware fault: {0}")]
    HardwareFault(#[from] HalError),
}

/// Orchestrator configuration.
#[derive(Debug, Clone, Default)]
pub struct MacsecOrchConfig {
    /// Which silicon backend the row committer drives.
    pub variant: macsec_hal::Variant,
}

/// Orchestrator statistics.
#[derive(Debug, Clone, Default)]
pub struct MacsecOrchStats {
    pub scs_created: u64,
    pub scs_retired: u64,
    pub sas_installed: u64,
    pub sas_removed: u64,
    /// Add/update sequences that failed mid-way and were unwound.
    pub rollbacks: u64,
}

/// Secure channel / secure association configuration manager.
///
/// Owns the per-direction SC directories and decides, for every request,
/// whether to allocate a slot, reprogram an existing channel or retire
/// one. Hardware access goes through the [`MacsecOps`] reference the
/// caller passes in; this type holds no hardware handle of its own.
pub struct MacsecOrch {
    config: MacsecOrchConfig,
    pub(crate) limits: HwLimits,
    pub(crate) dirs: [ScDirectory; 2],
    /// Next unused bypass LUT index, per direction. Monotonic: retired
    /// bypass indices are not reclaimed.
    pub(crate) next_bypass_idx: [u16; 2],
    pub(crate) stats: MacsecOrchStats,
}

impl std::fmt::Debug for MacsecOrch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MacsecOrch")
            .field("config", &self.config)
            .field("tx_scs", &self.dirs[Direction::Tx.index()].num_used())
            .field("rx_scs", &self.dirs[Direction::Rx.index()].num_used())
            .field("stats", &self.stats)
            .finish()
    }
}

impl MacsecOrch {
    pub fn new(config: MacsecOrchConfig) -> Self {
        let limits = config.variant.limits();
        Self {
            config,
            limits,
            dirs: [ScDirectory::new(), ScDirectory::new()],
            next_bypass_idx: [0; 2],
            stats: MacsecOrchStats::default(),
        }
    }

    pub fn config(&self) -> &MacsecOrchConfig {
        &self.config
    }

    pub fn stats(&self) -> &MacsecOrchStats {
        &self.stats
    }

    /// Read-only view of one direction's SC directory.
    pub fn directory(&self, dir: Direction) -> &ScDirectory {
        &self.dirs[dir.index()]
    }

    /// Number of secure channels currently programmed in `dir`.
    pub fn sc_count(&self, dir: Direction) -> usize {
        self.dirs[dir.index()].num_used()
    }

    /// Enables or disables the SA named by the candidate's (SCI, AN).
    ///
    /// Classifies the request against the directory and dispatches: a new
    /// SC is allocated and programmed, an existing one is reprogrammed
    /// through a working copy, or the SA footprint is removed (retiring
    /// the SC when its last AN goes away). Returns the key-table index
    /// backing the AN so the caller can correlate key material.
    ///
    /// On an add/update hardware fault the directory is unchanged and the
    /// rows already written have been cleared again. On a delete-path
    /// fault the error is surfaced with no rollback; a partially cleared
    /// SC is a safe degraded state.
    pub fn configure(
        &mut self,
        hw: &mut dyn MacsecOps,
        cand: &ScCandidate,
        enable: bool,
        dir: Direction,
    ) -> Result<KeyIndex, MacsecError> {
        if cand.an as usize >= macsec_hal::MAX_SA_PER_SC {
            return Err(MacsecError::InvalidArgument(format!(
                "AN {} out of range (0..{})",
                cand.an,
                macsec_hal::MAX_SA_PER_SC
            )));
        }

        let slot = self.dirs[dir.index()].find_slot(cand.sci);
        match (slot, enable) {
            (None, true) => self.add_new_sc(hw, cand, dir),
            (None, false) => {
                warn!("{}: disable for unknown SC {}", dir, cand.sci);
                Err(MacsecError::NotFound(cand.sci))
            }
            (Some(slot), false) => self.del_upd_sc(hw, slot, cand, dir),
            (Some(slot), true) => self.upd_existing_sc(hw, slot, cand, dir),
        }
    }

    /// Key-table index of the SC's current AN. Read-only.
    pub fn lookup_key_index(&self, sci: Sci, dir: Direction) -> Result<KeyIndex, MacsecError> {
        match self.dirs[dir.index()].find_existing(sci) {
            Some(rec) => Ok(rec.key_index(rec.curr_an)),
            None => Err(MacsecError::NotFound(sci)),
        }
    }

    /// Allocates a free slot and programs a brand-new SC.
    fn add_new_sc(
        &mut self,
        hw: &mut dyn MacsecOps,
        cand: &ScCandidate,
        dir: Direction,
    ) -> Result<KeyIndex, MacsecError> {
        let d = dir.index();
        let Some(slot) = self.dirs[d].get_free_slot() else {
            warn!("{}: SC table full, cannot add {}", dir, cand.sci);
            return Err(MacsecError::ResourceExhausted(self.dirs[d].num_used()));
        };

        let rec = ScRecord::from_candidate(cand, slot);
        let key_index = match txn::program_sc(hw, dir, &rec, cand.an, cand.create_sa, cand.enable_sa)
        {
            Ok(ki) => ki,
            Err(e) => return Err(self.on_rollback(cand, dir, "add_sc", e)),
        };

        self.dirs[d].install(slot, rec);
        self.stats.scs_created += 1;
        self.stats.sas_installed += 1;

        info!(
            "{}: added SC {} slot {} AN {} (key index {})",
            dir, cand.sci, slot, cand.an, key_index
        );
        audit_log!(AuditRecord::new(AuditCategory::ResourceCreate, "MacsecOrch", "configure_sa")
            .with_object_id(cand.sci.to_string())
            .with_object_type("macsec_sc")
            .with_details(serde_json::json!({
                "direction": dir.to_string(),
                "slot": slot,
                "an": cand.an,
                "key_index": key_index,
            })));
        Ok(key_index)
    }

    /// Reprograms an existing SC through a working copy: the live record
    /// is only overwritten after every hardware write has succeeded, so a
    /// failed update cannot corrupt the previously-good state.
    fn upd_existing_sc(
        &mut self,
        hw: &mut dyn MacsecOps,
        slot: u16,
        cand: &ScCandidate,
        dir: Direction,
    ) -> Result<KeyIndex, MacsecError> {
        let d = dir.index();
        let mut work = self.dirs[d].get(slot).clone();
        work.apply_candidate(cand);

        let key_index = match txn::program_sc(hw, dir, &work, cand.an, cand.create_sa, cand.enable_sa)
        {
            Ok(ki) => ki,
            Err(e) => return Err(self.on_rollback(cand, dir, "update_sc", e)),
        };

        self.dirs[d].replace(slot, work);
        self.stats.sas_installed += 1;

        info!(
            "{}: updated SC {} slot {} AN {} (key index {})",
            dir, cand.sci, slot, cand.an, key_index
        );
        audit_log!(AuditRecord::new(AuditCategory::ResourceModify, "MacsecOrch", "configure_sa")
            .with_object_id(cand.sci.to_string())
            .with_object_type("macsec_sc")
            .with_details(serde_json::json!({
                "direction": dir.to_string(),
                "slot": slot,
                "an": cand.an,
                "key_index": key_index,
            })));
        Ok(key_index)
    }

    /// Removes one SA's footprint, retiring the SC when its last AN is
    /// disabled. Aborts on the first hardware fault without rollback;
    /// every sub-step clears rather than sets state, so a partial failure
    /// leaves a strict subset cleared.
    fn del_upd_sc(
        &mut self,
        hw: &mut dyn MacsecOps,
        slot: u16,
        cand: &ScCandidate,
        dir: Direction,
    ) -> Result<KeyIndex, MacsecError> {
        let d = dir.index();
        let rec = self.dirs[d].get(slot);
        if !rec.has_an(cand.an) {
            warn!("{}: SC {} has no enabled AN {}", dir, cand.sci, cand.an);
            return Err(MacsecError::NotFound(cand.sci));
        }
        let sc_idx = rec.sc_idx_start;
        let key_index = rec.key_index(cand.an);
        let retiring = cand.an == rec.curr_an;

        if retiring {
            hw.commit_row(dir, sc_idx, &LutRow::cleared(LutKind::Sci))?;
            hw.commit_row(dir, sc_idx, &LutRow::cleared(LutKind::ScParam))?;
            hw.commit_row(dir, sc_idx, &LutRow::cleared(LutKind::ScState))?;
        }
        hw.commit_row(dir, key_index, &LutRow::cleared(LutKind::SaState))?;
        #[cfg(feature = "key-program")]
        hw.commit_key(dir, key_index, &KeyTableRow::default())?;

        let remaining = self.dirs[d].clear_an(slot, cand.an);
        self.stats.sas_removed += 1;

        if remaining == 0 {
            self.dirs[d].retire(slot);
            self.stats.scs_retired += 1;
            info!("{}: retired SC {} slot {}", dir, cand.sci, slot);
        } else {
            info!(
                "{}: disabled SC {} AN {} (remaining AN map {:#06b})",
                dir, cand.sci, cand.an, remaining
            );
        }

        audit_log!(AuditRecord::new(AuditCategory::ResourceDelete, "MacsecOrch", "disable_sa")
            .with_object_id(cand.sci.to_string())
            .with_object_type("macsec_sc")
            .with_details(serde_json::json!({
                "direction": dir.to_string(),
                "an": cand.an,
                "key_index": key_index,
                "sc_retired": remaining == 0,
            })));
        Ok(key_index)
    }

    /// Bookkeeping for an unwound add/update sequence.
    fn on_rollback(
        &mut self,
        cand: &ScCandidate,
        dir: Direction,
        action: &str,
        err: MacsecError,
    ) -> MacsecError {
        self.stats.rollbacks += 1;
        warn!("{}: {} for {} rolled back: {}", dir, action, cand.sci, err);
        audit_log!(AuditRecord::new(AuditCategory::ErrorCondition, "MacsecOrch", action)
            .with_object_id(cand.sci.to_string())
            .with_object_type("macsec_sc")
            .with_error(err.to_string()));
        err
    }
}
