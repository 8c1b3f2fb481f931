//! Bulk bring-up and teardown of the table set.

use log::{error, info};

#[cfg(feature = "key-program")]
use macsec_hal::KeyTableRow;
use macsec_hal::{
    BypassRow, Direction, LutKind, LutRow, MacsecOps, BROADCAST_ADDR, MKA_GROUP_ADDR,
};

use crate::audit::{AuditCategory, AuditRecord};
use crate::audit_log;
use crate::directory::ScDirectory;
use crate::orch::{MacsecError, MacsecOrch};

const ALL_LUTS: [LutKind; 5] = [
    LutKind::Bypass,
    LutKind::Sci,
    LutKind::ScParam,
    LutKind::ScState,
    LutKind::SaState,
];

impl MacsecOrch {
    /// Writes every row of every table in `dir` (and the key table when
    /// key programming is compiled in) to its cleared state. Used at
    /// initialization and deinitialization. Aborts on the first failing
    /// row, surfacing its kind and index; on success the direction's
    /// directory mirror and bypass cursor are reset to match.
    pub fn clear_all(&mut self, hw: &mut dyn MacsecOps, dir: Direction) -> Result<(), MacsecError> {
        for kind in ALL_LUTS {
            let cleared = LutRow::cleared(kind);
            for index in 0..self.limits.lut_depth(kind) {
                if let Err(e) = hw.commit_row(dir, index, &cleared) {
                    error!("clear_all {}: aborted at {} LUT index {}: {}", dir, kind, index, e);
                    return Err(e.into());
                }
            }
        }
        #[cfg(feature = "key-program")]
        for index in 0..self.limits.key_table_depth {
            if let Err(e) = hw.commit_key(dir, index, &KeyTableRow::default()) {
                error!("clear_all {}: aborted at key table index {}: {}", dir, index, e);
                return Err(e.into());
            }
        }

        self.dirs[dir.index()] = ScDirectory::new();
        self.next_bypass_idx[dir.index()] = 0;

        info!("{}: cleared all MACsec tables", dir);
        audit_log!(AuditRecord::new(AuditCategory::SystemLifecycle, "MacsecOrch", "clear_all")
            .with_object_type("macsec_tables")
            .with_details(serde_json::json!({ "direction": dir.to_string() })));
        Ok(())
    }

    /// Installs the two fixed bypass rules for `dir`: broadcast and the
    /// MKA group address, so link management traffic is never blocked by
    /// the absence of a matching secure-channel rule.
    ///
    /// Each rule consumes the next unused bypass index; indices are never
    /// reclaimed, so the defaults are expected to be installed once per
    /// direction per boot. Repeated installs eventually exhaust the table.
    pub fn install_default_bypass(
        &mut self,
        hw: &mut dyn MacsecOps,
        dir: Direction,
    ) -> Result<(), MacsecError> {
        let d = dir.index();
        for dst_addr in [BROADCAST_ADDR, MKA_GROUP_ADDR] {
            let index = self.next_bypass_idx[d];
            if index >= self.limits.bypass_depth {
                return Err(MacsecError::ResourceExhausted(index as usize));
            }
            let row = LutRow::Bypass(BypassRow {
                dst_addr,
                valid: true,
            });
            hw.commit_row(dir, index, &row)?;
            self.next_bypass_idx[d] = index + 1;
        }

        info!(
            "{}: installed default bypass rules (next bypass index {})",
            dir, self.next_bypass_idx[d]
        );
        audit_log!(AuditRecord::new(AuditCategory::SystemLifecycle, "MacsecOrch", "install_default_bypass")
            .with_object_type("bypass_lut")
            .with_details(serde_json::json!({
                "direction": dir.to_string(),
                "next_index": self.next_bypass_idx[d],
            })));
        Ok(())
    }
}
