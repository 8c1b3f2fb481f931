//! Secure channel records and configuration candidates.

use std::fmt;

use macsec_hal::MAX_SA_PER_SC;

/// Hardware key-table index, `sc_idx_start * MAX_SA_PER_SC + an`.
///
/// Returned from every successful configure call so the caller can
/// correlate externally-delivered key material with the slot holding it.
pub type KeyIndex = u16;

/// Packet-number watermark programmed into the SC-Parameter row; the
/// controller raises a rekey interrupt when `next_pn` crosses it. Three
/// quarters of the 32-bit PN space.
pub const PN_THRESHOLD: u32 = 0xC000_0000;

/// Secure Channel Identifier: the 8-byte value naming a secure channel on
/// the wire (port MAC address + port identifier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Sci([u8; 8]);

impl Sci {
    pub const fn new(bytes: [u8; 8]) -> Self {
        Sci(bytes)
    }

    pub fn bytes(&self) -> [u8; 8] {
        self.0
    }

    /// SCI in hardware byte order (low byte first), as the SC-Parameter
    /// row expects it.
    pub fn reversed(&self) -> [u8; 8] {
        let mut out = self.0;
        out.reverse();
        out
    }
}

impl From<u64> for Sci {
    fn from(v: u64) -> Self {
        Sci(v.to_be_bytes())
    }
}

impl fmt::Display for Sci {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// One secure channel as mirrored from hardware.
///
/// A record is in use iff `an_valid != 0`; a default (zeroed) record marks
/// a free slot. Retiring a record overwrites it with the default, which
/// also wipes the key material it held.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScRecord {
    pub sci: Sci,
    /// Session key for the most recently programmed SA.
    pub sak: [u8; 16],
    /// AES-GCM hash subkey matching `sak`.
    #[cfg(feature = "key-program")]
    pub hkey: [u8; 16],
    /// AN most recently operated on.
    pub curr_an: u8,
    /// Bit per AN with a programmed, enabled SA.
    pub an_valid: u8,
    pub next_pn: u32,
    pub lowest_pn: u32,
    /// Replay window size.
    pub pn_window: u32,
    /// Hardware SC slot backing this record.
    pub sc_idx_start: u16,
    /// TCI octet for the SecTAG.
    pub tci: u8,
    pub vlan_in_clear: bool,
    pub dvlan: bool,
}

impl ScRecord {
    pub fn is_in_use(&self) -> bool {
        self.an_valid != 0
    }

    pub fn has_an(&self, an: u8) -> bool {
        self.an_valid & (1 << an) != 0
    }

    /// Key-table index backing `an` for this channel.
    pub fn key_index(&self, an: u8) -> KeyIndex {
        self.sc_idx_start * MAX_SA_PER_SC as u16 + an as u16
    }

    /// Builds the record for a brand-new SC in `slot`.
    pub(crate) fn from_candidate(cand: &ScCandidate, slot: u16) -> Self {
        let mut rec = ScRecord {
            sci: cand.sci,
            curr_an: cand.an,
            sc_idx_start: slot,
            ..Default::default()
        };
        rec.apply_candidate(cand);
        rec
    }

    /// Applies a candidate's SAK/AN/PN fields, marking the AN valid. Used
    /// on a working copy; the live record is only replaced once hardware
    /// accepted every row.
    pub(crate) fn apply_candidate(&mut self, cand: &ScCandidate) {
        self.sak = cand.sak;
        #[cfg(feature = "key-program")]
        {
            self.hkey = cand.hkey;
        }
        self.an_valid |= 1 << cand.an;
        self.next_pn = cand.next_pn;
        self.lowest_pn = cand.lowest_pn;
        self.pn_window = cand.pn_window;
        self.tci = cand.tci;
        self.vlan_in_clear = cand.vlan_in_clear;
        self.dvlan = cand.dvlan;
        if cand.enable_sa {
            self.curr_an = cand.an;
        }
    }
}

/// Configuration request bundle for one (SCI, AN).
#[derive(Debug, Clone)]
pub struct ScCandidate {
    pub sci: Sci,
    /// Association number, 0..=3.
    pub an: u8,
    pub sak: [u8; 16],
    #[cfg(feature = "key-program")]
    pub hkey: [u8; 16],
    pub next_pn: u32,
    pub lowest_pn: u32,
    pub pn_window: u32,
    pub tci: u8,
    pub vlan_in_clear: bool,
    pub dvlan: bool,
    /// First introduction of this AN; programs the key-table entry.
    pub create_sa: bool,
    /// Make this AN the channel's current AN (programs the SC-State row).
    pub enable_sa: bool,
}

impl ScCandidate {
    /// Candidate with create + enable set and PN state zeroed, the common
    /// first-key case.
    pub fn new(sci: Sci, an: u8, sak: [u8; 16]) -> Self {
        Self {
            sci,
            an,
            sak,
            #[cfg(feature = "key-program")]
            hkey: [0; 16],
            next_pn: 0,
            lowest_pn: 0,
            pn_window: 0,
            tci: 0,
            vlan_in_clear: false,
            dvlan: false,
            create_sa: true,
            enable_sa: true,
        }
    }

    #[cfg(feature = "key-program")]
    pub fn with_hkey(mut self, hkey: [u8; 16]) -> Self {
        self.hkey = hkey;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sci_from_u64_is_big_endian() {
        let sci = Sci::from(0x0102030405060708);
        assert_eq!(sci.bytes(), [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(sci.to_string(), "0x0102030405060708");
    }

    #[test]
    fn test_sci_reversed() {
        let sci = Sci::from(0x0102030405060708);
        assert_eq!(sci.reversed(), [8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_key_index_math() {
        let rec = ScRecord {
            sc_idx_start: 3,
            ..Default::default()
        };
        assert_eq!(rec.key_index(0), 12);
        assert_eq!(rec.key_index(3), 15);
    }

    #[test]
    fn test_from_candidate_marks_an_valid() {
        let cand = ScCandidate::new(Sci::from(0xaabb), 2, [9; 16]);
        let rec = ScRecord::from_candidate(&cand, 5);

        assert!(rec.is_in_use());
        assert!(rec.has_an(2));
        assert!(!rec.has_an(0));
        assert_eq!(rec.curr_an, 2);
        assert_eq!(rec.sc_idx_start, 5);
        assert_eq!(rec.sak, [9; 16]);
    }

    #[test]
    fn test_apply_candidate_without_enable_keeps_curr_an() {
        let mut rec = ScRecord::from_candidate(&ScCandidate::new(Sci::from(1), 0, [1; 16]), 0);

        let mut cand = ScCandidate::new(Sci::from(1), 1, [2; 16]);
        cand.enable_sa = false;
        rec.apply_candidate(&cand);

        assert_eq!(rec.curr_an, 0);
        assert_eq!(rec.an_valid, 0b0011);
        assert_eq!(rec.sak, [2; 16]);
    }
}
