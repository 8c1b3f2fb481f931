//! Core MACsec hardware types and table geometry.

use std::fmt;

/// Number of secure-channel slots per controller direction.
pub const MAX_SC: usize = 16;

/// Number of secure associations per secure channel (AN 0..=3).
pub const MAX_SA_PER_SC: usize = 4;

/// Depth of the SCI, SC-Parameter and SC-State LUTs (one row per SC slot).
pub const SC_LUT_DEPTH: usize = MAX_SC;

/// Depth of the SA-State LUT (one row per SC slot per AN).
pub const SA_STATE_LUT_DEPTH: usize = MAX_SC * MAX_SA_PER_SC;

/// Depth of the key table, addressed by `sc_idx * MAX_SA_PER_SC + an`.
pub const KEY_TABLE_DEPTH: usize = MAX_SC * MAX_SA_PER_SC;

/// Depth of the bypass LUT.
pub const BYPASS_LUT_DEPTH: usize = 32;

/// Broadcast destination address, bypassed so ARP/ND keeps working before
/// any secure channel exists.
pub const BROADCAST_ADDR: [u8; 6] = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff];

/// MACsec key-agreement (MKA/EAPOL) group destination address, bypassed so
/// key negotiation itself is never blocked.
pub const MKA_GROUP_ADDR: [u8; 6] = [0x01, 0x80, 0xc2, 0x00, 0x00, 0x03];

/// Controller direction. The transmit and receive controllers carry fully
/// independent table sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Tx,
    Rx,
}

impl Direction {
    /// Dense index for per-direction arrays.
    pub fn index(self) -> usize {
        match self {
            Direction::Tx => 0,
            Direction::Rx => 1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Tx => write!(f, "Tx"),
            Direction::Rx => write!(f, "Rx"),
        }
    }
}

/// The lookup-table kinds exposed by the controller.
///
/// The key table is addressed through its own interface (see
/// [`MacsecOps::commit_key`](crate::ops::MacsecOps)) and is not a `LutKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LutKind {
    /// Destination-address bypass rules.
    Bypass,
    /// SCI match rows carrying the AN-valid bitmap and SC index.
    Sci,
    /// Per-SC parameters: key index base, PN window/threshold, TCI.
    ScParam,
    /// Per-SC state: the currently transmitting/receiving AN.
    ScState,
    /// Per-SA packet-number state.
    SaState,
}

impl fmt::Display for LutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LutKind::Bypass => "bypass",
            LutKind::Sci => "SCI",
            LutKind::ScParam => "SC param",
            LutKind::ScState => "SC state",
            LutKind::SaState => "SA state",
        };
        write!(f, "{}", s)
    }
}
