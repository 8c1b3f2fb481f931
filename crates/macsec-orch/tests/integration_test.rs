//! Integration tests for the SC/SA lifecycle against the mock backend.
//!
//! These exercise the full configure path: slot allocation, ordered table
//! programming, mid-sequence rollback, retirement and bulk operations,
//! verifying that the directory mirror and the (mock) hardware tables stay
//! in lock-step through every add/update/delete cycle.

use pretty_assertions::assert_eq;

use macsec_hal::{Direction, LutKind, MockMacsec, Variant, MAX_SC};
use macsec_orch::{MacsecError, MacsecOrch, MacsecOrchConfig, ScCandidate, Sci};

/// Hardware commits issued by one fresh add with create + enable set:
/// key table, SA-State, SC-Param, SCI, SC-State.
#[cfg(feature = "key-program")]
const COMMITS_PER_ADD: usize = 5;
#[cfg(not(feature = "key-program"))]
const COMMITS_PER_ADD: usize = 4;

fn setup() -> (MacsecOrch, MockMacsec) {
    (
        MacsecOrch::new(MacsecOrchConfig {
            variant: Variant::Mgbe,
        }),
        MockMacsec::new(Variant::Mgbe),
    )
}

fn candidate(sci: u64, an: u8) -> ScCandidate {
    ScCandidate::new(Sci::from(sci), an, [0x5a; 16])
}

const SCI_A: u64 = 0x0102030405060708;

#[test]
fn test_scenario_add_first_sa() {
    let (mut orch, mut hw) = setup();

    let key_index = orch
        .configure(&mut hw, &candidate(SCI_A, 0), true, Direction::Tx)
        .unwrap();

    assert_eq!(key_index, 0);
    assert_eq!(orch.sc_count(Direction::Tx), 1);
    let rec = orch
        .directory(Direction::Tx)
        .find_existing(Sci::from(SCI_A))
        .unwrap();
    assert_eq!(rec.sc_idx_start, 0);
    assert_eq!(rec.an_valid, 0b0001);
}

#[test]
fn test_scenario_second_an_takes_update_path() {
    let (mut orch, mut hw) = setup();
    orch.configure(&mut hw, &candidate(SCI_A, 0), true, Direction::Tx)
        .unwrap();

    let key_index = orch
        .configure(&mut hw, &candidate(SCI_A, 1), true, Direction::Tx)
        .unwrap();

    assert_eq!(key_index, 1);
    assert_eq!(orch.sc_count(Direction::Tx), 1);
    let rec = orch
        .directory(Direction::Tx)
        .find_existing(Sci::from(SCI_A))
        .unwrap();
    assert_eq!(rec.sc_idx_start, 0);
    assert_eq!(rec.an_valid, 0b0011);
    assert_eq!(rec.curr_an, 1);
}

#[test]
fn test_scenario_disable_one_an_keeps_sc() {
    let (mut orch, mut hw) = setup();
    orch.configure(&mut hw, &candidate(SCI_A, 0), true, Direction::Tx)
        .unwrap();
    orch.configure(&mut hw, &candidate(SCI_A, 1), true, Direction::Tx)
        .unwrap();

    orch.configure(&mut hw, &candidate(SCI_A, 0), false, Direction::Tx)
        .unwrap();

    assert_eq!(orch.sc_count(Direction::Tx), 1);
    let rec = orch
        .directory(Direction::Tx)
        .find_existing(Sci::from(SCI_A))
        .unwrap();
    assert_eq!(rec.an_valid, 0b0010);
}

#[test]
fn test_scenario_disabling_last_an_retires_sc() {
    let (mut orch, mut hw) = setup();
    orch.configure(&mut hw, &candidate(SCI_A, 0), true, Direction::Tx)
        .unwrap();
    orch.configure(&mut hw, &candidate(SCI_A, 1), true, Direction::Tx)
        .unwrap();
    orch.configure(&mut hw, &candidate(SCI_A, 0), false, Direction::Tx)
        .unwrap();

    orch.configure(&mut hw, &candidate(SCI_A, 1), false, Direction::Tx)
        .unwrap();

    assert_eq!(orch.sc_count(Direction::Tx), 0);
    assert!(orch
        .directory(Direction::Tx)
        .find_existing(Sci::from(SCI_A))
        .is_none());
    // Retiring the current AN cleared the SC-scoped rows too.
    assert!(hw.row(Direction::Tx, LutKind::Sci, 0).unwrap().is_cleared());
    assert!(hw
        .row(Direction::Tx, LutKind::ScState, 0)
        .unwrap()
        .is_cleared());
}

#[test]
fn test_scenario_directory_capacity() {
    let (mut orch, mut hw) = setup();
    for i in 0..MAX_SC as u64 {
        orch.configure(&mut hw, &candidate(0x1000 + i, 0), true, Direction::Tx)
            .unwrap();
    }
    assert_eq!(orch.sc_count(Direction::Tx), MAX_SC);

    let err = orch
        .configure(&mut hw, &candidate(0x2000, 0), true, Direction::Tx)
        .unwrap_err();

    assert!(matches!(err, MacsecError::ResourceExhausted(_)));
    assert_eq!(orch.sc_count(Direction::Tx), MAX_SC);
}

#[test]
fn test_slot_indices_unique_across_directory() {
    let (mut orch, mut hw) = setup();
    for i in 0..MAX_SC as u64 {
        orch.configure(&mut hw, &candidate(0x1000 + i, 0), true, Direction::Tx)
            .unwrap();
    }

    let mut seen = [false; MAX_SC];
    for i in 0..MAX_SC as u64 {
        let rec = orch
            .directory(Direction::Tx)
            .find_existing(Sci::from(0x1000 + i))
            .unwrap();
        assert!(!seen[rec.sc_idx_start as usize], "slot assigned twice");
        seen[rec.sc_idx_start as usize] = true;
    }
}

#[test]
fn test_round_trip_returns_to_initial_state() {
    let (mut orch, mut hw) = setup();

    orch.configure(&mut hw, &candidate(SCI_A, 0), true, Direction::Tx)
        .unwrap();
    orch.configure(&mut hw, &candidate(SCI_A, 0), false, Direction::Tx)
        .unwrap();

    assert_eq!(orch.sc_count(Direction::Tx), 0);
    assert_eq!(hw.active_rows(Direction::Tx), 0);
    #[cfg(feature = "key-program")]
    assert_eq!(hw.active_keys(Direction::Tx), 0);

    // The freed slot is eligible for reuse.
    let key_index = orch
        .configure(&mut hw, &candidate(0x99, 2), true, Direction::Tx)
        .unwrap();
    assert_eq!(key_index, 2);
    assert_eq!(
        orch.directory(Direction::Tx)
            .find_existing(Sci::from(0x99))
            .unwrap()
            .sc_idx_start,
        0
    );
}

#[test]
fn test_rollback_restores_pre_call_state_for_every_failing_step() {
    for k in 0..COMMITS_PER_ADD {
        let (mut orch, mut hw) = setup();
        hw.fail_after(k);

        let err = orch
            .configure(&mut hw, &candidate(SCI_A, 0), true, Direction::Tx)
            .unwrap_err();

        assert!(
            matches!(err, MacsecError::HardwareFault(_)),
            "step {}: wrong error {:?}",
            k,
            err
        );
        assert_eq!(orch.sc_count(Direction::Tx), 0, "step {}", k);
        assert_eq!(hw.active_rows(Direction::Tx), 0, "step {}", k);
        #[cfg(feature = "key-program")]
        assert_eq!(hw.active_keys(Direction::Tx), 0, "step {}", k);
        assert_eq!(orch.stats().rollbacks, 1, "step {}", k);

        // The slot is still allocatable afterwards.
        orch.configure(&mut hw, &candidate(SCI_A, 0), true, Direction::Tx)
            .unwrap();
        assert_eq!(orch.sc_count(Direction::Tx), 1, "step {}", k);
    }
}

#[test]
fn test_delete_path_fault_surfaces_without_rollback() {
    let (mut orch, mut hw) = setup();
    orch.configure(&mut hw, &candidate(SCI_A, 0), true, Direction::Tx)
        .unwrap();

    // Fault on the second clear of a current-AN disable (the SC-Param
    // row): the SCI row is already cleared when the error surfaces.
    hw.fail_after(1);
    let err = orch
        .configure(&mut hw, &candidate(SCI_A, 0), false, Direction::Tx)
        .unwrap_err();

    assert!(matches!(err, MacsecError::HardwareFault(_)));
    assert!(hw.row(Direction::Tx, LutKind::Sci, 0).unwrap().is_cleared());
    assert!(!hw
        .row(Direction::Tx, LutKind::ScParam, 0)
        .unwrap()
        .is_cleared());

    // No unwind on the delete path: the partial clearing stands and the
    // directory still carries the record.
    assert_eq!(orch.stats().rollbacks, 0);
    assert_eq!(orch.sc_count(Direction::Tx), 1);
    assert!(orch
        .directory(Direction::Tx)
        .find_existing(Sci::from(SCI_A))
        .unwrap()
        .has_an(0));

    // Retrying the disable completes the teardown.
    orch.configure(&mut hw, &candidate(SCI_A, 0), false, Direction::Tx)
        .unwrap();
    assert_eq!(orch.sc_count(Direction::Tx), 0);
    assert_eq!(hw.active_rows(Direction::Tx), 0);
    #[cfg(feature = "key-program")]
    assert_eq!(hw.active_keys(Direction::Tx), 0);
}

#[test]
fn test_failed_update_leaves_live_record_intact() {
    for k in 0..COMMITS_PER_ADD {
        let (mut orch, mut hw) = setup();
        orch.configure(&mut hw, &candidate(SCI_A, 0), true, Direction::Tx)
            .unwrap();
        let before = orch
            .directory(Direction::Tx)
            .find_existing(Sci::from(SCI_A))
            .unwrap()
            .clone();

        let mut cand = candidate(SCI_A, 1);
        cand.sak = [0xee; 16];
        hw.fail_after(k);
        let err = orch
            .configure(&mut hw, &cand, true, Direction::Tx)
            .unwrap_err();
        assert!(matches!(err, MacsecError::HardwareFault(_)), "step {}", k);

        let after = orch
            .directory(Direction::Tx)
            .find_existing(Sci::from(SCI_A))
            .unwrap();
        assert_eq!(*after, before, "step {}: live record corrupted", k);
        assert_eq!(orch.sc_count(Direction::Tx), 1, "step {}", k);
    }
}

#[test]
fn test_num_used_stays_bounded_across_churn() {
    let (mut orch, mut hw) = setup();

    for round in 0..3u64 {
        for i in 0..MAX_SC as u64 {
            orch.configure(&mut hw, &candidate(0x3000 + i, 0), true, Direction::Tx)
                .unwrap();
        }
        assert_eq!(orch.sc_count(Direction::Tx), MAX_SC, "round {}", round);

        for i in 0..MAX_SC as u64 {
            orch.configure(&mut hw, &candidate(0x3000 + i, 0), false, Direction::Tx)
                .unwrap();
        }
        assert_eq!(orch.sc_count(Direction::Tx), 0, "round {}", round);
        assert_eq!(hw.active_rows(Direction::Tx), 0, "round {}", round);
    }

    // Double-disable never drives the count negative.
    let err = orch
        .configure(&mut hw, &candidate(0x3000, 0), false, Direction::Tx)
        .unwrap_err();
    assert!(matches!(err, MacsecError::NotFound(_)));
    assert_eq!(orch.sc_count(Direction::Tx), 0);
}

#[test]
fn test_rekey_same_an_reuses_slot_and_key_index() {
    let (mut orch, mut hw) = setup();
    orch.configure(&mut hw, &candidate(SCI_A, 0), true, Direction::Tx)
        .unwrap();

    let mut rekey = candidate(SCI_A, 0);
    rekey.sak = [0x77; 16];
    rekey.next_pn = 1000;
    let key_index = orch
        .configure(&mut hw, &rekey, true, Direction::Tx)
        .unwrap();

    assert_eq!(key_index, 0);
    assert_eq!(orch.sc_count(Direction::Tx), 1);
    let rec = orch
        .directory(Direction::Tx)
        .find_existing(Sci::from(SCI_A))
        .unwrap();
    assert_eq!(rec.sak, [0x77; 16]);
    assert_eq!(rec.next_pn, 1000);
}

#[test]
fn test_tx_and_rx_lifecycles_are_independent() {
    let (mut orch, mut hw) = setup();
    orch.configure(&mut hw, &candidate(SCI_A, 0), true, Direction::Tx)
        .unwrap();
    orch.configure(&mut hw, &candidate(SCI_A, 0), true, Direction::Rx)
        .unwrap();

    orch.configure(&mut hw, &candidate(SCI_A, 0), false, Direction::Rx)
        .unwrap();

    assert_eq!(orch.sc_count(Direction::Tx), 1);
    assert_eq!(orch.sc_count(Direction::Rx), 0);
    assert!(hw.active_rows(Direction::Tx) > 0);
    assert_eq!(hw.active_rows(Direction::Rx), 0);
}

#[test]
fn test_init_sequence_clear_all_then_bypass_defaults() {
    let (mut orch, mut hw) = setup();

    for dir in [Direction::Tx, Direction::Rx] {
        orch.clear_all(&mut hw, dir).unwrap();
        orch.install_default_bypass(&mut hw, dir).unwrap();
    }

    for dir in [Direction::Tx, Direction::Rx] {
        // Only the two bypass defaults are live.
        assert_eq!(hw.active_rows(dir), 2);
        assert_eq!(orch.sc_count(dir), 0);
    }
}

#[test]
fn test_stats_track_lifecycle() {
    let (mut orch, mut hw) = setup();
    orch.configure(&mut hw, &candidate(SCI_A, 0), true, Direction::Tx)
        .unwrap();
    orch.configure(&mut hw, &candidate(SCI_A, 1), true, Direction::Tx)
        .unwrap();
    orch.configure(&mut hw, &candidate(SCI_A, 0), false, Direction::Tx)
        .unwrap();
    orch.configure(&mut hw, &candidate(SCI_A, 1), false, Direction::Tx)
        .unwrap();

    let stats = orch.stats();
    assert_eq!(stats.scs_created, 1);
    assert_eq!(stats.scs_retired, 1);
    assert_eq!(stats.sas_installed, 2);
    assert_eq!(stats.sas_removed, 2);
    assert_eq!(stats.rollbacks, 0);
}
