use mines_backend::payout::{get_payout_entry, get_payout_row, max_multiplier, max_safe_reveals};
use mines_backend::{PayoutTable, RoundPhase, GRID_SIZE, MAX_MINES, MIN_MINES};
use proptest::prelude::*;

const TOLERANCE: f64 = 0.01;

fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "{}: got {}, expected about {}",
        what,
        actual,
        expected
    );
}

// ============================================================================
// CURVE SHAPE
// ============================================================================

#[test]
fn test_multiplier_strictly_increasing() {
    let table = PayoutTable::standard();
    for mines in MIN_MINES..=MAX_MINES {
        let row = get_payout_row(&table, mines).unwrap();
        for pair in row.windows(2) {
            assert!(
                pair[1].multiplier > pair[0].multiplier,
                "mines {}: {} !> {}",
                mines,
                pair[1].multiplier,
                pair[0].multiplier
            );
        }
    }
}

#[test]
fn test_probability_strictly_decreasing_and_positive() {
    let table = PayoutTable::standard();
    for mines in MIN_MINES..=MAX_MINES {
        let row = get_payout_row(&table, mines).unwrap();
        for pair in row.windows(2) {
            assert!(pair[1].probability < pair[0].probability, "mines {}", mines);
        }
        assert!(row.last().unwrap().probability > 0.0, "mines {}", mines);
    }
}

#[test]
fn test_house_edge_band() {
    let table = PayoutTable::standard();
    for mines in MIN_MINES..=MAX_MINES {
        for entry in get_payout_row(&table, mines).unwrap() {
            let rtp = entry.multiplier * entry.probability;
            assert!(rtp <= 1.0 + 1e-9, "mines {}: rtp {}", mines, rtp);
            assert!(rtp >= 0.9, "mines {}: rtp {}", mines, rtp);
        }
    }
}

#[test]
fn test_more_mines_grow_faster() {
    let table = PayoutTable::standard();
    for mines in MIN_MINES..MAX_MINES {
        let fewer = get_payout_row(&table, mines).unwrap();
        let more = get_payout_row(&table, mines + 1).unwrap();
        // `more` is one entry shorter
        for revealed in 1..more.len() {
            assert!(
                more[revealed].multiplier > fewer[revealed].multiplier,
                "mines {} vs {} at {} reveals",
                mines + 1,
                mines,
                revealed
            );
            assert!(
                more[revealed].probability < fewer[revealed].probability,
                "mines {} vs {} at {} reveals: probability",
                mines + 1,
                mines,
                revealed
            );
        }
    }
}

// ============================================================================
// BOUNDARIES
// ============================================================================

#[test]
fn test_zero_reveals_is_neutral() {
    let table = PayoutTable::standard();
    for mines in MIN_MINES..=MAX_MINES {
        let quote = get_payout_entry(&table, mines, 0).unwrap();
        assert_eq!(quote.entry.multiplier, 1.0);
        assert_eq!(quote.entry.probability, 1.0);
        assert_eq!(quote.phase, RoundPhase::Fresh);
    }
}

#[test]
fn test_full_clear_pays_row_maximum() {
    let table = PayoutTable::standard();
    for mines in MIN_MINES..=MAX_MINES {
        let full = GRID_SIZE - mines;
        let quote = get_payout_entry(&table, mines, full).unwrap();
        assert_eq!(quote.phase, RoundPhase::FullClear);
        assert!(!quote.clamped);

        let row_max = get_payout_row(&table, mines)
            .unwrap()
            .iter()
            .map(|e| e.multiplier)
            .fold(f64::MIN, f64::max);
        assert_eq!(quote.entry.multiplier, row_max);
        assert_eq!(max_multiplier(&table, mines).unwrap(), row_max);
        assert_eq!(max_safe_reveals(&table, mines).unwrap(), full);
    }
}

#[test]
fn test_in_progress_phase() {
    let table = PayoutTable::standard();
    let quote = get_payout_entry(&table, 5, 4).unwrap();
    assert_eq!(quote.phase, RoundPhase::InProgress);
    assert_eq!(quote.mine_count, 5);
    assert_eq!(quote.revealed_safe_count, 4);
}

#[test]
fn test_mine_count_outside_board_is_an_error() {
    let table = PayoutTable::standard();
    assert!(get_payout_entry(&table, 0, 1).is_err());
    assert!(get_payout_entry(&table, 25, 0).is_err());
    assert!(get_payout_entry(&table, u8::MAX, 0).is_err());
}

// ============================================================================
// KNOWN VALUES
// ============================================================================

#[test]
fn test_one_mine_first_reveal() {
    let quote = get_payout_entry(&PayoutTable::standard(), 1, 1).unwrap();
    assert_close(quote.entry.multiplier, 1.03, "multiplier");
    assert_close(quote.entry.probability, 0.96, "probability");
}

#[test]
fn test_three_mines_five_reveals() {
    let quote = get_payout_entry(&PayoutTable::standard(), 3, 5).unwrap();
    assert_close(quote.entry.multiplier, 2.00, "multiplier");
    assert_close(quote.entry.probability, 0.50, "probability");
}

#[test]
fn test_twenty_four_mines_single_safe_tile() {
    let quote = get_payout_entry(&PayoutTable::standard(), 24, 1).unwrap();
    assert_close(quote.entry.multiplier, 24.75, "multiplier");
    assert_close(quote.entry.probability, 0.04, "probability");
    assert_eq!(quote.phase, RoundPhase::FullClear);
}

#[test]
fn test_matches_product_form() {
    // 5 mines, 3 reveals: (25/20) * (24/19) * (23/18) * 0.99
    let expected = (25.0 / 20.0) * (24.0 / 19.0) * (23.0 / 18.0) * 0.99;
    let quote = get_payout_entry(&PayoutTable::standard(), 5, 3).unwrap();
    assert!((quote.entry.multiplier - expected).abs() < 1e-9);
}

#[test]
fn test_lookup_is_idempotent() {
    let table = PayoutTable::standard();
    let first = get_payout_entry(&table, 7, 6).unwrap();
    let second = get_payout_entry(&table, 7, 6).unwrap();
    assert_eq!(first, second);
    // A freshly derived table agrees too
    assert_eq!(get_payout_entry(&PayoutTable::standard(), 7, 6).unwrap(), first);
}

// ============================================================================
// PROPERTY TESTS
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_valid_lookups_never_fail(mines in 1u8..=24, revealed in any::<u8>()) {
        let table = PayoutTable::standard();
        let quote = get_payout_entry(&table, mines, revealed).unwrap();
        let max = GRID_SIZE - mines;

        prop_assert_eq!(quote.clamped, revealed > max);
        prop_assert!(quote.revealed_safe_count <= max);
        prop_assert!(quote.entry.multiplier >= 1.0);
        prop_assert!(quote.entry.rtp() <= 1.0 + 1e-9);
    }

    #[test]
    fn prop_scaled_multiplier_tracks_float(mines in 1u8..=24, revealed in 0u8..=24) {
        let table = PayoutTable::standard();
        let entry = get_payout_entry(&table, mines, revealed).unwrap().entry;
        let from_scaled = entry.multiplier_scaled as f64 / 1_000_000.0;

        // Floored to six decimals, with slack for f64 at large multipliers
        prop_assert!(from_scaled <= entry.multiplier + 1e-9);
        prop_assert!(entry.multiplier - from_scaled < 2e-6);
    }

    #[test]
    fn prop_small_boards_hold_invariants(board in 2u8..=25) {
        let table = PayoutTable::new(board, 1.0).unwrap();
        let report = mines_backend::payout::audit(&table);
        prop_assert!(report.is_fair(), "board {}: {:?}", board, report.violations);
        prop_assert!((report.min_rtp - 1.0).abs() < 1e-9);
    }
}
