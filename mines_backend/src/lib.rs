//! Mines Payout Backend
//!
//! **Design Philosophy:**
//! Payouts for the 5x5 Mines game come from an analytically derived table,
//! not hand-authored numbers. Each (mines, revealed) cell pays
//! `0.99 / P(survive)`, so every cash-out point carries the same 1% house edge.
//!
//! **Transparency & Fairness:**
//! - The full table and its audit are exposed as queries
//! - Out-of-range mine counts are rejected, never defaulted
//! - A full clear is a valid win at the row's maximum multiplier
//!
//! Round state, balances and mine placement live in other canisters; this one
//! only answers "what does this round pay right now".

use ic_cdk::{init, post_upgrade, query};

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod legacy;
pub mod payout;
pub mod types;

pub use payout::PayoutTable;
pub use types::*;

// ============================================================================
// PAYOUT TABLE
// ============================================================================

thread_local! {
    // Built on first access, never mutated
    static PAYOUT_TABLE: PayoutTable = PayoutTable::standard();
}

fn with_table<R>(f: impl FnOnce(&PayoutTable) -> R) -> R {
    PAYOUT_TABLE.with(f)
}

fn log_table_audit(stage: &str) {
    let report = with_table(payout::audit);
    ic_cdk::println!(
        "{}: mines payout table ready ({} cells, {} tiles, house edge factor {})",
        stage,
        report.cells,
        report.board_size,
        report.house_edge
    );
    if !report.is_fair() {
        for violation in &report.violations {
            ic_cdk::println!("CRITICAL: payout table violation: {}", violation);
        }
    }
}

// ============================================================================
// LIFECYCLE HOOKS
// ============================================================================

#[init]
fn init() {
    log_table_audit("Init");
}

#[post_upgrade]
fn post_upgrade() {
    // Nothing persisted; the table is re-derived
    log_table_audit("Post-upgrade");
}

// ============================================================================
// QUERIES
// ============================================================================

#[query]
fn get_payout_entry(mine_count: u8, revealed_safe_count: u8) -> Result<PayoutQuote, String> {
    with_table(|table| payout::get_payout_entry(table, mine_count, revealed_safe_count))
        .map_err(|e| e.to_string())
}

// Payout curve for frontend display, index = revealed tiles
#[query]
fn get_payout_row(mine_count: u8) -> Result<Vec<PayoutEntry>, String> {
    with_table(|table| {
        payout::get_payout_row(table, mine_count)
            .map(|row| row.to_vec())
            .map_err(|e| e.to_string())
    })
}

#[query]
fn get_max_multiplier(mine_count: u8) -> Result<f64, String> {
    with_table(|table| payout::max_multiplier(table, mine_count)).map_err(|e| e.to_string())
}

#[query]
fn get_potential_payout(
    bet_amount: u64,
    mine_count: u8,
    revealed_safe_count: u8,
) -> Result<u64, String> {
    with_table(|table| {
        payout::potential_payout(table, bet_amount, mine_count, revealed_safe_count)
    })
}

#[query]
fn audit_payout_table() -> PayoutAudit {
    with_table(payout::audit)
}

// Diff a historical hand-authored table against the derived one
#[query]
fn compare_legacy_table(json: String, tolerance: f64) -> Result<Vec<LegacyDiscrepancy>, String> {
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err("Tolerance must be a non-negative finite number".to_string());
    }
    let legacy_table = legacy::parse_legacy_table(&json)?;
    Ok(with_table(|table| {
        legacy::compare_with_legacy(table, &legacy_table, tolerance)
    }))
}

#[query]
fn greet(name: String) -> String {
    format!("Welcome to OpenHouse Mines, {}! Pick your mines, cash out any time.", name)
}

ic_cdk::export_candid!();
