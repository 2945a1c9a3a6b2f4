use candid::{CandidType, Deserialize};
use serde::Serialize;
use std::fmt;

// =============================================================================
// CONSTANTS
// =============================================================================

pub const GRID_SIZE: u8 = 25; // 5x5
pub const MIN_MINES: u8 = 1;
pub const MAX_MINES: u8 = GRID_SIZE - 1; // At least one safe tile
pub const HOUSE_EDGE: f64 = 0.99; // 1% house edge
pub const MULTIPLIER_SCALE: u64 = 1_000_000; // 6 decimal precision for multiplier
pub const MIN_RTP_BOUND: f64 = 0.9; // Audit floor for multiplier * probability

// Largest board whose binomials fit comfortably in u64 (C(25,12) = 5_200_300)
pub const MAX_BOARD_SIZE: u8 = 25;
pub const MIN_BOARD_SIZE: u8 = 2;

// =============================================================================
// PAYOUT TYPES
// =============================================================================

/// One cell of the payout table.
#[derive(CandidType, Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct PayoutEntry {
    pub multiplier: f64,
    pub probability: f64,
    /// `multiplier * MULTIPLIER_SCALE`, floored. Used for payout math.
    pub multiplier_scaled: u64,
}

impl PayoutEntry {
    /// Entry for a round with nothing revealed yet.
    pub const NEUTRAL: PayoutEntry = PayoutEntry {
        multiplier: 1.0,
        probability: 1.0,
        multiplier_scaled: MULTIPLIER_SCALE,
    };

    /// Return to player at this cell.
    pub fn rtp(&self) -> f64 {
        self.multiplier * self.probability
    }
}

/// Where a round sits relative to the payout curve.
#[derive(CandidType, Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundPhase {
    Fresh,      // Nothing revealed, no payout yet
    InProgress, // Some safe tiles revealed, more remain
    FullClear,  // Every safe tile revealed
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct PayoutQuote {
    pub mine_count: u8,
    pub revealed_safe_count: u8,
    pub entry: PayoutEntry,
    pub phase: RoundPhase,
    // Set when the caller asked for more reveals than the board allows
    pub clamped: bool,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct PayoutAudit {
    pub board_size: u8,
    pub house_edge: f64,
    pub cells: u32,
    pub min_rtp: f64,
    pub max_rtp: f64,
    pub violations: Vec<String>,
}

impl PayoutAudit {
    pub fn is_fair(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A legacy table cell that disagrees with the derived table.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct LegacyDiscrepancy {
    pub mine_count: u8,
    pub revealed_safe_count: u8,
    pub legacy_multiplier: f64,
    pub derived_multiplier: f64,
    pub legacy_probability: f64,
    pub derived_probability: f64,
    /// Legacy key has no counterpart in the derived domain.
    pub out_of_domain: bool,
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq)]
pub enum PayoutError {
    InvalidMineCount { mine_count: u8, max: u8 },
    InvalidConfig { reason: String },
}

impl fmt::Display for PayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayoutError::InvalidMineCount { mine_count, max } => write!(
                f,
                "Invalid mine count {}: must be between {} and {}",
                mine_count, MIN_MINES, max
            ),
            PayoutError::InvalidConfig { reason } => {
                write!(f, "Invalid payout table config: {}", reason)
            }
        }
    }
}

impl std::error::Error for PayoutError {}
