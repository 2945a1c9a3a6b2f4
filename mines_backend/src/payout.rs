use crate::types::{
    PayoutAudit, PayoutEntry, PayoutError, PayoutQuote, RoundPhase, GRID_SIZE, HOUSE_EDGE,
    MAX_BOARD_SIZE, MIN_BOARD_SIZE, MIN_MINES, MIN_RTP_BOUND, MULTIPLIER_SCALE,
};

// Float slack when checking multiplier * probability against the edge band
const RTP_EPSILON: f64 = 1e-9;

// =============================================================================
// PAYOUT TABLE
// =============================================================================

/// Immutable (mines, revealed) -> payout table, derived analytically.
///
/// For a board of `N` tiles with `m` mines, the chance of surviving `k`
/// reveals under uniform mine placement is
///
/// ```text
/// P(k | m) = C(N - m, k) / C(N, k)
/// ```
///
/// and the multiplier is `house_edge / P(k | m)`. Zero reveals is the neutral
/// entry (1.0x, probability 1.0).
#[derive(Clone, Debug, PartialEq)]
pub struct PayoutTable {
    board_size: u8,
    house_edge: f64,
    // rows[mines - 1][revealed]
    rows: Vec<Vec<PayoutEntry>>,
}

impl PayoutTable {
    /// Build a table for an arbitrary board. Smaller boards are mostly useful
    /// in tests.
    pub fn new(board_size: u8, house_edge: f64) -> Result<Self, PayoutError> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&board_size) {
            return Err(PayoutError::InvalidConfig {
                reason: format!(
                    "board size {} outside {}..={}",
                    board_size, MIN_BOARD_SIZE, MAX_BOARD_SIZE
                ),
            });
        }
        if !house_edge.is_finite() || house_edge < MIN_RTP_BOUND || house_edge > 1.0 {
            return Err(PayoutError::InvalidConfig {
                reason: format!(
                    "house edge factor {} outside {}..=1.0",
                    house_edge, MIN_RTP_BOUND
                ),
            });
        }

        // Cheapest cell on the board: one mine, one reveal. It must still pay at least 1x.
        let n = board_size as f64;
        if house_edge * n / (n - 1.0) < 1.0 {
            return Err(PayoutError::InvalidConfig {
                reason: format!(
                    "house edge factor {} pays below 1x on the first reveal of a {}-tile board",
                    house_edge, board_size
                ),
            });
        }

        Ok(Self::derive(board_size, house_edge))
    }

    /// The production 5x5 board with a 1% house edge.
    pub fn standard() -> Self {
        Self::derive(GRID_SIZE, HOUSE_EDGE)
    }

    fn derive(board_size: u8, house_edge: f64) -> Self {
        let rows = (MIN_MINES..board_size)
            .map(|mines| {
                (0..=board_size - mines)
                    .map(|revealed| derive_entry(board_size, mines, revealed, house_edge))
                    .collect::<Vec<_>>()
            })
            .collect();

        Self { board_size, house_edge, rows }
    }

    pub fn board_size(&self) -> u8 {
        self.board_size
    }

    pub fn house_edge(&self) -> f64 {
        self.house_edge
    }

    pub fn max_mines(&self) -> u8 {
        self.board_size - 1
    }

    /// Number of (mines, revealed) cells in the table.
    pub fn cell_count(&self) -> u32 {
        self.rows.iter().map(|row| row.len() as u32).sum()
    }

    fn row(&self, mine_count: u8) -> Result<&[PayoutEntry], PayoutError> {
        if mine_count < MIN_MINES || mine_count > self.max_mines() {
            return Err(PayoutError::InvalidMineCount {
                mine_count,
                max: self.max_mines(),
            });
        }
        Ok(&self.rows[(mine_count - MIN_MINES) as usize])
    }
}

impl Default for PayoutTable {
    fn default() -> Self {
        Self::standard()
    }
}

// =============================================================================
// DERIVATION
// =============================================================================

/// Exact binomial coefficient. Every intermediate `C(n, i)` stays well inside
/// u64 for n <= MAX_BOARD_SIZE; callers must not go past that.
pub(crate) fn binomial(n: u8, k: u8) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k) as u64;
    let n = n as u64;
    (0..k).fold(1u64, |acc, i| acc * (n - i) / (i + 1))
}

// (safe orderings, all orderings) of the first `revealed` tiles
fn survival_counts(board_size: u8, mine_count: u8, revealed: u8) -> (u64, u64) {
    let safe_tiles = board_size - mine_count;
    (binomial(safe_tiles, revealed), binomial(board_size, revealed))
}

/// Probability of revealing `revealed` safe tiles in a row. `None` when the
/// board is larger than a table supports or the counts don't fit on it.
pub fn survival_probability(board_size: u8, mine_count: u8, revealed: u8) -> Option<f64> {
    if board_size > MAX_BOARD_SIZE || mine_count > board_size || revealed > board_size {
        return None;
    }
    let (favourable, total) = survival_counts(board_size, mine_count, revealed);
    Some(favourable as f64 / total as f64)
}

fn derive_entry(board_size: u8, mine_count: u8, revealed: u8, house_edge: f64) -> PayoutEntry {
    if revealed == 0 {
        return PayoutEntry::NEUTRAL;
    }

    let (favourable, total) = survival_counts(board_size, mine_count, revealed);
    let probability = favourable as f64 / total as f64;
    // From the counts, not 1 / probability, to keep e.g. 0.99 * 25 exact
    let multiplier = house_edge * total as f64 / favourable as f64;

    PayoutEntry {
        multiplier,
        probability,
        multiplier_scaled: (multiplier * MULTIPLIER_SCALE as f64) as u64,
    }
}

// =============================================================================
// LOOKUPS
// =============================================================================

/// Look up the payout for a round with `mine_count` mines and
/// `revealed_safe_count` safe tiles uncovered.
///
/// Revealing every safe tile is a full clear and carries the row's maximum
/// multiplier. Counts past the full clear clamp to it. An out-of-range mine
/// count is a caller bug and is rejected.
pub fn get_payout_entry(
    table: &PayoutTable,
    mine_count: u8,
    revealed_safe_count: u8,
) -> Result<PayoutQuote, PayoutError> {
    let row = table.row(mine_count)?;
    let max_reveals = max_safe_reveals(table, mine_count)?;

    let clamped = revealed_safe_count > max_reveals;
    let revealed = revealed_safe_count.min(max_reveals);

    let phase = if revealed == 0 {
        RoundPhase::Fresh
    } else if revealed == max_reveals {
        RoundPhase::FullClear
    } else {
        RoundPhase::InProgress
    };

    Ok(PayoutQuote {
        mine_count,
        revealed_safe_count: revealed,
        entry: row[revealed as usize],
        phase,
        clamped,
    })
}

/// Whole payout curve for one mine count, indexed by revealed tiles.
pub fn get_payout_row(table: &PayoutTable, mine_count: u8) -> Result<&[PayoutEntry], PayoutError> {
    table.row(mine_count)
}

pub fn max_safe_reveals(table: &PayoutTable, mine_count: u8) -> Result<u8, PayoutError> {
    table.row(mine_count)?;
    Ok(table.board_size - mine_count)
}

/// Full-clear multiplier for a mine count.
pub fn max_multiplier(table: &PayoutTable, mine_count: u8) -> Result<f64, PayoutError> {
    let row = table.row(mine_count)?;
    Ok(row.last().map_or(1.0, |entry| entry.multiplier))
}

// =============================================================================
// PAYOUT MATH
// =============================================================================

/// Payout for a wager at a given table entry, in the wager's base units.
/// Integer math over the scaled multiplier avoids f64 rounding on large bets.
pub fn calculate_payout(bet_amount: u64, entry: &PayoutEntry) -> Result<u64, String> {
    // u64 * u64 always fits in u128
    let numerator = (bet_amount as u128) * (entry.multiplier_scaled as u128);

    let payout = numerator / (MULTIPLIER_SCALE as u128);

    if payout > u64::MAX as u128 {
        return Err("Payout exceeds u64 limit".to_string());
    }

    Ok(payout as u64)
}

/// What a player would receive by cashing out now.
pub fn potential_payout(
    table: &PayoutTable,
    bet_amount: u64,
    mine_count: u8,
    revealed_safe_count: u8,
) -> Result<u64, String> {
    let quote =
        get_payout_entry(table, mine_count, revealed_safe_count).map_err(|e| e.to_string())?;
    calculate_payout(bet_amount, &quote.entry)
}

// =============================================================================
// AUDIT
// =============================================================================

/// Re-check every fairness invariant of the table and report the RTP band.
pub fn audit(table: &PayoutTable) -> PayoutAudit {
    let mut violations = Vec::new();
    let mut min_rtp = f64::INFINITY;
    let mut max_rtp = f64::NEG_INFINITY;

    for (idx, row) in table.rows.iter().enumerate() {
        let mines = idx as u8 + MIN_MINES;

        if row.first() != Some(&PayoutEntry::NEUTRAL) {
            violations.push(format!("mines {}: zero reveals is not the neutral entry", mines));
        }

        for (revealed, entry) in row.iter().enumerate() {
            let rtp = entry.rtp();
            min_rtp = min_rtp.min(rtp);
            max_rtp = max_rtp.max(rtp);

            if rtp > 1.0 + RTP_EPSILON || rtp < MIN_RTP_BOUND {
                violations.push(format!(
                    "mines {} revealed {}: rtp {:.6} outside {}..=1.0",
                    mines, revealed, rtp, MIN_RTP_BOUND
                ));
            }
            if entry.multiplier < 1.0 {
                violations.push(format!(
                    "mines {} revealed {}: multiplier {:.6} below 1x",
                    mines, revealed, entry.multiplier
                ));
            }
            if entry.probability <= 0.0 {
                violations.push(format!(
                    "mines {} revealed {}: probability is not positive",
                    mines, revealed
                ));
            }
        }

        for (revealed, pair) in row.windows(2).enumerate() {
            if pair[1].multiplier <= pair[0].multiplier {
                violations.push(format!(
                    "mines {}: multiplier does not increase at reveal {}",
                    mines,
                    revealed + 1
                ));
            }
            if pair[1].probability >= pair[0].probability {
                violations.push(format!(
                    "mines {}: probability does not decrease at reveal {}",
                    mines,
                    revealed + 1
                ));
            }
        }

        if idx > 0 {
            let fewer = &table.rows[idx - 1];
            // Skip zero reveals, which is 1.0x for every mine count
            for revealed in 1..row.len() {
                if row[revealed].multiplier <= fewer[revealed].multiplier {
                    violations.push(format!(
                        "mines {} revealed {}: multiplier not above mines {}",
                        mines,
                        revealed,
                        mines - 1
                    ));
                }
                if row[revealed].probability >= fewer[revealed].probability {
                    violations.push(format!(
                        "mines {} revealed {}: probability not below mines {}",
                        mines,
                        revealed,
                        mines - 1
                    ));
                }
            }
        }
    }

    PayoutAudit {
        board_size: table.board_size,
        house_edge: table.house_edge,
        cells: table.cell_count(),
        min_rtp,
        max_rtp,
        violations,
    }
}

// ============ UNIT TESTS ============
