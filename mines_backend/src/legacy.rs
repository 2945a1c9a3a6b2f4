//! Cross-check of the derived payout table against a hand-authored one.
//!
//! Older frontends shipped a literal table shaped like
//! `{ "<mines>": { "<revealed>": { "multiplier": 1.03, "odds": 0.96 } } }`
//! with values rounded to two decimals. The derived table stays the source of
//! truth; this module only reports where the two disagree.

use crate::payout::{get_payout_entry, max_safe_reveals, PayoutTable};
use crate::types::LegacyDiscrepancy;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct LegacyCell {
    pub multiplier: f64,
    pub odds: f64,
}

/// mines -> revealed -> cell
pub type LegacyTable = BTreeMap<u8, BTreeMap<u8, LegacyCell>>;

pub fn parse_legacy_table(json: &str) -> Result<LegacyTable, String> {
    let raw: BTreeMap<String, BTreeMap<String, LegacyCell>> =
        serde_json::from_str(json).map_err(|e| format!("Invalid legacy table JSON: {}", e))?;

    let mut table = LegacyTable::new();
    for (mines_key, row) in raw {
        let mines = parse_key(&mines_key)?;
        let parsed_row = table.entry(mines).or_default();
        for (revealed_key, cell) in row {
            parsed_row.insert(parse_key(&revealed_key)?, cell);
        }
    }
    Ok(table)
}

fn parse_key(key: &str) -> Result<u8, String> {
    key.trim()
        .parse::<u8>()
        .map_err(|_| format!("Invalid legacy table key '{}'", key))
}

/// Every legacy cell whose multiplier or odds differ from the derived table by
/// more than `tolerance`, plus every legacy key the derived table has no cell for.
pub fn compare_with_legacy(
    table: &PayoutTable,
    legacy: &LegacyTable,
    tolerance: f64,
) -> Vec<LegacyDiscrepancy> {
    let mut discrepancies = Vec::new();

    for (&mines, row) in legacy {
        for (&revealed, cell) in row {
            let in_domain = max_safe_reveals(table, mines).is_ok_and(|max| revealed <= max);

            // Out-of-domain keys would clamp or error in a lookup, so report them as-is
            let quote = match get_payout_entry(table, mines, revealed) {
                Ok(quote) if in_domain => quote,
                _ => {
                    discrepancies.push(LegacyDiscrepancy {
                        mine_count: mines,
                        revealed_safe_count: revealed,
                        legacy_multiplier: cell.multiplier,
                        derived_multiplier: 0.0,
                        legacy_probability: cell.odds,
                        derived_probability: 0.0,
                        out_of_domain: true,
                    });
                    continue;
                }
            };

            let multiplier_off = (quote.entry.multiplier - cell.multiplier).abs() > tolerance;
            let probability_off = (quote.entry.probability - cell.odds).abs() > tolerance;

            if multiplier_off || probability_off {
                discrepancies.push(LegacyDiscrepancy {
                    mine_count: mines,
                    revealed_safe_count: revealed,
                    legacy_multiplier: cell.multiplier,
                    derived_multiplier: quote.entry.multiplier,
                    legacy_probability: cell.odds,
                    derived_probability: quote.entry.probability,
                    out_of_domain: false,
                });
            }
        }
    }

    discrepancies
}
