//! Bid override table — parsed from the override sheet, keyed by keyword identity.
//!
//! Sheet layout, one override per row after a header row:
//!
//! | Campaign | Keyword | Match type | Adjustment | Value |
//! |----------|---------|------------|------------|-------|
//! | CampX    | running shoes | EXACT | FIXED    | 2.50  |
//! | CampY    | hats          | PHRASE | RELATIVE | 0.20 |
//!
//! The first row with a blank campaign cell ends the table.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use adsheet_core::config::UnknownAdjustmentPolicy;
use adsheet_core::types::{CellValue, KeywordIdentity, MatchType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

const COL_CAMPAIGN: usize = 0;
const COL_KEYWORD: usize = 1;
const COL_MATCH_TYPE: usize = 2;
const COL_ADJUSTMENT: usize = 3;
const COL_VALUE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentType {
    /// Replace the bid with the value.
    Fixed,
    /// Scale the bid by `1 + value`.
    Relative,
}

impl AdjustmentType {
    /// New bid for `current`, or `None` when the result does not fit a `Decimal`.
    pub fn apply(&self, current: Decimal, value: Decimal) -> Option<Decimal> {
        match self {
            Self::Fixed => Some(value),
            Self::Relative => Decimal::ONE
                .checked_add(value)
                .and_then(|factor| current.checked_mul(factor)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "FIXED",
            Self::Relative => "RELATIVE",
        }
    }
}

impl fmt::Display for AdjustmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdjustmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "FIXED" => Ok(Self::Fixed),
            "RELATIVE" => Ok(Self::Relative),
            other => Err(format!("unknown adjustment type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidOverride {
    pub identity: KeywordIdentity,
    pub adjustment: AdjustmentType,
    pub value: Decimal,
    /// 1-based sheet row the override came from.
    pub row: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRow {
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct BidOverrideTable {
    overrides: HashMap<KeywordIdentity, BidOverride>,
    rejected: Vec<RejectedRow>,
    duplicates: usize,
    rows_read: usize,
}

impl BidOverrideTable {
    pub fn get(&self, identity: &KeywordIdentity) -> Option<&BidOverride> {
        self.overrides.get(identity)
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BidOverride> {
        self.overrides.values()
    }

    pub fn rejected(&self) -> &[RejectedRow] {
        &self.rejected
    }

    /// Rows that replaced an earlier row with the same identity.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Data rows scanned before the end of the table, header excluded.
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    pub fn insert(&mut self, entry: BidOverride) {
        if let Some(previous) = self.overrides.insert(entry.identity.clone(), entry) {
            self.duplicates += 1;
            warn!(
                identity = %previous.identity,
                replaced_row = previous.row,
                "Duplicate bid override, later row wins"
            );
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OverrideTableBuilder {
    unknown_adjustment: UnknownAdjustmentPolicy,
}

impl OverrideTableBuilder {
    pub fn new(unknown_adjustment: UnknownAdjustmentPolicy) -> Self {
        Self { unknown_adjustment }
    }

    /// Build from the sheet's rows, header included.
    pub fn build(&self, rows: &[Vec<CellValue>]) -> BidOverrideTable {
        let mut table = BidOverrideTable::default();

        for (index, row) in rows.iter().enumerate().skip(1) {
            let sheet_row = index + 1;
            if cell(row, COL_CAMPAIGN).is_blank() {
                break;
            }
            table.rows_read += 1;

            match self.parse_row(row, sheet_row) {
                Ok(entry) => table.insert(entry),
                Err(reason) => {
                    warn!(row = sheet_row, reason = %reason, "Bid override row rejected");
                    metrics::counter!("bids.rows_rejected").increment(1);
                    table.rejected.push(RejectedRow {
                        row: sheet_row,
                        reason,
                    });
                }
            }
        }

        table
    }

    fn parse_row(&self, row: &[CellValue], sheet_row: usize) -> Result<BidOverride, String> {
        let campaign = cell(row, COL_CAMPAIGN).as_text();
        let text = cell(row, COL_KEYWORD).as_text();
        if text.trim().is_empty() {
            return Err("keyword text is empty".into());
        }
        let match_type: MatchType = cell(row, COL_MATCH_TYPE).as_text().parse()?;

        let tag = cell(row, COL_ADJUSTMENT).as_text();
        let adjustment = match (tag.parse::<AdjustmentType>(), self.unknown_adjustment) {
            (Ok(adjustment), _) => adjustment,
            (Err(_), UnknownAdjustmentPolicy::TreatAsRelative) => AdjustmentType::Relative,
            (Err(e), UnknownAdjustmentPolicy::Reject) => return Err(e),
        };

        let raw_value = cell(row, COL_VALUE);
        let value = raw_value
            .as_decimal()
            .ok_or_else(|| format!("adjustment value '{}' is not a number", raw_value.as_text()))?;
        match adjustment {
            AdjustmentType::Fixed if value.is_sign_negative() => {
                return Err(format!("fixed bid {value} is negative"));
            }
            AdjustmentType::Relative if value < Decimal::NEGATIVE_ONE => {
                return Err(format!("relative adjustment {value} would make the bid negative"));
            }
            _ => {}
        }

        Ok(BidOverride {
            identity: KeywordIdentity::new(campaign, text, match_type),
            adjustment,
            value,
            row: sheet_row,
        })
    }
}

fn cell(row: &[CellValue], col: usize) -> &CellValue {
    const EMPTY: &CellValue = &CellValue::Empty;
    row.get(col).unwrap_or(EMPTY)
}
