//! Report rendering — turns segment totals into the six-column table written
//! to the sheet, with CTR derived per row.

use std::collections::HashMap;

use adsheet_core::types::CellValue;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::aggregator::SegmentAccumulator;

pub const COLUMN_COUNT: usize = 6;

/// Labels after the segment-name column, in output order.
pub const METRIC_LABELS: [&str; COLUMN_COUNT - 1] =
    ["Num Ads", "Impressions", "Clicks", "CTR (%)", "Cost"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub key: String,
    pub num_ads: u64,
    pub total_impressions: u64,
    pub total_clicks: u64,
    pub ctr_percent: Decimal,
    pub total_cost: Decimal,
}

impl ReportRow {
    pub fn from_accumulator(key: String, acc: &SegmentAccumulator) -> Self {
        Self {
            key,
            num_ads: acc.num_ads,
            total_impressions: acc.total_impressions,
            total_clicks: acc.total_clicks,
            ctr_percent: ctr_percent(acc.total_clicks, acc.total_impressions),
            total_cost: acc.total_cost,
        }
    }

    fn to_cells(&self) -> Vec<CellValue> {
        vec![
            CellValue::Text(self.key.clone()),
            self.num_ads.into(),
            self.total_impressions.into(),
            self.total_clicks.into(),
            self.ctr_percent.into(),
            self.total_cost.into(),
        ]
    }
}

/// Click-through rate in percent, rounded half away from zero to 2 places.
/// Zero impressions give 0.00 whatever the click count.
pub fn ctr_percent(clicks: u64, impressions: u64) -> Decimal {
    let mut ctr = if impressions == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(clicks) * Decimal::ONE_HUNDRED / Decimal::from(impressions))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    };
    ctr.rescale(2);
    ctr
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTable {
    pub columns: Vec<String>,
    pub rows: Vec<ReportRow>,
}

impl ReportTable {
    /// One row per segment, ordered by segment key.
    pub fn render(segment_label: &str, segments: &HashMap<String, SegmentAccumulator>) -> Self {
        let mut rows: Vec<ReportRow> = segments
            .iter()
            .map(|(key, acc)| ReportRow::from_accumulator(key.clone(), acc))
            .collect();
        rows.sort_by(|a, b| a.key.cmp(&b.key));

        let columns = std::iter::once(segment_label)
            .chain(METRIC_LABELS)
            .map(String::from)
            .collect();

        Self { columns, rows }
    }

    pub fn row(&self, key: &str) -> Option<&ReportRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    /// Header plus data rows as a rectangular 6-wide grid.
    pub fn to_cells(&self) -> Vec<Vec<CellValue>> {
        let header = self
            .columns
            .iter()
            .map(|c| CellValue::Text(c.clone()))
            .collect();
        std::iter::once(header)
            .chain(self.rows.iter().map(ReportRow::to_cells))
            .collect()
    }

    pub fn to_csv(&self) -> String {
        let mut csv = self
            .columns
            .iter()
            .map(|c| csv_field(c))
            .collect::<Vec<_>>()
            .join(",");
        csv.push('\n');
        for row in &self.rows {
            let cells = [
                csv_field(&row.key),
                row.num_ads.to_string(),
                row.total_impressions.to_string(),
                row.total_clicks.to_string(),
                row.ctr_percent.to_string(),
                row.total_cost.to_string(),
            ];
            csv.push_str(&cells.join(","));
            csv.push('\n');
        }
        csv
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
