//! Applies a bid override table to the account's enabled keywords.

use adsheet_core::ports::KeywordStore;
use adsheet_core::types::{KeywordIdentity, KeywordStatus};
use adsheet_core::{AdsheetError, AdsheetResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::override_table::{AdjustmentType, BidOverrideTable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidChange {
    pub keyword_id: String,
    pub identity: KeywordIdentity,
    pub adjustment: AdjustmentType,
    pub previous: Decimal,
    pub updated: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub examined: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub dry_run: bool,
    pub changes: Vec<BidChange>,
}

impl ReconcileSummary {
    pub fn change_for(&self, keyword_id: &str) -> Option<&BidChange> {
        self.changes.iter().find(|c| c.keyword_id == keyword_id)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BidReconciler {
    dry_run: bool,
}

impl BidReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute changes without writing any bid.
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }

    /// Every matched keyword is written as soon as its new bid is known. If a
    /// write fails, or a new bid overflows, the error is returned and earlier
    /// writes stay in place.
    pub fn reconcile<K>(&self, store: &mut K, table: &BidOverrideTable) -> AdsheetResult<ReconcileSummary>
    where
        K: KeywordStore + ?Sized,
    {
        let keywords = store.keywords(KeywordStatus::Enabled)?;
        let mut summary = ReconcileSummary {
            dry_run: self.dry_run,
            ..ReconcileSummary::default()
        };

        for keyword in keywords {
            summary.examined += 1;
            metrics::counter!("bids.keywords_examined").increment(1);

            let identity = keyword.identity();
            let Some(entry) = table.get(&identity) else {
                summary.unmatched += 1;
                continue;
            };
            summary.matched += 1;

            let updated = entry
                .adjustment
                .apply(keyword.max_cpc, entry.value)
                .ok_or_else(|| {
                    AdsheetError::Override(format!(
                        "{} {} on bid {} for '{}' (sheet row {}) overflows",
                        entry.adjustment, entry.value, keyword.max_cpc, identity, entry.row
                    ))
                })?;
            debug!(
                keyword_id = %keyword.id,
                identity = %identity,
                adjustment = %entry.adjustment,
                previous = %keyword.max_cpc,
                updated = %updated,
                dry_run = self.dry_run,
                "Applying bid override"
            );
            if !self.dry_run {
                store.set_max_cpc(&keyword.id, updated)?;
                metrics::counter!("bids.overrides_applied", "adjustment" => entry.adjustment.as_str())
                    .increment(1);
            }

            summary.changes.push(BidChange {
                keyword_id: keyword.id,
                identity,
                adjustment: entry.adjustment,
                previous: keyword.max_cpc,
                updated,
            });
        }

        info!(
            examined = summary.examined,
            matched = summary.matched,
            unmatched = summary.unmatched,
            dry_run = self.dry_run,
            "Bid reconciliation finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::override_table::OverrideTableBuilder;
    use adsheet_core::types::{CellValue, Keyword, MatchType};
    use rust_decimal_macros::dec;

    #[derive(Default)]
    struct VecStore {
        keywords: Vec<Keyword>,
        writes: usize,
        fail_on: Option<String>,
    }

    impl KeywordStore for VecStore {
        fn keywords(&self, status: KeywordStatus) -> AdsheetResult<Vec<Keyword>> {
            Ok(self
                .keywords
                .iter()
                .filter(|k| k.status == status)
                .cloned()
                .collect())
        }

        fn set_max_cpc(&mut self, keyword_id: &str, bid: Decimal) -> AdsheetResult<()> {
            if self.fail_on.as_deref() == Some(keyword_id) {
                return Err(AdsheetError::Account(format!("keyword {keyword_id} is locked")));
            }
            let keyword = self
                .keywords
                .iter_mut()
                .find(|k| k.id == keyword_id)
                .ok_or_else(|| AdsheetError::Account(format!("no keyword {keyword_id}")))?;
            keyword.max_cpc = bid;
            self.writes += 1;
            Ok(())
        }
    }

    impl VecStore {
        fn bid(&self, id: &str) -> Decimal {
            self.keywords.iter().find(|k| k.id == id).unwrap().max_cpc
        }
    }

    fn keyword(
        id: &str,
        campaign: &str,
        text: &str,
        match_type: MatchType,
        bid: Decimal,
        status: KeywordStatus,
    ) -> Keyword {
        Keyword {
            id: id.into(),
            campaign_name: campaign.into(),
            text: text.into(),
            match_type,
            max_cpc: bid,
            status,
        }
    }

    fn table(rows: &[[&str; 5]]) -> BidOverrideTable {
        let mut sheet = vec![vec![CellValue::from("header")]];
        sheet.extend(
            rows.iter()
                .map(|r| r.iter().map(|f| CellValue::from(*f)).collect::<Vec<_>>()),
        );
        OverrideTableBuilder::default().build(&sheet)
    }

    fn store() -> VecStore {
        VecStore {
            keywords: vec![
                keyword("1", "CampX", "running shoes", MatchType::Exact, dec!(1.00), KeywordStatus::Enabled),
                keyword("2", "CampY", "hats", MatchType::Phrase, dec!(1.00), KeywordStatus::Enabled),
                keyword("3", "CampY", "hats", MatchType::Broad, dec!(0.80), KeywordStatus::Enabled),
                keyword("4", "CampX", "running shoes", MatchType::Exact, dec!(1.00), KeywordStatus::Paused),
            ],
            ..VecStore::default()
        }
    }

    fn overrides() -> BidOverrideTable {
        table(&[
            ["CampX", "running shoes", "EXACT", "FIXED", "2.50"],
            ["CampY", "hats", "PHRASE", "RELATIVE", "0.20"],
        ])
    }

    #[test]
    fn test_fixed_and_relative() {
        let mut store = store();
        let summary = BidReconciler::new().reconcile(&mut store, &overrides()).unwrap();

        assert_eq!(store.bid("1"), dec!(2.50));
        assert_eq!(store.bid("2"), dec!(1.20));
        assert_eq!(summary.examined, 3);
        assert_eq!(summary.matched, 2);
        assert_eq!(summary.unmatched, 1);
        let change = summary.change_for("2").unwrap();
        assert_eq!(change.previous, dec!(1.00));
        assert_eq!(change.updated, dec!(1.20));
    }

    #[test]
    fn test_unmatched_and_paused_untouched() {
        let mut store = store();
        BidReconciler::new().reconcile(&mut store, &overrides()).unwrap();

        // Different match type.
        assert_eq!(store.bid("3"), dec!(0.80));
        // Paused keyword with a matching identity.
        assert_eq!(store.bid("4"), dec!(1.00));
        assert_eq!(store.writes, 2);
    }

    #[test]
    fn test_fixed_is_idempotent() {
        let mut store = store();
        let table = table(&[["CampX", "running shoes", "EXACT", "FIXED", "2.50"]]);
        let reconciler = BidReconciler::new();

        reconciler.reconcile(&mut store, &table).unwrap();
        let once = store.bid("1");
        reconciler.reconcile(&mut store, &table).unwrap();
        assert_eq!(store.bid("1"), once);
        assert_eq!(store.bid("1"), dec!(2.50));
    }

    #[test]
    fn test_relative_compounds() {
        let mut store = store();
        let table = table(&[["CampY", "hats", "PHRASE", "RELATIVE", "0.20"]]);
        let reconciler = BidReconciler::new();

        reconciler.reconcile(&mut store, &table).unwrap();
        assert_eq!(store.bid("2"), dec!(1.20));
        reconciler.reconcile(&mut store, &table).unwrap();
        assert_eq!(store.bid("2"), dec!(1.44));
    }

    #[test]
    fn test_case_sensitive_campaign_match() {
        let mut store = VecStore {
            keywords: vec![keyword(
                "1",
                "Campaign A",
                "shoes",
                MatchType::Exact,
                dec!(1.00),
                KeywordStatus::Enabled,
            )],
            ..VecStore::default()
        };
        let table = table(&[["Campaign a", "shoes", "EXACT", "FIXED", "3.00"]]);
        let summary = BidReconciler::new().reconcile(&mut store, &table).unwrap();

        assert_eq!(summary.matched, 0);
        assert_eq!(store.bid("1"), dec!(1.00));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let mut store = store();
        let summary = BidReconciler::dry_run().reconcile(&mut store, &overrides()).unwrap();

        assert!(summary.dry_run);
        assert_eq!(summary.changes.len(), 2);
        assert_eq!(summary.change_for("1").unwrap().updated, dec!(2.50));
        assert_eq!(store.bid("1"), dec!(1.00));
        assert_eq!(store.writes, 0);
    }

    #[test]
    fn test_write_failure_keeps_earlier_writes() {
        let mut store = store();
        store.fail_on = Some("2".into());
        let result = BidReconciler::new().reconcile(&mut store, &overrides());

        assert!(matches!(result, Err(AdsheetError::Account(_))));
        assert_eq!(store.bid("1"), dec!(2.50));
        assert_eq!(store.bid("2"), dec!(1.00));
    }

    #[test]
    fn test_overflowing_relative_bid_is_an_error() {
        let mut store = store();
        let table = table(&[
            ["CampX", "running shoes", "EXACT", "FIXED", "2.50"],
            ["CampY", "hats", "PHRASE", "RELATIVE", "79228162514264337593543950335"],
        ]);
        let result = BidReconciler::new().reconcile(&mut store, &table);

        assert!(matches!(result, Err(AdsheetError::Override(_))));
        assert_eq!(store.bid("1"), dec!(2.50));
        assert_eq!(store.bid("2"), dec!(1.00));
    }

    #[test]
    fn test_empty_table_touches_nothing() {
        let mut store = store();
        let summary = BidReconciler::new()
            .reconcile(&mut store, &BidOverrideTable::default())
            .unwrap();
        assert_eq!(summary.matched, 0);
        assert_eq!(summary.unmatched, 3);
        assert_eq!(store.writes, 0);
    }
}
