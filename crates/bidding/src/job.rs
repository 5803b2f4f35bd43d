//! Bid override job — reads the override sheet and reconciles it against the
//! account's keywords.

use adsheet_core::config::BidsConfig;
use adsheet_core::ports::{KeywordStore, TabularSource};
use adsheet_core::AdsheetResult;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::override_table::{OverrideTableBuilder, RejectedRow};
use crate::reconciler::{BidReconciler, ReconcileSummary};

#[derive(Debug, Clone, Serialize)]
pub struct BidRunSummary {
    pub run_id: Uuid,
    pub overrides: usize,
    pub duplicates: usize,
    pub rejected: Vec<RejectedRow>,
    pub reconcile: ReconcileSummary,
}

pub struct BidOverrideJob {
    config: BidsConfig,
}

impl BidOverrideJob {
    pub fn new(config: BidsConfig) -> Self {
        Self { config }
    }

    pub fn run<T, K>(&self, source: &T, store: &mut K) -> AdsheetResult<BidRunSummary>
    where
        T: TabularSource + ?Sized,
        K: KeywordStore + ?Sized,
    {
        let run_id = Uuid::new_v4();
        let rows = source.read_rows(&self.config.sheet)?;
        let table = OverrideTableBuilder::new(self.config.unknown_adjustment).build(&rows);

        info!(
            %run_id,
            sheet = %self.config.sheet,
            overrides = table.len(),
            duplicates = table.duplicates(),
            rejected = table.rejected().len(),
            "Bid override table loaded"
        );
        if table.is_empty() {
            warn!(%run_id, sheet = %self.config.sheet, "No bid overrides found");
        }

        let reconciler = if self.config.dry_run {
            BidReconciler::dry_run()
        } else {
            BidReconciler::new()
        };
        let reconcile = reconciler.reconcile(store, &table)?;

        Ok(BidRunSummary {
            run_id,
            overrides: table.len(),
            duplicates: table.duplicates(),
            rejected: table.rejected().to_vec(),
            reconcile,
        })
    }
}
