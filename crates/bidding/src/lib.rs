//! Spreadsheet-driven bid overrides — builds an override table from sheet rows
//! and applies it to live keywords.

pub mod job;
pub mod override_table;
pub mod reconciler;

pub use job::{BidOverrideJob, BidRunSummary};
pub use override_table::{AdjustmentType, BidOverride, BidOverrideTable, OverrideTableBuilder};
pub use reconciler::{BidChange, BidReconciler, ReconcileSummary};
