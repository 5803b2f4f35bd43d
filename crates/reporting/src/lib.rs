//! Ad performance reporting — classifies ads into segments, aggregates their
//! statistics, and renders per-segment tables with CTR.

pub mod aggregator;
pub mod classifier;
pub mod job;
pub mod renderer;

pub use aggregator::{SegmentAccumulator, SegmentAggregator, SharedSegmentAggregator};
pub use classifier::{AdClassifier, FinalUrlClassifier, HeadlineClassifier, Segmentation};
pub use job::{ReportRunSummary, SegmentReportJob};
pub use renderer::{ReportRow, ReportTable};
