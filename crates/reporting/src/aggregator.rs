//! Per-segment accumulation of ad statistics.

use std::collections::HashMap;

use adsheet_core::types::{Ad, AdStats};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::AdClassifier;

/// Running totals for one segment key. Every field only grows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentAccumulator {
    pub num_ads: u64,
    pub total_impressions: u64,
    pub total_clicks: u64,
    pub total_cost: Decimal,
}

impl SegmentAccumulator {
    pub fn add(&mut self, stats: &AdStats) {
        self.num_ads += 1;
        self.total_impressions += stats.impressions;
        self.total_clicks += stats.clicks;
        self.total_cost += stats.cost;
    }

    fn merge(&mut self, other: &SegmentAccumulator) {
        self.num_ads += other.num_ads;
        self.total_impressions += other.total_impressions;
        self.total_clicks += other.total_clicks;
        self.total_cost += other.total_cost;
    }
}

/// Single-writer aggregator owned by one report pass.
#[derive(Debug, Default)]
pub struct SegmentAggregator {
    segments: HashMap<String, SegmentAccumulator>,
    ingested: u64,
    excluded: u64,
}

impl SegmentAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify and accumulate every ad in `records`.
    pub fn aggregate<'a, C, I>(classifier: &C, records: I) -> Self
    where
        C: AdClassifier + ?Sized,
        I: IntoIterator<Item = (&'a Ad, &'a AdStats)>,
    {
        let mut aggregator = Self::new();
        for (ad, stats) in records {
            aggregator.ingest(classifier, ad, stats);
        }
        aggregator
    }

    /// Returns false when the classifier has no key for the ad; the ad then
    /// contributes nothing.
    pub fn ingest<C>(&mut self, classifier: &C, ad: &Ad, stats: &AdStats) -> bool
    where
        C: AdClassifier + ?Sized,
    {
        match classifier.segment_key(ad) {
            Some(key) => {
                self.record(key, stats);
                metrics::counter!("report.ads_ingested").increment(1);
                true
            }
            None => {
                debug!(
                    ad_id = %ad.id,
                    ad_type = ad.creative.type_name(),
                    "Ad has no segment key, excluded"
                );
                self.excluded += 1;
                metrics::counter!("report.ads_excluded").increment(1);
                false
            }
        }
    }

    pub fn record(&mut self, key: String, stats: &AdStats) {
        self.segments.entry(key).or_default().add(stats);
        self.ingested += 1;
    }

    pub fn get(&self, key: &str) -> Option<&SegmentAccumulator> {
        self.segments.get(key)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn ingested(&self) -> u64 {
        self.ingested
    }

    pub fn excluded(&self) -> u64 {
        self.excluded
    }

    pub fn segments(&self) -> &HashMap<String, SegmentAccumulator> {
        &self.segments
    }

    pub fn into_segments(self) -> HashMap<String, SegmentAccumulator> {
        self.segments
    }
}

/// Aggregator that several workers can feed at once. Increments to one key are
/// serialized by the map's per-entry lock.
#[derive(Debug, Default)]
pub struct SharedSegmentAggregator {
    segments: DashMap<String, SegmentAccumulator>,
}

impl SharedSegmentAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest<C>(&self, classifier: &C, ad: &Ad, stats: &AdStats) -> bool
    where
        C: AdClassifier + ?Sized,
    {
        match classifier.segment_key(ad) {
            Some(key) => {
                self.segments.entry(key).or_default().add(stats);
                true
            }
            None => false,
        }
    }

    /// Fold a worker-local aggregator in.
    pub fn merge(&self, local: &SegmentAggregator) {
        for (key, acc) in local.segments() {
            self.segments.entry(key.clone()).or_default().merge(acc);
        }
    }

    pub fn into_segments(self) -> HashMap<String, SegmentAccumulator> {
        self.segments.into_iter().collect()
    }
}
