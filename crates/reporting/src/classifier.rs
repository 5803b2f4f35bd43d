//! Ad classification — derives the segment key an ad is grouped under.

use adsheet_core::types::{Ad, AdCreative};
use serde::{Deserialize, Serialize};

/// Maps an ad to the key it is aggregated under. `None` leaves the ad out of
/// the report entirely.
pub trait AdClassifier {
    fn segment_key(&self, ad: &Ad) -> Option<String>;

    /// Label of the first report column.
    fn column_label(&self) -> &'static str;
}

/// Groups ads by headline. Creative kinds without a headline are unclassified.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlineClassifier;

impl AdClassifier for HeadlineClassifier {
    fn segment_key(&self, ad: &Ad) -> Option<String> {
        let key = match &ad.creative {
            AdCreative::TextAd { headline } => headline.clone(),
            AdCreative::ExpandedTextAd {
                headline_part1,
                headline_part2,
            } => format!("{headline_part1} - {headline_part2}"),
            AdCreative::GmailMultiProductAd { headline } => headline.clone(),
            AdCreative::GmailSinglePromotionAd { headline } => headline.clone(),
            AdCreative::ResponsiveDisplayAd { long_headline } => long_headline.clone(),
            AdCreative::Html5Ad | AdCreative::ImageAd | AdCreative::Other { .. } => return None,
        };
        non_empty(key)
    }

    fn column_label(&self) -> &'static str {
        "Headline"
    }
}

/// Groups ads by final URL, whatever the creative kind. Every ad gets a key.
#[derive(Debug, Clone, Copy, Default)]
pub struct FinalUrlClassifier;

impl AdClassifier for FinalUrlClassifier {
    fn segment_key(&self, ad: &Ad) -> Option<String> {
        Some(ad.final_url.clone())
    }

    fn column_label(&self) -> &'static str {
        "Final URL"
    }
}

fn non_empty(key: String) -> Option<String> {
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segmentation {
    Headline,
    FinalUrl,
}

impl Segmentation {
    pub const ALL: [Segmentation; 2] = [Segmentation::Headline, Segmentation::FinalUrl];

    pub fn classifier(&self) -> &'static dyn AdClassifier {
        match self {
            Self::Headline => &HeadlineClassifier,
            Self::FinalUrl => &FinalUrlClassifier,
        }
    }
}
