use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ─── Ads ────────────────────────────────────────────────────────────────────

/// An ad as exposed by the account. Read-only to both jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ad {
    pub id: String,
    pub creative: AdCreative,
    pub final_url: String,
}

/// Creative kinds the account can hold, each with its own headline fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdCreative {
    /// Legacy plain text ad.
    TextAd { headline: String },
    ExpandedTextAd {
        headline_part1: String,
        headline_part2: String,
    },
    GmailMultiProductAd { headline: String },
    GmailSinglePromotionAd { headline: String },
    ResponsiveDisplayAd { long_headline: String },
    Html5Ad,
    ImageAd,
    Other { type_name: String },
}

impl AdCreative {
    pub fn type_name(&self) -> &str {
        match self {
            Self::TextAd { .. } => "TEXT_AD",
            Self::ExpandedTextAd { .. } => "EXPANDED_TEXT_AD",
            Self::GmailMultiProductAd { .. } => "GMAIL_MULTI_PRODUCT_AD",
            Self::GmailSinglePromotionAd { .. } => "GMAIL_SINGLE_PROMOTION_AD",
            Self::ResponsiveDisplayAd { .. } => "RESPONSIVE_DISPLAY_AD",
            Self::Html5Ad => "HTML5_AD",
            Self::ImageAd => "IMAGE_AD",
            Self::Other { type_name } => type_name,
        }
    }
}

/// Per-ad counters over the query's date range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdStats {
    pub impressions: u64,
    pub clicks: u64,
    pub cost: Decimal,
}

/// An ad paired with its statistics, as returned by an [`crate::ports::AdSource`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdRecord {
    pub ad: Ad,
    pub stats: AdStats,
}

// ─── Keywords ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    Exact,
    Phrase,
    Broad,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "EXACT",
            Self::Phrase => "PHRASE",
            Self::Broad => "BROAD",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "EXACT" => Ok(Self::Exact),
            "PHRASE" => Ok(Self::Phrase),
            "BROAD" => Ok(Self::Broad),
            other => Err(format!("unknown match type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeywordStatus {
    Enabled,
    Paused,
    Removed,
}

/// A live keyword. Only `max_cpc` is ever written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub id: String,
    pub campaign_name: String,
    pub text: String,
    pub match_type: MatchType,
    pub max_cpc: Decimal,
    pub status: KeywordStatus,
}

impl Keyword {
    pub fn identity(&self) -> KeywordIdentity {
        KeywordIdentity::new(&self.campaign_name, &self.text, self.match_type)
    }
}

/// Composite identity matching override rows to live keywords.
/// Compared field by field; case and whitespace inside fields are significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeywordIdentity {
    pub campaign: String,
    pub text: String,
    pub match_type: MatchType,
}

impl KeywordIdentity {
    pub fn new(campaign: impl Into<String>, text: impl Into<String>, match_type: MatchType) -> Self {
        Self {
            campaign: campaign.into(),
            text: text.into(),
            match_type,
        }
    }
}

impl fmt::Display for KeywordIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / {}", self.campaign, self.text, self.match_type)
    }
}

// ─── Spreadsheet cells ──────────────────────────────────────────────────────

/// Raw cell content exchanged with a spreadsheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(Decimal),
    Bool(bool),
}

impl CellValue {
    /// Empty, or text holding only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Cell content as the user would read it in the sheet.
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.normalize().to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }

    /// Numeric value of the cell; numeric text is accepted.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => Decimal::from_str(s.trim()).ok(),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Decimal> for CellValue {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl From<u64> for CellValue {
    fn from(value: u64) -> Self {
        Self::Number(Decimal::from(value))
    }
}

// ─── Account ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub customer_id: String,
    pub timezone: String,
    #[serde(default = "default_currency")]
    pub currency_code: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Statistics window for the ad query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateRange {
    /// Previous Monday through Sunday.
    #[default]
    #[serde(rename = "last_week")]
    LastWeek,
    #[serde(rename = "last_7_days")]
    Last7Days,
    #[serde(rename = "last_30_days")]
    Last30Days,
}

impl DateRange {
    /// Inclusive first and last day of the window, relative to `today`.
    pub fn resolve(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Self::LastWeek => {
                let days_since_monday = i64::from(today.weekday().num_days_from_monday());
                let this_monday = today - Duration::days(days_since_monday);
                (this_monday - Duration::days(7), this_monday - Duration::days(1))
            }
            Self::Last7Days => (today - Duration::days(7), today - Duration::days(1)),
            Self::Last30Days => (today - Duration::days(30), today - Duration::days(1)),
        }
    }

    pub fn label(&self, today: NaiveDate) -> String {
        let (start, end) = self.resolve(today);
        format!("{} - {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
    }
}
