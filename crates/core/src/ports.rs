//! Seams to the systems both jobs run against: the ad account, the
//! spreadsheet, and outbound notification. Implementations live in
//! `adsheet-workbook`; the jobs only see these traits.

use rust_decimal::Decimal;

use crate::error::AdsheetResult;
use crate::types::{AccountInfo, AdRecord, CellValue, DateRange, Keyword, KeywordStatus};

/// Filter for the ad statistics query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdQuery {
    pub date_range: DateRange,
    /// Ads with fewer impressions than this are not returned.
    pub min_impressions: u64,
}

impl Default for AdQuery {
    fn default() -> Self {
        Self {
            date_range: DateRange::LastWeek,
            min_impressions: 1,
        }
    }
}

pub trait AdSource {
    fn ads_with_stats(&self, query: &AdQuery) -> AdsheetResult<Vec<AdRecord>>;
}

pub trait KeywordStore {
    fn keywords(&self, status: KeywordStatus) -> AdsheetResult<Vec<Keyword>>;

    /// Applied immediately; there is no batching or rollback.
    fn set_max_cpc(&mut self, keyword_id: &str, bid: Decimal) -> AdsheetResult<()>;
}

pub trait AccountDirectory {
    fn account_info(&self) -> AdsheetResult<AccountInfo>;
}

pub trait TabularSource {
    /// The populated region of `sheet`, top to bottom. The vector's length is
    /// the end of data; nothing past it exists.
    fn read_rows(&self, sheet: &str) -> AdsheetResult<Vec<Vec<CellValue>>>;
}

pub trait TabularSink {
    /// Write a rectangular block whose top-left cell is (`row`, `col`), 1-based.
    /// Creates the sheet when missing.
    fn write_range(
        &mut self,
        sheet: &str,
        row: usize,
        col: usize,
        rows: &[Vec<CellValue>],
    ) -> AdsheetResult<()>;

    /// Blank every cell of `sheet` from `row` (1-based) to the bottom. A missing
    /// sheet is left missing.
    fn clear_from(&mut self, sheet: &str, row: usize) -> AdsheetResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

pub trait Notifier {
    fn notify(&self, notification: &Notification) -> AdsheetResult<()>;
}
