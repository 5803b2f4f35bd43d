//! Account snapshot — an exported copy of the account's ads (with statistics
//! for the reporting window) and keywords, kept as a JSON file.

use std::path::{Path, PathBuf};

use adsheet_core::ports::{AccountDirectory, AdQuery, AdSource, KeywordStore};
use adsheet_core::types::{AccountInfo, AdRecord, Keyword, KeywordStatus};
use adsheet_core::{AdsheetError, AdsheetResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotData {
    pub account: AccountInfo,
    #[serde(default)]
    pub ads: Vec<AdRecord>,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
}

#[derive(Debug, Clone)]
pub struct AccountSnapshot {
    path: Option<PathBuf>,
    data: SnapshotData,
}

impl AccountSnapshot {
    pub fn new(data: SnapshotData) -> Self {
        Self { path: None, data }
    }

    pub fn open(path: impl AsRef<Path>) -> AdsheetResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let data: SnapshotData = serde_json::from_str(&raw)?;
        debug!(
            path = %path.display(),
            ads = data.ads.len(),
            keywords = data.keywords.len(),
            "Account snapshot opened"
        );
        Ok(Self {
            path: Some(path.to_path_buf()),
            data,
        })
    }

    pub fn data(&self) -> &SnapshotData {
        &self.data
    }

    /// Write the snapshot, including any bid changes, back to where it was opened from.
    pub fn save(&self) -> AdsheetResult<()> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| AdsheetError::Account("snapshot was not opened from a file".into()))?;
        std::fs::write(path, serde_json::to_string_pretty(&self.data)?)?;
        Ok(())
    }
}

impl AccountDirectory for AccountSnapshot {
    fn account_info(&self) -> AdsheetResult<AccountInfo> {
        Ok(self.data.account.clone())
    }
}

impl AdSource for AccountSnapshot {
    /// The snapshot already covers a single window, so only the impression
    /// threshold is applied.
    fn ads_with_stats(&self, query: &AdQuery) -> AdsheetResult<Vec<AdRecord>> {
        Ok(self
            .data
            .ads
            .iter()
            .filter(|r| r.stats.impressions >= query.min_impressions)
            .cloned()
            .collect())
    }
}

impl KeywordStore for AccountSnapshot {
    fn keywords(&self, status: KeywordStatus) -> AdsheetResult<Vec<Keyword>> {
        Ok(self
            .data
            .keywords
            .iter()
            .filter(|k| k.status == status)
            .cloned()
            .collect())
    }

    fn set_max_cpc(&mut self, keyword_id: &str, bid: Decimal) -> AdsheetResult<()> {
        let keyword = self
            .data
            .keywords
            .iter_mut()
            .find(|k| k.id == keyword_id)
            .ok_or_else(|| AdsheetError::Account(format!("keyword '{keyword_id}' not found")))?;
        keyword.max_cpc = bid;
        Ok(())
    }
}
