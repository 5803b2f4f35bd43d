//! Segment report job — pulls last period's ad statistics, aggregates them per
//! segmentation, and writes one table per segmentation into the workbook.

use adsheet_core::config::ReportConfig;
use adsheet_core::ports::{AccountDirectory, AdQuery, AdSource, Notification, Notifier, TabularSink};
use adsheet_core::types::{AccountInfo, CellValue};
use adsheet_core::AdsheetResult;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::aggregator::SegmentAggregator;
use crate::classifier::Segmentation;
use crate::renderer::ReportTable;

/// Report output for one segmentation.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentReport {
    pub segmentation: Segmentation,
    pub sheet: String,
    pub table: ReportTable,
    pub excluded_ads: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportRunSummary {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub date_range: String,
    pub ads_read: usize,
    pub reports: Vec<SegmentReport>,
    pub notified: bool,
}

impl ReportRunSummary {
    pub fn report(&self, segmentation: Segmentation) -> Option<&SegmentReport> {
        self.reports.iter().find(|r| r.segmentation == segmentation)
    }
}

pub struct SegmentReportJob {
    config: ReportConfig,
}

impl SegmentReportJob {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn sheet_for(&self, segmentation: Segmentation) -> &str {
        match segmentation {
            Segmentation::Headline => &self.config.headline_sheet,
            Segmentation::FinalUrl => &self.config.final_url_sheet,
        }
    }

    pub fn run<A, S, N>(
        &self,
        account: &A,
        sink: &mut S,
        notifier: &N,
        segmentations: &[Segmentation],
        today: NaiveDate,
    ) -> AdsheetResult<ReportRunSummary>
    where
        A: AdSource + AccountDirectory + ?Sized,
        S: TabularSink + ?Sized,
        N: Notifier + ?Sized,
    {
        let run_id = Uuid::new_v4();
        let query = AdQuery {
            date_range: self.config.date_range,
            min_impressions: self.config.min_impressions,
        };
        let info = account.account_info()?;
        let records = account.ads_with_stats(&query)?;
        let date_range = self.config.date_range.label(today);

        info!(
            %run_id,
            customer_id = %info.customer_id,
            ads = records.len(),
            date_range = %date_range,
            "Segment report started"
        );

        let mut reports = Vec::with_capacity(segmentations.len());
        for &segmentation in segmentations {
            let classifier = segmentation.classifier();
            let aggregator = SegmentAggregator::aggregate(
                classifier,
                records.iter().map(|r| (&r.ad, &r.stats)),
            );
            let excluded_ads = aggregator.excluded();
            let table = ReportTable::render(classifier.column_label(), aggregator.segments());
            let sheet = self.sheet_for(segmentation).to_string();

            self.write_report(sink, &sheet, &info, &date_range, &table)?;

            info!(
                %run_id,
                ?segmentation,
                sheet = %sheet,
                segments = table.rows.len(),
                excluded_ads,
                "Segment report written"
            );
            reports.push(SegmentReport {
                segmentation,
                sheet,
                table,
                excluded_ads,
            });
        }

        let notified = match &self.config.recipient {
            Some(recipient) => {
                notifier.notify(&self.notification(recipient, &info, &date_range, &reports))?;
                true
            }
            None => false,
        };

        Ok(ReportRunSummary {
            run_id,
            generated_at: Utc::now(),
            date_range,
            ads_read: records.len(),
            reports,
            notified,
        })
    }

    fn write_report<S>(
        &self,
        sink: &mut S,
        sheet: &str,
        info: &AccountInfo,
        date_range: &str,
        table: &ReportTable,
    ) -> AdsheetResult<()>
    where
        S: TabularSink + ?Sized,
    {
        let metadata = vec![
            vec![CellValue::from("Account"), CellValue::from(info.customer_id.as_str())],
            vec![CellValue::from("Timezone"), CellValue::from(info.timezone.as_str())],
            vec![CellValue::from("Date range"), CellValue::from(date_range)],
        ];
        sink.write_range(sheet, 1, self.config.start_col, &metadata)?;
        // Rows left over from a longer earlier table.
        sink.clear_from(sheet, self.config.start_row)?;
        sink.write_range(
            sheet,
            self.config.start_row,
            self.config.start_col,
            &table.to_cells(),
        )
    }

    fn notification(
        &self,
        recipient: &str,
        info: &AccountInfo,
        date_range: &str,
        reports: &[SegmentReport],
    ) -> Notification {
        let mut body = format!(
            "Ad performance report for account {} ({}) is ready in {}.\n",
            info.customer_id, date_range, self.config.spreadsheet
        );
        for report in reports {
            body.push_str(&format!(
                "  {}: {} segments\n",
                report.sheet,
                report.table.rows.len()
            ));
        }
        Notification {
            recipient: recipient.to_string(),
            subject: format!("Ad performance report for {}", info.customer_id),
            body,
        }
    }
}
