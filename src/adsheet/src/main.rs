//! adsheet — ad performance segment reports and spreadsheet-driven bid
//! overrides for an advertising account.

use std::path::PathBuf;

use adsheet_bidding::BidOverrideJob;
use adsheet_core::config::AppConfig;
use adsheet_reporting::{SegmentReportJob, Segmentation};
use adsheet_workbook::{AccountSnapshot, JsonWorkbook, LogNotifier};
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "adsheet")]
#[command(about = "Ad performance segment reports and spreadsheet-driven bid overrides")]
#[command(version)]
struct Cli {
    /// TOML config file; `ADSHEET__*` environment variables override it
    #[arg(long, global = true, env = "ADSHEET_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Aggregate ad statistics per headline and per final URL into the report workbook
    Report {
        /// Account snapshot (JSON) holding ads and their statistics
        #[arg(short, long)]
        account: PathBuf,

        /// Report workbook (overrides report.spreadsheet)
        #[arg(short, long)]
        workbook: Option<String>,

        /// Which segmentation(s) to write
        #[arg(long, value_enum, default_value_t = SegmentationArg::All)]
        segmentation: SegmentationArg,

        /// Also print each report table to stdout as CSV
        #[arg(long, default_value_t = false)]
        csv: bool,
    },

    /// Apply the bid override sheet to the account's enabled keywords
    Bids {
        /// Account snapshot (JSON) holding keywords; updated in place
        #[arg(short, long)]
        account: PathBuf,

        /// Workbook holding the override sheet (overrides bids.spreadsheet)
        #[arg(short, long)]
        workbook: Option<String>,

        /// Override sheet name (overrides bids.sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Compute the new bids without writing them
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SegmentationArg {
    Headline,
    FinalUrl,
    All,
}

impl SegmentationArg {
    fn segmentations(self) -> &'static [Segmentation] {
        match self {
            Self::Headline => &[Segmentation::Headline],
            Self::FinalUrl => &[Segmentation::FinalUrl],
            Self::All => &Segmentation::ALL,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "adsheet=info,adsheet_reporting=info,adsheet_bidding=info,adsheet_workbook=info"
                    .into()
            }),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => AppConfig::load(Some(path))
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AppConfig::load(None).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            AppConfig::default()
        }),
    };

    match cli.command {
        Commands::Report {
            account,
            workbook,
            segmentation,
            csv,
        } => run_report(config, account, workbook, segmentation, csv),
        Commands::Bids {
            account,
            workbook,
            sheet,
            dry_run,
        } => run_bids(config, account, workbook, sheet, dry_run),
    }
}

fn run_report(
    mut config: AppConfig,
    account: PathBuf,
    workbook: Option<String>,
    segmentation: SegmentationArg,
    csv: bool,
) -> anyhow::Result<()> {
    if let Some(workbook) = workbook {
        config.report.spreadsheet = workbook;
    }
    config.validate_report()?;

    info!(
        spreadsheet = %config.report.spreadsheet,
        account = %account.display(),
        ?segmentation,
        "Running segment report"
    );

    let snapshot = AccountSnapshot::open(&account)
        .with_context(|| format!("opening account snapshot {}", account.display()))?;
    let mut book = JsonWorkbook::open_or_create(&config.report.spreadsheet)?;
    let today = chrono::Utc::now().date_naive();

    let summary = SegmentReportJob::new(config.report.clone()).run(
        &snapshot,
        &mut book,
        &LogNotifier,
        segmentation.segmentations(),
        today,
    )?;
    book.save()
        .with_context(|| format!("saving workbook {}", book.path().display()))?;

    if csv {
        for report in &summary.reports {
            println!("# {}", report.sheet);
            print!("{}", report.table.to_csv());
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

fn run_bids(
    mut config: AppConfig,
    account: PathBuf,
    workbook: Option<String>,
    sheet: Option<String>,
    dry_run: bool,
) -> anyhow::Result<()> {
    if let Some(workbook) = workbook {
        config.bids.spreadsheet = workbook;
    }
    if let Some(sheet) = sheet {
        config.bids.sheet = sheet;
    }
    config.bids.dry_run |= dry_run;
    config.validate_bids()?;

    info!(
        spreadsheet = %config.bids.spreadsheet,
        sheet = %config.bids.sheet,
        dry_run = config.bids.dry_run,
        "Running bid overrides"
    );

    let book = JsonWorkbook::open(&config.bids.spreadsheet)
        .with_context(|| format!("opening workbook {}", config.bids.spreadsheet))?;
    let mut snapshot = AccountSnapshot::open(&account)
        .with_context(|| format!("opening account snapshot {}", account.display()))?;

    // Bids set before a failure are final; save them either way.
    let result = BidOverrideJob::new(config.bids.clone()).run(&book, &mut snapshot);
    if !config.bids.dry_run {
        snapshot
            .save()
            .with_context(|| format!("saving account snapshot {}", account.display()))?;
    }
    let summary = result?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
