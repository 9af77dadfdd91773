//! `tracklite seed` command - write a small set of demo records

use chrono::{DateTime, Duration, Utc};
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::GlobalOpts;
use crate::core::identity::RecordPrefix;
use crate::core::project::Project;
use crate::core::record::Record;
use crate::core::RecordCache;
use crate::entities::invoice::format_invoice_number;
use crate::entities::{
    CommChannel, CommStatus, Intake, Invoice, InvoiceStatus, LabTest, Report, TestStatus,
};

#[derive(clap::Args, Debug)]
pub struct SeedArgs {
    /// Remove existing record files before seeding
    #[arg(long)]
    pub force: bool,
}

/// How far a demo sample has progressed
struct Sample {
    branch: &'static str,
    company: &'static str,
    awb: Option<&'static str>,
    forward_to_central: bool,
    test: Option<TestStatus>,
    report: Option<(CommStatus, CommChannel)>,
    invoice: Option<InvoiceStatus>,
    days_ago: i64,
}

const SAMPLES: &[Sample] = &[
    Sample {
        branch: "Mumbai",
        company: "Acme Foods",
        awb: Some("AWB123456789"),
        forward_to_central: true,
        test: Some(TestStatus::Completed),
        report: Some((CommStatus::Dispatched, CommChannel::Courier)),
        invoice: Some(InvoiceStatus::Paid),
        days_ago: 12,
    },
    Sample {
        branch: "Chennai",
        company: "Coastal Agro",
        awb: None,
        forward_to_central: false,
        test: Some(TestStatus::Completed),
        report: Some((CommStatus::Delivered, CommChannel::Email)),
        invoice: Some(InvoiceStatus::Issued),
        days_ago: 8,
    },
    Sample {
        branch: "Mumbai",
        company: "Northwind Pharma",
        awb: Some("AWB987654321"),
        forward_to_central: true,
        test: Some(TestStatus::InProgress),
        report: None,
        invoice: None,
        days_ago: 3,
    },
    Sample {
        branch: "Pune",
        company: "Deccan Textiles",
        awb: Some("AWB555000111"),
        forward_to_central: false,
        test: None,
        report: None,
        invoice: None,
        days_ago: 1,
    },
];

const SEED_YEAR: i32 = 2024;

pub fn run(args: SeedArgs, global: &GlobalOpts) -> Result<()> {
    let project =
        Project::locate(global.project.as_deref()).map_err(|e| miette::miette!("{}", e))?;

    let existing: Vec<_> = RecordPrefix::all()
        .iter()
        .flat_map(|prefix| project.iter_record_files(*prefix))
        .collect();

    if !existing.is_empty() {
        if !args.force {
            return Err(miette::miette!(
                help = "Use `tracklite seed --force` to replace them",
                "project already has {} record file(s)",
                existing.len()
            ));
        }
        for path in &existing {
            std::fs::remove_file(path).into_diagnostic()?;
        }
        tracing::debug!(removed = existing.len(), "removed existing record files");
    }

    let now = Utc::now();
    let mut written = 0;
    let mut sequence = 0;

    for (index, sample) in SAMPLES.iter().enumerate() {
        let start = now - Duration::days(sample.days_ago);
        written += write_sample(&project, sample, index + 1, &mut sequence, start)?;
    }

    let mut cache = RecordCache::open_without_sync(&project)?;
    let stats = cache.sync()?;

    if !global.quiet {
        println!(
            "{} Wrote {} record(s) for {} sample(s)",
            style("✓").green(),
            style(written).cyan(),
            SAMPLES.len()
        );
        println!(
            "  Cache: {} added, {} skipped",
            stats.records_added, stats.files_skipped
        );
        println!();
        println!(
            "Try {} or {}",
            style("tracklite track AWB123456789").yellow(),
            style(format!(
                "tracklite track {}",
                format_invoice_number(SEED_YEAR, 1)
            ))
            .yellow()
        );
    }

    Ok(())
}

/// Write one sample's chain, returning the number of files written
fn write_sample(
    project: &Project,
    sample: &Sample,
    number: usize,
    invoice_sequence: &mut u32,
    start: DateTime<Utc>,
) -> Result<usize> {
    let mut intake = Intake::new(
        "Front Desk".to_string(),
        sample.branch.to_string(),
        sample.company.to_string(),
    );
    if let Some(awb) = sample.awb {
        intake = intake.with_awb(awb);
    }
    intake.forward_to_central = sample.forward_to_central;
    intake.receipt_date = start.date_naive();
    intake.created = start;
    intake.updated = start;
    write_record(project, &intake)?;

    let Some(test_status) = sample.test else {
        return Ok(1);
    };
    let mut test = LabTest::new(
        intake.id.clone(),
        format!("LAB-{}-{:03}", SEED_YEAR, number),
        "S. Iyer".to_string(),
    );
    test.test_status = test_status;
    test.created = start + Duration::days(1);
    test.updated = start + Duration::days(2);
    write_record(project, &test)?;

    let Some((comm_status, comm_channel)) = sample.report else {
        return Ok(2);
    };
    let mut report = Report::new(test.id.clone()).approve("Dr. A. Rao");
    report.comm_status = comm_status;
    report.comm_channel = comm_channel;
    report.created = start + Duration::days(3);
    report.updated = start + Duration::days(4);
    write_record(project, &report)?;

    let Some(invoice_status) = sample.invoice else {
        return Ok(3);
    };
    *invoice_sequence += 1;
    let mut invoice = Invoice::new(
        report.id.clone(),
        format_invoice_number(SEED_YEAR, *invoice_sequence),
        4500.0,
    );
    invoice.status = invoice_status;
    invoice.issued_at = start + Duration::days(5);
    invoice.created = invoice.issued_at;
    invoice.updated = invoice.issued_at;
    if invoice_status == InvoiceStatus::Paid {
        let paid_at = start + Duration::days(7);
        invoice.paid_at = Some(paid_at);
        invoice.updated = paid_at;
    }
    write_record(project, &invoice)?;

    Ok(4)
}

fn write_record<R: Record>(project: &Project, record: &R) -> Result<()> {
    let path = project.record_path(record.id());
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).into_diagnostic()?;
    }
    let yaml = serde_yml::to_string(record).into_diagnostic()?;
    std::fs::write(&path, yaml).into_diagnostic()?;
    tracing::debug!(path = %path.display(), "wrote record");
    Ok(())
}
