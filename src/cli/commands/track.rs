//! `tracklite track` command - status timeline for one query

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{format_short_id, format_timestamp, tsv_field};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::project::Project;
use crate::core::{Config, RecordCache};
use crate::tracking::{self, EntryPoint, StepStatus, TrackingResult};

#[derive(clap::Args, Debug)]
pub struct TrackArgs {
    /// Courier AWB, invoice number, or an RCPT/LAB/RPT/INVC record ID
    pub query: String,
}

pub fn run(args: TrackArgs, global: &GlobalOpts) -> Result<()> {
    let project = Project::locate(global.project.as_deref()).map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load(Some(&project));

    let query = args.query.as_str();
    let min_len = config.min_query_length();
    if query.chars().count() < min_len {
        return Err(miette::miette!(
            help = "Pass a courier AWB, an invoice number or a full record ID",
            "query '{}' is too short (need at least {} characters)",
            query,
            min_len
        ));
    }

    let cache = RecordCache::open(&project)?;
    let result = {
        let snapshot = cache.snapshot()?;
        tracking::track(&snapshot, query)?
    };
    tracing::debug!(query, found = result.found, "tracking query answered");

    match global.format.or_configured(config.default_format.as_deref()) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&result).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Tsv => print_tsv(&result),
        OutputFormat::Csv => print_csv(&result)?,
        OutputFormat::Auto => print_pretty(&result, query, global.quiet),
    }

    Ok(())
}

fn print_tsv(result: &TrackingResult) {
    println!("STAGE\tSTATUS\tTIMESTAMP\tDESCRIPTION");
    for step in &result.timeline {
        println!(
            "{}\t{}\t{}\t{}",
            step.stage,
            step.status,
            step.timestamp
                .map(|ts| ts.to_rfc3339())
                .unwrap_or_default(),
            tsv_field(&step.description)
        );
    }
}

fn print_csv(result: &TrackingResult) -> Result<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer
        .write_record(["stage", "status", "timestamp", "description"])
        .into_diagnostic()?;
    for step in &result.timeline {
        let status = step.status.to_string();
        let timestamp = step
            .timestamp
            .map(|ts| ts.to_rfc3339())
            .unwrap_or_default();
        writer
            .write_record([
                step.stage.as_str(),
                status.as_str(),
                timestamp.as_str(),
                step.description.as_str(),
            ])
            .into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;
    Ok(())
}

fn print_pretty(result: &TrackingResult, query: &str, quiet: bool) {
    if !result.found {
        println!(
            "{} No record found for '{}'",
            style("!").yellow(),
            style(query).cyan()
        );
        return;
    }

    if !quiet {
        if let (Some(id), Some(via), Some(stage)) =
            (&result.id, result.matched_by, result.current_stage)
        {
            println!(
                "{} {} matched by {}",
                style("✓").green(),
                style(id).cyan(),
                matched_by_label(via)
            );
            println!(
                "{} Current stage: {}",
                style("→").blue(),
                style(stage.label()).bold()
            );
            println!();
        }
    }

    let mut builder = Builder::default();
    builder.push_record(["", "Stage", "When", "Details"]);
    for step in &result.timeline {
        let marker = match step.status {
            StepStatus::Completed => style("✓").green().to_string(),
            StepStatus::Current => style("→").blue().to_string(),
            StepStatus::Pending => style("·").dim().to_string(),
        };
        builder.push_record([
            marker,
            step.stage.label().to_string(),
            format_timestamp(step.timestamp.as_ref()),
            step.description.clone(),
        ]);
    }
    println!("{}", builder.build().with(Style::rounded()));

    if result.documents.is_empty() {
        return;
    }

    println!();
    println!("{}", style("Documents").bold());
    let mut docs = Builder::default();
    docs.push_record(["Type", "ID", "Number", "Status"]);
    for doc in &result.documents {
        docs.push_record([
            doc.kind.to_string(),
            format_short_id(&doc.id),
            doc.number.clone().unwrap_or_else(|| "-".to_string()),
            doc.status.clone(),
        ]);
    }
    println!("{}", docs.build().with(Style::rounded()));
}

fn matched_by_label(via: EntryPoint) -> &'static str {
    match via {
        EntryPoint::Awb => "courier AWB",
        EntryPoint::IntakeId => "intake ID",
        EntryPoint::TestId => "test ID",
        EntryPoint::ReportId => "report ID",
        EntryPoint::InvoiceNumber => "invoice number",
        EntryPoint::InvoiceId => "invoice ID",
    }
}
