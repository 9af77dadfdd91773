//! `tracklite status` command - store status dashboard

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::project::Project;
use crate::core::{Config, GroupCount, RecordCache, StoreSummary};

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Show per-branch and per-mode receipt breakdown
    #[arg(long)]
    pub detailed: bool,
}

pub fn run(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let project =
        Project::locate(global.project.as_deref()).map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load(Some(&project));
    let cache = RecordCache::open(&project)?;
    let summary = cache.summary()?;

    match global.format.or_configured(config.default_format.as_deref()) {
        OutputFormat::Json => {
            let status = serde_json::json!({
                "branch": config.branch,
                "receipts": {
                    "total": summary.receipts,
                    "with_awb": summary.receipts_with_awb,
                    "forwarded": summary.receipts_forwarded,
                    "by_mode": counts_json(&summary.receipts_by_mode),
                    "by_branch": counts_json(&summary.receipts_by_branch),
                },
                "tests": counts_json(&summary.tests_by_status),
                "reports": counts_json(&summary.reports_by_status),
                "invoices": counts_json(&summary.invoices_by_status),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&status).into_diagnostic()?
            );
        }
        OutputFormat::Tsv => {
            println!("SECTION\tGROUP\tCOUNT");
            for (section, counts) in sections(&summary) {
                for c in counts {
                    println!("{}\t{}\t{}", section, c.group, c.count);
                }
            }
        }
        _ => print_dashboard(&summary, config.branch.as_deref(), args.detailed),
    }

    Ok(())
}

fn sections(summary: &StoreSummary) -> [(&'static str, &[GroupCount]); 5] {
    [
        ("receipt_mode", summary.receipts_by_mode.as_slice()),
        ("receipt_branch", summary.receipts_by_branch.as_slice()),
        ("test", summary.tests_by_status.as_slice()),
        ("report", summary.reports_by_status.as_slice()),
        ("invoice", summary.invoices_by_status.as_slice()),
    ]
}

fn counts_json(counts: &[GroupCount]) -> serde_json::Value {
    counts
        .iter()
        .map(|c| (c.group.clone(), serde_json::Value::from(c.count)))
        .collect::<serde_json::Map<_, _>>()
        .into()
}

fn print_dashboard(summary: &StoreSummary, branch: Option<&str>, detailed: bool) {
    let width = 64;

    println!("{}", style("TrackLite Status").bold().underlined());
    if let Some(branch) = branch {
        println!("Branch: {}", style(branch).cyan());
    }
    println!("{}", "═".repeat(width));
    println!();

    if summary.receipts == 0 {
        println!(
            "No records yet. Run {} to add demo data.",
            style("tracklite seed").yellow()
        );
        return;
    }

    let receipts = vec![
        format!("Total:      {}", summary.receipts),
        format!("With AWB:   {}", summary.receipts_with_awb),
        format!("Forwarded:  {}", summary.receipts_forwarded),
    ];
    print_two_columns(
        "RECEIPTS",
        &receipts,
        "LAB TESTS",
        &count_lines(&summary.tests_by_status),
    );
    println!();

    print_two_columns(
        "REPORTS",
        &count_lines(&summary.reports_by_status),
        "INVOICES",
        &count_lines(&summary.invoices_by_status),
    );

    if detailed {
        println!();
        print_two_columns(
            "BY MODE",
            &count_lines(&summary.receipts_by_mode),
            "BY BRANCH",
            &count_lines(&summary.receipts_by_branch),
        );
    }
}

fn count_lines(counts: &[GroupCount]) -> Vec<String> {
    if counts.is_empty() {
        return vec![style("none").dim().to_string()];
    }
    counts
        .iter()
        .map(|c| format!("{:<14} {}", c.group, c.count))
        .collect()
}

fn print_two_columns(title1: &str, lines1: &[String], title2: &str, lines2: &[String]) {
    let col_width = 32;

    println!("{:<col_width$} {}", style(title1).bold(), style(title2).bold());
    println!("{:-<col_width$} {:-<col_width$}", "", "");

    let max_lines = lines1.len().max(lines2.len());

    for i in 0..max_lines {
        let l1 = lines1.get(i).map(|s| s.as_str()).unwrap_or("");
        let l2 = lines2.get(i).map(|s| s.as_str()).unwrap_or("");
        println!("  {:<30} {}", l1, l2);
    }
}
