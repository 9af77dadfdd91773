//! `tracklite cache` command - Manage the record cache
//!
//! The cache is a local SQLite database indexing the record files by AWB,
//! invoice number and owner reference. It is user-local (gitignored) and
//! rebuilds itself from the record files.

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::project::Project;
use crate::core::RecordCache;

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Rebuild the cache from scratch
    Rebuild,

    /// Sync cache with filesystem changes (incremental)
    Sync,

    /// Show cache statistics
    Status,

    /// Clear the cache completely
    Clear,
}

pub fn run(cmd: CacheCommands, global: &GlobalOpts) -> Result<()> {
    let project =
        Project::locate(global.project.as_deref()).map_err(|e| miette::miette!("{}", e))?;

    match cmd {
        CacheCommands::Rebuild => run_rebuild(&project),
        CacheCommands::Sync => run_sync(&project),
        CacheCommands::Status => run_status(&project),
        CacheCommands::Clear => run_clear(&project),
    }
}

fn run_rebuild(project: &Project) -> Result<()> {
    let mut cache = RecordCache::open_without_sync(project)?;

    println!("{} Rebuilding cache...", style("→").blue());
    let stats = cache.rebuild()?;

    println!(
        "{} Cache rebuilt in {}ms",
        style("✓").green(),
        stats.duration_ms
    );
    println!("  Files scanned:  {}", stats.files_scanned);
    println!("  Records cached: {}", stats.records_added);
    if stats.files_skipped > 0 {
        println!("  Skipped:        {}", style(stats.files_skipped).yellow());
    }

    Ok(())
}

fn run_sync(project: &Project) -> Result<()> {
    let mut cache = RecordCache::open_without_sync(project)?;

    let stats = cache.sync()?;

    if stats.records_added == 0 && stats.records_updated == 0 && stats.records_removed == 0 {
        println!("{} Cache is up to date", style("✓").green());
    } else {
        println!(
            "{} Cache synced in {}ms",
            style("✓").green(),
            stats.duration_ms
        );
        if stats.records_added > 0 {
            println!("  Added:   {}", style(stats.records_added).green());
        }
        if stats.records_updated > 0 {
            println!("  Updated: {}", style(stats.records_updated).yellow());
        }
        if stats.records_removed > 0 {
            println!("  Removed: {}", style(stats.records_removed).red());
        }
    }
    if stats.files_skipped > 0 {
        println!(
            "  Skipped: {} (run with --verbose for details)",
            style(stats.files_skipped).yellow()
        );
    }

    Ok(())
}

fn run_status(project: &Project) -> Result<()> {
    let cache = RecordCache::open(project)?;

    let stats = cache.statistics()?;

    println!("{}", style("Cache Status").bold());
    println!("{}", style("─".repeat(40)).dim());
    println!("  Location:       {}", cache.path().display());
    println!("  Total records:  {}", style(stats.total_records).cyan());
    println!(
        "  Database size:  {} KB",
        style(stats.db_size_bytes / 1024).cyan()
    );

    if !stats.by_prefix.is_empty() {
        println!();
        println!("  {}", style("By Type:").bold());
        let mut prefixes: Vec<_> = stats.by_prefix.iter().collect();
        prefixes.sort_by_key(|(k, _)| *k);
        for (prefix, count) in prefixes {
            println!("    {:<6} {}", prefix, count);
        }
    }

    Ok(())
}

fn run_clear(project: &Project) -> Result<()> {
    let cache_path = RecordCache::location(project);

    if !cache_path.exists() {
        println!("No cache to clear");
        return Ok(());
    }

    std::fs::remove_file(&cache_path)
        .map_err(|e| miette::miette!("Failed to remove cache: {}", e))?;

    // WAL, shared-memory and journal files
    for suffix in ["-wal", "-shm", "-journal"] {
        let mut side = cache_path.clone().into_os_string();
        side.push(suffix);
        let _ = std::fs::remove_file(side);
    }

    println!("{} Cache cleared", style("✓").green());
    Ok(())
}
