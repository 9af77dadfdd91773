use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;
use tracklite::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(global.verbose);

    match cli.command {
        Commands::Init(args) => tracklite::cli::commands::init::run(args),
        Commands::Track(args) => tracklite::cli::commands::track::run(args, &global),
        Commands::Seed(args) => tracklite::cli::commands::seed::run(args, &global),
        Commands::Status(args) => tracklite::cli::commands::status::run(args, &global),
        Commands::Cache(cmd) => tracklite::cli::commands::cache::run(cmd, &global),
        Commands::Completions(args) => tracklite::cli::commands::completions::run(args),
    }
}

/// Diagnostics go to stderr; `TRACKLITE_LOG` overrides the level
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("TRACKLITE_LOG").unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
