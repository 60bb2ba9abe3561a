use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use homebase::commands;
use homebase::error::AppError;
use homebase::AppContext;

/// Homebase - personal/business automation toolkit.
#[derive(Debug, Parser)]
#[command(name = "homebase")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file path. Defaults to `<data_dir>/homebase.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (ledger database, default input location).
    #[arg(long, global = true, env = "HOMEBASE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Where dated artifacts are written. Defaults to `<data_dir>/output`.
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Skip sends and ledger writes; artifacts are still produced.
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate review-request drafts from an order export.
    Reviews(commands::reviews::ReviewsArgs),
    /// Analyze campaign performance and recommend bid actions.
    Ppc(commands::ppc::PpcArgs),
    /// Generate (and optionally send) the morning briefing.
    Briefing(commands::briefing::BriefingArgs),
    /// List today's reminders or send the ones due now.
    Reminders(commands::reminders::RemindersArgs),
    /// Run one natural-language command.
    Ask(commands::ask::AskArgs),
}

fn run(cli: Cli) -> Result<(), AppError> {
    let ctx = AppContext::init(cli.config, cli.data_dir, cli.output_dir, cli.dry_run)?;

    match &cli.command {
        Commands::Reviews(args) => commands::reviews::execute(&ctx, args),
        Commands::Ppc(args) => commands::ppc::execute(&ctx, args),
        Commands::Briefing(args) => commands::briefing::execute(&ctx, args),
        Commands::Reminders(args) => commands::reminders::execute(&ctx, args),
        Commands::Ask(args) => commands::ask::execute(&ctx, args),
    }
}

fn main() -> ExitCode {
    homebase::logging::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, kind = e.kind(), "run failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
