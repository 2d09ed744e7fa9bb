use crate::commands::{run_match, run_transitions, MatchArgs, TransitionsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use yardline::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Yardline",
    about = "Run the Yardline job service or inspect lifecycle and matching from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the job lifecycle transition table
    Transitions(TransitionsArgs),
    /// Rank landscapers from a roster CSV for a job location
    Match(MatchArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Seed the candidate directory from this roster CSV
    #[arg(long)]
    pub(crate) roster: Option<std::path::PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Transitions(args) => {
            run_transitions(args);
            Ok(())
        }
        Command::Match(args) => run_match(args),
    }
}
