use crate::commands::{run_markets, run_quick, run_score, MarketsArgs, QuickArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use portability_score::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "portability-api",
    about = "Score banker book portability from the command line or over HTTP",
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
    /// Score a full readiness profile against its booking centres
    Score(ScoreArgs),
    /// Estimate a score from the market factor alone
    Quick(QuickArgs),
    /// List registered markets grouped by region
    Markets(MarketsArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Quick(args) => run_quick(args),
        Command::Markets(args) => run_markets(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_accepts_repeated_centres() {
        let cli = Cli::try_parse_from([
            "portability-api",
            "score",
            "--market",
            "uae_dubai",
            "--centre",
            "Dubai (DIFC)",
            "--centre",
            "Geneva",
            "--aum-mix",
            "3",
            "--cross-border-licenses",
            "1",
            "--product-scope",
            "2",
            "--client-concentration",
            "3",
            "--kyc-portability",
            "1",
            "--json",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Score(args)) => {
                assert_eq!(args.market, "uae_dubai");
                assert_eq!(args.centres, ["Dubai (DIFC)", "Geneva"]);
                assert!(args.json);
            }
            other => panic!("expected score command, got {other:?}"),
        }
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["portability-api"]).expect("arguments parse");
        assert!(cli.command.is_none());
    }

    #[test]
    fn quick_requires_every_grade() {
        let result = Cli::try_parse_from([
            "portability-api",
            "quick",
            "--market",
            "uk_london",
            "--aum-mix",
            "3",
        ]);
        assert!(result.is_err());
    }
}
