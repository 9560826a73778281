// octopulse command line.
// Runs one aggregate against the GitHub API and prints it as JSON.

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use octopulse::{Config, GitHubInsights, InsightsError};

#[derive(Parser)]
#[command(name = "octopulse", version, about = "GitHub repository and profile insights")]
struct Cli {
    /// GitHub token (defaults to GITHUB_TOKEN)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// User for per-user commands when none is given (defaults to GITHUB_USERNAME)
    #[arg(long, env = "GITHUB_USERNAME")]
    user: Option<String>,

    /// Print the rate limit state after the command
    #[arg(long)]
    rate_limit: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Repository metadata, commits, contributors, languages, and releases
    Repo {
        /// Repository as owner/name
        full_name: String,
    },
    /// Recent commits, pull requests, issues, and activity feed
    Activity { username: Option<String> },
    /// 365-day contribution calendar with streaks
    Contributions { username: Option<String> },
    /// Star, fork, and language rollups
    Stats { username: Option<String> },
}

#[tokio::main]
async fn main() {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("octopulse=info"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> octopulse::Result<()> {
    let mut config = Config::from_env();
    if let Some(token) = cli.token {
        config.token = token;
    }
    if cli.user.is_some() {
        config.default_username = cli.user;
    }

    if !config.is_authenticated() {
        tracing::warn!("No GITHUB_TOKEN set, using the anonymous rate limit");
    }

    let insights = GitHubInsights::from_config(&config)?;

    match cli.command {
        Command::Repo { full_name } => {
            let data = insights.get_repo_data(&full_name).await?;
            print_json(&data)?;
            for share in data.language_shares() {
                tracing::info!("{}: {:.1}%", share.language, share.percent);
            }
        }
        Command::Activity { username } => {
            print_json(&insights.get_user_activity(username.as_deref()).await?)?;
        }
        Command::Contributions { username } => {
            print_json(&insights.get_contribution_data(username.as_deref()).await?)?;
        }
        Command::Stats { username } => {
            print_json(&insights.get_github_stats(username.as_deref()).await?)?;
        }
    }

    if cli.rate_limit {
        print_json(&insights.rate_limit_info())?;
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), InsightsError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
