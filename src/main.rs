mod collect;
mod config;
mod github;
mod patch;
mod report;

use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info, info_span};
use tracing_subscriber::EnvFilter;

/// patchfinder: search a GitHub user's repositories' commit patches to
/// identify unique names and email addresses.
#[derive(Parser, Debug)]
#[command(name = "patchfinder", version, about)]
struct Cli {
    /// GitHub username whose repositories' commit patches will be searched
    username: String,

    /// GitHub API token for the REST API
    api_token: String,

    /// Only report commits whose patch leaks this email address
    #[arg(long, value_name = "EMAIL", value_parser = NonEmptyStringValueParser::new())]
    search_email: Option<String>,

    /// Config file to use instead of ./.patchfinder.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Do not print the banner
    #[arg(long)]
    no_banner: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let _main_span = info_span!("patchfinder", username = %cli.username).entered();

    let mut stdout = std::io::stdout();
    match run(&cli, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

/// Load config, build the client and run the selected search mode,
/// streaming results to `out`. Any error returned here is fatal.
async fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<(), Box<dyn std::error::Error>> {
    info!("loading configuration");
    let config = config::Config::load(cli.config.as_deref())?;
    debug!(api_url = %config.github.api_url, timeout_secs = config.http.timeout_secs, max_retries = config.http.max_retries, "loaded configuration");

    let client = github::GitHubClient::new(&cli.api_token, &config)?;

    if !cli.no_banner {
        report::write_banner(out)?;
    }

    match cli.search_email.as_deref() {
        Some(email) => {
            let matches = collect::search_email(&client, &cli.username, email, out).await?;
            info!(matches = matches.len(), "done");
        }
        None => {
            let identities = collect::collect_identities(&client, &cli.username, out).await?;
            info!(identities = identities.len(), "done");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_positional_arguments() {
        let cli = Cli::try_parse_from(["patchfinder", "acme", "ghp_token"]).unwrap();
        assert_eq!(cli.username, "acme");
        assert_eq!(cli.api_token, "ghp_token");
        assert!(cli.search_email.is_none());
        assert!(cli.config.is_none());
        assert!(!cli.no_banner);
    }

    #[test]
    fn test_cli_search_email() {
        let cli = Cli::try_parse_from([
            "patchfinder",
            "acme",
            "ghp_token",
            "--search-email",
            "jane@example.com",
        ])
        .unwrap();
        assert_eq!(cli.search_email.as_deref(), Some("jane@example.com"));
    }

    #[test]
    fn test_cli_requires_token() {
        assert!(Cli::try_parse_from(["patchfinder", "acme"]).is_err());
    }

    #[test]
    fn test_cli_rejects_empty_email() {
        assert!(Cli::try_parse_from(["patchfinder", "acme", "t", "--search-email", ""]).is_err());
    }

    #[tokio::test]
    async fn test_run_reports_missing_config_file() {
        let path = std::env::temp_dir().join("patchfinder_main_missing.toml");
        let cli = Cli::try_parse_from([
            "patchfinder",
            "acme",
            "token",
            "--config",
            path.to_str().unwrap(),
        ])
        .unwrap();
        let mut out = Vec::new();
        let err = run(&cli, &mut out).await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to read config file: "));
        assert!(out.is_empty());
    }

    #[test]
    fn test_fatal_error_message_is_readable() {
        let err: Box<dyn std::error::Error> = Box::new(collect::CollectError::RepositoryListing {
            username: "ghost".to_string(),
            source: github::GitHubError::Status {
                url: "https://api.github.com/users/ghost/repos".to_string(),
                status: reqwest::StatusCode::NOT_FOUND,
            },
        });
        assert_eq!(
            err.to_string(),
            "Failed to list public repositories for ghost: \
             GitHub API returned 404 Not Found for https://api.github.com/users/ghost/repos"
        );
    }
}
