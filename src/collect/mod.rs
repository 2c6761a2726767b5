use std::collections::HashSet;
use std::io::Write;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::github::{Commit, GitHubApi, GitHubError, Repository};
use crate::patch;
use crate::report::{self, MatchRecord};

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("Failed to list public repositories for {username}: {source}")]
    RepositoryListing {
        username: String,
        source: GitHubError,
    },

    #[error("Failed to write results: {0}")]
    Output(#[from] std::io::Error),
}

/// Walk repositories, then each repository's commits, in listing order,
/// and hand every commit's identity line to `visit`.
///
/// Only the repository listing is fatal. A repository whose commits cannot
/// be listed, or a commit whose patch cannot be fetched, is logged and
/// skipped. Commits whose patch has no identity line are skipped quietly.
async fn walk_identity_lines<F>(
    api: &dyn GitHubApi,
    username: &str,
    mut visit: F,
) -> Result<(), CollectError>
where
    F: FnMut(&Repository, &Commit, &str) -> Result<(), CollectError>,
{
    let repos = api
        .list_repositories(username)
        .await
        .map_err(|source| CollectError::RepositoryListing {
            username: username.to_string(),
            source,
        })?;

    if repos.is_empty() {
        warn!(username, "user has no public repositories");
        return Ok(());
    }
    info!(repositories = repos.len(), "searching repositories");

    for repo in &repos {
        let commits = match api.list_commits(username, &repo.name).await {
            Ok(commits) => commits,
            Err(error) => {
                warn!(repository = %repo.name, %error, "failed to list commits, skipping repository");
                continue;
            }
        };
        debug!(repository = %repo.name, html_url = ?repo.html_url, commits = commits.len(), "listed commits");

        for commit in &commits {
            let patch_text = match api.fetch_patch(&commit.html_url).await {
                Ok(text) => text,
                Err(error) => {
                    warn!(commit_url = %commit.html_url, %error, "failed to fetch patch, skipping commit");
                    continue;
                }
            };

            match patch::identity_line(&patch_text) {
                Some(line) => visit(repo, commit, line)?,
                None => debug!(commit_url = %commit.html_url, "patch has no identity line"),
            }
        }
    }

    Ok(())
}

/// "All unique identities" mode.
///
/// Each identity (the patch's `From:` line, prefix stripped) is written to
/// `out` the first time it is seen. Returns the unique identities in the
/// order they were first seen.
#[instrument(skip(api, out))]
pub async fn collect_identities<W: Write>(
    api: &dyn GitHubApi,
    username: &str,
    out: &mut W,
) -> Result<Vec<String>, CollectError> {
    let mut seen = HashSet::new();
    let mut identities = Vec::new();

    walk_identity_lines(api, username, |_, _, line| {
        let identity = patch::strip_from_prefix(line);
        if seen.insert(identity.to_string()) {
            report::write_identity(out, identity)?;
            identities.push(identity.to_string());
        }
        Ok(())
    })
    .await?;

    info!(identities = identities.len(), "search complete");
    Ok(identities)
}

/// "Targeted email search" mode.
///
/// Every commit whose identity line contains `email` (literal,
/// case-sensitive) yields a [`MatchRecord`], written to `out` as soon as
/// it is found. No deduplication: each matching commit is reported.
#[instrument(skip(api, out))]
pub async fn search_email<W: Write>(
    api: &dyn GitHubApi,
    username: &str,
    email: &str,
    out: &mut W,
) -> Result<Vec<MatchRecord>, CollectError> {
    let mut matches = Vec::new();

    walk_identity_lines(api, username, |repo, commit, line| {
        if line.contains(email) {
            let record = MatchRecord {
                repository: repo.name.clone(),
                commit_url: commit.html_url.clone(),
            };
            report::write_match(out, &record)?;
            matches.push(record);
        }
        Ok(())
    })
    .await?;

    info!(matches = matches.len(), "search complete");
    Ok(matches)
}
