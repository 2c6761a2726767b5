use serde::Deserialize;

/// A public repository as returned by `GET /users/{username}/repos`.
/// Only the fields the collector needs are kept; the rest are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    /// Repository name, unique within the owner's account
    pub name: String,
    /// Web URL of the repository, when the listing provides one
    #[serde(default)]
    pub html_url: Option<String>,
}

/// A commit as returned by `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Commit {
    /// Web URL of the commit. Appending `.patch` gives its patch text.
    pub html_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_ignores_unknown_fields() {
        let json = r#"[{"id": 1, "name": "repo1", "html_url": "https://github.com/acme/repo1", "fork": false}]"#;
        let repos: Vec<Repository> = serde_json::from_str(json).unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].name, "repo1");
        assert_eq!(repos[0].html_url.as_deref(), Some("https://github.com/acme/repo1"));
    }

    #[test]
    fn test_commit_from_listing() {
        let json = r#"[{"sha": "abc", "html_url": "https://github.com/acme/repo1/commit/abc", "commit": {"message": "init"}}]"#;
        let commits: Vec<Commit> = serde_json::from_str(json).unwrap();
        assert_eq!(commits[0].html_url, "https://github.com/acme/repo1/commit/abc");
    }

    #[test]
    fn test_repository_without_html_url() {
        let json = r#"[{"name": "repo1"}, {"name": "repo2", "html_url": null}]"#;
        let repos: Vec<Repository> = serde_json::from_str(json).unwrap();
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].name, "repo1");
        assert!(repos[0].html_url.is_none());
        assert!(repos[1].html_url.is_none());
    }

    #[test]
    fn test_repository_missing_name_is_rejected() {
        let json = r#"[{"html_url": "https://github.com/acme/repo1"}]"#;
        assert!(serde_json::from_str::<Vec<Repository>>(json).is_err());
    }
}
