/// One commit whose identity line leaks the searched email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    /// Name of the repository the commit belongs to
    pub repository: String,
    /// Web URL of the matching commit
    pub commit_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_record_equality() {
        let a = MatchRecord {
            repository: "repo1".to_string(),
            commit_url: "https://github.com/acme/repo1/commit/abc".to_string(),
        };
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(
            a,
            MatchRecord {
                repository: "repo2".to_string(),
                ..b
            }
        );
    }
}
