//! Input validation for branch names, tokens and remote URLs.

use crate::{
    errors::{StError, StResult},
    host::RepoSlug,
};
use once_cell::sync::Lazy;
use regex::Regex;

/// Patterns a git branch name may not match.
static INVALID_BRANCH_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\.\.",
        r"^[./]",
        r"/$",
        r"\.lock$",
        r"@\{",
        r"[\x00-\x1f\x7f]",
        r"[~^:?*\[\\\]]",
        r"\s",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("static pattern is valid"))
    .collect()
});

static GITHUB_HTTPS_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"github\.com/([^/]+)/([^/.]+)(\.git)?$").expect("static pattern is valid")
});

static GITHUB_SSH_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"github\.com:([^/]+)/([^/.]+)(\.git)?$").expect("static pattern is valid")
});

/// The minimum length of a GitHub token.
const MIN_TOKEN_LENGTH: usize = 20;

/// Validates that `name` is usable as a git branch name.
pub fn validate_branch_name(name: &str) -> StResult<()> {
    if name.trim().is_empty() {
        return Err(StError::EmptyBranchName);
    }

    if INVALID_BRANCH_PATTERNS.iter().any(|p| p.is_match(name)) {
        return Err(StError::InvalidBranchName(name.to_string()));
    }

    Ok(())
}

/// Validates the format of a GitHub token. This does not check that the token is accepted.
pub fn validate_github_token(token: &str) -> StResult<()> {
    if token.trim().is_empty() {
        return Err(StError::InvalidToken("token cannot be empty".to_string()));
    }
    if token.len() < MIN_TOKEN_LENGTH {
        return Err(StError::InvalidToken("invalid token format".to_string()));
    }
    Ok(())
}

/// Parses the owner and repository name out of a GitHub HTTPS or SSH remote URL.
///
/// ## Returns
/// - `Some(slug)` - The URL points at a GitHub repository.
/// - `None` - The URL is not a recognizable GitHub URL.
pub fn parse_github_url(url: &str) -> Option<RepoSlug> {
    let captures = GITHUB_HTTPS_URL
        .captures(url)
        .or_else(|| GITHUB_SSH_URL.captures(url))?;
    Some(RepoSlug::new(&captures[1], &captures[2]))
}
