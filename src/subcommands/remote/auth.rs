//! `auth` subcommand.

use crate::{
    config::StConfig,
    errors::{StError, StResult},
    host::{CodeHost, GitHubHost},
    output,
    validate::validate_github_token,
};
use clap::Args;
use nu_ansi_term::Color;
use tracing::debug;

/// CLI arguments for the `auth` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct AuthCmd {
    /// GitHub personal access token.
    #[clap(short, long)]
    token: Option<String>,
    /// Remove the stored token.
    #[clap(long, conflicts_with = "token")]
    logout: bool,
}

impl AuthCmd {
    /// Run the `auth` subcommand.
    pub async fn run(self) -> StResult<()> {
        let mut config = StConfig::load()?;

        if self.logout {
            config.github_token = None;
            config.save()?;
            output::success("Logged out. Token removed.");
            return Ok(());
        }

        let Some(token) = self.token else {
            // Report the current user if the stored token still works.
            if let Some(existing) = config.github_token.as_deref() {
                match GitHubHost::new(existing)?.authenticated_user().await {
                    Ok(user) => {
                        output::success(format!(
                            "Already authenticated as `{}`.",
                            Color::Blue.paint(user.login)
                        ));
                        return Ok(());
                    }
                    Err(e) => {
                        debug!(error = %e, "stored token rejected");
                        output::warn("Existing token is invalid. Please provide a new token.");
                    }
                }
            }
            output::detail("Create a token at https://github.com/settings/tokens");
            return Err(StError::NotAuthenticated);
        };

        validate_github_token(&token)?;
        let user = GitHubHost::new(&token)?.authenticated_user().await?;

        config.github_token = Some(token);
        config.save()?;

        output::success(format!(
            "Authenticated as `{}`.",
            Color::Blue.paint(user.login)
        ));
        output::info("Token stored.");
        Ok(())
    }
}
