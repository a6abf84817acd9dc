//! API token credential
//!
//! Resolution order: explicit config token, then environment token, else
//! `Error::MissingCredential`. Tokens are never validated here; a bad token
//! surfaces later as a 401 from the API.

use crate::error::{Error, Result};
use crate::types::OptionStringExt;
use reqwest::RequestBuilder;

/// Prefix PagerDuty expects in front of REST API tokens
const TOKEN_PREFIX: &str = "Token token=";

/// Where a credential was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Connection config
    Config,
    /// Environment variable
    Environment,
}

/// A resolved API token
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    source: CredentialSource,
}

impl Credential {
    /// Create a credential
    pub fn new(token: impl Into<String>, source: CredentialSource) -> Self {
        Self {
            token: token.into(),
            source,
        }
    }

    /// The raw token
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Where the token came from
    pub fn source(&self) -> CredentialSource {
        self.source
    }

    /// Value for the `Authorization` header
    pub fn header_value(&self) -> String {
        format!("{TOKEN_PREFIX}{}", self.token)
    }

    /// Apply the credential to a request builder
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        req.header(reqwest::header::AUTHORIZATION, self.header_value())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Resolve a credential from config and environment, config first
pub fn resolve_credential(
    config_token: Option<String>,
    env_token: Option<String>,
) -> Result<Credential> {
    if let Some(token) = config_token.none_if_empty() {
        return Ok(Credential::new(token, CredentialSource::Config));
    }

    if let Some(token) = env_token.none_if_empty() {
        return Ok(Credential::new(token, CredentialSource::Environment));
    }

    Err(Error::missing_credential("token must be configured"))
}
