//! Authentication module
//!
//! PagerDuty REST calls authenticate with an account or user API token sent
//! as `Authorization: Token token=<token>`. The token comes from explicit
//! connection config first, then from the environment.

mod credential;

pub use credential::{resolve_credential, Credential, CredentialSource};
