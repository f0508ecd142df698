//! Subcommand implementations.

pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// Missing configuration shared by every command.
#[derive(Debug, thiserror::Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVar(pub &'static str);

/// `CRAFTCART_DATABASE_URL`, falling back to `DATABASE_URL`.
///
/// Reads `.env` first when present.
///
/// # Errors
///
/// `MissingEnvVar` when neither variable is set.
pub fn database_url() -> Result<SecretString, MissingEnvVar> {
    dotenvy::dotenv().ok();

    std::env::var("CRAFTCART_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MissingEnvVar("CRAFTCART_DATABASE_URL"))
}
