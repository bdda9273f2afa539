//! oidc-id-token: validate OpenID Connect ID tokens from the command line
//!
//! Builds a validator from configuration (flags, config file, then
//! environment) and either validates a token or lists the provider's keys.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};
use oidc_id_token::{Config, TokenValidator};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "oidc-id-token")]
#[command(about = "Validate OpenID Connect ID tokens against a provider's signing keys")]
#[command(version)]
struct Cli {
    /// Identity provider (defaults to config file or OIDC_PROVIDER)
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Expected audience (defaults to config file or OIDC_CLIENT_ID)
    #[arg(long, global = true)]
    client_id: Option<String>,

    /// Discovery timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a token and print its claims as JSON
    Validate {
        /// The ID token; read from stdin when omitted
        token: Option<String>,
    },

    /// List the provider's signing keys
    Keys,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("oidc_id_token=info".parse()?)
                .add_directive("id_token_cli=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli, &Config::default_config_path())?;

    let validator = config
        .build_validator()
        .with_context(|| format!("failed to build validator for provider '{}'", config.provider))?;

    match cli.command {
        Commands::Validate { token } => run_validate(&validator, token),
        Commands::Keys => run_keys(&validator),
    }
}

/// Flags win over the config file, which wins over the environment.
///
/// Without a config file the environment supplies every field it sets, so
/// `--provider` alone keeps `OIDC_CLIENT_ID` and `OIDC_HTTP_TIMEOUT_SECS`.
fn resolve_config(cli: &Cli, config_path: &Path) -> anyhow::Result<Config> {
    let mut config = if config_path.exists() {
        Config::from_file(config_path)
            .with_context(|| format!("failed to load {}", config_path.display()))?
    } else {
        Config::from_env_or_default().context("invalid environment configuration")?
    };

    if let Some(provider) = &cli.provider {
        config.provider = provider.clone();
    }
    if let Some(client_id) = &cli.client_id {
        config.client_id = client_id.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.http_timeout_secs = timeout;
    }

    if config.provider.is_empty() {
        anyhow::bail!("no provider configured; pass --provider or set OIDC_PROVIDER");
    }

    Ok(config)
}

fn run_validate(validator: &TokenValidator, token: Option<String>) -> anyhow::Result<()> {
    let token = match token {
        Some(token) => token,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read token from stdin")?;
            buf
        }
    };

    match validator.validate(token.trim()) {
        Ok(claims) => {
            info!(subject = claims.sub.as_deref().unwrap_or(""), "Token is valid");
            println!("{}", serde_json::to_string_pretty(&claims.raw_claims)?);
            Ok(())
        }
        Err(e) => {
            error!(kind = e.kind(), "Token rejected: {}", e);
            Err(e.into())
        }
    }
}

fn run_keys(validator: &TokenValidator) -> anyhow::Result<()> {
    if let Some(issuer) = validator.issuer() {
        println!("issuer: {}", issuer);
    }
    for key in validator.key_set().keys() {
        println!(
            "{}\t{}\t{}",
            key.kid,
            key.kty,
            key.alg.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
