//! # wssec-verify
//!
//! Verify a signed SOAP message against an Ed25519 key and print the
//! resulting claims.
//!
//! ```text
//! wssec-verify [--config FILE] [--identity DNS] [--key-name NAME] MESSAGE PUBKEY_HEX
//! ```
//!
//! `WSSEC_*` environment variables override the config file.

use anyhow::{Context, Result};
use clap::Parser;
use security_runtime::{init_tracing, SecurityConfig, SecurityPipeline, SecurityToken};
use shared_crypto::Ed25519PublicKey;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use ws_02_claims::WellKnownClaimSets;
use ws_03_endpoint_identity::EndpointIdentity;

/// wssec-verify: check a signed SOAP message and print its claims
#[derive(Parser, Debug)]
#[command(name = "wssec-verify", version)]
#[command(about = "Verify a signed SOAP message against an Ed25519 key")]
struct Args {
    /// JSON config file (WSSEC_* variables still override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// DNS identity of the signer
    #[arg(long, default_value = "localhost")]
    identity: String,

    /// Key name the signature must carry in its KeyInfo
    #[arg(long)]
    key_name: Option<String>,

    /// Signed message to verify
    message: PathBuf,

    /// Ed25519 public key as 64 hex characters
    public_key: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SecurityConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SecurityConfig::default(),
    }
    .with_env_overrides()
    .context("applying WSSEC_* overrides")?;

    init_tracing(&config.log_level).context("initializing tracing")?;

    let message = std::fs::read(&args.message)
        .with_context(|| format!("reading message {}", args.message.display()))?;
    let key_bytes: [u8; 32] = hex::decode(args.public_key.trim())
        .context("public key is not hex")?
        .try_into()
        .map_err(|bytes: Vec<u8>| anyhow::anyhow!("expected 32 key bytes, got {}", bytes.len()))?;
    let public_key = Ed25519PublicKey::from_bytes(key_bytes).context("invalid Ed25519 key")?;

    let identity = EndpointIdentity::dns(&args.identity);
    let token = SecurityToken::principal(identity, args.key_name, Arc::new(public_key));

    let pipeline = SecurityPipeline::new(config, Arc::new(WellKnownClaimSets::new()));
    let security = pipeline
        .authenticate(&message, &token)
        .context("message rejected")?;

    info!(context = security.authorization_context().id(), "message accepted");
    for set in security.claim_sets() {
        println!("{}", set.describe()?);
    }
    println!("expires: {}", security.expiration_time().to_rfc3339());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("wssec-verify").chain(list.iter().copied()))
    }

    #[test]
    fn test_parse_flags_and_positionals() {
        let parsed = args(&["--identity", "svc.example", "msg.xml", "00ff"]).unwrap();
        assert_eq!(parsed.identity, "svc.example");
        assert_eq!(parsed.message, PathBuf::from("msg.xml"));
        assert_eq!(parsed.public_key, "00ff");
        assert!(parsed.config.is_none());
        assert!(parsed.key_name.is_none());
    }

    #[test]
    fn test_identity_defaults_to_localhost() {
        let parsed = args(&["--key-name", "alice", "msg.xml", "00ff"]).unwrap();
        assert_eq!(parsed.identity, "localhost");
        assert_eq!(parsed.key_name.as_deref(), Some("alice"));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(args(&["msg.xml"]).is_err());
        assert!(args(&["--bogus", "a", "b"]).is_err());
        assert!(args(&["a", "b", "--config"]).is_err());
    }

    #[test]
    fn test_command_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
