use escrow_protocol::token_list::StaticTokenList;
use solana_sdk::pubkey::Pubkey;
use std::{env, str::FromStr, time::Duration};

use crate::error::EscrowCliError;

pub const DEFAULT_PROGRAM_ID: &str = "3ZSratuRHNTmgE9YHA6HanPGkBU1wfDT1ZgwqfsyC1yy";
pub const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Settings read from the environment (and `.env`, loaded by `main`).
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub program_id: Pubkey,
    pub confirm_timeout: Duration,
    pub history_limit: usize,
}

impl CliConfig {
    pub fn from_env() -> Result<Self, EscrowCliError> {
        let program_id_str =
            env::var("ESCROW_PROGRAM_ID").unwrap_or_else(|_| DEFAULT_PROGRAM_ID.to_string());
        let program_id = Pubkey::from_str(&program_id_str).map_err(|e| {
            EscrowCliError::Config(format!("ESCROW_PROGRAM_ID `{}`: {}", program_id_str, e))
        })?;
        let confirm_timeout = Duration::from_secs(parse_var(
            "ESCROW_CONFIRM_TIMEOUT_SECS",
            DEFAULT_CONFIRM_TIMEOUT_SECS,
        )?);
        let history_limit = parse_var("ESCROW_HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT)?;
        Ok(Self {
            program_id,
            confirm_timeout,
            history_limit,
        })
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, EscrowCliError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|e| EscrowCliError::Config(format!("{} `{}`: {}", name, value, e))),
        Err(_) => Ok(default),
    }
}

/// Mints the CLI can label without asking the network.
pub fn known_tokens() -> StaticTokenList {
    let mut list = StaticTokenList::new();
    for (mint, symbol, decimals) in [
        ("So11111111111111111111111111111111111111112", "SOL", 9),
        ("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", "USDC", 6),
        ("Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB", "USDT", 6),
    ] {
        if let Ok(mint) = Pubkey::from_str(mint) {
            list.insert(mint, symbol, decimals);
        }
    }
    list
}
