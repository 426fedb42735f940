use escrow_protocol::{token_list::TokenLookup, EscrowRecord};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    program_pack::Pack,
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair},
};
use spl_token::{
    amount_to_ui_amount,
    state::{Account, Mint},
};
use std::str::FromStr;
use tracing::debug;

use crate::error::EscrowCliError;

/// Lamports needed to cover transaction fees.
pub const MIN_FEE_BALANCE: u64 = 5_000_000;
const MS_PER_HOUR: u64 = 60 * 60 * 1000;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

//Connect to Solana Network
/// Create RPC client for the specified network
pub fn connect_to_network(network: &str) -> Result<RpcClient, EscrowCliError> {
    let url = match network {
        "devnet" => "https://api.devnet.solana.com",
        "testnet" => "https://api.testnet.solana.com",
        "mainnet" => "https://api.mainnet-beta.solana.com",
        "localhost" => "http://localhost:8899",
        custom => custom,
    };
    // Create RPC client with "confirmed" commitment level
    Ok(RpcClient::new_with_commitment(
        url.to_string(),
        CommitmentConfig::confirmed(),
    ))
}

/// Load wallet keypair from file
pub fn get_wallet(path: &str) -> Result<Keypair, EscrowCliError> {
    debug!(path, "loading wallet");
    read_keypair_file(path)
        .map_err(|e| EscrowCliError::WalletLoad(format!("Failed to read keypair: {}", e)))
}

pub fn parse_pubkey(value: &str, what: &str) -> Result<Pubkey, EscrowCliError> {
    Pubkey::from_str(value)
        .map_err(|e| EscrowCliError::InvalidPubkey(format!("{} `{}`: {}", what, value, e)))
}

/// Check SOL balance of a wallet
pub async fn check_sol_balance(client: &RpcClient, wallet: &Pubkey) -> Result<u64, EscrowCliError> {
    client
        .get_balance(wallet)
        .await
        .map_err(|e| EscrowCliError::RpcError(format!("Failed to get balance: {}", e)))
}

/// Fails unless `wallet` can pay transaction fees.
pub async fn ensure_fee_balance(client: &RpcClient, wallet: &Pubkey) -> Result<(), EscrowCliError> {
    let balance = check_sol_balance(client, wallet).await?;
    if balance < MIN_FEE_BALANCE {
        eprintln!("You need at least 0.005 SOL for transaction fees");
        return Err(EscrowCliError::InsufficientSol {
            needed: MIN_FEE_BALANCE,
            actual: balance,
        });
    }
    Ok(())
}

/// Check if token account exists and has sufficient balance
pub async fn check_token_account(
    client: &RpcClient,
    account: &Pubkey,
    required_amount: u64,
) -> Result<u64, EscrowCliError> {
    let result = client
        .get_account(account)
        .await
        .map_err(|_| EscrowCliError::TokenAccountNotFound(account.to_string()))?;
    let token_account = Account::unpack(&result.data).map_err(|e| {
        EscrowCliError::TokenAccountNotFound(format!("Failed to unpack token account: {}", e))
    })?;
    if token_account.amount < required_amount {
        return Err(EscrowCliError::InsufficientTokens {
            needed: required_amount,
            actual: token_account.amount,
        });
    }
    Ok(token_account.amount)
}

/// Decimals of `mint`, preferring the static list over a network read.
pub async fn mint_decimals(
    client: &RpcClient,
    tokens: &impl TokenLookup,
    mint: &Pubkey,
) -> Result<u8, EscrowCliError> {
    if let Some(info) = tokens.lookup(mint) {
        return Ok(info.decimals);
    }
    let mint_account = client
        .get_account(mint)
        .await
        .map_err(|e| EscrowCliError::TokenAccountNotFound(format!("Mint {} not found: {}", mint, e)))?;
    let mint_data = Mint::unpack(&mint_account.data).map_err(|e| {
        EscrowCliError::TokenAccountNotFound(format!("Failed to parse mint {}: {}", mint, e))
    })?;
    Ok(mint_data.decimals)
}

/// Both sides of an offer in display units.
pub async fn display_amounts(
    client: &RpcClient,
    tokens: &impl TokenLookup,
    escrow: &EscrowRecord,
) -> Result<(f64, f64), EscrowCliError> {
    let decimals_a = mint_decimals(client, tokens, &escrow.token_a).await?;
    let decimals_b = mint_decimals(client, tokens, &escrow.token_b).await?;
    Ok((
        amount_to_ui_amount(escrow.amount_a, decimals_a),
        amount_to_ui_amount(escrow.amount_b, decimals_b),
    ))
}

/// "3d 4h", "5h", or "Expired".
pub fn format_time_remaining(remaining_ms: u64) -> String {
    if remaining_ms == 0 {
        return "Expired".to_string();
    }
    let days = remaining_ms / MS_PER_DAY;
    let hours = (remaining_ms % MS_PER_DAY) / MS_PER_HOUR;
    if days > 0 {
        format!("{}d {}h", days, hours)
    } else {
        format!("{}h", hours)
    }
}

pub fn explorer_tx_url(signature: &impl std::fmt::Display, network: &str) -> String {
    format!(
        "https://explorer.solana.com/tx/{}?cluster={}",
        signature, network
    )
}

pub fn explorer_address_url(address: &Pubkey, network: &str) -> String {
    format!(
        "https://explorer.solana.com/address/{}?cluster={}",
        address, network
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_remaining_formats() {
        assert_eq!(format_time_remaining(0), "Expired");
        assert_eq!(format_time_remaining(5 * MS_PER_HOUR + 1), "5h");
        assert_eq!(format_time_remaining(3 * MS_PER_DAY + 4 * MS_PER_HOUR), "3d 4h");
    }
}
