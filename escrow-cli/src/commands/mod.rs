pub mod cancel;
pub mod create;
pub mod history;
pub mod list;
pub mod take;
pub mod update;
pub mod view;

use colored::*;
use escrow_protocol::{
    token_list::StaticTokenList, EscrowClient, EscrowError, EscrowRecord, InstructionBundle,
};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use std::sync::Arc;

use crate::{
    config::{known_tokens, CliConfig},
    error::EscrowCliError,
    helper::explorer_tx_url,
    rpc::{KeypairSigner, RpcNetwork},
};

/// Everything a command needs to talk to one cluster.
pub struct CommandContext {
    pub cluster: String,
    pub client: Arc<RpcClient>,
    pub network: RpcNetwork,
    pub escrow: EscrowClient,
    pub tokens: StaticTokenList,
    pub config: CliConfig,
}

impl CommandContext {
    pub fn new(cluster: &str, client: RpcClient, config: CliConfig) -> Self {
        let client = Arc::new(client);
        Self {
            cluster: cluster.to_string(),
            network: RpcNetwork::new(Arc::clone(&client), config.confirm_timeout),
            escrow: EscrowClient::new(config.program_id),
            tokens: known_tokens(),
            client,
            config,
        }
    }

    /// Fetches the escrow at `address`; a missing account is an error here
    /// because the command needs a live record to act on.
    pub async fn live_escrow(&self, address: &Pubkey) -> Result<EscrowRecord, EscrowCliError> {
        self.escrow
            .fetch_escrow(&self.network, address)
            .await?
            .ok_or_else(|| EscrowCliError::EscrowNotFound(address.to_string()))
    }

    /// Signs, submits and confirms `bundle`.
    pub async fn submit(
        &self,
        signer: &KeypairSigner,
        bundle: &InstructionBundle,
    ) -> Result<Signature, EscrowCliError> {
        println!("  Sending transaction...");
        match self.escrow.submit(signer, &self.network, bundle).await {
            Ok(signature) => Ok(signature),
            Err(EscrowError::SubmissionUnknown { signature }) => {
                eprintln!(
                    "{}",
                    "Confirmation not observed in time. Check the escrow with `view` before retrying."
                        .yellow()
                );
                eprintln!("  Transaction: {}", explorer_tx_url(&signature, &self.cluster));
                Err(EscrowError::SubmissionUnknown { signature }.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

pub(crate) fn print_banner(title: &str, color: Color) {
    let rule = "═══════════════════════════════════";
    println!("\n{}", rule.bold().color(color));
    println!("{}", format!("        {}", title).bold().color(color));
    println!("{}", rule.bold().color(color));
}

pub(crate) fn print_success(message: &str) {
    println!(
        "\n{}",
        "╔════════════════════════════════════════════════════╗"
            .green()
            .bold()
    );
    println!("{}", format!("║  ✓ {:<48}║", message).green().bold());
    println!(
        "{}",
        "╚════════════════════════════════════════════════════╝"
            .green()
            .bold()
    );
}
