//! RPC-backed implementations of the protocol collaborators.

use async_trait::async_trait;
use escrow_protocol::{
    AccountFilter, EscrowError, EscrowNetwork, EscrowResult, EscrowSigner, InstructionBundle,
    RawInstruction, RawTokenBalance, RawTransaction, SubmissionOutcome,
};
use solana_client::{
    client_error::ClientError,
    nonblocking::rpc_client::RpcClient,
    rpc_client::GetConfirmedSignaturesForAddress2Config,
    rpc_config::{RpcProgramAccountsConfig, RpcTransactionConfig},
    rpc_filter::{Memcmp, RpcFilterType},
};
use solana_sdk::{
    instruction::InstructionError,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::{Transaction, TransactionError},
};
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, UiTransactionEncoding, UiTransactionTokenBalance,
};
use std::{
    str::FromStr,
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{debug, warn};

const CONFIRM_POLL_INTERVAL: Duration = Duration::from_millis(500);

fn network_err(error: ClientError) -> EscrowError {
    EscrowError::NetworkUnavailable(error.to_string())
}

/// Maps a program-side failure to a submission outcome.
///
/// The system program's `AccountAlreadyInUse` reaches us as `Custom(0)`
/// through the escrow program's CPI. A native program's own first error is
/// also `Custom(0)`, so the result is only a hint; `EscrowClient::submit`
/// treats it as a collision for create bundles alone.
pub fn outcome_for_error(error: &TransactionError) -> SubmissionOutcome {
    match error {
        TransactionError::InstructionError(_, InstructionError::Custom(0))
        | TransactionError::InstructionError(_, InstructionError::AccountAlreadyInitialized) => {
            SubmissionOutcome::AccountInUse(error.to_string())
        }
        _ => SubmissionOutcome::Rejected(error.to_string()),
    }
}

pub struct RpcNetwork {
    client: Arc<RpcClient>,
    confirm_timeout: Duration,
}

impl RpcNetwork {
    pub fn new(client: Arc<RpcClient>, confirm_timeout: Duration) -> Self {
        Self {
            client,
            confirm_timeout,
        }
    }
}

#[async_trait]
impl EscrowNetwork for RpcNetwork {
    async fn fetch_account(&self, address: &Pubkey) -> EscrowResult<Option<Vec<u8>>> {
        let response = self
            .client
            .get_account_with_commitment(address, self.client.commitment())
            .await
            .map_err(network_err)?;
        Ok(response.value.map(|account| account.data))
    }

    async fn fetch_accounts_by_program(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> EscrowResult<Vec<(Pubkey, Vec<u8>)>> {
        let filters: Vec<RpcFilterType> = filters
            .iter()
            .map(|filter| match filter {
                AccountFilter::Memcmp { offset, bytes } => {
                    RpcFilterType::Memcmp(Memcmp::new_raw_bytes(*offset, bytes.clone()))
                }
            })
            .collect();
        let config = RpcProgramAccountsConfig {
            filters: (!filters.is_empty()).then_some(filters),
            ..RpcProgramAccountsConfig::default()
        };
        let accounts = self
            .client
            .get_program_accounts_with_config(program_id, config)
            .await
            .map_err(network_err)?;
        debug!(%program_id, count = accounts.len(), "fetched program accounts");
        Ok(accounts
            .into_iter()
            .map(|(address, account)| (address, account.data))
            .collect())
    }

    async fn fetch_signature_history(
        &self,
        identity: &Pubkey,
        limit: usize,
    ) -> EscrowResult<Vec<Signature>> {
        let config = GetConfirmedSignaturesForAddress2Config {
            limit: Some(limit),
            commitment: Some(self.client.commitment()),
            ..GetConfirmedSignaturesForAddress2Config::default()
        };
        let statuses = self
            .client
            .get_signatures_for_address_with_config(identity, config)
            .await
            .map_err(network_err)?;
        Ok(statuses
            .iter()
            .filter_map(|status| Signature::from_str(&status.signature).ok())
            .collect())
    }

    async fn fetch_transactions(
        &self,
        signatures: &[Signature],
    ) -> EscrowResult<Vec<RawTransaction>> {
        let mut transactions = Vec::with_capacity(signatures.len());
        for signature in signatures {
            let config = RpcTransactionConfig {
                encoding: Some(UiTransactionEncoding::Base64),
                commitment: Some(self.client.commitment()),
                max_supported_transaction_version: Some(0),
            };
            match self
                .client
                .get_transaction_with_config(signature, config)
                .await
            {
                Ok(encoded) => match to_raw_transaction(*signature, encoded) {
                    Some(raw) => transactions.push(raw),
                    None => warn!(%signature, "transaction could not be decoded"),
                },
                Err(e) => warn!(%signature, error = %e, "transaction unavailable"),
            }
        }
        Ok(transactions)
    }

    async fn confirm(&self, signature: &Signature) -> EscrowResult<SubmissionOutcome> {
        let deadline = Instant::now() + self.confirm_timeout;
        loop {
            match self
                .client
                .get_signature_status(signature)
                .await
                .map_err(network_err)?
            {
                Some(Ok(())) => return Ok(SubmissionOutcome::Confirmed),
                Some(Err(error)) => return Ok(outcome_for_error(&error)),
                None => {}
            }
            if Instant::now() >= deadline {
                return Ok(SubmissionOutcome::Unknown);
            }
            tokio::time::sleep(CONFIRM_POLL_INTERVAL).await;
        }
    }
}

fn to_raw_transaction(
    signature: Signature,
    encoded: EncodedConfirmedTransactionWithStatusMeta,
) -> Option<RawTransaction> {
    let EncodedConfirmedTransactionWithStatusMeta {
        block_time,
        transaction,
        ..
    } = encoded;
    let versioned = transaction.transaction.decode()?;
    let meta = transaction.meta?;

    // Programs loaded through address lookup tables are not escrow calls.
    let keys = versioned.message.static_account_keys();
    let instructions = versioned
        .message
        .instructions()
        .iter()
        .filter_map(|ix| {
            keys.get(usize::from(ix.program_id_index))
                .map(|program_id| RawInstruction {
                    program_id: *program_id,
                    data: ix.data.clone(),
                })
        })
        .collect();

    let pre: Option<Vec<UiTransactionTokenBalance>> = meta.pre_token_balances.into();
    let post: Option<Vec<UiTransactionTokenBalance>> = meta.post_token_balances.into();

    Some(RawTransaction {
        signature,
        block_time,
        error: meta.err.map(|e| format!("{:?}", e)),
        fee: meta.fee,
        instructions,
        pre_token_balances: to_raw_balances(pre.unwrap_or_default()),
        post_token_balances: to_raw_balances(post.unwrap_or_default()),
    })
}

fn to_raw_balances(balances: Vec<UiTransactionTokenBalance>) -> Vec<RawTokenBalance> {
    balances
        .into_iter()
        .filter_map(|balance| {
            let owner: Option<String> = balance.owner.into();
            Some(RawTokenBalance {
                account_index: balance.account_index,
                mint: Pubkey::from_str(&balance.mint).ok()?,
                owner: owner.and_then(|o| Pubkey::from_str(&o).ok()),
                amount: balance.ui_token_amount.amount.parse().ok()?,
                decimals: balance.ui_token_amount.decimals,
            })
        })
        .collect()
}

/// A file-system keypair acting as the wallet.
pub struct KeypairSigner {
    keypair: Keypair,
    client: Arc<RpcClient>,
}

impl KeypairSigner {
    pub fn new(keypair: Keypair, client: Arc<RpcClient>) -> Self {
        Self { keypair, client }
    }
}

#[async_trait]
impl EscrowSigner for KeypairSigner {
    fn public_identity(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn approve_and_submit(&self, bundle: &InstructionBundle) -> EscrowResult<Signature> {
        let recent_blockhash = self
            .client
            .get_latest_blockhash()
            .await
            .map_err(network_err)?;
        let tx = Transaction::new_signed_with_payer(
            &bundle.instructions,
            Some(&self.keypair.pubkey()),
            &[&self.keypair],
            recent_blockhash,
        );
        let signature = tx.signatures[0];
        self.client.send_transaction(&tx).await.map_err(|e| {
            // Preflight simulation already ran the program.
            match e.get_transaction_error() {
                Some(error) => preflight_error(bundle, &signature, &error),
                None => network_err(e),
            }
        })
    }
}

/// Error for a transaction the program refused during preflight.
fn preflight_error(
    bundle: &InstructionBundle,
    signature: &Signature,
    error: &TransactionError,
) -> EscrowError {
    match outcome_for_error(error) {
        SubmissionOutcome::AccountInUse(_) if bundle.seed.is_some() => {
            EscrowError::SubmissionConflict {
                signature: signature.to_string(),
            }
        }
        _ => EscrowError::SubmissionRejected {
            signature: signature.to_string(),
            reason: error.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(seed: Option<u32>) -> InstructionBundle {
        InstructionBundle {
            instructions: vec![],
            escrow: Pubkey::new_unique(),
            vault: Pubkey::new_unique(),
            seed,
        }
    }

    #[test]
    fn custom_zero_conflicts_only_for_create() {
        let signature = Signature::from([9u8; 64]);
        let error = TransactionError::InstructionError(1, InstructionError::Custom(0));
        assert!(matches!(
            outcome_for_error(&error),
            SubmissionOutcome::AccountInUse(_)
        ));

        assert!(matches!(
            preflight_error(&bundle(Some(5)), &signature, &error),
            EscrowError::SubmissionConflict { .. }
        ));
        assert!(matches!(
            preflight_error(&bundle(None), &signature, &error),
            EscrowError::SubmissionRejected { .. }
        ));
    }

    #[test]
    fn other_program_errors_are_rejections() {
        let error = TransactionError::InstructionError(0, InstructionError::Custom(3));
        assert!(matches!(
            outcome_for_error(&error),
            SubmissionOutcome::Rejected(_)
        ));
    }
}
