use solana_program::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

use crate::error::{EscrowError, EscrowResult};
use crate::history::{classify, ClassifiedTransaction, TransactionKind, TransactionOutcome};
use crate::instructions::{
    make::{create_escrow_bundle, CreateEscrowParams},
    refund::cancel_escrow_bundle,
    take::take_escrow_bundle,
    update::{update_escrow_bundle, EscrowTerms},
    InstructionBundle,
};
use crate::network::{AccountFilter, EscrowNetwork, EscrowSigner, SubmissionOutcome};
use crate::pda::derive_vault_address;
use crate::state::{EscrowRecord, EscrowState, EscrowStatus};

pub const ESCROW_HISTORY_LIMIT: usize = 100;
const STATUS_HISTORY_LIMIT: usize = 20;

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Builds escrow instruction bundles and reads escrow state for one program.
///
/// Holds no cached records: every read decodes freshly fetched bytes and
/// derives status from the clock at that moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscrowClient {
    program_id: Pubkey,
}

impl EscrowClient {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    /// Builds a create bundle with a freshly drawn random seed.
    pub fn build_create(
        &self,
        maker: &Pubkey,
        params: &CreateEscrowParams,
    ) -> EscrowResult<InstructionBundle> {
        self.build_create_with_seed(maker, params, rand::random::<u32>(), now_millis())
    }

    pub fn build_create_with_seed(
        &self,
        maker: &Pubkey,
        params: &CreateEscrowParams,
        seed: u32,
        now_ms: u64,
    ) -> EscrowResult<InstructionBundle> {
        let bundle = create_escrow_bundle(&self.program_id, maker, params, seed, now_ms)?;
        debug!(escrow = %bundle.escrow, vault = %bundle.vault, seed, "built create bundle");
        Ok(bundle)
    }

    pub fn build_take(&self, taker: &Pubkey, escrow: &EscrowRecord) -> EscrowResult<InstructionBundle> {
        self.build_take_at(taker, escrow, now_millis())
    }

    pub fn build_take_at(
        &self,
        taker: &Pubkey,
        escrow: &EscrowRecord,
        now_ms: u64,
    ) -> EscrowResult<InstructionBundle> {
        take_escrow_bundle(&self.program_id, taker, escrow, now_ms)
    }

    pub fn build_cancel(
        &self,
        caller: &Pubkey,
        escrow: &EscrowRecord,
    ) -> EscrowResult<InstructionBundle> {
        cancel_escrow_bundle(&self.program_id, caller, escrow)
    }

    pub fn build_update(
        &self,
        caller: &Pubkey,
        escrow: &EscrowRecord,
        terms: &EscrowTerms,
    ) -> EscrowResult<InstructionBundle> {
        self.build_update_at(caller, escrow, terms, now_millis())
    }

    pub fn build_update_at(
        &self,
        caller: &Pubkey,
        escrow: &EscrowRecord,
        terms: &EscrowTerms,
        now_ms: u64,
    ) -> EscrowResult<InstructionBundle> {
        update_escrow_bundle(&self.program_id, caller, escrow, terms, now_ms)
    }

    pub fn parse_account(&self, address: &Pubkey, data: &[u8]) -> EscrowResult<EscrowRecord> {
        self.parse_account_at(address, data, now_millis())
    }

    pub fn parse_account_at(
        &self,
        address: &Pubkey,
        data: &[u8],
        now_ms: u64,
    ) -> EscrowResult<EscrowRecord> {
        let state = EscrowState::unpack(address, data)?;
        let (vault, _) = derive_vault_address(&self.program_id, address, &state.token_a)?;
        Ok(EscrowRecord::from_state(*address, vault, state, now_ms))
    }

    /// Fetches and decodes one escrow. A missing account is `None`: the offer
    /// was taken or cancelled, or never existed.
    pub async fn fetch_escrow<N: EscrowNetwork + ?Sized>(
        &self,
        network: &N,
        address: &Pubkey,
    ) -> EscrowResult<Option<EscrowRecord>> {
        match network.fetch_account(address).await? {
            Some(data) => self.parse_account(address, &data).map(Some),
            None => Ok(None),
        }
    }

    /// Every escrow opened by `maker`, in no particular order.
    pub async fn list_for_maker<N: EscrowNetwork + ?Sized>(
        &self,
        network: &N,
        maker: &Pubkey,
    ) -> EscrowResult<Vec<EscrowRecord>> {
        let filters = [AccountFilter::Memcmp {
            offset: EscrowState::MAKER_OFFSET,
            bytes: maker.to_bytes().to_vec(),
        }];
        let accounts = network
            .fetch_accounts_by_program(&self.program_id, &filters)
            .await?;
        Ok(self.decode_all(accounts, now_millis()))
    }

    /// Every escrow still open at call time, in no particular order.
    pub async fn list_active<N: EscrowNetwork + ?Sized>(
        &self,
        network: &N,
    ) -> EscrowResult<Vec<EscrowRecord>> {
        let accounts = network
            .fetch_accounts_by_program(&self.program_id, &[])
            .await?;
        let now = now_millis();
        Ok(self
            .decode_all(accounts, now)
            .into_iter()
            .filter(|record| record.is_active_at(now))
            .collect())
    }

    fn decode_all(&self, accounts: Vec<(Pubkey, Vec<u8>)>, now_ms: u64) -> Vec<EscrowRecord> {
        accounts
            .into_iter()
            .filter_map(
                |(address, data)| match self.parse_account_at(&address, &data, now_ms) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!(%address, error = %e, "skipping undecodable program account");
                        None
                    }
                },
            )
            .collect()
    }

    /// Has the signer approve and submit `bundle`, then waits for the
    /// network's verdict. Never resubmits.
    pub async fn submit<S, N>(
        &self,
        signer: &S,
        network: &N,
        bundle: &InstructionBundle,
    ) -> EscrowResult<Signature>
    where
        S: EscrowSigner + ?Sized,
        N: EscrowNetwork + ?Sized,
    {
        let signature = signer.approve_and_submit(bundle).await?;
        info!(%signature, escrow = %bundle.escrow, "submitted escrow transaction");
        match network.confirm(&signature).await? {
            SubmissionOutcome::Confirmed => Ok(signature),
            // Only a create allocates the escrow account; for any other bundle
            // the same error code is an ordinary program rejection.
            SubmissionOutcome::AccountInUse(reason) if bundle.seed.is_some() => {
                warn!(%signature, %reason, "escrow address already in use");
                Err(EscrowError::SubmissionConflict {
                    signature: signature.to_string(),
                })
            }
            SubmissionOutcome::AccountInUse(reason) | SubmissionOutcome::Rejected(reason) => {
                Err(EscrowError::SubmissionRejected {
                    signature: signature.to_string(),
                    reason,
                })
            }
            SubmissionOutcome::Unknown => Err(EscrowError::SubmissionUnknown {
                signature: signature.to_string(),
            }),
        }
    }

    /// Classified history of `identity`, newest first.
    pub async fn transaction_history<N: EscrowNetwork + ?Sized>(
        &self,
        network: &N,
        identity: &Pubkey,
        limit: usize,
    ) -> EscrowResult<Vec<ClassifiedTransaction>> {
        let signatures = network.fetch_signature_history(identity, limit).await?;
        if signatures.is_empty() {
            return Ok(Vec::new());
        }
        let raw = network.fetch_transactions(&signatures).await?;
        let mut history: Vec<ClassifiedTransaction> = raw
            .iter()
            .map(|tx| classify(tx, &self.program_id, identity))
            .collect();
        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(history)
    }

    /// Escrow operations only, from the last `ESCROW_HISTORY_LIMIT` transactions.
    pub async fn escrow_history<N: EscrowNetwork + ?Sized>(
        &self,
        network: &N,
        identity: &Pubkey,
    ) -> EscrowResult<Vec<ClassifiedTransaction>> {
        let history = self
            .transaction_history(network, identity, ESCROW_HISTORY_LIMIT)
            .await?;
        Ok(history.into_iter().filter(|tx| tx.kind.is_escrow()).collect())
    }

    /// Status of the escrow at `address`, including what became of it once
    /// removed. `None` when there is neither a record nor a settling
    /// transaction in its recent history.
    pub async fn resolve_status<N: EscrowNetwork + ?Sized>(
        &self,
        network: &N,
        address: &Pubkey,
    ) -> EscrowResult<Option<EscrowStatus>> {
        if let Some(record) = self.fetch_escrow(network, address).await? {
            return Ok(Some(record.status));
        }
        let history = self
            .transaction_history(network, address, STATUS_HISTORY_LIMIT)
            .await?;
        let settled = history
            .iter()
            .filter(|tx| tx.outcome == TransactionOutcome::Success)
            .find_map(|tx| match tx.kind {
                TransactionKind::EscrowTake => Some(EscrowStatus::Taken),
                TransactionKind::EscrowCancel => Some(EscrowStatus::Cancelled),
                _ => None,
            });
        debug!(%address, ?settled, "resolved removed escrow");
        Ok(settled)
    }
}
