//! Seams to the two outside collaborators: the wallet that signs and submits,
//! and the RPC transport that fetches ledger data and confirms submissions.
//!
//! Neither is implemented here. Transport failures are reported as
//! `EscrowError::NetworkUnavailable` and are not retried by this crate.

use async_trait::async_trait;
use solana_program::pubkey::Pubkey;
use solana_sdk::signature::Signature;

use crate::error::EscrowResult;
use crate::history::RawTransaction;
use crate::instructions::InstructionBundle;

/// Server-side account filter for bulk program-account fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountFilter {
    /// Account data must contain `bytes` starting at `offset`.
    Memcmp { offset: usize, bytes: Vec<u8> },
}

/// What the network observed after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Confirmed,
    /// An account the transaction tried to create already exists.
    AccountInUse(String),
    Rejected(String),
    /// No confirmation within the transport's own timeout.
    Unknown,
}

#[async_trait]
pub trait EscrowSigner: Send + Sync {
    fn public_identity(&self) -> Pubkey;

    /// Signs the bundle as one transaction and hands it to the network.
    async fn approve_and_submit(&self, bundle: &InstructionBundle) -> EscrowResult<Signature>;
}

#[async_trait]
pub trait EscrowNetwork: Send + Sync {
    /// Raw account data, or `None` if the account does not exist.
    async fn fetch_account(&self, address: &Pubkey) -> EscrowResult<Option<Vec<u8>>>;

    async fn fetch_accounts_by_program(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> EscrowResult<Vec<(Pubkey, Vec<u8>)>>;

    /// Most recent signatures touching `identity`, newest first.
    async fn fetch_signature_history(
        &self,
        identity: &Pubkey,
        limit: usize,
    ) -> EscrowResult<Vec<Signature>>;

    /// Transactions for `signatures`. Ones the node cannot return are omitted.
    async fn fetch_transactions(&self, signatures: &[Signature])
        -> EscrowResult<Vec<RawTransaction>>;

    async fn confirm(&self, signature: &Signature) -> EscrowResult<SubmissionOutcome>;
}
