#![allow(dead_code)]

use async_trait::async_trait;
use escrow_protocol::{
    AccountFilter, CreateEscrowParams, EscrowClient, EscrowInstruction, EscrowNetwork,
    EscrowRecord, EscrowResult, EscrowSigner, EscrowState, InstructionBundle, RawTransaction,
    SubmissionOutcome,
};
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use std::collections::HashMap;
use std::sync::Mutex;

pub const DAY_MS: u64 = 24 * 60 * 60 * 1000;
pub const NOW_MS: u64 = 1_760_000_000_000;
pub const DISCRIMINATOR: [u8; 8] = [31, 213, 123, 187, 186, 22, 218, 155];

pub fn sig(n: u8) -> Signature {
    Signature::from([n; 64])
}

/// Holds the keys shared by an escrow test
pub struct EscrowTestSetup {
    pub client: EscrowClient,
    pub program_id: Pubkey,
    pub maker: Pubkey,
    pub taker: Pubkey,
    pub mint_a: Pubkey,
    pub mint_b: Pubkey,
}

pub fn setup_escrow_test() -> EscrowTestSetup {
    let program_id = Pubkey::new_unique();
    EscrowTestSetup {
        client: EscrowClient::new(program_id),
        program_id,
        maker: Pubkey::new_unique(),
        taker: Pubkey::new_unique(),
        mint_a: Pubkey::new_unique(),
        mint_b: Pubkey::new_unique(),
    }
}

/// 5 token A (9 decimals) for 1.25 token B, one week, mutable
pub fn sample_params(setup: &EscrowTestSetup) -> CreateEscrowParams {
    CreateEscrowParams {
        token_a: setup.mint_a,
        token_b: setup.mint_b,
        amount_a: 5_000_000_000,
        amount_b: 1_250_000_000,
        expiration_days: 7,
        is_mutable: true,
    }
}

/// Account bytes the program would store after executing a create bundle
pub fn account_bytes_for(bundle: &InstructionBundle, program_id: &Pubkey) -> Vec<u8> {
    let ix = bundle
        .escrow_instruction(program_id)
        .expect("bundle has an escrow instruction");
    let maker = ix.accounts[0].pubkey;
    match EscrowInstruction::unpack(&ix.data).expect("valid make payload") {
        EscrowInstruction::Make {
            token_a,
            token_b,
            amount_a,
            amount_b,
            expires_at,
            is_mutable,
            ..
        } => EscrowState {
            discriminator: DISCRIMINATOR,
            maker,
            token_a,
            token_b,
            amount_a,
            amount_b,
            expires_at,
            is_mutable,
        }
        .pack(),
        other => panic!("expected make payload, got {:?}", other),
    }
}

/// A live escrow record expiring at `expires_at`
pub fn open_escrow(setup: &EscrowTestSetup, expires_at: u64, is_mutable: bool) -> EscrowRecord {
    let params = CreateEscrowParams {
        is_mutable,
        ..sample_params(setup)
    };
    let bundle = setup
        .client
        .build_create_with_seed(&setup.maker, &params, 4242, NOW_MS)
        .expect("create bundle");
    let mut state = EscrowState::unpack(
        &bundle.escrow,
        &account_bytes_for(&bundle, &setup.program_id),
    )
    .expect("decodes");
    state.expires_at = expires_at;
    setup
        .client
        .parse_account_at(&bundle.escrow, &state.pack(), NOW_MS)
        .expect("record")
}

/// In-memory ledger standing in for the RPC transport
#[derive(Default)]
pub struct MockNetwork {
    pub accounts: Vec<(Pubkey, Vec<u8>)>,
    pub signatures: HashMap<Pubkey, Vec<Signature>>,
    pub transactions: Vec<RawTransaction>,
    pub outcome: Option<SubmissionOutcome>,
    pub seen_filters: Mutex<Vec<Vec<AccountFilter>>>,
}

impl MockNetwork {
    pub fn with_account(mut self, address: Pubkey, data: Vec<u8>) -> Self {
        self.accounts.push((address, data));
        self
    }

    pub fn with_history(mut self, identity: Pubkey, txs: Vec<RawTransaction>) -> Self {
        self.signatures
            .insert(identity, txs.iter().map(|tx| tx.signature).collect());
        self.transactions.extend(txs);
        self
    }

    pub fn with_outcome(mut self, outcome: SubmissionOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }
}

#[async_trait]
impl EscrowNetwork for MockNetwork {
    async fn fetch_account(&self, address: &Pubkey) -> EscrowResult<Option<Vec<u8>>> {
        Ok(self
            .accounts
            .iter()
            .find(|(key, _)| key == address)
            .map(|(_, data)| data.clone()))
    }

    async fn fetch_accounts_by_program(
        &self,
        _program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> EscrowResult<Vec<(Pubkey, Vec<u8>)>> {
        self.seen_filters.lock().unwrap().push(filters.to_vec());
        Ok(self
            .accounts
            .iter()
            .filter(|(_, data)| {
                filters.iter().all(|filter| match filter {
                    AccountFilter::Memcmp { offset, bytes } => {
                        data.get(*offset..*offset + bytes.len()) == Some(bytes.as_slice())
                    }
                })
            })
            .cloned()
            .collect())
    }

    async fn fetch_signature_history(
        &self,
        identity: &Pubkey,
        limit: usize,
    ) -> EscrowResult<Vec<Signature>> {
        Ok(self
            .signatures
            .get(identity)
            .map(|sigs| sigs.iter().take(limit).copied().collect())
            .unwrap_or_default())
    }

    async fn fetch_transactions(
        &self,
        signatures: &[Signature],
    ) -> EscrowResult<Vec<RawTransaction>> {
        Ok(self
            .transactions
            .iter()
            .filter(|tx| signatures.contains(&tx.signature))
            .cloned()
            .collect())
    }

    async fn confirm(&self, _signature: &Signature) -> EscrowResult<SubmissionOutcome> {
        Ok(self.outcome.clone().unwrap_or(SubmissionOutcome::Confirmed))
    }
}

/// Wallet that records what it was asked to sign
pub struct MockSigner {
    pub identity: Pubkey,
    pub submitted: Mutex<Vec<InstructionBundle>>,
}

impl MockSigner {
    pub fn new(identity: Pubkey) -> Self {
        Self {
            identity,
            submitted: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl EscrowSigner for MockSigner {
    fn public_identity(&self) -> Pubkey {
        self.identity
    }

    async fn approve_and_submit(&self, bundle: &InstructionBundle) -> EscrowResult<Signature> {
        self.submitted.lock().unwrap().push(bundle.clone());
        Ok(sig(200))
    }
}
