//! Client-side protocol layer for the token escrow program.
//!
//! Derives escrow and vault addresses, encodes instruction payloads, decodes
//! escrow accounts, assembles submittable instruction bundles and classifies
//! ledger history. Signing and RPC transport are supplied by the caller through
//! the traits in [`network`].

pub mod client;
pub mod error;
pub mod history;
pub mod instructions;
pub mod network;
pub mod pda;
pub mod state;
pub mod token_list;

pub use client::{now_millis, EscrowClient};
pub use error::{EscrowError, EscrowResult};
pub use history::{
    classify, ClassifiedTransaction, Direction, RawInstruction, RawTokenBalance, RawTransaction,
    TokenDelta, TransactionKind, TransactionOutcome,
};
pub use instructions::{
    instruction::EscrowInstruction, make::CreateEscrowParams, update::EscrowTerms,
    InstructionBundle,
};
pub use network::{AccountFilter, EscrowNetwork, EscrowSigner, SubmissionOutcome};
pub use state::{EscrowRecord, EscrowState, EscrowStatus};
