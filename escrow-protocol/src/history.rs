//! Classification of raw ledger transactions into escrow-aware history entries.
//!
//! Classification never fails. Partial or undecodable data degrades to
//! `TransactionKind::Other`.

use solana_program::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use spl_token::{amount_to_ui_amount, amount_to_ui_amount_string_trimmed};
use std::fmt;
use tracing::warn;

use crate::instructions::instruction::EscrowInstruction;

/// Top-level instruction as recorded on the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInstruction {
    pub program_id: Pubkey,
    pub data: Vec<u8>,
}

/// Token balance snapshot of one account, before or after a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTokenBalance {
    pub account_index: u8,
    pub mint: Pubkey,
    pub owner: Option<Pubkey>,
    /// Smallest units.
    pub amount: u64,
    pub decimals: u8,
}

/// A transaction as fetched from the ledger, independent of RPC encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction {
    pub signature: Signature,
    /// Unix seconds, when the node knows it.
    pub block_time: Option<i64>,
    /// Error marker carried by the transaction metadata.
    pub error: Option<String>,
    /// Lamports.
    pub fee: u64,
    pub instructions: Vec<RawInstruction>,
    pub pre_token_balances: Vec<RawTokenBalance>,
    pub post_token_balances: Vec<RawTokenBalance>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    EscrowCreate,
    EscrowTake,
    EscrowUpdate,
    EscrowCancel,
    TokenTransfer,
    Other,
}

impl TransactionKind {
    pub fn is_escrow(&self) -> bool {
        matches!(
            self,
            TransactionKind::EscrowCreate
                | TransactionKind::EscrowTake
                | TransactionKind::EscrowUpdate
                | TransactionKind::EscrowCancel
        )
    }

    fn from_opcode(opcode: u8) -> Option<(Self, &'static str)> {
        match opcode {
            EscrowInstruction::MAKE => {
                Some((TransactionKind::EscrowCreate, "Created escrow agreement"))
            }
            EscrowInstruction::TAKE => {
                Some((TransactionKind::EscrowTake, "Accepted escrow agreement"))
            }
            EscrowInstruction::UPDATE => {
                Some((TransactionKind::EscrowUpdate, "Updated escrow agreement"))
            }
            EscrowInstruction::CANCEL => {
                Some((TransactionKind::EscrowCancel, "Cancelled escrow agreement"))
            }
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::EscrowCreate => "escrow create",
            TransactionKind::EscrowTake => "escrow take",
            TransactionKind::EscrowUpdate => "escrow update",
            TransactionKind::EscrowCancel => "escrow cancel",
            TransactionKind::TokenTransfer => "token transfer",
            TransactionKind::Other => "other",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionOutcome {
    Success,
    Failed,
}

/// Which way tokens moved relative to the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Incoming,
    Outgoing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDelta {
    /// Absolute change in smallest units.
    pub amount: u64,
    pub decimals: u8,
    pub mint: Pubkey,
    pub direction: Direction,
}

impl TokenDelta {
    pub fn ui_amount(&self) -> f64 {
        amount_to_ui_amount(self.amount, self.decimals)
    }

    pub fn ui_amount_string(&self) -> String {
        amount_to_ui_amount_string_trimmed(self.amount, self.decimals)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedTransaction {
    pub signature: Signature,
    pub timestamp: Option<i64>,
    pub kind: TransactionKind,
    pub outcome: TransactionOutcome,
    pub fee: u64,
    pub transfer: Option<TokenDelta>,
    pub description: &'static str,
}

/// Classifies `raw` from the point of view of `subject`.
///
/// An instruction addressed to the escrow program decides the kind even when
/// the subject's token balances also moved.
pub fn classify(
    raw: &RawTransaction,
    program_id: &Pubkey,
    subject: &Pubkey,
) -> ClassifiedTransaction {
    let outcome = if raw.error.is_some() {
        TransactionOutcome::Failed
    } else {
        TransactionOutcome::Success
    };

    let escrow_ix = raw
        .instructions
        .iter()
        .find(|ix| ix.program_id == *program_id);

    let (kind, description, transfer) = match escrow_ix {
        Some(ix) => match ix.data.first() {
            Some(&opcode) => match TransactionKind::from_opcode(opcode) {
                Some((kind, description)) => (kind, description, token_delta(raw, subject)),
                None => {
                    warn!(signature = %raw.signature, opcode, "unknown escrow opcode");
                    (TransactionKind::Other, "Escrow program interaction", None)
                }
            },
            None => {
                warn!(signature = %raw.signature, "escrow instruction without data");
                (TransactionKind::Other, "Escrow program interaction", None)
            }
        },
        None => match token_delta(raw, subject) {
            Some(delta) => (TransactionKind::TokenTransfer, "Token transfer", Some(delta)),
            None => (TransactionKind::Other, "Native-asset transaction", None),
        },
    };

    ClassifiedTransaction {
        signature: raw.signature,
        timestamp: raw.block_time,
        kind,
        outcome,
        fee: raw.fee,
        transfer,
        description,
    }
}

/// First token balance owned by `subject` that changed, pairing snapshots by
/// account index. A snapshot missing on one side counts as zero.
fn token_delta(raw: &RawTransaction, subject: &Pubkey) -> Option<TokenDelta> {
    let owned = |b: &&RawTokenBalance| b.owner.as_ref() == Some(subject);
    let pre_of = |index: u8| {
        raw.pre_token_balances
            .iter()
            .find(|b| b.account_index == index)
    };
    let post_of = |index: u8| {
        raw.post_token_balances
            .iter()
            .find(|b| b.account_index == index)
    };

    let post_first = raw.post_token_balances.iter().filter(owned).map(|post| {
        let pre = pre_of(post.account_index).map_or(0, |b| b.amount);
        (post, pre, post.amount)
    });
    let closed = raw
        .pre_token_balances
        .iter()
        .filter(owned)
        .filter(|pre| post_of(pre.account_index).is_none())
        .map(|pre| (pre, pre.amount, 0));

    post_first
        .chain(closed)
        .find(|(_, pre, post)| pre != post)
        .map(|(balance, pre, post)| TokenDelta {
            amount: pre.abs_diff(post),
            decimals: balance.decimals,
            mint: balance.mint,
            direction: if post > pre {
                Direction::Incoming
            } else {
                Direction::Outgoing
            },
        })
}
