use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};
use spl_associated_token_account::get_associated_token_address_with_program_id;
use spl_token::ID as TOKEN_PROGRAM_ID;

use super::{
    expiry_after_days, instruction::EscrowInstruction, refund::ensure_maker, validate_terms,
    InstructionBundle,
};
use crate::error::{EscrowError, EscrowResult};
use crate::state::EscrowRecord;

/// Replacement terms for a mutable offer. The expiry restarts from the
/// moment the update is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowTerms {
    pub amount_a: u64,
    pub amount_b: u64,
    pub expiration_days: u16,
    pub is_mutable: bool,
}

pub fn update_escrow_bundle(
    program_id: &Pubkey,
    caller: &Pubkey,
    escrow: &EscrowRecord,
    terms: &EscrowTerms,
    now_ms: u64,
) -> EscrowResult<InstructionBundle> {
    ensure_maker(caller, escrow)?;
    if !escrow.is_mutable {
        return Err(EscrowError::NotMutable {
            escrow: escrow.address,
        });
    }
    validate_terms(terms.amount_a, terms.amount_b, terms.expiration_days)?;

    // A changed amount_a moves tokens between the maker and the vault.
    let maker_token_account =
        get_associated_token_address_with_program_id(caller, &escrow.token_a, &TOKEN_PROGRAM_ID);
    let instruction = Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*caller, true),
            AccountMeta::new(escrow.address, false),
            AccountMeta::new(escrow.vault_address, false),
            AccountMeta::new(maker_token_account, false),
            AccountMeta::new_readonly(escrow.token_a, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
        ],
        data: EscrowInstruction::Update {
            amount_a: terms.amount_a,
            amount_b: terms.amount_b,
            expires_at: expiry_after_days(now_ms, terms.expiration_days),
            is_mutable: terms.is_mutable,
        }
        .pack(),
    };

    Ok(InstructionBundle {
        instructions: vec![instruction],
        escrow: escrow.address,
        vault: escrow.vault_address,
        seed: None,
    })
}
