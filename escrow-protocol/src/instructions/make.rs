use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program, sysvar,
};
use spl_associated_token_account::get_associated_token_address_with_program_id;
use spl_token::ID as TOKEN_PROGRAM_ID;

use super::{expiry_after_days, instruction::EscrowInstruction, validate_terms, InstructionBundle};
use crate::error::{EscrowError, EscrowResult};
use crate::pda::{derive_escrow_address, derive_vault_address};

/// Terms of a new offer: the maker deposits `amount_a` of `token_a` and asks
/// for `amount_b` of `token_b`. Amounts are in each mint's smallest unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEscrowParams {
    pub token_a: Pubkey,
    pub token_b: Pubkey,
    pub amount_a: u64,
    pub amount_b: u64,
    pub expiration_days: u16,
    pub is_mutable: bool,
}

impl CreateEscrowParams {
    pub fn validate(&self) -> EscrowResult<()> {
        validate_terms(self.amount_a, self.amount_b, self.expiration_days)?;
        if self.token_a == self.token_b {
            return Err(EscrowError::invalid(
                "token_b",
                "must differ from token_a",
            ));
        }
        Ok(())
    }
}

/// Builds the create bundle for a given seed and clock reading.
pub fn create_escrow_bundle(
    program_id: &Pubkey,
    maker: &Pubkey,
    params: &CreateEscrowParams,
    seed: u32,
    now_ms: u64,
) -> EscrowResult<InstructionBundle> {
    params.validate()?;

    let (escrow_pda, _) = derive_escrow_address(program_id, maker, seed)?;
    let (vault_pda, _) = derive_vault_address(program_id, &escrow_pda, &params.token_a)?;
    let maker_token_acc_a =
        get_associated_token_address_with_program_id(maker, &params.token_a, &TOKEN_PROGRAM_ID);

    let data = EscrowInstruction::Make {
        token_a: params.token_a,
        token_b: params.token_b,
        amount_a: params.amount_a,
        amount_b: params.amount_b,
        expires_at: expiry_after_days(now_ms, params.expiration_days),
        is_mutable: params.is_mutable,
        seed,
    }
    .pack();

    let instruction = Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*maker, true),
            AccountMeta::new(escrow_pda, false),
            AccountMeta::new(vault_pda, false),
            AccountMeta::new(maker_token_acc_a, false),
            AccountMeta::new_readonly(params.token_a, false),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
            AccountMeta::new_readonly(sysvar::rent::id(), false),
        ],
        data,
    };

    Ok(InstructionBundle {
        instructions: vec![instruction],
        escrow: escrow_pda,
        vault: vault_pda,
        seed: Some(seed),
    })
}
