use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};
use spl_associated_token_account::get_associated_token_address_with_program_id;
use spl_token::ID as TOKEN_PROGRAM_ID;

use super::{instruction::EscrowInstruction, InstructionBundle};
use crate::error::{EscrowError, EscrowResult};
use crate::state::EscrowRecord;

pub(crate) fn ensure_maker(caller: &Pubkey, escrow: &EscrowRecord) -> EscrowResult<()> {
    if *caller != escrow.maker {
        return Err(EscrowError::Unauthorized {
            caller: *caller,
            maker: escrow.maker,
            escrow: escrow.address,
        });
    }
    Ok(())
}

/// Builds the cancel bundle that refunds the vault to the maker.
///
/// Expired offers can still be cancelled; only the caller is checked.
pub fn cancel_escrow_bundle(
    program_id: &Pubkey,
    caller: &Pubkey,
    escrow: &EscrowRecord,
) -> EscrowResult<InstructionBundle> {
    ensure_maker(caller, escrow)?;

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
        data: EscrowInstruction::Cancel.pack(),
    };

    Ok(InstructionBundle {
        instructions: vec![instruction],
        escrow: escrow.address,
        vault: escrow.vault_address,
        seed: None,
    })
}
