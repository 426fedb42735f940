use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};
use spl_associated_token_account::{
    get_associated_token_address_with_program_id,
    instruction::create_associated_token_account_idempotent,
};
use spl_token::ID as TOKEN_PROGRAM_ID;

use super::{instruction::EscrowInstruction, InstructionBundle};
use crate::error::{EscrowError, EscrowResult};
use crate::state::EscrowRecord;

/// Builds the take bundle.
///
/// The taker's token A account may not exist yet, so the bundle opens it
/// idempotently before the take itself. The program stays the final judge of
/// whether the offer is still open; this check only fails fast.
pub fn take_escrow_bundle(
    program_id: &Pubkey,
    taker: &Pubkey,
    escrow: &EscrowRecord,
    now_ms: u64,
) -> EscrowResult<InstructionBundle> {
    if !escrow.is_active_at(now_ms) {
        return Err(EscrowError::EscrowNotActive {
            escrow: escrow.address,
            expires_at: escrow.expires_at,
            now: now_ms,
        });
    }

    let taker_token_a_acc =
        get_associated_token_address_with_program_id(taker, &escrow.token_a, &TOKEN_PROGRAM_ID);
    let taker_token_b_acc =
        get_associated_token_address_with_program_id(taker, &escrow.token_b, &TOKEN_PROGRAM_ID);

    let open_token_a = create_associated_token_account_idempotent(
        taker,
        taker,
        &escrow.token_a,
        &TOKEN_PROGRAM_ID,
    );
    let take = Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*taker, true),
            AccountMeta::new(escrow.maker, false),
            AccountMeta::new(escrow.address, false),
            AccountMeta::new(escrow.vault_address, false),
            AccountMeta::new(taker_token_a_acc, false),
            AccountMeta::new(taker_token_b_acc, false),
            AccountMeta::new_readonly(escrow.token_a, false),
            AccountMeta::new_readonly(escrow.token_b, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
        ],
        data: EscrowInstruction::Take.pack(),
    };

    Ok(InstructionBundle {
        instructions: vec![open_token_a, take],
        escrow: escrow.address,
        vault: escrow.vault_address,
        seed: None,
    })
}
