pub mod instruction;
pub mod make;
pub mod refund;
pub mod take;
pub mod update;

use solana_program::{instruction::Instruction, pubkey::Pubkey};

use crate::error::{EscrowError, EscrowResult};
use crate::state::MS_PER_DAY;

pub const MIN_EXPIRATION_DAYS: u16 = 1;
pub const MAX_EXPIRATION_DAYS: u16 = 365;

/// Instructions that make up one atomic escrow operation, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionBundle {
    pub instructions: Vec<Instruction>,
    pub escrow: Pubkey,
    pub vault: Pubkey,
    /// Seed drawn for a create; `None` for the other operations.
    pub seed: Option<u32>,
}

impl InstructionBundle {
    /// The instruction addressed to the escrow program itself.
    pub fn escrow_instruction(&self, program_id: &Pubkey) -> Option<&Instruction> {
        self.instructions
            .iter()
            .find(|ix| ix.program_id == *program_id)
    }
}

/// Shared validation for the amounts and lifetime of an offer.
pub(crate) fn validate_terms(amount_a: u64, amount_b: u64, expiration_days: u16) -> EscrowResult<()> {
    if amount_a == 0 {
        return Err(EscrowError::invalid("amount_a", "must be greater than zero"));
    }
    if amount_b == 0 {
        return Err(EscrowError::invalid("amount_b", "must be greater than zero"));
    }
    if !(MIN_EXPIRATION_DAYS..=MAX_EXPIRATION_DAYS).contains(&expiration_days) {
        return Err(EscrowError::invalid(
            "expiration_days",
            format!(
                "must be between {} and {}, got {}",
                MIN_EXPIRATION_DAYS, MAX_EXPIRATION_DAYS, expiration_days
            ),
        ));
    }
    Ok(())
}

pub(crate) fn expiry_after_days(now_ms: u64, days: u16) -> u64 {
    now_ms.saturating_add(u64::from(days) * MS_PER_DAY)
}
