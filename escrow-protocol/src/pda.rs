use solana_program::pubkey::Pubkey;
use tracing::debug;

use crate::error::{EscrowError, EscrowResult};

pub const ESCROW_SEED: &[u8] = b"escrow";
pub const VAULT_SEED: &[u8] = b"escrow_token";

/// Derives the escrow state PDA for `maker` and `seed`.
///
/// The program hashes the seed as its ASCII decimal text, so `42` contributes
/// the bytes `b"42"`, not its little-endian form.
pub fn derive_escrow_address(
    program_id: &Pubkey,
    maker: &Pubkey,
    seed: u32,
) -> EscrowResult<(Pubkey, u8)> {
    let seed_text = seed.to_string();
    let (address, bump) = Pubkey::try_find_program_address(
        &[ESCROW_SEED, maker.as_ref(), seed_text.as_bytes()],
        program_id,
    )
    .ok_or(EscrowError::AddressDerivationExhausted { tag: "escrow" })?;
    debug!(%maker, seed, %address, bump, "derived escrow address");
    Ok((address, bump))
}

/// Derives the token vault PDA that custodies `mint` for `escrow`.
pub fn derive_vault_address(
    program_id: &Pubkey,
    escrow: &Pubkey,
    mint: &Pubkey,
) -> EscrowResult<(Pubkey, u8)> {
    let (address, bump) = Pubkey::try_find_program_address(
        &[VAULT_SEED, escrow.as_ref(), mint.as_ref()],
        program_id,
    )
    .ok_or(EscrowError::AddressDerivationExhausted {
        tag: "escrow_token",
    })?;
    debug!(%escrow, %mint, %address, bump, "derived vault address");
    Ok((address, bump))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escrow_address_is_deterministic() {
        let program_id = Pubkey::new_unique();
        let maker = Pubkey::new_unique();
        let first = derive_escrow_address(&program_id, &maker, 918_273).unwrap();
        let second = derive_escrow_address(&program_id, &maker, 918_273).unwrap();
        assert_eq!(first, second);
        assert!(!first.0.is_on_curve());
    }

    #[test]
    fn seed_is_hashed_as_decimal_text() {
        let program_id = Pubkey::new_unique();
        let maker = Pubkey::new_unique();
        let (address, bump) = derive_escrow_address(&program_id, &maker, 7).unwrap();
        let expected =
            Pubkey::create_program_address(&[b"escrow", maker.as_ref(), b"7", &[bump]], &program_id)
                .unwrap();
        assert_eq!(address, expected);
    }

    #[test]
    fn different_inputs_give_different_addresses() {
        let program_id = Pubkey::new_unique();
        let maker = Pubkey::new_unique();
        let a = derive_escrow_address(&program_id, &maker, 1).unwrap().0;
        let b = derive_escrow_address(&program_id, &maker, 2).unwrap().0;
        assert_ne!(a, b);

        let mint_a = Pubkey::new_unique();
        let mint_b = Pubkey::new_unique();
        let vault_a = derive_vault_address(&program_id, &a, &mint_a).unwrap().0;
        let vault_b = derive_vault_address(&program_id, &a, &mint_b).unwrap().0;
        assert_ne!(vault_a, vault_b);
        assert_eq!(
            vault_a,
            derive_vault_address(&program_id, &a, &mint_a).unwrap().0
        );
    }
}
