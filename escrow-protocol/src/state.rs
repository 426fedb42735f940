use borsh::BorshDeserialize;
use solana_program::pubkey::Pubkey;
use std::fmt;

use crate::error::{EscrowError, EscrowResult};

pub const MS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

/// On-ledger layout of an escrow account.
///
/// The first 8 bytes are the program's account-type tag and are carried through
/// untouched. Every field sits at a fixed offset with no padding.
#[derive(Debug, Clone, PartialEq, Eq, BorshDeserialize)]
pub struct EscrowState {
    pub discriminator: [u8; 8],
    pub maker: Pubkey,
    pub token_a: Pubkey,
    pub token_b: Pubkey,
    pub amount_a: u64,
    pub amount_b: u64,
    /// Epoch milliseconds.
    pub expires_at: u64,
    pub is_mutable: bool,
}

impl EscrowState {
    pub const LEN: usize = 8 + 32 + 32 + 32 + 8 + 8 + 8 + 1;
    pub const MAKER_OFFSET: usize = 8;

    pub const MUTABLE_OFFSET: usize = Self::LEN - 1;

    /// Decodes the fixed layout. Bytes past `LEN` are ignored, and the
    /// mutability flag is set only when its byte is exactly 1.
    pub fn unpack(address: &Pubkey, data: &[u8]) -> EscrowResult<Self> {
        if data.len() < Self::LEN {
            return Err(EscrowError::malformed(
                address,
                format!("expected at least {} bytes, got {}", Self::LEN, data.len()),
            ));
        }
        let mut raw = [0u8; Self::LEN];
        raw.copy_from_slice(&data[..Self::LEN]);
        raw[Self::MUTABLE_OFFSET] = u8::from(raw[Self::MUTABLE_OFFSET] == 1);
        Self::try_from_slice(&raw).map_err(|e| EscrowError::malformed(address, e.to_string()))
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::LEN);
        data.extend_from_slice(&self.discriminator);
        data.extend_from_slice(self.maker.as_ref());
        data.extend_from_slice(self.token_a.as_ref());
        data.extend_from_slice(self.token_b.as_ref());
        data.extend_from_slice(&self.amount_a.to_le_bytes());
        data.extend_from_slice(&self.amount_b.to_le_bytes());
        data.extend_from_slice(&self.expires_at.to_le_bytes());
        data.push(u8::from(self.is_mutable));
        data
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscrowStatus {
    Active,
    Expired,
    Taken,
    Cancelled,
}

impl EscrowStatus {
    /// Status a live record has at `now_ms`.
    pub fn at(expires_at: u64, now_ms: u64) -> Self {
        if now_ms < expires_at {
            EscrowStatus::Active
        } else {
            EscrowStatus::Expired
        }
    }
}

impl fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EscrowStatus::Active => "ACTIVE",
            EscrowStatus::Expired => "EXPIRED",
            EscrowStatus::Taken => "TAKEN",
            EscrowStatus::Cancelled => "CANCELLED",
        };
        f.write_str(label)
    }
}

/// A decoded escrow offer together with its derived addresses and status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowRecord {
    pub address: Pubkey,
    pub vault_address: Pubkey,
    pub maker: Pubkey,
    pub token_a: Pubkey,
    pub token_b: Pubkey,
    pub amount_a: u64,
    pub amount_b: u64,
    pub expires_at: u64,
    pub is_mutable: bool,
    /// Status when the record was decoded. Use `status_at` before acting on it.
    pub status: EscrowStatus,
}

impl EscrowRecord {
    pub fn from_state(
        address: Pubkey,
        vault_address: Pubkey,
        state: EscrowState,
        now_ms: u64,
    ) -> Self {
        EscrowRecord {
            address,
            vault_address,
            maker: state.maker,
            token_a: state.token_a,
            token_b: state.token_b,
            amount_a: state.amount_a,
            amount_b: state.amount_b,
            expires_at: state.expires_at,
            is_mutable: state.is_mutable,
            status: EscrowStatus::at(state.expires_at, now_ms),
        }
    }

    pub fn status_at(&self, now_ms: u64) -> EscrowStatus {
        EscrowStatus::at(self.expires_at, now_ms)
    }

    pub fn is_active_at(&self, now_ms: u64) -> bool {
        self.status_at(now_ms) == EscrowStatus::Active
    }

    /// Milliseconds left before expiry, zero once expired.
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at.saturating_sub(now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> EscrowState {
        EscrowState {
            discriminator: [7u8; 8],
            maker: Pubkey::new_unique(),
            token_a: Pubkey::new_unique(),
            token_b: Pubkey::new_unique(),
            amount_a: 0x0102_0304_0506_0708,
            amount_b: 42,
            expires_at: 1_700_000_000_000,
            is_mutable: true,
        }
    }

    #[test]
    fn fields_sit_at_fixed_offsets() {
        let state = sample_state();
        let data = state.pack();
        assert_eq!(data.len(), 129);
        assert_eq!(&data[0..8], &[7u8; 8]);
        assert_eq!(&data[8..40], state.maker.as_ref());
        assert_eq!(&data[40..72], state.token_a.as_ref());
        assert_eq!(&data[72..104], state.token_b.as_ref());
        assert_eq!(&data[104..112], &state.amount_a.to_le_bytes());
        assert_eq!(&data[112..120], &42u64.to_le_bytes());
        assert_eq!(&data[120..128], &state.expires_at.to_le_bytes());
        assert_eq!(data[128], 1);
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let state = sample_state();
        let mut data = state.pack();
        data.extend_from_slice(&[0xff; 16]);
        let decoded = EscrowState::unpack(&Pubkey::new_unique(), &data).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn one_byte_short_is_malformed() {
        let data = sample_state().pack();
        let err = EscrowState::unpack(&Pubkey::new_unique(), &data[..128]).unwrap_err();
        assert!(matches!(err, EscrowError::MalformedAccountData { .. }));
    }

    #[test]
    fn only_one_marks_the_flag_set() {
        let mut data = sample_state().pack();
        data[128] = 2;
        let decoded = EscrowState::unpack(&Pubkey::new_unique(), &data).unwrap();
        assert!(!decoded.is_mutable);
        assert_eq!(decoded.amount_b, 42);

        data[128] = 0xff;
        assert!(!EscrowState::unpack(&Pubkey::new_unique(), &data).unwrap().is_mutable);
        data[128] = 1;
        assert!(EscrowState::unpack(&Pubkey::new_unique(), &data).unwrap().is_mutable);
    }

    #[test]
    fn status_flips_at_expiry() {
        assert_eq!(EscrowStatus::at(1_000, 999), EscrowStatus::Active);
        assert_eq!(EscrowStatus::at(1_000, 1_000), EscrowStatus::Expired);
    }
}
