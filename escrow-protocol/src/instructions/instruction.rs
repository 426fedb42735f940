use borsh::BorshDeserialize;
use solana_program::pubkey::Pubkey;

/// Instruction payloads understood by the escrow program.
///
/// The leading byte is the program's opcode, which is also the borsh variant
/// index, followed by each field little-endian with no padding. Variant order
/// is therefore part of the wire format.
#[derive(BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum EscrowInstruction {
    /// Opens a new offer and moves `amount_a` of `token_a` into the vault.
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` maker
    /// 1. `[writable]` escrow PDA
    /// 2. `[writable]` vault PDA
    /// 3. `[writable]` maker's token A account
    /// 4. `[]` token A mint
    /// 5. `[]` system program
    /// 6. `[]` token program
    /// 7. `[]` rent sysvar
    Make {
        token_a: Pubkey,
        token_b: Pubkey,
        amount_a: u64,
        amount_b: u64,
        expires_at: u64,
        is_mutable: bool,
        seed: u32,
    },
    /// Settles the offer: taker pays token B and receives the vault contents.
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` taker
    /// 1. `[writable]` maker
    /// 2. `[writable]` escrow PDA
    /// 3. `[writable]` vault PDA
    /// 4. `[writable]` taker's token A account
    /// 5. `[writable]` taker's token B account
    /// 6. `[]` token A mint
    /// 7. `[]` token B mint
    /// 8. `[]` token program
    Take,
    /// Changes the terms of a mutable offer.
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` maker
    /// 1. `[writable]` escrow PDA
    /// 2. `[writable]` vault PDA
    /// 3. `[writable]` maker's token A account
    /// 4. `[]` token A mint
    /// 5. `[]` token program
    Update {
        amount_a: u64,
        amount_b: u64,
        expires_at: u64,
        is_mutable: bool,
    },
    /// Closes the offer and refunds the vault to the maker.
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` maker
    /// 1. `[writable]` escrow PDA
    /// 2. `[writable]` vault PDA
    /// 3. `[writable]` maker's token A account
    /// 4. `[]` token A mint
    /// 5. `[]` token program
    Cancel,
}

impl EscrowInstruction {
    pub const MAKE: u8 = 0;
    pub const TAKE: u8 = 1;
    pub const UPDATE: u8 = 2;
    pub const CANCEL: u8 = 3;

    pub const MAKE_LEN: usize = 1 + 32 + 32 + 8 + 8 + 8 + 1 + 4;
    pub const UPDATE_LEN: usize = 1 + 8 + 8 + 8 + 1;

    pub fn opcode(&self) -> u8 {
        match self {
            EscrowInstruction::Make { .. } => Self::MAKE,
            EscrowInstruction::Take => Self::TAKE,
            EscrowInstruction::Update { .. } => Self::UPDATE,
            EscrowInstruction::Cancel => Self::CANCEL,
        }
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = vec![self.opcode()];
        match self {
            EscrowInstruction::Make {
                token_a,
                token_b,
                amount_a,
                amount_b,
                expires_at,
                is_mutable,
                seed,
            } => {
                buf.reserve(Self::MAKE_LEN - 1);
                buf.extend_from_slice(token_a.as_ref());
                buf.extend_from_slice(token_b.as_ref());
                buf.extend_from_slice(&amount_a.to_le_bytes());
                buf.extend_from_slice(&amount_b.to_le_bytes());
                buf.extend_from_slice(&expires_at.to_le_bytes());
                buf.push(u8::from(*is_mutable));
                buf.extend_from_slice(&seed.to_le_bytes());
            }
            EscrowInstruction::Update {
                amount_a,
                amount_b,
                expires_at,
                is_mutable,
            } => {
                buf.reserve(Self::UPDATE_LEN - 1);
                buf.extend_from_slice(&amount_a.to_le_bytes());
                buf.extend_from_slice(&amount_b.to_le_bytes());
                buf.extend_from_slice(&expires_at.to_le_bytes());
                buf.push(u8::from(*is_mutable));
            }
            EscrowInstruction::Take | EscrowInstruction::Cancel => {}
        }
        buf
    }

    /// Decodes a full payload. Returns `None` for unknown opcodes or a bad length.
    pub fn unpack(data: &[u8]) -> Option<Self> {
        Self::try_from_slice(data).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_payload_layout() {
        let token_a = Pubkey::new_unique();
        let token_b = Pubkey::new_unique();
        let ix = EscrowInstruction::Make {
            token_a,
            token_b,
            amount_a: 5_000_000_000,
            amount_b: 1_250_000_000,
            expires_at: 1_760_000_000_000,
            is_mutable: true,
            seed: 0xdead_beef,
        };
        let data = ix.pack();
        assert_eq!(data.len(), EscrowInstruction::MAKE_LEN);
        assert_eq!(data[0], 0);
        assert_eq!(&data[1..33], token_a.as_ref());
        assert_eq!(&data[33..65], token_b.as_ref());
        assert_eq!(&data[65..73], &5_000_000_000u64.to_le_bytes());
        assert_eq!(&data[73..81], &1_250_000_000u64.to_le_bytes());
        assert_eq!(&data[81..89], &1_760_000_000_000u64.to_le_bytes());
        assert_eq!(data[89], 1);
        assert_eq!(&data[90..94], &0xdead_beefu32.to_le_bytes());
    }

    #[test]
    fn update_payload_layout() {
        let ix = EscrowInstruction::Update {
            amount_a: 10,
            amount_b: 20,
            expires_at: 30,
            is_mutable: false,
        };
        let data = ix.pack();
        assert_eq!(data.len(), EscrowInstruction::UPDATE_LEN);
        assert_eq!(data[0], 2);
        assert_eq!(&data[1..9], &10u64.to_le_bytes());
        assert_eq!(&data[9..17], &20u64.to_le_bytes());
        assert_eq!(&data[17..25], &30u64.to_le_bytes());
        assert_eq!(data[25], 0);
    }

    #[test]
    fn take_and_cancel_are_single_bytes() {
        assert_eq!(EscrowInstruction::Take.pack(), vec![1]);
        assert_eq!(EscrowInstruction::Cancel.pack(), vec![3]);
    }

    #[test]
    fn packed_payloads_decode_back() {
        let ix = EscrowInstruction::Update {
            amount_a: 7,
            amount_b: 9,
            expires_at: 11,
            is_mutable: true,
        };
        assert_eq!(EscrowInstruction::unpack(&ix.pack()), Some(ix));
    }

    #[test]
    fn unknown_opcode_does_not_decode() {
        assert_eq!(EscrowInstruction::unpack(&[9]), None);
        assert_eq!(EscrowInstruction::unpack(&[]), None);
        assert_eq!(EscrowInstruction::unpack(&[3]), Some(EscrowInstruction::Cancel));
    }
}
