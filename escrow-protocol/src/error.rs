use solana_program::pubkey::Pubkey;
use thiserror::Error;

pub type EscrowResult<T> = Result<T, EscrowError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EscrowError {
    /// Client-side validation failed; nothing was sent to the network.
    #[error("Invalid parameter `{field}`: {reason}")]
    InvalidParameters { field: &'static str, reason: String },
    /// Only the maker may cancel or update an escrow.
    #[error("Unauthorized: {caller} is not the maker ({maker}) of escrow {escrow}")]
    Unauthorized {
        caller: Pubkey,
        maker: Pubkey,
        escrow: Pubkey,
    },
    #[error("Escrow {escrow} was created immutable")]
    NotMutable { escrow: Pubkey },
    #[error("Escrow {escrow} is not active (expired at {expires_at}, now {now})")]
    EscrowNotActive {
        escrow: Pubkey,
        expires_at: u64,
        now: u64,
    },
    /// No bump seed produced an off-curve address.
    #[error("No valid bump found deriving `{tag}` address")]
    AddressDerivationExhausted { tag: &'static str },
    #[error("Malformed account data at {address}: {reason}")]
    MalformedAccountData { address: Pubkey, reason: String },
    /// The program refused the transaction after submission.
    #[error("Submission rejected ({signature}): {reason}")]
    SubmissionRejected { signature: String, reason: String },
    /// The escrow address was already in use, usually a seed collision.
    #[error("Submission conflict ({signature}): escrow account already exists")]
    SubmissionConflict { signature: String },
    /// Confirmation was not observed; re-fetch the record to learn the outcome.
    #[error("Submission outcome unknown for {signature}")]
    SubmissionUnknown { signature: String },
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),
}

impl EscrowError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        EscrowError::InvalidParameters {
            field,
            reason: reason.into(),
        }
    }

    pub fn malformed(address: &Pubkey, reason: impl Into<String>) -> Self {
        EscrowError::MalformedAccountData {
            address: *address,
            reason: reason.into(),
        }
    }
}
