use solana_program::pubkey::Pubkey;
use std::collections::HashMap;

/// Display metadata for a mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub symbol: String,
    pub decimals: u8,
}

/// Mint metadata supplied by the caller; protocol logic never depends on it.
pub trait TokenLookup {
    fn lookup(&self, mint: &Pubkey) -> Option<&TokenInfo>;

    /// Symbol for `mint`, falling back to a shortened address.
    fn label(&self, mint: &Pubkey) -> String {
        match self.lookup(mint) {
            Some(info) => info.symbol.clone(),
            None => {
                let text = mint.to_string();
                format!("{}…{}", &text[..4], &text[text.len() - 4..])
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticTokenList {
    entries: HashMap<Pubkey, TokenInfo>,
}

impl StaticTokenList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, mint: Pubkey, symbol: &str, decimals: u8) -> Self {
        self.insert(mint, symbol, decimals);
        self
    }

    pub fn insert(&mut self, mint: Pubkey, symbol: &str, decimals: u8) {
        self.entries.insert(
            mint,
            TokenInfo {
                symbol: symbol.to_string(),
                decimals,
            },
        );
    }
}

impl TokenLookup for StaticTokenList {
    fn lookup(&self, mint: &Pubkey) -> Option<&TokenInfo> {
        self.entries.get(mint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_mint_gets_short_label() {
        let known = Pubkey::new_unique();
        let list = StaticTokenList::new().with(known, "USDC", 6);
        assert_eq!(list.label(&known), "USDC");

        let unknown = Pubkey::new_unique();
        let label = list.label(&unknown);
        assert!(label.starts_with(&unknown.to_string()[..4]));
        assert!(label.contains('…'));
    }
}
