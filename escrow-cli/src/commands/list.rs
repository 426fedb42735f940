use clap::ValueEnum;
use colored::*;
use escrow_protocol::{now_millis, token_list::TokenLookup, EscrowRecord};

use super::CommandContext;
use crate::{
    error::EscrowCliError,
    helper::{format_time_remaining, parse_pubkey},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    /// Soonest expiry first
    Expiring,
    /// Latest expiry first
    Newest,
}

/// The protocol layer returns records unordered; ordering is a display concern.
pub fn sort_escrows(escrows: &mut [EscrowRecord], order: SortOrder) {
    match order {
        SortOrder::Expiring => escrows.sort_by_key(|e| e.expires_at),
        SortOrder::Newest => escrows.sort_by(|a, b| b.expires_at.cmp(&a.expires_at)),
    }
}

pub async fn list_escrows(
    ctx: &CommandContext,
    maker: Option<&str>,
    order: SortOrder,
) -> Result<(), EscrowCliError> {
    let (title, mut escrows) = match maker {
        Some(maker) => {
            let maker = parse_pubkey(maker, "Maker")?;
            (
                "MY ESCROWS",
                ctx.escrow.list_for_maker(&ctx.network, &maker).await?,
            )
        }
        None => ("MARKETPLACE", ctx.escrow.list_active(&ctx.network).await?),
    };
    sort_escrows(&mut escrows, order);

    println!("\n{}", title.bold().blue());
    if escrows.is_empty() {
        println!("  {}", "No escrows found".dimmed());
        return Ok(());
    }
    let now = now_millis();
    for escrow in &escrows {
        println!(
            "  {}  {} {} -> {} {}  {:<8} {}",
            escrow.address.to_string().bright_blue(),
            escrow.amount_a,
            ctx.tokens.label(&escrow.token_a),
            escrow.amount_b,
            ctx.tokens.label(&escrow.token_b),
            escrow.status_at(now).to_string(),
            format_time_remaining(escrow.remaining_ms(now)).dimmed()
        );
    }
    println!("\n  {} escrow(s)", escrows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use escrow_protocol::EscrowStatus;
    use solana_sdk::pubkey::Pubkey;

    fn record(expires_at: u64) -> EscrowRecord {
        EscrowRecord {
            address: Pubkey::new_unique(),
            vault_address: Pubkey::new_unique(),
            maker: Pubkey::new_unique(),
            token_a: Pubkey::new_unique(),
            token_b: Pubkey::new_unique(),
            amount_a: 1,
            amount_b: 1,
            expires_at,
            is_mutable: false,
            status: EscrowStatus::Active,
        }
    }

    #[test]
    fn sorts_by_expiry() {
        let mut escrows = vec![record(30), record(10), record(20)];
        sort_escrows(&mut escrows, SortOrder::Expiring);
        let order: Vec<u64> = escrows.iter().map(|e| e.expires_at).collect();
        assert_eq!(order, vec![10, 20, 30]);

        sort_escrows(&mut escrows, SortOrder::Newest);
        let order: Vec<u64> = escrows.iter().map(|e| e.expires_at).collect();
        assert_eq!(order, vec![30, 20, 10]);
    }
}
