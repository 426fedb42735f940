use colored::*;
use escrow_protocol::{
    client::ESCROW_HISTORY_LIMIT, token_list::TokenLookup, ClassifiedTransaction, Direction,
    TransactionOutcome,
};
use solana_sdk::native_token::lamports_to_sol;

use super::CommandContext;
use crate::{error::EscrowCliError, helper::parse_pubkey};

fn describe_transfer(ctx: &CommandContext, tx: &ClassifiedTransaction) -> String {
    match &tx.transfer {
        Some(delta) => {
            let sign = match delta.direction {
                Direction::Incoming => "+",
                Direction::Outgoing => "-",
            };
            format!(
                "{}{} {}",
                sign,
                delta.ui_amount_string(),
                ctx.tokens.label(&delta.mint)
            )
        }
        None => String::new(),
    }
}

/// How many recent transactions to scan. An explicit `--limit` always wins.
fn history_window(escrow_only: bool, limit: Option<usize>, default_limit: usize) -> usize {
    match limit {
        Some(limit) => limit,
        None if escrow_only => ESCROW_HISTORY_LIMIT,
        None => default_limit,
    }
}

pub async fn show_history(
    ctx: &CommandContext,
    address_str: &str,
    escrow_only: bool,
    limit: Option<usize>,
) -> Result<(), EscrowCliError> {
    let address = parse_pubkey(address_str, "Address")?;
    let window = history_window(escrow_only, limit, ctx.config.history_limit);
    let mut history = ctx
        .escrow
        .transaction_history(&ctx.network, &address, window)
        .await?;
    if escrow_only {
        history.retain(|tx| tx.kind.is_escrow());
    }

    println!("\n{}", "TRANSACTION HISTORY".bold().blue());
    if history.is_empty() {
        println!("  {}", "No transactions found".dimmed());
        return Ok(());
    }
    for tx in &history {
        let outcome = match tx.outcome {
            TransactionOutcome::Success => "ok".green(),
            TransactionOutcome::Failed => "failed".red(),
        };
        let when = tx
            .timestamp
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());
        let signature = tx.signature.to_string();
        println!(
            "  {:<12} {:<16} {:<7} {:<20} fee {} SOL  {}…",
            when.dimmed(),
            tx.kind.to_string().bold(),
            outcome,
            describe_transfer(ctx, tx),
            lamports_to_sol(tx.fee),
            &signature[..12]
        );
        println!("  {:<12} {}", "", tx.description.dimmed());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_limit_applies_to_escrow_only() {
        assert_eq!(history_window(true, Some(10), 50), 10);
        assert_eq!(history_window(false, Some(10), 50), 10);
        assert_eq!(history_window(true, None, 50), ESCROW_HISTORY_LIMIT);
        assert_eq!(history_window(false, None, 50), 50);
    }
}
