use colored::*;
use escrow_protocol::{now_millis, token_list::TokenLookup, EscrowStatus};

use super::CommandContext;
use crate::{
    error::EscrowCliError,
    helper::{display_amounts, explorer_address_url, format_time_remaining, parse_pubkey},
};

fn status_label(status: EscrowStatus) -> ColoredString {
    match status {
        EscrowStatus::Active => status.to_string().green().bold(),
        EscrowStatus::Expired => status.to_string().red().bold(),
        EscrowStatus::Taken => "COMPLETED".blue().bold(),
        EscrowStatus::Cancelled => status.to_string().dimmed(),
    }
}

pub async fn view_escrow(ctx: &CommandContext, escrow_str: &str) -> Result<(), EscrowCliError> {
    let escrow_address = parse_pubkey(escrow_str, "Escrow address")?;
    let separator =
        "────────────────────────────────────────────────────────────".truecolor(90, 90, 90);

    println!(
        "\n{}",
        "╔════════════════════════════════════════════════════════════╗"
            .blue()
            .bold()
    );
    println!(
        "{}",
        "║                     VIEW ESCROW DETAILS                    ║"
            .blue()
            .bold()
    );
    println!(
        "{}",
        "╚════════════════════════════════════════════════════════════╝"
            .blue()
            .bold()
    );

    let Some(escrow) = ctx
        .escrow
        .fetch_escrow(&ctx.network, &escrow_address)
        .await?
    else {
        // The record is gone; its history says why.
        let status = ctx
            .escrow
            .resolve_status(&ctx.network, &escrow_address)
            .await?;
        println!("\n{}", "Escrow".white().bold());
        println!("  {:<14} {}", "Address:".dimmed(), escrow_address);
        match status {
            Some(status) => println!("  {:<14} {}", "Status:".dimmed(), status_label(status)),
            None => println!(
                "  {:<14} {}",
                "Status:".dimmed(),
                "NOT FOUND".red().bold()
            ),
        }
        println!("{}", separator);
        return Ok(());
    };

    let now = now_millis();
    let (offered_amount, requested_amount) =
        display_amounts(&ctx.client, &ctx.tokens, &escrow).await?;

    // ESCROW METADATA
    println!("\n{}", "Escrow".white().bold());
    println!(
        "  {:<14} {}",
        "Maker:".dimmed(),
        escrow.maker.to_string().cyan()
    );
    println!(
        "  {:<14} {}",
        "Address:".dimmed(),
        escrow.address.to_string().bright_blue()
    );
    println!(
        "  {:<14} {}",
        "Status:".dimmed(),
        status_label(escrow.status_at(now))
    );
    println!(
        "  {:<14} {}",
        "Expires in:".dimmed(),
        format_time_remaining(escrow.remaining_ms(now))
    );
    println!(
        "  {:<14} {}",
        "Mutable:".dimmed(),
        if escrow.is_mutable { "yes" } else { "no" }
    );
    println!("{}", separator);

    // EXCHANGE TERMS
    println!("\n{}", "Exchange Terms".white().bold());
    println!("\n{} (Locked in Vault)", "OFFERING".green().bold());
    println!(
        "    {:<12} {} {} (Raw units: {})",
        "Amount:".dimmed(),
        offered_amount.to_string().bold(),
        ctx.tokens.label(&escrow.token_a),
        escrow.amount_a
    );
    println!("    {:<12} {}", "Mint A:".dimmed(), escrow.token_a);

    println!("\n{} (To Receive)", "REQUESTING".magenta().bold());
    println!(
        "    {:<12} {} {} (Raw units: {})",
        "Amount:".dimmed(),
        requested_amount.to_string().bold(),
        ctx.tokens.label(&escrow.token_b),
        escrow.amount_b
    );
    println!("    {:<12} {}", "Mint B:".dimmed(), escrow.token_b);
    println!("{}", separator);

    println!(
        "  {:<10} {}",
        "Escrow:".dimmed(),
        explorer_address_url(&escrow.address, &ctx.cluster)
            .underline()
            .blue()
    );
    println!(
        "  {:<10} {}",
        "Vault:".dimmed(),
        explorer_address_url(&escrow.vault_address, &ctx.cluster)
            .underline()
            .blue()
    );
    println!();
    Ok(())
}
