use colored::*;
use escrow_protocol::token_list::TokenLookup;
use solana_sdk::{signature::Keypair, signer::Signer};
use spl_token::amount_to_ui_amount;

use super::{print_banner, print_success, CommandContext};
use crate::{
    error::EscrowCliError,
    helper::{
        check_token_account, display_amounts, explorer_tx_url, format_time_remaining,
        mint_decimals, parse_pubkey,
    },
    rpc::KeypairSigner,
};
use escrow_protocol::now_millis;

pub async fn take_escrow(
    ctx: &CommandContext,
    taker: Keypair,
    escrow_str: &str,
) -> Result<(), EscrowCliError> {
    print_banner("TAKE ESCROW", Color::Green);
    let escrow_address = parse_pubkey(escrow_str, "Escrow address")?;

    println!("\n{}", "Step 1: Fetch Escrow Details".bold().cyan());
    let escrow = ctx.live_escrow(&escrow_address).await?;
    println!("  Escrow found!");
    println!("    Maker: {}", escrow.maker);
    println!("    Token A Mint: {}", escrow.token_a);
    println!("    Token B Mint: {}", escrow.token_b);
    println!(
        "    Expires in: {}",
        format_time_remaining(escrow.remaining_ms(now_millis()))
    );

    // Fails fast on an expired offer; the program has the final word.
    let bundle = ctx.escrow.build_take(&taker.pubkey(), &escrow)?;

    println!("\n{}", "Step 2: Exchange Terms".bold().cyan());
    let (offered_amount, requested_amount) = display_amounts(&ctx.client, &ctx.tokens, &escrow).await?;
    println!(
        "  You will RECEIVE: {} {}",
        offered_amount.to_string().yellow().bold(),
        ctx.tokens.label(&escrow.token_a)
    );
    println!(
        "  You will SEND: {} {}",
        requested_amount.to_string().yellow().bold(),
        ctx.tokens.label(&escrow.token_b)
    );

    println!("\n{}", "Step 3: Verify Token B Balance".bold().cyan());
    let taker_token_b_acc =
        spl_associated_token_account::get_associated_token_address(&taker.pubkey(), &escrow.token_b);
    let balance = check_token_account(&ctx.client, &taker_token_b_acc, escrow.amount_b).await?;
    let decimals_b = mint_decimals(&ctx.client, &ctx.tokens, &escrow.token_b).await?;
    println!(
        "  Balance: {} (needed: {})",
        amount_to_ui_amount(balance, decimals_b),
        requested_amount
    );
    println!("  Sufficient balance confirmed!");

    println!("\n{}", "Step 4: Send Transaction".bold().cyan());
    let signer = KeypairSigner::new(taker, ctx.client.clone());
    let signature = ctx.submit(&signer, &bundle).await?;
    print_success("EXCHANGE COMPLETED SUCCESSFULLY!");

    println!("\n{}", "Transaction Details".bold().white());
    println!("  Transaction: {}", signature.to_string().yellow().bold());
    println!(
        "  Explorer: {}",
        explorer_tx_url(&signature, &ctx.cluster).underline().cyan()
    );

    println!("\n{}", "Exchange Summary".bold().white());
    println!("  You received: {}", offered_amount.to_string().green());
    println!("  You sent: {}", requested_amount.to_string().yellow());
    println!("  Escrow account closed: {}", escrow.address);
    Ok(())
}
