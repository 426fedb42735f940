use colored::*;
use escrow_protocol::{CreateEscrowParams, EscrowError};
use solana_sdk::{signature::Keypair, signer::Signer};
use spl_token::amount_to_ui_amount;

use super::{print_banner, print_success, CommandContext};
use crate::{
    error::EscrowCliError,
    helper::{
        check_token_account, explorer_address_url, explorer_tx_url, format_time_remaining,
        mint_decimals, parse_pubkey,
    },
    rpc::KeypairSigner,
};
use escrow_protocol::token_list::TokenLookup;
use tracing::info;

pub struct CreateArgs {
    pub mint_a: String,
    pub mint_b: String,
    pub amount_a: u64,
    pub amount_b: u64,
    pub expiration_days: u16,
    pub is_mutable: bool,
}

pub async fn create_escrow(
    ctx: &CommandContext,
    maker: Keypair,
    args: CreateArgs,
) -> Result<(), EscrowCliError> {
    print_banner("CREATE ESCROW", Color::Blue);
    let params = CreateEscrowParams {
        token_a: parse_pubkey(&args.mint_a, "Token A mint")?,
        token_b: parse_pubkey(&args.mint_b, "Token B mint")?,
        amount_a: args.amount_a,
        amount_b: args.amount_b,
        expiration_days: args.expiration_days,
        is_mutable: args.is_mutable,
    };
    // Fail on bad input before any network round trip.
    params.validate()?;

    println!("\n{}", "Step 1: Check Token A Balance".bold().cyan());
    let maker_token_a_acc =
        spl_associated_token_account::get_associated_token_address(&maker.pubkey(), &params.token_a);
    let balance = check_token_account(&ctx.client, &maker_token_a_acc, params.amount_a).await?;
    let decimals_a = mint_decimals(&ctx.client, &ctx.tokens, &params.token_a).await?;
    let decimals_b = mint_decimals(&ctx.client, &ctx.tokens, &params.token_b).await?;
    println!(
        "  Balance: {} {} (depositing {})",
        amount_to_ui_amount(balance, decimals_a),
        ctx.tokens.label(&params.token_a),
        amount_to_ui_amount(params.amount_a, decimals_a)
    );

    println!("\n{}", "Step 2: Build Create Instruction".bold().cyan());
    let bundle = ctx.escrow.build_create(&maker.pubkey(), &params)?;
    println!("  Escrow PDA: {}", bundle.escrow.to_string().bright_magenta());
    println!("  Vault PDA: {}", bundle.vault.to_string().magenta());

    println!("\n{}", "Step 3: Send Transaction".bold().cyan());
    let signer = KeypairSigner::new(maker, ctx.client.clone());
    let signature = match ctx.submit(&signer, &bundle).await {
        Err(EscrowCliError::Protocol(EscrowError::SubmissionConflict { signature })) => {
            eprintln!(
                "{}",
                "An escrow already exists at the drawn address. Run create again to draw a new seed."
                    .yellow()
            );
            return Err(EscrowError::SubmissionConflict { signature }.into());
        }
        other => other?,
    };
    print_success("ESCROW CREATED SUCCESSFULLY!");

    println!("\n{}", "Transaction Details".bold().white());
    println!("  Transaction: {}", signature.to_string().yellow().bold());
    println!(
        "  Explorer: {}",
        explorer_tx_url(&signature, &ctx.cluster).underline().cyan()
    );

    println!("\n{}", "Offer".bold().white());
    println!(
        "  Offering: {} {}",
        amount_to_ui_amount(params.amount_a, decimals_a)
            .to_string()
            .green()
            .bold(),
        ctx.tokens.label(&params.token_a)
    );
    println!(
        "  Requesting: {} {}",
        amount_to_ui_amount(params.amount_b, decimals_b)
            .to_string()
            .yellow()
            .bold(),
        ctx.tokens.label(&params.token_b)
    );
    println!(
        "  Expires in: {}",
        format_time_remaining(u64::from(params.expiration_days) * 24 * 60 * 60 * 1000)
    );
    println!(
        "  Mutable: {}",
        if params.is_mutable { "yes" } else { "no" }
    );
    println!(
        "  Escrow: {}",
        explorer_address_url(&bundle.escrow, &ctx.cluster)
            .underline()
            .cyan()
    );
    info!(escrow = %bundle.escrow, %signature, "escrow created");
    Ok(())
}
