use colored::*;
use escrow_protocol::EscrowTerms;
use solana_sdk::{signature::Keypair, signer::Signer};

use super::{print_banner, print_success, CommandContext};
use crate::{
    error::EscrowCliError,
    helper::{explorer_tx_url, format_time_remaining, parse_pubkey},
    rpc::KeypairSigner,
};

pub async fn update_escrow(
    ctx: &CommandContext,
    maker: Keypair,
    escrow_str: &str,
    terms: EscrowTerms,
) -> Result<(), EscrowCliError> {
    print_banner("UPDATE ESCROW", Color::Magenta);
    let escrow_address = parse_pubkey(escrow_str, "Escrow address")?;

    println!("\n{}", "Step 1: Fetch Current Terms".bold().cyan());
    let escrow = ctx.live_escrow(&escrow_address).await?;
    println!("  Amount A: {} -> {}", escrow.amount_a, terms.amount_a);
    println!("  Amount B: {} -> {}", escrow.amount_b, terms.amount_b);
    println!(
        "  Expires in: {}",
        format_time_remaining(u64::from(terms.expiration_days) * 24 * 60 * 60 * 1000)
    );

    println!("\n{}", "Step 2: Build Update Instruction".bold().cyan());
    let bundle = ctx.escrow.build_update(&maker.pubkey(), &escrow, &terms)?;

    println!("\n{}", "Step 3: Send Transaction".bold().cyan());
    let signer = KeypairSigner::new(maker, ctx.client.clone());
    let signature = ctx.submit(&signer, &bundle).await?;
    print_success("ESCROW UPDATED SUCCESSFULLY!");

    println!("\n{}", "Transaction Details".bold().white());
    println!("  Transaction: {}", signature.to_string().yellow().bold());
    println!(
        "  Explorer: {}",
        explorer_tx_url(&signature, &ctx.cluster).underline().cyan()
    );
    if !terms.is_mutable {
        println!("\n  The escrow is now locked; its terms can no longer change.");
    }
    Ok(())
}
