use colored::*;
use solana_sdk::{signature::Keypair, signer::Signer};

use super::{print_banner, print_success, CommandContext};
use crate::{
    error::EscrowCliError,
    helper::{explorer_address_url, explorer_tx_url, parse_pubkey},
    rpc::KeypairSigner,
};

pub async fn cancel_escrow(
    ctx: &CommandContext,
    maker: Keypair,
    escrow_str: &str,
) -> Result<(), EscrowCliError> {
    print_banner("CANCEL ESCROW", Color::Red);
    let escrow_address = parse_pubkey(escrow_str, "Escrow address")?;

    println!("\n{}", "Step 1: Verify Escrow Exists".bold().cyan());
    let escrow = ctx.live_escrow(&escrow_address).await?;
    println!("Escrow account found");
    println!("    Maker: {}", escrow.maker);
    println!("    Status: {}", escrow.status);
    println!("    Vault PDA: {}", escrow.vault_address);

    println!("\n{}", "Step 2: Build Cancel Instruction".bold().cyan());
    let bundle = ctx.escrow.build_cancel(&maker.pubkey(), &escrow)?;

    println!("\n{}", "Step 3: Send Transaction".bold().cyan());
    let signer = KeypairSigner::new(maker, ctx.client.clone());
    let signature = ctx.submit(&signer, &bundle).await?;
    print_success("ESCROW CANCELLED SUCCESSFULLY!");

    println!("\n{}", "Transaction Details".bold().white());
    println!("  Transaction: {}", signature.to_string().yellow().bold());
    println!(
        "  Explorer: {}",
        explorer_tx_url(&signature, &ctx.cluster).underline().cyan()
    );

    println!("\n{}", "Result".bold().white());
    println!("  Your tokens have been returned to your Token account");
    println!("  Escrow account closed and rent reclaimed");
    println!("  Vault account closed");

    println!("\n{}", "Account Addresses".bold().white());
    println!(
        "  Escrow PDA: {}",
        explorer_address_url(&escrow.address, &ctx.cluster)
            .underline()
            .cyan()
    );
    println!(
        "  Vault PDA: {}",
        explorer_address_url(&escrow.vault_address, &ctx.cluster)
            .underline()
            .cyan()
    );
    Ok(())
}
