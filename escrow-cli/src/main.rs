use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use dotenv::dotenv;
use escrow_cli::{
    commands::{
        cancel::cancel_escrow,
        create::{create_escrow, CreateArgs},
        history::show_history,
        list::{list_escrows, SortOrder},
        take::take_escrow,
        update::update_escrow,
        view::view_escrow,
        CommandContext,
    },
    config::CliConfig,
    helper::{connect_to_network, ensure_fee_balance, get_wallet},
};
use escrow_protocol::EscrowTerms;
use solana_sdk::{signature::Keypair, signer::Signer};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "escrow-cli")]
#[command(about="A CLI TOOL FOR ESCROW PROGRAM",long_about=None)]
struct Cli {
    #[command(subcommand)]
    commands: Commands,
    // Network to use
    #[arg(short, long, default_value = "devnet", global = true)]
    network: String,
}
#[derive(Subcommand)]
enum Commands {
    /// Create a new escrow (offer tokens for exchange)
    Create {
        /// Path to your wallet keypair (e.g., ~/.config/solana/id.json)
        #[arg(short = 'w', long)]
        wallet: String,
        /// Token A mint address (what you're offering)
        #[arg(short = 'a', long)]
        mint_a: String,
        /// Token B mint address (what you want in return)
        #[arg(short = 'b', long)]
        mint_b: String,
        /// Amount of Token A to deposit (in smallest units)
        #[arg(short = 'd', long)]
        deposit: u64,
        /// Amount of Token B you want (in smallest units)
        #[arg(short = 'r', long)]
        receive: u64,
        /// Days until the offer expires (1-365)
        #[arg(short = 'e', long, default_value_t = 7)]
        expires_in: u16,
        /// Allow the terms to be updated later
        #[arg(long)]
        mutable: bool,
    },
    /// Take an active escrow
    Take {
        #[arg(short, long)]
        wallet: String,
        /// Escrow account address
        #[arg(short, long)]
        escrow: String,
    },
    /// Replace the terms of a mutable escrow
    Update {
        #[arg(short, long)]
        wallet: String,
        #[arg(short, long)]
        escrow: String,
        /// New amount of Token A
        #[arg(short = 'd', long)]
        deposit: u64,
        /// New amount of Token B
        #[arg(short = 'r', long)]
        receive: u64,
        /// Days from now until expiry (1-365)
        #[arg(short = 'x', long, default_value_t = 7)]
        expires_in: u16,
        /// Keep the escrow mutable after this update
        #[arg(long)]
        mutable: bool,
    },
    /// Cancel escrow
    Cancel {
        #[arg(short, long)]
        wallet: String,
        #[arg(short, long)]
        escrow: String,
    },
    /// View escrow details
    View {
        #[arg(short, long)]
        escrow: String,
    },
    /// List active escrows, or every escrow of one maker
    List {
        #[arg(short, long)]
        maker: Option<String>,
        #[arg(short, long, value_enum, default_value_t = SortOrder::Expiring)]
        sort: SortOrder,
    },
    /// Show classified transaction history of an address
    History {
        #[arg(short, long)]
        address: String,
        /// Only transactions touching the escrow program
        #[arg(long)]
        escrow_only: bool,
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

async fn load_payer(ctx: &CommandContext, path: &str) -> anyhow::Result<Keypair> {
    let wallet = get_wallet(path)?;
    ensure_fee_balance(&ctx.client, &wallet.pubkey()).await?;
    Ok(wallet)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = CliConfig::from_env().context("Failed to load configuration")?;
    let client = connect_to_network(&cli.network).map_err(|e| {
        eprintln!(
            "{} {}",
            "Failed to connect".bold().red(),
            e.to_string().red()
        );
        e
    })?;
    println!(
        "{} {} {}",
        "Connected to".bold().green(),
        cli.network.to_uppercase().bold().blue(),
        "successfully!".bold().green()
    );
    let ctx = CommandContext::new(&cli.network, client, config);

    match cli.commands {
        Commands::Create {
            wallet,
            mint_a,
            mint_b,
            deposit,
            receive,
            expires_in,
            mutable,
        } => {
            let maker = load_payer(&ctx, &wallet).await?;
            let args = CreateArgs {
                mint_a,
                mint_b,
                amount_a: deposit,
                amount_b: receive,
                expiration_days: expires_in,
                is_mutable: mutable,
            };
            create_escrow(&ctx, maker, args)
                .await
                .context("Failed to create escrow")?;
        }
        Commands::Take { wallet, escrow } => {
            let taker = load_payer(&ctx, &wallet).await?;
            take_escrow(&ctx, taker, &escrow)
                .await
                .context("Failed to take the escrow")?;
        }
        Commands::Update {
            wallet,
            escrow,
            deposit,
            receive,
            expires_in,
            mutable,
        } => {
            let maker = load_payer(&ctx, &wallet).await?;
            let terms = EscrowTerms {
                amount_a: deposit,
                amount_b: receive,
                expiration_days: expires_in,
                is_mutable: mutable,
            };
            update_escrow(&ctx, maker, &escrow, terms)
                .await
                .context("Failed to update the escrow")?;
        }
        Commands::Cancel { wallet, escrow } => {
            let maker = load_payer(&ctx, &wallet).await?;
            cancel_escrow(&ctx, maker, &escrow)
                .await
                .context("Failed to cancel the escrow")?;
        }
        Commands::View { escrow } => {
            view_escrow(&ctx, &escrow)
                .await
                .context("Failed to view the escrow")?;
        }
        Commands::List { maker, sort } => {
            list_escrows(&ctx, maker.as_deref(), sort)
                .await
                .context("Failed to list escrows")?;
        }
        Commands::History {
            address,
            escrow_only,
            limit,
        } => {
            show_history(&ctx, &address, escrow_only, limit)
                .await
                .context("Failed to load history")?;
        }
    }
    Ok(())
}
