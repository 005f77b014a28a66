//! Fairroll Verifier CLI
//!
//! Player-side verification tool: walks a wallet's resolved rounds,
//! re-derives every outcome from the revealed seeds and prints one
//! verdict per row. Also recomputes single rounds from pasted values.

use std::collections::BTreeMap;

use clap::{Parser, Subcommand};
use tracing::info;

use fairroll::core::encode::decode_server_seed;
use fairroll::core::hash::seed_commitment_hex;
use fairroll::history::DEFAULT_API_BASE;
use fairroll::{
    run_manual_check, GameKind, HistoryCursor, HistoryFilter, HistoryService, HttpRoundSource,
    ManualCheck, VerifyStatus, DEFAULT_PAGE_LIMIT, VERSION,
};

#[derive(Parser)]
#[command(name = "fairroll-verifier", about = "Re-derive and verify Fairroll casino rounds")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a wallet's resolved rounds and verify every row
    History {
        /// Wallet address, base58
        wallet: String,
        /// Restrict to one game, e.g. `dice`
        #[arg(long)]
        game: Option<GameKind>,
        /// Rounds requested per game per page
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: u32,
        /// Pages to walk before stopping
        #[arg(long, default_value_t = 1)]
        pages: u32,
        /// Base URL of the rounds API
        #[arg(long, env = "FAIRROLL_API_BASE", default_value = DEFAULT_API_BASE)]
        api_base: String,
    },
    /// Recompute one round's digest chain from pasted values
    Verify {
        /// Which game the round belongs to
        game: GameKind,
        /// Revealed server seed, 64 hex chars
        #[arg(long)]
        server_seed: String,
        /// Client seed in effect for the round
        #[arg(long)]
        client_seed: String,
        /// Joiner's seed; coinflip only
        #[arg(long)]
        opponent_seed: Option<String>,
        /// Wallet address; mines only
        #[arg(long)]
        player: Option<String>,
        /// Round nonce
        #[arg(long)]
        nonce: u64,
        /// Digest the server claims for the round
        #[arg(long)]
        expected_hmac: Option<String>,
    },
    /// Hash a revealed server seed back to its published commitment
    Commitment {
        /// Revealed server seed, 64 hex chars
        server_seed: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::History {
            wallet,
            game,
            limit,
            pages,
            api_base,
        } => run_history(wallet, game, limit, pages, api_base).await,
        Commands::Verify {
            game,
            server_seed,
            client_seed,
            opponent_seed,
            player,
            nonce,
            expected_hmac,
        } => run_check(ManualCheck {
            game,
            server_seed_hex: server_seed,
            client_seed,
            opponent_seed,
            player,
            nonce,
            expected_hmac_hex: expected_hmac,
        }),
        Commands::Commitment { server_seed } => {
            // Validate the shape before hashing so typos are caught here
            decode_server_seed(&server_seed)?;
            println!("{}", seed_commitment_hex(&server_seed));
            Ok(())
        }
    }
}

async fn run_history(
    wallet: String,
    game: Option<GameKind>,
    limit: u32,
    pages: u32,
    api_base: String,
) -> anyhow::Result<()> {
    info!("Fairroll verifier v{VERSION}");

    let service = HistoryService::new(HttpRoundSource::new(api_base));
    let filter = HistoryFilter { wallet, game };
    let mut cursor = HistoryCursor::default();
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut mismatches = 0usize;

    println!(
        "{:<9} {:>7}  {:<24} {:>12} {:>12}  {:<8}  resolved",
        "game", "nonce", "result", "bet", "payout", "status"
    );
    for _ in 0..pages {
        let Some(page) = service.next_page(&filter, limit, cursor).await? else {
            // Single caller, so a superseded page cannot actually happen
            break;
        };
        for row in &page.rows {
            println!(
                "{:<9} {:>7}  {:<24} {:>12} {:>12}  {:<8}  {}",
                row.display.game,
                row.display.nonce,
                row.display.result_text,
                row.display.bet_lamports,
                row.display.payout_lamports,
                row.verify.label(),
                row.display.resolved_at_text,
            );
            match &row.verify {
                VerifyStatus::Mismatch { details, .. } | VerifyStatus::Error { details } => {
                    println!("{:>10} {}", "", details);
                }
                _ => {}
            }
            *counts.entry(row.verify.label()).or_default() += 1;
            if row.verify.is_mismatch() {
                mismatches += 1;
            }
        }
        cursor = page.cursor;
        if cursor.all_exhausted(filter.games()) {
            break;
        }
    }

    let summary: Vec<String> = counts
        .iter()
        .map(|(label, n)| format!("{n} {label}"))
        .collect();
    println!("---");
    println!("{}", summary.join(", "));
    if mismatches > 0 {
        anyhow::bail!("{mismatches} round(s) failed verification");
    }
    Ok(())
}

fn run_check(check: ManualCheck) -> anyhow::Result<()> {
    let report = run_manual_check(&check)?;
    println!("commitment : {}", report.commitment_hex);
    println!("first hmac : {}", report.computed_hmac_hex);
    if let Some(legacy) = &report.legacy_hmac_hex {
        println!("legacy hmac: {legacy}");
    }
    println!("{}", report.note);
    match report.expected_matches {
        Some(true) => println!("expected digest matches"),
        Some(false) => anyhow::bail!("expected digest does not match either candidate"),
        None => {}
    }
    Ok(())
}
