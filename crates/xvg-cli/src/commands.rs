//! CLI command implementations.

use crate::AppContext;
use xvg_rpc::{AddressesOptions, HttpTransport};
use xvg_types::{format_amount, parse_amount};
use xvg_wallet::{
    parse_secret, FileRepository, KeyHierarchy, StaticSeed, WalletClient, WalletOptions,
    WalletRepository, WalletState,
};

type Result = std::result::Result<(), Box<dyn std::error::Error>>;

const MNEMONIC_ENV: &str = "XVG_MNEMONIC";
const PASSPHRASE_ENV: &str = "XVG_PASSPHRASE";

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Mnemonic from `XVG_MNEMONIC`, else prompted without echo.
fn read_seed() -> std::result::Result<StaticSeed, Box<dyn std::error::Error>> {
    let phrase = match std::env::var(MNEMONIC_ENV) {
        Ok(phrase) => phrase,
        Err(_) => rpassword::prompt_password("Mnemonic: ")?,
    };
    if phrase.trim().is_empty() {
        return Err("mnemonic cannot be empty".into());
    }
    Ok(StaticSeed::from_phrase(&phrase, &passphrase()))
}

fn passphrase() -> String {
    std::env::var(PASSPHRASE_ENV).unwrap_or_default()
}

fn repository(ctx: &AppContext) -> FileRepository {
    FileRepository::new(&ctx.state_file)
}

fn connect(
    ctx: &AppContext,
    seed: StaticSeed,
) -> std::result::Result<WalletClient<HttpTransport>, Box<dyn std::error::Error>> {
    log::debug!(
        "service {} ({}), state file {}",
        ctx.config.service_url,
        ctx.config.network,
        ctx.state_file.display()
    );
    let keys = KeyHierarchy::new(seed, ctx.config.network);
    Ok(WalletClient::connect(ctx.config.clone(), keys, repository(ctx))?)
}

/// Open the wallet and require every copayer to have joined.
async fn open_operational(
    ctx: &AppContext,
) -> std::result::Result<WalletClient<HttpTransport>, Box<dyn std::error::Error>> {
    let mut client = connect(ctx, read_seed()?)?;
    let wallet = client.open_wallet().await?;
    if client.state() != WalletState::Operational {
        return Err(format!(
            "wallet {} is {} ({} of {} copayers joined)",
            wallet.id,
            wallet.status,
            wallet.copayers.len(),
            wallet.n
        )
        .into());
    }
    Ok(client)
}

fn short(s: &str) -> String {
    if s.len() > 16 {
        format!("{}...", &s[..16])
    } else {
        s.to_string()
    }
}

// ─── Commands ───────────────────────────────────────────────────────────────

pub async fn create_wallet(
    ctx: &AppContext,
    name: &str,
    copayer: Option<String>,
    m: u32,
    n: u32,
    single_address: bool,
) -> Result {
    if m == 0 || m > n {
        return Err(format!("invalid {}-of-{} wallet", m, n).into());
    }
    if let Some(id) = repository(ctx).load()?.wallet_id {
        return Err(format!(
            "state file {} already holds wallet {}",
            ctx.state_file.display(),
            id
        )
        .into());
    }

    let seed = match std::env::var(MNEMONIC_ENV) {
        Ok(phrase) => StaticSeed::from_phrase(&phrase, &passphrase()),
        Err(_) => {
            let seed = StaticSeed::generate(&passphrase())?;
            println!("IMPORTANT: Write down your mnemonic and keep it safe!");
            println!("Every later command needs it (set {} or type it).", MNEMONIC_ENV);
            println!();
            println!("Mnemonic (12 words):");
            println!("  {}", seed.phrase());
            println!();
            seed
        }
    };

    let mut client = connect(ctx, seed)?;
    let copayer = copayer.unwrap_or_else(|| client.config().copayer_name.clone());
    let options = WalletOptions {
        single_address: single_address.then_some(true),
    };
    let secret = client.create_wallet(name, &copayer, m, n, options).await?;
    let wallet_id = parse_secret(&secret)?.wallet_id;
    client.join_wallet(&wallet_id, &copayer).await?;

    println!("Wallet created: {} ({}-of-{})", wallet_id, m, n);
    println!("State file: {}", ctx.state_file.display());
    if n > 1 {
        println!();
        println!("Share this secret with the other copayers:");
        println!("  {}", secret);
    }
    Ok(())
}

pub async fn join_wallet(ctx: &AppContext, secret: &str, copayer: Option<String>) -> Result {
    let parsed = parse_secret(secret)?;
    if parsed.network != ctx.config.network {
        return Err(format!(
            "secret is for {} but --network is {}",
            parsed.network, ctx.config.network
        )
        .into());
    }

    let mut client = connect(ctx, read_seed()?)?;
    let copayer = copayer.unwrap_or_else(|| client.config().copayer_name.clone());
    client.join_wallet(&parsed.wallet_id, &copayer).await?;

    let repo = repository(ctx);
    let mut record = repo.load()?;
    record.wallet_secret = Some(secret.trim().to_string());
    repo.save(&record)?;

    println!("Joined wallet {} as {}", parsed.wallet_id, copayer);
    Ok(())
}

pub async fn open_wallet(ctx: &AppContext) -> Result {
    let mut client = connect(ctx, read_seed()?)?;
    let wallet = client.open_wallet().await?;

    println!("Wallet:   {}", wallet.name);
    println!("Id:       {}", wallet.id);
    println!("Type:     {}-of-{}", wallet.m, wallet.n);
    println!("Status:   {}", wallet.status);
    println!("Network:  {}", wallet.network);
    println!("Copayers:");
    for copayer in &wallet.copayers {
        println!("  {} ({})", copayer.name, short(&copayer.id));
    }
    Ok(())
}

pub async fn create_address(ctx: &AppContext) -> Result {
    let client = open_operational(ctx).await?;
    let address = client.create_address().await?;
    println!("{}  {}", address.address, address.path);
    Ok(())
}

pub async fn show_addresses(ctx: &AppContext, limit: Option<u32>, reverse: bool) -> Result {
    let client = open_operational(ctx).await?;
    let addresses = client
        .get_main_addresses(AddressesOptions { limit, reverse })
        .await?;

    if addresses.is_empty() {
        println!("No addresses yet. Run 'address' to create one.");
        return Ok(());
    }
    for address in &addresses {
        println!("{:<36} {}", address.address, address.path);
    }
    Ok(())
}

pub async fn show_balance(ctx: &AppContext) -> Result {
    let client = open_operational(ctx).await?;
    let balance = client.get_balance().await?;

    println!("Total:     {} XVG", format_amount(balance.total_amount));
    println!("Confirmed: {} XVG", format_amount(balance.total_confirmed_amount));
    println!("Available: {} XVG", format_amount(balance.available_amount));
    println!("Locked:    {} XVG", format_amount(balance.locked_amount));
    Ok(())
}

pub async fn show_history(ctx: &AppContext, skip: Option<u32>, limit: Option<u32>) -> Result {
    let client = open_operational(ctx).await?;
    let history = client.get_tx_history(skip, limit).await?;

    if history.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!(
        "{:<10} {:>20} {:>6} {:<20} Note",
        "Action", "Amount", "Conf", "TX Hash"
    );
    println!("{}", "-".repeat(80));
    for tx in &history {
        let sign = match tx.action.as_str() {
            "sent" => "-",
            "received" => "+",
            _ => "",
        };
        println!(
            "{:<10} {:>20} {:>6} {:<20} {}",
            tx.action,
            format!("{}{}", sign, format_amount(tx.amount)),
            tx.confirmations,
            short(&tx.txid),
            tx.message.as_deref().unwrap_or(""),
        );
    }
    Ok(())
}

pub async fn show_utxos(ctx: &AppContext, addresses: &[String]) -> Result {
    let client = open_operational(ctx).await?;
    let utxos = client.get_unspent_outputs(addresses).await?;

    if utxos.is_empty() {
        println!("No unspent outputs.");
        return Ok(());
    }
    for utxo in &utxos {
        println!(
            "{}:{:<4} {:>20} {:>6} {}{}",
            short(&utxo.txid),
            utxo.vout,
            format_amount(utxo.satoshis),
            utxo.confirmations,
            utxo.address,
            if utxo.locked { " (locked)" } else { "" },
        );
    }
    Ok(())
}

pub async fn show_send_max(ctx: &AppContext) -> Result {
    let client = open_operational(ctx).await?;
    let info = client.get_send_max_info().await?;

    println!("Sendable: {} XVG", format_amount(info.amount));
    println!("Fee:      {} XVG", format_amount(info.fee));
    println!("Inputs:   {}", info.inputs.len());
    if info.utxos_below_fee > 0 {
        println!(
            "Skipped:  {} outputs below fee ({} XVG)",
            info.utxos_below_fee,
            format_amount(info.amount_below_fee)
        );
    }
    Ok(())
}

pub async fn send(ctx: &AppContext, address: &str, amount: &str, message: Option<&str>) -> Result {
    let amount = parse_amount(amount)?;
    let client = open_operational(ctx).await?;

    let txp = client.create_tx_proposal(address, amount, message).await?;
    println!(
        "Proposal {}: {} XVG to {} (fee {} XVG)",
        txp.id,
        format_amount(txp.amount),
        address,
        format_amount(txp.fee)
    );

    let txp = client.publish_tx_proposal(&txp).await?;
    let txp = client.sign_tx_proposal(&txp).await?;
    if txp.status != "accepted" {
        println!(
            "Signed; waiting for {} signatures in total (status: {})",
            txp.required_signatures, txp.status
        );
        return Ok(());
    }

    let txp = client.broadcast_tx_proposal(&txp).await?;
    println!("Broadcast: {}", txp.txid.as_deref().unwrap_or("(pending)"));
    Ok(())
}

pub fn show_secret(ctx: &AppContext) -> Result {
    let record = repository(ctx).load()?;
    let secret = record.wallet_secret.ok_or_else(|| {
        format!(
            "no wallet secret in {}; use 'create' or 'join' first",
            ctx.state_file.display()
        )
    })?;
    println!("{}", secret);
    Ok(())
}
