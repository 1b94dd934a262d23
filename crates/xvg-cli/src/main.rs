use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use xvg_types::Network;
use xvg_wallet::WalletConfig;

mod commands;

/// Verge wallet service command-line copayer.
#[derive(Parser)]
#[command(name = "xvg-wallet-cli")]
#[command(about = "Command-line copayer for the Verge wallet service")]
#[command(version)]
struct Cli {
    /// Network to use (mainnet or testnet).
    #[arg(long, default_value = "mainnet")]
    network: Network,

    /// Wallet service URL.
    #[arg(long, default_value = xvg_rpc::DEFAULT_SERVICE_URL)]
    service_url: String,

    /// Request timeout in seconds.
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Wallet state file (wallet id, name and secret).
    #[arg(long)]
    state_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a wallet on the service and join it as its first copayer.
    Create {
        /// Wallet name.
        #[arg(long)]
        name: String,

        /// Copayer name shown to the other copayers.
        #[arg(long)]
        copayer: Option<String>,

        /// Required signatures.
        #[arg(long, default_value = "1")]
        m: u32,

        /// Total copayers.
        #[arg(long, default_value = "1")]
        n: u32,

        /// Reuse a single receive address.
        #[arg(long)]
        single_address: bool,
    },

    /// Join a wallet with an invitation secret.
    Join {
        /// Invitation secret.
        #[arg(long)]
        secret: String,

        /// Copayer name shown to the other copayers.
        #[arg(long)]
        copayer: Option<String>,
    },

    /// Show wallet status.
    Open,

    /// Create a new receive address.
    Address,

    /// List the wallet's main addresses.
    Addresses {
        #[arg(long)]
        limit: Option<u32>,

        /// Newest first.
        #[arg(long)]
        reverse: bool,
    },

    /// Show wallet balance.
    Balance,

    /// Show transaction history.
    History {
        #[arg(long)]
        skip: Option<u32>,

        #[arg(long)]
        limit: Option<u32>,
    },

    /// List unspent outputs.
    Utxos {
        /// Restrict to these addresses.
        addresses: Vec<String>,
    },

    /// Show the maximum sendable amount.
    SendMax,

    /// Send XVG: create, publish, sign and broadcast a proposal.
    Send {
        /// Destination address.
        #[arg(long)]
        address: String,

        /// Amount in XVG (e.g. "1.5").
        #[arg(long)]
        amount: String,

        /// Note, encrypted for the copayers.
        #[arg(long)]
        message: Option<String>,
    },

    /// Show the wallet invitation secret.
    Secret,
}

/// Application context shared across commands.
pub struct AppContext {
    pub config: WalletConfig,
    pub state_file: PathBuf,
}

impl AppContext {
    fn from_cli(cli: &Cli) -> Self {
        let mut config = WalletConfig::new(&cli.service_url, cli.network);
        config.timeout = Duration::from_secs(cli.timeout);

        let state_file = cli
            .state_file
            .clone()
            .unwrap_or_else(|| default_state_dir(cli.network).join("wallet.json"));

        Self { config, state_file }
    }
}

fn default_state_dir(network: Network) -> PathBuf {
    let base = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("xvg");
    match network {
        Network::Mainnet => base,
        Network::Testnet => base.join("testnet"),
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let ctx = AppContext::from_cli(&cli);

    let result = match cli.command {
        Commands::Create {
            name,
            copayer,
            m,
            n,
            single_address,
        } => commands::create_wallet(&ctx, &name, copayer, m, n, single_address).await,
        Commands::Join { secret, copayer } => commands::join_wallet(&ctx, &secret, copayer).await,
        Commands::Open => commands::open_wallet(&ctx).await,
        Commands::Address => commands::create_address(&ctx).await,
        Commands::Addresses { limit, reverse } => {
            commands::show_addresses(&ctx, limit, reverse).await
        }
        Commands::Balance => commands::show_balance(&ctx).await,
        Commands::History { skip, limit } => commands::show_history(&ctx, skip, limit).await,
        Commands::Utxos { addresses } => commands::show_utxos(&ctx, &addresses).await,
        Commands::SendMax => commands::show_send_max(&ctx).await,
        Commands::Send {
            address,
            amount,
            message,
        } => commands::send(&ctx, &address, &amount, message.as_deref()).await,
        Commands::Secret => commands::show_secret(&ctx),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
