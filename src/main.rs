use std::path::PathBuf;

use clap::{Parser, Subcommand};

use farm_checkout::blockchain::{BlockchainClient, ChainFinalizer, Wallet};
use farm_checkout::checkout::{
    AuthToken, BlockBucksPurchase, CheckoutClient, Currency, Finalizer, Outcome, PurchaseIntent,
    Withdrawal, Withdrawals,
};
use farm_checkout::config::{load_config, CheckoutConfig};
use farm_checkout::observability::{logging, metrics};
use farm_checkout::orchestrator::price_for;

#[derive(Parser)]
#[command(name = "farm-checkout")]
#[command(about = "Withdraw farm assets and buy Block Bucks through the game API", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    farm_id: u64,

    /// Session token for the game API.
    #[arg(short, long, env = "CHECKOUT_AUTH_TOKEN", hide_env_values = true)]
    token: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Withdraw SFL to the wallet
    WithdrawSfl {
        #[arg(long)]
        amount: f64,
    },
    /// Withdraw collectibles
    WithdrawItems {
        #[arg(long, value_delimiter = ',')]
        ids: Vec<u32>,
        #[arg(long, value_delimiter = ',')]
        amounts: Vec<String>,
    },
    /// Withdraw wearables
    WithdrawWearables {
        #[arg(long, value_delimiter = ',')]
        ids: Vec<u32>,
        #[arg(long, value_delimiter = ',')]
        amounts: Vec<u64>,
    },
    /// Withdraw the farm's Bumpkin
    WithdrawBumpkin {
        #[arg(long)]
        bumpkin_id: u64,
    },
    /// Buy a Block Bucks bundle with MATIC
    BuyBlockBucks {
        #[arg(long)]
        amount: u32,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => CheckoutConfig::default(),
    };
    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        network = ?config.network,
        api_url = %config.api.url,
        blockchain_enabled = config.blockchain.enabled,
        "farm-checkout v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let wallet = Wallet::from_env(config.blockchain.chain_id)?;
    let chain = BlockchainClient::new(config.blockchain.clone(), &wallet).await?;
    let finalizer = ChainFinalizer::new(chain)?;
    let client = CheckoutClient::new(config.api.url.as_str());
    let token = AuthToken::new(cli.token);

    let outcome = match cli.command {
        Commands::WithdrawSfl { amount } => {
            withdraw(client, finalizer, cli.farm_id, Withdrawal::Sfl { sfl: amount }, token).await?
        }
        Commands::WithdrawItems { ids, amounts } => {
            withdraw(client, finalizer, cli.farm_id, Withdrawal::Items { ids, amounts }, token)
                .await?
        }
        Commands::WithdrawWearables { ids, amounts } => {
            let withdrawal = Withdrawal::Wearables { ids, amounts };
            withdraw(client, finalizer, cli.farm_id, withdrawal, token).await?
        }
        Commands::WithdrawBumpkin { bumpkin_id } => {
            let withdrawal = Withdrawal::Bumpkin { bumpkin_id };
            withdraw(client, finalizer, cli.farm_id, withdrawal, token).await?
        }
        Commands::BuyBlockBucks { amount } => {
            let price = price_for(amount)
                .ok_or_else(|| format!("No bundle of {} Block Bucks", amount))?;
            let intent = PurchaseIntent::new(
                cli.farm_id,
                BlockBucksPurchase {
                    currency: Currency::Matic,
                    amount: price.amount,
                },
                token,
            );
            tracing::info!(
                amount = price.amount,
                usd = %price.usd(),
                transaction_id = %intent.transaction_id,
                "Buying Block Bucks"
            );
            let call = client.request_block_bucks(&intent).await?;
            Outcome::verified(finalizer.finalize(call).await?)
        }
    };

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn withdraw(
    client: CheckoutClient,
    finalizer: ChainFinalizer,
    farm_id: u64,
    withdrawal: Withdrawal,
    token: AuthToken,
) -> Result<Outcome, Box<dyn std::error::Error>> {
    let intent = PurchaseIntent::new(farm_id, withdrawal, token);
    tracing::info!(
        operation = intent.request.path(),
        transaction_id = %intent.transaction_id,
        "Starting withdrawal"
    );
    Ok(Withdrawals::new(client, finalizer).withdraw(&intent).await?)
}
