use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use tipjar_wallet_lib::recipient::donation_recipients;
use tipjar_wallet_lib::{
    recipient_for, supported_networks, DonationContext, DonationController, JsonRpcProvider,
    TransferOutcome, WalletError, WalletResult,
};

#[derive(Parser)]
#[command(name = "tipjar")]
#[command(about = "Tip jar donation client for a JSON-RPC wallet node")]
struct Cli {
    /// Directory holding the config and session files.
    #[arg(long, env = "TIPJAR_HOME")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported networks and their donation recipient.
    Networks,
    /// Connect and print the discovered balances.
    Balances,
    /// Donate `amount` of the token with selection key `token` ("native" or a contract address).
    Donate {
        token: String,
        #[arg(required_unless_present = "max")]
        amount: Option<String>,
        /// Donate the full balance of the token, ignoring `amount`.
        #[arg(long)]
        max: bool,
    },
    /// Forget the remembered session.
    Disconnect,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> WalletResult<()> {
    if let Commands::Networks = cli.command {
        print!("{}", networks_report());
        return Ok(());
    }

    let root = cli.data_dir.unwrap_or_else(default_data_dir);
    let context = DonationContext::initialize(root)?;
    let provider = JsonRpcProvider::new(&context.config().rpc)?;
    let controller = context.build_controller(provider);

    match cli.command {
        Commands::Networks => Ok(()),
        Commands::Balances => {
            ensure_connected(&controller).await?;
            print_json(&controller.view())
        }
        Commands::Donate { token, amount, max } => {
            ensure_connected(&controller).await?;
            controller.select_token(Some(&token))?;
            match amount {
                Some(amount) if !max => controller.set_amount(&amount),
                _ => {
                    controller.use_max_amount()?;
                }
            }

            let outcome = controller.donate().await?;
            print_json(&outcome)?;
            if let TransferOutcome::Submitted { .. } = outcome {
                controller.refresh_after_delay().await;
                print_json(&controller.view().balances)?;
            }
            Ok(())
        }
        Commands::Disconnect => {
            controller.disconnect();
            Ok(())
        }
    }
}

async fn ensure_connected(controller: &DonationController<JsonRpcProvider>) -> WalletResult<()> {
    if controller.restore().await?.is_none() {
        controller.connect().await?;
    }
    Ok(())
}

/// Network table followed by every donation address, one per line.
fn networks_report() -> String {
    let mut report = String::new();
    for network in supported_networks() {
        report.push_str(&format!(
            "{:<8} {:<16} {:<4} {}\n",
            network.chain_id,
            network.name,
            network.native_currency_symbol,
            recipient_for(Some(network)).unwrap_or("-")
        ));
    }
    report.push('\n');
    for recipient in donation_recipients() {
        report.push_str(&format!(
            "{:<8} {}\n",
            format!("{:?}", recipient.address_format).to_lowercase(),
            recipient.address
        ));
    }
    report
}

fn default_data_dir() -> PathBuf {
    std::env::var("HOME")
        .map(|home| PathBuf::from(home).join(".tipjar"))
        .unwrap_or_else(|_| PathBuf::from(".tipjar"))
}

fn print_json<T: Serialize>(value: &T) -> WalletResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(WalletError::from)?;
    println!("{}", text);
    Ok(())
}
