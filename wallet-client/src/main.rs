use std::io::Write;

use anyhow::{Context, Result};
use multinet_wallet_lib::{
    ClientConfig, ConfigStore, SessionMode, SessionSnapshot, TransferSnapshot, WalletContext,
    WalletError, WalletResult,
};
use tokio::io::{AsyncBufReadExt, BufReader};

const CONFIG_PATH_VAR: &str = "WALLET_CONFIG";

const HELP: &str = "\
Commands:
  generate              Generate a new wallet (Bitcoin & Ethereum)
  import                Start importing an existing private key
  key <hex>             Type the private key to import
  submit                Import the typed key
  cancel                Leave import mode
  connect               Connect to Ethereum
  balance               Check ETH balance
  send [<to> <amount>]  Send ETH (without arguments, retries the last form)
  wif                   Show the wallet's WIF
  status                Show wallet and transfer state
  health                Check the wallet service
  help                  Show this help
  quit                  Exit";

enum Flow {
    Continue,
    Quit,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = load_config().context("Failed to load configuration")?;
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    let context = WalletContext::initialize(config).context("Failed to start wallet client")?;

    println!("=== Multi-Network Wallet ===");
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if let Flow::Quit = run_command(&context, line.trim()).await {
            break;
        }
    }

    println!("exiting....");
    Ok(())
}

fn load_config() -> Result<ClientConfig> {
    match std::env::var(CONFIG_PATH_VAR) {
        Ok(path) if !path.trim().is_empty() => {
            let store = ConfigStore::new(path.trim());
            let mut config = store
                .load_or_default("development")
                .with_context(|| format!("Failed to read {}", store.path().display()))?;
            config.apply_overrides(|key| std::env::var(key).ok())?;
            Ok(config)
        }
        _ => Ok(ClientConfig::from_env()?),
    }
}

async fn run_command(context: &WalletContext, line: &str) -> Flow {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return Flow::Continue;
    };
    let args: Vec<&str> = parts.collect();
    let session = context.session();
    let transfer = context.transfer();

    match command {
        "generate" => report(session.generate_wallet().await.map(|_| ()), context),
        "import" => match session.enter_import_mode() {
            Ok(true) => println!("Type `key <hex>` and then `submit`, or `cancel`."),
            Ok(false) => println!("A wallet is already loaded."),
            Err(err) => print_error(&err),
        },
        "key" => {
            if !session.set_import_input(&args.join(" ")) {
                println!("Run `import` first.");
            }
        }
        "submit" => report(session.import_from_input().await.map(|_| ()), context),
        "cancel" => match session.cancel_import_mode() {
            Ok(true) => println!("Import cancelled."),
            Ok(false) => println!("Not importing."),
            Err(err) => print_error(&err),
        },
        "connect" => report(session.connect().await, context),
        "balance" => report(session.refresh_balance().await.map(|_| ()), context),
        "send" => {
            let result = match args.as_slice() {
                [] => transfer.submit().await,
                [to, amount] => transfer.send_funds(to, amount).await,
                _ => {
                    println!("Usage: send <to> <amount>");
                    return Flow::Continue;
                }
            };
            match result {
                Ok(tx_hash) => println!("Transaction sent! Hash: {}", tx_hash),
                Err(err) => print_error(&err),
            }
        }
        "wif" => match session.reveal_wif() {
            Some(wif) => println!("WIF (Wallet Import Format): {}", wif.as_str()),
            None => println!("No WIF available."),
        },
        "status" => {
            let (session, transfer) = context.snapshot();
            render(&session, &transfer);
        }
        "health" => match context.health().await {
            Ok(health) => println!("Service status: {}", health.status),
            Err(err) => print_error(&err),
        },
        "help" => println!("{}", HELP),
        "quit" | "exit" => return Flow::Quit,
        other => println!("Invalid option: {}", other),
    }

    Flow::Continue
}

fn report(result: WalletResult<()>, context: &WalletContext) {
    match result {
        Ok(()) => {
            let (session, transfer) = context.snapshot();
            render(&session, &transfer);
        }
        Err(err) => print_error(&err),
    }
}

/// Local rejections are hints about what to do next; remote failures are errors.
fn print_error(err: &WalletError) {
    if err.is_local() {
        println!("{}", err);
    } else {
        println!("Error: {}", err);
    }
}

fn render(session: &SessionSnapshot, transfer: &TransferSnapshot) {
    match &session.identity {
        Some(identity) => {
            println!("Bitcoin Address:  {}", identity.btc_address);
            println!("Ethereum Address: {}", identity.eth_address);
            if identity.has_wif {
                println!("WIF available (use `wif` to show it)");
            }
        }
        None if session.mode == SessionMode::AwaitingImportInput => {
            println!("Waiting for a private key to import.")
        }
        None => println!("No wallet loaded."),
    }

    println!(
        "Ethereum: {}",
        if session.connected {
            "connected"
        } else {
            "not connected"
        }
    );
    if let Some(balance) = &session.balance {
        println!("ETH Balance: {}", balance.display_eth());
    }
    if let Some(err) = &session.last_error {
        println!("Wallet error: {}", err);
    }

    if !transfer.recipient.is_empty() || !transfer.amount.is_empty() {
        println!(
            "Pending form: {} ETH to {}",
            transfer.amount, transfer.recipient
        );
    }
    if let Some(tx) = &transfer.last_tx_id {
        println!("Last transaction: {}", tx);
    }
    if let Some(err) = &transfer.last_error {
        println!("Transfer error: {}", err);
    }
}
