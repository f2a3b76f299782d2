mod config;

use anyhow::{bail, Context, Result};
use clap::Parser;
use config::Overrides;
use core_logic::{
    log_summary, setup_logger, shutdown_token, CachedSymbolResolver, ChainBuilder,
    ChainRegistryResolver, EvmTransferClient, Explorer, LogReportSink, WalletManager,
};
use dotenv::dotenv;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Send a batch of native-asset transfers", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Network table in the config, e.g. `testnet`
    #[arg(long, default_value = "testnet")]
    network: String,

    /// Chain under the network; optional when only one is configured
    #[arg(long)]
    chain: Option<String>,

    #[arg(short, long)]
    recipient: Option<String>,

    /// Number of transfers
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Fixed amount per transfer
    #[arg(long, conflicts_with_all = ["min", "max"])]
    amount: Option<f64>,

    #[arg(long, requires = "max")]
    min: Option<f64>,

    #[arg(long, requires = "min")]
    max: Option<f64>,

    /// Write the batch summary as JSON to this path
    #[arg(long)]
    export_summary: Option<String>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            recipient: self.recipient.clone(),
            transactions: self.count,
            amount: self.amount,
            min: self.min,
            max: self.max,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let _guard = setup_logger();

    let args = Args::parse();
    info!("Loading config from: {}", args.config);

    let config = config::load(&args.config, &args.overrides())
        .with_context(|| format!("Failed to load config from {}", args.config))?;

    let chain_name = match &args.chain {
        Some(name) => name.clone(),
        None => match config.available_chains(&args.network).as_slice() {
            [only] => only.to_string(),
            available => bail!(
                "Select a chain with --chain (configured for {}: {})",
                args.network,
                available.join(", ")
            ),
        },
    };
    let chain = config.chain(&args.network, &chain_name)?.clone();

    let wallets = WalletManager::load()?;
    info!("Loaded {} keys.", wallets.count());
    let keys: Vec<&str> = wallets.private_keys().iter().map(|k| k.as_str()).collect();

    let plan = ChainBuilder::new()
        .with_chain(chain.clone())
        .with_batch(config.batch.clone())
        .with_private_keys(&keys)
        .build()?;

    let client = EvmTransferClient::connect(&plan.pool, chain.chain_id).await?;

    let symbol = match &chain.native_symbol {
        Some(symbol) => symbol.clone(),
        None => {
            let resolver = CachedSymbolResolver::new(ChainRegistryResolver::new()?);
            resolver.resolve_or_default(client.signing_chain_id()).await
        }
    };

    let explorer = Explorer::from_chain(&chain);
    info!(
        "{}/{}: sending {} transfers to {}",
        args.network,
        chain_name,
        plan.count,
        explorer.address_url(&plan.recipient)
    );

    let mut sink = LogReportSink::new(explorer, symbol.clone());
    let (dispatcher, mut pool, count) = plan.into_dispatcher(client);
    let cancel = shutdown_token();

    let report = dispatcher.run(&mut pool, count, &mut sink, &cancel).await?;
    log_summary(&report.summary, &symbol);

    for status in pool.health_status() {
        if status.failure_count > 0 {
            warn!(
                "Endpoint {} ended with {} consecutive failure(s)",
                status.url, status.failure_count
            );
        }
    }

    if let Some(path) = &args.export_summary {
        report
            .summary
            .export_to_file(path)
            .await
            .with_context(|| format!("Failed to write summary to {}", path))?;
        info!("Summary written to {}", path);
    }

    Ok(())
}
