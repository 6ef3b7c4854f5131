use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use zoneconf::{
    CacheController, ConfigFetcher, FetcherConfig, HttpTransport, NoopCacheStore,
    SignatureVerifier, TrustStore, ZoneCode,
};

#[derive(Parser)]
#[command(
    name = "zoneconf",
    about = "Fetch and verify signed configuration bundles",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch and verify the bundle for a zone.
    Fetch {
        /// Zone code (e.g. DE).
        #[arg(long)]
        zone: String,

        /// Override the distribution base URL.
        #[arg(long)]
        url: Option<String>,

        /// Write the verified payload to this file.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Evict all cached bundle responses.
    Evict,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:?}");
            1
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Command::Fetch { zone, url, out } => {
            let mut config = FetcherConfig::from_env();
            if let Some(url) = url {
                config = config.with_base_url(url);
            }
            let fetcher = build_fetcher(&config)?;

            let download = match fetcher.fetch(&ZoneCode::new(zone)).await {
                Ok(download) => download,
                Err(e) => {
                    eprintln!("error: {e}");
                    return Ok(e.exit_code());
                }
            };

            println!("server time : {}", download.server_time.to_rfc3339());
            println!("clock offset: {} ms", download.local_offset.num_milliseconds());
            println!("payload     : {} bytes", download.raw_data.len());

            if let Some(path) = out {
                std::fs::write(&path, &download.raw_data)
                    .with_context(|| format!("writing payload to {}", path.display()))?;
                println!("written to  : {}", path.display());
            }
            Ok(0)
        }

        Command::Evict => {
            // The CLI carries no persistent HTTP cache store yet, so there
            // is nothing to evict.
            let controller = CacheController::new(Arc::new(NoopCacheStore));
            match controller.evict_all().await {
                Ok(()) => {
                    println!("no cache store configured, nothing to evict");
                    Ok(0)
                }
                Err(e) => {
                    eprintln!("error: {e}");
                    Ok(e.exit_code())
                }
            }
        }
    }
}

fn build_fetcher(config: &FetcherConfig) -> anyhow::Result<ConfigFetcher> {
    let trust = TrustStore::from_encoded_keys(&config.trusted_keys)
        .context("loading trusted keys from configuration")?;
    let transport = HttpTransport::new(config).context("building HTTP transport")?;

    Ok(ConfigFetcher::new(
        Arc::new(transport),
        SignatureVerifier::new(trust),
        CacheController::new(Arc::new(NoopCacheStore)),
    ))
}
