//! Retail Q&A service entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config (file, then env overrides)
//!   3. Resolve effective log level (CLI `-v` flags > RUST_LOG > config)
//!   4. Init logger once
//!   5. Build the LLM provider and the answer policy
//!   6. Spawn Ctrl-C → shutdown signal watcher
//!   7. Serve HTTP until shutdown

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use retail_qa::{answer::Answerer, config, error::AppError, http, llm::providers, logger};

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present; the file is optional.
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    logger::init(effective_log_level, args.log_level.is_some())?;

    info!(
        bind = %config.server.bind,
        catalog = %config.catalog.path.display(),
        provider = %config.llm.provider,
        model = %config.llm.openrouter.model,
        api_key_set = config.llm_api_key.is_some(),
        effective_log_level = %effective_log_level,
        "config loaded"
    );

    let provider = providers::build(&config.llm, config.llm_api_key.clone())?;
    if config.llm_api_key.is_none() && provider.name() == "openrouter" {
        warn!("OPENROUTER_API_KEY not set, every question will use fallback answers");
    }
    let answerer = Answerer::new(provider);

    // Shared shutdown token. Ctrl-C cancels it, the server watches it.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    http::serve(&config, answerer, shutdown).await
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: retail-qa [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("  -v, -vv, -vvv, -vvvv       Set logging verbosity (warn, info, debug, trace)");
                println!();
                println!("Environment:");
                println!("  OPENROUTER_API_KEY         Provider API key; unset means local fallback answers only");
                println!("  CEREBRAS_MODEL             Model override");
                println!("  RETAIL_QA_BIND             Listen address override");
                println!("  RETAIL_QA_CATALOG          Catalog file override");
                println!("  RETAIL_QA_LOG_LEVEL        Log level override");
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    CliArgs { log_level: logger::level_for_verbosity(verbosity), config_path }
}
