//! Main entry point for the Korean i18n batch translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ko_i18n_translator::cli::commands::{self, Commands};
use ko_i18n_translator::TranslatorConfig;

/// Korean → 21-language i18n batch translator
#[derive(Parser, Debug)]
#[command(name = "ko-i18n-translator", version, about, long_about = None)]
struct Args {
    /// API key (optional, defaults to GEMINI_API_KEY and friends)
    #[arg(long)]
    api_key: Option<String>,

    /// Model to use instead of GEMINI_MODEL
    #[arg(long)]
    model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ko_i18n_translator={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // CLI args take priority over the environment
    let mut config = TranslatorConfig::from_env()?;
    if let Some(api_key) = args.api_key {
        config = config.with_api_key(api_key);
    }
    if let Some(model) = args.model {
        config.model = model;
    }

    match args.command {
        Some(Commands::Translate {
            items,
            file,
            format,
            save,
        }) => {
            commands::handle_translate(config, items, file, format, save).await?;
        }
        Some(Commands::Languages) => commands::handle_languages(),
        Some(Commands::Schema) => commands::handle_schema()?,
        Some(Commands::Server { host, port }) => {
            commands::handle_server(config, host, port).await?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
