//! CLI command definitions and handlers

use clap::{Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use crate::core::config::TranslatorConfig;
use crate::core::models::MAX_BATCH_ITEMS;

/// Output layout for translated records
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned table, one row per item
    Table,
    /// Pretty-printed JSON list
    Json,
    /// Tab-separated rows (spreadsheet paste)
    Tsv,
}

/// Commands for the i18n batch translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate Korean strings into every export language
    Translate {
        /// Korean text items
        items: Vec<String>,

        /// Read items from a file, one per line
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Also write translated_export_<date>.json into this directory
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// List supported languages in export order
    Languages,

    /// Print the response schema sent to the service
    Schema,

    /// Start HTTP API server
    Server {
        /// Bind address (default: 0.0.0.0)
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Listen port (default: 8000)
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
}

/// Items from the command line followed by those read from `file`.
///
/// Blank lines are skipped; at most [`MAX_BATCH_ITEMS`] items are accepted.
pub fn collect_items(items: Vec<String>, file: Option<&Path>) -> anyhow::Result<Vec<String>> {
    let mut collected: Vec<String> = items
        .into_iter()
        .filter(|item| !item.trim().is_empty())
        .collect();

    if let Some(path) = file {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
        collected.extend(
            content
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string),
        );
    }

    if collected.is_empty() {
        anyhow::bail!("No text to translate. Pass items as arguments or with --file");
    }
    if collected.len() > MAX_BATCH_ITEMS {
        anyhow::bail!(
            "At most {} items can be translated at once (got {})",
            MAX_BATCH_ITEMS,
            collected.len()
        );
    }

    Ok(collected)
}

/// Handle translate command
pub async fn handle_translate(
    config: TranslatorConfig,
    items: Vec<String>,
    file: Option<PathBuf>,
    format: OutputFormat,
    save: Option<PathBuf>,
) -> anyhow::Result<()> {
    use crate::core::client::TranslationClient;
    use crate::processors::{export, table};
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::{Duration, Instant};
    use tracing::info;

    let items = collect_items(items, file.as_deref())?;
    let client = TranslationClient::from_config(&config)?;

    let start_time = Instant::now();
    info!("Starting translation of {} items", items.len());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(format!("Translating {} items into 21 languages...", items.len()));
    pb.enable_steady_tick(Duration::from_millis(120));

    let result = client.translate(items).await;
    pb.finish_and_clear();

    let records = match result {
        Ok(records) => records,
        Err(e) => {
            eprintln!("❌ {}", e.user_message());
            return Err(e.into());
        }
    };

    match format {
        OutputFormat::Table => println!("{}", table::render(&records)),
        OutputFormat::Json => println!("{}", export::to_pretty_json(&records)?),
        OutputFormat::Tsv => println!("{}", export::to_tsv(&records)),
    }

    if let Some(dir) = save {
        let path = export::write_export_today(&dir, &records)?;
        println!("\n📝 Exported to {}", path.display());
    }

    info!(
        "Completed: {} records in {:?}",
        records.len(),
        start_time.elapsed()
    );

    Ok(())
}

/// Handle languages command
pub fn handle_languages() {
    use crate::core::language::Language;

    for (i, lang) in Language::ALL.iter().enumerate() {
        let marker = if lang.is_source() { "  (source)" } else { "" };
        println!("{:>2}. {:<20} {}{}", i + 1, lang.field_name(), lang.display_name(), marker);
    }
}

/// Handle schema command
pub fn handle_schema() -> anyhow::Result<()> {
    let schema = crate::core::schema::record_schema();
    println!("{}", serde_json::to_string_pretty(schema)?);
    Ok(())
}

/// Handle server command
pub async fn handle_server(config: TranslatorConfig, host: String, port: u16) -> anyhow::Result<()> {
    use crate::server::api::run_server;
    use tracing::info;

    info!("Starting HTTP server on {}:{}", host, port);
    println!("🚀 Server starting on http://{}:{}", host, port);

    run_server(host, port, config).await?;

    Ok(())
}
