use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::Parser;
use po_translator::{
    CatalogTranslator, DeepLProvider, MockMode, MockTranslator, TranslationSummary,
    TranslatorConfig,
};
use tracing_subscriber::EnvFilter;

const API_KEY_ENV: &str = "DEEPL_API_KEY";

/// Translate PO files using the DeepL API
#[derive(Debug, Parser)]
#[command(name = "po-translator", version)]
struct Cli {
    /// Path to the PO file to translate
    po_file: PathBuf,

    /// Source language code (e.g. 'en')
    source_lang: String,

    /// Target language code (e.g. 'es')
    target_lang: String,

    /// DeepL API key (or set DEEPL_API_KEY environment variable)
    #[arg(long)]
    api_key: Option<String>,

    /// Use the mock translator instead of DeepL
    #[arg(short, long)]
    mock: bool,

    /// Abort when a translation loses or alters a placeholder
    #[arg(long)]
    strict_placeholders: bool,

    /// Log every entry
    #[arg(short, long)]
    verbose: bool,
}

/// The command line flag wins over the environment.
fn resolve_api_key(flag: Option<String>, env_value: Option<String>) -> Option<String> {
    flag.or(env_value).filter(|key| !key.trim().is_empty())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<TranslationSummary> {
    let config = TranslatorConfig::new(&cli.source_lang, &cli.target_lang)
        .with_strict_placeholders(cli.strict_placeholders);

    let api_key = if cli.mock {
        None
    } else {
        match resolve_api_key(cli.api_key, env::var(API_KEY_ENV).ok()) {
            Some(key) => Some(key),
            None => bail!(
                "DeepL API key is required. Provide it with --api-key or set {API_KEY_ENV} environment variable."
            ),
        }
    };

    if !cli.po_file.is_file() {
        bail!("PO file not found: {}", cli.po_file.display());
    }

    let summary = match api_key {
        Some(key) => {
            let provider = DeepLProvider::new(key).context("Failed to initialize translator")?;
            CatalogTranslator::new(provider, config)
                .translate_file(&cli.po_file)
                .await
        }
        None => {
            CatalogTranslator::new(MockTranslator::new(MockMode::Suffix), config)
                .translate_file(&cli.po_file)
                .await
        }
    }
    .with_context(|| format!("Error translating PO file {}", cli.po_file.display()))?;

    Ok(summary)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
