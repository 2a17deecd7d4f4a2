use brewlens::commands::{self, BrowseOptions};
use brewlens::config::PAGE_SIZE_CHOICES;
use brewlens::{BrewApi, CatalogCache, Config, FilePageStore, IndexJump, PackageKind};
use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "brewlens")]
#[command(author, version, about = "Browse and search Homebrew formulae and casks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Homebrew JSON API base URL (overrides BREWLENS_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List a catalog page by page, optionally filtered
    #[command(alias = "search")]
    Browse {
        /// Substring to search for in names and descriptions
        query: Option<String>,

        /// Browse casks instead of formulae
        #[arg(long)]
        cask: bool,

        /// Page to show (clamped to the last page)
        #[arg(short, long)]
        page: Option<usize>,

        /// Items per page
        #[arg(long, value_parser = parse_page_size)]
        per_page: Option<usize>,

        /// Jump to the first package starting with this letter ('#' for page 1)
        #[arg(short, long, value_parser = parse_index_key, conflicts_with_all = ["query", "page"])]
        letter: Option<IndexJump>,
    },

    /// Show details for a formula or cask
    Info {
        /// Formula name or cask token
        token: String,

        /// Only look for a cask
        #[arg(long, conflicts_with = "formula")]
        cask: bool,

        /// Only look for a formula
        #[arg(long)]
        formula: bool,

        /// Print the detail view as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve the package API over HTTP
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind
        #[arg(long, default_value_t = 3000)]
        port: u16,

        /// Fetch both catalogs before accepting requests
        #[arg(long)]
        warm: bool,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn parse_page_size(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) | Err(_) => Err(format!(
            "expected a positive number (usual choices: {:?})",
            PAGE_SIZE_CHOICES
        )),
        Ok(size) => Ok(size),
    }
}

fn parse_index_key(raw: &str) -> Result<IndexJump, String> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(key), None) => {
            IndexJump::parse(key).ok_or_else(|| format!("'{}' is not a letter or '#'", key))
        }
        _ => Err("expected a single letter or '#'".to_string()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    brewlens::output::init_colors();

    let mut config = Config::from_env()?;
    if let Some(base) = cli.api_base {
        config.api_base = base.trim_end_matches('/').to_string();
    }

    let api = BrewApi::with_config(&config)?;
    let cache = CatalogCache::new(api, config.catalog_ttl);

    match cli.command {
        Some(Commands::Browse {
            query,
            cask,
            page,
            per_page,
            letter,
        }) => {
            let store = FilePageStore::new(config.page_state_path());
            let options = BrowseOptions {
                kind: if cask { PackageKind::Cask } else { PackageKind::Formula },
                query,
                page,
                per_page: per_page.unwrap_or(config.page_size),
                jump: letter,
            };
            commands::browse(&cache, &store, &options).await?;
        }
        Some(Commands::Info {
            token,
            cask,
            formula,
            json,
        }) => {
            let kind = match (cask, formula) {
                (true, _) => Some(PackageKind::Cask),
                (_, true) => Some(PackageKind::Formula),
                _ => None,
            };
            commands::info(&cache, &config.api_base, &token, kind, json).await?;
        }
        Some(Commands::Serve { host, port, warm }) => {
            commands::serve(Arc::new(cache), &config.api_base, &host, port, warm).await?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "brewlens", &mut std::io::stdout());
        }
        None => {
            println!("{} brewlens - browse Homebrew formulae and casks", "🍺".bold());
            println!("\nRun {} to see available commands.", "brewlens --help".cyan());
        }
    }

    Ok(())
}
