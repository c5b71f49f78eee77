use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deck_meta::api::routes::prices::DecklistPriceResponse;
use deck_meta::api::{build_router, cors_layer, state::AppState};
use deck_meta::calculate::{
    best_matching_decklist, decklist_price, export_decklist, group_by_leader,
    normalize_with_prices, rank_similar_leaders, select_card_ids, synthesize_decklist,
};
use deck_meta::config::AppConfig;
use deck_meta::models::{CardPrice, Currency, Decklist, MetaFormat, RawDecklistEntry, SimilarityMode};
use deck_meta::storage::{
    import_decklists, write_card_prices, DecklistSource, JsonlDecklistSource, JsonlReader,
    StorageConfig,
};

#[derive(Parser)]
#[command(name = "deck-meta")]
#[command(about = "Tournament decklist analytics for trading card games")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Import decklists and/or card prices from JSONL files
    Import {
        /// Tournament decklists, one submission per line
        #[arg(long)]
        decklists: Option<PathBuf>,

        /// Latest card prices, one card per line
        #[arg(long)]
        prices: Option<PathBuf>,
    },

    /// Print the decklist aggregate of a leader
    Aggregate {
        /// Leader card id (e.g. OP05-060)
        #[arg(long)]
        leader: String,

        /// Comma-separated meta formats (default: all stored)
        #[arg(long)]
        meta_format: Option<String>,
    },

    /// Rank leaders whose decklists overlap with a leader's
    Similar {
        #[arg(long)]
        leader: String,

        #[arg(long)]
        meta_format: Option<String>,

        /// "card_count" or "occurrence_weighted"
        #[arg(long)]
        mode: Option<String>,

        #[arg(long)]
        threshold: Option<f64>,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Price a decklist given as a JSON object of card id to count
    Price {
        #[arg(long)]
        decklist: PathBuf,

        /// "eur" or "usd" (default: both)
        #[arg(long)]
        currency: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level;
    }

    init_tracing(&config.log_level, cli.json_logs);
    tracing::info!("Starting deck-meta v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageConfig::new(config.data_dir.clone());
    let source = JsonlDecklistSource::new(storage.clone());

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let state = AppState::new(source, config.analytics.clone());
            let app = build_router(state).layer(cors_layer(&config.server.cors_origin));
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("binding {}", addr))?;
            tracing::info!("API listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Import { decklists, prices } => {
            if decklists.is_none() && prices.is_none() {
                bail!("nothing to import: pass --decklists and/or --prices");
            }
            if let Some(path) = decklists {
                let entries = JsonlReader::<RawDecklistEntry>::new(path.clone())
                    .read_all_strict()
                    .with_context(|| format!("reading decklists from {}", path.display()))?;
                let written = import_decklists(&storage, entries)?;
                for (meta_format, count) in written {
                    println!("{}: {} decklists", meta_format, count);
                }
            }
            if let Some(path) = prices {
                let card_prices = JsonlReader::<CardPrice>::new(path.clone())
                    .read_all_strict()
                    .with_context(|| format!("reading prices from {}", path.display()))?;
                let count = write_card_prices(&storage, &card_prices)?;
                println!("card prices: {}", count);
            }
        }
        Commands::Aggregate {
            leader,
            meta_format,
        } => {
            let meta_formats = resolve_meta_formats(meta_format.as_deref(), &source)?;
            let entries = source
                .fetch_tournament_decklists(&meta_formats, Some(std::slice::from_ref(&leader)))?;
            let lookup = source.fetch_card_price_lookup()?;
            tracing::info!("Aggregating {} decklists for {}", entries.len(), leader);

            let aggregate = normalize_with_prices(&entries, &lookup)
                .with_context(|| format!("no decklists for {} in {:?}", leader, meta_formats))?;
            let card_ids = select_card_ids(
                &aggregate,
                config.analytics.occurrence_threshold,
                &[leader.as_str()],
            );
            let representative = best_matching_decklist(&entries, &aggregate);
            let fictive = synthesize_decklist(&aggregate, &leader);

            let output = serde_json::json!({
                "leader_id": leader,
                "aggregate": aggregate,
                "card_ids": card_ids,
                "representative_decklist": representative,
                "fictive_decklist": fictive,
                "fictive_export": export_decklist(&fictive, &leader),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Similar {
            leader,
            meta_format,
            mode,
            threshold,
            limit,
        } => {
            let meta_formats = resolve_meta_formats(meta_format.as_deref(), &source)?;
            let mode = match mode {
                Some(mode) => mode.parse::<SimilarityMode>().map_err(anyhow::Error::msg)?,
                None => config.analytics.similarity_mode,
            };
            let threshold = threshold.unwrap_or(config.analytics.similarity_threshold);
            let limit = limit.unwrap_or(config.analytics.similar_leaders_limit);

            let entries = source.fetch_tournament_decklists(&meta_formats, None)?;
            let groups = group_by_leader(&entries);
            let target = groups
                .get(&leader)
                .with_context(|| format!("no decklists for {} in {:?}", leader, meta_formats))?;

            let mut ranked = rank_similar_leaders(target, &leader, &groups, threshold, mode)?;
            ranked.truncate(limit);
            println!("{}", serde_json::to_string_pretty(&ranked)?);
        }
        Commands::Price { decklist, currency } => {
            let contents = std::fs::read_to_string(&decklist)
                .with_context(|| format!("reading {}", decklist.display()))?;
            let decklist: Decklist = serde_json::from_str(&contents)?;
            let lookup = source.fetch_card_price_lookup()?;

            let price = |currency| decklist_price(&decklist, &lookup, currency);
            let response = match currency {
                Some(c) => {
                    let currency = c.parse::<Currency>().map_err(anyhow::Error::msg)?;
                    DecklistPriceResponse::Single {
                        currency,
                        price: price(currency),
                    }
                }
                None => DecklistPriceResponse::Both {
                    eur: price(Currency::Eur),
                    usd: price(Currency::Usd),
                },
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn resolve_meta_formats(arg: Option<&str>, source: &dyn DecklistSource) -> Result<Vec<MetaFormat>> {
    let formats = match arg {
        Some(value) => MetaFormat::parse_list(value),
        None => source.meta_formats()?,
    };
    if formats.is_empty() {
        bail!("no meta formats selected and none stored under the data directory");
    }
    Ok(formats)
}
