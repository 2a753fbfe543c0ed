use clap::Parser;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use nw_core::{CrawlState, Error, Result, Source, SourceStore};
use nw_pipeline::{CrawlReport, HttpFetcher, Pipeline};
use nw_web::{create_app, AppState};

#[derive(Debug, Clone)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                match c {
                    's' => total_seconds += num,
                    'm' => total_seconds += num * 60,
                    'h' => total_seconds += num * 3600,
                    'd' => total_seconds += num * 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                }
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A bare number is taken as seconds
        if !current_number.is_empty() {
            match current_number.parse::<u64>() {
                Ok(num) => {
                    total_seconds += num;
                    has_unit = true;
                }
                Err(_) => return Err("Invalid number in duration".to_string()),
            }
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Storage backend: "memory" or "sqlite:<path>"
    #[arg(long, default_value = "memory")]
    storage: String,
    /// Classification model: "heuristic" or "remote"
    #[arg(long, default_value = "heuristic")]
    model: String,
    /// Model endpoint, required for the remote model
    #[arg(long)]
    endpoint_url: Option<String>,
    #[arg(long)]
    api_key: Option<String>,
    /// Translation service endpoint; language normalization is skipped
    /// when unset
    #[arg(long)]
    translator_url: Option<String>,
    #[arg(long)]
    translator_key: Option<String>,
    /// Cap on links processed per source per crawl cycle
    #[arg(long, default_value_t = nw_pipeline::DEFAULT_MAX_LINKS_PER_SOURCE)]
    max_links: usize,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long, default_value = "0.0.0.0:3000")]
        addr: String,
    },
    /// Crawl one source, or every active source when none is named
    Crawl {
        source: Option<String>,
        /// Repeat interval (e.g. 30m, 1h15m, 1d)
        #[arg(long, default_value = "24h")]
        interval: HumanDuration,
        /// Run a single cycle instead of looping
        #[arg(long)]
        once: bool,
    },
    /// Ingest a single article URL
    Url { url: String },
    /// List registered sources and their crawl state
    Sources,
    /// Register a source
    AddSource {
        name: String,
        base_url: String,
        #[arg(long, default_value = "en")]
        language: String,
    },
}

async fn build_pipeline(cli: &Cli) -> Result<Arc<Pipeline>> {
    let storage = nw_storage::create_storage(&cli.storage).await?;
    info!("Storage initialized (using {})", cli.storage);

    let config = nw_inference::Config {
        endpoint_url: cli.endpoint_url.clone(),
        api_key: cli.api_key.clone(),
    };
    let classifier = nw_inference::build_classifier(&cli.model, &config).await?;
    info!("Classifier initialized (using {})", classifier.name());

    let fetcher = Arc::new(HttpFetcher::new()?);
    let mut pipeline =
        Pipeline::new(storage, classifier, fetcher).with_max_links(cli.max_links);

    if let Some(url) = &cli.translator_url {
        let key = cli.translator_key.clone().unwrap_or_default();
        let language = nw_inference::language::RemoteLanguageService::new(url.clone(), key);
        pipeline = pipeline.with_language(Arc::new(language));
        info!("Language normalization enabled via {}", url);
    }

    Ok(Arc::new(pipeline))
}

fn print_report(report: &CrawlReport) {
    info!(
        "{}: {} discovered, {} persisted, {} skipped, {} failed",
        report.source,
        report.discovered,
        report.persisted(),
        report.skipped(),
        report.failed()
    );
}

async fn crawl_cycle(pipeline: &Arc<Pipeline>, source: Option<&str>) -> Result<()> {
    match source {
        Some(name) => {
            let source = pipeline
                .storage()
                .get_source_by_name(name)
                .await?
                .ok_or_else(|| Error::SourceNotFound(name.to_string()))?;
            pipeline
                .storage()
                .set_crawl_state(source.id, CrawlState::Crawling, None)
                .await?;
            let report = pipeline.run_source(&source).await?;
            print_report(&report);
        }
        None => {
            for report in pipeline.crawl_all().await? {
                print_report(&report);
            }
        }
    }
    Ok(())
}

fn print_source(source: &Source) {
    println!(
        "{:<4} {:<24} {:<12} {}",
        source.id,
        source.name,
        source.crawl_state.as_str(),
        source.base_url
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let pipeline = build_pipeline(&cli).await?;

    match &cli.command {
        Commands::Serve { addr } => {
            let app = create_app(AppState::new(pipeline));
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!("Listening on {}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Crawl {
            source,
            interval,
            once,
        } => {
            if *once {
                crawl_cycle(&pipeline, source.as_deref()).await?;
            } else {
                info!(
                    "Running in periodic mode, one cycle every {}s",
                    interval.0.as_secs()
                );
                loop {
                    if let Err(e) = crawl_cycle(&pipeline, source.as_deref()).await {
                        error!("Crawl cycle failed: {}", e);
                    }
                    info!("Waiting {}s before next cycle", interval.0.as_secs());
                    tokio::time::sleep(interval.0).await;
                }
            }
        }
        Commands::Url { url } => {
            let article = pipeline.process_url(url).await?;
            println!(
                "{}\n  category: {} ({})\n  sentiment: {} [{} / {} / {}]",
                article.title,
                article.category,
                article.owner,
                article.sentiment,
                article.negative_score,
                article.neutral_score,
                article.positive_score
            );
        }
        Commands::Sources => {
            let sources = pipeline.storage().list_sources().await?;
            if sources.is_empty() {
                println!("No sources registered");
            }
            for source in &sources {
                print_source(source);
            }
        }
        Commands::AddSource {
            name,
            base_url,
            language,
        } => {
            let mut new_source = nw_core::NewSource::new(name, base_url);
            new_source.language = language.clone();
            let source = pipeline.storage().insert_source(&new_source).await?;
            info!("Registered source {} (id {})", source.name, source.id);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_duration_units() {
        assert_eq!(
            HumanDuration::from_str("1h15m30s").unwrap().0,
            Duration::from_secs(3600 + 15 * 60 + 30)
        );
        assert_eq!(HumanDuration::from_str("2d").unwrap().0, Duration::from_secs(172800));
        assert_eq!(HumanDuration::from_str("45").unwrap().0, Duration::from_secs(45));
    }

    #[test]
    fn test_human_duration_rejects_garbage() {
        assert!(HumanDuration::from_str("1x").is_err());
        assert!(HumanDuration::from_str("").is_err());
        assert!(HumanDuration::from_str("h").is_err());
    }
}
