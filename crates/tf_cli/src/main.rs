use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tf_core::{AnalysisRequest, Config, Pipeline};
use tf_inference::models::create_analyzer;
use tf_scraper::{HttpFetcher, ReadabilityExtractor};
use tf_storage::{create_cache, StorageKind};
use tf_web::{create_app, AppState};
use tracing::info;

mod logging;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fetch, extract and analyze web articles", long_about = None)]
pub struct Cli {
    /// Where analysis results are cached: memory, sqlite or dynamodb
    #[arg(long, env = "TF_STORAGE", default_value = "memory", global = true)]
    storage: StorageKind,
    /// Verbose logging
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a single URL and print the result as JSON
    Analyze {
        url: String,
        /// Include the extracted article text in the output
        #[arg(short, long)]
        verbose: bool,
    },
    /// Run the HTTP API
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

async fn build_pipeline(config: &Config, storage: StorageKind) -> anyhow::Result<Pipeline> {
    let provider = config.provider();
    let analyzer = create_analyzer(&provider, config)?;
    info!("🧠 Analysis provider: {}", provider.name());

    let cache = create_cache(storage, config)
        .await
        .with_context(|| format!("could not open {} storage", storage))?;

    Ok(Pipeline::new(
        Arc::new(HttpFetcher::from_config(config)?),
        Arc::new(ReadabilityExtractor::new()),
        analyzer,
    )
    .with_cache(cache)
    .with_freshness(config.freshness))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_logging(cli.debug);

    let config = Config::from_env()?;
    tracing::debug!("{:?}", config);
    let pipeline = build_pipeline(&config, cli.storage).await?;

    match cli.command {
        Commands::Analyze { url, verbose } => {
            let result = pipeline.analyze(&AnalysisRequest::new(url, verbose)).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if result.success {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Serve { host, port } => {
            let app = create_app(AppState::new(Arc::new(pipeline)));
            let listener = tokio::net::TcpListener::bind((host.as_str(), port))
                .await
                .with_context(|| format!("could not bind {}:{}", host, port))?;
            info!("🌐 API server listening on {}", listener.local_addr()?);
            axum::serve(listener, app).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
