use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{AppContext, BuildSource};

#[derive(Parser)]
#[command(
    name = "omnigraph",
    version,
    about = "Build a knowledge graph from text with an LLM and query it in plain language",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file (environment variables are used otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Use a throwaway in-process graph instead of Neo4j
    #[arg(long, global = true, default_value = "false")]
    in_memory: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate input, reset the graph and extract facts into it
    #[command(group(ArgGroup::new("input").required(true).args(["text", "file", "url"])))]
    Build {
        /// Text to build from
        #[arg(short, long)]
        text: Option<String>,

        /// UTF-8 text file to build from
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Web page to build from (text of its paragraphs)
        #[arg(short, long)]
        url: Option<String>,

        /// Questions to ask once the graph is built
        #[arg(short, long)]
        ask: Vec<String>,
    },

    /// Ask a question about the current graph
    Ask {
        /// Question in plain language
        question: String,

        /// Print the generated Cypher query
        #[arg(long, default_value = "false")]
        show_query: bool,
    },

    /// Delete every node and relationship in the graph
    Reset,

    /// Check the graph store connection once
    Ping,

    /// Ping the graph store on an interval until interrupted
    Watch {
        /// Seconds between pings (overrides configuration)
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = commands::load_config(cli.config.as_deref())?;
    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    tracing::info!("Starting omnigraph v{}", env!("CARGO_PKG_VERSION"));

    let ctx = AppContext::new(config, cli.in_memory).await?;

    let ok = match cli.command {
        Commands::Build {
            text,
            file,
            url,
            ask,
        } => {
            let source = match (text, file, url) {
                (Some(text), _, _) => BuildSource::Text(text),
                (_, Some(file), _) => BuildSource::File(file),
                (_, _, Some(url)) => BuildSource::Url(url),
                _ => anyhow::bail!("one of --text, --file or --url is required"),
            };
            commands::build(&ctx, source, &ask).await?
        }
        Commands::Ask {
            question,
            show_query,
        } => commands::ask(&ctx, &question, show_query).await?,
        Commands::Reset => commands::reset(&ctx).await?,
        Commands::Ping => commands::ping(&ctx).await,
        Commands::Watch { interval } => commands::watch(&ctx, interval).await?,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("omnigraph=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("omnigraph={level},warn")))
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
