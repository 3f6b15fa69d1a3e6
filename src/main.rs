//! Infobot - conversational factoid knowledge base.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use infobot::answer::HttpFetcher;
use infobot::config::{BotConfig, ConfigLoader, SettingKey};
use infobot::dispatch::Dispatcher;
use infobot::store::{default_database_path, SqliteStore};
use infobot::transport::{AddressMatcher, ConsoleTransport, IncomingMessage};

#[derive(Parser)]
#[command(
    name = "infobot",
    about = "Conversational factoid knowledge base",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file to use instead of the default search paths.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fact database path (overrides the config file).
    #[arg(long)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the bot on stdin; `nick: text` lines address it.
    Chat {
        /// Identity the lines are sent as.
        #[arg(long = "as", default_value = "user")]
        sender: String,
        /// Channel name for public lines.
        #[arg(long, default_value = "#infobot")]
        channel: String,
        /// Treat every line as a private message.
        #[arg(long)]
        private: bool,
        /// Plain output without colors or timestamps.
        #[arg(long)]
        raw: bool,
    },
    /// Look up a subject.
    Get {
        subject: String,
        /// Show every stored alternative.
        #[arg(long)]
        literal: bool,
    },
    /// List subjects containing every term.
    Search {
        #[arg(required = true)]
        terms: Vec<String>,
    },
    /// Change a runtime setting (ask, passive_ask, passive_learn, stopwords).
    Set { key: String, value: String },
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn build_dispatcher(
    config: &BotConfig,
    database: PathBuf,
    raw: bool,
) -> Result<Dispatcher, Box<dyn std::error::Error>> {
    let store = SqliteStore::open(&database).await?;
    let fetcher = HttpFetcher::new(&config.feed)?;
    let transport = ConsoleTransport::new(config.nick.clone(), raw);
    let dispatcher =
        Dispatcher::new(config, Arc::new(store), Arc::new(transport), Arc::new(fetcher)).await?;
    Ok(dispatcher)
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let loader = cli
        .config
        .map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    let config = loader.load()?;
    let database = cli
        .database
        .or_else(|| config.database.clone())
        .unwrap_or_else(default_database_path);
    tracing::info!(nick = %config.nick, database = %database.display(), "Starting infobot");

    match cli.command {
        Commands::Chat {
            sender,
            channel,
            private,
            raw,
        } => {
            let mut dispatcher = build_dispatcher(&config, database, raw).await?;
            let addressing = AddressMatcher::new(&config.nick)?;
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                let msg = if private {
                    IncomingMessage::private(sender.as_str(), line.trim())
                } else {
                    let (addressed, text) = addressing.strip(&line);
                    IncomingMessage::public(sender.as_str(), channel.as_str(), text, addressed)
                };
                dispatcher.handle(&msg).await;
            }
        }
        Commands::Get { subject, literal } => {
            let mut dispatcher = build_dispatcher(&config, database, true).await?;
            let prefix = if literal { "literal " } else { "" };
            let msg = IncomingMessage::private("cli", format!("{prefix}{subject}?"));
            dispatcher.handle(&msg).await;
        }
        Commands::Search { terms } => {
            let mut dispatcher = build_dispatcher(&config, database, true).await?;
            let msg = IncomingMessage::private("cli", format!("search for {}", terms.join(" ")));
            dispatcher.handle(&msg).await;
        }
        Commands::Set { key, value } => {
            let mut dispatcher = build_dispatcher(&config, database, true).await?;
            let key: SettingKey = key.parse()?;
            dispatcher.update_setting(key, &value).await?;
            println!("{key} = {}", value.trim());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "infobot failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
