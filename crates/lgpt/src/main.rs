use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use lgpt::config::{self, Config};
use lgpt::conversation::{ConversationStore, SubmitOutcome};
use lgpt::llm::{OpenAICompatibleProvider, Vendor};
use lgpt::repl;
use lgpt::settings::FileSettingsStore;

#[derive(Parser)]
#[command(name = "lgpt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the config file (default: ~/.lgpt/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat (default)
    Chat,

    /// Send a single message and print the reply
    Ask {
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Show or change the saved vendor and API key
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current settings
    Show,

    /// Update vendor and/or API key
    Set {
        /// openai or groq
        #[arg(long)]
        vendor: Option<Vendor>,

        #[arg(long)]
        key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.unwrap_or_else(config::default_config_path);
    let config = Config::load(&config_path)
        .await
        .with_context(|| format!("loading {}", config_path.display()))?;
    debug!(path = %config_path.display(), settings = %config.settings_path.display(), "Loaded config");

    let provider = Arc::new(OpenAICompatibleProvider::from_config(&config.provider)?);
    let settings = Arc::new(FileSettingsStore::new(&config.settings_path));
    let store =
        ConversationStore::from_settings(provider, settings, |name| std::env::var(name).ok())
            .await?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => repl::run(store).await,
        Commands::Ask { text } => ask(&store, &text.join(" ")).await,
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", repl::describe_config(&store.config().await));
                println!("settings: {}", config.settings_path.display());
                Ok(())
            }
            ConfigAction::Set { vendor, key } => set_config(&store, vendor, key).await,
        },
    }
}

async fn ask(store: &ConversationStore, text: &str) -> Result<()> {
    match store.submit(text).await? {
        SubmitOutcome::Ignored => bail!("nothing to send"),
        SubmitOutcome::Replied { reply, .. } => {
            println!("{reply}");
            Ok(())
        }
        SubmitOutcome::Failed { error, .. } => bail!(error),
    }
}

async fn set_config(
    store: &ConversationStore,
    vendor: Option<Vendor>,
    key: Option<String>,
) -> Result<()> {
    match (vendor, key) {
        (None, None) => bail!("nothing to change; pass --vendor and/or --key"),
        (vendor, Some(key)) => {
            let vendor = match vendor {
                Some(v) => v,
                None => store.config().await.vendor,
            };
            store.configure(vendor, &key).await?;
        }
        (Some(vendor), None) => store.set_vendor(vendor).await?,
    }
    println!("{}", repl::describe_config(&store.config().await));
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "lgpt=debug" } else { "lgpt=warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
