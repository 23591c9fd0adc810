use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use finance_state::{MemoryStateStore, RedisStateStore, StateStore};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use expense_bot::{Assistant, BotConfig, Inbound, InMemoryLedger, StaticCatalog, SystemClock};

/// Expense assistant
#[derive(Parser)]
#[command(name = "expense-bot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: layered ./config + EXPENSE_BOT_* env)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an amount expression, e.g. `calc "(100-10%)*2"`
    Calc {
        #[arg(required = true, num_args = 1..)]
        expression: Vec<String>,
    },

    /// Interactive session; `!payload` lines press a button
    Console {
        /// User id the session acts as
        #[arg(short, long, default_value = "console")]
        user: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Calc { expression } => {
            let expression = expression.join(" ");
            let value = finance_calc::calculate(&expression)
                .with_context(|| format!("cannot evaluate '{}'", expression))?;
            println!("{}", finance_calc::format_number(value));
            Ok(())
        },
        Commands::Console { user } => {
            let config = match &cli.config {
                Some(path) => BotConfig::from_file(path)?,
                None => BotConfig::load()?,
            };
            let _log_guard = common::init_logging(&config.log_config())?;
            info!("Starting {} ({})", config.app.name, config.app.environment);

            if config.redis.enabled {
                let store = RedisStateStore::connect(&config.redis.url).await?;
                store.ping().await?;
                run_console(Arc::new(store), &config, &user).await
            } else {
                info!("Redis disabled, conversation state is kept in memory");
                let store = Arc::new(MemoryStateStore::new());
                let _purge = MemoryStateStore::spawn_purge(&store, config.state.expense_ttl());
                run_console(store, &config, &user).await
            }
        },
    }
}

async fn run_console<S: StateStore>(store: Arc<S>, config: &BotConfig, user: &str) -> Result<()> {
    let assistant = Assistant::new(
        store,
        Arc::new(StaticCatalog::default()),
        Arc::new(InMemoryLedger::new()),
        Arc::new(SystemClock),
        &config.state,
    )?;

    println!("{}", assistant.handle(user, Inbound::Text("/start".to_string())).await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit") {
            break;
        }

        let inbound = match line.strip_prefix('!') {
            Some(payload) => Inbound::Button(payload.trim().to_string()),
            None => Inbound::Text(line.to_string()),
        };
        println!("{}\n", assistant.handle(user, inbound).await);
    }

    info!("Console session for {} ended", user);
    Ok(())
}
