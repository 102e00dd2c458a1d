use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cses_tracker::app::{ClientContext, Controller, headless};
use cses_tracker::assistant::ApiKeyManager;
use cses_tracker::catalog::find_question;
use cses_tracker::config::DataPaths;
use cses_tracker::progress::Status;
use cses_tracker::{App, Config, calendar};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long headless commands wait for the store or the assistant
const SYNC_TIMEOUT: Duration = Duration::from_secs(10);
const ASSIST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(name = "cses-tracker")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory for the local store, identity and log
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List topics with solved counts
    Topics,
    /// Show solved, attempting and to-do totals
    Stats,
    /// Set the status of a question
    Set {
        /// Question id, e.g. cses_1068
        question: String,
        /// todo, attempting or solved
        status: String,
    },
    /// Ask the assistant for a hint on a question
    Hint {
        /// Question id, e.g. cses_1068
        question: String,
    },
    /// Print a calendar link for revisiting a question
    Reminder {
        /// Question id, e.g. cses_1068
        question: String,
    },
    /// Store the Gemini API key in the system keyring
    AiKey {
        /// The API key
        key: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let root = match cli.data_dir {
        Some(dir) => dir,
        None => Config::data_dir()?,
    };
    let paths = DataPaths::new(root);
    init_logging(&paths, cli.command.is_none())?;

    let config = Config::load()?;

    match cli.command {
        Some(Commands::AiKey { key }) => {
            ApiKeyManager::set_api_key(&key)?;
            println!("Stored Gemini API key {}", ApiKeyManager::mask_key(&key));
        }
        Some(Commands::Reminder { question }) => {
            let catalog = cses_tracker::catalog::cses_problem_set();
            let (_, question) = find_question(&catalog, &question)
                .with_context(|| format!("No question with id {question}"))?;
            let url = calendar::reminder_url(question)?;
            if let Err(e) = calendar::open_in_browser(&url) {
                tracing::warn!("Could not open browser: {}", e);
            }
            println!("{url}");
        }
        Some(command) => {
            let mut controller = Controller::new(ClientContext::open(&config, &paths)?);
            let result = match headless::connect(&mut controller, SYNC_TIMEOUT).await {
                Ok(()) => run_headless(&mut controller, command).await,
                Err(e) => Err(e),
            };
            controller.shutdown();
            result?;
        }
        None => {
            let controller = Controller::new(ClientContext::open(&config, &paths)?);
            let mut app = App::new(controller, config.active_theme())?;
            app.run().await?;
        }
    }

    Ok(())
}

/// Log to a file while the TUI owns the terminal, to stderr otherwise
fn init_logging(paths: &DataPaths, tui: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cses_tracker=info".into());

    if tui {
        std::fs::create_dir_all(&paths.root)
            .with_context(|| format!("Failed to create data directory {:?}", paths.root))?;
        let log = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(paths.log())
            .with_context(|| format!("Failed to open log file {:?}", paths.log()))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(log)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}

async fn run_headless(controller: &mut Controller, command: Commands) -> Result<()> {
    match command {
        Commands::Topics => {
            for (index, topic) in controller.catalog().iter().enumerate() {
                let solved = topic
                    .questions
                    .iter()
                    .filter(|q| controller.status_of(&q.id) == Status::Solved)
                    .count();
                println!("{:>2}. {} ({}/{})", index + 1, topic.name, solved, topic.questions.len());
            }
        }
        Commands::Stats => {
            let stats = controller.stats();
            println!("Solved:     {} / {}", stats.solved, stats.total);
            println!("Attempting: {}", stats.attempting);
            println!("To-Do:      {}", stats.todo);
        }
        Commands::Set { question, status } => {
            let status = Status::parse(&status)
                .with_context(|| format!("Unknown status {status:?} (todo, attempting, solved)"))?;
            headless::set_status(controller, &question, status, SYNC_TIMEOUT).await?;
            println!("{question}: {}", status.label());
        }
        Commands::Hint { question } => {
            let (title, text) = headless::hint(controller, &question, ASSIST_TIMEOUT).await?;
            println!("{title}\n\n{text}");
        }
        Commands::Reminder { .. } | Commands::AiKey { .. } => {}
    }
    Ok(())
}
