use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use parley::auth::{self, UserId};
use parley::chat::ChatSession;
use parley::config::Config;
use parley::llm::ModelAdapter;
use parley::store::{ConversationStore, FileConversationStore};

mod cli;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Chat { model, resume } => {
            let app = App::load(&args.config).await?;
            let mut session = app.session(model);
            if let Some(id) = resume {
                let record = cli::history::load(&*app.store, &app.user, &id).await?;
                session.resume(record);
            }
            cli::repl::run(&mut session).await
        }
        Command::Ask { model, prompt } => {
            let app = App::load(&args.config).await?;
            let mut session = app.session(model);
            let reply = session.send(&prompt.join(" ")).await?;
            println!("{reply}");
            Ok(())
        }
        Command::History { follow } => {
            let app = App::load(&args.config).await?;
            cli::history::list(&*app.store, &app.user, follow).await
        }
        Command::Show { id } => {
            let app = App::load(&args.config).await?;
            let record = cli::history::load(&*app.store, &app.user, &id).await?;
            print!("{}", cli::history::format_transcript(&record));
            Ok(())
        }
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "parley", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Everything a command needs, built once from the config file.
struct App {
    config: Config,
    user: UserId,
    store: Arc<dyn ConversationStore>,
}

impl App {
    async fn load(path: &Path) -> Result<Self> {
        let config = Config::load(path)
            .await
            .with_context(|| format!("failed to load config from {}", path.display()))?;
        let user = auth::resolve_user(config.user.id.as_deref()).context("sign-in failed")?;
        let store: Arc<dyn ConversationStore> =
            Arc::new(FileConversationStore::new(config.store.path.clone()));

        Ok(Self {
            config,
            user,
            store,
        })
    }

    fn session(&self, model: Option<String>) -> ChatSession {
        let model = model.unwrap_or_else(|| self.config.default_model.clone());
        cli::warn_if_unknown(&model);
        ChatSession::new(
            ModelAdapter::from_config(&self.config),
            self.store.clone(),
            self.user.clone(),
            model,
        )
    }
}
