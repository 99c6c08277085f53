use std::path::Path;

use quiz_core::model::{DecodeError, QuestionId, Section, decode_question_list};
use services::{Authoring, AuthoringError, QuestionBankStore, SessionError, SyncError};
use storage::repository::Storage;
use storage::sqlite::SqliteInitError;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod args;
mod config;
mod take;

use args::{Args, ArgsError, Command, normalize_sqlite_url, print_usage};
use config::{Config, ConfigError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Args(#[from] ArgsError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("could not read question file: {0}")]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Authoring(#[from] AuthoringError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error("question {0} does not exist")]
    UnknownQuestion(QuestionId),
}

async fn open_storage(config: &Config) -> Result<Storage, AppError> {
    if let Some(remote) = &config.remote_url {
        info!(remote = %remote, "using remote override store");
        return Ok(Storage::remote(remote, &config.cache_dir));
    }
    let db_url = normalize_sqlite_url(config.database_url.clone());
    prepare_sqlite_file(&db_url)?;
    info!(db = %db_url, "using sqlite override store");
    Ok(Storage::sqlite(&db_url, &config.cache_dir).await?)
}

fn list(bank: &QuestionBankStore, section: Option<Section>) {
    for question in bank.merged() {
        if section.is_some_and(|s| s != question.section) {
            continue;
        }
        let custom = if bank.is_override(question.id) { "*" } else { " " };
        println!(
            "{:>4}{custom} {:<10} {}",
            question.id.value(),
            question.section.as_str(),
            question.prompt_text()
        );
    }
    for s in Section::ALL {
        if section.is_none_or(|wanted| wanted == s) {
            eprintln!("{}: {} questions", s.title(), bank.section_count(s));
        }
    }
}

async fn import(bank: &mut QuestionBankStore, path: &Path) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(path)?;
    let decoded = decode_question_list(&raw)?;
    if decoded.skipped > 0 {
        eprintln!("skipped {} entries that are not questions", decoded.skipped);
    }

    let mut imported = 0_usize;
    for question in decoded.questions {
        if !question.is_playable() {
            tracing::warn!(id = %question.id, "skipping unplayable question on import");
            eprintln!("skipped #{}: needs two filled options and a valid answer", question.id);
            continue;
        }
        if let Err(err) = bank.upsert(question).wait().await {
            eprintln!("saved locally, but syncing failed: {err}");
        }
        imported += 1;
    }
    println!("imported {imported} questions");
    Ok(())
}

async fn run() -> Result<(), AppError> {
    let args = Args::parse(std::env::args().skip(1)).inspect_err(|_| print_usage())?;
    if args.command == Command::Help {
        print_usage();
        return Ok(());
    }

    let config = args.apply(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let storage = open_storage(&config).await?;
    let mut bank = QuestionBankStore::new(&storage);
    bank.load(&CancellationToken::new()).await;
    info!(questions = bank.merged().len(), custom = bank.overrides().len(), "question bank ready");

    match args.command {
        Command::Take { section } => take::run(section, &bank).await?,
        Command::List { section } => list(&bank, section),
        Command::Show { id } => {
            let question = bank.get(id).ok_or(AppError::UnknownQuestion(id))?;
            println!("{}", serde_json::to_string_pretty(question)?);
        }
        Command::Import { path } => import(&mut bank, &path).await?,
        Command::Delete { id } => {
            if let Some(notice) = Authoring::new(&mut bank).delete(id).await? {
                eprintln!("{notice}");
            }
            println!("deleted #{id}");
        }
        Command::Export => println!("{}", serde_json::to_string_pretty(bank.overrides())?),
        Command::Help => print_usage(),
    }
    Ok(())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), AppError> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let invalid = || ArgsError::InvalidDbUrl {
        raw: db_url.to_string(),
    };
    let path = db_url.strip_prefix("sqlite://").ok_or_else(invalid)?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(invalid().into());
    }

    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            2
        }
    };
    // The blocking stdin reader used by `take` never returns on its own.
    std::process::exit(code);
}
