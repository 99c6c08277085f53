use std::fmt;
use std::path::PathBuf;

use quiz_core::model::{QuestionId, Section};

use crate::config::{Config, validate_remote_url};

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { command: &'static str, what: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidSection { raw: String },
    InvalidQuestionId { raw: String },
    InvalidDbUrl { raw: String },
    InvalidRemoteUrl { raw: String, reason: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { command, what } => {
                write!(f, "{command} requires {what}")
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidSection { raw } => write!(
                f,
                "invalid section: {raw} (expected vocabulary, grammar, reading or listening)"
            ),
            ArgsError::InvalidQuestionId { raw } => write!(f, "invalid question id: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidRemoteUrl { raw, reason } => {
                write!(f, "invalid --remote value {raw}: {reason}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Take { section: Section },
    List { section: Option<Section> },
    Show { id: QuestionId },
    Import { path: PathBuf },
    Delete { id: QuestionId },
    Export,
    Help,
}

/// Parsed command line: the command plus storage flags layered over `Config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub command: Command,
    pub db_url: Option<String>,
    pub cache_dir: Option<PathBuf>,
    pub remote_url: Option<String>,
}

impl Args {
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut args = args.into_iter();
        let mut positionals = Vec::new();
        let mut db_url = None;
        let mut cache_dir = None;
        let mut remote_url = None;
        let mut section_flag = None;
        let mut help = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = Some(normalize_sqlite_url(value));
                }
                "--cache-dir" => {
                    cache_dir = Some(PathBuf::from(require_value(&mut args, "--cache-dir")?));
                }
                "--remote" => {
                    let value = require_value(&mut args, "--remote")?;
                    let url = validate_remote_url(&value)
                        .map_err(|reason| ArgsError::InvalidRemoteUrl { raw: value, reason })?;
                    remote_url = Some(url);
                }
                "--section" => {
                    section_flag = Some(parse_section(require_value(&mut args, "--section")?)?);
                }
                "--help" | "-h" => help = true,
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positionals.push(arg),
            }
        }

        let command = if help {
            Command::Help
        } else {
            parse_command(positionals, section_flag)?
        };

        Ok(Self {
            command,
            db_url,
            cache_dir,
            remote_url,
        })
    }

    /// Apply command-line flags on top of environment configuration.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(db_url) = &self.db_url {
            config.database_url.clone_from(db_url);
        }
        if let Some(cache_dir) = &self.cache_dir {
            config.cache_dir.clone_from(cache_dir);
        }
        if self.remote_url.is_some() {
            config.remote_url.clone_from(&self.remote_url);
        }
        config
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_section(raw: String) -> Result<Section, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidSection { raw })
}

fn parse_id(raw: String) -> Result<QuestionId, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidQuestionId { raw })
}

fn parse_command(
    positionals: Vec<String>,
    section_flag: Option<Section>,
) -> Result<Command, ArgsError> {
    let mut iter = positionals.into_iter();
    let Some(name) = iter.next() else {
        return Ok(Command::Help);
    };

    let mut operand = |command: &'static str, what: &'static str| {
        iter.next()
            .ok_or(ArgsError::MissingArgument { command, what })
    };

    let command = match name.as_str() {
        "take" => {
            let section = match section_flag {
                Some(section) => section,
                None => parse_section(operand("take", "a section")?)?,
            };
            Command::Take { section }
        }
        "list" => Command::List {
            section: section_flag,
        },
        "show" => Command::Show {
            id: parse_id(operand("show", "a question id")?)?,
        },
        "import" => Command::Import {
            path: PathBuf::from(operand("import", "a JSON file")?),
        },
        "delete" => Command::Delete {
            id: parse_id(operand("delete", "a question id")?)?,
        },
        "export" => Command::Export,
        "help" => Command::Help,
        _ => return Err(ArgsError::UnknownCommand(name)),
    };

    if let Some(extra) = iter.next() {
        return Err(ArgsError::UnknownArg(extra));
    }
    Ok(command)
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app take <section>            # timed test for one section");
    eprintln!("  app list [--section <s>]      # list the merged question bank");
    eprintln!("  app show <id>                 # print one question as JSON");
    eprintln!("  app import <file.json>        # add or replace questions from a JSON list");
    eprintln!("  app delete <id>               # delete a custom question");
    eprintln!("  app export                    # print custom questions as JSON");
    eprintln!();
    eprintln!("Storage flags (any command):");
    eprintln!("  --db <sqlite_url>  --cache-dir <dir>  --remote <http_base_url>");
    eprintln!();
    eprintln!("Sections: vocabulary, grammar, reading, listening");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_CACHE_DIR, QUIZ_REMOTE_URL, RUST_LOG");
}

pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &[&str]) -> Result<Args, ArgsError> {
        Args::parse(raw.iter().map(ToString::to_string))
    }

    #[test]
    fn no_arguments_prints_help() {
        assert_eq!(parse(&[]).unwrap().command, Command::Help);
        assert_eq!(parse(&["take", "-h"]).unwrap().command, Command::Help);
    }

    #[test]
    fn take_accepts_positional_or_flag_section() {
        assert_eq!(
            parse(&["take", "Grammar"]).unwrap().command,
            Command::Take {
                section: Section::Grammar
            }
        );
        assert_eq!(
            parse(&["take", "--section", "reading"]).unwrap().command,
            Command::Take {
                section: Section::Reading
            }
        );
        assert!(matches!(
            parse(&["take", "kanji"]),
            Err(ArgsError::InvalidSection { .. })
        ));
        assert!(matches!(
            parse(&["take"]),
            Err(ArgsError::MissingArgument { command: "take", .. })
        ));
    }

    #[test]
    fn storage_flags_layer_over_config() {
        let args = parse(&[
            "--db",
            "sqlite:///tmp/q.sqlite3",
            "list",
            "--cache-dir",
            "/tmp/c",
            "--remote",
            "http://localhost:3000/",
        ])
        .unwrap();
        assert_eq!(args.command, Command::List { section: None });

        let config = args.apply(Config {
            database_url: "sqlite://default".into(),
            cache_dir: PathBuf::from(".quiz-cache"),
            remote_url: None,
            log_level: tracing::Level::INFO,
        });
        assert_eq!(config.database_url, "sqlite:///tmp/q.sqlite3");
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/c"));
        assert_eq!(config.remote_url.as_deref(), Some("http://localhost:3000"));
    }

    #[test]
    fn ids_and_extra_arguments_are_checked() {
        assert_eq!(
            parse(&["show", "#12"]).unwrap().command,
            Command::Show {
                id: QuestionId::new(12)
            }
        );
        assert!(matches!(
            parse(&["delete", "x"]),
            Err(ArgsError::InvalidQuestionId { .. })
        ));
        assert!(matches!(
            parse(&["export", "now"]),
            Err(ArgsError::UnknownArg(_))
        ));
        assert!(matches!(parse(&["--verbose"]), Err(ArgsError::UnknownArg(_))));
        assert!(matches!(parse(&["grade"]), Err(ArgsError::UnknownCommand(_))));
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/q.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/q.sqlite3"));
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".into()),
            "sqlite::memory:"
        );
    }
}
