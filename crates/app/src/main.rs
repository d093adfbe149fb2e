use std::fmt;
use std::path::{Path, PathBuf};

use quiz_core::model::{QuestionId, ViewMode};
use services::{AppServices, Clock};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod practice;
mod questions;

use config::{AppConfig, CONFIG_FILE};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    InvalidMode { raw: String },
    InvalidNumber { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidMode { raw } => write!(f, "invalid --mode value: {raw}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number<T: std::str::FromStr>(flag: &'static str, raw: String) -> Result<T, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- practice --questions <file.json> --title <title>");
    eprintln!("                      [--mode quiz|review|favorite|wrong|mock]");
    eprintln!("                      [--db <sqlite_url>] [--seed <n>] [--mock-size <n>]");
    eprintln!("  cargo run -p app -- stats    --questions <file.json> --title <title> [--db <url>]");
    eprintln!("  cargo run -p app -- purge    --questions <file.json> --title <title> [--db <url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --mode quiz");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!("  --mock-size 50");
    eprintln!();
    eprintln!("Configuration:");
    eprintln!("  {CONFIG_FILE} (db_url, mock_size, mock_seed, log_filter)");
    eprintln!("  QUIZ_DB_URL, QUIZ_MOCK_SIZE, QUIZ_MOCK_SEED, QUIZ_LOG, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Practice,
    Stats,
    Purge,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "practice" => Some(Self::Practice),
            "stats" => Some(Self::Stats),
            "purge" => Some(Self::Purge),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    questions: PathBuf,
    title: String,
    mode: ViewMode,
    db_url: Option<String>,
    seed: Option<u64>,
    mock_size: Option<usize>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut questions = None;
        let mut title = None;
        let mut mode = ViewMode::Quiz;
        let mut db_url = None;
        let mut seed = None;
        let mut mock_size = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--questions" => {
                    questions = Some(PathBuf::from(require_value(args, "--questions")?));
                }
                "--title" => title = Some(require_value(args, "--title")?),
                "--mode" => {
                    let value = require_value(args, "--mode")?;
                    mode = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidMode { raw: value.clone() })?;
                }
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = Some(value);
                }
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    seed = Some(parse_number("--seed", value)?);
                }
                "--mock-size" => {
                    let value = require_value(args, "--mock-size")?;
                    mock_size = Some(parse_number("--mock-size", value)?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            questions: questions.ok_or(ArgsError::MissingFlag { flag: "--questions" })?,
            title: title.ok_or(ArgsError::MissingFlag { flag: "--title" })?,
            mode,
            db_url,
            seed,
            mock_size,
        })
    }

    /// Command-line flags win over every other configuration layer.
    fn apply_to(&self, config: &mut AppConfig) {
        if let Some(db_url) = &self.db_url {
            config.db_url.clone_from(db_url);
        }
        if let Some(seed) = self.seed {
            config.mock_seed = Some(seed);
        }
        if let Some(size) = self.mock_size {
            config.mock_size = size;
        }
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" {
        return trimmed.to_string();
    }

    let path_str = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Practice,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let args = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let mut config = AppConfig::load(Path::new(CONFIG_FILE))?;
    args.apply_to(&mut config);
    init_logging(&config);

    let questions = questions::load_questions(&args.questions)?;
    let db_url = normalize_sqlite_url(config.db_url.clone());
    prepare_sqlite_file(&db_url)?;
    info!(%db_url, questions = questions.len(), command = ?cmd, "starting");

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    let services = AppServices::new_sqlite(&db_url, Clock::system())
        .await?
        .with_mock_sampling(config.mock_size, config.mock_seed);

    match cmd {
        Command::Practice => {
            practice::run_practice(&services, &args.title, args.mode, questions).await
        }
        Command::Stats => {
            let stats = services.catalog().category_stats(&args.title, &questions).await;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
        Command::Purge => {
            let ids: Vec<QuestionId> = questions.iter().map(|q| q.id().clone()).collect();
            services.catalog().purge_category(&args.title, &ids).await;
            println!("Purged {} question records for {}.", ids.len(), args.title);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = raw.iter().map(|s| (*s).to_string());
        Args::parse(&mut iter)
    }

    #[test]
    fn parses_practice_flags() {
        let args = parse(&[
            "--questions",
            "law.json",
            "--title",
            "Civil Law",
            "--mode",
            "mock",
            "--seed",
            "7",
        ])
        .unwrap();
        assert_eq!(args.questions, PathBuf::from("law.json"));
        assert_eq!(args.title, "Civil Law");
        assert_eq!(args.mode, ViewMode::Mock);
        assert_eq!(args.seed, Some(7));
    }

    #[test]
    fn reports_bad_flags() {
        assert!(matches!(
            parse(&["--title", "x"]),
            Err(ArgsError::MissingFlag { flag: "--questions" })
        ));
        assert!(matches!(
            parse(&["--mode", "exam"]),
            Err(ArgsError::InvalidMode { .. })
        ));
        assert!(matches!(
            parse(&["--seed", "soon"]),
            Err(ArgsError::InvalidNumber { flag: "--seed", .. })
        ));
        assert!(matches!(parse(&["--db"]), Err(ArgsError::MissingValue { .. })));
    }

    #[test]
    fn flags_override_config() {
        let args = parse(&["--questions", "q.json", "--title", "t", "--mock-size", "10"]).unwrap();
        let mut config = AppConfig::default();
        args.apply_to(&mut config);
        assert_eq!(config.mock_size, 10);
        assert_eq!(config.db_url, AppConfig::default().db_url);
    }

    #[test]
    fn sqlite_urls_are_made_absolute() {
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".into()),
            "sqlite::memory:"
        );
        let url = normalize_sqlite_url("sqlite:data/quiz.db".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/quiz.db"));
    }

    #[test]
    fn relative_default_url_is_made_absolute() {
        let url = normalize_sqlite_url(AppConfig::default().db_url);
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("/quiz.sqlite3"));
        assert_eq!(
            normalize_sqlite_url("sqlite:///var/lib/quiz.db".into()),
            "sqlite:///var/lib/quiz.db"
        );
    }
}
