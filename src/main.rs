// src/main.rs
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use resume_compare::render::{render_matches, render_outline, render_text};
use resume_compare::{
    ComparisonSession, Config, DiffGranularity, DocumentText, SearchScope, ViewMode,
};

/// Compare an original resume with a customized one
#[derive(Parser)]
#[command(name = "resume-compare")]
#[command(version)]
#[command(about = "Compare an original and a customized resume", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diff the two documents
    #[command(visible_alias = "c")]
    Compare {
        /// Original resume (.txt, .md or .html)
        original: PathBuf,
        /// Customized resume
        customized: PathBuf,

        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Only show headings and changed lines (HTML output)
        #[arg(long)]
        diff_only: bool,

        /// Override the configured inline diff granularity
        #[arg(short, long, value_enum)]
        granularity: Option<Granularity>,
    },

    /// Print both section outlines and how they pair up
    #[command(visible_alias = "s")]
    Sections {
        original: PathBuf,
        customized: PathBuf,
    },

    /// Find a phrase in one or both documents
    Search {
        original: PathBuf,
        customized: PathBuf,
        query: String,

        #[arg(long, value_enum)]
        scope: Option<Scope>,

        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Show or initialize the config file
    Config {
        /// Write the default config if none exists
        #[arg(long)]
        init: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Html,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Granularity {
    Line,
    Word,
    Hybrid,
}

impl From<Granularity> for DiffGranularity {
    fn from(granularity: Granularity) -> Self {
        match granularity {
            Granularity::Line => DiffGranularity::Line,
            Granularity::Word => DiffGranularity::Word,
            Granularity::Hybrid => DiffGranularity::Hybrid,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Scope {
    Both,
    Original,
    Customized,
}

impl From<Scope> for SearchScope {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::Both => SearchScope::Both,
            Scope::Original => SearchScope::Original,
            Scope::Customized => SearchScope::Customized,
        }
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match run(cli) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };

    match cli.command {
        Commands::Config { init } => run_config(&config_path, init),
        Commands::Compare {
            original,
            customized,
            format,
            diff_only,
            granularity,
        } => {
            let mut config = load_config(&config_path)?;
            if let Some(granularity) = granularity {
                config.diff.granularity = granularity.into();
            }
            let mut session = open_session(&original, &customized, &config)?;
            if diff_only {
                session.set_view_mode(ViewMode::DiffOnly);
            }
            print_session(&session, format, render_text)
        }
        Commands::Sections {
            original,
            customized,
        } => {
            let config = load_config(&config_path)?;
            let session = open_session(&original, &customized, &config)?;
            print!("{}", render_outline(&session));
            Ok(())
        }
        Commands::Search {
            original,
            customized,
            query,
            scope,
            format,
        } => {
            let config = load_config(&config_path)?;
            let mut session = open_session(&original, &customized, &config)?;
            if let Some(scope) = scope {
                session.set_scope(scope.into());
            }
            let count = session.search_now(&query);
            log::info!("{} matches for {:?}", count, query);
            print_session(&session, format, render_matches)
        }
    }
}

fn load_config(path: &Path) -> Result<Config> {
    Config::load_from(path).with_context(|| format!("Failed to load config {}", path.display()))
}

fn open_session(original: &Path, customized: &Path, config: &Config) -> Result<ComparisonSession> {
    let original_doc = DocumentText::load(original)
        .with_context(|| format!("Failed to read {}", original.display()))?;
    let customized_doc = DocumentText::load(customized)
        .with_context(|| format!("Failed to read {}", customized.display()))?;
    Ok(ComparisonSession::with_config(original_doc, customized_doc, config))
}

fn print_session(
    session: &ComparisonSession,
    format: Format,
    text: fn(&ComparisonSession) -> String,
) -> Result<()> {
    match format {
        Format::Text => print!("{}", text(session)),
        Format::Html => print!("{}", session.render_html()),
        Format::Json => {
            let json = serde_json::to_string_pretty(&session.report())
                .context("Failed to serialize report")?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn run_config(path: &Path, init: bool) -> Result<()> {
    if init {
        if path.exists() {
            eprintln!("Config already exists at {}", path.display());
        } else {
            Config::default()
                .save_to(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote default config to {}", path.display());
        }
    }

    let config = Config::load_from(path)?;
    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
