//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use aozora_catalog::Catalog;
use aozora_core::pipeline::{ProgressReporter, RunConfig, RunResult, run_corpus};
use aozora_fetcher::SourceFetcher;
use aozora_shared::{AppConfig, ExtractionConfig, FetchConfig, Work, init_config, load_config};
use aozora_storage::Storage;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// aozora-corpus: build a genre corpus from Aozora Bunko texts.
#[derive(Parser)]
#[command(
    name = "aozora-corpus",
    version,
    about = "Extract genre-tagged slot words, sentence templates and phrases from Aozora Bunko texts.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch cataloged works, extract corpus assets and store them.
    Extract {
        /// Database path (defaults to `storage.db_path` from config).
        #[arg(long)]
        db: Option<PathBuf>,

        /// Only process works of this genre (repeatable).
        #[arg(long = "genre")]
        genres: Vec<String>,

        /// Only process the work with this ID (repeatable).
        #[arg(long = "work")]
        works: Vec<String>,

        /// Extract and rank without writing to the database.
        #[arg(long)]
        dry_run: bool,

        /// Also write the aggregated corpus as JSON to this file.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List the work catalog.
    Works {
        /// Only list works of this genre.
        #[arg(long)]
        genre: Option<String>,
    },

    /// Insert the hand-curated starter corpus.
    Seed {
        /// Database path (defaults to `storage.db_path` from config).
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Show per-genre row counts.
    Stats {
        /// Database path (defaults to `storage.db_path` from config).
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Delete all words, templates and phrases.
    Reset {
        /// Database path (defaults to `storage.db_path` from config).
        #[arg(long)]
        db: Option<PathBuf>,

        /// Confirm deletion.
        #[arg(long)]
        yes: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "aozora=info",
        1 => "aozora=debug",
        _ => "aozora=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Extract {
            db,
            genres,
            works,
            dry_run,
            out,
        } => cmd_extract(db, &genres, &works, dry_run, out.as_deref()).await,
        Command::Works { genre } => cmd_works(genre.as_deref()),
        Command::Seed { db } => cmd_seed(db).await,
        Command::Stats { db } => cmd_stats(db).await,
        Command::Reset { db, yes } => cmd_reset(db, yes).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Load the catalog configured in `[catalog] path`, or the built-in one.
fn load_catalog(config: &AppConfig) -> Result<Catalog> {
    let path = config.catalog.path.as_deref().map(Path::new);
    Ok(Catalog::load_or_builtin(path)?)
}

/// Open the database at `--db`, falling back to the configured path.
async fn open_storage(config: &AppConfig, db: Option<PathBuf>) -> Result<Storage> {
    let path = db.unwrap_or_else(|| PathBuf::from(&config.storage.db_path));
    info!(path = %path.display(), "opening corpus database");
    Ok(Storage::open(&path).await?)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_extract(
    db: Option<PathBuf>,
    genres: &[String],
    work_ids: &[String],
    dry_run: bool,
    out: Option<&Path>,
) -> Result<()> {
    let config = load_config()?;
    let catalog = load_catalog(&config)?;

    for id in work_ids {
        if catalog.work(id).is_none() {
            warn!(work_id = %id, "--work is not in the catalog, ignoring");
        }
    }

    let works = catalog.select_works(genres, work_ids);
    if works.is_empty() {
        return Err(eyre!("no cataloged works match the given --genre/--work filters"));
    }

    let fetcher = SourceFetcher::new(FetchConfig::from(&config))?;
    let storage = if dry_run {
        None
    } else {
        Some(open_storage(&config, db).await?)
    };

    let run_config = RunConfig {
        works,
        extraction: ExtractionConfig::from(&config),
    };

    info!(works = run_config.works.len(), dry_run, "starting extraction");

    let reporter = CliProgress::new();
    let result = run_corpus(
        catalog.patterns(),
        &fetcher,
        storage.as_ref(),
        &run_config,
        &reporter,
    )
    .await?;

    if let Some(out) = out {
        let json = serde_json::to_string_pretty(&result.corpus)?;
        std::fs::write(out, json).map_err(|e| eyre!("cannot write {}: {e}", out.display()))?;
        info!(path = %out.display(), "wrote corpus JSON");
    }

    print_run_summary(&result, dry_run);

    if !result.is_success() {
        return Err(eyre!(
            "failed to store genres: {}",
            result.failed_genres.join(", ")
        ));
    }
    Ok(())
}

fn print_run_summary(result: &RunResult, dry_run: bool) {
    println!();
    if dry_run {
        println!("  Dry run complete (nothing written).");
    } else {
        println!("  Extraction complete!");
    }
    if let Some(run_id) = &result.run_id {
        println!("  Run:       {run_id}");
    }
    println!("  Processed: {}", result.processed);
    println!("  Skipped:   {}", result.skipped.len());
    for skipped in &result.skipped {
        println!("    - {} {} ({})", skipped.work_id, skipped.title, skipped.reason);
    }
    println!();
    println!("  {:<10} {:>6} {:>6} {:>10} {:>8}", "GENRE", "WORKS", "WORDS", "TEMPLATES", "PHRASES");
    for genre in &result.corpus {
        println!(
            "  {:<10} {:>6} {:>6} {:>10} {:>8}",
            genre.genre,
            genre.works,
            genre.words.len(),
            genre.templates.len(),
            genre.phrases.len()
        );
    }
    println!();
    println!("  Time:      {:.1}s", result.elapsed.as_secs_f64());
    println!();
}

fn cmd_works(genre: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let catalog = load_catalog(&config)?;

    let genres: Vec<String> = genre.map(String::from).into_iter().collect();
    let works: Vec<Work> = catalog.select_works(&genres, &[]);

    println!("{:<7} {:<8} {:<8} {}", "ID", "GENRE", "AUTHOR", "TITLE");
    for work in &works {
        println!(
            "{:<7} {:<8} {:<8} {} / {}",
            work.id,
            work.genre,
            work.author_id.as_deref().unwrap_or("-"),
            work.title,
            work.author
        );
    }
    println!("\n{} work(s)", works.len());
    Ok(())
}

async fn cmd_seed(db: Option<PathBuf>) -> Result<()> {
    let config = load_config()?;
    let storage = open_storage(&config, db).await?;

    let report = storage.seed_initial_corpus().await?;
    println!(
        "Seeded {} word(s), {} template(s), {} phrase(s).",
        report.words, report.templates, report.phrases
    );
    Ok(())
}

async fn cmd_stats(db: Option<PathBuf>) -> Result<()> {
    let config = load_config()?;
    let storage = open_storage(&config, db).await?;

    let stats = storage.corpus_stats().await?;
    if stats.is_empty() {
        println!("Corpus is empty.");
        return Ok(());
    }

    println!("{:<10} {:>6} {:>10} {:>8}", "GENRE", "WORDS", "TEMPLATES", "PHRASES");
    for row in &stats {
        println!(
            "{:<10} {:>6} {:>10} {:>8}",
            row.genre, row.words, row.templates, row.phrases
        );
    }
    Ok(())
}

async fn cmd_reset(db: Option<PathBuf>, yes: bool) -> Result<()> {
    if !yes {
        return Err(eyre!("refusing to delete the corpus without --yes"));
    }

    let config = load_config()?;
    let storage = open_storage(&config, db).await?;

    let report = storage.reset_corpus().await?;
    println!(
        "Deleted {} word(s), {} template(s), {} phrase(s).",
        report.words, report.templates, report.phrases
    );
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn work_started(&self, work: &Work, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Extracting [{current}/{total}] {}", work.title));
    }

    fn work_skipped(&self, work: &Work, reason: &str) {
        self.spinner
            .println(format!("  skipped {} {}: {reason}", work.id, work.title));
    }

    fn done(&self, _result: &RunResult) {
        self.spinner.finish_and_clear();
    }
}
