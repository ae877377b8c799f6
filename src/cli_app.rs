//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use mflix_browser::catalog::import::load_export;
use mflix_browser::catalog::movie::{MovieDraft, MovieId, MovieView};
use mflix_browser::cli::browse::{BrowseOptions, run_browse};
use mflix_browser::cli::render;
use mflix_browser::core::config::Config;
use mflix_browser::core::errors::MflixError;
use mflix_browser::logger::activity::{ActivityEvent, ActivityLoggerHandle, spawn_logger};
use mflix_browser::logger::jsonl::JsonlConfig;
use mflix_browser::paging::page::PageSize;
use mflix_browser::paging::session::{BrowseSession, SessionOptions, ViewMode};
use mflix_browser::query::filter::FilterInputs;
use mflix_browser::store::{SharedStore, open_store};

/// mflix - search, filter and page through the sample_mflix movie catalog.
#[derive(Debug, Parser)]
#[command(
    name = "mflix",
    author,
    version,
    about = "Movie catalog browser for the sample_mflix dataset",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Increase verbosity.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (errors and results only).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Run one filtered query and print a page of results.
    Search(SearchArgs),
    /// Interactive browsing: paging, filters, view toggle, details.
    Browse(BrowseArgs),
    /// List the distinct genres in the collection.
    Genres,
    /// Add a movie with a title and a year.
    Add(AddArgs),
    /// Show every field of one movie.
    Show(ShowArgs),
    /// Import a mongoexport dump (JSON lines or a JSON array).
    Import(ImportArgs),
    /// View configuration state.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
    /// Show version and build metadata.
    Version,
}

#[derive(Debug, Clone, Args, Default)]
struct FilterArgs {
    /// Case-insensitive text matched against titles (and plots).
    #[arg(long, short = 's', value_name = "TEXT")]
    query: Option<String>,
    /// Genre name; "Any" means no genre restriction.
    #[arg(long, short = 'g', value_name = "GENRE")]
    genre: Option<String>,
    /// Earliest release year (inclusive).
    #[arg(long, value_name = "YEAR", allow_hyphen_values = true)]
    min_year: Option<String>,
    /// Latest release year (inclusive).
    #[arg(long, value_name = "YEAR", allow_hyphen_values = true)]
    max_year: Option<String>,
    /// Minimum IMDb rating in (0, 10]; 0 disables the filter.
    #[arg(long, value_name = "RATING", allow_hyphen_values = true)]
    min_rating: Option<String>,
}

impl FilterArgs {
    fn inputs(&self) -> FilterInputs<'_> {
        FilterInputs {
            search: self.query.as_deref().unwrap_or_default(),
            genre: self.genre.as_deref().unwrap_or_default(),
            min_year: self.min_year.as_deref().unwrap_or_default(),
            max_year: self.max_year.as_deref().unwrap_or_default(),
            min_rating: self.min_rating.as_deref().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Args, Default)]
struct ViewArgs {
    /// Records per page (10, 25 or 50).
    #[arg(long, value_name = "N", value_parser = parse_page_size)]
    page_size: Option<PageSize>,
    /// Layout: cards or coverflow.
    #[arg(long, value_name = "VIEW", value_parser = parse_view)]
    view: Option<ViewMode>,
}

#[derive(Debug, Clone, Args)]
struct SearchArgs {
    #[command(flatten)]
    filters: FilterArgs,
    #[command(flatten)]
    layout: ViewArgs,
    /// Page number, starting at 1.
    #[arg(long, default_value_t = 1, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    page: u64,
    /// Print the query document sent to the store.
    #[arg(long)]
    explain: bool,
}

impl Default for SearchArgs {
    fn default() -> Self {
        Self {
            filters: FilterArgs::default(),
            layout: ViewArgs::default(),
            page: 1,
            explain: false,
        }
    }
}

#[derive(Debug, Clone, Args, Default)]
struct BrowseArgs {
    #[command(flatten)]
    layout: ViewArgs,
    /// Append redraws instead of clearing the screen.
    #[arg(long)]
    no_clear: bool,
}

#[derive(Debug, Clone, Args, Default)]
struct AddArgs {
    /// Movie title.
    #[arg(long)]
    title: String,
    /// Release year.
    #[arg(long)]
    year: i32,
}

#[derive(Debug, Clone, Args, Default)]
struct ShowArgs {
    /// Movie id as printed by `search` or `add`.
    id: String,
}

#[derive(Debug, Clone, Args, Default)]
struct ImportArgs {
    /// Export file to read.
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

#[derive(Debug, Clone, Args, Default)]
struct ConfigArgs {
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigCommand {
    /// Print the config file path.
    Path,
    /// Print the effective configuration.
    Show,
    /// Validate the configuration.
    Validate,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

fn parse_page_size(raw: &str) -> Result<PageSize, String> {
    raw.parse().map_err(|e: MflixError| e.to_string())
}

fn parse_view(raw: &str) -> Result<ViewMode, String> {
    raw.parse().map_err(|e: MflixError| e.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input at runtime.
    #[error("{0}")]
    User(String),
    /// Store or environment failure.
    #[error("{0}")]
    Runtime(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI: 2 for usage, 1 otherwise.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 2,
            Self::Runtime(_) | Self::Json(_) | Self::Io(_) => 1,
        }
    }
}

impl From<MflixError> for CliError {
    fn from(err: MflixError) -> Self {
        match err {
            MflixError::InvalidInput { .. }
            | MflixError::InvalidConfig { .. }
            | MflixError::MissingConfig { .. }
            | MflixError::ConfigParse { .. }
            | MflixError::NotFound { .. } => Self::User(err.to_string()),
            _ => Self::Runtime(err.to_string()),
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Search(args) => with_session(cli, |rt| run_search(cli, rt, args)),
        Command::Browse(args) => with_session(cli, |rt| run_browse_loop(rt, args)),
        Command::Genres => with_session(cli, |rt| run_genres(cli, rt)),
        Command::Add(args) => with_session(cli, |rt| run_add(cli, rt, args)),
        Command::Show(args) => with_session(cli, |rt| run_show(cli, rt, args)),
        Command::Import(args) => with_session(cli, |rt| run_import(cli, rt, args)),
        Command::Config(args) => run_config(cli, args),
        Command::Completions(args) => {
            let mut command = Cli::command();
            generate(args.shell, &mut command, "mflix", &mut io::stdout());
            Ok(())
        }
        Command::Version => emit_version(cli),
    }
}

// ---------------------------------------------------------------------------
// Session runtime: config, store and activity logger for one invocation
// ---------------------------------------------------------------------------

struct Runtime {
    config: Config,
    store: SharedStore,
    logger: ActivityLoggerHandle,
    logger_thread: Option<JoinHandle<()>>,
}

impl Runtime {
    fn start(cli: &Cli) -> Result<Self, CliError> {
        let config = Config::load(cli.config.as_deref())?;
        let store = open_store(&config.store)?;

        let (logger, logger_thread) = if config.logging.enabled {
            let (handle, join) = spawn_logger(JsonlConfig::from(&config.logging))?;
            (handle, Some(join))
        } else {
            (ActivityLoggerHandle::disabled(), None)
        };

        logger.send(ActivityEvent::SessionStarted {
            version: env!("CARGO_PKG_VERSION").to_string(),
            config_hash: config.stable_hash()?,
            store: store.location(),
        });
        if cli.verbose {
            eprintln!("store: {}", store.location());
        }

        Ok(Self {
            config,
            store,
            logger,
            logger_thread,
        })
    }

    fn session(&self, layout: &ViewArgs) -> BrowseSession {
        let mut options = SessionOptions::from(&self.config.browse);
        if let Some(size) = layout.page_size {
            options.page_size = size;
        }
        if let Some(view) = layout.view {
            options.view = view;
        }
        BrowseSession::new(Arc::clone(&self.store), options, self.logger.clone())
    }

    fn finish(self, reason: &str) {
        self.logger.send(ActivityEvent::SessionEnded {
            reason: reason.to_string(),
        });
        self.logger.shutdown();
        if let Some(join) = self.logger_thread {
            let _ = join.join();
        }
    }
}

fn with_session<F>(cli: &Cli, body: F) -> Result<(), CliError>
where
    F: FnOnce(&Runtime) -> Result<String, CliError>,
{
    let rt = Runtime::start(cli)?;
    match body(&rt) {
        Ok(reason) => {
            rt.finish(&reason);
            Ok(())
        }
        Err(err) => {
            rt.finish(&format!("failed: {err}"));
            Err(err)
        }
    }
}

// ---------------------------------------------------------------------------
// search
// ---------------------------------------------------------------------------

fn run_search(cli: &Cli, rt: &Runtime, args: &SearchArgs) -> Result<String, CliError> {
    let mut session = rt.session(&args.layout);
    session.apply_filters_at(&args.filters.inputs(), args.page)?;

    match output_mode(cli) {
        OutputMode::Human => {
            let mut out = io::stdout().lock();
            if args.explain {
                writeln!(
                    out,
                    "{} {}",
                    "query:".dimmed(),
                    serde_json::to_string_pretty(&session.query().to_document())?
                )?;
            }
            let width = render::terminal_width();
            let mut lines = Vec::new();
            if !cli.quiet {
                lines.extend(render::render_header(
                    &session.page_info(),
                    session.view(),
                    session.filters(),
                ));
            }
            lines.extend(render::render_warnings(session.warnings()));
            lines.extend(render::render_page(
                session.records(),
                session.view(),
                session.selected(),
                width,
            ));
            for line in lines {
                writeln!(out, "{line}")?;
            }
        }
        OutputMode::Json => {
            let records: Vec<MovieView> = session.records().iter().map(MovieView::from).collect();
            let payload = json!({
                "command": "search",
                "query": session.query().to_document(),
                "filters": session.filters(),
                "warnings": session.warnings(),
                "view": session.view(),
                "page_info": session.page_info(),
                "records": records,
            });
            write_json_line(&payload)?;
        }
    }
    Ok("search".to_string())
}

// ---------------------------------------------------------------------------
// browse
// ---------------------------------------------------------------------------

fn run_browse_loop(rt: &Runtime, args: &BrowseArgs) -> Result<String, CliError> {
    let mut session = rt.session(&args.layout);
    let stdout = io::stdout();
    let options = BrowseOptions {
        width: render::terminal_width(),
        clear: stdout.is_terminal() && !args.no_clear,
    };
    let exit = run_browse(&mut session, io::stdin().lock(), &mut stdout.lock(), options)?;
    Ok(exit.as_str().to_string())
}

// ---------------------------------------------------------------------------
// genres / add / show
// ---------------------------------------------------------------------------

fn run_genres(cli: &Cli, rt: &Runtime) -> Result<String, CliError> {
    let genres = rt.store.distinct_genres()?;
    match output_mode(cli) {
        OutputMode::Human => {
            let mut out = io::stdout().lock();
            for genre in &genres {
                writeln!(out, "{genre}")?;
            }
        }
        OutputMode::Json => {
            write_json_line(&json!({ "command": "genres", "genres": genres }))?;
        }
    }
    Ok("genres".to_string())
}

fn run_add(cli: &Cli, rt: &Runtime, args: &AddArgs) -> Result<String, CliError> {
    let draft = MovieDraft::titled(&args.title, args.year)?;
    let id = rt.store.insert_one(draft.clone())?;
    let movie = draft.into_movie(id);
    rt.logger.send(ActivityEvent::MovieInserted {
        id: id.0,
        title: movie.title.clone(),
    });

    match output_mode(cli) {
        OutputMode::Human => {
            if cli.quiet {
                println!("{id}");
            } else {
                println!(
                    "Added {} ({}) as id {}",
                    movie.title.bold(),
                    args.year,
                    id.to_string().green()
                );
            }
        }
        OutputMode::Json => {
            write_json_line(&json!({
                "command": "add",
                "id": id,
                "movie": MovieView::from(&movie),
            }))?;
        }
    }
    Ok("add".to_string())
}

fn run_show(cli: &Cli, rt: &Runtime, args: &ShowArgs) -> Result<String, CliError> {
    let id: MovieId = args.id.parse()?;
    let movie = rt.store.get(id)?.ok_or_else(|| MflixError::NotFound {
        id: id.to_string(),
    })?;

    match output_mode(cli) {
        OutputMode::Human => {
            let mut out = io::stdout().lock();
            for line in render::render_detail(&movie, render::terminal_width()) {
                writeln!(out, "{line}")?;
            }
        }
        OutputMode::Json => {
            write_json_line(&json!({
                "command": "show",
                "movie": MovieView::from(&movie),
            }))?;
        }
    }
    Ok("show".to_string())
}

// ---------------------------------------------------------------------------
// import
// ---------------------------------------------------------------------------

fn run_import(cli: &Cli, rt: &Runtime, args: &ImportArgs) -> Result<String, CliError> {
    let started = Instant::now();
    let batch = load_export(&args.file)?;
    let parsed = batch.drafts.len();
    let inserted = rt.store.insert_many(batch.drafts)?;
    let already_present = parsed.saturating_sub(inserted);
    let skipped = batch.skipped.len();

    rt.logger.send(ActivityEvent::MoviesImported {
        inserted,
        skipped,
        duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    });

    match output_mode(cli) {
        OutputMode::Human => {
            println!(
                "Imported {} movies into {} ({already_present} already present, {skipped} skipped).",
                inserted.to_string().green().bold(),
                rt.store.location()
            );
            if cli.verbose {
                for doc in &batch.skipped {
                    println!("  skipped #{}: {}", doc.position, doc.reason);
                }
            }
        }
        OutputMode::Json => {
            let skipped_docs: Vec<Value> = batch
                .skipped
                .iter()
                .map(|doc| json!({ "position": doc.position, "reason": doc.reason }))
                .collect();
            write_json_line(&json!({
                "command": "import",
                "file": args.file.to_string_lossy(),
                "inserted": inserted,
                "already_present": already_present,
                "skipped": skipped_docs,
            }))?;
        }
    }
    Ok("import".to_string())
}

// ---------------------------------------------------------------------------
// config / version
// ---------------------------------------------------------------------------

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match &args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Show) => {
            let config = Config::load(cli.config.as_deref())?;

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", config.to_toml()?);
                }
                OutputMode::Json => {
                    let value = serde_json::to_value(&config)?;
                    let payload = json!({
                        "command": "config show",
                        "config": value,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Validate) => match Config::load(cli.config.as_deref()) {
            Ok(config) => {
                let hash = config.stable_hash()?;

                match output_mode(cli) {
                    OutputMode::Human => {
                        println!("Configuration is valid.");
                        println!("  Source: {}", config.paths.config_file.display());
                        println!("  Hash: {hash}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": true,
                            "path": config.paths.config_file.to_string_lossy(),
                            "hash": hash,
                        });
                        write_json_line(&payload)?;
                    }
                }
                Ok(())
            }
            Err(e) => {
                match output_mode(cli) {
                    OutputMode::Human => {
                        eprintln!("Configuration is INVALID: {e}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": false,
                            "code": e.code(),
                            "error": e.to_string(),
                        });
                        write_json_line(&payload)?;
                    }
                }
                Err(CliError::User(format!("invalid config: {e}")))
            }
        },
    }
}

fn emit_version(cli: &Cli) -> Result<(), CliError> {
    let version = env!("CARGO_PKG_VERSION");
    let package = env!("CARGO_PKG_NAME");
    let target = option_env!("TARGET").unwrap_or("unknown");
    let profile = option_env!("PROFILE").unwrap_or("unknown");
    let sqlite = cfg!(feature = "sqlite");

    match output_mode(cli) {
        OutputMode::Human => {
            println!("mflix {version}");
            if cli.verbose {
                println!("package: {package}");
                println!("target: {target}");
                println!("profile: {profile}");
                println!("sqlite: {sqlite}");
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "binary": "mflix",
                "version": version,
                "package": package,
                "build": {
                    "target": target,
                    "profile": profile,
                    "sqlite": sqlite,
                },
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("MFLIX_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_before_and_after_subcommand() {
        let before = Cli::try_parse_from([
            "mflix",
            "--config",
            "/tmp/mflix.toml",
            "--json",
            "--no-color",
            "-v",
            "genres",
        ]);
        assert!(before.is_ok());

        let after = Cli::try_parse_from(["mflix", "genres", "--json", "--no-color", "-q"]);
        assert!(after.is_ok());
    }

    #[test]
    fn parses_every_subcommand() {
        let cases = [
            vec!["mflix", "search"],
            vec![
                "mflix",
                "search",
                "--query",
                "godfather",
                "--genre",
                "Crime",
                "--min-year",
                "1970",
                "--max-year",
                "1980",
                "--min-rating",
                "7.3",
                "--page",
                "2",
                "--page-size",
                "50",
                "--view",
                "coverflow",
                "--explain",
            ],
            vec!["mflix", "browse", "--view", "cards", "--no-clear"],
            vec!["mflix", "genres"],
            vec!["mflix", "add", "--title", "Zodiac", "--year", "2007"],
            vec!["mflix", "show", "42"],
            vec!["mflix", "import", "movies.json"],
            vec!["mflix", "config"],
            vec!["mflix", "config", "path"],
            vec!["mflix", "config", "show"],
            vec!["mflix", "config", "validate"],
            vec!["mflix", "version"],
        ];

        for case in cases {
            let parsed = Cli::try_parse_from(case.clone());
            assert!(parsed.is_ok(), "failed to parse case: {case:?}");
        }
    }

    #[test]
    fn page_size_is_limited_to_selector_values() {
        for size in ["10", "25", "50"] {
            assert!(Cli::try_parse_from(["mflix", "search", "--page-size", size]).is_ok());
        }
        for size in ["100", "0", "twenty"] {
            let err = Cli::try_parse_from(["mflix", "search", "--page-size", size]).unwrap_err();
            assert_eq!(err.exit_code(), 2, "size {size} should be a usage error");
        }
    }

    #[test]
    fn page_zero_and_unknown_view_are_rejected() {
        assert!(Cli::try_parse_from(["mflix", "search", "--page", "0"]).is_err());
        assert!(Cli::try_parse_from(["mflix", "search", "--view", "list"]).is_err());
    }

    #[test]
    fn search_flags_become_filter_inputs() {
        let cli = Cli::try_parse_from([
            "mflix",
            "search",
            "-s",
            "heat",
            "--min-rating",
            "-1",
        ])
        .unwrap();
        let Command::Search(args) = cli.command else {
            panic!("expected search");
        };
        let inputs = args.filters.inputs();
        assert_eq!(inputs.search, "heat");
        assert_eq!(inputs.min_rating, "-1");
        assert_eq!(inputs.genre, "");
        assert_eq!(args.page, 1);
    }

    #[test]
    fn add_requires_title_and_year() {
        assert!(Cli::try_parse_from(["mflix", "add", "--title", "Heat"]).is_err());
        assert!(Cli::try_parse_from(["mflix", "add", "--year", "1995"]).is_err());
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["mflix", "-v", "-q", "genres"]).is_err());
    }

    #[test]
    fn completions_support_bash_zsh_and_fish() {
        for shell in ["bash", "zsh", "fish"] {
            let parsed = Cli::try_parse_from(["mflix", "completions", shell]);
            assert!(parsed.is_ok(), "failed shell parse for {shell}");
        }
    }

    #[test]
    fn output_mode_resolution_honors_precedence() {
        assert_eq!(
            resolve_output_mode(true, Some("human"), true),
            OutputMode::Json
        );
        assert_eq!(
            resolve_output_mode(false, Some("json"), true),
            OutputMode::Json
        );
        assert_eq!(
            resolve_output_mode(false, Some("human"), false),
            OutputMode::Human
        );
        assert_eq!(
            resolve_output_mode(false, Some("auto"), true),
            OutputMode::Human
        );
        assert_eq!(resolve_output_mode(false, None, false), OutputMode::Json);
    }

    #[test]
    fn store_errors_exit_one_and_input_errors_exit_two() {
        let user: CliError = MflixError::NotFound {
            id: "9".to_string(),
        }
        .into();
        assert_eq!(user.exit_code(), 2);
        let runtime: CliError = MflixError::StoreUnavailable {
            location: "/nope".to_string(),
            details: "unable to open".to_string(),
        }
        .into();
        assert_eq!(runtime.exit_code(), 1);
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
