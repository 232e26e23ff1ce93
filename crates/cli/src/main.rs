use anyhow::{Context, Result};
use chatreel_core::logging::LoggingConfig;
use chatreel_core::{
    Config, Document, InitialMode, InputMap, MessageKind, Navigator, PrepareOptions, Preset, RevealSteps,
    TranscriptSequence, init_logging, prepare_file,
};
use chatreel_ui::App;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// chatreel - replay saved chat transcripts one message at a time
#[derive(Parser, Debug)]
#[command(name = "chatreel")]
#[command(about = "Step through a saved chat page with typed-out replies", long_about = None)]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to chatreel.toml (default: ./chatreel.toml when present)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a saved chat page in the terminal
    Play {
        /// HTML file to play
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Initial display mode (show-all, step-through)
        #[arg(short, long, value_name = "MODE")]
        mode: Option<InitialMode>,

        /// Page query string or URL, e.g. `?dm=i`
        #[arg(short, long, value_name = "QUERY")]
        query: Option<String>,

        /// Built-in page layout (doubao, doubao-docs, slides)
        #[arg(short, long, value_name = "PRESET")]
        preset: Option<Preset>,
    },
    /// List the messages found in a page
    Inspect {
        /// HTML file to inspect
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Built-in page layout (doubao, doubao-docs, slides)
        #[arg(short, long, value_name = "PRESET")]
        preset: Option<Preset>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Strip chat chrome from a saved page and wrap it for publishing
    Prepare {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// HTML inserted before the transcript; `__TITLE__` becomes the page title
        #[arg(long, value_name = "PATH")]
        banner: Option<PathBuf>,

        /// HTML inserted after the transcript
        #[arg(long, value_name = "PATH")]
        footer: Option<PathBuf>,

        /// Link the player script and stylesheets after <title>
        #[arg(long)]
        inject_resources: bool,
    },
    /// Write an example chatreel.toml
    InitConfig {
        /// Destination (default: ./chatreel.toml)
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// One row of `chatreel inspect`
#[derive(Debug, Serialize)]
struct InspectEntry {
    index: usize,
    kind: MessageKind,
    /// Characters a full reveal types
    chars: usize,
    text: String,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::InitConfig { path, force } = &cli.command {
        let path = path.clone().unwrap_or_else(|| PathBuf::from(Config::FILE_NAME));
        return cmd_init_config(&path, *force);
    }

    let config = load_config(cli.config.as_deref())?;
    let interactive = matches!(cli.command, Commands::Play { .. });
    let mut logging = LoggingConfig::from(config.logging.clone()).with_stderr(!interactive);
    if cli.verbose {
        logging = logging.with_level("debug");
    }
    let _guard = init_logging(Some(logging)).context("Failed to initialize logging")?;

    if cli.verbose {
        match &cli.config {
            Some(path) => println!("{} Using config: {}", "Info:".blue().bold(), path.display()),
            None => println!("{} Using default configuration", "Info:".blue().bold()),
        }
    }

    match cli.command {
        Commands::Play { file, mode, query, preset } => cmd_play(config, &file, mode, query.as_deref(), preset),
        Commands::Inspect { file, preset, json } => cmd_inspect(config, &file, preset, json),
        Commands::Prepare { input, output, banner, footer, inject_resources } => {
            let options = PrepareOptions { banner, footer, inject_resources, ..PrepareOptions::default() };
            cmd_prepare(&input, &output, &options, cli.verbose)
        }
        Commands::InitConfig { .. } => Ok(()),
    }
}

/// Load the given config file, or `./chatreel.toml` when it exists, or defaults
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            Config::from_file(path).with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => {
            let local = PathBuf::from(Config::FILE_NAME);
            if local.exists() {
                Config::from_file(&local).with_context(|| format!("Failed to load config from {}", local.display()))
            } else {
                Ok(Config::default())
            }
        }
    }
}

/// Layer a preset, a page query and an explicit mode over the loaded config.
///
/// A preset replaces the player, timing, selector and class sections; logging
/// settings are kept.
fn resolve_config(
    mut config: Config, preset: Option<Preset>, query: Option<&str>, mode: Option<InitialMode>,
) -> Result<Config> {
    if let Some(preset) = preset {
        let logging = config.logging;
        config = Config { logging, ..preset.config() };
    }
    if let Some(query) = query {
        config.apply_query(query);
    }
    if let Some(mode) = mode {
        config.player.initial_mode = mode;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn load_document(file: &Path) -> Result<Document> {
    let html = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    Ok(Document::parse(&html))
}

/// Play a page in the terminal
fn cmd_play(
    config: Config, file: &Path, mode: Option<InitialMode>, query: Option<&str>, preset: Option<Preset>,
) -> Result<()> {
    let config = resolve_config(config, preset, query, mode)?;
    let document = load_document(file)?;
    let navigator = Navigator::from_config(document, &config).context("Failed to capture transcript")?;
    if navigator.transcript().is_empty() {
        anyhow::bail!("No messages found in {}", file.display());
    }
    debug!(messages = navigator.transcript().len(), mode = %config.player.initial_mode, "starting player");

    let mut app = App::new(navigator, InputMap::from_config(&config.player));
    let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
    runtime.block_on(app.run()).context("Terminal error")?;
    Ok(())
}

fn inspect_entries(document: &Document, transcript: &TranscriptSequence) -> Vec<InspectEntry> {
    transcript
        .iter()
        .enumerate()
        .map(|(index, message)| {
            let chars = match message.kind {
                MessageKind::Sent => 0,
                MessageKind::Reply => {
                    message.content.map(|content| RevealSteps::char_count(&document.inner_html(content))).unwrap_or(0)
                }
            };
            let text = document.text_content(message.node).split_whitespace().collect::<Vec<_>>().join(" ");
            InspectEntry { index, kind: message.kind, chars, text }
        })
        .collect()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Print the captured transcript
fn cmd_inspect(config: Config, file: &Path, preset: Option<Preset>, json: bool) -> Result<()> {
    let config = resolve_config(config, preset, None, None)?;
    let document = load_document(file)?;
    let selectors = chatreel_core::SelectorSet::compile(&config.selectors)?;
    let transcript = TranscriptSequence::capture(&document, &selectors);
    let entries = inspect_entries(&document, &transcript);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{}", format!("{} messages in {}", entries.len(), file.display()).green().bold());
    println!();
    println!("{:>5}  {:<6}  {:>6}  {}", "#".bold(), "kind".bold(), "chars".bold(), "text".bold());
    for entry in &entries {
        let kind = match entry.kind {
            MessageKind::Sent => entry.kind.as_str().blue().to_string(),
            MessageKind::Reply => entry.kind.as_str().cyan().to_string(),
        };
        println!("{:>5}  {:<6}  {:>6}  {}", entry.index, kind, entry.chars, truncate(&entry.text, 60));
    }
    Ok(())
}

/// Clean a saved page for publishing
fn cmd_prepare(input: &Path, output: &Path, options: &PrepareOptions, verbose: bool) -> Result<()> {
    let report = prepare_file(input, output, options)
        .with_context(|| format!("Failed to prepare {}", input.display()))?;

    println!("{} Wrote {}", "Success:".green().bold(), output.display().cyan());
    if verbose {
        println!("{} Removed {} elements", "Info:".blue().bold(), report.removed);
        println!("{} CSP meta removed: {}", "Info:".blue().bold(), report.csp_removed);
        println!("{} Banner inserted: {}", "Info:".blue().bold(), report.banner_inserted);
        println!("{} Resources injected: {}", "Info:".blue().bold(), report.resources_injected);
    }
    Ok(())
}

/// Write the example configuration
fn cmd_init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    std::fs::write(path, Config::example()).context("Failed to write config")?;
    println!("{} Created config at {}", "Success:".green().bold(), path.display());
    Ok(())
}
