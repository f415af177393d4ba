//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use quizbank_core::{
    ChatAssistant, GraphStats, OpenAiCompatClient, check_bank_file, find_node,
    load_knowledge_base, read_bank_raw, retrieve_context, save_bank,
};
use quizbank_parser::{ParseSummary, parse_file};
use quizbank_shared::{
    AppConfig, init_config, load_config, load_config_from, resolve_api_key, validate_api_key,
};

/// Reply shown when the model answers with nothing.
const EMPTY_REPLY: &str = "抱歉，服务器暂时没有响应。";

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// quizbank: turn exam documents into a checked question bank.
#[derive(Parser)]
#[command(
    name = "quizbank",
    version,
    about = "Parse exam documents into a question bank and query the knowledge graph.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.quizbank/quizbank.toml.
    #[arg(long, global = true, env = "QUIZBANK_CONFIG")]
    pub config: Option<PathBuf>,

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
    /// Parse an exam document and write the question bank.
    Parse {
        /// Exam document (defaults to [data].source_document).
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output JSON file (defaults to [data].questions_path).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Report counts and anomalies of a question bank.
    Check {
        /// Question bank JSON (defaults to [data].questions_path).
        #[arg(long)]
        bank: Option<PathBuf>,
    },

    /// Print the question bank as served to quiz clients.
    Quiz {
        /// Question bank JSON (defaults to [data].questions_path).
        #[arg(long)]
        bank: Option<PathBuf>,
    },

    /// Show the knowledge context matched by a query.
    Search {
        /// Free-text query.
        query: String,

        /// Knowledge graph JSON (defaults to [data].knowledge_path).
        #[arg(long)]
        knowledge: Option<PathBuf>,
    },

    /// Summarize the knowledge graph or show one node.
    Graph {
        /// Knowledge graph JSON (defaults to [data].knowledge_path).
        #[arg(long)]
        knowledge: Option<PathBuf>,

        /// Node id or name to display.
        #[arg(long)]
        node: Option<String>,
    },

    /// Ask the assistant a question, grounded in the knowledge graph.
    Ask {
        /// The question.
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,

        /// Knowledge graph JSON (defaults to [data].knowledge_path).
        #[arg(long)]
        knowledge: Option<PathBuf>,
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

/// Initialize tracing based on CLI flags. Logs go to stderr; stdout carries results.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "quizbank=info",
        1 => "quizbank=debug",
        _ => "quizbank=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

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
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        Command::Parse { input, out } => cmd_parse(&config, input, out),
        Command::Check { bank } => cmd_check(&config, bank),
        Command::Quiz { bank } => cmd_quiz(&config, bank),
        Command::Search { query, knowledge } => cmd_search(&config, &query, knowledge),
        Command::Graph { knowledge, node } => cmd_graph(&config, knowledge, node.as_deref()),
        Command::Ask { message, knowledge } => {
            cmd_ask(&config, &message.join(" "), knowledge).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

/// A CLI flag wins over the configured path.
fn resolve_path(flag: Option<PathBuf>, configured: &str) -> PathBuf {
    flag.unwrap_or_else(|| PathBuf::from(configured))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_parse(config: &AppConfig, input: Option<PathBuf>, out: Option<PathBuf>) -> Result<()> {
    let input = resolve_path(input, &config.data.source_document);
    let out = resolve_path(out, &config.data.questions_path);

    info!(input = %input.display(), out = %out.display(), "parsing exam document");

    let records = parse_file(&input)?;
    save_bank(&out, &records)?;

    let summary = ParseSummary::of(&records);
    println!("Parsed {} questions.", summary.total);
    println!("  Choice: {}", summary.choice);
    println!("  Fill:   {}", summary.fill);
    for (section, count) in &summary.sections {
        println!("  [{section}] {count}");
    }
    println!("Saved to {}", out.display());

    Ok(())
}

fn cmd_check(config: &AppConfig, bank: Option<PathBuf>) -> Result<()> {
    let bank = resolve_path(bank, &config.data.questions_path);

    match check_bank_file(&bank) {
        Ok(report) => {
            println!("{report}");
            if report.is_clean() {
                println!("No anomalies found.");
            }
            Ok(())
        }
        Err(e) => {
            error!(bank = %bank.display(), error = %e, "bank check aborted");
            Err(e.into())
        }
    }
}

fn cmd_quiz(config: &AppConfig, bank: Option<PathBuf>) -> Result<()> {
    let bank = resolve_path(bank, &config.data.questions_path);
    let raw = read_bank_raw(&bank)?;
    println!("{raw}");
    Ok(())
}

fn cmd_search(config: &AppConfig, query: &str, knowledge: Option<PathBuf>) -> Result<()> {
    let knowledge = resolve_path(knowledge, &config.data.knowledge_path);
    let context = retrieve_context(&knowledge, query);

    if context.is_empty() {
        println!("(no matching knowledge)");
    } else {
        println!("{context}");
    }
    Ok(())
}

fn cmd_graph(config: &AppConfig, knowledge: Option<PathBuf>, node: Option<&str>) -> Result<()> {
    let knowledge = resolve_path(knowledge, &config.data.knowledge_path);
    let kb = load_knowledge_base(&knowledge)?;

    if let Some(key) = node {
        let found = find_node(&kb, key).ok_or_else(|| eyre!("no node with id or name '{key}'"))?;
        println!("{}", serde_json::to_string_pretty(found)?);
        return Ok(());
    }

    let stats = GraphStats::of(&kb);
    println!();
    println!("  Knowledge graph: {}", knowledge.display());
    println!("  Nodes:      {}", stats.nodes);
    println!("  Relations:  {}", stats.relations);
    println!("  Categories: {}", stats.categories);
    println!();
    Ok(())
}

async fn cmd_ask(config: &AppConfig, message: &str, knowledge: Option<PathBuf>) -> Result<()> {
    let api_key = resolve_api_key(config)?;
    let knowledge = resolve_path(knowledge, &config.data.knowledge_path);

    let client = OpenAiCompatClient::new(&config.llm, api_key)?;
    info!(model = client.model(), "asking assistant");
    let assistant = ChatAssistant::new(client, knowledge);

    let spinner = thinking_spinner();
    let result = assistant.ask(message).await;
    spinner.finish_and_clear();

    let reply = result?;
    if reply.answer.trim().is_empty() {
        println!("{EMPTY_REPLY}");
    } else {
        println!("{}", reply.answer);
    }
    Ok(())
}

/// Spinner shown while waiting on the completion service.
fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    spinner.set_message("Thinking…");
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    println!("{}", api_key_status(config));
    Ok(())
}

/// One-line report on whether the configured API key env var is usable.
fn api_key_status(config: &AppConfig) -> String {
    let var = &config.llm.api_key_env;
    match validate_api_key(config) {
        Ok(()) => format!("API key: set (${var})"),
        Err(_) => format!("API key: missing (set ${var} to use `ask`)"),
    }
}
