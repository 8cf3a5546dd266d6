mod commands;
mod config;
mod logging;
mod render;
mod session;
mod shell;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use vqs_client::{Fixture, HttpKnowledgeBase, KnowledgeBase, StaticKnowledgeBase};
use vqs_core::ProductFilter;

use commands::update::{AnswerSource, UpdateArgs};
use config::Settings;
use session::Session;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Search vendor security questionnaire answers and keep them current.
#[derive(Parser)]
#[command(
    name = "vqs",
    version,
    about = "Search vendor questionnaire answers and keep them current"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Config file (default: ./vqs.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Knowledge base endpoint (overrides VQS_ENDPOINT and the config file)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Raise log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search answers, optionally restricted to one product
    Search {
        /// Search text
        query: String,
        /// Product to search ('All' for every product)
        #[arg(long)]
        product: Option<ProductFilter>,
    },

    /// Ask a free-form question across every product
    Ask {
        /// Question text
        query: String,
    },

    /// Replace the stored answer of a node and show the diff
    Update {
        /// Id of the node to update
        node_id: String,
        /// New answer text
        #[arg(long, required_unless_present = "answer_file", conflicts_with = "answer_file")]
        answer: Option<String>,
        /// Read the new answer from a file
        #[arg(long)]
        answer_file: Option<PathBuf>,
        /// File holding the current answer; the diff is only shown when given
        #[arg(long)]
        original_file: Option<PathBuf>,
        /// Question the answer belongs to
        #[arg(long)]
        question: Option<String>,
        /// Unchanged lines shown around each change
        #[arg(long)]
        context: Option<usize>,
    },

    /// Line diff of two text files (exit 1 when they differ)
    Diff {
        /// Original text
        before: PathBuf,
        /// Updated text
        after: PathBuf,
        /// Unchanged lines shown around each change
        #[arg(long)]
        context: Option<usize>,
    },

    /// Interactive search / update / review session
    Shell {
        /// Initial product filter
        #[arg(long)]
        product: Option<ProductFilter>,
        /// Serve answers from a JSON fixture instead of the backend
        #[arg(long)]
        offline: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let settings = match Settings::load(cli.config.as_deref(), cli.endpoint.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            report_error(&format!("error: {e}"), cli.output, cli.quiet);
            process::exit(1);
        }
    };
    tracing::debug!(endpoint = %settings.endpoint, product = %settings.product, "settings loaded");

    match cli.command {
        Commands::Search { query, product } => {
            commands::search::cmd_search(&settings, &query, product, cli.output, cli.quiet);
        }
        Commands::Ask { query } => {
            commands::ask::cmd_ask(&settings, &query, cli.output, cli.quiet);
        }
        Commands::Update {
            node_id,
            answer,
            answer_file,
            original_file,
            question,
            context,
        } => {
            let answer = match (answer.as_deref(), answer_file.as_deref()) {
                (Some(text), _) => AnswerSource::Text(text),
                (None, Some(path)) => AnswerSource::File(path),
                (None, None) => {
                    report_error("error: --answer or --answer-file is required", cli.output, cli.quiet);
                    process::exit(1);
                }
            };
            let args = UpdateArgs {
                node_id: &node_id,
                answer,
                original_file: original_file.as_deref(),
                question: question.as_deref(),
                context,
            };
            commands::update::cmd_update(&settings, args, cli.output, cli.quiet);
        }
        Commands::Diff {
            before,
            after,
            context,
        } => {
            let context = context.unwrap_or(settings.context);
            commands::diff::cmd_diff(&before, &after, context, cli.output, cli.quiet);
        }
        Commands::Shell { product, offline } => {
            let product = product.unwrap_or_else(|| settings.product.clone());
            match offline {
                Some(path) => {
                    let fixture = match Fixture::load(&path) {
                        Ok(f) => f,
                        Err(msg) => {
                            report_error(&msg, cli.output, cli.quiet);
                            process::exit(1);
                        }
                    };
                    cmd_shell(StaticKnowledgeBase::from(fixture), product, settings.context);
                }
                None => {
                    let kb = HttpKnowledgeBase::new(settings.client_config());
                    cmd_shell(kb, product, settings.context);
                }
            }
        }
    }
}

fn cmd_shell<K: KnowledgeBase>(kb: K, product: ProductFilter, context: usize) {
    let mut session = Session::new(kb, product, context);
    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal();
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    if let Err(e) = shell::run_shell(&mut session, stdin.lock(), &mut stdout, &mut stderr, interactive) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
