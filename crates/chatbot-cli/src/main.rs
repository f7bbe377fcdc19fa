//! chatbot CLI: terminal chat client for a local inference service

use chatbot_engine::{
    ChatSession, Config, ConversationStore, FileStore, HttpDispatcher, KeyValueStore, MemoryStore,
    Message, ModelChoice, SendOutcome, CONFIG_FILE,
};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Default data directory, relative to the working directory.
const DATA_DIR: &str = ".chatbot";

/// Log file used while the TUI owns the terminal.
const LOG_FILE: &str = "chatbot.log";

/// Chat with a local model server from the terminal
#[derive(Debug, Parser)]
#[command(name = "chatbot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding history, config and logs
    #[arg(long, global = true, default_value = DATA_DIR)]
    data_dir: PathBuf,

    /// Config file (default: <data-dir>/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Chat endpoint URL, overriding the config file
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Model to start with (mistral, alpha, phi-2, phi-1_5, instruct)
    #[arg(long, global = true)]
    model: Option<ModelChoice>,

    /// Keep the conversation in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Open the TUI (default when no command specified)
    Tui,

    /// Send one message and print the reply
    Send {
        /// Message text
        text: String,
    },

    /// Print the saved conversation
    History {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete the saved conversation
    Clear,

    /// List available models
    Models,

    /// Print the effective configuration
    Config {
        /// Save it to the config file
        #[arg(long)]
        write: bool,
    },
}

type CliResult = Result<(), Box<dyn Error>>;

fn main() {
    let cli = Cli::parse();
    let tui_mode = matches!(cli.command, None | Some(Commands::Tui));

    if let Err(e) = init_logging(&cli.data_dir, tui_mode) {
        eprintln!("Error: failed to set up logging: {e}");
        std::process::exit(1);
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Install the tracing subscriber.
///
/// The TUI owns the terminal, so in that mode logs go to a file in the data
/// directory. Everything else logs to stderr.
fn init_logging(data_dir: &Path, tui_mode: bool) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if tui_mode {
        std::fs::create_dir_all(data_dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(data_dir.join(LOG_FILE))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
    Ok(())
}

fn run(cli: Cli) -> CliResult {
    let config = resolve_config(&cli)?;
    debug!(
        endpoint = %config.endpoint,
        model = config.default_model.id(),
        "Configuration loaded"
    );

    match cli.command {
        None | Some(Commands::Tui) => cmd_tui(&cli.data_dir, cli.ephemeral, &config),
        Some(Commands::Send { ref text }) => cmd_send(&cli.data_dir, cli.ephemeral, &config, text),
        Some(Commands::History { json }) => cmd_history(&cli.data_dir, cli.ephemeral, json),
        Some(Commands::Clear) => cmd_clear(&cli.data_dir, cli.ephemeral),
        Some(Commands::Models) => {
            print!("{}", format_models(config.default_model));
            Ok(())
        }
        Some(Commands::Config { write }) => cmd_config(&config_path(&cli), &config, write),
    }
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config
        .clone()
        .unwrap_or_else(|| cli.data_dir.join(CONFIG_FILE))
}

/// Load the config file and apply command-line overrides.
fn resolve_config(cli: &Cli) -> Result<Config, Box<dyn Error>> {
    let path = config_path(cli);
    // An explicitly named config file must exist
    let mut config = if cli.config.is_some() {
        Config::load(&path)
    } else {
        Config::load_or_default(&path)
    }
    .map_err(|e| format!("{}: {e}", path.display()))?;

    apply_overrides(&mut config, cli);
    Ok(config)
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint.clone_from(endpoint);
    }
    if let Some(model) = cli.model {
        config.default_model = model;
    }
}

fn open_storage(
    data_dir: &Path,
    ephemeral: bool,
) -> Result<Box<dyn KeyValueStore>, Box<dyn Error>> {
    if ephemeral {
        debug!("Using in-memory storage");
        Ok(Box::new(MemoryStore::new()))
    } else {
        Ok(Box::new(FileStore::new(data_dir)?))
    }
}

fn cmd_tui(data_dir: &Path, ephemeral: bool, config: &Config) -> CliResult {
    let storage = open_storage(data_dir, ephemeral)?;
    let dispatcher = HttpDispatcher::new(config.endpoint.clone(), Some(config.request_timeout()))?;
    let session = ChatSession::load(storage, config.default_model);

    info!(endpoint = %config.endpoint, "Opening TUI");
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(chatbot_tui::run_tui(session, Arc::new(dispatcher)))
}

fn cmd_send(data_dir: &Path, ephemeral: bool, config: &Config, text: &str) -> CliResult {
    let storage = open_storage(data_dir, ephemeral)?;
    let dispatcher = HttpDispatcher::new(config.endpoint.clone(), Some(config.request_timeout()))?;
    let mut session = ChatSession::load(storage, config.default_model);

    let rt = tokio::runtime::Runtime::new()?;
    match rt.block_on(session.send(&dispatcher, text)) {
        SendOutcome::Replied(reply) => {
            println!("{reply}");
            Ok(())
        }
        SendOutcome::Blank => Err("message is empty".into()),
        SendOutcome::NoReply => Err(format!("no reply from {}", dispatcher.endpoint()).into()),
    }
}

fn cmd_history(data_dir: &Path, ephemeral: bool, json: bool) -> CliResult {
    let store = ConversationStore::load(open_storage(data_dir, ephemeral)?);

    if json {
        println!("{}", serde_json::to_string_pretty(store.messages())?);
    } else if store.is_empty() {
        println!("No messages yet.");
    } else {
        print!("{}", format_history(store.messages()));
    }
    Ok(())
}

fn cmd_clear(data_dir: &Path, ephemeral: bool) -> CliResult {
    let mut store = ConversationStore::load(open_storage(data_dir, ephemeral)?);
    let count = store.len();
    store.clear();
    println!("Cleared {count} message(s)");
    Ok(())
}

fn cmd_config(path: &Path, config: &Config, write: bool) -> CliResult {
    println!("{}", serde_json::to_string_pretty(config)?);
    if write {
        config.save(path)?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}

fn format_history(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}\n", m.sender.label(), m.text))
        .collect()
}

fn format_models(default: ModelChoice) -> String {
    ModelChoice::ALL
        .iter()
        .map(|model| {
            let marker = if *model == default { "*" } else { " " };
            format!("{marker} {:<8} {}\n", model.id(), model.label())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_opens_tui() {
        let cli = Cli::try_parse_from(["chatbot"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.data_dir, PathBuf::from(DATA_DIR));
        assert!(!cli.ephemeral);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "chatbot",
            "send",
            "hello there",
            "--model",
            "phi-2",
            "--endpoint",
            "http://localhost:9000/chat",
        ])
        .unwrap();

        assert_eq!(cli.model, Some(ModelChoice::Phi2));
        assert_eq!(cli.endpoint.as_deref(), Some("http://localhost:9000/chat"));
        match cli.command {
            Some(Commands::Send { text }) => assert_eq!(text, "hello there"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_model_rejected() {
        assert!(Cli::try_parse_from(["chatbot", "--model", "gpt-4"]).is_err());
    }

    #[test]
    fn test_overrides_win_over_config() {
        let cli = Cli::try_parse_from([
            "chatbot",
            "--endpoint",
            "http://example.test/chat",
            "--model",
            "alpha",
        ])
        .unwrap();
        let mut config = Config::default();
        apply_overrides(&mut config, &cli);

        assert_eq!(config.endpoint, "http://example.test/chat");
        assert_eq!(config.default_model, ModelChoice::Alpha);
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let cli = Cli::try_parse_from(["chatbot", "models"]).unwrap();
        let mut config = Config::default();
        apply_overrides(&mut config, &cli);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_path_defaults_to_data_dir() {
        let cli = Cli::try_parse_from(["chatbot", "--data-dir", "/tmp/chat"]).unwrap();
        assert_eq!(config_path(&cli), PathBuf::from("/tmp/chat").join(CONFIG_FILE));

        let cli = Cli::try_parse_from(["chatbot", "--config", "/etc/chatbot.json"]).unwrap();
        assert_eq!(config_path(&cli), PathBuf::from("/etc/chatbot.json"));
    }

    #[test]
    fn test_format_models_marks_default() {
        let out = format_models(ModelChoice::Instruct);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), ModelChoice::ALL.len());
        assert_eq!(lines[0], "  mistral  Mistral-7B");
        assert_eq!(lines[4], "* instruct Falcon-7B");
    }

    #[test]
    fn test_format_history() {
        let messages = vec![Message::user("hello"), Message::bot("hi there")];
        assert_eq!(format_history(&messages), "You: hello\nBot: hi there\n");
    }
}
