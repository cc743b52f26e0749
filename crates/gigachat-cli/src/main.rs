//! Menu-driven terminal chat client for the GigaChat API.
//!
//! Thin presentation layer over [`gigachat_connector`]: renders menus,
//! reads operator input and relays errors. The connector never retries;
//! the retry loop lives here, prompting the operator after any failure.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use gigachat_connector::{ChatSession, ConnectorConfig, ConnectorError, Message, Role};
use tracing_subscriber::EnvFilter;

mod menu;

use menu::{menu_items, transition, MenuAction, MenuState};

#[derive(Parser, Debug)]
#[command(
    name = "gigachat",
    about = "Menu-driven terminal chat for the GigaChat API",
    version
)]
struct Args {
    /// Path of the JSON chat store (default: GIGACHAT_CHATS_JSON or ./data/gigachat_chats.json)
    #[arg(long)]
    chats_file: Option<PathBuf>,

    /// API scope: PERS, B2B or CORP (default: GIGACHAT_API_SCOPE or PERS)
    #[arg(long)]
    scope: Option<String>,

    /// Token budget per reply (default: GIGACHAT_MAX_TOKENS or 100)
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Model identifier
    #[arg(long)]
    model: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    let settings = Settings::from_config(&config);

    let mut session = ChatSession::new(config).context("failed to start chat session")?;
    session
        .authorize()
        .context("initial authorization failed; check GIGACHAT_AUTH_TOKEN")?;
    tracing::debug!("session ready");

    run(&mut session, &settings)
}

fn build_config(args: &Args) -> Result<ConnectorConfig> {
    let mut config = ConnectorConfig::from_env()?;
    if let Some(path) = &args.chats_file {
        config = config.with_chats_path(path);
    }
    if let Some(scope) = &args.scope {
        config = config.with_scope(scope.parse()?);
    }
    if let Some(max_tokens) = args.max_tokens {
        config = config.with_max_tokens(max_tokens);
    }
    if let Some(model) = &args.model {
        config = config.with_model(model);
    }
    Ok(config)
}

/// Operator-facing view of the effective configuration.
///
/// Carries no credential at all: the settings page renders a redacted
/// placeholder instead.
struct Settings {
    provider: String,
    scope: String,
    chats_file: String,
    max_tokens: u32,
    model: String,
}

impl Settings {
    fn from_config(config: &ConnectorConfig) -> Self {
        Self {
            provider: config.provider.to_string(),
            scope: config.scope.to_string(),
            chats_file: config.chats_path.display().to_string(),
            max_tokens: config.max_tokens,
            model: config.model.clone(),
        }
    }
}

fn run(session: &mut ChatSession, settings: &Settings) -> Result<()> {
    let mut state = MenuState::Main;

    while state != MenuState::Quit {
        render_menu(state, session.current_chat());
        // End of input quits, same as picking [0].
        let Some(input) = prompt("> ")? else { break };
        let (action, next) = transition(state, &input);

        match perform_with_retry(session, settings, action)? {
            Outcome::Done => state = next,
            Outcome::Cancelled => {} // stay in the current menu
            Outcome::Quit => state = MenuState::Quit,
        }
    }

    println!("{}", "Bye.".dimmed());
    Ok(())
}

enum Outcome {
    Done,
    Cancelled,
    Quit,
}

/// Run one menu action, re-prompting on connector errors.
///
/// On failure the operator chooses to retry the same action, go back
/// to the menu, or quit. The connector itself never retries.
fn perform_with_retry(
    session: &mut ChatSession,
    settings: &Settings,
    action: MenuAction,
) -> Result<Outcome> {
    loop {
        match perform(session, settings, action) {
            Ok(outcome) => return Ok(outcome),
            Err(err) => {
                eprintln!("{} {}", "error:".red().bold(), err);
                let Some(choice) = prompt("[r]etry / [m]enu / [q]uit: ")? else {
                    return Ok(Outcome::Quit);
                };
                match choice.trim() {
                    "r" | "R" => continue,
                    "q" | "Q" => return Ok(Outcome::Quit),
                    _ => return Ok(Outcome::Cancelled),
                }
            }
        }
    }
}

fn perform(
    session: &mut ChatSession,
    settings: &Settings,
    action: MenuAction,
) -> Result<Outcome, ConnectorError> {
    match action {
        MenuAction::ListChats => {
            let ids = session.chat_ids();
            if ids.is_empty() {
                println!("{}", "No chats yet.".dimmed());
            } else {
                for id in ids {
                    println!("  {}", id.cyan());
                }
            }
        }
        MenuAction::OpenChat => {
            let Some(id) = prompt_required("Chat name: ")? else {
                return Ok(Outcome::Quit);
            };
            session.select_chat(&id)?;
            render_history(session.get_messages()?);
        }
        MenuAction::ShowBalance => {
            let balance = session.balance()?;
            println!("Balance: {} tokens", balance.to_string().green().bold());
        }
        MenuAction::ShowSettings => render_settings(settings),
        MenuAction::ShowHistory => render_history(session.get_messages()?),
        MenuAction::Ask => {
            let Some(text) = prompt_required("You: ")? else {
                return Ok(Outcome::Quit);
            };
            let reply = session.ask(text)?;
            println!("{} {}", "Assistant:".green().bold(), reply);
        }
        MenuAction::SetSystemPrompt => {
            let Some(text) = prompt_required("System prompt: ")? else {
                return Ok(Outcome::Quit);
            };
            session.add_system_prompt(text)?;
            println!("{}", "System prompt recorded.".dimmed());
        }
        MenuAction::LeaveChat => {}
        MenuAction::Quit => return Ok(Outcome::Quit),
        MenuAction::Invalid => println!("{}", "Unknown menu item.".yellow()),
    }
    Ok(Outcome::Done)
}

fn render_menu(state: MenuState, current_chat: Option<&str>) {
    println!();
    match (state, current_chat) {
        (MenuState::Chat, Some(id)) => println!("{} {}", "Chat:".bold(), id.cyan().bold()),
        _ => println!("{}", "GigaChat".bold()),
    }
    for (key, caption) in menu_items(state) {
        println!("  {} {}", format!("[{key}]").magenta().bold(), caption);
    }
}

fn render_settings(settings: &Settings) {
    println!("{}", "Settings".bold());
    println!("  {:<12} {}", "provider:", settings.provider.cyan());
    println!("  {:<12} {}", "credential:", "[REDACTED]".dimmed());
    println!("  {:<12} {}", "scope:", settings.scope.cyan());
    println!("  {:<12} {}", "chats file:", settings.chats_file.cyan());
    println!("  {:<12} {}", "max tokens:", settings.max_tokens.to_string().cyan());
    println!("  {:<12} {}", "model:", settings.model.cyan());
}

fn render_history(messages: &[Message]) {
    if messages.is_empty() {
        println!("{}", "History is empty.".dimmed());
        return;
    }
    for message in messages {
        let (label, content) = match message.role {
            Role::System => ("System".magenta().dimmed(), message.content.dimmed()),
            Role::User => ("User".blue().bold(), message.content.normal()),
            Role::Assistant => ("Assistant".green().bold(), message.content.normal()),
        };
        println!("{label}: {content}");
    }
}

/// Read one line from stdin; `None` means end of input.
fn prompt(text: &str) -> Result<Option<String>> {
    prompt_from(&mut io::stdin().lock(), text).context("failed to read input")
}

/// Prompt on stdin until the operator enters a non-empty line;
/// `None` means end of input.
fn prompt_required(text: &str) -> Result<Option<String>, ConnectorError> {
    prompt_required_from(&mut io::stdin().lock(), text).map_err(ConnectorError::Io)
}

fn prompt_from(reader: &mut impl BufRead, text: &str) -> io::Result<Option<String>> {
    print!("{text}");
    io::stdout().flush()?;
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn prompt_required_from(reader: &mut impl BufRead, text: &str) -> io::Result<Option<String>> {
    loop {
        let Some(line) = prompt_from(reader, text)? else {
            return Ok(None);
        };
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            return Ok(Some(trimmed.to_string()));
        }
    }
}
