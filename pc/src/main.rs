//! PlanChat - chat with a hosted planning agent
//!
//! CLI entry point for the relay server and the chat client.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use planchat::cli::{Cli, Command, SessionCommand, get_log_path};
use planchat::config::Config;
use planchat::conversation::{IgnoreReason, SubmitOutcome};
use planchat::relay::server;
use planchat::repl;
use planchat::session::{FileSessionStore, Registration, forget_session, stored_session};

/// How long a one-shot `send` waits for a pending registration before exiting
const REGISTRATION_GRACE: Duration = Duration::from_secs(5);

fn parse_level(level_str: Option<&str>) -> tracing::Level {
    match level_str.map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    }
}

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>, to_file: bool) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    // Priority: CLI --log-level > config file > default (INFO)
    let level = parse_level(cli_log_level.or(config_log_level));
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    if to_file {
        // The chat owns the terminal; keep logs out of it
        let log_path: PathBuf = get_log_path();
        if let Some(log_dir) = log_path.parent() {
            fs::create_dir_all(log_dir).context("Failed to create log directory")?;
        }
        let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_ansi(false)
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    }

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    setup_logging(
        cli.log_level.as_deref(),
        config_log_level.as_deref(),
        cli.command.is_interactive(),
    )
    .context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!("PlanChat loaded config: app={}", config.agent.app_name);

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Serve { bind } => {
            debug!(?bind, "main: matched Serve command");
            server::serve(&config, bind.as_deref()).await
        }
        Command::Chat { message } => {
            debug!(?message, "main: matched Chat command");
            repl::run_interactive(&config, message).await
        }
        Command::Send { text } => {
            debug!(%text, "main: matched Send command");
            cmd_send(&config, &text).await
        }
        Command::Session { command } => {
            debug!(?command, "main: matched Session command");
            cmd_session(&config, command)
        }
    }
}

/// Send one message and print the agent's replies
async fn cmd_send(config: &Config, text: &str) -> Result<()> {
    debug!(%text, "cmd_send: called");
    let (controller, registration) = repl::start_conversation(config)?;

    let outcome = controller.submit(text).await;

    // The process is about to exit; give a first-run registration a chance to land
    if let Some(handle) = registration {
        match tokio::time::timeout(REGISTRATION_GRACE, handle).await {
            Ok(Ok(Registration::Registered)) => debug!("cmd_send: registration complete"),
            Ok(Ok(Registration::Failed(reason))) => debug!(%reason, "cmd_send: registration failed"),
            Ok(Err(e)) => warn!(error = %e, "cmd_send: registration task failed"),
            Err(_) => warn!("cmd_send: registration still pending at exit"),
        }
    }

    match outcome {
        SubmitOutcome::Replied(replies) => {
            if replies.is_empty() {
                println!("{}", "(the agent sent no reply)".dimmed());
            }
            for reply in replies {
                println!("{}", reply.text());
            }
            Ok(())
        }
        SubmitOutcome::Failed(message) => Err(eyre::eyre!(message)),
        SubmitOutcome::Ignored(IgnoreReason::Blank) => Err(eyre::eyre!("Message is empty")),
        SubmitOutcome::Ignored(IgnoreReason::Busy) => Err(eyre::eyre!("A message is already being sent")),
    }
}

/// Show or reset the stored session
///
/// Only the session store is touched; no relay client is built.
fn cmd_session(config: &Config, command: SessionCommand) -> Result<()> {
    debug!(?command, "cmd_session: called");
    let store = FileSessionStore::new(&config.client.session_file);

    match command {
        SessionCommand::Show => {
            match stored_session(&store)? {
                Some(id) => println!("{}", id),
                None => println!("No session stored"),
            }
            println!("Store: {}", config.client.session_file.display());
            Ok(())
        }
        SessionCommand::Reset => {
            if forget_session(&store)? {
                println!("Session reset");
            } else {
                println!("No session stored");
            }
            Ok(())
        }
    }
}
