//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// PlanChat - chat with a hosted planning agent
#[derive(Parser)]
#[command(
    name = "pc",
    about = "Chat with a hosted planning agent through a server-side relay",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the relay HTTP server
    Serve {
        /// Address to listen on (overrides relay.bind)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Start an interactive chat
    Chat {
        /// Message to send before the prompt opens
        message: Option<String>,
    },

    /// Send a single message and print the replies
    Send {
        /// Message text
        text: String,
    },

    /// Inspect or reset the stored session
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },
}

impl Command {
    /// Whether this command owns the terminal, so logs must go to a file
    pub fn is_interactive(&self) -> bool {
        !matches!(self, Command::Serve { .. })
    }
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Print the stored session id
    Show,

    /// Forget the stored session id
    Reset,
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("planchat")
        .join("logs")
        .join("planchat.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_with_bind() {
        let cli = Cli::try_parse_from(["pc", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        match cli.command {
            Command::Serve { bind } => assert_eq!(bind.as_deref(), Some("0.0.0.0:8080")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_chat_optional_message() {
        let cli = Cli::try_parse_from(["pc", "chat"]).unwrap();
        assert!(matches!(cli.command, Command::Chat { message: None }));

        let cli = Cli::try_parse_from(["pc", "chat", "Plan a trip"]).unwrap();
        assert!(matches!(cli.command, Command::Chat { message: Some(ref m) } if m == "Plan a trip"));
    }

    #[test]
    fn test_send_requires_text() {
        assert!(Cli::try_parse_from(["pc", "send"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["pc", "session", "show", "-l", "debug", "-c", "/tmp/pc.yml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Session {
                command: SessionCommand::Show
            }
        ));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/pc.yml")));
    }

    #[test]
    fn test_serve_is_not_interactive() {
        assert!(!Command::Serve { bind: None }.is_interactive());
        assert!(Command::Send { text: "x".to_string() }.is_interactive());
    }

    #[test]
    fn test_log_path() {
        assert!(get_log_path().ends_with("planchat/logs/planchat.log"));
    }
}
