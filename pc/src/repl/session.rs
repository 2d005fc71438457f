//! REPL session

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::agent::{Message, Role};
use crate::conversation::{ConversationController, IgnoreReason, SubmitOutcome};

/// Interactive chat session with the planning agent
pub struct ReplSession {
    controller: ConversationController,
}

impl ReplSession {
    pub fn new(controller: ConversationController) -> Self {
        Self { controller }
    }

    /// Run the REPL main loop
    pub async fn run(&mut self, initial_message: Option<String>) -> Result<()> {
        self.print_welcome();

        if let Some(message) = initial_message {
            println!("{} {}", ">".bright_green(), message);
            self.process_user_input(&message).await;
        }

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input) {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    } else {
                        self.process_user_input(&line).await;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "Planning Agent Chat".bright_cyan().bold());
        println!("Session: {}", self.controller.session_id().to_string().dimmed());
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    fn handle_slash_command(&mut self, input: &str) -> SlashResult {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts.first().copied().unwrap_or("");

        match cmd {
            "/help" | "/h" => {
                self.print_help();
                SlashResult::Continue
            }
            "/quit" | "/q" | "/exit" => SlashResult::Quit,
            "/history" => {
                self.print_history();
                SlashResult::Continue
            }
            "/session" => {
                println!("Session: {}", self.controller.session_id());
                println!("State:   {}", self.controller.state());
                SlashResult::Continue
            }
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
                SlashResult::Continue
            }
        }
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:14} Show this help", "/help".yellow());
        println!("  {:14} Exit the chat", "/quit".yellow());
        println!("  {:14} Show conversation history", "/history".yellow());
        println!("  {:14} Show the session id and send state", "/session".yellow());
        println!();
        println!("Press {} while waiting to abandon a reply.", "Ctrl-C".yellow());
        println!();
    }

    fn print_history(&self) {
        let messages = self.controller.messages();
        if messages.is_empty() {
            println!("{}", "No conversation history.".dimmed());
            return;
        }

        println!();
        println!("{}", "Conversation History:".bright_cyan());
        for (i, msg) in messages.iter().enumerate() {
            let role = match msg.role {
                Role::User => "You".bright_green(),
                Role::Model => "Agent".bright_blue(),
            };
            let text = msg.text();
            let preview: String = text.chars().take(50).collect();
            let preview = if text.chars().count() > 50 { format!("{}...", preview) } else { preview };
            println!("  {}. {}: {}", i + 1, role, preview);
        }
        println!();
    }

    /// Submit input and print whatever came back
    async fn process_user_input(&mut self, input: &str) {
        println!("{}", "waiting for agent...".dimmed());

        let outcome = tokio::select! {
            outcome = self.controller.submit(input) => outcome,
            _ = tokio::signal::ctrl_c() => {
                println!("{}", "Reply abandoned.".yellow());
                return;
            }
        };

        match outcome {
            SubmitOutcome::Replied(replies) if replies.is_empty() => {
                println!("{}", "(the agent sent no reply)".dimmed());
            }
            SubmitOutcome::Replied(replies) => {
                for reply in &replies {
                    print_reply(reply);
                }
            }
            SubmitOutcome::Failed(text) => {
                println!("{}", text.red());
            }
            SubmitOutcome::Ignored(IgnoreReason::Busy) => {
                println!("{}", "Still waiting on the previous message.".yellow());
            }
            SubmitOutcome::Ignored(IgnoreReason::Blank) => {}
        }
        println!();
    }
}

fn print_reply(message: &Message) {
    println!("{}", message.text());
}

/// Result of handling a slash command
enum SlashResult {
    Continue,
    Quit,
}
