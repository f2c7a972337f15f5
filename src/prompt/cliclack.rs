use std::io::{self, Write};

use anyhow::Result;
use bat::WrappingMode;
use cliclack::{input, spinner};
use console::style;

use super::{Input, InputType, Prompt, Theme};
use crate::conversation::{Sender, Turn};

pub struct CliclackPrompt {
    spinner: Option<cliclack::ProgressBar>,
    input_mode: InputMode,
    theme: Theme,
}

enum InputMode {
    Singleline,
    Multiline,
}

impl CliclackPrompt {
    pub fn new() -> Self {
        CliclackPrompt {
            spinner: None,
            input_mode: InputMode::Singleline,
            theme: Theme::Dark,
        }
    }

    fn bat_theme(&self) -> &'static str {
        match self.theme {
            Theme::Light => "GitHub",
            Theme::Dark => "zenburn",
        }
    }
}

impl Default for CliclackPrompt {
    fn default() -> Self {
        Self::new()
    }
}

fn print_markdown(content: &str, theme: &str) {
    let printed = bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(theme)
        .language("Markdown")
        .wrapping_mode(WrappingMode::Character)
        .print();
    if printed.is_err() {
        println!("{}", content);
    }
}

fn print_help() {
    println!("Commands:");
    println!("/exit - Exit the session");
    println!("/f - Ask the latest suggested follow-up question");
    println!("/m - Switch to multiline input mode");
    println!("/s - Switch to singleline input mode");
    println!("/t - Toggle Light/Dark theme");
    println!("/? - Display this help message");
}

/// Map a line of user input to a command, or `None` when it is a message.
fn parse_command(text: &str) -> Option<Command> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("/exit") || trimmed.eq_ignore_ascii_case("/quit") {
        Some(Command::Exit)
    } else if trimmed.eq_ignore_ascii_case("/f") {
        Some(Command::Followup)
    } else if trimmed.eq_ignore_ascii_case("/m") {
        Some(Command::Multiline)
    } else if trimmed.eq_ignore_ascii_case("/s") {
        Some(Command::Singleline)
    } else if trimmed.eq_ignore_ascii_case("/t") {
        Some(Command::ToggleTheme)
    } else if trimmed == "/?" {
        Some(Command::Help)
    } else {
        None
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Exit,
    Followup,
    Multiline,
    Singleline,
    ToggleTheme,
    Help,
}

impl Prompt for CliclackPrompt {
    fn render(&mut self, turn: &Turn) {
        match turn.sender() {
            Sender::User => println!("{} {}", style("you ›").cyan().bold(), turn.content()),
            Sender::Assistant if turn.is_error() => {
                println!("{}", style(turn.content()).red().bold())
            }
            Sender::Assistant => {
                print_markdown(turn.content(), self.bat_theme());
                println!();
                if let Some(followup) = turn.followup() {
                    println!(
                        "{} {}",
                        style("follow-up (/f) ›").dim(),
                        style(followup).cyan()
                    );
                }
            }
        }
        println!();
        let _ = io::stdout().flush();
    }

    fn get_input(&mut self) -> Result<Input> {
        let mut input = input("Ask:").placeholder("Type your question...");
        if let InputMode::Multiline = self.input_mode {
            input = input.multiline();
        }
        let message_text: String = input.interact()?;

        let Some(command) = parse_command(&message_text) else {
            return Ok(Input::message(&message_text));
        };
        match command {
            Command::Exit => return Ok(Input::command(InputType::Exit)),
            Command::Followup => return Ok(Input::command(InputType::Followup)),
            Command::Multiline => self.input_mode = InputMode::Multiline,
            Command::Singleline => self.input_mode = InputMode::Singleline,
            Command::ToggleTheme => {
                self.theme = match self.theme {
                    Theme::Light => {
                        println!("Switching to Dark theme");
                        Theme::Dark
                    }
                    Theme::Dark => {
                        println!("Switching to Light theme");
                        Theme::Light
                    }
                };
            }
            Command::Help => print_help(),
        }
        Ok(Input::command(InputType::AskAgain))
    }

    fn show_busy(&mut self) {
        let spin = spinner();
        spin.start("awaiting reply");
        self.spinner = Some(spin);
    }

    fn hide_busy(&mut self) {
        if let Some(spin) = self.spinner.take() {
            spin.stop("");
        }
    }

    fn notice(&mut self, text: &str) {
        println!("{}", style(text).yellow());
    }

    fn close(&self) {
        // No cleanup required
    }
}
