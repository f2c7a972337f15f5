use anyhow::Result;
use console::style;

use crate::conversation::Turn;

pub mod cliclack;

pub trait Prompt {
    fn render(&mut self, turn: &Turn);
    fn get_input(&mut self) -> Result<Input>;
    fn show_busy(&mut self);
    fn hide_busy(&mut self);
    /// Out-of-band message that is not part of the conversation.
    fn notice(&mut self, text: &str);
    fn close(&self);
    fn chat_ready(&self) {
        println!();
        println!("{}", style("Start the conversation").bold());
        println!("{}", style("Ask anything to begin. Type /? for help.").dim());
        println!();
    }
}

pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>, // Only set for InputType::Message
}

impl Input {
    pub fn message(content: &str) -> Self {
        Self {
            input_type: InputType::Message,
            content: Some(content.to_string()),
        }
    }

    pub fn command(input_type: InputType) -> Self {
        Self {
            input_type,
            content: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    AskAgain, // Ask the user for input again. Control flow command.
    Message,  // User sent a message
    Followup, // User picked the latest follow-up suggestion
    Exit,     // User wants to exit the session
}

pub enum Theme {
    Light,
    Dark,
}
