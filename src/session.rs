use anyhow::Result;
use tracing::debug;

use crate::controller::{ChatController, SubmitOutcome};
use crate::prompt::{InputType, Prompt};

pub struct Session<'a> {
    controller: ChatController,
    prompt: Box<dyn Prompt + 'a>,
}

impl<'a> Session<'a> {
    pub fn new(controller: ChatController, prompt: Box<dyn Prompt + 'a>) -> Self {
        Session { controller, prompt }
    }

    pub fn controller(&self) -> &ChatController {
        &self.controller
    }

    pub async fn start(&mut self) -> Result<()> {
        self.prompt.chat_ready();

        loop {
            let input = self.prompt.get_input()?;
            match input.input_type {
                InputType::Message => {
                    if let Some(content) = &input.content {
                        self.controller.update_draft(content);
                        self.process(None).await;
                    }
                }
                InputType::Followup => {
                    let followup = self
                        .controller
                        .conversation()
                        .latest_followup()
                        .map(str::to_string);
                    match followup {
                        Some(question) => self.process(Some(question)).await,
                        None => self.prompt.notice("No follow-up suggestion yet."),
                    }
                }
                InputType::Exit => break,
                InputType::AskAgain => continue,
            }
        }

        self.prompt.close();
        Ok(())
    }

    /// Ask a single question, render the reply and return.
    pub async fn headless_start(&mut self, message: &str) -> Result<()> {
        self.controller.update_draft(message);
        let outcome = self.submit(None).await?;
        if let SubmitOutcome::Failed(err) = outcome {
            return Err(err.into());
        }
        self.prompt.close();
        Ok(())
    }

    async fn process(&mut self, followup: Option<String>) {
        if let Err(err) = self.submit(followup).await {
            self.prompt.notice(&err.to_string());
        }
    }

    /// Submit the draft (or a follow-up) and render the turns it appended.
    async fn submit(&mut self, followup: Option<String>) -> Result<SubmitOutcome> {
        let rendered = self.controller.conversation().len();

        self.prompt.show_busy();
        let result = match followup {
            Some(question) => self.controller.select_followup(&question).await,
            None => self.controller.submit().await,
        };
        self.prompt.hide_busy();

        let outcome = result?;
        debug!(?outcome, "submission finished");
        for turn in self.controller.conversation().iter().skip(rendered) {
            self.prompt.render(turn);
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Turn, ERROR_REPLY};
    use crate::errors::ChatError;
    use crate::prompt::Input;
    use crate::providers::mock::MockProvider;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Log(Arc<Mutex<Vec<String>>>);

    impl Log {
        fn push(&self, entry: String) {
            self.0.lock().unwrap().push(entry);
        }

        fn entries(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    struct ScriptedPrompt {
        inputs: VecDeque<Input>,
        log: Log,
    }

    impl ScriptedPrompt {
        fn new(inputs: Vec<Input>, log: Log) -> Self {
            Self {
                inputs: inputs.into(),
                log,
            }
        }
    }

    impl Prompt for ScriptedPrompt {
        fn render(&mut self, turn: &Turn) {
            self.log.push(format!("{:?}: {}", turn.sender(), turn.content()));
        }

        fn get_input(&mut self) -> Result<Input> {
            Ok(self
                .inputs
                .pop_front()
                .unwrap_or_else(|| Input::command(InputType::Exit)))
        }

        fn show_busy(&mut self) {
            self.log.push("busy".to_string());
        }

        fn hide_busy(&mut self) {
            self.log.push("idle".to_string());
        }

        fn notice(&mut self, text: &str) {
            self.log.push(format!("notice: {}", text));
        }

        fn close(&self) {
            self.log.push("closed".to_string());
        }

        fn chat_ready(&self) {}
    }

    fn session_with(provider: MockProvider, inputs: Vec<Input>) -> (Session<'static>, Log) {
        let log = Log::default();
        let controller = ChatController::new(Box::new(provider));
        let prompt = ScriptedPrompt::new(inputs, log.clone());
        (Session::new(controller, Box::new(prompt)), log)
    }

    #[tokio::test]
    async fn test_start_renders_turns_and_follows_up() -> Result<()> {
        let (mut session, log) = session_with(
            MockProvider::new(vec![
                Ok(r#"{"answer":"42","followup":"Why?"}"#.into()),
                Ok(r#"{"answer":"Because."}"#.into()),
            ]),
            vec![
                Input::message("What is the answer?"),
                Input::command(InputType::AskAgain),
                Input::command(InputType::Followup),
                Input::command(InputType::Exit),
            ],
        );

        session.start().await?;

        assert_eq!(
            log.entries(),
            vec![
                "busy",
                "idle",
                "User: What is the answer?",
                "Assistant: 42",
                "busy",
                "idle",
                "User: Why?",
                "Assistant: Because.",
                "closed",
            ]
        );
        assert_eq!(session.controller().conversation().len(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_followup_without_suggestion() -> Result<()> {
        let (mut session, log) = session_with(
            MockProvider::new(vec![]),
            vec![Input::command(InputType::Followup)],
        );

        session.start().await?;

        assert_eq!(
            log.entries(),
            vec!["notice: No follow-up suggestion yet.", "closed"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_key_is_a_notice() -> Result<()> {
        let (mut session, log) = session_with(
            MockProvider::unconfigured(),
            vec![Input::message("hello")],
        );

        session.start().await?;

        assert_eq!(
            log.entries(),
            vec!["busy", "idle", "notice: API key is missing.", "closed"]
        );
        assert!(session.controller().conversation().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_error_turn_is_rendered() -> Result<()> {
        let (mut session, log) = session_with(
            MockProvider::new(vec![Err(ChatError::Http { status: 500 })]),
            vec![Input::message("hello")],
        );

        session.start().await?;

        let entries = log.entries();
        assert!(entries.contains(&format!("Assistant: {}", ERROR_REPLY)));
        Ok(())
    }

    #[tokio::test]
    async fn test_headless_start() -> Result<()> {
        let (mut session, log) = session_with(
            MockProvider::new(vec![Ok("Plain answer.".into())]),
            vec![],
        );

        session.headless_start("Say something").await?;

        assert_eq!(
            log.entries(),
            vec![
                "busy",
                "idle",
                "User: Say something",
                "Assistant: Plain answer.",
                "closed"
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_headless_failure_is_an_error() {
        let (mut session, log) = session_with(
            MockProvider::new(vec![Err(ChatError::Http { status: 503 })]),
            vec![],
        );

        let err = session.headless_start("hello").await.unwrap_err();
        assert_eq!(err.to_string(), "API error: 503");
        assert!(log
            .entries()
            .contains(&format!("Assistant: {}", ERROR_REPLY)));
    }

    #[tokio::test]
    async fn test_headless_missing_key_is_an_error() {
        let (mut session, _) = session_with(MockProvider::unconfigured(), vec![]);

        let err = session.headless_start("hello").await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ChatError>(),
            Some(&ChatError::MissingApiKey)
        );
    }
}
