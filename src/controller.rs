use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::conversation::{Conversation, Turn};
use crate::errors::{ChatError, ChatResult};
use crate::providers::base::Provider;
use crate::reply::{parse_reply, StructuredReply};

/// Status of the most recent submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseStatus {
    Success(StructuredReply),
    Failure(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The draft was empty or whitespace only.
    Blank,
    /// A request is already in flight.
    Busy,
}

/// Result of one call to [`ChatController::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was recorded or sent.
    Ignored(IgnoreReason),
    /// A user turn and an assistant turn were appended.
    Answered(StructuredReply),
    /// A user turn and an error turn were appended.
    Failed(ChatError),
}

/// Copy of the controller state handed to observers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSnapshot {
    pub conversation: Conversation,
    pub draft: String,
    pub busy: bool,
    pub last_response: Option<ResponseStatus>,
}

pub type Observer = Arc<dyn Fn(&ChatSnapshot) + Send + Sync>;

#[derive(Default)]
struct ChatState {
    draft: String,
    busy: bool,
    conversation: Conversation,
    last_response: Option<ResponseStatus>,
}

impl ChatState {
    fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            conversation: self.conversation.clone(),
            draft: self.draft.clone(),
            busy: self.busy,
            last_response: self.last_response.clone(),
        }
    }
}

enum Admission {
    Ignored(IgnoreReason),
    Rejected(ChatError),
    Accepted(String),
}

/// Owns the conversation and runs one request/parse/append cycle per
/// submission. At most one request is in flight; submissions made while
/// busy are dropped, not queued.
pub struct ChatController {
    provider: Box<dyn Provider>,
    state: Mutex<ChatState>,
    observers: Mutex<Vec<Observer>>,
}

impl ChatController {
    pub fn new(provider: Box<dyn Provider>) -> Self {
        Self {
            provider,
            state: Mutex::new(ChatState::default()),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Register a callback invoked with a fresh snapshot after every state
    /// change. No controller lock is held while observers run, so they may
    /// call back into the controller. A mutation made from an observer
    /// notifies again before the outer notification finishes.
    pub fn subscribe<F>(&self, observer: F)
    where
        F: Fn(&ChatSnapshot) + Send + Sync + 'static,
    {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(observer));
    }

    pub fn update_draft(&self, text: &str) {
        self.lock_state().draft = text.to_string();
        self.notify();
    }

    pub fn draft(&self) -> String {
        self.lock_state().draft.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.lock_state().busy
    }

    pub fn conversation(&self) -> Conversation {
        self.lock_state().conversation.clone()
    }

    pub fn last_response(&self) -> Option<ResponseStatus> {
        self.lock_state().last_response.clone()
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        self.lock_state().snapshot()
    }

    /// Send the current draft.
    ///
    /// Blank drafts and submissions made while a request is in flight are
    /// ignored. A missing credential is returned as an error before anything
    /// is recorded. Otherwise exactly one user turn and one assistant turn
    /// are appended, whether or not the request succeeds.
    pub async fn submit(&self) -> ChatResult<SubmitOutcome> {
        let question = match self.admit() {
            Admission::Ignored(reason) => {
                debug!(?reason, "submission ignored");
                return Ok(SubmitOutcome::Ignored(reason));
            }
            Admission::Rejected(err) => {
                warn!(error = %err, "submission rejected");
                self.notify();
                return Err(err);
            }
            Admission::Accepted(question) => {
                self.notify();
                question
            }
        };

        info!("submitting question");
        let result = self.provider.generate(&question).await;

        let outcome = {
            let mut state = self.lock_state();
            let outcome = match result {
                Ok(text) => {
                    let reply = parse_reply(&text);
                    debug!(has_followup = reply.followup().is_some(), "reply received");
                    state.conversation.push(Turn::assistant(reply.clone()));
                    state.last_response = Some(ResponseStatus::Success(reply.clone()));
                    SubmitOutcome::Answered(reply)
                }
                Err(err) => {
                    warn!(error = %err, "request failed");
                    state.conversation.push(Turn::error());
                    state.last_response = Some(ResponseStatus::Failure(err.to_string()));
                    SubmitOutcome::Failed(err)
                }
            };
            state.busy = false;
            state.draft.clear();
            outcome
        };
        self.notify();

        Ok(outcome)
    }

    /// Put a suggested follow-up in the draft and submit it.
    pub async fn select_followup(&self, question: &str) -> ChatResult<SubmitOutcome> {
        self.update_draft(question);
        self.submit().await
    }

    fn admit(&self) -> Admission {
        let mut state = self.lock_state();
        if state.busy {
            return Admission::Ignored(IgnoreReason::Busy);
        }
        if state.draft.trim().is_empty() {
            return Admission::Ignored(IgnoreReason::Blank);
        }
        if let Err(err) = self.provider.check_config() {
            state.last_response = Some(ResponseStatus::Failure(err.to_string()));
            return Admission::Rejected(err);
        }

        let question = std::mem::take(&mut state.draft);
        state.conversation.push(Turn::user(&question));
        state.busy = true;
        state.last_response = None;
        Admission::Accepted(question)
    }

    fn lock_state(&self) -> MutexGuard<'_, ChatState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        let observers: Vec<Observer> = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for observer in &observers {
            observer(&snapshot);
        }
    }
}
