use crate::reply::StructuredReply;

/// Content shown in place of an answer when a submission fails.
pub const ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

/// One message in the conversation. Turns are never mutated after they are
/// appended, so fields are only readable through accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    sender: Sender,
    content: String,
    followup: Option<String>,
    is_error: bool,
}

impl Turn {
    fn new(sender: Sender, content: String, followup: Option<String>, is_error: bool) -> Self {
        Self {
            sender,
            content,
            followup,
            is_error,
        }
    }

    pub fn user(content: &str) -> Self {
        Self::new(Sender::User, content.to_string(), None, false)
    }

    pub fn assistant(reply: StructuredReply) -> Self {
        let (answer, followup) = reply.into_parts();
        Self::new(Sender::Assistant, answer, followup, false)
    }

    pub fn error() -> Self {
        Self::new(Sender::Assistant, ERROR_REPLY.to_string(), None, true)
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn followup(&self) -> Option<&str> {
        self.followup.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }
}

/// Append-only transcript. Insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// The most recent follow-up suggestion, if the last assistant turn has one.
    pub fn latest_followup(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|turn| turn.sender == Sender::Assistant)
            .and_then(Turn::followup)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}
