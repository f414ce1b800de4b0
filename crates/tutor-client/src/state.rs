//! Chat state and its reducer.
//!
//! [`update`] is the only way the transcript changes. It never performs I/O;
//! anything that has to happen outside the state is returned as an
//! [`Effect`].

use tracing::debug;
use tutor_types::ChatRequest;

use crate::message::{Message, Transcript};

/// Greeting the transcript is seeded with when no other is configured.
pub const DEFAULT_GREETING: &str = "Hi! I'm your math tutor. How can I help you today?";

/// Everything a front end needs to render the chat.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatState {
    pub transcript: Transcript,
    /// Current contents of the input line.
    pub input: String,
    /// `true` while an exchange with the relay is outstanding.
    pub loading: bool,
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new(DEFAULT_GREETING)
    }
}

impl ChatState {
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            transcript: Transcript::with_greeting(greeting),
            input: String::new(),
            loading: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// The user edited the input line.
    InputChanged(String),
    /// The user asked to send the current input.
    SendInitiated,
    /// The relay answered with a reply.
    ReplyReceived(String),
    /// The exchange failed; carries a human-readable description.
    ReplyFailed(String),
}

/// Transient, user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

/// Work the driver must perform after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send exactly one request to the relay.
    SendRequest(ChatRequest),
    /// Show a transient notification.
    Notify(Notice),
}

/// Apply `event` to `state` and return the effects it triggers.
///
/// A send is ignored, input intact, while another exchange is outstanding,
/// so replies always land in send order.
pub fn update(state: &mut ChatState, event: ChatEvent) -> Vec<Effect> {
    match event {
        ChatEvent::InputChanged(text) => {
            state.input = text;
            Vec::new()
        }
        ChatEvent::SendInitiated => {
            if state.input.trim().is_empty() {
                return Vec::new();
            }
            if state.loading {
                debug!("send ignored: an exchange is already in flight");
                return Vec::new();
            }

            let text = std::mem::take(&mut state.input);
            state.transcript.push(Message::user(text.clone()));
            state.loading = true;
            vec![Effect::SendRequest(ChatRequest::new(text))]
        }
        ChatEvent::ReplyReceived(reply) => {
            state.transcript.push(Message::assistant(reply));
            state.loading = false;
            Vec::new()
        }
        ChatEvent::ReplyFailed(description) => {
            state.transcript.push(Message::assistant(format!(
                "Sorry, I couldn't get an answer right now. ({description})"
            )));
            state.loading = false;
            vec![Effect::Notify(Notice {
                title: "Could not reach the tutor".to_owned(),
                description,
            })]
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::message::Role;

    fn with_input(text: &str) -> ChatState {
        let mut state = ChatState::default();
        update(&mut state, ChatEvent::InputChanged(text.to_owned()));
        state
    }

    #[test]
    fn send_appends_user_message_before_any_reply() {
        let mut state = with_input("What is 2 + 2?");
        let effects = update(&mut state, ChatEvent::SendInitiated);

        assert_eq!(state.transcript.len(), 2);
        let last = state.transcript.last().unwrap();
        assert_eq!(last.role(), Role::User);
        assert_eq!(last.content(), "What is 2 + 2?");
        assert!(state.input.is_empty());
        assert!(state.loading);
        assert_eq!(
            effects,
            vec![Effect::SendRequest(ChatRequest::new("What is 2 + 2?"))]
        );
    }

    #[test]
    fn raw_input_is_sent_untrimmed() {
        let mut state = with_input("  x = 3  ");
        let effects = update(&mut state, ChatEvent::SendInitiated);
        assert_eq!(effects, vec![Effect::SendRequest(ChatRequest::new("  x = 3  "))]);
        assert_eq!(state.transcript.last().unwrap().content(), "  x = 3  ");
    }

    #[test]
    fn blank_input_is_a_no_op() {
        for text in ["", "   ", "\n\t"] {
            let mut state = with_input(text);
            let before = state.clone();
            let effects = update(&mut state, ChatEvent::SendInitiated);
            assert!(effects.is_empty());
            assert_eq!(state, before);
        }
    }

    #[test]
    fn send_while_loading_is_ignored_and_keeps_input() {
        let mut state = with_input("first");
        update(&mut state, ChatEvent::SendInitiated);
        update(&mut state, ChatEvent::InputChanged("second".into()));

        let effects = update(&mut state, ChatEvent::SendInitiated);
        assert!(effects.is_empty());
        assert_eq!(state.transcript.len(), 2);
        assert_eq!(state.input, "second");
    }

    #[test]
    fn reply_appends_one_assistant_message_and_clears_loading() {
        let mut state = with_input("6 x 7?");
        update(&mut state, ChatEvent::SendInitiated);
        let effects = update(&mut state, ChatEvent::ReplyReceived("42".into()));

        assert!(effects.is_empty());
        assert_eq!(state.transcript.len(), 3);
        let last = state.transcript.last().unwrap();
        assert_eq!(last.role(), Role::Assistant);
        assert_eq!(last.content(), "42");
        assert!(!state.loading);
    }

    #[test]
    fn failure_keeps_user_message_embeds_error_and_notifies() {
        let mut state = with_input("6 x 7?");
        update(&mut state, ChatEvent::SendInitiated);
        let effects = update(&mut state, ChatEvent::ReplyFailed("upstream error".into()));

        assert_eq!(state.transcript.len(), 3);
        assert_eq!(state.transcript.as_slice()[1].content(), "6 x 7?");
        let last = state.transcript.last().unwrap();
        assert_eq!(last.role(), Role::Assistant);
        assert!(last.content().contains("upstream error"));
        assert!(!state.loading);
        assert!(matches!(
            effects.as_slice(),
            [Effect::Notify(Notice { description, .. })] if description == "upstream error"
        ));
    }
}
