use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: Uuid,
    role: Role,
    content: String,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            image: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Attach an image reference. Only the reference is kept; nothing is
    /// uploaded.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }
}

/// Ordered, append-only list of messages for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// A transcript holding only the assistant's greeting.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::assistant(greeting)],
        }
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn greeting_seeds_one_assistant_message() {
        let t = Transcript::with_greeting("Hi!");
        assert_eq!(t.len(), 1);
        let first = t.last().unwrap();
        assert_eq!(first.role(), Role::Assistant);
        assert_eq!(first.content(), "Hi!");
    }

    #[test]
    fn messages_get_distinct_ids() {
        let a = Message::user("1");
        let b = Message::user("1");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn image_reference_is_kept_and_serialized_only_when_present() {
        let plain = Message::user("solve this");
        assert_eq!(plain.image(), None);
        let json = serde_json::to_value(&plain).unwrap();
        assert!(json.get("image").is_none());

        let with = Message::user("solve this").with_image("worksheet.png");
        assert_eq!(with.image(), Some("worksheet.png"));
        assert_eq!(with.content(), "solve this");
        let json = serde_json::to_value(&with).unwrap();
        assert_eq!(json["image"], "worksheet.png");

        let back: Message = serde_json::from_value(json).unwrap();
        assert_eq!(back, with);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
    }
}
